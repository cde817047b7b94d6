//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable identifier of a GPU cube resource inside the resource table
    ///
    /// Ids are plain keys: holding one never keeps the resource alive.
    pub struct ResourceId;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<T> = SlotMap<ResourceId, T>;
