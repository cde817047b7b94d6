//! Math utilities and types
//!
//! Provides the math types used by reflection transforms and local-cubemap
//! bounding boxes.

pub use nalgebra::{Matrix4, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }
}

/// Build a vector from a flat `[x, y, z]` array
pub fn vec3_from_array(values: [f32; 3]) -> Vec3 {
    Vec3::new(values[0], values[1], values[2])
}

/// Flatten a vector into `[x, y, z]`
pub fn vec3_to_array(vector: &Vec3) -> [f32; 3] {
    [vector.x, vector.y, vector.z]
}
