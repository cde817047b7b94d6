//! Pixel formats a cube texture can be uploaded with

use serde::{Deserialize, Serialize};

/// Pixel format requested for the GPU resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureFormat {
    /// Single alpha channel
    Alpha,
    /// Single luminance channel
    Luminance,
    /// Luminance plus alpha
    LuminanceAlpha,
    /// 8-bit RGB
    Rgb,
    /// 8-bit RGBA
    #[default]
    Rgba,
    /// Single red channel
    Red,
    /// Red and green channels
    Rg,
    /// Half-float RGBA, typical for HDR environments
    Rgba16Float,
    /// Full-float RGBA
    Rgba32Float,
}

impl TextureFormat {
    /// Whether the format stores high dynamic range values
    pub fn is_hdr(self) -> bool {
        matches!(self, Self::Rgba16Float | Self::Rgba32Float)
    }
}
