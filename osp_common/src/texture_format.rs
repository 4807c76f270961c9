/// Texture format tags and texel sizes

use std::fmt;
use std::mem::size_of;
use glam::{Vec3, Vec4};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use crate::error::{Error, Result};

/// Texel format of an engine texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum TextureFormat {
    /// 8 bit linear RGBA
    Rgba8 = 0,
    /// 8 bit sRGB gamma encoded color, linear alpha
    Srgba,
    /// 32 bit float RGBA
    Rgba32F,
    /// 8 bit linear RGB
    Rgb8,
    /// 8 bit sRGB gamma encoded RGB
    Srgb,
    /// 32 bit float RGB
    Rgb32F,
    /// 8 bit linear single channel
    R8,
    /// 32 bit float single channel
    R32F,
    /// Sentinel, has no size
    Invalid = 255,
}

impl TextureFormat {
    pub const ALL: [TextureFormat; 9] = [
        TextureFormat::Rgba8,
        TextureFormat::Srgba,
        TextureFormat::Rgba32F,
        TextureFormat::Rgb8,
        TextureFormat::Srgb,
        TextureFormat::Rgb32F,
        TextureFormat::R8,
        TextureFormat::R32F,
        TextureFormat::Invalid,
    ];

    /// Size in bytes of one texel
    ///
    /// # Errors
    ///
    /// `Error::UnknownTextureFormat` for `Invalid`.
    pub fn size_bytes(self) -> Result<usize> {
        let size = match self {
            TextureFormat::Rgba8 | TextureFormat::Srgba => size_of::<u32>(),
            TextureFormat::Rgba32F => size_of::<Vec4>(),
            TextureFormat::Rgb8 | TextureFormat::Srgb => size_of::<[u8; 3]>(),
            TextureFormat::Rgb32F => size_of::<Vec3>(),
            TextureFormat::R8 => size_of::<u8>(),
            TextureFormat::R32F => size_of::<f32>(),
            TextureFormat::Invalid => return Err(unknown(self.into())),
        };
        Ok(size)
    }

    /// Short lowercase name, used in diagnostics
    pub fn name(self) -> Result<&'static str> {
        let name = match self {
            TextureFormat::Rgba8 => "rgba8",
            TextureFormat::Srgba => "srgba",
            TextureFormat::Rgba32F => "rgba32f",
            TextureFormat::Rgb8 => "rgb8",
            TextureFormat::Srgb => "srgb",
            TextureFormat::Rgb32F => "rgb32f",
            TextureFormat::R8 => "r8",
            TextureFormat::R32F => "r32f",
            TextureFormat::Invalid => return Err(unknown(self.into())),
        };
        Ok(name)
    }

    /// Whether the color channels are sRGB encoded
    pub fn is_srgb(self) -> bool {
        matches!(self, TextureFormat::Srgba | TextureFormat::Srgb)
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureFormat::Invalid => f.write_str("invalid"),
            other => f.write_str(other.name().unwrap_or("invalid")),
        }
    }
}

fn unknown(raw: u8) -> Error {
    crate::osp_error!("osp::texture_format", "Unknown texture format {}", raw);
    Error::UnknownTextureFormat(i32::from(raw))
}

/// Texel size for a raw ABI ordinal
pub fn texture_size_of_raw(raw: u8) -> Result<usize> {
    TextureFormat::try_from(raw)
        .map_err(|_| unknown(raw))?
        .size_bytes()
}

#[cfg(test)]
#[path = "texture_format_tests.rs"]
mod tests;
