//! Data type tags
//!
//! Closed enumeration of the element kinds that can cross the engine API,
//! with their byte sizes and canonical names. Sizes, names and the parse
//! table are exhaustive matches, so a new tag cannot compile until all three
//! agree on it.

use std::fmt;
use std::mem::size_of;
use std::os::raw::c_void;
use glam::{I64Vec2, I64Vec3, I64Vec4, IVec2, IVec3, IVec4, U64Vec2, U64Vec3, U64Vec4,
           UVec2, UVec3, UVec4, Vec2, Vec3, Vec3A, Vec4};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use crate::error::{Error, Result};

/// Element kind of a data buffer or parameter
///
/// Ordinals are part of the engine ABI and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum DataType {
    /// Device handle
    Device = 100,

    /// Untyped pointer
    VoidPtr = 200,

    // Object handles
    Object = 1000,
    Camera,
    Data,
    FrameBuffer,
    Geometry,
    Light,
    Material,
    Model,
    Renderer,
    Texture,
    TransferFunction,
    Volume,
    PixelOp,

    /// Pointer to a null-terminated string
    String = 1500,

    // Signed 8-bit
    Char = 2000,

    // Unsigned 8-bit
    UChar = 2500,
    UChar2,
    UChar3,
    UChar4,

    // 16-bit
    Short = 3000,
    UShort = 3500,

    // Signed 32-bit
    Int = 4000,
    Int2,
    Int3,
    Int4,

    // Unsigned 32-bit
    UInt = 4500,
    UInt2,
    UInt3,
    UInt4,

    // Signed 64-bit
    Long = 5000,
    Long2,
    Long3,
    Long4,

    // Unsigned 64-bit
    ULong = 5500,
    ULong2,
    ULong3,
    ULong4,

    // 32-bit float
    Float = 6000,
    Float2,
    Float3,
    Float4,
    /// 3-component float padded to 16 bytes
    Float3A,

    // 64-bit float
    Double = 7000,

    /// Sentinel for unrecognised names; has no size and no name
    Unknown = 22222,
}

impl DataType {
    /// Every tag, the unknown sentinel last
    pub const ALL: [DataType; 46] = [
        DataType::Device,
        DataType::VoidPtr,
        DataType::Object,
        DataType::Camera,
        DataType::Data,
        DataType::FrameBuffer,
        DataType::Geometry,
        DataType::Light,
        DataType::Material,
        DataType::Model,
        DataType::Renderer,
        DataType::Texture,
        DataType::TransferFunction,
        DataType::Volume,
        DataType::PixelOp,
        DataType::String,
        DataType::Char,
        DataType::UChar,
        DataType::UChar2,
        DataType::UChar3,
        DataType::UChar4,
        DataType::Short,
        DataType::UShort,
        DataType::Int,
        DataType::Int2,
        DataType::Int3,
        DataType::Int4,
        DataType::UInt,
        DataType::UInt2,
        DataType::UInt3,
        DataType::UInt4,
        DataType::Long,
        DataType::Long2,
        DataType::Long3,
        DataType::Long4,
        DataType::ULong,
        DataType::ULong2,
        DataType::ULong3,
        DataType::ULong4,
        DataType::Float,
        DataType::Float2,
        DataType::Float3,
        DataType::Float4,
        DataType::Float3A,
        DataType::Double,
        DataType::Unknown,
    ];

    /// Size in bytes of one element of this type
    ///
    /// # Errors
    ///
    /// `Error::UnknownDataType` for the `Unknown` sentinel.
    pub fn size_bytes(self) -> Result<usize> {
        let size = match self {
            DataType::Device
            | DataType::VoidPtr
            | DataType::Object
            | DataType::Camera
            | DataType::Data
            | DataType::FrameBuffer
            | DataType::Geometry
            | DataType::Light
            | DataType::Material
            | DataType::Model
            | DataType::Renderer
            | DataType::Texture
            | DataType::TransferFunction
            | DataType::Volume
            | DataType::PixelOp
            | DataType::String => size_of::<*const c_void>(),
            DataType::Char => size_of::<i8>(),
            DataType::UChar => size_of::<u8>(),
            DataType::UChar2 => size_of::<[u8; 2]>(),
            DataType::UChar3 => size_of::<[u8; 3]>(),
            DataType::UChar4 => size_of::<[u8; 4]>(),
            DataType::Short => size_of::<i16>(),
            DataType::UShort => size_of::<u16>(),
            DataType::Int => size_of::<i32>(),
            DataType::Int2 => size_of::<IVec2>(),
            DataType::Int3 => size_of::<IVec3>(),
            DataType::Int4 => size_of::<IVec4>(),
            DataType::UInt => size_of::<u32>(),
            DataType::UInt2 => size_of::<UVec2>(),
            DataType::UInt3 => size_of::<UVec3>(),
            DataType::UInt4 => size_of::<UVec4>(),
            DataType::Long => size_of::<i64>(),
            DataType::Long2 => size_of::<I64Vec2>(),
            DataType::Long3 => size_of::<I64Vec3>(),
            DataType::Long4 => size_of::<I64Vec4>(),
            DataType::ULong => size_of::<u64>(),
            DataType::ULong2 => size_of::<U64Vec2>(),
            DataType::ULong3 => size_of::<U64Vec3>(),
            DataType::ULong4 => size_of::<U64Vec4>(),
            DataType::Float => size_of::<f32>(),
            DataType::Float2 => size_of::<Vec2>(),
            DataType::Float3 => size_of::<Vec3>(),
            DataType::Float4 => size_of::<Vec4>(),
            DataType::Float3A => size_of::<Vec3A>(),
            DataType::Double => size_of::<f64>(),
            DataType::Unknown => return Err(unknown(self.into())),
        };
        Ok(size)
    }

    /// Canonical lowercase name of this type
    ///
    /// # Errors
    ///
    /// `Error::UnknownDataType` for the `Unknown` sentinel.
    pub fn name(self) -> Result<&'static str> {
        let name = match self {
            DataType::Device => "device",
            DataType::VoidPtr => "void_ptr",
            DataType::Object => "object",
            DataType::Camera => "camera",
            DataType::Data => "data",
            DataType::FrameBuffer => "framebuffer",
            DataType::Geometry => "geometry",
            DataType::Light => "light",
            DataType::Material => "material",
            DataType::Model => "model",
            DataType::Renderer => "renderer",
            DataType::Texture => "texture",
            DataType::TransferFunction => "transfer_function",
            DataType::Volume => "volume",
            DataType::PixelOp => "pixel_op",
            DataType::String => "string",
            DataType::Char => "char",
            DataType::UChar => "uchar",
            DataType::UChar2 => "uchar2",
            DataType::UChar3 => "uchar3",
            DataType::UChar4 => "uchar4",
            DataType::Short => "short",
            DataType::UShort => "ushort",
            DataType::Int => "int",
            DataType::Int2 => "int2",
            DataType::Int3 => "int3",
            DataType::Int4 => "int4",
            DataType::UInt => "uint",
            DataType::UInt2 => "uint2",
            DataType::UInt3 => "uint3",
            DataType::UInt4 => "uint4",
            DataType::Long => "long",
            DataType::Long2 => "long2",
            DataType::Long3 => "long3",
            DataType::Long4 => "long4",
            DataType::ULong => "ulong",
            DataType::ULong2 => "ulong2",
            DataType::ULong3 => "ulong3",
            DataType::ULong4 => "ulong4",
            DataType::Float => "float",
            DataType::Float2 => "float2",
            DataType::Float3 => "float3",
            DataType::Float4 => "float4",
            DataType::Float3A => "float3a",
            DataType::Double => "double",
            DataType::Unknown => return Err(unknown(self.into())),
        };
        Ok(name)
    }

    /// Parse a canonical name back to its tag
    ///
    /// Only the primitive numeric subset is parseable. Anything else,
    /// including `None` and the empty string, yields `DataType::Unknown`.
    pub fn from_name(name: Option<&str>) -> DataType {
        match name {
            Some("char") => DataType::Char,
            Some("double") => DataType::Double,
            Some("float") => DataType::Float,
            Some("float2") => DataType::Float2,
            Some("float3") => DataType::Float3,
            Some("float4") => DataType::Float4,
            Some("int") => DataType::Int,
            Some("int2") => DataType::Int2,
            Some("int3") => DataType::Int3,
            Some("int4") => DataType::Int4,
            Some("uchar") => DataType::UChar,
            Some("uchar2") => DataType::UChar2,
            Some("uchar3") => DataType::UChar3,
            Some("uchar4") => DataType::UChar4,
            Some("short") => DataType::Short,
            Some("ushort") => DataType::UShort,
            Some("uint") => DataType::UInt,
            Some("uint2") => DataType::UInt2,
            Some("uint3") => DataType::UInt3,
            Some("uint4") => DataType::UInt4,
            _ => DataType::Unknown,
        }
    }

    /// Whether the type is an opaque handle rather than numeric data
    pub fn is_handle(self) -> bool {
        matches!(
            self,
            DataType::Device
                | DataType::VoidPtr
                | DataType::Object
                | DataType::Camera
                | DataType::Data
                | DataType::FrameBuffer
                | DataType::Geometry
                | DataType::Light
                | DataType::Material
                | DataType::Model
                | DataType::Renderer
                | DataType::Texture
                | DataType::TransferFunction
                | DataType::Volume
                | DataType::PixelOp
                | DataType::String
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Unknown => f.write_str("unknown"),
            other => f.write_str(other.name().unwrap_or("unknown")),
        }
    }
}

fn unknown(raw: i32) -> Error {
    crate::osp_error!("osp::data_type", "Unknown data type {}", raw);
    Error::UnknownDataType(raw)
}

fn from_raw(raw: i32) -> Result<DataType> {
    DataType::try_from(raw).map_err(|_| unknown(raw))
}

/// Size in bytes for a raw ABI ordinal
///
/// Fails for the unknown sentinel and for values outside the enumeration.
pub fn size_of_raw(raw: i32) -> Result<usize> {
    from_raw(raw)?.size_bytes()
}

/// Canonical name for a raw ABI ordinal
pub fn name_of_raw(raw: i32) -> Result<&'static str> {
    from_raw(raw)?.name()
}

// Engine ABI layout of the vector element kinds
const _: () = assert!(size_of::<Vec3>() == 12);
const _: () = assert!(size_of::<Vec3A>() == 16);
const _: () = assert!(size_of::<I64Vec3>() == 24);

#[cfg(test)]
#[path = "data_type_tests.rs"]
mod tests;
