//! Typed data arrays
//!
//! A `DataArray` is a byte buffer tagged with its element `DataType`, checked
//! against the registry sizes before it is handed across the engine API.

use std::borrow::Cow;
use bitflags::bitflags;
use bytemuck::Pod;
use glam::{IVec2, IVec3, IVec4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};
use crate::data_type::DataType;
use crate::error::{Error, Result};

bitflags! {
    /// Creation flags for data arrays
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DataFlags: u32 {
        /// Borrow the caller's buffer instead of copying it
        const SHARED_BUFFER = 1 << 0;
    }
}

/// Rust element types with a fixed engine data type
pub trait DataElement: Pod {
    const DATA_TYPE: DataType;
}

macro_rules! impl_data_element {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(
            impl DataElement for $ty {
                const DATA_TYPE: DataType = DataType::$tag;
            }
        )*
    };
}

impl_data_element! {
    i8 => Char,
    u8 => UChar,
    [u8; 2] => UChar2,
    [u8; 3] => UChar3,
    [u8; 4] => UChar4,
    i16 => Short,
    u16 => UShort,
    i32 => Int,
    IVec2 => Int2,
    IVec3 => Int3,
    IVec4 => Int4,
    u32 => UInt,
    UVec2 => UInt2,
    UVec3 => UInt3,
    UVec4 => UInt4,
    i64 => Long,
    u64 => ULong,
    f32 => Float,
    Vec2 => Float2,
    Vec3 => Float3,
    Vec4 => Float4,
    f64 => Double,
}

/// Byte buffer of `num_items` elements of one data type
#[derive(Debug, Clone)]
pub struct DataArray<'a> {
    num_items: usize,
    data_type: DataType,
    flags: DataFlags,
    bytes: Cow<'a, [u8]>,
}

impl<'a> DataArray<'a> {
    /// Create a data array from raw bytes
    ///
    /// The bytes are copied unless `DataFlags::SHARED_BUFFER` is set.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownDataType` if `data_type` is `Unknown`
    /// - `Error::InvalidBufferSize` if `bytes` is not exactly
    ///   `num_items * data_type.size_bytes()` long
    pub fn new(
        num_items: usize,
        data_type: DataType,
        bytes: &'a [u8],
        flags: DataFlags,
    ) -> Result<Self> {
        let expected = num_items
            .checked_mul(data_type.size_bytes()?)
            .ok_or(Error::InvalidBufferSize { expected: usize::MAX, actual: bytes.len() })?;

        if bytes.len() != expected {
            crate::osp_error!(
                "osp::data",
                "{} items of {} need {} bytes, got {}",
                num_items, data_type, expected, bytes.len()
            );
            return Err(Error::InvalidBufferSize { expected, actual: bytes.len() });
        }

        let bytes = if flags.contains(DataFlags::SHARED_BUFFER) {
            Cow::Borrowed(bytes)
        } else {
            Cow::Owned(bytes.to_vec())
        };

        Ok(Self { num_items, data_type, flags, bytes })
    }

    /// Create a data array from typed elements
    pub fn from_slice<T: DataElement>(items: &'a [T], flags: DataFlags) -> Result<Self> {
        Self::new(items.len(), T::DATA_TYPE, bytemuck::cast_slice(items), flags)
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn flags(&self) -> DataFlags {
        self.flags
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total size in bytes
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the array borrows the caller's buffer
    pub fn is_shared(&self) -> bool {
        matches!(self.bytes, Cow::Borrowed(_))
    }

    /// Detach from the caller's buffer
    pub fn into_owned(self) -> DataArray<'static> {
        DataArray {
            num_items: self.num_items,
            data_type: self.data_type,
            flags: self.flags - DataFlags::SHARED_BUFFER,
            bytes: Cow::Owned(self.bytes.into_owned()),
        }
    }

    /// Debugging checksum of the contents, see `compute_checksum`
    pub fn checksum(&self) -> i64 {
        compute_checksum(&self.bytes)
    }
}

/// Debugging checksum over a byte range
///
/// Sums `(i + 13) * word_i` over the native-endian 64-bit words of `bytes`.
/// A trailing partial word is ignored.
pub fn compute_checksum(bytes: &[u8]) -> i64 {
    bytes
        .chunks_exact(8)
        .enumerate()
        .fold(0i64, |sum, (i, chunk)| {
            let word: i64 = bytemuck::pod_read_unaligned(chunk);
            sum.wrapping_add((i as i64 + 13).wrapping_mul(word))
        })
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
