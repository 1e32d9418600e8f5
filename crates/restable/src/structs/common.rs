use std::fmt;

use winnow::binary::{le_u8, le_u16, le_u32};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;

use crate::errors::DecodeError;

/// See: https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/libs/androidfw/include/androidfw/ResourceTypes.h;l=237
#[derive(Debug, PartialEq, Default, Eq, Clone, Copy)]
#[repr(u16)]
pub enum ResourceType {
    #[default]
    Null = 0x0000,
    StringPool = 0x0001,
    Table = 0x0002,
    Xml = 0x0003,

    // Chunk types in TableType
    TablePackage = 0x0200,
    TableType = 0x0201,
    TableTypeSpec = 0x0202,
    TableLibrary = 0x0203,
    TableOverlayable = 0x0204,
    TableOverlayablePolicy = 0x0205,
    TableStagedAlias = 0x0206,

    Unknown(u16),
}

impl From<u16> for ResourceType {
    fn from(value: u16) -> Self {
        match value {
            0x0000 => ResourceType::Null,
            0x0001 => ResourceType::StringPool,
            0x0002 => ResourceType::Table,
            0x0003 => ResourceType::Xml,
            0x0200 => ResourceType::TablePackage,
            0x0201 => ResourceType::TableType,
            0x0202 => ResourceType::TableTypeSpec,
            0x0203 => ResourceType::TableLibrary,
            0x0204 => ResourceType::TableOverlayable,
            0x0205 => ResourceType::TableOverlayablePolicy,
            0x0206 => ResourceType::TableStagedAlias,
            other => ResourceType::Unknown(other),
        }
    }
}

impl ResourceType {
    pub fn raw(&self) -> u16 {
        match self {
            ResourceType::Null => 0x0000,
            ResourceType::StringPool => 0x0001,
            ResourceType::Table => 0x0002,
            ResourceType::Xml => 0x0003,
            ResourceType::TablePackage => 0x0200,
            ResourceType::TableType => 0x0201,
            ResourceType::TableTypeSpec => 0x0202,
            ResourceType::TableLibrary => 0x0203,
            ResourceType::TableOverlayable => 0x0204,
            ResourceType::TableOverlayablePolicy => 0x0205,
            ResourceType::TableStagedAlias => 0x0206,
            ResourceType::Unknown(v) => *v,
        }
    }
}

/// Header that appears at the front of every data chunk in a resource
///
/// See: https://cs.android.com/android/platform/superproject/+/android-latest-release:frameworks/base/libs/androidfw/include/androidfw/ResourceTypes.h;l=220
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResChunkHeader {
    /// Type identifier for this chunk. The meaning of this value depends on the containing chunk.
    pub type_: ResourceType,

    /// Size of the chunk header (in bytes).  Adding this value to
    /// the address of the chunk allows you to find its associated data
    /// (if any).
    pub header_size: u16,

    /// Total size of this chunk (in bytes).  This is the chunkSize plus
    /// the size of any data associated with the chunk.
    pub size: u32,
}

impl ResChunkHeader {
    #[inline]
    pub fn parse(input: &mut &[u8]) -> ModalResult<ResChunkHeader> {
        (le_u16, le_u16, le_u32)
            .map(|(type_, header_size, size)| ResChunkHeader {
                type_: ResourceType::from(type_),
                header_size,
                size,
            })
            .parse_next(input)
    }

    /// Check `size >= header_size >= 8` and that the chunk fits into `available` bytes
    pub fn validate(&self, offset: usize, available: usize) -> Result<(), DecodeError> {
        let header_size = self.header_size as usize;
        let size = self.size as usize;

        if header_size < Self::size_of() || size < header_size || size > available {
            return Err(DecodeError::InvalidHeader {
                offset,
                type_: self.type_.raw(),
                header_size: self.header_size,
                size: self.size,
            });
        }

        Ok(())
    }

    /// Get the size of the data without taking into account the size of the header
    #[inline(always)]
    pub fn content_size(&self) -> u32 {
        self.size.saturating_sub(self.header_size as u32)
    }

    /// Get the size of this structure in bytes
    #[inline(always)]
    pub const fn size_of() -> usize {
        // 2 bytes - ResourceTypes
        // 2 bytes - header_size
        // 4 bytes - size
        2 + 2 + 4
    }
}

/// Run a fixed-layout parser over `input`, turning a short read into [DecodeError::Parse]
pub(crate) fn parse_fixed<'a, T>(
    mut input: &'a [u8],
    what: &'static str,
    mut parser: impl Parser<&'a [u8], T, ErrMode<ContextError>>,
) -> Result<T, DecodeError> {
    parser
        .parse_next(&mut input)
        .map_err(|_| DecodeError::Parse(what))
}

/// Decode a NUL-terminated, NUL-padded UTF-16 name field
pub(crate) fn utf16_name(raw: &[u8]) -> String {
    let utf16_str: Vec<u16> = raw
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .take_while(|&c| c != 0)
        .collect();

    String::from_utf16_lossy(&utf16_str)
}

/// Type of the data value
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum ResourceValueType {
    /// The `data` is either 0 or 1, specifying this resource is either undefined or empty, respectively.
    Null = 0x00,

    /// The `data` holds a ResTable_ref, a reference to another resource table entry.
    Reference = 0x01,

    /// The `data` holds an attribute resource identifier.
    Attribute = 0x02,

    /// The `data` holds an index into the containing resource table's global value string pool.
    String = 0x03,

    /// The `data` holds a single-precision floating point number.
    Float = 0x04,

    /// The `data` holds a complex number encoding a dimension value, such as "100in".
    Dimension = 0x05,

    /// The `data` holds a complex number encoding a fraction of a container.
    Fraction = 0x06,

    /// The `data` holds a dynamic ResTable_ref, which needs to be resolved before it can be used
    DynamicReference = 0x07,

    /// The `data` holds an attribute resource identifier, which needs to be resolved before it can be used
    DynamicAttribute = 0x08,

    /// The `data` is a raw integer value of the form n..n.
    Dec = 0x10,

    /// The `data` is a raw integer value of the form 0xn..n.
    Hex = 0x11,

    /// The `data` is either 0 or 1, for input "false" or "true" respectively.
    Boolean = 0x12,

    /// The `data` is a raw integer value of the form #aarrggbb.
    ColorArgb8 = 0x1c,

    /// The `data` is a raw integer value of the form #rrggbb.
    ColorRgb8 = 0x1d,

    /// The `data` is a raw integer value of the form #argb.
    ColorArgb4 = 0x1e,

    /// The `data` is a raw integer value of the form #rgb.
    ColorRgb4 = 0x1f,

    /// Unknown type value
    Unknown(u8),
}

impl From<u8> for ResourceValueType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => ResourceValueType::Null,
            0x01 => ResourceValueType::Reference,
            0x02 => ResourceValueType::Attribute,
            0x03 => ResourceValueType::String,
            0x04 => ResourceValueType::Float,
            0x05 => ResourceValueType::Dimension,
            0x06 => ResourceValueType::Fraction,
            0x07 => ResourceValueType::DynamicReference,
            0x08 => ResourceValueType::DynamicAttribute,
            0x10 => ResourceValueType::Dec,
            0x11 => ResourceValueType::Hex,
            0x12 => ResourceValueType::Boolean,
            0x1c => ResourceValueType::ColorArgb8,
            0x1d => ResourceValueType::ColorRgb8,
            0x1e => ResourceValueType::ColorArgb4,
            0x1f => ResourceValueType::ColorRgb4,
            v => ResourceValueType::Unknown(v),
        }
    }
}

impl ResourceValueType {
    pub fn raw(&self) -> u8 {
        match self {
            ResourceValueType::Null => 0x00,
            ResourceValueType::Reference => 0x01,
            ResourceValueType::Attribute => 0x02,
            ResourceValueType::String => 0x03,
            ResourceValueType::Float => 0x04,
            ResourceValueType::Dimension => 0x05,
            ResourceValueType::Fraction => 0x06,
            ResourceValueType::DynamicReference => 0x07,
            ResourceValueType::DynamicAttribute => 0x08,
            ResourceValueType::Dec => 0x10,
            ResourceValueType::Hex => 0x11,
            ResourceValueType::Boolean => 0x12,
            ResourceValueType::ColorArgb8 => 0x1c,
            ResourceValueType::ColorRgb8 => 0x1d,
            ResourceValueType::ColorArgb4 => 0x1e,
            ResourceValueType::ColorRgb4 => 0x1f,
            ResourceValueType::Unknown(v) => *v,
        }
    }
}

impl fmt::Display for ResourceValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceValueType::Null => write!(f, "null"),
            ResourceValueType::Reference => write!(f, "reference"),
            ResourceValueType::Attribute => write!(f, "attribute"),
            ResourceValueType::String => write!(f, "string"),
            ResourceValueType::Float => write!(f, "float"),
            ResourceValueType::Dimension => write!(f, "dimension"),
            ResourceValueType::Fraction => write!(f, "fraction"),
            ResourceValueType::DynamicReference => write!(f, "dynamic-reference"),
            ResourceValueType::DynamicAttribute => write!(f, "dynamic-attribute"),
            ResourceValueType::Dec => write!(f, "int-dec"),
            ResourceValueType::Hex => write!(f, "int-hex"),
            ResourceValueType::Boolean => write!(f, "boolean"),
            ResourceValueType::ColorArgb8 => write!(f, "color-argb8"),
            ResourceValueType::ColorRgb8 => write!(f, "color-rgb8"),
            ResourceValueType::ColorArgb4 => write!(f, "color-argb4"),
            ResourceValueType::ColorRgb4 => write!(f, "color-rgb4"),
            ResourceValueType::Unknown(v) => write!(f, "0x{:02x}", v),
        }
    }
}

/// Representation of a value in a resource, supplying type information
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResourceValue {
    /// Number of bytes in this structure
    pub size: u16,

    /// Always set to 0
    pub res0: u8,

    /// Type of the data value
    pub data_type: ResourceValueType,

    /// Data itself
    pub data: u32,
}

impl ResourceValue {
    #[inline]
    pub fn parse(input: &mut &[u8]) -> ModalResult<ResourceValue> {
        (le_u16, le_u8, le_u8, le_u32)
            .map(|(size, res0, data_type, data)| ResourceValue {
                size,
                res0,
                data,
                data_type: ResourceValueType::from(data_type),
            })
            .parse_next(input)
    }

    /// Get the size of this structure in bytes
    #[inline(always)]
    pub const fn size_of() -> usize {
        2 + 1 + 1 + 4
    }

    #[inline(always)]
    pub fn is_reference(&self) -> bool {
        matches!(
            self.data_type,
            ResourceValueType::Reference | ResourceValueType::DynamicReference
        )
    }
}

/// Split resource id into package id, type id (1-based) and entry index
#[inline(always)]
pub fn split_resource_id(id: u32) -> (u8, u8, u16) {
    (
        (id >> 24) as u8,
        ((id >> 16) & 0xff) as u8,
        (id & 0xffff) as u16,
    )
}

/// Generate Resource Id based on algorithm from AOSP
///
/// [Source Code](https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/tools/aapt/ResourceTable.h;l=224)
#[inline(always)]
pub fn make_resource_id(package_id: u8, type_id: u8, entry_index: u16) -> u32 {
    entry_index as u32 | ((type_id as u32) << 16) | ((package_id as u32) << 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_header_validate() {
        let header = ResChunkHeader {
            type_: ResourceType::Table,
            header_size: 12,
            size: 64,
        };

        assert!(header.validate(0, 64).is_ok());
        assert!(header.validate(0, 63).is_err());

        let bad = ResChunkHeader {
            header_size: 4,
            ..header
        };
        assert!(matches!(
            bad.validate(0, 64),
            Err(DecodeError::InvalidHeader { header_size: 4, .. })
        ));
    }

    #[test]
    fn value_type_raw_round() {
        for raw in [0x00u8, 0x01, 0x07, 0x08, 0x12, 0x1f, 0x42] {
            assert_eq!(ResourceValueType::from(raw).raw(), raw);
        }
    }

    #[test]
    fn resource_id_split() {
        let id = make_resource_id(0x7f, 0x02, 0x0010);
        assert_eq!(id, 0x7f020010);
        assert_eq!(split_resource_id(id), (0x7f, 0x02, 0x0010));
    }
}
