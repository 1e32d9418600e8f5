use std::fmt;

use bitflags::bitflags;
use winnow::binary::{le_u16, le_u32, u8};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take;

use crate::errors::DecodeError;
use crate::structs::{
    Chunk, ChunkData, ResChunkHeader, ResTableConfig, ResTableConfigFlags, ResourceType,
    ResourceValue, ResourceValueType, StringPool, parse_fixed, utf16_name,
};

/// Run `parser` over `input`, naming the problem with `reason` on a short read
fn read_fixed<'a, T>(
    input: &mut &'a [u8],
    reason: &'static str,
    mut parser: impl Parser<&'a [u8], T, ErrMode<ContextError>>,
) -> Result<T, &'static str> {
    parser.parse_next(input).map_err(|_| reason)
}

/// Header of a package chunk
///
/// [Source code](https://cs.android.com/android/platform/superproject/+/android-latest-release:frameworks/base/libs/androidfw/include/androidfw/ResourceTypes.h;l=919)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResTablePackageHeader {
    /// If this is a base package, its ID.
    ///
    /// Package IDs start at 1 (corresponding to the value of the package bits in a resource identifier).
    /// 0 means this is a shared library and gets its id assigned at runtime.
    pub id: u32,

    /// Actual name of this package
    pub name: String,

    /// Offset to [StringPool] defining the resource type symbol table
    pub type_strings: u32,

    /// Last index into `type_strings` that is for public use by others
    pub last_public_type: u32,

    /// Offset to [StringPool] defining the resource key symbol table
    pub key_strings: u32,

    /// Last index into `key_strings` that is for public use by others
    pub last_public_key: u32,

    /// Type ids in this package are shifted by this value when naming them
    ///
    /// Old versions of the structure don't have this field.
    pub type_id_offset: u32,
}

impl ResTablePackageHeader {
    /// Header fields without `type_id_offset`
    const LEGACY_FIELDS: usize = 4 + 256 + 4 * 4;

    fn parse(fields: &[u8]) -> Result<ResTablePackageHeader, DecodeError> {
        if fields.len() < Self::LEGACY_FIELDS {
            return Err(DecodeError::Package("header too small"));
        }

        let (id, name, type_strings, last_public_type, key_strings, last_public_key) = parse_fixed(
            fields,
            "package header",
            (le_u32, take(256usize), le_u32, le_u32, le_u32, le_u32),
        )?;

        let type_id_offset = match fields.get(Self::LEGACY_FIELDS..Self::LEGACY_FIELDS + 4) {
            Some(raw) => parse_fixed(raw, "package type id offset", le_u32)?,
            None => 0,
        };

        Ok(ResTablePackageHeader {
            id,
            name: utf16_name(name),
            type_strings,
            last_public_type,
            key_strings,
            last_public_key,
            type_id_offset,
        })
    }

    /// Get size in bytes of the newest structure
    #[inline(always)]
    pub const fn size_of() -> usize {
        // header - ResChunkHeader
        // 4 bytes - id
        // 256 bytes - name
        // 4 bytes - type_strings
        // 4 bytes - last_public_type
        // 4 bytes - key_strings
        // 4 bytes - last_public_key
        // 4 bytes - type_id_offset
        ResChunkHeader::size_of() + 4 + 256 + 4 + 4 + 4 + 4 + 4
    }
}

/// A collection of resource data types within a package
///
/// Followed by its type and key string pools and one or more [ResTableType] and
/// [ResTableTypeSpec] chunks containing the entry values for each resource type.
#[derive(Debug, Clone)]
pub struct ResTablePackage {
    pub chunk: ChunkData,
    pub header: ResTablePackageHeader,
    pub type_strings: StringPool,
    pub key_strings: StringPool,
}

impl ResTablePackage {
    pub fn parse(chunk: ChunkData) -> Result<ResTablePackage, DecodeError> {
        let header = ResTablePackageHeader::parse(chunk.header_fields())?;

        if header.id >= 256 {
            return Err(DecodeError::Package("package id out of range"));
        }

        let type_strings = Self::pool_at(&chunk, header.type_strings)?;
        let key_strings = Self::pool_at(&chunk, header.key_strings)?;

        Ok(ResTablePackage {
            chunk,
            header,
            type_strings,
            key_strings,
        })
    }

    fn pool_at(chunk: &ChunkData, offset: u32) -> Result<StringPool, DecodeError> {
        let size = chunk.header.size;

        if offset < chunk.header.header_size as u32 || offset >= size {
            return Err(DecodeError::Package("string pool offset out of range"));
        }
        if offset % 4 != 0 {
            return Err(DecodeError::Package("string pool offset misaligned"));
        }

        let start = chunk.offset() + offset as usize;
        let pool = ChunkData::read(chunk.buffer(), start, chunk.offset() + size as usize)?;
        if pool.header.type_ != ResourceType::StringPool {
            return Err(DecodeError::Package("string pool offset points to another chunk"));
        }

        StringPool::parse(pool)
    }

    /// Package id as stored in the chunk, validated to fit into a byte
    #[inline]
    pub fn id(&self) -> u8 {
        self.header.id as u8
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.header.name
    }

    /// Typed chunks following the string pools
    ///
    /// Items are errors for malformed chunks, the iteration stops after a chunk
    /// whose header can't be trusted.
    pub fn chunks(&self) -> impl Iterator<Item = Result<Chunk, DecodeError>> + '_ {
        let pools = [
            self.type_strings.chunk().offset(),
            self.key_strings.chunk().offset(),
        ];

        self.chunk
            .children()
            .filter(move |child| match child {
                Ok(chunk) => !pools.contains(&chunk.offset()),
                Err(_) => true,
            })
            .map(|child| child.and_then(Chunk::from_data))
    }

    /// Name of the type with 1-based `type_id`
    pub fn type_name(&self, type_id: u8) -> Result<String, DecodeError> {
        let index = (type_id as u32)
            .saturating_sub(1)
            .saturating_sub(self.header.type_id_offset);
        self.type_strings.get_string(index)
    }

    pub fn key_name(&self, key: u32) -> Result<String, DecodeError> {
        self.key_strings.get_string(key)
    }
}

/// A specification of the resources defined by a particular type
///
/// There should be one of these chunks for each resource type.
///
/// [Source code](https://cs.android.com/android/platform/superproject/+/android-latest-release:frameworks/base/libs/androidfw/include/androidfw/ResourceTypes.h;l=1448)
#[derive(Debug, Clone)]
pub struct ResTableTypeSpec {
    pub chunk: ChunkData,

    /// The type identifier this chunk is holding.
    /// Type IDs start at 1 (corresponding to the value of the type bits in a resource identifier).
    /// 0 is invalid.
    pub id: u8,

    /// Must be 0, intentionally not checked
    pub res0: u8,

    /// Used to be reserved, if >0 specifies the number of [ResTableType] entries for this spec
    pub types_count: u16,

    /// Number of uint32_t entry configuration masks that follow
    pub entry_count: u32,
}

impl ResTableTypeSpec {
    pub fn parse(chunk: ChunkData) -> Result<ResTableTypeSpec, DecodeError> {
        let (id, res0, types_count, entry_count) = parse_fixed(
            chunk.header_fields(),
            "type spec header",
            (u8, u8, le_u16, le_u32),
        )?;

        if id == 0 {
            return Err(DecodeError::TypeSpec("type id of 0"));
        }

        let flags_end = chunk.header.header_size as u64 + 4 * entry_count as u64;
        if flags_end > chunk.header.size as u64 {
            return Err(DecodeError::TypeSpec("flags array exceeds chunk"));
        }

        Ok(ResTableTypeSpec {
            chunk,
            id,
            res0,
            types_count,
            entry_count,
        })
    }

    /// Configuration mask of the entry at `index`, `None` past the end of the array
    pub fn flags(&self, index: u16) -> Option<ResTableConfigFlags> {
        if index as u32 >= self.entry_count {
            return None;
        }

        let start = self.chunk.header.header_size as usize + 4 * index as usize;
        let raw = self.chunk.bytes().get(start..start + 4)?;
        let bits = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);

        Some(ResTableConfigFlags::from_bits_retain(bits))
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResTableFlag: u16 {
        /// If set, this is a complex entry, holding a set of name/value mappings.
        const FLAG_COMPLEX = 0x0001;

        /// If set, this resource has been declared public, so libraries are allowed to reference it.
        const FLAG_PUBLIC = 0x0002;

        /// If set, this is a weak resource and may be overridden by strong resources of the same name/type.
        const FLAG_WEAK = 0x0004;

        /// If set, this is a compact entry with data type and value directly encoded in this entry.
        const FLAG_COMPACT = 0x0008;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResTableTypeFlags: u8 {
        /// If set, the entry is sparse, and encodes both the entry ID and offset into each entry,
        /// and a binary search is used to find the key.
        const SPARSE = 0x01;

        /// If set, the offsets to the entries are encoded in 16-bit, real_offset = offset * 4u
        /// An 16-bit offset of 0xffffu means a NO_ENTRY
        const OFFSET16 = 0x02;
    }
}

/// Offset value for an entry that is not defined in this configuration
pub const NO_ENTRY: u32 = 0xFFFF_FFFF;

/// One name/value pair of a complex entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResTableMap {
    /// The resource identifier defining this mapping's name.
    /// For attribute resources, 'name' can be one of the special resource types
    /// to supply meta-data about the attribute; for all other resource types it must be an attribute resource.
    pub name: u32,

    pub value: ResourceValue,
}

impl ResTableMap {
    #[inline(always)]
    pub fn parse(input: &mut &[u8]) -> ModalResult<ResTableMap> {
        (le_u32, ResourceValue::parse)
            .map(|(name, value)| ResTableMap { name, value })
            .parse_next(input)
    }

    #[inline(always)]
    pub const fn size_of() -> usize {
        4 + ResourceValue::size_of()
    }
}

/// Complex entry defining a bag that may inherit from a parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResTableMapEntry {
    /// Number of bytes in the entry header
    pub size: u16,

    /// Flags described in [ResTableFlag]
    pub flags: u16,

    /// Reference to [ResTablePackage::key_strings]
    pub key: u32,

    /// Resource identifier of the parent mapping, or 0 if there is none.
    /// This is always treated as a dynamic reference.
    pub parent: u32,

    pub values: Vec<ResTableMap>,
}

/// Compact entry, only for simple values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResTableEntryCompact {
    /// key index is encoded in 16-bit
    pub key: u16,

    /// Low byte holds [ResTableFlag], high byte the data type
    pub flags: u16,

    /// data is encoded directly in this entry
    pub data: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResTableEntryDefault {
    /// Number of bytes in the entry header
    pub size: u16,

    /// Flags described in [ResTableFlag]
    pub flags: u16,

    /// Reference to [ResTablePackage::key_strings]
    pub key: u32,

    pub value: ResourceValue,
}

/// An entry in the resource table
///
/// [Source code](https://cs.android.com/android/platform/superproject/+/android-latest-release:frameworks/base/libs/androidfw/include/androidfw/ResourceTypes.h;l=1583)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResTableEntry {
    Complex(ResTableMapEntry),
    Compact(ResTableEntryCompact),
    Default(ResTableEntryDefault),
}

impl ResTableEntry {
    /// Size of the entry header, the smallest valid entry
    pub const HEADER_SIZE: usize = 8;

    /// Complex entry header, extended with parent and count
    pub const MAP_HEADER_SIZE: usize = 16;

    /// Decode the entry starting at `data[0]`, `data` must end with its chunk
    pub fn decode(data: &[u8]) -> Result<ResTableEntry, &'static str> {
        let mut input = data;
        let (size, flags, key) =
            read_fixed(&mut input, "entry header exceeds chunk", (le_u16, le_u16, le_u32))?;

        let entry_flags = ResTableFlag::from_bits_truncate(flags);

        if entry_flags.contains(ResTableFlag::FLAG_COMPACT) {
            return Ok(ResTableEntry::Compact(ResTableEntryCompact {
                key: size,
                flags,
                data: key,
            }));
        }

        if (size as usize) < Self::HEADER_SIZE {
            return Err("entry size too small");
        }

        if entry_flags.contains(ResTableFlag::FLAG_COMPLEX) {
            if (size as usize) < Self::MAP_HEADER_SIZE {
                return Err("map entry size too small");
            }

            let mut header = data.get(Self::HEADER_SIZE..).ok_or("map entry exceeds chunk")?;
            let (parent, count) =
                read_fixed(&mut header, "map entry exceeds chunk", (le_u32, le_u32))?;

            let maps_end = size as u64 + count as u64 * ResTableMap::size_of() as u64;
            if maps_end > data.len() as u64 {
                return Err("map entry values exceed chunk");
            }

            let mut maps = &data[size as usize..maps_end as usize];
            let mut values = Vec::with_capacity(count as usize);
            while !maps.is_empty() {
                values.push(read_fixed(
                    &mut maps,
                    "map entry values exceed chunk",
                    ResTableMap::parse,
                )?);
            }

            return Ok(ResTableEntry::Complex(ResTableMapEntry {
                size,
                flags,
                key,
                parent,
                values,
            }));
        }

        let mut value = data.get(size as usize..).ok_or("entry value exceeds chunk")?;
        let value = read_fixed(&mut value, "entry value exceeds chunk", ResourceValue::parse)?;

        Ok(ResTableEntry::Default(ResTableEntryDefault {
            size,
            flags,
            key,
            value,
        }))
    }

    pub fn flags(&self) -> ResTableFlag {
        let raw = match self {
            ResTableEntry::Complex(e) => e.flags,
            ResTableEntry::Compact(e) => e.flags,
            ResTableEntry::Default(e) => e.flags,
        };

        ResTableFlag::from_bits_truncate(raw)
    }

    /// Index into the key string pool
    pub fn key(&self) -> u32 {
        match self {
            ResTableEntry::Complex(e) => e.key,
            ResTableEntry::Compact(e) => e.key as u32,
            ResTableEntry::Default(e) => e.key,
        }
    }

    #[inline]
    pub fn is_complex(&self) -> bool {
        matches!(self, ResTableEntry::Complex(_))
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.flags().contains(ResTableFlag::FLAG_PUBLIC)
    }

    /// Plain value of a simple entry, `None` for bags
    pub fn value(&self) -> Option<ResourceValue> {
        match self {
            ResTableEntry::Complex(_) => None,
            ResTableEntry::Compact(e) => Some(ResourceValue {
                size: ResourceValue::size_of() as u16,
                res0: 0,
                data_type: ResourceValueType::from((e.flags >> 8) as u8),
                data: e.data,
            }),
            ResTableEntry::Default(e) => Some(e.value),
        }
    }
}

/// A collection of resource entries for a specific resource data type and configuration
///
/// Dense types are followed by an array of offsets (u32, or u16 scaled by 4 with
/// [ResTableTypeFlags::OFFSET16]) indexed by entry id. Sparse types hold sorted
/// `(u16 entry id, u16 offset / 4)` pairs instead.
///
/// [Source code](https://cs.android.com/android/platform/superproject/+/android-latest-release:frameworks/base/libs/androidfw/include/androidfw/ResourceTypes.h;l=1500)
#[derive(Clone)]
pub struct ResTableType {
    pub chunk: ChunkData,

    /// The type identifier this chunk is holding, 0 is invalid
    pub id: u8,

    pub flags: ResTableTypeFlags,

    /// Must be 0, intentionally not checked
    pub reserved: u16,

    /// Number of entries in the offsets array
    pub entry_count: u32,

    /// Offset from the chunk start to the entry data
    pub entries_start: u32,

    /// Configuration this collection of entries is designed for
    pub config: ResTableConfig,
}

impl ResTableType {
    pub fn parse(chunk: ChunkData) -> Result<ResTableType, DecodeError> {
        let mut fields = chunk.header_fields();

        let (id, flags, reserved, entry_count, entries_start) = read_fixed(
            &mut fields,
            "header too small",
            (u8, u8, le_u16, le_u32, le_u32),
        )
        .map_err(DecodeError::Type)?;

        let config = ResTableConfig::parse(&mut fields)
            .map_err(|_| DecodeError::Type("configuration exceeds header"))?;

        if id == 0 {
            return Err(DecodeError::Type("type id of 0"));
        }

        let flags = ResTableTypeFlags::from_bits_truncate(flags);
        let size = chunk.header.size as u64;

        if entries_start as u64 > size {
            return Err(DecodeError::Type("entries start past chunk end"));
        }

        let width = if flags.contains(ResTableTypeFlags::OFFSET16)
            && !flags.contains(ResTableTypeFlags::SPARSE)
        {
            2
        } else {
            4
        };
        let offsets_end = chunk.header.header_size as u64 + width * entry_count as u64;
        if offsets_end > size {
            return Err(DecodeError::Type("entry offsets exceed chunk"));
        }

        Ok(ResTableType {
            chunk,
            id,
            flags,
            reserved,
            entry_count,
            entries_start,
            config,
        })
    }

    #[inline]
    pub fn is_sparse(&self) -> bool {
        self.flags.contains(ResTableTypeFlags::SPARSE)
    }

    #[inline]
    pub fn is_offset16(&self) -> bool {
        self.flags.contains(ResTableTypeFlags::OFFSET16)
    }

    fn offsets(&self) -> &[u8] {
        let start = self.chunk.header.header_size as usize;
        &self.chunk.bytes()[start..]
    }

    fn read_u16(raw: &[u8], at: usize) -> Option<u16> {
        raw.get(at..at + 2).map(|b| u16::from_le_bytes([b[0], b[1]]))
    }

    /// Offset of the entry with index `index`, relative to `entries_start`
    ///
    /// `None` if this configuration doesn't define the entry.
    pub fn entry_offset(&self, index: u16) -> Option<u32> {
        let offsets = self.offsets();

        if self.is_sparse() {
            let (mut low, mut high) = (0usize, self.entry_count as usize);
            while low < high {
                let mid = low + (high - low) / 2;
                let entry = Self::read_u16(offsets, mid * 4)?;
                match entry.cmp(&index) {
                    std::cmp::Ordering::Less => low = mid + 1,
                    std::cmp::Ordering::Greater => high = mid,
                    std::cmp::Ordering::Equal => {
                        return Self::read_u16(offsets, mid * 4 + 2).map(|o| o as u32 * 4);
                    }
                }
            }
            return None;
        }

        if index as u32 >= self.entry_count {
            return None;
        }

        if self.is_offset16() {
            return match Self::read_u16(offsets, index as usize * 2)? {
                0xFFFF => None,
                offset => Some(offset as u32 * 4),
            };
        }

        let at = index as usize * 4;
        let raw = offsets.get(at..at + 4)?;
        match u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) {
            NO_ENTRY => None,
            offset => Some(offset),
        }
    }

    /// Whether `index` can be looked up in this chunk at all
    #[inline]
    pub fn covers(&self, index: u16) -> bool {
        self.is_sparse() || (index as u32) < self.entry_count
    }

    /// Decode the entry stored at `offset` from `entries_start`
    ///
    /// The entry must start 4-byte aligned with at least its header inside the chunk.
    pub fn entry(&self, offset: u32) -> Result<ResTableEntry, &'static str> {
        let size = self.chunk.header.size as u64;
        let start = self.entries_start as u64 + offset as u64;

        if start % 4 != 0 {
            return Err("entry offset misaligned");
        }
        if start + ResTableEntry::HEADER_SIZE as u64 > size {
            return Err("entry offset past chunk end");
        }

        ResTableEntry::decode(&self.chunk.bytes()[start as usize..])
    }

    /// Index into the package type strings
    #[inline(always)]
    pub fn type_index(&self) -> u8 {
        self.id.saturating_sub(1)
    }
}

impl fmt::Debug for ResTableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResTableType")
            .field("chunk", &self.chunk)
            .field("id", &self.id)
            .field("flags", &self.flags)
            .field("entry_count", &self.entry_count)
            .field("entries_start", &self.entries_start)
            .field("config", &self.config.to_string())
            .finish()
    }
}

/// A shared library package-id to package name entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResTableLibraryEntry {
    /// The package-id this shared library was assigned at build time
    pub package_id: u32,

    /// The package name of the shared library
    pub package_name: String,
}

impl ResTableLibraryEntry {
    pub fn parse(input: &mut &[u8]) -> ModalResult<ResTableLibraryEntry> {
        (le_u32, take(256usize))
            .map(|(package_id, package_name): (u32, &[u8])| ResTableLibraryEntry {
                package_id,
                package_name: utf16_name(package_name),
            })
            .parse_next(input)
    }

    #[inline(always)]
    pub const fn size_of() -> usize {
        4 + 256
    }
}

/// A package-id to package name mapping for any shared libraries used in this resource table
///
/// The package ids encoded in this resource table may be different than the ids assigned
/// at runtime, they are translated by package name.
///
/// [Source code](https://cs.android.com/android/platform/superproject/main/+/main:frameworks/base/libs/androidfw/include/androidfw/ResourceTypes.h;l=1735)
#[derive(Debug, Clone)]
pub struct ResTableLibrary {
    pub chunk: ChunkData,
}

impl ResTableLibrary {
    pub fn new(chunk: ChunkData) -> ResTableLibrary {
        ResTableLibrary { chunk }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn chunk(raw: Vec<u8>) -> ChunkData {
        let buf: Arc<[u8]> = Arc::from(raw);
        ChunkData::read(&buf, 0, buf.len()).unwrap()
    }

    fn type_chunk(flags: u8, offsets: &[u8], entries: &[u8], entry_count: u32) -> Vec<u8> {
        let header_size = 8 + 12 + 64;
        let entries_start = header_size + offsets.len();
        let size = entries_start + entries.len();

        let mut out = Vec::new();
        out.extend_from_slice(&0x0201u16.to_le_bytes());
        out.extend_from_slice(&(header_size as u16).to_le_bytes());
        out.extend_from_slice(&(size as u32).to_le_bytes());
        out.extend_from_slice(&[1, flags, 0, 0]);
        out.extend_from_slice(&entry_count.to_le_bytes());
        out.extend_from_slice(&(entries_start as u32).to_le_bytes());
        out.extend_from_slice(&64u32.to_le_bytes());
        out.resize(header_size, 0);
        out.extend_from_slice(offsets);
        out.extend_from_slice(entries);
        out
    }

    fn simple_entry(key: u32, data: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&8u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&key.to_le_bytes());
        out.extend_from_slice(&8u16.to_le_bytes());
        out.extend_from_slice(&[0, 0x10]);
        out.extend_from_slice(&data.to_le_bytes());
        out
    }

    #[test]
    fn dense_offsets() {
        let mut offsets = Vec::new();
        offsets.extend_from_slice(&NO_ENTRY.to_le_bytes());
        offsets.extend_from_slice(&0u32.to_le_bytes());
        let ty = ResTableType::parse(chunk(type_chunk(0, &offsets, &simple_entry(3, 42), 2))).unwrap();

        assert_eq!(ty.entry_offset(0), None);
        assert_eq!(ty.entry_offset(1), Some(0));
        assert_eq!(ty.entry_offset(2), None);
        assert!(!ty.covers(2));

        let entry = ty.entry(0).unwrap();
        assert_eq!(entry.key(), 3);
        assert_eq!(entry.value().map(|v| v.data), Some(42));
    }

    #[test]
    fn offset16_offsets() {
        let mut entries = simple_entry(0, 1);
        entries.extend_from_slice(&simple_entry(1, 2));

        let mut offsets = Vec::new();
        offsets.extend_from_slice(&4u16.to_le_bytes());
        offsets.extend_from_slice(&0xFFFFu16.to_le_bytes());
        let ty = ResTableType::parse(chunk(type_chunk(0x02, &offsets, &entries, 2))).unwrap();

        assert_eq!(ty.entry_offset(0), Some(16));
        assert_eq!(ty.entry_offset(1), None);
        assert_eq!(ty.entry(16).unwrap().value().map(|v| v.data), Some(2));
    }

    #[test]
    fn sparse_offsets() {
        let mut entries = simple_entry(0, 1);
        entries.extend_from_slice(&simple_entry(1, 2));

        let mut offsets = Vec::new();
        for (index, offset) in [(2u16, 0u16), (9, 4)] {
            offsets.extend_from_slice(&index.to_le_bytes());
            offsets.extend_from_slice(&offset.to_le_bytes());
        }
        let ty = ResTableType::parse(chunk(type_chunk(0x01, &offsets, &entries, 2))).unwrap();

        assert_eq!(ty.entry_offset(2), Some(0));
        assert_eq!(ty.entry_offset(9), Some(16));
        assert_eq!(ty.entry_offset(3), None);
        assert!(ty.covers(100));
    }

    #[test]
    fn offsets_past_chunk() {
        let raw = type_chunk(0, &0u32.to_le_bytes(), &simple_entry(0, 1), 1000);
        assert!(matches!(
            ResTableType::parse(chunk(raw)),
            Err(DecodeError::Type(_))
        ));
    }

    #[test]
    fn entry_bounds() {
        let ty = ResTableType::parse(chunk(type_chunk(
            0,
            &0u32.to_le_bytes(),
            &simple_entry(0, 1),
            1,
        )))
        .unwrap();

        assert_eq!(ty.entry(2), Err("entry offset misaligned"));
        assert_eq!(ty.entry(16), Err("entry offset past chunk end"));
    }

    #[test]
    fn compact_entry() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&7u16.to_le_bytes());
        raw.extend_from_slice(&(0x1008u16).to_le_bytes());
        raw.extend_from_slice(&99u32.to_le_bytes());

        let entry = ResTableEntry::decode(&raw).unwrap();
        assert_eq!(entry.key(), 7);
        let value = entry.value().unwrap();
        assert_eq!(value.data_type, ResourceValueType::Dec);
        assert_eq!(value.data, 99);
    }

    #[test]
    fn complex_entry() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&16u16.to_le_bytes());
        raw.extend_from_slice(&1u16.to_le_bytes());
        raw.extend_from_slice(&5u32.to_le_bytes());
        raw.extend_from_slice(&0x7f010000u32.to_le_bytes());
        raw.extend_from_slice(&1u32.to_le_bytes());
        raw.extend_from_slice(&0x01010000u32.to_le_bytes());
        raw.extend_from_slice(&8u16.to_le_bytes());
        raw.extend_from_slice(&[0, 0x12]);
        raw.extend_from_slice(&1u32.to_le_bytes());

        let ResTableEntry::Complex(entry) = ResTableEntry::decode(&raw).unwrap() else {
            panic!("expected complex entry");
        };
        assert_eq!(entry.parent, 0x7f010000);
        assert_eq!(entry.values.len(), 1);
        assert_eq!(entry.values[0].name, 0x01010000);

        // count claims more pairs than stored
        raw[12..16].copy_from_slice(&2u32.to_le_bytes());
        assert!(ResTableEntry::decode(&raw).is_err());
    }

    #[test]
    fn type_spec_flags() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&0x0202u16.to_le_bytes());
        raw.extend_from_slice(&16u16.to_le_bytes());
        raw.extend_from_slice(&24u32.to_le_bytes());
        raw.extend_from_slice(&[1, 0, 0, 0]);
        raw.extend_from_slice(&2u32.to_le_bytes());
        raw.extend_from_slice(&0x0100u32.to_le_bytes());
        raw.extend_from_slice(&0x40000000u32.to_le_bytes());

        let spec = ResTableTypeSpec::parse(chunk(raw.clone())).unwrap();
        assert_eq!(spec.flags(0), Some(ResTableConfigFlags::CONFIG_DENSITY));
        assert_eq!(spec.flags(1), Some(ResTableConfigFlags::SPEC_PUBLIC));
        assert_eq!(spec.flags(2), None);

        raw[8] = 0;
        assert!(matches!(
            ResTableTypeSpec::parse(chunk(raw)),
            Err(DecodeError::TypeSpec(_))
        ));
    }
}
