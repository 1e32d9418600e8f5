//! Overlay id maps
//!
//! An idmap routes the types of an overlay package into the package it overlays,
//! mapping every overlaid entry index of the target onto the overlay's own index.

use ahash::AHashMap;
use winnow::binary::{le_u16, le_u32, length_repeat};
use winnow::combinator::repeat;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take;

use crate::errors::IdmapError;
use crate::structs::NO_ENTRY;
use crate::structs::locale::ascii_field;

/// "IDMP" in little endian
pub const IDMAP_MAGIC: u32 = 0x504D_4449;
pub const IDMAP_CURRENT_VERSION: u32 = 0x0000_0001;

/// Entry mapping of a single overlaid type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdmapEntries {
    /// Type id in the target package
    pub target_type_id: u8,

    /// Type id in the overlay package
    pub overlay_type_id: u8,

    /// First target entry index covered by `entries`
    pub entry_offset: u16,

    /// Overlay entry index for every covered target index, [NO_ENTRY] if not overlaid
    pub entries: Vec<u32>,
}

/// Type map as stored on disk, ids are narrowed once the whole map is read
struct RawEntries {
    target_type_id: u16,
    overlay_type_id: u16,
    entry_offset: u16,
    entries: Vec<u32>,
}

impl RawEntries {
    fn parse(input: &mut &[u8]) -> ModalResult<RawEntries> {
        let (target_type_id, overlay_type_id, entry_count, entry_offset) =
            (le_u16, le_u16, le_u16, le_u16).parse_next(input)?;
        let entries: Vec<u32> = repeat(entry_count as usize, le_u32).parse_next(input)?;

        Ok(RawEntries {
            target_type_id,
            overlay_type_id,
            entry_offset,
            entries,
        })
    }
}

impl TryFrom<RawEntries> for IdmapEntries {
    type Error = IdmapError;

    fn try_from(raw: RawEntries) -> Result<IdmapEntries, IdmapError> {
        let type_id = |id: u16| match u8::try_from(id) {
            Ok(0) | Err(_) => Err(IdmapError::Parse("type id out of range")),
            Ok(id) => Ok(id),
        };

        if raw.entries.iter().any(|&entry| entry != NO_ENTRY && entry > u16::MAX as u32) {
            return Err(IdmapError::Parse("overlay entry index out of range"));
        }

        Ok(IdmapEntries {
            target_type_id: type_id(raw.target_type_id)?,
            overlay_type_id: type_id(raw.overlay_type_id)?,
            entry_offset: raw.entry_offset,
            entries: raw.entries,
        })
    }
}

impl IdmapEntries {

    #[inline]
    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Overlay entry index for target entry `entry_index`
    pub fn lookup(&self, entry_index: u16) -> Option<u16> {
        let slot = entry_index.checked_sub(self.entry_offset)?;

        match *self.entries.get(slot as usize)? {
            NO_ENTRY => None,
            mapped => u16::try_from(mapped).ok(),
        }
    }
}

/// Parsed idmap file
#[derive(Debug, Clone)]
pub struct Idmap {
    pub target_crc: u32,
    pub overlay_crc: u32,
    pub target_path: String,
    pub overlay_path: String,

    /// Package id the overlay is routed into
    pub target_package_id: u8,

    /// Mappings by overlay type id
    types: AHashMap<u8, IdmapEntries>,
}

impl Idmap {
    pub fn parse(data: &[u8]) -> Result<Idmap, IdmapError> {
        let mut input = data;

        let (magic, version) = (le_u32, le_u32)
            .parse_next(&mut input)
            .map_err(|_: ErrMode<ContextError>| IdmapError::Parse("header too small"))?;

        if magic != IDMAP_MAGIC {
            return Err(IdmapError::Magic(magic));
        }
        if version != IDMAP_CURRENT_VERSION {
            return Err(IdmapError::Version(version));
        }

        let (target_crc, overlay_crc, target_path, overlay_path, target_package_id) = (
            le_u32,
            le_u32,
            take(256usize),
            take(256usize),
            le_u16,
        )
            .parse_next(&mut input)
            .map_err(|_: ErrMode<ContextError>| IdmapError::Parse("header too small"))?;

        let target_package_id = match u8::try_from(target_package_id) {
            Ok(0) | Err(_) => return Err(IdmapError::Parse("target package id out of range")),
            Ok(id) => id,
        };

        let maps: Vec<RawEntries> = length_repeat(le_u16, RawEntries::parse)
            .parse_next(&mut input)
            .map_err(|_: ErrMode<ContextError>| IdmapError::Parse("type map exceeds data"))?;

        let mut types = AHashMap::with_capacity(maps.len());
        for map in maps {
            let map = IdmapEntries::try_from(map)?;
            if types.insert(map.overlay_type_id, map).is_some() {
                return Err(IdmapError::Parse("overlay type mapped twice"));
            }
        }

        Ok(Idmap {
            target_crc,
            overlay_crc,
            target_path: ascii_field(target_path),
            overlay_path: ascii_field(overlay_path),
            target_package_id,
            types,
        })
    }

    /// Mapping for the overlay type `overlay_type_id`
    #[inline]
    pub fn entries_for(&self, overlay_type_id: u8) -> Option<&IdmapEntries> {
        self.types.get(&overlay_type_id)
    }

    pub fn types(&self) -> impl Iterator<Item = &IdmapEntries> {
        self.types.values()
    }
}
