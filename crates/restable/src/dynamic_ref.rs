//! Translation of build-time package ids into the ids assigned at runtime
//!
//! Shared libraries are compiled with package id 0 and get their real id when
//! loaded. References into other libraries name the library by package, the
//! [ResTableLibrary] chunk maps those names to the ids used at build time.

use ahash::AHashMap;
use log::{debug, warn};
use winnow::binary::le_u32;

use crate::errors::DynamicRefError;
use crate::structs::{
    ResTableLibrary, ResTableLibraryEntry, ResourceValue, ResourceValueType, parse_fixed,
};

pub const APP_PACKAGE_ID: u8 = 0x7f;
pub const SYS_PACKAGE_ID: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicRefTable {
    assigned_package_id: u8,
    app_as_lib: bool,

    /// Library package name to its build-time package id
    entries: AHashMap<String, u8>,

    /// Build-time package id to runtime package id, 0 is unmapped
    lookup_table: [u8; 256],
}

impl DynamicRefTable {
    pub fn new(assigned_package_id: u8, app_as_lib: bool) -> DynamicRefTable {
        let mut lookup_table = [0u8; 256];
        lookup_table[APP_PACKAGE_ID as usize] = APP_PACKAGE_ID;
        lookup_table[SYS_PACKAGE_ID as usize] = SYS_PACKAGE_ID;

        DynamicRefTable {
            assigned_package_id,
            app_as_lib,
            entries: AHashMap::new(),
            lookup_table,
        }
    }

    #[inline]
    pub fn assigned_package_id(&self) -> u8 {
        self.assigned_package_id
    }

    #[inline]
    pub fn app_as_lib(&self) -> bool {
        self.app_as_lib
    }

    /// Library names and their build-time package ids
    #[inline]
    pub fn entries(&self) -> &AHashMap<String, u8> {
        &self.entries
    }

    /// Load library entries from a library chunk
    ///
    /// Either every entry is loaded or, on error, none are: the entries are
    /// left empty.
    pub fn load(&mut self, library: &ResTableLibrary) -> Result<(), DynamicRefError> {
        let result = self.load_entries(library);
        if result.is_err() {
            self.entries.clear();
        }
        result
    }

    fn load_entries(&mut self, library: &ResTableLibrary) -> Result<(), DynamicRefError> {
        let chunk = &library.chunk;
        let count = parse_fixed(chunk.header_fields(), "library header", le_u32).map_err(|_| {
            DynamicRefError::Size {
                count: 0,
                capacity: 0,
            }
        })?;

        let capacity = chunk.header.content_size() / ResTableLibraryEntry::size_of() as u32;
        if count > capacity {
            return Err(DynamicRefError::Size { count, capacity });
        }

        let mut input = &chunk.bytes()[chunk.header.header_size as usize..];
        for _ in 0..count {
            let entry = ResTableLibraryEntry::parse(&mut input)
                .map_err(|_| DynamicRefError::Size { count, capacity })?;

            if entry.package_id >= 256 {
                return Err(DynamicRefError::Range(entry.package_id));
            }

            debug!(
                "library \"{}\" has build-time package id 0x{:02x}",
                entry.package_name, entry.package_id
            );
            self.entries
                .insert(entry.package_name, entry.package_id as u8);
        }

        Ok(())
    }

    /// Merge entries and mappings of another table of the same package
    pub fn add_mappings(&mut self, other: &DynamicRefTable) -> Result<(), DynamicRefError> {
        if self.assigned_package_id != other.assigned_package_id {
            return Err(DynamicRefError::AssignedIdMismatch {
                ours: self.assigned_package_id,
                theirs: other.assigned_package_id,
            });
        }

        for (name, id) in &other.entries {
            match self.entries.get(name) {
                None => {
                    self.entries.insert(name.clone(), *id);
                }
                Some(ours) if ours != id => {
                    warn!(
                        "library \"{}\" has build-time id 0x{:02x}, keeping 0x{:02x}",
                        name, id, ours
                    );
                }
                Some(_) => {}
            }
        }

        for (ours, theirs) in self.lookup_table.iter_mut().zip(other.lookup_table.iter()) {
            if *ours == 0 {
                *ours = *theirs;
            }
        }

        Ok(())
    }

    /// Map the library `package_name` to the runtime package id
    ///
    /// Returns false if this table doesn't reference the library.
    pub fn add_mapping(&mut self, package_name: &str, package_id: u8) -> bool {
        match self.entries.get(package_name) {
            Some(&build_id) => {
                self.lookup_table[build_id as usize] = package_id;
                true
            }
            None => false,
        }
    }

    /// Rewrite the package byte of `res_id` into its runtime package id
    pub fn lookup_resource_id(&self, res_id: u32) -> Result<u32, DynamicRefError> {
        let package_id = (res_id >> 24) as u8;

        if package_id == APP_PACKAGE_ID && !self.app_as_lib {
            return Ok(res_id);
        }

        // references within the package itself
        if package_id == 0 || (package_id == APP_PACKAGE_ID && self.app_as_lib) {
            return Ok((res_id & 0x00ff_ffff) | (self.assigned_package_id as u32) << 24);
        }

        match self.lookup_table[package_id as usize] {
            0 => Err(DynamicRefError::Unresolved { package_id, res_id }),
            translated => Ok((res_id & 0x00ff_ffff) | (translated as u32) << 24),
        }
    }

    /// Resolve a reference or attribute value in place
    ///
    /// Dynamic references become plain references. Plain ones are only touched when
    /// the package is loaded as a library or they point into the package itself.
    pub fn lookup_resource_value(&self, value: &mut ResourceValue) -> Result<(), DynamicRefError> {
        let resolved = match value.data_type {
            ResourceValueType::Reference | ResourceValueType::Attribute => {
                if !(self.app_as_lib || value.data >> 24 == 0) {
                    return Ok(());
                }
                value.data_type
            }
            ResourceValueType::DynamicReference => ResourceValueType::Reference,
            ResourceValueType::DynamicAttribute => ResourceValueType::Attribute,
            other => return Err(DynamicRefError::Type(other.raw())),
        };

        value.data = self.lookup_resource_id(value.data)?;
        value.data_type = resolved;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::structs::ChunkData;

    fn library(count: u32, entries: &[(u32, &str)]) -> ResTableLibrary {
        let size = 12 + entries.len() * 260;
        let mut raw = Vec::new();
        raw.extend_from_slice(&0x0203u16.to_le_bytes());
        raw.extend_from_slice(&12u16.to_le_bytes());
        raw.extend_from_slice(&(size as u32).to_le_bytes());
        raw.extend_from_slice(&count.to_le_bytes());

        for (id, name) in entries {
            raw.extend_from_slice(&id.to_le_bytes());
            let mut name_raw: Vec<u8> = name.encode_utf16().flat_map(u16::to_le_bytes).collect();
            name_raw.resize(256, 0);
            raw.extend_from_slice(&name_raw);
        }

        let buf: Arc<[u8]> = Arc::from(raw);
        ResTableLibrary::new(ChunkData::read(&buf, 0, buf.len()).unwrap())
    }

    #[test]
    fn load_entries() {
        let mut table = DynamicRefTable::new(0x7f, false);
        table
            .load(&library(2, &[(0x02, "com.example.lib"), (0x03, "com.example.other")]))
            .unwrap();

        assert_eq!(table.entries().len(), 2);
        assert_eq!(table.entries().get("com.example.lib"), Some(&0x02));
    }

    #[test]
    fn load_count_past_payload() {
        let mut table = DynamicRefTable::new(0x7f, false);
        assert_eq!(
            table.load(&library(2, &[])),
            Err(DynamicRefError::Size {
                count: 2,
                capacity: 0
            })
        );
        assert!(table.entries().is_empty());
    }

    #[test]
    fn load_package_id_out_of_range() {
        let mut table = DynamicRefTable::new(0x7f, false);
        let result = table.load(&library(2, &[(0x02, "com.example.lib"), (0x100, "com.example.bad")]));

        assert_eq!(result, Err(DynamicRefError::Range(0x100)));
        assert!(table.entries().is_empty());
    }

    #[test]
    fn lookup_ids() {
        let mut table = DynamicRefTable::new(0x05, false);
        table.load(&library(1, &[(0x02, "com.example.lib")])).unwrap();

        // own and framework resources are left alone
        assert_eq!(table.lookup_resource_id(0x7f010000), Ok(0x7f010000));
        assert_eq!(table.lookup_resource_id(0x01010000), Ok(0x01010000));

        // package 0 means "this package"
        assert_eq!(table.lookup_resource_id(0x00010002), Ok(0x05010002));

        assert_eq!(
            table.lookup_resource_id(0x02010000),
            Err(DynamicRefError::Unresolved {
                package_id: 0x02,
                res_id: 0x02010000
            })
        );

        assert!(table.add_mapping("com.example.lib", 0x09));
        assert!(!table.add_mapping("com.example.missing", 0x0a));
        assert_eq!(table.lookup_resource_id(0x02010000), Ok(0x09010000));
    }

    #[test]
    fn lookup_app_as_lib() {
        let table = DynamicRefTable::new(0x05, true);
        assert_eq!(table.lookup_resource_id(0x7f010000), Ok(0x05010000));
    }

    #[test]
    fn lookup_values() {
        let table = DynamicRefTable::new(0x05, false);

        let mut value = ResourceValue {
            size: 8,
            res0: 0,
            data_type: ResourceValueType::DynamicReference,
            data: 0x00020001,
        };
        table.lookup_resource_value(&mut value).unwrap();
        assert_eq!(value.data_type, ResourceValueType::Reference);
        assert_eq!(value.data, 0x05020001);

        let mut value = ResourceValue {
            data_type: ResourceValueType::Reference,
            data: 0x7f020001,
            ..value
        };
        table.lookup_resource_value(&mut value).unwrap();
        assert_eq!(value.data, 0x7f020001);

        let mut value = ResourceValue {
            data_type: ResourceValueType::Dec,
            ..value
        };
        assert_eq!(
            table.lookup_resource_value(&mut value),
            Err(DynamicRefError::Type(0x10))
        );
    }

    #[test]
    fn merge_mappings() {
        let mut ours = DynamicRefTable::new(0x05, false);
        let mut theirs = DynamicRefTable::new(0x05, false);
        theirs.load(&library(1, &[(0x02, "com.example.lib")])).unwrap();
        theirs.add_mapping("com.example.lib", 0x09);

        ours.add_mappings(&theirs).unwrap();
        assert_eq!(ours.lookup_resource_id(0x02000001), Ok(0x09000001));

        let other = DynamicRefTable::new(0x06, false);
        assert_eq!(
            ours.add_mappings(&other),
            Err(DynamicRefError::AssignedIdMismatch {
                ours: 0x05,
                theirs: 0x06
            })
        );
    }
}
