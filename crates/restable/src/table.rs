//! Top-level resource table
//!
//! A [ResourceTable] owns every loaded source (identified by its cookie) and
//! the package groups built from them. Lookups decompose the resource id into
//! package, type and entry and delegate to the owning [PackageGroup].

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::dynamic_ref::APP_PACKAGE_ID;
use crate::errors::{DecodeError, ResolveError, TableError};
use crate::idmap::Idmap;
use crate::package_group::{Entry, PackageGroup, PackageSource, TableId};
use crate::source::AssetSource;
use crate::structs::{
    ResTableConfig, ResTableEntry, ResTablePackage, ResourceType, ResourceValue,
    ResourceValueType, StringPool, decode_root, make_resource_id, split_resource_id,
};

/// Longest reference chain followed by [ResourceTable::resolve_reference]
pub const MAX_REFERENCE_DEPTH: usize = 20;

/// First package id handed out to shared libraries
const FIRST_DYNAMIC_PACKAGE_ID: u8 = 0x02;

/// One loaded source
#[derive(Debug)]
pub struct LoadedTable {
    pub cookie: u32,

    /// Values string pool, `None` for empty tables
    pub values: Option<Arc<StringPool>>,

    /// Problems tolerated while loading
    pub issues: Vec<DecodeError>,
}

/// Knobs for [ResourceTable::get_resource_with]
#[derive(Debug, Clone, Copy)]
pub struct ResourceOptions {
    /// Rewrite dynamic references into runtime package ids
    pub resolve_refs: bool,

    /// Overrides the requested density when non-zero
    pub density: u16,

    /// Bags are expected, don't warn about complex entries
    pub may_be_bag: bool,
}

impl Default for ResourceOptions {
    fn default() -> Self {
        ResourceOptions {
            resolve_refs: true,
            density: 0,
            may_be_bag: false,
        }
    }
}

/// A resolved simple value
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResolvedValue {
    /// Resource the value was taken from, the last one of a reference chain
    pub res_id: u32,

    pub value: ResourceValue,

    /// Cookie of the source holding the value
    pub cookie: u32,

    /// Configuration of the chosen definition
    pub config: ResTableConfig,

    /// Configuration axes the resource varies by
    pub type_spec_flags: u32,

    /// Text of string values
    pub string: Option<String>,
}

/// One attribute of a [Bag]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BagEntry {
    /// Attribute resource id
    pub name: u32,

    pub value: ResourceValue,

    /// Cookie of the source that defined this attribute
    pub cookie: u32,

    /// Text of string values
    pub string: Option<String>,
}

/// Complex entry merged over its parents, entries sorted by attribute id
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bag {
    pub res_id: u32,

    /// Parent as runtime resource id, 0 without one
    pub parent: u32,

    pub type_spec_flags: u32,

    pub entries: Vec<BagEntry>,
}

impl Bag {
    pub fn get(&self, name: u32) -> Option<&BagEntry> {
        self.entries
            .binary_search_by_key(&name, |entry| entry.name)
            .ok()
            .map(|index| &self.entries[index])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `package:type/entry` name of a resource
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResourceName {
    pub package: String,
    pub type_: String,
    pub entry: String,
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.package, self.type_, self.entry)
    }
}

#[inline]
fn is_reference_like(data_type: ResourceValueType) -> bool {
    matches!(
        data_type,
        ResourceValueType::Reference
            | ResourceValueType::Attribute
            | ResourceValueType::DynamicReference
            | ResourceValueType::DynamicAttribute
    )
}

#[derive(Debug)]
pub struct ResourceTable {
    id: TableId,

    /// Loaded sources in load order
    tables: Vec<Arc<LoadedTable>>,

    groups: Vec<PackageGroup>,

    next_package_id: u8,

    /// Current configuration, used by [ResourceTable::get_resource_current]
    configuration: ResTableConfig,
}

impl Default for ResourceTable {
    fn default() -> Self {
        ResourceTable::new()
    }
}

impl ResourceTable {
    pub fn new() -> ResourceTable {
        ResourceTable {
            id: TableId::next(),
            tables: Vec::new(),
            groups: Vec::new(),
            next_package_id: FIRST_DYNAMIC_PACKAGE_ID,
            configuration: ResTableConfig::default(),
        }
    }

    /// Decode a single resource table, loaded with cookie 1
    pub fn decode(data: impl Into<Arc<[u8]>>) -> Result<ResourceTable, TableError> {
        let mut table = ResourceTable::new();
        table.add(data, 1)?;
        Ok(table)
    }

    #[inline]
    pub fn id(&self) -> TableId {
        self.id
    }

    /// Number of loaded sources, empty ones included
    #[inline]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn tables(&self) -> &[Arc<LoadedTable>] {
        &self.tables
    }

    pub fn groups(&self) -> &[PackageGroup] {
        &self.groups
    }

    pub fn group(&self, package_id: u8) -> Option<&PackageGroup> {
        self.groups.iter().find(|group| group.id == package_id)
    }

    fn group_index(&self, package_id: u8) -> Option<usize> {
        self.groups.iter().position(|group| group.id == package_id)
    }

    /// Register a source without packages
    pub fn add_empty(&mut self, cookie: u32) {
        self.tables.push(Arc::new(LoadedTable {
            cookie,
            values: None,
            issues: Vec::new(),
        }));
    }

    pub fn add(&mut self, data: impl Into<Arc<[u8]>>, cookie: u32) -> Result<(), TableError> {
        self.add_internal(data.into(), None, cookie, false)
    }

    /// Load a table whose app package (0x7f) is treated as a shared library
    pub fn add_as_library(&mut self, data: impl Into<Arc<[u8]>>, cookie: u32) -> Result<(), TableError> {
        self.add_internal(data.into(), None, cookie, true)
    }

    /// Load an overlay table, its mapped types are routed into the package named by the idmap
    pub fn add_with_idmap(
        &mut self,
        data: impl Into<Arc<[u8]>>,
        idmap: &[u8],
        cookie: u32,
    ) -> Result<(), TableError> {
        let idmap = Idmap::parse(idmap)?;
        self.add_internal(data.into(), Some(&idmap), cookie, false)
    }

    /// Read `name` from `source` and load it
    pub fn add_from_source(
        &mut self,
        source: &impl AssetSource,
        name: &str,
        cookie: u32,
    ) -> Result<(), TableError> {
        let data = source.read_entry(name)?;
        self.add(data, cookie)
    }

    fn add_internal(
        &mut self,
        data: Arc<[u8]>,
        idmap: Option<&Idmap>,
        cookie: u32,
        app_as_lib: bool,
    ) -> Result<(), TableError> {
        let root = decode_root(&data)?;

        let mut values = None;
        let mut packages = Vec::new();
        let mut issues = Vec::new();
        let mut found = 0u32;

        for child in root.chunk.children() {
            let chunk = match child {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!("stopping at malformed chunk in resource table: {}", e);
                    issues.push(e);
                    break;
                }
            };

            match chunk.header.type_ {
                ResourceType::StringPool if values.is_none() => match StringPool::parse(chunk) {
                    Ok(pool) => values = Some(pool),
                    Err(e) => {
                        warn!("can't parse values string pool: {}", e);
                        issues.push(e);
                    }
                },
                ResourceType::StringPool => warn!("multiple string pools in resource table, using the first"),
                ResourceType::TablePackage => {
                    found += 1;
                    if found > root.package_count {
                        return Err(DecodeError::PackageCount {
                            declared: root.package_count,
                            found,
                        }
                        .into());
                    }

                    match ResTablePackage::parse(chunk) {
                        Ok(package) => packages.push(package),
                        Err(e) => {
                            warn!("skipping malformed package chunk: {}", e);
                            issues.push(e);
                        }
                    }
                }
                other => warn!("unknown chunk type 0x{:04x} in resource table", other.raw()),
            }
        }

        if found < root.package_count {
            return Err(DecodeError::PackageCount {
                declared: root.package_count,
                found,
            }
            .into());
        }

        if values.is_none() {
            warn!("no values string pool in resource table");
            issues.push(DecodeError::StringPool("missing values string pool"));
        }

        let source = PackageSource {
            cookie,
            values: values.map(Arc::new),
        };
        for package in packages {
            self.add_package(package, &source, idmap, app_as_lib, &mut issues)?;
        }

        info!(
            "loaded resource table with cookie {}: {} packages, {} issues",
            cookie, found, issues.len()
        );

        self.tables.push(Arc::new(LoadedTable {
            cookie,
            values: source.values,
            issues,
        }));

        Ok(())
    }

    fn add_package(
        &mut self,
        package: ResTablePackage,
        source: &PackageSource,
        idmap: Option<&Idmap>,
        app_as_lib: bool,
        issues: &mut Vec<DecodeError>,
    ) -> Result<(), TableError> {
        let mut id = idmap.map_or(package.id(), |idmap| idmap.target_package_id);
        let mut is_dynamic = false;

        if id == 0 || (id == APP_PACKAGE_ID && app_as_lib) {
            id = self.next_package_id;
            self.next_package_id = self
                .next_package_id
                .checked_add(1)
                .ok_or(DecodeError::Package("no package ids left"))?;
            is_dynamic = true;
            debug!("assigned package id 0x{:02x} to \"{}\"", id, package.name());
        }

        let index = match self.group_index(id) {
            Some(index) => index,
            None => {
                let name = package.name().to_owned();
                for group in &mut self.groups {
                    group.dynamic_ref_table.add_mapping(&name, id);
                }

                self.groups
                    .push(PackageGroup::new(self.id, id, name, app_as_lib, is_dynamic));
                self.groups.len() - 1
            }
        };

        let group = &mut self.groups[index];
        group.add_package(Arc::new(package), source.clone(), idmap, issues);
        group.invalidate(self.id);
        self.fill_mappings(index);

        Ok(())
    }

    /// Teach the group at `index` the runtime ids of every known package
    fn fill_mappings(&mut self, index: usize) {
        let known: Vec<(String, u8)> = self
            .groups
            .iter()
            .map(|group| (group.name.clone(), group.id))
            .collect();

        let table = &mut self.groups[index].dynamic_ref_table;
        for (name, id) in &known {
            table.add_mapping(name, *id);
        }
    }

    /// Merge every source and package group of `other`
    ///
    /// With `copy_dynamic` the dynamic reference tables of `other` are merged
    /// as they are, otherwise they are rebuilt from the library chunks.
    pub fn merge(&mut self, other: &ResourceTable, copy_dynamic: bool) -> Result<(), TableError> {
        for theirs in &other.groups {
            if let Some(ours) = self.group(theirs.id)
                && ours.name != theirs.name
            {
                return Err(TableError::PackageIdCollision {
                    id: theirs.id,
                    ours: ours.name.clone(),
                    theirs: theirs.name.clone(),
                });
            }
        }

        self.tables.extend(other.tables.iter().cloned());

        for theirs in &other.groups {
            let index = match self.group_index(theirs.id) {
                Some(index) => {
                    let ours = &mut self.groups[index];
                    ours.packages.extend(theirs.packages.iter().cloned());
                    ours.extend_types(theirs);
                    ours.invalidate(self.id);
                    index
                }
                None => {
                    let mut group = theirs.copy_for(self.id);
                    if !copy_dynamic {
                        group.reload_libraries()?;
                    }
                    self.groups.push(group);
                    self.groups.len() - 1
                }
            };

            if copy_dynamic {
                self.groups[index]
                    .dynamic_ref_table
                    .add_mappings(&theirs.dynamic_ref_table)?;
            }
        }

        for index in 0..self.groups.len() {
            self.fill_mappings(index);
        }

        self.next_package_id = self.next_package_id.max(other.next_package_id);

        info!(
            "merged {} sources into table, now holding {}",
            other.tables.len(),
            self.tables.len()
        );

        Ok(())
    }

    #[inline]
    pub fn configuration(&self) -> &ResTableConfig {
        &self.configuration
    }

    /// Change the current configuration, dropping every cached lookup
    pub fn set_configuration(&mut self, config: ResTableConfig) {
        if config == self.configuration {
            return;
        }

        debug!("switching configuration to \"{}\"", config);
        self.configuration = config;

        for group in &self.groups {
            group.invalidate(self.id);
        }
    }

    fn group_for(&self, res_id: u32) -> Result<(&PackageGroup, u8, u16), ResolveError> {
        let (package_id, type_id, entry_index) = split_resource_id(res_id);

        if package_id == 0 {
            warn!("no package identifier in resource 0x{:08x}", res_id);
            return Err(ResolveError::BadIndex(res_id));
        }
        if type_id == 0 {
            warn!("no type identifier in resource 0x{:08x}", res_id);
            return Err(ResolveError::BadIndex(res_id));
        }

        let group = self.group(package_id).ok_or_else(|| {
            warn!("no known package for resource 0x{:08x}", res_id);
            ResolveError::BadIndex(res_id)
        })?;

        Ok((group, type_id - 1, entry_index))
    }

    /// Best definition of `res_id` for `config`, `None` takes the first defined one
    pub fn get_entry(&self, res_id: u32, config: Option<&ResTableConfig>) -> Result<Entry, ResolveError> {
        let (group, type_index, entry_index) = self.group_for(res_id)?;
        group.get_entry(type_index, entry_index, config)
    }

    pub fn get_resource(
        &self,
        res_id: u32,
        config: Option<&ResTableConfig>,
    ) -> Result<ResolvedValue, ResolveError> {
        self.get_resource_with(res_id, config, &ResourceOptions::default())
    }

    /// [ResourceTable::get_resource] for the current configuration
    pub fn get_resource_current(&self, res_id: u32) -> Result<ResolvedValue, ResolveError> {
        self.get_resource(res_id, Some(&self.configuration))
    }

    pub fn get_resource_with(
        &self,
        res_id: u32,
        config: Option<&ResTableConfig>,
        options: &ResourceOptions,
    ) -> Result<ResolvedValue, ResolveError> {
        let (group, type_index, entry_index) = self.group_for(res_id)?;

        let mut desired = config.copied();
        if options.density > 0 {
            let mut config = desired.unwrap_or_default();
            config.density = options.density;
            desired = Some(config);
        }

        let entry = group.get_entry(type_index, entry_index, desired.as_ref())?;

        let Some(mut value) = entry.entry.value() else {
            if !options.may_be_bag {
                warn!("resource 0x{:08x} is complex", res_id);
            }
            return Err(ResolveError::ComplexEntry(res_id));
        };

        if options.resolve_refs && is_reference_like(value.data_type) {
            group
                .dynamic_ref_table
                .lookup_resource_value(&mut value)
                .inspect_err(|e| warn!("failed to resolve referenced package: {}", e))?;
        }

        let string = match value.data_type {
            ResourceValueType::String => entry.value_string(value.data).ok(),
            _ => None,
        };

        Ok(ResolvedValue {
            res_id,
            value,
            cookie: entry.cookie,
            config: entry.config,
            type_spec_flags: entry.spec_flags.bits(),
            string,
        })
    }

    /// Follow references starting at `value` until a non-reference is reached
    ///
    /// A reference to a bag is returned as is. Type spec flags of every
    /// followed resource are accumulated into the result.
    pub fn resolve_reference(
        &self,
        value: ResolvedValue,
        config: Option<&ResTableConfig>,
    ) -> Result<ResolvedValue, ResolveError> {
        let start = value.res_id;
        let options = ResourceOptions {
            may_be_bag: true,
            ..ResourceOptions::default()
        };

        let mut current = value;
        for _ in 0..MAX_REFERENCE_DEPTH {
            if current.value.data_type != ResourceValueType::Reference || current.value.data == 0 {
                return Ok(current);
            }

            match self.get_resource_with(current.value.data, config, &options) {
                Ok(mut next) => {
                    next.type_spec_flags |= current.type_spec_flags;
                    current = next;
                }
                Err(ResolveError::ComplexEntry(_)) => return Ok(current),
                Err(e) => return Err(e),
            }
        }

        if current.value.data_type == ResourceValueType::Reference && current.value.data != 0 {
            return Err(ResolveError::CircularReference(start));
        }

        Ok(current)
    }

    /// Bag of `res_id` merged over its parents
    pub fn get_bag(&self, res_id: u32, config: Option<&ResTableConfig>) -> Result<Arc<Bag>, ResolveError> {
        let mut chain = Vec::new();
        self.bag_inner(res_id, config, &mut chain)
    }

    fn bag_inner(
        &self,
        res_id: u32,
        config: Option<&ResTableConfig>,
        chain: &mut Vec<u32>,
    ) -> Result<Arc<Bag>, ResolveError> {
        if chain.contains(&res_id) || chain.len() >= MAX_REFERENCE_DEPTH {
            return Err(ResolveError::CircularReference(chain.first().copied().unwrap_or(res_id)));
        }

        let (group, type_index, entry_index) = self.group_for(res_id)?;

        if let Some(bag) = config.and_then(|config| group.cached_bag(res_id, config)) {
            return Ok(bag);
        }

        let entry = group.get_entry(type_index, entry_index, config)?;
        let ResTableEntry::Complex(map) = &entry.entry else {
            return Err(ResolveError::NotABag(res_id));
        };

        let refs = &group.dynamic_ref_table;

        let mut parent = 0;
        let mut entries = Vec::new();
        let mut type_spec_flags = entry.spec_flags.bits();

        if map.parent != 0 {
            parent = refs.lookup_resource_id(map.parent)?;

            chain.push(res_id);
            let parent_bag = self.bag_inner(parent, config, chain)?;
            chain.pop();

            entries.extend_from_slice(&parent_bag.entries);
            type_spec_flags |= parent_bag.type_spec_flags;
        }

        for item in &map.values {
            let name = refs.lookup_resource_id(item.name)?;

            let mut value = item.value;
            if is_reference_like(value.data_type) {
                refs.lookup_resource_value(&mut value)?;
            }

            let string = match value.data_type {
                ResourceValueType::String => entry.value_string(value.data).ok(),
                _ => None,
            };

            let bag_entry = BagEntry {
                name,
                value,
                cookie: entry.cookie,
                string,
            };

            match entries.binary_search_by_key(&name, |e: &BagEntry| e.name) {
                Ok(index) => entries[index] = bag_entry,
                Err(index) => entries.insert(index, bag_entry),
            }
        }

        let bag = Arc::new(Bag {
            res_id,
            parent,
            type_spec_flags,
            entries,
        });

        if let Some(config) = config {
            group.cache_bag(config, Arc::clone(&bag));
        }

        Ok(bag)
    }

    pub fn get_resource_name(&self, res_id: u32) -> Result<ResourceName, ResolveError> {
        let entry = self.get_entry(res_id, None)?;

        let corrupt = |_| ResolveError::CorruptData {
            res_id,
            reason: "name string out of range",
        };

        Ok(ResourceName {
            package: entry.package.name().to_owned(),
            type_: entry.type_name().map_err(corrupt)?,
            entry: entry.key_name().map_err(corrupt)?,
        })
    }

    /// Resource id for a name like `[@][package:]type/entry`
    ///
    /// Missing parts are taken from the defaults. Returns `None` if nothing is named that way.
    pub fn identifier(
        &self,
        name: &str,
        default_type: Option<&str>,
        default_package: Option<&str>,
    ) -> Option<u32> {
        let name = name.strip_prefix('@').unwrap_or(name);

        let (package, rest) = match name.split_once(':') {
            Some((package, rest)) => (Some(package), rest),
            None => (default_package, name),
        };
        let (type_, entry) = match rest.split_once('/') {
            Some((type_, entry)) => (Some(type_), entry),
            None => (default_type, rest),
        };

        let (package, type_) = (package?, type_?);

        self.groups
            .iter()
            .filter(|group| group.name == package)
            .find_map(|group| Self::find_in_group(group, type_, entry))
    }

    fn find_in_group(group: &PackageGroup, type_: &str, entry: &str) -> Option<u32> {
        for package in &group.packages {
            let Some(type_index) = package.type_strings.index_of(type_) else {
                continue;
            };
            let Some(key) = package.key_strings.index_of(entry) else {
                continue;
            };

            let Some(type_id) = type_index
                .checked_add(1)
                .and_then(|id| id.checked_add(package.header.type_id_offset))
                .and_then(|id| u8::try_from(id).ok())
            else {
                continue;
            };

            for type_entry in group.types(type_id - 1) {
                if !Arc::ptr_eq(&type_entry.package, package) {
                    continue;
                }

                let count = type_entry.entry_count.min(u16::MAX as u32 + 1);
                for entry_index in (0..count).map(|index| index as u16) {
                    let found = type_entry.configs.iter().any(|ty| {
                        ty.entry_offset(entry_index)
                            .and_then(|offset| ty.entry(offset).ok())
                            .is_some_and(|e| e.key() == key)
                    });

                    if found {
                        return Some(make_resource_id(group.id, type_id, entry_index));
                    }
                }
            }
        }

        None
    }
}
