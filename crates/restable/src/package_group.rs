//! Packages sharing one package id and the best-entry lookup over them
//!
//! A group holds a base package plus any overlays routed into it. Every type id
//! maps to a list of [TypeEntry], one per contributing type spec, each with the
//! type chunks (configurations) that followed that spec.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use ahash::{AHashMap, RandomState};
use log::{debug, warn};

use crate::dynamic_ref::DynamicRefTable;
use crate::errors::{DecodeError, DynamicRefError, ResolveError};
use crate::idmap::{Idmap, IdmapEntries};
use crate::structs::{
    Chunk, ResTableConfig, ResTableConfigFlags, ResTableEntry, ResTablePackage, ResTableType,
    ResTableTypeSpec, StringPool, make_resource_id,
};
use crate::table::Bag;

/// Identity of the table owning a group, used to scope cache invalidation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(u64);

impl TableId {
    pub fn next() -> TableId {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        TableId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// All configurations of one type contributed by a single package
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub package: Arc<ResTablePackage>,

    /// Cookie of the source the package was loaded from
    pub cookie: u32,

    /// Values string pool of the table the package was loaded from
    pub values: Option<Arc<StringPool>>,

    /// Absent when type chunks showed up without a spec, every axis is then treated as varying
    pub spec: Option<ResTableTypeSpec>,

    /// Number of entries declared by the spec
    pub entry_count: u32,

    pub configs: Vec<ResTableType>,

    /// Set when this type comes from an overlay
    pub idmap: Option<IdmapEntries>,
}

impl TypeEntry {
    #[inline]
    pub fn is_overlay(&self) -> bool {
        self.idmap.as_ref().is_some_and(IdmapEntries::has_entries)
    }
}

/// Where a package came from: the cookie and values pool of its table
#[derive(Debug, Clone, Default)]
pub struct PackageSource {
    pub cookie: u32,
    pub values: Option<Arc<StringPool>>,
}

/// Result of [PackageGroup::get_entry]
#[derive(Debug, Clone)]
pub struct Entry {
    pub res_id: u32,
    pub entry: ResTableEntry,

    /// Configuration of the chunk the entry was taken from
    pub config: ResTableConfig,

    /// Union of the type spec flags of every package defining the entry
    pub spec_flags: ResTableConfigFlags,

    pub package: Arc<ResTablePackage>,
    pub cookie: u32,

    /// Values string pool the entry's strings index into
    pub values: Option<Arc<StringPool>>,

    /// Type id inside `package`, differs from the requested one for overlays
    pub type_id: u8,
}

impl Entry {
    pub fn type_name(&self) -> Result<String, DecodeError> {
        self.package.type_name(self.type_id)
    }

    pub fn key_name(&self) -> Result<String, DecodeError> {
        self.package.key_name(self.entry.key())
    }

    /// String `index` of the values pool of the table defining this entry
    pub fn value_string(&self, index: u32) -> Result<String, DecodeError> {
        self.values
            .as_ref()
            .ok_or(DecodeError::StringPool("no values string pool"))?
            .get_string(index)
    }
}

/// Memoized lookups for one requested configuration
#[derive(Debug, Default)]
struct ResolutionCache {
    hasher: RandomState,

    /// Hash of the configuration the cached data was computed for
    config_key: Option<u64>,

    /// Indices into [TypeEntry::configs] matching the configuration, by (type index, type entry)
    filtered: AHashMap<(u8, usize), Arc<[usize]>>,

    bags: AHashMap<u32, Arc<Bag>>,
}

impl ResolutionCache {
    /// Drop everything computed for another configuration
    fn select(&mut self, config: &ResTableConfig) {
        let key = self.hasher.hash_one(config);
        if self.config_key != Some(key) {
            self.clear();
            self.config_key = Some(key);
        }
    }

    fn clear(&mut self) {
        self.config_key = None;
        self.filtered.clear();
        self.bags.clear();
    }
}

#[derive(Debug)]
pub struct PackageGroup {
    pub id: u8,
    pub name: String,

    /// Id was assigned at load time instead of being read from the package
    pub is_dynamic: bool,

    pub packages: Vec<Arc<ResTablePackage>>,

    /// Type entries by type index (type id - 1)
    types: Vec<Vec<TypeEntry>>,

    pub dynamic_ref_table: DynamicRefTable,

    owner: TableId,
    cache: Mutex<ResolutionCache>,
}

impl PackageGroup {
    pub fn new(owner: TableId, id: u8, name: String, app_as_lib: bool, is_dynamic: bool) -> PackageGroup {
        PackageGroup {
            id,
            name,
            is_dynamic,
            packages: Vec::new(),
            types: Vec::new(),
            dynamic_ref_table: DynamicRefTable::new(id, app_as_lib),
            owner,
            cache: Mutex::new(ResolutionCache::default()),
        }
    }

    /// Fresh group for `owner` holding the same packages and types
    pub fn copy_for(&self, owner: TableId) -> PackageGroup {
        PackageGroup {
            id: self.id,
            name: self.name.clone(),
            is_dynamic: self.is_dynamic,
            packages: self.packages.clone(),
            types: self.types.clone(),
            dynamic_ref_table: DynamicRefTable::new(self.id, false),
            owner,
            cache: Mutex::new(ResolutionCache::default()),
        }
    }

    /// Reload library entries from the library chunk of the first package declaring one
    pub fn reload_libraries(&mut self) -> Result<(), DynamicRefError> {
        let library = self.packages.iter().find_map(|package| {
            package.chunks().find_map(|chunk| match chunk {
                Ok(Chunk::Library(library)) => Some(library),
                _ => None,
            })
        });

        match library {
            Some(library) => self.dynamic_ref_table.load(&library),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn owner(&self) -> TableId {
        self.owner
    }

    /// Type entries of the type with index `type_index`
    pub fn types(&self, type_index: u8) -> &[TypeEntry] {
        self.types
            .get(type_index as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Type indices with at least one type entry
    pub fn type_indices(&self) -> impl Iterator<Item = u8> + '_ {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, list)| !list.is_empty())
            .map(|(index, _)| index as u8)
    }

    fn types_mut(&mut self, type_index: u8) -> &mut Vec<TypeEntry> {
        let index = type_index as usize;
        if self.types.len() <= index {
            self.types.resize_with(index + 1, Vec::new);
        }
        &mut self.types[index]
    }

    /// Append every type entry of another group, keeping their order
    pub fn extend_types(&mut self, other: &PackageGroup) {
        for (index, list) in other.types.iter().enumerate() {
            if !list.is_empty() {
                self.types_mut(index as u8).extend(list.iter().cloned());
            }
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, ResolutionCache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Drop cached lookups if this group belongs to `owner`
    pub fn invalidate(&self, owner: TableId) {
        if self.owner == owner {
            self.lock_cache().clear();
        }
    }

    /// Index the type specs and types of `package`
    ///
    /// Malformed chunks are skipped and pushed to `issues`. With an idmap only the
    /// mapped overlay types are added, under their target type index.
    pub fn add_package(
        &mut self,
        package: Arc<ResTablePackage>,
        source: PackageSource,
        idmap: Option<&Idmap>,
        issues: &mut Vec<DecodeError>,
    ) {
        self.packages.push(Arc::clone(&package));

        for chunk in package.chunks() {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!("skipping chunk in package \"{}\": {}", package.name(), e);
                    issues.push(e);
                    continue;
                }
            };

            match chunk {
                Chunk::TypeSpec(spec) => self.add_type_spec(&package, &source, spec, idmap),
                Chunk::Type(ty) => {
                    if let Err(e) = self.add_type(&package, &source, ty, idmap) {
                        warn!("skipping type chunk in package \"{}\": {}", package.name(), e);
                        issues.push(e);
                    }
                }
                Chunk::Library(_) if !self.dynamic_ref_table.entries().is_empty() => {
                    warn!("multiple library chunks in package group \"{}\"", self.name);
                }
                Chunk::Library(library) => {
                    if let Err(e) = self.dynamic_ref_table.load(&library) {
                        warn!("can't load library chunk of package \"{}\": {}", package.name(), e);
                        issues.push(DecodeError::Package("malformed library chunk"));
                    }
                }
                other => debug!("skipping chunk {:?} in package \"{}\"", other.header(), package.name()),
            }
        }
    }

    /// Target type index for a type of an overlay, `None` if the type isn't overlaid
    fn route(type_id: u8, idmap: Option<&Idmap>) -> Option<(u8, Option<IdmapEntries>)> {
        match idmap {
            None => Some((type_id - 1, None)),
            Some(idmap) => idmap
                .entries_for(type_id)
                .map(|entries| (entries.target_type_id - 1, Some(entries.clone()))),
        }
    }

    fn add_type_spec(
        &mut self,
        package: &Arc<ResTablePackage>,
        source: &PackageSource,
        spec: ResTableTypeSpec,
        idmap: Option<&Idmap>,
    ) {
        if spec.entry_count == 0 {
            debug!("skipping empty type spec for type {}", spec.id);
            return;
        }

        let Some((type_index, entries)) = Self::route(spec.id, idmap) else {
            debug!("overlay type {} is not mapped, skipping", spec.id);
            return;
        };

        let list = self.types_mut(type_index);
        if let Some(existing) = list.first()
            && existing.entry_count != spec.entry_count
            && entries.is_none()
        {
            warn!(
                "type spec entry count inconsistent: given {}, previously {}",
                spec.entry_count, existing.entry_count
            );
        }

        list.push(TypeEntry {
            package: Arc::clone(package),
            cookie: source.cookie,
            values: source.values.clone(),
            entry_count: spec.entry_count,
            spec: Some(spec),
            configs: Vec::new(),
            idmap: entries,
        });
    }

    fn add_type(
        &mut self,
        package: &Arc<ResTablePackage>,
        source: &PackageSource,
        ty: ResTableType,
        idmap: Option<&Idmap>,
    ) -> Result<(), DecodeError> {
        if ty.entry_count == 0 {
            debug!("skipping empty type chunk for type {}", ty.id);
            return Ok(());
        }

        let Some((type_index, entries)) = Self::route(ty.id, idmap) else {
            debug!("overlay type {} is not mapped, skipping", ty.id);
            return Ok(());
        };

        let list = self.types_mut(type_index);
        match list.last_mut() {
            Some(last) if Arc::ptr_eq(&last.package, package) => {
                if !ty.is_sparse() && ty.entry_count != last.entry_count {
                    return Err(DecodeError::Type("entry count differs from type spec"));
                }
                last.configs.push(ty);
            }
            _ => {
                debug!("type {} has no type spec, every configuration axis varies", ty.id);
                list.push(TypeEntry {
                    package: Arc::clone(package),
                    cookie: source.cookie,
                    values: source.values.clone(),
                    spec: None,
                    entry_count: if ty.is_sparse() { u16::MAX as u32 + 1 } else { ty.entry_count },
                    configs: vec![ty],
                    idmap: entries,
                });
            }
        }

        Ok(())
    }

    /// Indices of the configurations in `entry` matching `config`, cached per configuration
    fn filtered_configs(
        &self,
        type_index: u8,
        list_index: usize,
        entry: &TypeEntry,
        config: &ResTableConfig,
    ) -> Arc<[usize]> {
        let mut cache = self.lock_cache();
        cache.select(config);

        Arc::clone(cache.filtered.entry((type_index, list_index)).or_insert_with(|| {
            entry
                .configs
                .iter()
                .enumerate()
                .filter(|(_, ty)| ty.config.matches(config))
                .map(|(index, _)| index)
                .collect()
        }))
    }

    pub(crate) fn cached_bag(&self, res_id: u32, config: &ResTableConfig) -> Option<Arc<Bag>> {
        let mut cache = self.lock_cache();
        cache.select(config);
        cache.bags.get(&res_id).cloned()
    }

    pub(crate) fn cache_bag(&self, config: &ResTableConfig, bag: Arc<Bag>) {
        let mut cache = self.lock_cache();
        cache.select(config);
        cache.bags.insert(bag.res_id, bag);
    }

    /// Find the best definition of the entry for `config`
    ///
    /// Without a configuration the first defined entry wins. Overlays win exact
    /// ties against what was loaded before them, for everything else the first
    /// loaded definition is kept.
    pub fn get_entry(
        &self,
        type_index: u8,
        entry_index: u16,
        config: Option<&ResTableConfig>,
    ) -> Result<Entry, ResolveError> {
        let res_id = make_resource_id(self.id, type_index.wrapping_add(1), entry_index);

        let list = self.types(type_index);
        if list.is_empty() {
            debug!("no type with index 0x{:02x} for resource 0x{:08x}", type_index, res_id);
            return Err(ResolveError::BadIndex(res_id));
        }

        struct Best<'a> {
            ty: &'a ResTableType,
            offset: u32,
            source: &'a TypeEntry,
            type_id: u8,
        }

        let mut best: Option<Best> = None;
        let mut spec_flags = ResTableConfigFlags::empty();

        'types: for (list_index, type_entry) in list.iter().enumerate() {
            let mut real_entry = entry_index;
            let mut real_type_id = type_index + 1;
            let mut is_overlay = false;

            if let Some(idmap) = type_entry.idmap.as_ref().filter(|m| m.has_entries()) {
                let Some(mapped) = idmap.lookup(entry_index) else {
                    continue;
                };
                real_entry = mapped;
                real_type_id = idmap.overlay_type_id;
                is_overlay = true;
            }

            if real_entry as u32 >= type_entry.entry_count {
                warn!(
                    "for resource 0x{:08x}, entry index {} is beyond type entry count {}",
                    res_id, real_entry, type_entry.entry_count
                );
                continue;
            }

            spec_flags |= match &type_entry.spec {
                Some(spec) => spec.flags(real_entry).unwrap_or(ResTableConfigFlags::empty()),
                None => ResTableConfigFlags::from_bits_retain(u32::MAX),
            };

            let candidates: Arc<[usize]> = match config {
                Some(config) => self.filtered_configs(type_index, list_index, type_entry, config),
                None => (0..type_entry.configs.len()).collect(),
            };

            for &candidate in candidates.iter() {
                let ty = &type_entry.configs[candidate];
                if !ty.covers(real_entry) {
                    continue;
                }
                let Some(offset) = ty.entry_offset(real_entry) else {
                    continue;
                };

                if let Some(current) = &best
                    && !ty.config.is_better_than(&current.ty.config, config)
                    && (!is_overlay || ty.config.compare(&current.ty.config) != std::cmp::Ordering::Equal)
                {
                    continue;
                }

                best = Some(Best {
                    ty,
                    offset,
                    source: type_entry,
                    type_id: real_type_id,
                });

                if config.is_none() {
                    break 'types;
                }
            }
        }

        let Some(best) = best else {
            return Err(ResolveError::NotFound(res_id));
        };

        let entry = best
            .ty
            .entry(best.offset)
            .map_err(|reason| ResolveError::CorruptData { res_id, reason })?;

        debug!(
            "resource 0x{:08x} resolved to configuration \"{}\"",
            res_id, best.ty.config
        );

        Ok(Entry {
            res_id,
            entry,
            config: best.ty.config,
            spec_flags,
            package: Arc::clone(&best.source.package),
            cookie: best.source.cookie,
            values: best.source.values.clone(),
            type_id: best.type_id,
        })
    }
}
