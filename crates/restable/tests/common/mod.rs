//! Builder for small ARSC images used by the integration tests

#![allow(dead_code)]

use restable::{ResTableConfig, ResourceValueType};

pub const RES_STRING_POOL: u16 = 0x0001;
pub const RES_TABLE: u16 = 0x0002;
pub const RES_PACKAGE: u16 = 0x0200;
pub const RES_TYPE: u16 = 0x0201;
pub const RES_TYPE_SPEC: u16 = 0x0202;
pub const RES_LIBRARY: u16 = 0x0203;

pub const NO_ENTRY: u32 = 0xFFFF_FFFF;

fn chunk(type_: u16, header: &[u8], body: &[u8]) -> Vec<u8> {
    let header_size = 8 + header.len();
    let size = header_size + body.len();
    assert_eq!(size % 4, 0, "chunks must stay 4-byte aligned");

    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(&type_.to_le_bytes());
    out.extend_from_slice(&(header_size as u16).to_le_bytes());
    out.extend_from_slice(&(size as u32).to_le_bytes());
    out.extend_from_slice(header);
    out.extend_from_slice(body);
    out
}

fn utf16_field(value: &str, bytes: usize) -> Vec<u8> {
    let mut out: Vec<u8> = value.encode_utf16().flat_map(u16::to_le_bytes).collect();
    out.resize(bytes, 0);
    out
}

/// UTF-8 string pool without styles
pub fn string_pool(strings: &[&str]) -> Vec<u8> {
    let mut data = Vec::new();
    let mut offsets = Vec::new();

    for s in strings {
        offsets.push(data.len() as u32);
        data.push(s.encode_utf16().count() as u8);
        data.push(s.len() as u8);
        data.extend_from_slice(s.as_bytes());
        data.push(0);
    }
    while data.len() % 4 != 0 {
        data.push(0);
    }

    let strings_start = 28 + 4 * offsets.len() as u32;

    let mut header = Vec::new();
    header.extend_from_slice(&(strings.len() as u32).to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&0x100u32.to_le_bytes());
    header.extend_from_slice(&strings_start.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());

    let mut body = Vec::new();
    for offset in offsets {
        body.extend_from_slice(&offset.to_le_bytes());
    }
    body.extend_from_slice(&data);

    chunk(RES_STRING_POOL, &header, &body)
}

/// 64-byte on-disk configuration
pub fn config_bytes(config: &ResTableConfig) -> Vec<u8> {
    let mut out = Vec::with_capacity(64);
    out.extend_from_slice(&64u32.to_le_bytes());
    out.extend_from_slice(&config.mcc.to_le_bytes());
    out.extend_from_slice(&config.mnc.to_le_bytes());
    out.extend_from_slice(&config.language);
    out.extend_from_slice(&config.country);
    out.push(config.orientation);
    out.push(config.touchscreen);
    out.extend_from_slice(&config.density.to_le_bytes());
    out.push(config.keyboard);
    out.push(config.navigation);
    out.push(config.input_flags);
    out.push(config.grammatical_inflection);
    out.extend_from_slice(&config.screen_width.to_le_bytes());
    out.extend_from_slice(&config.screen_height.to_le_bytes());
    out.extend_from_slice(&config.sdk_version.to_le_bytes());
    out.extend_from_slice(&config.minor_version.to_le_bytes());
    out.push(config.screen_layout);
    out.push(config.ui_mode);
    out.extend_from_slice(&config.smallest_screen_width_dp.to_le_bytes());
    out.extend_from_slice(&config.screen_width_dp.to_le_bytes());
    out.extend_from_slice(&config.screen_height_dp.to_le_bytes());
    out.extend_from_slice(&config.locale_script);
    out.extend_from_slice(&config.locale_variant);
    out.push(config.screen_layout2);
    out.push(config.color_mode);
    out.extend_from_slice(&[0, 0]);
    out.push(config.locale_script_was_computed as u8);
    out.extend_from_slice(&config.locale_numbering_system);
    out.resize(64, 0);
    out
}

/// Value stored in an entry
#[derive(Debug, Clone, Copy)]
pub struct Value {
    pub data_type: ResourceValueType,
    pub data: u32,
}

impl Value {
    pub fn int(data: u32) -> Value {
        Value {
            data_type: ResourceValueType::Dec,
            data,
        }
    }

    pub fn reference(data: u32) -> Value {
        Value {
            data_type: ResourceValueType::Reference,
            data,
        }
    }

    pub fn dynamic_reference(data: u32) -> Value {
        Value {
            data_type: ResourceValueType::DynamicReference,
            data,
        }
    }

    pub fn string(index: u32) -> Value {
        Value {
            data_type: ResourceValueType::String,
            data: index,
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&8u16.to_le_bytes());
        out.push(0);
        out.push(self.data_type.raw());
        out.extend_from_slice(&self.data.to_le_bytes());
    }
}

#[derive(Debug, Clone)]
pub enum Entry {
    Simple { key: u32, value: Value },
    Bag {
        key: u32,
        parent: u32,
        values: Vec<(u32, Value)>,
    },
}

impl Entry {
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Entry::Simple { key, value } => {
                out.extend_from_slice(&8u16.to_le_bytes());
                out.extend_from_slice(&0u16.to_le_bytes());
                out.extend_from_slice(&key.to_le_bytes());
                value.encode(&mut out);
            }
            Entry::Bag {
                key,
                parent,
                values,
            } => {
                out.extend_from_slice(&16u16.to_le_bytes());
                out.extend_from_slice(&1u16.to_le_bytes());
                out.extend_from_slice(&key.to_le_bytes());
                out.extend_from_slice(&parent.to_le_bytes());
                out.extend_from_slice(&(values.len() as u32).to_le_bytes());
                for (name, value) in values {
                    out.extend_from_slice(&name.to_le_bytes());
                    value.encode(&mut out);
                }
            }
        }
        out
    }
}

/// One configuration of a type
#[derive(Debug, Clone)]
pub struct Config {
    pub config: ResTableConfig,
    pub entries: Vec<Option<Entry>>,
    pub sparse: bool,

    /// Raw offsets replacing the computed ones, by entry index
    pub offset_overrides: Vec<(usize, u32)>,
}

impl Config {
    pub fn new(config: ResTableConfig, entries: Vec<Option<Entry>>) -> Config {
        Config {
            config,
            entries,
            sparse: false,
            offset_overrides: Vec::new(),
        }
    }

    pub fn sparse(mut self) -> Config {
        self.sparse = true;
        self
    }

    pub fn override_offset(mut self, index: usize, offset: u32) -> Config {
        self.offset_overrides.push((index, offset));
        self
    }

    fn encode(&self, type_id: u8) -> Vec<u8> {
        let mut data = Vec::new();
        let mut offsets = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            match entry {
                Some(entry) => {
                    offsets.push((index, data.len() as u32));
                    data.extend_from_slice(&entry.encode());
                }
                None => offsets.push((index, NO_ENTRY)),
            }
        }

        for (index, offset) in &self.offset_overrides {
            offsets[*index].1 = *offset;
        }

        let mut index_table = Vec::new();
        let entry_count = if self.sparse {
            let present: Vec<_> = offsets.iter().filter(|(_, o)| *o != NO_ENTRY).collect();
            for (index, offset) in &present {
                index_table.extend_from_slice(&(*index as u16).to_le_bytes());
                index_table.extend_from_slice(&((*offset / 4) as u16).to_le_bytes());
            }
            present.len() as u32
        } else {
            for (_, offset) in &offsets {
                index_table.extend_from_slice(&offset.to_le_bytes());
            }
            offsets.len() as u32
        };

        let header_size = 8 + 12 + 64;
        let entries_start = (header_size + index_table.len()) as u32;

        let mut header = vec![type_id, if self.sparse { 0x01 } else { 0x00 }, 0, 0];
        header.extend_from_slice(&entry_count.to_le_bytes());
        header.extend_from_slice(&entries_start.to_le_bytes());
        header.extend_from_slice(&config_bytes(&self.config));

        let mut body = index_table;
        body.extend_from_slice(&data);
        chunk(RES_TYPE, &header, &body)
    }
}

#[derive(Debug, Clone)]
pub struct Type {
    pub id: u8,
    pub name: String,
    pub spec_flags: Vec<u32>,
    pub with_spec: bool,
    pub configs: Vec<Config>,
}

impl Type {
    pub fn new(id: u8, name: &str, entry_count: usize) -> Type {
        Type {
            id,
            name: name.to_owned(),
            spec_flags: vec![0; entry_count],
            with_spec: true,
            configs: Vec::new(),
        }
    }

    pub fn config(mut self, config: Config) -> Type {
        self.configs.push(config);
        self
    }

    pub fn spec_flags(mut self, flags: Vec<u32>) -> Type {
        self.spec_flags = flags;
        self
    }

    pub fn without_spec(mut self) -> Type {
        self.with_spec = false;
        self
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if self.with_spec {
            let mut header = vec![self.id, 0, 0, 0];
            header.extend_from_slice(&(self.spec_flags.len() as u32).to_le_bytes());
            let body: Vec<u8> = self.spec_flags.iter().flat_map(|f| f.to_le_bytes()).collect();
            out.extend_from_slice(&chunk(RES_TYPE_SPEC, &header, &body));
        }
        for config in &self.configs {
            out.extend_from_slice(&config.encode(self.id));
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct Package {
    pub id: u32,
    pub name: String,
    pub keys: Vec<String>,
    pub types: Vec<Type>,
    pub libraries: Vec<(u32, String)>,
    pub type_id_offset: u32,
}

impl Package {
    pub fn new(id: u32, name: &str, keys: &[&str]) -> Package {
        Package {
            id,
            name: name.to_owned(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
            types: Vec::new(),
            libraries: Vec::new(),
            type_id_offset: 0,
        }
    }

    pub fn type_id_offset(mut self, offset: u32) -> Package {
        self.type_id_offset = offset;
        self
    }

    pub fn with_type(mut self, ty: Type) -> Package {
        self.types.push(ty);
        self
    }

    pub fn library(mut self, id: u32, name: &str) -> Package {
        self.libraries.push((id, name.to_owned()));
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        // type names are indexed by type id - 1
        let max_type = self.types.iter().map(|t| t.id).max().unwrap_or(0) as usize;
        let mut type_names = vec![String::new(); max_type];
        for ty in &self.types {
            type_names[ty.id as usize - 1] = ty.name.clone();
        }
        let type_names: Vec<&str> = type_names.iter().map(String::as_str).collect();
        let keys: Vec<&str> = self.keys.iter().map(String::as_str).collect();

        let type_pool = string_pool(&type_names);
        let key_pool = string_pool(&keys);

        let header_size = 288u32;
        let type_strings = header_size;
        let key_strings = header_size + type_pool.len() as u32;

        let mut header = Vec::new();
        header.extend_from_slice(&self.id.to_le_bytes());
        header.extend_from_slice(&utf16_field(&self.name, 256));
        header.extend_from_slice(&type_strings.to_le_bytes());
        header.extend_from_slice(&(type_names.len() as u32).to_le_bytes());
        header.extend_from_slice(&key_strings.to_le_bytes());
        header.extend_from_slice(&(keys.len() as u32).to_le_bytes());
        header.extend_from_slice(&self.type_id_offset.to_le_bytes());

        let mut body = Vec::new();
        body.extend_from_slice(&type_pool);
        body.extend_from_slice(&key_pool);

        if !self.libraries.is_empty() {
            let header = (self.libraries.len() as u32).to_le_bytes();
            let mut entries = Vec::new();
            for (id, name) in &self.libraries {
                entries.extend_from_slice(&id.to_le_bytes());
                entries.extend_from_slice(&utf16_field(name, 256));
            }
            body.extend_from_slice(&chunk(RES_LIBRARY, &header, &entries));
        }

        for ty in &self.types {
            body.extend_from_slice(&ty.encode());
        }

        chunk(RES_PACKAGE, &header, &body)
    }
}

/// Complete resource table with a values pool and packages
pub fn table(values: &[&str], packages: &[Package]) -> Vec<u8> {
    let mut body = string_pool(values);
    for package in packages {
        body.extend_from_slice(&package.encode());
    }

    chunk(RES_TABLE, &(packages.len() as u32).to_le_bytes(), &body)
}

/// Idmap routing overlay types into `target_package`
///
/// Every map is `(target type, overlay type, first target entry, overlay entries)`.
pub fn idmap(target_package: u16, maps: &[(u16, u16, u16, &[u32])]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0x504D_4449u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&[0u8; 512]);
    out.extend_from_slice(&target_package.to_le_bytes());
    out.extend_from_slice(&(maps.len() as u16).to_le_bytes());

    for (target, overlay, offset, entries) in maps {
        out.extend_from_slice(&target.to_le_bytes());
        out.extend_from_slice(&overlay.to_le_bytes());
        out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        for entry in *entries {
            out.extend_from_slice(&entry.to_le_bytes());
        }
    }
    out
}

pub fn simple(key: u32, value: Value) -> Option<Entry> {
    Some(Entry::Simple { key, value })
}

pub fn bag(key: u32, parent: u32, values: &[(u32, Value)]) -> Option<Entry> {
    Some(Entry::Bag {
        key,
        parent,
        values: values.to_vec(),
    })
}
