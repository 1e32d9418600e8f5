use std::io;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer ends before the structure being read
    #[error("truncated buffer: need {needed} bytes at offset 0x{offset:x}, only {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Chunk header sizes are inconsistent with each other or with the buffer
    #[error(
        "invalid chunk header at 0x{offset:x}: type=0x{type_:04x} header_size={header_size} size={size}"
    )]
    InvalidHeader {
        offset: usize,
        type_: u16,
        header_size: u16,
        size: u32,
    },

    /// Nested chunk does not start on a 4-byte boundary of its container
    #[error("chunk at 0x{0:x} is not aligned to a 4-byte boundary")]
    Misaligned(usize),

    /// Root chunk type is not something a resource table can start with
    #[error("unknown root chunk type 0x{0:04x}")]
    UnknownRootChunk(u16),

    /// Root chunk is a known chunk, but not a resource table
    #[error("expected resource table chunk, got type 0x{0:04x}")]
    NotATable(u16),

    /// Table header declares a different number of packages than it holds
    #[error("table declares {declared} packages, found {found}")]
    PackageCount { declared: u32, found: u32 },

    /// Got error while parsing string pool
    #[error("got error while parsing string pool: {0}")]
    StringPool(&'static str),

    /// Requested string index is outside of the pool
    #[error("string index {index} out of range, pool holds {count} strings")]
    StringIndex { index: u32, count: u32 },

    /// Got error while parsing resource table package
    #[error("got error while parsing resource table package: {0}")]
    Package(&'static str),

    /// Got error while parsing type spec chunk
    #[error("got error while parsing type spec chunk: {0}")]
    TypeSpec(&'static str),

    /// Got error while parsing type chunk
    #[error("got error while parsing type chunk: {0}")]
    Type(&'static str),

    /// Got error while parsing a fixed-layout structure
    #[error("got error while parsing {0}")]
    Parse(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DynamicRefError {
    /// Library chunk claims more entries than its payload holds
    #[error("library chunk declares {count} entries, but only {capacity} fit")]
    Size { count: u32, capacity: u32 },

    /// Library entry carries a package id that does not fit in 8 bits
    #[error("library package id 0x{0:x} is out of range")]
    Range(u32),

    /// Value is not a reference or attribute
    #[error("value type 0x{0:02x} can't be rewritten as a reference")]
    Type(u8),

    /// Build-time package id has no runtime mapping
    #[error("no runtime package id for build-time package 0x{package_id:02x} (resource 0x{res_id:08x})")]
    Unresolved { package_id: u8, res_id: u32 },

    /// Tables belong to different packages and can't be merged
    #[error("dynamic reference tables are assigned to different packages: 0x{ours:02x} != 0x{theirs:02x}")]
    AssignedIdMismatch { ours: u8, theirs: u8 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No configuration of any loaded type chunk defines this entry
    #[error("resource 0x{0:08x} not found")]
    NotFound(u32),

    /// Package or type part of the resource id is unknown
    #[error("bad resource index 0x{0:08x}")]
    BadIndex(u32),

    /// Entry offset points outside of its chunk or is misaligned
    #[error("corrupt entry data for resource 0x{res_id:08x}: {reason}")]
    CorruptData { res_id: u32, reason: &'static str },

    /// Entry is a bag, but a plain value was requested
    #[error("resource 0x{0:08x} is a complex entry")]
    ComplexEntry(u32),

    /// Entry is a plain value, but a bag was requested
    #[error("resource 0x{0:08x} is not a bag")]
    NotABag(u32),

    /// Reference or bag parent chain loops or is too deep
    #[error("reference chain starting at 0x{0:08x} is circular or too deep")]
    CircularReference(u32),

    #[error(transparent)]
    DynamicRef(#[from] DynamicRefError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigParseError {
    /// Token is not a known qualifier, or appears out of order
    #[error("unexpected qualifier \"{0}\"")]
    UnexpectedQualifier(String),

    /// Locale qualifier is malformed
    #[error("invalid locale qualifier \"{0}\"")]
    InvalidLocale(String),

    /// Numeric qualifier doesn't fit its field
    #[error("number out of range in qualifier \"{0}\"")]
    InvalidNumber(String),
}

#[derive(Error, Debug)]
pub enum IdmapError {
    /// Buffer doesn't start with the idmap magic
    #[error("bad idmap magic 0x{0:08x}")]
    Magic(u32),

    /// Unsupported idmap version
    #[error("unsupported idmap version {0}")]
    Version(u32),

    /// Got error while parsing idmap structure
    #[error("got error while parsing idmap: {0}")]
    Parse(&'static str),
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Idmap(#[from] IdmapError),

    #[error(transparent)]
    DynamicRef(#[from] DynamicRefError),

    /// Two tables define the same package id for different packages
    #[error("package id 0x{id:02x} is used by both \"{ours}\" and \"{theirs}\"")]
    PackageIdCollision { id: u8, ours: String, theirs: String },

    /// Byte source failed to provide an entry
    #[error(transparent)]
    Io(#[from] io::Error),
}
