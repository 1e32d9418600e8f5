use std::fmt;
use std::sync::Arc;

use log::warn;

use crate::errors::DecodeError;
use crate::structs::{
    ResChunkHeader, ResTableLibrary, ResTablePackage, ResTableType, ResTableTypeSpec,
    ResourceType, StringPool, parse_fixed,
};

/// A validated chunk inside a shared byte buffer
///
/// Holding the buffer by [Arc] lets typed chunks decode their payload lazily
/// without copying it out of the loaded table.
#[derive(Clone)]
pub struct ChunkData {
    buf: Arc<[u8]>,
    start: usize,
    pub header: ResChunkHeader,
}

impl ChunkData {
    /// Read and validate the chunk header at `start`, the chunk must end before `end`
    pub fn read(buf: &Arc<[u8]>, start: usize, end: usize) -> Result<ChunkData, DecodeError> {
        let end = end.min(buf.len());
        let available = end.saturating_sub(start);

        if available < ResChunkHeader::size_of() {
            return Err(DecodeError::Truncated {
                offset: start,
                needed: ResChunkHeader::size_of(),
                available,
            });
        }

        let header = parse_fixed(&buf[start..end], "chunk header", ResChunkHeader::parse)?;
        header.validate(start, available)?;

        Ok(ChunkData {
            buf: Arc::clone(buf),
            start,
            header,
        })
    }

    /// Whole chunk, header included
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.buf[self.start..self.start + self.header.size as usize]
    }

    /// Type-specific header fields that follow the common 8-byte header
    #[inline]
    pub fn header_fields(&self) -> &[u8] {
        &self.bytes()[ResChunkHeader::size_of()..self.header.header_size as usize]
    }

    /// Offset of this chunk inside the backing buffer
    #[inline]
    pub fn offset(&self) -> usize {
        self.start
    }

    pub(crate) fn buffer(&self) -> &Arc<[u8]> {
        &self.buf
    }

    /// Iterate over nested chunks stored after the header
    pub fn children(&self) -> ChunkIter {
        ChunkIter {
            buf: Arc::clone(&self.buf),
            container: self.start,
            pos: self.start + self.header.header_size as usize,
            end: self.start + self.header.size as usize,
            failed: false,
        }
    }
}

impl fmt::Debug for ChunkData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkData")
            .field("offset", &self.start)
            .field("header", &self.header)
            .finish()
    }
}

/// Iterator over the chunks nested in a container
///
/// Stops after the first malformed child, a broken size field makes the rest unreachable.
pub struct ChunkIter {
    buf: Arc<[u8]>,
    container: usize,
    pos: usize,
    end: usize,
    failed: bool,
}

impl Iterator for ChunkIter {
    type Item = Result<ChunkData, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.end {
            return None;
        }

        if (self.pos - self.container) % 4 != 0 {
            self.failed = true;
            return Some(Err(DecodeError::Misaligned(self.pos)));
        }

        match ChunkData::read(&self.buf, self.pos, self.end) {
            Ok(chunk) => {
                self.pos += chunk.header.size as usize;
                Some(Ok(chunk))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Resource table header, the root of an ARSC file
///
/// [Source code](https://cs.android.com/android/platform/superproject/+/android-latest-release:frameworks/base/libs/androidfw/include/androidfw/ResourceTypes.h;l=906)
#[derive(Debug, Clone)]
pub struct ResTableHeader {
    pub chunk: ChunkData,

    /// The number of [ResTablePackage] structures
    pub package_count: u32,
}

impl ResTableHeader {
    pub fn parse(chunk: ChunkData) -> Result<ResTableHeader, DecodeError> {
        let package_count = parse_fixed(
            chunk.header_fields(),
            "table header",
            winnow::binary::le_u32,
        )?;

        Ok(ResTableHeader {
            chunk,
            package_count,
        })
    }
}

/// Typed view over a decoded chunk
#[derive(Debug)]
pub enum Chunk {
    Table(ResTableHeader),
    StringPool(StringPool),
    Package(ResTablePackage),
    TypeSpec(ResTableTypeSpec),
    Type(ResTableType),
    Library(ResTableLibrary),
    Unknown(ChunkData),
}

impl Chunk {
    /// Read the chunk at `start` and dispatch on its type
    pub fn parse(buf: &Arc<[u8]>, start: usize, end: usize) -> Result<Chunk, DecodeError> {
        let chunk = ChunkData::read(buf, start, end)?;
        Self::from_data(chunk)
    }

    pub fn from_data(chunk: ChunkData) -> Result<Chunk, DecodeError> {
        match chunk.header.type_ {
            ResourceType::Table => ResTableHeader::parse(chunk).map(Chunk::Table),
            ResourceType::StringPool => StringPool::parse(chunk).map(Chunk::StringPool),
            ResourceType::TablePackage => ResTablePackage::parse(chunk).map(Chunk::Package),
            ResourceType::TableTypeSpec => ResTableTypeSpec::parse(chunk).map(Chunk::TypeSpec),
            ResourceType::TableType => ResTableType::parse(chunk).map(Chunk::Type),
            ResourceType::TableLibrary => Ok(Chunk::Library(ResTableLibrary::new(chunk))),
            _ => Ok(Chunk::Unknown(chunk)),
        }
    }

    pub fn header(&self) -> &ResChunkHeader {
        match self {
            Chunk::Table(v) => &v.chunk.header,
            Chunk::StringPool(v) => &v.chunk().header,
            Chunk::Package(v) => &v.chunk.header,
            Chunk::TypeSpec(v) => &v.chunk.header,
            Chunk::Type(v) => &v.chunk.header,
            Chunk::Library(v) => &v.chunk.header,
            Chunk::Unknown(v) => &v.header,
        }
    }
}

/// Decode the root chunk of a resource table
pub fn decode_root(buf: &Arc<[u8]>) -> Result<ResTableHeader, DecodeError> {
    let chunk = ChunkData::read(buf, 0, buf.len())?;

    match chunk.header.type_ {
        ResourceType::Table => {}
        ResourceType::Unknown(v) => return Err(DecodeError::UnknownRootChunk(v)),
        other => return Err(DecodeError::NotATable(other.raw())),
    }

    if (chunk.header.size as usize) < buf.len() {
        warn!(
            "resource table occupies {} of {} bytes, ignoring trailing data",
            chunk.header.size,
            buf.len()
        );
    }

    ResTableHeader::parse(chunk)
}
