use std::cmp::Ordering;

use bitflags::bitflags;
use winnow::binary::le_u32;
use winnow::prelude::*;

use crate::errors::DecodeError;
use crate::structs::{ChunkData, parse_fixed};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StringType: u32 {
        /// If set, the string index is sorted by the string values (based on strcmp16())
        const SORTED = 1 << 0;

        /// String pool is encoded in UTF-8
        const UTF8 = 1 << 8;
    }
}

/// Terminates a style span run
const SPAN_END: u32 = 0xFFFF_FFFF;

/// One styled range of a string: `name` is an index into the same pool (e.g. "b")
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpan {
    pub name: u32,
    pub first_char: u32,
    pub last_char: u32,
}

impl StyleSpan {
    /// Read one span, `None` on the run terminator
    fn parse(input: &mut &[u8]) -> ModalResult<Option<StyleSpan>> {
        let name = le_u32.parse_next(input)?;
        if name == SPAN_END {
            return Ok(None);
        }

        let (first_char, last_char) = (le_u32, le_u32).parse_next(input)?;
        Ok(Some(StyleSpan {
            name,
            first_char,
            last_char,
        }))
    }
}

/// Pool of strings referenced by index
///
/// Strings are decoded on demand straight from the backing bytes, every read
/// is bounds-checked against the chunk, never against the whole buffer.
///
/// [Source code](https://cs.android.com/android/platform/superproject/+/android-latest-release:frameworks/base/libs/androidfw/include/androidfw/ResourceTypes.h;l=449)
#[derive(Debug, Clone)]
pub struct StringPool {
    chunk: ChunkData,

    /// Number of strings in this pool (number of uint32_t indices that follow in the data)
    pub string_count: u32,

    /// Number of style span arrays in the pool (number of uint32_t indices follow the string indices)
    pub style_count: u32,

    pub flags: StringType,

    /// Index from header of the string data
    strings_start: usize,

    /// End of the string data region
    strings_end: usize,

    /// Index from header of the style data
    styles_start: usize,
}

impl StringPool {
    /// 8 bytes chunk header and five u32 fields
    const HEADER_SIZE: usize = 28;

    pub fn parse(chunk: ChunkData) -> Result<StringPool, DecodeError> {
        if (chunk.header.header_size as usize) < Self::HEADER_SIZE {
            return Err(DecodeError::StringPool("header too small"));
        }

        let (string_count, style_count, flags, strings_start, styles_start) = parse_fixed(
            chunk.header_fields(),
            "string pool header",
            (le_u32, le_u32, le_u32, le_u32, le_u32),
        )?;

        let size = chunk.header.size as usize;
        let index_end = chunk.header.header_size as u64 + 4 * (string_count as u64 + style_count as u64);
        if index_end > size as u64 {
            return Err(DecodeError::StringPool("index table exceeds chunk"));
        }

        let strings_start = strings_start as usize;
        let styles_start = styles_start as usize;

        if string_count > 0 && (strings_start < index_end as usize || strings_start >= size) {
            return Err(DecodeError::StringPool("string data outside of chunk"));
        }

        let strings_end = if style_count > 0 {
            if styles_start < strings_start || styles_start >= size {
                return Err(DecodeError::StringPool("style data outside of chunk"));
            }
            styles_start
        } else {
            size
        };

        Ok(StringPool {
            chunk,
            string_count,
            style_count,
            flags: StringType::from_bits_truncate(flags),
            strings_start,
            strings_end,
            styles_start,
        })
    }

    pub(crate) fn chunk(&self) -> &ChunkData {
        &self.chunk
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.string_count as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.string_count == 0
    }

    #[inline]
    pub fn is_utf8(&self) -> bool {
        self.flags.contains(StringType::UTF8)
    }

    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.flags.contains(StringType::SORTED)
    }

    fn index_entry(&self, slot: usize) -> Result<usize, DecodeError> {
        let at = self.chunk.header.header_size as usize + slot * 4;
        let bytes = self.chunk.bytes();

        bytes
            .get(at..at + 4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize)
            .ok_or(DecodeError::StringPool("index table truncated"))
    }

    /// Decode the `index`-th string
    pub fn get_string(&self, index: u32) -> Result<String, DecodeError> {
        if index >= self.string_count {
            return Err(DecodeError::StringIndex {
                index,
                count: self.string_count,
            });
        }

        let offset = self.index_entry(index as usize)?;
        let start = self
            .strings_start
            .checked_add(offset)
            .filter(|start| *start < self.strings_end)
            .ok_or(DecodeError::StringPool("string offset outside of string data"))?;

        let data = &self.chunk.bytes()[start..self.strings_end];

        if self.is_utf8() {
            Self::decode_utf8(data)
        } else {
            Self::decode_utf16(data)
        }
    }

    /// UTF-8 strings are prefixed with the length in UTF-16 units, then the length in bytes
    fn decode_utf8(data: &[u8]) -> Result<String, DecodeError> {
        fn length(data: &[u8], pos: usize) -> Option<(usize, usize)> {
            let first = *data.get(pos)? as usize;
            if first & 0x80 != 0 {
                let second = *data.get(pos + 1)? as usize;
                Some((((first & 0x7f) << 8) | second, pos + 2))
            } else {
                Some((first, pos + 1))
            }
        }

        let truncated = DecodeError::StringPool("utf-8 string exceeds chunk");
        let (_, pos) = length(data, 0).ok_or(truncated.clone())?;
        let (byte_len, pos) = length(data, pos).ok_or(truncated.clone())?;
        let raw = data.get(pos..pos + byte_len).ok_or(truncated)?;

        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    /// UTF-16 strings are prefixed with the length in units, high bit marks a 32-bit length
    fn decode_utf16(data: &[u8]) -> Result<String, DecodeError> {
        let unit = |pos: usize| -> Option<usize> {
            data.get(pos..pos + 2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]) as usize)
        };

        let truncated = DecodeError::StringPool("utf-16 string exceeds chunk");
        let first = unit(0).ok_or(truncated.clone())?;
        let (len, pos) = if first & 0x8000 != 0 {
            let second = unit(2).ok_or(truncated.clone())?;
            (((first & 0x7fff) << 16) | second, 4)
        } else {
            (first, 2)
        };

        let raw = len
            .checked_mul(2)
            .and_then(|bytes| data.get(pos..pos + bytes))
            .ok_or(truncated)?;

        let units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();

        Ok(String::from_utf16_lossy(&units))
    }

    /// Style spans attached to the `index`-th string, empty if the string is not styled
    pub fn get_style_spans(&self, index: u32) -> Result<Vec<StyleSpan>, DecodeError> {
        if index >= self.string_count {
            return Err(DecodeError::StringIndex {
                index,
                count: self.string_count,
            });
        }

        if index >= self.style_count {
            return Ok(Vec::new());
        }

        let offset = self.index_entry((self.string_count + index) as usize)?;
        let bytes = self.chunk.bytes();
        let mut input = self
            .styles_start
            .checked_add(offset)
            .and_then(|start| bytes.get(start..))
            .ok_or(DecodeError::StringPool("style offset outside of chunk"))?;

        let mut spans = Vec::new();
        while let Some(span) = StyleSpan::parse(&mut input)
            .map_err(|_| DecodeError::StringPool("unterminated style span"))?
        {
            spans.push(span);
        }

        Ok(spans)
    }

    /// Find the index of `needle`, binary searching when the pool is sorted
    pub fn index_of(&self, needle: &str) -> Option<u32> {
        if self.is_sorted() {
            let (mut lo, mut hi) = (0u32, self.string_count);
            while lo < hi {
                let mid = lo + (hi - lo) / 2;
                let value = self.get_string(mid).ok()?;
                match value.as_str().cmp(needle) {
                    Ordering::Equal => return Some(mid),
                    Ordering::Less => lo = mid + 1,
                    Ordering::Greater => hi = mid,
                }
            }
            None
        } else {
            (0..self.string_count).find(|&i| self.get_string(i).is_ok_and(|s| s == needle))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// Build a pool chunk, strings are encoded the way aapt2 does it
    fn build_pool(strings: &[&str], utf8: bool, styles: &[Vec<(u32, u32, u32)>]) -> Vec<u8> {
        let mut data = Vec::new();
        let mut offsets = Vec::new();

        for s in strings {
            offsets.push(data.len() as u32);
            if utf8 {
                let utf16_len = s.encode_utf16().count();
                data.push(utf16_len as u8);
                data.push(s.len() as u8);
                data.extend_from_slice(s.as_bytes());
                data.push(0);
            } else {
                let units: Vec<u16> = s.encode_utf16().collect();
                data.extend_from_slice(&(units.len() as u16).to_le_bytes());
                for u in units {
                    data.extend_from_slice(&u.to_le_bytes());
                }
                data.extend_from_slice(&[0, 0]);
            }
        }
        while data.len() % 4 != 0 {
            data.push(0);
        }

        let mut style_data = Vec::new();
        let mut style_offsets = Vec::new();
        for run in styles {
            style_offsets.push(style_data.len() as u32);
            for (name, first, last) in run {
                style_data.extend_from_slice(&name.to_le_bytes());
                style_data.extend_from_slice(&first.to_le_bytes());
                style_data.extend_from_slice(&last.to_le_bytes());
            }
            style_data.extend_from_slice(&SPAN_END.to_le_bytes());
        }

        let header_size = 28u32;
        let strings_start = header_size + 4 * (offsets.len() + style_offsets.len()) as u32;
        let styles_start = if styles.is_empty() {
            0
        } else {
            strings_start + data.len() as u32
        };
        let size = strings_start + data.len() as u32 + style_data.len() as u32;

        let mut out = Vec::new();
        out.extend_from_slice(&0x0001u16.to_le_bytes());
        out.extend_from_slice(&(header_size as u16).to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&(strings.len() as u32).to_le_bytes());
        out.extend_from_slice(&(styles.len() as u32).to_le_bytes());
        out.extend_from_slice(&(if utf8 { StringType::UTF8.bits() } else { 0 }).to_le_bytes());
        out.extend_from_slice(&strings_start.to_le_bytes());
        out.extend_from_slice(&styles_start.to_le_bytes());
        for o in offsets.iter().chain(style_offsets.iter()) {
            out.extend_from_slice(&o.to_le_bytes());
        }
        out.extend_from_slice(&data);
        out.extend_from_slice(&style_data);
        out
    }

    fn pool(raw: Vec<u8>) -> StringPool {
        let buf: Arc<[u8]> = Arc::from(raw);
        let chunk = ChunkData::read(&buf, 0, buf.len()).unwrap();
        StringPool::parse(chunk).unwrap()
    }

    #[test]
    fn utf8_strings() {
        let pool = pool(build_pool(&["app_name", "привет", ""], true, &[]));

        assert!(pool.is_utf8());
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get_string(0).unwrap(), "app_name");
        assert_eq!(pool.get_string(1).unwrap(), "привет");
        assert_eq!(pool.get_string(2).unwrap(), "");
    }

    #[test]
    fn utf16_strings() {
        let pool = pool(build_pool(&["string", "drawable"], false, &[]));

        assert!(!pool.is_utf8());
        assert_eq!(pool.get_string(0).unwrap(), "string");
        assert_eq!(pool.get_string(1).unwrap(), "drawable");
        assert_eq!(pool.index_of("drawable"), Some(1));
        assert_eq!(pool.index_of("layout"), None);
    }

    #[test]
    fn out_of_range_index() {
        let pool = pool(build_pool(&["a"], true, &[]));
        assert_eq!(
            pool.get_string(1).unwrap_err(),
            DecodeError::StringIndex { index: 1, count: 1 }
        );
    }

    #[test]
    fn string_length_past_chunk() {
        let mut raw = build_pool(&["abcd"], true, &[]);
        // byte length of the only string, claims far more than the chunk holds
        raw[28 + 4 + 1] = 0x7f;
        let pool = pool(raw);

        assert!(matches!(
            pool.get_string(0),
            Err(DecodeError::StringPool(_))
        ));
    }

    #[test]
    fn index_table_past_chunk() {
        let mut raw = build_pool(&["a"], true, &[]);
        raw[8..12].copy_from_slice(&1000u32.to_le_bytes());
        let buf: Arc<[u8]> = Arc::from(raw);
        let chunk = ChunkData::read(&buf, 0, buf.len()).unwrap();

        assert!(StringPool::parse(chunk).is_err());
    }

    #[test]
    fn style_spans() {
        let pool = pool(build_pool(
            &["Hello world", "b", "i"],
            true,
            &[vec![(1, 0, 4), (2, 6, 10)]],
        ));

        let spans = pool.get_style_spans(0).unwrap();
        assert_eq!(
            spans,
            vec![
                StyleSpan {
                    name: 1,
                    first_char: 0,
                    last_char: 4
                },
                StyleSpan {
                    name: 2,
                    first_char: 6,
                    last_char: 10
                },
            ]
        );
        assert!(pool.get_style_spans(1).unwrap().is_empty());
        assert!(pool.get_style_spans(3).is_err());
    }
}
