//! Byte suppliers for resource tables
//!
//! Tables are usually stored inside an archive, the archive reader only needs to
//! hand out entries by name.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Upper bound of the buffer reserved up front, larger entries grow while reading
const MAX_PREALLOCATION: usize = 16 * 1024 * 1024;

pub trait AssetSource {
    /// Open the entry `name` for reading
    fn open_entry(&self, name: &str) -> io::Result<Box<dyn Read + '_>>;

    /// Uncompressed length of the entry `name`
    fn length(&self, name: &str) -> io::Result<u64>;

    /// Read the whole entry into memory
    fn read_entry(&self, name: &str) -> io::Result<Vec<u8>> {
        let length = self.length(name)?;
        let capacity = usize::try_from(length).map_or(MAX_PREALLOCATION, |l| l.min(MAX_PREALLOCATION));
        let mut data = Vec::with_capacity(capacity);

        // one byte past the declared length tells a longer entry apart
        let read = self
            .open_entry(name)?
            .take(length.saturating_add(1))
            .read_to_end(&mut data)?;
        if read as u64 != length {
            let kind = if (read as u64) < length {
                io::ErrorKind::UnexpectedEof
            } else {
                io::ErrorKind::InvalidData
            };
            return Err(io::Error::new(
                kind,
                format!("entry \"{name}\" declares {length} bytes, read {read}"),
            ));
        }

        Ok(data)
    }
}

/// Entries are files below a directory, e.g. an unpacked APK
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl AsRef<Path>) -> DirectorySource {
        DirectorySource {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path(&self, name: &str) -> io::Result<PathBuf> {
        let relative = Path::new(name);
        if relative.is_absolute() || relative.components().any(|c| c.as_os_str() == "..") {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("entry name \"{name}\" escapes the source directory"),
            ));
        }

        Ok(self.root.join(relative))
    }
}

impl AssetSource for DirectorySource {
    fn open_entry(&self, name: &str) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(self.path(name)?)?))
    }

    fn length(&self, name: &str) -> io::Result<u64> {
        Ok(std::fs::metadata(self.path(name)?)?.len())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct MemorySource(HashMap<&'static str, Vec<u8>>);

    impl AssetSource for MemorySource {
        fn open_entry(&self, name: &str) -> io::Result<Box<dyn Read + '_>> {
            match self.0.get(name) {
                Some(data) => Ok(Box::new(data.as_slice())),
                None => Err(io::ErrorKind::NotFound.into()),
            }
        }

        fn length(&self, name: &str) -> io::Result<u64> {
            match self.0.get(name) {
                // lies about the lengths of "short", "long" and "huge"
                Some(data) if name == "short" => Ok(data.len() as u64 + 1),
                Some(data) if name == "long" => Ok(data.len() as u64 - 1),
                Some(_) if name == "huge" => Ok(u64::MAX),
                Some(data) => Ok(data.len() as u64),
                None => Err(io::ErrorKind::NotFound.into()),
            }
        }
    }

    #[test]
    fn read_whole_entry() {
        let source = MemorySource(HashMap::from([
            ("resources.arsc", vec![1, 2, 3]),
            ("short", vec![1]),
            ("long", vec![1, 2]),
            ("huge", vec![1]),
        ]));

        assert_eq!(source.read_entry("resources.arsc").unwrap(), vec![1, 2, 3]);
        assert_eq!(
            source.read_entry("short").unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
        assert_eq!(
            source.read_entry("long").unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
        assert_eq!(
            source.read_entry("huge").unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
        assert_eq!(
            source.read_entry("missing").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn directory_rejects_escaping_names() {
        let source = DirectorySource::new("/tmp");
        assert_eq!(
            source.length("../etc/passwd").unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
    }
}
