//! Byte access to single resources of an origin.

use crate::error::{ResourceError, Result};
use crate::origin::ResourceOrigin;
use crate::path;
use crate::walker::archive;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Reads resources addressed by canonical paths relative to the origin root.
pub trait EntrySource {
    /// Streams one resource into `out`, returning the bytes copied.
    fn copy_into(&mut self, relative: &str, out: &mut dyn Write) -> io::Result<u64>;

    /// Human-readable location of a resource (for logging).
    fn describe(&self, relative: &str) -> String;

    fn read(&mut self, relative: &str) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.copy_into(relative, &mut buf)?;
        Ok(buf)
    }
}

pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self, relative: &str) -> PathBuf {
        path::native_join(&self.root, relative)
    }
}

impl EntrySource for DirectorySource {
    fn copy_into(&mut self, relative: &str, out: &mut dyn Write) -> io::Result<u64> {
        let mut file = File::open(self.locate(relative))?;
        io::copy(&mut file, out)
    }

    fn describe(&self, relative: &str) -> String {
        self.locate(relative).display().to_string()
    }
}

/// Entries are looked up by canonical name, whatever separator the
/// archive itself stores.
pub struct ArchiveSource {
    archive: PathBuf,
    prefix: String,
    zip: ZipArchive<File>,
    index: HashMap<String, usize>,
}

impl ArchiveSource {
    pub fn open(archive: &Path, prefix: &str) -> Result<Self> {
        let mut zip = archive::open(archive)?;
        let mut index = HashMap::with_capacity(zip.len());
        for i in 0..zip.len() {
            let entry = zip
                .by_index_raw(i)
                .map_err(|e| ResourceError::archive(archive, e))?;
            index
                .entry(archive::canonical_entry_name(entry.name()))
                .or_insert(i);
        }
        Ok(Self {
            archive: archive.to_path_buf(),
            prefix: path::trim_slashes(prefix).to_string(),
            zip,
            index,
        })
    }

    fn entry_name(&self, relative: &str) -> String {
        path::join_canonical(&[&self.prefix, relative])
    }
}

impl EntrySource for ArchiveSource {
    fn copy_into(&mut self, relative: &str, out: &mut dyn Write) -> io::Result<u64> {
        let name = self.entry_name(relative);
        let Some(&idx) = self.index.get(&name) else {
            return Err(zip_to_io(zip::result::ZipError::FileNotFound));
        };
        let mut entry = self.zip.by_index(idx).map_err(zip_to_io)?;
        io::copy(&mut entry, out)
    }

    fn describe(&self, relative: &str) -> String {
        format!("{}!/{}", self.archive.display(), self.entry_name(relative))
    }
}

fn zip_to_io(err: zip::result::ZipError) -> io::Error {
    match err {
        zip::result::ZipError::Io(e) => e,
        zip::result::ZipError::FileNotFound => {
            io::Error::new(io::ErrorKind::NotFound, "entry not in archive")
        }
        other => io::Error::other(other),
    }
}

/// Opens the matching source for `origin`.
pub fn open_source(origin: &ResourceOrigin) -> Result<Box<dyn EntrySource>> {
    match origin.archive_location() {
        Some((archive, prefix)) => Ok(Box::new(ArchiveSource::open(archive, prefix)?)),
        None => {
            let root = origin.path();
            if !root.is_dir() {
                return Err(ResourceError::NotFound(root.display().to_string()));
            }
            Ok(Box::new(DirectorySource::new(root)))
        }
    }
}

/// Reads the whole resource; the stream is closed on every path.
pub fn read_entry(source: &mut dyn EntrySource, relative: &str) -> Result<Vec<u8>> {
    source.read(relative).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ResourceError::NotFound(source.describe(relative))
        } else {
            ResourceError::Io(e)
        }
    })
}
