//! The registry of layout templates available to a site. Layouts are looked
//! up by name, which is the file stem of the template (`_layouts/category.html`
//! is the `category` layout). Template text is only read when a page is
//! rendered.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// A single layout template on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub name: String,
    pub path: PathBuf,
}

impl Layout {
    /// Reads the template source.
    pub fn source(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|err| Error::Read {
            path: self.path.clone(),
            err,
        })
    }
}

/// The layouts of a site, keyed by name.
#[derive(Debug, Default, Clone)]
pub struct Layouts(BTreeMap<String, Layout>);

impl Layouts {
    /// Registers every regular file directly inside `dir` as a layout. Hidden
    /// files are skipped. A missing directory yields an empty registry. If two
    /// files share a stem (`category.html` and `category.liquid`), the first
    /// in file-name order wins.
    pub fn load(dir: &Path) -> Result<Layouts> {
        let mut layouts = Layouts::default();
        if !dir.is_dir() {
            return Ok(layouts);
        }

        let read_err = |err| Error::Read {
            path: dir.to_owned(),
            err,
        };
        let mut entries = fs::read_dir(dir)
            .map_err(read_err)?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(read_err)?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            if !entry.file_type().map_err(read_err)?.is_file() {
                continue;
            }
            let path = entry.path();
            let name = match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(name) if !name.is_empty() && !name.starts_with('.') => {
                    name.to_owned()
                }
                _ => continue,
            };
            layouts.0.entry(name.clone()).or_insert(Layout { name, path });
        }
        Ok(layouts)
    }

    /// Adds a layout, replacing any existing layout with the same name.
    pub fn insert(&mut self, layout: Layout) {
        self.0.insert(layout.name.clone(), layout);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Layout> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Represents the result of a layout operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading layouts.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while reading a layout file or listing the
    /// layouts directory.
    Read { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => {
                write!(f, "Reading layout '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
        }
    }
}
