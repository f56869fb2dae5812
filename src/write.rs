use crate::category::CategoryPage;
use gtmpl::{Context, Template, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// How [`Writer`] turns a [`CategoryPage`] into a file.
#[derive(Clone, Copy)]
pub enum Mode<'a> {
    /// Write a page source (front matter and empty body) for an external
    /// renderer to pick up.
    Stub,

    /// Render the page through the given layout template.
    Render(&'a Template),
}

/// Responsible for templating and writing [`CategoryPage`]s to disk.
pub struct Writer<'a> {
    pub mode: Mode<'a>,

    /// The directory pages are written under. A page lands at
    /// `{output_directory}/blog/categories/{name}.html`.
    pub output_directory: &'a Path,

    /// The site root URL, made available to templates for absolute links.
    pub site_url: Option<&'a Url>,
}

impl Writer<'_> {
    /// Writes every page and returns the paths written, in order. A page
    /// whose name would place it outside of its directory is refused before
    /// anything is written.
    pub fn write_pages(&self, pages: &[CategoryPage]) -> Result<Vec<PathBuf>> {
        for page in pages {
            check_name(&page.name)?;
        }

        let categories = Value::Array(
            pages.iter().map(|p| p.to_value(self.site_url)).collect(),
        );
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let mut written = Vec::with_capacity(pages.len());
        for page in pages {
            let path = self.output_directory.join(page.output_path());
            if let Some(dir) = path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    fs::create_dir_all(dir).map_err(|err| Error::Write {
                        path: dir.to_owned(),
                        err,
                    })?;
                }
            }
            self.write_page(page, &path, &categories)?;
            tracing::debug!(path = %path.display(), "wrote category page");
            written.push(path);
        }
        Ok(written)
    }

    /// Takes a single [`CategoryPage`], templates it (in [`Mode::Render`]),
    /// and writes it to `path`. The page is rendered in memory before the file
    /// is created.
    fn write_page(
        &self,
        page: &CategoryPage,
        path: &Path,
        categories: &Value,
    ) -> Result<()> {
        let contents = match self.mode {
            Mode::Stub => page.to_stub()?.into_bytes(),
            Mode::Render(template) => {
                let mut m: HashMap<String, Value> = HashMap::new();
                m.insert("page".to_owned(), page.to_value(self.site_url));
                m.insert("categories".to_owned(), categories.clone());
                m.insert(
                    "site_url".to_owned(),
                    match self.site_url {
                        Some(url) => Value::String(url.to_string()),
                        None => Value::Nil,
                    },
                );
                let mut buf: Vec<u8> = Vec::new();
                template.execute(&mut buf, &Context::from(Value::Object(m))?)?;
                buf
            }
        };
        fs::write(path, contents).map_err(|err| Error::Write {
            path: path.to_owned(),
            err,
        })
    }
}

/// Category names become file names verbatim, so a name holding a path
/// separator could write outside of the categories directory.
fn check_name(name: &str) -> Result<()> {
    if name.contains(|c: char| c == '/' || c == '\\' || c == '\0') {
        return Err(Error::UnsafeName(name.to_owned()));
    }
    Ok(())
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error serializing a page stub's front matter.
    Stub(serde_yaml::Error),

    /// Returned when a category name can't be used as a file name.
    UnsafeName(String),

    /// An error writing an output file or creating its directory.
    Write { path: PathBuf, err: io::Error },
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator when building page stubs.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Stub(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Stub(err) => err.fmt(f),
            Error::UnsafeName(name) => {
                write!(f, "category `{}` can't be used as a file name", name)
            }
            Error::Write { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Stub(err) => Some(err),
            Error::UnsafeName(_) => None,
            Error::Write { path: _, err } => Some(err),
        }
    }
}
