//! Exports the [`build_site`] function which stitches together the high-level
//! steps of a build: loading the site ([`crate::site`]), generating the
//! category pages ([`crate::category`]), and writing them to disk
//! ([`crate::write`]).

use crate::category::{CategoryPage, DIRECTORY, LAYOUT};
use crate::config::Config;
use crate::frontmatter;
use crate::layout::{Error as LayoutError, Layout};
use crate::site::{Error as SiteError, Site};
use crate::write::{Error as WriteError, Mode, Writer};
use gtmpl::Template;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for a single build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Render pages through the `category` layout instead of writing page
    /// stubs.
    pub render: bool,

    /// Where pages are written. Defaults to the source directory for stubs
    /// (so the site's renderer picks them up) and to the destination
    /// directory for rendered pages.
    pub output_directory: Option<PathBuf>,

    /// Delete stale category pages from `{output}/blog/categories` before
    /// writing. Only `.html` files directly in that directory are candidates.
    /// Page stubs are recognized by their `layout: category` front matter, so
    /// hand-written files next to them survive. Rendered pages carry no
    /// marker; with `render` set, every candidate is deleted.
    pub clean: bool,
}

impl BuildOptions {
    /// Resolves the output directory for `config`.
    pub fn output_directory<'a>(&'a self, config: &'a Config) -> &'a Path {
        match &self.output_directory {
            Some(dir) => dir,
            None if self.render => &config.destination_directory,
            None => &config.source_directory,
        }
    }
}

/// The outcome of a build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// The generated pages, in output order.
    pub pages: Vec<CategoryPage>,

    /// The files written for `pages`.
    pub written: Vec<PathBuf>,
}

/// Builds the category pages for the site described by `config`. If the site
/// has no `category` layout the build does nothing; that's how a site opts
/// out of category pages, so it isn't an error.
pub fn build_site(config: &Config, options: &BuildOptions) -> Result<Report> {
    let site = Site::load(config)?;
    let layout = match site.layouts.get(LAYOUT) {
        Some(layout) => layout,
        None => {
            tracing::info!(
                layouts = %config.layouts_directory.display(),
                "no `{}` layout found; skipping category pages",
                LAYOUT
            );
            return Ok(Report::default());
        }
    };

    let pages = site.category_pages();
    let output_directory = options.output_directory(config);
    if options.clean {
        clean_pages(&output_directory.join(DIRECTORY), options.render)?;
    }

    // Parse the layout only when it's needed.
    let template = match options.render {
        true => Some(parse_template(layout)?),
        false => None,
    };
    let writer = Writer {
        mode: match &template {
            Some(template) => Mode::Render(template),
            None => Mode::Stub,
        },
        output_directory,
        site_url: config.site_url.as_ref(),
    };
    let written = writer.write_pages(&pages)?;

    tracing::info!(
        posts = site.posts.len(),
        pages = written.len(),
        output = %output_directory.display(),
        "wrote category pages"
    );
    Ok(Report { pages, written })
}

/// Loads the layout's source and parses it into a template. Front matter on
/// the layout (e.g., a parent `layout:` key) is stripped.
fn parse_template(layout: &Layout) -> Result<Template> {
    let source = layout.source()?;
    let body: &str = match frontmatter::has_front_matter(&source) {
        true => frontmatter::split(&source)
            .map_err(|err| Error::LayoutFrontMatter {
                path: layout.path.clone(),
                err,
            })?
            .1,
        false => &source,
    };

    let mut template = Template::default();
    template.parse(body).map_err(|err| Error::ParseTemplate {
        path: layout.path.clone(),
        err,
    })?;
    Ok(template)
}

/// Deletes the category pages directly in `dir` (see [`BuildOptions::clean`]).
/// A missing directory has nothing to clean.
fn clean_pages(dir: &Path, rendered: bool) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(clean_error(dir)(e)),
    };
    for entry in entries {
        let path = entry.map_err(clean_error(dir))?.path();
        let is_html = path.extension().map_or(false, |ext| ext == "html");
        if !is_html || !path.is_file() {
            continue;
        }
        if rendered || is_page_stub(&fs::read(&path).map_err(clean_error(&path))?) {
            fs::remove_file(&path).map_err(clean_error(&path))?;
            tracing::debug!(path = %path.display(), "removed stale category page");
        }
    }
    Ok(())
}

/// Returns `true` if `contents` opens with front matter naming the
/// `category` layout. Files that can't be read as front matter aren't stubs.
fn is_page_stub(contents: &[u8]) -> bool {
    let contents = String::from_utf8_lossy(contents);
    match frontmatter::parse(&contents) {
        Ok((data, _)) => {
            let layout = frontmatter::get(&data, "layout").and_then(|v| v.as_str());
            layout == Some(LAYOUT)
        }
        Err(_) => false,
    }
}

fn clean_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error {
    let path = path.to_owned();
    move |err| Error::Clean { path, err }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during loading,
/// writing, cleaning the output directory, and parsing the layout.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading the site.
    Site(SiteError),

    /// Returned for errors reading the layout.
    Layout(LayoutError),

    /// Returned when the layout's front matter is malformed.
    LayoutFrontMatter {
        path: PathBuf,
        err: frontmatter::Error,
    },

    /// Returned for errors parsing the layout as a template.
    ParseTemplate { path: PathBuf, err: String },

    /// Returned for errors writing pages to disk.
    Write(WriteError),

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Site(err) => err.fmt(f),
            Error::Layout(err) => err.fmt(f),
            Error::LayoutFrontMatter { path, err } => {
                write!(f, "Reading layout '{}': {}", path.display(), err)
            }
            Error::ParseTemplate { path, err } => {
                write!(f, "Parsing layout '{}': {}", path.display(), err)
            }
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Site(err) => Some(err),
            Error::Layout(err) => Some(err),
            Error::LayoutFrontMatter { path: _, err } => Some(err),
            Error::ParseTemplate { .. } => None,
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
        }
    }
}

impl From<SiteError> for Error {
    /// Converts [`SiteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: SiteError) -> Error {
        Error::Site(err)
    }
}

impl From<LayoutError> for Error {
    /// Converts [`LayoutError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: LayoutError) -> Error {
        Error::Layout(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}
