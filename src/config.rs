//! Loads the site configuration from a Jekyll-style `_config.yml`. Only the
//! keys this tool needs are read; everything else in the file is ignored.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the site configuration file.
pub const CONFIG_FILE: &str = "_config.yml";

#[derive(Deserialize)]
#[serde(default)]
struct Project {
    /// The site source directory, relative to the configuration file.
    source: PathBuf,

    /// The rendered site directory, relative to the configuration file.
    destination: PathBuf,

    /// The layouts directory, relative to the source directory.
    layouts_dir: PathBuf,

    /// The site's scheme and host, e.g. `https://example.com`.
    url: Option<String>,

    /// The path the site is served under, e.g. `/blog`.
    baseurl: Option<String>,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            source: PathBuf::from("."),
            destination: PathBuf::from("_site"),
            layouts_dir: PathBuf::from("_layouts"),
            url: None,
            baseurl: None,
        }
    }
}

/// The resolved site configuration. All paths are absolute or relative to the
/// working directory, never to the configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The site source directory. Page stubs are written here by default.
    pub source_directory: PathBuf,

    /// The directory holding the posts (`{source}/_posts`).
    pub posts_directory: PathBuf,

    /// The directory holding the layout templates.
    pub layouts_directory: PathBuf,

    /// The rendered site directory. Rendered pages are written here by
    /// default.
    pub destination_directory: PathBuf,

    /// The absolute URL of the site root (`url` joined with `baseurl`), if
    /// configured.
    pub site_url: Option<Url>,
}

impl Config {
    /// Searches `dir` and each of its ancestors for `_config.yml` and loads
    /// the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let mut current = Some(dir);
        while let Some(dir) = current {
            let path = dir.join(CONFIG_FILE);
            if path.is_file() {
                return Config::from_project_file(&path);
            }
            current = dir.parent();
        }
        Err(Error::NotFound(dir.to_owned()))
    }

    /// Loads the configuration from the file at `path`.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;

        // An empty document isn't a mapping, but an empty config file is
        // perfectly valid.
        let project: Project = if contents.trim().is_empty() {
            Project::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|err| {
                Error::DeserializeYaml {
                    path: path.to_owned(),
                    err,
                }
            })?
        };

        let root_directory = match path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
            Some(parent) => parent.to_owned(),
            None => PathBuf::from("."),
        };
        let source_directory = root_directory.join(&project.source);
        Ok(Config {
            posts_directory: source_directory.join("_posts"),
            layouts_directory: source_directory.join(&project.layouts_dir),
            destination_directory: root_directory.join(&project.destination),
            site_url: site_url(project.url.as_deref(), project.baseurl.as_deref())?,
            source_directory,
        })
    }
}

/// Combines Jekyll's `url` and `baseurl` into the site root URL. The result
/// always ends in a slash so it can be joined onto. Blank values count as
/// unset.
fn site_url(url: Option<&str>, baseurl: Option<&str>) -> Result<Option<Url>> {
    let url = match url.map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => return Ok(None),
    };
    let baseurl = baseurl.map(str::trim).unwrap_or("").trim_matches('/');

    let mut joined = url.trim_end_matches('/').to_owned();
    if !baseurl.is_empty() {
        joined.push('/');
        joined.push_str(baseurl);
    }
    joined.push('/');
    Ok(Some(Url::parse(&joined)?))
}

/// Represents the result of a configuration operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when no `_config.yml` exists in the starting directory or any
    /// of its ancestors.
    NotFound(PathBuf),

    /// Returned for I/O problems while reading the configuration file.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the configuration file isn't valid YAML or has values of
    /// the wrong type.
    DeserializeYaml { path: PathBuf, err: serde_yaml::Error },

    /// Returned when `url`/`baseurl` don't form a valid URL.
    UrlParse(url::ParseError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(dir) => write!(
                f,
                "Could not find `{}` in '{}' or any parent directory",
                CONFIG_FILE,
                dir.display()
            ),
            Error::Open { path, err } => {
                write!(f, "Opening config file '{}': {}", path.display(), err)
            }
            Error::DeserializeYaml { path, err } => {
                write!(f, "Loading config file '{}': {}", path.display(), err)
            }
            Error::UrlParse(err) => write!(f, "Invalid site url: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotFound(_) => None,
            Error::Open { path: _, err } => Some(err),
            Error::DeserializeYaml { path: _, err } => Some(err),
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}
