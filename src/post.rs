//! Defines the [`Post`], [`Parser`], and [`Error`] types, along with the logic
//! for parsing posts from the file system into memory. Posts are kept close
//! to their source: the whole front matter mapping is retained and read
//! through the lenient accessors in [`crate::frontmatter`].

use crate::frontmatter;
use regex::Regex;
use serde_yaml::Mapping;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use walkdir::{DirEntry, WalkDir};

/// File extensions recognized as post sources.
const POST_EXTENSIONS: &[&str] = &["md", "markdown", "html"];

static DATED_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

/// Matches post file names of the form `YYYY-MM-DD-title.ext`.
fn dated_name_regex() -> &'static Regex {
    DATED_NAME_REGEX.get_or_init(|| {
        Regex::new(r"^\d{2,4}-\d{1,2}-\d{1,2}-.+\.[^.]+$")
            .expect("failed to compile regex for post file names")
    })
}

/// Represents a blog post.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// The path of the source file relative to the posts directory, less the
    /// extension (e.g., the ID for `_posts/2021/2021-04-16-hello.md` is
    /// `2021/2021-04-16-hello`).
    pub id: String,

    /// The post's front matter.
    pub data: Mapping,
}

impl Post {
    /// Parses a single [`Post`] from an `id` and the source file contents.
    /// Only the front matter is kept; the body is rendered elsewhere.
    pub fn parse(id: &str, input: &str) -> Result<Post> {
        let (data, _) = frontmatter::parse(input)?;
        Ok(Post {
            id: id.to_owned(),
            data,
        })
    }

    /// Returns `false` if the front matter sets `published` to `false` (or
    /// leaves it empty). Unpublished posts aren't part of the site.
    pub fn published(&self) -> bool {
        !frontmatter::is_falsy(frontmatter::get(&self.data, "published"))
    }

    /// Returns the post's category identifiers in the order they were
    /// written. A `categories` key that is missing or isn't a list yields no
    /// categories; see [`frontmatter::string_seq`] for how entries are read.
    pub fn categories(&self) -> Vec<String> {
        frontmatter::string_seq(frontmatter::get(&self.data, "categories"))
    }
}

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// The directory holding the post sources (typically `{source}/_posts`).
    posts_directory: &'a Path,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser for the posts in `posts_directory`.
    pub fn new(posts_directory: &'a Path) -> Parser<'a> {
        Parser { posts_directory }
    }

    /// Walks the posts directory (including sub-directories) and returns the
    /// published posts found, ordered by ID. A file is a post if its name is
    /// dated (`YYYY-MM-DD-title.ext`), it has a `.md`, `.markdown`, or `.html`
    /// extension, and it opens with a front matter fence. Other files are
    /// skipped, as are names beginning with `.`, `_`, or `#` and editor
    /// backups ending in `~`. Posts whose front matter has `published: false`
    /// are dropped. A missing posts directory has no posts.
    pub fn parse_posts(&self) -> Result<Vec<Post>> {
        if !self.posts_directory.is_dir() {
            tracing::debug!(
                directory = %self.posts_directory.display(),
                "posts directory not found"
            );
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();
        let walker = WalkDir::new(self.posts_directory)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_ignored(entry));
        for result in walker {
            let entry = result?;
            if entry.file_type().is_file() && is_post_source(entry.path()) {
                match self.parse_post(entry.path())? {
                    Some(post) if post.published() => posts.push(post),
                    Some(post) => {
                        tracing::debug!(id = %post.id, "skipping unpublished post")
                    }
                    None => {}
                }
            }
        }

        posts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(posts)
    }

    /// Parses the post at `path`, annotating any error with the path.
    /// Returns `None` for files without front matter.
    fn parse_post(&self, path: &Path) -> Result<Option<Post>> {
        match self._parse_post(path) {
            Ok(post) => Ok(post),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(&self, path: &Path) -> Result<Option<Post>> {
        let contents = fs::read_to_string(path)?;
        if !frontmatter::has_front_matter(&contents) {
            tracing::debug!(path = %path.display(), "skipping file without front matter");
            return Ok(None);
        }

        // strip_prefix() shouldn't fail since the walk is rooted at
        // `posts_directory`
        let relative = path.strip_prefix(self.posts_directory).unwrap_or(path);
        let id = relative
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        Post::parse(&id, &contents).map(Some)
    }
}

fn is_post_source(path: &Path) -> bool {
    let has_post_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| POST_EXTENSIONS.contains(&ext));
    has_post_extension
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| dated_name_regex().is_match(name))
}

fn is_ignored(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.')
        || name.starts_with('_')
        || name.starts_with('#')
        || name.ends_with('~')
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post's front matter can't be read.
    FrontMatter(frontmatter::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontMatter(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontMatter(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<frontmatter::Error> for Error {
    fn from(err: frontmatter::Error) -> Error {
        Error::FrontMatter(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking the posts directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_categories() -> Result<()> {
        let post = Post::parse(
            "hello",
            "---\ntitle: Hello\ncategories: [ruby, web-development]\n---\nBody",
        )?;
        assert_eq!(vec!["ruby", "web-development"], post.categories());
        Ok(())
    }

    #[test]
    fn test_categories_lenient() -> Result<()> {
        for input in &[
            "---\ntitle: Hello\n---\n",
            "---\ncategories:\n---\n",
            "---\ncategories: ~\n---\n",
            "---\ncategories: ruby\n---\n",
            "---\ncategories: {ruby: true}\n---\n",
        ] {
            assert!(Post::parse("p", input)?.categories().is_empty(), "{}", input);
        }
        Ok(())
    }

    #[test]
    fn test_parse_posts() -> Result<()> {
        let dir = TempDir::new()?;
        write(
            dir.path(),
            "2021-04-16-b.md",
            "---\ncategories: [ruby]\n---\n",
        );
        write(
            dir.path(),
            "archive/2019-01-01-a.markdown",
            "---\ntitle: Old\n---\n",
        );
        write(dir.path(), "notes.txt", "---\ncategories: [txt]\n---\n");
        write(dir.path(), "no-front-matter.md", "# Just text\n");
        write(dir.path(), ".hidden.md", "---\ncategories: [hidden]\n---\n");
        write(dir.path(), "_drafts/x.md", "---\ncategories: [draft]\n---\n");
        write(dir.path(), "backup.md~", "---\n---\n");

        let posts = Parser::new(dir.path()).parse_posts()?;
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(vec!["2021-04-16-b", "archive/2019-01-01-a"], ids);
        Ok(())
    }

    #[test]
    fn test_parse_posts_skips_unpublished_and_undated() -> Result<()> {
        let dir = TempDir::new()?;
        write(dir.path(), "2021-01-01-a.md", "---\ncategories: [ruby]\n---\n");
        write(
            dir.path(),
            "2021-01-02-secret.md",
            "---\npublished: false\ncategories: [secret-project]\n---\n",
        );
        write(dir.path(), "notes.md", "---\ncategories: [undated]\n---\n");

        let posts = Parser::new(dir.path()).parse_posts()?;
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(vec!["2021-01-01-a"], ids);
        assert_eq!(vec!["ruby"], posts[0].categories());
        Ok(())
    }

    #[test]
    fn test_published() -> Result<()> {
        assert!(Post::parse("p", "---\ntitle: x\n---\n")?.published());
        assert!(Post::parse("p", "---\npublished: true\n---\n")?.published());
        assert!(!Post::parse("p", "---\npublished: false\n---\n")?.published());
        assert!(!Post::parse("p", "---\npublished:\n---\n")?.published());
        Ok(())
    }

    #[test]
    fn test_is_post_source() {
        assert!(is_post_source(Path::new("2021-04-16-hello.md")));
        assert!(is_post_source(Path::new("a/21-4-6-hello.html")));
        assert!(!is_post_source(Path::new("hello.md")));
        assert!(!is_post_source(Path::new("2021-04-16.md")));
        assert!(!is_post_source(Path::new("2021-04-16-hello.txt")));
    }

    #[test]
    fn test_parse_posts_missing_directory() -> Result<()> {
        let dir = TempDir::new()?;
        let posts = Parser::new(&dir.path().join("_posts")).parse_posts()?;
        assert!(posts.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_posts_annotates_errors() -> Result<()> {
        let dir = TempDir::new()?;
        write(
            dir.path(),
            "2021-01-01-broken.md",
            "---\ncategories: [unclosed\n---\n",
        );
        match Parser::new(dir.path()).parse_posts() {
            Err(Error::Annotated(annotation, err)) => {
                assert!(annotation.contains("2021-01-01-broken.md"));
                assert!(matches!(
                    *err,
                    Error::FrontMatter(frontmatter::Error::DeserializeYaml(_))
                ));
            }
            other => panic!("expected an annotated error, got {:?}", other),
        }
        Ok(())
    }
}
