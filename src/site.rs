//! The in-memory site handed to the category generator: every post and the
//! registry of available layouts. Loading reads everything from disk up
//! front so that generation itself is a pure pass over memory.

use crate::category::{self, CategoryPage};
use crate::config::Config;
use crate::layout::{self, Layouts};
use crate::post::{self, Parser as PostParser, Post};
use std::fmt;

/// A loaded site.
#[derive(Debug, Clone, Default)]
pub struct Site {
    pub posts: Vec<Post>,
    pub layouts: Layouts,
}

impl Site {
    /// Loads the posts and layouts described by `config`.
    pub fn load(config: &Config) -> Result<Site> {
        let posts = PostParser::new(&config.posts_directory).parse_posts()?;
        let layouts = Layouts::load(&config.layouts_directory)?;
        tracing::debug!(
            posts = posts.len(),
            layouts = layouts.len(),
            "loaded site"
        );
        Ok(Site { posts, layouts })
    }

    /// Generates the site's category pages. See [`category::generate`].
    pub fn category_pages(&self) -> Vec<CategoryPage> {
        category::generate(&self.posts, &self.layouts)
    }
}

/// Represents the result of loading a [`Site`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a [`Site`].
#[derive(Debug)]
pub enum Error {
    /// Returned for errors parsing posts.
    Post(post::Error),

    /// Returned for errors loading layouts.
    Layout(layout::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Post(err) => err.fmt(f),
            Error::Layout(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Post(err) => Some(err),
            Error::Layout(err) => Some(err),
        }
    }
}

impl From<post::Error> for Error {
    /// Converts [`post::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: post::Error) -> Error {
        Error::Post(err)
    }
}

impl From<layout::Error> for Error {
    /// Converts [`layout::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: layout::Error) -> Error {
        Error::Layout(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn config(root: &Path) -> Config {
        Config {
            source_directory: root.to_owned(),
            posts_directory: root.join("_posts"),
            layouts_directory: root.join("_layouts"),
            destination_directory: root.join("_site"),
            site_url: None,
        }
    }

    #[test]
    fn test_load_and_generate() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("_posts")).unwrap();
        fs::create_dir_all(root.join("_layouts")).unwrap();
        fs::write(
            root.join("_posts/2021-01-01-a.md"),
            "---\ncategories: [ruby, web-development]\n---\n",
        )
        .unwrap();
        fs::write(
            root.join("_posts/2021-01-02-b.md"),
            "---\ncategories: [ruby]\n---\n",
        )
        .unwrap();
        fs::write(root.join("_layouts/category.html"), "").unwrap();

        let site = Site::load(&config(root))?;
        assert_eq!(2, site.posts.len());
        assert_eq!(
            vec![
                CategoryPage::new("ruby"),
                CategoryPage::new("web-development")
            ],
            site.category_pages()
        );
        Ok(())
    }

    #[test]
    fn test_empty_site() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let site = Site::load(&config(dir.path()))?;
        assert!(site.posts.is_empty());
        assert!(site.layouts.is_empty());
        assert!(site.category_pages().is_empty());
        Ok(())
    }
}
