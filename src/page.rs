//! Output-side views of a [`CategoryPage`]: where the page lands, the
//! metadata an external renderer expects, the page stub written for such a
//! renderer, and the [`Value`] handed to templates.

use crate::category::{CategoryPage, DIRECTORY, LAYOUT};
use gtmpl::Value;
use serde_yaml::{Mapping, Value as Yaml};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

impl CategoryPage {
    /// The output directory relative to the site root.
    pub fn dir(&self) -> &'static str {
        DIRECTORY
    }

    pub fn file_name(&self) -> String {
        format!("{}.html", self.name)
    }

    /// The output path relative to the site root, i.e.
    /// `blog/categories/{name}.html`.
    pub fn output_path(&self) -> PathBuf {
        Path::new(self.dir()).join(self.file_name())
    }

    /// The name of the layout the page is rendered with.
    pub fn layout(&self) -> &'static str {
        LAYOUT
    }

    /// Category pages have no body; the layout renders everything.
    pub fn content(&self) -> &'static str {
        ""
    }

    /// The page metadata, in order: `category-name`, `title`, `layout`.
    pub fn data(&self) -> Mapping {
        let mut data = Mapping::new();
        data.insert(
            Yaml::String(String::from("category-name")),
            Yaml::String(self.name.clone()),
        );
        data.insert(
            Yaml::String(String::from("title")),
            Yaml::String(self.title.clone()),
        );
        data.insert(
            Yaml::String(String::from("layout")),
            Yaml::String(String::from(self.layout())),
        );
        data
    }

    /// The absolute URL of the page under `site_url`. The category name is
    /// percent-encoded as a single path segment. Returns `None` if `site_url`
    /// can't have a path (e.g., `mailto:` URLs).
    pub fn url(&self, site_url: &Url) -> Option<Url> {
        let mut url = site_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(self.dir().split('/'))
            .push(&self.file_name());
        Some(url)
    }

    /// Renders the page as a page source for an external renderer: YAML
    /// front matter holding [`CategoryPage::data`], followed by the (empty)
    /// content.
    pub fn to_stub(&self) -> Result<String, serde_yaml::Error> {
        let mut stub = serde_yaml::to_string(&self.data())?;
        if !stub.starts_with("---") {
            stub.insert_str(0, "---\n");
        }
        if !stub.ends_with('\n') {
            stub.push('\n');
        }
        stub.push_str("---\n");
        stub.push_str(self.content());
        Ok(stub)
    }

    /// Converts the page into a [`Value`] for templating. The result is a
    /// [`Value::Object`] with fields `category_name`, `title`, `layout`,
    /// `content`, `path`, `url` (nil without a `site_url`), and `data`, which
    /// holds the page metadata under its original hyphenated keys for use
    /// with `index` (e.g., `{{index .page.data "category-name"}}`).
    pub fn to_value(&self, site_url: Option<&Url>) -> Value {
        let mut data: HashMap<String, Value> = HashMap::new();
        data.insert("category-name".to_owned(), Value::String(self.name.clone()));
        data.insert("title".to_owned(), Value::String(self.title.clone()));
        data.insert("layout".to_owned(), Value::String(self.layout().to_owned()));

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("category_name".to_owned(), Value::String(self.name.clone()));
        m.insert("title".to_owned(), Value::String(self.title.clone()));
        m.insert("layout".to_owned(), Value::String(self.layout().to_owned()));
        m.insert("content".to_owned(), Value::String(self.content().to_owned()));
        m.insert(
            "path".to_owned(),
            Value::String(format!("{}/{}", self.dir(), self.file_name())),
        );
        m.insert(
            "url".to_owned(),
            match site_url.and_then(|site_url| self.url(site_url)) {
                Some(url) => Value::String(url.to_string()),
                None => Value::Nil,
            },
        );
        m.insert("data".to_owned(), Value::Object(data));
        Value::Object(m)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frontmatter;
    use pretty_assertions::assert_eq;

    fn string(value: &Value) -> &str {
        match value {
            Value::String(s) => s,
            _ => panic!("expected a string, got {:?}", value),
        }
    }

    #[test]
    fn test_output_path() {
        let page = CategoryPage::new("web-development");
        assert_eq!("blog/categories", page.dir());
        assert_eq!("web-development.html", page.file_name());
        assert_eq!(
            Path::new("blog/categories/web-development.html"),
            page.output_path()
        );
        assert_eq!("category", page.layout());
        assert_eq!("", page.content());
    }

    #[test]
    fn test_data() {
        let data = CategoryPage::new("web-development").data();
        let entries: Vec<(&str, &str)> = data
            .iter()
            .map(|(k, v)| (k.as_str().unwrap(), v.as_str().unwrap()))
            .collect();
        assert_eq!(
            vec![
                ("category-name", "web-development"),
                ("title", "Web Development - Categories"),
                ("layout", "category"),
            ],
            entries
        );
    }

    #[test]
    fn test_to_stub() -> Result<(), frontmatter::Error> {
        let page = CategoryPage::new("ruby");
        let stub = page.to_stub()?;
        assert!(stub.starts_with("---\n"), "{}", stub);
        assert!(stub.ends_with("---\n"), "{}", stub);

        let (data, body) = frontmatter::parse(&stub)?;
        assert_eq!(page.data(), data);
        assert_eq!("", body);
        Ok(())
    }

    #[test]
    fn test_url() -> Result<(), url::ParseError> {
        let page = CategoryPage::new("web-development");
        for site_url in &["https://example.com", "https://example.com/"] {
            assert_eq!(
                "https://example.com/blog/categories/web-development.html",
                page.url(&Url::parse(site_url)?).unwrap().as_str()
            );
        }
        assert_eq!(
            "https://example.com/me/blog/categories/c%23.html",
            CategoryPage::new("c#")
                .url(&Url::parse("https://example.com/me/")?)
                .unwrap()
                .as_str()
        );
        assert_eq!(None, page.url(&Url::parse("mailto:me@example.com")?));
        Ok(())
    }

    #[test]
    fn test_to_value() -> Result<(), url::ParseError> {
        let page = CategoryPage::new("web-development");
        let site_url = Url::parse("https://example.com/")?;
        let obj = match page.to_value(Some(&site_url)) {
            Value::Object(obj) => obj,
            other => panic!("expected an object, got {:?}", other),
        };
        assert_eq!("web-development", string(&obj["category_name"]));
        assert_eq!("Web Development - Categories", string(&obj["title"]));
        assert_eq!("category", string(&obj["layout"]));
        assert_eq!("", string(&obj["content"]));
        assert_eq!(
            "blog/categories/web-development.html",
            string(&obj["path"])
        );
        assert_eq!(
            "https://example.com/blog/categories/web-development.html",
            string(&obj["url"])
        );
        match &obj["data"] {
            Value::Object(data) => {
                assert_eq!("web-development", string(&data["category-name"]))
            }
            other => panic!("expected an object, got {:?}", other),
        }

        match page.to_value(None) {
            Value::Object(obj) => assert!(matches!(obj["url"], Value::Nil)),
            other => panic!("expected an object, got {:?}", other),
        }
        Ok(())
    }
}
