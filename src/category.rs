//! The category page generator. Every distinct category found across the
//! posts' `categories` front matter becomes one [`CategoryPage`], as long as
//! the site has a layout to render those pages with.
//!
//! Generation never fails: posts whose `categories` are missing or malformed
//! simply contribute nothing (see [`Post::categories`]). The generator also
//! doesn't touch the site; it returns the pages and the caller decides what
//! to do with them (see [`crate::write`]).

use crate::layout::Layouts;
use crate::post::Post;
use std::collections::BTreeSet;

/// The name of the layout category pages are rendered with. Without it, no
/// category pages are generated.
pub const LAYOUT: &str = "category";

/// The directory, relative to the site root, holding the category pages.
pub const DIRECTORY: &str = "blog/categories";

const TITLE_SUFFIX: &str = " - Categories";

/// A generated listing page for one category. The page has no content of its
/// own; the [`LAYOUT`] template does all of the rendering from the page's
/// metadata. See [`crate::page`] for the page's output path and its
/// conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPage {
    /// The raw category identifier (e.g., `web-development`).
    pub name: String,

    /// The human-readable title (e.g., `Web Development - Categories`).
    pub title: String,
}

impl CategoryPage {
    pub fn new(name: &str) -> CategoryPage {
        CategoryPage {
            name: name.to_owned(),
            title: format_title(name),
        }
    }
}

/// Generates one [`CategoryPage`] per distinct category across `posts`,
/// ordered by category name. Returns no pages if `layouts` has no
/// [`LAYOUT`] layout.
pub fn generate(posts: &[Post], layouts: &Layouts) -> Vec<CategoryPage> {
    if !layouts.contains(LAYOUT) {
        return Vec::new();
    }
    collect_categories(posts)
        .iter()
        .map(|name| CategoryPage::new(name))
        .collect()
}

/// Collects the distinct category names across `posts`.
pub fn collect_categories(posts: &[Post]) -> BTreeSet<String> {
    posts.iter().flat_map(|post| post.categories()).collect()
}

/// Formats a category name as a page title: the name is split on hyphens,
/// each segment is capitalized (first letter upper-cased, the rest
/// lower-cased), the segments are joined with spaces, and ` - Categories` is
/// appended. Trailing empty segments are dropped, so `ruby-` is `Ruby`.
pub fn format_title(name: &str) -> String {
    let mut segments: Vec<&str> = name.split('-').collect();
    while segments.last().map_or(false, |s| s.is_empty()) {
        segments.pop();
    }
    let formatted = segments
        .iter()
        .map(|segment| capitalize(segment))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}{}", formatted, TITLE_SUFFIX)
}

/// Title-cases the first character of `segment` and lower-cases the rest.
fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => {
            let mut capitalized = titlecase(first);
            capitalized.extend(chars.flat_map(char::to_lowercase));
            capitalized
        }
        None => String::new(),
    }
}

/// Returns the title case of `c`. Rust only exposes upper and lower case, so
/// the four Latin digraphs with a dedicated title-case letter are mapped by
/// hand. Any other character whose upper case spans several characters
/// (`ß` → `SS`, `ﬁ` → `FI`) keeps only the first of them upper-cased.
fn titlecase(c: char) -> String {
    match c {
        'Ǆ' | 'ǅ' | 'ǆ' => String::from("ǅ"),
        'Ǉ' | 'ǈ' | 'ǉ' => String::from("ǈ"),
        'Ǌ' | 'ǋ' | 'ǌ' => String::from("ǋ"),
        'Ǳ' | 'ǲ' | 'ǳ' => String::from("ǲ"),
        _ => {
            let mut upper = c.to_uppercase();
            let mut titled: String = upper.next().into_iter().collect();
            titled.extend(upper.flat_map(char::to_lowercase));
            titled
        }
    }
}
