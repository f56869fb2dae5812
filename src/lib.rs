//! The library code for `catgen`, a build step for Jekyll-style blogs that
//! generates one listing page per post category. The work breaks down into
//! three steps:
//!
//! 1. Loading the site: its configuration ([`crate::config`]), its posts
//!    ([`crate::post`]), and its layouts ([`crate::layout`]), bundled together
//!    as a [`crate::site::Site`].
//! 2. Generating the category pages ([`crate::category`]). This is a pure pass
//!    over the loaded posts: every distinct entry of the posts' `categories`
//!    front matter becomes one page at `blog/categories/{name}.html`. Posts
//!    with missing or malformed `categories` are skipped rather than
//!    rejected, and a site without a `category` layout gets no pages at all.
//! 3. Writing the pages ([`crate::write`]), either as page stubs (front
//!    matter and an empty body) for the site's own renderer, or rendered
//!    through the `category` layout.
//!
//! [`crate::build::build_site`] runs all three.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod category;
pub mod config;
pub mod frontmatter;
pub mod layout;
pub mod page;
pub mod post;
pub mod site;
pub mod write;
