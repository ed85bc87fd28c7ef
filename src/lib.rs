//! The library code for the `almanac` static site generator. A site is a
//! directory of dated posts (`_posts/2008-11-05-my-awesome-post.md`) and
//! layouts (`_layouts/*.html`). Building it breaks down into these steps:
//!
//! 1. Loading posts: each post's date and slug come from its file name, and its
//!    front matter and body from the file itself ([`crate::post`],
//!    [`crate::frontmatter`])
//! 2. Choosing related posts for each post ([`crate::related`])
//! 3. Applying layouts ([`crate::layout`])
//! 4. Writing each post to `{destination}/{url}/index.html` ([`crate::write`])
//!
//! A post's URL is `/{year}/{month}/{day}/{slug}/` unless its front matter
//! sets a `permalink`. Related posts are either ranked by a text-similarity
//! engine, supplied by the caller as a [`related::Classifier`], or are simply
//! the first ten other posts.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod frontmatter;
pub mod layout;
pub mod markdown;
pub mod post;
pub mod related;
pub mod value;
pub mod write;
