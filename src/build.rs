//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: loading the posts
//! ([`crate::post`]), choosing related posts ([`crate::related`]), applying
//! layouts ([`crate::layout`]), and writing the pages ([`crate::write`]).

use crate::config::Config;
use crate::layout::{self, Error as LayoutError};
use crate::post::{self, Error as PostError, Post, POSTS_DIRECTORY};
use crate::related::{Classifier, ClassifierCache, RelatedPosts};
use crate::write::{self, Error as WriteError};
use gtmpl::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Builds the site in `source` according to `config`, returning the paths of
/// the pages written. `classifier` is only consulted when `config.lsi` is set;
/// if it's set without one, related posts fall back to positional selection.
pub fn build_site(
    source: &Path,
    config: &Config,
    classifier: Option<Box<dyn Classifier>>,
) -> Result<Vec<PathBuf>> {
    let mut posts = read_posts(source)?;
    info!("Loaded {} posts", posts.len());

    for post in posts.iter_mut() {
        post.apply_time_override()
            .map_err(|e| annotate(post, Error::Post(e)))?;
        post.transform();
    }
    posts.sort();

    let layouts = layout::load_layouts(&config.layouts_in(source))?;
    let site_payload = site_payload(&posts);

    // Related posts are drawn from `site.posts` order, newest first.
    let newest_first: Vec<&Post> = posts.iter().rev().collect();

    let mut related = RelatedPosts::new(match (config.lsi, classifier) {
        (true, Some(classifier)) => Some(ClassifierCache::new(classifier)),
        (true, None) => {
            warn!("`lsi` is enabled but no classifier is available; using the first posts instead");
            None
        }
        (false, _) => None,
    });

    let mut outputs = Vec::with_capacity(posts.len());
    for post in &posts {
        let related_posts = related.select(post, &newest_first);
        debug!("Rendering `{}` with {} related posts", post.id(), related_posts.len());
        outputs.push(
            layout::add_layout(post, &layouts, &site_payload, &related_posts)
                .map_err(|e| annotate(post, Error::Layout(e)))?,
        );
    }
    for (post, output) in posts.iter_mut().zip(outputs) {
        post.output = Some(output);
    }

    let destination = config.destination_in(source);
    let written = posts
        .iter()
        .map(|post| write::write_post(&destination, post).map_err(Error::Write))
        .collect::<Result<Vec<PathBuf>>>()?;
    info!("Wrote {} posts to '{}'", written.len(), destination.display());
    Ok(written)
}

/// Loads every post in `{source}/_posts`. Files whose names aren't post names
/// are skipped. A missing posts directory means no posts.
pub fn read_posts(source: &Path) -> Result<Vec<Post>> {
    let dir = source.join(POSTS_DIRECTORY);
    let mut posts = Vec::new();
    if !dir.is_dir() {
        warn!("No posts directory at '{}'", dir.display());
        return Ok(posts);
    }

    for result in std::fs::read_dir(&dir)? {
        let entry = result?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let os_file_name = entry.file_name();
        let file_name = os_file_name.to_string_lossy();
        if !post::is_valid_name(&file_name) {
            warn!("Skipping '{}': not a post file name", file_name);
            continue;
        }
        posts.push(Post::load(source, &file_name).map_err(|e| {
            Error::Annotated(format!("loading post `{}`", file_name), Box::new(Error::Post(e)))
        })?);
    }
    Ok(posts)
}

/// The site-wide part of every template payload: `site.time` and
/// `site.posts` (newest first). Expects `posts` sorted oldest first.
pub fn site_payload(posts: &[Post]) -> Value {
    let mut site: HashMap<String, Value> = HashMap::new();
    site.insert(
        "time".to_owned(),
        Value::String(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
    );
    site.insert(
        "posts".to_owned(),
        Value::Array(posts.iter().rev().map(Post::to_value).collect()),
    );

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("site".to_owned(), Value::Object(site));
    Value::Object(m)
}

fn annotate(post: &Post, err: Error) -> Error {
    Error::Annotated(format!("building post `{}`", post.id()), Box::new(err))
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can occur while loading posts,
/// applying layouts, writing pages, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading or processing a post.
    Post(PostError),

    /// Returned for errors loading or applying layouts.
    Layout(LayoutError),

    /// Returned for errors writing posts to disk.
    Write(WriteError),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Post(err) => err.fmt(f),
            Error::Layout(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => write!(f, "{}: {}", &annotation, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Post(err) => Some(err),
            Error::Layout(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<PostError> for Error {
    /// Converts [`PostError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: PostError) -> Error {
        Error::Post(err)
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
