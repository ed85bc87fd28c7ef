//! Writes rendered [`Post`]s to disk.

use crate::post::Post;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The file name every post is written to within its directory.
pub const INDEX_FILE: &str = "index.html";

/// Writes a rendered post to `{dest}/{url}/index.html`, creating its
/// directory first, and returns the path written.
pub fn write_post(dest: &Path, post: &Post) -> Result<PathBuf> {
    let output = post
        .output
        .as_ref()
        .ok_or_else(|| Error::Unrendered(post.id()))?;

    // The url is site-absolute; joining it as-is would discard `dest`.
    std::fs::create_dir_all(dest.join(post.directory().trim_start_matches('/')))?;
    let path = dest
        .join(post.url().trim_start_matches('/'))
        .join(INDEX_FILE);
    std::fs::write(&path, output)?;
    Ok(path)
}

/// The result of a fallible post-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a post-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post is written before layouts were applied.
    Unrendered(String),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Unrendered(id) => write!(f, "post `{}` has not been rendered", id),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Unrendered(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
