//! Splits source files into YAML front matter and body. Used for both posts
//! and layouts.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::Path;

/// Front-matter keys mapped to their raw YAML values.
pub type FrontMatter = BTreeMap<String, serde_yaml::Value>;

const FENCE: &str = "---";

/// Everything below this marker is the "extended" part of a post.
const FOLD_TAG: &str = "<!-- more -->";

/// A source file split into its front matter and its body.
#[derive(Debug, Default)]
pub struct Document {
    pub data: FrontMatter,
    pub body: String,
}

/// Reads and parses the file at `path`. See [`parse`].
pub fn load(path: &Path) -> Result<Document> {
    use std::io::Read;
    let mut contents = String::new();
    File::open(path)
        .map_err(|err| Error::Open {
            path: path.display().to_string(),
            err,
        })?
        .read_to_string(&mut contents)?;
    parse(&contents)
}

/// Parses a source file. A file whose first line is a `---` fence carries YAML
/// front matter up to the next fence line; the remainder is the body. A fence
/// line is `---` and optional trailing whitespace, nothing else. A file
/// without an opening fence, or without a closing one, has empty front matter
/// and is all body.
pub fn parse(input: &str) -> Result<Document> {
    fn is_fence(line: &str) -> bool {
        line.strip_prefix(FENCE)
            .map_or(false, |rest| rest.trim().is_empty())
    }

    fn frontmatter_indices(input: &str) -> Option<(usize, usize, usize)> {
        let mut lines = input.split_inclusive('\n');
        let first = lines.next()?;
        if !is_fence(first) {
            return None;
        }
        let yaml_start = first.len();
        let mut offset = yaml_start;
        for line in lines {
            if is_fence(line) {
                return Some((yaml_start, offset, offset + line.len()));
            }
            offset += line.len();
        }
        None
    }

    match frontmatter_indices(input) {
        None => Ok(Document {
            data: FrontMatter::new(),
            body: input.to_owned(),
        }),
        Some((yaml_start, yaml_stop, body_start)) => Ok(Document {
            data: parse_yaml(&input[yaml_start..yaml_stop])?,
            body: input[body_start..].to_owned(),
        }),
    }
}

// Anything other than a mapping (including an empty block) is no front matter.
fn parse_yaml(yaml: &str) -> Result<FrontMatter> {
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::new());
    }
    match serde_yaml::from_str::<serde_yaml::Value>(yaml)? {
        serde_yaml::Value::Mapping(mapping) => Ok(mapping
            .into_iter()
            .filter_map(|(k, v)| crate::value::scalar_to_string(&k).map(|k| (k, v)))
            .collect()),
        _ => Ok(FrontMatter::new()),
    }
}

/// Splits a body into the full content and the part after the fold marker.
/// The extended part is empty when there's no marker.
pub fn split_extended(body: &str) -> (&str, &str) {
    match body.find(FOLD_TAG) {
        Some(i) => (body, &body[i + FOLD_TAG.len()..]),
        None => (body, ""),
    }
}

/// Represents the result of a front-matter operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading front matter.
#[derive(Debug)]
pub enum Error {
    /// Returned when there was an error parsing the front matter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the source file can't be opened.
    Open { path: String, err: std::io::Error },

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::Open { path, err } => write!(f, "Opening '{}': {}", path, err),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DeserializeYaml(err) => Some(err),
            Error::Open { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`].
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
