//! Applies layouts (templates) to posts. A layout is a `gtmpl` template in the
//! layouts directory, optionally with front matter whose `layout` key wraps it
//! in another layout.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use gtmpl::{Context, Template, Value};
use tracing::{debug, warn};

use crate::frontmatter::{self, FrontMatter};
use crate::post::Post;
use crate::value;

const LAYOUT_EXTENSION: &str = "html";

/// A parsed layout file.
pub struct Layout {
    pub data: FrontMatter,
    template: Template,
}

impl Layout {
    /// Parses a layout from its source text.
    pub fn parse(input: &str) -> Result<Layout> {
        let document = frontmatter::parse(input)?;
        let mut template = Template::default();
        template
            .parse(&document.body)
            .map_err(|e| Error::ParseTemplate(e.to_string()))?;
        Ok(Layout {
            data: document.data,
            template,
        })
    }

    /// The name of the layout this one is wrapped in, if any.
    pub fn parent(&self) -> Option<String> {
        self.data.get("layout").and_then(value::scalar_to_string)
    }

    fn render(&self, payload: Value) -> Result<String> {
        let context = Context::from(payload).map_err(|e| Error::Template(e.to_string()))?;
        let mut out: Vec<u8> = Vec::new();
        self.template
            .execute(&mut out, &context)
            .map_err(|e| Error::Template(e.to_string()))?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Layouts by name (file stem).
pub type Layouts = HashMap<String, Layout>;

/// Loads every `*.html` file in `dir` as a layout. A missing directory means
/// no layouts.
pub fn load_layouts(dir: &Path) -> Result<Layouts> {
    let mut layouts = Layouts::new();
    if !dir.is_dir() {
        debug!("No layouts directory at '{}'", dir.display());
        return Ok(layouts);
    }

    for result in std::fs::read_dir(dir)? {
        let path = result?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(LAYOUT_EXTENSION) {
            continue;
        }
        let name = match path.file_stem().and_then(|s| s.to_str()) {
            Some(name) => name.to_owned(),
            None => continue,
        };
        let layout = Layout::parse(&std::fs::read_to_string(&path)?)
            .map_err(|e| Error::Annotated(format!("parsing layout `{}`", name), Box::new(e)))?;
        layouts.insert(name, layout);
    }
    debug!("Loaded {} layouts", layouts.len());
    Ok(layouts)
}

/// Builds the template payload for `post` and renders it through its layout
/// chain. `site_payload` must be a [`Value::Object`] holding a `site` object;
/// `related` is added to it as `site.related_posts`. Without a `layout` key
/// the output is the post's content.
pub fn add_layout(
    post: &Post,
    layouts: &Layouts,
    site_payload: &Value,
    related: &[&Post],
) -> Result<String> {
    let post_value = post.to_value();
    let title = match &post_value {
        Value::Object(m) => m.get("title").cloned().unwrap_or(Value::Nil),
        _ => Value::Nil,
    };

    let mut page: HashMap<String, Value> = HashMap::new();
    page.insert("title".to_owned(), title);

    let mut payload: HashMap<String, Value> = match site_payload {
        Value::Object(m) => m.clone(),
        _ => HashMap::new(),
    };
    let mut site = match payload.remove("site") {
        Some(Value::Object(site)) => site,
        _ => HashMap::new(),
    };
    site.insert(
        "related_posts".to_owned(),
        Value::Array(related.iter().map(|p| p.to_value()).collect()),
    );
    payload.insert("site".to_owned(), Value::Object(site));
    payload.insert("post".to_owned(), post_value);
    payload.insert("page".to_owned(), Value::Object(page));

    do_layout(
        post.content.clone(),
        post.data.get("layout").and_then(value::scalar_to_string),
        payload,
        layouts,
    )
}

/// Renders `content` through the named layout and each of its parents in
/// turn. Each layout sees the output so far as `content`. A chain that names
/// a missing layout, or a layout it has already applied, stops there.
pub fn do_layout(
    content: String,
    layout: Option<String>,
    mut payload: HashMap<String, Value>,
    layouts: &Layouts,
) -> Result<String> {
    let mut output = content;
    let mut applied: HashSet<String> = HashSet::new();
    let mut next = layout;

    while let Some(name) = next {
        let layout = match layouts.get(&name) {
            Some(layout) => layout,
            None => {
                warn!("Layout `{}` does not exist", name);
                break;
            }
        };
        if !applied.insert(name.clone()) {
            warn!("Layout `{}` includes itself", name);
            break;
        }
        payload.insert("content".to_owned(), Value::String(output));
        output = layout
            .render(Value::Object(payload.clone()))
            .map_err(|e| Error::Annotated(format!("rendering layout `{}`", name), Box::new(e)))?;
        next = layout.parent();
    }
    Ok(output)
}

/// Represents the result of a layout operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or applying a layout.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors during templating.
    Template(String),

    /// Returned when a layout's front matter can't be read.
    FrontMatter(frontmatter::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Template(err) => err.fmt(f),
            Error::FrontMatter(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => write!(f, "{}: {}", &annotation, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ParseTemplate(_) => None,
            Error::Template(_) => None,
            Error::FrontMatter(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<frontmatter::Error> for Error {
    fn from(err: frontmatter::Error) -> Error {
        Error::FrontMatter(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
