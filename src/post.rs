//! Defines the [`Post`] and [`Error`] types. A [`Post`] gets its identity
//! (date, slug, extension) from its file name, its front matter and body from
//! [`crate::frontmatter`], and derives its output location from both. See
//! [`Post::to_value`] for details on how posts are converted into template
//! values.

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use gtmpl::Value;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::frontmatter::{self, FrontMatter};
use crate::markdown;
use crate::value;

/// The directory, relative to the site source, that holds post files.
pub const POSTS_DIRECTORY: &str = "_posts";

/// Post file names look like `2008-11-05-my-awesome-post.textile`.
static NAME_MATCHER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+-[0-9]+-[0-9]+)-(.*)(\.[^.]+)$").unwrap());

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 4] = ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"];
const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Reports whether `name` is a well-formed post file name. This agrees exactly
/// with [`Post::parse_name`], so the build can filter a directory listing
/// before constructing posts.
pub fn is_valid_name(name: &str) -> bool {
    Post::parse_name(name).is_ok()
}

/// A single dated post.
#[derive(Clone, Debug)]
pub struct Post {
    /// The source file name. Unique within the posts directory, so it keys the
    /// post for the similarity engine.
    pub name: String,

    /// The publication date. Year, month, and day always come from the file
    /// name; hour and minute may be replaced once by the `time` front-matter
    /// key (see [`Post::apply_time_override`]).
    pub date: NaiveDateTime,

    /// The file name between the date and the extension.
    pub slug: String,

    /// The source extension, including the leading dot.
    pub extension: String,

    /// The front matter. Empty when the source file has none.
    pub data: FrontMatter,

    /// The full post body.
    pub content: String,

    /// The part of the body below the fold marker, or empty.
    pub extended: String,

    /// The rendered page, once layouts have been applied.
    pub output: Option<String>,

    time_applied: bool,
}

impl Post {
    /// Splits a post file name into its date, slug, and extension. Fails with
    /// [`Error::MalformedFilename`] if the name doesn't match
    /// `<year>-<month>-<day>-<slug>.<ext>` or if the date isn't a real
    /// calendar date.
    pub fn parse_name(name: &str) -> Result<(NaiveDateTime, String, String)> {
        let malformed = || Error::MalformedFilename(name.to_owned());
        let captures = NAME_MATCHER.captures(name).ok_or_else(malformed)?;
        let date = NaiveDate::parse_from_str(&captures[1], DATE_FORMAT)
            .map_err(|_| malformed())?
            .and_hms_opt(0, 0, 0)
            .ok_or_else(malformed)?;
        Ok((date, captures[2].to_owned(), captures[3].to_owned()))
    }

    /// Constructs a post from its file name alone. Front matter and content
    /// are left empty.
    pub fn from_name(name: &str) -> Result<Post> {
        let (date, slug, extension) = Post::parse_name(name)?;
        Ok(Post {
            name: name.to_owned(),
            date,
            slug,
            extension,
            data: FrontMatter::new(),
            content: String::new(),
            extended: String::new(),
            output: None,
            time_applied: false,
        })
    }

    /// Constructs a post from `{base}/_posts/{name}`, reading the front
    /// matter and body from disk.
    pub fn load(base: &Path, name: &str) -> Result<Post> {
        let mut post = Post::from_name(name)?;
        let document = frontmatter::load(&base.join(POSTS_DIRECTORY).join(name))?;
        let (content, extended) = frontmatter::split_extended(&document.body);
        post.data = document.data;
        post.content = content.to_owned();
        post.extended = extended.to_owned();
        Ok(post)
    }

    /// Converts `content` and `extended` to HTML when the post is written in
    /// markdown. Other formats are left alone.
    pub fn transform(&mut self) {
        if markdown::is_markdown(&self.extension) {
            self.content = markdown::to_html(&self.content);
            self.extended = markdown::to_html(&self.extended);
        }
    }

    /// The `permalink` front-matter value, if any. This is the only way to
    /// override the date-based location.
    pub fn permalink(&self) -> Option<String> {
        self.data.get("permalink").and_then(value::scalar_to_string)
    }

    /// The directory into which the post is generated. With a permalink, this
    /// is the permalink less its final segment (e.g., `/foo/bar/baz.html`
    /// becomes `/foo/bar`); otherwise it's `/{year}/{month}/{day}/{slug}/`.
    pub fn directory(&self) -> String {
        match self.permalink() {
            Some(permalink) => {
                let mut segments: Vec<&str> = permalink.split('/').collect();
                while segments.last() == Some(&"") {
                    segments.pop();
                }
                segments.pop();
                segments.join("/")
            }
            None => format!("{}{}/", self.date.format("/%Y/%m/%d/"), self.slug),
        }
    }

    /// The post's relative URL. Note that a permalink's final segment is not
    /// appended, so this is always [`Post::directory`].
    pub fn url(&self) -> String {
        self.directory()
    }

    /// A stable identifier for the post (feeds, related-post exclusion).
    pub fn id(&self) -> String {
        self.url()
    }

    /// Replaces the hour and minute of `date` with the `time` front-matter
    /// value, which may be a bare time or a full date and time (whose date is
    /// ignored). Only the first call has any effect.
    pub fn apply_time_override(&mut self) -> Result<()> {
        if self.time_applied {
            return Ok(());
        }
        self.time_applied = true;

        let raw = match self.data.get("time") {
            Some(v) => value::scalar_to_string(v)
                .ok_or_else(|| Error::InvalidTime(format!("{:?}", v)))?,
            None => return Ok(()),
        };
        let time = parse_time(&raw).ok_or_else(|| Error::InvalidTime(raw.clone()))?;
        self.date = self
            .date
            .date()
            .and_hms_opt(time.hour(), time.minute(), 0)
            .ok_or(Error::InvalidTime(raw))?;
        Ok(())
    }

    /// Converts a post into a [`Value::Object`] for templating. The object has
    /// the fields `title`, `url`, `date`, `id`, `content`, and `extended`, plus
    /// every front-matter key that doesn't collide with one of them.
    pub fn to_value(&self) -> Value {
        use std::collections::HashMap;

        let title = match self.data.get("title") {
            Some(serde_yaml::Value::Null) | None => Value::String(String::new()),
            Some(title) => value::from_yaml(title),
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), title);
        m.insert("url".to_owned(), Value::String(self.url()));
        m.insert(
            "date".to_owned(),
            Value::String(self.date.format("%Y-%m-%d %H:%M:%S").to_string()),
        );
        m.insert("id".to_owned(), Value::String(self.id()));
        m.insert("content".to_owned(), Value::String(self.content.clone()));
        m.insert("extended".to_owned(), Value::String(self.extended.clone()));

        for (key, v) in &self.data {
            m.entry(key.clone()).or_insert_with(|| value::from_yaml(v));
        }
        Value::Object(m)
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|date_time| date_time.time())
        })
}

impl PartialEq for Post {
    /// Posts compare by `date` only.
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
    }
}
impl Eq for Post {}

impl PartialOrd for Post {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Post {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date.cmp(&other.date)
    }
}

/// Represents the result of a [`Post`] operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error constructing or processing a [`Post`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a file name isn't `<year>-<month>-<day>-<slug>.<ext>`.
    MalformedFilename(String),

    /// Returned when the `time` front-matter value isn't a time of day.
    InvalidTime(String),

    /// Returned when the post's front matter couldn't be loaded.
    FrontMatter(frontmatter::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedFilename(name) => {
                write!(f, "malformed post file name: `{}`", name)
            }
            Error::InvalidTime(time) => write!(f, "invalid post time: `{}`", time),
            Error::FrontMatter(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MalformedFilename(_) => None,
            Error::InvalidTime(_) => None,
            Error::FrontMatter(err) => Some(err),
        }
    }
}

impl From<frontmatter::Error> for Error {
    /// Converts a [`frontmatter::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator when loading post sources.
    fn from(err: frontmatter::Error) -> Error {
        Error::FrontMatter(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Datelike;

    fn post_with(name: &str, yaml: &str) -> Result<Post> {
        let mut post = Post::from_name(name)?;
        post.data = frontmatter::parse(&format!("---\n{}---\n", yaml))?.data;
        Ok(post)
    }

    fn midnight(year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(year, month, day).and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    fn field(v: &Value, key: &str) -> String {
        match v {
            Value::Object(m) => match m.get(key) {
                Some(Value::String(s)) => s.clone(),
                _ => panic!("field `{}` is not a string", key),
            },
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_parse_name() -> Result<()> {
        let (date, slug, extension) = Post::parse_name("2008-11-05-my-awesome-post.textile")?;
        assert_eq!(midnight(2008, 11, 5), Some(date));
        assert_eq!("my-awesome-post", slug);
        assert_eq!(".textile", extension);
        Ok(())
    }

    #[test]
    fn test_parse_name_slug_with_dots() -> Result<()> {
        let (date, slug, extension) = Post::parse_name("2010-1-9-v1.2-released.md")?;
        assert_eq!(midnight(2010, 1, 9), Some(date));
        assert_eq!("v1.2-released", slug);
        assert_eq!(".md", extension);
        Ok(())
    }

    #[test]
    fn test_is_valid_name_agrees_with_parse() {
        let names = [
            "2008-11-05-my-awesome-post.textile",
            "2008-11-05-post.md",
            "2008-11-05-.md",
            "2008-11-05-no-extension",
            "2008-11-my-post.md",
            "my-post.md",
            "2008-13-45-bad-date.md",
            "2008-02-30-leap.md",
            "2008-11-05-trailing-dot.",
            "",
        ];
        for name in names.iter() {
            assert_eq!(Post::parse_name(name).is_ok(), is_valid_name(name), "{}", name);
        }
        assert!(is_valid_name("2008-11-05-post.md"));
        assert!(!is_valid_name("my-post.md"));
        assert!(!is_valid_name("2008-13-45-bad-date.md"));
    }

    #[test]
    fn test_malformed_filename() {
        match Post::from_name("not-a-post.md") {
            Err(Error::MalformedFilename(name)) => assert_eq!("not-a-post.md", name),
            other => panic!("wanted MalformedFilename, got {:?}", other),
        }
    }

    #[test]
    fn test_default_url() -> Result<()> {
        let post = Post::from_name("2008-11-05-my-awesome-post.textile")?;
        assert_eq!(None, post.permalink());
        assert_eq!("/2008/11/05/my-awesome-post/", post.directory());
        assert_eq!("/2008/11/05/my-awesome-post/", post.url());
        assert_eq!(post.url(), post.id());
        Ok(())
    }

    #[test]
    fn test_permalink_directory() -> Result<()> {
        let post = post_with("2008-11-05-post.md", "permalink: /foo/bar/baz.html\n")?;
        assert_eq!(Some("/foo/bar/baz.html".to_owned()), post.permalink());
        assert_eq!("/foo/bar", post.directory());
        assert_eq!("/foo/bar", post.url());
        assert_eq!("/foo/bar", post.id());
        Ok(())
    }

    #[test]
    fn test_permalink_trailing_slash() -> Result<()> {
        let post = post_with("2008-11-05-post.md", "permalink: /foo/bar/\n")?;
        assert_eq!("/foo", post.directory());
        Ok(())
    }

    #[test]
    fn test_permalink_bare_file_name() -> Result<()> {
        let post = post_with("2008-11-05-post.md", "permalink: baz.html\n")?;
        assert_eq!("", post.directory());
        Ok(())
    }

    #[test]
    fn test_ordering_by_date_only() -> Result<()> {
        let a = Post::from_name("2008-11-05-zebra.md")?;
        let b = Post::from_name("2008-11-05-aardvark.md")?;
        let c = Post::from_name("2009-01-01-aardvark.md")?;
        assert_eq!(Ordering::Equal, a.cmp(&b));
        assert!(a == b);
        assert!(a < c);
        assert!(c > b);
        Ok(())
    }

    #[test]
    fn test_time_override() -> Result<()> {
        let mut post = post_with("2008-11-05-post.md", "time: \"14:30\"\n")?;
        post.apply_time_override()?;
        assert_eq!(14, post.date.hour());
        assert_eq!(30, post.date.minute());
        assert_eq!(5, post.date.day());
        assert_eq!(11, post.date.month());
        assert_eq!(2008, post.date.year());
        Ok(())
    }

    #[test]
    fn test_time_override_applies_once() -> Result<()> {
        let mut post = post_with("2008-11-05-post.md", "time: \"14:15\"\n")?;
        post.apply_time_override()?;
        assert_eq!(14, post.date.hour());
        post.data.insert(
            "time".to_owned(),
            serde_yaml::Value::String("09:00".to_owned()),
        );
        post.apply_time_override()?;
        assert_eq!(14, post.date.hour());
        assert_eq!(15, post.date.minute());
        Ok(())
    }

    #[test]
    fn test_invalid_time() -> Result<()> {
        let mut post = post_with("2008-11-05-post.md", "time: teatime\n")?;
        match post.apply_time_override() {
            Err(Error::InvalidTime(time)) => assert_eq!("teatime", time),
            other => panic!("wanted InvalidTime, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_time_override_from_date_time() -> Result<()> {
        let mut post = post_with("2008-11-05-post.md", "time: \"2009-01-01 14:30\"\n")?;
        post.apply_time_override()?;
        assert_eq!(midnight(2008, 11, 5).map(|d| d.date()), Some(post.date.date()));
        assert_eq!(14, post.date.hour());
        assert_eq!(30, post.date.minute());
        Ok(())
    }

    #[test]
    fn test_to_value_base_keys_win() -> Result<()> {
        let mut post = post_with(
            "2008-11-05-post.md",
            "title: Hello\nurl: /evil/\nid: evil\ndate: yesterday\ncontent: evil\nextended: evil\nauthor: Ada\n",
        )?;
        post.content = String::from("body");
        let v = post.to_value();
        assert_eq!("Hello", field(&v, "title"));
        assert_eq!("/2008/11/05/post/", field(&v, "url"));
        assert_eq!("/2008/11/05/post/", field(&v, "id"));
        assert_eq!("2008-11-05 00:00:00", field(&v, "date"));
        assert_eq!("body", field(&v, "content"));
        assert_eq!("", field(&v, "extended"));
        assert_eq!("Ada", field(&v, "author"));
        Ok(())
    }

    #[test]
    fn test_to_value_without_front_matter() -> Result<()> {
        let post = Post::from_name("2008-11-05-post.md")?;
        let v = post.to_value();
        assert_eq!("", field(&v, "title"));
        assert_eq!("", field(&v, "extended"));
        Ok(())
    }

    #[test]
    fn test_to_value_after_time_override() -> Result<()> {
        let mut post = post_with("2008-11-05-post.md", "time: \"14:30\"\n")?;
        post.apply_time_override()?;
        assert_eq!("2008-11-05 14:30:00", field(&post.to_value(), "date"));
        Ok(())
    }

    #[test]
    fn test_transform_markdown() -> Result<()> {
        let mut post = Post::from_name("2008-11-05-post.md")?;
        post.content = String::from("*hi*");
        post.transform();
        assert_eq!("<p><em>hi</em></p>\n", post.content);

        let mut post = Post::from_name("2008-11-05-post.textile")?;
        post.content = String::from("*hi*");
        post.transform();
        assert_eq!("*hi*", post.content);
        Ok(())
    }
}
