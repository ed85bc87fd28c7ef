//! Selects the related posts shown alongside a [`Post`]. There are two modes:
//! with a [`ClassifierCache`] the selection is ranked by a text-similarity
//! engine, and without one it's simply the first few other posts.

use std::fmt;

use tracing::{debug, info, warn};

use crate::post::Post;

/// The most related posts returned for any one post.
pub const MAX_RELATED: usize = 10;

/// A text-similarity engine. Items are keyed by post file name
/// ([`Post::name`]), which is unique where [`Post::id`] may not be.
pub trait Classifier {
    /// Adds a document to the engine's corpus.
    fn add_item(&mut self, key: &str, text: &str);

    /// Returns the keys of up to `count` items most similar to `text`, most
    /// similar first.
    fn find_related(&self, text: &str, count: usize) -> Result<Vec<String>, ClassifierError>;
}

/// Holds a [`Classifier`] and remembers whether it has been fed the corpus.
/// The corpus is fed exactly once, on first use, and never refreshed.
pub struct ClassifierCache {
    classifier: Box<dyn Classifier>,
    primed: bool,
}

impl ClassifierCache {
    pub fn new(classifier: Box<dyn Classifier>) -> ClassifierCache {
        ClassifierCache {
            classifier,
            primed: false,
        }
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    fn prime(&mut self, posts: &[&Post]) {
        if self.primed {
            return;
        }
        info!("Running the classifier over {} posts, this could take a while", posts.len());
        for post in posts {
            self.classifier.add_item(&post.name, &post.content);
        }
        self.primed = true;
    }
}

/// Computes related posts, in whichever mode it was constructed with.
pub struct RelatedPosts {
    cache: Option<ClassifierCache>,
}

impl RelatedPosts {
    /// `Some` selects similarity mode, `None` the positional fallback.
    pub fn new(cache: Option<ClassifierCache>) -> RelatedPosts {
        RelatedPosts { cache }
    }

    pub fn is_similarity_mode(&self) -> bool {
        self.cache.is_some()
    }

    pub fn cache(&self) -> Option<&ClassifierCache> {
        self.cache.as_ref()
    }

    /// Returns up to [`MAX_RELATED`] posts from `posts` related to `post`.
    /// `post` itself is left out by identity, not by [`Post::id`]: posts
    /// whose permalinks share a directory also share an id.
    pub fn select<'a>(&mut self, post: &Post, posts: &[&'a Post]) -> Vec<&'a Post> {
        if posts.len() <= 1 {
            return Vec::new();
        }

        match &mut self.cache {
            Some(cache) => {
                cache.prime(posts);
                let keys = match cache.classifier.find_related(&post.content, MAX_RELATED + 1) {
                    Ok(keys) => keys,
                    Err(err) => {
                        warn!("Finding posts related to `{}`: {}", post.name, err);
                        Vec::new()
                    }
                };
                debug!("Classifier matched {} posts for `{}`", keys.len(), post.name);
                keys.iter()
                    .filter_map(|key| posts.iter().copied().find(|p| p.name == *key))
                    .filter(|p| !std::ptr::eq(*p, post))
                    .take(MAX_RELATED)
                    .collect()
            }
            None => posts
                .iter()
                .copied()
                .filter(|p| !std::ptr::eq(*p, post))
                .take(MAX_RELATED)
                .collect(),
        }
    }
}

/// Represents a failure inside a [`Classifier`]. Never fatal: the selector
/// logs it and returns no related posts.
#[derive(Debug)]
pub struct ClassifierError(pub String);

impl fmt::Display for ClassifierError {
    /// Displays a [`ClassifierError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "classifier failed: {}", &self.0)
    }
}

impl std::error::Error for ClassifierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}
