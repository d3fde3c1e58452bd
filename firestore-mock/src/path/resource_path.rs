use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::{Debug, Display, Formatter};

type Segments = SmallVec<[String; 6]>;

/// Slash-separated address of a collection or a document.
///
/// Segments alternate between collection ids and document ids, starting with
/// a collection id, so an odd number of segments names a collection and an
/// even number names a document. Empty segments are ignored when parsing.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ResourcePath {
    segments: Segments,
}

impl ResourcePath {
    /// The root of the tree, parent of every top-level collection.
    pub fn root() -> Self {
        ResourcePath::default()
    }

    pub fn parse(path: &str) -> Self {
        ResourcePath {
            segments: path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ResourcePath {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_collection(&self) -> bool {
        self.segments.len() % 2 == 1
    }

    pub fn is_document(&self) -> bool {
        !self.segments.is_empty() && self.segments.len() % 2 == 0
    }

    /// The last segment, or an empty string for the root.
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// The enclosing path, `None` for the root.
    pub fn parent(&self) -> Option<ResourcePath> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(ResourcePath { segments })
    }

    /// Appends a relative path, which may contain several segments.
    pub fn child(&self, relative: &ResourcePath) -> ResourcePath {
        let mut segments = self.segments.clone();
        segments.extend(relative.segments.iter().cloned());
        ResourcePath { segments }
    }

    /// Returns `true` when the path has a parent and its final segment is
    /// `id`, i.e. the textual path ends with `"/" + id`.
    pub fn ends_with_id(&self, id: &str) -> bool {
        self.segments.len() > 1 && self.id() == id
    }
}

impl Display for ResourcePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.iter().join("/"))
    }
}

impl Debug for ResourcePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self)
    }
}

impl From<&str> for ResourcePath {
    fn from(value: &str) -> Self {
        ResourcePath::parse(value)
    }
}
