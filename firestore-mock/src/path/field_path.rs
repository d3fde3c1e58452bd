use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::{Debug, Display, Formatter};

const DOCUMENT_ID: &str = "__name__";

/// Path to a field inside a document, e.g. `address.city`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: SmallVec<[String; 4]>,
}

impl FieldPath {
    /// Builds a field path from explicit segments, which may contain dots.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldPath {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a dotted field path.
    pub fn from_dotted(path: &str) -> Self {
        FieldPath::new(path.split('.'))
    }

    /// Sentinel path referring to the document id rather than a field.
    pub fn document_id() -> Self {
        FieldPath::new([DOCUMENT_ID])
    }

    pub fn is_document_id(&self) -> bool {
        self.segments.len() == 1 && self.segments[0] == DOCUMENT_ID
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.iter().join("."))
    }
}

impl Debug for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldPath({})", self)
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        FieldPath::from_dotted(value)
    }
}

impl From<String> for FieldPath {
    fn from(value: String) -> Self {
        FieldPath::from_dotted(&value)
    }
}

impl From<&FieldPath> for FieldPath {
    fn from(value: &FieldPath) -> Self {
        value.clone()
    }
}
