use crate::errors::{raise, ErrorKind, FirestoreError};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Direction of a query ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Smallest value first
    #[default]
    Ascending,
    /// Largest value first
    Descending,
}

impl Direction {
    /// Applies the direction to an ascending comparison result.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Ascending => write!(f, "asc"),
            Direction::Descending => write!(f, "desc"),
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = FirestoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "asc" => Ok(Direction::Ascending),
            "desc" => Ok(Direction::Descending),
            other => Err(raise(
                &format!("Invalid order direction '{}', expected 'asc' or 'desc'", other),
                ErrorKind::InvalidArgument,
            )),
        }
    }
}
