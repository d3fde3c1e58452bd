use crate::collection::DocumentData;
use crate::common::{Direction, Value};
use crate::errors::{raise, ErrorKind, FirestoreResult};
use crate::path::{FieldPath, ResourcePath};
use std::cmp::Ordering;

use super::engine::Candidate;
use super::OrderBy;

/// Which of the four cursor methods produced a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CursorKind {
    StartAt,
    StartAfter,
    EndAt,
    EndBefore,
}

impl CursorKind {
    fn inclusive(&self) -> bool {
        matches!(self, CursorKind::StartAt | CursorKind::EndAt)
    }

    pub(crate) fn method_name(&self) -> &'static str {
        match self {
            CursorKind::StartAt => "startAt",
            CursorKind::StartAfter => "startAfter",
            CursorKind::EndAt => "endAt",
            CursorKind::EndBefore => "endBefore",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CursorPosition {
    /// Raw values, one per ordering.
    Values(Vec<Value>),
    /// A previously read document.
    Document {
        path: ResourcePath,
        data: Option<DocumentData>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub(crate) kind: CursorKind,
    pub(crate) position: CursorPosition,
}

enum Anchor<'a> {
    Index(usize),
    Value(&'a Value),
}

impl Cursor {
    pub(crate) fn new(kind: CursorKind, position: CursorPosition) -> Self {
        Cursor { kind, position }
    }

    /// First row inside the window opened by this start cursor.
    pub(crate) fn start_index(&self, rows: &[Candidate], order: &OrderBy) -> FirestoreResult<usize> {
        let inclusive = self.kind.inclusive();
        Ok(match self.anchor(rows, order)? {
            Anchor::Index(i) if inclusive => i,
            Anchor::Index(i) => i + 1,
            Anchor::Value(value) => first_position(rows, order, value, |ord| {
                if inclusive {
                    ord != Ordering::Less
                } else {
                    ord == Ordering::Greater
                }
            }),
        })
    }

    /// One past the last row inside the window closed by this end cursor.
    pub(crate) fn end_index(&self, rows: &[Candidate], order: &OrderBy) -> FirestoreResult<usize> {
        let inclusive = self.kind.inclusive();
        Ok(match self.anchor(rows, order)? {
            Anchor::Index(i) if inclusive => i + 1,
            Anchor::Index(i) => i,
            Anchor::Value(value) => first_position(rows, order, value, |ord| {
                if inclusive {
                    ord == Ordering::Greater
                } else {
                    ord != Ordering::Less
                }
            }),
        })
    }

    fn anchor<'a>(&'a self, rows: &[Candidate], order: &OrderBy) -> FirestoreResult<Anchor<'a>> {
        match &self.position {
            CursorPosition::Values(values) => match values.as_slice() {
                [value] => Ok(Anchor::Value(value)),
                [] => Err(raise(
                    &format!("Function {}() requires at least one argument", self.kind.method_name()),
                    ErrorKind::InvalidArgument,
                )),
                _ => Err(raise(
                    &format!(
                        "Too many arguments provided to {}(). The number of arguments must be less than or equal to the number of orderBy() clauses",
                        self.kind.method_name()
                    ),
                    ErrorKind::InvalidArgument,
                )),
            },
            CursorPosition::Document { path, data } => {
                if let Some(index) = rows.iter().position(|row| &row.path == path) {
                    return Ok(Anchor::Index(index));
                }
                let Some(data) = data else {
                    return Err(raise(
                        &format!(
                            "Can't use a DocumentSnapshot that doesn't exist for {}()",
                            self.kind.method_name()
                        ),
                        ErrorKind::InvalidArgument,
                    ));
                };
                match data.get_path(&order.field) {
                    Some(value) => Ok(Anchor::Value(value)),
                    None => Err(raise(
                        &format!(
                            "Invalid query. You are trying to start or end a query using a document for which the field '{}' (used as the orderBy) does not exist",
                            order.field
                        ),
                        ErrorKind::InvalidArgument,
                    )),
                }
            }
        }
    }
}

/// Index of the first row whose ordered value, compared to `value` in the
/// ordering direction, is accepted; `rows.len()` if none is.
fn first_position<F>(rows: &[Candidate], order: &OrderBy, value: &Value, accept: F) -> usize
where
    F: Fn(Ordering) -> bool,
{
    rows.iter()
        .position(|row| accept(compare_row(row, &order.field, order.direction, value)))
        .unwrap_or(rows.len())
}

fn compare_row(row: &Candidate, field: &FieldPath, direction: Direction, value: &Value) -> Ordering {
    match row.data.get_path(field) {
        Some(row_value) => direction.apply(row_value.cmp(value)),
        None => Ordering::Less,
    }
}
