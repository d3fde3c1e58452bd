use crate::collection::DocumentData;
use crate::common::Value;
use crate::errors::{raise, ErrorKind, FirestoreError};
use crate::path::FieldPath;
use std::any::Any;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use super::{ArrayContainsAnyFilter, ArrayContainsFilter, ComparisonFilter, InFilter, NotInFilter};

/// Operator of a `where` clause, written the way the client spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WhereFilterOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    ArrayContains,
    ArrayContainsAny,
    In,
    NotIn,
}

impl WhereFilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhereFilterOp::Equal => "==",
            WhereFilterOp::NotEqual => "!=",
            WhereFilterOp::LessThan => "<",
            WhereFilterOp::LessThanOrEqual => "<=",
            WhereFilterOp::GreaterThan => ">",
            WhereFilterOp::GreaterThanOrEqual => ">=",
            WhereFilterOp::ArrayContains => "array-contains",
            WhereFilterOp::ArrayContainsAny => "array-contains-any",
            WhereFilterOp::In => "in",
            WhereFilterOp::NotIn => "not-in",
        }
    }
}

impl Display for WhereFilterOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for WhereFilterOp {
    type Error = FirestoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "==" => Ok(WhereFilterOp::Equal),
            "!=" => Ok(WhereFilterOp::NotEqual),
            "<" => Ok(WhereFilterOp::LessThan),
            "<=" => Ok(WhereFilterOp::LessThanOrEqual),
            ">" => Ok(WhereFilterOp::GreaterThan),
            ">=" => Ok(WhereFilterOp::GreaterThanOrEqual),
            "array-contains" => Ok(WhereFilterOp::ArrayContains),
            "array-contains-any" => Ok(WhereFilterOp::ArrayContainsAny),
            "in" => Ok(WhereFilterOp::In),
            "not-in" => Ok(WhereFilterOp::NotIn),
            other => Err(raise(
                &format!("Invalid query operator '{}'", other),
                ErrorKind::InvalidArgument,
            )),
        }
    }
}

/// A predicate over document data.
///
/// Providers never fail: a missing field or a value of an incomparable type
/// simply does not match.
pub trait FilterProvider: Any + Send + Sync + Display {
    fn apply(&self, data: &DocumentData) -> bool;

    fn field(&self) -> &FieldPath;

    fn op(&self) -> WhereFilterOp;

    fn value(&self) -> &Value;

    /// Identity of the clause inside a query: `where:{field}:{op}:{value}`.
    fn key(&self) -> String {
        format!("where:{}:{}:{}", self.field(), self.op(), self.value())
    }

    fn as_any(&self) -> &dyn Any;
}

#[derive(Clone)]
pub struct Filter {
    inner: Arc<dyn FilterProvider>,
}

impl Filter {
    pub fn new<T: FilterProvider + 'static>(inner: T) -> Self {
        Filter {
            inner: Arc::new(inner),
        }
    }

    /// Builds the filter for a `where(field, op, value)` clause.
    pub fn from_op(field: FieldPath, op: WhereFilterOp, value: Value) -> Self {
        match op {
            WhereFilterOp::Equal
            | WhereFilterOp::NotEqual
            | WhereFilterOp::LessThan
            | WhereFilterOp::LessThanOrEqual
            | WhereFilterOp::GreaterThan
            | WhereFilterOp::GreaterThanOrEqual => Filter::new(ComparisonFilter::new(field, op, value)),
            WhereFilterOp::ArrayContains => Filter::new(ArrayContainsFilter::new(field, value)),
            WhereFilterOp::ArrayContainsAny => Filter::new(ArrayContainsAnyFilter::new(field, value)),
            WhereFilterOp::In => Filter::new(InFilter::new(field, value)),
            WhereFilterOp::NotIn => Filter::new(NotInFilter::new(field, value)),
        }
    }
}

impl Display for Filter {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Debug for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter({})", self.key())
    }
}

impl Deref for Filter {
    type Target = Arc<dyn FilterProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Shared field lookup for providers.
pub(crate) fn field_value<'a>(data: &'a DocumentData, field: &FieldPath) -> Option<&'a Value> {
    data.get_path(field)
}
