use std::any::Any;
use std::cmp::Ordering;
use std::fmt::Display;

use crate::collection::DocumentData;
use crate::common::Value;
use crate::path::FieldPath;

use super::filter::field_value;
use super::{FilterProvider, WhereFilterOp};

/// Equality and relational comparison of one field against a value.
pub(crate) struct ComparisonFilter {
    field: FieldPath,
    op: WhereFilterOp,
    value: Value,
}

impl ComparisonFilter {
    #[inline]
    pub(crate) fn new(field: FieldPath, op: WhereFilterOp, value: Value) -> Self {
        ComparisonFilter { field, op, value }
    }

    fn matches(&self, actual: &Value) -> bool {
        match self.op {
            WhereFilterOp::Equal => actual == &self.value,
            WhereFilterOp::NotEqual => actual != &self.value,
            _ => {
                // relational operators only order values of one type class
                if !actual.is_comparable_with(&self.value) {
                    return false;
                }
                let ordering = actual.cmp(&self.value);
                match self.op {
                    WhereFilterOp::LessThan => ordering == Ordering::Less,
                    WhereFilterOp::LessThanOrEqual => ordering != Ordering::Greater,
                    WhereFilterOp::GreaterThan => ordering == Ordering::Greater,
                    WhereFilterOp::GreaterThanOrEqual => ordering != Ordering::Less,
                    _ => false,
                }
            }
        }
    }
}

impl Display for ComparisonFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.field, self.op, self.value)
    }
}

impl FilterProvider for ComparisonFilter {
    #[inline]
    fn apply(&self, data: &DocumentData) -> bool {
        match field_value(data, &self.field) {
            Some(actual) => self.matches(actual),
            None => false,
        }
    }

    fn field(&self) -> &FieldPath {
        &self.field
    }

    fn op(&self) -> WhereFilterOp {
        self.op
    }

    fn value(&self) -> &Value {
        &self.value
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
