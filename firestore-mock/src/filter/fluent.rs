use crate::common::Value;
use crate::path::FieldPath;

use super::{Filter, WhereFilterOp};

/// Starts a fluent filter on a field, e.g. `field("age").gte(18)`.
pub fn field(field_name: impl Into<FieldPath>) -> FluentFilter {
    FluentFilter {
        field: field_name.into(),
    }
}

pub struct FluentFilter {
    field: FieldPath,
}

impl FluentFilter {
    #[inline]
    fn build<T: Into<Value>>(self, op: WhereFilterOp, value: T) -> Filter {
        Filter::from_op(self.field, op, value.into())
    }

    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        self.build(WhereFilterOp::Equal, value)
    }

    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        self.build(WhereFilterOp::NotEqual, value)
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        self.build(WhereFilterOp::GreaterThan, value)
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        self.build(WhereFilterOp::GreaterThanOrEqual, value)
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        self.build(WhereFilterOp::LessThan, value)
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        self.build(WhereFilterOp::LessThanOrEqual, value)
    }

    pub fn array_contains<T: Into<Value>>(self, value: T) -> Filter {
        self.build(WhereFilterOp::ArrayContains, value)
    }

    pub fn array_contains_any<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        self.build(WhereFilterOp::ArrayContainsAny, Value::from_vec(values))
    }

    pub fn in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        self.build(WhereFilterOp::In, Value::from_vec(values))
    }

    pub fn not_in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        self.build(WhereFilterOp::NotIn, Value::from_vec(values))
    }
}
