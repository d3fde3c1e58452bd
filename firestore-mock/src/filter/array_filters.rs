use std::any::Any;
use std::fmt::Display;

use crate::collection::DocumentData;
use crate::common::Value;
use crate::path::FieldPath;

use super::filter::field_value;
use super::{FilterProvider, WhereFilterOp};

macro_rules! array_filter {
    ($name:ident, $op:expr) => {
        pub(crate) struct $name {
            field: FieldPath,
            value: Value,
        }

        impl $name {
            #[inline]
            pub(crate) fn new(field: FieldPath, value: Value) -> Self {
                $name { field, value }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "({} {} {})", self.field, $op, self.value)
            }
        }

        impl FilterProvider for $name {
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
                $op
            }

            fn value(&self) -> &Value {
                &self.value
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

array_filter!(ArrayContainsFilter, WhereFilterOp::ArrayContains);
array_filter!(ArrayContainsAnyFilter, WhereFilterOp::ArrayContainsAny);
array_filter!(InFilter, WhereFilterOp::In);
array_filter!(NotInFilter, WhereFilterOp::NotIn);

impl ArrayContainsFilter {
    fn matches(&self, actual: &Value) -> bool {
        actual
            .as_array()
            .is_some_and(|items| items.contains(&self.value))
    }
}

impl ArrayContainsAnyFilter {
    fn matches(&self, actual: &Value) -> bool {
        match (actual.as_array(), self.value.as_array()) {
            (Some(items), Some(candidates)) => candidates.iter().any(|c| items.contains(c)),
            _ => false,
        }
    }
}

impl InFilter {
    fn matches(&self, actual: &Value) -> bool {
        self.value
            .as_array()
            .is_some_and(|candidates| candidates.contains(actual))
    }
}

impl NotInFilter {
    fn matches(&self, actual: &Value) -> bool {
        self.value
            .as_array()
            .is_some_and(|candidates| !candidates.contains(actual))
    }
}
