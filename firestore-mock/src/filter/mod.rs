//! Predicates for `where` clauses.
//!
//! A clause is built either from an operator string, mirroring the client's
//! `where(field, op, value)`, or with the fluent API:
//!
//! ```rust,ignore
//! use firestore_mock::filter::{field, WhereFilterOp};
//!
//! let by_op = fruits.where_field("color", WhereFilterOp::Equal, "red");
//! let fluent = fruits.where_filter(field("weight").gt(100));
//! ```
//!
//! Every clause is keyed `where:{field}:{op}:{value}` inside a query, so
//! adding the same clause twice has no effect.

mod array_filters;
mod basic_filters;
mod filter;
mod fluent;

pub(crate) use array_filters::{ArrayContainsAnyFilter, ArrayContainsFilter, InFilter, NotInFilter};
pub(crate) use basic_filters::ComparisonFilter;
pub use filter::{Filter, FilterProvider, WhereFilterOp};
pub use fluent::{field, FluentFilter};
