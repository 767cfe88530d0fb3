//! Search input: filters, predicates, query selection and paging.

pub mod paging;
pub mod predicate;
pub mod selector;

pub use paging::*;
pub use predicate::*;
pub use selector::*;
