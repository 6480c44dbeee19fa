//! # Search Module
//!
//! Filter AST, the free-text search builder used by list operations, and
//! pagination bounds.

pub mod builder;
pub mod filter;
pub mod pagination;

pub use builder::build_search_filter;
pub use filter::FilterExpr;
pub use pagination::{Pagination, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PAGE_PARAM, PER_PAGE_PARAM};
