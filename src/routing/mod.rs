//! # Routing Module
//!
//! Route synthesis: patterns generated from controller actions, merged
//! under a URL prefix into one ordered route table.

pub mod merge;
pub mod pattern;
pub mod rule;

pub use merge::{merge_routes, ModuleRegistry, NoModules, ResourceMapping, UrlRuleConfig};
pub use pattern::{
    camel_to_id, controller_patterns, default_patterns, generate_patterns, PatternEntry,
    PatternSet,
};
pub use rule::{decode_params, Resolution, RouteMatch, RouteRule, RouteTable, Segment};
