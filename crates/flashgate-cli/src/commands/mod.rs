pub mod cache_types;
pub mod plan;
