pub mod cache;
pub mod context;
pub mod converter;
pub mod provider;
pub mod rate_table;
