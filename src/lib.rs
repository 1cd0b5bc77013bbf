pub mod access;
pub mod catalog;
pub mod database;
pub mod error;
pub mod executor;
pub mod expression;
pub mod loader;
pub mod session;
pub mod sql;
