//! Core catalog logic — types, errors, store, resolution, accessor trees.

pub mod error;
pub mod resolve;
pub mod store;
pub mod tree;
pub mod types;
