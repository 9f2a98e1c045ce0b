//! # Model Map
//!
//! The common in-memory shape every schema-dialect parser produces, plus a
//! JSON loader for maps exported by those parsers.

pub mod load;
pub mod types;
