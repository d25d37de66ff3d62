//! Infrastructure adapters for Maum.
//!
//! Implements the port traits defined in `maum-core`. The stores here are
//! in-memory: the session store honors the same atomic append/replace
//! contract a document store would provide.

pub mod memory;
