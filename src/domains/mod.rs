//! Domains module containing business logic organized by bounded contexts.
//!
//! The proxy has a single domain: the tools it registers and runs.

pub mod tools;
