//! Tools domain module.
//!
//! This module handles the proxied tools: local scripts or inline shell
//! commands registered under a name with a parameter signature, persisted
//! per user, and executed when a client calls them.
//!
//! ## Architecture
//!
//! - `params.rs` - Parameter signature parsing (`a:int,b:int`)
//! - `definition.rs` - Tool definitions, on-disk entries and call arguments
//! - `store.rs` - Atomic load/save of the registry file
//! - `registry.rs` - In-memory registry enforcing registration rules
//! - `executor.rs` - Process execution with argument binding and timeouts
//! - `handlers.rs` - Parameters of the add/remove management requests
//! - `error.rs` - Tool-specific error types

pub mod definition;
mod error;
pub mod executor;
mod handlers;
pub mod params;
mod registry;
pub mod store;

pub use definition::{ArgValue, ToolArgs, ToolDefinition, ToolSource};
pub use error::{ErrorKind, ExecutionError, ToolError, ToolResult};
pub use executor::{ExecutionOutput, Executor};
pub use handlers::*;
pub use params::{ParamType, ParameterSpec};
pub use registry::ToolRegistry;
pub use store::RegistryStore;
