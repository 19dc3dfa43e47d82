//! Tool system and built-in tools

pub mod base;
pub mod builtin;
pub mod discovery;
pub mod registry;
pub mod server;
pub mod wrapper;

pub use base::{validators, ResponseBuilder, Tool, ToolArgs};
pub use discovery::{ToolDiscovery, ToolSource};
pub use registry::ToolRegistry;
pub use server::{ToolFunction, ToolServer};
pub use wrapper::{InputParser, WrappedTool};
