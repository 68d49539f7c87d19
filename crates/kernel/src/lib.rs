//! Module lifecycle, registry, and layered settings shared by every library crate.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{mount_path, InitCtx, Module};
pub use registry::ModuleRegistry;
