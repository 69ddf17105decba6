//! Verbena Registry
//!
//! Static lookup from tool id to the editor that configures it. Each
//! [`ToolEntry`] knows how to build its [`verbena_state::ToolSpec`] and open a
//! [`verbena_state::ConfigEditor`] for a node.

mod entry;
mod registry;
mod spec;

pub use entry::{Category, EditorRef, ToolEntry, generic_spec};
pub use registry::{categories, entries, lookup, lookup_kind, resolve};
pub use spec::{SEARCH_WEIGHTS, spec_for};
