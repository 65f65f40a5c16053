//! Retained view tree.
//!
//! The tree is the host primitive the presentation layer mutates: frames,
//! transforms, corner radii, alpha and hierarchy. It carries no rendering;
//! a backend (or a test) reads the resolved state back.
//!
//! - `ViewId` handles are generational; stale handles are rejected.
//! - Mutators return `bool`/`Option` instead of panicking on dead handles.
//! - `snapshot` creates a proxy view that mirrors a region of a source view.

mod id;
mod tree;

pub use id::ViewId;
pub use tree::{ViewContent, ViewNode, ViewTree};
