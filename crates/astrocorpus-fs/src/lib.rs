//! Filesystem primitives for staged, all-or-nothing directory population.
//!
//! - `primitives/` - Directory promotion (`replace_dir`)
//! - `workspace.rs` - Staging directory removed on drop unless committed

mod error;
pub mod primitives;
mod workspace;

pub use error::{Error, Result};
pub use primitives::{ReplaceDirOptions, replace_dir};
pub use workspace::Workspace;
