pub mod replace_dir;

pub use replace_dir::{ReplaceDirOptions, replace_dir};
