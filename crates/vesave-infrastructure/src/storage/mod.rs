//! Storage layer for atomic file operations.

mod atomic_toml;
mod session_file;

pub use atomic_toml::AtomicTomlFile;
pub use session_file::ActiveSessionFile;
