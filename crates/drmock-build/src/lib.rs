//! Configuration support for the DrMock mock generator.
//!
//! This crate provides:
//! - The configuration format (`drmock.toml`)
//! - compile_commands.json parsing for per-file compiler flags
//!
//! # Example
//!
//! ```toml
//! # drmock.toml
//! [generator]
//! access = ["public", "protected"]
//! mock_suffix = "Mock"
//!
//! [compiler]
//! std = "c++17"
//! includes = ["include"]
//! defines = ["NDEBUG"]
//! compile_commands = "build/compile_commands.json"
//! ```

mod compile_commands;
mod config;
mod error;

pub use compile_commands::{CompileCommand, CompileCommands};
pub use config::{CompilerConfig, DrMockConfig, GeneratorConfig, CONFIG_FILE_NAME};
pub use error::{BuildError, Result};
