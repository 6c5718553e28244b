//! compile_commands.json parsing.
//!
//! CMake can generate a compile_commands.json file that contains
//! the exact compilation commands for each source file. The include paths,
//! definitions and language standard of the matching entry are reused when
//! translating a header.

use crate::error::{BuildError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single compile command from compile_commands.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommand {
    /// The working directory for compilation.
    pub directory: PathBuf,

    /// The source file path.
    pub file: PathBuf,

    /// The full compilation command (space-separated).
    #[serde(default)]
    pub command: Option<String>,

    /// The compilation arguments (array form).
    #[serde(default)]
    pub arguments: Option<Vec<String>>,

    /// Output file (optional).
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl CompileCommand {
    /// Get the compilation arguments as a vector.
    pub fn get_args(&self) -> Vec<String> {
        if let Some(args) = &self.arguments {
            args.clone()
        } else if let Some(cmd) = &self.command {
            // Quoted arguments are not supported
            cmd.split_whitespace().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        }
    }

    /// Include directories, resolved against [`CompileCommand::directory`].
    pub fn get_includes(&self) -> Vec<PathBuf> {
        let args = self.get_args();
        let mut includes = Vec::new();

        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            if (arg == "-I" || arg == "-isystem") && i + 1 < args.len() {
                includes.push(self.directory.join(&args[i + 1]));
                i += 2;
                continue;
            }
            if let Some(dir) = arg.strip_prefix("-I") {
                includes.push(self.directory.join(dir));
            }
            i += 1;
        }

        includes
    }

    /// Extract preprocessor definitions from the arguments.
    pub fn get_defines(&self) -> Vec<String> {
        let args = self.get_args();
        let mut defines = Vec::new();

        let mut i = 0;
        while i < args.len() {
            if args[i] == "-D" && i + 1 < args.len() {
                defines.push(args[i + 1].clone());
                i += 2;
                continue;
            }
            if let Some(define) = args[i].strip_prefix("-D") {
                defines.push(define.to_string());
            }
            i += 1;
        }

        defines
    }

    /// Get the C++ standard from arguments (e.g., "-std=c++17").
    pub fn get_std(&self) -> Option<String> {
        self.get_args()
            .iter()
            .find_map(|arg| arg.strip_prefix("-std=").map(str::to_string))
    }

    /// The flags relevant to libclang: `-std`, `-I` and `-D`.
    pub fn parser_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if let Some(std) = self.get_std() {
            flags.push(format!("-std={}", std));
        }
        flags.extend(
            self.get_includes()
                .iter()
                .map(|i| format!("-I{}", i.display())),
        );
        flags.extend(self.get_defines().iter().map(|d| format!("-D{}", d)));
        flags
    }
}

/// Collection of compile commands (from compile_commands.json).
#[derive(Debug, Clone)]
pub struct CompileCommands {
    commands: Vec<CompileCommand>,
}

impl CompileCommands {
    /// Load compile commands from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| BuildError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse compile commands from a JSON string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self> {
        let commands: Vec<CompileCommand> = serde_json::from_str(json)?;
        Ok(Self { commands })
    }

    /// Get all compile commands.
    pub fn commands(&self) -> &[CompileCommand] {
        &self.commands
    }

    /// Find the compile command for a specific source file.
    pub fn find_command(&self, source: &Path) -> Option<&CompileCommand> {
        self.commands
            .iter()
            .find(|cmd| cmd.file == source || cmd.file.ends_with(source))
    }

    /// Flags for translating `source`.
    ///
    /// Headers rarely have an entry of their own, so without an exact match
    /// the union of all include directories and definitions is used.
    pub fn flags_for(&self, source: &Path) -> Vec<String> {
        if let Some(cmd) = self.find_command(source) {
            return cmd.parser_flags();
        }
        let mut flags: Vec<String> = self
            .all_includes()
            .iter()
            .map(|i| format!("-I{}", i.display()))
            .collect();
        flags.extend(self.all_defines().iter().map(|d| format!("-D{}", d)));
        flags
    }

    /// Get all unique include directories across all commands.
    pub fn all_includes(&self) -> Vec<PathBuf> {
        let mut includes = Vec::new();

        for cmd in &self.commands {
            for inc in cmd.get_includes() {
                if !includes.contains(&inc) {
                    includes.push(inc);
                }
            }
        }

        includes
    }

    /// Get all unique defines across all commands.
    pub fn all_defines(&self) -> Vec<String> {
        let mut defines = Vec::new();

        for cmd in &self.commands {
            for def in cmd.get_defines() {
                if !defines.contains(&def) {
                    defines.push(def);
                }
            }
        }

        defines
    }
}
