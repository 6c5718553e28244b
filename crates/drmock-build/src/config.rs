//! Generator configuration (drmock.toml format).

use crate::error::{BuildError, Result};
use drmock_core::Access;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`DrMockConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "drmock.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrMockConfig {
    /// Code generation settings.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Settings passed on to libclang.
    #[serde(default)]
    pub compiler: CompilerConfig,
}

/// Code generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Access specifiers whose virtual methods are mocked.
    /// Empty means public only.
    #[serde(default)]
    pub access: Vec<String>,

    /// Appended to the class name to form the mock name.
    #[serde(default = "default_mock_suffix")]
    pub mock_suffix: String,

    /// Prepended to the class name to form the recorder object name.
    #[serde(default = "default_object_prefix")]
    pub object_prefix: String,

    /// Runtime support header included by generated files.
    #[serde(default = "default_include")]
    pub include: String,
}

fn default_mock_suffix() -> String {
    "Mock".to_string()
}

fn default_object_prefix() -> String {
    drmock_core::OBJECT_PREFIX.to_string()
}

fn default_include() -> String {
    "DrMock/Mock.h".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            access: Vec::new(),
            mock_suffix: default_mock_suffix(),
            object_prefix: default_object_prefix(),
            include: default_include(),
        }
    }
}

impl GeneratorConfig {
    /// The parsed access filter.
    pub fn access(&self) -> Result<Vec<Access>> {
        self.access
            .iter()
            .map(|s| s.parse().map_err(|e| BuildError::Validation(format!("{}", e))))
            .collect()
    }
}

/// Settings passed on to libclang.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// C++ standard (e.g., "c++17").
    #[serde(default)]
    pub std: Option<String>,

    /// Include directories.
    #[serde(default)]
    pub includes: Vec<PathBuf>,

    /// Preprocessor definitions.
    #[serde(default)]
    pub defines: Vec<String>,

    /// Additional compiler flags.
    #[serde(default)]
    pub cflags: Vec<String>,

    /// Path of the libclang shared library.
    #[serde(default)]
    pub libclang: Option<PathBuf>,

    /// compile_commands.json to take per-file flags from.
    #[serde(default)]
    pub compile_commands: Option<PathBuf>,
}

impl CompilerConfig {
    /// The settings as libclang command-line flags.
    pub fn flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if let Some(std) = &self.std {
            flags.push(format!("-std={}", std));
        }
        flags.extend(self.includes.iter().map(|i| format!("-I{}", i.display())));
        flags.extend(self.defines.iter().map(|d| format!("-D{}", d)));
        flags.extend(self.cflags.iter().cloned());
        flags
    }
}

impl DrMockConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: DrMockConfig = toml::from_str(content)?;
        config.generator.access()?;
        if config.generator.mock_suffix.is_empty() {
            return Err(BuildError::Validation(
                "generator.mock_suffix must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// Relative paths in `[compiler]` are resolved against the directory
    /// containing the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| BuildError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        Ok(match path.parent() {
            Some(dir) => config.relative_to(dir),
            None => config,
        })
    }

    /// Look for `drmock.toml` in `start` and its ancestors.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    fn relative_to(mut self, dir: &Path) -> Self {
        let resolve = |p: &PathBuf| {
            if p.is_relative() {
                dir.join(p)
            } else {
                p.clone()
            }
        };
        let compiler = &mut self.compiler;
        compiler.includes = compiler.includes.iter().map(resolve).collect();
        compiler.libclang = compiler.libclang.as_ref().map(resolve);
        compiler.compile_commands = compiler.compile_commands.as_ref().map(resolve);
        self
    }
}
