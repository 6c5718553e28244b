//! Mock generation pipeline: read, translate, scan, assemble, generate,
//! render.

use drmock_build::{CompileCommands, CompilerConfig, DrMockConfig};
use drmock_clang::{ClangAst, ClangParser, ClassPattern};
use drmock_core::{
    assemble, render_header, Access, ClassDescriptor, HeaderOptions, MockClass, OBJECT_PREFIX,
};
use miette::{Diagnostic, IntoDiagnostic, Result, WrapErr};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Diagnostic, Debug)]
pub enum DriverError {
    #[error("no class matching `{pattern}` in `{path}`")]
    #[diagnostic(
        code(drmock::driver::class_not_found),
        help("only classes and class templates are matched, and only inside the first namespace of each scope")
    )]
    ClassNotFound { pattern: String, path: String },
}

/// What to generate and how to name it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Regex matched against the start of class names.
    pub pattern: String,
    /// Overrides `<Class><mock_suffix>`.
    pub mock_name: Option<String>,
    /// Access filter; empty means public only.
    pub access: Vec<Access>,
    /// Compiler flags after the implicit `-x c++`.
    pub flags: Vec<String>,
    pub mock_suffix: String,
    pub object_prefix: String,
    pub runtime_include: String,
    /// Header of the mocked class; defaults to the input file name.
    pub input_include: Option<String>,
}

impl GenerateRequest {
    pub fn new(pattern: impl Into<String>) -> Self {
        let defaults = HeaderOptions::default();
        Self {
            pattern: pattern.into(),
            mock_name: None,
            access: Vec::new(),
            flags: Vec::new(),
            mock_suffix: "Mock".to_string(),
            object_prefix: OBJECT_PREFIX.to_string(),
            runtime_include: defaults.runtime_include,
            input_include: None,
        }
    }

    /// A request carrying the `[generator]` settings of `config`.
    pub fn from_config(pattern: impl Into<String>, config: &DrMockConfig) -> Result<Self> {
        let generator = &config.generator;
        Ok(Self {
            access: generator.access()?,
            mock_suffix: generator.mock_suffix.clone(),
            object_prefix: generator.object_prefix.clone(),
            runtime_include: generator.include.clone(),
            ..Self::new(pattern)
        })
    }

    pub fn with_mock_name(mut self, name: impl Into<String>) -> Self {
        self.mock_name = Some(name.into());
        self
    }

    pub fn with_access(mut self, access: Vec<Access>) -> Self {
        self.access = access;
        self
    }

    pub fn with_flags(mut self, flags: Vec<String>) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_input_include(mut self, include: impl Into<String>) -> Self {
        self.input_include = Some(include.into());
        self
    }
}

/// A generated mock header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMock {
    pub class: ClassDescriptor,
    pub mock_name: String,
    pub header: String,
}

/// Mock generator driver that orchestrates the pipeline.
pub struct Driver {
    parser: ClangParser,
}

impl Driver {
    /// Create a driver using the default libclang.
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: ClangParser::new()?,
        })
    }

    /// Create a driver using the libclang configured in `config`, if any.
    pub fn from_config(config: &CompilerConfig) -> Result<Self> {
        let parser = match &config.libclang {
            Some(path) => ClangParser::with_library(path)?,
            None => ClangParser::new()?,
        };
        Ok(Self { parser })
    }

    pub fn with_library(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            parser: ClangParser::with_library(path)?,
        })
    }

    /// Translate a file without generating anything.
    pub fn translate_file(&self, path: impl AsRef<Path>, flags: &[String]) -> Result<ClangAst> {
        Ok(self.parser.translate_file(path, flags)?)
    }

    /// Generate a mock for a class declared in `source`.
    pub fn generate_source(
        &self,
        path: &str,
        source: &str,
        request: &GenerateRequest,
    ) -> Result<GeneratedMock> {
        let ast = self.parser.translate(path, source, &request.flags)?;
        generate_from_ast(&ast, request)
    }

    /// Generate a mock for a class declared in the file at `path`.
    pub fn generate_file(
        &self,
        path: impl AsRef<Path>,
        request: &GenerateRequest,
    ) -> Result<GeneratedMock> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

        let mut request = request.clone();
        if request.input_include.is_none() {
            request.input_include = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
        }
        self.generate_source(&path.to_string_lossy(), &source, &request)
    }
}

/// Scan `ast` and render the mock header.
pub fn generate_from_ast(ast: &ClangAst, request: &GenerateRequest) -> Result<GeneratedMock> {
    let pattern = ClassPattern::new(&request.pattern)?;
    let found = ast
        .find_class(&pattern)
        .ok_or_else(|| DriverError::ClassNotFound {
            pattern: request.pattern.clone(),
            path: ast.path.clone(),
        })?;
    let scanned = found.scanned();
    let class = scanned.descriptor();
    let methods = scanned.methods();
    debug!(class = %class.full_name(), methods = methods.len(), "scanned class");

    let groups = assemble(&class, methods, &request.access);
    let mock_name = request
        .mock_name
        .clone()
        .unwrap_or_else(|| format!("{}{}", class.name, request.mock_suffix));
    let mock = MockClass::generate(&class, &groups, mock_name.clone())?
        .with_object_name(format!("{}{}", request.object_prefix, class.name));

    let header = render_header(
        &mock,
        &HeaderOptions {
            runtime_include: request.runtime_include.clone(),
            input_include: request.input_include.clone(),
        },
    );
    info!(class = %class.full_name(), mock = %mock_name, groups = groups.len(), "generated mock");

    Ok(GeneratedMock {
        class,
        mock_name,
        header,
    })
}

/// Compiler flags for translating `input`: the `[compiler]` settings, then
/// the flags of its compile_commands.json entry.
pub fn compiler_flags(config: &CompilerConfig, input: &Path) -> Result<Vec<String>> {
    let mut flags = config.flags();
    if let Some(path) = &config.compile_commands {
        let commands = CompileCommands::from_file(path)?;
        flags.extend(commands.flags_for(input));
    }
    Ok(flags)
}
