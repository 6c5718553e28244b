//! Clang AST parsing using libclang.

use crate::ast::{ClangAst, ClangNode, ClangNodeKind, MethodDecl, SourceLocation};
use crate::error::{FrontendError, Result};
use clang_sys::*;
use drmock_core::{Access, Param, Type};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_uint};
use std::path::{Path, PathBuf};
use std::ptr;
use tracing::{debug, trace};

/// Options used when formatting diagnostics for [`FrontendError::Diagnostics`].
pub const DIAGNOSTIC_DISPLAY_OPTIONS: CXDiagnosticDisplayOptions = CXDiagnostic_DisplaySourceLocation
    | CXDiagnostic_DisplayColumn
    | CXDiagnostic_DisplaySourceRanges
    | CXDiagnostic_DisplayOption
    | CXDiagnostic_DisplayCategoryId
    | CXDiagnostic_DisplayCategoryName;

/// Heading of the concatenated diagnostics message.
pub const DIAGNOSTICS_HEADING: &str = "Clang failed. Details:";

/// Parser that uses libclang to translate C++ sources.
///
/// libclang is loaded at runtime and the loaded library is bound to the
/// current thread, so a parser must stay on the thread that created it.
pub struct ClangParser {
    index: CXIndex,
}

impl ClangParser {
    /// Create a parser, loading libclang from the default search locations
    /// (or `LIBCLANG_PATH`) if it is not loaded yet.
    pub fn new() -> Result<Self> {
        if !clang_sys::is_loaded() {
            clang_sys::load().map_err(FrontendError::Load)?;
            if let Some(library) = clang_sys::get_library() {
                debug!(path = %library.path().display(), "loaded libclang");
            }
        }
        Self::create_index()
    }

    /// Create a parser backed by a specific libclang shared object.
    pub fn with_library(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(FrontendError::EmptyPath);
        }
        if clang_sys::is_loaded() {
            clang_sys::unload().map_err(FrontendError::Load)?;
        }
        std::env::set_var("LIBCLANG_PATH", path);
        clang_sys::load().map_err(FrontendError::Load)?;
        debug!(path = %path.display(), "loaded libclang");
        Self::create_index()
    }

    fn create_index() -> Result<Self> {
        let index = unsafe { clang_createIndex(0, 0) };
        if index.is_null() {
            return Err(FrontendError::Load("failed to create clang index".to_string()));
        }
        Ok(Self { index })
    }

    /// Translate `source` as if it were the contents of `path`.
    ///
    /// `path` need not exist, but it must be non-empty: it names the main
    /// file in diagnostics and decides which cursors belong to the source.
    /// The source is always parsed as C++ (`-x c++`) followed by `flags`.
    /// Any diagnostic, including warnings, fails the translation.
    pub fn translate(&self, path: &str, source: &str, flags: &[String]) -> Result<ClangAst> {
        if path.is_empty() {
            return Err(FrontendError::EmptyPath);
        }

        let c_path = c_string(path)?;
        let c_source = c_string(source)?;
        let mut args = vec![c_string("-x")?, c_string("c++")?];
        for flag in flags {
            args.push(c_string(flag)?);
        }
        let c_args: Vec<*const c_char> = args.iter().map(|s| s.as_ptr()).collect();

        let mut unsaved_file = CXUnsavedFile {
            Filename: c_path.as_ptr(),
            Contents: c_source.as_ptr(),
            Length: source.len() as _,
        };

        debug!(path, ?flags, "translating");
        unsafe {
            let mut tu: CXTranslationUnit = ptr::null_mut();
            let code = clang_parseTranslationUnit2(
                self.index,
                c_path.as_ptr(),
                c_args.as_ptr(),
                c_args.len() as i32,
                &mut unsaved_file,
                1,
                CXTranslationUnit_None,
                &mut tu,
            );
            if code != CXError_Success || tu.is_null() {
                return Err(FrontendError::Parse {
                    path: path.to_string(),
                    code: code as i32,
                });
            }

            let diagnostics = collect_diagnostics(tu);
            if !diagnostics.is_empty() {
                clang_disposeTranslationUnit(tu);
                let details: Vec<String> =
                    diagnostics.iter().map(|d| format!("\t{}", d)).collect();
                return Err(FrontendError::Diagnostics(format!(
                    "{}\n\n{}",
                    DIAGNOSTICS_HEADING,
                    details.join("\n")
                )));
            }

            let converter = Converter { path, tu };
            let root = converter.convert_cursor(clang_getTranslationUnitCursor(tu));
            clang_disposeTranslationUnit(tu);

            Ok(ClangAst {
                path: path.to_string(),
                translation_unit: root,
            })
        }
    }

    /// Read `path` and translate its contents.
    pub fn translate_file(&self, path: impl AsRef<Path>, flags: &[String]) -> Result<ClangAst> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(FrontendError::EmptyPath);
        }
        let source = std::fs::read_to_string(path).map_err(|source| FrontendError::Io {
            path: PathBuf::from(path),
            source,
        })?;
        self.translate(&path.to_string_lossy(), &source, flags)
    }
}

impl Drop for ClangParser {
    fn drop(&mut self) {
        unsafe {
            clang_disposeIndex(self.index);
        }
    }
}

/// Every diagnostic of `tu`, formatted with [`DIAGNOSTIC_DISPLAY_OPTIONS`].
unsafe fn collect_diagnostics(tu: CXTranslationUnit) -> Vec<String> {
    let count = clang_getNumDiagnostics(tu);
    let mut diagnostics = Vec::with_capacity(count as usize);
    for i in 0..count {
        let diag = clang_getDiagnostic(tu, i);
        diagnostics.push(cx_string_to_string(clang_formatDiagnostic(
            diag,
            DIAGNOSTIC_DISPLAY_OPTIONS,
        )));
        clang_disposeDiagnostic(diag);
    }
    diagnostics
}

/// Copies the cursor tree of one translation unit into owned nodes.
struct Converter<'a> {
    path: &'a str,
    tu: CXTranslationUnit,
}

impl Converter<'_> {
    fn convert_cursor(&self, cursor: CXCursor) -> ClangNode {
        unsafe {
            let kind = clang_getCursorKind(cursor);
            let tokens = tokenize(self.tu, cursor);
            let node_kind = self.convert_cursor_kind(cursor, kind, &tokens);
            let descend = matches!(
                node_kind,
                ClangNodeKind::TranslationUnit
                    | ClangNodeKind::Namespace { .. }
                    | ClangNodeKind::ClassDecl { .. }
                    | ClangNodeKind::StructDecl { .. }
                    | ClangNodeKind::ClassTemplate { .. }
            );

            let children = if descend {
                visit_children(cursor)
                    .into_iter()
                    .filter(|child| self.is_in_file(*child))
                    .map(|child| self.convert_cursor(child))
                    .collect()
            } else {
                Vec::new()
            };

            ClangNode {
                kind: node_kind,
                children,
                location: get_location(cursor),
                tokens,
            }
        }
    }

    unsafe fn is_in_file(&self, cursor: CXCursor) -> bool {
        get_location(cursor).file.as_deref() == Some(self.path)
    }

    unsafe fn convert_cursor_kind(
        &self,
        cursor: CXCursor,
        kind: CXCursorKind,
        tokens: &[String],
    ) -> ClangNodeKind {
        match kind {
            CXCursor_TranslationUnit => ClangNodeKind::TranslationUnit,
            CXCursor_Namespace => ClangNodeKind::Namespace {
                name: cursor_spelling(cursor),
            },
            CXCursor_ClassDecl => ClangNodeKind::ClassDecl {
                name: cursor_spelling(cursor),
            },
            CXCursor_StructDecl => ClangNodeKind::StructDecl {
                name: cursor_spelling(cursor),
            },
            CXCursor_ClassTemplate => ClangNodeKind::ClassTemplate {
                name: cursor_spelling(cursor),
            },
            CXCursor_TemplateTypeParameter
            | CXCursor_NonTypeTemplateParameter
            | CXCursor_TemplateTemplateParameter => ClangNodeKind::TemplateParameter {
                declaration: template_parameter_declaration(cursor, tokens),
            },
            CXCursor_CXXMethod => ClangNodeKind::Method(self.convert_method(cursor)),
            _ => ClangNodeKind::Unknown(cx_string_to_string(clang_getCursorKindSpelling(kind))),
        }
    }

    unsafe fn convert_method(&self, cursor: CXCursor) -> MethodDecl {
        let function_type = clang_getCursorType(cursor);
        let return_type = type_spelling(clang_getResultType(function_type));

        let num_args = clang_Cursor_getNumArguments(cursor).max(0);
        let params = (0..num_args as c_uint)
            .map(|i| {
                let arg = clang_Cursor_getArgument(cursor, i);
                let ty = Type::from_spelling(&type_spelling(clang_getCursorType(arg)));
                match cursor_spelling(arg) {
                    name if name.is_empty() => Param::new(ty),
                    name => Param::named(ty, name),
                }
            })
            .collect();

        let method = MethodDecl {
            name: cursor_spelling(cursor),
            return_type: Type::from_spelling(&return_type),
            params,
            is_const: clang_CXXMethod_isConst(cursor) != 0,
            is_volatile: is_volatile_function(&type_spelling(function_type)),
            is_virtual: clang_CXXMethod_isVirtual(cursor) != 0,
            is_pure_virtual: clang_CXXMethod_isPureVirtual(cursor) != 0,
            is_override: visit_children(cursor)
                .into_iter()
                .any(|child| clang_getCursorKind(child) == CXCursor_CXXOverrideAttr),
            access: get_access(cursor),
        };
        trace!(name = %method.name, virtual_ = method.is_virtual, "method");
        method
    }
}

/// Declaration text of a template parameter, rebuilt from its tokens.
///
/// Token extents may run past the declaration, so tokens are cut at the
/// first top-level `,` or `>`.
unsafe fn template_parameter_declaration(cursor: CXCursor, tokens: &[String]) -> String {
    let mut depth = 0usize;
    let mut kept = Vec::new();
    for token in tokens {
        match token.as_str() {
            "<" => depth += 1,
            ">" if depth == 0 => break,
            ">" => depth -= 1,
            "," if depth == 0 => break,
            _ => {}
        }
        kept.push(token.as_str());
    }
    if kept.is_empty() {
        return format!("typename {}", cursor_spelling(cursor));
    }
    kept.join(" ")
}

/// Whether a function type spelling such as `void (int) const volatile`
/// carries a `volatile` qualifier on the function itself.
fn is_volatile_function(spelling: &str) -> bool {
    spelling
        .rfind(')')
        .map(|end| {
            spelling[end + 1..]
                .split_whitespace()
                .any(|word| word == "volatile")
        })
        .unwrap_or(false)
}

unsafe fn visit_children(cursor: CXCursor) -> Vec<CXCursor> {
    extern "C" fn visitor(
        child: CXCursor,
        _parent: CXCursor,
        data: CXClientData,
    ) -> CXChildVisitResult {
        unsafe {
            let children = &mut *(data as *mut Vec<CXCursor>);
            if clang_Cursor_isNull(child) == 0 {
                children.push(child);
            }
        }
        CXChildVisit_Continue
    }

    let mut children: Vec<CXCursor> = Vec::new();
    clang_visitChildren(
        cursor,
        visitor,
        &mut children as *mut Vec<CXCursor> as CXClientData,
    );
    children
}

unsafe fn tokenize(tu: CXTranslationUnit, cursor: CXCursor) -> Vec<String> {
    let mut tokens: *mut CXToken = ptr::null_mut();
    let mut count: c_uint = 0;
    clang_tokenize(tu, clang_getCursorExtent(cursor), &mut tokens, &mut count);
    if tokens.is_null() {
        return Vec::new();
    }
    let spellings = (0..count as usize)
        .map(|i| cx_string_to_string(clang_getTokenSpelling(tu, *tokens.add(i))))
        .collect();
    clang_disposeTokens(tu, tokens, count);
    spellings
}

unsafe fn get_location(cursor: CXCursor) -> SourceLocation {
    let loc = clang_getCursorLocation(cursor);
    let mut file: CXFile = ptr::null_mut();
    let mut line: c_uint = 0;
    let mut column: c_uint = 0;
    clang_getSpellingLocation(loc, &mut file, &mut line, &mut column, ptr::null_mut());

    let file = if file.is_null() {
        None
    } else {
        Some(cx_string_to_string(clang_getFileName(file)))
    };
    SourceLocation { file, line, column }
}

unsafe fn get_access(cursor: CXCursor) -> Access {
    match clang_getCXXAccessSpecifier(cursor) {
        CX_CXXProtected => Access::Protected,
        CX_CXXPrivate => Access::Private,
        _ => Access::Public,
    }
}

unsafe fn type_spelling(ty: CXType) -> String {
    cx_string_to_string(clang_getTypeSpelling(ty))
}

unsafe fn cursor_spelling(cursor: CXCursor) -> String {
    cx_string_to_string(clang_getCursorSpelling(cursor))
}

/// Convert and dispose a libclang string.
unsafe fn cx_string_to_string(cx_string: CXString) -> String {
    let c_str = clang_getCString(cx_string);
    let result = if c_str.is_null() {
        String::new()
    } else {
        CStr::from_ptr(c_str).to_string_lossy().into_owned()
    };
    clang_disposeString(cx_string);
    result
}

fn c_string(value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| FrontendError::InvalidArgument(value.to_string()))
}
