//! Clang AST representation.
//!
//! A reduced, owned copy of the libclang cursor tree: only the declarations
//! the scanner and the mock generator look at are kept, everything else
//! becomes [`ClangNodeKind::Unknown`] without children.

use drmock_core::{Access, Method, Param, Signature, TemplateDecl, Type};
use std::fmt;

/// A translated source file.
#[derive(Debug, Clone)]
pub struct ClangAst {
    /// Path the source was translated under; cursors are attributed to it.
    pub path: String,
    /// Root translation unit
    pub translation_unit: ClangNode,
}

/// A node in the Clang AST.
#[derive(Debug, Clone, PartialEq)]
pub struct ClangNode {
    pub kind: ClangNodeKind,
    pub children: Vec<ClangNode>,
    pub location: SourceLocation,
    /// Spellings of the tokens in the cursor's extent.
    pub tokens: Vec<String>,
}

/// Source location of a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.column),
            None => write!(f, "<unknown>"),
        }
    }
}

/// Kinds of Clang AST nodes we care about.
#[derive(Debug, Clone, PartialEq)]
pub enum ClangNodeKind {
    TranslationUnit,
    Namespace { name: String },
    ClassDecl { name: String },
    StructDecl { name: String },
    /// Class template; its parameters are [`ClangNodeKind::TemplateParameter`] children.
    ClassTemplate { name: String },
    /// Template parameter of the enclosing class template.
    TemplateParameter {
        /// Full declaration, e.g. `typename ... Ts` or `int N`.
        declaration: String,
    },
    /// Member function
    Method(MethodDecl),
    /// Any other cursor, by libclang kind spelling.
    Unknown(String),
}

impl ClangNodeKind {
    /// Spelling of named declarations.
    pub fn name(&self) -> Option<&str> {
        match self {
            ClangNodeKind::Namespace { name }
            | ClangNodeKind::ClassDecl { name }
            | ClangNodeKind::StructDecl { name }
            | ClangNodeKind::ClassTemplate { name } => Some(name),
            ClangNodeKind::Method(method) => Some(&method.name),
            _ => None,
        }
    }

    /// Whether the scanner may select this node as the mocked class.
    pub fn is_class(&self) -> bool {
        matches!(
            self,
            ClangNodeKind::ClassDecl { .. } | ClangNodeKind::ClassTemplate { .. }
        )
    }
}

/// A member function declaration as reported by libclang.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodDecl {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Param>,
    pub is_const: bool,
    pub is_volatile: bool,
    pub is_virtual: bool,
    pub is_pure_virtual: bool,
    /// Declared with the `override` specifier
    pub is_override: bool,
    pub access: Access,
}

impl Signature for MethodDecl {
    fn name(&self) -> &str {
        &self.name
    }

    fn params(&self) -> &[Param] {
        &self.params
    }

    fn return_type(&self) -> &Type {
        &self.return_type
    }

    fn is_const(&self) -> bool {
        self.is_const
    }

    fn is_volatile(&self) -> bool {
        self.is_volatile
    }

    fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    fn access(&self) -> Access {
        self.access
    }
}

impl From<&MethodDecl> for Method {
    fn from(decl: &MethodDecl) -> Self {
        Method {
            name: decl.name.clone(),
            return_type: decl.return_type.clone(),
            params: decl.params.clone(),
            is_const: decl.is_const,
            is_volatile: decl.is_volatile,
            is_virtual: decl.is_virtual,
            is_pure_virtual: decl.is_pure_virtual,
            is_override: decl.is_override,
            access: decl.access,
            ..Method::default()
        }
    }
}

impl ClangNode {
    /// Create a new node with the given kind.
    pub fn new(kind: ClangNodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            location: SourceLocation::default(),
            tokens: Vec::new(),
        }
    }

    /// Add a child node.
    pub fn with_child(mut self, child: ClangNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add multiple child nodes.
    pub fn with_children(mut self, children: Vec<ClangNode>) -> Self {
        self.children = children;
        self
    }

    /// Set the source location.
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Set the raw token spellings.
    pub fn with_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// The node's source text, tokens separated by single spaces.
    pub fn token_text(&self) -> String {
        self.tokens.join(" ")
    }

    /// Attribute the node to `file`, keeping line and column.
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.location.file = Some(file.into());
        self
    }

    /// The template declaration assembled from `TemplateParameter` children.
    pub fn template_decl(&self) -> Option<TemplateDecl> {
        if !matches!(self.kind, ClangNodeKind::ClassTemplate { .. }) {
            return None;
        }
        Some(TemplateDecl::new(self.children.iter().filter_map(
            |child| match &child.kind {
                ClangNodeKind::TemplateParameter { declaration } => Some(declaration.clone()),
                _ => None,
            },
        )))
    }

    /// Member function declarations in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.children.iter().filter_map(|child| match &child.kind {
            ClangNodeKind::Method(method) => Some(method),
            _ => None,
        })
    }

    /// Indented tree listing, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        match &self.kind {
            ClangNodeKind::TranslationUnit => out.push_str("TranslationUnit"),
            ClangNodeKind::Namespace { name } => out.push_str(&format!("Namespace {}", name)),
            ClangNodeKind::ClassDecl { name } => out.push_str(&format!("ClassDecl {}", name)),
            ClangNodeKind::StructDecl { name } => out.push_str(&format!("StructDecl {}", name)),
            ClangNodeKind::ClassTemplate { name } => {
                out.push_str(&format!("ClassTemplate {}", name))
            }
            ClangNodeKind::TemplateParameter { declaration } => {
                out.push_str(&format!("TemplateParameter {}", declaration))
            }
            ClangNodeKind::Method(method) => out.push_str(&format!(
                "Method {} {}{}",
                method.access,
                describe(method),
                if method.is_pure_virtual { " = 0" } else { "" }
            )),
            ClangNodeKind::Unknown(kind) => out.push_str(kind),
        }
        if self.location.file.is_some() {
            out.push_str(&format!(" <{}>", self.location));
        }
        out.push('\n');
        for child in &self.children {
            child.dump_into(out, depth + 1);
        }
    }
}

/// Declaration text used by [`ClangNode::dump`].
fn describe(method: &MethodDecl) -> String {
    let params: Vec<String> = method.params.iter().map(ToString::to_string).collect();
    format!(
        "{}{} {}({}){}{}",
        if method.is_virtual { "virtual " } else { "" },
        method.return_type,
        method.name,
        params.join(", "),
        if method.is_const { " const" } else { "" },
        if method.is_volatile { " volatile" } else { "" },
    )
}
