//! Method, parameter and member-variable descriptors.

use crate::error::{Error, Result};
use crate::mangle::mangle;
use crate::types::Type;
use std::fmt;
use std::str::FromStr;

/// C++ access specifier for class members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Access {
    /// Also the value of an unspecified access
    #[default]
    Public,
    Protected,
    Private,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Access {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "public" => Ok(Access::Public),
            "protected" => Ok(Access::Protected),
            "private" => Ok(Access::Private),
            other => Err(Error::InvalidAccess(other.to_string())),
        }
    }
}

/// A function parameter: its type and optional declarator name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub ty: Type,
    pub name: Option<String>,
}

impl Param {
    pub fn new(ty: Type) -> Self {
        Self { ty, name: None }
    }

    pub fn named(ty: Type, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: Some(name.into()),
        }
    }
}

impl From<Type> for Param {
    fn from(ty: Type) -> Self {
        Param::new(ty)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = self.ty.to_string();
        let name = match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => return f.write_str(&ty),
        };
        match declarator_position(&ty) {
            Some((pos, true)) => write!(f, "{}{}{}", &ty[..pos], name, &ty[pos..]),
            Some((pos, false)) => {
                let head = ty[..pos].trim_end();
                write!(f, "{} {}{}", head, name, &ty[pos..])
            }
            None => write!(f, "{} {}", ty, name),
        }
    }
}

/// Where the name goes in a declarator such as `void (*)(int)` or
/// `int [3]`, and whether it attaches to the preceding `*`/`&`.
fn declarator_position(spelling: &str) -> Option<(usize, bool)> {
    let mut depth = 0usize;
    let mut prev = None;
    for (i, c) in spelling.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ')' if depth == 0 && matches!(prev, Some('*' | '&')) => return Some((i, true)),
            '[' if depth == 0 => return Some((i, false)),
            _ => {}
        }
        if !c.is_whitespace() {
            prev = Some(c);
        }
    }
    None
}

/// A template parameter list, e.g. `template<typename T, typename ... Ts>`.
///
/// Each entry is a full parameter declaration (`typename ... Ts`, `int N`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TemplateDecl {
    pub params: Vec<String>,
}

impl TemplateDecl {
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// The parameters as template arguments: `typename ... Ts` yields `Ts ...`.
    ///
    /// Default arguments (`typename T = int`) are dropped.
    pub fn arguments(&self) -> Vec<String> {
        self.params
            .iter()
            .map(|decl| {
                let decl = decl.split('=').next().unwrap_or(decl).trim();
                let name = decl
                    .rsplit(|c: char| c.is_whitespace() || c == '.')
                    .next()
                    .unwrap_or(decl);
                if decl.contains("...") {
                    format!("{} ...", name)
                } else {
                    name.to_string()
                }
            })
            .collect()
    }
}

impl fmt::Display for TemplateDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template<{}>", self.params.join(", "))
    }
}

/// A member function descriptor, both as read from the mocked class and as
/// produced for the generated mock.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Method {
    /// Raw name; may be an operator-function-id such as `operator<=`.
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Param>,
    pub is_const: bool,
    pub is_volatile: bool,
    pub is_virtual: bool,
    pub is_pure_virtual: bool,
    pub is_override: bool,
    pub access: Access,
    pub template: Option<TemplateDecl>,
    pub body: String,
}

impl Method {
    pub fn new(name: impl Into<String>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            return_type,
            ..Self::default()
        }
    }

    /// Append unnamed parameters.
    pub fn with_params(mut self, params: impl IntoIterator<Item = Type>) -> Self {
        self.params.extend(params.into_iter().map(Param::new));
        self
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn volatile(mut self) -> Self {
        self.is_volatile = true;
        self
    }

    pub fn virtual_(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// Mark as `virtual ... = 0`.
    pub fn pure_virtual(mut self) -> Self {
        self.is_virtual = true;
        self.is_pure_virtual = true;
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_template(mut self, template: TemplateDecl) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// A generated data member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    /// Brace-initializer fragments.
    pub default_args: Vec<String>,
    pub access: Access,
}

/// What the overload engine needs to know about a method declaration.
///
/// Front-end adapters implement this so that grouping and generation never
/// depend on a concrete AST type.
pub trait Signature {
    fn name(&self) -> &str;
    fn params(&self) -> &[Param];
    fn return_type(&self) -> &Type;
    fn is_const(&self) -> bool;
    fn is_volatile(&self) -> bool;
    fn is_virtual(&self) -> bool;
    fn access(&self) -> Access;

    fn template(&self) -> Option<&TemplateDecl> {
        None
    }

    fn mangled_name(&self) -> Result<String> {
        mangle(self.name())
    }
}

impl Signature for Method {
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

    fn template(&self) -> Option<&TemplateDecl> {
        self.template.as_ref()
    }
}
