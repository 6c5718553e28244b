//! C++ type spellings.
//!
//! A [`Type`] keeps the pieces of a spelling that the generator has to look
//! at separately: the base name, nested template arguments, cv qualifiers,
//! pointer depth, reference category and whether the type is a pack
//! expansion. A base that does not fit this shape (function types, arrays,
//! dependent nested names, cv-qualified pointers) is kept verbatim as an
//! opaque `inner` token; the reference and pack suffixes around it are
//! still split off.

use std::fmt;

/// Reference category of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefKind {
    /// Not a reference
    #[default]
    None,
    /// `T&`
    LValue,
    /// `T&&`
    RValue,
}

/// A C++ type spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Type {
    /// Base spelling without qualifiers, e.g. `std::vector` or `unsigned int`.
    /// Holds the whole spelling for opaque types.
    pub inner: String,
    /// Template arguments, if the base is a template instantiation.
    pub template_args: Option<Vec<Type>>,
    pub is_const: bool,
    pub is_volatile: bool,
    pub reference: RefKind,
    /// Number of `*` declarators.
    pub pointer_depth: usize,
    /// Whether the type is a pack expansion (`Ts && ...`).
    pub is_pack: bool,
}

impl Type {
    /// Create an unqualified type from a verbatim spelling.
    ///
    /// The spelling is not parsed; use [`Type::from_spelling`] for that.
    pub fn new(inner: impl Into<String>) -> Self {
        Self {
            inner: inner.into(),
            ..Self::default()
        }
    }

    /// Parse a raw type spelling.
    ///
    /// Never fails: a base that cannot be decomposed becomes opaque and is
    /// rendered verbatim.
    pub fn from_spelling(spelling: &str) -> Self {
        let tokens = tokenize(spelling);
        parse_tokens(&tokens, Some(spelling)).unwrap_or_else(|| Self::new(spelling.trim()))
    }

    /// Make this type const-qualified.
    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    /// Make this type volatile-qualified.
    pub fn volatile(mut self) -> Self {
        self.is_volatile = true;
        self
    }

    /// Turn this type into an lvalue reference.
    pub fn lvalue_ref(mut self) -> Self {
        self.reference = RefKind::LValue;
        self
    }

    /// Turn this type into an rvalue reference.
    pub fn rvalue_ref(mut self) -> Self {
        self.reference = RefKind::RValue;
        self
    }

    /// Add one level of pointer indirection.
    pub fn pointer(mut self) -> Self {
        self.pointer_depth += 1;
        self
    }

    /// Mark this type as a pack expansion.
    pub fn pack(mut self) -> Self {
        self.is_pack = true;
        self
    }

    /// Attach template arguments.
    pub fn with_args(mut self, args: Vec<Type>) -> Self {
        self.template_args = Some(args);
        self
    }

    pub fn is_lvalue_ref(&self) -> bool {
        self.reference == RefKind::LValue
    }

    pub fn is_rvalue_ref(&self) -> bool {
        self.reference == RefKind::RValue
    }

    /// Whether this is `void` (possibly cv-qualified), i.e. a function
    /// returning it has no result to forward.
    pub fn is_void(&self) -> bool {
        self.inner == "void"
            && self.template_args.is_none()
            && self.pointer_depth == 0
            && self.reference == RefKind::None
            && !self.is_pack
    }

    /// The type with its reference and top-level cv qualifiers removed.
    ///
    /// For pointers the qualifiers belong to the pointee and are kept.
    pub fn decayed(&self) -> Type {
        let mut ty = self.clone();
        ty.reference = RefKind::None;
        if ty.pointer_depth == 0 {
            ty.is_const = false;
            ty.is_volatile = false;
        }
        ty
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            f.write_str("const ")?;
        }
        if self.is_volatile {
            f.write_str("volatile ")?;
        }
        f.write_str(&self.inner)?;
        if let Some(args) = &self.template_args {
            f.write_str("<")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(">")?;
        }
        if self.pointer_depth > 0 {
            write!(f, " {}", "*".repeat(self.pointer_depth))?;
        }
        match self.reference {
            RefKind::None => {}
            RefKind::LValue => f.write_str(" &")?,
            RefKind::RValue => f.write_str(" &&")?,
        }
        if self.is_pack {
            f.write_str(" ...")?;
        }
        Ok(())
    }
}

impl From<&str> for Type {
    fn from(spelling: &str) -> Self {
        Type::from_spelling(spelling)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Punct(&'a str),
}

impl<'a> Token<'a> {
    fn text(self) -> &'a str {
        match self {
            Token::Word(s) | Token::Punct(s) => s,
        }
    }

    fn is(self, text: &str) -> bool {
        matches!(self, Token::Punct(s) if s == text)
    }

    fn is_qualifier(self) -> bool {
        matches!(self, Token::Word("const") | Token::Word("volatile"))
    }
}

const MULTI_CHAR_PUNCT: [&str; 3] = ["...", "::", "&&"];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn tokenize(spelling: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(c) = spelling[pos..].chars().next() {
        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }

        let rest = &spelling[pos..];
        if is_word_char(c) {
            let len = rest
                .find(|ch: char| !is_word_char(ch))
                .unwrap_or(rest.len());
            tokens.push(Token::Word(&rest[..len]));
            pos += len;
            continue;
        }

        let len = MULTI_CHAR_PUNCT
            .iter()
            .find(|p| rest.starts_with(**p))
            .map_or(c.len_utf8(), |p| p.len());
        tokens.push(Token::Punct(&rest[..len]));
        pos += len;
    }

    tokens
}

/// Join tokens back into text, separating adjacent words and commas.
fn join_tokens(tokens: &[Token<'_>]) -> String {
    let mut out = String::new();
    let mut prev: Option<Token<'_>> = None;
    for &tok in tokens {
        let space = match (prev, tok) {
            (Some(Token::Word(_)), Token::Word(_)) => true,
            (Some(p), _) => p.is(","),
            (None, _) => false,
        };
        if space {
            out.push(' ');
        }
        out.push_str(tok.text());
        prev = Some(tok);
    }
    out
}

fn parse_tokens(tokens: &[Token<'_>], source: Option<&str>) -> Option<Type> {
    let mut ty = Type::default();
    let mut end = tokens.len();

    if end > 0 && tokens[end - 1].is("...") {
        ty.is_pack = true;
        end -= 1;
    }
    if end > 0 {
        if tokens[end - 1].is("&&") {
            ty.reference = RefKind::RValue;
            end -= 1;
        } else if tokens[end - 1].is("&") {
            ty.reference = RefKind::LValue;
            end -= 1;
        }
    }
    if end == 0 {
        return None;
    }

    // `T * const` has no place in the model; everything before the
    // reference stays opaque.
    if has_qualified_pointer(&tokens[..end]) {
        ty.inner = opaque_text(&tokens[..end], source);
        return Some(ty);
    }

    while end > 0 && tokens[end - 1].is("*") {
        ty.pointer_depth += 1;
        end -= 1;
    }

    let mut start = 0;
    while start < end && tokens[start].is_qualifier() {
        set_qualifier(&mut ty, tokens[start]);
        start += 1;
    }
    while end > start && tokens[end - 1].is_qualifier() {
        set_qualifier(&mut ty, tokens[end - 1]);
        end -= 1;
    }

    let body = &tokens[start..end];
    if body.is_empty() {
        return None;
    }
    match decompose(body) {
        Some((name, args)) => {
            ty.inner = name;
            ty.template_args = args;
        }
        None => ty.inner = opaque_text(body, source),
    }
    Some(ty)
}

/// Split a base into its name and template arguments, if it has that shape.
fn decompose(body: &[Token<'_>]) -> Option<(String, Option<Vec<Type>>)> {
    let (name, args) = split_template_args(body)?;
    if name.is_empty()
        || !name
            .iter()
            .all(|t| matches!(t, Token::Word(_)) || t.is("::"))
    {
        return None;
    }
    let args = match args {
        Some(args) => Some(parse_args(args)?),
        None => None,
    };
    Some((join_tokens(name), args))
}

/// Whether the trailing declarators contain a cv-qualified pointer.
fn has_qualified_pointer(tokens: &[Token<'_>]) -> bool {
    let mut qualified = false;
    for tok in tokens.iter().rev() {
        if tok.is_qualifier() {
            qualified = true;
        } else if tok.is("*") {
            if qualified {
                return true;
            }
        } else {
            return false;
        }
    }
    false
}

/// Text of an opaque run of tokens: verbatim from `source` if the tokens
/// were cut from it, else rejoined.
fn opaque_text(tokens: &[Token<'_>], source: Option<&str>) -> String {
    let (Some(source), Some(first), Some(last)) = (source, tokens.first(), tokens.last()) else {
        return join_tokens(tokens);
    };
    let base = source.as_ptr() as usize;
    let start = (first.text().as_ptr() as usize).checked_sub(base);
    let end = (last.text().as_ptr() as usize + last.text().len()).checked_sub(base);
    match (start, end) {
        (Some(start), Some(end)) if start <= end => source
            .get(start..end)
            .map_or_else(|| join_tokens(tokens), str::to_string),
        _ => join_tokens(tokens),
    }
}

fn set_qualifier(ty: &mut Type, tok: Token<'_>) {
    match tok {
        Token::Word("const") => ty.is_const = true,
        Token::Word("volatile") => ty.is_volatile = true,
        _ => {}
    }
}

/// Split `name < args >` into the name and the argument tokens.
///
/// Returns `None` if the angle brackets do not balance.
#[allow(clippy::type_complexity)]
fn split_template_args<'t, 'a>(
    body: &'t [Token<'a>],
) -> Option<(&'t [Token<'a>], Option<&'t [Token<'a>]>)> {
    match body.last() {
        Some(last) if last.is(">") => {}
        _ => return Some((body, None)),
    }

    let mut depth = 0usize;
    for i in (0..body.len()).rev() {
        if body[i].is(">") {
            depth += 1;
        } else if body[i].is("<") {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some((&body[..i], Some(&body[i + 1..body.len() - 1])));
            }
        }
    }
    None
}

fn parse_args(tokens: &[Token<'_>]) -> Option<Vec<Type>> {
    if tokens.is_empty() {
        return Some(Vec::new());
    }

    let mut args = Vec::new();
    let mut depth = 0isize;
    let mut start = 0;
    for (i, tok) in tokens.iter().enumerate() {
        match tok.text() {
            "<" | "(" | "[" | "{" => depth += 1,
            ">" | ")" | "]" | "}" => depth -= 1,
            "," if depth == 0 => {
                args.push(parse_arg(&tokens[start..i])?);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    args.push(parse_arg(&tokens[start..])?);
    Some(args)
}

fn parse_arg(tokens: &[Token<'_>]) -> Option<Type> {
    if tokens.is_empty() {
        return None;
    }
    Some(parse_tokens(tokens, None).unwrap_or_else(|| Type::new(join_tokens(tokens))))
}
