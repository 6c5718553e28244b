//! Locating the class to mock inside a translated file.

use crate::ast::{ClangAst, ClangNode, ClangNodeKind, MethodDecl};
use crate::error::Result;
use drmock_core::ClassDescriptor;
use regex::Regex;
use tracing::debug;

/// A class-name pattern, matched at the start of the class spelling.
#[derive(Debug, Clone)]
pub struct ClassPattern {
    source: String,
    regex: Regex,
}

impl ClassPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            source: pattern.to_string(),
            regex: Regex::new(&format!("^(?:{})", pattern))?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// The class selected by [`ClangAst::find_class`].
#[derive(Debug, Clone, Copy)]
pub struct ScannedClass<'a> {
    pub node: &'a ClangNode,
    /// Namespaces the scanner descended through, outermost first.
    pub namespace: &'a [String],
}

impl ScannedClass<'_> {
    pub fn name(&self) -> &str {
        self.node.kind.name().unwrap_or_default()
    }

    pub fn descriptor(&self) -> ClassDescriptor {
        let descriptor =
            ClassDescriptor::new(self.name()).in_namespace(self.namespace.iter().cloned());
        match self.node.template_decl() {
            Some(template) => descriptor.with_template(template),
            None => descriptor,
        }
    }

    /// Member functions of the class in declaration order.
    pub fn methods(&self) -> Vec<MethodDecl> {
        self.node.methods().cloned().collect()
    }
}

/// Owned result of [`ClangAst::find_class`].
#[derive(Debug, Clone)]
pub struct ClassMatch<'a> {
    node: &'a ClangNode,
    namespace: Vec<String>,
}

impl ClassMatch<'_> {
    pub fn scanned(&self) -> ScannedClass<'_> {
        ScannedClass {
            node: self.node,
            namespace: &self.namespace,
        }
    }
}

impl ClangAst {
    /// Children of `node` that were declared in the translated file itself.
    pub fn children<'a>(&'a self, node: &'a ClangNode) -> impl Iterator<Item = &'a ClangNode> + 'a {
        node.children
            .iter()
            .filter(move |child| child.location.file.as_deref() == Some(self.path.as_str()))
    }

    /// Search the translation unit for a class matching `pattern`.
    ///
    /// See [`ClangAst::find_matching_class`] for the search order.
    pub fn find_matching_class_in_unit(
        &self,
        pattern: &ClassPattern,
        enclosing_namespace: Vec<String>,
    ) -> (Option<&ClangNode>, Vec<String>) {
        self.find_matching_class(&self.translation_unit, pattern, enclosing_namespace)
    }

    /// Find a class or class template below `node` whose spelling matches
    /// `pattern`.
    ///
    /// Children are inspected in order. The first namespace child is entered
    /// and its result returned, so later siblings are never inspected and the
    /// namespace stays on the returned path. Structs are not matched. Without
    /// a match the result is `(None, [])`.
    pub fn find_matching_class<'a>(
        &'a self,
        node: &'a ClangNode,
        pattern: &ClassPattern,
        mut enclosing_namespace: Vec<String>,
    ) -> (Option<&'a ClangNode>, Vec<String>) {
        for child in self.children(node) {
            if let ClangNodeKind::Namespace { name } = &child.kind {
                enclosing_namespace.push(name.clone());
                return self.find_matching_class(child, pattern, enclosing_namespace);
            }
            if child.kind.is_class() && child.kind.name().is_some_and(|n| pattern.is_match(n)) {
                debug!(class = ?child.kind.name(), namespace = ?enclosing_namespace, "matched class");
                return (Some(child), enclosing_namespace);
            }
        }
        (None, Vec::new())
    }

    /// Convenience wrapper of [`ClangAst::find_matching_class_in_unit`]
    /// starting with an empty namespace path.
    pub fn find_class(&self, pattern: &ClassPattern) -> Option<ClassMatch<'_>> {
        match self.find_matching_class_in_unit(pattern, Vec::new()) {
            (Some(node), namespace) => Some(ClassMatch { node, namespace }),
            (None, _) => None,
        }
    }
}
