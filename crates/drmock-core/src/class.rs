//! The mocked class as seen by the generator.

use crate::method::TemplateDecl;

/// Name, enclosing namespaces and template parameters of a mocked class.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassDescriptor {
    pub name: String,
    /// Enclosing namespaces, outermost first.
    pub namespace: Vec<String>,
    /// Set for class templates.
    pub template: Option<TemplateDecl>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn in_namespace<I, S>(mut self, namespace: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespace = namespace.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_template(mut self, template: TemplateDecl) -> Self {
        self.template = Some(template);
        self
    }

    pub fn is_template(&self) -> bool {
        self.template.is_some()
    }

    /// The class name with template arguments, e.g. `Foo<T, Ts ...>`.
    pub fn name_with_args(&self) -> String {
        match &self.template {
            Some(template) => format!("{}<{}>", self.name, template.arguments().join(", ")),
            None => self.name.clone(),
        }
    }

    /// Fully qualified spelling, e.g. `outer::inner::Foo<T>`.
    pub fn full_name(&self) -> String {
        let mut parts: Vec<&str> = self.namespace.iter().map(String::as_str).collect();
        let name = self.name_with_args();
        parts.push(&name);
        parts.join("::")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        assert_eq!(ClassDescriptor::new("Foo").full_name(), "Foo");
        assert_eq!(
            ClassDescriptor::new("Foo")
                .in_namespace(["outer", "inner"])
                .full_name(),
            "outer::inner::Foo"
        );
    }

    #[test]
    fn test_full_name_of_class_template() {
        let class = ClassDescriptor::new("Foo")
            .in_namespace(["outer"])
            .with_template(TemplateDecl::new(["typename T", "typename ... Ts"]));
        assert!(class.is_template());
        assert_eq!(class.full_name(), "outer::Foo<T, Ts ...>");
    }
}
