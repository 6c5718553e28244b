//! Serialization of descriptors into C++ source text.
//!
//! The renderer makes no decisions of its own: every type, name and body
//! comes from the descriptors, only indentation, braces and access labels are
//! added here.

use crate::method::{Access, Method, Variable};
use crate::mock::MockClass;
use crate::overload::{MOCK_OBJECT, RECORDER, STATE_OBJECT, TYPE_CONTAINER};

const INDENT: &str = "  ";

/// Namespace holding the generated recorder object.
pub const DETAIL_NAMESPACE: &str = "drmock_detail";

/// Header-level settings of the generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Runtime support header, included first.
    pub runtime_include: String,
    /// Header declaring the mocked class.
    pub input_include: Option<String>,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            runtime_include: "DrMock/Mock.h".to_string(),
            input_include: None,
        }
    }
}

/// Render a method definition (or a pure declaration).
pub fn render_method(method: &Method, indent: &str) -> String {
    let mut out = String::new();
    if let Some(template) = &method.template {
        out.push_str(&format!("{}{}\n", indent, template));
    }

    let params: Vec<String> = method.params.iter().map(ToString::to_string).collect();
    out.push_str(&format!(
        "{}{}{} {}({})",
        indent,
        if method.is_virtual { "virtual " } else { "" },
        method.return_type,
        method.name,
        params.join(", ")
    ));
    if method.is_const {
        out.push_str(" const");
    }
    if method.is_volatile {
        out.push_str(" volatile");
    }
    if method.is_override {
        out.push_str(" override");
    }
    if method.is_pure_virtual {
        out.push_str(" = 0;\n");
        return out;
    }

    out.push('\n');
    out.push_str(&format!("{}{{\n", indent));
    for line in method.body.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&format!("{}{}{}\n", indent, INDENT, line));
        }
    }
    out.push_str(&format!("{}}}\n", indent));
    out
}

/// Render a member declaration with brace initializer.
pub fn render_variable(variable: &Variable, indent: &str) -> String {
    format!(
        "{}{} {}{{{}}};\n",
        indent,
        variable.ty,
        variable.name,
        variable.default_args.join(", ")
    )
}

/// Render the complete mock header: the recorder object followed by the
/// mock subclass.
pub fn render_header(mock: &MockClass, options: &HeaderOptions) -> String {
    let mut out = String::from("#pragma once\n\n#include <memory>\n#include <utility>\n\n");
    out.push_str(&format!("#include \"{}\"\n", options.runtime_include));
    if let Some(input) = &options.input_include {
        out.push_str(&format!("#include \"{}\"\n", input));
    }
    out.push('\n');
    render_object(&mut out, mock);
    out.push('\n');
    render_mock(&mut out, mock);
    out
}

fn render_object(out: &mut String, mock: &MockClass) {
    let mut namespace = mock.class.namespace.clone();
    namespace.push(DETAIL_NAMESPACE.to_string());

    out.push_str(&open_namespace(&namespace));
    if let Some(template) = &mock.class.template {
        out.push_str(&format!("{}\n", template));
    }
    out.push_str(&format!("class {}\n{{\n", mock.object_name));
    for alias in [TYPE_CONTAINER, RECORDER] {
        out.push_str(&format!(
            "{}template<typename ... DRMOCK_Args> using {} = ::drmock::{}<DRMOCK_Args ...>;\n",
            INDENT, alias, alias
        ));
    }
    out.push('\n');

    let public: Vec<String> = mock.getters.iter().map(|m| render_method(m, INDENT)).collect();
    let mut private: Vec<String> = mock.dispatch.iter().map(|m| render_method(m, INDENT)).collect();
    let mut storage = format!(
        "{}std::shared_ptr<::drmock::StateObject> {}{{std::make_shared<::drmock::StateObject>()}};\n",
        INDENT, STATE_OBJECT
    );
    for variable in &mock.storage {
        storage.push_str(&render_variable(variable, INDENT));
    }
    private.push(storage);

    out.push_str(&sections(vec![(Access::Public, public), (Access::Private, private)]));
    out.push_str("};\n\n");
    out.push_str(&close_namespace(&namespace));
}

fn render_mock(out: &mut String, mock: &MockClass) {
    let namespace = &mock.class.namespace;
    out.push_str(&open_namespace(namespace));

    let object_type = match &mock.class.template {
        Some(template) => {
            out.push_str(&format!("{}\n", template));
            format!("{}<{}>", mock.object_name, template.arguments().join(", "))
        }
        None => mock.object_name.clone(),
    };
    out.push_str(&format!(
        "class {} final : public {}\n{{\n",
        mock.mock_name,
        mock.class.name_with_args()
    ));

    let mut constructor = format!("{}{}()\n{}{{\n", INDENT, mock.mock_name, INDENT);
    for statement in &mock.set_parent {
        constructor.push_str(&format!("{}{}{}\n", INDENT, INDENT, statement));
    }
    constructor.push_str(&format!("{}}}\n", INDENT));
    let member = format!(
        "{}mutable {}::{} {}{{}};\n",
        INDENT, DETAIL_NAMESPACE, object_type, MOCK_OBJECT
    );

    let mut public = vec![constructor, member];
    let mut protected = Vec::new();
    let mut private = Vec::new();
    for method in &mock.overrides {
        let rendered = render_method(method, INDENT);
        match method.access {
            Access::Public => public.push(rendered),
            Access::Protected => protected.push(rendered),
            Access::Private => private.push(rendered),
        }
    }

    out.push_str(&sections(vec![
        (Access::Public, public),
        (Access::Protected, protected),
        (Access::Private, private),
    ]));
    out.push_str("};\n");
    if !namespace.is_empty() {
        out.push('\n');
        out.push_str(&close_namespace(namespace));
    }
}

/// Access-labelled blocks separated by blank lines; empty sections are skipped.
fn sections(sections: Vec<(Access, Vec<String>)>) -> String {
    sections
        .into_iter()
        .filter(|(_, blocks)| !blocks.is_empty())
        .map(|(access, blocks)| format!("{}:\n{}", access, blocks.join("\n")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn open_namespace(namespace: &[String]) -> String {
    if namespace.is_empty() {
        return String::new();
    }
    let opened: Vec<String> = namespace
        .iter()
        .map(|name| format!("namespace {} {{", name))
        .collect();
    format!("{}\n\n", opened.join(" "))
}

fn close_namespace(namespace: &[String]) -> String {
    if namespace.is_empty() {
        return String::new();
    }
    format!(
        "{} // namespace {}\n",
        "}".repeat(namespace.len()),
        namespace.join("::")
    )
}
