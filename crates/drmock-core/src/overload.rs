//! Overload groups and the descriptors generated from them.
//!
//! A mocked method `f` is represented in the generated code by
//!
//! - a public accessor `template<typename ... DRMOCK_Ts> auto & f()`,
//! - one `std::shared_ptr<Method<...>>` storage member per overload,
//! - one private `f_dispatch(TypeContainer<...>)` selector per overload,
//! - one override per overload in the mock subclass.
//!
//! The accessor builds a `TypeContainer` from its template arguments and lets
//! ordinary overload resolution on the `f_dispatch` selectors pick the
//! storage member. Qualifiers of the method itself are encoded with the
//! `drmock::Const` and `drmock::Volatile` markers.

use crate::class::ClassDescriptor;
use crate::error::{Error, Result};
use crate::method::{Access, Method, Param, Signature, TemplateDecl, Variable};
use crate::types::{RefKind, Type};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

pub const TEMPLATE_PACK: &str = "DRMOCK_Ts";
pub const CONST_MARKER: &str = "drmock::Const";
pub const VOLATILE_MARKER: &str = "drmock::Volatile";
pub const TYPE_CONTAINER: &str = "TypeContainer";
pub const RECORDER: &str = "Method";
pub const STORAGE_PREFIX: &str = "METHODS_DRMOCK_";
pub const STATE_OBJECT: &str = "STATE_OBJECT_DRMOCK_";
pub const MOCK_OBJECT: &str = "mock";
const DISPATCH_SUFFIX: &str = "_dispatch";
const MOVE_HELPER: &str = "drmock::moveIfNotCopyConstructible";

/// Group virtual methods by name.
///
/// Only virtual methods whose access is in `access` survive; an empty
/// `access` filter keeps methods with the default (public) access. Groups
/// appear in the order their names are first seen and keep the input order
/// of their members.
pub fn assemble<'a, M, I>(
    parent: &'a ClassDescriptor,
    methods: I,
    access: &[Access],
) -> Vec<OverloadGroup<'a, M>>
where
    M: Signature,
    I: IntoIterator<Item = M>,
{
    let default_access = [Access::default()];
    let allowed = if access.is_empty() {
        &default_access[..]
    } else {
        access
    };

    let mut by_name: IndexMap<String, Vec<M>> = IndexMap::new();
    for method in methods {
        if !method.is_virtual() || !allowed.contains(&method.access()) {
            trace!(name = method.name(), "skipping method");
            continue;
        }
        by_name
            .entry(method.name().to_string())
            .or_default()
            .push(method);
    }

    let groups: Vec<_> = by_name
        .into_values()
        .map(|methods| OverloadGroup { parent, methods })
        .collect();
    debug!(
        class = %parent.full_name(),
        groups = groups.len(),
        "assembled overload groups"
    );
    groups
}

/// Methods of one class that share a name.
#[derive(Debug, Clone)]
pub struct OverloadGroup<'a, M = Method> {
    parent: &'a ClassDescriptor,
    methods: Vec<M>,
}

impl<'a, M: Signature> OverloadGroup<'a, M> {
    /// Create a group from methods that all share one name.
    pub fn new(parent: &'a ClassDescriptor, methods: Vec<M>) -> Result<Self> {
        let first = methods.first().ok_or(Error::EmptyGroup)?;
        if let Some(other) = methods.iter().find(|m| m.name() != first.name()) {
            return Err(Error::MixedNames {
                expected: first.name().to_string(),
                found: other.name().to_string(),
            });
        }
        Ok(Self { parent, methods })
    }

    pub fn parent(&self) -> &ClassDescriptor {
        self.parent
    }

    pub fn methods(&self) -> &[M] {
        &self.methods
    }

    pub fn name(&self) -> &str {
        self.methods[0].name()
    }

    pub fn mangled_name(&self) -> Result<String> {
        self.methods[0].mangled_name()
    }

    /// Whether call sites need explicit template arguments to pick a member.
    pub fn is_overload(&self) -> bool {
        self.methods.len() > 1
    }

    /// The public accessor `template<typename ... DRMOCK_Ts> auto & name()`.
    ///
    /// A single member is selected without template arguments; an overload
    /// set forwards the caller's arguments to the dispatch selectors as-is.
    pub fn generate_getter(&self) -> Result<Method> {
        self.check_dispatch_tags()?;
        let mangled = self.mangled_name()?;

        let mut tag = vec![format!("{} ...", TEMPLATE_PACK)];
        if !self.is_overload() {
            tag.extend(dispatch_tag_args(&self.methods[0]));
        }

        Ok(Method {
            name: mangled.clone(),
            return_type: auto_ref(),
            template: Some(TemplateDecl::new([format!("typename ... {}", TEMPLATE_PACK)])),
            body: format!(
                "return {}{}({}<{}>{{}});",
                mangled,
                DISPATCH_SUFFIX,
                TYPE_CONTAINER,
                tag.join(", ")
            ),
            ..Method::default()
        })
    }

    /// One `std::shared_ptr<Method<...>>` member per overload.
    pub fn generate_shared_ptrs(&self) -> Result<Vec<Variable>> {
        self.check_dispatch_tags()?;
        let mangled = self.mangled_name()?;
        let parent = self.parent.full_name();

        Ok(self
            .methods
            .iter()
            .enumerate()
            .map(|(i, method)| {
                let mut args = vec![parent.clone(), method.return_type().to_string()];
                args.extend(method.params().iter().map(|p| p.ty.decayed().to_string()));
                let recorder = format!("{}<{}>", RECORDER, args.join(", "));
                Variable {
                    name: storage_name(&mangled, i),
                    ty: Type::new(format!("std::shared_ptr<{}>", recorder)),
                    default_args: vec![format!(
                        "std::make_shared<{}>(\"\", {})",
                        recorder, STATE_OBJECT
                    )],
                    access: Access::Private,
                }
            })
            .collect())
    }

    /// One private `name_dispatch(TypeContainer<...>)` selector per overload.
    pub fn generate_dispatch_methods(&self) -> Result<Vec<Method>> {
        self.check_dispatch_tags()?;
        let mangled = self.mangled_name()?;

        Ok(self
            .methods
            .iter()
            .enumerate()
            .map(|(i, method)| Method {
                name: format!("{}{}", mangled, DISPATCH_SUFFIX),
                params: vec![Param::new(Type::new(dispatch_tag(method)))],
                return_type: auto_ref(),
                body: format!("return *{};", storage_name(&mangled, i)),
                access: Access::Private,
                ..Method::default()
            })
            .collect())
    }

    /// The overrides of the mock subclass, one per member.
    pub fn generate_mock_implementations(&self) -> Result<Vec<Method>> {
        self.check_dispatch_tags()?;
        let accessor = self.accessor_prefix()?;

        Ok(self
            .methods
            .iter()
            .map(|method| {
                let params: Vec<Param> = method
                    .params()
                    .iter()
                    .enumerate()
                    .map(|(i, p)| Param::named(p.ty.clone(), format!("a{}", i)))
                    .collect();
                let args: Vec<String> = params.iter().map(forward_argument).collect();
                let call = format!(
                    "{}{}().call({})",
                    accessor,
                    self.template_args(method),
                    args.join(", ")
                );

                let body = if method.return_type().is_void() {
                    format!("{};", call)
                } else {
                    format!(
                        "auto& result = *{};\nreturn std::forward<{}>({}(result));",
                        call,
                        method.return_type(),
                        MOVE_HELPER
                    )
                };

                Method {
                    name: method.name().to_string(),
                    return_type: method.return_type().clone(),
                    params,
                    is_const: method.is_const(),
                    is_volatile: method.is_volatile(),
                    is_override: true,
                    access: method.access(),
                    template: method.template().cloned(),
                    body,
                    ..Method::default()
                }
            })
            .collect())
    }

    /// Statements registering the mock instance with each recorder.
    pub fn generate_set_parent(&self) -> Result<Vec<String>> {
        self.check_dispatch_tags()?;
        let accessor = self.accessor_prefix()?;

        Ok(self
            .methods
            .iter()
            .map(|method| format!("{}{}().parent(this);", accessor, self.template_args(method)))
            .collect())
    }

    /// `mock.name` or `mock.template name`.
    fn accessor_prefix(&self) -> Result<String> {
        let mangled = self.mangled_name()?;
        Ok(if self.is_overload() {
            format!("{}.template {}", MOCK_OBJECT, mangled)
        } else {
            format!("{}.{}", MOCK_OBJECT, mangled)
        })
    }

    /// Explicit accessor template arguments; empty for a single member.
    fn template_args(&self, method: &M) -> String {
        if self.is_overload() {
            format!("<{}>", dispatch_tag_args(method).join(", "))
        } else {
            String::new()
        }
    }

    fn check_dispatch_tags(&self) -> Result<()> {
        let mut seen: FxHashMap<(Vec<&Type>, bool, bool), usize> = FxHashMap::default();
        for (i, method) in self.methods.iter().enumerate() {
            let key = (
                method.params().iter().map(|p| &p.ty).collect(),
                method.is_const(),
                method.is_volatile(),
            );
            if let Some(first) = seen.insert(key, i) {
                return Err(Error::AmbiguousDispatch {
                    name: self.name().to_string(),
                    tag: dispatch_tag(method),
                    first,
                    second: i,
                });
            }
        }
        Ok(())
    }
}

fn auto_ref() -> Type {
    Type::new("auto").lvalue_ref()
}

fn storage_name(mangled: &str, index: usize) -> String {
    format!("{}{}_{}", STORAGE_PREFIX, mangled, index)
}

/// Parameter types followed by the method's own qualifier markers.
fn dispatch_tag_args<M: Signature>(method: &M) -> Vec<String> {
    let mut args: Vec<String> = method.params().iter().map(|p| p.ty.to_string()).collect();
    if method.is_const() {
        args.push(CONST_MARKER.to_string());
    }
    if method.is_volatile() {
        args.push(VOLATILE_MARKER.to_string());
    }
    args
}

fn dispatch_tag<M: Signature>(method: &M) -> String {
    format!("{}<{}>", TYPE_CONTAINER, dispatch_tag_args(method).join(", "))
}

/// Lvalue references are passed through, everything else is moved.
fn forward_argument(param: &Param) -> String {
    let name = param.name.as_deref().unwrap_or_default();
    let arg = match param.ty.reference {
        RefKind::LValue => name.to_string(),
        RefKind::None | RefKind::RValue => format!("std::move({})", name),
    };
    if param.ty.is_pack {
        format!("{}...", arg)
    } else {
        arg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foo() -> ClassDescriptor {
        ClassDescriptor::new("Foo")
    }

    fn ty(spelling: &str) -> Type {
        Type::from_spelling(spelling)
    }

    fn getter(body: &str) -> Method {
        Method {
            name: "foo".to_string(),
            return_type: Type::new("auto").lvalue_ref(),
            template: Some(TemplateDecl::new(["typename ... DRMOCK_Ts"])),
            body: body.to_string(),
            ..Method::default()
        }
    }

    #[test]
    fn test_assemble_default_access() {
        let methods = vec![
            Method::new("g", ty("int"))
                .virtual_()
                .with_access(Access::Protected),
            Method::new("g", ty("int")).with_params([ty("int")]).virtual_(),
            Method::new("h", ty("float")).virtual_(),
            Method::new("h", ty("float")).with_params([ty("int")]).virtual_(),
            Method::new("i", ty("void")),
        ];
        let parent = foo();
        let groups = assemble(&parent, methods.clone(), &[]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].methods(), &[methods[1].clone()]);
        assert_eq!(groups[1].methods(), &[methods[2].clone(), methods[3].clone()]);
        assert!(!groups[0].is_overload());
        assert!(groups[1].is_overload());
    }

    #[test]
    fn test_assemble_groups_by_name_across_access() {
        let methods = vec![
            Method::new("g", ty("int")).virtual_(),
            Method::new("g", ty("int"))
                .with_params([ty("int")])
                .virtual_()
                .with_access(Access::Protected),
            Method::new("h", ty("float"))
                .virtual_()
                .with_access(Access::Protected),
            Method::new("h", ty("float"))
                .with_params([ty("int")])
                .virtual_()
                .with_access(Access::Private),
        ];
        let parent = foo();
        let groups = assemble(
            &parent,
            methods.clone(),
            &[Access::Protected, Access::Private],
        );

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name(), "g");
        assert_eq!(groups[0].methods(), &[methods[1].clone()]);
        assert_eq!(groups[1].name(), "h");
        assert_eq!(groups[1].methods(), &[methods[2].clone(), methods[3].clone()]);
    }

    #[test]
    fn test_assemble_preserves_first_seen_order() {
        let methods = vec![
            Method::new("b", ty("void")).virtual_(),
            Method::new("a", ty("void")).virtual_(),
            Method::new("b", ty("void")).with_params([ty("int")]).virtual_(),
            Method::new("c", ty("void")).virtual_(),
            Method::new("a", ty("void")).constant().virtual_(),
        ];
        let parent = foo();
        let groups = assemble(&parent, methods, &[]);
        let names: Vec<_> = groups.iter().map(|g| g.name()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert!(!groups[1].methods()[0].is_const);
        assert!(groups[1].methods()[1].is_const);
    }

    #[test]
    fn test_assemble_empty() {
        let parent = foo();
        assert!(assemble(&parent, Vec::<Method>::new(), &[]).is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_groups() {
        let parent = foo();
        assert_eq!(
            OverloadGroup::<Method>::new(&parent, vec![]).unwrap_err(),
            Error::EmptyGroup
        );
        let err = OverloadGroup::new(
            &parent,
            vec![Method::new("f", ty("void")), Method::new("g", ty("void"))],
        )
        .unwrap_err();
        assert!(matches!(err, Error::MixedNames { .. }));
    }

    #[test]
    fn test_generate_getter_overload() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![
                Method::new("foo", ty("void")).constant(),
                Method::new("foo", ty("void")).with_params([ty("int")]),
            ],
        )
        .unwrap();
        assert_eq!(
            group.generate_getter().unwrap(),
            getter("return foo_dispatch(TypeContainer<DRMOCK_Ts ...>{});")
        );
    }

    #[test]
    fn test_generate_getter_all_const_overload_uses_caller_pack_only() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![
                Method::new("foo", ty("void")).constant(),
                Method::new("foo", ty("void")).with_params([ty("int")]).constant(),
            ],
        )
        .unwrap();
        assert_eq!(
            group.generate_getter().unwrap().body,
            "return foo_dispatch(TypeContainer<DRMOCK_Ts ...>{});"
        );
    }

    #[test]
    fn test_generate_getter_single() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![Method::new("foo", ty("void"))
                .with_params([ty("int"), ty("float")])
                .constant()],
        )
        .unwrap();
        assert_eq!(
            group.generate_getter().unwrap(),
            getter("return foo_dispatch(TypeContainer<DRMOCK_Ts ..., int, float, drmock::Const>{});")
        );
    }

    #[test]
    fn test_generate_getter_operator() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![Method::new("operator==", ty("bool")).with_params([ty("const Foo &")])],
        )
        .unwrap();
        let getter = group.generate_getter().unwrap();
        assert_eq!(getter.name, "operatorEqual");
        assert_eq!(
            getter.body,
            "return operatorEqual_dispatch(TypeContainer<DRMOCK_Ts ..., const Foo &>{});"
        );
    }

    #[test]
    fn test_generate_shared_ptrs() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![
                Method::new("foo", ty("int")).constant(),
                Method::new("foo", ty("int")).with_params([ty("float")]),
            ],
        )
        .unwrap();
        assert_eq!(
            group.generate_shared_ptrs().unwrap(),
            vec![
                Variable {
                    name: "METHODS_DRMOCK_foo_0".to_string(),
                    ty: Type::new("std::shared_ptr<Method<Foo, int>>"),
                    default_args: vec![
                        "std::make_shared<Method<Foo, int>>(\"\", STATE_OBJECT_DRMOCK_)".to_string()
                    ],
                    access: Access::Private,
                },
                Variable {
                    name: "METHODS_DRMOCK_foo_1".to_string(),
                    ty: Type::new("std::shared_ptr<Method<Foo, int, float>>"),
                    default_args: vec![
                        "std::make_shared<Method<Foo, int, float>>(\"\", STATE_OBJECT_DRMOCK_)"
                            .to_string()
                    ],
                    access: Access::Private,
                },
            ]
        );
    }

    #[test]
    fn test_generate_shared_ptrs_decays_parameters() {
        let parent = ClassDescriptor::new("Baz").in_namespace(["outer"]);
        let group = OverloadGroup::new(
            &parent,
            vec![
                Method::new("baz", ty("const int &")).constant(),
                Method::new("baz", ty("const int &"))
                    .with_params([ty("int &"), ty("const std::string &")])
                    .constant(),
            ],
        )
        .unwrap();
        let vars = group.generate_shared_ptrs().unwrap();
        assert_eq!(
            vars[0].ty.to_string(),
            "std::shared_ptr<Method<outer::Baz, const int &>>"
        );
        assert_eq!(
            vars[1].ty.to_string(),
            "std::shared_ptr<Method<outer::Baz, const int &, int, std::string>>"
        );
    }

    #[test]
    fn test_generate_dispatch_methods() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![
                Method::new("baz", ty("void")).constant(),
                Method::new("baz", ty("void")).with_params([ty("int")]).constant(),
                Method::new("baz", ty("void")).with_params([ty("int")]).volatile(),
            ],
        )
        .unwrap();
        let dispatch = |tag: &str, index: usize| Method {
            name: "baz_dispatch".to_string(),
            params: vec![Param::new(Type::new(tag))],
            return_type: Type::new("auto").lvalue_ref(),
            body: format!("return *METHODS_DRMOCK_baz_{};", index),
            access: Access::Private,
            ..Method::default()
        };
        assert_eq!(
            group.generate_dispatch_methods().unwrap(),
            vec![
                dispatch("TypeContainer<drmock::Const>", 0),
                dispatch("TypeContainer<int, drmock::Const>", 1),
                dispatch("TypeContainer<int, drmock::Volatile>", 2),
            ]
        );
    }

    #[test]
    fn test_dispatch_and_storage_indices_pair_up() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![
                Method::new("f", ty("void")),
                Method::new("f", ty("void")).with_params([ty("int")]),
                Method::new("f", ty("void")).with_params([ty("double")]),
            ],
        )
        .unwrap();
        let storage = group.generate_shared_ptrs().unwrap();
        let dispatch = group.generate_dispatch_methods().unwrap();
        assert_eq!(storage.len(), dispatch.len());
        for (var, method) in storage.iter().zip(&dispatch) {
            assert_eq!(method.body, format!("return *{};", var.name));
        }
        assert_eq!(dispatch[2].params[0].ty.inner, "TypeContainer<double>");
    }

    #[test]
    fn test_generate_mock_implementations_single() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![Method::new("bar", ty("int"))
                .with_params([ty("int")])
                .constant()
                .virtual_()
                .with_body("return 0;")],
        )
        .unwrap();
        assert_eq!(
            group.generate_mock_implementations().unwrap(),
            vec![Method::new("bar", ty("int"))
                .with_param(Param::named(ty("int"), "a0"))
                .constant()
                .with_body(
                    "auto& result = *mock.bar().call(std::move(a0));\n\
                     return std::forward<int>(drmock::moveIfNotCopyConstructible(result));"
                )
                .overriding()]
        );
    }

    #[test]
    fn test_generate_mock_implementations_operator() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![Method::new("operator<=", ty("bool"))
                .with_params([ty("int"), ty("int")])
                .virtual_()],
        )
        .unwrap();
        let mocks = group.generate_mock_implementations().unwrap();
        assert_eq!(mocks[0].name, "operator<=");
        assert_eq!(
            mocks[0].body,
            "auto& result = *mock.operatorLesserOrEqual().call(std::move(a0), std::move(a1));\n\
             return std::forward<bool>(drmock::moveIfNotCopyConstructible(result));"
        );
    }

    #[test]
    fn test_generate_mock_implementations_single_void() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![Method::new("reset", ty("void"))
                .with_params([ty("std::string &")])
                .virtual_()],
        )
        .unwrap();
        let mocks = group.generate_mock_implementations().unwrap();
        assert_eq!(mocks[0].body, "mock.reset().call(a0);");
    }

    #[test]
    fn test_nested_and_const_pointer_references() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![Method::new("f", ty("void"))
                .with_params([
                    ty("std::vector<int>::iterator &"),
                    ty("Bar *const &"),
                    ty("typename Bar::type &&"),
                ])
                .virtual_()],
        )
        .unwrap();

        let mocks = group.generate_mock_implementations().unwrap();
        assert_eq!(mocks[0].body, "mock.f().call(a0, a1, std::move(a2));");

        let vars = group.generate_shared_ptrs().unwrap();
        assert_eq!(
            vars[0].ty.to_string(),
            "std::shared_ptr<Method<Foo, void, std::vector<int>::iterator, Bar *const, typename Bar::type>>"
        );
    }

    #[test]
    fn test_generate_mock_implementations_cv_overloads() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![
                Method::new("bar", ty("void")),
                Method::new("bar", ty("void")).constant(),
                Method::new("bar", ty("void")).volatile(),
                Method::new("bar", ty("void")).constant().volatile(),
            ],
        )
        .unwrap();
        let mocks = group.generate_mock_implementations().unwrap();
        let bodies: Vec<_> = mocks.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(
            bodies,
            vec![
                "mock.template bar<>().call();",
                "mock.template bar<drmock::Const>().call();",
                "mock.template bar<drmock::Volatile>().call();",
                "mock.template bar<drmock::Const, drmock::Volatile>().call();",
            ]
        );
        assert!(mocks.iter().all(|m| m.is_override));
        assert_eq!(
            mocks.iter().map(|m| (m.is_const, m.is_volatile)).collect::<Vec<_>>(),
            vec![(false, false), (true, false), (false, true), (true, true)]
        );
    }

    #[test]
    fn test_generate_mock_implementations_references_and_packs() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![
                Method::new("foo", ty("int &"))
                    .with_params([ty("int"), ty("const float &"), ty("std::vector<double> &&")])
                    .pure_virtual()
                    .with_body("return & value_;"),
                Method::new("foo", ty("const int &"))
                    .with_params([ty("const float &"), ty("Ts && ...")])
                    .constant()
                    .virtual_(),
            ],
        )
        .unwrap();
        let mocks = group.generate_mock_implementations().unwrap();

        assert_eq!(
            mocks[0],
            Method::new("foo", ty("int &"))
                .with_param(Param::named(ty("int"), "a0"))
                .with_param(Param::named(ty("const float &"), "a1"))
                .with_param(Param::named(ty("std::vector<double> &&"), "a2"))
                .with_body(
                    "auto& result = *mock.template foo<int, const float &, std::vector<double> &&>()\
                     .call(std::move(a0), a1, std::move(a2));\n\
                     return std::forward<int &>(drmock::moveIfNotCopyConstructible(result));"
                )
                .overriding()
        );
        assert_eq!(
            mocks[1].body,
            "auto& result = *mock.template foo<const float &, Ts && ..., drmock::Const>()\
             .call(a0, std::move(a1)...);\n\
             return std::forward<const int &>(drmock::moveIfNotCopyConstructible(result));"
        );
        assert_eq!(
            mocks[1]
                .params
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            vec!["const float & a0", "Ts && ... a1"]
        );
        assert!(!mocks[0].is_pure_virtual && !mocks[0].is_virtual);
    }

    #[test]
    fn test_generate_mock_implementations_keep_access() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![Method::new("hook", ty("void"))
                .virtual_()
                .with_access(Access::Protected)],
        )
        .unwrap();
        let mocks = group.generate_mock_implementations().unwrap();
        assert_eq!(mocks[0].access, Access::Protected);
    }

    #[test]
    fn test_generate_set_parent_single() {
        let parent = foo();
        for method in [
            Method::new("foo", ty("void")).with_params([ty("int"), ty("float"), ty("double")]),
            Method::new("foo", ty("void"))
                .with_params([ty("int"), ty("float"), ty("double")])
                .constant(),
        ] {
            let group = OverloadGroup::new(&parent, vec![method]).unwrap();
            assert_eq!(
                group.generate_set_parent().unwrap(),
                vec!["mock.foo().parent(this);"]
            );
        }
    }

    #[test]
    fn test_generate_set_parent_overload() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![
                Method::new("foo", ty("void"))
                    .with_params([ty("int"), ty("float"), ty("double")])
                    .constant(),
                Method::new("foo", ty("void")).with_params([ty("std::unordered_map<int, float>")]),
            ],
        )
        .unwrap();
        assert_eq!(
            group.generate_set_parent().unwrap(),
            vec![
                "mock.template foo<int, float, double, drmock::Const>().parent(this);",
                "mock.template foo<std::unordered_map<int, float>>().parent(this);",
            ]
        );
    }

    #[test]
    fn test_ambiguous_dispatch_tags_are_rejected() {
        let parent = foo();
        let group = OverloadGroup::new(
            &parent,
            vec![
                Method::new("f", ty("int")).with_params([ty("int")]).constant(),
                Method::new("f", ty("void")),
                Method::new("f", ty("void")).with_params([ty("int")]).constant(),
            ],
        )
        .unwrap();
        let expected = Error::AmbiguousDispatch {
            name: "f".to_string(),
            tag: "TypeContainer<int, drmock::Const>".to_string(),
            first: 0,
            second: 2,
        };
        assert_eq!(group.generate_getter().unwrap_err(), expected);
        assert_eq!(group.generate_shared_ptrs().unwrap_err(), expected);
        assert_eq!(group.generate_dispatch_methods().unwrap_err(), expected);
        assert_eq!(group.generate_mock_implementations().unwrap_err(), expected);
        assert_eq!(group.generate_set_parent().unwrap_err(), expected);
    }

    #[test]
    fn test_unknown_operator_propagates() {
        let parent = foo();
        let group =
            OverloadGroup::new(&parent, vec![Method::new("operator int", ty("int")).virtual_()])
                .unwrap();
        assert!(matches!(
            group.generate_mock_implementations(),
            Err(Error::UnknownOperator { .. })
        ));
        assert!(matches!(
            group.generate_getter(),
            Err(Error::UnknownOperator { .. })
        ));
    }

    #[test]
    fn test_plain_method_end_to_end() {
        let methods = vec![
            Method::new("g", ty("int")).with_params([ty("int")]).virtual_(),
            Method::new("g", ty("int"))
                .virtual_()
                .with_access(Access::Protected),
        ];
        let parent = foo();
        let groups = assemble(&parent, methods, &[]);
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.name(), "g");
        assert_eq!(group.methods().len(), 1);

        assert_eq!(
            group.generate_getter().unwrap().body,
            "return g_dispatch(TypeContainer<DRMOCK_Ts ..., int>{});"
        );
        let mocks = group.generate_mock_implementations().unwrap();
        assert_eq!(mocks.len(), 1);
        assert_eq!(
            mocks[0].body,
            "auto& result = *mock.g().call(std::move(a0));\n\
             return std::forward<int>(drmock::moveIfNotCopyConstructible(result));"
        );
    }

    #[test]
    fn test_cv_overload_end_to_end() {
        let methods = vec![
            Method::new("bar", ty("void")).virtual_(),
            Method::new("bar", ty("void")).constant().virtual_(),
            Method::new("bar", ty("void")).volatile().virtual_(),
            Method::new("bar", ty("void")).constant().volatile().virtual_(),
        ];
        let parent = foo();
        let groups = assemble(&parent, methods, &[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].methods().len(), 4);
        let calls: Vec<_> = groups[0]
            .generate_mock_implementations()
            .unwrap()
            .into_iter()
            .map(|m| m.body)
            .collect();
        assert_eq!(
            calls,
            vec![
                "mock.template bar<>().call();",
                "mock.template bar<drmock::Const>().call();",
                "mock.template bar<drmock::Volatile>().call();",
                "mock.template bar<drmock::Const, drmock::Volatile>().call();",
            ]
        );
    }

    impl Method {
        fn overriding(mut self) -> Self {
            self.is_override = true;
            self
        }
    }
}
