//! Collects the descriptors of all overload groups of a class.

use crate::class::ClassDescriptor;
use crate::error::Result;
use crate::method::{Method, Signature, Variable};
use crate::overload::OverloadGroup;
use tracing::debug;

/// Prefix of the generated recorder-holding class.
pub const OBJECT_PREFIX: &str = "DRMOCK_Object_";

/// Everything the renderer needs to emit a mock for one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockClass {
    pub class: ClassDescriptor,
    /// Name of the mock subclass, e.g. `FooMock`.
    pub mock_name: String,
    /// Name of the class holding the recorders, e.g. `DRMOCK_Object_Foo`.
    pub object_name: String,
    pub getters: Vec<Method>,
    pub storage: Vec<Variable>,
    pub dispatch: Vec<Method>,
    pub overrides: Vec<Method>,
    pub set_parent: Vec<String>,
}

impl MockClass {
    /// Run every generation step over every group.
    ///
    /// Fails as a whole if any group fails.
    pub fn generate<M: Signature>(
        class: &ClassDescriptor,
        groups: &[OverloadGroup<'_, M>],
        mock_name: impl Into<String>,
    ) -> Result<Self> {
        let mut mock = MockClass {
            class: class.clone(),
            mock_name: mock_name.into(),
            object_name: format!("{}{}", OBJECT_PREFIX, class.name),
            getters: Vec::new(),
            storage: Vec::new(),
            dispatch: Vec::new(),
            overrides: Vec::new(),
            set_parent: Vec::new(),
        };

        for group in groups {
            mock.getters.push(group.generate_getter()?);
            mock.storage.extend(group.generate_shared_ptrs()?);
            mock.dispatch.extend(group.generate_dispatch_methods()?);
            mock.overrides.extend(group.generate_mock_implementations()?);
            mock.set_parent.extend(group.generate_set_parent()?);
        }

        debug!(
            mock = %mock.mock_name,
            overrides = mock.overrides.len(),
            "generated mock descriptors"
        );
        Ok(mock)
    }

    pub fn with_object_name(mut self, name: impl Into<String>) -> Self {
        self.object_name = name.into();
        self
    }
}
