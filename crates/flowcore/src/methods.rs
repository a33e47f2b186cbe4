use crate::{Flow, FlowKind, MethodResult, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An operation callable by name on flows of kind `T`
pub type MethodFn<T> = Arc<dyn Fn(&Flow<T>, &[Value]) -> MethodResult + Send + Sync>;

/// Table of named operations for one flow kind.
///
/// Built-in tables are built once per kind and shared; a caller's extension
/// table is merged over them once, when the flow is constructed.
pub struct Methods<T: FlowKind> {
    entries: HashMap<String, MethodFn<T>>,
}

impl<T: FlowKind> Methods<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Builder form of [`register`](Self::register)
    pub fn with<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Flow<T>, &[Value]) -> MethodResult + Send + Sync + 'static,
    {
        self.register(name, method);
        self
    }

    /// Register a method, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, method: F)
    where
        F: Fn(&Flow<T>, &[Value]) -> MethodResult + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!("Registering {} method: {}", T::TAG, name);
        self.entries.insert(name, Arc::new(method));
    }

    pub fn get(&self, name: &str) -> Option<&MethodFn<T>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered method names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `base` overlaid with `custom`. Without extensions the shared base
    /// table is returned as is.
    pub fn merged(base: &Arc<Self>, custom: Option<&Self>) -> Arc<Self> {
        match custom {
            Some(custom) if !custom.is_empty() => {
                let mut entries = base.entries.clone();
                entries.extend(
                    custom
                        .entries
                        .iter()
                        .map(|(name, method)| (name.clone(), Arc::clone(method))),
                );
                Arc::new(Self { entries })
            }
            _ => Arc::clone(base),
        }
    }
}

impl<T: FlowKind> Default for Methods<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FlowKind> Clone for Methods<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T: FlowKind> fmt::Debug for Methods<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Methods")
            .field("kind", &T::TAG)
            .field("names", &self.names())
            .finish()
    }
}
