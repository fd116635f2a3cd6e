use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Which registry a helper belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelperKind {
    Sync,
    Async,
}

/// Function signature for helpers. Helpers receive their arguments as JSON
/// values and produce a JSON value; invocation is entirely the caller's
/// concern, the registries only store and hand these out.
pub type HelperFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// A registrable named callable. The kind tag travels with the value, so a
/// consumer holding a `Helper` can tell an async helper apart without knowing
/// which store it came from.
#[derive(Clone)]
pub struct Helper {
    func: HelperFn,
    kind: HelperKind,
}

impl Helper {
    /// Wrap a plain callable as a sync helper.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            kind: HelperKind::Sync,
        }
    }

    /// Wrap a callable already tagged as asynchronous.
    pub fn new_async<F>(func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new(func).into_async()
    }

    /// Re-tag this helper as asynchronous.
    pub fn into_async(mut self) -> Self {
        self.kind = HelperKind::Async;
        self
    }

    pub fn kind(&self) -> HelperKind {
        self.kind
    }

    pub fn is_async(&self) -> bool {
        self.kind == HelperKind::Async
    }

    /// Invoke the underlying callable.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.func)(args)
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Helper")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// An insertion-ordered `name -> helper` mapping used as a bulk payload.
/// The async tag marks the whole collection; the group classifier counts it
/// as one of the mapping's own keys.
#[derive(Debug, Clone, Default)]
pub struct HelperMap {
    entries: IndexMap<String, Helper>,
    async_tagged: bool,
}

impl HelperMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the previous helper under that name.
    pub fn insert(&mut self, name: impl Into<String>, helper: Helper) -> Option<Helper> {
        self.entries.insert(name.into(), helper)
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, helper: Helper) -> Self {
        self.insert(name, helper);
        self
    }

    /// Mark the collection as asynchronous.
    pub fn tag_async(mut self) -> Self {
        self.async_tagged = true;
        self
    }

    pub fn is_async_tagged(&self) -> bool {
        self.async_tagged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Helper)> {
        self.entries.iter().map(|(name, helper)| (name.as_str(), helper))
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = (String, Helper)> {
        self.entries.into_iter()
    }
}
