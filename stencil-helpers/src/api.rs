use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::helper::{Helper, HelperKind};
use crate::loader;
use crate::registry::{HelperInfo, HelperRegistry};
use crate::resolve::{HelperResolver, StaticResolver};
use crate::source::HelperSource;

/// The fixed-shape capability object installed on a host: the six
/// registration/lookup operations over one pair of stores. Registration
/// operations return `&mut Self` for chaining; lookups never error.
pub struct HelperMethods {
    registry: HelperRegistry,
    resolver: Arc<dyn HelperResolver>,
}

impl HelperMethods {
    /// Methods with an empty resolver; pattern registration is a no-op.
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(StaticResolver::new()))
    }

    pub fn with_resolver(resolver: Arc<dyn HelperResolver>) -> Self {
        Self {
            registry: HelperRegistry::new(),
            resolver,
        }
    }

    /// Register one named sync helper. Never grouped.
    pub fn helper(&mut self, name: &str, helper: Helper) -> Result<&mut Self> {
        self.registry
            .store_mut(HelperKind::Sync)
            .register(name, helper)?;
        Ok(self)
    }

    /// Bulk-register sync helpers from a mapping, sequence, or pattern.
    pub fn helpers<S: Into<HelperSource>>(&mut self, source: S) -> Result<&mut Self> {
        self.load(HelperKind::Sync, None, source.into())
    }

    /// Two-argument bulk form: `name` is a group-candidate signal consumed
    /// by the classifier; flat bulk payloads ignore it, a lone callable
    /// registers under it.
    pub fn helpers_named<S: Into<HelperSource>>(
        &mut self,
        name: &str,
        source: S,
    ) -> Result<&mut Self> {
        self.load(HelperKind::Sync, Some(name), source.into())
    }

    /// Register one named async helper. The stored callable is tagged
    /// asynchronous. Never grouped.
    pub fn async_helper(&mut self, name: &str, helper: Helper) -> Result<&mut Self> {
        self.registry
            .store_mut(HelperKind::Async)
            .register(name, helper)?;
        Ok(self)
    }

    /// Bulk-register async helpers.
    pub fn async_helpers<S: Into<HelperSource>>(&mut self, source: S) -> Result<&mut Self> {
        self.load(HelperKind::Async, None, source.into())
    }

    /// Async counterpart of [`helpers_named`](Self::helpers_named).
    pub fn async_helpers_named<S: Into<HelperSource>>(
        &mut self,
        name: &str,
        source: S,
    ) -> Result<&mut Self> {
        self.load(HelperKind::Async, Some(name), source.into())
    }

    /// Merge a payload into the named group of the chosen store.
    pub fn helper_group<S: Into<HelperSource>>(
        &mut self,
        name: &str,
        source: S,
        is_async: bool,
    ) -> Result<&mut Self> {
        let kind = if is_async {
            HelperKind::Async
        } else {
            HelperKind::Sync
        };
        loader::load_group(
            self.registry.store_mut(kind),
            name,
            source.into(),
            self.resolver.as_ref(),
        )?;
        Ok(self)
    }

    pub fn get_helper(&self, name: &str) -> Option<&Helper> {
        self.registry.sync_store().get(name)
    }

    pub fn get_async_helper(&self, name: &str) -> Option<&Helper> {
        self.registry.async_store().get(name)
    }

    pub fn has_helper(&self, name: &str) -> bool {
        self.registry.sync_store().has(name)
    }

    pub fn has_async_helper(&self, name: &str) -> bool {
        self.registry.async_store().has(name)
    }

    pub fn registry(&self) -> &HelperRegistry {
        &self.registry
    }

    /// Inventory rows for both stores, groups included.
    pub fn list(&self) -> Vec<HelperInfo> {
        self.registry.list()
    }

    fn load(
        &mut self,
        kind: HelperKind,
        name: Option<&str>,
        source: HelperSource,
    ) -> Result<&mut Self> {
        loader::load(
            self.registry.store_mut(kind),
            name,
            source,
            self.resolver.as_ref(),
        )?;
        Ok(self)
    }
}

impl Default for HelperMethods {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HelperMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperMethods")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::HelperMap;
    use crate::resolve::ModuleExport;
    use serde_json::{Value, json};

    fn noop() -> Helper {
        Helper::new(|_| Ok(Value::Null))
    }

    #[test]
    fn test_sync_helper_roundtrip() {
        let mut methods = HelperMethods::new();
        methods
            .helper("upper", Helper::new(|args| {
                let input = args.first().and_then(Value::as_str).unwrap_or_default();
                Ok(json!(input.to_uppercase()))
            }))
            .unwrap();

        assert!(methods.has_helper("upper"));
        let helper = methods.get_helper("upper").unwrap();
        assert_eq!(helper.call(&[json!("hi")]).unwrap(), json!("HI"));
        assert!(!methods.has_async_helper("upper"));
    }

    #[test]
    fn test_chaining() {
        let mut methods = HelperMethods::new();
        methods
            .helper("one", noop())
            .unwrap()
            .helper("two", noop())
            .unwrap()
            .async_helper("three", noop())
            .unwrap();

        assert!(methods.has_helper("one"));
        assert!(methods.has_helper("two"));
        assert!(methods.has_async_helper("three"));
    }

    #[test]
    fn test_async_helper_is_tagged() {
        let mut methods = HelperMethods::new();
        methods.async_helper("two", noop()).unwrap();

        let helper = methods.get_async_helper("two").unwrap();
        assert!(helper.is_async());
        assert!(!methods.has_helper("two"));
    }

    #[test]
    fn test_bulk_mapping() {
        let mut methods = HelperMethods::new();
        methods
            .helpers(
                HelperMap::new()
                    .with("x", noop())
                    .with("y", noop())
                    .with("z", noop()),
            )
            .unwrap();

        for name in ["x", "y", "z"] {
            assert!(methods.has_helper(name), "missing {name}");
        }
    }

    #[test]
    fn test_bulk_pattern_through_resolver() {
        let resolver = StaticResolver::new()
            .module("fixtures/a.js", ModuleExport::Single(noop()))
            .module("fixtures/b.js", ModuleExport::Single(noop()))
            .module("fixtures/c.js", ModuleExport::Single(noop()));
        let mut methods = HelperMethods::with_resolver(Arc::new(resolver));

        methods.helpers("fixtures/[a-c].js").unwrap();
        methods.async_helpers("fixtures/[a-c].js").unwrap();

        for name in ["a", "b", "c"] {
            assert!(methods.has_helper(name), "missing sync {name}");
            assert!(methods.has_async_helper(name), "missing async {name}");
            assert!(methods.get_async_helper(name).unwrap().is_async());
        }
    }

    #[test]
    fn test_bad_pattern_registers_nothing() {
        let mut methods = HelperMethods::new();
        methods.helpers("fixtures/*.foo").unwrap();
        methods.helpers("fixtures/[.js").unwrap();
        assert!(methods.registry().sync_store().is_empty());
    }

    #[test]
    fn test_helpers_named_routes_groups() {
        let mut methods = HelperMethods::new();
        methods
            .helpers_named("fmt", HelperMap::new().with("pad", noop()))
            .unwrap();

        assert!(!methods.has_helper("fmt"));
        assert!(
            methods
                .registry()
                .sync_store()
                .group("fmt")
                .unwrap()
                .contains_key("pad")
        );
    }

    #[test]
    fn test_helpers_named_single_registers_flat() {
        let mut methods = HelperMethods::new();
        methods.helpers_named("one", HelperSource::single(noop())).unwrap();
        assert!(methods.has_helper("one"));
    }

    #[test]
    fn test_helper_group_merges() {
        let mut methods = HelperMethods::new();
        methods
            .helper_group(
                "foo",
                HelperMap::new().with("x", noop()).with("y", noop()),
                false,
            )
            .unwrap();
        methods
            .helper_group("foo", HelperMap::new().with("z", noop()), false)
            .unwrap();

        let group = methods.registry().sync_store().group("foo").unwrap();
        for member in ["x", "y", "z"] {
            assert!(group.contains_key(member), "missing {member}");
        }
    }

    #[test]
    fn test_async_helper_group() {
        let mut methods = HelperMethods::new();
        methods
            .helper_group("foo", HelperMap::new().with("x", noop()), true)
            .unwrap();

        let group = methods.registry().async_store().group("foo").unwrap();
        assert!(group["x"].is_async());
        assert!(methods.registry().sync_store().group("foo").is_none());
    }

    #[test]
    fn test_single_callable_group_falls_back_to_flat() {
        let mut methods = HelperMethods::new();
        methods
            .helper_group(
                "lone",
                HelperSource::single(Helper::new_async(|_| Ok(Value::Null))),
                true,
            )
            .unwrap();

        assert!(methods.has_async_helper("lone"));
        assert!(methods.registry().async_store().group("lone").is_none());
    }

    #[test]
    fn test_list_inventory() {
        let mut methods = HelperMethods::new();
        methods.helper("plain", noop()).unwrap();
        methods
            .helper_group("fmt", HelperMap::new().with("pad", noop()), true)
            .unwrap();

        let rows = methods.list();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().any(|row| row.name == "plain" && row.group.is_none()));
        assert!(
            rows.iter()
                .any(|row| row.name == "pad" && row.group.as_deref() == Some("fmt"))
        );
    }
}
