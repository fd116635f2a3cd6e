use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HelperError, Result};
use crate::helper::{Helper, HelperKind};

/// One slot in a helper store: a flat helper or a named group of helpers.
#[derive(Debug, Clone)]
pub enum HelperEntry {
    Helper(Helper),
    Group(IndexMap<String, Helper>),
}

/// A single name -> helper store. Two independent instances exist per
/// attachment, one sync and one async.
#[derive(Debug, Clone)]
pub struct HelperStore {
    kind: HelperKind,
    entries: IndexMap<String, HelperEntry>,
}

impl HelperStore {
    pub fn new(kind: HelperKind) -> Self {
        Self {
            kind,
            entries: IndexMap::new(),
        }
    }

    pub fn kind(&self) -> HelperKind {
        self.kind
    }

    /// Insert or overwrite a helper under `name`. Later registrations with
    /// the same name win silently. The async store tags the callable as
    /// asynchronous before insertion; the sync store leaves its tag alone.
    pub fn register(&mut self, name: &str, helper: Helper) -> Result<()> {
        if name.is_empty() {
            return Err(HelperError::InvalidName(name.to_string()));
        }
        debug!(name, kind = ?self.kind, "registering helper");
        self.entries
            .insert(name.to_string(), HelperEntry::Helper(self.adopt(helper)));
        Ok(())
    }

    /// Merge entries into the group sub-mapping at `name`, creating it if
    /// absent. Existing group members not present in `entries` are kept; a
    /// flat helper previously stored under `name` is replaced by the group.
    pub fn merge_group<I>(&mut self, name: &str, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Helper)>,
    {
        if name.is_empty() {
            return Err(HelperError::InvalidName(name.to_string()));
        }
        let kind = self.kind;
        let slot = self
            .entries
            .entry(name.to_string())
            .or_insert_with(|| HelperEntry::Group(IndexMap::new()));
        if !matches!(slot, HelperEntry::Group(_)) {
            *slot = HelperEntry::Group(IndexMap::new());
        }
        if let HelperEntry::Group(group) = slot {
            for (member, helper) in entries {
                if member.is_empty() {
                    return Err(HelperError::InvalidName(member));
                }
                let helper = match kind {
                    HelperKind::Async => helper.into_async(),
                    HelperKind::Sync => helper,
                };
                group.insert(member, helper);
            }
        }
        Ok(())
    }

    /// Look up a flat helper. Returns `None` for absent names and for names
    /// holding a group.
    pub fn get(&self, name: &str) -> Option<&Helper> {
        match self.entries.get(name) {
            Some(HelperEntry::Helper(helper)) => Some(helper),
            _ => None,
        }
    }

    /// True iff `get` would return a callable. A group under `name` does not
    /// count.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The group sub-mapping at `name`, if one exists.
    pub fn group(&self, name: &str) -> Option<&IndexMap<String, Helper>> {
        match self.entries.get(name) {
            Some(HelperEntry::Group(group)) => Some(group),
            _ => None,
        }
    }

    /// Registered names (flat helpers and groups) in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &HelperEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn adopt(&self, helper: Helper) -> Helper {
        match self.kind {
            HelperKind::Async => helper.into_async(),
            HelperKind::Sync => helper,
        }
    }
}

/// A serializable inventory row describing one registered helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperInfo {
    pub name: String,
    pub group: Option<String>,
    pub kind: HelperKind,
}

/// The pair of stores owned by one host attachment. Sync and async
/// registries never cross-write.
#[derive(Debug, Clone)]
pub struct HelperRegistry {
    sync: HelperStore,
    async_: HelperStore,
}

impl HelperRegistry {
    pub fn new() -> Self {
        Self {
            sync: HelperStore::new(HelperKind::Sync),
            async_: HelperStore::new(HelperKind::Async),
        }
    }

    pub fn store(&self, kind: HelperKind) -> &HelperStore {
        match kind {
            HelperKind::Sync => &self.sync,
            HelperKind::Async => &self.async_,
        }
    }

    pub fn store_mut(&mut self, kind: HelperKind) -> &mut HelperStore {
        match kind {
            HelperKind::Sync => &mut self.sync,
            HelperKind::Async => &mut self.async_,
        }
    }

    pub fn sync_store(&self) -> &HelperStore {
        &self.sync
    }

    pub fn async_store(&self) -> &HelperStore {
        &self.async_
    }

    /// Flatten both stores into inventory rows, groups included.
    pub fn list(&self) -> Vec<HelperInfo> {
        let mut rows = Vec::new();
        for store in [&self.sync, &self.async_] {
            for (name, entry) in store.entries() {
                match entry {
                    HelperEntry::Helper(helper) => rows.push(HelperInfo {
                        name: name.to_string(),
                        group: None,
                        kind: helper.kind(),
                    }),
                    HelperEntry::Group(group) => {
                        for (member, helper) in group {
                            rows.push(HelperInfo {
                                name: member.clone(),
                                group: Some(name.to_string()),
                                kind: helper.kind(),
                            });
                        }
                    }
                }
            }
        }
        rows
    }
}

impl Default for HelperRegistry {
    fn default() -> Self {
        Self::new()
    }
}
