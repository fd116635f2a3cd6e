use tracing::debug;

use crate::error::{HelperError, Result};
use crate::helper::Helper;
use crate::registry::HelperStore;
use crate::resolve::{HelperResolver, ModuleExport};
use crate::source::{HelperSource, Payload, is_helper_group};

/// Top-level load dispatch for one store.
///
/// `name` is a group-candidate signal: when the classifier rules the payload
/// a group, entries merge into the sub-mapping at `store[name]`; when it
/// does not, a single callable registers flat under `name` and every other
/// payload loads flat with `name` ignored.
pub fn load(
    store: &mut HelperStore,
    name: Option<&str>,
    source: HelperSource,
    resolver: &dyn HelperResolver,
) -> Result<()> {
    if let Some(group) = name {
        if is_helper_group(Some(group), Some(&source)) {
            return load_group(store, group, source, resolver);
        }
    }
    match source.into_payload() {
        Payload::Single(helper) => match name {
            Some(name) => store.register(name, helper),
            None => Err(HelperError::InvalidPayload(
                "a bare callable needs a name".to_string(),
            )),
        },
        payload => {
            let mut entries = Vec::new();
            collect_entries(payload, resolver, &mut entries)?;
            for (name, helper) in entries {
                store.register(&name, helper)?;
            }
            Ok(())
        }
    }
}

/// Merge a payload into the group at `store[name]`, resolving it exactly as
/// a flat bulk load would. A single callable that does not classify as a
/// group falls back to a flat registration under `name` instead of becoming
/// a one-entry group.
pub fn load_group(
    store: &mut HelperStore,
    name: &str,
    source: HelperSource,
    resolver: &dyn HelperResolver,
) -> Result<()> {
    let grouped = is_helper_group(Some(name), Some(&source));
    match source.into_payload() {
        Payload::Single(helper) if !grouped => store.register(name, helper),
        payload => {
            let mut entries = Vec::new();
            collect_entries(payload, resolver, &mut entries)?;
            store.merge_group(name, entries)
        }
    }
}

/// Resolve a payload into ordered `(name, helper)` entries. Later entries
/// overwrite earlier ones when the caller inserts them in order.
fn collect_entries(
    payload: Payload,
    resolver: &dyn HelperResolver,
    out: &mut Vec<(String, Helper)>,
) -> Result<()> {
    match payload {
        Payload::Single(_) => Err(HelperError::InvalidPayload(
            "bulk payloads must carry helper names".to_string(),
        )),
        Payload::Mapping(map) => {
            out.extend(map.into_entries());
            Ok(())
        }
        Payload::Sequence(sources) => {
            for source in sources {
                collect_entries(source.into_payload(), resolver, out)?;
            }
            Ok(())
        }
        Payload::Pattern(pattern) => {
            match resolver.resolve(&pattern) {
                Ok(modules) => {
                    for module in modules {
                        match module.export {
                            ModuleExport::Single(helper) => out.push((module.stem, helper)),
                            ModuleExport::Mapping(map) => out.extend(map.into_entries()),
                        }
                    }
                }
                Err(err) => {
                    // Unresolvable patterns degrade to an empty result.
                    debug!(pattern = %pattern, error = %err, "pattern resolved to nothing");
                }
            }
            Ok(())
        }
    }
}
