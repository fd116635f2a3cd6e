use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::api::HelperMethods;
use crate::resolve::HelperResolver;

/// Name under which this plugin registers itself on a host.
pub const PLUGIN_NAME: &str = "stencil-helpers";

/// Host application kinds. Only app, views, and collection hosts accept
/// helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppKind {
    App,
    Views,
    Collection,
    View,
    Item,
}

/// Minimum contract a host must satisfy for helper attachment: a kind
/// marker, plugin-registration bookkeeping, and a slot for the fixed-shape
/// capability object installed by `attach`.
pub trait Registrar {
    fn kind(&self) -> AppKind;

    fn is_registered(&self, plugin: &str) -> bool;

    fn mark_registered(&mut self, plugin: &str);

    /// Store the capability object under the host's known field. Called at
    /// most once per host; `attach` guards repeat invocations.
    fn define_helpers(&mut self, methods: HelperMethods);
}

/// Whether a host of this kind may receive helpers.
pub fn is_valid_app(kind: AppKind) -> bool {
    matches!(kind, AppKind::App | AppKind::Views | AppKind::Collection)
}

/// Attach helper methods to a host, with an empty resolver (pattern
/// registration is a safe no-op until the host wires a real one). Returns
/// `false` without touching the host when the kind check fails or the plugin
/// is already attached.
pub fn attach<A: Registrar>(app: &mut A) -> bool {
    attach_with_resolver(app, Arc::new(crate::resolve::StaticResolver::new()))
}

/// Attach helper methods backed by the given pattern resolver.
pub fn attach_with_resolver<A: Registrar>(app: &mut A, resolver: Arc<dyn HelperResolver>) -> bool {
    let kind = app.kind();
    if !is_valid_app(kind) {
        debug!(?kind, "host kind does not accept helpers");
        return false;
    }
    if app.is_registered(PLUGIN_NAME) {
        trace!("helpers already attached");
        return false;
    }
    debug!(?kind, "attaching helper methods");
    app.mark_registered(PLUGIN_NAME);
    app.define_helpers(HelperMethods::with_resolver(resolver));
    true
}
