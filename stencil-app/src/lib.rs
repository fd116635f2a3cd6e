use std::collections::HashSet;
use std::sync::Arc;

use stencil_helpers::{
    AppKind, HelperMethods, HelperResolver, Registrar, attach, attach_with_resolver,
};

/// A minimal host application. Plugins register themselves by name; the
/// helper capability object lives in a dedicated slot once attached.
#[derive(Debug)]
pub struct App {
    kind: AppKind,
    plugins: HashSet<String>,
    helpers: Option<HelperMethods>,
}

impl App {
    pub fn new(kind: AppKind) -> Self {
        Self {
            kind,
            plugins: HashSet::new(),
            helpers: None,
        }
    }

    /// Compose the helper plugin with an empty pattern resolver. Safe to
    /// call more than once; repeat calls leave existing helpers untouched.
    pub fn use_helpers(&mut self) -> &mut Self {
        attach(self);
        self
    }

    /// Compose the helper plugin backed by the given pattern resolver.
    pub fn use_helpers_with(&mut self, resolver: Arc<dyn HelperResolver>) -> &mut Self {
        attach_with_resolver(self, resolver);
        self
    }

    /// The helper methods, present once attachment succeeded.
    pub fn helpers(&self) -> Option<&HelperMethods> {
        self.helpers.as_ref()
    }

    pub fn helpers_mut(&mut self) -> Option<&mut HelperMethods> {
        self.helpers.as_mut()
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains(name)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppKind::App)
    }
}

impl Registrar for App {
    fn kind(&self) -> AppKind {
        self.kind
    }

    fn is_registered(&self, plugin: &str) -> bool {
        self.plugins.contains(plugin)
    }

    fn mark_registered(&mut self, plugin: &str) {
        self.plugins.insert(plugin.to_string());
    }

    fn define_helpers(&mut self, methods: HelperMethods) {
        self.helpers = Some(methods);
    }
}
