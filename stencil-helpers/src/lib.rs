pub mod api;
pub mod attach;
pub mod error;
pub mod helper;
pub mod loader;
pub mod registry;
pub mod resolve;
pub mod source;

// Re-export key types for convenience.
pub use api::HelperMethods;
pub use attach::{AppKind, PLUGIN_NAME, Registrar, attach, attach_with_resolver, is_valid_app};
pub use error::{HelperError, Result};
pub use helper::{Helper, HelperFn, HelperKind, HelperMap};
pub use loader::{load, load_group};
pub use registry::{HelperEntry, HelperInfo, HelperRegistry, HelperStore};
pub use resolve::{
    GlobResolver, HelperResolver, ModuleExport, ModuleLoader, ResolveError, ResolvedModule,
    StaticResolver,
};
pub use source::{HelperSource, is_helper_group};
