use std::path::{Path, PathBuf};

use globset::Glob;
use walkdir::WalkDir;

use crate::helper::{Helper, HelperMap};

/// Exports of one resolved helper module.
#[derive(Debug, Clone)]
pub enum ModuleExport {
    /// The module exports a single callable, keyed by the file's stem.
    Single(Helper),
    /// The module exports a mapping of named callables, spread into the
    /// target store.
    Mapping(HelperMap),
}

/// One entry in the ordered list produced by pattern resolution.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    /// Stem of the file the module came from.
    pub stem: String,
    pub export: ModuleExport,
}

/// Errors from pattern resolution. The loader treats every one of these as a
/// recoverable empty result.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("module error: {0}")]
    Module(String),
}

/// Maps a glob pattern to an ordered sequence of helper modules. Zero
/// matches is a valid, non-error result.
pub trait HelperResolver: Send + Sync {
    fn resolve(&self, pattern: &str) -> Result<Vec<ResolvedModule>, ResolveError>;
}

/// In-memory resolver mapping virtual paths to module exports. This is the
/// default resolver of a plain attachment, where it starts empty and every
/// pattern resolves to nothing.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    modules: Vec<(String, ModuleExport)>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a virtual module.
    pub fn module(mut self, path: impl Into<String>, export: ModuleExport) -> Self {
        self.modules.push((path.into(), export));
        self
    }
}

impl HelperResolver for StaticResolver {
    fn resolve(&self, pattern: &str) -> Result<Vec<ResolvedModule>, ResolveError> {
        let matcher = Glob::new(pattern)
            .map_err(|err| ResolveError::InvalidPattern(err.to_string()))?
            .compile_matcher();
        let mut matched: Vec<&(String, ModuleExport)> = self
            .modules
            .iter()
            .filter(|(path, _)| matcher.is_match(path))
            .collect();
        matched.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(matched
            .into_iter()
            .map(|(path, export)| ResolvedModule {
                stem: file_stem(Path::new(path)),
                export: export.clone(),
            })
            .collect())
    }
}

/// Turns a matched file into helper exports. This is the black box between
/// "an ordered list of files" and "callables"; hosts supply it.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<ModuleExport, ResolveError>;
}

/// Filesystem-backed resolver: walks `root`, matches paths relative to it
/// against the pattern, sorts the matches, and hands each file to the module
/// loader.
#[derive(Debug)]
pub struct GlobResolver<L> {
    root: PathBuf,
    loader: L,
}

impl<L: ModuleLoader> GlobResolver<L> {
    pub fn new(root: impl Into<PathBuf>, loader: L) -> Self {
        Self {
            root: root.into(),
            loader,
        }
    }
}

impl<L: ModuleLoader> HelperResolver for GlobResolver<L> {
    fn resolve(&self, pattern: &str) -> Result<Vec<ResolvedModule>, ResolveError> {
        let matcher = Glob::new(pattern)
            .map_err(|err| ResolveError::InvalidPattern(err.to_string()))?
            .compile_matcher();
        let mut paths: Vec<(PathBuf, PathBuf)> = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(|err| ResolveError::Io(err.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_path_buf();
            if matcher.is_match(&rel) {
                paths.push((rel, entry.path().to_path_buf()));
            }
        }
        paths.sort();

        let mut modules = Vec::with_capacity(paths.len());
        for (rel, full) in paths {
            modules.push(ResolvedModule {
                stem: file_stem(&rel),
                export: self.loader.load(&full)?,
            });
        }
        Ok(modules)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
