//! Module and dependency graph model shared across the serializer.
//!
//! The graph is produced by the bundler front-end and is read-only once it
//! reaches the serializer: processors may replace the whole parameter set
//! they were handed, but nothing in this crate reorders or rewrites graph
//! internals.

use indexmap::IndexMap;

/// One code unit of the bundle.
///
/// `source` holds already-transformed output code; the serializer never
/// parses or rewrites it, it only decides where the code ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Project-relative path identifying the module.
    pub path: String,
    /// Transformed output code.
    pub source: String,
    /// Paths of the modules this module requires, in require order.
    pub dependencies: Vec<String>,
}

impl Module {
    pub fn new(path: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

/// Dependency graph handed over by the bundler front-end.
///
/// Modules are keyed by path and iterate in insertion order, which is the
/// order the front-end resolved them in. Legacy emission relies on that
/// order being stable, so the map is never rebuilt here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleGraph {
    /// Paths of the entry modules.
    pub entry_points: Vec<String>,
    /// All reachable modules, keyed by path.
    pub modules: IndexMap<String, Module>,
}

impl ModuleGraph {
    pub fn new(entry_points: Vec<String>) -> Self {
        Self {
            entry_points,
            modules: IndexMap::new(),
        }
    }

    /// Insert a module, replacing any previous module at the same path.
    pub fn add_module(&mut self, module: Module) {
        self.modules.insert(module.path.clone(), module);
    }

    pub fn module(&self, path: &str) -> Option<&Module> {
        self.modules.get(path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
