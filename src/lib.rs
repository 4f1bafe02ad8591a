use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tower_lsp::Client;

pub mod analysis;
pub mod codec;
mod completion;
pub mod config;
mod definition;
pub mod error;
mod hover;
pub mod index;
pub mod inspect;
pub mod parser;
mod server;
pub mod types;
pub mod util;
pub mod workspace;

pub use codec::{ResolvedDeclarationSet, SignatureDecoder, VirtualType};
pub use config::Config;
pub use index::{ProjectIndex, SymbolIndex};
pub use parser::ParsedDocument;
pub use types::{Declaration, DeclarationKind, FileAnalysis};

pub struct Backend {
    name: String,
    version: String,
    /// Text of every open document, keyed by URI.
    open_files: Arc<Mutex<HashMap<String, String>>>,
    /// The most recent successful parse of every open document.
    documents: Arc<Mutex<HashMap<String, ParsedDocument>>>,
    /// Declarations of every known file, open or not.
    index: Arc<ProjectIndex>,
    config: Arc<Mutex<Config>>,
    workspace_root: Arc<Mutex<Option<PathBuf>>>,
    client: Option<Client>,
}

impl Backend {
    fn with_client(client: Option<Client>) -> Self {
        Self {
            name: "phake-lsp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            open_files: Arc::new(Mutex::new(HashMap::new())),
            documents: Arc::new(Mutex::new(HashMap::new())),
            index: Arc::new(ProjectIndex::new()),
            config: Arc::new(Mutex::new(Config::default())),
            workspace_root: Arc::new(Mutex::new(None)),
            client,
        }
    }

    pub fn new(client: Client) -> Self {
        Self::with_client(Some(client))
    }

    /// A backend without a client, for tests and the CLI.
    pub fn new_test() -> Self {
        Self::with_client(None)
    }

    /// A client-less backend rooted at `root`, with its config loaded and
    /// its PHP files indexed.
    pub fn new_with_workspace(root: PathBuf) -> Self {
        let backend = Self::with_client(None);
        backend.set_config(Config::load(Some(&root)));
        if let Ok(mut wr) = backend.workspace_root.lock() {
            *wr = Some(root);
        }
        if let Err(e) = backend.index_workspace() {
            tracing::warn!("workspace scan failed: {}", e);
        }
        backend
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_version(&self) -> &str {
        &self.version
    }

    pub fn index(&self) -> &ProjectIndex {
        &self.index
    }

    pub fn config(&self) -> Config {
        self.config
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    pub fn set_config(&self, config: Config) {
        if let Ok(mut c) = self.config.lock() {
            *c = config;
        }
    }

    pub fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace_root
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    fn answer_binder(&self) -> String {
        self.config
            .lock()
            .map(|c| c.phake.answer_binder.clone())
            .unwrap_or_else(|_| config::DEFAULT_ANSWER_BINDER.to_string())
    }

    /// The call-site analysis of an open document.
    pub fn analysis_for(&self, uri: &str) -> Option<FileAnalysis> {
        self.documents
            .lock()
            .ok()
            .and_then(|docs| docs.get(uri).map(|d| d.analysis.clone()))
    }

    fn document(&self, uri: &str) -> Option<ParsedDocument> {
        self.documents
            .lock()
            .ok()
            .and_then(|docs| docs.get(uri).cloned())
    }

    fn open_file(&self, uri: &str) -> Option<String> {
        self.open_files
            .lock()
            .ok()
            .and_then(|files| files.get(uri).cloned())
    }

    fn open_uris(&self) -> HashSet<String> {
        self.open_files
            .lock()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Decode one key against the project index.
    pub fn decode_key(&self, key: &str) -> Option<ResolvedDeclarationSet> {
        let binder = self.answer_binder();
        SignatureDecoder::new(self.index.as_ref(), &binder).decode(key)
    }

    /// Decode every key among `types` and union the results.  Plain type
    /// names are ignored.
    pub fn decode_types(&self, types: &[String]) -> Vec<Declaration> {
        let binder = self.answer_binder();
        let decoder = SignatureDecoder::new(self.index.as_ref(), &binder);
        let mut out: Vec<Declaration> = Vec::new();
        for key in types.iter().filter(|t| codec::key::is_key(t)) {
            for decl in decoder.decode(key).into_iter().flat_map(|s| s.into_vec()) {
                if !out.contains(&decl) {
                    out.push(decl);
                }
            }
        }
        out
    }

    /// Scan the workspace root (if any) into the index.  Files that are
    /// currently open keep their in-editor declarations.  Returns the
    /// number of files indexed.
    pub fn index_workspace(&self) -> error::Result<usize> {
        let Some(root) = self.workspace_root() else {
            return Ok(0);
        };
        let exclude = self.config().index.exclude;
        workspace::index_into(&self.index, &root, &exclude, &self.open_uris())
    }
}
