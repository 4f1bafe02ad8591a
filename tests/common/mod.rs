#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;

use phake_lsp::Backend;
use phake_lsp::index::SymbolIndex;
use phake_lsp::types::{Declaration, DeclarationKind};
use tower_lsp::LanguageServer;
use tower_lsp::lsp_types::*;

pub fn create_test_backend() -> Backend {
    Backend::new_test()
}

/// Helper: create a temp workspace with the given PHP files, then return
/// a Backend rooted at it with every file indexed.
pub fn create_workspace(files: &[(&str, &str)]) -> (Backend, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    for (rel_path, content) in files {
        let full = dir.path().join(rel_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create dirs");
        }
        fs::write(&full, content).expect("failed to write PHP file");
    }
    let backend = Backend::new_with_workspace(dir.path().to_path_buf());
    (backend, dir)
}

/// Just enough of the Phake library for the codec to resolve against.
pub const PHAKE_PHP: &str = concat!(
    "<?php\n",
    "class Phake {\n",
    "    public static function mock($className, $defaultAnswer = null) {}\n",
    "    public static function partialMock($className, ...$args) {}\n",
    "    public static function verify($mock, $mode = null) {}\n",
    "    public static function when($mock) {}\n",
    "}\n",
    "class Phake_Proxies_AnswerBinderProxy {\n",
    "    public function thenReturn($value) {}\n",
    "    public function thenThrow($exception) {}\n",
    "    public function thenCallParent() {}\n",
    "}\n",
);

pub const USER_PHP: &str = concat!(
    "<?php\n",
    "namespace App\\Models;\n",
    "\n",
    "class User {\n",
    "    public function save(): bool { return true; }\n",
    "    public function getName(): string { return ''; }\n",
    "    public static function find(int $id) {}\n",
    "}\n",
);

pub const MAILER_PHP: &str = concat!(
    "<?php\n",
    "namespace App\\Contracts;\n",
    "\n",
    "interface Mailer {\n",
    "    public function send(string $to): void;\n",
    "}\n",
);

/// A workspace with Phake, `App\Models\User` and `App\Contracts\Mailer`.
/// A git checkout whose `vendor/` is gitignored, as in most Composer
/// projects.
pub fn create_phake_workspace() -> (Backend, tempfile::TempDir) {
    create_workspace(&[
        (".git/HEAD", "ref: refs/heads/main\n"),
        (".gitignore", "/vendor/\n"),
        ("vendor/phake/Phake.php", PHAKE_PHP),
        ("src/Models/User.php", USER_PHP),
        ("src/Contracts/Mailer.php", MAILER_PHP),
    ])
}

pub async fn open_document(backend: &Backend, uri: &Url, text: &str) {
    backend
        .did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri: uri.clone(),
                language_id: "php".to_string(),
                version: 1,
                text: text.to_string(),
            },
        })
        .await;
}

/// Position of the first occurrence of `needle` in `text`, moved `delta`
/// characters to the right.  Test sources are ASCII.
pub fn position_of(text: &str, needle: &str, delta: u32) -> Position {
    let offset = text.find(needle).expect("needle not found");
    let before = &text[..offset];
    let line = before.matches('\n').count() as u32;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    Position {
        line,
        character: (offset - line_start) as u32 + delta,
    }
}

pub fn text_position(uri: &Url, position: Position) -> TextDocumentPositionParams {
    TextDocumentPositionParams {
        text_document: TextDocumentIdentifier { uri: uri.clone() },
        position,
    }
}

// ─── Fake index ─────────────────────────────────────────────────────────────

fn declaration(kind: DeclarationKind, fqn: &str, owner: Option<&str>) -> Declaration {
    let name = match owner {
        Some(_) => fqn.rsplit("::").next().unwrap_or(fqn),
        None => fqn.rsplit('\\').next().unwrap_or(fqn),
    };
    Declaration {
        kind,
        name: name.to_string(),
        fqn: fqn.to_string(),
        owner: owner.map(str::to_string),
        is_static: false,
        uri: "file:///fake.php".to_string(),
        line: 0,
        character: 0,
    }
}

/// An in-memory [`SymbolIndex`] for codec tests.  Names are matched
/// exactly (case-sensitive), which keeps expectations explicit.  Like the
/// real index, a name containing `\` is matched against FQNs.
#[derive(Default)]
pub struct FakeIndex {
    classes: Vec<Declaration>,
    interfaces: Vec<Declaration>,
    methods: HashMap<String, Vec<Declaration>>,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class by FQN (no leading `\`).
    pub fn class(mut self, fqn: &str) -> Self {
        self.classes
            .push(declaration(DeclarationKind::Class, fqn, None));
        self
    }

    pub fn interface(mut self, fqn: &str) -> Self {
        self.interfaces
            .push(declaration(DeclarationKind::Interface, fqn, None));
        self
    }

    /// Register the method behind a `#M#C<owner>.<method>` signature.
    pub fn method(mut self, owner: &str, method: &str) -> Self {
        let fqn = format!("{}::{}", owner, method);
        let signature = format!("#M#C\\{}.{}", owner, method);
        self.methods
            .entry(signature)
            .or_default()
            .push(declaration(DeclarationKind::Method, &fqn, Some(owner)));
        self
    }

    pub fn class_decl(&self, fqn: &str) -> Declaration {
        self.classes
            .iter()
            .find(|d| d.fqn == fqn)
            .cloned()
            .expect("class not in fake index")
    }

    pub fn interface_decl(&self, fqn: &str) -> Declaration {
        self.interfaces
            .iter()
            .find(|d| d.fqn == fqn)
            .cloned()
            .expect("interface not in fake index")
    }

    pub fn method_decl(&self, owner: &str, method: &str) -> Declaration {
        self.methods[&format!("#M#C\\{}.{}", owner, method)][0].clone()
    }
}

fn matches_name(decl: &Declaration, name: &str) -> bool {
    if name.contains('\\') {
        decl.fqn == name.trim_start_matches('\\')
    } else {
        decl.name == name
    }
}

impl SymbolIndex for FakeIndex {
    fn class_by_name(&self, name: &str) -> Option<Declaration> {
        self.classes.iter().find(|d| matches_name(d, name)).cloned()
    }

    fn interfaces_by_name(&self, name: &str) -> Vec<Declaration> {
        self.interfaces
            .iter()
            .filter(|d| matches_name(d, name))
            .cloned()
            .collect()
    }

    fn declarations_by_fqn(&self, fqn: &str) -> Vec<Declaration> {
        let fqn = fqn.strip_prefix('\\').unwrap_or(fqn);
        self.classes
            .iter()
            .chain(self.interfaces.iter())
            .filter(|d| d.fqn == fqn)
            .cloned()
            .collect()
    }

    fn declarations_by_signature(&self, signature: &str) -> Vec<Declaration> {
        self.methods.get(signature).cloned().unwrap_or_default()
    }
}
