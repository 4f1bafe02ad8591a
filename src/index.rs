/// Project-wide symbol index.
///
/// [`SymbolIndex`] is the read-only lookup surface the codec decodes
/// against.  [`ProjectIndex`] is the concrete, long-lived implementation
/// owned by the server: it stores the declarations of every indexed file
/// and keeps derived lookup tables that are rebuilt whenever files are
/// added, replaced, or removed.
///
/// PHP class and method names are case-insensitive, so every lookup key is
/// ASCII-lowercased.  Where several declarations share a key they are kept
/// in file-URI order so lookups are deterministic.
use std::collections::HashMap;

use parking_lot::RwLock;

use crate::types::{Declaration, DeclarationKind};

/// Read-only declaration lookups.
pub trait SymbolIndex {
    /// The class with this exact name (first one, if several namespaces
    /// declare it).  A name containing `\` can never be a short name and
    /// is looked up as a fully-qualified path instead.
    fn class_by_name(&self, name: &str) -> Option<Declaration>;

    /// Every interface with this exact name.  Qualified names are looked
    /// up by path, as for [`class_by_name`](Self::class_by_name).
    fn interfaces_by_name(&self, name: &str) -> Vec<Declaration>;

    /// Every class-like declared at this fully-qualified path.  A leading
    /// `\` is optional.
    fn declarations_by_fqn(&self, fqn: &str) -> Vec<Declaration>;

    /// What a call-signature token statically resolves to.
    ///
    /// Understands `#C<fqn>` (the class-like itself) and
    /// `#M#C<fqn>.<method>` (the method).  Anything else resolves to
    /// nothing.
    fn declarations_by_signature(&self, signature: &str) -> Vec<Declaration>;
}

/// Lowercased FQN without the leading `\`.
pub(crate) fn fqn_key(fqn: &str) -> String {
    fqn.strip_prefix('\\').unwrap_or(fqn).to_ascii_lowercase()
}

#[derive(Default)]
struct Tables {
    /// Declarations per file URI, as extracted.
    files: HashMap<String, Vec<Declaration>>,
    classes_by_name: HashMap<String, Vec<Declaration>>,
    interfaces_by_name: HashMap<String, Vec<Declaration>>,
    class_likes_by_fqn: HashMap<String, Vec<Declaration>>,
    methods_by_owner: HashMap<String, Vec<Declaration>>,
}

impl Tables {
    fn rebuild(&mut self) {
        self.classes_by_name.clear();
        self.interfaces_by_name.clear();
        self.class_likes_by_fqn.clear();
        self.methods_by_owner.clear();

        let mut uris: Vec<&String> = self.files.keys().collect();
        uris.sort();

        for uri in uris {
            for decl in &self.files[uri] {
                match decl.kind {
                    DeclarationKind::Method => {
                        if let Some(owner) = &decl.owner {
                            self.methods_by_owner
                                .entry(fqn_key(owner))
                                .or_default()
                                .push(decl.clone());
                        }
                        continue;
                    }
                    DeclarationKind::Class => {
                        self.classes_by_name
                            .entry(decl.name.to_ascii_lowercase())
                            .or_default()
                            .push(decl.clone());
                    }
                    DeclarationKind::Interface => {
                        self.interfaces_by_name
                            .entry(decl.name.to_ascii_lowercase())
                            .or_default()
                            .push(decl.clone());
                    }
                    DeclarationKind::Trait | DeclarationKind::Enum => {}
                }
                self.class_likes_by_fqn
                    .entry(fqn_key(&decl.fqn))
                    .or_default()
                    .push(decl.clone());
            }
        }
    }
}

/// In-memory index over every parsed file of a project.
///
/// Safe to share between threads: lookups take a read lock, updates take
/// the write lock and rebuild the derived tables before releasing it.
#[derive(Default)]
pub struct ProjectIndex {
    tables: RwLock<Tables>,
}

impl ProjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the declarations of one file.
    pub fn update_file(&self, uri: &str, declarations: Vec<Declaration>) {
        let mut tables = self.tables.write();
        tables.files.insert(uri.to_string(), declarations);
        tables.rebuild();
    }

    /// Insert or replace many files with a single rebuild.
    pub fn extend<I>(&self, files: I)
    where
        I: IntoIterator<Item = (String, Vec<Declaration>)>,
    {
        let mut tables = self.tables.write();
        for (uri, declarations) in files {
            tables.files.insert(uri, declarations);
        }
        tables.rebuild();
    }

    /// Forget a file.  Returns whether it was indexed.
    pub fn remove_file(&self, uri: &str) -> bool {
        let mut tables = self.tables.write();
        let removed = tables.files.remove(uri).is_some();
        if removed {
            tables.rebuild();
        }
        removed
    }

    pub fn file_count(&self) -> usize {
        self.tables.read().files.len()
    }

    /// Whether `uri` has been indexed.
    pub fn contains_file(&self, uri: &str) -> bool {
        self.tables.read().files.contains_key(uri)
    }

    /// Every declaration of the given class-like kind, sorted by short
    /// name, then FQN.
    pub fn class_likes_of_kind(&self, kind: DeclarationKind) -> Vec<Declaration> {
        let tables = self.tables.read();
        let source = match kind {
            DeclarationKind::Class => &tables.classes_by_name,
            DeclarationKind::Interface => &tables.interfaces_by_name,
            _ => return Vec::new(),
        };
        let mut out: Vec<Declaration> = source.values().flatten().cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.fqn.cmp(&b.fqn)));
        out
    }

    fn qualified_of_kind(&self, name: &str, kind: DeclarationKind) -> Vec<Declaration> {
        self.declarations_by_fqn(name)
            .into_iter()
            .filter(|d| d.kind == kind)
            .collect()
    }

    /// Methods declared directly in the class-like `owner_fqn`.
    pub fn methods_of(&self, owner_fqn: &str) -> Vec<Declaration> {
        self.tables
            .read()
            .methods_by_owner
            .get(&fqn_key(owner_fqn))
            .cloned()
            .unwrap_or_default()
    }

    /// The method `name` declared directly in `owner_fqn`.
    pub fn find_method(&self, owner_fqn: &str, name: &str) -> Option<Declaration> {
        self.methods_of(owner_fqn)
            .into_iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

impl SymbolIndex for ProjectIndex {
    fn class_by_name(&self, name: &str) -> Option<Declaration> {
        if name.contains('\\') {
            return self
                .qualified_of_kind(name, DeclarationKind::Class)
                .into_iter()
                .next();
        }
        self.tables
            .read()
            .classes_by_name
            .get(&name.to_ascii_lowercase())
            .and_then(|v| v.first().cloned())
    }

    fn interfaces_by_name(&self, name: &str) -> Vec<Declaration> {
        if name.contains('\\') {
            return self.qualified_of_kind(name, DeclarationKind::Interface);
        }
        self.tables
            .read()
            .interfaces_by_name
            .get(&name.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    fn declarations_by_fqn(&self, fqn: &str) -> Vec<Declaration> {
        self.tables
            .read()
            .class_likes_by_fqn
            .get(&fqn_key(fqn))
            .cloned()
            .unwrap_or_default()
    }

    fn declarations_by_signature(&self, signature: &str) -> Vec<Declaration> {
        if let Some(rest) = signature.strip_prefix("#M#C") {
            let Some((owner, method)) = rest.rsplit_once('.') else {
                return Vec::new();
            };
            return self
                .methods_of(owner)
                .into_iter()
                .filter(|m| m.name.eq_ignore_ascii_case(method))
                .collect();
        }
        if let Some(fqn) = signature.strip_prefix("#C") {
            return self.declarations_by_fqn(fqn);
        }
        Vec::new()
    }
}
