/// Signature decoder: virtual type key to declarations.
use memchr::memmem;

use crate::index::SymbolIndex;
use crate::types::Declaration;

use super::key::{MOCK_TAG, UNION_SEPARATOR, VirtualType};
use super::resolve::resolve_name;

/// A non-empty, duplicate-free set of declarations produced by decoding.
///
/// Insertion order is kept so results are stable across calls against the
/// same index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDeclarationSet(Vec<Declaration>);

impl ResolvedDeclarationSet {
    /// Wrap `declarations`, dropping duplicates.  Returns `None` for an
    /// empty input so callers fall back to ordinary inference.
    pub fn from_vec(declarations: Vec<Declaration>) -> Option<Self> {
        let mut unique: Vec<Declaration> = Vec::with_capacity(declarations.len());
        for decl in declarations {
            if !unique.contains(&decl) {
                unique.push(decl);
            }
        }
        if unique.is_empty() {
            None
        } else {
            Some(Self(unique))
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Declaration> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Only the class-like declarations (drops methods surfaced by the
    /// mock-builder signature lookup).
    pub fn class_likes(&self) -> impl Iterator<Item = &Declaration> {
        self.0.iter().filter(|d| d.kind.is_class_like())
    }

    pub fn into_vec(self) -> Vec<Declaration> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ResolvedDeclarationSet {
    type Item = &'a Declaration;
    type IntoIter = std::slice::Iter<'a, Declaration>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Resolves keys against a read-only symbol index.
pub struct SignatureDecoder<'a> {
    index: &'a dyn SymbolIndex,
    answer_binder: &'a str,
}

impl<'a> SignatureDecoder<'a> {
    /// `answer_binder` is the class every stubbed-method chain resolves to.
    pub fn new(index: &'a dyn SymbolIndex, answer_binder: &'a str) -> Self {
        Self {
            index,
            answer_binder,
        }
    }

    /// Decode a textual key.  Short, untagged, or malformed keys and keys
    /// that resolve to nothing all yield `None`.
    pub fn decode(&self, key: &str) -> Option<ResolvedDeclarationSet> {
        let virtual_type = VirtualType::parse(key)?;
        self.decode_type(&virtual_type)
    }

    /// Decode an already-parsed key.
    pub fn decode_type(&self, virtual_type: &VirtualType) -> Option<ResolvedDeclarationSet> {
        let mut out = Vec::new();
        match virtual_type {
            VirtualType::Mock {
                signature,
                class_name,
            } => self.resolve_mock(signature, class_name, &mut out),
            VirtualType::Verify(members) | VirtualType::Stub(members) => {
                for member in members {
                    self.resolve_member(member, &mut out);
                }
            }
            VirtualType::StubbedMethod => {
                match self.index.class_by_name(self.answer_binder) {
                    Some(binder) => out.push(binder),
                    None => tracing::warn!(
                        "answer binder class {} is not in the index",
                        self.answer_binder
                    ),
                }
            }
        }
        tracing::trace!(key = %virtual_type, resolved = out.len(), "decoded");
        ResolvedDeclarationSet::from_vec(out)
    }

    /// MOCK: the mock-builder's own declarations plus the mocked name(s).
    fn resolve_mock(&self, signature: &str, class_name: &str, out: &mut Vec<Declaration>) {
        out.extend(self.index.declarations_by_signature(signature));
        for name in class_name.split(UNION_SEPARATOR).filter(|n| !n.is_empty()) {
            out.extend(resolve_name(name, self.index));
        }
    }

    /// One VERIFY / STUB union member.  A member carrying an embedded
    /// MOCK key is decoded from the tag onwards; anything else is a name.
    fn resolve_member(&self, member: &str, out: &mut Vec<Declaration>) {
        match memmem::find(member.as_bytes(), MOCK_TAG.as_bytes()) {
            Some(pos) => {
                if let Some(VirtualType::Mock {
                    signature,
                    class_name,
                }) = VirtualType::parse(&member[pos..])
                {
                    self.resolve_mock(&signature, &class_name, out);
                }
            }
            None => out.extend(resolve_name(member, self.index)),
        }
    }
}
