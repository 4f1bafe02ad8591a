/// Mock class-name completion.
///
/// Inside the first string argument of a mock-construction call, offer
/// every indexed class and interface, inserted as its fully-qualified name
/// so the string names the class at runtime.  The call is recognised from the
/// text before the cursor (`Name::method(` followed by an opening quote)
/// and classified with the same signature allow-list the encoder uses, so
/// `Phake::mock(`, `Phake::partialMock(` and an aliased import of `Phake`
/// all qualify.
use std::collections::{HashMap, HashSet};

use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::codec::CallKind;
use crate::codec::encoder::MEMBER_CALL_MARKER;
use crate::parser::qualify_name;
use crate::types::{Declaration, DeclarationKind};
use crate::util::offset_to_position;

use super::{ident_start, skip_whitespace_back};

/// A mock-construction call whose string argument holds the cursor.
#[derive(Debug, PartialEq, Eq)]
struct MockLiteral<'a> {
    /// Class as written before `::`.
    class: &'a str,
    method: &'a str,
    /// Byte offset just after the opening quote.
    literal_start: usize,
    /// What has been typed inside the quotes so far.
    prefix: &'a str,
}

/// Recognise `Class::method('prefix` ending at the cursor.
fn mock_literal(before: &str) -> Option<MockLiteral<'_>> {
    let bytes = before.as_bytes();

    let prefix_start = ident_start(bytes, bytes.len(), true);
    let quote = prefix_start.checked_sub(1)?;
    if bytes[quote] != b'\'' && bytes[quote] != b'"' {
        return None;
    }

    let paren_end = skip_whitespace_back(bytes, quote);
    if paren_end == 0 || bytes[paren_end - 1] != b'(' {
        return None;
    }
    let method_end = skip_whitespace_back(bytes, paren_end - 1);
    let method_start = ident_start(bytes, method_end, false);
    if method_start == method_end || method_start < 2 {
        return None;
    }
    if &bytes[method_start - 2..method_start] != b"::" {
        return None;
    }
    let class_end = method_start - 2;
    let class_start = ident_start(bytes, class_end, true);
    if class_start == class_end {
        return None;
    }

    Some(MockLiteral {
        class: &before[class_start..class_end],
        method: &before[method_start..method_end],
        literal_start: prefix_start,
        prefix: &before[prefix_start..],
    })
}

impl Backend {
    pub(super) fn mock_class_name_completions(
        &self,
        uri: &str,
        content: &str,
        before: &str,
    ) -> Option<Vec<CompletionItem>> {
        let literal = mock_literal(before)?;

        let (use_map, namespace) = match self.document(uri) {
            Some(doc) => (doc.symbols.use_map, doc.symbols.namespace),
            None => (HashMap::new(), None),
        };
        let class = qualify_name(literal.class, &use_map, namespace.as_deref());
        let signature = format!("{}C{}.{}", MEMBER_CALL_MARKER, class, literal.method);
        if CallKind::of_signature(&signature) != Some(CallKind::MockConstruction) {
            return None;
        }

        let range = Range {
            start: offset_to_position(content, literal.literal_start as u32),
            end: offset_to_position(content, before.len() as u32),
        };
        Some(self.class_name_items(literal.prefix, range))
    }

    fn class_name_items(&self, prefix: &str, range: Range) -> Vec<CompletionItem> {
        let qualified = prefix.contains('\\');
        let rooted = prefix.starts_with('\\');
        let needle = prefix.trim_start_matches('\\').to_ascii_lowercase();

        let classes = self.index.class_likes_of_kind(DeclarationKind::Class);
        let interfaces = self.index.class_likes_of_kind(DeclarationKind::Interface);

        let mut seen: HashSet<&str> = HashSet::new();
        let mut items = Vec::new();
        for decl in classes.iter().chain(interfaces.iter()) {
            let haystack = if qualified { &decl.fqn } else { &decl.name };
            if !haystack.to_ascii_lowercase().contains(&needle) {
                continue;
            }
            if !seen.insert(decl.fqn.as_str()) {
                continue;
            }
            let new_text = if rooted {
                format!("\\{}", decl.fqn)
            } else {
                decl.fqn.clone()
            };
            let filter_text = if qualified {
                new_text.clone()
            } else {
                decl.name.clone()
            };
            items.push(class_name_item(decl, new_text, filter_text, range));
        }
        items
    }
}

fn class_name_item(
    decl: &Declaration,
    new_text: String,
    filter_text: String,
    range: Range,
) -> CompletionItem {
    let (kind, rank) = match decl.kind {
        DeclarationKind::Interface => (CompletionItemKind::INTERFACE, 1),
        _ => (CompletionItemKind::CLASS, 0),
    };
    CompletionItem {
        label: decl.name.clone(),
        kind: Some(kind),
        detail: Some(decl.fqn.clone()),
        filter_text: Some(filter_text),
        sort_text: Some(format!("{}_{}", rank, decl.name.to_ascii_lowercase())),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit { range, new_text })),
        ..CompletionItem::default()
    }
}
