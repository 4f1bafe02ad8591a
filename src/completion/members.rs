/// Member completion on virtual-typed receivers.
///
/// After `->` (or `?->`), find the receiver's candidate types in the
/// document analysis, decode any keys among them, and offer the methods
/// of every class-like they resolve to.  The receiver is located first
/// by the typed expression that ends right before the operator; when the
/// half-typed line did not parse into one and the receiver is a plain
/// variable, the latest typed occurrence of that variable is used.
use std::collections::HashSet;

use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::types::{Declaration, FileAnalysis};

use super::{ident_start, skip_whitespace_back};

/// Byte offset where the receiver expression of a `->` access ends, if
/// the text before the cursor is `<receiver> -> <partial>`.
fn arrow_receiver_end(before: &str) -> Option<usize> {
    let bytes = before.as_bytes();
    let partial_start = ident_start(bytes, bytes.len(), false);
    let op_end = skip_whitespace_back(bytes, partial_start);
    if op_end < 2 || &bytes[op_end - 2..op_end] != b"->" {
        return None;
    }
    let mut receiver_end = op_end - 2;
    if receiver_end > 0 && bytes[receiver_end - 1] == b'?' {
        receiver_end -= 1;
    }
    Some(skip_whitespace_back(bytes, receiver_end))
}

/// The `$name` that ends at `end`, if any.
fn variable_before(before: &str, end: usize) -> Option<&str> {
    let bytes = before.as_bytes();
    let start = ident_start(bytes, end, false);
    if start == end || start == 0 || bytes[start - 1] != b'$' {
        return None;
    }
    Some(&before[start - 1..end])
}

fn receiver_types(
    analysis: &FileAnalysis,
    content: &str,
    before: &str,
    receiver_end: usize,
) -> Vec<String> {
    if let Some(typed) = analysis.typed_ending_at(receiver_end as u32) {
        return typed.types.clone();
    }
    let Some(var) = variable_before(before, receiver_end) else {
        return Vec::new();
    };
    analysis
        .typed
        .iter()
        .filter(|t| (t.span.end as usize) <= receiver_end)
        .filter(|t| content.get(t.span.start as usize..t.span.end as usize) == Some(var))
        .max_by_key(|t| t.span.start)
        .map(|t| t.types.clone())
        .unwrap_or_default()
}

impl Backend {
    pub(super) fn member_completions(
        &self,
        uri: &str,
        content: &str,
        before: &str,
    ) -> Option<Vec<CompletionItem>> {
        let receiver_end = arrow_receiver_end(before)?;
        let analysis = self.analysis_for(uri)?;

        let types = receiver_types(&analysis, content, before, receiver_end);
        let resolved = self.decode_types(&types);
        if resolved.is_empty() {
            return None;
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut items = Vec::new();
        for owner in resolved.iter().filter(|d| d.kind.is_class_like()) {
            for method in self.index.methods_of(&owner.fqn) {
                if seen.insert(method.name.to_ascii_lowercase()) {
                    items.push(method_item(&method, &owner.name));
                }
            }
        }
        if items.is_empty() {
            return None;
        }
        Some(items)
    }
}

fn method_item(method: &Declaration, owner_short: &str) -> CompletionItem {
    let detail = if method.is_static {
        format!("static {}::{}()", owner_short, method.name)
    } else {
        format!("{}::{}()", owner_short, method.name)
    };
    CompletionItem {
        label: method.name.clone(),
        kind: Some(CompletionItemKind::METHOD),
        detail: Some(detail),
        insert_text: Some(method.name.clone()),
        filter_text: Some(method.name.clone()),
        ..CompletionItem::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_receiver_end() {
        assert_eq!(arrow_receiver_end("$mock->"), Some(5));
        assert_eq!(arrow_receiver_end("$mock->sa"), Some(5));
        assert_eq!(arrow_receiver_end("$mock?->"), Some(5));
        assert_eq!(arrow_receiver_end("Phake::when($m) -> "), Some(15));
        assert_eq!(arrow_receiver_end("$mock"), None);
        assert_eq!(arrow_receiver_end("Foo::"), None);
    }

    #[test]
    fn finds_variable_before() {
        assert_eq!(variable_before("x = $mock", 9), Some("$mock"));
        assert_eq!(variable_before("foo()", 5), None);
        assert_eq!(variable_before("Foo", 3), None);
    }
}
