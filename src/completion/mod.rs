/// Completion-related modules.
///
/// - **class_names**: class and interface names inside the string literal
///   passed to a mock-construction call (`Phake::mock('Us|')`)
/// - **members**: methods after `->` on an expression whose type is a
///   virtual key (`$mock->`, `Phake::when($mock)->`, ...)
///
/// Both work from the raw text before the cursor, since the document is
/// usually half-typed when completion is requested.
mod class_names;
mod members;

use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::util::position_to_offset;

impl Backend {
    pub(crate) fn completion_items(
        &self,
        uri: &str,
        content: &str,
        position: Position,
    ) -> Option<Vec<CompletionItem>> {
        let offset = position_to_offset(content, position) as usize;
        let before = content.get(..offset)?;

        if let Some(items) = self.mock_class_name_completions(uri, content, before) {
            return Some(items);
        }
        self.member_completions(uri, content, before)
    }
}

/// Bytes that can appear in a PHP identifier (ASCII subset).
fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Index of the first byte of the identifier run that ends at `end`.
fn ident_start(bytes: &[u8], end: usize, allow_backslash: bool) -> usize {
    let mut i = end;
    while i > 0 && (is_ident_byte(bytes[i - 1]) || (allow_backslash && bytes[i - 1] == b'\\')) {
        i -= 1;
    }
    i
}

/// Index just past the last non-whitespace byte before `end`.
fn skip_whitespace_back(bytes: &[u8], end: usize) -> usize {
    let mut i = end;
    while i > 0 && bytes[i - 1].is_ascii_whitespace() {
        i -= 1;
    }
    i
}
