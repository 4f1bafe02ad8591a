/// Utility functions for the phake_lsp server.
///
/// Position/offset conversion, name helpers, and client logging.
use tower_lsp::lsp_types::*;

use crate::Backend;

/// Convert an LSP Position (line, character) to a byte offset in content.
///
/// Characters are counted as Unicode scalar values, which matches UTF-16
/// code units for everything outside the astral planes.
pub fn position_to_offset(content: &str, position: Position) -> u32 {
    let mut offset: u32 = 0;
    for (i, line) in content.split('\n').enumerate() {
        if i == position.line as usize {
            let byte_col = line
                .char_indices()
                .nth(position.character as usize)
                .map(|(idx, _)| idx)
                .unwrap_or(line.len());
            return offset + byte_col as u32;
        }
        // +1 for the newline character
        offset += line.len() as u32 + 1;
    }
    content.len() as u32
}

/// Convert a byte offset in content to an LSP Position.
///
/// Offsets past the end clamp to the end of the content; offsets inside a
/// multi-byte character count that character as already passed.
pub fn offset_to_position(content: &str, offset: u32) -> Position {
    let offset = (offset as usize).min(content.len());
    let mut line = 0u32;
    let mut line_start = 0usize;
    for (idx, byte) in content.as_bytes()[..offset].iter().enumerate() {
        if *byte == b'\n' {
            line += 1;
            line_start = idx + 1;
        }
    }
    let character = content[line_start..]
        .char_indices()
        .take_while(|(idx, _)| line_start + idx < offset)
        .count() as u32;
    Position { line, character }
}

/// The last segment of a namespace-qualified name.
///
/// `"App\Models\User"` → `"User"`, `"\Foo"` → `"Foo"`, `"Foo"` → `"Foo"`.
pub fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

impl Backend {
    pub(crate) async fn log(&self, typ: MessageType, message: String) {
        if let Some(client) = &self.client {
            client.log_message(typ, message).await;
        }
    }
}
