/// Hover on virtual-typed calls and expressions.
///
/// Shows what kind of key the expression carries and the declarations it
/// decodes to, e.g.
///
/// ```text
/// Phake mock: `<01>#M#C\Phake.mock~User`
///
/// - class `App\Models\User`
/// ```
use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::codec::{Tag, key::is_key};
use crate::types::{ByteSpan, Declaration, FileAnalysis};
use crate::util::{offset_to_position, position_to_offset};

/// The key under `offset` and the span it belongs to.  Call names and
/// mock literals win over the surrounding typed expressions.
fn key_at(analysis: &FileAnalysis, offset: u32) -> Option<(String, ByteSpan)> {
    let on_call = analysis.calls.iter().find(|c| {
        c.key.is_some()
            && (c.name_span.contains(offset)
                || c.literal_span.is_some_and(|span| span.contains(offset)))
    });
    if let Some(call) = on_call {
        let span = match call.literal_span {
            Some(span) if span.contains(offset) => span,
            _ => call.name_span,
        };
        return call.key.clone().map(|key| (key, span));
    }

    let typed = analysis
        .typed
        .iter()
        .filter(|t| t.span.contains(offset) && t.types.iter().any(|ty| is_key(ty)))
        .min_by_key(|t| t.span.len())?;
    let key = typed.types.iter().find(|ty| is_key(ty))?;
    Some((key.clone(), typed.span))
}

pub(crate) fn hover_markdown(key: &str, resolved: &[Declaration]) -> String {
    let label = Tag::from_key(key).map(Tag::label).unwrap_or("virtual type");
    let mut text = format!("Phake {}: `{}`", label, key);
    if !resolved.is_empty() {
        text.push('\n');
        for decl in resolved {
            text.push_str(&format!("\n- {} `{}`", decl.kind.keyword(), decl.fqn));
        }
    }
    text
}

impl Backend {
    pub(crate) fn hover_at(&self, uri: &str, content: &str, position: Position) -> Option<Hover> {
        let analysis = self.analysis_for(uri)?;
        let offset = position_to_offset(content, position);
        let (key, span) = key_at(&analysis, offset)?;

        let resolved = self.decode_types(std::slice::from_ref(&key));
        Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: hover_markdown(&key, &resolved),
            }),
            range: Some(Range {
                start: offset_to_position(content, span.start),
                end: offset_to_position(content, span.end),
            }),
        })
    }
}
