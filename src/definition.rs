/// Go-to-definition through virtual types.
///
/// Two positions are understood:
///
/// - inside the string literal of a mock-construction call
///   (`Phake::mock('Us|er')`): jump to the mocked class or interface;
/// - on a method name called on a virtual-typed receiver
///   (`$mock->sa|ve()`, `Phake::verify($mock)->sa|ve()`): jump to that
///   method in every class-like the receiver decodes to.
use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::codec::{Tag, VirtualType};
use crate::types::{Declaration, FileAnalysis};
use crate::util::position_to_offset;

/// LSP location of a declaration's name.
pub(crate) fn declaration_location(decl: &Declaration) -> Option<Location> {
    let uri = Url::parse(&decl.uri).ok()?;
    let start = Position {
        line: decl.line,
        character: decl.character,
    };
    let end = Position {
        line: decl.line,
        character: decl.character + decl.name.chars().count() as u32,
    };
    Some(Location {
        uri,
        range: Range { start, end },
    })
}

impl Backend {
    pub(crate) fn resolve_definition(
        &self,
        uri: &str,
        content: &str,
        position: Position,
    ) -> Option<Vec<Location>> {
        let analysis = self.analysis_for(uri)?;
        let offset = position_to_offset(content, position);

        let targets = self
            .mock_literal_targets(&analysis, offset)
            .or_else(|| self.member_call_targets(&analysis, offset))?;

        let locations: Vec<Location> = targets.iter().filter_map(declaration_location).collect();
        if locations.is_empty() {
            return None;
        }
        Some(locations)
    }

    /// Class-likes named by the mock literal under the cursor.
    fn mock_literal_targets(
        &self,
        analysis: &FileAnalysis,
        offset: u32,
    ) -> Option<Vec<Declaration>> {
        let call = analysis.calls.iter().find(|c| {
            c.literal_span.is_some_and(|span| span.contains(offset))
                && c.key.as_deref().and_then(Tag::from_key) == Some(Tag::Mock)
        })?;
        let key = call.key.as_deref()?;

        // Only the mocked names, not the mock builder itself.
        let Some(VirtualType::Mock { class_name, .. }) = VirtualType::parse(key) else {
            return None;
        };
        let resolved = self.decode_key(key)?;
        let targets: Vec<Declaration> = resolved
            .class_likes()
            .filter(|d| {
                class_name.split('|').any(|n| {
                    d.name.eq_ignore_ascii_case(n)
                        || d.fqn.eq_ignore_ascii_case(n.trim_start_matches('\\'))
                })
            })
            .cloned()
            .collect();
        if targets.is_empty() {
            tracing::debug!("mock literal {} names nothing in the index", class_name);
            return None;
        }
        Some(targets)
    }

    /// The called method, looked up in each class-like the receiver
    /// decodes to.
    fn member_call_targets(
        &self,
        analysis: &FileAnalysis,
        offset: u32,
    ) -> Option<Vec<Declaration>> {
        let call = analysis.call_at_name(offset)?;
        if call.receiver_types.is_empty() {
            return None;
        }
        let targets: Vec<Declaration> = self
            .decode_types(&call.receiver_types)
            .iter()
            .filter(|d| d.kind.is_class_like())
            .filter_map(|owner| self.index.find_method(&owner.fqn, &call.method))
            .collect();
        if targets.is_empty() {
            return None;
        }
        Some(targets)
    }
}
