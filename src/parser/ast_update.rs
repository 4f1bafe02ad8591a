/// Document update orchestration.
///
/// `update_ast` performs one full parse of a document and updates both
/// the project index (the file's declarations) and the stored analysis
/// (its calls and typed expressions) in a single pass.
use crate::Backend;

use super::parse_document;

impl Backend {
    /// Re-parse an open document and refresh everything derived from it.
    ///
    /// The mago-syntax parser can panic on half-typed input.  When it does
    /// the file is skipped: the index keeps its previous declarations and
    /// the stale analysis stays in place until the file parses again.
    pub fn update_ast(&self, uri: &str, content: &str) {
        let Some(doc) = parse_document(uri, content) else {
            return;
        };

        tracing::debug!(
            uri,
            declarations = doc.symbols.declarations.len(),
            calls = doc.analysis.calls.len(),
            "document parsed"
        );

        self.index.update_file(uri, doc.symbols.declarations.clone());
        if let Ok(mut docs) = self.documents.lock() {
            docs.insert(uri.to_string(), doc);
        }
    }

    /// Drop the stored analysis of a closed document.  Its declarations
    /// stay in the index so other files can still resolve against them.
    pub(crate) fn forget_document(&self, uri: &str) {
        if let Ok(mut docs) = self.documents.lock() {
            docs.remove(uri);
        }
    }
}
