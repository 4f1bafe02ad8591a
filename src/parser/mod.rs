/// PHP parsing and AST extraction.
///
/// This module parses PHP source text with the mago_syntax parser and
/// extracts everything the index and the call-site analysis need: class,
/// interface, trait, and enum declarations with their methods, `use`
/// statement mappings, and namespace declarations.
///
/// Sub-modules:
/// - [`classes`]: Class-like and method declaration extraction
/// - [`use_statements`]: `use` statement, namespace, and name qualification
/// - [`ast_update`]: The `update_ast` orchestrator on the backend
mod ast_update;
mod classes;
mod use_statements;

use std::panic;

use bumpalo::Bump;
use mago_syntax::ast::*;
use mago_syntax::parser::parse_file_content;

use crate::analysis::Analyzer;
use crate::types::{FileAnalysis, FileSymbols};

pub use use_statements::qualify_name;

/// The result of one full parse of a document.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub symbols: FileSymbols,
    pub analysis: FileAnalysis,
}

/// Names that can appear in a type hint but never denote a class.
const NON_CLASS_HINTS: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null",
    "object", "string", "true", "void",
];

/// Extract a string representation of a type hint from the AST.
pub(crate) fn extract_hint_string(hint: &Hint) -> String {
    match hint {
        Hint::Identifier(ident) => ident.value().to_string(),
        Hint::Nullable(nullable) => {
            format!("?{}", extract_hint_string(nullable.hint))
        }
        Hint::Union(union) => {
            let left = extract_hint_string(union.left);
            let right = extract_hint_string(union.right);
            format!("{}|{}", left, right)
        }
        Hint::Intersection(intersection) => {
            let left = extract_hint_string(intersection.left);
            let right = extract_hint_string(intersection.right);
            format!("{}&{}", left, right)
        }
        Hint::Void(ident)
        | Hint::Never(ident)
        | Hint::Float(ident)
        | Hint::Bool(ident)
        | Hint::Integer(ident)
        | Hint::String(ident)
        | Hint::Object(ident)
        | Hint::Mixed(ident)
        | Hint::Iterable(ident) => ident.value.to_string(),
        Hint::Null(keyword)
        | Hint::True(keyword)
        | Hint::False(keyword)
        | Hint::Array(keyword)
        | Hint::Callable(keyword)
        | Hint::Static(keyword)
        | Hint::Self_(keyword)
        | Hint::Parent(keyword) => keyword.value.to_string(),
        Hint::Parenthesized(paren) => {
            format!("({})", extract_hint_string(paren.hint))
        }
    }
}

/// Split a hint string such as `?Foo|(Bar&Baz)|int` into the names that
/// may denote class-likes, in order: `["Foo", "Bar", "Baz"]`.
///
/// `self`, `static`, and `parent` are kept; the caller knows the
/// enclosing class.
pub(crate) fn hint_class_names(hint: &str) -> Vec<&str> {
    hint.split(['|', '&'])
        .map(|part| part.trim_matches(|c| c == '?' || c == '(' || c == ')' || c == ' '))
        .filter(|part| !part.is_empty())
        .filter(|part| {
            !NON_CLASS_HINTS
                .iter()
                .any(|scalar| scalar.eq_ignore_ascii_case(part))
        })
        .collect()
}

/// Parse PHP source text and extract declarations, imports, and the
/// namespace.
///
/// The mago-syntax parser can panic on some malformed input (e.g.
/// half-typed heredocs).  A panic is caught, logged, and reported as an
/// empty [`FileSymbols`].
pub fn parse_symbols(uri: &str, content: &str) -> FileSymbols {
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        let arena = Bump::new();
        let file_id = mago_database::file::FileId::new("input.php");
        let program = parse_file_content(&arena, file_id, content);
        classes::extract_file_symbols(program.statements.iter(), uri, content)
    }));

    match result {
        Ok(symbols) => symbols,
        Err(_) => {
            tracing::error!("parser panicked while extracting symbols from {}", uri);
            FileSymbols::default()
        }
    }
}

/// Parse PHP source text once and produce both its symbols and the
/// call-site analysis.  Returns `None` if the parser panicked.
pub fn parse_document(uri: &str, content: &str) -> Option<ParsedDocument> {
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        let arena = Bump::new();
        let file_id = mago_database::file::FileId::new("input.php");
        let program = parse_file_content(&arena, file_id, content);

        let symbols = classes::extract_file_symbols(program.statements.iter(), uri, content);
        let analysis = Analyzer::new(&symbols.use_map).analyze(program.statements.iter());
        ParsedDocument { symbols, analysis }
    }));

    match result {
        Ok(doc) => Some(doc),
        Err(_) => {
            tracing::error!("parser panicked while analysing {}; skipping file", uri);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::hint_class_names;

    #[test]
    fn hint_names_skip_scalars() {
        assert_eq!(hint_class_names("?Foo"), vec!["Foo"]);
        assert_eq!(hint_class_names("int|string|null"), Vec::<&str>::new());
        assert_eq!(
            hint_class_names("(A&B)|\\C\\D|Array"),
            vec!["A", "B", "\\C\\D"]
        );
        assert_eq!(hint_class_names("self"), vec!["self"]);
    }
}
