//! Data types used throughout the phake_lsp server.
//!
//! This module contains the "model" structs that describe what was
//! extracted from PHP source (declarations, per-file summaries) and what
//! the call-site analysis produced (analysed calls, typed expressions).
//! All data is owned so nothing depends on the parser's arena lifetime.
use std::collections::HashMap;

use serde::Serialize;

/// What kind of PHP symbol a [`Declaration`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Interface,
    Trait,
    Enum,
    Method,
}

impl DeclarationKind {
    /// Whether this is a class-like declaration (anything but a method).
    pub fn is_class_like(self) -> bool {
        !matches!(self, DeclarationKind::Method)
    }

    /// Lowercase keyword used in hover text and CLI output.
    pub fn keyword(self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Interface => "interface",
            DeclarationKind::Trait => "trait",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Method => "function",
        }
    }
}

/// A named declaration found in the project: a class-like or a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    /// The short name as written (e.g. `"User"`, `"save"`).
    pub name: String,
    /// Fully-qualified name without the leading `\`.
    ///
    /// For class-likes this is e.g. `"App\Models\User"`; for methods it is
    /// the owner FQN joined with `::` (e.g. `"App\Models\User::save"`).
    pub fqn: String,
    /// FQN of the owning class-like, for methods.
    pub owner: Option<String>,
    /// Whether a method is declared `static`.  Always `false` for
    /// class-likes.
    pub is_static: bool,
    /// URI of the file the declaration lives in.
    pub uri: String,
    /// Zero-based line of the declaration's name.
    pub line: u32,
    /// Zero-based character column of the declaration's name.
    pub character: u32,
}

/// Everything the declaration pass extracts from one PHP file.
#[derive(Debug, Clone, Default)]
pub struct FileSymbols {
    /// The file's namespace, if it declares one.
    pub namespace: Option<String>,
    /// `use` imports: short (or alias) name to FQN without leading `\`.
    pub use_map: HashMap<String, String>,
    /// Class-likes first, each followed by its methods.
    pub declarations: Vec<Declaration>,
}

/// A byte range in a source file, `start` inclusive and `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteSpan {
    pub start: u32,
    pub end: u32,
}

impl ByteSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Whether `offset` lies inside the span.  The end is included so a
    /// cursor placed right after the last character still counts.
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset <= self.end
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One call expression seen by the analysis pass.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedCall {
    /// The whole call expression.
    pub span: ByteSpan,
    /// The method (or function) name token.
    pub name_span: ByteSpan,
    /// The method name as written.
    pub method: String,
    /// Call-signature token built for this call.
    pub signature: String,
    /// The first argument's string-literal span (quotes excluded), when
    /// the first argument is a string literal.
    pub literal_span: Option<ByteSpan>,
    /// Candidate types of the receiver, for member calls.
    pub receiver_types: Vec<String>,
    /// The encoded type key, when the call matched a recognised kind.
    pub key: Option<String>,
}

/// An expression for which the analysis pass inferred candidate types.
#[derive(Debug, Clone, Serialize)]
pub struct TypedExpression {
    pub span: ByteSpan,
    pub types: Vec<String>,
}

/// Result of analysing one PHP file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileAnalysis {
    pub calls: Vec<AnalyzedCall>,
    pub typed: Vec<TypedExpression>,
}

impl FileAnalysis {
    /// Calls that produced a key, in source order.
    pub fn virtual_calls(&self) -> impl Iterator<Item = &AnalyzedCall> {
        self.calls.iter().filter(|c| c.key.is_some())
    }

    /// The call whose method-name token contains `offset`.
    pub fn call_at_name(&self, offset: u32) -> Option<&AnalyzedCall> {
        self.calls.iter().find(|c| c.name_span.contains(offset))
    }

    /// The innermost typed expression that ends exactly at `end`.
    ///
    /// Used for `->` completion, where the receiver expression is the one
    /// immediately to the left of the operator.
    pub fn typed_ending_at(&self, end: u32) -> Option<&TypedExpression> {
        self.typed
            .iter()
            .filter(|t| t.span.end == end)
            .min_by_key(|t| t.span.len())
    }

    /// The innermost typed expression containing `offset`.
    pub fn typed_at(&self, offset: u32) -> Option<&TypedExpression> {
        self.typed
            .iter()
            .filter(|t| t.span.contains(offset))
            .min_by_key(|t| t.span.len())
    }
}
