/// Class-like and method declaration extraction.
///
/// Each class-like declaration (`class`, `interface`, `trait`, `enum`) is
/// turned into a [`Declaration`] tagged with its [`DeclarationKind`],
/// followed by one `Method` declaration per method it declares directly.
/// Names are qualified with the namespace the declaration appears in.
use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::types::{Declaration, DeclarationKind, FileSymbols};
use crate::util::offset_to_position;

use super::use_statements;

/// Where the declarations being extracted live.
struct SourceCtx<'a> {
    uri: &'a str,
    content: &'a str,
}

impl SourceCtx<'_> {
    fn declaration(
        &self,
        kind: DeclarationKind,
        name: &str,
        fqn: String,
        owner: Option<String>,
        is_static: bool,
        name_offset: u32,
    ) -> Declaration {
        let pos = offset_to_position(self.content, name_offset);
        Declaration {
            kind,
            name: name.to_string(),
            fqn,
            owner,
            is_static,
            uri: self.uri.to_string(),
            line: pos.line,
            character: pos.character,
        }
    }
}

/// Walk a file's top-level statements and collect its symbols.
pub(super) fn extract_file_symbols<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    uri: &str,
    content: &str,
) -> FileSymbols {
    let ctx = SourceCtx { uri, content };
    let mut symbols = FileSymbols::default();
    walk_statements(statements, None, &ctx, &mut symbols);
    symbols
}

fn walk_statements<'a>(
    statements: impl Iterator<Item = &'a Statement<'a>>,
    namespace: Option<&str>,
    ctx: &SourceCtx<'_>,
    symbols: &mut FileSymbols,
) {
    for statement in statements {
        match statement {
            Statement::Namespace(ns) => {
                let ns_name = ns
                    .name
                    .as_ref()
                    .map(|ident| ident.value().to_string())
                    .filter(|name| !name.is_empty());
                if symbols.namespace.is_none() {
                    symbols.namespace = ns_name.clone();
                }
                walk_statements(ns.statements().iter(), ns_name.as_deref(), ctx, symbols);
            }
            Statement::Use(use_stmt) => {
                use_statements::extract_use_items(&use_stmt.items, &mut symbols.use_map);
            }
            Statement::Class(class) => {
                push_class_like(
                    DeclarationKind::Class,
                    &class.name,
                    class.members.iter(),
                    namespace,
                    ctx,
                    symbols,
                );
            }
            Statement::Interface(iface) => {
                push_class_like(
                    DeclarationKind::Interface,
                    &iface.name,
                    iface.members.iter(),
                    namespace,
                    ctx,
                    symbols,
                );
            }
            Statement::Trait(trait_def) => {
                push_class_like(
                    DeclarationKind::Trait,
                    &trait_def.name,
                    trait_def.members.iter(),
                    namespace,
                    ctx,
                    symbols,
                );
            }
            Statement::Enum(enum_def) => {
                push_class_like(
                    DeclarationKind::Enum,
                    &enum_def.name,
                    enum_def.members.iter(),
                    namespace,
                    ctx,
                    symbols,
                );
            }
            _ => {}
        }
    }
}

/// Push one class-like declaration followed by its methods.
fn push_class_like<'a>(
    kind: DeclarationKind,
    name: &LocalIdentifier<'a>,
    members: impl Iterator<Item = &'a ClassLikeMember<'a>>,
    namespace: Option<&str>,
    ctx: &SourceCtx<'_>,
    symbols: &mut FileSymbols,
) {
    let short = name.value;
    let fqn = use_statements::declared_fqn(short, namespace);

    symbols.declarations.push(ctx.declaration(
        kind,
        short,
        fqn.clone(),
        None,
        false,
        name.span().start.offset,
    ));

    for member in members {
        if let ClassLikeMember::Method(method) = member {
            let method_name = method.name.value;
            let is_static = method.modifiers.iter().any(|m| m.is_static());
            symbols.declarations.push(ctx.declaration(
                DeclarationKind::Method,
                method_name,
                format!("{}::{}", fqn, method_name),
                Some(fqn.clone()),
                is_static,
                method.name.span().start.offset,
            ));
        }
    }
}
