/// Class-or-interface name resolution shared by every decode path.
use crate::index::SymbolIndex;
use crate::types::Declaration;

/// Resolve a class or interface name against the index.
///
/// * `\Fully\Qualified` names go through the FQN lookup and may yield
///   several declarations when the path is ambiguous.
/// * Any other name is looked up as a class first; a matching class is
///   returned alone even if an interface shares the name.  Interfaces
///   are only consulted when no class matches.  A qualified name without
///   the leading `\` (`App\Models\User`, as in a class string) matches by
///   path through the same two lookups.
pub fn resolve_name(name: &str, index: &dyn SymbolIndex) -> Vec<Declaration> {
    if name.starts_with('\\') {
        return index.declarations_by_fqn(name);
    }
    if let Some(class) = index.class_by_name(name) {
        return vec![class];
    }
    index.interfaces_by_name(name)
}
