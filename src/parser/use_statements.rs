/// `use` statement extraction and name qualification.
///
/// Builds the mapping of short (imported) names to fully-qualified names
/// and turns names as written in source into `\`-prefixed FQNs, the form
/// the call-signature tokens and the FQN index lookup expect.
use std::collections::HashMap;

use mago_syntax::ast::*;

use crate::util::short_name;

/// Extract individual use items from a `UseItems` node.
///
/// Function and constant imports are skipped; only class-like imports
/// matter for type names.
pub(super) fn extract_use_items(items: &UseItems, use_map: &mut HashMap<String, String>) {
    match items {
        UseItems::Sequence(seq) => {
            for item in seq.items.iter() {
                register_use_item(item, None, use_map);
            }
        }
        UseItems::TypedSequence(seq) => {
            if seq.r#type.is_function() || seq.r#type.is_const() {
                return;
            }
            for item in seq.items.iter() {
                register_use_item(item, None, use_map);
            }
        }
        UseItems::TypedList(list) => {
            if list.r#type.is_function() || list.r#type.is_const() {
                return;
            }
            let prefix = list.namespace.value();
            for item in list.items.iter() {
                register_use_item(item, Some(prefix), use_map);
            }
        }
        UseItems::MixedList(list) => {
            let prefix = list.namespace.value();
            for maybe_typed in list.items.iter() {
                if let Some(ref t) = maybe_typed.r#type
                    && (t.is_function() || t.is_const())
                {
                    continue;
                }
                register_use_item(&maybe_typed.item, Some(prefix), use_map);
            }
        }
    }
}

/// Register a single `UseItem`.  With a group prefix (`use Foo\{Bar}`)
/// the item name is relative to it.
fn register_use_item(
    item: &UseItem,
    group_prefix: Option<&str>,
    use_map: &mut HashMap<String, String>,
) {
    let item_name = item.name.value();
    let item_name = item_name.strip_prefix('\\').unwrap_or(item_name);

    let fqn = match group_prefix {
        Some(prefix) => format!("{}\\{}", prefix.trim_matches('\\'), item_name),
        None => item_name.to_string(),
    };

    let alias_name = match item.alias {
        Some(ref alias) => alias.identifier.value.to_string(),
        None => short_name(&fqn).to_string(),
    };

    use_map.insert(alias_name, fqn);
}

/// FQN (no leading `\`) of a class-like declared as `short` inside
/// `namespace`.
pub(super) fn declared_fqn(short: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) => format!("{}\\{}", ns, short),
        None => short.to_string(),
    }
}

/// Qualify a class name as written in source, following PHP's rules:
///
/// 1. `\Foo\Bar` is already fully qualified.
/// 2. The first segment is looked up in the import table (`use`).
/// 3. Otherwise the current namespace is prepended.
///
/// The result always carries a leading `\`.
pub fn qualify_name(
    name: &str,
    use_map: &HashMap<String, String>,
    namespace: Option<&str>,
) -> String {
    if name.starts_with('\\') {
        return name.to_string();
    }

    let (first, rest) = match name.find('\\') {
        Some(pos) => (&name[..pos], &name[pos..]),
        None => (name, ""),
    };
    let imported = use_map.get(first).or_else(|| {
        use_map
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(first))
            .map(|(_, fqn)| fqn)
    });
    if let Some(fqn) = imported {
        return format!("\\{}{}", fqn, rest);
    }

    match namespace {
        Some(ns) => format!("\\{}\\{}", ns, name),
        None => format!("\\{}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imports() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("Phake".to_string(), "Phake".to_string());
        map.insert("User".to_string(), "App\\Models\\User".to_string());
        map.insert("Repo".to_string(), "App\\Repositories".to_string());
        map
    }

    #[test]
    fn qualify_keeps_fully_qualified() {
        assert_eq!(qualify_name("\\Foo", &imports(), Some("App")), "\\Foo");
    }

    #[test]
    fn qualify_uses_imports() {
        let map = imports();
        assert_eq!(qualify_name("Phake", &map, Some("App\\Tests")), "\\Phake");
        assert_eq!(qualify_name("User", &map, None), "\\App\\Models\\User");
        assert_eq!(
            qualify_name("Repo\\UserRepo", &map, None),
            "\\App\\Repositories\\UserRepo"
        );
    }

    #[test]
    fn qualify_falls_back_to_namespace() {
        let map = imports();
        assert_eq!(qualify_name("Order", &map, Some("Shop")), "\\Shop\\Order");
        assert_eq!(qualify_name("Order", &map, None), "\\Order");
    }

    #[test]
    fn declared_fqn_joins_namespace() {
        assert_eq!(declared_fqn("User", Some("App\\Models")), "App\\Models\\User");
        assert_eq!(declared_fqn("User", None), "User");
    }
}
