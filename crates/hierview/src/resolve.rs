//! Node identity resolution.
//!
//! Instance names are only unique among siblings, and the same
//! `instance_name`/`module_type` pair can show up in many branches of a
//! design. A node id is therefore the full path from its top-level instance:
//! every ancestor contributes one segment, joined with
//! [`PATH_SEPARATOR`](hierview_core::identifier::PATH_SEPARATOR).
//!
//! A segment is `"{instance_name}_{module_type}"` with `%`, `:` and `#`
//! percent-escaped, so neither the path separator nor the `#n` suffix used to
//! split colliding siblings can occur inside a segment.

use std::collections::HashSet;

use log::warn;

use hierview_core::{design::Instance, identifier::Id};

/// Returns the escaped local segment for `instance`.
///
/// # Examples
///
/// ```
/// use hierview::resolve::instance_segment;
/// use hierview_core::design::Instance;
///
/// assert_eq!(instance_segment(&Instance::new("cpu0", "CPU")), "cpu0_CPU");
/// assert_eq!(instance_segment(&Instance::new("a::b", "T#1")), "a%3A%3Ab_T%231");
/// ```
pub fn instance_segment(instance: &Instance) -> String {
    let mut segment =
        String::with_capacity(instance.instance_name().len() + instance.module_type().len() + 1);
    escape_into(&mut segment, instance.instance_name());
    segment.push('_');
    escape_into(&mut segment, instance.module_type());
    segment
}

fn escape_into(out: &mut String, raw: &str) {
    for ch in raw.chars() {
        match ch {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            '#' => out.push_str("%23"),
            other => out.push(other),
        }
    }
}

/// Resolves the ids of a list of siblings under `parent` (`None` for top-level
/// instances).
///
/// Siblings whose segments coincide keep the first occurrence as is; later
/// ones get the first free `#2`, `#3`, ... suffix.
pub fn resolve_sibling_ids(parent: Option<Id>, siblings: &[Instance]) -> Vec<Id> {
    let mut taken: HashSet<String> = HashSet::with_capacity(siblings.len());

    siblings
        .iter()
        .map(|instance| {
            let base = instance_segment(instance);
            let segment = if taken.contains(&base) {
                let segment = (2..)
                    .map(|ordinal| format!("{base}#{ordinal}"))
                    .find(|candidate| !taken.contains(candidate))
                    .unwrap_or_else(|| unreachable!("suffix search is unbounded"));
                warn!(
                    parent:? = parent.map(|id| id.to_string()),
                    segment = segment.as_str();
                    "Sibling instances share a name and type, disambiguating"
                );
                segment
            } else {
                base
            };

            let id = nest_segment(parent, &segment);
            taken.insert(segment);
            id
        })
        .collect()
}

fn nest_segment(parent: Option<Id>, segment: &str) -> Id {
    let local = Id::new(segment);
    match parent {
        Some(parent) => parent.create_nested(local),
        None => local,
    }
}
