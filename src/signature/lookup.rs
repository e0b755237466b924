//! Union-aware signature lookups

use super::{UNION_DELIMITER, decode_union};
use crate::index::ProjectIndex;
use crate::symbol::{Declaration, DeclarationSet};

/// Elements named by a possibly-union signature.
///
/// Type providers can emit `a|b` as well as a dangling `a|`; empty branches
/// carry no type and are skipped. Results keep branch order, without
/// duplicates.
pub fn lookup_type_signature(index: &dyn ProjectIndex, signature: &str) -> Vec<Declaration> {
    if !signature.contains(UNION_DELIMITER) {
        return index.lookup_by_signature(signature);
    }

    let mut merged = DeclarationSet::new();
    for branch in decode_union(signature) {
        if branch.is_empty() {
            continue;
        }
        merged.extend(index.lookup_by_signature(branch));
    }
    merged.into_vec()
}

/// `elements` plus `extra`, without duplicates
pub fn merge_signature_results(
    elements: impl IntoIterator<Item = Declaration>,
    extra: Declaration,
) -> Vec<Declaration> {
    let mut merged: DeclarationSet = elements.into_iter().collect();
    merged.insert(extra);
    merged.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryIndex;
    use crate::types::Location;

    fn class(fqn: &str) -> Declaration {
        Declaration::Class {
            fqn: fqn.to_string(),
            location: Location::file(format!("src/{}.php", fqn.replace('\\', "/"))),
        }
    }

    fn fixture() -> MemoryIndex {
        let index = MemoryIndex::new();
        index.insert_element(class("App\\Mailer"), None);
        index.insert_element(class("App\\Logger"), None);
        index
    }

    #[test]
    fn test_single_signature() {
        let index = fixture();
        assert_eq!(
            lookup_type_signature(&index, "#C\\App\\Mailer"),
            vec![class("App\\Mailer")]
        );
    }

    #[test]
    fn test_union_merges_branches_in_order() {
        let index = fixture();
        let found = lookup_type_signature(&index, "#C\\App\\Logger|#C\\App\\Mailer|#C\\App\\Logger");
        assert_eq!(found, vec![class("App\\Logger"), class("App\\Mailer")]);
    }

    #[test]
    fn test_union_skips_empty_branches() {
        let index = fixture();
        assert_eq!(
            lookup_type_signature(&index, "#C\\App\\Mailer|"),
            vec![class("App\\Mailer")]
        );
        assert!(lookup_type_signature(&index, "|").is_empty());
    }

    #[test]
    fn test_merge_signature_results() {
        let merged = merge_signature_results(
            vec![class("App\\Mailer"), class("App\\Logger")],
            class("App\\Mailer"),
        );
        assert_eq!(merged.len(), 2);

        let merged = merge_signature_results(Vec::new(), class("App\\Mailer"));
        assert_eq!(merged, vec![class("App\\Mailer")]);
    }
}
