//! Hierarchical name nodes.
//!
//! A participant proves role eligibility by owning `label` under a root
//! node. The child node is `H(parent || H(label))`, applied once per label.

use crate::hash::hash256;
use agij_types::Hash256;

/// Hash of a single label.
pub fn label_hash(label: &str) -> Hash256 {
    hash256(&[label.as_bytes()])
}

/// Node for `label` directly under `parent`.
pub fn sub_node(parent: &Hash256, label: &str) -> Hash256 {
    let label = label_hash(label);
    hash256(&[parent.as_bytes(), label.as_bytes()])
}

/// Full namehash of a dotted name such as `"alice.agent.agi.eth"`.
///
/// Labels are folded right to left starting from the zero node; the empty
/// name is the zero node.
pub fn namehash(name: &str) -> Hash256 {
    if name.is_empty() {
        return Hash256::ZERO;
    }
    name.rsplit('.')
        .fold(Hash256::ZERO, |node, label| sub_node(&node, label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namehash_matches_manual_fold() {
        let eth = sub_node(&Hash256::ZERO, "eth");
        let agi = sub_node(&eth, "agi");
        assert_eq!(namehash("agi.eth"), agi);
    }

    #[test]
    fn empty_name_is_zero() {
        assert_eq!(namehash(""), Hash256::ZERO);
    }

    #[test]
    fn distinct_labels_give_distinct_nodes() {
        let root = namehash("club.agi.eth");
        assert_ne!(sub_node(&root, "a"), sub_node(&root, "b"));
    }
}
