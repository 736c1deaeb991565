//! Category forest reconciliation and breadcrumb labeling.
//!
//! Flat category listings identify parents by code. [`build_forest`] turns such
//! a list into a forest without ever discarding a node: anything whose parent
//! cannot be resolved becomes an additional root. [`label_paths`] then assigns
//! every node its breadcrumb, e.g. `"Electronics > Phones > Samsung"`.

use std::collections::HashMap;

use tracing::warn;

use crate::models::Category;

/// Separator between breadcrumb segments.
pub const PATH_SEPARATOR: &str = " > ";

/// Display name used when a node has neither name nor code.
const UNNAMED: &str = "Unknown";

/// Builds a forest from a flat, parent-pointer category list.
///
/// The code index is complete before any edge is inserted, and parents are
/// never resolved recursively. Children of incoming nodes are discarded: flat
/// listings describe structure through `parent_category_code` only.
///
/// A node becomes a root when its parent code is empty, refers to no entry, or
/// refers to itself. When a code occurs more than once, its first occurrence
/// is the parent target. Parent cycles are broken by promoting the first
/// cycle member (in input order) to a root, so the returned forest always
/// contains exactly `flat.len()` nodes. Roots and siblings keep input order.
pub fn build_forest(flat: Vec<Category>) -> Vec<Category> {
    let count = flat.len();
    let mut parent = resolve_parents(&flat);

    let children = loop {
        let children = child_lists(&parent);
        let reachable = reachable_from_roots(&parent, &children);
        match reachable.iter().position(|seen| !seen) {
            None => break children,
            Some(stranded) => {
                warn!(
                    code = flat[stranded].code().unwrap_or_default(),
                    "category parent cycle; promoting node to root"
                );
                parent[stranded] = None;
            }
        }
    };

    let mut slots: Vec<Option<Category>> = flat
        .into_iter()
        .map(|mut node| {
            node.children.clear();
            Some(node)
        })
        .collect();

    let forest: Vec<Category> = (0..count)
        .filter(|&i| parent[i].is_none())
        .filter_map(|root| assemble(root, &children, &mut slots))
        .collect();

    debug_assert_eq!(count_nodes(&forest), count);
    forest
}

fn resolve_parents(flat: &[Category]) -> Vec<Option<usize>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(flat.len());
    for (i, node) in flat.iter().enumerate() {
        if let Some(code) = node.code() {
            index.entry(code).or_insert(i);
        }
    }

    flat.iter()
        .enumerate()
        .map(|(i, node)| {
            node.parent_code()
                .and_then(|code| index.get(code).copied())
                .filter(|&p| p != i)
        })
        .collect()
}

fn child_lists(parent: &[Option<usize>]) -> Vec<Vec<usize>> {
    let mut children = vec![Vec::new(); parent.len()];
    for (i, p) in parent.iter().enumerate() {
        if let Some(p) = p {
            children[*p].push(i);
        }
    }
    children
}

fn reachable_from_roots(parent: &[Option<usize>], children: &[Vec<usize>]) -> Vec<bool> {
    let mut seen = vec![false; parent.len()];
    let mut stack: Vec<usize> = (0..parent.len()).filter(|&i| parent[i].is_none()).collect();
    while let Some(i) = stack.pop() {
        if !seen[i] {
            seen[i] = true;
            stack.extend(&children[i]);
        }
    }
    seen
}

fn assemble(
    index: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<Category>],
) -> Option<Category> {
    let mut node = slots[index].take()?;
    node.children = children[index]
        .iter()
        .filter_map(|&child| assemble(child, children, slots))
        .collect();
    Some(node)
}

/// Assigns breadcrumb paths in one depth-first pass.
///
/// Roots get their own display name; every other node gets its parent's path,
/// [`PATH_SEPARATOR`], and its display name (name, else code).
pub fn label_paths(forest: &mut [Category]) {
    for root in forest {
        label(root, None);
    }
}

fn label(node: &mut Category, parent_path: Option<&str>) {
    let name = node.display_name().unwrap_or(UNNAMED).to_string();
    let path = match parent_path {
        Some(parent) => format!("{parent}{PATH_SEPARATOR}{name}"),
        None => name,
    };
    for child in &mut node.children {
        label(child, Some(&path));
    }
    node.path = Some(path);
}

/// Total number of nodes in `forest`.
pub fn count_nodes(forest: &[Category]) -> usize {
    forest
        .iter()
        .map(|node| 1 + count_nodes(&node.children))
        .sum()
}

/// Flattens `forest` into a code → node map. Later duplicates win.
pub fn index_by_code(forest: &[Category]) -> HashMap<&str, &Category> {
    let mut index = HashMap::new();
    let mut stack: Vec<&Category> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if let Some(code) = node.code() {
            index.insert(code, node);
        }
        stack.extend(node.children.iter().rev());
    }
    index
}

/// Splits a breadcrumb produced by [`label_paths`] into its segments.
pub fn split_path(path: &str) -> Vec<String> {
    path.split(PATH_SEPARATOR).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Text;

    fn cat(code: &str, name: Option<&str>, parent: Option<&str>) -> Category {
        Category {
            category_code: Some(Text::from(code)),
            category_name: name.map(Text::from),
            parent_category_code: parent.map(Text::from),
            ..Category::default()
        }
    }

    fn find<'a>(forest: &'a [Category], code: &str) -> &'a Category {
        index_by_code(forest)[code]
    }

    #[test]
    fn test_three_level_chain_labels_full_path() {
        let mut forest = build_forest(vec![
            cat("c", Some("C"), Some("b")),
            cat("a", Some("A"), None),
            cat("b", Some("B"), Some("a")),
        ]);
        label_paths(&mut forest);

        assert_eq!(forest.len(), 1);
        assert_eq!(find(&forest, "c").path.as_deref(), Some("A > B > C"));
        assert_eq!(find(&forest, "a").path.as_deref(), Some("A"));
    }

    #[test]
    fn test_node_count_preserved_without_duplication() {
        let flat = vec![
            cat("1", Some("Root"), Some("")),
            cat("2", Some("Child"), Some("1")),
            cat("3", Some("Child 2"), Some("1")),
            cat("4", Some("Grandchild"), Some("3")),
            cat("5", Some("Other root"), None),
        ];
        let forest = build_forest(flat);
        assert_eq!(count_nodes(&forest), 5);
        assert_eq!(index_by_code(&forest).len(), 5);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_unresolved_parent_becomes_root() {
        let forest = build_forest(vec![
            cat("1", Some("Known"), None),
            cat("2", Some("Orphan"), Some("999")),
        ]);
        let roots: Vec<_> = forest.iter().map(|c| c.code().unwrap()).collect();
        assert_eq!(roots, vec!["1", "2"]);
    }

    #[test]
    fn test_self_parent_becomes_root() {
        let forest = build_forest(vec![cat("x", Some("X"), Some("x"))]);
        assert_eq!(forest.len(), 1);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_parent_cycle_is_broken_not_dropped() {
        let mut forest = build_forest(vec![
            cat("r", Some("Root"), None),
            cat("a", Some("A"), Some("b")),
            cat("b", Some("B"), Some("a")),
        ]);
        label_paths(&mut forest);

        assert_eq!(count_nodes(&forest), 3);
        assert_eq!(forest.len(), 2);
        assert_eq!(find(&forest, "a").path.as_deref(), Some("A"));
        assert_eq!(find(&forest, "b").path.as_deref(), Some("A > B"));
    }

    #[test]
    fn test_duplicate_codes_attach_to_first_occurrence() {
        let forest = build_forest(vec![
            cat("d", Some("First"), None),
            cat("d", Some("Second"), None),
            cat("k", Some("Kid"), Some("d")),
        ]);
        assert_eq!(count_nodes(&forest), 3);
        assert_eq!(forest[0].category_name.as_ref().unwrap().as_str(), "First");
        assert_eq!(forest[0].children.len(), 1);
        assert!(forest[1].children.is_empty());
    }

    #[test]
    fn test_display_name_falls_back_to_code() {
        let mut forest = build_forest(vec![
            cat("top", Some("Top"), None),
            cat("T9", None, Some("top")),
        ]);
        label_paths(&mut forest);
        assert_eq!(find(&forest, "T9").path.as_deref(), Some("Top > T9"));
    }

    #[test]
    fn test_nested_tree_is_labeled_as_is() {
        let mut forest = vec![Category {
            children: vec![cat("2", Some("Phones"), None)],
            ..cat("1", Some("Electronics"), None)
        }];
        label_paths(&mut forest);
        assert_eq!(
            forest[0].children[0].path.as_deref(),
            Some("Electronics > Phones")
        );
        assert_eq!(
            split_path(forest[0].children[0].path.as_deref().unwrap()),
            vec!["Electronics", "Phones"]
        );
    }

    #[test]
    fn test_paths_unset_before_labeling() {
        let forest = build_forest(vec![cat("1", Some("A"), None)]);
        assert!(forest[0].path.is_none());
    }
}
