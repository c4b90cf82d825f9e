//! Permission-filtered menu tree construction.
//!
//! The navigation menu is stored as a flat, self-referential node set. Turning
//! it into the tree a client renders is a pure three-stage transformation over
//! the loaded nodes and the caller's granted permission set:
//!
//! 1. **expand** — rebuild the hierarchy, keeping a node only if it is active
//!    and either ungated or gated by a granted permission. Children are
//!    attached in ascending node-id order so the result is deterministic
//!    before the final sort.
//! 2. **prune** — post-order drop of branch nodes whose filtered child list
//!    came out empty.
//! 3. **sort** — reorder siblings by `sort_order` ascending (stable, so ties
//!    keep expand order) and reshape into the display schema.
//!
//! Nothing here touches the query layer; the repository loads nodes, this
//! module does the rest.

use std::collections::HashSet;

use serde::{Serialize, Serializer};
use uuid::Uuid;

/// A menu row as loaded from the store.
#[derive(Debug, Clone)]
pub struct MenuNode {
    pub id: Uuid,
    /// `None` marks a top-level node.
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub path: Option<String>,
    pub icon: Option<String>,
    /// Gating permission. `None` means no permission required.
    pub permission_id: Option<Uuid>,
    /// Branch marker: a node flagged here is dropped when all of its
    /// children are filtered out.
    pub has_children: bool,
    pub is_active: bool,
    pub is_show: bool,
    pub sort_order: i32,
}

/// A menu entry in the shape clients render.
///
/// `sub` serializes as a nested list, or the JSON literal `false` when the
/// entry has no children (wire-compatible sentinel kept from the previous
/// API generation).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuEntry {
    pub id: Uuid,
    pub title: String,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub is_show: bool,
    #[serde(serialize_with = "sub_or_false")]
    pub sub: Vec<MenuEntry>,
}

fn sub_or_false<S>(sub: &Vec<MenuEntry>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if sub.is_empty() {
        s.serialize_bool(false)
    } else {
        sub.serialize(s)
    }
}

/// Expanded node carrying the fields the prune and sort stages still need.
#[derive(Debug, Clone)]
struct Expanded {
    id: Uuid,
    title: String,
    path: Option<String>,
    icon: Option<String>,
    has_children: bool,
    is_show: bool,
    sort_order: i32,
    children: Vec<Expanded>,
}

/// Build the filtered, pruned, ordered menu tree for a caller whose resolved
/// permission set is `granted`.
pub fn build_menu_tree(nodes: &[MenuNode], granted: &HashSet<Uuid>) -> Vec<MenuEntry> {
    let expanded = expand(nodes, None, granted);
    let pruned = prune(expanded);
    sort(pruned)
}

fn is_granted(node: &MenuNode, granted: &HashSet<Uuid>) -> bool {
    match node.permission_id {
        None => true,
        Some(permission_id) => granted.contains(&permission_id),
    }
}

fn expand(nodes: &[MenuNode], parent_id: Option<Uuid>, granted: &HashSet<Uuid>) -> Vec<Expanded> {
    let mut siblings: Vec<&MenuNode> = nodes
        .iter()
        .filter(|n| n.parent_id == parent_id && n.is_active && is_granted(n, granted))
        .collect();
    siblings.sort_by_key(|n| n.id);

    siblings
        .into_iter()
        .map(|n| Expanded {
            id: n.id,
            title: n.title.clone(),
            path: n.path.clone(),
            icon: n.icon.clone(),
            has_children: n.has_children,
            is_show: n.is_show,
            sort_order: n.sort_order,
            children: expand(nodes, Some(n.id), granted),
        })
        .collect()
}

fn prune(trees: Vec<Expanded>) -> Vec<Expanded> {
    let mut pruned = Vec::new();
    for mut t in trees {
        if t.has_children && t.children.is_empty() {
            continue;
        }
        t.children = prune(std::mem::take(&mut t.children));
        pruned.push(t);
    }
    pruned
}

fn sort(mut trees: Vec<Expanded>) -> Vec<MenuEntry> {
    trees.sort_by_key(|t| t.sort_order);
    trees
        .into_iter()
        .map(|t| MenuEntry {
            id: t.id,
            title: t.title,
            path: t.path,
            icon: t.icon,
            is_show: t.is_show,
            sub: sort(t.children),
        })
        .collect()
}
