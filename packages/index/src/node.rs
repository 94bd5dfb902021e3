//! AVL node storage, rotations, and the recursive insert/remove passes.
//!
//! Children are owned (`Option<Box<Node>>`). Every structural operation
//! takes a subtree by value and hands back the new local root, which the
//! caller stores in the link it took the subtree from.

use std::cmp::Ordering;

use collision_map_collision_models::Collision;

/// An owned, possibly empty, subtree.
pub type Link = Option<Box<Node>>;

/// One stored collision plus its subtree links.
#[derive(Debug, Clone)]
pub struct Node {
    pub record: Collision,
    pub left: Link,
    pub right: Link,
    /// Height of the subtree rooted here. Leaves are 0.
    pub height: i32,
}

impl Node {
    fn leaf(record: Collision) -> Box<Self> {
        Box::new(Self {
            record,
            left: None,
            right: None,
            height: 0,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    /// Right height minus left height, counting an empty side as -1.
    ///
    /// A node with a single child therefore reports its own height (signed
    /// by the side that child is on) and a leaf reports 0.
    pub fn balance_factor(&self) -> i32 {
        height(&self.right) - height(&self.left)
    }
}

/// Height of a link; an empty subtree is -1.
pub fn height(link: &Link) -> i32 {
    link.as_ref().map_or(-1, |node| node.height)
}

fn balance_factor(link: &Link) -> i32 {
    link.as_ref().map_or(0, |node| node.balance_factor())
}

fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_right_left(mut node: Box<Node>) -> Box<Node> {
    node.right = node.right.take().map(rotate_right);
    rotate_left(node)
}

fn rotate_left_right(mut node: Box<Node>) -> Box<Node> {
    node.left = node.left.take().map(rotate_left);
    rotate_right(node)
}

/// Recomputes the height of `node` and restores the AVL invariant with at
/// most one single or double rotation.
///
/// The rotation is chosen from the heavy child's own balance factor.
fn rebalance(mut node: Box<Node>) -> Box<Node> {
    node.update_height();
    let factor = node.balance_factor();

    if factor > 1 {
        if balance_factor(&node.right) >= 0 {
            log::trace!("rotate left at {} {}", node.record.zip(), node.record.date());
            rotate_left(node)
        } else {
            log::trace!("rotate right-left at {} {}", node.record.zip(), node.record.date());
            rotate_right_left(node)
        }
    } else if factor < -1 {
        if balance_factor(&node.left) <= 0 {
            log::trace!("rotate right at {} {}", node.record.zip(), node.record.date());
            rotate_right(node)
        } else {
            log::trace!("rotate left-right at {} {}", node.record.zip(), node.record.date());
            rotate_left_right(node)
        }
    } else {
        node
    }
}

/// Inserts `record` below `link`, returning the rebalanced subtree.
///
/// Records that compare equal to a stored one (same zip and date) go to the
/// right. `allocated` is bumped once per new node.
pub fn insert(link: Link, record: Collision, allocated: &mut usize) -> Box<Node> {
    let Some(mut node) = link else {
        *allocated += 1;
        return Node::leaf(record);
    };

    if record.cmp_key(&node.record) == Ordering::Less {
        node.left = Some(insert(node.left.take(), record, allocated));
    } else {
        node.right = Some(insert(node.right.take(), record, allocated));
    }

    rebalance(node)
}

/// Removes the first node on the search path whose record compares equal to
/// `target`, returning the rebalanced subtree and whether a node was removed.
///
/// The match is by [`Collision::cmp_key`], so a stored record sharing zip
/// and date with `target` is removed even if its key differs.
pub fn remove(link: Link, target: &Collision) -> (Link, bool) {
    let Some(mut node) = link else {
        return (None, false);
    };

    let removed = match target.cmp_key(&node.record) {
        Ordering::Less => {
            let (left, removed) = remove(node.left.take(), target);
            node.left = left;
            removed
        }
        Ordering::Greater => {
            let (right, removed) = remove(node.right.take(), target);
            node.right = right;
            removed
        }
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, right) => return (right, true),
            (left, None) => return (left, true),
            (Some(left), right) => {
                let (rest, predecessor) = take_max(left);
                node.left = rest;
                node.right = right;
                node.record = predecessor;
                true
            }
        },
    };

    (Some(rebalance(node)), removed)
}

/// Detaches the rightmost node of a subtree, returning what is left of the
/// subtree (rebalanced) and the detached record.
fn take_max(mut node: Box<Node>) -> (Link, Collision) {
    match node.right.take() {
        None => {
            let Node { record, left, .. } = *node;
            (left, record)
        }
        Some(right) => {
            let (rest, max) = take_max(right);
            node.right = rest;
            (Some(rebalance(node)), max)
        }
    }
}

/// Looks for a record equal to `target` on zip, date and key.
pub fn contains(link: Option<&Node>, target: &Collision) -> bool {
    let Some(node) = link else {
        return false;
    };

    match target.cmp_key(&node.record) {
        Ordering::Less => contains(node.left.as_deref(), target),
        Ordering::Greater => contains(node.right.as_deref(), target),
        // Ties can sit on either side once rotations have run.
        Ordering::Equal => {
            node.record == *target
                || contains(node.left.as_deref(), target)
                || contains(node.right.as_deref(), target)
        }
    }
}

/// Recomputes heights from scratch and checks them against the cached
/// values and the AVL bound. Returns the true height when both hold.
pub fn verified_height(link: Option<&Node>) -> Option<i32> {
    let Some(node) = link else {
        return Some(-1);
    };
    let left = verified_height(node.left.as_deref())?;
    let right = verified_height(node.right.as_deref())?;
    let actual = 1 + left.max(right);
    ((right - left).abs() <= 1 && actual == node.height).then_some(actual)
}

/// Appends a pre-order, depth-indented rendering of the subtree to `out`.
///
/// Each entry starts on a new line; depth `d > 0` is indented by `d - 1`
/// groups of three spaces followed by `|--`. Empty children print `null`.
pub fn write_tree(link: Option<&Node>, level: usize, out: &mut String) {
    out.push('\n');
    if level > 0 {
        out.push_str(&"   ".repeat(level - 1));
        out.push_str("|--");
    }
    match link {
        Some(node) => {
            out.push_str(&node.record.to_string());
            write_tree(node.left.as_deref(), level + 1, out);
            write_tree(node.right.as_deref(), level + 1, out);
        }
        None => out.push_str("null"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use collision_map_collision_models::Casualties;

    use super::*;

    fn collision(zip: &str, day: u32) -> Collision {
        let date = NaiveDate::from_ymd_opt(2017, 1, day).unwrap();
        Collision::new(zip, date, format!("{zip}-{day}"), Casualties::default()).unwrap()
    }

    fn build(records: impl IntoIterator<Item = Collision>) -> (Link, usize) {
        let mut root = None;
        let mut allocated = 0;
        for record in records {
            root = Some(insert(root, record, &mut allocated));
        }
        (root, allocated)
    }

    fn zips(link: Option<&Node>, out: &mut Vec<String>) {
        if let Some(node) = link {
            zips(node.left.as_deref(), out);
            out.push(node.record.zip().to_string());
            zips(node.right.as_deref(), out);
        }
    }

    #[test]
    fn leaf_has_zero_height_and_balance() {
        let (root, allocated) = build([collision("10001", 1)]);
        let root = root.unwrap();
        assert_eq!(allocated, 1);
        assert_eq!(root.height, 0);
        assert_eq!(root.balance_factor(), 0);
    }

    #[test]
    fn single_child_balance_factor_is_signed_node_height() {
        let (root, _) = build([collision("10002", 1), collision("10003", 1)]);
        let root = root.unwrap();
        assert_eq!(root.height, 1);
        assert_eq!(root.balance_factor(), 1);

        let (root, _) = build([collision("10002", 1), collision("10001", 1)]);
        let root = root.unwrap();
        assert_eq!(root.balance_factor(), -1);
    }

    #[test]
    fn right_right_case_rotates_left() {
        let (root, _) = build(["10001", "10002", "10003"].map(|z| collision(z, 1)));
        let root = root.unwrap();
        assert_eq!(root.record.zip(), "10002");
        assert_eq!(root.left.as_ref().unwrap().record.zip(), "10001");
        assert_eq!(root.right.as_ref().unwrap().record.zip(), "10003");
        assert_eq!(root.height, 1);
    }

    #[test]
    fn left_left_case_rotates_right() {
        let (root, _) = build(["10003", "10002", "10001"].map(|z| collision(z, 1)));
        assert_eq!(root.unwrap().record.zip(), "10002");
    }

    #[test]
    fn right_left_case_double_rotates() {
        let (root, _) = build(["10001", "10003", "10002"].map(|z| collision(z, 1)));
        let root = root.unwrap();
        assert_eq!(root.record.zip(), "10002");
        assert_eq!(root.left.as_ref().unwrap().record.zip(), "10001");
        assert_eq!(root.right.as_ref().unwrap().record.zip(), "10003");
    }

    #[test]
    fn left_right_case_double_rotates() {
        let (root, _) = build(["10003", "10001", "10002"].map(|z| collision(z, 1)));
        assert_eq!(root.unwrap().record.zip(), "10002");
    }

    #[test]
    fn ties_descend_right() {
        let date = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
        let a = Collision::new("10001", date, "A", Casualties::default()).unwrap();
        let b = Collision::new("10001", date, "B", Casualties::default()).unwrap();
        let (root, allocated) = build([a, b]);
        let root = root.unwrap();
        assert_eq!(allocated, 2);
        assert_eq!(root.record.key(), "A");
        assert_eq!(root.right.as_ref().unwrap().record.key(), "B");
    }

    #[test]
    fn remove_leaf_and_missing() {
        let (root, _) = build(["10001", "10002", "10003"].map(|z| collision(z, 1)));
        let (root, removed) = remove(root, &collision("10001", 1));
        assert!(removed);
        let (root, removed) = remove(root, &collision("10001", 1));
        assert!(!removed);
        let mut out = Vec::new();
        zips(root.as_deref(), &mut out);
        assert_eq!(out, vec!["10002", "10003"]);
    }

    #[test]
    fn remove_two_child_node_uses_predecessor() {
        let (root, _) = build(["10001", "10002", "10003"].map(|z| collision(z, 1)));
        let (root, removed) = remove(root, &collision("10002", 1));
        assert!(removed);
        let root = root.unwrap();
        assert_eq!(root.record.zip(), "10001");
        assert!(root.left.is_none());
        assert_eq!(root.right.as_ref().unwrap().record.zip(), "10003");
        assert_eq!(root.height, 1);
    }

    #[test]
    fn remove_rebalances() {
        let (root, _) = build(["10002", "10001", "10003", "10004"].map(|z| collision(z, 1)));
        let (root, removed) = remove(root, &collision("10001", 1));
        assert!(removed);
        let root = root.unwrap();
        assert_eq!(root.record.zip(), "10003");
        assert!(verified_height(Some(&root)).is_some());
    }

    #[test]
    fn remove_matches_on_zip_and_date_only() {
        let date = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
        let stored = Collision::new("10001", date, "A", Casualties::default()).unwrap();
        let probe = Collision::new("10001", date, "Z", Casualties::default()).unwrap();
        let (root, _) = build([stored]);
        let (root, removed) = remove(root, &probe);
        assert!(removed);
        assert!(root.is_none());
    }

    #[test]
    fn remove_tied_two_child_node_moves_predecessor() {
        let date = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
        let tied = ["A", "B", "C"]
            .map(|key| Collision::new("10001", date, key, Casualties::default()).unwrap());
        let (root, _) = build(tied.clone());
        assert_eq!(root.as_ref().unwrap().record.key(), "B");

        let (root, removed) = remove(root, &tied[1]);
        assert!(removed);
        let root = root.unwrap();
        assert_eq!(root.record.key(), "A");
        assert!(root.left.is_none());
        assert_eq!(root.right.as_ref().unwrap().record.key(), "C");
        assert!(verified_height(Some(&root)).is_some());
    }

    #[test]
    fn contains_requires_matching_key() {
        let date = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
        let a = Collision::new("10001", date, "A", Casualties::default()).unwrap();
        let b = Collision::new("10001", date, "B", Casualties::default()).unwrap();
        let c = Collision::new("10001", date, "C", Casualties::default()).unwrap();
        let (root, _) = build([a.clone(), b.clone(), collision("10000", 1)]);
        assert!(contains(root.as_deref(), &a));
        assert!(contains(root.as_deref(), &b));
        assert!(!contains(root.as_deref(), &c));
    }

    #[test]
    fn writes_tree_with_null_children() {
        let (root, _) = build(["10001", "10002"].map(|z| collision(z, 1)));
        let mut out = String::new();
        write_tree(root.as_deref(), 0, &mut out);
        assert_eq!(
            out,
            "\n10001 0 0 0 0 0 0 0 0\n|--null\n|--10002 0 0 0 0 0 0 0 0\n   |--null\n   |--null"
        );
    }

    #[test]
    fn writes_empty_tree_as_null() {
        let mut out = String::new();
        write_tree(None, 0, &mut out);
        assert_eq!(out, "\nnull");
    }
}
