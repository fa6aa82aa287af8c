use std::borrow::Borrow;
use std::cmp::Ordering;

use super::{IndexError, IndexResult, OrderedStack, Record, Status};

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Debug)]
struct Node<K, V> {
    record: Record<K, V>,
    height: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn leaf(record: Record<K, V>) -> Box<Self> {
        Box::new(Self {
            record,
            height: 1,
            left: None,
            right: None,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

fn height<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

/// Height-balanced binary search tree keyed by a unique identifier.
///
/// Every node exclusively owns its children; rebalancing happens on the way
/// back up the recursion, so no parent links are kept. Failed operations
/// return before touching the tree.
#[derive(Debug)]
pub struct BalancedIndex<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K: Ord, V> BalancedIndex<K, V> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree; 0 when empty.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    pub fn root_key(&self) -> Option<&K> {
        self.root.as_ref().map(|node| &node.record.key)
    }

    /// Insert with the initial [`Status::Pending`].
    pub fn insert(&mut self, key: K, value: V) -> IndexResult<()> {
        self.insert_with_status(key, value, Status::default())
    }

    pub fn insert_with_status(&mut self, key: K, value: V, status: Status) -> IndexResult<()> {
        insert(&mut self.root, Record::new(key, value, status))?;
        self.len += 1;
        Ok(())
    }

    pub fn find<Q>(&self, key: &Q) -> Option<&Record<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match key.cmp(node.record.key.borrow()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.record),
            };
        }
        None
    }

    /// Replace the value stored under `key`. Key and status are untouched.
    pub fn update<Q>(&mut self, key: &Q, value: V) -> IndexResult<&Record<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.update_with(key, |current| *current = value)
    }

    /// Mutate the value stored under `key` in place.
    pub fn update_with<Q, F>(&mut self, key: &Q, apply: F) -> IndexResult<&Record<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        F: FnOnce(&mut V),
    {
        let record = self.find_mut(key).ok_or(IndexError::NotFound)?;
        apply(&mut record.value);
        Ok(&*record)
    }

    /// Set the status of the record under `key`. Every transition is allowed.
    pub fn transition_status<Q>(&mut self, key: &Q, status: Status) -> IndexResult<&Record<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let record = self.find_mut(key).ok_or(IndexError::NotFound)?;
        record.status = status;
        Ok(&*record)
    }

    /// Delete the record under `key`, rebalancing every ancestor on the path.
    pub fn remove<Q>(&mut self, key: &Q) -> IndexResult<Record<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let record = remove(&mut self.root, key).ok_or(IndexError::NotFound)?;
        self.len -= 1;
        Ok(record)
    }

    /// Push every record onto `into`.
    ///
    /// Popping `into` afterwards yields ascending key order when `descending`
    /// is false and descending key order when it is true. Records already on
    /// `into` stay beneath the new ones.
    pub fn drain_ordered<'a>(
        &'a self,
        into: &mut OrderedStack<&'a Record<K, V>>,
        descending: bool,
    ) -> IndexResult<()> {
        // A right-first walk pushes the largest key first, leaving the
        // smallest on top.
        let mut scratch = OrderedStack::with_capacity(self.len);
        push_right_first(&self.root, &mut scratch);

        if scratch.len() != self.len {
            return Err(IndexError::InvariantViolation(format!(
                "traversal visited {} records, index holds {}",
                scratch.len(),
                self.len
            )));
        }

        if descending {
            let mut flipped = OrderedStack::with_capacity(self.len);
            scratch.reverse_into(&mut flipped);
            into.splice(&mut flipped);
        } else {
            into.splice(&mut scratch);
        }
        Ok(())
    }

    /// Records whose status equals `status`, in ascending key order.
    pub fn drain_by_status(&self, status: Status) -> Vec<&Record<K, V>> {
        let mut out = Vec::new();
        collect_in_order(&self.root, &mut |record| {
            if record.status == status {
                out.push(record);
            }
        });
        out
    }

    /// Check key ordering, AVL balance, cached heights and the record count.
    pub fn validate(&self) -> IndexResult<()> {
        let mut count = 0;
        validate_subtree(&self.root, None, None, &mut count)?;
        if count != self.len {
            return Err(IndexError::InvariantViolation(format!(
                "counted {} nodes, index holds {}",
                count, self.len
            )));
        }
        Ok(())
    }

    fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut Record<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root.as_deref_mut();
        while let Some(node) = cursor {
            cursor = match key.cmp(node.record.key.borrow()) {
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.record),
            };
        }
        None
    }
}

impl<K: Ord, V> Default for BalancedIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

fn insert<K: Ord, V>(link: &mut Link<K, V>, record: Record<K, V>) -> IndexResult<()> {
    match link {
        None => {
            *link = Some(Node::leaf(record));
            Ok(())
        }
        Some(node) => {
            match record.key.cmp(&node.record.key) {
                Ordering::Less => insert(&mut node.left, record)?,
                Ordering::Greater => insert(&mut node.right, record)?,
                Ordering::Equal => return Err(IndexError::KeyExists),
            }
            rebalance(link);
            Ok(())
        }
    }
}

fn remove<K, V, Q>(link: &mut Link<K, V>, key: &Q) -> Option<Record<K, V>>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let ordering = key.cmp(link.as_ref()?.record.key.borrow());
    let removed = match ordering {
        Ordering::Less => remove(&mut link.as_mut()?.left, key)?,
        Ordering::Greater => remove(&mut link.as_mut()?.right, key)?,
        Ordering::Equal => {
            let mut node = link.take()?;
            match (node.left.take(), node.right.take()) {
                (None, None) => {}
                (Some(child), None) | (None, Some(child)) => *link = Some(child),
                (Some(left), Some(right)) => {
                    // Swap in the in-order successor, taken from the right subtree.
                    let mut right = Some(right);
                    let successor = remove_min(&mut right)?;
                    let removed = std::mem::replace(&mut node.record, successor);
                    node.left = Some(left);
                    node.right = right;
                    *link = Some(node);
                    rebalance(link);
                    return Some(removed);
                }
            }
            return Some(node.record);
        }
    };
    rebalance(link);
    Some(removed)
}

fn remove_min<K, V>(link: &mut Link<K, V>) -> Option<Record<K, V>> {
    let node = link.as_mut()?;
    if node.left.is_some() {
        let min = remove_min(&mut node.left);
        rebalance(link);
        min
    } else {
        let mut node = link.take()?;
        *link = node.right.take();
        Some(node.record)
    }
}

/// Restore the AVL condition at `link`, whose subtrees are already balanced.
fn rebalance<K, V>(link: &mut Link<K, V>) {
    let Some(mut node) = link.take() else {
        return;
    };
    node.update_height();

    let balance = node.balance_factor();
    let node = if balance > 1 {
        if node.left.as_ref().is_some_and(|left| left.balance_factor() < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        rotate_right(node)
    } else if balance < -1 {
        if node.right.as_ref().is_some_and(|right| right.balance_factor() > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        rotate_left(node)
    } else {
        node
    };
    *link = Some(node);
}

fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

fn push_right_first<'a, K, V>(link: &'a Link<K, V>, stack: &mut OrderedStack<&'a Record<K, V>>) {
    if let Some(node) = link {
        push_right_first(&node.right, stack);
        stack.push(&node.record);
        push_right_first(&node.left, stack);
    }
}

fn collect_in_order<'a, K, V, F>(link: &'a Link<K, V>, visit: &mut F)
where
    F: FnMut(&'a Record<K, V>),
{
    if let Some(node) = link {
        collect_in_order(&node.left, visit);
        visit(&node.record);
        collect_in_order(&node.right, visit);
    }
}

fn validate_subtree<K: Ord, V>(
    link: &Link<K, V>,
    lower: Option<&K>,
    upper: Option<&K>,
    count: &mut usize,
) -> IndexResult<usize> {
    let Some(node) = link else {
        return Ok(0);
    };
    let key = &node.record.key;

    if lower.is_some_and(|lower| key <= lower) || upper.is_some_and(|upper| key >= upper) {
        return Err(IndexError::InvariantViolation(
            "key out of search-tree order".to_string(),
        ));
    }

    let left = validate_subtree(&node.left, lower, Some(key), count)?;
    let right = validate_subtree(&node.right, Some(key), upper, count)?;
    *count += 1;

    if left.abs_diff(right) > 1 {
        return Err(IndexError::InvariantViolation(format!(
            "balance factor {} out of range",
            left as isize - right as isize
        )));
    }
    let actual = 1 + left.max(right);
    if actual != node.height {
        return Err(IndexError::InvariantViolation(format!(
            "cached height {} differs from actual {}",
            node.height, actual
        )));
    }
    Ok(actual)
}
