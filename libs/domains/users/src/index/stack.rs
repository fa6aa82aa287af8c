/// LIFO buffer used to materialize and reorder index traversals.
///
/// Only the most recently pushed, not yet popped element is visible.
/// Popping an empty stack yields `None`.
#[derive(Debug, Clone)]
pub struct OrderedStack<T> {
    items: Vec<T>,
}

impl<T> OrderedStack<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Number of pushed-minus-popped elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Move every element of `other` onto this stack, keeping `other`'s
    /// order: its top becomes this stack's top. `other` is left empty.
    pub fn splice(&mut self, other: &mut Self) {
        self.items.append(&mut other.items);
    }

    /// Pop everything into `target`, reversing the order.
    pub fn reverse_into(&mut self, target: &mut Self) {
        target.items.reserve(self.items.len());
        while let Some(item) = self.pop() {
            target.push(item);
        }
    }
}

impl<T> Default for OrderedStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumes the stack, yielding elements in pop order.
impl<T> IntoIterator for OrderedStack<T> {
    type Item = T;
    type IntoIter = std::iter::Rev<std::vec::IntoIter<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter().rev()
    }
}
