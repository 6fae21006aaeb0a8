use std::collections::BTreeMap;

use super::KeyGenerator;
use crate::basic_types::Cost;

/// The position of an element inside a [`CostQueue`].
///
/// Elements are ordered by their cost first and by the order in which they arrived second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueueKey {
    cost: Cost,
    arrival: usize,
}

impl QueueKey {
    pub fn cost(&self) -> Cost {
        self.cost
    }
}

/// A collection of elements which is kept sorted ascending by [`Cost`]; elements with an equal
/// cost are kept in insertion order.
///
/// Insertion, removal and retrieval of the cheapest element are `O(log n)`.
#[derive(Clone, Debug)]
pub struct CostQueue<T> {
    entries: BTreeMap<QueueKey, T>,
    arrivals: KeyGenerator<usize>,
}

impl<T> Default for CostQueue<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            arrivals: KeyGenerator::default(),
        }
    }
}

impl<T> CostQueue<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `element` at the position determined by `cost`.
    pub fn push(&mut self, cost: Cost, element: T) -> QueueKey {
        let key = QueueKey {
            cost,
            arrival: self.arrivals.next_key(),
        };
        let previous = self.entries.insert(key, element);
        debug_assert!(previous.is_none());

        key
    }

    /// Returns the cheapest element without removing it.
    pub fn peek(&self) -> Option<(QueueKey, &T)> {
        self.entries
            .first_key_value()
            .map(|(key, element)| (*key, element))
    }

    /// Removes and returns the cheapest element.
    pub fn pop(&mut self) -> Option<(QueueKey, T)> {
        self.entries.pop_first()
    }

    pub fn get(&self, key: QueueKey) -> Option<&T> {
        self.entries.get(&key)
    }

    pub fn remove(&mut self, key: QueueKey) -> Option<T> {
        self.entries.remove(&key)
    }

    /// Moves the element at `key` to the position of `cost`; its arrival order is preserved so
    /// ties are still broken the way they were before.
    pub fn rekey(&mut self, key: QueueKey, cost: Cost) -> Option<QueueKey> {
        let element = self.entries.remove(&key)?;
        let new_key = QueueKey {
            cost,
            arrival: key.arrival,
        };
        let _ = self.entries.insert(new_key, element);

        Some(new_key)
    }

    /// Iterate over the elements in ascending order of cost.
    pub fn iter(&self) -> impl Iterator<Item = (QueueKey, &T)> + '_ {
        self.entries.iter().map(|(key, element)| (*key, element))
    }
}

#[cfg(test)]
mod tests {
    use super::CostQueue;
    use crate::basic_types::Cost;

    #[test]
    fn pops_cheapest_first() {
        let mut queue = CostQueue::default();
        let _ = queue.push(Cost::new(5.0), 'a');
        let _ = queue.push(Cost::new(1.0), 'b');
        let _ = queue.push(Cost::new(3.0), 'c');

        let popped = std::iter::from_fn(|| queue.pop().map(|(_, element)| element))
            .collect::<Vec<_>>();
        assert_eq!(vec!['b', 'c', 'a'], popped);
    }

    #[test]
    fn ties_are_broken_by_arrival() {
        let mut queue = CostQueue::default();
        let _ = queue.push(Cost::new(2.0), "first");
        let _ = queue.push(Cost::new(2.0), "second");
        let _ = queue.push(Cost::new(1.0), "cheaper");

        let order = queue.iter().map(|(_, element)| *element).collect::<Vec<_>>();
        assert_eq!(vec!["cheaper", "first", "second"], order);
    }

    #[test]
    fn rekey_keeps_arrival_order() {
        let mut queue = CostQueue::default();
        let first = queue.push(Cost::new(4.0), "first");
        let _ = queue.push(Cost::new(2.0), "second");

        let moved = queue.rekey(first, Cost::new(2.0)).expect("element is present");

        assert_eq!(Cost::new(2.0), moved.cost());
        assert_eq!(Some((moved, &"first")), queue.peek());
        assert_eq!(None, queue.rekey(first, Cost::ZERO));
    }
}
