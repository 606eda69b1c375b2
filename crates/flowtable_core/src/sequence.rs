//! Bounded FIFO sequence.
//!
//! [`BoundedSequence`] backs the committed rows, the draft rows and the
//! key index of a table. When a capacity is set, appending past it evicts
//! the oldest elements, and the evicted elements are handed back to the
//! caller so it can release whatever they reference.

use crate::error::{FlowError, FlowResult};
use std::collections::VecDeque;

/// An ordered container with an optional maximum length.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedSequence<T> {
    items: VecDeque<T>,
    capacity: Option<usize>,
}

impl<T> BoundedSequence<T> {
    /// Creates an empty sequence.
    ///
    /// # Errors
    ///
    /// `InvalidCapacity` if the capacity is `Some(0)`.
    pub fn new(capacity: Option<usize>) -> FlowResult<Self> {
        if capacity == Some(0) {
            return Err(FlowError::InvalidCapacity { capacity: 0 });
        }
        Ok(Self {
            items: VecDeque::new(),
            capacity,
        })
    }

    /// Creates an empty sequence without a capacity.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            items: VecDeque::new(),
            capacity: None,
        }
    }

    /// Creates a sequence holding `items`.
    ///
    /// # Errors
    ///
    /// `InvalidCapacity` if the capacity is `Some(0)`, `CapacityExceeded`
    /// if the items do not fit.
    pub fn with_items(items: impl IntoIterator<Item = T>, capacity: Option<usize>) -> FlowResult<Self> {
        let mut seq = Self::new(capacity)?;
        seq.items.extend(items);
        if let Some(cap) = capacity {
            if seq.items.len() > cap {
                return Err(FlowError::CapacityExceeded {
                    requested: seq.items.len(),
                    capacity: cap,
                });
            }
        }
        Ok(seq)
    }

    /// Returns the capacity, if bounded.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Appends an item, evicting the oldest one if the sequence is full.
    ///
    /// Returns the evicted item.
    pub fn append(&mut self, item: T) -> Option<T> {
        let evicted = match self.capacity {
            Some(cap) if self.items.len() >= cap => self.items.pop_front(),
            _ => None,
        };
        self.items.push_back(item);
        evicted
    }

    /// Appends a batch, evicting the oldest items until the batch fits.
    ///
    /// Returns the evicted items, oldest first. Nothing is evicted or
    /// appended when the batch is rejected.
    ///
    /// # Errors
    ///
    /// `CapacityExceeded` if the batch alone is longer than the capacity.
    pub fn append_many(&mut self, items: impl IntoIterator<Item = T>) -> FlowResult<Vec<T>> {
        let batch: Vec<T> = items.into_iter().collect();
        let mut evicted = Vec::new();
        if let Some(cap) = self.capacity {
            if batch.len() > cap {
                return Err(FlowError::CapacityExceeded {
                    requested: batch.len(),
                    capacity: cap,
                });
            }
            while self.items.len() + batch.len() > cap {
                match self.items.pop_front() {
                    Some(item) => evicted.push(item),
                    None => break,
                }
            }
        }
        self.items.extend(batch);
        Ok(evicted)
    }

    /// Returns the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Returns the oldest item.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.items.front()
    }

    /// Returns the newest item.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the sequence holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Keeps only the items matching the predicate, preserving order.
    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.items.retain(f);
    }

    /// Removes and returns every item, oldest first.
    pub fn drain_all(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    /// Returns true if an equal item is present.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.items.contains(item)
    }

    /// Copies the items into a vector, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.iter().cloned().collect()
    }
}

impl<T> Default for BoundedSequence<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<'a, T> IntoIterator for &'a BoundedSequence<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            BoundedSequence::<u8>::new(Some(0)).unwrap_err(),
            FlowError::InvalidCapacity { capacity: 0 }
        );
        assert!(BoundedSequence::<u8>::new(None).is_ok());
    }

    #[test]
    fn append_evicts_oldest() {
        let mut seq = BoundedSequence::new(Some(2)).unwrap();
        assert_eq!(seq.append(1), None);
        assert_eq!(seq.append(2), None);
        assert_eq!(seq.append(3), Some(1));
        assert_eq!(seq.to_vec(), vec![2, 3]);
        assert_eq!(seq.first(), Some(&2));
        assert_eq!(seq.last(), Some(&3));
    }

    #[test]
    fn append_many_evicts_until_batch_fits() {
        let mut seq = BoundedSequence::with_items([1, 2, 3], Some(4)).unwrap();
        let evicted = seq.append_many([4, 5, 6]).unwrap();
        assert_eq!(evicted, vec![1, 2]);
        assert_eq!(seq.to_vec(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn oversized_batch_is_rejected_untouched() {
        let mut seq = BoundedSequence::with_items([1], Some(2)).unwrap();
        let err = seq.append_many([7, 8, 9]).unwrap_err();
        assert_eq!(
            err,
            FlowError::CapacityExceeded {
                requested: 3,
                capacity: 2
            }
        );
        assert_eq!(seq.to_vec(), vec![1]);
    }

    #[test]
    fn with_items_checks_capacity() {
        assert!(matches!(
            BoundedSequence::with_items([1, 2, 3], Some(2)),
            Err(FlowError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn unbounded_never_evicts() {
        let mut seq = BoundedSequence::unbounded();
        for i in 0..1000 {
            assert_eq!(seq.append(i), None);
        }
        assert_eq!(seq.len(), 1000);
        assert!(seq.contains(&999));
        seq.retain(|i| i % 2 == 0);
        assert_eq!(seq.len(), 500);
        assert_eq!(seq.drain_all().len(), 500);
        assert!(seq.is_empty());
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity(cap in 1usize..16, ops in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..8), 0..32)) {
            let mut seq = BoundedSequence::new(Some(cap)).unwrap();
            let mut appended = 0usize;
            let mut evicted = 0usize;
            for batch in ops {
                if batch.len() == 1 {
                    evicted += usize::from(seq.append(batch[0]).is_some());
                    appended += 1;
                } else if let Ok(out) = seq.append_many(batch.clone()) {
                    evicted += out.len();
                    appended += batch.len();
                } else {
                    prop_assert!(batch.len() > cap);
                }
                prop_assert!(seq.len() <= cap);
            }
            prop_assert_eq!(seq.len(), appended - evicted);
        }

        #[test]
        fn keeps_newest_in_order(cap in 1usize..8, items in prop::collection::vec(any::<u16>(), 0..64)) {
            let mut seq = BoundedSequence::new(Some(cap)).unwrap();
            for item in &items {
                seq.append(*item);
            }
            let start = items.len().saturating_sub(cap);
            prop_assert_eq!(seq.to_vec(), items[start..].to_vec());
        }
    }
}
