use std::marker::PhantomData;

use super::StorageKey;

/// Generates a sequence of [`StorageKey`]s.
///
/// Keys are handed out in increasing order, which makes a generator usable as an arrival counter
/// as well.
#[derive(Clone, Copy, Debug)]
pub struct KeyGenerator<Key> {
    key: PhantomData<Key>,
    counter: usize,
}

impl<Key> Default for KeyGenerator<Key> {
    fn default() -> Self {
        Self {
            key: Default::default(),
            counter: Default::default(),
        }
    }
}

impl<Key: StorageKey> KeyGenerator<Key> {
    /// Generate a new `Key`.
    pub fn next_key(&mut self) -> Key {
        let key = Key::create_from_index(self.counter);
        self.counter += 1;
        key
    }

    /// The number of keys which have been generated so far.
    pub fn num_generated(&self) -> usize {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::KeyGenerator;

    #[test]
    fn keys_are_handed_out_in_order() {
        let mut generator = KeyGenerator::<usize>::default();

        assert_eq!(0, generator.next_key());
        assert_eq!(1, generator.next_key());
        assert_eq!(2, generator.next_key());
        assert_eq!(3, generator.num_generated());
    }
}
