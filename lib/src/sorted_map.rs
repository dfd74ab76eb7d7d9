/// Associative container over a contiguous vector of `(key, value)` pairs.
///
/// Chosen over a tree map because the workloads here are bulk-load-then-query
/// and iteration should be cache friendly. The container has two states:
/// *unsorted* (append only, via [`SortedVec::push`]) and *sorted* (binary
/// searchable, after [`SortedVec::sort`]). Looking up in the unsorted state is
/// a programmer error and panics.
#[derive(Debug, Clone)]
pub struct SortedVec<K, V> {
    entries: Vec<(K, V)>,
    sorted: bool,
}

impl<K: Ord, V> SortedVec<K, V> {
    /// Creates an empty container, trivially sorted
    pub fn new() -> Self {
        SortedVec {
            entries: Vec::new(),
            sorted: true,
        }
    }

    /// Creates an empty container with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        SortedVec {
            entries: Vec::with_capacity(capacity),
            sorted: true,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry, leaving the container unsorted
    pub fn push(&mut self, key: K, value: V) {
        self.entries.push((key, value));
        self.sorted = false;
    }

    /// Sorts the entries by key (stable), enabling lookups
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        self.sorted = true;
    }

    /// Asserts the entries are already in key order, enabling lookups without
    /// a sort. Used for images loaded from pre-sorted files.
    pub fn assert_sorted(&mut self) {
        assert!(
            self.entries.windows(2).all(|pair| pair[0].0 <= pair[1].0),
            "entries are not sorted"
        );
        self.sorted = true;
    }

    fn search(&self, key: &K) -> Result<usize, usize> {
        assert!(self.sorted, "lookup on an unsorted container");
        self.entries.binary_search_by(|entry| entry.0.cmp(key))
    }

    /// Index of `key`, if present
    pub fn find(&self, key: &K) -> Option<usize> {
        self.search(key).ok()
    }

    /// True if `key` is present
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Value associated with `key`, if present
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|index| &self.entries[index].1)
    }

    /// Inserts keeping the key order, O(n). For the rare incremental update,
    /// bulk loads should `push` then `sort`.
    pub fn insort(&mut self, key: K, value: V) {
        assert!(self.sorted, "insort on an unsorted container");
        let index = match self.search(&key) {
            Ok(index) => index,
            Err(index) => index,
        };
        self.entries.insert(index, (key, value));
    }

    /// Removes and returns the entry at `index`
    pub fn remove(&mut self, index: usize) -> (K, V) {
        self.entries.remove(index)
    }

    /// Key of the entry at `index`
    pub fn key(&self, index: usize) -> &K {
        &self.entries[index].0
    }

    /// Value of the entry at `index`
    pub fn value(&self, index: usize) -> &V {
        &self.entries[index].1
    }

    /// Mutable value of the entry at `index`
    pub fn value_mut(&mut self, index: usize) -> &mut V {
        &mut self.entries[index].1
    }

    /// Iterates entries in storage order (key order once sorted)
    pub fn iter(&self) -> impl Iterator<Item = &(K, V)> {
        self.entries.iter()
    }
}

impl<K: Ord, V> Default for SortedVec<K, V> {
    fn default() -> Self {
        SortedVec::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_build_then_query() {
        let mut map = SortedVec::new();
        map.push(3u32, "three");
        map.push(1u32, "one");
        map.push(2u32, "two");
        map.sort();

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&1), Some(&"one"));
        assert_eq!(map.get(&2), Some(&"two"));
        assert_eq!(map.get(&3), Some(&"three"));
        assert_eq!(map.get(&4), None);
        assert!(map.contains(&2));

        let keys: Vec<u32> = map.iter().map(|entry| entry.0).collect();
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "unsorted")]
    fn test_lookup_unsorted() {
        let mut map = SortedVec::new();
        map.push(1u32, ());
        map.find(&1);
    }

    #[test]
    fn test_insort_remove() {
        let mut map = SortedVec::new();
        map.insort(2u32, "two");
        map.insort(1u32, "one");
        map.insort(3u32, "three");

        let keys: Vec<u32> = map.iter().map(|entry| entry.0).collect();
        assert_eq!(keys, vec![1, 2, 3]);

        let index = map.find(&2).unwrap();
        assert_eq!(map.remove(index), (2, "two"));
        assert_eq!(map.get(&2), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_assert_sorted() {
        let mut map = SortedVec::new();
        map.push(1u32, ());
        map.push(2u32, ());
        map.assert_sorted();
        assert!(map.contains(&2));
    }

    #[test]
    #[should_panic(expected = "not sorted")]
    fn test_assert_sorted_panics() {
        let mut map = SortedVec::new();
        map.push(2u32, ());
        map.push(1u32, ());
        map.assert_sorted();
    }
}
