//! Binary min-heap keyed by `f64` priorities.
//!
//! Payloads are opaque. Ties between equal keys come out in no particular order.
//! The backing `Vec` grows by doubling, so inserts are amortized `O(log n)`.

#[derive(Clone, Debug)]
struct Entry<T> {
    key: f64,
    payload: T,
}

/// Min-heap over `(key, payload)` pairs.
#[derive(Clone, Debug)]
pub struct MinHeap<T> {
    tree: Vec<Entry<T>>,
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn parent(i: usize) -> usize {
    (i - 1) / 2
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        Self { tree: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn insert(&mut self, key: f64, payload: T) {
        self.tree.push(Entry { key, payload });
        self.sift_up(self.tree.len() - 1);
    }

    /// Remove the minimum, returning its key and payload.
    pub fn remove_min(&mut self) -> Option<(f64, T)> {
        if self.tree.is_empty() {
            return None;
        }
        let last = self.tree.len() - 1;
        self.tree.swap(0, last);
        let top = self.tree.pop()?;
        self.sift_down(0);
        Some((top.key, top.payload))
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = parent(i);
            if self.tree[i].key < self.tree[p].key {
                self.tree.swap(i, p);
                i = p;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.tree.len();
        loop {
            let l = 2 * i + 1;
            let r = l + 1;
            let mut next = i;
            if l < n && self.tree[l].key < self.tree[next].key {
                next = l;
            }
            if r < n && self.tree[r].key < self.tree[next].key {
                next = r;
            }
            if next == i {
                return;
            }
            self.tree.swap(i, next);
            i = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn empty_heap_yields_none() {
        let mut h: MinHeap<u32> = MinHeap::new();
        assert!(h.remove_min().is_none());
        assert!(h.is_empty());
    }

    #[test]
    fn drains_in_nondecreasing_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut h = MinHeap::new();
        for i in 0..500usize {
            h.insert(rng.gen_range(-50.0..50.0), i);
        }
        // Duplicate keys are allowed.
        h.insert(1.5, 1000);
        h.insert(1.5, 1001);
        assert_eq!(h.len(), 502);
        let mut last = f64::NEG_INFINITY;
        let mut seen = 0;
        while let Some((k, _)) = h.remove_min() {
            assert!(k >= last);
            last = k;
            seen += 1;
        }
        assert_eq!(seen, 502);
        assert!(h.is_empty());
    }

    #[test]
    fn interleaved_insert_and_remove() {
        let mut h = MinHeap::new();
        h.insert(3.0, 'c');
        h.insert(1.0, 'a');
        assert_eq!(h.remove_min(), Some((1.0, 'a')));
        h.insert(2.0, 'b');
        h.insert(0.5, 'z');
        assert_eq!(h.len(), 3);
        assert_eq!(h.remove_min(), Some((0.5, 'z')));
        assert_eq!(h.remove_min(), Some((2.0, 'b')));
        assert_eq!(h.remove_min(), Some((3.0, 'c')));
    }
}
