use std::mem;

/// A slot of the slab.
enum Entry<T> {
    Vacant,
    Occupied(T),

    /// The value is temporarily moved out (e.g. while a future is polled);
    /// the index stays reserved until it is restored or released.
    CheckedOut,
}

/// Indexed storage with reuse of freed slots.
///
/// Values can be checked out and restored under the same index, so the
/// owner of a value may insert new values into the slab while it holds one.
pub(crate) struct Slab<T> {
    /// Storage for entries.
    entries: Vec<Entry<T>>,
    /// Stack of vacant indices that can be reused.
    free: Vec<usize>,
    /// Number of non-vacant entries.
    live: usize,
}

impl<T> Slab<T> {
    /// Creates an empty slab able to hold `capacity` values without growing.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Inserts a value and returns its index.
    pub(crate) fn insert(&mut self, item: T) -> usize {
        self.live += 1;

        match self.free.pop() {
            Some(index) => {
                self.entries[index] = Entry::Occupied(item);
                index
            }
            None => {
                self.entries.push(Entry::Occupied(item));
                self.entries.len() - 1
            }
        }
    }

    /// Moves the value at `index` out, keeping the index reserved.
    ///
    /// Returns `None` if the slot is vacant or already checked out.
    pub(crate) fn checkout(&mut self, index: usize) -> Option<T> {
        let entry = self.entries.get_mut(index)?;

        match mem::replace(entry, Entry::CheckedOut) {
            Entry::Occupied(item) => Some(item),
            other => {
                *entry = other;
                None
            }
        }
    }

    /// Puts a checked-out value back under its index.
    pub(crate) fn restore(&mut self, index: usize, item: T) {
        if let Some(entry) = self.entries.get_mut(index) {
            if matches!(entry, Entry::CheckedOut) {
                *entry = Entry::Occupied(item);
            }
        }
    }

    /// Frees a checked-out index for reuse.
    pub(crate) fn release(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            if matches!(entry, Entry::CheckedOut) {
                *entry = Entry::Vacant;
                self.free.push(index);
                self.live -= 1;
            }
        }
    }

    /// Number of stored or checked-out values.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.live == 0
    }
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
