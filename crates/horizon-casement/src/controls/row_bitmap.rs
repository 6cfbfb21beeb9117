//! Growable per-row bit set for owner-data lists, whose rows have no object
//! of their own to carry a selection flag.

/// A bit per row, sized to the row count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowBitmap {
    words: Vec<u64>,
    len: usize,
}

impl RowBitmap {
    /// Create an empty bitmap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the bitmap covers no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resize to `len` rows. Bits beyond the new length are dropped, so
    /// growing again later starts them cleared.
    pub fn resize(&mut self, len: usize) {
        self.words.resize(len.div_ceil(64), 0);
        if let Some(last) = self.words.last_mut()
            && len % 64 != 0
        {
            *last &= (1u64 << (len % 64)) - 1;
        }
        self.len = len;
    }

    /// Whether row `index` is set. Rows out of range are never set.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        index < self.len && self.words[index / 64] & (1 << (index % 64)) != 0
    }

    /// Set or clear row `index`. Returns whether the bit changed.
    pub fn set(&mut self, index: usize, value: bool) -> bool {
        if index >= self.len {
            return false;
        }
        let word = &mut self.words[index / 64];
        let mask = 1u64 << (index % 64);
        let old = *word & mask != 0;
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
        old != value
    }

    /// Flip row `index`. Returns the new value.
    pub fn toggle(&mut self, index: usize) -> bool {
        let value = !self.get(index);
        self.set(index, value);
        self.get(index)
    }

    /// Set every row in `start..=end` (either order).
    pub fn set_range(&mut self, start: usize, end: usize, value: bool) {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        for index in start..=end.min(self.len.saturating_sub(1)) {
            self.set(index, value);
        }
    }

    /// Clear every row.
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|word| *word = 0);
    }

    /// Number of set rows.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Indices of the set rows, ascending.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(word_index, &word)| {
            (0..64)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| word_index * 64 + bit)
        })
    }
}
