use std::iter::repeat;

const BITS: usize = 64;

/// One liveness bit per slot, packed into 64-bit words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistenceBits {
    words: Vec<u64>,
    len: usize,
}

impl ExistenceBits {
    /// Create a bitmap of `len` cleared bits.
    pub fn with_len(len: usize) -> Self {
        let mut bits = Self::default();
        bits.grow(len);
        bits
    }

    /// Number of addressable bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Extend to `new_len` bits; the new bits start cleared.
    pub fn grow(&mut self, new_len: usize) {
        debug_assert!(new_len >= self.len, "existence bitmap never shrinks");
        let needed = new_len.div_ceil(BITS);
        if needed > self.words.len() {
            let extra = needed - self.words.len();
            self.words.extend(repeat(0).take(extra));
        }
        self.len = new_len;
    }

    /// Value of bit `i`; false for anything out of range.
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        if i >= self.len {
            return false;
        }
        let (word, shift) = Self::pos_shift(i);
        self.words[word] & (1u64 << shift) != 0
    }

    #[inline]
    pub fn set(&mut self, i: usize) {
        debug_assert!(i < self.len, "bit {i} out of range ({})", self.len);
        let (word, shift) = Self::pos_shift(i);
        self.words[word] |= 1u64 << shift;
    }

    #[inline]
    pub fn unset(&mut self, i: usize) {
        debug_assert!(i < self.len, "bit {i} out of range ({})", self.len);
        let (word, shift) = Self::pos_shift(i);
        self.words[word] &= !(1u64 << shift);
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// First set bit at or after `start`.
    ///
    /// Whole zero words are skipped, so a sparse bitmap costs one load per
    /// 64 cleared slots.
    pub fn next_set(&self, start: usize) -> Option<usize> {
        if start >= self.len {
            return None;
        }
        let (mut word, shift) = Self::pos_shift(start);
        let mut current = self.words[word] & (u64::MAX << shift);
        loop {
            if current != 0 {
                let i = word * BITS + current.trailing_zeros() as usize;
                return (i < self.len).then_some(i);
            }
            word += 1;
            if word >= self.words.len() {
                return None;
            }
            current = self.words[word];
        }
    }

    /// Iterate the indices of set bits in ascending order.
    pub fn iter_ones(&self) -> Ones<'_> {
        Ones { bits: self, next: 0 }
    }

    #[inline(always)]
    fn pos_shift(i: usize) -> (usize, usize) {
        (i / BITS, i % BITS)
    }
}

/// Ascending iterator over set bits.
pub struct Ones<'a> {
    bits: &'a ExistenceBits,
    next: usize,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let i = self.bits.next_set(self.next)?;
        self.next = i + 1;
        Some(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_unset() {
        let mut bits = ExistenceBits::with_len(130);
        assert_eq!(bits.len(), 130);
        bits.set(0);
        bits.set(64);
        bits.set(129);
        assert!(bits.get(0) && bits.get(64) && bits.get(129));
        assert!(!bits.get(1));
        assert!(!bits.get(130));
        assert!(!bits.get(usize::MAX));
        bits.unset(64);
        assert!(!bits.get(64));
        assert_eq!(bits.count_ones(), 2);
    }

    #[test]
    fn next_set_skips_empty_words() {
        let mut bits = ExistenceBits::with_len(1000);
        bits.set(3);
        bits.set(700);
        assert_eq!(bits.next_set(0), Some(3));
        assert_eq!(bits.next_set(3), Some(3));
        assert_eq!(bits.next_set(4), Some(700));
        assert_eq!(bits.next_set(701), None);
        assert_eq!(bits.next_set(5000), None);
    }

    #[test]
    fn iter_ones_is_ascending() {
        let mut bits = ExistenceBits::with_len(200);
        for i in [199, 5, 63, 64, 128] {
            bits.set(i);
        }
        assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![5, 63, 64, 128, 199]);
    }

    #[test]
    fn grow_keeps_existing_bits() {
        let mut bits = ExistenceBits::with_len(10);
        bits.set(9);
        bits.grow(100);
        assert!(bits.get(9));
        assert!(!bits.get(99));
        bits.set(99);
        assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![9, 99]);
    }
}
