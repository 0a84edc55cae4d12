/// Number of batches needed to cover `len` contacts: ceil(len / size).
pub fn batch_count(len: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    len.div_ceil(size)
}

/// Position of one batch within the run. Indices are 1-based for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSpan {
    pub index: usize,
    pub total: usize,
    pub start: usize,
    pub end: usize,
}

impl BatchSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
