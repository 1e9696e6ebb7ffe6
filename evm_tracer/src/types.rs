use bytes::Bytes;

/// A contiguous byte window `[offset, offset + size)`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Range {
    pub offset: u64,
    pub size: u64,
}

impl Range {
    pub const EMPTY: Self = Self { offset: 0, size: 0 };

    pub const fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// One past the last byte of the window, saturating at `u64::MAX`.
    pub const fn end(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }
}

/// A window into the memory of a given context, along with a view of the
/// bytes backing it when they are known.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryRange {
    /// Context number of the frame owning the memory.
    pub context_number: usize,
    pub range: Range,
    pub raw_data: Bytes,
}

impl MemoryRange {
    pub const EMPTY: Self = Self {
        context_number: 0,
        range: Range::EMPTY,
        raw_data: Bytes::new(),
    };

    pub const fn new(context_number: usize, offset: u64, size: u64, raw_data: Bytes) -> Self {
        Self {
            context_number,
            range: Range::new(offset, size),
            raw_data,
        }
    }

    /// A window spanning the whole of `raw_data`.
    pub fn whole(context_number: usize, raw_data: Bytes) -> Self {
        let size = raw_data.len() as u64;
        Self::new(context_number, 0, size, raw_data)
    }

    pub const fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The bytes covered by the window, if backed and in bounds.
    pub fn extract(&self) -> Option<Bytes> {
        let start = usize::try_from(self.range.offset).ok()?;
        let end = usize::try_from(self.range.end()).ok()?;
        (end <= self.raw_data.len()).then(|| self.raw_data.slice(start..end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_range() {
        assert!(MemoryRange::EMPTY.is_empty());
        assert_eq!(MemoryRange::EMPTY.extract(), Some(Bytes::new()));
        assert_eq!(MemoryRange::default(), MemoryRange::EMPTY);
    }

    #[test]
    fn extract_window() {
        let memory = MemoryRange::new(3, 2, 3, Bytes::from_static(b"abcdefg"));

        assert_eq!(memory.range.end(), 5);
        assert_eq!(memory.extract(), Some(Bytes::from_static(b"cde")));
    }

    #[test]
    fn out_of_bounds_window_extracts_nothing() {
        let memory = MemoryRange::new(3, 5, 10, Bytes::from_static(b"abcdefg"));

        assert_eq!(memory.extract(), None);
    }

    #[test]
    fn whole_window() {
        let memory = MemoryRange::whole(1, Bytes::from_static(b"calldata"));

        assert_eq!(memory.range, Range::new(0, 8));
        assert_eq!(memory.extract().as_deref(), Some(&b"calldata"[..]));
    }
}
