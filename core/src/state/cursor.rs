//! Forward-only byte cursor feeding a machine's state scan

use crate::machine::StateSource;

/// Read position over a snapshot payload.
///
/// Never rewinds. An area request larger than what is left receives the
/// remaining bytes followed by zeroes, and the cursor records the underrun
/// so the load can be failed once the scan has finished.
#[derive(Debug)]
pub struct ScanCursor<'a> {
    remaining: &'a [u8],
    consumed: usize,
    requested: usize,
    underrun: bool,
}

impl<'a> ScanCursor<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            remaining: payload,
            consumed: 0,
            requested: 0,
            underrun: false,
        }
    }

    /// Bytes handed out so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Total bytes requested by the machine, including unsatisfied ones
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Bytes not yet handed out
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Whether any request could not be fully satisfied
    pub fn underrun(&self) -> bool {
        self.underrun
    }
}

impl StateSource for ScanCursor<'_> {
    fn fill(&mut self, destination: &mut [u8]) -> usize {
        let wanted = destination.len();
        let available = wanted.min(self.remaining.len());

        let (head, tail) = self.remaining.split_at(available);
        destination[..available].copy_from_slice(head);
        destination[available..].fill(0);

        self.remaining = tail;
        self.consumed += available;
        self.requested += wanted;
        if available < wanted {
            self.underrun = true;
        }
        available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_exact() {
        let payload = [1u8, 2, 3, 4, 5, 6];
        let mut cursor = ScanCursor::new(&payload);

        let mut a = [0u8; 2];
        let mut b = [0u8; 4];
        assert_eq!(cursor.fill(&mut a), 2);
        assert_eq!(cursor.fill(&mut b), 4);

        assert_eq!(a, [1, 2]);
        assert_eq!(b, [3, 4, 5, 6]);
        assert_eq!(cursor.consumed(), 6);
        assert_eq!(cursor.remaining(), 0);
        assert!(!cursor.underrun());
    }

    #[test]
    fn test_partial_fill_zeroes_tail() {
        let payload = [9u8, 8, 7];
        let mut cursor = ScanCursor::new(&payload);

        let mut area = [0xFFu8; 5];
        assert_eq!(cursor.fill(&mut area), 3);
        assert_eq!(area, [9, 8, 7, 0, 0]);
        assert!(cursor.underrun());
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_exhausted_cursor_zero_fills() {
        let mut cursor = ScanCursor::new(&[]);
        let mut area = [0xAAu8; 3];
        assert_eq!(cursor.fill(&mut area), 0);
        assert_eq!(area, [0, 0, 0]);
        assert!(cursor.underrun());
        assert_eq!(cursor.requested(), 3);
    }

    #[test]
    fn test_empty_request_is_not_underrun() {
        let mut cursor = ScanCursor::new(&[]);
        assert_eq!(cursor.fill(&mut []), 0);
        assert!(!cursor.underrun());
    }

    #[test]
    fn test_underrun_is_sticky() {
        let payload = [1u8, 2];
        let mut cursor = ScanCursor::new(&payload);
        let mut big = [0u8; 4];
        cursor.fill(&mut big);
        let mut empty: [u8; 0] = [];
        cursor.fill(&mut empty);
        assert!(cursor.underrun());
        assert_eq!(cursor.consumed(), 2);
        assert_eq!(cursor.requested(), 4);
    }
}
