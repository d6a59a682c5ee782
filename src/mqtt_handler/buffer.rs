//! Line buffer shared between emitters and the flush loop.
//!
//! The lock is held only for a single append or for the swap that hands a
//! whole batch to the flush loop, never across a publish.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use parking_lot::Mutex;

/// Result of appending a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Appended {
    /// Buffer length after the append.
    pub(crate) len: usize,
    /// Whether the oldest line was evicted to make room.
    pub(crate) evicted: bool,
}

#[derive(Debug)]
pub(crate) struct LineBuffer {
    lines: Mutex<VecDeque<String>>,
    ceiling: Option<NonZeroUsize>,
}

impl LineBuffer {
    /// Create a buffer. With a `ceiling`, appends beyond it evict the oldest
    /// line; without one the buffer grows until drained.
    pub(crate) fn new(ceiling: Option<NonZeroUsize>) -> Self {
        Self {
            lines: Mutex::new(VecDeque::new()),
            ceiling,
        }
    }

    pub(crate) fn push(&self, line: String) -> Appended {
        let mut lines = self.lines.lock();
        let evicted = match self.ceiling {
            Some(max) if lines.len() >= max.get() => lines.pop_front().is_some(),
            _ => false,
        };
        lines.push_back(line);
        Appended {
            len: lines.len(),
            evicted,
        }
    }

    /// Swap the buffered lines out, leaving an empty buffer behind.
    pub(crate) fn take(&self) -> Vec<String> {
        let drained = std::mem::take(&mut *self.lines.lock());
        Vec::from(drained)
    }

    pub(crate) fn len(&self) -> usize {
        self.lines.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ceiling(n: usize) -> Option<NonZeroUsize> {
        NonZeroUsize::new(n)
    }

    #[test]
    fn take_preserves_insertion_order_and_empties() {
        let buffer = LineBuffer::new(None);
        for line in ["a", "b", "c"] {
            buffer.push(line.into());
        }
        assert_eq!(buffer.take(), vec!["a", "b", "c"]);
        assert_eq!(buffer.len(), 0);
        assert!(buffer.take().is_empty());
    }

    #[test]
    fn push_reports_length_after_append() {
        let buffer = LineBuffer::new(None);
        assert_eq!(
            buffer.push("a".into()),
            Appended {
                len: 1,
                evicted: false
            }
        );
        assert_eq!(buffer.push("b".into()).len, 2);
    }

    #[test]
    fn unbounded_buffer_never_evicts() {
        let buffer = LineBuffer::new(None);
        let evictions = (0..1_000)
            .filter(|i| buffer.push(i.to_string()).evicted)
            .count();
        assert_eq!(evictions, 0);
        assert_eq!(buffer.len(), 1_000);
    }

    #[test]
    fn ceiling_evicts_oldest_line() {
        let buffer = LineBuffer::new(ceiling(2));
        buffer.push("a".into());
        buffer.push("b".into());
        let appended = buffer.push("c".into());
        assert!(appended.evicted);
        assert_eq!(appended.len, 2);
        assert_eq!(buffer.take(), vec!["b", "c"]);
    }
}
