use crate::store::Line;

/// Per line, the number of sources that currently have a breakpoint there.
///
/// This is checked for every executed line of guest code, before anything
/// touches a hash map. Only [`BreakpointStore`](crate::BreakpointStore)
/// mutates it, and it keeps registrations and unregistrations symmetric.
#[derive(Clone, Debug, Default)]
pub struct ActivationIndex {
    counts: Vec<u32>,
}

impl ActivationIndex {
    #[inline]
    #[must_use]
    pub fn may_have_breakpoint(&self, line: Line) -> bool {
        self.counts.get(line).map_or(false, |count| *count > 0)
    }

    #[must_use]
    pub fn count(&self, line: Line) -> u32 {
        self.counts.get(line).copied().unwrap_or_default()
    }

    /// The number of lines covered, which is one more than the highest line
    /// ever registered since the last reset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }
    /// Whether no line has any breakpoint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|count| *count == 0)
    }

    /// Makes room for `line`. Returns `false` if the index can't grow that
    /// far, in which case nothing changes.
    pub(crate) fn grow_to(&mut self, line: Line) -> bool {
        if line < self.counts.len() {
            return true;
        }
        let Some(len) = line.checked_add(1) else {
            return false;
        };
        if self.counts.try_reserve_exact(len - self.counts.len()).is_err() {
            return false;
        }
        self.counts.resize(len, 0);
        true
    }

    /// The line must be covered by a preceding [`grow_to`](Self::grow_to).
    pub(crate) fn register(&mut self, line: Line) {
        match self.counts.get_mut(line) {
            Some(count) => *count += 1,
            None => debug_assert!(false, "Registered line {line} outside of the index."),
        }
    }
    pub(crate) fn unregister(&mut self, line: Line) {
        match self.counts.get_mut(line) {
            Some(count) if *count > 0 => *count -= 1,
            _ => debug_assert!(false, "Unregistered line {line} that was never registered."),
        }
    }
    pub(crate) fn reset(&mut self) {
        self.counts.clear();
    }
}

#[cfg(test)]
mod test {
    use super::ActivationIndex;

    #[test]
    fn empty_index_rejects_everything() {
        let index = ActivationIndex::default();
        assert!(index.is_empty());
        assert!(!index.may_have_breakpoint(0));
        assert!(!index.may_have_breakpoint(usize::MAX));
    }

    #[test]
    fn grows_to_exactly_the_registered_line() {
        let mut index = ActivationIndex::default();
        assert!(index.grow_to(7));
        index.register(7);
        assert_eq!(index.len(), 8);
        assert!(index.grow_to(3));
        index.register(3);
        assert_eq!(index.len(), 8);

        assert!(index.may_have_breakpoint(7));
        assert!(index.may_have_breakpoint(3));
        assert!(!index.may_have_breakpoint(5));
        assert!(!index.may_have_breakpoint(8));
    }

    #[test]
    fn refuses_lines_it_cant_cover() {
        let mut index = ActivationIndex::default();
        assert!(index.grow_to(2));
        index.register(2);

        assert!(!index.grow_to(usize::MAX));
        assert!(!index.grow_to(usize::MAX / 2));
        assert_eq!(index.len(), 3);
        assert!(index.may_have_breakpoint(2));
        assert!(!index.may_have_breakpoint(usize::MAX));
    }

    #[test]
    fn counts_registrations_per_line() {
        let mut index = ActivationIndex::default();
        assert!(index.grow_to(4));
        index.register(4);
        index.register(4);
        assert_eq!(index.count(4), 2);

        index.unregister(4);
        assert!(index.may_have_breakpoint(4));
        index.unregister(4);
        assert!(!index.may_have_breakpoint(4));
        assert!(index.is_empty());
        // Shrinking never happens outside of resets.
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn reset_forgets_everything() {
        let mut index = ActivationIndex::default();
        for line in [1, 100] {
            assert!(index.grow_to(line));
            index.register(line);
        }
        index.reset();
        assert_eq!(index.len(), 0);
        assert!(!index.may_have_breakpoint(1));
        assert!(!index.may_have_breakpoint(100));
    }
}
