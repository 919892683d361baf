//! Index ranges along one image axis.

use crate::util::{ImageError, ImageResult};

/// An inclusive index range `start..=stop` taken every `step` elements.
///
/// Negative `start` and `stop` count from the end of the axis (`-1` is the
/// last element) and are resolved by [`Range::fix`]. When `start > stop` the
/// range runs backwards. The default range covers the whole axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
    /// First index included in the range.
    pub start: isize,
    /// Last index included in the range (reached only if `step` lands on it).
    pub stop: isize,
    /// Distance between consecutive indices; must be nonzero.
    pub step: usize,
}

impl Default for Range {
    fn default() -> Self {
        Self::all()
    }
}

impl Range {
    /// All elements.
    pub const fn all() -> Self {
        Self {
            start: 0,
            stop: -1,
            step: 1,
        }
    }

    /// A single index.
    pub const fn single(index: isize) -> Self {
        Self {
            start: index,
            stop: index,
            step: 1,
        }
    }

    /// `start..=stop` with unit step.
    pub const fn new(start: isize, stop: isize) -> Self {
        Self {
            start,
            stop,
            step: 1,
        }
    }

    /// `start..=stop` every `step` elements.
    pub const fn with_step(start: isize, stop: isize, step: usize) -> Self {
        Self { start, stop, step }
    }

    /// Resolves end-relative indices against an axis of length `size` and validates them.
    pub fn fix(&mut self, size: usize) -> ImageResult<()> {
        if self.step == 0 {
            return Err(ImageError::ParameterOutOfRange("range step must be nonzero"));
        }
        let sz = isize::try_from(size).map_err(|_| ImageError::SizeOverflow)?;
        let resolve = |index: isize| if index < 0 { index + sz } else { index };
        let (start, stop) = (resolve(self.start), resolve(self.stop));
        for index in [start, stop] {
            if index < 0 || index >= sz {
                return Err(ImageError::IndexOutOfRange { index, size });
            }
        }
        self.start = start;
        self.stop = stop;
        Ok(())
    }

    /// Number of indices in the range. Only meaningful after `fix`.
    ///
    /// A zero step counts as one.
    pub fn size(&self) -> usize {
        1 + self.start.abs_diff(self.stop) / self.step.max(1)
    }

    /// The first index. Only meaningful after `fix`.
    pub fn offset(&self) -> usize {
        self.start as usize
    }

    /// The signed step: negative when the range runs backwards.
    pub fn step(&self) -> isize {
        let step = self.step as isize;
        if self.start > self.stop {
            -step
        } else {
            step
        }
    }

    /// Iterates over the resolved indices. Only meaningful after `fix`.
    pub fn iter(&self) -> RangeIter {
        RangeIter {
            next: self.start,
            step: self.step(),
            remaining: self.size(),
        }
    }
}

/// Iterator over the indices of a fixed [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    next: isize,
    step: isize,
    remaining: usize,
}

impl Iterator for RangeIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.next as usize;
        self.remaining -= 1;
        self.next += self.step;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RangeIter {}

impl IntoIterator for &Range {
    type Item = usize;
    type IntoIter = RangeIter;

    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Range;
    use crate::ImageError;

    #[test]
    fn default_range_covers_axis() {
        let mut range = Range::default();
        range.fix(5).unwrap();
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn negative_single_index_is_last_element() {
        let mut range = Range::single(-1);
        range.fix(7).unwrap();
        assert_eq!(range.size(), 1);
        assert_eq!(range.offset(), 6);
    }

    #[test]
    fn backwards_range_has_negative_step() {
        let mut range = Range::with_step(9, 2, 3);
        range.fix(10).unwrap();
        assert_eq!(range.step(), -3);
        assert_eq!(range.size(), 3);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![9, 6, 3]);
    }

    #[test]
    fn step_may_stop_short_of_stop() {
        let mut range = Range::with_step(0, 9, 4);
        range.fix(10).unwrap();
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![0, 4, 8]);
    }

    #[test]
    fn fix_rejects_zero_step_and_out_of_range() {
        let mut zero = Range::with_step(0, 3, 0);
        assert!(matches!(
            zero.fix(5),
            Err(ImageError::ParameterOutOfRange(_))
        ));

        let mut beyond = Range::new(0, 5);
        assert_eq!(
            beyond.fix(5),
            Err(ImageError::IndexOutOfRange { index: 5, size: 5 })
        );

        let mut before = Range::new(-6, 2);
        assert_eq!(
            before.fix(5),
            Err(ImageError::IndexOutOfRange { index: -1, size: 5 })
        );
    }

    #[test]
    fn failed_fix_leaves_the_range_untouched() {
        let mut range = Range::new(-2, 9);
        assert_eq!(
            range.fix(5),
            Err(ImageError::IndexOutOfRange { index: 9, size: 5 })
        );
        assert_eq!(range, Range::new(-2, 9));
        range.stop = -1;
        range.fix(5).unwrap();
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![3, 4]);

        let zero = Range::with_step(2, 4, 0);
        assert_eq!(zero.size(), 3);
    }
}
