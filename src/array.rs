//! Small arrays for geometric quantities.
//!
//! `DimensionArray` stores up to four elements inline and spills to the heap
//! beyond that, since image dimensionality rarely exceeds four or five. Every
//! size, stride, coordinate and per-axis parameter in the crate uses it, so
//! stride arithmetic has a single implementation.

use std::fmt;
use std::ops::{Add, Deref, DerefMut, Mul, Sub};

use smallvec::SmallVec;

use crate::util::{ImageError, ImageResult};

const INLINE: usize = 4;

/// Value-semantics array with inline storage for small element counts.
#[derive(Clone, Default, PartialEq)]
pub struct DimensionArray<T> {
    data: SmallVec<[T; INLINE]>,
}

/// Strides, offsets and other signed per-axis quantities.
pub type IntegerArray = DimensionArray<isize>;
/// Sizes, coordinates and dimension lists.
pub type UnsignedArray = DimensionArray<usize>;
/// Per-axis filter parameters.
pub type FloatArray = DimensionArray<f64>;
/// Per-axis flags such as a dimension selection.
pub type BooleanArray = DimensionArray<bool>;

impl<T> DimensionArray<T> {
    /// Creates an empty array.
    pub fn new() -> Self {
        Self {
            data: SmallVec::new(),
        }
    }

    /// Inserts `value` at `index`, shifting later elements up.
    pub fn insert(&mut self, index: usize, value: T) -> ImageResult<()> {
        if index > self.data.len() {
            return Err(ImageError::IndexOutOfRange {
                index: index as isize,
                size: self.data.len() + 1,
            });
        }
        self.data.insert(index, value);
        Ok(())
    }

    /// Removes and returns the element at `index`.
    pub fn remove(&mut self, index: usize) -> ImageResult<T> {
        if index >= self.data.len() {
            return Err(ImageError::IndexOutOfRange {
                index: index as isize,
                size: self.data.len(),
            });
        }
        Ok(self.data.remove(index))
    }

    /// Appends an element.
    pub fn push(&mut self, value: T) {
        self.data.push(value);
    }

    /// Removes all elements.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl<T: Clone> DimensionArray<T> {
    /// Creates an array with `n` copies of `value`.
    pub fn filled(n: usize, value: T) -> Self {
        Self {
            data: SmallVec::from_elem(value, n),
        }
    }

    /// Truncates to `n` elements, or appends copies of `fill` up to `n`.
    pub fn resize(&mut self, n: usize, fill: T) {
        self.data.resize(n, fill);
    }

    /// Brings a per-axis parameter to length `n`.
    ///
    /// An empty array becomes `n` copies of `default`, a single element is
    /// repeated `n` times, and any other length must already equal `n`.
    pub fn broadcast(&mut self, n: usize, default: T) -> ImageResult<()> {
        match self.data.len() {
            0 => self.data.resize(n, default),
            1 => {
                let value = self.data[0].clone();
                self.data.resize(n, value);
            }
            len if len != n => {
                return Err(ImageError::ArrayParameterWrongLength {
                    expected: n,
                    got: len,
                })
            }
            _ => {}
        }
        Ok(())
    }

    /// Returns a copy with elements reordered so that `out[i] = self[order[i]]`.
    pub fn permute(&self, order: &[usize]) -> ImageResult<Self> {
        order
            .iter()
            .map(|&i| {
                self.data
                    .get(i)
                    .cloned()
                    .ok_or(ImageError::IndexOutOfRange {
                        index: i as isize,
                        size: self.data.len(),
                    })
            })
            .collect()
    }
}

impl<T: Copy + Default + Add<Output = T>> DimensionArray<T> {
    /// Sum of all elements (zero for an empty array).
    pub fn sum(&self) -> T {
        self.data.iter().fold(T::default(), |acc, &v| acc + v)
    }
}

impl UnsignedArray {
    /// Product of all elements (one for an empty array).
    pub fn product(&self) -> usize {
        self.data.iter().product()
    }

    /// Product of all elements, or `None` on overflow.
    pub fn checked_product(&self) -> Option<usize> {
        self.data.iter().try_fold(1usize, |acc, &v| acc.checked_mul(v))
    }
}

impl BooleanArray {
    /// Returns true if any element is set.
    pub fn any(&self) -> bool {
        self.data.iter().any(|&b| b)
    }
}

impl<T> Deref for DimensionArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for DimensionArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> FromIterator<T> for DimensionArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for DimensionArray<T> {
    type Item = T;
    type IntoIter = smallvec::IntoIter<[T; INLINE]>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a DimensionArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<T: Clone> From<&[T]> for DimensionArray<T> {
    fn from(values: &[T]) -> Self {
        Self {
            data: values.iter().cloned().collect(),
        }
    }
}

impl<T, const N: usize> From<[T; N]> for DimensionArray<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T> From<Vec<T>> for DimensionArray<T> {
    fn from(values: Vec<T>) -> Self {
        Self {
            data: SmallVec::from_vec(values),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DimensionArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for DimensionArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, value) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("}")
    }
}

fn zip_with<T: Copy>(
    lhs: &DimensionArray<T>,
    rhs: &DimensionArray<T>,
    op: impl Fn(T, T) -> T,
) -> ImageResult<DimensionArray<T>> {
    if lhs.len() != rhs.len() {
        return Err(ImageError::ArrayParameterWrongLength {
            expected: lhs.len(),
            got: rhs.len(),
        });
    }
    Ok(lhs.iter().zip(rhs.iter()).map(|(&a, &b)| op(a, b)).collect())
}

macro_rules! elementwise_op {
    ($trait:ident, $method:ident) => {
        impl<T: Copy + $trait<Output = T>> $trait for &DimensionArray<T> {
            type Output = ImageResult<DimensionArray<T>>;

            fn $method(self, rhs: Self) -> Self::Output {
                zip_with(self, rhs, |a, b| a.$method(b))
            }
        }
    };
}

elementwise_op!(Add, add);
elementwise_op!(Sub, sub);
elementwise_op!(Mul, mul);

#[cfg(test)]
mod tests {
    use super::{FloatArray, IntegerArray, UnsignedArray};
    use crate::ImageError;

    #[test]
    fn broadcast_from_empty_fills_default() {
        let mut arr = FloatArray::new();
        arr.broadcast(3, 1.5).unwrap();
        assert_eq!(&*arr, &[1.5, 1.5, 1.5]);
    }

    #[test]
    fn broadcast_from_single_repeats_value() {
        let mut arr = UnsignedArray::from([7]);
        arr.broadcast(4, 0).unwrap();
        assert_eq!(&*arr, &[7, 7, 7, 7]);
    }

    #[test]
    fn broadcast_rejects_other_lengths() {
        let mut arr = UnsignedArray::from([1, 2]);
        assert_eq!(
            arr.broadcast(3, 0),
            Err(ImageError::ArrayParameterWrongLength {
                expected: 3,
                got: 2
            })
        );
        let mut same = UnsignedArray::from([1, 2, 3]);
        assert!(same.broadcast(3, 0).is_ok());
    }

    #[test]
    fn resize_truncates_and_fills() {
        let mut arr = IntegerArray::from([1, 2, 3]);
        arr.resize(2, 0);
        assert_eq!(&*arr, &[1, 2]);
        arr.resize(5, -1);
        assert_eq!(&*arr, &[1, 2, -1, -1, -1]);
    }

    #[test]
    fn spills_beyond_inline_capacity() {
        let arr: UnsignedArray = (1..=7).collect();
        assert_eq!(arr.len(), 7);
        assert_eq!(arr.product(), 5040);
        assert_eq!(arr.sum(), 28);
    }

    #[test]
    fn copies_are_independent() {
        let a = IntegerArray::from([1, 2, 3]);
        let mut b = a.clone();
        b[0] = 10;
        assert_eq!(a[0], 1);
        assert_ne!(a, b);
    }

    #[test]
    fn elementwise_arithmetic_requires_equal_lengths() {
        let a = IntegerArray::from([1, 2, 3]);
        let b = IntegerArray::from([4, 5, 6]);
        assert_eq!((&a + &b).unwrap(), IntegerArray::from([5, 7, 9]));
        assert_eq!((&b - &a).unwrap(), IntegerArray::from([3, 3, 3]));
        assert_eq!((&a * &b).unwrap(), IntegerArray::from([4, 10, 18]));

        let short = IntegerArray::from([1]);
        assert!(matches!(
            &a + &short,
            Err(ImageError::ArrayParameterWrongLength { .. })
        ));
    }

    #[test]
    fn insert_remove_and_permute() {
        let mut arr = UnsignedArray::from([10, 20, 30]);
        arr.insert(1, 15).unwrap();
        assert_eq!(&*arr, &[10, 15, 20, 30]);
        assert_eq!(arr.remove(0).unwrap(), 10);
        assert!(arr.remove(5).is_err());
        let permuted = arr.permute(&[2, 0, 1]).unwrap();
        assert_eq!(&*permuted, &[30, 15, 20]);
        assert!(arr.permute(&[3]).is_err());
    }

    #[test]
    fn display_uses_braces() {
        let arr = UnsignedArray::from([50, 80, 30]);
        assert_eq!(arr.to_string(), "{50, 80, 30}");
        assert_eq!(UnsignedArray::new().to_string(), "{}");
    }
}
