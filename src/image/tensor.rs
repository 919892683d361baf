//! Tensor shape of a pixel: how many samples it holds and how they are arranged.

use crate::array::UnsignedArray;
use crate::util::{ImageError, ImageResult};

/// Arrangement of the tensor elements of a pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TensorShape {
    /// `n` elements in a column (scalars are a 1-element column vector).
    #[default]
    ColumnVector,
    /// `n` elements in a row.
    RowVector,
    /// A full matrix stored column by column.
    ColumnMajorMatrix,
    /// A full matrix stored row by row.
    RowMajorMatrix,
    /// Only the diagonal of a square matrix is stored.
    DiagonalMatrix,
    /// Symmetric square matrix: diagonal first, then the upper triangle.
    SymmetricMatrix,
    /// Upper triangle of a square matrix.
    UpperTriangularMatrix,
    /// Lower triangle of a square matrix.
    LowerTriangularMatrix,
}

/// Tensor description of a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tensor {
    shape: TensorShape,
    elements: usize,
    rows: usize,
}

impl Default for Tensor {
    fn default() -> Self {
        Self::scalar()
    }
}

fn triangle(n: usize) -> usize {
    n * (n + 1) / 2
}

impl Tensor {
    /// A single sample per pixel.
    pub const fn scalar() -> Self {
        Self {
            shape: TensorShape::ColumnVector,
            elements: 1,
            rows: 1,
        }
    }

    /// A column vector of `n` elements.
    pub fn vector(n: usize) -> ImageResult<Self> {
        if n == 0 {
            return Err(ImageError::InvalidTensorShape("tensor must have elements"));
        }
        Ok(Self {
            shape: TensorShape::ColumnVector,
            elements: n,
            rows: n,
        })
    }

    /// A full column-major matrix; degenerate matrices become vectors.
    pub fn matrix(rows: usize, columns: usize) -> ImageResult<Self> {
        Self::from_shape(TensorShape::ColumnMajorMatrix, rows, columns)
    }

    /// Builds a tensor of the given shape, validating rows and columns.
    pub fn from_shape(shape: TensorShape, rows: usize, columns: usize) -> ImageResult<Self> {
        if rows == 0 || columns == 0 {
            return Err(ImageError::InvalidTensorShape("tensor must have elements"));
        }
        let tensor = match shape {
            TensorShape::ColumnVector => {
                if columns != 1 {
                    return Err(ImageError::InvalidTensorShape(
                        "column vector must have one column",
                    ));
                }
                Self {
                    shape,
                    elements: rows,
                    rows,
                }
            }
            TensorShape::RowVector => {
                if rows != 1 {
                    return Err(ImageError::InvalidTensorShape("row vector must have one row"));
                }
                Self {
                    shape,
                    elements: columns,
                    rows: 1,
                }
            }
            TensorShape::ColumnMajorMatrix | TensorShape::RowMajorMatrix => {
                if columns == 1 {
                    return Self::from_shape(TensorShape::ColumnVector, rows, 1);
                }
                if rows == 1 {
                    return Self::from_shape(TensorShape::RowVector, 1, columns);
                }
                let elements = rows
                    .checked_mul(columns)
                    .ok_or(ImageError::SizeOverflow)?;
                Self {
                    shape,
                    elements,
                    rows,
                }
            }
            TensorShape::DiagonalMatrix
            | TensorShape::SymmetricMatrix
            | TensorShape::UpperTriangularMatrix
            | TensorShape::LowerTriangularMatrix => {
                if rows != columns {
                    return Err(ImageError::InvalidTensorShape("matrix must be square"));
                }
                let elements = if shape == TensorShape::DiagonalMatrix {
                    rows
                } else {
                    triangle(rows)
                };
                Self {
                    shape,
                    elements,
                    rows,
                }
            }
        };
        Ok(tensor)
    }

    pub fn shape(&self) -> TensorShape {
        self.shape
    }

    /// Number of stored samples per pixel.
    pub fn elements(&self) -> usize {
        self.elements
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        match self.shape {
            TensorShape::ColumnVector => 1,
            TensorShape::RowVector => self.elements,
            TensorShape::ColumnMajorMatrix | TensorShape::RowMajorMatrix => {
                self.elements / self.rows
            }
            _ => self.rows,
        }
    }

    /// `{rows}` for column vectors, `{rows, columns}` otherwise.
    pub fn sizes(&self) -> UnsignedArray {
        if self.shape == TensorShape::ColumnVector {
            UnsignedArray::from([self.rows])
        } else {
            UnsignedArray::from([self.rows, self.columns()])
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.elements == 1
    }

    pub fn is_vector(&self) -> bool {
        matches!(
            self.shape,
            TensorShape::ColumnVector | TensorShape::RowVector
        ) && self.elements > 1
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.columns()
    }

    /// Swaps rows and columns without moving any sample.
    pub fn transpose(&mut self) {
        let columns = self.columns();
        self.shape = match self.shape {
            TensorShape::ColumnVector => TensorShape::RowVector,
            TensorShape::RowVector => TensorShape::ColumnVector,
            TensorShape::ColumnMajorMatrix => TensorShape::RowMajorMatrix,
            TensorShape::RowMajorMatrix => TensorShape::ColumnMajorMatrix,
            TensorShape::UpperTriangularMatrix => TensorShape::LowerTriangularMatrix,
            TensorShape::LowerTriangularMatrix => TensorShape::UpperTriangularMatrix,
            other => other,
        };
        self.rows = columns;
    }
}

#[cfg(test)]
mod tests {
    use super::{Tensor, TensorShape};

    #[test]
    fn element_counts_per_shape() {
        assert_eq!(Tensor::scalar().elements(), 1);
        assert_eq!(Tensor::vector(3).unwrap().elements(), 3);
        assert_eq!(Tensor::matrix(2, 3).unwrap().elements(), 6);
        let sym = Tensor::from_shape(TensorShape::SymmetricMatrix, 3, 3).unwrap();
        assert_eq!(sym.elements(), 6);
        let diag = Tensor::from_shape(TensorShape::DiagonalMatrix, 4, 4).unwrap();
        assert_eq!(diag.elements(), 4);
        assert!(Tensor::from_shape(TensorShape::SymmetricMatrix, 2, 3).is_err());
        assert!(Tensor::vector(0).is_err());
    }

    #[test]
    fn degenerate_matrices_become_vectors() {
        let col = Tensor::matrix(3, 1).unwrap();
        assert_eq!(col.shape(), TensorShape::ColumnVector);
        let row = Tensor::matrix(1, 3).unwrap();
        assert_eq!(row.shape(), TensorShape::RowVector);
        assert_eq!(row.columns(), 3);
    }

    #[test]
    fn transpose_swaps_rows_and_columns() {
        let mut t = Tensor::matrix(2, 3).unwrap();
        t.transpose();
        assert_eq!(t.shape(), TensorShape::RowMajorMatrix);
        assert_eq!((t.rows(), t.columns()), (3, 2));
        assert_eq!(&*t.sizes(), &[3, 2]);

        let mut v = Tensor::vector(4).unwrap();
        v.transpose();
        assert_eq!(v.shape(), TensorShape::RowVector);
        assert_eq!((v.rows(), v.columns()), (1, 4));
    }
}
