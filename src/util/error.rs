//! Error types for tensorimage.

use thiserror::Error;

use crate::sample::DataType;

/// Result alias for tensorimage operations.
pub type ImageResult<T> = std::result::Result<T, ImageError>;

/// Errors reported by the image container, its views, and generic dispatch.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ImageError {
    /// An array parameter has the wrong length and cannot be broadcast.
    #[error("array parameter has wrong length: expected {expected}, got {got}")]
    ArrayParameterWrongLength { expected: usize, got: usize },
    /// An index or range resolved outside of `[0, size)`.
    #[error("index {index} out of range for size {size}")]
    IndexOutOfRange { index: isize, size: usize },
    /// A parameter value is outside its valid domain.
    #[error("parameter out of range: {0}")]
    ParameterOutOfRange(&'static str),
    /// A size of zero was requested along some axis.
    #[error("invalid size along dimension {dim}: sizes must be positive")]
    InvalidSize { dim: usize },
    /// The requested image does not fit in the addressable range.
    #[error("image size exceeds the addressable range")]
    SizeOverflow,
    /// Two arrays or images disagree on dimensionality.
    #[error("dimensionality mismatch: expected {expected}, got {got}")]
    DimensionalityMismatch { expected: usize, got: usize },
    /// The number of tensor elements does not match.
    #[error("number of tensor elements mismatch: expected {expected}, got {got}")]
    TensorElementsMismatch { expected: usize, got: usize },
    /// A tensor shape cannot be built from the given rows and columns.
    #[error("invalid tensor shape: {0}")]
    InvalidTensorShape(&'static str),
    /// The image is protected and the requested change would alter it.
    #[error("image is protected")]
    ProtectedImage,
    /// The operation requires a forged image.
    #[error("image is not forged")]
    ImageNotForged,
    /// The operation requires a complex-valued image.
    #[error("image is not complex-valued")]
    NotComplex,
    /// Generic dispatch was invoked for a type outside the supported subset.
    #[error("data type {data_type} not supported")]
    UnsupportedDataType { data_type: DataType },
    /// Typed access was requested with a sample type that does not match.
    #[error("data type mismatch: image is {image}, access requested as {requested}")]
    DataTypeMismatch {
        image: DataType,
        requested: DataType,
    },
    /// The allocator could not provide a buffer.
    #[error("allocation of {bytes} bytes failed")]
    AllocationFailed { bytes: usize },
    /// A named option string did not match any recognized value.
    #[error("invalid flag: {0}")]
    InvalidFlag(String),
    /// Two images differ in a property selected for comparison.
    #[error("image properties differ: {property}")]
    PropertiesDiffer { property: &'static str },
    /// An image does not satisfy a property check.
    #[error("image property check failed: {property}")]
    PropertyCheckFailed { property: &'static str },
}
