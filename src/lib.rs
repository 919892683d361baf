//! tensorimage is an n-dimensional, tensor-valued image container.
//!
//! An [`Image`] is a header (sizes, strides, tensor shape, data type) over a
//! reference-counted sample buffer. Headers are configured while the image is
//! raw, then [`Image::forge`] allocates the buffer. Indexing with [`Range`]s
//! produces views that share the buffer without copying.
//!
//! Sample types are the eleven [`DataType`]s, each backed by a Rust type
//! implementing [`sample::Sample`]; [`dispatch`] maps a runtime data type onto
//! a generic function instantiated for that type.
//!
//! ```
//! use tensorimage::{DataType, Image, Range};
//!
//! let mut img = Image::new([50, 80, 30], 3, DataType::UInt8).unwrap();
//! img.fill(7.0).unwrap();
//! let view = img.at(&[Range::all(), Range::new(10, 19), Range::single(0)]).unwrap();
//! assert_eq!(&**view.sizes(), &[50, 10, 1]);
//! assert!(view.shares_data(&img));
//! assert_eq!(view.pixel::<u8>(&[0, 0, 0]).unwrap(), vec![7, 7, 7]);
//! ```

pub mod array;
pub mod dispatch;
pub mod image;
pub mod options;
pub mod range;
pub mod sample;
mod trace;
pub mod util;

pub use array::{BooleanArray, DimensionArray, FloatArray, IntegerArray, UnsignedArray};
pub use image::{Image, PhysicalQuantity, PixelSize, Tensor, TensorShape};
pub use options::{
    AcceptDataTypeChange, AllowSingletonExpansion, CmpProps, CropLocation, Options,
    ThrowException,
};
pub use range::Range;
pub use sample::{Bin, DataType, DataTypeClasses, Sample};
pub use util::{ImageError, ImageResult};
