//! The image container.
//!
//! An [`Image`] is a header describing how to interpret a shared pixel buffer:
//! sizes and strides per axis, a tensor shape with its own stride, a data type,
//! and an origin inside the buffer. Strides count samples (not bytes) and may
//! be negative (a mirrored axis) or zero (a singleton-expanded axis).
//!
//! Cloning an image clones the header and shares the buffer; views created by
//! indexing do the same with adjusted origin, sizes and strides. The buffer is
//! released when the last image referring to it is stripped or dropped.
//!
//! Images start out *raw* (unforged): configure the header, then
//! [`Image::forge`] allocates the buffer. [`Image::strip`] releases it again
//! but keeps the header, so an image can be reconfigured and forged anew.

use std::fmt;
use std::sync::Arc;

use crate::array::{IntegerArray, UnsignedArray};
use crate::sample::{DataType, Sample};
use crate::util::{ImageError, ImageResult};

mod access;
pub mod buffer;
mod compare;
mod forge;
pub mod pixel_size;
pub mod tensor;
mod view;

pub use access::{PixelOffsets, Samples, SamplesMut};
pub use buffer::{AlignedAllocator, Allocator, DataBlock, DataSegment};
pub use pixel_size::{PhysicalQuantity, PixelSize};
pub use tensor::{Tensor, TensorShape};

/// A strided, tensor-valued, n-dimensional image over a shared buffer.
///
/// Cloning copies the header and shares the buffer. A clone keeps the
/// protect flag, so it is a second handle to the same protected image.
/// Views (`at`, `cropped`, `tensor_element`, ...) are new images and are
/// never protected.
///
/// # Shared buffers
///
/// Writes take `&mut Image`, but clones and views of the same buffer are
/// independent values. Writing through one while another is read or
/// written on a different thread is a data race. Callers must keep
/// overlapping images apart across threads; the reference count itself is
/// atomic, so dropping and reading handles concurrently is fine.
#[derive(Clone, Debug, Default)]
pub struct Image {
    data_type: DataType,
    sizes: UnsignedArray,
    strides: IntegerArray,
    tensor: Tensor,
    tensor_stride: isize,
    protect: bool,
    color_space: String,
    pixel_size: PixelSize,
    block: Option<DataSegment>,
    /// Byte offset of pixel (0, 0, ..., 0) within `block`.
    origin: usize,
    allocator: Option<Arc<dyn Allocator>>,
}

/// Validates that every size is positive and the pixel count is addressable.
pub(crate) fn test_sizes(sizes: &UnsignedArray) -> ImageResult<()> {
    if let Some(dim) = sizes.iter().position(|&s| s == 0) {
        return Err(ImageError::InvalidSize { dim });
    }
    match sizes.checked_product() {
        Some(n) if n <= isize::MAX as usize => Ok(()),
        _ => Err(ImageError::SizeOverflow),
    }
}

impl Image {
    /// Creates and forges an image with normal strides.
    pub fn new(
        sizes: impl Into<UnsignedArray>,
        tensor_elements: usize,
        data_type: DataType,
    ) -> ImageResult<Self> {
        let sizes = sizes.into();
        test_sizes(&sizes)?;
        let mut img = Self {
            data_type,
            sizes,
            tensor: Tensor::vector(tensor_elements)?,
            ..Self::default()
        };
        img.forge()?;
        Ok(img)
    }

    /// Creates a forged image holding a copy of `samples`.
    ///
    /// Samples are ordered pixel by pixel with the first axis varying
    /// fastest, and the tensor elements of each pixel adjacent.
    pub fn from_samples<T: Sample>(
        sizes: impl Into<UnsignedArray>,
        tensor_elements: usize,
        samples: &[T],
    ) -> ImageResult<Self> {
        let img = Self::new(sizes, tensor_elements, T::DATA_TYPE)?;
        let expected = img.number_of_samples();
        if samples.len() != expected {
            return Err(ImageError::ArrayParameterWrongLength {
                expected,
                got: samples.len(),
            });
        }
        let bytes: &[u8] = bytemuck::cast_slice(samples);
        let dst = img.origin_ptr()?;
        // SAFETY: a freshly forged image has normal strides, so its samples
        // occupy exactly `bytes.len()` contiguous bytes starting at the origin.
        unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len()) };
        Ok(img)
    }

    /// A new forged image with the same properties (and stride order) as this one.
    pub fn similar(&self) -> ImageResult<Self> {
        self.similar_with(self.data_type)
    }

    /// As `similar`, with a different data type.
    pub fn similar_with(&self, data_type: DataType) -> ImageResult<Self> {
        let mut out = Self::default();
        out.copy_properties(self)?;
        out.data_type = data_type;
        out.forge()?;
        Ok(out)
    }

    /// Copies the header of `src` (not its data, protection or buffer).
    pub fn copy_properties(&mut self, src: &Image) -> ImageResult<()> {
        self.prepare_for_change(false)?;
        self.data_type = src.data_type;
        self.sizes = src.sizes.clone();
        self.strides = src.strides.clone();
        self.tensor = src.tensor;
        self.tensor_stride = src.tensor_stride;
        self.color_space = src.color_space.clone();
        self.pixel_size = src.pixel_size.clone();
        if self.allocator.is_none() {
            self.allocator = src.allocator.clone();
        }
        Ok(())
    }

    pub fn dimensionality(&self) -> usize {
        self.sizes.len()
    }

    pub fn sizes(&self) -> &UnsignedArray {
        &self.sizes
    }

    /// Size along `dim`.
    pub fn size(&self, dim: usize) -> ImageResult<usize> {
        self.sizes
            .get(dim)
            .copied()
            .ok_or(ImageError::IndexOutOfRange {
                index: dim as isize,
                size: self.sizes.len(),
            })
    }

    pub fn number_of_pixels(&self) -> usize {
        self.sizes.product()
    }

    pub fn number_of_samples(&self) -> usize {
        self.number_of_pixels() * self.tensor_elements()
    }

    pub fn strides(&self) -> &IntegerArray {
        &self.strides
    }

    /// Stride along `dim`.
    pub fn stride(&self, dim: usize) -> ImageResult<isize> {
        self.strides
            .get(dim)
            .copied()
            .ok_or(ImageError::IndexOutOfRange {
                index: dim as isize,
                size: self.strides.len(),
            })
    }

    pub fn tensor_stride(&self) -> isize {
        self.tensor_stride
    }

    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    pub fn tensor_elements(&self) -> usize {
        self.tensor.elements()
    }

    pub fn is_scalar(&self) -> bool {
        self.tensor.is_scalar()
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn color_space(&self) -> &str {
        &self.color_space
    }

    pub fn is_color(&self) -> bool {
        !self.color_space.is_empty()
    }

    pub fn pixel_size(&self) -> &PixelSize {
        &self.pixel_size
    }

    pub fn is_forged(&self) -> bool {
        self.block.is_some()
    }

    pub fn is_protected(&self) -> bool {
        self.protect
    }

    /// True if another image shares this image's buffer.
    pub fn is_shared(&self) -> bool {
        self.block
            .as_ref()
            .is_some_and(|block| Arc::strong_count(block) > 1)
    }

    /// Number of images sharing the buffer.
    pub fn share_count(&self) -> ImageResult<usize> {
        self.block
            .as_ref()
            .map(Arc::strong_count)
            .ok_or(ImageError::ImageNotForged)
    }

    /// True if both images are forged on the same buffer.
    pub fn shares_data(&self, other: &Image) -> bool {
        match (&self.block, &other.block) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// True if the byte spans of the two images' samples overlap.
    ///
    /// The test compares bounding spans, so interleaved views that never
    /// touch the same sample (e.g. even and odd columns) also count as aliased.
    pub fn aliases(&self, other: &Image) -> bool {
        if !self.shares_data(other) {
            return false;
        }
        match (self.byte_span(), other.byte_span()) {
            (Some((lo1, hi1)), Some((lo2, hi2))) => lo1 <= hi2 && lo2 <= hi1,
            _ => false,
        }
    }

    /// True if both images address exactly the same samples in the same order.
    pub fn is_identical_view(&self, other: &Image) -> bool {
        self.shares_data(other)
            && self.origin == other.origin
            && self.data_type == other.data_type
            && self.sizes == other.sizes
            && self.tensor.elements() == other.tensor.elements()
            && self.strides == other.strides
            && self.tensor_stride == other.tensor_stride
    }

    /// True if the images alias but are not identical views.
    pub fn is_overlapping_view(&self, other: &Image) -> bool {
        self.aliases(other) && !self.is_identical_view(other)
    }

    /// Sets the sizes. Drops custom strides if the dimensionality changes.
    pub fn set_sizes(&mut self, sizes: impl Into<UnsignedArray>) -> ImageResult<()> {
        let sizes = sizes.into();
        test_sizes(&sizes)?;
        self.prepare_for_change(sizes == self.sizes)?;
        if sizes.len() != self.sizes.len() {
            self.strides.clear();
        }
        self.sizes = sizes;
        Ok(())
    }

    /// Sets custom strides, honored by the next `forge` if they describe a
    /// layout without overlapping samples. An empty array requests normal strides.
    pub fn set_strides(&mut self, strides: impl Into<IntegerArray>) -> ImageResult<()> {
        let strides = strides.into();
        if !strides.is_empty() && strides.len() != self.sizes.len() {
            return Err(ImageError::ArrayParameterWrongLength {
                expected: self.sizes.len(),
                got: strides.len(),
            });
        }
        self.prepare_for_change(strides == self.strides)?;
        self.strides = strides;
        Ok(())
    }

    pub fn set_tensor(&mut self, tensor: Tensor) -> ImageResult<()> {
        self.prepare_for_change(tensor == self.tensor)?;
        self.tensor = tensor;
        Ok(())
    }

    /// Sets the tensor to a column vector of `elements` elements.
    pub fn set_tensor_sizes(&mut self, elements: usize) -> ImageResult<()> {
        self.set_tensor(Tensor::vector(elements)?)
    }

    pub fn set_tensor_stride(&mut self, tensor_stride: isize) -> ImageResult<()> {
        self.prepare_for_change(tensor_stride == self.tensor_stride)?;
        self.tensor_stride = tensor_stride;
        Ok(())
    }

    pub fn set_data_type(&mut self, data_type: DataType) -> ImageResult<()> {
        self.prepare_for_change(data_type == self.data_type)?;
        self.data_type = data_type;
        Ok(())
    }

    pub fn set_color_space(&mut self, color_space: impl Into<String>) {
        self.color_space = color_space.into();
    }

    pub fn reset_color_space(&mut self) {
        self.color_space.clear();
    }

    pub fn set_pixel_size(&mut self, pixel_size: PixelSize) {
        self.pixel_size = pixel_size;
    }

    pub fn set_pixel_size_along(&mut self, dim: usize, size: PhysicalQuantity) {
        self.pixel_size.set(dim, size);
    }

    pub fn reset_pixel_size(&mut self) {
        self.pixel_size.clear();
    }

    /// Sets the protect flag and returns its previous value.
    pub fn protect(&mut self, set: bool) -> bool {
        std::mem::replace(&mut self.protect, set)
    }

    /// Uses `allocator` for subsequent forging.
    pub fn set_allocator(&mut self, allocator: Arc<dyn Allocator>) {
        self.allocator = Some(allocator);
    }

    /// Offset, in samples from the origin, of the pixel at `coords`.
    pub fn offset(&self, coords: &[usize]) -> ImageResult<isize> {
        self.require_forged()?;
        self.check_coordinates(coords)?;
        Ok(coords
            .iter()
            .zip(self.strides.iter())
            .map(|(&c, &s)| c as isize * s)
            .sum())
    }

    /// Linear index of `coords`, first axis fastest. Independent of strides.
    pub fn index(&self, coords: &[usize]) -> ImageResult<usize> {
        self.check_coordinates(coords)?;
        let mut index = 0;
        for (&c, &s) in coords.iter().zip(self.sizes.iter()).rev() {
            index = index * s + c;
        }
        Ok(index)
    }

    /// Coordinates of the pixel with linear index `index`.
    pub fn coordinates(&self, mut index: usize) -> ImageResult<UnsignedArray> {
        let n = self.number_of_pixels();
        if index >= n {
            return Err(ImageError::IndexOutOfRange {
                index: index as isize,
                size: n,
            });
        }
        Ok(self
            .sizes
            .iter()
            .map(|&s| {
                let c = index % s;
                index /= s;
                c
            })
            .collect())
    }

    fn check_coordinates(&self, coords: &[usize]) -> ImageResult<()> {
        if coords.len() != self.sizes.len() {
            return Err(ImageError::DimensionalityMismatch {
                expected: self.sizes.len(),
                got: coords.len(),
            });
        }
        for (&c, &s) in coords.iter().zip(self.sizes.iter()) {
            if c >= s {
                return Err(ImageError::IndexOutOfRange {
                    index: c as isize,
                    size: s,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn require_forged(&self) -> ImageResult<()> {
        if self.is_forged() {
            Ok(())
        } else {
            Err(ImageError::ImageNotForged)
        }
    }

    /// Strips a forged, unprotected image before a header change.
    ///
    /// Changes that leave the header as it is are always accepted.
    fn prepare_for_change(&mut self, unchanged: bool) -> ImageResult<()> {
        if !self.is_forged() || unchanged {
            return Ok(());
        }
        if self.protect {
            return Err(ImageError::ProtectedImage);
        }
        self.strip()
    }

    /// Lowest and highest byte addressed by any sample, relative to the block.
    fn byte_span(&self) -> Option<(usize, usize)> {
        let (extent, start) = self.sample_extent().ok()?;
        let size = self.data_type.size_of() as isize;
        let lo = self.origin as isize + start * size;
        let hi = lo + extent as isize * size - 1;
        Some((lo as usize, hi as usize))
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_forged() { "Forged" } else { "Raw" };
        writeln!(
            f,
            "{state} image, {} dimensions, data type {}",
            self.dimensionality(),
            self.data_type
        )?;
        writeln!(f, "  sizes: {}", self.sizes)?;
        writeln!(f, "  strides: {}", self.strides)?;
        writeln!(
            f,
            "  tensor: {} elements ({:?}), stride {}",
            self.tensor.elements(),
            self.tensor.shape(),
            self.tensor_stride
        )?;
        if self.is_color() {
            writeln!(f, "  color space: {}", self.color_space)?;
        }
        if self.pixel_size.is_defined() {
            let sizes: Vec<String> = (0..self.dimensionality())
                .map(|dim| self.pixel_size.get(dim).to_string())
                .collect();
            writeln!(f, "  pixel size: {}", sizes.join(" x "))?;
        }
        if let Some(block) = &self.block {
            writeln!(
                f,
                "  buffer: {} bytes, origin at byte {}, shared by {}",
                block.len(),
                self.origin,
                Arc::strong_count(block)
            )?;
        }
        Ok(())
    }
}
