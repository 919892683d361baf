//! Typed sample access and whole-image sample operations.
//!
//! Typed access checks once that the requested Rust type matches the image's
//! data type and then reads and writes through raw offsets. Several images
//! may view the same buffer: writing through one while another is being read
//! is allowed, and keeping such accesses apart is up to the caller.

use std::marker::PhantomData;

use num_complex::Complex64;

use super::Image;
use crate::array::{IntegerArray, UnsignedArray};
use crate::dispatch::{dispatch_all, SampleVisitor};
use crate::sample::{DataType, Sample};
use crate::trace::trace_event;
use crate::util::{ImageError, ImageResult};

/// Reads the sample `offset` samples away from `origin`.
///
/// # Safety
/// The sample must lie inside the buffer `origin` points into.
unsafe fn read_sample<T: Sample>(origin: *const u8, offset: isize) -> T {
    origin
        .offset(offset * std::mem::size_of::<T>() as isize)
        .cast::<T>()
        .read_unaligned()
}

/// Writes the sample `offset` samples away from `origin`.
///
/// # Safety
/// The sample must lie inside the buffer `origin` points into.
unsafe fn write_sample<T: Sample>(origin: *mut u8, offset: isize, value: T) {
    origin
        .offset(offset * std::mem::size_of::<T>() as isize)
        .cast::<T>()
        .write_unaligned(value)
}

/// Sample offsets of every pixel, in linear-index order (first axis fastest).
#[derive(Clone, Debug)]
pub struct PixelOffsets {
    sizes: UnsignedArray,
    strides: IntegerArray,
    coords: UnsignedArray,
    offset: isize,
    remaining: usize,
}

impl PixelOffsets {
    fn new(sizes: &UnsignedArray, strides: &IntegerArray) -> Self {
        Self {
            sizes: sizes.clone(),
            strides: strides.clone(),
            coords: UnsignedArray::filled(sizes.len(), 0),
            offset: 0,
            remaining: sizes.product(),
        }
    }
}

impl Iterator for PixelOffsets {
    type Item = isize;

    fn next(&mut self) -> Option<isize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.offset;
        for dim in 0..self.sizes.len() {
            self.coords[dim] += 1;
            self.offset += self.strides[dim];
            if self.coords[dim] < self.sizes[dim] {
                break;
            }
            self.offset -= self.strides[dim] * self.sizes[dim] as isize;
            self.coords[dim] = 0;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for PixelOffsets {}

/// Read access to the samples of an image of sample type `T`.
pub struct Samples<'a, T> {
    image: &'a Image,
    origin: *const u8,
    marker: PhantomData<T>,
}

impl<'a, T: Sample> Samples<'a, T> {
    /// Tensor element `tensor_index` of the pixel at `coords`.
    pub fn get(&self, coords: &[usize], tensor_index: usize) -> ImageResult<T> {
        let offset = self.image.sample_offset(coords, tensor_index)?;
        // SAFETY: `sample_offset` validated the coordinates against the header.
        Ok(unsafe { read_sample(self.origin, offset) })
    }

    /// All samples, pixel by pixel, tensor elements innermost.
    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        let origin = self.origin;
        let stride = self.image.tensor_stride;
        let elements = self.image.tensor_elements() as isize;
        PixelOffsets::new(&self.image.sizes, &self.image.strides).flat_map(move |offset| {
            // SAFETY: offsets of a forged header stay inside its buffer.
            (0..elements).map(move |t| unsafe { read_sample(origin, offset + t * stride) })
        })
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

/// Write access to the samples of an image of sample type `T`.
pub struct SamplesMut<'a, T> {
    image: &'a mut Image,
    origin: *mut u8,
    marker: PhantomData<T>,
}

impl<T: Sample> SamplesMut<'_, T> {
    pub fn get(&self, coords: &[usize], tensor_index: usize) -> ImageResult<T> {
        let offset = self.image.sample_offset(coords, tensor_index)?;
        // SAFETY: `sample_offset` validated the coordinates against the header.
        Ok(unsafe { read_sample(self.origin, offset) })
    }

    pub fn set(&mut self, coords: &[usize], tensor_index: usize, value: T) -> ImageResult<()> {
        let offset = self.image.sample_offset(coords, tensor_index)?;
        // SAFETY: as in `get`.
        unsafe { write_sample(self.origin, offset, value) };
        Ok(())
    }

    /// Sets every sample to `value`.
    pub fn fill(&mut self, value: T) {
        let stride = self.image.tensor_stride;
        let elements = self.image.tensor_elements() as isize;
        for offset in PixelOffsets::new(&self.image.sizes, &self.image.strides) {
            for t in 0..elements {
                // SAFETY: offsets of a forged header stay inside its buffer.
                unsafe { write_sample(self.origin, offset + t * stride, value) };
            }
        }
    }
}

impl Image {
    /// Offsets of every pixel relative to the origin, first axis fastest.
    pub fn pixel_offsets(&self) -> ImageResult<PixelOffsets> {
        self.require_forged()?;
        Ok(PixelOffsets::new(&self.sizes, &self.strides))
    }

    /// Read access with sample type `T`, which must match the data type.
    pub fn samples<T: Sample>(&self) -> ImageResult<Samples<'_, T>> {
        let origin = self.typed_origin::<T>()?;
        Ok(Samples {
            image: self,
            origin,
            marker: PhantomData,
        })
    }

    /// Write access with sample type `T`, which must match the data type.
    ///
    /// Other images sharing the buffer must not be accessed from another
    /// thread meanwhile; see [Shared buffers](Image#shared-buffers).
    pub fn samples_mut<T: Sample>(&mut self) -> ImageResult<SamplesMut<'_, T>> {
        let origin = self.typed_origin::<T>()?;
        Ok(SamplesMut {
            image: self,
            origin,
            marker: PhantomData,
        })
    }

    /// First tensor element of the pixel at `coords`.
    pub fn sample<T: Sample>(&self, coords: &[usize]) -> ImageResult<T> {
        self.samples::<T>()?.get(coords, 0)
    }

    pub fn set_sample<T: Sample>(&mut self, coords: &[usize], value: T) -> ImageResult<()> {
        self.samples_mut::<T>()?.set(coords, 0, value)
    }

    /// All tensor elements of the pixel at `coords`.
    pub fn pixel<T: Sample>(&self, coords: &[usize]) -> ImageResult<Vec<T>> {
        let samples = self.samples::<T>()?;
        (0..self.tensor_elements())
            .map(|t| samples.get(coords, t))
            .collect()
    }

    pub fn set_pixel<T: Sample>(&mut self, coords: &[usize], values: &[T]) -> ImageResult<()> {
        let expected = self.tensor_elements();
        if values.len() != expected {
            return Err(ImageError::TensorElementsMismatch {
                expected,
                got: values.len(),
            });
        }
        let mut samples = self.samples_mut::<T>()?;
        for (t, &value) in values.iter().enumerate() {
            samples.set(coords, t, value)?;
        }
        Ok(())
    }

    /// Sets every sample to `value`, converted to the image's data type.
    ///
    /// Other images sharing the buffer must not be accessed from another
    /// thread meanwhile; see [Shared buffers](Image#shared-buffers).
    pub fn fill(&mut self, value: f64) -> ImageResult<()> {
        self.fill_complex(Complex64::new(value, 0.0))
    }

    /// As `fill`; real data types take the real part.
    pub fn fill_complex(&mut self, value: Complex64) -> ImageResult<()> {
        self.require_forged()?;
        let data_type = self.data_type;
        dispatch_all(data_type, FillWith { image: self, value })?
    }

    /// A new image with normal strides holding a copy of the samples.
    pub fn copy(&self) -> ImageResult<Image> {
        self.convert(self.data_type)
    }

    /// A new image with normal strides holding the samples converted to `data_type`.
    pub fn convert(&self, data_type: DataType) -> ImageResult<Image> {
        self.require_forged()?;
        let mut out = Image::default();
        out.copy_properties(self)?;
        out.strides.clear();
        out.data_type = data_type;
        out.forge()?;
        out.copy_from(self)?;
        Ok(out)
    }

    /// Copies the samples of `src` into this image, converting the data type.
    ///
    /// Sizes and tensor elements must match. If the two images overlap without
    /// being identical views, `src` is first copied to a temporary buffer.
    ///
    /// Other images sharing the buffer must not be accessed from another
    /// thread meanwhile; see [Shared buffers](Image#shared-buffers).
    pub fn copy_from(&mut self, src: &Image) -> ImageResult<()> {
        self.require_forged()?;
        src.require_forged()?;
        if self.sizes != src.sizes {
            return Err(ImageError::PropertiesDiffer { property: "sizes" });
        }
        if self.tensor_elements() != src.tensor_elements() {
            return Err(ImageError::TensorElementsMismatch {
                expected: self.tensor_elements(),
                got: src.tensor_elements(),
            });
        }
        if self.is_overlapping_view(src) {
            trace_event!("copy_through_temporary", samples = src.number_of_samples());
            let temporary = src.copy()?;
            return self.copy_from(&temporary);
        }
        dispatch_all(src.data_type, ReadAs { src, dst: self })?
    }

    /// All samples as `f64` (real part for complex types), pixel by pixel.
    pub fn to_f64_vec(&self) -> ImageResult<Vec<f64>> {
        self.require_forged()?;
        dispatch_all(self.data_type, CollectF64 { image: self })?
    }

    /// Pointer to pixel (0, ..., 0), tensor element 0.
    pub(crate) fn origin_ptr(&self) -> ImageResult<*mut u8> {
        let block = self.block.as_ref().ok_or(ImageError::ImageNotForged)?;
        // SAFETY: a forged image's origin lies inside its block.
        Ok(unsafe { block.as_ptr().add(self.origin) })
    }

    fn typed_origin<T: Sample>(&self) -> ImageResult<*mut u8> {
        let origin = self.origin_ptr()?;
        if T::DATA_TYPE != self.data_type {
            return Err(ImageError::DataTypeMismatch {
                image: self.data_type,
                requested: T::DATA_TYPE,
            });
        }
        Ok(origin)
    }

    fn sample_offset(&self, coords: &[usize], tensor_index: usize) -> ImageResult<isize> {
        let elements = self.tensor_elements();
        if tensor_index >= elements {
            return Err(ImageError::IndexOutOfRange {
                index: tensor_index as isize,
                size: elements,
            });
        }
        Ok(self.offset(coords)? + tensor_index as isize * self.tensor_stride)
    }
}

struct FillWith<'a> {
    image: &'a mut Image,
    value: Complex64,
}

impl SampleVisitor for FillWith<'_> {
    type Output = ImageResult<()>;

    fn visit<T: Sample>(self) -> ImageResult<()> {
        self.image
            .samples_mut::<T>()?
            .fill(T::from_complex(self.value));
        Ok(())
    }
}

struct CollectF64<'a> {
    image: &'a Image,
}

impl SampleVisitor for CollectF64<'_> {
    type Output = ImageResult<Vec<f64>>;

    fn visit<T: Sample>(self) -> ImageResult<Vec<f64>> {
        Ok(self.image.samples::<T>()?.iter().map(T::to_f64).collect())
    }
}

/// Outer dispatch of `copy_from`: fixes the source type.
struct ReadAs<'a> {
    src: &'a Image,
    dst: &'a mut Image,
}

impl SampleVisitor for ReadAs<'_> {
    type Output = ImageResult<()>;

    fn visit<S: Sample>(self) -> ImageResult<()> {
        let data_type = self.dst.data_type;
        dispatch_all(
            data_type,
            WriteFrom::<S> {
                src: self.src,
                dst: self.dst,
                marker: PhantomData,
            },
        )?
    }
}

/// Inner dispatch of `copy_from`: fixes the destination type.
struct WriteFrom<'a, S> {
    src: &'a Image,
    dst: &'a mut Image,
    marker: PhantomData<S>,
}

impl<S: Sample> SampleVisitor for WriteFrom<'_, S> {
    type Output = ImageResult<()>;

    fn visit<D: Sample>(self) -> ImageResult<()> {
        let src_origin = self.src.typed_origin::<S>()?;
        let dst_origin = self.dst.typed_origin::<D>()?;
        let elements = self.src.tensor_elements() as isize;
        let (src_stride, dst_stride) = (self.src.tensor_stride, self.dst.tensor_stride);
        let pairs = self.src.pixel_offsets()?.zip(self.dst.pixel_offsets()?);
        for (src_offset, dst_offset) in pairs {
            for t in 0..elements {
                // SAFETY: both headers are forged and describe the same sizes.
                unsafe {
                    let value: S = read_sample(src_origin, src_offset + t * src_stride);
                    write_sample(
                        dst_origin,
                        dst_offset + t * dst_stride,
                        D::from_complex(value.to_complex()),
                    );
                }
            }
        }
        Ok(())
    }
}
