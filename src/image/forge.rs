//! Buffer lifecycle: forging, stripping and reforging, plus stride analysis.

use std::sync::Arc;

use super::buffer::{AlignedAllocator, Allocator};
use super::{test_sizes, Image, Tensor};
use crate::array::UnsignedArray;
use crate::options::AcceptDataTypeChange;
use crate::sample::DataType;
use crate::trace::{trace_event, trace_span};
use crate::util::{ImageError, ImageResult};

impl Image {
    /// Allocates the buffer described by the header.
    ///
    /// Custom strides set through `set_strides` are honored when they give
    /// every sample its own address; otherwise normal strides are computed
    /// (tensor stride 1, first axis next, and so on). Forging an already
    /// forged image does nothing.
    pub fn forge(&mut self) -> ImageResult<()> {
        if self.is_forged() {
            return Ok(());
        }
        let _span = trace_span!("forge").entered();
        test_sizes(&self.sizes)?;
        if !self.has_valid_strides() {
            self.set_normal_strides()?;
        }
        let (extent, start) = self.sample_extent()?;
        let size_of = self.data_type.size_of();
        let bytes = extent
            .checked_mul(size_of)
            .filter(|&bytes| bytes <= isize::MAX as usize)
            .ok_or(ImageError::SizeOverflow)?;
        let block = match &self.allocator {
            Some(allocator) => allocator.allocate(bytes)?,
            None => AlignedAllocator::default().allocate(bytes)?,
        };
        if block.len() < bytes {
            return Err(ImageError::AllocationFailed { bytes });
        }
        self.origin = start.unsigned_abs() * size_of;
        self.block = Some(block);
        trace_event!(
            "forge",
            bytes = bytes,
            dimensionality = self.sizes.len(),
            tensor_elements = self.tensor.elements(),
            data_type = self.data_type.name()
        );
        Ok(())
    }

    /// Releases this image's reference to the buffer, keeping the header.
    ///
    /// The buffer itself is freed once no other image refers to it. Stripping
    /// a raw image does nothing; stripping a protected one fails.
    pub fn strip(&mut self) -> ImageResult<()> {
        if let Some(block) = &self.block {
            if self.protect {
                return Err(ImageError::ProtectedImage);
            }
            trace_event!(
                "strip",
                bytes = block.len(),
                remaining_owners = Arc::strong_count(block) - 1
            );
            self.block = None;
            self.origin = 0;
        }
        Ok(())
    }

    /// Makes the image forged with the given sizes, tensor elements and data type.
    ///
    /// A forged image that already matches is left untouched. An unshared
    /// buffer that is large enough is reused with normal strides. A protected
    /// image keeps its buffer and only succeeds if the shape matches and
    /// `accept` allows it to keep its current data type.
    pub fn reforge(
        &mut self,
        sizes: impl Into<UnsignedArray>,
        tensor_elements: usize,
        data_type: DataType,
        accept: AcceptDataTypeChange,
    ) -> ImageResult<()> {
        let sizes = sizes.into();
        test_sizes(&sizes)?;
        let tensor = Tensor::vector(tensor_elements)?;
        if let Some(block) = &self.block {
            let same_shape = self.sizes == sizes && self.tensor.elements() == tensor_elements;
            if same_shape && self.data_type == data_type {
                return Ok(());
            }
            if self.protect {
                if same_shape && accept == AcceptDataTypeChange::DoAllow {
                    return Ok(());
                }
                return Err(ImageError::ProtectedImage);
            }
            let bytes = sizes
                .checked_product()
                .and_then(|n| n.checked_mul(tensor_elements))
                .and_then(|n| n.checked_mul(data_type.size_of()))
                .ok_or(ImageError::SizeOverflow)?;
            if Arc::strong_count(block) == 1 && block.len() >= bytes {
                if data_type.is_binary() {
                    // SAFETY: the block is unshared and `block.len()` bytes long.
                    unsafe { std::ptr::write_bytes(block.as_ptr(), 0, block.len()) };
                }
                self.sizes = sizes;
                self.tensor = tensor;
                self.data_type = data_type;
                self.set_normal_strides()?;
                self.origin = 0;
                trace_event!("reforge_reuse", bytes = bytes);
                return Ok(());
            }
            self.strip()?;
        }
        self.sizes = sizes;
        self.strides.clear();
        self.tensor = tensor;
        self.data_type = data_type;
        self.forge()
    }

    /// True if strides and tensor stride are the ones `forge` computes by default.
    pub fn has_normal_strides(&self) -> ImageResult<bool> {
        self.require_forged()?;
        if self.tensor.elements() > 1 && self.tensor_stride != 1 {
            return Ok(false);
        }
        let mut expected = self.tensor.elements() as isize;
        for (&size, &stride) in self.sizes.iter().zip(self.strides.iter()) {
            if size > 1 && stride != expected {
                return Ok(false);
            }
            expected *= size as isize;
        }
        Ok(true)
    }

    /// True if the samples fill a block of memory without gaps, in any order.
    pub fn has_contiguous_data(&self) -> ImageResult<bool> {
        self.require_forged()?;
        let (extent, _) = self.sample_extent()?;
        Ok(extent == self.number_of_samples() && !self.is_singleton_expanded())
    }

    /// Span of the samples as `(count, start)`, in samples relative to the origin.
    ///
    /// `start` is the (non-positive) offset of the lowest addressed sample and
    /// `count` the number of sample slots from there to the highest one.
    pub(crate) fn sample_extent(&self) -> ImageResult<(usize, isize)> {
        let mut start: isize = 0;
        let mut end: isize = 0;
        let axes = self
            .sizes
            .iter()
            .zip(self.strides.iter())
            .map(|(&size, &stride)| (size, stride))
            .chain(std::iter::once((self.tensor.elements(), self.tensor_stride)));
        for (size, stride) in axes {
            let span = isize::try_from(size - 1)
                .ok()
                .and_then(|n| n.checked_mul(stride))
                .ok_or(ImageError::SizeOverflow)?;
            if span < 0 {
                start = start.checked_add(span).ok_or(ImageError::SizeOverflow)?;
            } else {
                end = end.checked_add(span).ok_or(ImageError::SizeOverflow)?;
            }
        }
        let count = end
            .checked_sub(start)
            .and_then(|n| n.checked_add(1))
            .ok_or(ImageError::SizeOverflow)?;
        Ok((count as usize, start))
    }

    /// True if the stored strides address every sample exactly once.
    ///
    /// Axes of size 1 are ignored. The remaining axes, sorted by absolute
    /// stride, must each step over the full span of the axes before them.
    fn has_valid_strides(&self) -> bool {
        if self.strides.len() != self.sizes.len() {
            return false;
        }
        let mut axes: Vec<(usize, usize)> = self
            .sizes
            .iter()
            .zip(self.strides.iter())
            .map(|(&size, &stride)| (stride.unsigned_abs(), size))
            .chain(std::iter::once((
                self.tensor_stride.unsigned_abs(),
                self.tensor.elements(),
            )))
            .filter(|&(_, size)| size > 1)
            .collect();
        axes.sort_unstable();
        let mut span: usize = 1;
        for (stride, size) in axes {
            if stride < span {
                return false;
            }
            span = match stride.checked_mul(size) {
                Some(n) if n <= isize::MAX as usize => n,
                _ => return false,
            };
        }
        true
    }

    fn set_normal_strides(&mut self) -> ImageResult<()> {
        self.tensor_stride = 1;
        let mut stride = self.tensor.elements();
        let mut strides = Vec::with_capacity(self.sizes.len());
        for &size in self.sizes.iter() {
            strides.push(isize::try_from(stride).map_err(|_| ImageError::SizeOverflow)?);
            stride = stride.checked_mul(size).ok_or(ImageError::SizeOverflow)?;
        }
        self.strides = strides.into();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::sample::DataType;
    use crate::{Image, ImageError};

    #[test]
    fn normal_strides_follow_tensor_then_axes() {
        let img = Image::new([50, 80, 30], 3, DataType::UInt8).unwrap();
        assert_eq!(&**img.strides(), &[3, 150, 12000]);
        assert_eq!(img.tensor_stride(), 1);
        assert!(img.has_normal_strides().unwrap());
        assert!(img.has_contiguous_data().unwrap());
    }

    #[test]
    fn overlapping_custom_strides_fall_back_to_normal() {
        let mut img = Image::default();
        img.set_sizes([4, 4]).unwrap();
        img.set_strides([1, 2]).unwrap();
        img.forge().unwrap();
        assert_eq!(&**img.strides(), &[1, 4]);
    }

    #[test]
    fn negative_custom_strides_place_origin_at_the_far_end() {
        let mut img = Image::default();
        img.set_data_type(DataType::UInt16).unwrap();
        img.set_sizes([3, 2]).unwrap();
        img.set_strides([-1, 3]).unwrap();
        img.forge().unwrap();
        assert_eq!(&**img.strides(), &[-1, 3]);
        let (extent, start) = img.sample_extent().unwrap();
        assert_eq!((extent, start), (6, -2));
        assert_eq!(img.origin, 4);
    }

    #[test]
    fn strip_respects_protection() {
        let mut img = Image::new([8], 1, DataType::SFloat).unwrap();
        assert!(!img.protect(true));
        assert_eq!(img.strip(), Err(ImageError::ProtectedImage));
        assert!(img.protect(false));
        img.strip().unwrap();
        assert!(!img.is_forged());
        img.strip().unwrap();
    }
}
