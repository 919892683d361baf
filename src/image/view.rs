//! Views: new headers over the same buffer, and in-place header transforms.
//!
//! None of these copy or move samples. Views returned by value share the
//! buffer with the source image and are never protected.

use super::{test_sizes, Image, Tensor};
use crate::array::{BooleanArray, UnsignedArray};
use crate::options::CropLocation;
use crate::range::Range;
use crate::trace::trace_event;
use crate::util::{ImageError, ImageResult};

impl Image {
    /// A view of the pixels selected by one range per axis.
    ///
    /// An empty slice selects the whole image.
    pub fn at(&self, ranges: &[Range]) -> ImageResult<Image> {
        self.require_forged()?;
        let mut out = self.view();
        if ranges.is_empty() {
            return Ok(out);
        }
        if ranges.len() != self.sizes.len() {
            return Err(ImageError::ArrayParameterWrongLength {
                expected: self.sizes.len(),
                got: ranges.len(),
            });
        }
        let mut offset = 0;
        for (dim, range) in ranges.iter().enumerate() {
            let mut range = *range;
            range.fix(self.sizes[dim])?;
            offset += range.offset() as isize * self.strides[dim];
            out.sizes[dim] = range.size();
            out.strides[dim] = self.strides[dim] * range.step();
        }
        out.shift_origin(offset);
        trace_event!("view", pixels = out.number_of_pixels(), origin = out.origin);
        Ok(out)
    }

    /// A view of the tensor elements selected by `range`, as a column vector.
    pub fn tensor_elements_view(&self, range: Range) -> ImageResult<Image> {
        self.require_forged()?;
        let mut range = range;
        range.fix(self.tensor.elements())?;
        let mut out = self.view();
        out.tensor = Tensor::vector(range.size())?;
        out.tensor_stride = self.tensor_stride * range.step();
        out.shift_origin(range.offset() as isize * self.tensor_stride);
        out.reset_color_space();
        Ok(out)
    }

    /// A scalar view of tensor element `index`.
    pub fn tensor_element(&self, index: usize) -> ImageResult<Image> {
        let index = isize::try_from(index).map_err(|_| ImageError::IndexOutOfRange {
            index: isize::MAX,
            size: self.tensor.elements(),
        })?;
        self.tensor_elements_view(Range::single(index))
    }

    /// A view of size `sizes` cut out of the image at `location`.
    pub fn cropped(&self, sizes: &[usize], location: CropLocation) -> ImageResult<Image> {
        self.require_forged()?;
        if sizes.len() != self.sizes.len() {
            return Err(ImageError::ArrayParameterWrongLength {
                expected: self.sizes.len(),
                got: sizes.len(),
            });
        }
        let mut ranges = Vec::with_capacity(sizes.len());
        for (dim, (&size, &new)) in self.sizes.iter().zip(sizes).enumerate() {
            if new == 0 || new > size {
                return Err(ImageError::InvalidSize { dim });
            }
            let start = match location {
                CropLocation::Center => size / 2 - new / 2,
                CropLocation::MirrorCenter => (size - 1) / 2 - (new - 1) / 2,
                CropLocation::TopLeft => 0,
                CropLocation::BottomRight => size - new,
            };
            ranges.push(Range::new(start as isize, (start + new - 1) as isize));
        }
        self.at(&ranges)
    }

    /// The real component of a complex image, as a view.
    pub fn real(&self) -> ImageResult<Image> {
        self.complex_component(0)
    }

    /// The imaginary component of a complex image, as a view.
    pub fn imaginary(&self) -> ImageResult<Image> {
        self.complex_component(1)
    }

    fn complex_component(&self, component: usize) -> ImageResult<Image> {
        self.require_forged()?;
        if !self.data_type.is_complex() {
            return Err(ImageError::NotComplex);
        }
        let mut out = self.view();
        out.data_type = self.data_type.suggest_real();
        for stride in out.strides.iter_mut() {
            *stride *= 2;
        }
        out.tensor_stride *= 2;
        out.origin += component * out.data_type.size_of();
        Ok(out)
    }

    /// Mirrors the axes for which `process` is true (all axes if empty).
    pub fn mirror(&mut self, process: &BooleanArray) -> ImageResult<()> {
        self.require_forged()?;
        let mut process = process.clone();
        process.broadcast(self.sizes.len(), true)?;
        let mut offset = 0;
        for dim in 0..self.sizes.len() {
            if process[dim] {
                offset += (self.sizes[dim] - 1) as isize * self.strides[dim];
                self.strides[dim] = -self.strides[dim];
            }
        }
        self.shift_origin(offset);
        Ok(())
    }

    /// Reorders the axes: new axis `i` is old axis `order[i]`.
    pub fn permute_dimensions(&mut self, order: &[usize]) -> ImageResult<()> {
        self.require_forged()?;
        let n = self.sizes.len();
        if order.len() != n {
            return Err(ImageError::ArrayParameterWrongLength {
                expected: n,
                got: order.len(),
            });
        }
        let mut seen = vec![false; n];
        for &dim in order {
            if dim >= n || std::mem::replace(&mut seen[dim], true) {
                return Err(ImageError::ParameterOutOfRange(
                    "order must be a permutation of the axes",
                ));
            }
        }
        self.sizes = self.sizes.permute(order)?;
        self.strides = self.strides.permute(order)?;
        self.pixel_size.permute(order);
        Ok(())
    }

    pub fn swap_dimensions(&mut self, dim1: usize, dim2: usize) -> ImageResult<()> {
        self.require_forged()?;
        let n = self.sizes.len();
        for dim in [dim1, dim2] {
            if dim >= n {
                return Err(ImageError::IndexOutOfRange {
                    index: dim as isize,
                    size: n,
                });
            }
        }
        let mut order: Vec<usize> = (0..n).collect();
        order.swap(dim1, dim2);
        self.sizes.swap(dim1, dim2);
        self.strides.swap(dim1, dim2);
        self.pixel_size.permute(&order);
        Ok(())
    }

    /// Removes all axes of size 1.
    pub fn squeeze(&mut self) -> ImageResult<()> {
        self.require_forged()?;
        for dim in (0..self.sizes.len()).rev() {
            if self.sizes[dim] == 1 {
                self.sizes.remove(dim)?;
                self.strides.remove(dim)?;
                self.pixel_size.remove(dim);
            }
        }
        Ok(())
    }

    /// Inserts an axis of size 1 before axis `dim` (or at the end).
    pub fn add_singleton(&mut self, dim: usize) -> ImageResult<()> {
        self.require_forged()?;
        self.sizes.insert(dim, 1)?;
        self.strides.insert(dim, 0)?;
        self.pixel_size.insert(dim);
        Ok(())
    }

    /// Appends axes of size 1 until the image has `dimensionality` axes.
    pub fn expand_dimensionality(&mut self, dimensionality: usize) -> ImageResult<()> {
        self.require_forged()?;
        while self.sizes.len() < dimensionality {
            self.sizes.push(1);
            self.strides.push(0);
        }
        Ok(())
    }

    /// Repeats the single pixel along axis `dim` `size` times (stride 0).
    pub fn expand_singleton_dimension(&mut self, dim: usize, size: usize) -> ImageResult<()> {
        self.require_forged()?;
        let current = self.size(dim)?;
        if current != 1 {
            return Err(ImageError::ParameterOutOfRange(
                "only singleton axes can be expanded",
            ));
        }
        let mut sizes = self.sizes.clone();
        sizes[dim] = size;
        test_sizes(&sizes)?;
        self.sizes = sizes;
        self.strides[dim] = 0;
        Ok(())
    }

    /// True if singleton expansion can turn this image into one of size `sizes`.
    pub fn is_singleton_expansion_possible(&self, sizes: &[usize]) -> bool {
        sizes.len() >= self.sizes.len()
            && self
                .sizes
                .iter()
                .zip(sizes)
                .all(|(&own, &other)| own == other || own == 1)
    }

    /// Expands singleton axes (adding axes as needed) to reach size `sizes`.
    pub fn expand_singleton_dimensions(&mut self, sizes: &[usize]) -> ImageResult<()> {
        self.require_forged()?;
        if !self.is_singleton_expansion_possible(sizes) {
            return Err(ImageError::PropertiesDiffer { property: "sizes" });
        }
        let target = UnsignedArray::from(sizes);
        test_sizes(&target)?;
        let mut strides = self.strides.clone();
        strides.resize(target.len(), 0);
        for (dim, stride) in strides.iter_mut().enumerate() {
            if self.sizes.get(dim) != Some(&target[dim]) {
                *stride = 0;
            }
        }
        self.sizes = target;
        self.strides = strides;
        Ok(())
    }

    /// True if any axis repeats its samples through a zero stride.
    pub fn is_singleton_expanded(&self) -> bool {
        self.is_forged()
            && self
                .sizes
                .iter()
                .zip(self.strides.iter())
                .any(|(&size, &stride)| size > 1 && stride == 0)
    }

    /// Sizes and strides of the axes that are not singleton-expanded.
    pub(crate) fn unexpanded_sizes(&self) -> UnsignedArray {
        self.sizes
            .iter()
            .zip(self.strides.iter())
            .map(|(&size, &stride)| if stride == 0 { 1 } else { size })
            .collect()
    }

    fn view(&self) -> Image {
        let mut out = self.clone();
        out.protect = false;
        out
    }

    fn shift_origin(&mut self, samples: isize) {
        let bytes = samples * self.data_type.size_of() as isize;
        self.origin = (self.origin as isize + bytes) as usize;
    }
}

#[cfg(test)]
mod tests {
    use crate::array::BooleanArray;
    use crate::options::CropLocation;
    use crate::sample::DataType;
    use crate::{Image, ImageError, Range};

    #[test]
    fn mirroring_twice_restores_the_header() {
        let img = Image::new([5, 4], 1, DataType::SInt16).unwrap();
        let mut view = img.clone();
        view.mirror(&BooleanArray::from([true, false])).unwrap();
        assert_eq!(&**view.strides(), &[-1, 5]);
        assert_eq!(view.origin, 8);
        view.mirror(&BooleanArray::from([true, false])).unwrap();
        assert!(view.is_identical_view(&img));
    }

    #[test]
    fn crop_locations() {
        let img = Image::new([10], 1, DataType::UInt8).unwrap();
        let offset = |loc| img.cropped(&[3], loc).unwrap().origin;
        assert_eq!(offset(CropLocation::Center), 4);
        assert_eq!(offset(CropLocation::MirrorCenter), 3);
        assert_eq!(offset(CropLocation::TopLeft), 0);
        assert_eq!(offset(CropLocation::BottomRight), 7);
        assert_eq!(
            img.cropped(&[11], CropLocation::Center).unwrap_err(),
            ImageError::InvalidSize { dim: 0 }
        );
    }

    #[test]
    fn views_are_not_protected() {
        let mut img = Image::new([4, 4], 1, DataType::SFloat).unwrap();
        img.protect(true);
        let view = img.at(&[Range::new(1, 2), Range::all()]).unwrap();
        assert!(!view.is_protected());
        assert!(view.shares_data(&img));
    }

    #[test]
    fn imaginary_part_starts_one_component_in() {
        let img = Image::new([3], 2, DataType::DComplex).unwrap();
        let im = img.imaginary().unwrap();
        assert_eq!(im.data_type(), DataType::DFloat);
        assert_eq!(&**im.strides(), &[4]);
        assert_eq!(im.tensor_stride(), 2);
        assert_eq!(im.origin, 8);
        assert_eq!(img.real().unwrap().origin, 0);
        let real = Image::new([3], 1, DataType::SFloat).unwrap();
        assert_eq!(real.real().unwrap_err(), ImageError::NotComplex);
    }
}
