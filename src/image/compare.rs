//! Property comparison and validation.

use super::Image;
use crate::options::{cmp_props, AllowSingletonExpansion, CmpProps, ThrowException};
use crate::sample::DataTypeClasses;
use crate::util::{ImageError, ImageResult};

fn outcome(
    failure: Option<&'static str>,
    throw: ThrowException,
    error: fn(&'static str) -> ImageError,
) -> ImageResult<bool> {
    match (failure, throw) {
        (None, _) => Ok(true),
        (Some(_), ThrowException::DontThrow) => Ok(false),
        (Some(property), ThrowException::DoThrow) => Err(error(property)),
    }
}

fn differ(property: &'static str) -> ImageError {
    ImageError::PropertiesDiffer { property }
}

fn check_failed(property: &'static str) -> ImageError {
    ImageError::PropertyCheckFailed { property }
}

impl Image {
    /// Compares the properties selected by `props` against `src`.
    ///
    /// On a difference, returns `Ok(false)` or `Err(PropertiesDiffer)` naming
    /// the first differing property, depending on `throw`.
    pub fn compare_properties(
        &self,
        src: &Image,
        props: CmpProps,
        throw: ThrowException,
    ) -> ImageResult<bool> {
        self.compare_properties_with_expansion(
            src,
            props,
            AllowSingletonExpansion::DontAllow,
            throw,
        )
    }

    /// As `compare_properties`, optionally letting `src` match through singleton expansion.
    ///
    /// With expansion allowed, `src` may have fewer axes, and each of its axes
    /// of size 1 (or stride 0) is compatible with any size in `self`.
    pub fn compare_properties_with_expansion(
        &self,
        src: &Image,
        props: CmpProps,
        expansion: AllowSingletonExpansion,
        throw: ThrowException,
    ) -> ImageResult<bool> {
        let expand = expansion == AllowSingletonExpansion::DoAllow;
        let failure = if props == cmp_props::DATA_TYPE && self.data_type != src.data_type {
            Some("data type")
        } else if props == cmp_props::DIMENSIONALITY
            && !(self.sizes.len() == src.sizes.len()
                || (expand && src.sizes.len() < self.sizes.len()))
        {
            Some("dimensionality")
        } else if props == cmp_props::SIZES && !self.sizes_match(src, expand) {
            Some("sizes")
        } else if props == cmp_props::STRIDES && self.strides != src.strides {
            Some("strides")
        } else if props == cmp_props::TENSOR_SHAPE && self.tensor != src.tensor {
            Some("tensor shape")
        } else if props == cmp_props::TENSOR_ELEMENTS
            && self.tensor.elements() != src.tensor.elements()
        {
            Some("tensor elements")
        } else if props == cmp_props::TENSOR_STRIDE && self.tensor_stride != src.tensor_stride {
            Some("tensor stride")
        } else if props == cmp_props::COLOR_SPACE && self.color_space != src.color_space {
            Some("color space")
        } else if props == cmp_props::PIXEL_SIZE && self.pixel_size != src.pixel_size {
            Some("pixel size")
        } else {
            None
        };
        outcome(failure, throw, differ)
    }

    /// Checks dimensionality (ignored when 0) and that the data type belongs to `classes`.
    pub fn check_properties(
        &self,
        dimensionality: usize,
        classes: DataTypeClasses,
        throw: ThrowException,
    ) -> ImageResult<bool> {
        let failure = if dimensionality != 0 && self.sizes.len() != dimensionality {
            Some("dimensionality")
        } else if classes != self.data_type.classes() {
            Some("data type")
        } else {
            None
        };
        outcome(failure, throw, check_failed)
    }

    /// Checks the sizes and that the data type belongs to `classes`.
    pub fn check_sizes(
        &self,
        sizes: &[usize],
        classes: DataTypeClasses,
        throw: ThrowException,
    ) -> ImageResult<bool> {
        let failure = if *self.sizes != *sizes {
            Some("sizes")
        } else if classes != self.data_type.classes() {
            Some("data type")
        } else {
            None
        };
        outcome(failure, throw, check_failed)
    }

    /// Checks that the image is a forged scalar binary image of size `sizes`,
    /// or one that singleton expansion can bring to that size if allowed.
    pub fn check_is_mask(
        &self,
        sizes: &[usize],
        expansion: AllowSingletonExpansion,
        throw: ThrowException,
    ) -> ImageResult<bool> {
        self.require_forged()?;
        let sizes_ok = *self.sizes == *sizes
            || (expansion == AllowSingletonExpansion::DoAllow
                && self.is_singleton_expansion_possible(sizes));
        let failure = if !self.is_scalar() {
            Some("tensor elements")
        } else if !self.data_type.is_binary() {
            Some("data type")
        } else if !sizes_ok {
            Some("sizes")
        } else {
            None
        };
        outcome(failure, throw, check_failed)
    }

    fn sizes_match(&self, src: &Image, expand: bool) -> bool {
        if !expand {
            return self.sizes == src.sizes;
        }
        let src_sizes = if src.is_forged() {
            src.unexpanded_sizes()
        } else {
            src.sizes.clone()
        };
        src_sizes.len() <= self.sizes.len()
            && src_sizes
                .iter()
                .zip(self.sizes.iter())
                .all(|(&s, &own)| s == own || s == 1)
    }
}

#[cfg(test)]
mod tests {
    use crate::options::{cmp_props, AllowSingletonExpansion, ThrowException};
    use crate::sample::{class, DataType};
    use crate::{Image, ImageError};

    #[test]
    fn first_difference_is_reported() {
        let a = Image::new([4, 5], 1, DataType::UInt8).unwrap();
        let b = Image::new([4, 5], 1, DataType::UInt16).unwrap();
        assert!(a
            .compare_properties(&b, cmp_props::SIZES, ThrowException::DoThrow)
            .unwrap());
        assert_eq!(
            a.compare_properties(&b, cmp_props::ALL, ThrowException::DoThrow),
            Err(ImageError::PropertiesDiffer {
                property: "data type"
            })
        );
        assert!(!a
            .compare_properties(&b, cmp_props::ALL, ThrowException::DontThrow)
            .unwrap());
    }

    #[test]
    fn expansion_accepts_singleton_axes_of_the_source() {
        let a = Image::new([4, 5, 2], 1, DataType::SFloat).unwrap();
        let b = Image::new([4, 1], 1, DataType::SFloat).unwrap();
        let props = cmp_props::DIMENSIONALITY + cmp_props::SIZES;
        assert!(!a
            .compare_properties(&b, props, ThrowException::DontThrow)
            .unwrap());
        assert!(a
            .compare_properties_with_expansion(
                &b,
                props,
                AllowSingletonExpansion::DoAllow,
                ThrowException::DoThrow
            )
            .unwrap());
    }

    #[test]
    fn mask_checks() {
        let mask = Image::new([4, 1], 1, DataType::Bin).unwrap();
        assert_eq!(
            mask.check_is_mask(&[4, 3], AllowSingletonExpansion::DontAllow, ThrowException::DoThrow),
            Err(ImageError::PropertyCheckFailed { property: "sizes" })
        );
        assert!(mask
            .check_is_mask(&[4, 3], AllowSingletonExpansion::DoAllow, ThrowException::DoThrow)
            .unwrap());
        let grey = Image::new([4, 3], 1, DataType::UInt8).unwrap();
        assert!(!grey
            .check_is_mask(&[4, 3], AllowSingletonExpansion::DontAllow, ThrowException::DontThrow)
            .unwrap());
        assert_eq!(
            Image::default().check_is_mask(&[], AllowSingletonExpansion::DontAllow, ThrowException::DontThrow),
            Err(ImageError::ImageNotForged)
        );
    }

    #[test]
    fn property_checks_use_class_membership() {
        let img = Image::new([8, 8], 1, DataType::SInt16).unwrap();
        assert!(img
            .check_properties(2, class::INTEGER, ThrowException::DoThrow)
            .unwrap());
        assert!(img
            .check_properties(0, class::SIGNED, ThrowException::DoThrow)
            .unwrap());
        assert_eq!(
            img.check_properties(2, class::FLOAT, ThrowException::DoThrow),
            Err(ImageError::PropertyCheckFailed {
                property: "data type"
            })
        );
        assert!(!img
            .check_sizes(&[8, 9], class::ALL, ThrowException::DontThrow)
            .unwrap());
    }
}
