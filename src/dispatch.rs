//! Runtime-to-compile-time type dispatch.
//!
//! A type-generic algorithm is written once as a visitor: a value whose
//! `visit::<T>()` method runs the algorithm for sample type `T`. The dispatch
//! functions map a runtime [`DataType`] onto the matching `visit` call, and
//! fail with [`ImageError::UnsupportedDataType`] for types outside the
//! visitor's subset. Each subset has its own visitor trait so that `visit`
//! can rely on the matching bound (arithmetic, ordering, complex parts).
//!
//! ```
//! use tensorimage::dispatch::{dispatch_real, RealVisitor};
//! use tensorimage::sample::{DataType, RealSample, Sample};
//!
//! struct Highest;
//!
//! impl RealVisitor for Highest {
//!     type Output = f64;
//!     fn visit<T: RealSample>(self) -> f64 {
//!         T::HIGHEST.to_f64()
//!     }
//! }
//!
//! assert_eq!(dispatch_real(DataType::UInt8, Highest).unwrap(), 255.0);
//! assert!(dispatch_real(DataType::SComplex, Highest).is_err());
//! ```

use num_complex::{Complex32, Complex64};

use crate::sample::{
    Bin, ComplexSample, DataType, DataTypeClasses, FlexSample, FloatSample, IntegerSample,
    NonBinarySample, RealSample, Sample,
};
use crate::trace::trace_event;
use crate::util::{ImageError, ImageResult};

fn unsupported(data_type: DataType) -> ImageError {
    trace_event!("dispatch_unsupported", data_type = data_type.name());
    ImageError::UnsupportedDataType { data_type }
}

macro_rules! visitor_family {
    (
        $(#[$meta:meta])*
        $visitor:ident: $bound:ident, $entry:ident, [$($dt:ident => $ty:ty),+ $(,)?]
    ) => {
        $(#[$meta])*
        pub trait $visitor {
            type Output;
            fn visit<T: $bound>(self) -> Self::Output;
        }

        #[doc = concat!("Calls `", stringify!($visitor), "::visit` for the type tagged by `data_type`.")]
        pub fn $entry<V: $visitor>(data_type: DataType, visitor: V) -> ImageResult<V::Output> {
            match data_type {
                $(DataType::$dt => Ok(visitor.visit::<$ty>()),)+
                #[allow(unreachable_patterns)]
                other => Err(unsupported(other)),
            }
        }
    };
}

visitor_family! {
    /// Visitor over every sample type.
    SampleVisitor: Sample, dispatch_all, [
        Bin => Bin, UInt8 => u8, SInt8 => i8, UInt16 => u16, SInt16 => i16,
        UInt32 => u32, SInt32 => i32, SFloat => f32, DFloat => f64,
        SComplex => Complex32, DComplex => Complex64,
    ]
}

visitor_family! {
    /// Visitor over integer and floating-point types.
    RealVisitor: RealSample, dispatch_real, [
        UInt8 => u8, SInt8 => i8, UInt16 => u16, SInt16 => i16,
        UInt32 => u32, SInt32 => i32, SFloat => f32, DFloat => f64,
    ]
}

visitor_family! {
    /// Visitor over signed and unsigned integer types.
    IntegerVisitor: IntegerSample, dispatch_integer, [
        UInt8 => u8, SInt8 => i8, UInt16 => u16, SInt16 => i16,
        UInt32 => u32, SInt32 => i32,
    ]
}

visitor_family! {
    /// Visitor over floating-point types.
    FloatVisitor: FloatSample, dispatch_float, [SFloat => f32, DFloat => f64]
}

visitor_family! {
    /// Visitor over complex types.
    ComplexVisitor: ComplexSample, dispatch_complex, [SComplex => Complex32, DComplex => Complex64]
}

visitor_family! {
    /// Visitor over floating-point and complex types.
    FlexVisitor: FlexSample, dispatch_flex, [
        SFloat => f32, DFloat => f64, SComplex => Complex32, DComplex => Complex64,
    ]
}

visitor_family! {
    /// Visitor over every type except binary.
    NonBinaryVisitor: NonBinarySample, dispatch_non_binary, [
        UInt8 => u8, SInt8 => i8, UInt16 => u16, SInt16 => i16,
        UInt32 => u32, SInt32 => i32, SFloat => f32, DFloat => f64,
        SComplex => Complex32, DComplex => Complex64,
    ]
}

/// Dispatches over all types, restricted to the types in `classes`.
pub fn dispatch<V: SampleVisitor>(
    data_type: DataType,
    classes: DataTypeClasses,
    visitor: V,
) -> ImageResult<V::Output> {
    if classes != data_type.classes() {
        return Err(unsupported(data_type));
    }
    dispatch_all(data_type, visitor)
}

/// A table of per-type instantiations, indexed by data type.
///
/// Building the table runs the visitor once for every type in `classes`;
/// typically the visitor returns a monomorphized function pointer that is
/// then looked up per call without further matching.
#[derive(Clone, Debug)]
pub struct DispatchTable<F> {
    entries: [Option<F>; DataType::COUNT],
}

impl<F> DispatchTable<F> {
    pub fn new<V>(classes: DataTypeClasses, visitor: V) -> Self
    where
        V: SampleVisitor<Output = F> + Clone,
    {
        let entries = DataType::all().map(|data_type| {
            if classes == data_type.classes() {
                dispatch_all(data_type, visitor.clone()).ok()
            } else {
                None
            }
        });
        Self { entries }
    }

    /// The entry for `data_type`.
    pub fn get(&self, data_type: DataType) -> ImageResult<&F> {
        self.entries[data_type.index()]
            .as_ref()
            .ok_or_else(|| unsupported(data_type))
    }

    pub fn supports(&self, data_type: DataType) -> bool {
        self.entries[data_type.index()].is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{dispatch, dispatch_all, dispatch_complex, ComplexVisitor, SampleVisitor};
    use crate::sample::{class, ComplexSample, DataType, Sample};
    use crate::ImageError;

    struct Tag;

    impl SampleVisitor for Tag {
        type Output = DataType;
        fn visit<T: Sample>(self) -> DataType {
            T::DATA_TYPE
        }
    }

    struct ComponentSize;

    impl ComplexVisitor for ComponentSize {
        type Output = usize;
        fn visit<T: ComplexSample>(self) -> usize {
            std::mem::size_of::<T::Component>()
        }
    }

    #[test]
    fn every_type_reaches_its_own_instantiation() {
        for data_type in DataType::all() {
            assert_eq!(dispatch_all(data_type, Tag).unwrap(), data_type);
        }
    }

    #[test]
    fn subsets_reject_other_types() {
        assert_eq!(dispatch_complex(DataType::DComplex, ComponentSize).unwrap(), 8);
        assert_eq!(
            dispatch_complex(DataType::SFloat, ComponentSize),
            Err(ImageError::UnsupportedDataType {
                data_type: DataType::SFloat
            })
        );
        assert!(dispatch(DataType::UInt16, class::UNSIGNED, Tag).is_ok());
        assert!(dispatch(DataType::SInt16, class::UNSIGNED, Tag).is_err());
    }
}
