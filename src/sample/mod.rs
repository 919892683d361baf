//! Sample types: the compile-time side of the data type registry.
//!
//! Every runtime [`DataType`] has exactly one Rust type implementing
//! [`Sample`]. The associated types give the promotion results used by
//! type-generic algorithms, and agree with the runtime `DataType::suggest_*`
//! functions.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use bytemuck::{CheckedBitPattern, NoUninit};
use num_complex::{Complex32, Complex64};

mod bin;
mod datatype;

pub use bin::Bin;
pub use datatype::{class, DataType, DataTypeClasses};

mod sealed {
    pub trait Sealed {}
}

/// A pixel sample type.
///
/// Sealed: the set of sample types is closed and matches [`DataType`].
pub trait Sample:
    Copy
    + Default
    + PartialEq
    + fmt::Debug
    + Send
    + Sync
    + NoUninit
    + CheckedBitPattern
    + 'static
    + sealed::Sealed
{
    /// Runtime tag for this type.
    const DATA_TYPE: DataType;

    /// Floating-point result type.
    type Float: FloatSample;
    /// Complex result type.
    type Complex: ComplexSample;
    /// Float for real inputs, complex for complex inputs.
    type Flex: FlexSample;
    /// As `Flex`, but binary stays binary.
    type FlexBin: Sample;
    /// Type of the absolute value.
    type Abs: Sample;
    /// Real-valued projection.
    type Real: Sample;

    /// Converts from `f64`, rounding and saturating for integer types.
    fn from_f64(value: f64) -> Self;

    /// The value (real part for complex types, 0 or 1 for binary) as `f64`.
    fn to_f64(self) -> f64;

    /// Converts from a complex value; real types take the real part.
    fn from_complex(value: Complex64) -> Self;

    /// The value as a complex number.
    fn to_complex(self) -> Complex64;
}

/// Integer and floating-point samples.
pub trait RealSample: Sample + PartialOrd {
    const LOWEST: Self;
    const HIGHEST: Self;
}

/// Signed and unsigned integer samples.
pub trait IntegerSample: RealSample + Ord + Eq {}

/// Single and double precision floating-point samples.
pub trait FloatSample: RealSample + NonBinarySample + FlexSample {}

/// Single and double precision complex samples.
pub trait ComplexSample: NonBinarySample + FlexSample {
    /// Type of the real and imaginary components.
    type Component: FloatSample;

    fn new(re: Self::Component, im: Self::Component) -> Self;
    fn re(self) -> Self::Component;
    fn im(self) -> Self::Component;
}

/// Floating-point or complex samples.
pub trait FlexSample: Sample {}

/// Every sample type except binary: supports arithmetic.
pub trait NonBinarySample:
    Sample + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self>
{
}

macro_rules! promotions {
    ($ty:ty, $dt:ident, $float:ty, $complex:ty, $flex:ty, $flex_bin:ty, $abs:ty, $real:ty) => {
        impl sealed::Sealed for $ty {}

        impl Sample for $ty {
            const DATA_TYPE: DataType = DataType::$dt;
            type Float = $float;
            type Complex = $complex;
            type Flex = $flex;
            type FlexBin = $flex_bin;
            type Abs = $abs;
            type Real = $real;

            #[inline]
            fn from_f64(value: f64) -> Self {
                convert::from_f64(value)
            }

            #[inline]
            fn to_f64(self) -> f64 {
                convert::to_f64(self)
            }

            #[inline]
            fn from_complex(value: Complex64) -> Self {
                convert::from_complex(value)
            }

            #[inline]
            fn to_complex(self) -> Complex64 {
                convert::to_complex(self)
            }
        }
    };
}

promotions!(Bin, Bin, f32, Complex32, f32, Bin, Bin, u8);
promotions!(u8, UInt8, f32, Complex32, f32, f32, u8, u8);
promotions!(i8, SInt8, f32, Complex32, f32, f32, u8, i8);
promotions!(u16, UInt16, f32, Complex32, f32, f32, u16, u16);
promotions!(i16, SInt16, f32, Complex32, f32, f32, u16, i16);
promotions!(u32, UInt32, f64, Complex64, f64, f64, u32, u32);
promotions!(i32, SInt32, f64, Complex64, f64, f64, u32, i32);
promotions!(f32, SFloat, f32, Complex32, f32, f32, f32, f32);
promotions!(f64, DFloat, f64, Complex64, f64, f64, f64, f64);
promotions!(Complex32, SComplex, f32, Complex32, Complex32, Complex32, f32, f32);
promotions!(Complex64, DComplex, f64, Complex64, Complex64, Complex64, f64, f64);

/// Per-kind conversion helpers, dispatched through a private trait so that
/// the promotion table above stays one line per type.
mod convert {
    use num_complex::{Complex, Complex64};

    use super::Bin;

    pub(super) trait Convert: Sized {
        fn from_f64(value: f64) -> Self;
        fn to_f64(self) -> f64;
        fn from_complex(value: Complex64) -> Self {
            Self::from_f64(value.re)
        }
        fn to_complex(self) -> Complex64 {
            Complex64::new(self.to_f64(), 0.0)
        }
    }

    pub(super) fn from_f64<T: Convert>(value: f64) -> T {
        T::from_f64(value)
    }

    pub(super) fn to_f64<T: Convert>(value: T) -> f64 {
        value.to_f64()
    }

    pub(super) fn from_complex<T: Convert>(value: Complex64) -> T {
        T::from_complex(value)
    }

    pub(super) fn to_complex<T: Convert>(value: T) -> Complex64 {
        value.to_complex()
    }

    impl Convert for Bin {
        fn from_f64(value: f64) -> Self {
            Bin::new(value != 0.0)
        }

        fn to_f64(self) -> f64 {
            if self.get() {
                1.0
            } else {
                0.0
            }
        }

        fn from_complex(value: Complex64) -> Self {
            Bin::new(value.re != 0.0 || value.im != 0.0)
        }
    }

    macro_rules! integer {
        ($($ty:ty),+) => {$(
            impl Convert for $ty {
                fn from_f64(value: f64) -> Self {
                    value.round() as $ty
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )+};
    }

    macro_rules! float {
        ($($ty:ty),+) => {$(
            impl Convert for $ty {
                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }

            impl Convert for Complex<$ty> {
                fn from_f64(value: f64) -> Self {
                    Complex::new(value as $ty, 0.0)
                }

                fn to_f64(self) -> f64 {
                    self.re as f64
                }

                fn from_complex(value: Complex64) -> Self {
                    Complex::new(value.re as $ty, value.im as $ty)
                }

                fn to_complex(self) -> Complex64 {
                    Complex64::new(self.re as f64, self.im as f64)
                }
            }
        )+};
    }

    integer!(u8, i8, u16, i16, u32, i32);
    float!(f32, f64);
}

macro_rules! real_bounds {
    ($($ty:ty),+) => {$(
        impl RealSample for $ty {
            const LOWEST: Self = <$ty>::MIN;
            const HIGHEST: Self = <$ty>::MAX;
        }
        impl NonBinarySample for $ty {}
    )+};
}

real_bounds!(u8, i8, u16, i16, u32, i32, f32, f64);

impl IntegerSample for u8 {}
impl IntegerSample for i8 {}
impl IntegerSample for u16 {}
impl IntegerSample for i16 {}
impl IntegerSample for u32 {}
impl IntegerSample for i32 {}

impl FlexSample for f32 {}
impl FlexSample for f64 {}
impl FlexSample for Complex32 {}
impl FlexSample for Complex64 {}

impl FloatSample for f32 {}
impl FloatSample for f64 {}

impl NonBinarySample for Complex32 {}
impl NonBinarySample for Complex64 {}

impl ComplexSample for Complex32 {
    type Component = f32;

    fn new(re: f32, im: f32) -> Self {
        Complex32::new(re, im)
    }

    fn re(self) -> f32 {
        self.re
    }

    fn im(self) -> f32 {
        self.im
    }
}

impl ComplexSample for Complex64 {
    type Component = f64;

    fn new(re: f64, im: f64) -> Self {
        Complex64::new(re, im)
    }

    fn re(self) -> f64 {
        self.re
    }

    fn im(self) -> f64 {
        self.im
    }
}
