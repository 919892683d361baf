//! Option vocabulary: flag-set families and two-valued option enums.
//!
//! A flag-set family is declared with [`declare_options!`], which creates an
//! uninhabited tag type and an alias `Options<Tag>`. Flags from different
//! families have different types and cannot be combined or compared.
//!
//! Note that `==` on a flag set tests *containment*: `a == b` holds when every
//! flag set in `b` is also set in `a`. Code that selects behavior variants
//! reads naturally this way (`props == cmp_props::SIZES`), but it is not
//! symmetric.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, SubAssign};
use std::str::FromStr;

use crate::util::{string_compare_case_insensitive, ImageError};

/// Largest number of distinct flags in one family.
pub const MAX_FLAGS: u32 = 31;

/// A set of flags belonging to the family identified by `F`.
pub struct Options<F> {
    bits: u32,
    family: PhantomData<fn() -> F>,
}

impl<F> Options<F> {
    /// The empty set.
    pub const fn empty() -> Self {
        Self {
            bits: 0,
            family: PhantomData,
        }
    }

    /// The single flag with index `index`.
    ///
    /// Panics (at compile time when used in a `const`) if `index >= MAX_FLAGS`.
    pub const fn bit(index: u32) -> Self {
        assert!(index < MAX_FLAGS, "flag index out of range");
        Self {
            bits: 1 << index,
            family: PhantomData,
        }
    }

    /// The union of `flags`, usable in `const` declarations.
    pub const fn union_of(flags: &[Self]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < flags.len() {
            bits |= flags[i].bits;
            i += 1;
        }
        Self {
            bits,
            family: PhantomData,
        }
    }

    /// Union of two sets.
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
            family: PhantomData,
        }
    }

    /// True when every flag in `other` is also in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    /// True when no flag is set.
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// The raw bit pattern.
    pub const fn bits(self) -> u32 {
        self.bits
    }
}

impl<F> Clone for Options<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F> Copy for Options<F> {}

impl<F> Default for Options<F> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<F> fmt::Debug for Options<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Options({:#b})", self.bits)
    }
}

impl<F> PartialEq for Options<F> {
    /// Containment, not identity: see the module documentation.
    fn eq(&self, other: &Self) -> bool {
        self.contains(*other)
    }
}

impl<F> Add for Options<F> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl<F> AddAssign for Options<F> {
    fn add_assign(&mut self, rhs: Self) {
        self.bits |= rhs.bits;
    }
}

impl<F> SubAssign for Options<F> {
    fn sub_assign(&mut self, rhs: Self) {
        self.bits &= !rhs.bits;
    }
}

/// Declares a flag-set family and its flags.
///
/// Each flag is either a bit index or a bracketed list of previously declared
/// flags. Two flags given the same index are indistinguishable, which is how
/// renamed flags keep their old spelling.
///
/// ```
/// tensorimage::declare_options! {
///     pub Cleaning(CleaningFamily) {
///         pub CLEAN = 0;
///         pub FRESH = 1;
///         pub SPOTLESS = [CLEAN, FRESH];
///     }
/// }
/// assert!(SPOTLESS == CLEAN);
/// assert!(CLEAN != SPOTLESS);
/// ```
#[macro_export]
macro_rules! declare_options {
    (@flags $name:ident;) => {};
    (@flags $name:ident; $(#[$meta:meta])* $vis:vis $flag:ident = $index:literal; $($rest:tt)*) => {
        $(#[$meta])*
        $vis const $flag: $name = $crate::options::Options::bit($index);
        $crate::declare_options!(@flags $name; $($rest)*);
    };
    (@flags $name:ident; $(#[$meta:meta])* $vis:vis $flag:ident = [$($part:ident),+ $(,)?]; $($rest:tt)*) => {
        $(#[$meta])*
        $vis const $flag: $name = $crate::options::Options::union_of(&[$($part),+]);
        $crate::declare_options!(@flags $name; $($rest)*);
    };
    ($(#[$meta:meta])* $vis:vis $name:ident($family:ident) { $($body:tt)* }) => {
        #[doc(hidden)]
        #[derive(Debug)]
        $vis enum $family {}
        $(#[$meta])*
        $vis type $name = $crate::options::Options<$family>;
        $crate::declare_options!(@flags $name; $($body)*);
    };
}

/// Image properties that `Image::compare_properties` can check.
pub mod cmp_props {
    crate::declare_options! {
        /// Set of image properties to compare.
        pub CmpProps(CmpPropsFamily) {
            pub DATA_TYPE = 0;
            pub DIMENSIONALITY = 1;
            pub SIZES = 2;
            pub STRIDES = 3;
            pub TENSOR_SHAPE = 4;
            pub TENSOR_ELEMENTS = 5;
            pub TENSOR_STRIDE = 6;
            pub COLOR_SPACE = 7;
            pub PIXEL_SIZE = 8;
            /// Same number of samples laid out the same way.
            pub SAMPLES = [DATA_TYPE, SIZES, TENSOR_ELEMENTS];
            pub SHAPE = [DATA_TYPE, SIZES, TENSOR_SHAPE];
            pub FULL = [SHAPE, STRIDES, TENSOR_STRIDE];
            pub ALL = [SHAPE, COLOR_SPACE, PIXEL_SIZE];
        }
    }
}

pub use cmp_props::CmpProps;

/// Whether a failed check returns `Ok(false)` or an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThrowException {
    DontThrow,
    #[default]
    DoThrow,
}

/// Whether singleton axes may be expanded to match a larger size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AllowSingletonExpansion {
    #[default]
    DontAllow,
    DoAllow,
}

/// Whether a protected image may be reused with a different data type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AcceptDataTypeChange {
    #[default]
    DontAllow,
    DoAllow,
}

/// Where a cropped window sits relative to the source image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CropLocation {
    /// The pixel at the image center stays at the center.
    #[default]
    Center,
    /// As `Center`, but even sizes put the center left of the midpoint.
    MirrorCenter,
    /// The corner at the origin is kept.
    TopLeft,
    /// The corner opposite the origin is kept.
    BottomRight,
}

impl FromStr for CropLocation {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const NAMES: [(&str, CropLocation); 4] = [
            ("center", CropLocation::Center),
            ("mirror center", CropLocation::MirrorCenter),
            ("top left", CropLocation::TopLeft),
            ("bottom right", CropLocation::BottomRight),
        ];
        NAMES
            .iter()
            .find(|(name, _)| string_compare_case_insensitive(name, s))
            .map(|&(_, location)| location)
            .ok_or_else(|| ImageError::InvalidFlag(s.to_owned()))
    }
}
