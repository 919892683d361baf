//! Runtime sample-type tags, type classes, and type promotion.

use std::fmt;
use std::str::FromStr;

use crate::util::ImageError;

/// Runtime tag for the kind of sample stored in an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    Bin,
    UInt8,
    SInt8,
    UInt16,
    SInt16,
    UInt32,
    SInt32,
    #[default]
    SFloat,
    DFloat,
    SComplex,
    DComplex,
}

/// Data type classes: sets of data types, as a flag-set family.
///
/// `DataType::classes()` converts a tag into its single-bit class, so
/// `class::INTEGER == dt.classes()` tests membership.
pub mod class {
    crate::declare_options! {
        /// A set of data types.
        pub DataTypeClasses(DataTypeClassesFamily) {
            pub BIN = 0;
            pub UINT8 = 1;
            pub SINT8 = 2;
            pub UINT16 = 3;
            pub SINT16 = 4;
            pub UINT32 = 5;
            pub SINT32 = 6;
            pub SFLOAT = 7;
            pub DFLOAT = 8;
            pub SCOMPLEX = 9;
            pub DCOMPLEX = 10;
            pub BINARY = [BIN];
            pub UINT = [UINT8, UINT16, UINT32];
            pub SINT = [SINT8, SINT16, SINT32];
            pub INTEGER = [UINT, SINT];
            pub INT_OR_BIN = [INTEGER, BINARY];
            pub FLOAT = [SFLOAT, DFLOAT];
            pub COMPLEX = [SCOMPLEX, DCOMPLEX];
            pub FLEX = [FLOAT, COMPLEX];
            pub FLEX_BIN = [FLEX, BINARY];
            pub UNSIGNED = [BINARY, UINT];
            pub SIGNED = [SINT, FLOAT, COMPLEX];
            pub REAL = [INTEGER, FLOAT];
            pub SIGNED_REAL = [SINT, FLOAT];
            pub NON_BINARY = [REAL, COMPLEX];
            pub NON_COMPLEX = [BINARY, REAL];
            pub ALL = [BINARY, REAL, COMPLEX];
        }
    }
}

pub use class::DataTypeClasses;

impl DataType {
    /// Number of data types.
    pub const COUNT: usize = 11;

    /// All data types, in tag order.
    pub const fn all() -> [DataType; Self::COUNT] {
        use DataType::*;
        [
            Bin, UInt8, SInt8, UInt16, SInt16, UInt32, SInt32, SFloat, DFloat, SComplex, DComplex,
        ]
    }

    /// Position of this tag in `DataType::all()`.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Canonical upper-case name, as accepted by `from_str`.
    pub const fn name(self) -> &'static str {
        match self {
            DataType::Bin => "BIN",
            DataType::UInt8 => "UINT8",
            DataType::SInt8 => "SINT8",
            DataType::UInt16 => "UINT16",
            DataType::SInt16 => "SINT16",
            DataType::UInt32 => "UINT32",
            DataType::SInt32 => "SINT32",
            DataType::SFloat => "SFLOAT",
            DataType::DFloat => "DFLOAT",
            DataType::SComplex => "SCOMPLEX",
            DataType::DComplex => "DCOMPLEX",
        }
    }

    /// Size of one sample in bytes.
    pub const fn size_of(self) -> usize {
        match self {
            DataType::Bin | DataType::UInt8 | DataType::SInt8 => 1,
            DataType::UInt16 | DataType::SInt16 => 2,
            DataType::UInt32 | DataType::SInt32 | DataType::SFloat => 4,
            DataType::DFloat | DataType::SComplex => 8,
            DataType::DComplex => 16,
        }
    }

    /// The single-type class for this tag.
    pub const fn classes(self) -> DataTypeClasses {
        DataTypeClasses::bit(self as u32)
    }

    pub fn is_binary(self) -> bool {
        self == DataType::Bin
    }

    pub fn is_uint(self) -> bool {
        class::UINT == self.classes()
    }

    pub fn is_sint(self) -> bool {
        class::SINT == self.classes()
    }

    pub fn is_integer(self) -> bool {
        class::INTEGER == self.classes()
    }

    pub fn is_float(self) -> bool {
        class::FLOAT == self.classes()
    }

    pub fn is_real(self) -> bool {
        class::REAL == self.classes()
    }

    pub fn is_flex(self) -> bool {
        class::FLEX == self.classes()
    }

    pub fn is_flex_bin(self) -> bool {
        class::FLEX_BIN == self.classes()
    }

    pub fn is_complex(self) -> bool {
        class::COMPLEX == self.classes()
    }

    pub fn is_unsigned(self) -> bool {
        class::UNSIGNED == self.classes()
    }

    pub fn is_signed(self) -> bool {
        class::SIGNED == self.classes()
    }

    /// Floating-point type able to hold results computed from this type.
    pub const fn suggest_float(self) -> DataType {
        match self {
            DataType::UInt32 | DataType::SInt32 | DataType::DFloat | DataType::DComplex => {
                DataType::DFloat
            }
            _ => DataType::SFloat,
        }
    }

    /// Complex type able to hold results computed from this type.
    pub const fn suggest_complex(self) -> DataType {
        match self.suggest_float() {
            DataType::DFloat => DataType::DComplex,
            _ => DataType::SComplex,
        }
    }

    /// Complex types stay complex, everything else goes to float.
    pub const fn suggest_flex(self) -> DataType {
        match self {
            DataType::SComplex | DataType::DComplex => self,
            _ => self.suggest_float(),
        }
    }

    /// As `suggest_flex`, but binary stays binary.
    pub const fn suggest_flex_bin(self) -> DataType {
        match self {
            DataType::Bin => DataType::Bin,
            _ => self.suggest_flex(),
        }
    }

    /// Type of the absolute value of a sample.
    pub const fn suggest_abs(self) -> DataType {
        match self {
            DataType::SInt8 => DataType::UInt8,
            DataType::SInt16 => DataType::UInt16,
            DataType::SInt32 => DataType::UInt32,
            DataType::SComplex => DataType::SFloat,
            DataType::DComplex => DataType::DFloat,
            _ => self,
        }
    }

    /// Real-valued projection of a sample.
    pub const fn suggest_real(self) -> DataType {
        match self {
            DataType::Bin => DataType::UInt8,
            DataType::SComplex => DataType::SFloat,
            DataType::DComplex => DataType::DFloat,
            _ => self,
        }
    }

    /// Integer type for results computed from this type.
    pub const fn suggest_integer(self) -> DataType {
        match self {
            DataType::Bin => DataType::UInt8,
            DataType::SFloat | DataType::DFloat | DataType::SComplex | DataType::DComplex => {
                DataType::SInt32
            }
            _ => self,
        }
    }

    /// Signed type able to represent every value of this type.
    pub const fn suggest_signed(self) -> DataType {
        match self {
            DataType::Bin => DataType::SInt8,
            DataType::UInt8 => DataType::SInt16,
            DataType::UInt16 => DataType::SInt32,
            DataType::UInt32 => DataType::DFloat,
            _ => self,
        }
    }

    /// Type for arithmetic between samples of `a` and `b`: always flex.
    pub const fn suggest_arithmetic(a: DataType, b: DataType) -> DataType {
        let double = matches!(a.suggest_float(), DataType::DFloat)
            || matches!(b.suggest_float(), DataType::DFloat);
        let complex = matches!(a, DataType::SComplex | DataType::DComplex)
            || matches!(b, DataType::SComplex | DataType::DComplex);
        match (complex, double) {
            (true, true) => DataType::DComplex,
            (true, false) => DataType::SComplex,
            (false, true) => DataType::DFloat,
            (false, false) => DataType::SFloat,
        }
    }

    /// Type for a dyadic operation: equal types are kept, otherwise as `suggest_arithmetic`.
    pub fn suggest_dyadic_operation(a: DataType, b: DataType) -> DataType {
        if a == b {
            a
        } else {
            DataType::suggest_arithmetic(a, b)
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::all()
            .into_iter()
            .find(|dt| dt.name() == s)
            .ok_or_else(|| ImageError::InvalidFlag(s.to_owned()))
    }
}
