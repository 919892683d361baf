//! The binary sample type.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use bytemuck::{CheckedBitPattern, NoUninit, Zeroable};

/// A one-byte boolean sample whose stored byte is always `0x00` or `0x01`.
///
/// Construction from a number tests it against zero, and every logical
/// operator re-normalizes its result, so generic code that reinterprets the
/// raw buffer never sees another bit pattern.
#[derive(Clone, Copy, Default, Zeroable, NoUninit)]
#[repr(transparent)]
pub struct Bin(u8);

// SAFETY: `Bin` is a transparent wrapper around `u8`; only 0 and 1 are valid.
unsafe impl CheckedBitPattern for Bin {
    type Bits = u8;

    fn is_valid_bit_pattern(bits: &u8) -> bool {
        *bits <= 1
    }
}

impl Bin {
    pub const FALSE: Bin = Bin(0);
    pub const TRUE: Bin = Bin(1);

    /// Constructs from a boolean.
    pub const fn new(value: bool) -> Self {
        Bin(value as u8)
    }

    /// Constructs from any numeric value: nonzero is true.
    pub fn from_value<T: Default + PartialEq>(value: T) -> Self {
        Bin::new(value != T::default())
    }

    /// Reinterprets a raw buffer byte, rejecting anything but 0 and 1.
    pub fn from_byte(byte: u8) -> Option<Self> {
        bytemuck::checked::try_cast::<u8, Bin>(byte).ok()
    }

    /// The truth value.
    pub const fn get(self) -> bool {
        self.0 != 0
    }

    /// The stored byte, always 0 or 1.
    pub const fn to_byte(self) -> u8 {
        self.0
    }
}

impl From<bool> for Bin {
    fn from(value: bool) -> Self {
        Bin::new(value)
    }
}

impl From<Bin> for bool {
    fn from(value: Bin) -> Self {
        value.get()
    }
}

impl Not for Bin {
    type Output = Bin;

    fn not(self) -> Bin {
        Bin::new(!self.get())
    }
}

impl BitAnd for Bin {
    type Output = Bin;

    fn bitand(self, rhs: Bin) -> Bin {
        Bin::new(self.get() && rhs.get())
    }
}

impl BitOr for Bin {
    type Output = Bin;

    fn bitor(self, rhs: Bin) -> Bin {
        Bin::new(self.get() || rhs.get())
    }
}

impl BitXor for Bin {
    type Output = Bin;

    fn bitxor(self, rhs: Bin) -> Bin {
        Bin::new(self.get() != rhs.get())
    }
}

impl PartialEq for Bin {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl Eq for Bin {}

impl PartialEq<bool> for Bin {
    fn eq(&self, other: &bool) -> bool {
        self.get() == *other
    }
}

macro_rules! truthiness_eq {
    ($($ty:ty),+) => {$(
        impl PartialEq<$ty> for Bin {
            fn eq(&self, other: &$ty) -> bool {
                self.get() == (*other != <$ty>::default())
            }
        }
    )+};
}

truthiness_eq!(u8, i8, u16, i16, u32, i32, u64, i64, usize, isize, f32, f64);

impl PartialOrd for Bin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bin {
    fn cmp(&self, other: &Self) -> Ordering {
        self.get().cmp(&other.get())
    }
}

impl fmt::Debug for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.get(), f)
    }
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.get(), f)
    }
}
