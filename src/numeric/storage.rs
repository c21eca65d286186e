// ============================================================================
// Storage-Type Selector
// Maps a total bit count and signedness to the narrowest native integer
// ============================================================================

use super::errors::{NumericError, NumericResult};
use std::fmt;
use std::hash::Hash;
use typenum::consts::{
    U1, U10, U11, U12, U13, U14, U15, U16, U17, U18, U19, U2, U20, U21, U22, U23, U24, U25, U26,
    U27, U28, U29, U3, U30, U31, U32, U33, U34, U35, U36, U37, U38, U39, U4, U40, U41, U42, U43,
    U44, U45, U46, U47, U48, U49, U5, U50, U51, U52, U53, U54, U55, U56, U57, U58, U59, U6, U60,
    U61, U62, U63, U64, U7, U8, U9,
};
use typenum::{Bit, B0, B1};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The native integer kinds a fixed-point value can be backed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IntegerKind {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
}

impl IntegerKind {
    /// Select the narrowest native integer able to hold `total_bits`.
    ///
    /// # Errors
    /// Returns `InvalidWidth` for `total_bits == 0` or `total_bits > 64`.
    ///
    /// # Example
    /// ```
    /// use fixedpt::numeric::IntegerKind;
    ///
    /// assert_eq!(IntegerKind::select(8, false), Ok(IntegerKind::U8));
    /// assert_eq!(IntegerKind::select(33, true), Ok(IntegerKind::I64));
    /// assert!(IntegerKind::select(65, false).is_err());
    /// ```
    pub const fn select(total_bits: u32, signed: bool) -> NumericResult<Self> {
        let kind = match (total_bits, signed) {
            (1..=8, false) => IntegerKind::U8,
            (9..=16, false) => IntegerKind::U16,
            (17..=32, false) => IntegerKind::U32,
            (33..=64, false) => IntegerKind::U64,
            (1..=8, true) => IntegerKind::I8,
            (9..=16, true) => IntegerKind::I16,
            (17..=32, true) => IntegerKind::I32,
            (33..=64, true) => IntegerKind::I64,
            _ => return Err(NumericError::InvalidWidth { bits: total_bits }),
        };
        Ok(kind)
    }

    /// Width of the native integer in bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            IntegerKind::U8 | IntegerKind::I8 => 8,
            IntegerKind::U16 | IntegerKind::I16 => 16,
            IntegerKind::U32 | IntegerKind::I32 => 32,
            IntegerKind::U64 | IntegerKind::I64 => 64,
        }
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            IntegerKind::I8 | IntegerKind::I16 | IntegerKind::I32 | IntegerKind::I64
        )
    }
}

impl fmt::Display for IntegerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntegerKind::U8 => "u8",
            IntegerKind::U16 => "u16",
            IntegerKind::U32 => "u32",
            IntegerKind::U64 => "u64",
            IntegerKind::I8 => "i8",
            IntegerKind::I16 => "i16",
            IntegerKind::I32 => "i32",
            IntegerKind::I64 => "i64",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Native Storage
// ============================================================================

/// A native integer usable as fixed-point backing storage.
///
/// Every value fits in an `i128`, which the arithmetic engine uses as its
/// exact intermediate representation.
pub trait Storage:
    Copy + Default + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// The kind this integer corresponds to
    const KIND: IntegerKind;

    /// Widen losslessly.
    fn to_i128(self) -> i128;

    /// Narrow with native truncation. Callers keep `value` in range.
    fn from_i128(value: i128) -> Self;
}

macro_rules! impl_storage {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl Storage for $ty {
                const KIND: IntegerKind = IntegerKind::$kind;

                #[inline]
                fn to_i128(self) -> i128 {
                    self as i128
                }

                #[inline]
                fn from_i128(value: i128) -> Self {
                    value as $ty
                }
            }
        )+
    };
}

impl_storage! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
}

// ============================================================================
// Type-Level Selection
// ============================================================================

/// Type-level counterpart of [`IntegerKind::select`].
///
/// Implemented for the typenum widths `U1..=U64`; `S` is `B0` for unsigned
/// and `B1` for signed storage. A zero or over-wide total has no
/// implementation, so such a shape is rejected where it is named.
///
/// A shape with no bits at all:
///
/// ```compile_fail
/// use fixedpt::numeric::UFix;
/// use fixedpt::typenum::U0;
///
/// let _ = UFix::<U0, U0>::zero();
/// ```
///
/// A 70-bit shape has no native backing integer:
///
/// ```compile_fail
/// use fixedpt::numeric::IFix;
/// use fixedpt::typenum::{U30, U40};
///
/// let _ = IFix::<U40, U30>::zero();
/// ```
///
/// Two valid operands whose promoted shape exceeds 64 bits cannot be
/// combined:
///
/// ```compile_fail
/// use fixedpt::numeric::UFix;
/// use fixedpt::typenum::{U0, U30, U40};
///
/// let _ = UFix::<U40, U0>::zero() + UFix::<U0, U30>::zero();
/// ```
///
/// The same operands each compile on their own:
///
/// ```
/// use fixedpt::numeric::UFix;
/// use fixedpt::typenum::{U0, U30, U40};
///
/// let wide = UFix::<U40, U0>::zero() + UFix::<U40, U0>::zero();
/// let fine = UFix::<U0, U30>::zero() + UFix::<U0, U30>::zero();
/// assert!(wide.is_zero() && fine.is_zero());
/// ```
pub trait SelectStorage<S: Bit> {
    /// The backing integer for this width and signedness
    type Raw: Storage;
}

macro_rules! select_storage {
    ($unsigned:ty, $signed:ty => $($bits:ident),+ $(,)?) => {
        $(
            impl SelectStorage<B0> for $bits {
                type Raw = $unsigned;
            }

            impl SelectStorage<B1> for $bits {
                type Raw = $signed;
            }
        )+
    };
}

select_storage!(u8, i8 => U1, U2, U3, U4, U5, U6, U7, U8);
select_storage!(u16, i16 => U9, U10, U11, U12, U13, U14, U15, U16);
select_storage!(u32, i32 => U17, U18, U19, U20, U21, U22, U23, U24, U25, U26, U27, U28, U29, U30,
    U31, U32);
select_storage!(u64, i64 => U33, U34, U35, U36, U37, U38, U39, U40, U41, U42, U43, U44, U45, U46,
    U47, U48, U49, U50, U51, U52, U53, U54, U55, U56, U57, U58, U59, U60, U61, U62, U63, U64);
