// ============================================================================
// Fixed-Point Layout
// Type-level shape (whole bits, fractional bits, signedness) and promotion
// ============================================================================

use super::storage::{SelectStorage, Storage};
use std::marker::PhantomData;
use std::ops::{Add, BitAnd};
use typenum::{And, Bit, Max, Maximum, Sum, Unsigned, B0};

/// Shape marker: `W` whole bits, `F` fractional bits, signed iff `S = B1`.
///
/// Never instantiated; it only names a [`Layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Q<W, F, S = B0>(PhantomData<(W, F, S)>);

/// Compile-time description of a fixed-point shape.
pub trait Layout: 'static {
    /// Narrowest native integer holding `WHOLE + FRAC` bits
    type Raw: Storage;

    const WHOLE: u32;
    const FRAC: u32;
    const SIGNED: bool;

    /// Total significant bits
    const BITS: u32 = Self::WHOLE + Self::FRAC;

    /// Largest raw value: `2^BITS - 1`, or `2^(BITS-1) - 1` when signed.
    const MAX_RAW: i128 = if Self::SIGNED {
        (1i128 << (Self::BITS - 1)) - 1
    } else {
        (1i128 << Self::BITS) - 1
    };

    /// Smallest raw value: zero, or `-2^(BITS-1)` when signed.
    const MIN_RAW: i128 = if Self::SIGNED {
        -(1i128 << (Self::BITS - 1))
    } else {
        0
    };

    /// Mask selecting the fractional bits.
    const FRAC_MASK: i128 = (1i128 << Self::FRAC) - 1;
}

impl<W, F, S> Layout for Q<W, F, S>
where
    W: Unsigned + Add<F> + 'static,
    F: Unsigned + 'static,
    S: Bit + 'static,
    Sum<W, F>: SelectStorage<S>,
{
    type Raw = <Sum<W, F> as SelectStorage<S>>::Raw;

    const WHOLE: u32 = W::U32;
    const FRAC: u32 = F::U32;
    const SIGNED: bool = S::BOOL;
}

/// Width promotion of two shapes.
///
/// `(Aw, Af, As) x (Bw, Bf, Bs) -> (max(Aw, Bw), max(Af, Bf), As && Bs)`.
/// The promoted total must itself be a valid layout.
pub trait Promote<Rhs: Layout>: Layout {
    type Output: Layout;
}

impl<AW, AF, AS, BW, BF, BS> Promote<Q<BW, BF, BS>> for Q<AW, AF, AS>
where
    Q<AW, AF, AS>: Layout,
    Q<BW, BF, BS>: Layout,
    AW: Max<BW>,
    AF: Max<BF>,
    AS: BitAnd<BS>,
    Q<Maximum<AW, BW>, Maximum<AF, BF>, And<AS, BS>>: Layout,
{
    type Output = Q<Maximum<AW, BW>, Maximum<AF, BF>, And<AS, BS>>;
}

/// The promoted layout of `A` combined with `B`.
pub type Promoted<A, B> = <A as Promote<B>>::Output;

/// Wrap an exact value into `BITS` bits of two's complement (native modulo).
#[inline]
pub(crate) fn wrap_raw<L: Layout>(value: i128) -> i128 {
    let low = value & ((1i128 << L::BITS) - 1);
    if L::SIGNED && (low >> (L::BITS - 1)) & 1 == 1 {
        low - (1i128 << L::BITS)
    } else {
        low
    }
}
