// ============================================================================
// Fixed-Point Value
// Binary fixed-point number with type-level width, fraction and signedness
// ============================================================================

use super::config::{global_policy, OverflowPolicy};
use super::errors::{NumericError, NumericResult};
use super::layout::{wrap_raw, Layout, Q};
use super::storage::{IntegerKind, Storage};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use typenum::{B0, B1};

#[cfg(feature = "serde")]
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

/// Binary fixed-point number with a compile-time shape.
///
/// Internally stores `value × 2^F` in the narrowest native integer able to
/// hold `W+F` bits (`L::Raw`). Unsigned values keep every bit above
/// `W+F-1` clear; signed values hold the sign-extended reading of their
/// `W+F`-bit field, so [`raw_bits`](Self::raw_bits) never has bits set above
/// the shape.
///
/// # Type Parameter
/// - `L`: a [`Layout`], normally written through the aliases
///   [`UFix<W, F>`] and [`IFix<W, F>`] with typenum widths.
///
/// # Example
/// ```
/// use fixedpt::numeric::UFix;
/// use fixedpt::typenum::{U3, U4, U5};
///
/// let a = UFix::<U5, U3>::from_f64(8.25);
/// let b = UFix::<U4, U4>::from_f64(2.5);
/// let sum = a + b; // UFix<U5, U4>
/// assert_eq!(sum.to_f64(), 10.75);
/// assert_eq!(a.to_bitstring(), "01000.010");
/// ```
#[repr(transparent)]
pub struct FixedPoint<L: Layout> {
    raw: L::Raw,
    layout: PhantomData<L>,
}

/// Unsigned fixed-point value with `W` whole and `F` fractional bits.
pub type UFix<W, F> = FixedPoint<Q<W, F, B0>>;

/// Signed (two's complement) fixed-point value with `W` whole and `F`
/// fractional bits, sign bit included in `W`.
pub type IFix<W, F> = FixedPoint<Q<W, F, B1>>;

impl<L: Layout> FixedPoint<L> {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Build from an exact value already inside `[MIN_RAW, MAX_RAW]`.
    #[inline]
    pub(crate) fn from_exact(raw: i128) -> Self {
        debug_assert!(raw >= L::MIN_RAW && raw <= L::MAX_RAW);
        Self {
            raw: L::Raw::from_i128(raw),
            layout: PhantomData,
        }
    }

    /// The raw value widened to the engine's intermediate type.
    #[inline]
    pub(crate) fn exact(self) -> i128 {
        self.raw.to_i128()
    }

    /// Resolve an exact scaled value into this shape under `policy`.
    pub(crate) fn resolve(value: i128, policy: OverflowPolicy) -> Self {
        match policy {
            OverflowPolicy::Saturate if value > L::MAX_RAW => {
                tracing::trace!(value = %value, "saturated to maximum");
                Self::from_exact(L::MAX_RAW)
            },
            OverflowPolicy::Saturate if value < L::MIN_RAW => {
                tracing::trace!(value = %value, "saturated to minimum");
                Self::from_exact(L::MIN_RAW)
            },
            OverflowPolicy::Saturate => Self::from_exact(value),
            OverflowPolicy::Wrap => Self::from_exact(wrap_raw::<L>(value)),
        }
    }

    /// Zero value.
    #[inline]
    pub fn zero() -> Self {
        Self::from_exact(0)
    }

    /// Largest representable value.
    #[inline]
    pub fn max_value() -> Self {
        Self::from_exact(L::MAX_RAW)
    }

    /// Smallest representable value (zero when unsigned).
    #[inline]
    pub fn min_value() -> Self {
        Self::from_exact(L::MIN_RAW)
    }

    /// Create from a raw backing value.
    ///
    /// Bits above the shape are discarded (`W+F`-bit wraparound).
    #[inline]
    pub fn from_raw(raw: L::Raw) -> Self {
        Self::from_exact(wrap_raw::<L>(raw.to_i128()))
    }

    /// Create from a raw bit pattern; only the low `W+F` bits are used.
    #[inline]
    pub fn from_bits(bits: u64) -> Self {
        Self::from_exact(wrap_raw::<L>(bits as i128))
    }

    /// Encode a double using the process-wide overflow policy.
    ///
    /// `raw = round(x × 2^F)`, rounding half away from zero.
    #[inline]
    pub fn from_f64(x: f64) -> Self {
        Self::from_f64_with(x, global_policy())
    }

    /// Encode a float using the process-wide overflow policy.
    #[inline]
    pub fn from_f32(x: f32) -> Self {
        Self::from_f64_with(f64::from(x), global_policy())
    }

    /// Encode a double with an explicit overflow policy.
    ///
    /// Saturate clamps into `[min_val, max_val]`; Wrap keeps the low `W+F`
    /// bits. NaN encodes as zero.
    pub fn from_f64_with(x: f64, policy: OverflowPolicy) -> Self {
        if policy == OverflowPolicy::Wrap && !Self::scaled_fits_i128(x) {
            // |x × 2^F| >= 2^127 is a multiple of 2^75: no bits below 2^64
            return Self::zero();
        }
        Self::resolve(Self::scale_f64(x), policy)
    }

    /// Encode a double, reporting values that do not fit.
    ///
    /// # Errors
    /// - `InvalidInput` for NaN
    /// - `Overflow` if the rounded value exceeds `max_val`
    /// - `Underflow` if it is below `min_val`
    pub fn checked_from_f64(x: f64) -> NumericResult<Self> {
        if x.is_nan() {
            return Err(NumericError::InvalidInput);
        }
        let scaled = Self::scale_f64(x);
        if scaled > L::MAX_RAW {
            Err(NumericError::Overflow)
        } else if scaled < L::MIN_RAW {
            Err(NumericError::Underflow)
        } else {
            Ok(Self::from_exact(scaled))
        }
    }

    /// `round(x × 2^F)` as an exact integer; the float-to-int cast saturates.
    #[inline]
    fn scale_f64(x: f64) -> i128 {
        (x * 2f64.powi(L::FRAC as i32)).round() as i128
    }

    /// False for non-finite inputs and for magnitudes the i128 cast clamps.
    #[inline]
    fn scaled_fits_i128(x: f64) -> bool {
        (x * 2f64.powi(L::FRAC as i32)).abs() < 2f64.powi(127)
    }

    /// Convert to another shape, re-aligning the fraction.
    ///
    /// Widening the fraction is exact; narrowing it truncates toward negative
    /// infinity. The whole part is resolved by the process-wide policy.
    #[inline]
    pub fn resize<M: Layout>(self) -> FixedPoint<M> {
        self.resize_with(global_policy())
    }

    /// Convert to another shape with an explicit overflow policy.
    pub fn resize_with<M: Layout>(self, policy: OverflowPolicy) -> FixedPoint<M> {
        let raw = self.exact();
        if M::FRAC >= L::FRAC {
            let shift = M::FRAC - L::FRAC;
            match raw.checked_mul(1i128 << shift) {
                Some(value) => FixedPoint::resolve(value, policy),
                None => match policy {
                    OverflowPolicy::Saturate if raw > 0 => FixedPoint::max_value(),
                    OverflowPolicy::Saturate => FixedPoint::min_value(),
                    OverflowPolicy::Wrap => FixedPoint::resolve(raw.wrapping_shl(shift), policy),
                },
            }
        } else {
            FixedPoint::resolve(raw >> (L::FRAC - M::FRAC), policy)
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of whole bits (`W`).
    #[inline]
    pub fn whole_width(self) -> u32 {
        L::WHOLE
    }

    /// Number of fractional bits (`F`).
    #[inline]
    pub fn frac_width(self) -> u32 {
        L::FRAC
    }

    /// Total significant bits (`W+F`).
    #[inline]
    pub fn total_bits(self) -> u32 {
        L::BITS
    }

    #[inline]
    pub fn is_signed(self) -> bool {
        L::SIGNED
    }

    /// The native integer kind backing this shape.
    #[inline]
    pub fn storage_kind(self) -> IntegerKind {
        <L::Raw as Storage>::KIND
    }

    /// Largest raw value: `2^(W+F) - 1`, or `2^(W+F-1) - 1` when signed.
    #[inline]
    pub fn max_val(self) -> L::Raw {
        L::Raw::from_i128(L::MAX_RAW)
    }

    /// Smallest raw value: zero, or `-2^(W+F-1)` when signed.
    #[inline]
    pub fn min_val(self) -> L::Raw {
        L::Raw::from_i128(L::MIN_RAW)
    }

    /// The raw backing value (`value × 2^F`).
    #[inline]
    pub fn raw(self) -> L::Raw {
        self.raw
    }

    /// The `W+F`-bit pattern with every higher bit clear.
    #[inline]
    pub fn raw_bits(self) -> u64 {
        (self.exact() & ((1i128 << L::BITS) - 1)) as u64
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.exact() == 0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.exact() < 0
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Decode to a double: the whole part plus `Σ 2^-i` over the set
    /// fractional bits.
    pub fn to_f64(self) -> f64 {
        let raw = self.exact();
        let whole = raw >> L::FRAC;
        let fractional = (raw & L::FRAC_MASK) as f64 * 2f64.powi(-(L::FRAC as i32));
        whole as f64 + fractional
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    /// `raw >> F`: the whole part, truncated toward negative infinity.
    ///
    /// Saturates at the `i64` bounds (only 64-bit unsigned wholes exceed them).
    #[inline]
    pub fn to_int(self) -> i64 {
        let whole = self.exact() >> L::FRAC;
        whole.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    /// The whole part in the backing integer type.
    #[inline]
    pub fn to_native(self) -> L::Raw {
        self.get_whole()
    }

    /// `raw >> F` in the backing integer type.
    #[inline]
    pub fn get_whole(self) -> L::Raw {
        L::Raw::from_i128(self.exact() >> L::FRAC)
    }

    /// `raw & (2^F - 1)`: the fractional bits as an unsigned integer.
    #[inline]
    pub fn get_frac(self) -> u64 {
        (self.exact() & L::FRAC_MASK) as u64
    }

    /// Convert to rust_decimal::Decimal.
    ///
    /// Exact while the expansion fits in 28 decimal places.
    pub fn to_decimal(self) -> rust_decimal::Decimal {
        let raw = rust_decimal::Decimal::from_i128_with_scale(self.exact(), 0);
        let scale = rust_decimal::Decimal::from_i128_with_scale(1i128 << L::FRAC, 0);
        raw / scale
    }

    /// Convert from rust_decimal::Decimal, rounding to the nearest step.
    ///
    /// Intended for API boundaries only.
    ///
    /// # Errors
    /// - `Overflow` if the value exceeds `max_val`
    /// - `Underflow` if it is below `min_val`
    pub fn from_decimal(d: rust_decimal::Decimal) -> NumericResult<Self> {
        use rust_decimal::prelude::ToPrimitive;
        use rust_decimal::RoundingStrategy;

        let scale = rust_decimal::Decimal::from_i128_with_scale(1i128 << L::FRAC, 0);
        let scaled = d
            .checked_mul(scale)
            .ok_or(NumericError::Overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let raw = scaled.to_i128().ok_or(NumericError::Overflow)?;
        if raw > L::MAX_RAW {
            Err(NumericError::Overflow)
        } else if raw < L::MIN_RAW {
            Err(NumericError::Underflow)
        } else {
            Ok(Self::from_exact(raw))
        }
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl<L: Layout> Clone for FixedPoint<L> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: Layout> Copy for FixedPoint<L> {}

impl<L: Layout> Default for FixedPoint<L> {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl<L: Layout> PartialEq for FixedPoint<L> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<L: Layout> Eq for FixedPoint<L> {}

impl<L: Layout> Hash for FixedPoint<L> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<L: Layout> From<f64> for FixedPoint<L> {
    #[inline]
    fn from(x: f64) -> Self {
        Self::from_f64(x)
    }
}

impl<L: Layout> From<f32> for FixedPoint<L> {
    #[inline]
    fn from(x: f32) -> Self {
        Self::from_f32(x)
    }
}

impl<L: Layout> From<FixedPoint<L>> for f64 {
    #[inline]
    fn from(x: FixedPoint<L>) -> Self {
        x.to_f64()
    }
}

impl<L: Layout> From<FixedPoint<L>> for f32 {
    #[inline]
    fn from(x: FixedPoint<L>) -> Self {
        x.to_f32()
    }
}

// ============================================================================
// Serialization (raw value, lossless)
// ============================================================================

#[cfg(feature = "serde")]
impl<L: Layout> Serialize for FixedPoint<L> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i128(self.exact())
    }
}

#[cfg(feature = "serde")]
impl<'de, L: Layout> Deserialize<'de> for FixedPoint<L> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i128::deserialize(deserializer)?;
        if raw > L::MAX_RAW {
            Err(D::Error::custom(NumericError::Overflow))
        } else if raw < L::MIN_RAW {
            Err(D::Error::custom(NumericError::Underflow))
        } else {
            Ok(Self::from_exact(raw))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use typenum::{U0, U16, U17, U2, U3, U4, U5, U6, U64, U8};

    type A = UFix<U5, U3>;

    #[test]
    fn test_default_is_zero() {
        let x = A::default();
        assert_eq!(x.raw(), 0);
        assert!(x.is_zero());
        assert_eq!(x, A::zero());
    }

    #[test]
    fn test_from_f64() {
        let x = A::from_f64(8.25);
        assert_eq!(x.raw(), 66);
        assert_eq!(x.to_f64(), 8.25);
        assert_eq!(x.to_f32(), 8.25);
        assert_eq!(std::mem::size_of::<A>(), 1);
    }

    #[test]
    fn test_from_f32() {
        let x = UFix::<U4, U4>::from_f32(2.5);
        assert_eq!(x.raw(), 40);
        assert_eq!(f64::from(x), 2.5);
    }

    #[test]
    fn test_rounds_to_nearest() {
        // 0.3 * 8 = 2.4 -> 2; 0.32 * 8 = 2.56 -> 3
        assert_eq!(A::from_f64(0.3).raw(), 2);
        assert_eq!(A::from_f64(0.32).raw(), 3);
        // half away from zero
        assert_eq!(A::from_f64(0.0625).raw(), 1);
    }

    #[test]
    fn test_construction_saturates() {
        let x = A::from_f64_with(40.0, OverflowPolicy::Saturate);
        assert_eq!(x.raw(), 255);
        assert_eq!(x, A::max_value());

        let y = A::from_f64_with(-1.0, OverflowPolicy::Saturate);
        assert_eq!(y.raw(), 0);

        let s = IFix::<U4, U4>::from_f64_with(-100.0, OverflowPolicy::Saturate);
        assert_eq!(s.raw(), -128);
    }

    #[test]
    fn test_construction_wraps() {
        // 32.0 * 8 = 256 -> 0 in eight bits
        let x = A::from_f64_with(32.0, OverflowPolicy::Wrap);
        assert_eq!(x.raw(), 0);

        let y = A::from_f64_with(-0.125, OverflowPolicy::Wrap);
        assert_eq!(y.raw(), 255);

        let s = IFix::<U4, U4>::from_f64_with(8.0, OverflowPolicy::Wrap);
        assert_eq!(s.raw(), -128);
    }

    #[test]
    fn test_construction_wraps_huge_values() {
        type W = UFix<U8, U8>;
        // low sixteen bits of 2^100 and 2^130 are all zero
        assert_eq!(W::from_f64_with(2f64.powi(100), OverflowPolicy::Wrap).raw(), 0);
        assert_eq!(W::from_f64_with(2f64.powi(130), OverflowPolicy::Wrap).raw(), 0);
        assert_eq!(W::from_f64_with(-2f64.powi(130), OverflowPolicy::Wrap).raw(), 0);
        assert_eq!(W::from_f64_with(f64::INFINITY, OverflowPolicy::Wrap).raw(), 0);
        assert_eq!(W::from_f64_with(f64::NAN, OverflowPolicy::Wrap).raw(), 0);

        // saturation is unaffected
        assert_eq!(W::from_f64_with(2f64.powi(130), OverflowPolicy::Saturate), W::max_value());
    }

    #[test]
    fn test_nan_and_infinity() {
        assert_eq!(A::from_f64(f64::NAN).raw(), 0);
        assert_eq!(A::from_f64_with(f64::INFINITY, OverflowPolicy::Saturate).raw(), 255);
        assert_eq!(A::checked_from_f64(f64::NAN), Err(NumericError::InvalidInput));
        assert_eq!(A::checked_from_f64(f64::INFINITY), Err(NumericError::Overflow));
    }

    #[test]
    fn test_checked_from_f64() {
        assert_eq!(A::checked_from_f64(31.875).unwrap().raw(), 255);
        assert_eq!(A::checked_from_f64(32.0), Err(NumericError::Overflow));
        assert_eq!(A::checked_from_f64(-0.125), Err(NumericError::Underflow));
        assert_eq!(
            IFix::<U4, U4>::checked_from_f64(-8.0).unwrap().raw(),
            -128
        );
    }

    #[test]
    fn test_max_val() {
        assert_eq!(A::zero().max_val(), 255);
        assert_eq!(UFix::<U3, U3>::zero().max_val(), 63);
        assert_eq!(IFix::<U4, U4>::zero().max_val(), 127);
        assert_eq!(IFix::<U4, U4>::zero().min_val(), -128);
        assert_eq!(UFix::<U64, U0>::zero().max_val(), u64::MAX);
        assert_eq!(IFix::<U17, U16>::zero().max_val(), (1i64 << 32) - 1);
    }

    #[test]
    fn test_widths() {
        let x = UFix::<U4, U4>::zero();
        assert_eq!(x.whole_width(), 4);
        assert_eq!(x.frac_width(), 4);
        assert_eq!(x.total_bits(), 8);
        assert!(!x.is_signed());
        assert_eq!(x.storage_kind(), IntegerKind::U8);
        assert_eq!(UFix::<U5, U4>::zero().storage_kind(), IntegerKind::U16);
        assert_eq!(IFix::<U17, U16>::zero().storage_kind(), IntegerKind::I64);
    }

    #[test]
    fn test_whole_and_frac() {
        let x = A::from_f64(8.25);
        assert_eq!(x.get_whole(), 8);
        assert_eq!(x.get_frac(), 2);
        assert_eq!(x.to_int(), 8);
        assert_eq!(x.to_native(), 8);

        // floor for negatives: -1.5 -> whole -2, fraction .5
        let n = IFix::<U4, U4>::from_f64(-1.5);
        assert_eq!(n.to_int(), -2);
        assert_eq!(n.get_frac(), 8);
        assert_eq!(n.to_f64(), -1.5);
    }

    #[test]
    fn test_signed_33_bit_saturation() {
        let zz = IFix::<U17, U16>::from_f64_with(8589934591.25, OverflowPolicy::Saturate);
        assert_eq!(zz.to_int(), 65535);
        assert_eq!(zz.get_whole(), 65535);
        assert_eq!(zz.get_frac(), 65535);
        assert_eq!(zz.to_native(), 65535);
    }

    #[test]
    fn test_from_raw_masks() {
        let x = UFix::<U3, U3>::from_raw(0xFF);
        assert_eq!(x.raw(), 0x3F);

        let s = IFix::<U2, U2>::from_raw(0b1000);
        assert_eq!(s.raw(), -8);
        assert_eq!(s.raw_bits(), 0b1000);

        let b = IFix::<U4, U4>::from_bits(0x1FF);
        assert_eq!(b.raw(), -1);
        assert_eq!(b.raw_bits(), 0xFF);
    }

    #[test]
    fn test_zero_whole_and_zero_frac_shapes() {
        let f = UFix::<U0, U8>::from_f64(0.5);
        assert_eq!(f.raw(), 128);
        assert_eq!(f.to_f64(), 0.5);
        assert_eq!(f.get_whole(), 0);

        let w = UFix::<U8, U0>::from_f64(200.4);
        assert_eq!(w.raw(), 200);
        assert_eq!(w.get_frac(), 0);
    }

    #[test]
    fn test_resize() {
        let x = A::from_f64(8.25);
        let wider: UFix<U6, U6> = x.resize_with(OverflowPolicy::Saturate);
        assert_eq!(wider.to_f64(), 8.25);

        let narrower: UFix<U4, U2> = x.resize_with(OverflowPolicy::Saturate);
        assert_eq!(narrower.to_f64(), 8.25);

        let clamped: UFix<U3, U3> = x.resize_with(OverflowPolicy::Saturate);
        assert_eq!(clamped, UFix::<U3, U3>::max_value());

        let wrapped: UFix<U3, U3> = x.resize_with(OverflowPolicy::Wrap);
        assert_eq!(wrapped.to_f64(), 0.25);
    }

    #[test]
    fn test_resize_huge_shift() {
        let x = UFix::<U64, U0>::max_value();
        let y: UFix<U0, U64> = x.resize_with(OverflowPolicy::Saturate);
        assert_eq!(y, UFix::<U0, U64>::max_value());

        let z: UFix<U0, U64> = x.resize_with(OverflowPolicy::Wrap);
        assert!(z.is_zero());
    }

    #[test]
    fn test_decimal_conversion() {
        use rust_decimal::Decimal;

        let x = A::from_f64(8.25);
        assert_eq!(x.to_decimal(), Decimal::new(825, 2));

        let y = A::from_decimal(Decimal::new(1234, 2)).unwrap(); // 12.34 -> 12.375
        assert_eq!(y.to_f64(), 12.375);

        assert_eq!(
            A::from_decimal(Decimal::new(32, 0)),
            Err(NumericError::Overflow)
        );
        assert_eq!(
            A::from_decimal(Decimal::new(-1, 0)),
            Err(NumericError::Underflow)
        );
    }

    #[test]
    fn test_equality_and_hash() {
        use std::collections::HashSet;

        let a = A::from_f64(1.5);
        let b = A::from_f64(1.5);
        assert_eq!(a, b);
        assert_ne!(a, A::from_f64(1.625));

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_raw() {
        let x = IFix::<U4, U4>::from_f64(-1.5);
        let json = serde_json::to_string(&x).unwrap();
        assert_eq!(json, "-24");
        let back: IFix<U4, U4> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, x);
        assert!(serde_json::from_str::<IFix<U4, U4>>("200").is_err());
    }
}
