// ============================================================================
// Arithmetic Engine
// Width-promoting add/sub/mul/div with saturate or wrap overflow resolution
// ============================================================================
//
// Every binary operation combines FixedPoint<A> and FixedPoint<B> into
// FixedPoint<Promoted<A, B>>: max whole bits, max fractional bits, signed
// only when both operands are. Intermediates are exact (i128, or a
// sign-magnitude u128 product), so overflow is decided once, on the result.

use super::config::{global_policy, OverflowPolicy};
use super::errors::{NumericError, NumericResult};
use super::fixed_point::FixedPoint;
use super::layout::{wrap_raw, Layout, Promote, Promoted, Q};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};
use typenum::B1;

// ============================================================================
// Engine Primitives
// ============================================================================

/// Shift the operand with fewer fractional bits so both share the larger
/// scale. Same-scale operands pass through untouched.
#[inline]
fn align<A: Layout, B: Layout>(a: FixedPoint<A>, b: FixedPoint<B>) -> (i128, i128) {
    let (a, b) = (a.exact(), b.exact());
    if A::FRAC == B::FRAC {
        (a, b)
    } else if A::FRAC > B::FRAC {
        (a, b << (A::FRAC - B::FRAC))
    } else {
        (a << (B::FRAC - A::FRAC), b)
    }
}

/// Rescaled product in sign-magnitude form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Product {
    negative: bool,
    magnitude: u128,
    /// Operand signs agree (zero counts as positive)
    same_sign: bool,
}

impl Product {
    /// `a * b` brought back to `max(Fa, Fb)` fractional bits.
    ///
    /// Equivalent to aligning both operands, multiplying at doubled scale and
    /// shifting right by `max(Fa, Fb)`; the shift here is `min(Fa, Fb)`
    /// because the raw product already carries `Fa + Fb` fractional bits.
    /// The shift floors (arithmetic shift semantics).
    fn of<A: Layout, B: Layout>(a: FixedPoint<A>, b: FixedPoint<B>) -> Self {
        let (a, b) = (a.exact(), b.exact());
        let shift = A::FRAC.min(B::FRAC);
        // |a|, |b| < 2^64, so the full product fits in u128.
        let full = a.unsigned_abs() * b.unsigned_abs();
        let same_sign = (a < 0) == (b < 0);
        let negative = !same_sign && full != 0;

        let mut magnitude = full >> shift;
        if negative && full & ((1u128 << shift) - 1) != 0 {
            magnitude += 1;
        }
        Self {
            negative,
            magnitude,
            same_sign,
        }
    }

    /// Exact value when it fits the target range, otherwise the side it left.
    fn fit<O: Layout>(self) -> Result<i128, NumericError> {
        if self.negative {
            if self.magnitude > O::MIN_RAW.unsigned_abs() {
                Err(NumericError::Underflow)
            } else {
                Ok(-(self.magnitude as i128))
            }
        } else if self.magnitude > O::MAX_RAW as u128 {
            Err(NumericError::Overflow)
        } else {
            Ok(self.magnitude as i128)
        }
    }

    /// Low `W+F` bits of the two's complement product.
    fn wrapped<O: Layout>(self) -> i128 {
        let bits = if self.negative {
            self.magnitude.wrapping_neg()
        } else {
            self.magnitude
        };
        wrap_raw::<O>(bits as i128)
    }
}

/// `round(num / den × 2^F)` for aligned operands, `None` when `den == 0`.
#[inline]
fn quotient<O: Layout>(num: i128, den: i128) -> Option<i128> {
    if den == 0 {
        return None;
    }
    let ratio = num as f64 / den as f64;
    Some((ratio * 2f64.powi(O::FRAC as i32)).round() as i128)
}

/// Range check for the `checked_*` family.
#[inline]
fn check<O: Layout>(value: i128) -> NumericResult<FixedPoint<O>> {
    if value > O::MAX_RAW {
        Err(NumericError::Overflow)
    } else if value < O::MIN_RAW {
        Err(NumericError::Underflow)
    } else {
        Ok(FixedPoint::from_exact(value))
    }
}

// ============================================================================
// Policy-Explicit Operations
// ============================================================================

impl<L: Layout> FixedPoint<L> {
    /// Add with an explicit overflow policy.
    ///
    /// Saturate clamps to `max_val` (or `min_val` for signed results);
    /// Wrap keeps the low `W+F` bits.
    pub fn add_with<B>(
        self,
        rhs: FixedPoint<B>,
        policy: OverflowPolicy,
    ) -> FixedPoint<Promoted<L, B>>
    where
        L: Promote<B>,
        B: Layout,
    {
        let (a, b) = align(self, rhs);
        FixedPoint::resolve(a + b, policy)
    }

    /// Subtract with an explicit overflow policy.
    ///
    /// Saturate clamps only at `max_val`. Results below `min_val` wrap under
    /// either policy; use [`checked_sub`](Self::checked_sub) to detect them.
    pub fn sub_with<B>(
        self,
        rhs: FixedPoint<B>,
        policy: OverflowPolicy,
    ) -> FixedPoint<Promoted<L, B>>
    where
        L: Promote<B>,
        B: Layout,
    {
        let (a, b) = align(self, rhs);
        let diff = a - b;
        if policy.is_saturating() && diff > <Promoted<L, B>>::MAX_RAW {
            FixedPoint::resolve(diff, policy)
        } else {
            FixedPoint::resolve(diff, OverflowPolicy::Wrap)
        }
    }

    /// Multiply with an explicit overflow policy.
    ///
    /// Saturate clamps to `max_val` / `min_val`. Wrap keeps the low `W+F`
    /// bits; for signed operands of matching sign the result's sign bit is
    /// then cleared, so a positive product is never reported as negative.
    pub fn mul_with<B>(
        self,
        rhs: FixedPoint<B>,
        policy: OverflowPolicy,
    ) -> FixedPoint<Promoted<L, B>>
    where
        L: Promote<B>,
        B: Layout,
    {
        let product = Product::of(self, rhs);
        match (policy, product.fit::<Promoted<L, B>>()) {
            (_, Ok(value)) => FixedPoint::from_exact(value),
            (OverflowPolicy::Saturate, Err(NumericError::Underflow)) => {
                tracing::trace!("product saturated to minimum");
                FixedPoint::min_value()
            },
            (OverflowPolicy::Saturate, Err(_)) => {
                tracing::trace!("product saturated to maximum");
                FixedPoint::max_value()
            },
            (OverflowPolicy::Wrap, Err(_)) => {
                let mut raw = product.wrapped::<Promoted<L, B>>();
                if <Promoted<L, B>>::SIGNED && product.same_sign {
                    let sign_bit = 1i128 << (<Promoted<L, B>>::BITS - 1);
                    raw = wrap_raw::<Promoted<L, B>>(raw & !sign_bit);
                }
                FixedPoint::from_exact(raw)
            },
        }
    }

    /// Divide with an explicit overflow policy.
    ///
    /// `raw = round(num / den × 2^F)` over the aligned operands, evaluated in
    /// `f64`. Division by zero does not fail: it yields `max_val` for a
    /// positive numerator, `min_val` for a negative one and zero for `0 / 0`,
    /// under either policy.
    pub fn div_with<B>(
        self,
        rhs: FixedPoint<B>,
        policy: OverflowPolicy,
    ) -> FixedPoint<Promoted<L, B>>
    where
        L: Promote<B>,
        B: Layout,
    {
        let (num, den) = align(self, rhs);
        match quotient::<Promoted<L, B>>(num, den) {
            Some(value) => FixedPoint::resolve(value, policy),
            None => {
                tracing::debug!(numerator = %num, "division by zero");
                match num.signum() {
                    1 => FixedPoint::max_value(),
                    -1 => FixedPoint::min_value(),
                    _ => FixedPoint::zero(),
                }
            },
        }
    }

    /// Destructive add with an explicit overflow policy.
    #[inline]
    pub fn add_assign_with(&mut self, rhs: Self, policy: OverflowPolicy) {
        *self = FixedPoint::resolve(self.exact() + rhs.exact(), policy);
    }

    // ========================================================================
    // Checked Arithmetic
    // ========================================================================

    /// Checked addition.
    ///
    /// # Errors
    /// Returns `Overflow` or `Underflow` if the result is out of range.
    pub fn checked_add<B>(self, rhs: FixedPoint<B>) -> NumericResult<FixedPoint<Promoted<L, B>>>
    where
        L: Promote<B>,
        B: Layout,
    {
        let (a, b) = align(self, rhs);
        check(a + b)
    }

    /// Checked subtraction.
    ///
    /// # Errors
    /// Returns `Overflow` or `Underflow` if the result is out of range.
    pub fn checked_sub<B>(self, rhs: FixedPoint<B>) -> NumericResult<FixedPoint<Promoted<L, B>>>
    where
        L: Promote<B>,
        B: Layout,
    {
        let (a, b) = align(self, rhs);
        check(a - b)
    }

    /// Checked multiplication (floor rescale).
    ///
    /// # Errors
    /// Returns `Overflow` or `Underflow` if the result is out of range.
    pub fn checked_mul<B>(self, rhs: FixedPoint<B>) -> NumericResult<FixedPoint<Promoted<L, B>>>
    where
        L: Promote<B>,
        B: Layout,
    {
        Product::of(self, rhs)
            .fit::<Promoted<L, B>>()
            .map(FixedPoint::from_exact)
    }

    /// Checked division.
    ///
    /// # Errors
    /// - `DivisionByZero` if `rhs` is zero
    /// - `Overflow` or `Underflow` if the result is out of range
    pub fn checked_div<B>(self, rhs: FixedPoint<B>) -> NumericResult<FixedPoint<Promoted<L, B>>>
    where
        L: Promote<B>,
        B: Layout,
    {
        let (num, den) = align(self, rhs);
        let value = quotient::<Promoted<L, B>>(num, den).ok_or(NumericError::DivisionByZero)?;
        check(value)
    }
}

// ============================================================================
// Operators (process-wide policy)
// ============================================================================

impl<A, B> Add<FixedPoint<B>> for FixedPoint<A>
where
    A: Promote<B>,
    B: Layout,
{
    type Output = FixedPoint<Promoted<A, B>>;

    #[inline]
    fn add(self, rhs: FixedPoint<B>) -> Self::Output {
        self.add_with(rhs, global_policy())
    }
}

impl<A, B> Sub<FixedPoint<B>> for FixedPoint<A>
where
    A: Promote<B>,
    B: Layout,
{
    type Output = FixedPoint<Promoted<A, B>>;

    #[inline]
    fn sub(self, rhs: FixedPoint<B>) -> Self::Output {
        self.sub_with(rhs, global_policy())
    }
}

impl<A, B> Mul<FixedPoint<B>> for FixedPoint<A>
where
    A: Promote<B>,
    B: Layout,
{
    type Output = FixedPoint<Promoted<A, B>>;

    #[inline]
    fn mul(self, rhs: FixedPoint<B>) -> Self::Output {
        self.mul_with(rhs, global_policy())
    }
}

impl<A, B> Div<FixedPoint<B>> for FixedPoint<A>
where
    A: Promote<B>,
    B: Layout,
{
    type Output = FixedPoint<Promoted<A, B>>;

    #[inline]
    fn div(self, rhs: FixedPoint<B>) -> Self::Output {
        self.div_with(rhs, global_policy())
    }
}

/// Destructive add (`a += b`) for operands of the same shape.
impl<L: Layout> AddAssign for FixedPoint<L> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.add_assign_with(rhs, global_policy());
    }
}

impl<W, F> Neg for FixedPoint<Q<W, F, B1>>
where
    Q<W, F, B1>: Layout,
{
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        FixedPoint::resolve(-self.exact(), global_policy())
    }
}

// ============================================================================
// Arithmetic Context
// ============================================================================

/// Immutable arithmetic context with a bound overflow policy.
///
/// Use this instead of the operators when the process-wide policy is not the
/// one wanted, or when threads need different policies.
///
/// # Example
/// ```
/// use fixedpt::numeric::{Arithmetic, OverflowPolicy, UFix};
/// use fixedpt::typenum::U3;
///
/// let wrapping = Arithmetic::new(OverflowPolicy::Wrap);
/// let a: UFix<U3, U3> = wrapping.encode(4.25);
/// let b: UFix<U3, U3> = wrapping.encode(4.0);
/// assert_eq!(wrapping.add(a, b).to_f64(), 0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Arithmetic {
    policy: OverflowPolicy,
}

impl Arithmetic {
    pub const fn new(policy: OverflowPolicy) -> Self {
        Self { policy }
    }

    /// Context bound to the process-wide policy.
    pub fn from_process() -> Self {
        Self::new(global_policy())
    }

    #[inline]
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Encode a double under this context's policy.
    #[inline]
    pub fn encode<L: Layout>(&self, x: f64) -> FixedPoint<L> {
        FixedPoint::from_f64_with(x, self.policy)
    }

    #[inline]
    pub fn add<A, B>(&self, a: FixedPoint<A>, b: FixedPoint<B>) -> FixedPoint<Promoted<A, B>>
    where
        A: Promote<B>,
        B: Layout,
    {
        a.add_with(b, self.policy)
    }

    #[inline]
    pub fn sub<A, B>(&self, a: FixedPoint<A>, b: FixedPoint<B>) -> FixedPoint<Promoted<A, B>>
    where
        A: Promote<B>,
        B: Layout,
    {
        a.sub_with(b, self.policy)
    }

    #[inline]
    pub fn mul<A, B>(&self, a: FixedPoint<A>, b: FixedPoint<B>) -> FixedPoint<Promoted<A, B>>
    where
        A: Promote<B>,
        B: Layout,
    {
        a.mul_with(b, self.policy)
    }

    #[inline]
    pub fn div<A, B>(&self, a: FixedPoint<A>, b: FixedPoint<B>) -> FixedPoint<Promoted<A, B>>
    where
        A: Promote<B>,
        B: Layout,
    {
        a.div_with(b, self.policy)
    }

    /// Destructive add.
    #[inline]
    pub fn add_assign<L: Layout>(&self, a: &mut FixedPoint<L>, b: FixedPoint<L>) {
        a.add_assign_with(b, self.policy);
    }
}

// ============================================================================
// Tests
// ============================================================================
