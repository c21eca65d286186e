// ============================================================================
// Fixed-Point Library
// Binary fixed-point numbers with compile-time width and width-promoting ops
// ============================================================================

//! # fixedpt
//!
//! Binary fixed-point numbers whose whole width, fractional width and
//! signedness are part of the type.
//!
//! ## Features
//!
//! - **Narrowest storage**: a value with `W+F` bits is backed by the smallest
//!   native integer that holds them (`u8`..`u64`, `i8`..`i64`)
//! - **Compile-time shapes**: zero-width and over-64-bit shapes do not compile
//! - **Width promotion**: `a + b` on different shapes yields
//!   `(max(Aw, Bw), max(Af, Bf), As && Bs)`
//! - **Overflow policy**: saturate (default) or wrap, write-once per process
//!   or bound into an [`Arithmetic`](numeric::Arithmetic) context
//!
//! ## Example
//!
//! ```rust
//! use fixedpt::prelude::*;
//! use fixedpt::typenum::{U3, U4, U5};
//!
//! let a = UFix::<U5, U3>::from_f64(8.25);
//! let b = UFix::<U4, U4>::from_f64(2.5);
//!
//! let sum: UFix<U5, U4> = a + b;
//! assert_eq!(sum.to_f64(), 10.75);
//!
//! let product = UFix::<U5, U3>::from_f64(1.25) * UFix::<U5, U3>::from_f64(2.0);
//! assert_eq!(product.to_bitstring(), "00010.100");
//!
//! // 4.25 * 4.0 does not fit three whole bits and saturates
//! let saturated = UFix::<U3, U3>::from_f64(4.25) * UFix::<U3, U3>::from_f64(4.0);
//! assert_eq!(saturated.to_bitstring(), "111.111");
//! ```

pub mod numeric;

pub use typenum;

// Re-exports for convenience
pub mod prelude {
    pub use crate::numeric::{
        global_policy, install_policy, Arithmetic, ArithmeticConfig, FixedPoint, IFix,
        IntegerKind, Layout, NumericError, NumericResult, OverflowPolicy, Promoted, UFix, Q,
    };
}
