// ============================================================================
// Numeric Module
// Binary fixed-point arithmetic with type-level width and signedness
// ============================================================================
//
// This module provides:
// - FixedPoint<L>: fixed-point value whose shape L = Q<W, F, S> is checked
//   at compile time (1 <= W+F <= 64), with UFix/IFix aliases
// - IntegerKind / SelectStorage: narrowest native backing integer per width
// - Promote: result shape of mixed-width arithmetic
// - OverflowPolicy / ArithmeticConfig / Arithmetic: saturate or wrap
// - NumericError: error types for checked operations and configuration
//
// Design principles:
// - Operators never panic or fail; overflow is resolved by policy
// - Exact integer intermediates (i128 / u128) for add, sub and mul
// - Process-wide policy is write-once; contexts carry explicit policies

mod arith;
mod config;
mod errors;
mod fixed_point;
mod format;
mod layout;
mod storage;

pub use arith::Arithmetic;
pub use config::{global_policy, install_policy, ArithmeticConfig, OverflowPolicy};
pub use errors::{NumericError, NumericResult};
pub use fixed_point::{FixedPoint, IFix, UFix};
pub use layout::{Layout, Promote, Promoted, Q};
pub use storage::{IntegerKind, SelectStorage, Storage};
