// ============================================================================
// Basic Usage Example
// ============================================================================

use fixedpt::prelude::*;
use fixedpt::typenum::{U16, U17, U3, U4, U5};

fn main() {
    #[cfg(feature = "logging")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("=== Fixed-Point Example ===\n");

    let config = ArithmeticConfig::saturating();
    if let Err(e) = config.install() {
        println!("could not install policy: {}", e);
    }
    println!("Overflow policy: {}\n", global_policy());

    let a = UFix::<U5, U3>::from_f64(8.25);
    let b = UFix::<U4, U4>::from_f64(2.5);
    println!("a = {} ({:b}), backed by {}", a, a, a.storage_kind());
    println!("b = {} ({:b}), backed by {}", b, b, b.storage_kind());

    let sum = a + b;
    println!(
        "a + b = {} ({:b}), shape {}.{}",
        sum,
        sum,
        sum.whole_width(),
        sum.frac_width()
    );

    let product = UFix::<U5, U3>::from_f64(1.25) * UFix::<U5, U3>::from_f64(2.0);
    println!("1.25 * 2.0 = {} ({:b})", product, product);

    let saturated = UFix::<U3, U3>::from_f64(4.25) * UFix::<U3, U3>::from_f64(4.0);
    println!("4.25 * 4.0 in 3.3 bits = {} ({:b})", saturated, saturated);

    let signed = IFix::<U4, U4>::from_f64(7.0) * IFix::<U4, U4>::from_f64(2.0);
    println!("signed 7.0 * 2.0 in 4.4 bits = {} ({:b})", signed, signed);

    let quotient = UFix::<U5, U3>::from_f64(7.0) / UFix::<U4, U4>::from_f64(2.0);
    println!("7.0 / 2.0 = {} ({:b})", quotient, quotient);

    let wrapping = Arithmetic::new(OverflowPolicy::Wrap);
    let wrapped = wrapping.mul(
        UFix::<U3, U3>::from_f64(4.25),
        UFix::<U3, U3>::from_f64(4.0),
    );
    println!("wrapping 4.25 * 4.0 = {} ({:b})", wrapped, wrapped);

    let big = IFix::<U17, U16>::from_f64(8589934591.25);
    println!(
        "\n33-bit signed clamp: {:?}\n  whole = {}, frac = {:#x}",
        big,
        big.get_whole(),
        big.get_frac()
    );
}
