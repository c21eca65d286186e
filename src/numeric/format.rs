// ============================================================================
// Bit Formatter
// Dotted bit strings, exact decimal display and debug output
// ============================================================================

use super::fixed_point::FixedPoint;
use super::layout::Layout;
use std::fmt;

impl<L: Layout> FixedPoint<L> {
    /// Render the `W+F` raw bits, most significant first, with a `.` after
    /// the `W`-th bit.
    ///
    /// The result is always `W+F+1` characters long.
    ///
    /// # Example
    /// ```
    /// use fixedpt::numeric::UFix;
    /// use fixedpt::typenum::{U3, U5};
    ///
    /// assert_eq!(UFix::<U5, U3>::from_f64(8.25).to_bitstring(), "01000.010");
    /// ```
    pub fn to_bitstring(self) -> String {
        let bits = self.raw_bits();
        let mut out = String::with_capacity(L::BITS as usize + 1);
        for position in 0..L::BITS {
            if position == L::WHOLE {
                out.push('.');
            }
            let bit = (bits >> (L::BITS - 1 - position)) & 1;
            out.push(if bit == 1 { '1' } else { '0' });
        }
        if L::FRAC == 0 {
            out.push('.');
        }
        out
    }
}

impl<L: Layout> fmt::Binary for FixedPoint<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bitstring())
    }
}

impl<L: Layout> fmt::Debug for FixedPoint<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if L::SIGNED { 's' } else { 'u' };
        write!(
            f,
            "FixedPoint<{}.{}{}>({}, bits={})",
            L::WHOLE,
            L::FRAC,
            sign,
            self,
            self.to_bitstring()
        )
    }
}

impl<L: Layout> fmt::Display for FixedPoint<L> {
    /// Exact decimal expansion (every binary fraction terminates).
    ///
    /// With a precision (`{:.3}`) the value is rounded through `f64`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(precision) = f.precision() {
            return write!(f, "{:.*}", precision, self.to_f64());
        }

        let raw = self.exact();
        let magnitude = raw.unsigned_abs();
        let whole = magnitude >> L::FRAC;
        let mut frac = magnitude & (L::FRAC_MASK as u128);

        if raw < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}", whole)?;
        if L::FRAC == 0 {
            return Ok(());
        }

        // frac < 2^64, so frac * 10 never leaves u128
        f.write_str(".")?;
        loop {
            frac *= 10;
            let digit = (frac >> L::FRAC) as u8;
            frac &= L::FRAC_MASK as u128;
            write!(f, "{}", digit)?;
            if frac == 0 {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::numeric::{IFix, UFix};
    use typenum::{U0, U16, U17, U3, U4, U5, U64, U8};

    #[test]
    fn test_bitstring() {
        assert_eq!(UFix::<U5, U3>::from_f64(8.25).to_bitstring(), "01000.010");
        assert_eq!(UFix::<U4, U4>::from_f64(2.5).to_bitstring(), "0010.1000");
        assert_eq!(UFix::<U3, U3>::max_value().to_bitstring(), "111.111");
    }

    #[test]
    fn test_bitstring_signed() {
        assert_eq!(IFix::<U4, U4>::from_f64(-1.0).to_bitstring(), "1111.0000");
        assert_eq!(IFix::<U4, U4>::max_value().to_bitstring(), "0111.1111");
        assert_eq!(
            IFix::<U17, U16>::max_value().to_bitstring(),
            "01111111111111111.1111111111111111"
        );
    }

    #[test]
    fn test_bitstring_edge_shapes() {
        assert_eq!(UFix::<U0, U4>::from_f64(0.5).to_bitstring(), ".1000");
        assert_eq!(UFix::<U4, U0>::from_f64(5.0).to_bitstring(), "0101.");
        assert_eq!(UFix::<U64, U0>::max_value().to_bitstring().len(), 65);
    }

    #[test]
    fn test_binary_format() {
        let x = UFix::<U5, U3>::from_f64(8.25);
        assert_eq!(format!("{:b}", x), "01000.010");
    }

    #[test]
    fn test_display() {
        assert_eq!(UFix::<U5, U3>::from_f64(8.25).to_string(), "8.25");
        assert_eq!(UFix::<U5, U3>::from_f64(16.0).to_string(), "16.0");
        assert_eq!(UFix::<U0, U8>::from_bits(1).to_string(), "0.00390625");
        assert_eq!(IFix::<U4, U4>::from_f64(-1.5).to_string(), "-1.5");
        assert_eq!(IFix::<U4, U4>::from_f64(-0.0625).to_string(), "-0.0625");
        assert_eq!(UFix::<U8, U0>::from_f64(200.0).to_string(), "200");
    }

    #[test]
    fn test_display_precision() {
        let x = UFix::<U4, U8>::from_f64(3.14159);
        assert_eq!(format!("{:.2}", x), "3.14");
    }

    #[test]
    fn test_debug() {
        let x = UFix::<U5, U3>::from_f64(8.25);
        assert_eq!(format!("{:?}", x), "FixedPoint<5.3u>(8.25, bits=01000.010)");

        let s = IFix::<U4, U4>::from_f64(-1.0);
        assert_eq!(format!("{:?}", s), "FixedPoint<4.4s>(-1.0, bits=1111.0000)");
    }
}
