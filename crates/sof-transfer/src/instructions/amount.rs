//! Human-scale to base-unit amount conversion.

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Decimal precision of native SOL.
pub const SOL_DECIMALS: u8 = 9;

/// Converts a human-scale amount to base units: `round(amount * 10^decimals)`.
///
/// Halves round away from zero. Negative and non-finite inputs yield `0`; results above
/// `u64::MAX` saturate.
#[must_use]
pub fn to_base_units(amount: f64, decimals: u8) -> u64 {
    let scaled = amount * 10_f64.powi(i32::from(decimals));
    if scaled.is_nan() || scaled <= 0.0 {
        return 0;
    }
    // Float-to-int `as` casts saturate at the target bounds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let units = scaled.round() as u64;
    units
}

/// Converts SOL to lamports.
#[must_use]
pub fn sol_to_lamports(amount_sol: f64) -> u64 {
    to_base_units(amount_sol, SOL_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_amount_scales_by_mint_decimals() {
        assert_eq!(to_base_units(1.5, 6), 1_500_000);
        assert_eq!(to_base_units(0.1, 9), 100_000_000);
        assert_eq!(to_base_units(42.0, 0), 42);
        assert_eq!(to_base_units(0.000_000_5, 6), 1);
    }

    #[test]
    fn one_sol_is_one_billion_lamports() {
        assert_eq!(sol_to_lamports(1.0), LAMPORTS_PER_SOL);
        assert_eq!(sol_to_lamports(0.000_000_001), 1);
    }

    #[test]
    fn out_of_range_amounts_saturate() {
        assert_eq!(to_base_units(-2.0, 6), 0);
        assert_eq!(to_base_units(f64::NAN, 6), 0);
        assert_eq!(to_base_units(f64::INFINITY, 6), u64::MAX);
        assert_eq!(to_base_units(1e30, 9), u64::MAX);
    }
}
