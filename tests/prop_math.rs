use proptest::prelude::*;
use std::cmp::Ordering;
use amm_ledger_core::error::LedgerError;
use amm_ledger_core::math::{mul, mul_cmp, mul_div, narrow, wide_mul, U256};

proptest! {
    /// `mul_div` agrees with native arithmetic whenever the product fits.
    #[test]
    fn prop_mul_div_matches_native(a in any::<u64>(), b in any::<u64>(), c in 1..u64::MAX) {
        let (a, b, c) = (a as u128, b as u128, c as u128);
        prop_assert_eq!(mul_div(a, b, c), Ok(a * b / c));
    }

    /// Wide intermediates let `a * b / c` succeed even when `a * b` overflows u128.
    #[test]
    fn prop_mul_div_survives_wide_products(a in any::<u128>(), b in 1..u128::MAX) {
        prop_assert_eq!(mul_div(a, b, b), Ok(a));
    }

    #[test]
    fn prop_division_by_zero_is_overflow(a in any::<u128>(), b in any::<u128>()) {
        prop_assert_eq!(mul_div(a, b, 0), Err(LedgerError::ArithmeticOverflow));
    }

    /// `mul` fails exactly when the true product does not fit in 128 bits.
    #[test]
    fn prop_mul_narrowing(a in any::<u128>(), b in any::<u128>()) {
        let wide = wide_mul(a, b);
        match a.checked_mul(b) {
            Some(p) => prop_assert_eq!(mul(a, b), Ok(p)),
            None => {
                prop_assert_eq!(mul(a, b), Err(LedgerError::ArithmeticOverflow));
                prop_assert!(wide > U256::from(u128::MAX));
                prop_assert_eq!(narrow(wide), Err(LedgerError::ArithmeticOverflow));
            }
        }
    }

    /// Compares `a * b` with `c * d` exactly, whatever their width.
    #[test]
    fn prop_mul_cmp_is_antisymmetric(a in any::<u128>(), b in any::<u128>(), c in any::<u128>(), d in any::<u128>()) {
        prop_assert_eq!(mul_cmp(a, b, c, d), mul_cmp(c, d, a, b).reverse());
        prop_assert_eq!(mul_cmp(a, b, b, a), Ordering::Equal);
    }
}
