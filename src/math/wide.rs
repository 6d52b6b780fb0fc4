//! 256-bit intermediates for 128-bit fixed-point arithmetic.
//!
//! Every product of two [`Amount`]s is formed in a [`U256`] so it can never
//! overflow before the final division; only the narrowing back to 128 bits can
//! fail, and that failure is reported as [`LedgerError::ArithmeticOverflow`].
//!
//! Liquidity shares are themselves 256-bit ([`Shares`]), so share arithmetic
//! goes one size up again and forms its products in a [`U512`].

use core::cmp::Ordering;

use uint::construct_uint;

use crate::error::LedgerError;
use crate::types::{Amount, Shares};

construct_uint! {
    /// 256-bit unsigned integer, twice the width of an [`Amount`].
    pub struct U256(4);
}

construct_uint! {
    /// 512-bit intermediate for products involving [`Shares`].
    pub struct U512(8);
}

/// Limbs are little-endian, so the low four carry the whole value.
fn widen(value: U256) -> U512 {
    let mut limbs = [0u64; 8];
    limbs[..4].copy_from_slice(&value.0);
    U512(limbs)
}

fn narrow_wide(value: U512) -> Result<U256, LedgerError> {
    if value.bits() > 256 {
        return Err(LedgerError::ArithmeticOverflow);
    }
    let mut limbs = [0u64; 4];
    limbs.copy_from_slice(&value.0[..4]);
    Ok(U256(limbs))
}

/// Exact `a * b` in 256 bits. Cannot overflow: both factors are below `2^128`.
#[inline]
pub fn wide_mul(a: Amount, b: Amount) -> U256 {
    U256::from(a) * U256::from(b)
}

/// Narrows a 256-bit value back to an [`Amount`].
#[inline]
pub fn narrow(value: U256) -> Result<Amount, LedgerError> {
    if value.bits() > 128 {
        return Err(LedgerError::ArithmeticOverflow);
    }
    Ok(value.low_u128())
}

/// `a * b / c`, truncated toward zero.
///
/// Division by zero and results wider than 128 bits are errors, never panics.
pub fn mul_div(a: Amount, b: Amount, c: Amount) -> Result<Amount, LedgerError> {
    if c == 0 {
        return Err(LedgerError::ArithmeticOverflow);
    }
    narrow(wide_mul(a, b) / U256::from(c))
}

/// `a * b` narrowed to an [`Amount`].
pub fn mul(a: Amount, b: Amount) -> Result<Amount, LedgerError> {
    narrow(wide_mul(a, b))
}

/// Compares `a * b` with `c * d` without overflow.
pub fn mul_cmp(a: Amount, b: Amount, c: Amount, d: Amount) -> Ordering {
    wide_mul(a, b).cmp(&wide_mul(c, d))
}

/// `amount * shares / divisor` as a share count.
pub fn mul_div_shares(amount: Amount, shares: Shares, divisor: Amount) -> Result<Shares, LedgerError> {
    if divisor == 0 {
        return Err(LedgerError::ArithmeticOverflow);
    }
    let product = widen(U256::from(amount)) * widen(shares);
    narrow_wide(product / widen(U256::from(divisor)))
}

/// `amount * part / whole` where `part` and `whole` are share counts.
pub fn mul_div_by_shares(amount: Amount, part: Shares, whole: Shares) -> Result<Amount, LedgerError> {
    if whole.is_zero() {
        return Err(LedgerError::ArithmeticOverflow);
    }
    let product = widen(U256::from(amount)) * widen(part);
    narrow(narrow_wide(product / widen(whole))?)
}

#[inline]
pub fn add_shares(a: Shares, b: Shares) -> Result<Shares, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::ArithmeticOverflow)
}

#[inline]
pub fn sub_shares(a: Shares, b: Shares) -> Result<Shares, LedgerError> {
    a.checked_sub(b).ok_or(LedgerError::ArithmeticOverflow)
}

#[inline]
pub fn add(a: Amount, b: Amount) -> Result<Amount, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::ArithmeticOverflow)
}

#[inline]
pub fn sub(a: Amount, b: Amount) -> Result<Amount, LedgerError> {
    a.checked_sub(b).ok_or(LedgerError::ArithmeticOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ONE;

    #[test]
    fn test_mul_div_truncates() {
        assert_eq!(mul_div(10, 10, 11), Ok(9));
        assert_eq!(mul_div(7, 1, 2), Ok(3));
        assert_eq!(mul_div(0, 5, 3), Ok(0));
    }

    #[test]
    fn test_mul_div_uses_wide_intermediate() {
        // u128::MAX * 2 overflows 128 bits but the quotient fits.
        assert_eq!(mul_div(u128::MAX, 2, 2), Ok(u128::MAX));
        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX), Ok(u128::MAX));
        assert_eq!(mul_div(100 * ONE, 100 * ONE, ONE), Ok(10_000 * ONE));
    }

    #[test]
    fn test_mul_div_reports_overflow_and_zero_divisor() {
        assert_eq!(mul_div(u128::MAX, 3, 2), Err(LedgerError::ArithmeticOverflow));
        assert_eq!(mul_div(1, 1, 0), Err(LedgerError::ArithmeticOverflow));
    }

    #[test]
    fn test_mul_narrowing() {
        assert_eq!(mul(10 * ONE, 10 * ONE), Ok(100 * ONE * ONE));
        assert_eq!(mul(100 * ONE, 100 * ONE), Err(LedgerError::ArithmeticOverflow));
        assert_eq!(mul(1u128 << 64, 1u128 << 63), Ok(1u128 << 127));
        assert_eq!(mul(1u128 << 64, 1u128 << 64), Err(LedgerError::ArithmeticOverflow));
    }

    #[test]
    fn test_mul_cmp_beyond_128_bits() {
        assert_eq!(mul_cmp(u128::MAX, 2, u128::MAX, 3), Ordering::Less);
        assert_eq!(mul_cmp(u128::MAX, 4, 2, u128::MAX - 1), Ordering::Greater);
        assert_eq!(mul_cmp(6, 4, 3, 8), Ordering::Equal);
    }

    #[test]
    fn test_share_products_use_512_bits() {
        let huge = wide_mul(u128::MAX, u128::MAX);
        // u128::MAX * (u128::MAX^2) / u128::MAX brings the 384-bit product back.
        assert_eq!(mul_div_shares(u128::MAX, huge, u128::MAX), Ok(huge));
        assert_eq!(mul_div_shares(10, U256::from(100u64), 10), Ok(U256::from(100u64)));
        assert_eq!(mul_div_shares(u128::MAX, huge, 1), Err(LedgerError::ArithmeticOverflow));
        assert_eq!(mul_div_shares(1, huge, 0), Err(LedgerError::ArithmeticOverflow));
    }

    #[test]
    fn test_share_fraction_of_amount() {
        let whole = wide_mul(100 * ONE, 100 * ONE);
        let quarter = whole / U256::from(4u64);
        assert_eq!(mul_div_by_shares(100 * ONE, quarter, whole), Ok(25 * ONE));
        assert_eq!(mul_div_by_shares(u128::MAX, whole, whole), Ok(u128::MAX));
        assert_eq!(mul_div_by_shares(1, U256::one(), U256::zero()), Err(LedgerError::ArithmeticOverflow));
    }

    #[test]
    fn test_share_add_sub_checked() {
        assert_eq!(add_shares(U256::max_value(), U256::one()), Err(LedgerError::ArithmeticOverflow));
        assert_eq!(sub_shares(U256::zero(), U256::one()), Err(LedgerError::ArithmeticOverflow));
        assert_eq!(add_shares(U256::from(2u64), U256::from(3u64)), Ok(U256::from(5u64)));
    }

    #[test]
    fn test_add_sub_checked() {
        assert_eq!(add(u128::MAX, 1), Err(LedgerError::ArithmeticOverflow));
        assert_eq!(sub(0, 1), Err(LedgerError::ArithmeticOverflow));
        assert_eq!(add(2, 3), Ok(5));
    }
}
