//! Fixed-point arithmetic helpers.
//!
//! All division truncates toward zero, which rounds every pool computation in
//! the pool's favour.

pub mod decimal;
pub mod wide;

pub use wide::{
    add, add_shares, mul, mul_cmp, mul_div, mul_div_by_shares, mul_div_shares, narrow, sub,
    sub_shares, wide_mul, U256, U512,
};
