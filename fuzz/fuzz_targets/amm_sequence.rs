#![no_main]

// Harness: full-width swap and liquidity amounts against a single pool.
// Checks that the reserve product never grows on a sale and that no input
// ever panics the fixed-point arithmetic.

use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;
use amm_ledger_core::domain::Amm;
use amm_ledger_core::math::wide_mul;
use amm_ledger_core::test_utils::{funded_token, POOL};
use amm_ledger_core::AddressBytes;

#[derive(Arbitrary, Debug, Clone)]
enum Step {
    Mint(u128, u128),
    Burn(u128),
    SellX(u128),
    SellY(u128),
}

#[derive(Arbitrary, Debug, Clone)]
struct Input {
    x0: u128,
    y0: u128,
    steps: Vec<Step>,
}

fuzz_target!(|input: Input| {
    let lp = AddressBytes::repeat(1);
    let Ok(x) = funded_token("X", &[lp], u128::MAX, &[POOL]) else { return };
    let Ok(y) = funded_token("Y", &[lp], u128::MAX, &[POOL]) else { return };
    let mut amm = Amm::new(POOL, x, y);
    if amm.init(lp, input.x0, input.y0).is_err() {
        assert!(!amm.is_initialized());
        return;
    }

    for step in input.steps {
        let product = wide_mul(amm.x_reserves(), amm.y_reserves());
        match step {
            Step::Mint(x, y) => { let _ = amm.mint(lp, x, y); }
            Step::Burn(shares) => { let _ = amm.burn(lp, shares.into()); }
            Step::SellX(x_in) => {
                if amm.sell_x(lp, x_in).is_ok() {
                    assert!(wide_mul(amm.x_reserves(), amm.y_reserves()) <= product);
                }
            }
            Step::SellY(y_in) => {
                if amm.sell_y(lp, y_in).is_ok() {
                    assert!(wide_mul(amm.x_reserves(), amm.y_reserves()) <= product);
                }
            }
        }
        assert!(amm.state().check_invariants().is_ok());
    }
});
