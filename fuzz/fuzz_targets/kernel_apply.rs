#![no_main]

// Harness: arbitrary command streams against a funded kernel.
// Every rejected command must leave the snapshot and the token balances
// exactly as they were; every accepted one must advance the sequence by one.

use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;
use amm_ledger_core::kernel::{AmmCall, Call, Command, RegistryCall, VaultCall};
use amm_ledger_core::test_utils::{TestKernel, POOL, VAULT};
use amm_ledger_core::token::FungibleLedger;
use amm_ledger_core::AddressBytes;

#[derive(Arbitrary, Debug, Clone)]
enum FuzzCall {
    Init(u64, u64),
    Mint(u64, u64),
    Burn(u64),
    SellX(u64),
    SellY(u64),
    Deposit(u64),
    Withdraw(u64),
    Claim(u8),
    Release(u8),
}

#[derive(Arbitrary, Debug, Clone)]
struct FuzzCommand {
    caller: u8,
    call: FuzzCall,
}

impl FuzzCommand {
    fn into_command(self) -> Command {
        let caller = AddressBytes::repeat(self.caller % 4 + 1);
        let call = match self.call {
            FuzzCall::Init(x, y) => Call::Amm(AmmCall::Init { x: x.into(), y: y.into() }),
            FuzzCall::Mint(x, y) => Call::Amm(AmmCall::Mint { x: x.into(), y: y.into() }),
            FuzzCall::Burn(shares) => Call::Amm(AmmCall::Burn { shares: shares.into() }),
            FuzzCall::SellX(x_in) => Call::Amm(AmmCall::SellX { x_in: x_in.into() }),
            FuzzCall::SellY(y_in) => Call::Amm(AmmCall::SellY { y_in: y_in.into() }),
            FuzzCall::Deposit(amount) => Call::Vault(VaultCall::Deposit { amount: amount.into() }),
            FuzzCall::Withdraw(amount) => Call::Vault(VaultCall::Withdraw { amount: amount.into() }),
            FuzzCall::Claim(n) => Call::Registry(RegistryCall::Claim { name: format!("n{}", n % 8) }),
            FuzzCall::Release(n) => Call::Registry(RegistryCall::Release { name: format!("n{}", n % 8) }),
        };
        Command::new(caller, call)
    }
}

fuzz_target!(|commands: Vec<FuzzCommand>| {
    let holders: Vec<_> = (1..=4u8).map(AddressBytes::repeat).collect();
    let Ok(mut tk) = TestKernel::new(&holders, u64::MAX as u128) else {
        return;
    };

    for fuzz_cmd in commands {
        let cmd = fuzz_cmd.into_command();
        let before = tk.kernel.snapshot();
        let balances = (tk.holdings(&cmd.caller).unwrap(), tk.holdings(&POOL).unwrap());

        match tk.kernel.apply(&cmd) {
            Ok(receipt) => assert_eq!(receipt.sequence, before.sequence + 1),
            Err(_) => {
                assert_eq!(tk.kernel.snapshot(), before);
                assert_eq!((tk.holdings(&cmd.caller).unwrap(), tk.holdings(&POOL).unwrap()), balances);
            }
        }

        assert!(tk.kernel.amm().state().check_invariants().is_ok());
        assert_eq!(tk.x.balance_of(&POOL).unwrap(), tk.kernel.amm().x_reserves());
        assert_eq!(tk.y.balance_of(&POOL).unwrap(), tk.kernel.amm().y_reserves());
        assert!(tk.x.balance_of(&VAULT).unwrap() >= tk.kernel.vault().total_deposits().unwrap());
    }
});
