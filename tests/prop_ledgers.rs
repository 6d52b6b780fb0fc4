use proptest::prelude::*;
use amm_ledger_core::domain::{Registry, Vault};
use amm_ledger_core::error::LedgerError;
use amm_ledger_core::test_utils::{funded_token, VAULT};
use amm_ledger_core::token::FungibleLedger;
use amm_ledger_core::types::Amount;
use amm_ledger_core::{Address, AddressBytes};

fn owner(id: u8) -> Address {
    AddressBytes::repeat(id)
}

proptest! {
    /// Depositing and then withdrawing the same amount restores both the
    /// recorded deposit and the caller's token balance.
    #[test]
    fn prop_vault_round_trip(prior in 0..1_000u128, amount in 1..1_000_000u128) {
        let who = owner(1);
        let token = funded_token("V", &[who], 2_000_000, &[VAULT]).unwrap();
        let mut vault = Vault::new(VAULT, token.clone());
        if prior > 0 {
            vault.deposit(who, prior).unwrap();
        }
        let (recorded, balance) = (vault.deposits(&who), token.balance_of(&who).unwrap());

        vault.deposit(who, amount).unwrap();
        prop_assert_eq!(vault.deposits(&who), recorded + amount);
        vault.withdraw(who, amount).unwrap();

        prop_assert_eq!(vault.deposits(&who), recorded);
        prop_assert_eq!(token.balance_of(&who).unwrap(), balance);
        prop_assert!(vault.is_solvent().unwrap());
    }

    /// No owner ever withdraws more than they deposited, whatever others hold.
    #[test]
    fn prop_vault_isolates_owners(
        ops in proptest::collection::vec((1..4u8, any::<bool>(), 1..500u128), 1..60)
    ) {
        let owners: Vec<Address> = (1..4u8).map(owner).collect();
        let token = funded_token("V", &owners, 10_000, &[VAULT]).unwrap();
        let mut vault = Vault::new(VAULT, token.clone());

        for (id, is_deposit, amount) in ops {
            let who = owner(id);
            let held = vault.deposits(&who);
            let result = if is_deposit {
                vault.deposit(who, amount)
            } else {
                vault.withdraw(who, amount)
            };
            if !is_deposit && amount > held {
                prop_assert_eq!(result, Err(LedgerError::InsufficientVaultBalance));
                prop_assert_eq!(vault.deposits(&who), held);
            }
            let total: Amount = owners.iter().map(|o| vault.deposits(o)).sum();
            prop_assert_eq!(vault.total_deposits().unwrap(), total);
            prop_assert_eq!(token.balance_of(&VAULT).unwrap(), total);
        }
    }

    /// A name has at most one owner and only that owner can release it.
    #[test]
    fn prop_registry_exclusive(
        ops in proptest::collection::vec((1..4u8, 0..5u8, any::<bool>()), 1..80)
    ) {
        let mut registry = Registry::new();
        for (id, name_id, is_claim) in ops {
            let who = owner(id);
            let name = format!("name-{}", name_id);
            let current = registry.name_to_owner(&name);
            if is_claim {
                let result = registry.claim(who, &name);
                match current {
                    Some(_) => prop_assert_eq!(result, Err(LedgerError::NameAlreadyClaimed)),
                    None => prop_assert!(result.is_ok()),
                }
            } else {
                let result = registry.release(who, &name);
                if current == Some(who) {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(registry.name_to_owner(&name), None);
                } else {
                    prop_assert_eq!(result, Err(LedgerError::NotOwner));
                    prop_assert_eq!(registry.name_to_owner(&name), current);
                }
            }
        }
    }
}
