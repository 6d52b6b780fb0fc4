#![cfg(test)]

use crate::domain::{Amm, Registry, Vault};
use crate::error::LedgerError;
use crate::kernel::core::{Call, Command, Kernel, SystemState};
use crate::kernel::runtime::{AmmCall, RegistryCall, VaultCall};
use crate::primitives::{Address, AddressBytes, Event};
use crate::token::{FungibleLedger, MemoryToken};
use crate::types::{Amount, Asset, Shares};

// --- Test Utilities ---

const ADMIN: Address = AddressBytes::repeat(0xa1);
const USER: Address = AddressBytes::repeat(0xb2);
const POOL: Address = AddressBytes::repeat(0xc3);
const VAULT: Address = AddressBytes::repeat(0xd4);

const FUNDS: Amount = 1_000_000;

struct Fixture {
    kernel: Kernel<MemoryToken>,
    x: MemoryToken,
    y: MemoryToken,
}

fn fixture() -> Fixture {
    let x = MemoryToken::new("X");
    let y = MemoryToken::new("Y");
    for who in [ADMIN, USER] {
        x.mint(&who, FUNDS).unwrap();
        y.mint(&who, FUNDS).unwrap();
        x.approve(&who, &POOL, Amount::MAX).unwrap();
        y.approve(&who, &POOL, Amount::MAX).unwrap();
        x.approve(&who, &VAULT, Amount::MAX).unwrap();
    }
    let amm = Amm::new(POOL, x.clone(), y.clone());
    let vault = Vault::new(VAULT, x.clone());
    Fixture { kernel: Kernel::new(amm, vault, Registry::new()), x, y }
}

/// A second, empty kernel over the fixture's token ledgers.
fn rebuilt(f: &Fixture) -> Kernel<MemoryToken> {
    let amm = Amm::new(POOL, f.x.clone(), f.y.clone());
    let vault = Vault::new(VAULT, f.x.clone());
    Kernel::new(amm, vault, Registry::new())
}

fn amm(caller: Address, call: AmmCall) -> Command {
    Command::new(caller, Call::Amm(call))
}

fn claim(caller: Address, name: &str) -> Command {
    Command::new(caller, Call::Registry(RegistryCall::Claim { name: name.into() }))
}

// --- Tests ---

#[test]
fn test_apply_assigns_increasing_sequence_numbers() {
    let mut f = fixture();
    let first = f.kernel.apply(&amm(ADMIN, AmmCall::Init { x: 10, y: 10 })).unwrap();
    let second = f.kernel.apply(&claim(USER, "nice")).unwrap();
    let third = f
        .kernel
        .apply(&Command::new(ADMIN, Call::Vault(VaultCall::Deposit { amount: 5 })))
        .unwrap();

    assert_eq!(first.sequence, 1);
    assert_eq!(second.sequence, 2);
    assert_eq!(third.sequence, 3);
    assert_eq!(f.kernel.sequence(), 3);
    assert_eq!(first.event, Event::Liquidity { provider: ADMIN, x: 10, y: 10, shares: Shares::from(100u64) });
    assert_eq!(second.event, Event::Claim { owner: USER, name: "nice".into() });
    assert_eq!(f.kernel.receipts().len(), 3);
    assert!(f.kernel.receipts().iter().all(|r| r.event.actor() == r.caller));
}

#[test]
fn test_rejected_command_is_not_journalled() {
    let mut f = fixture();
    let err = f.kernel.apply(&amm(ADMIN, AmmCall::SellX { x_in: 1 })).unwrap_err();
    assert_eq!(err, LedgerError::InsufficientReserves(Asset::Y));
    assert_eq!(f.kernel.sequence(), 0);
    assert!(f.kernel.receipts().is_empty());

    f.kernel.apply(&claim(ADMIN, "nice")).unwrap();
    let err = f.kernel.apply(&claim(USER, "nice")).unwrap_err();
    assert_eq!(err, LedgerError::NameAlreadyClaimed);
    assert_eq!(f.kernel.sequence(), 1);
    assert_eq!(f.kernel.receipts().len(), 1);
}

#[test]
fn test_exhausted_sequence_refuses_commands() {
    let mut f = fixture();
    f.kernel.set_sequence_for_test(u64::MAX);
    let err = f.kernel.apply(&claim(ADMIN, "nice")).unwrap_err();
    assert_eq!(err, LedgerError::ArithmeticOverflow);
    // The registry was never reached.
    assert_eq!(f.kernel.registry().name_to_owner("nice"), None);
}

#[test]
fn test_swap_scenario_through_kernel() {
    let mut f = fixture();
    f.kernel.apply(&amm(ADMIN, AmmCall::Init { x: 10, y: 10 })).unwrap();
    let receipt = f.kernel.apply(&amm(USER, AmmCall::SellX { x_in: 1 })).unwrap();

    assert_eq!(receipt.event, Event::SellX { seller: USER, x_in: 1, y_out: 1 });
    assert_eq!(f.kernel.amm().x_reserves(), 11);
    assert_eq!(f.kernel.amm().y_reserves(), 9);
    assert_eq!(f.x.balance_of(&USER).unwrap(), FUNDS - 1);
    assert_eq!(f.y.balance_of(&USER).unwrap(), FUNDS + 1);
}

#[test]
fn test_command_json_decoding() {
    let json = format!(
        r#"{{"caller":"{}","call":{{"amm":{{"sell_x":{{"x_in":340282366920938463463374607431768211455}}}}}}}}"#,
        USER
    );
    let cmd = Command::from_json(&json).unwrap();
    assert_eq!(cmd, amm(USER, AmmCall::SellX { x_in: Amount::MAX }));
    assert_eq!(Command::from_json(&cmd.to_json().unwrap()).unwrap(), cmd);

    assert!(Command::from_json(r#"{"caller":"0x12","call":{"registry":{"claim":{"name":"a"}}}}"#).is_err());
    assert!(Command::from_json(r#"{"caller":"0x0000000000000000000000000000000000000000","call":{"bank":{}}}"#).is_err());
}

#[test]
fn test_snapshot_restore_preserves_state() {
    let mut f = fixture();
    f.kernel.apply(&amm(ADMIN, AmmCall::Init { x: 20, y: 40 })).unwrap();
    f.kernel.apply(&amm(USER, AmmCall::SellY { y_in: 7 })).unwrap();
    f.kernel
        .apply(&Command::new(USER, Call::Vault(VaultCall::Deposit { amount: 9 })))
        .unwrap();
    f.kernel.apply(&claim(USER, "nice")).unwrap();

    let snapshot = f.kernel.snapshot();
    let decoded = SystemState::from_json(&snapshot.to_json().unwrap()).unwrap();
    assert_eq!(decoded, snapshot);

    let fresh = rebuilt(&f).restore(decoded).unwrap();
    assert_eq!(fresh.snapshot(), snapshot);
    assert_eq!(fresh.sequence(), 4);
    assert_eq!(fresh.vault().deposits(&USER), 9);
    assert_eq!(fresh.registry().name_to_owner("nice"), Some(USER));
}

#[test]
fn test_restore_rejects_inconsistent_snapshot() {
    let mut f = fixture();
    f.kernel.apply(&claim(ADMIN, "a")).unwrap();
    f.kernel.apply(&claim(ADMIN, "b")).unwrap();

    let mut unordered = f.kernel.snapshot();
    unordered.receipts.swap(0, 1);
    assert!(matches!(
        fixture().kernel.restore(unordered),
        Err(LedgerError::InvalidState(_))
    ));

    let mut behind = f.kernel.snapshot();
    behind.sequence = 1;
    assert!(matches!(fixture().kernel.restore(behind), Err(LedgerError::InvalidState(_))));

    let mut drained = f.kernel.snapshot();
    drained.pool.initialized = true;
    assert!(matches!(fixture().kernel.restore(drained), Err(LedgerError::InvalidState(_))));
}

#[test]
fn test_restore_rejects_snapshot_the_ledgers_cannot_back() {
    let mut f = fixture();
    f.kernel.apply(&amm(ADMIN, AmmCall::Init { x: 20, y: 40 })).unwrap();
    f.kernel
        .apply(&Command::new(USER, Call::Vault(VaultCall::Deposit { amount: 9 })))
        .unwrap();
    let snapshot = f.kernel.snapshot();

    // Fresh ledgers: neither the pool nor the vault holds anything.
    assert!(matches!(
        fixture().kernel.restore(snapshot.clone()),
        Err(LedgerError::InvalidState(_))
    ));

    // Pool backed, vault short by one unit.
    let mut overdrawn = snapshot.clone();
    overdrawn.vault.deposits.insert(ADMIN, 1);
    assert!(matches!(rebuilt(&f).restore(overdrawn), Err(LedgerError::InvalidState(_))));

    let mut inflated = snapshot.clone();
    inflated.pool.x_reserves += 1;
    assert!(matches!(rebuilt(&f).restore(inflated), Err(LedgerError::InvalidState(_))));

    assert_eq!(rebuilt(&f).restore(snapshot.clone()).unwrap().snapshot(), snapshot);
}
