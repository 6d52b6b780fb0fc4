//! Name-claim registry: first claimant owns a name until they release it.

use std::collections::BTreeMap;

use crate::error::LedgerError;
use crate::events::{EventLog, EventSink};
use crate::primitives::{Address, Event};

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegistryState {
    pub name_to_owner: BTreeMap<String, Address>,
}

#[derive(Debug, Default)]
pub struct Registry<S: EventSink = EventLog> {
    state: RegistryState,
    sink: S,
}

impl Registry<EventLog> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        self.sink.events()
    }
}

impl<S: EventSink> Registry<S> {
    pub fn with_sink(sink: S) -> Self {
        Registry { state: RegistryState::default(), sink }
    }

    pub fn restore(mut self, state: RegistryState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    pub fn name_to_owner(&self, name: &str) -> Option<Address> {
        self.state.name_to_owner.get(name).copied()
    }

    /// Names currently held by `owner`, in lexicographic order.
    pub fn names_owned_by(&self, owner: &Address) -> Vec<&str> {
        self.state
            .name_to_owner
            .iter()
            .filter(|(_, held_by)| *held_by == owner)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.name_to_owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.name_to_owner.is_empty()
    }

    pub fn claim(&mut self, caller: Address, name: &str) -> Result<Event, LedgerError> {
        if let Some(owner) = self.name_to_owner(name) {
            tracing::warn!(%caller, %owner, name, "name already claimed");
            return Err(LedgerError::NameAlreadyClaimed);
        }
        self.state.name_to_owner.insert(name.to_owned(), caller);
        tracing::info!(%caller, name, "name claimed");
        Ok(self.emit(Event::Claim { owner: caller, name: name.to_owned() }))
    }

    pub fn release(&mut self, caller: Address, name: &str) -> Result<Event, LedgerError> {
        if self.name_to_owner(name) != Some(caller) {
            tracing::warn!(%caller, name, "release by non-owner");
            return Err(LedgerError::NotOwner);
        }
        self.state.name_to_owner.remove(name);
        tracing::info!(%caller, name, "name released");
        Ok(self.emit(Event::Release { owner: caller, name: name.to_owned() }))
    }

    fn emit(&mut self, event: Event) -> Event {
        self.sink.emit(event.clone());
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::AddressBytes;

    const ADMIN: Address = AddressBytes::repeat(0xa1);
    const USER: Address = AddressBytes::repeat(0xb2);

    #[test]
    fn test_name_cannot_be_claimed_twice() {
        let mut registry = Registry::new();
        registry.claim(ADMIN, "nice").unwrap();
        assert_eq!(registry.claim(USER, "nice"), Err(LedgerError::NameAlreadyClaimed));
        assert_eq!(registry.claim(ADMIN, "nice"), Err(LedgerError::NameAlreadyClaimed));
        assert_eq!(registry.name_to_owner("nice"), Some(ADMIN));
        assert_eq!(registry.events().len(), 1);
    }

    #[test]
    fn test_same_owner_many_names() {
        let mut registry = Registry::new();
        registry.claim(ADMIN, "nicer").unwrap();
        registry.claim(ADMIN, "nice").unwrap();
        registry.claim(USER, "other").unwrap();
        assert_eq!(registry.names_owned_by(&ADMIN), vec!["nice", "nicer"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_release_only_by_owner() {
        let mut registry = Registry::new();
        assert_eq!(registry.release(USER, "nice"), Err(LedgerError::NotOwner));
        registry.claim(ADMIN, "nice").unwrap();
        assert_eq!(registry.release(USER, "nice"), Err(LedgerError::NotOwner));

        let evt = registry.release(ADMIN, "nice").unwrap();
        assert_eq!(evt, Event::Release { owner: ADMIN, name: "nice".into() });
        assert_eq!(registry.name_to_owner("nice"), None);
        assert!(registry.is_empty());

        // Released names are claimable again.
        registry.claim(USER, "nice").unwrap();
        assert_eq!(registry.name_to_owner("nice"), Some(USER));
    }
}
