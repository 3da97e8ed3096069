use crate::journal::{FileJournal, LedgerEvent};
use crate::traits::{GenesisWitness, OwnershipLedger};
use curio_core::error::LedgerError;
use curio_core::id::{AccountId, CollectionId, ObjectId};
use curio_core::objects::LedgerObject;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Mutable ledger state, guarded by a single mutex so each operation
/// is one serialized atomic step.
#[derive(Debug, Default)]
struct LedgerState {
    /// Live objects by identity
    objects: HashMap<ObjectId, LedgerObject>,
    /// Identities that have been destroyed. Retired identities never
    /// resolve and are never allocated again.
    retired: HashSet<ObjectId>,
    /// Collections whose genesis witness has already been issued
    claimed: HashSet<CollectionId>,
    /// Per-collection allocation nonce, strictly increasing
    nonces: HashMap<CollectionId, u64>,
}

/// In-memory ownership ledger.
///
/// The reference implementation of [`OwnershipLedger`]: a mutex-guarded
/// object map with an optional event journal. Suitable for tests and
/// for hosts that persist through the journal alone.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    journal: Option<FileJournal>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger that records every committed effect to an
    /// append-only journal file
    pub fn with_journal(path: &Path) -> Result<Self, LedgerError> {
        Ok(Self {
            state: Mutex::new(LedgerState::default()),
            journal: Some(FileJournal::open(path)?),
        })
    }

    fn state(&self) -> Result<MutexGuard<'_, LedgerState>, LedgerError> {
        self.state
            .lock()
            .map_err(|e| LedgerError::Other(format!("ledger state lock poisoned: {}", e)))
    }

    fn record(&self, event: LedgerEvent) -> Result<(), LedgerError> {
        if let Some(journal) = &self.journal {
            journal.append(&event)?;
        }
        Ok(())
    }
}

impl OwnershipLedger for InMemoryLedger {
    fn claim_collection(&self, collection: &CollectionId) -> Result<GenesisWitness, LedgerError> {
        let mut state = self.state()?;
        if !state.claimed.insert(*collection) {
            return Err(LedgerError::AlreadyInitialized(collection.to_string()));
        }
        log::info!("collection {} claimed for initialization", collection);
        Ok(GenesisWitness::issue(*collection))
    }

    fn allocate_identity(&self, collection: &CollectionId) -> Result<ObjectId, LedgerError> {
        let mut state = self.state()?;
        let mut nonce = state.nonces.get(collection).copied().unwrap_or(0);
        loop {
            let (id, _) = ObjectId::try_derive(&[collection.bytes(), &nonce.to_le_bytes()])
                .ok_or_else(|| {
                    LedgerError::Identity(format!(
                        "no off-curve identity for {} at nonce {}",
                        collection, nonce
                    ))
                })?;
            nonce += 1;
            // Skip identities this ledger has already seen. The hash
            // makes a collision all but impossible, the check keeps the
            // no-reuse invariant unconditional.
            if !state.objects.contains_key(&id) && !state.retired.contains(&id) {
                state.nonces.insert(*collection, nonce);
                return Ok(id);
            }
        }
    }

    fn insert(&self, object: LedgerObject) -> Result<(), LedgerError> {
        let mut state = self.state()?;
        if state.retired.contains(&object.id) {
            return Err(LedgerError::Other(format!(
                "identity {} has been retired",
                object.id
            )));
        }
        if state.objects.contains_key(&object.id) {
            return Err(LedgerError::Other(format!(
                "identity {} already in use",
                object.id
            )));
        }
        state.objects.insert(object.id, object.clone());
        // Record while still holding the state guard so the journal
        // order matches the commit order. The journal has its own
        // mutex and never takes the state lock, so no cycle.
        self.record(LedgerEvent::created(object))
    }

    fn get(&self, id: &ObjectId) -> Result<LedgerObject, LedgerError> {
        let state = self.state()?;
        state
            .objects
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    fn owner_of(&self, id: &ObjectId) -> Result<AccountId, LedgerError> {
        let state = self.state()?;
        state
            .objects
            .get(id)
            .map(|object| object.owner)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    fn transfer_owner(
        &self,
        id: &ObjectId,
        expected_owner: Option<&AccountId>,
        recipient: &AccountId,
    ) -> Result<(), LedgerError> {
        let mut state = self.state()?;
        let object = state
            .objects
            .get_mut(id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        if let Some(expected) = expected_owner {
            if &object.owner != expected {
                return Err(LedgerError::NotOwned(id.to_string()));
            }
        }
        let previous = object.owner;
        object.owner = *recipient;
        log::debug!("object {} owner {} -> {}", id, previous, recipient);
        self.record(LedgerEvent::transferred(*id, previous, *recipient))
    }

    fn retire(&self, id: &ObjectId, caller: &AccountId) -> Result<(), LedgerError> {
        let mut state = self.state()?;
        let owner = state
            .objects
            .get(id)
            .map(|object| object.owner)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        if &owner != caller {
            return Err(LedgerError::NotOwned(id.to_string()));
        }
        state.objects.remove(id);
        state.retired.insert(*id);
        log::debug!("object {} retired by {}", id, caller);
        self.record(LedgerEvent::retired(*id, owner))
    }

    fn objects_owned_by(&self, owner: &AccountId) -> Result<Vec<LedgerObject>, LedgerError> {
        let state = self.state()?;
        let mut owned: Vec<_> = state
            .objects
            .values()
            .filter(|object| &object.owner == owner)
            .cloned()
            .collect();
        owned.sort_by_key(|object| object.id);
        Ok(owned)
    }
}
