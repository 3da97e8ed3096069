use curio_core::error::LedgerError;
use curio_core::id::{AccountId, CollectionId, ObjectId};
use curio_core::objects::LedgerObject;

/// One-time initialization witness for a collection.
///
/// A witness is issued by [`OwnershipLedger::claim_collection`] exactly
/// once per collection identity and is consumed, by value, by the
/// initialization entry point. It cannot be cloned and has no public
/// constructor, so holding one proves the claim succeeded.
#[derive(Debug)]
pub struct GenesisWitness {
    collection: CollectionId,
}

impl GenesisWitness {
    pub(crate) fn issue(collection: CollectionId) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }
}

/// The identity and ownership ledger the lifecycle runs on.
///
/// The ledger is the platform, not part of the core: it assigns every
/// object a globally unique identity at creation, records a single
/// current owner per identity, and executes transfer and retire as
/// atomic effects. Correctness of everything above it depends on the
/// ledger guaranteeing exactly one owner per live identity and no
/// identity reuse. Implementations serialize all effects on a given
/// object's ownership record.
pub trait OwnershipLedger {
    /// Claim a collection identity for initialization.
    ///
    /// Succeeds at most once per collection; every later claim fails
    /// with `AlreadyInitialized`, which is fatal for that identity.
    fn claim_collection(&self, collection: &CollectionId) -> Result<GenesisWitness, LedgerError>;

    /// Allocate a fresh object identity within a collection.
    ///
    /// Identities are distinct, allocated in a strictly increasing
    /// derivation order, and never reused, not even after retire.
    fn allocate_identity(&self, collection: &CollectionId) -> Result<ObjectId, LedgerError>;

    /// Record a newly created object together with its sole owner.
    fn insert(&self, object: LedgerObject) -> Result<(), LedgerError>;

    /// Fetch the live record for an identity.
    ///
    /// Fails with `NotFound` for unknown and for retired identities.
    fn get(&self, id: &ObjectId) -> Result<LedgerObject, LedgerError>;

    /// Current owner of a live object
    fn owner_of(&self, id: &ObjectId) -> Result<AccountId, LedgerError>;

    /// Atomically reassign sole ownership of a live object.
    ///
    /// When `expected_owner` is given the reassignment only happens if
    /// it matches the current owner (`NotOwned` otherwise). Callers
    /// pass `None` only after an authorization gate of their own has
    /// already been applied.
    fn transfer_owner(
        &self,
        id: &ObjectId,
        expected_owner: Option<&AccountId>,
        recipient: &AccountId,
    ) -> Result<(), LedgerError>;

    /// Atomically destroy a live object owned by `caller`.
    ///
    /// The identity is retired permanently: it never resolves again
    /// and is never handed out by `allocate_identity`.
    fn retire(&self, id: &ObjectId, caller: &AccountId) -> Result<(), LedgerError>;

    /// All live objects currently owned by an account, in identity
    /// order. Inspection surface, not part of authorization.
    fn objects_owned_by(&self, owner: &AccountId) -> Result<Vec<LedgerObject>, LedgerError>;
}
