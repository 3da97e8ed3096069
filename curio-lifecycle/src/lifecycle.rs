use crate::authority::Collection;
use crate::capability::{MintAuthority, TransferCapability};
use curio_core::error::{LedgerError, LifecycleError};
use curio_core::id::{AccountId, ObjectId};
use curio_core::objects::{Attributes, LedgerObject};
use curio_core::policy::TransferPolicy;
use curio_ledger::traits::OwnershipLedger;

/// Authorization presented to the transfer entry point.
///
/// Which arm a collection accepts is fixed by its transfer policy:
/// ownership-gated collections take the owner arm and the ledger
/// enforces current ownership; capability-gated collections take the
/// capability arm and the holder may move any instance.
#[derive(Debug)]
pub enum TransferAuth<'a> {
    Owner(AccountId),
    Capability(&'a TransferCapability),
}

/// The object lifecycle manager for one collection: mint, transfer and
/// burn, each one synchronous atomic step against the ledger. No call
/// is retried internally.
#[derive(Debug)]
pub struct Lifecycle<'a, L: OwnershipLedger> {
    ledger: &'a L,
    collection: &'a Collection,
}

impl<'a, L: OwnershipLedger> Lifecycle<'a, L> {
    pub fn new(ledger: &'a L, collection: &'a Collection) -> Self {
        Self { ledger, collection }
    }

    pub fn collection(&self) -> &Collection {
        self.collection
    }

    /// Mint `count` objects with identical attribute values to
    /// `recipient`, returning the fresh identities in mint order.
    ///
    /// The authority gate and argument validation run before anything
    /// is created: a rejected call mints zero objects. Each created
    /// object holds an independent copy of the attribute values; only
    /// the identity differs across the batch. Per-object creation is
    /// atomic, the batch as a whole is not: objects minted before a
    /// mid-batch ledger failure remain minted.
    pub fn mint(
        &self,
        authority: &MintAuthority,
        count: u32,
        attributes: Attributes,
        recipient: &AccountId,
    ) -> Result<Vec<ObjectId>, LifecycleError> {
        if authority.collection() != &self.collection.id {
            return Err(LifecycleError::Unauthorized(format!(
                "mint authority is scoped to {}, not {}",
                authority.collection(),
                self.collection.id
            )));
        }
        if authority.scheme() != self.collection.mint_scheme {
            return Err(LifecycleError::Unauthorized(format!(
                "collection {} does not accept {:?} mint authority",
                self.collection.id,
                authority.scheme()
            )));
        }
        if count == 0 {
            return Err(LifecycleError::InvalidArgument(
                "mint count must be at least 1".to_string(),
            ));
        }
        self.collection.schema.validate(&attributes)?;

        let mut minted = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let id = self.ledger.allocate_identity(&self.collection.id)?;
            self.ledger.insert(LedgerObject::new_collectible(
                id,
                self.collection.id,
                *recipient,
                attributes.clone(),
            ))?;
            minted.push(id);
        }

        log::debug!(
            "minted {} object(s) in {} to {}",
            minted.len(),
            self.collection.id,
            recipient
        );
        Ok(minted)
    }

    /// Atomically reassign sole ownership of a live collectible.
    ///
    /// Attributes are untouched; only the owner changes. Capability
    /// objects do not move through this entry point, they move through
    /// the grant calls in [`crate::authority`].
    pub fn transfer(
        &self,
        auth: TransferAuth<'_>,
        object: &ObjectId,
        recipient: &AccountId,
    ) -> Result<(), LifecycleError> {
        let record = self.ledger.get(object)?;
        self.check_collectible(&record)?;

        match (self.collection.transfer_policy, auth) {
            (TransferPolicy::OwnerOnly, TransferAuth::Owner(caller)) => {
                self.ledger
                    .transfer_owner(object, Some(&caller), recipient)?;
            }
            (TransferPolicy::CapabilityGated, TransferAuth::Capability(capability)) => {
                if capability.collection() != &self.collection.id {
                    return Err(LifecycleError::Unauthorized(format!(
                        "transfer capability is scoped to {}, not {}",
                        capability.collection(),
                        self.collection.id
                    )));
                }
                // Holder of the token may move any instance; the
                // ownership check is deliberately skipped.
                self.ledger.transfer_owner(object, None, recipient)?;
            }
            (policy, auth) => {
                return Err(LifecycleError::Unauthorized(format!(
                    "{:?} authorization does not satisfy {:?} policy",
                    auth, policy
                )));
            }
        }
        Ok(())
    }

    /// Permanently destroy a live collectible.
    ///
    /// Burning is an unrestricted owner right: no capability check,
    /// only ledger-enforced ownership. Irreversible; afterwards the
    /// identity never resolves again.
    pub fn burn(&self, caller: &AccountId, object: &ObjectId) -> Result<(), LifecycleError> {
        let record = self.ledger.get(object)?;
        self.check_collectible(&record)?;
        self.ledger.retire(object, caller)?;
        Ok(())
    }

    /// All attribute values of a live object. Inspection surface, not
    /// part of the authorization model.
    pub fn attributes(&self, object: &ObjectId) -> Result<Attributes, LifecycleError> {
        let record = self.ledger.get(object)?;
        self.check_collectible(&record)?;
        match record.attributes() {
            Some(attributes) => Ok(attributes.clone()),
            // check_collectible admits only collectible payloads, so a
            // missing attribute set is ledger corruption, not a caller
            // mistake. Fail loudly instead of inventing empty values.
            None => Err(LifecycleError::Ledger(LedgerError::Other(format!(
                "collectible {} has no attribute payload",
                record.id
            )))),
        }
    }

    /// One attribute value of a live object
    pub fn attribute(&self, object: &ObjectId, key: &str) -> Result<Option<String>, LifecycleError> {
        Ok(self.attributes(object)?.get(key).map(str::to_string))
    }

    /// Current owner of a live object
    pub fn owner_of(&self, object: &ObjectId) -> Result<AccountId, LifecycleError> {
        Ok(self.ledger.owner_of(object)?)
    }

    /// Live collectibles of this collection owned by `account`
    pub fn holdings(&self, account: &AccountId) -> Result<Vec<ObjectId>, LifecycleError> {
        Ok(self
            .ledger
            .objects_owned_by(account)?
            .into_iter()
            .filter(|o| o.is_collectible() && o.collection == self.collection.id)
            .map(|o| o.id)
            .collect())
    }

    fn check_collectible(&self, record: &LedgerObject) -> Result<(), LifecycleError> {
        if record.collection != self.collection.id {
            return Err(LifecycleError::InvalidArgument(format!(
                "object {} belongs to collection {}, not {}",
                record.id, record.collection, self.collection.id
            )));
        }
        if !record.is_collectible() {
            return Err(LifecycleError::InvalidArgument(format!(
                "object {} is a capability token, not a collectible",
                record.id
            )));
        }
        Ok(())
    }
}
