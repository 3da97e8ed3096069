use curio_core::id::{CollectionId, ObjectId};
use curio_core::policy::MintScheme;

// Capability tokens are linear values: no Clone, no Copy, and no
// constructor outside collection initialization. Possession of the
// value, not caller identity, is what confers the authority. A token
// is scoped to exactly one collection and every gated call checks the
// scope. There is no revocation path: a mis-delegated token grants the
// authority permanently.

/// Proof that the caller controls the collection's originating
/// package. Gates minting in publisher-gated collections. Unlike the
/// capability objects below, a publisher proof has no ledger identity
/// of its own.
#[derive(Debug)]
pub struct PublisherProof {
    collection: CollectionId,
}

impl PublisherProof {
    pub(crate) fn new(collection: CollectionId) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }
}

/// Transferable admin token minted exactly once at initialization.
/// Gates minting in capability-gated collections.
#[derive(Debug)]
pub struct AdminCapability {
    id: ObjectId,
    collection: CollectionId,
}

impl AdminCapability {
    pub(crate) fn new(id: ObjectId, collection: CollectionId) -> Self {
        Self { id, collection }
    }

    /// Ledger identity of the backing capability object
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }
}

/// Narrow token gating only the transfer operation. The holder may
/// move any instance of the collection regardless of who currently
/// owns it (the admin-override design), independent of minting rights.
#[derive(Debug)]
pub struct TransferCapability {
    id: ObjectId,
    collection: CollectionId,
}

impl TransferCapability {
    pub(crate) fn new(id: ObjectId, collection: CollectionId) -> Self {
        Self { id, collection }
    }

    /// Ledger identity of the backing capability object
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }
}

/// The polymorphic mint authority: the two observed authorization
/// schemes (publisher-gated and capability-gated) are two concrete
/// forms of the same authority-distribution idea.
#[derive(Debug)]
pub enum MintAuthority {
    Publisher(PublisherProof),
    Admin(AdminCapability),
}

impl MintAuthority {
    /// The collection this authority is scoped to
    pub fn collection(&self) -> &CollectionId {
        match self {
            MintAuthority::Publisher(proof) => proof.collection(),
            MintAuthority::Admin(cap) => cap.collection(),
        }
    }

    /// The mint scheme this authority satisfies
    pub fn scheme(&self) -> MintScheme {
        match self {
            MintAuthority::Publisher(_) => MintScheme::Publisher,
            MintAuthority::Admin(_) => MintScheme::AdminCap,
        }
    }
}
