pub mod authority;
pub mod capability;
pub mod lifecycle;

// Re-export the main types for convenience
pub use authority::{
    grant_admin_capability, grant_transfer_capability, initialize, Collection, CollectionConfig,
    Initialized,
};
pub use capability::{AdminCapability, MintAuthority, PublisherProof, TransferCapability};
pub use lifecycle::{Lifecycle, TransferAuth};
