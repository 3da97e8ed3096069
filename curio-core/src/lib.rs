pub mod error;
pub mod id;
pub mod objects;
pub mod policy;
pub mod template;

// Re-export the main types for convenience
pub use error::{LedgerError, LifecycleError};
pub use id::{AccountId, CollectionId, ObjectId};
pub use objects::{
    AttributeSchema, Attributes, CapabilityRole, LedgerObject, ObjectKind, ObjectPayload,
};
pub use policy::{MintScheme, TransferPolicy};
pub use template::DisplayTemplate;
