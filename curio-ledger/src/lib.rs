pub mod journal;
pub mod memory;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the main types for convenience
pub use journal::{FileJournal, LedgerEvent};
pub use memory::InMemoryLedger;
pub use traits::{GenesisWitness, OwnershipLedger};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteLedger;
