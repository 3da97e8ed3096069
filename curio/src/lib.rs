//! Curio: capability-gated collectible object lifecycle.
//!
//! This crate re-exports all the components of the Curio system:
//! core types, the ownership ledger implementations, and the
//! collection authority / lifecycle manager.
//!
//! ```
//! use curio::{
//!     initialize, AccountId, Attributes, CollectionConfig, Lifecycle, OwnershipLedger,
//!     InMemoryLedger, TransferAuth,
//! };
//!
//! let ledger = InMemoryLedger::new();
//! let deployer = AccountId::new([1; 32]);
//!
//! let config = CollectionConfig::new("example-collection");
//! let witness = ledger
//!     .claim_collection(&config.collection_id().unwrap())
//!     .unwrap();
//! let init = initialize(&ledger, witness, config, &deployer).unwrap();
//!
//! let lifecycle = Lifecycle::new(&ledger, &init.collection);
//! let minted = lifecycle
//!     .mint(
//!         &init.mint_authority,
//!         3,
//!         Attributes::standard("Example", "demo", "cid", "https://example.org"),
//!         &deployer,
//!     )
//!     .unwrap();
//! assert_eq!(minted.len(), 3);
//!
//! let collector = AccountId::new([2; 32]);
//! lifecycle
//!     .transfer(TransferAuth::Owner(deployer), &minted[0], &collector)
//!     .unwrap();
//! lifecycle.burn(&deployer, &minted[1]).unwrap();
//! ```

pub use curio_core::*;
pub use curio_ledger::*;
pub use curio_lifecycle::*;
