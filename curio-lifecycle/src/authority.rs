use crate::capability::{AdminCapability, MintAuthority, PublisherProof, TransferCapability};
use curio_core::error::{LedgerError, LifecycleError};
use curio_core::id::{AccountId, CollectionId};
use curio_core::objects::{AttributeSchema, CapabilityRole, LedgerObject};
use curio_core::policy::{MintScheme, TransferPolicy};
use curio_core::template::{DisplayTemplate, STANDARD_KEYS};
use curio_ledger::traits::{GenesisWitness, OwnershipLedger};
use serde::{Deserialize, Serialize};

/// Everything a collection fixes at initialization: its name, its
/// attribute key set, how minting and transfer are authorized, and
/// the rendering templates handed to the external renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    name: String,
    extra_keys: Vec<String>,
    mint_scheme: MintScheme,
    transfer_policy: TransferPolicy,
    templates: Vec<(String, String)>,
}

impl CollectionConfig {
    /// Start a config with the simplest policy pair: publisher-gated
    /// minting and plain ownership-gated transfer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra_keys: Vec::new(),
            mint_scheme: MintScheme::Publisher,
            transfer_policy: TransferPolicy::OwnerOnly,
            templates: Vec::new(),
        }
    }

    /// Add a collection-specific attribute key beyond the standard set
    pub fn with_extra_key(mut self, key: impl Into<String>) -> Self {
        self.extra_keys.push(key.into());
        self
    }

    pub fn with_mint_scheme(mut self, scheme: MintScheme) -> Self {
        self.mint_scheme = scheme;
        self
    }

    pub fn with_transfer_policy(mut self, policy: TransferPolicy) -> Self {
        self.transfer_policy = policy;
        self
    }

    /// Register a rendering template string for an attribute key,
    /// e.g. `ipfs://{image_url}` for `image_url`
    pub fn with_template(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.push((key.into(), template.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The collection identity this config initializes
    pub fn collection_id(&self) -> Result<CollectionId, LifecycleError> {
        CollectionId::try_derive(&self.name).ok_or_else(|| {
            LedgerError::Identity(format!("no off-curve identity for collection {}", self.name))
                .into()
        })
    }
}

/// Immutable descriptor of an initialized collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub schema: AttributeSchema,
    pub mint_scheme: MintScheme,
    pub transfer_policy: TransferPolicy,
}

/// Result of collection initialization: the descriptor, the authority
/// tokens, and the display template, all owned by the deployer.
#[derive(Debug)]
pub struct Initialized {
    pub collection: Collection,
    pub mint_authority: MintAuthority,
    pub transfer_capability: Option<TransferCapability>,
    pub template: DisplayTemplate,
}

/// One-time collection setup.
///
/// Consumes the genesis witness the ledger issued for this collection
/// identity, mints the capability objects the configured policies call
/// for (owned by the deployer), and builds the display template. The
/// only failure beyond ledger errors is a witness that does not match
/// the config; a second initialization never gets here because the
/// ledger refuses to issue a second witness.
pub fn initialize<L: OwnershipLedger>(
    ledger: &L,
    witness: GenesisWitness,
    config: CollectionConfig,
    deployer: &AccountId,
) -> Result<Initialized, LifecycleError> {
    let collection_id = config.collection_id()?;
    if witness.collection() != &collection_id {
        return Err(LifecycleError::InvalidArgument(format!(
            "genesis witness is for {}, config derives {}",
            witness.collection(),
            collection_id
        )));
    }

    let mint_authority = match config.mint_scheme {
        MintScheme::Publisher => MintAuthority::Publisher(PublisherProof::new(collection_id)),
        MintScheme::AdminCap => {
            let id = ledger.allocate_identity(&collection_id)?;
            ledger.insert(LedgerObject::new_capability(
                id,
                collection_id,
                *deployer,
                CapabilityRole::Admin,
            ))?;
            MintAuthority::Admin(AdminCapability::new(id, collection_id))
        }
    };

    let transfer_capability = match config.transfer_policy {
        TransferPolicy::OwnerOnly => None,
        TransferPolicy::CapabilityGated => {
            let id = ledger.allocate_identity(&collection_id)?;
            ledger.insert(LedgerObject::new_capability(
                id,
                collection_id,
                *deployer,
                CapabilityRole::Transfer,
            ))?;
            Some(TransferCapability::new(id, collection_id))
        }
    };

    // Register a template entry for every schema key; keys without an
    // explicit template render the raw attribute value.
    let entries = STANDARD_KEYS
        .iter()
        .copied()
        .chain(config.extra_keys.iter().map(|k| k.as_str()))
        .map(|key| {
            let template = config
                .templates
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, t)| t.clone())
                .unwrap_or_else(|| format!("{{{}}}", key));
            (key.to_string(), template)
        })
        .collect();
    let template = DisplayTemplate::new(collection_id, entries);

    log::info!(
        "collection {} ({}) initialized by {}",
        collection_id,
        config.name,
        deployer
    );

    Ok(Initialized {
        collection: Collection {
            id: collection_id,
            name: config.name,
            schema: AttributeSchema::new(config.extra_keys),
            mint_scheme: config.mint_scheme,
            transfer_policy: config.transfer_policy,
        },
        mint_authority,
        transfer_capability,
        template,
    })
}

/// Move the transfer token to another account.
///
/// Capability tokens are ordinary owned resources: the ledger record
/// changes hands (owner-gated, so only the current holder can grant)
/// and the linear value travels with the grant. After this call the
/// recipient holds the transfer authority; there is no way back except
/// a grant in the other direction.
pub fn grant_transfer_capability<L: OwnershipLedger>(
    ledger: &L,
    capability: TransferCapability,
    holder: &AccountId,
    recipient: &AccountId,
) -> Result<TransferCapability, LifecycleError> {
    ledger.transfer_owner(capability.id(), Some(holder), recipient)?;
    log::debug!(
        "transfer capability for {} granted {} -> {}",
        capability.collection(),
        holder,
        recipient
    );
    Ok(capability)
}

/// Move the admin token to another account. Same discipline as
/// [`grant_transfer_capability`]; granting the admin token hands over
/// the collection's minting rights permanently.
pub fn grant_admin_capability<L: OwnershipLedger>(
    ledger: &L,
    capability: AdminCapability,
    holder: &AccountId,
    recipient: &AccountId,
) -> Result<AdminCapability, LifecycleError> {
    ledger.transfer_owner(capability.id(), Some(holder), recipient)?;
    log::debug!(
        "admin capability for {} granted {} -> {}",
        capability.collection(),
        holder,
        recipient
    );
    Ok(capability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use curio_core::template::{KEY_IMAGE_URL, KEY_NAME};
    use curio_ledger::memory::InMemoryLedger;

    fn deployer() -> AccountId {
        AccountId::new([9; 32])
    }

    fn claim<L: OwnershipLedger>(ledger: &L, config: &CollectionConfig) -> GenesisWitness {
        let id = config.collection_id().expect("collection id");
        ledger.claim_collection(&id).expect("claim")
    }

    #[test]
    fn test_publisher_collection_initializes_without_capability_objects() {
        let ledger = InMemoryLedger::new();
        let config = CollectionConfig::new("pub-coll");
        let witness = claim(&ledger, &config);

        let init = initialize(&ledger, witness, config, &deployer()).expect("initialize");
        assert!(matches!(init.mint_authority, MintAuthority::Publisher(_)));
        assert!(init.transfer_capability.is_none());
        // No ledger objects were minted for a publisher-gated setup
        assert!(ledger.objects_owned_by(&deployer()).expect("owned").is_empty());
    }

    #[test]
    fn test_capability_collection_mints_tokens_to_deployer() {
        let ledger = InMemoryLedger::new();
        let config = CollectionConfig::new("cap-coll")
            .with_mint_scheme(MintScheme::AdminCap)
            .with_transfer_policy(TransferPolicy::CapabilityGated);
        let witness = claim(&ledger, &config);

        let init = initialize(&ledger, witness, config, &deployer()).expect("initialize");
        let admin = match &init.mint_authority {
            MintAuthority::Admin(cap) => cap,
            other => panic!("expected admin authority, got {:?}", other),
        };
        let transfer = init.transfer_capability.as_ref().expect("transfer token");

        let owned = ledger.objects_owned_by(&deployer()).expect("owned");
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|o| o.is_capability()));
        assert_eq!(ledger.owner_of(admin.id()).expect("owner"), deployer());
        assert_eq!(ledger.owner_of(transfer.id()).expect("owner"), deployer());
        assert_ne!(admin.id(), transfer.id());
    }

    #[test]
    fn test_second_initialization_fails_without_a_second_token_set() {
        let ledger = InMemoryLedger::new();
        let config = CollectionConfig::new("once-coll").with_mint_scheme(MintScheme::AdminCap);
        let witness = claim(&ledger, &config);
        initialize(&ledger, witness, config.clone(), &deployer()).expect("initialize");

        let before = ledger.objects_owned_by(&deployer()).expect("owned").len();

        // The ledger refuses to issue a second witness, so there is no
        // path to a second initialization.
        let id = config.collection_id().expect("collection id");
        let err = ledger.claim_collection(&id).unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyInitialized(_)));
        assert_eq!(
            ledger.objects_owned_by(&deployer()).expect("owned").len(),
            before
        );
    }

    #[test]
    fn test_witness_must_match_config() {
        let ledger = InMemoryLedger::new();
        let other = CollectionConfig::new("other-coll");
        let witness = claim(&ledger, &other);

        let config = CollectionConfig::new("this-coll");
        let err = initialize(&ledger, witness, config, &deployer()).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidArgument(_)));
    }

    #[test]
    fn test_template_covers_schema_keys_in_order() {
        let ledger = InMemoryLedger::new();
        let config = CollectionConfig::new("tpl-coll")
            .with_extra_key("redeem_url")
            .with_template(KEY_IMAGE_URL, "ipfs://{image_url}");
        let witness = claim(&ledger, &config);

        let init = initialize(&ledger, witness, config, &deployer()).expect("initialize");
        let keys: Vec<_> = init.template.keys().collect();
        assert_eq!(
            keys,
            vec!["name", "description", "image_url", "project_url", "redeem_url"]
        );
        assert_eq!(
            init.template.template_for(KEY_IMAGE_URL),
            Some("ipfs://{image_url}")
        );
        // Keys without an explicit template fall back to the raw value
        assert_eq!(init.template.template_for(KEY_NAME), Some("{name}"));
        assert_eq!(init.template.version(), 1);
    }

    #[test]
    fn test_grant_moves_capability_between_accounts() {
        let ledger = InMemoryLedger::new();
        let config = CollectionConfig::new("grant-coll")
            .with_mint_scheme(MintScheme::AdminCap)
            .with_transfer_policy(TransferPolicy::CapabilityGated);
        let witness = claim(&ledger, &config);
        let init = initialize(&ledger, witness, config, &deployer()).expect("initialize");

        let recipient = AccountId::new([5; 32]);
        let cap = init.transfer_capability.expect("transfer token");
        let cap = grant_transfer_capability(&ledger, cap, &deployer(), &recipient)
            .expect("grant");
        assert_eq!(ledger.owner_of(cap.id()).expect("owner"), recipient);

        // A stale holder cannot grant it onwards
        let err =
            grant_transfer_capability(&ledger, cap, &deployer(), &AccountId::new([6; 32]))
                .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Ledger(LedgerError::NotOwned(_))
        ));
    }
}
