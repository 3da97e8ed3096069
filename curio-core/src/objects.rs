use crate::error::LifecycleError;
use crate::id::{AccountId, CollectionId, ObjectId};
use crate::template::STANDARD_KEYS;
use serde::{Deserialize, Serialize};

/// An insertion-ordered mapping of named string fields, set once at
/// mint time. No in-place edit operation exists: once an object is
/// minted its attributes are immutable for the object's whole life.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor covering the standard field set.
    pub fn standard(
        name: impl Into<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
        project_url: impl Into<String>,
    ) -> Self {
        Self {
            entries: vec![
                ("name".to_string(), name.into()),
                ("description".to_string(), description.into()),
                ("image_url".to_string(), image_url.into()),
                ("project_url".to_string(), project_url.into()),
            ],
        }
    }

    /// Add a field. Each key may be set exactly once.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), LifecycleError> {
        let key = key.into();
        if self.get(&key).is_some() {
            return Err(LifecycleError::InvalidArgument(format!(
                "duplicate attribute key: {}",
                key
            )));
        }
        self.entries.push((key, value.into()));
        Ok(())
    }

    /// Look up a field value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The fixed attribute key set of one collection: the standard keys
/// plus any collection-specific extras (e.g. a redemption link).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSchema {
    extra_keys: Vec<String>,
}

impl AttributeSchema {
    pub fn new(extra_keys: Vec<String>) -> Self {
        Self { extra_keys }
    }

    /// All required keys, standard set first, in schema order.
    pub fn required_keys(&self) -> impl Iterator<Item = &str> {
        STANDARD_KEYS
            .iter()
            .copied()
            .chain(self.extra_keys.iter().map(|k| k.as_str()))
    }

    pub fn extra_keys(&self) -> &[String] {
        &self.extra_keys
    }

    /// Check a submitted attribute set against the schema: every
    /// required key must be present and no unknown key is accepted.
    pub fn validate(&self, attributes: &Attributes) -> Result<(), LifecycleError> {
        for key in self.required_keys() {
            if attributes.get(key).is_none() {
                return Err(LifecycleError::InvalidArgument(format!(
                    "missing required attribute: {}",
                    key
                )));
            }
        }
        for key in attributes.keys() {
            if !self.required_keys().any(|k| k == key) {
                return Err(LifecycleError::InvalidArgument(format!(
                    "attribute key not in collection schema: {}",
                    key
                )));
            }
        }
        Ok(())
    }
}

/// The role a capability object plays within its collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityRole {
    /// Gates minting in capability-gated collections
    Admin,
    /// Gates only the transfer operation
    Transfer,
}

/// Enum to represent different object kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// An issued collectible instance
    Collectible,
    /// A capability token backing an authority grant
    Capability,
}

/// Kind-specific payload carried by a ledger object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectPayload {
    /// Collectible payload: the immutable attribute values
    Collectible { attributes: Attributes },
    /// Capability payload: which operation the token gates
    Capability { role: CapabilityRole },
}

/// Unified record the ownership ledger stores for every live object.
///
/// A LedgerObject is either a collectible instance or a capability
/// token. Both follow the same one-owner-at-a-time discipline; only
/// the payload differs. An object is live while its record resolves
/// and destroyed once the identity has been retired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerObject {
    /// Unique identifier for this object
    pub id: ObjectId,

    /// The collection this object belongs to
    pub collection: CollectionId,

    /// The account that currently owns this object
    pub owner: AccountId,

    /// Kind-specific payload
    pub payload: ObjectPayload,
}

impl LedgerObject {
    /// Create a new collectible record. The attribute values are moved
    /// in, so every minted object holds an independent copy.
    pub fn new_collectible(
        id: ObjectId,
        collection: CollectionId,
        owner: AccountId,
        attributes: Attributes,
    ) -> Self {
        Self {
            id,
            collection,
            owner,
            payload: ObjectPayload::Collectible { attributes },
        }
    }

    /// Create a new capability record
    pub fn new_capability(
        id: ObjectId,
        collection: CollectionId,
        owner: AccountId,
        role: CapabilityRole,
    ) -> Self {
        Self {
            id,
            collection,
            owner,
            payload: ObjectPayload::Capability { role },
        }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn kind(&self) -> ObjectKind {
        match self.payload {
            ObjectPayload::Collectible { .. } => ObjectKind::Collectible,
            ObjectPayload::Capability { .. } => ObjectKind::Capability,
        }
    }

    pub fn is_collectible(&self) -> bool {
        matches!(self.payload, ObjectPayload::Collectible { .. })
    }

    pub fn is_capability(&self) -> bool {
        matches!(self.payload, ObjectPayload::Capability { .. })
    }

    /// Get the attribute values if this is a collectible
    pub fn attributes(&self) -> Option<&Attributes> {
        match &self.payload {
            ObjectPayload::Collectible { attributes } => Some(attributes),
            _ => None,
        }
    }

    /// Get the capability role if this is a capability token
    pub fn role(&self) -> Option<CapabilityRole> {
        match &self.payload {
            ObjectPayload::Capability { role } => Some(*role),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (ObjectId, CollectionId, AccountId) {
        let (id, _) = ObjectId::try_derive(&[b"objects_test"]).expect("derivation");
        let coll = CollectionId::try_derive("objects-test").expect("derivation");
        (id, coll, AccountId::new([2; 32]))
    }

    #[test]
    fn test_attributes_insertion_order_and_lookup() {
        let mut attrs = Attributes::standard("X NFT", "d", "cid123", "https://x.example");
        attrs.set("redeem_url", "https://x.example/redeem").unwrap();

        let keys: Vec<_> = attrs.keys().collect();
        assert_eq!(
            keys,
            vec!["name", "description", "image_url", "project_url", "redeem_url"]
        );
        assert_eq!(attrs.get("name"), Some("X NFT"));
        assert_eq!(attrs.get("image_url"), Some("cid123"));
        assert_eq!(attrs.get("missing"), None);
        assert_eq!(attrs.len(), 5);
    }

    #[test]
    fn test_attributes_reject_duplicate_key() {
        let mut attrs = Attributes::new();
        attrs.set("name", "a").unwrap();
        let err = attrs.set("name", "b").unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidArgument(_)));
        // The first value stays in place
        assert_eq!(attrs.get("name"), Some("a"));
    }

    #[test]
    fn test_schema_accepts_complete_attribute_set() {
        let schema = AttributeSchema::new(vec!["redeem_url".to_string()]);
        let mut attrs = Attributes::standard("n", "d", "i", "p");
        attrs.set("redeem_url", "r").unwrap();
        assert!(schema.validate(&attrs).is_ok());
    }

    #[test]
    fn test_schema_rejects_missing_required_key() {
        let schema = AttributeSchema::new(vec![]);
        let mut attrs = Attributes::new();
        attrs.set("name", "n").unwrap();
        let err = schema.validate(&attrs).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidArgument(_)));
    }

    #[test]
    fn test_schema_rejects_unknown_key() {
        let schema = AttributeSchema::new(vec![]);
        let mut attrs = Attributes::standard("n", "d", "i", "p");
        attrs.set("surprise", "s").unwrap();
        let err = schema.validate(&attrs).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidArgument(_)));
    }

    #[test]
    fn test_collectible_record_accessors() {
        let (id, coll, owner) = ids();
        let attrs = Attributes::standard("n", "d", "i", "p");
        let obj = LedgerObject::new_collectible(id, coll, owner, attrs.clone());

        assert_eq!(obj.kind(), ObjectKind::Collectible);
        assert!(obj.is_collectible());
        assert!(!obj.is_capability());
        assert_eq!(obj.attributes(), Some(&attrs));
        assert_eq!(obj.role(), None);
        assert_eq!(obj.id(), &id);
        assert_eq!(obj.owner(), &owner);
    }

    #[test]
    fn test_capability_record_accessors() {
        let (id, coll, owner) = ids();
        let obj = LedgerObject::new_capability(id, coll, owner, CapabilityRole::Transfer);

        assert_eq!(obj.kind(), ObjectKind::Capability);
        assert!(obj.is_capability());
        assert_eq!(obj.role(), Some(CapabilityRole::Transfer));
        assert_eq!(obj.attributes(), None);
    }
}
