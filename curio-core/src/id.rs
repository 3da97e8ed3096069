use curve25519_dalek::edwards::CompressedEdwardsY;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::ops::Deref;

// All ledger identities are 32-byte values resembling public keys.
// Identities assigned to objects and collections are derived off-curve
// so they can never collide with a spendable account key.

/// Hash the seeds with a domain separator and a bump byte.
fn derive_raw(domain: &[u8], seeds: &[&[u8]], bump: u8) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.finalize().into()
}

/// Verify that a 32-byte array is not a valid point on the ed25519 curve.
///
/// Returns true if the bytes do not represent a valid curve point.
pub fn is_off_curve(bytes: &[u8; 32]) -> bool {
    let Ok(compressed) = CompressedEdwardsY::from_slice(bytes.as_ref()) else {
        return true;
    };
    compressed.decompress().is_none()
}

/// Search for an off-curve derivation of the given seeds, trying bump
/// values until one lands off-curve. Returns the raw bytes and the bump
/// that produced them, or None if every bump yields a curve point.
fn try_find_off_curve(domain: &[u8], seeds: &[&[u8]]) -> Option<([u8; 32], u8)> {
    for bump in 0..=255u8 {
        let raw = derive_raw(domain, seeds, bump);
        if is_off_curve(&raw) {
            return Some((raw, bump));
        }
    }
    None
}

/// ObjectId uniquely identifies one issued collectible or capability
/// object. It is assigned by the ledger at creation, is immutable, and
/// is never reused even after the object is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId([u8; 32]);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "curio:{}", hex::encode(&self.0[0..6]))
    }
}

impl Ord for ObjectId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for ObjectId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId([0; 32])
    }
}

impl Deref for ObjectId {
    type Target = [u8; 32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ObjectId {
    const DOMAIN: &'static [u8] = b"CURIO:object";

    /// Create an ObjectId from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        ObjectId(bytes)
    }

    /// Get a reference to the internal bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Derive an ObjectId from seeds, searching for an off-curve bump.
    ///
    /// The derivation is deterministic: the same seeds always produce
    /// the same identity. Returns None in the astronomically unlikely
    /// case that no bump value lands off-curve.
    pub fn try_derive(seeds: &[&[u8]]) -> Option<(ObjectId, u8)> {
        try_find_off_curve(Self::DOMAIN, seeds).map(|(raw, bump)| (ObjectId(raw), bump))
    }
}

/// CollectionId identifies a collection: a named family of collectible
/// objects sharing one attribute schema and one authority setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionId([u8; 32]);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "coll:{}", hex::encode(&self.0[0..6]))
    }
}

impl CollectionId {
    const DOMAIN: &'static [u8] = b"CURIO:collection";

    /// Create a CollectionId from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        CollectionId(bytes)
    }

    /// Get a reference to the internal bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Derive a CollectionId from the collection name.
    pub fn try_derive(name: &str) -> Option<CollectionId> {
        try_find_off_curve(Self::DOMAIN, &[name.as_bytes()]).map(|(raw, _)| CollectionId(raw))
    }
}

/// AccountId identifies the principal that owns objects and capability
/// tokens. Kept as a distinct newtype so owners and objects cannot be
/// confused at the type level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId([u8; 32]);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", hex::encode(&self.0[0..6]))
    }
}

impl AccountId {
    pub fn new(bytes: [u8; 32]) -> Self {
        AccountId(bytes)
    }

    /// Create an AccountId from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        AccountId(bytes)
    }

    /// Get a reference to the internal bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}
