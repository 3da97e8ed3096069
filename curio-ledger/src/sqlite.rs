//! SQLite implementation of the ownership ledger.
//!
//! Uses rusqlite with bundled SQLite behind a mutex; every ledger
//! operation runs as one SQL transaction, so effects on an ownership
//! record are serialized and atomic.

use crate::traits::{GenesisWitness, OwnershipLedger};
use curio_core::error::LedgerError;
use curio_core::id::{AccountId, CollectionId, ObjectId};
use curio_core::objects::{LedgerObject, ObjectPayload};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS collections (
    id BLOB PRIMARY KEY
);
CREATE TABLE IF NOT EXISTS objects (
    id BLOB PRIMARY KEY,
    collection BLOB NOT NULL,
    owner BLOB NOT NULL,
    payload BLOB NOT NULL
);
CREATE TABLE IF NOT EXISTS retired (
    id BLOB PRIMARY KEY
);
CREATE TABLE IF NOT EXISTS allocations (
    collection BLOB PRIMARY KEY,
    nonce INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_objects_owner ON objects(owner);
";

/// SQLite-backed ownership ledger
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Open (or create) a ledger database at the given path
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory ledger database, useful for testing
    pub fn open_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&Connection) -> Result<T, LedgerError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LedgerError::Database(format!("connection lock poisoned: {}", e)))?;
        f(&conn)
    }

    fn with_conn_mut<F, T>(&self, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Connection) -> Result<T, LedgerError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| LedgerError::Database(format!("connection lock poisoned: {}", e)))?;
        f(&mut conn)
    }
}

fn blob32(bytes: Vec<u8>, column: &str) -> Result<[u8; 32], LedgerError> {
    bytes
        .try_into()
        .map_err(|_| LedgerError::Serialization(format!("column {} is not 32 bytes", column)))
}

impl OwnershipLedger for SqliteLedger {
    fn claim_collection(&self, collection: &CollectionId) -> Result<GenesisWitness, LedgerError> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO collections (id) VALUES (?1)",
                params![collection.bytes().to_vec()],
            )?;
            if inserted == 0 {
                return Err(LedgerError::AlreadyInitialized(collection.to_string()));
            }
            log::info!("collection {} claimed for initialization", collection);
            Ok(GenesisWitness::issue(*collection))
        })
    }

    fn allocate_identity(&self, collection: &CollectionId) -> Result<ObjectId, LedgerError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut nonce: i64 = tx
                .query_row(
                    "SELECT nonce FROM allocations WHERE collection = ?1",
                    params![collection.bytes().to_vec()],
                    |row| row.get(0),
                )
                .optional()?
                .unwrap_or(0);

            let id = loop {
                let seed = (nonce as u64).to_le_bytes();
                let (candidate, _) = ObjectId::try_derive(&[collection.bytes(), &seed])
                    .ok_or_else(|| {
                        LedgerError::Identity(format!(
                            "no off-curve identity for {} at nonce {}",
                            collection, nonce
                        ))
                    })?;
                nonce += 1;

                let seen: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM objects WHERE id = ?1)
                     OR EXISTS(SELECT 1 FROM retired WHERE id = ?1)",
                    params![candidate.bytes().to_vec()],
                    |row| row.get(0),
                )?;
                if !seen {
                    break candidate;
                }
            };

            tx.execute(
                "INSERT INTO allocations (collection, nonce) VALUES (?1, ?2)
                 ON CONFLICT(collection) DO UPDATE SET nonce = excluded.nonce",
                params![collection.bytes().to_vec(), nonce],
            )?;
            tx.commit()?;
            Ok(id)
        })
    }

    fn insert(&self, object: LedgerObject) -> Result<(), LedgerError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let retired: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM retired WHERE id = ?1)",
                params![object.id.bytes().to_vec()],
                |row| row.get(0),
            )?;
            if retired {
                return Err(LedgerError::Other(format!(
                    "identity {} has been retired",
                    object.id
                )));
            }

            let payload = bincode::serialize(&object.payload)?;
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO objects (id, collection, owner, payload)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    object.id.bytes().to_vec(),
                    object.collection.bytes().to_vec(),
                    object.owner.bytes().to_vec(),
                    payload
                ],
            )?;
            if inserted == 0 {
                return Err(LedgerError::Other(format!(
                    "identity {} already in use",
                    object.id
                )));
            }
            tx.commit()?;
            Ok(())
        })
    }

    fn get(&self, id: &ObjectId) -> Result<LedgerObject, LedgerError> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, collection, owner, payload FROM objects WHERE id = ?1",
                    params![id.bytes().to_vec()],
                    |row| {
                        Ok((
                            row.get::<_, Vec<u8>>("id")?,
                            row.get::<_, Vec<u8>>("collection")?,
                            row.get::<_, Vec<u8>>("owner")?,
                            row.get::<_, Vec<u8>>("payload")?,
                        ))
                    },
                )
                .optional()?;

            let (id_bytes, collection, owner, payload_bytes) =
                row.ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
            let payload: ObjectPayload = bincode::deserialize(&payload_bytes)?;
            Ok(LedgerObject {
                id: ObjectId::from_bytes(blob32(id_bytes, "id")?),
                collection: CollectionId::from_bytes(blob32(collection, "collection")?),
                owner: AccountId::from_bytes(blob32(owner, "owner")?),
                payload,
            })
        })
    }

    fn owner_of(&self, id: &ObjectId) -> Result<AccountId, LedgerError> {
        self.with_conn(|conn| {
            let owner: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT owner FROM objects WHERE id = ?1",
                    params![id.bytes().to_vec()],
                    |row| row.get(0),
                )
                .optional()?;
            let owner = owner.ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
            Ok(AccountId::from_bytes(blob32(owner, "owner")?))
        })
    }

    fn transfer_owner(
        &self,
        id: &ObjectId,
        expected_owner: Option<&AccountId>,
        recipient: &AccountId,
    ) -> Result<(), LedgerError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let current: Option<Vec<u8>> = tx
                .query_row(
                    "SELECT owner FROM objects WHERE id = ?1",
                    params![id.bytes().to_vec()],
                    |row| row.get(0),
                )
                .optional()?;
            let current = current.ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
            let current = AccountId::from_bytes(blob32(current, "owner")?);

            if let Some(expected) = expected_owner {
                if &current != expected {
                    return Err(LedgerError::NotOwned(id.to_string()));
                }
            }

            tx.execute(
                "UPDATE objects SET owner = ?2 WHERE id = ?1",
                params![id.bytes().to_vec(), recipient.bytes().to_vec()],
            )?;
            tx.commit()?;
            log::debug!("object {} owner {} -> {}", id, current, recipient);
            Ok(())
        })
    }

    fn retire(&self, id: &ObjectId, caller: &AccountId) -> Result<(), LedgerError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let owner: Option<Vec<u8>> = tx
                .query_row(
                    "SELECT owner FROM objects WHERE id = ?1",
                    params![id.bytes().to_vec()],
                    |row| row.get(0),
                )
                .optional()?;
            let owner = owner.ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
            let owner = AccountId::from_bytes(blob32(owner, "owner")?);
            if &owner != caller {
                return Err(LedgerError::NotOwned(id.to_string()));
            }

            tx.execute(
                "DELETE FROM objects WHERE id = ?1",
                params![id.bytes().to_vec()],
            )?;
            tx.execute(
                "INSERT INTO retired (id) VALUES (?1)",
                params![id.bytes().to_vec()],
            )?;
            tx.commit()?;
            log::debug!("object {} retired by {}", id, caller);
            Ok(())
        })
    }

    fn objects_owned_by(&self, owner: &AccountId) -> Result<Vec<LedgerObject>, LedgerError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, collection, owner, payload FROM objects
                 WHERE owner = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![owner.bytes().to_vec()], |row| {
                Ok((
                    row.get::<_, Vec<u8>>("id")?,
                    row.get::<_, Vec<u8>>("collection")?,
                    row.get::<_, Vec<u8>>("owner")?,
                    row.get::<_, Vec<u8>>("payload")?,
                ))
            })?;

            let mut objects = Vec::new();
            for row in rows {
                let (id_bytes, collection, owner_bytes, payload_bytes) = row?;
                let payload: ObjectPayload = bincode::deserialize(&payload_bytes)?;
                objects.push(LedgerObject {
                    id: ObjectId::from_bytes(blob32(id_bytes, "id")?),
                    collection: CollectionId::from_bytes(blob32(collection, "collection")?),
                    owner: AccountId::from_bytes(blob32(owner_bytes, "owner")?),
                    payload,
                });
            }
            Ok(objects)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curio_core::objects::Attributes;
    use tempfile::tempdir;

    fn collection() -> CollectionId {
        CollectionId::try_derive("sqlite-ledger-test").expect("derivation")
    }

    fn mint_one(ledger: &SqliteLedger, coll: &CollectionId, owner: AccountId) -> ObjectId {
        let id = ledger.allocate_identity(coll).expect("allocate");
        ledger
            .insert(LedgerObject::new_collectible(
                id,
                *coll,
                owner,
                Attributes::standard("n", "d", "i", "p"),
            ))
            .expect("insert");
        id
    }

    #[test]
    fn test_claim_collection_is_one_time() {
        let ledger = SqliteLedger::open_memory().expect("open");
        let coll = collection();
        ledger.claim_collection(&coll).expect("first claim");
        let err = ledger.claim_collection(&coll).unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyInitialized(_)));
    }

    #[test]
    fn test_mint_transfer_retire_round_trip() {
        let ledger = SqliteLedger::open_memory().expect("open");
        let coll = collection();
        let a = AccountId::new([1; 32]);
        let b = AccountId::new([2; 32]);
        let id = mint_one(&ledger, &coll, a);

        let object = ledger.get(&id).expect("get");
        assert_eq!(object.owner, a);
        assert_eq!(object.collection, coll);
        assert_eq!(object.attributes().expect("attributes").get("name"), Some("n"));

        ledger.transfer_owner(&id, Some(&a), &b).expect("transfer");
        assert_eq!(ledger.owner_of(&id).expect("owner_of"), b);

        // Stale owner cannot move it again
        assert!(matches!(
            ledger.transfer_owner(&id, Some(&a), &b),
            Err(LedgerError::NotOwned(_))
        ));

        ledger.retire(&id, &b).expect("retire");
        assert!(matches!(ledger.get(&id), Err(LedgerError::NotFound(_))));
        assert!(matches!(
            ledger.retire(&id, &b),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn test_allocation_is_distinct_across_retirements() {
        let ledger = SqliteLedger::open_memory().expect("open");
        let coll = collection();
        let owner = AccountId::new([1; 32]);

        let first = mint_one(&ledger, &coll, owner);
        ledger.retire(&first, &owner).expect("retire");

        let mut seen = std::collections::HashSet::new();
        seen.insert(first);
        for _ in 0..10 {
            let id = ledger.allocate_identity(&coll).expect("allocate");
            assert!(seen.insert(id), "identity reused");
        }
    }

    #[test]
    fn test_objects_owned_by() {
        let ledger = SqliteLedger::open_memory().expect("open");
        let coll = collection();
        let a = AccountId::new([1; 32]);
        let b = AccountId::new([2; 32]);
        mint_one(&ledger, &coll, a);
        mint_one(&ledger, &coll, a);

        assert_eq!(ledger.objects_owned_by(&a).expect("owned").len(), 2);
        assert!(ledger.objects_owned_by(&b).expect("owned").is_empty());
    }

    #[test]
    fn test_ledger_persists_across_reopen() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("ledger.db");
        let coll = collection();
        let owner = AccountId::new([1; 32]);

        let id = {
            let ledger = SqliteLedger::open(&path).expect("open");
            ledger.claim_collection(&coll).expect("claim");
            mint_one(&ledger, &coll, owner)
        };

        let ledger = SqliteLedger::open(&path).expect("reopen");
        assert_eq!(ledger.owner_of(&id).expect("owner_of"), owner);
        // The claim is durable too
        assert!(matches!(
            ledger.claim_collection(&coll),
            Err(LedgerError::AlreadyInitialized(_))
        ));
    }
}
