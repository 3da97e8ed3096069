use curio_core::error::LedgerError;
use curio_core::id::{AccountId, ObjectId};
use curio_core::objects::LedgerObject;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// One committed ledger effect, as recorded in the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// An object was created with its sole owner
    Created {
        object: LedgerObject,
        timestamp: u64,
    },
    /// Sole ownership moved from one account to another
    Transferred {
        id: ObjectId,
        from: AccountId,
        to: AccountId,
        timestamp: u64,
    },
    /// The identity was permanently retired
    Retired {
        id: ObjectId,
        owner: AccountId,
        timestamp: u64,
    },
}

impl LedgerEvent {
    pub fn created(object: LedgerObject) -> Self {
        LedgerEvent::Created {
            object,
            timestamp: current_timestamp(),
        }
    }

    pub fn transferred(id: ObjectId, from: AccountId, to: AccountId) -> Self {
        LedgerEvent::Transferred {
            id,
            from,
            to,
            timestamp: current_timestamp(),
        }
    }

    pub fn retired(id: ObjectId, owner: AccountId) -> Self {
        LedgerEvent::Retired {
            id,
            owner,
            timestamp: current_timestamp(),
        }
    }
}

/// Get the current timestamp in milliseconds
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Append-only file journal of ledger events.
///
/// Each entry is written as a little-endian u64 length prefix followed
/// by the bincode-serialized event, flushed per append.
pub struct FileJournal {
    path: PathBuf,
    file: Mutex<BufWriter<File>>,
}

impl std::fmt::Debug for FileJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileJournal")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FileJournal {
    /// Create or open the journal file at the given path
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LedgerError::Journal(format!("failed to open journal file: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Record one event, durably, before the in-memory effect is
    /// considered committed
    pub fn append(&self, event: &LedgerEvent) -> Result<(), LedgerError> {
        let mut file = self
            .file
            .lock()
            .map_err(|e| LedgerError::Journal(format!("failed to acquire lock: {}", e)))?;

        let serialized = bincode::serialize(event)?;
        let entry_len = serialized.len() as u64;
        file.write_all(&entry_len.to_le_bytes())?;
        file.write_all(&serialized)?;
        file.flush()?;

        Ok(())
    }

    /// Iterate all recorded events in append order
    pub fn iterate_entries(
        &self,
    ) -> Box<dyn Iterator<Item = Result<LedgerEvent, LedgerError>> + '_> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                return Box::new(std::iter::once(Err(LedgerError::Journal(format!(
                    "failed to open journal file for reading: {}",
                    e
                )))))
            }
        };

        Box::new(JournalIterator { file })
    }
}

/// Iterator that reads length-prefixed event frames from the journal
struct JournalIterator {
    file: File,
}

impl Iterator for JournalIterator {
    type Item = Result<LedgerEvent, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut len_bytes = [0u8; 8];
        match self.file.read_exact(&mut len_bytes) {
            Ok(()) => {}
            // Clean end of journal
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return None,
            Err(e) => return Some(Err(LedgerError::Io(e))),
        }

        let entry_len = u64::from_le_bytes(len_bytes) as usize;
        let mut buf = vec![0u8; entry_len];
        if let Err(e) = self.file.read_exact(&mut buf) {
            return Some(Err(LedgerError::Journal(format!(
                "truncated journal entry: {}",
                e
            ))));
        }

        Some(bincode::deserialize(&buf).map_err(LedgerError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curio_core::id::CollectionId;
    use curio_core::objects::Attributes;
    use tempfile::tempdir;

    fn sample_object() -> LedgerObject {
        let (id, _) = ObjectId::try_derive(&[b"journal_test"]).expect("derivation");
        let coll = CollectionId::try_derive("journal-test").expect("derivation");
        LedgerObject::new_collectible(
            id,
            coll,
            AccountId::new([1; 32]),
            Attributes::standard("n", "d", "i", "p"),
        )
    }

    #[test]
    fn test_journal_round_trip_in_append_order() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("ledger.journal");
        let journal = FileJournal::open(&path).expect("open journal");

        let object = sample_object();
        let id = object.id;
        let a = AccountId::new([1; 32]);
        let b = AccountId::new([2; 32]);

        let events = vec![
            LedgerEvent::created(object),
            LedgerEvent::transferred(id, a, b),
            LedgerEvent::retired(id, b),
        ];
        for event in &events {
            journal.append(event).expect("append");
        }

        let replayed: Vec<_> = journal
            .iterate_entries()
            .collect::<Result<_, _>>()
            .expect("replay");
        assert_eq!(replayed, events);
    }

    #[test]
    fn test_journal_survives_reopen() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("ledger.journal");

        let object = sample_object();
        {
            let journal = FileJournal::open(&path).expect("open journal");
            journal
                .append(&LedgerEvent::created(object.clone()))
                .expect("append");
        }

        let journal = FileJournal::open(&path).expect("reopen journal");
        let replayed: Vec<_> = journal
            .iterate_entries()
            .collect::<Result<_, _>>()
            .expect("replay");
        assert_eq!(replayed.len(), 1);
        assert!(matches!(&replayed[0], LedgerEvent::Created { object: o, .. } if *o == object));
    }

    #[test]
    fn test_empty_journal_yields_no_entries() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("ledger.journal");
        let journal = FileJournal::open(&path).expect("open journal");
        assert_eq!(journal.iterate_entries().count(), 0);
    }
}
