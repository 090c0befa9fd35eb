//! Sqlite persistence for settlements.
//!
//! The settlement document is stored as one JSON payload so that legacy
//! shapes survive the round trip untouched; normalization happens in the
//! core crate after load, never here. Survivors and notes live in their
//! own tables keyed by settlement.

use std::fmt;
use std::path::Path;

use contracts::{SettlementDocument, SettlementNote, Survivor};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

/// Everything the core crate needs to reconstruct a settlement. The
/// document comes back as a raw `Value` so migration sees exactly what
/// was stored.
#[derive(Debug, Clone)]
pub struct SettlementBundle {
    pub raw: Value,
    pub survivors: Vec<Survivor>,
    pub notes: Vec<SettlementNote>,
}

/// One row of the settlement listing.
#[derive(Debug, Clone)]
pub struct SettlementSummary {
    pub id: String,
    pub name: String,
    pub campaign: String,
    pub lantern_year: u64,
}

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Serde(serde_json::Error),
    NotFound(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::Serde(err) => write!(f, "serde error: {err}"),
            Self::NotFound(id) => write!(f, "no settlement with id '{id}'"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

#[derive(Debug)]
pub struct SqliteSettlementStore {
    conn: Connection,
}

impl SqliteSettlementStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.configure()?;
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.configure()?;
        store.migrate()?;
        Ok(store)
    }

    /// Rewrites the settlement row and replaces its dependent rows in one
    /// transaction.
    pub fn save_bundle(
        &mut self,
        doc: &SettlementDocument,
        survivors: &[Survivor],
        notes: &[SettlementNote],
    ) -> Result<(), StoreError> {
        let document_json = serde_json::to_string(doc)?;
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO settlements (
                settlement_id,
                name,
                campaign,
                lantern_year,
                document_json,
                saved_at_ly
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(settlement_id) DO UPDATE SET
                name = excluded.name,
                campaign = excluded.campaign,
                lantern_year = excluded.lantern_year,
                document_json = excluded.document_json,
                saved_at_ly = excluded.saved_at_ly",
            params![
                doc.id.as_str(),
                doc.name.as_str(),
                doc.campaign.as_str(),
                i64::try_from(doc.lantern_year).unwrap_or(i64::MAX),
                document_json,
                year_stamp(doc.lantern_year),
            ],
        )?;

        tx.execute(
            "DELETE FROM survivors WHERE settlement_id = ?1",
            params![doc.id.as_str()],
        )?;
        for survivor in survivors {
            let payload_json = serde_json::to_string(survivor)?;
            tx.execute(
                "INSERT INTO survivors (settlement_id, survivor_id, payload_json)
                 VALUES (?1, ?2, ?3)",
                params![doc.id.as_str(), survivor.id.as_str(), payload_json],
            )?;
        }

        tx.execute(
            "DELETE FROM settlement_notes WHERE settlement_id = ?1",
            params![doc.id.as_str()],
        )?;
        for note in notes {
            let payload_json = serde_json::to_string(note)?;
            tx.execute(
                "INSERT INTO settlement_notes (settlement_id, js_id, payload_json)
                 VALUES (?1, ?2, ?3)",
                params![doc.id.as_str(), note.js_id.as_str(), payload_json],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    pub fn load_bundle(&self, id: &str) -> Result<SettlementBundle, StoreError> {
        let document_json: Option<String> = self
            .conn
            .query_row(
                "SELECT document_json FROM settlements WHERE settlement_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let raw = match document_json {
            Some(payload) => serde_json::from_str::<Value>(&payload)?,
            None => return Err(StoreError::NotFound(id.to_string())),
        };

        let mut stmt = self.conn.prepare(
            "SELECT payload_json FROM survivors
             WHERE settlement_id = ?1
             ORDER BY survivor_id ASC",
        )?;
        let rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
        let mut survivors = Vec::new();
        for row in rows {
            let payload = row?;
            survivors.push(serde_json::from_str::<Survivor>(&payload)?);
        }

        let mut stmt = self.conn.prepare(
            "SELECT payload_json FROM settlement_notes
             WHERE settlement_id = ?1
             ORDER BY js_id ASC",
        )?;
        let rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
        let mut notes = Vec::new();
        for row in rows {
            let payload = row?;
            notes.push(serde_json::from_str::<SettlementNote>(&payload)?);
        }

        Ok(SettlementBundle {
            raw,
            survivors,
            notes,
        })
    }

    pub fn list_settlements(&self) -> Result<Vec<SettlementSummary>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT settlement_id, name, campaign, lantern_year
             FROM settlements
             ORDER BY settlement_id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, name, campaign, lantern_year) = row?;
            summaries.push(SettlementSummary {
                id,
                name,
                campaign,
                lantern_year: u64::try_from(lantern_year).unwrap_or(0),
            });
        }
        Ok(summaries)
    }

    pub fn delete_settlement(&mut self, id: &str) -> Result<bool, StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM survivors WHERE settlement_id = ?1",
            params![id],
        )?;
        tx.execute(
            "DELETE FROM settlement_notes WHERE settlement_id = ?1",
            params![id],
        )?;
        let removed = tx.execute(
            "DELETE FROM settlements WHERE settlement_id = ?1",
            params![id],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn configure(&mut self) -> Result<(), StoreError> {
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }

    fn migrate(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settlements (
                settlement_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                campaign TEXT NOT NULL,
                lantern_year INTEGER NOT NULL,
                document_json TEXT NOT NULL,
                saved_at_ly TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS survivors (
                settlement_id TEXT NOT NULL,
                survivor_id TEXT NOT NULL,
                payload_json TEXT NOT NULL,
                PRIMARY KEY (settlement_id, survivor_id)
            );

            CREATE TABLE IF NOT EXISTS settlement_notes (
                settlement_id TEXT NOT NULL,
                js_id TEXT NOT NULL,
                payload_json TEXT NOT NULL,
                PRIMARY KEY (settlement_id, js_id)
            );

            CREATE INDEX IF NOT EXISTS idx_survivors_settlement ON survivors(settlement_id);
            CREATE INDEX IF NOT EXISTS idx_notes_settlement ON settlement_notes(settlement_id);
            ",
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO schema_migrations(version, name, applied_at)
             VALUES(1, 'initial_v1', 'ly-000')",
            [],
        )?;

        Ok(())
    }
}

fn year_stamp(lantern_year: u64) -> String {
    format!("ly-{lantern_year:03}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::NewSettlement;
    use serde_json::json;
    use settlement_core::{GameContent, Settlement};

    fn created_settlement(content: &GameContent) -> Settlement<'_> {
        let request = NewSettlement {
            campaign: "people_of_the_lantern".to_string(),
            name: Some("Stonefall".to_string()),
            specials: vec!["create_first_story".to_string()],
            ..NewSettlement::default()
        };
        Settlement::create(content, "stl_store_01", &request).expect("settlement creates")
    }

    #[test]
    fn bundle_round_trips_through_the_store() {
        let content = GameContent::core();
        let settlement = created_settlement(&content);

        let mut store = SqliteSettlementStore::open_in_memory().unwrap();
        store
            .save_bundle(
                settlement.document(),
                settlement.survivors(),
                settlement.notes(),
            )
            .unwrap();

        let bundle = store.load_bundle("stl_store_01").unwrap();
        assert_eq!(bundle.survivors.len(), settlement.survivors().len());
        assert_eq!(bundle.notes.len(), settlement.notes().len());

        let reloaded =
            Settlement::load(&content, bundle.raw, bundle.survivors, bundle.notes).unwrap();
        assert!(!reloaded.is_dirty());
        assert_eq!(reloaded.document(), settlement.document());
        assert_eq!(reloaded.survivors(), settlement.survivors());
    }

    #[test]
    fn save_replaces_dependent_rows() {
        let content = GameContent::core();
        let mut settlement = created_settlement(&content);

        let mut store = SqliteSettlementStore::open_in_memory().unwrap();
        store
            .save_bundle(
                settlement.document(),
                settlement.survivors(),
                settlement.notes(),
            )
            .unwrap();

        settlement
            .add_settlement_note(SettlementNote {
                js_id: "note_01".to_string(),
                note: "first hunt went badly".to_string(),
                author: "founder".to_string(),
                lantern_year: 0,
            })
            .unwrap();
        store
            .save_bundle(
                settlement.document(),
                settlement.survivors(),
                settlement.notes(),
            )
            .unwrap();

        let bundle = store.load_bundle("stl_store_01").unwrap();
        assert_eq!(bundle.notes.len(), 1);
        assert_eq!(bundle.notes[0].note, "first hunt went badly");
    }

    #[test]
    fn raw_payload_survives_untouched() {
        // Legacy shapes must come back exactly as stored so that the
        // migration pipeline sees them.
        let legacy = json!({
            "_id": "stl_legacy_raw",
            "name": "Oldtown",
            "campaign": "People of the Lantern",
            "lantern_year": 2,
            "settlement_notes": "inline text"
        });
        let doc = SettlementDocument {
            id: "stl_legacy_raw".to_string(),
            name: "Oldtown".to_string(),
            campaign: "People of the Lantern".to_string(),
            lantern_year: 2,
            ..SettlementDocument::default()
        };

        let mut store = SqliteSettlementStore::open_in_memory().unwrap();
        // Store the raw shape directly under the settlement row.
        let tx = store.conn.transaction().unwrap();
        tx.execute(
            "INSERT INTO settlements (
                settlement_id, name, campaign, lantern_year,
                document_json, saved_at_ly
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                doc.id.as_str(),
                doc.name.as_str(),
                doc.campaign.as_str(),
                2_i64,
                serde_json::to_string(&legacy).unwrap(),
                "ly-002",
            ],
        )
        .unwrap();
        tx.commit().unwrap();

        let bundle = store.load_bundle("stl_legacy_raw").unwrap();
        assert_eq!(bundle.raw, legacy);
    }

    #[test]
    fn saved_stamp_tracks_the_lantern_year() {
        let doc = SettlementDocument {
            id: "stl_stamp".to_string(),
            name: "Stampfield".to_string(),
            campaign: "people_of_the_lantern".to_string(),
            lantern_year: 5,
            ..SettlementDocument::default()
        };

        let mut store = SqliteSettlementStore::open_in_memory().unwrap();
        store.save_bundle(&doc, &[], &[]).unwrap();

        let stamp: String = store
            .conn
            .query_row(
                "SELECT saved_at_ly FROM settlements WHERE settlement_id = ?1",
                params!["stl_stamp"],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stamp, "ly-005");
    }

    #[test]
    fn missing_settlement_is_not_found() {
        let store = SqliteSettlementStore::open_in_memory().unwrap();
        assert!(matches!(
            store.load_bundle("stl_missing"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn listing_and_deletion() {
        let content = GameContent::core();
        let settlement = created_settlement(&content);

        let mut store = SqliteSettlementStore::open_in_memory().unwrap();
        store
            .save_bundle(
                settlement.document(),
                settlement.survivors(),
                settlement.notes(),
            )
            .unwrap();

        let listing = store.list_settlements().unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].id, "stl_store_01");
        assert_eq!(listing[0].name, "Stonefall");
        assert_eq!(listing[0].campaign, "people_of_the_lantern");

        assert!(store.delete_settlement("stl_store_01").unwrap());
        assert!(!store.delete_settlement("stl_store_01").unwrap());
        assert!(store.list_settlements().unwrap().is_empty());
    }
}
