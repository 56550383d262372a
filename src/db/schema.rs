use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::models::{AbstractSource, PaperAbstract, PaperRecord};
use super::store::PaperStore;
use super::StoreError;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Receives the store at checkpoint boundaries of a long batch
pub trait Checkpoint {
    fn checkpoint(&mut self, store: &mut PaperStore) -> Result<usize>;
}

pub struct Database {
    conn: Mutex<Connection>,
    path: String,
}

impl Database {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let conn = Connection::open(&path)?;
        let db = Database { conn: Mutex::new(conn), path: path_str };
        db.init()?;
        Ok(db)
    }

    pub fn get_path(&self) -> String {
        self.path.clone()
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn: Mutex::new(conn), path: ":memory:".to_string() };
        db.init()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn init(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS papers (
                id TEXT PRIMARY KEY,
                year INTEGER NOT NULL,
                venue TEXT NOT NULL,
                url TEXT NOT NULL,
                raw_text TEXT,
                abstract TEXT,
                -- 'rule' | 'anthology', NULL iff abstract is NULL
                abstract_source TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_papers_year ON papers(year);
            CREATE INDEX IF NOT EXISTS idx_papers_venue ON papers(venue);
            ",
        )?;

        Ok(())
    }

    const PAPER_COLUMNS: &'static str = "id, year, venue, url, raw_text, abstract, abstract_source";

    fn row_to_paper(row: &rusqlite::Row) -> rusqlite::Result<PaperRecord> {
        let abstract_text: Option<String> = row.get(5)?;
        let source: Option<String> = row.get(6)?;
        Ok(PaperRecord {
            id: row.get(0)?,
            year: row.get(1)?,
            venue: row.get(2)?,
            url: row.get(3)?,
            raw_text: row.get(4)?,
            // Rows written before provenance tracking count as rule-based
            abstract_text: abstract_text.map(|text| PaperAbstract {
                text,
                source: source
                    .as_deref()
                    .and_then(AbstractSource::from_str)
                    .filter(|s| *s != AbstractSource::None)
                    .unwrap_or(AbstractSource::Rule),
            }),
        })
    }

    /// Insert new rows or replace existing ones by id
    pub fn upsert_papers(&self, papers: &[PaperRecord]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO papers (id, year, venue, url, raw_text, abstract, abstract_source)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                    year = excluded.year, venue = excluded.venue, url = excluded.url,
                    raw_text = excluded.raw_text, abstract = excluded.abstract,
                    abstract_source = excluded.abstract_source",
            )?;
            for paper in papers {
                stmt.execute(params![
                    paper.id,
                    paper.year,
                    paper.venue,
                    paper.url,
                    paper.raw_text,
                    paper.abstract_str(),
                    paper.abstract_text.as_ref().map(|a| a.source.as_str()),
                ])?;
            }
        }
        tx.commit()?;
        Ok(papers.len())
    }

    pub fn get_paper(&self, id: &str) -> Result<Option<PaperRecord>> {
        let conn = self.conn()?;
        let paper = conn
            .query_row(
                &format!("SELECT {} FROM papers WHERE id = ?1", Self::PAPER_COLUMNS),
                params![id],
                Self::row_to_paper,
            )
            .optional()?;
        Ok(paper)
    }

    /// Load every row into an in-memory store, ordered by id
    pub fn load_store(&self) -> Result<PaperStore> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM papers ORDER BY id", Self::PAPER_COLUMNS))?;
        let papers = stmt
            .query_map([], Self::row_to_paper)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(PaperStore::from_records(papers))
    }

    /// Field-level write of abstract + provenance for records changed in the store.
    ///
    /// The change set is cleared only after the commit, so a failed save is
    /// retried in full by the next one.
    pub fn save_abstracts(&self, store: &mut PaperStore) -> Result<usize> {
        let changed = store.dirty_records();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare("UPDATE papers SET abstract = ?2, abstract_source = ?3 WHERE id = ?1")?;
            for paper in &changed {
                written += stmt.execute(params![
                    paper.id,
                    paper.abstract_str(),
                    paper.abstract_text.as_ref().map(|a| a.source.as_str()),
                ])?;
            }
        }
        tx.commit()?;
        store.clear_dirty();
        Ok(written)
    }

    pub fn count_papers(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM papers", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// (none, rule, anthology) counts
    pub fn count_by_source(&self) -> Result<(usize, usize, usize)> {
        let conn = self.conn()?;
        let (none, rule, anthology): (i64, i64, i64) = conn.query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN abstract IS NULL THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN abstract IS NOT NULL AND COALESCE(abstract_source, 'rule') != 'anthology' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN abstract IS NOT NULL AND abstract_source = 'anthology' THEN 1 ELSE 0 END), 0)
             FROM papers",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        Ok((none as usize, rule as usize, anthology as usize))
    }
}

impl Checkpoint for Database {
    fn checkpoint(&mut self, store: &mut PaperStore) -> Result<usize> {
        self.save_abstracts(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<PaperRecord> {
        vec![
            PaperRecord::new("P19-1001", 2019, "ACL", "https://www.aclweb.org/anthology/P19-1001"),
            PaperRecord::new("L18-1002", 2018, "LREC", "http://www.lrec-conf.org/L18-1002")
                .with_raw_text("Abstract\nSome text.\n\n1 Introduction"),
        ]
    }

    #[test]
    fn test_upsert_and_load() {
        let db = Database::in_memory().unwrap();
        db.upsert_papers(&sample()).unwrap();
        assert_eq!(db.count_papers().unwrap(), 2);

        let store = db.load_store().unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.dirty_count(), 0);
        let lrec = store.get("L18-1002").unwrap();
        assert_eq!(lrec.venue, "LREC");
        assert!(lrec.raw_text.as_deref().unwrap().starts_with("Abstract"));
    }

    #[test]
    fn test_save_abstracts_writes_only_changed() {
        let db = Database::in_memory().unwrap();
        db.upsert_papers(&sample()).unwrap();
        let mut store = db.load_store().unwrap();

        store.set_abstract("P19-1001", "We study X.".to_string(), AbstractSource::Anthology);
        assert_eq!(db.save_abstracts(&mut store).unwrap(), 1);
        assert_eq!(db.save_abstracts(&mut store).unwrap(), 0);

        let paper = db.get_paper("P19-1001").unwrap().unwrap();
        assert_eq!(paper.abstract_str(), Some("We study X."));
        assert_eq!(paper.abstract_source(), AbstractSource::Anthology);
        assert_eq!(db.count_by_source().unwrap(), (1, 0, 1));
    }

    #[test]
    fn test_failed_save_keeps_changes_for_retry() {
        let db = Database::in_memory().unwrap();
        db.upsert_papers(&sample()).unwrap();
        let mut store = db.load_store().unwrap();
        store.set_abstract("P19-1001", "Pending.".to_string(), AbstractSource::Rule);

        db.conn().unwrap().execute_batch("ALTER TABLE papers RENAME TO papers_moved").unwrap();
        assert!(db.save_abstracts(&mut store).is_err());
        assert_eq!(store.dirty_count(), 1);

        db.conn().unwrap().execute_batch("ALTER TABLE papers_moved RENAME TO papers").unwrap();
        assert_eq!(db.save_abstracts(&mut store).unwrap(), 1);
        assert_eq!(store.dirty_count(), 0);
        let paper = db.get_paper("P19-1001").unwrap().unwrap();
        assert_eq!(paper.abstract_str(), Some("Pending."));
    }

    #[test]
    fn test_null_source_counts_as_rule() {
        let db = Database::in_memory().unwrap();
        db.upsert_papers(&sample()[..1]).unwrap();
        db.conn()
            .unwrap()
            .execute("UPDATE papers SET abstract = 'x', abstract_source = NULL WHERE id = 'P19-1001'", [])
            .unwrap();

        let paper = db.get_paper("P19-1001").unwrap().unwrap();
        assert_eq!(paper.abstract_source(), AbstractSource::Rule);
        assert_eq!(db.count_by_source().unwrap(), (0, 1, 0));
    }

    #[test]
    fn test_missing_paper_is_none() {
        let db = Database::in_memory().unwrap();
        assert!(db.get_paper("nope").unwrap().is_none());
    }

    #[test]
    fn test_on_disk_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("papers.db");
        {
            let db = Database::new(&path).unwrap();
            db.upsert_papers(&sample()).unwrap();
        }
        let db = Database::new(&path).unwrap();
        assert_eq!(db.count_papers().unwrap(), 2);
    }
}
