use anyhow::Context;
use rusqlite::{Connection, params};
use std::path::Path;

use crate::catalog::TrackRecord;

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let conn = Connection::open(path).with_context(|| format!("open {}", path.display()))?;
        let s = Self { conn };
        s.init_schema()?;
        Ok(s)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let s = Self {
            conn: Connection::open_in_memory().context("open in-memory db")?,
        };
        s.init_schema()?;
        Ok(s)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn
            .execute_batch(
                r#"
CREATE TABLE IF NOT EXISTS tracks (
  id TEXT PRIMARY KEY,
  title TEXT NOT NULL,
  artist TEXT NOT NULL,
  audio_url TEXT NOT NULL,
  lyrics_ref TEXT,
  lyrics TEXT NOT NULL,
  ingested_at INTEGER NOT NULL
);
"#,
            )
            .context("init schema")?;
        Ok(())
    }

    /// Insert or update tracks in one transaction.
    pub fn upsert_tracks(&mut self, tracks: &[TrackRecord], now_unix: i64) -> anyhow::Result<()> {
        let tx = self.conn.transaction().context("begin upsert")?;
        {
            let mut stmt = tx
                .prepare(
                    r#"
INSERT INTO tracks(id, title, artist, audio_url, lyrics_ref, lyrics, ingested_at)
VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
ON CONFLICT(id) DO UPDATE SET
  title=excluded.title,
  artist=excluded.artist,
  audio_url=excluded.audio_url,
  lyrics_ref=excluded.lyrics_ref,
  lyrics=excluded.lyrics,
  ingested_at=excluded.ingested_at
"#,
                )
                .context("prepare upsert")?;
            for t in tracks {
                stmt.execute(params![
                    t.id,
                    t.title,
                    t.artist,
                    t.audio_url,
                    t.lyrics_ref,
                    t.lyrics,
                    now_unix
                ])
                .with_context(|| format!("upsert track {}", t.id))?;
            }
        }
        tx.commit().context("commit upsert")?;
        Ok(())
    }

    /// Delete every track whose id is not in `keep`. Returns how many went.
    pub fn retain_tracks(&mut self, keep: &[&str]) -> anyhow::Result<usize> {
        let tx = self.conn.transaction().context("begin retain")?;
        tx.execute_batch("CREATE TEMP TABLE IF NOT EXISTS keep_ids (id TEXT PRIMARY KEY); DELETE FROM keep_ids;")
            .context("prepare keep list")?;
        {
            let mut stmt = tx
                .prepare("INSERT OR IGNORE INTO keep_ids(id) VALUES(?1)")
                .context("prepare keep insert")?;
            for id in keep {
                stmt.execute(params![id]).context("insert keep id")?;
            }
        }
        let removed = tx
            .execute("DELETE FROM tracks WHERE id NOT IN (SELECT id FROM keep_ids)", [])
            .context("delete stale tracks")?;
        tx.commit().context("commit retain")?;
        Ok(removed)
    }

    /// All tracks, ordered by id.
    pub fn tracks(&self) -> anyhow::Result<Vec<TrackRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, artist, audio_url, lyrics_ref, lyrics FROM tracks ORDER BY id")
            .context("prepare tracks")?;
        let rows = stmt
            .query_map([], row_to_track)
            .context("query tracks")?
            .collect::<Result<Vec<_>, _>>()
            .context("read track rows")?;
        Ok(rows)
    }
}

fn row_to_track(row: &rusqlite::Row<'_>) -> rusqlite::Result<TrackRecord> {
    Ok(TrackRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        audio_url: row.get(3)?,
        lyrics_ref: row.get(4)?,
        lyrics: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, title: &str) -> TrackRecord {
        TrackRecord {
            id: id.to_string(),
            title: title.to_string(),
            artist: "Artist".to_string(),
            audio_url: format!("https://x/{id}"),
            lyrics_ref: None,
            lyrics: "[00:01.00]la".to_string(),
        }
    }

    #[test]
    fn test_upsert_and_list() {
        let mut s = Storage::open_in_memory().unwrap();
        s.upsert_tracks(&[track("b", "B"), track("a", "A")], 1).unwrap();

        let ids: Vec<String> = s.tracks().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_upsert_replaces_fields() {
        let mut s = Storage::open_in_memory().unwrap();
        s.upsert_tracks(&[track("a", "Old")], 1).unwrap();
        let mut newer = track("a", "New");
        newer.lyrics_ref = Some("a.lrc".into());
        s.upsert_tracks(&[newer.clone()], 2).unwrap();

        assert_eq!(s.tracks().unwrap(), vec![newer]);
    }

    #[test]
    fn test_retain_tracks() {
        let mut s = Storage::open_in_memory().unwrap();
        s.upsert_tracks(&[track("a", "A"), track("b", "B"), track("c", "C")], 1).unwrap();

        assert_eq!(s.retain_tracks(&["a", "c"]).unwrap(), 1);
        let ids: Vec<String> = s.tracks().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(s.retain_tracks(&["a", "c"]).unwrap(), 0);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("catalog.sqlite3");
        {
            let mut s = Storage::open(&path).unwrap();
            s.upsert_tracks(&[track("a", "A")], 1).unwrap();
        }
        let s = Storage::open(&path).unwrap();
        assert_eq!(s.tracks().unwrap().len(), 1);
    }
}
