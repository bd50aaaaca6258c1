//! JSON snapshots of boards on disk, one file per board.
//!
//! Missing, corrupt or foreign files load as `None`; callers fall back to a fresh board.

use crate::models::{Board, BoardId, BoardSettings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Fixed key stamped into every snapshot and used as the file name prefix.
pub const STORAGE_KEY: &str = "court-queue-v1";

/// On-disk envelope around a board snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredBoard {
    pub key: String,
    pub saved_at: DateTime<Utc>,
    pub board: Board,
}

/// Snapshot files for many boards.
///
/// Saves for the same board are serialized, and each save carries a revision: a snapshot older
/// than the last one written for that board is dropped, so the file only moves forward.
#[derive(Debug)]
pub struct BoardStore {
    dir: PathBuf,
    /// Last revision written, per board.
    written: Mutex<HashMap<BoardId, Arc<tokio::sync::Mutex<u64>>>>,
}

impl BoardStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: BoardId) -> PathBuf {
        self.dir.join(format!("{}-{}.json", STORAGE_KEY, id))
    }

    /// Read a stored board. Returns None if there is no usable snapshot for `id`.
    pub async fn load(&self, id: BoardId) -> Option<Board> {
        let path = self.path_for(id);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice::<StoredBoard>(&raw) {
            Ok(stored) if stored.key == STORAGE_KEY && stored.board.id == id => {
                if let Err(e) = stored.board.check_invariants() {
                    log::warn!("Ignoring inconsistent board in {}: {}", path.display(), e);
                    return None;
                }
                Some(stored.board)
            }
            Ok(_) => {
                log::warn!("Ignoring foreign snapshot in {}", path.display());
                None
            }
            Err(e) => {
                log::warn!("Ignoring corrupt snapshot in {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Stored board for `id`, or a fresh board with that id.
    pub async fn load_or_default(
        &self,
        id: BoardId,
        court_names: &[String],
        settings: &BoardSettings,
    ) -> Board {
        match self.load(id).await {
            Some(board) => board,
            None => Board {
                id,
                ..Board::new(court_names, settings.clone())
            },
        }
    }

    fn revision_lock(&self, id: BoardId) -> Arc<tokio::sync::Mutex<u64>> {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        written.entry(id).or_default().clone()
    }

    /// Write a snapshot taken at `revision` (revisions must increase with every change).
    ///
    /// Returns `Ok(false)` without touching the file when a newer or equal revision was already
    /// written. The file is replaced atomically via a uniquely named temporary sibling.
    pub async fn save(&self, board: &Board, revision: u64) -> io::Result<bool> {
        let lock = self.revision_lock(board.id);
        let mut last = lock.lock().await;
        if revision <= *last {
            return Ok(false);
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let stored = StoredBoard {
            key: STORAGE_KEY.to_string(),
            saved_at: Utc::now(),
            board: board.clone(),
        };
        let json = serde_json::to_vec_pretty(&stored).map_err(io::Error::other)?;
        let path = self.path_for(board.id);
        let tmp = self
            .dir
            .join(format!(".{}-{}.{}.tmp", STORAGE_KEY, board.id, Uuid::new_v4()));
        let written = match tokio::fs::write(&tmp, json).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        *last = revision;
        Ok(true)
    }

    /// Drop the per-board save bookkeeping (the board was unloaded from memory).
    pub fn forget(&self, id: BoardId) {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::enqueue;
    use crate::models::{default_court_names, CourtRef};

    fn temp_store() -> BoardStore {
        BoardStore::new(std::env::temp_dir().join(format!("court-queue-test-{}", Uuid::new_v4())))
    }

    #[tokio::test]
    async fn saved_board_loads_back() {
        let store = temp_store();
        let board = enqueue(&Board::default(), &CourtRef::Index(1), ["Ann", "Bob"]).unwrap();
        assert!(store.save(&board, 1).await.unwrap());
        let loaded = store.load(board.id).await.unwrap();
        assert_eq!(loaded, board);
        let _ = tokio::fs::remove_dir_all(store.dir()).await;
    }

    #[tokio::test]
    async fn missing_snapshot_falls_back_to_fresh_board() {
        let store = temp_store();
        let id = Uuid::new_v4();
        let board = store
            .load_or_default(id, &default_court_names(), &BoardSettings::default())
            .await;
        assert_eq!(board.id, id);
        assert_eq!(board.courts.len(), 3);
        assert!(board.courts.iter().all(|c| c.queue.is_empty()));
    }

    #[tokio::test]
    async fn corrupt_snapshot_falls_back_silently() {
        let store = temp_store();
        let id = Uuid::new_v4();
        tokio::fs::create_dir_all(store.dir()).await.unwrap();
        tokio::fs::write(store.path_for(id), b"{ not json").await.unwrap();
        assert!(store.load(id).await.is_none());
        let board = store
            .load_or_default(id, &default_court_names(), &BoardSettings::default())
            .await;
        assert_eq!(board.id, id);
        let _ = tokio::fs::remove_dir_all(store.dir()).await;
    }

    #[tokio::test]
    async fn older_snapshot_never_replaces_newer() {
        let store = temp_store();
        let old = Board::default();
        let new = enqueue(&old, &CourtRef::Index(0), ["Ann"]).unwrap();
        assert!(store.save(&new, 5).await.unwrap());
        assert!(!store.save(&old, 4).await.unwrap());
        assert!(!store.save(&old, 5).await.unwrap());
        assert_eq!(store.load(new.id).await.unwrap(), new);
        let _ = tokio::fs::remove_dir_all(store.dir()).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_saves_all_succeed_and_newest_wins() {
        let store = Arc::new(temp_store());
        let mut board = Board::default();
        for round in 0..200u64 {
            let older = board.clone();
            board = enqueue(&board, &CourtRef::Index(0), [format!("P{round}")]).unwrap();
            let newer = board.clone();
            let (a, b) = (store.clone(), store.clone());
            let first = tokio::spawn(async move { a.save(&older, 2 * round + 1).await });
            let second = tokio::spawn(async move { b.save(&newer, 2 * round + 2).await });
            let (first, second) = (first.await.unwrap(), second.await.unwrap());
            assert!(first.is_ok(), "round {round}: {first:?}");
            assert!(second.is_ok(), "round {round}: {second:?}");
            assert_eq!(store.load(board.id).await.as_ref(), Some(&board), "round {round}");
        }
        let mut entries = tokio::fs::read_dir(store.dir()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let name = entry.file_name().to_string_lossy().into_owned();
            assert!(!name.ends_with(".tmp"), "leftover {name}");
        }
        let _ = tokio::fs::remove_dir_all(store.dir()).await;
    }
}
