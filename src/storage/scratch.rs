//! Scratch directory for uploads.
//!
//! Every stored upload gets its own slot named `<uuid>-<basename>`, so two
//! in-flight requests never share a file even when clients send the same
//! filename. The returned [`ScratchFile`] owns the slot: dropping it deletes
//! the file and removes the scratch directory once no slot is live.
//!
//! Clones of a [`ScratchDir`] share one live-slot count. Creating the
//! directory and removing it both happen under that count's lock, so the
//! directory cannot vanish between a store and its write.

use crate::types::AppResult;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

const FALLBACK_NAME: &str = "upload";

#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
    live: Arc<Mutex<usize>>,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            live: Arc::new(Mutex::new(0)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` into a fresh slot and return its guard.
    pub async fn store(&self, filename: &str, content: &[u8]) -> AppResult<ScratchFile> {
        {
            let mut live = lock_slots(&self.live);
            std::fs::create_dir_all(&self.root)?;
            *live += 1;
        }

        let file = ScratchFile {
            path: self.root.join(slot_name(filename)),
            dir: self.root.clone(),
            live: self.live.clone(),
        };

        // The guard exists before the write so a failed write is cleaned up too.
        tokio::fs::write(&file.path, content).await?;
        debug!("Stored upload at {} ({} bytes)", file.path.display(), content.len());

        Ok(file)
    }
}

/// An uploaded file living in the scratch directory for one request.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    dir: PathBuf,
    live: Arc<Mutex<usize>>,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed scratch file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove scratch file {}: {}", self.path.display(), e),
        }

        let mut live = lock_slots(&self.live);
        *live = live.saturating_sub(1);
        // Still fails if something outside this store left files behind.
        if *live == 0 && std::fs::remove_dir(&self.dir).is_ok() {
            debug!("Removed empty scratch directory {}", self.dir.display());
        }
    }
}

fn lock_slots(live: &Mutex<usize>) -> MutexGuard<'_, usize> {
    // The counter stays meaningful even if a holder panicked.
    live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn slot_name(filename: &str) -> String {
    format!("{}-{}", uuid::Uuid::new_v4(), sanitize_filename(filename))
}

/// Keep only the final path component of a client-supplied filename.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "" | "." | ".." => FALLBACK_NAME.to_string(),
        name => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\notes.md"), "notes.md");
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("dir/"), "upload");
        assert_eq!(sanitize_filename(".."), "upload");
    }

    #[test]
    fn test_slot_names_are_unique() {
        assert_ne!(slot_name("same.pdf"), slot_name("same.pdf"));
        assert!(slot_name("same.pdf").ends_with("-same.pdf"));
    }

    #[tokio::test]
    async fn test_store_and_cleanup() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(tmp.path().join("uploads"));

        let file = scratch.store("doc.pdf", b"%PDF-1.5").await.unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.5");
        assert!(path.starts_with(scratch.root()));

        drop(file);
        assert!(!path.exists());
        assert!(!scratch.root().exists());
    }

    #[tokio::test]
    async fn test_directory_kept_while_other_slots_live() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(tmp.path().join("uploads"));

        let first = scratch.store("same.pdf", b"one").await.unwrap();
        let second = scratch.store("same.pdf", b"two").await.unwrap();
        assert_ne!(first.path(), second.path());

        drop(first);
        assert!(scratch.root().exists());
        assert_eq!(std::fs::read(second.path()).unwrap(), b"two");

        drop(second);
        assert!(!scratch.root().exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_name_uploads() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(tmp.path().join("uploads"));

        let mut tasks = Vec::new();
        for task in 0..16 {
            let scratch = scratch.clone();
            tasks.push(tokio::spawn(async move {
                let mut failures = 0;
                for round in 0..200 {
                    let body = format!("{}-{}", task, round);
                    match scratch.store("same.pdf", body.as_bytes()).await {
                        Ok(file) => {
                            if std::fs::read(file.path()).unwrap() != body.as_bytes() {
                                failures += 1;
                            }
                        }
                        Err(_) => failures += 1,
                    }
                }
                failures
            }));
        }

        for task in tasks {
            assert_eq!(task.await.unwrap(), 0);
        }
        assert!(!scratch.root().exists());
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(tmp.path().join("uploads"));

        let file = scratch.store("gone.txt", b"x").await.unwrap();
        std::fs::remove_file(file.path()).unwrap();
        drop(file);
        assert!(!scratch.root().exists());
    }
}
