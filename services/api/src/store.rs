//! File-Backed Queue Store
//!
//! Persists a learner's queues as two JSON documents under
//! `<store-root>/queues/`. The first load copies the bundled template into the
//! store; a corrupt document is replaced by the template instead of failing.
//!
//! Every write goes to a temporary file in the target's directory and is then
//! renamed over the target. If the rename is refused, the content is copied in
//! place and the previous bytes are restored when that copy returns an error.
//! The copy fallback does not survive a crash mid-copy: a truncated document
//! is treated as corrupt on the next load and replaced by the template.
//!
//! A save writes `learned_queue.json` before `new_queue.json`. Dying between
//! the two leaves a just-mastered item in both documents, never in neither.
//!
//! All operations on one store instance are serialized by a single lock that
//! is held until the blocking filesystem work has finished, even if the
//! awaiting caller is cancelled.

use async_trait::async_trait;
use lango_core::{CoachError, LearningItem, Queues, Result, repository::LearningRepository};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const QUEUES_DIR: &str = "queues";
pub const NEW_QUEUE_FILE: &str = "new_queue.json";
pub const LEARNED_QUEUE_FILE: &str = "learned_queue.json";

type RenameFn = fn(&Path, &Path) -> io::Result<()>;

/// Paths and the replace primitive used by the blocking store operations.
#[derive(Clone)]
struct StorePaths {
    store_dir: PathBuf,
    template_dir: PathBuf,
    rename: RenameFn,
}

/// A [`LearningRepository`] writing JSON documents to the local filesystem.
pub struct FileLearningRepository {
    paths: StorePaths,
    lock: Arc<Mutex<()>>,
}

impl FileLearningRepository {
    /// Creates a store rooted at `store_root`, bootstrapping from the read-only
    /// template documents under `template_root`.
    pub fn new(store_root: impl AsRef<Path>, template_root: impl AsRef<Path>) -> Self {
        Self {
            paths: StorePaths {
                store_dir: store_root.as_ref().join(QUEUES_DIR),
                template_dir: template_root.as_ref().join(QUEUES_DIR),
                rename: replace_file,
            },
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store_dir(&self) -> &Path {
        &self.paths.store_dir
    }

    #[cfg(test)]
    fn with_rename(mut self, rename: RenameFn) -> Self {
        self.paths.rename = rename;
        self
    }

    async fn run_locked<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&StorePaths) -> Result<T> + Send + 'static,
    {
        let guard = self.lock.clone().lock_owned().await;
        let paths = self.paths.clone();
        let store_dir = paths.store_dir.clone();

        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            op(&paths)
        })
        .await
        .map_err(|e| CoachError::io(store_dir, io::Error::other(e.to_string())))?
    }
}

#[async_trait]
impl LearningRepository for FileLearningRepository {
    async fn load_queues(&self) -> Result<Queues> {
        self.run_locked(|paths| paths.load()).await
    }

    async fn save_queues(&self, queues: &Queues) -> Result<()> {
        let queues = queues.clone();
        self.run_locked(move |paths| paths.save(&queues)).await
    }
}

impl StorePaths {
    fn store_file(&self, name: &str) -> PathBuf {
        self.store_dir.join(name)
    }

    fn template_file(&self, name: &str) -> PathBuf {
        self.template_dir.join(name)
    }

    fn load(&self) -> Result<Queues> {
        self.bootstrap()?;

        match read_queues(&self.store_dir) {
            Ok(queues) => Ok(queues),
            Err(CoachError::Serialization { context, source }) => {
                warn!(
                    document = %context,
                    error = %source,
                    "Persisted queues are corrupt; restoring bundled template"
                );
                self.restore_from_template()
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, queues: &Queues) -> Result<()> {
        create_dir(&self.store_dir)?;
        // Learned pool first: a crash in between duplicates an item, it cannot drop one.
        self.write_atomic(
            &self.store_file(LEARNED_QUEUE_FILE),
            &encode(&queues.learned_pool, LEARNED_QUEUE_FILE)?,
        )?;
        self.write_atomic(&self.store_file(NEW_QUEUE_FILE), &encode(&queues.new_queue, NEW_QUEUE_FILE)?)?;
        debug!(
            new = queues.new_queue.len(),
            learned = queues.learned_pool.len(),
            "Queues saved"
        );
        Ok(())
    }

    /// Copies any template document missing from the store. Returns how many were copied.
    fn bootstrap(&self) -> Result<usize> {
        create_dir(&self.store_dir)?;

        let mut copied = 0;
        for name in [NEW_QUEUE_FILE, LEARNED_QUEUE_FILE] {
            let target = self.store_file(name);
            if target.exists() {
                continue;
            }
            let source = self.template_file(name);
            let bytes = fs::read(&source).map_err(|e| CoachError::io(&source, e))?;
            self.write_atomic(&target, &bytes)?;
            copied += 1;
        }

        if copied > 0 {
            info!(
                store = %self.store_dir.display(),
                copied,
                "Bootstrapped queue store from bundled template"
            );
        }
        Ok(copied)
    }

    fn restore_from_template(&self) -> Result<Queues> {
        let queues = read_queues(&self.template_dir)?;
        self.save(&queues)?;
        Ok(queues)
    }

    fn write_atomic(&self, target: &Path, bytes: &[u8]) -> Result<()> {
        let dir = target.parent().unwrap_or(&self.store_dir);
        let io_err = |e| CoachError::io(target, e);

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        let tmp_path = tmp.into_temp_path();

        match (self.rename)(&tmp_path, target) {
            Ok(()) => {
                tmp_path.keep().map_err(|e| io_err(e.error))?;
                Ok(())
            }
            Err(e) => {
                warn!(
                    target = %target.display(),
                    error = %e,
                    "Atomic rename refused; falling back to copy-and-replace"
                );
                copy_replace(&tmp_path, target).map_err(io_err)
            }
        }
    }
}

fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

/// Copies `source` over `target`, putting the previous bytes back if the copy fails.
fn copy_replace(source: &Path, target: &Path) -> io::Result<()> {
    let previous = match fs::read(target) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };

    let copied = fs::copy(source, target).and_then(|_| fs::File::open(target)?.sync_all());
    if let Err(e) = copied {
        match previous {
            Some(bytes) => fs::write(target, bytes)?,
            None => {
                let _ = fs::remove_file(target);
            }
        }
        return Err(e);
    }
    Ok(())
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| CoachError::io(dir, e))
}

fn encode(items: &[LearningItem], name: &str) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(items).map_err(|e| CoachError::serialization(name, e))
}

fn read_items(path: &Path) -> Result<Vec<LearningItem>> {
    let bytes = fs::read(path).map_err(|e| CoachError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| CoachError::serialization(path.display().to_string(), e))
}

fn read_queues(dir: &Path) -> Result<Queues> {
    Ok(Queues::new(
        read_items(&dir.join(NEW_QUEUE_FILE))?,
        read_items(&dir.join(LEARNED_QUEUE_FILE))?,
    ))
}
