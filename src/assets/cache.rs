//! Content-addressed, reference-counted store of generated files.
//!
//! Mutations ([`AssetCache::add`], [`AssetCache::remove`], [`AssetCache::apply`], ...) only touch
//! the in-memory entry list and bump a generation counter. A single worker thread coalesces bursts
//! of mutations and then runs one filesystem pass that renames, regenerates and deletes files so
//! the resource root matches the latest entry list. Files are therefore eventually consistent with
//! the last mutation; use [`AssetCache::wait_settled`] or [`AssetCache::materialize_now`] when a
//! caller needs them on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::{
    assets::asset::{Asset, AssetSource},
    assets::materialize::{destination, materialize},
    foundation::error::{StoryError, StoryResult},
};

/// Options for [`AssetCache`].
#[derive(Clone, Debug)]
pub struct AssetCacheOpts {
    /// Quiet period after the last mutation before the filesystem pass runs.
    pub debounce: Duration,
}

impl Default for AssetCacheOpts {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(200),
        }
    }
}

/// One cache entry.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedAsset {
    /// Destination path relative to the root.
    pub path: String,
    pub content_hash: String,
    pub source: AssetSource,
    pub reference_count: u32,
    /// Where the file currently is on disk, if it was ever written.
    on_disk: Option<String>,
    /// Set when the content at `path` changed and must be regenerated.
    stale: bool,
}

impl CachedAsset {
    fn from_asset(asset: &Asset) -> Self {
        Self {
            path: asset.path.clone(),
            content_hash: asset.content_hash.clone(),
            source: asset.source.clone(),
            reference_count: 1,
            on_disk: None,
            stale: true,
        }
    }

    fn to_asset(&self) -> Asset {
        Asset {
            path: self.path.clone(),
            source: self.source.clone(),
            content_hash: self.content_hash.clone(),
        }
    }

    /// `true` once the file at `path` reflects this entry's content.
    pub fn is_materialized(&self) -> bool {
        !self.stale && self.on_disk.as_deref() == Some(self.path.as_str())
    }
}

#[derive(Debug, Default)]
struct Entries {
    list: Vec<CachedAsset>,
    /// Files of entries dropped while merging, deleted on the next pass.
    pending_deletes: Vec<String>,
}

impl Entries {
    /// Count one reference to `asset`, reusing entries matched by path and/or content hash.
    fn merge(&mut self, asset: &Asset) {
        let by_path = self.list.iter().position(|e| e.path == asset.path);
        let by_hash = self
            .list
            .iter()
            .position(|e| e.content_hash == asset.content_hash);

        match (by_path, by_hash) {
            (Some(p), Some(h)) if p == h => {
                self.list[p].reference_count += 1;
            }
            // Same content elsewhere and nobody references it there: move the file instead of
            // regenerating it.
            (by_path, Some(h)) if self.list[h].reference_count == 0 => {
                if let Some(p) = by_path {
                    let dropped = self.list.remove(p);
                    if let Some(old) = dropped.on_disk
                        && old != asset.path
                    {
                        self.pending_deletes.push(old);
                    }
                }
                let h = if by_path.is_some_and(|p| p < h) { h - 1 } else { h };
                let e = &mut self.list[h];
                e.path = asset.path.clone();
                e.reference_count += 1;
            }
            (Some(p), _) => {
                let e = &mut self.list[p];
                if e.content_hash != asset.content_hash {
                    e.content_hash = asset.content_hash.clone();
                    e.source = asset.source.clone();
                    e.stale = true;
                }
                e.reference_count += 1;
            }
            (None, _) => {
                self.list.push(CachedAsset::from_asset(asset));
            }
        }
    }

    fn release(&mut self, asset: &Asset) -> bool {
        match self
            .list
            .iter_mut()
            .find(|e| e.path == asset.path && e.content_hash == asset.content_hash)
        {
            Some(e) => {
                e.reference_count = e.reference_count.saturating_sub(1);
                true
            }
            None => false,
        }
    }
}

struct Shared {
    root: PathBuf,
    entries: Mutex<Entries>,
    generation: AtomicU64,
    settled: Mutex<u64>,
    settled_cv: Condvar,
    passes: AtomicU64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    /// Run a pass for `stamp` unless a newer mutation superseded it.
    fn run_pass_if_current(&self, stamp: u64) {
        let mut entries = lock(&self.entries);
        if self.generation.load(Ordering::SeqCst) != stamp {
            tracing::debug!(stamp, "asset pass superseded");
            return;
        }
        self.run_pass(&mut entries);
        drop(entries);
        self.mark_settled(stamp);
    }

    fn mark_settled(&self, stamp: u64) {
        let mut settled = lock(&self.settled);
        if *settled < stamp {
            *settled = stamp;
        }
        self.settled_cv.notify_all();
    }

    #[tracing::instrument(skip(self, entries), fields(root = %self.root.display()))]
    fn run_pass(&self, entries: &mut Entries) {
        self.passes.fetch_add(1, Ordering::SeqCst);
        let live: HashSet<String> = entries
            .list
            .iter()
            .filter(|e| e.reference_count > 0)
            .map(|e| e.path.clone())
            .collect();

        let mut doomed = std::mem::take(&mut entries.pending_deletes);
        let (kept, evicted): (Vec<CachedAsset>, Vec<CachedAsset>) = entries
            .list
            .drain(..)
            .partition(|e| e.reference_count > 0);
        doomed.extend(evicted.into_iter().filter_map(|e| e.on_disk));
        for e in &kept {
            if e.stale
                && let Some(old) = &e.on_disk
                && *old != e.path
            {
                doomed.push(old.clone());
            }
        }
        for path in doomed {
            if live.contains(&path) {
                continue;
            }
            if let Err(err) = self.delete_file(&path) {
                tracing::warn!(path = %path, error = %err, "failed to delete orphaned asset");
            }
        }

        // Moves go through a staging name first so two entries may swap paths.
        let mut kept = kept;
        let mut moves = Vec::new();
        for (i, e) in kept.iter_mut().enumerate() {
            if !e.stale
                && let Some(old) = e.on_disk.clone()
                && old != e.path
            {
                let staging = format!("{}.moving", e.path);
                match self.rename_file(&old, &staging) {
                    Ok(()) => moves.push((i, old, staging)),
                    Err(err) => {
                        tracing::warn!(from = %old, to = %e.path, error = %err, "rename failed");
                        e.stale = true;
                    }
                }
            }
        }
        for (i, old, staging) in moves {
            let e = &mut kept[i];
            match self.rename_file(&staging, &e.path) {
                Ok(()) => {
                    tracing::info!(from = %old, to = %e.path, "renamed asset");
                    e.on_disk = Some(e.path.clone());
                }
                Err(err) => {
                    tracing::warn!(from = %old, to = %e.path, error = %err, "rename failed");
                    e.stale = true;
                    let _ = self.delete_file(&staging);
                }
            }
        }

        for mut e in kept {
            let present = destination(&self.root, &e.path)
                .map(|p| p.is_file())
                .unwrap_or(false);
            if e.stale || !present {
                match materialize(&self.root, &e.to_asset()) {
                    Ok(()) => {
                        tracing::info!(path = %e.path, "generated asset");
                        e.on_disk = Some(e.path.clone());
                        e.stale = false;
                    }
                    Err(StoryError::MissingResource(msg)) => {
                        tracing::warn!(path = %e.path, "skipping asset: {msg}");
                    }
                    Err(err) => {
                        tracing::warn!(path = %e.path, error = %err, "failed to generate asset");
                    }
                }
            }
            entries.list.push(e);
        }
    }

    fn delete_file(&self, rel: &str) -> StoryResult<()> {
        let path = destination(&self.root, rel)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %rel, "deleted asset");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(anyhow::Error::new(err)
                .context(format!("delete '{}'", path.display()))
                .into()),
        }
    }

    fn rename_file(&self, from: &str, to: &str) -> StoryResult<()> {
        let src = destination(&self.root, from)?;
        let dst = destination(&self.root, to)?;
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create asset dir '{}'", parent.display()))?;
        }
        std::fs::rename(&src, &dst)
            .with_context(|| format!("rename '{}' -> '{}'", src.display(), dst.display()))?;
        Ok(())
    }
}

enum Msg {
    Schedule(u64),
    Shutdown,
}

/// Reference-counted cache of generated files under one resource root.
pub struct AssetCache {
    shared: Arc<Shared>,
    tx: mpsc::Sender<Msg>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("root", &self.shared.root)
            .field("generation", &self.shared.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl AssetCache {
    /// Create a cache writing under `root` and start its worker thread.
    pub fn new(root: impl Into<PathBuf>, opts: AssetCacheOpts) -> StoryResult<Self> {
        let shared = Arc::new(Shared {
            root: root.into(),
            entries: Mutex::new(Entries::default()),
            generation: AtomicU64::new(0),
            settled: Mutex::new(0),
            settled_cv: Condvar::new(),
            passes: AtomicU64::new(0),
        });
        let (tx, rx) = mpsc::channel();
        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("storyweave-assets".to_string())
            .spawn(move || worker_loop(&worker_shared, &rx, opts.debounce))
            .context("spawn asset cache worker")?;
        Ok(Self {
            shared,
            tx,
            worker: Some(worker),
        })
    }

    pub fn root(&self) -> &Path {
        &self.shared.root
    }

    /// Count one more reference to `asset`.
    pub fn add(&self, asset: &Asset) {
        self.mutate(|entries| entries.merge(asset));
    }

    pub fn add_range<'a>(&self, assets: impl IntoIterator<Item = &'a Asset>) {
        self.mutate(|entries| {
            for a in assets {
                entries.merge(a);
            }
        });
    }

    /// Drop one reference to `asset`; an entry reaching zero is deleted by the next pass.
    pub fn remove(&self, asset: &Asset) {
        self.mutate(|entries| {
            if !entries.release(asset) {
                tracing::debug!(path = %asset.path, "remove of unknown asset ignored");
            }
        });
    }

    /// Make `assets` the complete set of referenced assets.
    ///
    /// Every count is recomputed from `assets`; entries no longer referenced are deleted from disk
    /// and evicted by the next pass.
    pub fn apply<'a>(&self, assets: impl IntoIterator<Item = &'a Asset>) {
        self.mutate(|entries| {
            for e in &mut entries.list {
                e.reference_count = 0;
            }
            for a in assets {
                entries.merge(a);
            }
        });
    }

    fn mutate(&self, f: impl FnOnce(&mut Entries)) {
        let stamp = {
            let mut entries = lock(&self.shared.entries);
            f(&mut entries);
            self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        if self.tx.send(Msg::Schedule(stamp)).is_err() {
            tracing::warn!(stamp, "asset cache worker is gone; pass not scheduled");
        }
    }

    /// Run a filesystem pass now, on the calling thread.
    pub fn materialize_now(&self) {
        let mut entries = lock(&self.shared.entries);
        let stamp = self.shared.generation.load(Ordering::SeqCst);
        self.shared.run_pass(&mut entries);
        drop(entries);
        self.shared.mark_settled(stamp);
    }

    /// Block until a pass reflecting every mutation made so far has completed.
    ///
    /// Returns `false` if `timeout` elapsed first.
    pub fn wait_settled(&self, timeout: Duration) -> bool {
        let target = self.shared.generation.load(Ordering::SeqCst);
        let deadline = Instant::now() + timeout;
        let mut settled = lock(&self.shared.settled);
        while *settled < target {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            settled = self
                .shared
                .settled_cv
                .wait_timeout(settled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    /// Number of filesystem passes run so far.
    pub fn passes_run(&self) -> u64 {
        self.shared.passes.load(Ordering::SeqCst)
    }

    /// Copy of the current entries.
    pub fn snapshot(&self) -> Vec<CachedAsset> {
        lock(&self.shared.entries).list.clone()
    }
}

impl Drop for AssetCache {
    fn drop(&mut self) {
        let _ = self.tx.send(Msg::Shutdown);
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("asset cache worker panicked");
        }
    }
}

fn worker_loop(shared: &Shared, rx: &mpsc::Receiver<Msg>, debounce: Duration) {
    loop {
        let mut stamp = match rx.recv() {
            Ok(Msg::Schedule(stamp)) => stamp,
            Ok(Msg::Shutdown) | Err(_) => return,
        };

        let mut shutdown = false;
        loop {
            match rx.recv_timeout(debounce) {
                Ok(Msg::Schedule(next)) => stamp = next,
                Ok(Msg::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                    shutdown = true;
                    break;
                }
                Err(RecvTimeoutError::Timeout) => break,
            }
        }

        shared.run_pass_if_current(stamp);
        if shutdown {
            return;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
