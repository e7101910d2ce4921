//! Filesystem-backed trace store.
//!
//! Writes go to `<qid>_trace.json.tmp` first and are hard-linked into place,
//! so the final name only ever holds a complete trace and is never replaced.

use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::Trace;
use crate::paths;

#[derive(Debug, Clone)]
pub struct TraceStore {
    dir: PathBuf,
}

impl TraceStore {
    /// Open (and create if needed) a trace directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create trace directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, qid: &str) -> PathBuf {
        paths::trace_path(&self.dir, qid)
    }

    /// Whether a sealed trace exists for `qid` - the only resumability signal
    pub fn exists(&self, qid: &str) -> bool {
        self.path_for(qid).is_file()
    }

    /// Persist a finished trace exactly once
    pub fn seal(&self, trace: &Trace) -> Result<PathBuf> {
        if !trace.is_sealed() {
            bail!("trace {} has no terminal outcome yet", trace.qid);
        }

        let final_path = self.path_for(&trace.qid);
        if final_path.exists() {
            bail!(
                "trace {} already sealed at {}",
                trace.qid,
                final_path.display()
            );
        }

        let temp_path = paths::trace_temp_path(&self.dir, &trace.qid);
        let json = serde_json::to_string_pretty(trace)?;
        write_synced(&temp_path, json.as_bytes())
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        publish(&temp_path, &final_path)
            .with_context(|| format!("trace {} not sealed", trace.qid))?;

        tracing::debug!(qid = %trace.qid, path = %final_path.display(), "trace sealed");
        Ok(final_path)
    }

    pub fn load(&self, qid: &str) -> Result<Trace> {
        let path = self.path_for(qid);
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("No trace for {} at {}", qid, path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse trace {}", path.display()))
    }

    /// Qids of all sealed traces, sorted
    pub fn qids(&self) -> Result<Vec<String>> {
        let mut qids = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read {}", self.dir.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if let Some(qid) = paths::qid_from_trace_file(&name.to_string_lossy()) {
                qids.push(qid.to_string());
            }
        }
        qids.sort();
        Ok(qids)
    }

    /// Load every sealed trace, sorted by qid
    pub fn list(&self) -> Result<Vec<Trace>> {
        self.qids()?.iter().map(|qid| self.load(qid)).collect()
    }
}

/// Link `temp` into place at `target`, failing if `target` exists, then drop `temp`
///
/// Unlike a rename, the link never replaces an existing trace.
fn publish(temp: &Path, target: &Path) -> Result<()> {
    let linked = fs::hard_link(temp, target);
    let _ = fs::remove_file(temp);
    match linked {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!("already sealed at {}", target.display())
        }
        Err(e) => Err(e).with_context(|| {
            format!("Failed to link {} to {}", temp.display(), target.display())
        }),
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
