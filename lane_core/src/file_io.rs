//! # File I/O Module
//!
//! Handles roster file operations with safety features:
//! - **Atomic saves**: Write to .tmp, fsync, rename to prevent corruption
//! - **File locking**: Keep two running front ends from editing one roster
//! - **Version validation**: Ensure schema compatibility
//!
//! ## File Format
//!
//! Rosters are saved as `.strk` files containing JSON.
//! Lock files use `.strk.lock` extension with metadata about who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lane_core::file_io::{save_roster, load_or_create_roster, FileLock};
//! use std::path::Path;
//!
//! let path = Path::new("roster.strk");
//!
//! // Acquire lock before editing
//! let lock = FileLock::acquire(path, "jess").unwrap();
//!
//! let roster = load_or_create_roster(path).unwrap();
//! save_roster(&roster, path).unwrap();
//!
//! // Lock is released when dropped
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{CalcError, CalcResult};
use crate::roster::{Roster, SCHEMA_VERSION};

/// Roster file extension
pub const ROSTER_EXTENSION: &str = "strk";

/// Lock file metadata stored in .strk.lock files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (username or email)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Get the hostname of the current machine
fn hostname() -> Option<String> {
    whoami::fallible::hostname()
        .ok()
        .filter(|name| !name.is_empty())
}

/// File lock guard that releases the lock when dropped.
///
/// Uses both:
/// 1. OS-level file locking (via fs2) for process safety
/// 2. .lock file with metadata so a blocked user sees who holds it
#[derive(Debug)]
pub struct FileLock {
    roster_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    /// Lock metadata
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a roster file.
    ///
    /// The roster file itself does not need to exist yet.
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - Lock acquired successfully
    /// * `Err(CalcError::FileLocked)` - Another process holds the lock
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(CalcError::file_locked(
                        path.display().to_string(),
                        format!("{} ({})", existing.user_id, existing.machine),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                warn!(
                    path = %path.display(),
                    holder = %existing.user_id,
                    pid = existing.pid,
                    "taking over stale roster lock"
                );
            }
        }

        // Not truncated until the OS lock is ours, so a live holder's
        // metadata survives a failed attempt
        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| {
                CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        // Non-blocking: a second process fails fast instead of hanging
        if lock_file.try_lock_exclusive().is_err() {
            let (locked_by, locked_at) = match read_lock_info(&lock_path) {
                Ok(existing) => (
                    format!("{} ({})", existing.user_id, existing.machine),
                    existing.locked_at.to_rfc3339(),
                ),
                Err(_) => ("another process".to_string(), "unknown".to_string()),
            };
            return Err(CalcError::file_locked(
                path.display().to_string(),
                locked_by,
                locked_at,
            ));
        }

        lock_file.set_len(0).map_err(|e| {
            CalcError::file_error("reset lock", lock_path.display().to_string(), e.to_string())
        })?;

        let lock_json = serde_json::to_string_pretty(&info)
            .map_err(|e| CalcError::serialization(e.to_string()))?;

        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string())
        })?;

        lock_file.sync_all().map_err(|e| {
            CalcError::file_error("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        debug!(path = %lock_path.display(), "roster lock acquired");

        Ok(FileLock {
            roster_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Check if a file is locked without acquiring the lock.
    ///
    /// Returns `Some(LockInfo)` if locked, `None` if available.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if lock_path.exists() {
            if let Ok(info) = read_lock_info(&lock_path) {
                if !is_lock_stale(&info) {
                    return Some(info);
                }
            }
        }
        None
    }

    /// Get the path to the roster file
    pub fn roster_path(&self) -> &Path {
        &self.roster_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        // OS lock is released when _lock_file is dropped
    }
}

/// Append a suffix to the full file name: `roster.strk` -> `roster.strk.lock`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut out = path.to_path_buf();
    let extension = out
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    out.set_extension(extension);
    out
}

fn lock_path_for(roster_path: &Path) -> PathBuf {
    with_suffix(roster_path, "lock")
}

fn tmp_path_for(roster_path: &Path) -> PathBuf {
    with_suffix(roster_path, "tmp")
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = fs::read_to_string(lock_path).map_err(|e| {
        CalcError::file_error("read lock", lock_path.display().to_string(), e.to_string())
    })?;

    serde_json::from_str(&contents).map_err(|e| CalcError::serialization(e.to_string()))
}

/// A lock is stale when its process is gone (same machine) or it is over a day old.
fn is_lock_stale(info: &LockInfo) -> bool {
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine {
            #[cfg(windows)]
            {
                use std::process::Command;
                let output = Command::new("tasklist")
                    .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                    .output();
                if let Ok(output) = output {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    if stdout.contains("No tasks") || !stdout.contains(&info.pid.to_string()) {
                        return true;
                    }
                }
            }
            #[cfg(unix)]
            {
                if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                    return true;
                }
            }
        }
    }

    let age = Utc::now() - info.locked_at;
    age.num_hours() > 24
}

/// Save a roster to a file with atomic write semantics.
///
/// The save process:
/// 1. Serialize roster to JSON
/// 2. Write to a temporary file (`<name>.tmp`)
/// 3. Sync to disk (fsync)
/// 4. Rename over the target (atomic on most filesystems)
///
/// # Example
///
/// ```rust,no_run
/// use lane_core::file_io::save_roster;
/// use lane_core::roster::Roster;
/// use std::path::Path;
///
/// save_roster(&Roster::new(), Path::new("roster.strk"))?;
/// # Ok::<(), lane_core::errors::CalcError>(())
/// ```
pub fn save_roster(roster: &Roster, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(roster)
        .map_err(|e| CalcError::serialization(e.to_string()))?;

    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    info!(path = %path.display(), bowlers = roster.bowler_count(), "roster saved");
    Ok(())
}

/// Load a roster from a file.
///
/// # Returns
///
/// * `Ok(Roster)` - Successfully loaded roster
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::InvalidInput)` - Duplicate ids or a blank bowler name
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_roster(path: &Path) -> CalcResult<Roster> {
    let mut file = File::open(path)
        .map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    let mut roster: Roster = serde_json::from_str(&contents).map_err(|e| {
        CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e))
    })?;

    validate_version(&roster.meta.version)?;
    roster.validate()?;

    info!(path = %path.display(), bowlers = roster.bowler_count(), "roster loaded");
    Ok(roster)
}

/// Load a roster, or start an empty one when the file does not exist yet.
pub fn load_or_create_roster(path: &Path) -> CalcResult<Roster> {
    match fs::metadata(path) {
        Ok(_) => load_roster(path),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no roster file yet, starting empty");
            Ok(Roster::new())
        }
        Err(e) => Err(CalcError::file_error("stat", path.display().to_string(), e.to_string())),
    }
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // For 0.x versions a newer minor may carry breaking changes
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}
