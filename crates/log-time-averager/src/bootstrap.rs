use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name of the single-instance lock.
pub const LOCK_FILE_NAME: &str = "log-time-averager.lock";

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a Python-style level name to a tracing filter directive.
///
/// Unknown names pass through lowercased; [`setup_logging`] falls back to
/// `"info"` when the result is not a valid directive.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// All output goes to stderr so that the report on stdout stays parseable.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}

// ── Single-instance lock ───────────────────────────────────────────────────────

/// Directory holding the lock file: the runtime dir, else the cache dir,
/// else the system temp dir.
pub fn default_lock_dir() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
}

/// Exclusive claim on the lock file, released when dropped.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    /// Create the lock file in `dir`, failing if another live instance holds
    /// it. A lock left behind by a process that no longer exists is taken
    /// over.
    pub fn acquire(dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create lock directory {}", dir.display()))?;

        let path = dir.join(LOCK_FILE_NAME);
        let mut file = match create_lock_file(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if let Some(pid) = read_lock_owner(&path).filter(|pid| is_pid_alive(*pid)) {
                    anyhow::bail!(
                        "another instance is already running (pid {}, lock file {})",
                        pid,
                        path.display()
                    );
                }
                tracing::warn!("Removing stale lock {}", path.display());
                std::fs::remove_file(&path)
                    .with_context(|| format!("failed to remove stale lock {}", path.display()))?;
                create_lock_file(&path)
            }
            other => other,
        }
        .with_context(|| format!("failed to create lock file {}", path.display()))?;

        writeln!(file, "{}", std::process::id())
            .with_context(|| format!("failed to write lock file {}", path.display()))?;

        tracing::debug!("Acquired instance lock {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn create_lock_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

/// PID recorded in an existing lock file, if it can be read.
fn read_lock_owner(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Check whether a process with the given PID is still running.
///
/// `kill(pid, 0)` probes for existence without delivering a signal; EPERM
/// means the process exists under another user.
#[cfg(unix)]
fn is_pid_alive(pid: u32) -> bool {
    // 0 and values above i32::MAX address process groups, not one process.
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if pid <= 0 {
        return false;
    }
    // SAFETY: signal 0 performs the permission and existence check only.
    let ret = unsafe { libc::kill(pid, 0) };
    if ret == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// Without a portable probe, a recorded owner is assumed to be alive.
#[cfg(not(unix))]
fn is_pid_alive(_pid: u32) -> bool {
    true
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── level_directive ───────────────────────────────────────────────────────

    #[test]
    fn test_level_directive_maps_python_names() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("info"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("ERROR"), "error");
        assert_eq!(level_directive("CRITICAL"), "error");
        assert_eq!(level_directive("TRACE"), "trace");
    }

    // ── InstanceLock ──────────────────────────────────────────────────────────

    #[test]
    fn test_lock_acquire_and_release() {
        let tmp = TempDir::new().expect("tempdir");
        let lock_path = tmp.path().join(LOCK_FILE_NAME);

        {
            let lock = InstanceLock::acquire(tmp.path()).expect("acquire");
            assert_eq!(lock.path(), lock_path);
            assert!(lock_path.exists(), "lock file must exist while held");
        }

        assert!(!lock_path.exists(), "lock file must be gone after drop");
    }

    #[test]
    fn test_lock_rejects_second_instance() {
        let tmp = TempDir::new().expect("tempdir");
        let _first = InstanceLock::acquire(tmp.path()).expect("acquire");

        let err = InstanceLock::acquire(tmp.path()).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("already running"), "got: {msg}");
        assert!(msg.contains(&std::process::id().to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_lock_takes_over_from_dead_process() {
        let tmp = TempDir::new().expect("tempdir");
        let lock_path = tmp.path().join(LOCK_FILE_NAME);

        let mut child = std::process::Command::new("true").spawn().expect("spawn");
        let dead_pid = child.id();
        child.wait().expect("wait");
        assert!(!is_pid_alive(dead_pid));
        std::fs::write(&lock_path, format!("{}\n", dead_pid)).unwrap();

        let lock = InstanceLock::acquire(tmp.path()).expect("stale lock is taken over");
        let content = std::fs::read_to_string(lock.path()).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
    }

    #[test]
    fn test_lock_takes_over_unreadable_owner() {
        let tmp = TempDir::new().expect("tempdir");
        std::fs::write(tmp.path().join(LOCK_FILE_NAME), "not a pid").unwrap();

        assert!(InstanceLock::acquire(tmp.path()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_is_pid_alive_rejects_group_ids() {
        assert!(is_pid_alive(std::process::id()));
        assert!(!is_pid_alive(0));
        assert!(!is_pid_alive(u32::MAX));
    }

    #[test]
    fn test_lock_can_be_reacquired_after_release() {
        let tmp = TempDir::new().expect("tempdir");
        drop(InstanceLock::acquire(tmp.path()).expect("first"));
        let second = InstanceLock::acquire(tmp.path());
        assert!(second.is_ok());
    }

    #[test]
    fn test_lock_creates_missing_directory() {
        let tmp = TempDir::new().expect("tempdir");
        let nested = tmp.path().join("run").join("averager");
        let lock = InstanceLock::acquire(&nested).expect("acquire");
        assert!(lock.path().starts_with(&nested));
    }

    #[test]
    fn test_lock_records_pid() {
        let tmp = TempDir::new().expect("tempdir");
        let lock = InstanceLock::acquire(tmp.path()).expect("acquire");
        let content = std::fs::read_to_string(lock.path()).expect("read");
        assert_eq!(content.trim(), std::process::id().to_string());
    }
}
