//! The Xorg process under test.
//!
//! One server is started per case:
//!
//! ```text
//! Xorg :133 -config /tmp/evdev-driver-xkb.conf -logfile /tmp/Xorg-evdev-driver-xkb.log \
//!      -noreset -nolisten tcp [extra args]
//! ```
//!
//! The server accepts connections only once it has read its config and
//! initialised its devices, so [`XorgServer::start`] polls `XOpenDisplay`
//! until it succeeds, the process exits, or the startup timeout expires.
//!
//! A display that answers is only ours if our child still runs and owns the
//! display lock (`/tmp/.X<N>-lock`).  A live server already holding the lock
//! is refused before anything is spawned.
//!
//! Stopping sends `SIGTERM` (Xorg removes its lock file and restores the VT
//! on TERM, not on KILL) and falls back to `SIGKILL` if the process does not
//! exit in time.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{display::xlib::XlibDisplay, settings::ServerSettings};
use crate::application::session::{DisplayConnection, RunningServer};

/// Interval between connection attempts while the server starts.
const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// How long a terminated server gets to exit before it is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
/// Where Xorg writes `.X<N>-lock`.
const LOCK_DIR: &str = "/tmp";

/// Error type for starting the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("display :{display} is held by a running server (pid {pid}, {})", .lock.display())]
    DisplayInUse {
        display: u32,
        pid: libc::pid_t,
        lock: PathBuf,
    },

    #[error("server exited during startup ({status}); see {}", .log.display())]
    Exited { status: String, log: PathBuf },

    #[error("display {display} not ready after {timeout_ms} ms; see {}", .log.display())]
    Timeout {
        display: String,
        timeout_ms: u64,
        log: PathBuf,
    },

    #[error("waiting for server: {0}")]
    Io(#[from] std::io::Error),
}

fn lock_path(lock_dir: &Path, display: u32) -> PathBuf {
    lock_dir.join(format!(".X{display}-lock"))
}

/// Reads the pid from a lock file: ten right-aligned digits and a newline.
fn read_lock_pid(path: &Path) -> Option<libc::pid_t> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn process_alive(pid: libc::pid_t) -> bool {
    // SAFETY: signal 0 only performs the existence and permission checks.
    if unsafe { libc::kill(pid, 0) } == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// Pid of a live process holding the lock for `display`, if any.
///
/// Stale locks left by a crashed server are ignored; Xorg replaces them.
fn lock_holder(lock_dir: &Path, display: u32) -> Option<libc::pid_t> {
    let pid = read_lock_pid(&lock_path(lock_dir, display))?;
    (pid > 0 && process_alive(pid)).then_some(pid)
}

/// The child process; terminated and reaped on drop.
struct XorgProcess {
    child: Child,
    display_name: String,
}

impl XorgProcess {
    fn terminate(&mut self) {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                warn!(display = %self.display_name, %status, "server already exited");
                return;
            }
            Ok(None) => {}
            Err(e) => warn!(display = %self.display_name, error = %e, "cannot poll server"),
        }

        match libc::pid_t::try_from(self.child.id()) {
            // SAFETY: kill(2) has no memory-safety preconditions; the pid is
            // our own unreaped child.
            Ok(pid) => unsafe {
                libc::kill(pid, libc::SIGTERM);
            },
            Err(_) => {
                let _ = self.child.kill();
            }
        }

        let deadline = Instant::now() + SHUTDOWN_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    debug!(display = %self.display_name, %status, "server stopped");
                    return;
                }
                Ok(None) if Instant::now() < deadline => std::thread::sleep(POLL_INTERVAL),
                Ok(None) | Err(_) => break,
            }
        }

        warn!(display = %self.display_name, "server ignored SIGTERM, killing");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for XorgProcess {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// A running server with an open client connection.
pub struct XorgServer {
    // Field order matters: the connection must close before the process is
    // terminated, or every shutdown is logged as a lost connection.
    display: XlibDisplay,
    _process: XorgProcess,
}

impl XorgServer {
    /// Starts the server for a config already written to `config_path`.
    ///
    /// # Errors
    ///
    /// [`ServerError::DisplayInUse`] if another server holds the display,
    /// [`ServerError::Spawn`] if the binary cannot be executed,
    /// [`ServerError::Exited`] if it exits before accepting connections,
    /// [`ServerError::Timeout`] if it does not accept them in time.
    pub fn start(
        settings: &ServerSettings,
        config_path: &Path,
        log_path: &Path,
    ) -> Result<Self, ServerError> {
        Self::start_with_lock_dir(settings, config_path, log_path, Path::new(LOCK_DIR))
    }

    fn start_with_lock_dir(
        settings: &ServerSettings,
        config_path: &Path,
        log_path: &Path,
        lock_dir: &Path,
    ) -> Result<Self, ServerError> {
        let display_name = settings.display_name();
        let lock = lock_path(lock_dir, settings.display);
        if let Some(pid) = lock_holder(lock_dir, settings.display) {
            error!(display = %display_name, pid, lock = %lock.display(), "display already in use");
            return Err(ServerError::DisplayInUse {
                display: settings.display,
                pid,
                lock,
            });
        }

        let mut command = Command::new(&settings.binary);
        command
            .arg(&display_name)
            .arg("-config")
            .arg(config_path)
            .arg("-logfile")
            .arg(log_path)
            .args(["-noreset", "-nolisten", "tcp"])
            .args(&settings.extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        debug!(?command, "spawning server");

        let child = command.spawn().map_err(|source| ServerError::Spawn {
            binary: settings.binary.clone(),
            source,
        })?;
        let mut process = XorgProcess {
            child,
            display_name: display_name.clone(),
        };

        let exited = |status: std::process::ExitStatus| {
            error!(display = %display_name, %status, log = %log_path.display(), "server exited");
            ServerError::Exited {
                status: status.to_string(),
                log: log_path.to_path_buf(),
            }
        };

        let started = Instant::now();
        let timeout = settings.startup_timeout();
        loop {
            if let Some(status) = process.child.try_wait()? {
                return Err(exited(status));
            }
            if let Ok(display) = XlibDisplay::open(&display_name) {
                // The answer may come from a server that grabbed the display
                // while ours was failing to start.
                if let Some(status) = process.child.try_wait()? {
                    return Err(exited(status));
                }
                let owner = read_lock_pid(&lock);
                if owner.is_some_and(|pid| u32::try_from(pid).ok() != Some(process.child.id())) {
                    debug!(display = %display_name, ?owner, "display answered by another server");
                    drop(display);
                    std::thread::sleep(POLL_INTERVAL);
                    continue;
                }
                info!(
                    display = %display_name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "server ready"
                );
                return Ok(Self {
                    display,
                    _process: process,
                });
            }
            if started.elapsed() >= timeout {
                return Err(ServerError::Timeout {
                    display: display_name.clone(),
                    timeout_ms: settings.startup_timeout_ms,
                    log: log_path.to_path_buf(),
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

impl RunningServer for XorgServer {
    fn display(&mut self) -> &mut dyn DisplayConnection {
        &mut self.display
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_a_spawn_error() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = ServerSettings {
            binary: dir.path().join("no-such-xorg").display().to_string(),
            ..ServerSettings::default()
        };

        // Act
        let result = XorgServer::start_with_lock_dir(
            &settings,
            &dir.path().join("test.conf"),
            &dir.path().join("Xorg-test.log"),
            dir.path(),
        );

        // Assert
        assert!(matches!(result, Err(ServerError::Spawn { .. })));
    }

    #[test]
    fn test_early_exit_names_the_log_file() {
        // `false` exits immediately with status 1, like a server rejecting its config.
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = ServerSettings {
            binary: "false".to_string(),
            startup_timeout_ms: 5_000,
            ..ServerSettings::default()
        };
        let log = dir.path().join("Xorg-evdev-driver-mouse.log");

        let result =
            XorgServer::start_with_lock_dir(&settings, &dir.path().join("test.conf"), &log, dir.path());

        match result {
            Err(err @ ServerError::Exited { .. }) => {
                assert!(err.to_string().contains("Xorg-evdev-driver-mouse.log"), "{err}");
            }
            Err(other) => panic!("expected early exit, got {other}"),
            Ok(_) => panic!("`false` cannot serve a display"),
        }
    }

    #[test]
    fn test_lock_file_pid_is_parsed_from_padded_text() {
        // Arrange: Xorg writes the pid as "%10d\n"
        let dir = tempfile::tempdir().expect("tempdir");
        let path = lock_path(dir.path(), 133);
        std::fs::write(&path, "      4242\n").expect("write lock");

        // Act / Assert
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(".X133-lock"));
        assert_eq!(read_lock_pid(&path), Some(4242));
        assert_eq!(read_lock_pid(&dir.path().join(".X1-lock")), None);
    }

    #[test]
    fn test_display_without_lock_is_free() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(lock_holder(dir.path(), 133), None);
    }

    #[test]
    fn test_stale_lock_of_a_dead_process_is_ignored() {
        // Arrange: a pid that has exited and been reaped
        let dir = tempfile::tempdir().expect("tempdir");
        let mut child = Command::new("true").spawn().expect("spawn true");
        let pid = child.id();
        child.wait().expect("reap true");
        std::fs::write(lock_path(dir.path(), 133), format!("{pid:>10}\n")).expect("write lock");

        // Act / Assert
        assert_eq!(lock_holder(dir.path(), 133), None);
    }

    #[test]
    fn test_live_lock_holder_refuses_to_start() {
        // Arrange: the lock names this (running) test process
        let dir = tempfile::tempdir().expect("tempdir");
        let own_pid = std::process::id();
        std::fs::write(lock_path(dir.path(), 133), format!("{own_pid:>10}\n")).expect("write lock");
        let settings = ServerSettings {
            binary: "false".to_string(),
            ..ServerSettings::default()
        };

        // Act
        let result = XorgServer::start_with_lock_dir(
            &settings,
            &dir.path().join("test.conf"),
            &dir.path().join("Xorg-test.log"),
            dir.path(),
        );

        // Assert: refused before `false` could run and report Exited
        match result {
            Err(ServerError::DisplayInUse { display, pid, .. }) => {
                assert_eq!(display, 133);
                assert_eq!(u32::try_from(pid).ok(), Some(own_pid));
            }
            Err(other) => panic!("expected display in use, got {other}"),
            Ok(_) => panic!("`false` cannot serve a display"),
        }
    }
}
