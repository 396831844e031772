//! Container runtime discovery for the Postgres-backed tests.

use anyhow::{Result, bail};
use std::{
    env,
    os::unix::net::UnixStream,
    path::{Path, PathBuf},
    sync::OnceLock,
    thread,
    time::{Duration, Instant},
};

const SOCKET_WAIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Make sure testcontainers can reach a Docker-compatible socket, pointing
/// `DOCKER_HOST` at Podman when only Podman is available.
///
/// # Errors
/// Returns an error when no reachable socket exists; callers skip the test.
pub(crate) fn ensure_container_runtime() -> Result<()> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();
    match INIT.get_or_init(init_container_runtime) {
        Ok(()) => Ok(()),
        Err(message) => bail!("{message}"),
    }
}

fn init_container_runtime() -> Result<(), String> {
    if let Ok(docker_host) = env::var("DOCKER_HOST") {
        return match docker_host.strip_prefix("unix://") {
            Some(path) if !wait_for_socket(Path::new(path)) => Err(format!(
                "`DOCKER_HOST` points to `{docker_host}`, but the socket is not accepting connections."
            )),
            _ => Ok(()),
        };
    }

    if wait_for_socket(Path::new("/var/run/docker.sock")) {
        return Ok(());
    }

    if let Some(path) = podman_sockets().into_iter().find(|path| wait_for_socket(path)) {
        let docker_host = format!("unix://{}", path.display());
        // SAFETY: set once during test setup, before any container starts.
        unsafe {
            env::set_var("DOCKER_HOST", docker_host);
        }
        return Ok(());
    }

    Err("No container runtime socket found. Start Docker or `podman.socket`, or set `DOCKER_HOST`.".to_string())
}

fn podman_sockets() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(runtime_dir) = env::var("XDG_RUNTIME_DIR") {
        candidates.push(PathBuf::from(runtime_dir).join("podman/podman.sock"));
    }
    candidates.push(PathBuf::from("/run/podman/podman.sock"));
    candidates
}

fn wait_for_socket(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    let start = Instant::now();
    while start.elapsed() < SOCKET_WAIT_TIMEOUT {
        if UnixStream::connect(path).is_ok() {
            return true;
        }
        thread::sleep(Duration::from_millis(200));
    }
    false
}
