use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use tempfile::TempDir;

/// Temporary directory holding shell scripts and the log files they append
/// to.
///
/// Commands are split on whitespace, so scripts are invoked as
/// `sh /tmp/.tmpXXXX/name.sh`; temp dirs never contain spaces.
pub struct ScriptDir {
    dir: TempDir,
}

impl ScriptDir {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a log file inside the directory (not created).
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `body` to `name` and return the command line that runs it.
    pub fn script(&self, name: &str, body: &str) -> io::Result<String> {
        let path = self.dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
        Ok(format!("sh {}", path.display()))
    }

    /// Script appending `line` to `log` and exiting with `code`.
    pub fn append_script(&self, name: &str, log: &str, line: &str, code: i32) -> io::Result<String> {
        let log = self.file(log);
        self.script(name, &format!("echo {line} >> {}\nexit {code}", log.display()))
    }

    /// Long-lived script: appends `line` to `log`, records its pid in
    /// `pidfile`, then sleeps.
    pub fn server_script(&self, name: &str, log: &str, line: &str, pidfile: &str) -> io::Result<String> {
        let log = self.file(log);
        let pidfile = self.file(pidfile);
        self.script(
            name,
            &format!(
                "echo {line} >> {}\necho $$ > {}\nexec sleep 30",
                log.display(),
                pidfile.display()
            ),
        )
    }
}

/// Number of lines in `path` equal to `needle`; 0 if the file is missing.
pub fn count_lines(path: &Path, needle: &str) -> usize {
    fs::read_to_string(path)
        .map(|s| s.lines().filter(|l| l.trim() == needle).count())
        .unwrap_or(0)
}

/// Poll until `path` has at least `expected` lines equal to `needle`.
pub async fn wait_for_lines(path: &Path, needle: &str, expected: usize) -> bool {
    for _ in 0..200 {
        if count_lines(path, needle) >= expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}

/// Poll until `path` exists and holds a pid.
pub async fn wait_for_pid(path: &Path) -> Option<u32> {
    for _ in 0..200 {
        if let Ok(s) = fs::read_to_string(path) {
            if let Ok(pid) = s.trim().parse() {
                return Some(pid);
            }
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    None
}

/// True if no process with this pid exists (or it is a zombie).
pub fn process_gone(pid: u32) -> bool {
    if let Ok(stat) = fs::read_to_string(format!("/proc/{pid}/stat")) {
        // Third field is the state; the comm field before it may contain spaces.
        if let Some(rest) = stat.rsplit(')').next() {
            if rest.trim_start().starts_with('Z') {
                return true;
            }
        }
    }
    matches!(kill(Pid::from_raw(pid as i32), None), Err(Errno::ESRCH))
}

/// Poll until [`process_gone`] holds for `pid`.
pub async fn wait_until_gone(pid: u32) -> bool {
    for _ in 0..200 {
        if process_gone(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}
