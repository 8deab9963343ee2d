// src/process.rs

use crate::error::{Error, Result};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use serde::Deserialize;
use std::fmt;
use std::io::Read;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One external command invocation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Step {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Step {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Step {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<Path>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Output of a finished step
#[derive(Debug, Clone)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Runs a step to completion and fails unless it exits with status zero.
///
/// `timeout` of `None` waits forever. Each step runs in its own process
/// group; a step still running at the deadline has the whole group killed
/// and is reported as [`Error::ProcessTimeout`].
pub fn run_step(step: &Step, cwd: Option<&Path>, timeout: Option<Duration>) -> Result<Captured> {
    let mut command = Command::new(&step.program);
    command
        .args(&step.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    debug!(step = %step, cwd = ?cwd.map(PathBuf::from), "running");

    let mut child = command.spawn().map_err(|source| Error::ProcessSpawn {
        step: step.to_string(),
        source,
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let status = match wait(&mut child, step, timeout) {
        Ok(status) => status,
        Err(e) => {
            // Pipes close once the group is gone, so the readers finish.
            let _ = stdout.join();
            let _ = stderr.join();
            return Err(e);
        }
    };
    let captured = Captured {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    };

    if !captured.status.success() {
        return Err(Error::ProcessFailed {
            step: step.to_string(),
            status: captured.status,
            stderr: captured.stderr.trim().to_string(),
        });
    }
    Ok(captured)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf) {
                debug!(error = %e, read = buf.len(), "child pipe read failed");
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn wait(child: &mut Child, step: &Step, timeout: Option<Duration>) -> Result<ExitStatus> {
    let Some(limit) = timeout else {
        return Ok(child.wait()?);
    };

    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let group = Pid::from_raw(child.id() as i32);
            if let Err(errno) = killpg(group, Signal::SIGKILL) {
                debug!(step = %step, %errno, "killpg failed, killing child only");
                let _ = child.kill();
            }
            let _ = child.wait();
            return Err(Error::ProcessTimeout {
                step: step.to_string(),
                after: limit,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}
