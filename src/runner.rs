//! Running the external programs (curl, unzip, rm).

use std::{
    io::{self, Read},
    process::{Command, Output, Stdio},
    sync::{
        mpsc::{self, Receiver},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use log::{debug, warn};
use wait_timeout::ChildExt;

use crate::error::ObtainError;

/// Exit code and captured output of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

pub trait CommandRunner {
    /// Run `program` with `args`, block until it exits and return its output.
    /// A non-zero exit is not an error here, callers look at the code.
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ObtainError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ObtainError> {
        (**self).run(program, args)
    }
}

/// Runs programs with [`std::process::Command`].
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    pub timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new(timeout: Option<Duration>) -> SystemRunner {
        SystemRunner { timeout }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ObtainError> {
        debug!("running {} {}", program, args.join(" "));
        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null());

        let Some(timeout) = self.timeout else {
            let output = cmd.output().map_err(|e| launch_error(program, e))?;
            return Ok(output.into());
        };

        let mut child = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| launch_error(program, e))?;
        // Read both pipes while waiting, a child blocked on a full pipe never exits.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + timeout;
        let status = match child
            .wait_timeout(timeout)
            .map_err(|e| launch_error(program, e))?
        {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                warn!("killed {} after {:?}", program, timeout);
                return Err(ObtainError::Timeout {
                    program: program.to_string(),
                    after: timeout,
                });
            }
        };

        Ok(CommandOutput {
            code: status.code(),
            stdout: stdout.collect(deadline),
            stderr: stderr.collect(deadline),
        })
    }
}

fn launch_error(program: &str, source: io::Error) -> ObtainError {
    ObtainError::Launch {
        program: program.to_string(),
        source,
    }
}

/// A pipe being read on its own thread.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

impl Drain {
    /// What was read so far, waiting at most until `deadline` for the end of the
    /// stream.  A background grandchild can hold the pipe open after the child
    /// itself has exited.
    fn collect(self, deadline: Instant) -> String {
        let _ = self
            .done
            .recv_timeout(deadline.saturating_duration_since(Instant::now()));
        let buf = self.buf.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let (tx, done) = mpsc::channel();
    let shared = Arc::clone(&buf);
    thread::spawn(move || {
        if let Some(mut pipe) = pipe {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => match shared.lock() {
                        Ok(mut b) => b.extend_from_slice(&chunk[..n]),
                        Err(_) => break,
                    },
                }
            }
        }
        let _ = tx.send(());
    });
    Drain { buf, done }
}
