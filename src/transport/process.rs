use std::ffi::OsString;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;

use parking_lot::Mutex;

use super::{EngineTransport, LineHandler, TransportError, TransportEvent};

struct Running {
    child: Child,
    stdin: ChildStdin,
}

/// Runs a UCI engine executable as a child process.
///
/// Lines go to the child's stdin; a reader thread delivers its stdout.
pub struct ProcessTransport {
    program: PathBuf,
    args: Vec<OsString>,
    running: Mutex<Option<Running>>,
}

impl ProcessTransport {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ProcessTransport {
            program: program.into(),
            args: Vec::new(),
            running: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Take the child's pipes and start the reader thread. On any failure the
    /// child is killed and reaped before the error is returned.
    fn attach(&self, child: &mut Child, handler: LineHandler) -> Result<ChildStdin, TransportError> {
        let attached = self.start_reader(child, handler);
        if let Err(e) = &attached {
            log::warn!("engine process {} unusable: {e}", self.program_name());
            reap(child);
        }
        attached
    }

    fn start_reader(&self, child: &mut Child, handler: LineHandler) -> Result<ChildStdin, TransportError> {
        let spawn_failed = |reason: &str| TransportError::Spawn {
            program: self.program_name(),
            reason: reason.to_string(),
        };
        let stdin = child.stdin.take().ok_or_else(|| spawn_failed("no stdin pipe"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_failed("no stdout pipe"))?;

        thread::Builder::new()
            .name("engine-reader".to_string())
            .spawn(move || {
                let reader = BufReader::new(stdout);
                for line in reader.lines() {
                    match line {
                        Ok(line) => handler(TransportEvent::Line(line)),
                        Err(e) => {
                            handler(TransportEvent::Closed {
                                reason: e.to_string(),
                            });
                            return;
                        }
                    }
                }
                handler(TransportEvent::Closed {
                    reason: "end of engine output".to_string(),
                });
            })
            .map_err(TransportError::from)?;
        Ok(stdin)
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl EngineTransport for ProcessTransport {
    fn open(&self, handler: LineHandler) -> Result<(), TransportError> {
        self.close();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| TransportError::Spawn {
                program: self.program_name(),
                reason: e.to_string(),
            })?;
        let stdin = self.attach(&mut child, handler)?;

        log::debug!("started engine process {}", self.program_name());
        *self.running.lock() = Some(Running { child, stdin });
        Ok(())
    }

    fn post_line(&self, line: &str) -> Result<(), TransportError> {
        let mut running = self.running.lock();
        let running = running.as_mut().ok_or(TransportError::NotOpen)?;
        running.stdin.write_all(line.as_bytes())?;
        running.stdin.write_all(b"\n")?;
        running.stdin.flush()?;
        Ok(())
    }

    fn close(&self) {
        let running = self.running.lock().take();
        if let Some(Running { mut child, stdin }) = running {
            drop(stdin);
            reap(&mut child);
            log::debug!("stopped engine process {}", self.program_name());
        }
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_missing_program_is_spawn_error() {
        let transport = ProcessTransport::new("/nonexistent/uci-engine-binary");
        let err = transport.open(Arc::new(|_| {})).unwrap_err();
        assert!(matches!(err, TransportError::Spawn { .. }));
        assert_eq!(transport.post_line("uci"), Err(TransportError::NotOpen));
    }

    #[cfg(unix)]
    #[test]
    fn test_unattachable_child_is_reaped() {
        let transport = ProcessTransport::new("sleep");
        let mut child = Command::new("sleep")
            .arg("30")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .unwrap();

        let err = transport.attach(&mut child, Arc::new(|_| {})).unwrap_err();
        assert!(matches!(err, TransportError::Spawn { .. }));
        // Already waited for: the exit status is available without blocking.
        assert!(child.try_wait().unwrap().is_some());
        assert!(transport.running.lock().is_none());
    }
}
