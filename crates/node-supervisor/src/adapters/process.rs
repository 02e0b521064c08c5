//! Tokio child-process adapter
//!
//! Each launch spawns three tasks: one forwarder per output stream and one
//! waiter that owns the `Child`. Signals reach the waiter through a channel
//! so the child is never shared.

use crate::domain::NodeSignal;
use crate::error::{SupervisorError, SupervisorResult};
use crate::events::{ProcessEvent, ProcessEventSink};
use crate::ports::{LaunchSpec, NodeProcess, ProcessLauncher};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const STDOUT_TAG: &str = "stdout";
const STDERR_TAG: &str = "stderr";

/// Upper bound on waiting for output forwarders after the child exited
const STREAM_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Launches the node with `tokio::process`
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioProcessLauncher;

impl TokioProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for TokioProcessLauncher {
    fn launch(
        &self,
        spec: &LaunchSpec,
        sink: ProcessEventSink,
    ) -> SupervisorResult<Box<dyn NodeProcess>> {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(false);

        let mut child = command.spawn().map_err(|err| SupervisorError::Spawn {
            program: spec.program.display().to_string(),
            reason: err.to_string(),
        })?;
        let pid = child.id();

        let mut forwarders = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            forwarders.push(spawn_stream_forwarder(stdout, sink.clone(), STDOUT_TAG));
        }
        if let Some(stderr) = child.stderr.take() {
            forwarders.push(spawn_stream_forwarder(stderr, sink.clone(), STDERR_TAG));
        }

        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        tokio::spawn(wait_for_exit(child, signal_rx, forwarders, sink));

        Ok(Box::new(TokioNodeProcess { pid, signal_tx }))
    }
}

/// Handle to a process spawned by [`TokioProcessLauncher`]
pub struct TokioNodeProcess {
    pid: Option<u32>,
    signal_tx: mpsc::UnboundedSender<NodeSignal>,
}

impl NodeProcess for TokioNodeProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn kill(&mut self, signal: NodeSignal) -> SupervisorResult<()> {
        self.signal_tx
            .send(signal)
            .map_err(|_| SupervisorError::Signal {
                signal: signal.name(),
                reason: "node process already exited".to_string(),
            })
    }
}

fn spawn_stream_forwarder(
    stream: impl AsyncRead + Unpin + Send + 'static,
    sink: ProcessEventSink,
    tag: &'static str,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let chunk = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\r', '\n'])
                        .to_string();
                    let event = match tag {
                        STDERR_TAG => ProcessEvent::Stderr(chunk),
                        _ => ProcessEvent::Stdout(chunk),
                    };
                    if !sink.emit(event) {
                        break;
                    }
                }
                Err(err) => {
                    warn!(generation = sink.generation(), stream = tag, "Failed to read node output: {err}");
                    break;
                }
            }
        }
    })
}

async fn wait_for_exit(
    mut child: Child,
    mut signals: mpsc::UnboundedReceiver<NodeSignal>,
    forwarders: Vec<JoinHandle<()>>,
    sink: ProcessEventSink,
) {
    let generation = sink.generation();
    let mut last_signal = None;

    let status = loop {
        tokio::select! {
            status = child.wait() => break status,
            Some(signal) = signals.recv() => {
                last_signal = Some(signal);
                match deliver_signal(&mut child, signal) {
                    Ok(()) => debug!(generation, %signal, "Signal delivered"),
                    Err(err) => warn!(generation, %signal, "Failed to signal node process: {err}"),
                }
            }
        }
    };

    for forwarder in forwarders {
        if tokio::time::timeout(STREAM_DRAIN_GRACE, forwarder).await.is_err() {
            debug!(generation, "Output stream still open after exit");
        }
    }

    match status {
        Ok(status) => {
            let code = status.code();
            let signal = exit_signal(&status, last_signal);
            info!(generation, ?code, ?signal, "Node process exited");
            sink.emit(ProcessEvent::Exited { code, signal });
        }
        Err(err) => {
            sink.emit(ProcessEvent::RuntimeError(format!(
                "await node process exit: {err}"
            )));
        }
    }
}

#[cfg(unix)]
fn deliver_signal(child: &mut Child, signal: NodeSignal) -> std::io::Result<()> {
    use std::io::{Error, ErrorKind};

    let id = child
        .id()
        .ok_or_else(|| Error::new(ErrorKind::Other, "child process is not running"))?;
    let result = unsafe { libc::kill(id as libc::pid_t, signal.as_raw()) };
    if result == 0 {
        Ok(())
    } else {
        Err(Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn deliver_signal(child: &mut Child, _signal: NodeSignal) -> std::io::Result<()> {
    child.start_kill()
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus, _requested: Option<NodeSignal>) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

// Without POSIX signals the requested one stands in for the terminating one.
#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus, requested: Option<NodeSignal>) -> Option<i32> {
    requested.map(NodeSignal::as_raw)
}
