//! Supervisor Service - node lifecycle orchestration
//!
//! The supervisor owns the current node process, the launch configuration,
//! the log buffer and the outbound queue. All state changes happen inside
//! [`Supervisor::handle_event`], one event at a time.

use crate::domain::{
    build_args, classify_exit, ExitClass, LogBuffer, NodeConfig, NodeSignal, ResolvedLaunch,
    SupervisorState, WipeRecord,
};
use crate::error::{SupervisorError, SupervisorResult};
use crate::events::{Generation, ProcessEvent, ProcessEventSink, SupervisorEvent, SupervisorHandle};
use crate::metrics;
use crate::ports::{
    DiagnosticPresenter, LaunchSpec, LifecycleHooks, NodeProcess, ProcessLauncher, SettingsStore,
    UiGateway,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;
use wallet_ipc::{ConfigPatch, Delivery, OutboundQueue, SupervisorMessage, UiCommand};

/// Failure callback tag for spawn errors
pub const SPAWN_ERROR_TAG: &str = "node: spawn";

/// Failure callback tag for process runtime errors
pub const RUNTIME_ERROR_TAG: &str = "node: runtime";

/// Where the node lives and which versions are being run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupervisorOptions {
    pub program: PathBuf,
    pub working_dir: Option<PathBuf>,
    /// Recorded in the wipe record
    pub wallet_version: String,
    /// Recorded in the wipe record
    pub node_version: String,
}

/// External collaborators of one supervisor
pub struct SupervisorPorts<L, S, U, D, H> {
    pub launcher: L,
    pub store: S,
    pub ui: U,
    pub presenter: D,
    pub hooks: H,
}

/// Why [`Supervisor::run`] returned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SupervisorExit {
    /// The UI reloads; the application builds a fresh supervisor
    Reload,
    /// The node closed without error
    Closed,
    /// The node exited with code 1
    Crashed,
    /// Spawn or runtime error
    Failed,
}

impl SupervisorExit {
    /// Exit code for the hosting process
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Reload | Self::Closed => 0,
            Self::Crashed | Self::Failed => 1,
        }
    }
}

/// The live node process and what has been asked of it
struct LiveProcess {
    generation: Generation,
    process: Box<dyn NodeProcess>,
    signalled: Option<NodeSignal>,
}

/// One-shot restart and shutdown handlers, re-armed by every launch
#[derive(Debug, Default)]
struct HandlerArms {
    restart: bool,
    shutdown: bool,
    /// Launches that found a handler still armed
    overlapping_rearms: u64,
}

impl HandlerArms {
    fn rearm(&mut self) -> bool {
        let overlapped = self.restart || self.shutdown;
        if overlapped {
            self.overlapping_rearms += 1;
        }
        self.restart = true;
        self.shutdown = true;
        overlapped
    }
}

/// Node process supervisor
pub struct Supervisor<L, S, U, D, H> {
    session: Uuid,
    ports: SupervisorPorts<L, S, U, D, H>,
    options: SupervisorOptions,
    config: NodeConfig,
    api_port: Option<u16>,
    wipe_required: bool,
    wipe_status_answered: bool,
    state: SupervisorState,
    current: Option<LiveProcess>,
    generation: Generation,
    log: LogBuffer,
    outbound: OutboundQueue,
    arms: HandlerArms,
    quit_requested: bool,
    reload_requested: Arc<AtomicBool>,
    events_tx: mpsc::UnboundedSender<SupervisorEvent>,
    events_rx: mpsc::UnboundedReceiver<SupervisorEvent>,
}

impl<L, S, U, D, H> Supervisor<L, S, U, D, H>
where
    L: ProcessLauncher,
    S: SettingsStore,
    U: UiGateway,
    D: DiagnosticPresenter,
    H: LifecycleHooks,
{
    /// Create a supervisor. Nothing is launched until [`Self::init`].
    pub fn new(
        ports: SupervisorPorts<L, S, U, D, H>,
        launch: ResolvedLaunch,
        options: SupervisorOptions,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let session = Uuid::new_v4();
        info!(
            %session,
            net = %launch.config.net,
            wipe_required = launch.wipe_required,
            "Supervisor created"
        );
        Self {
            session,
            ports,
            options,
            config: launch.config,
            api_port: launch.api_port,
            wipe_required: launch.wipe_required,
            wipe_status_answered: false,
            state: SupervisorState::Idle,
            current: None,
            generation: 0,
            log: LogBuffer::new(),
            outbound: OutboundQueue::new(),
            arms: HandlerArms::default(),
            quit_requested: false,
            reload_requested: Arc::default(),
            events_tx,
            events_rx,
        }
    }

    /// Handle for feeding commands and notifications in.
    pub fn handle(&self) -> SupervisorHandle {
        SupervisorHandle::new(self.events_tx.clone(), Arc::clone(&self.reload_requested))
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn wipe_required(&self) -> bool {
        self.wipe_required
    }

    /// Generation of the most recent launch attempt
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_process_live(&self) -> bool {
        self.current.is_some()
    }

    pub fn pid(&self) -> Option<u32> {
        self.current.as_ref().and_then(|live| live.process.pid())
    }

    pub fn log_snapshot(&self) -> Vec<String> {
        self.log.snapshot()
    }

    pub fn pending_outbound(&self) -> usize {
        self.outbound.pending_len()
    }

    /// Launches that re-armed a handler that had not fired yet
    pub fn overlapping_rearms(&self) -> u64 {
        self.arms.overlapping_rearms
    }

    /// Launch the node with the current configuration.
    ///
    /// Any previous process handle is replaced. On failure the fatal path
    /// has already run when this returns.
    pub fn init(&mut self) -> SupervisorResult<()> {
        self.state = SupervisorState::Launching;
        self.generation += 1;
        let generation = self.generation;

        let spec = LaunchSpec {
            program: self.options.program.clone(),
            args: build_args(&self.config, self.api_port),
            working_dir: self.options.working_dir.clone(),
        };
        info!(
            generation,
            program = %spec.program.display(),
            args = ?spec.args,
            "Launching node"
        );

        let sink = ProcessEventSink::new(generation, self.events_tx.clone());
        let process = match self.ports.launcher.launch(&spec, sink) {
            Ok(process) => process,
            Err(err) => {
                self.fail(&err, SPAWN_ERROR_TAG);
                return Err(err);
            }
        };
        metrics::record_node_launch();
        info!(generation, pid = ?process.pid(), "Node launched");

        if self.config.needs_wipe() {
            self.record_wipe();
        }
        self.config.clear_wipe_flags();

        if self.arms.rearm() {
            debug!(
                overlapping = self.arms.overlapping_rearms,
                "Launch re-armed handlers that had not fired"
            );
        }

        self.current = Some(LiveProcess {
            generation,
            process,
            signalled: None,
        });
        self.state = SupervisorState::Running;
        Ok(())
    }

    /// The transition function.
    pub fn handle_event(&mut self, event: SupervisorEvent) {
        match event {
            SupervisorEvent::Command(command) => self.on_command(command),
            SupervisorEvent::UiReady => self.on_ui_ready(),
            SupervisorEvent::Quit => self.on_quit(),
            SupervisorEvent::Process { generation, event } => {
                self.on_process_event(generation, event)
            }
        }
    }

    /// Handle every event already waiting in the channel.
    pub fn drain_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Whether the supervisor is done, and why.
    pub fn finished(&self) -> Option<SupervisorExit> {
        let outbound_settled = self.outbound.pending_len() == 0 || self.quit_requested;
        match self.state {
            SupervisorState::Reloading if self.current.is_none() => Some(SupervisorExit::Reload),
            SupervisorState::ClosedNormally => Some(SupervisorExit::Closed),
            SupervisorState::Crashed if outbound_settled => Some(SupervisorExit::Crashed),
            SupervisorState::Failed if outbound_settled => Some(SupervisorExit::Failed),
            _ => None,
        }
    }

    /// Launch if idle, then process events until finished.
    pub async fn run(mut self) -> SupervisorExit {
        let span = info_span!("supervisor", session = %self.session);
        async move {
            if self.state == SupervisorState::Idle {
                // Failures are fully handled by the fatal path.
                let _ = self.init();
            }
            loop {
                if let Some(exit) = self.finished() {
                    info!(?exit, "Supervisor finished");
                    return exit;
                }
                match self.events_rx.recv().await {
                    Some(event) => self.handle_event(event),
                    None => return SupervisorExit::Closed,
                }
            }
        }
        .instrument(span)
        .await
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    fn on_command(&mut self, command: UiCommand) {
        debug!(kind = command.kind().as_str(), "UI command received");
        match command {
            UiCommand::AskWipeStatus => self.on_ask_wipe_status(),
            UiCommand::Start => self.on_start(),
            UiCommand::Restart(patch) => self.on_restart(patch),
            UiCommand::Shutdown(patch) => self.on_shutdown(patch),
        }
    }

    fn on_ask_wipe_status(&mut self) {
        if self.wipe_status_answered {
            debug!("Wipe status already answered, ignoring");
            return;
        }
        self.wipe_status_answered = true;
        self.ports
            .ui
            .send(SupervisorMessage::WipeStatusAnswer(self.wipe_required));
    }

    fn on_start(&mut self) {
        if self.current.is_some() {
            info!("Start requested while node is running, ignoring");
            return;
        }
        if self.state == SupervisorState::Reloading {
            info!("Start requested during reload, ignoring");
            return;
        }
        let _ = self.init();
    }

    fn on_restart(&mut self, patch: ConfigPatch) {
        if !self.arms.restart {
            warn!("Restart requested but handler is not armed, ignoring");
            return;
        }
        if self.current.is_none() {
            warn!("Restart requested with no node process, ignoring");
            return;
        }
        self.arms.restart = false;
        metrics::record_restart();

        self.config.merge(&patch);
        self.state = SupervisorState::Restarting;
        self.signal_current(NodeSignal::Restart);

        match patch.net {
            Some(net) => {
                info!(%net, "Chain changed, reloading UI");
                if let Err(err) = self.ports.store.set_chain(net) {
                    error!(error = %err, "Failed to persist chain selection");
                }
                self.state = SupervisorState::Reloading;
                self.reload_requested.store(true, Ordering::Release);
                self.ports.ui.request_reload();
            }
            None => {
                let _ = self.init();
            }
        }
    }

    fn on_shutdown(&mut self, patch: ConfigPatch) {
        if !self.arms.shutdown {
            warn!("Shutdown requested but handler is not armed, ignoring");
            return;
        }
        if self.current.is_none() {
            warn!("Shutdown requested with no node process, ignoring");
            return;
        }
        self.arms.shutdown = false;

        self.config.merge(&patch);
        self.state = SupervisorState::ShuttingDown;
        self.signal_current(NodeSignal::Shutdown);
    }

    fn on_ui_ready(&mut self) {
        let ui = &self.ports.ui;
        let flushed = self.outbound.mark_ready(|message| ui.send(message));
        info!(flushed, "UI ready");
    }

    fn on_quit(&mut self) {
        self.quit_requested = true;
        if self.current.is_some() {
            info!("Application quitting, stopping node");
            // A reloading node is already going down.
            if !self.state.is_terminal() && self.state != SupervisorState::Reloading {
                self.state = SupervisorState::ShuttingDown;
            }
            self.signal_current(NodeSignal::Shutdown);
        } else if !self.state.is_terminal() {
            info!("Application quitting with no node process");
            self.state = SupervisorState::ClosedNormally;
        }
    }

    // =========================================================================
    // PROCESS EVENTS
    // =========================================================================

    fn on_process_event(&mut self, generation: Generation, event: ProcessEvent) {
        let is_current = self
            .current
            .as_ref()
            .is_some_and(|live| live.generation == generation);

        match event {
            ProcessEvent::Stdout(chunk) => {
                metrics::record_log_line("stdout");
                debug!(target: "node_stdout", generation, "{}", chunk);
                self.log.append(chunk.clone());
                self.ports.ui.send(SupervisorMessage::Log(chunk));
            }
            ProcessEvent::Stderr(chunk) => {
                metrics::record_log_line("stderr");
                warn!(target: "node_stderr", generation, "{}", chunk);
                self.log.append(chunk);
            }
            ProcessEvent::Exited { code, signal } => self.on_exit(generation, is_current, code, signal),
            ProcessEvent::RuntimeError(reason) => {
                if !is_current {
                    warn!(generation, %reason, "Runtime error from replaced node process, ignoring");
                    return;
                }
                let err = SupervisorError::ProcessRuntime { reason };
                self.fail(&err, RUNTIME_ERROR_TAG);
            }
        }
    }

    fn on_exit(
        &mut self,
        generation: Generation,
        is_current: bool,
        code: Option<i32>,
        signal: Option<i32>,
    ) {
        let class = classify_exit(code, signal);
        metrics::record_node_exit(class.as_str());

        if is_current {
            let signalled = self.current.take().and_then(|live| live.signalled);
            debug!(generation, ?signalled, class = class.as_str(), "Current node process exited");
            if self.state == SupervisorState::Reloading {
                info!(generation, ?code, ?signal, "Node exited while UI reloads");
                return;
            }
        } else if class != ExitClass::IntentionalRestart {
            info!(generation, ?code, ?signal, "Stale exit from replaced node process, ignoring");
            return;
        }

        match class {
            ExitClass::IntentionalRestart => {
                info!(generation, "Node restarted through UI");
                if is_current && !self.state.is_terminal() {
                    if self.quit_requested {
                        self.state = SupervisorState::ClosedNormally;
                        self.ports.hooks.on_close();
                    } else {
                        self.state = SupervisorState::Idle;
                    }
                }
            }
            ExitClass::Crash => self.on_crash(),
            ExitClass::NormalClose => {
                info!(generation, ?code, ?signal, "Node closed");
                self.state = SupervisorState::ClosedNormally;
                self.ports.hooks.on_close();
            }
        }
    }

    fn on_crash(&mut self) {
        error!("Node non zero exit code");
        self.state = SupervisorState::Crashed;
        self.ports.presenter.show_error(
            "Node uncaught error",
            "Non zero exit code (app will shutdown)",
        );

        let snapshot = self.log.snapshot();
        let logs = snapshot.join("\n");
        let ui = &self.ports.ui;
        let delivery = self
            .outbound
            .dispatch(SupervisorMessage::FatalExit(snapshot), |message| ui.send(message));
        if delivery == Delivery::Queued {
            metrics::record_outbound_queued();
            debug!("Fatal exit queued until UI ready");
        }

        self.ports
            .hooks
            .on_error(&SupervisorError::NodeCrashed { logs }, None);
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn fail(&mut self, err: &SupervisorError, tag: &str) {
        error!(error = %err, tag, "Node failure");
        self.state = SupervisorState::Failed;
        self.current = None;
        self.ports
            .presenter
            .show_error(&format!("{err} (Wallet will shutdown)"), &err.detail());
        self.ports.hooks.on_error(err, Some(tag));
        self.ports.hooks.on_close();
    }

    fn signal_current(&mut self, signal: NodeSignal) {
        let Some(live) = self.current.as_mut() else {
            warn!(%signal, error = %SupervisorError::NoProcess, "Signal not sent");
            return;
        };
        info!(generation = live.generation, %signal, "Signalling node");
        live.signalled = Some(signal);
        if let Err(err) = live.process.kill(signal) {
            warn!(generation = live.generation, error = %err, "Signal delivery failed");
        }
    }

    fn record_wipe(&mut self) {
        let record = WipeRecord::now(&self.options.wallet_version, &self.options.node_version);
        info!(
            full = self.config.wipe_full,
            node_version = %record.node_version,
            "Launching with data wipe"
        );
        metrics::record_wipe();
        if let Err(err) = self.ports.store.record_wipe(&record) {
            error!(error = %err, "Failed to persist wipe record");
        }
    }
}
