//! Recording fakes for driving the supervisor without real processes.

#![allow(dead_code)]

use node_supervisor::adapters::InMemoryStore;
use node_supervisor::ports::{
    DiagnosticPresenter, LaunchSpec, LifecycleHooks, NodeProcess, ProcessLauncher, UiGateway,
};
use node_supervisor::{
    Generation, NodeConfig, NodeSignal, ProcessEvent, ProcessEventSink, ResolvedLaunch,
    Supervisor, SupervisorError, SupervisorEvent, SupervisorOptions, SupervisorPorts,
    SupervisorResult,
};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use wallet_ipc::{SupervisorMessage, UiCommand};

/// Every observable side effect, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Launched { generation: Generation, args: Vec<String> },
    Signal { generation: Generation, signal: NodeSignal },
    Ui(SupervisorMessage),
    Reload,
    Dialog { title: String, detail: String },
    Error { message: String, tag: Option<String> },
    Close,
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Effect>>>);

impl Recorder {
    pub fn push(&self, effect: Effect) {
        self.0.lock().push(effect);
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.0.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&Effect) -> bool) -> usize {
        self.0.lock().iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

#[derive(Clone)]
pub struct FakeLauncher {
    recorder: Recorder,
    sinks: Arc<Mutex<Vec<ProcessEventSink>>>,
    fail_next: Arc<AtomicBool>,
}

impl FakeLauncher {
    pub fn fail_next_launch(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn sink(&self, generation: Generation) -> ProcessEventSink {
        self.sinks
            .lock()
            .iter()
            .find(|sink| sink.generation() == generation)
            .cloned()
            .expect("no launch with that generation")
    }

    pub fn launches(&self) -> usize {
        self.sinks.lock().len()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(
        &self,
        spec: &LaunchSpec,
        sink: ProcessEventSink,
    ) -> SupervisorResult<Box<dyn NodeProcess>> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SupervisorError::Spawn {
                program: spec.program.display().to_string(),
                reason: "No such file or directory".to_string(),
            });
        }
        let generation = sink.generation();
        self.recorder.push(Effect::Launched {
            generation,
            args: spec.args.clone(),
        });
        self.sinks.lock().push(sink);
        Ok(Box::new(FakeProcess {
            generation,
            recorder: self.recorder.clone(),
        }))
    }
}

struct FakeProcess {
    generation: Generation,
    recorder: Recorder,
}

impl NodeProcess for FakeProcess {
    fn pid(&self) -> Option<u32> {
        Some(4000 + self.generation as u32)
    }

    fn kill(&mut self, signal: NodeSignal) -> SupervisorResult<()> {
        self.recorder.push(Effect::Signal {
            generation: self.generation,
            signal,
        });
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeUi(Recorder);

impl UiGateway for FakeUi {
    fn send(&self, message: SupervisorMessage) {
        self.0.push(Effect::Ui(message));
    }

    fn request_reload(&self) {
        self.0.push(Effect::Reload);
    }
}

#[derive(Clone)]
pub struct FakePresenter(Recorder);

impl DiagnosticPresenter for FakePresenter {
    fn show_error(&self, title: &str, detail: &str) {
        self.0.push(Effect::Dialog {
            title: title.to_string(),
            detail: detail.to_string(),
        });
    }
}

#[derive(Clone)]
pub struct FakeHooks(Recorder);

impl LifecycleHooks for FakeHooks {
    fn on_close(&self) {
        self.0.push(Effect::Close);
    }

    fn on_error(&self, error: &SupervisorError, tag: Option<&str>) {
        self.0.push(Effect::Error {
            message: error.to_string(),
            tag: tag.map(str::to_string),
        });
    }
}

pub type TestSupervisor = Supervisor<FakeLauncher, InMemoryStore, FakeUi, FakePresenter, FakeHooks>;

pub struct Harness {
    pub supervisor: TestSupervisor,
    pub recorder: Recorder,
    pub store: InMemoryStore,
    pub launcher: FakeLauncher,
}

pub fn options() -> SupervisorOptions {
    SupervisorOptions {
        program: PathBuf::from("/opt/wallet/node/full-node"),
        working_dir: None,
        wallet_version: "0.1.0".to_string(),
        node_version: "0.9.30".to_string(),
    }
}

impl Harness {
    pub fn new(config: NodeConfig) -> Self {
        Self::with_launch(ResolvedLaunch {
            config,
            wipe_required: false,
            api_port: None,
        })
    }

    pub fn with_launch(launch: ResolvedLaunch) -> Self {
        let recorder = Recorder::default();
        let store = InMemoryStore::new();
        let launcher = FakeLauncher {
            recorder: recorder.clone(),
            sinks: Arc::default(),
            fail_next: Arc::default(),
        };
        let ports = SupervisorPorts {
            launcher: launcher.clone(),
            store: store.clone(),
            ui: FakeUi(recorder.clone()),
            presenter: FakePresenter(recorder.clone()),
            hooks: FakeHooks(recorder.clone()),
        };
        Self {
            supervisor: Supervisor::new(ports, launch, options()),
            recorder,
            store,
            launcher,
        }
    }

    /// Launch and forget the launch effect.
    pub fn started(config: NodeConfig) -> Self {
        let mut harness = Self::new(config);
        harness.supervisor.init().expect("launch");
        harness.recorder.clear();
        harness
    }

    pub fn command(&mut self, command: UiCommand) {
        self.supervisor.handle_event(SupervisorEvent::Command(command));
    }

    pub fn ui_ready(&mut self) {
        self.supervisor.handle_event(SupervisorEvent::UiReady);
    }

    /// Emit through the launch's sink and process everything queued.
    pub fn emit(&mut self, generation: Generation, event: ProcessEvent) {
        assert!(self.launcher.sink(generation).emit(event));
        self.supervisor.drain_pending();
    }

    pub fn exit(&mut self, generation: Generation, code: Option<i32>, signal: Option<i32>) {
        self.emit(generation, ProcessEvent::Exited { code, signal });
    }
}
