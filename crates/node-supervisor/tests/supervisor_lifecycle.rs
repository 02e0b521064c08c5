//! Supervisor state machine driven through recording fakes.

mod support;

use node_supervisor::ports::SettingsStore;
use node_supervisor::{
    NodeConfig, NodeSignal, ProcessEvent, ResolvedLaunch, SupervisorExit, SupervisorState,
    RUNTIME_ERROR_TAG, SPAWN_ERROR_TAG,
};
use support::{Effect, Harness};
use wallet_ipc::{Chain, ConfigPatch, SupervisorMessage, UiCommand};

fn main_config() -> NodeConfig {
    NodeConfig::default()
}

fn is_dialog(e: &Effect) -> bool {
    matches!(e, Effect::Dialog { .. })
}

fn is_error(e: &Effect) -> bool {
    matches!(e, Effect::Error { .. })
}

fn is_close(e: &Effect) -> bool {
    matches!(e, Effect::Close)
}

// =============================================================================
// LAUNCH
// =============================================================================

#[test]
fn test_init_consumes_wipe_flags_and_records_wipe() {
    let mut harness = Harness::new(NodeConfig {
        wipe: true,
        wipe_full: true,
        ..main_config()
    });

    harness.supervisor.init().unwrap();

    assert_eq!(
        harness.recorder.effects(),
        vec![Effect::Launched {
            generation: 1,
            args: vec!["--wipe".into(), "full".into(), "--chain".into(), "main".into()],
        }]
    );
    assert!(!harness.supervisor.config().wipe);
    assert!(!harness.supervisor.config().wipe_full);
    assert_eq!(harness.supervisor.state(), SupervisorState::Running);

    let record = harness.store.last_wipe().expect("wipe record");
    assert_eq!(record.node_version, "0.9.30");
    assert_eq!(record.wallet_version, "0.1.0");
}

#[test]
fn test_plain_wipe_args() {
    let mut harness = Harness::new(NodeConfig {
        wipe: true,
        ..main_config()
    });
    harness.supervisor.init().unwrap();

    assert_eq!(
        harness.recorder.effects(),
        vec![Effect::Launched {
            generation: 1,
            args: vec!["--wipe".into(), "--chain".into(), "main".into()],
        }]
    );
}

#[test]
fn test_launch_without_wipe_leaves_record_untouched() {
    let mut harness = Harness::new(main_config());
    harness.supervisor.init().unwrap();

    assert!(harness.store.last_wipe().is_none());
    assert_eq!(harness.supervisor.pid(), Some(4001));
}

#[test]
fn test_api_port_reaches_args() {
    let mut harness = Harness::with_launch(ResolvedLaunch {
        config: NodeConfig {
            net: Chain::Local,
            ..main_config()
        },
        wipe_required: false,
        api_port: Some(31567),
    });
    harness.supervisor.init().unwrap();

    assert_eq!(
        harness.recorder.effects(),
        vec![Effect::Launched {
            generation: 1,
            args: vec![
                "--chain".into(),
                "local".into(),
                "--api".into(),
                "127.0.0.1:31567".into()
            ],
        }]
    );
}

#[test]
fn test_spawn_failure_runs_fatal_path() {
    let mut harness = Harness::new(NodeConfig {
        wipe: true,
        ..main_config()
    });
    harness.launcher.fail_next_launch();

    assert!(harness.supervisor.init().is_err());

    let effects = harness.recorder.effects();
    assert_eq!(effects.len(), 3);
    assert!(matches!(
        &effects[0],
        Effect::Dialog { title, detail }
            if title.ends_with("(Wallet will shutdown)") && detail == "No such file or directory"
    ));
    assert!(matches!(
        &effects[1],
        Effect::Error { tag: Some(tag), .. } if tag == SPAWN_ERROR_TAG
    ));
    assert_eq!(effects[2], Effect::Close);

    assert_eq!(harness.supervisor.state(), SupervisorState::Failed);
    assert_eq!(harness.supervisor.finished(), Some(SupervisorExit::Failed));
    assert!(!harness.supervisor.is_process_live());
    // Nothing launched, so nothing was wiped.
    assert!(harness.store.last_wipe().is_none());
    assert!(harness.supervisor.config().wipe);
}

// =============================================================================
// OUTPUT
// =============================================================================

#[test]
fn test_stdout_forwarded_and_buffered() {
    let mut harness = Harness::started(main_config());

    harness.emit(1, ProcessEvent::Stdout("block 1".into()));
    harness.emit(1, ProcessEvent::Stderr("peer dropped".into()));

    assert_eq!(
        harness.recorder.effects(),
        vec![Effect::Ui(SupervisorMessage::Log("block 1".into()))]
    );
    assert_eq!(
        harness.supervisor.log_snapshot(),
        vec!["block 1".to_string(), "peer dropped".to_string()]
    );
}

#[test]
fn test_log_buffer_bounded_across_streams() {
    let mut harness = Harness::started(main_config());

    for i in 0..150 {
        let event = if i % 2 == 0 {
            ProcessEvent::Stdout(format!("line {i}"))
        } else {
            ProcessEvent::Stderr(format!("line {i}"))
        };
        harness.emit(1, event);
    }

    let snapshot = harness.supervisor.log_snapshot();
    assert_eq!(snapshot.len(), 100);
    assert_eq!(snapshot.first().map(String::as_str), Some("line 50"));
    assert_eq!(snapshot.last().map(String::as_str), Some("line 149"));
}

// =============================================================================
// RESTART / SHUTDOWN
// =============================================================================

#[test]
fn test_restart_with_chain_reloads_without_init() {
    let mut harness = Harness::started(main_config());

    harness.command(UiCommand::Restart(ConfigPatch::chain(Chain::Test)));

    assert_eq!(
        harness.recorder.effects(),
        vec![
            Effect::Signal {
                generation: 1,
                signal: NodeSignal::Restart
            },
            Effect::Reload,
        ]
    );
    assert_eq!(harness.store.chain().as_deref(), Some("test"));
    assert_eq!(harness.launcher.launches(), 1);
    assert_eq!(harness.supervisor.state(), SupervisorState::Reloading);
    assert_eq!(harness.supervisor.config().net, Chain::Test);

    // Still waiting for the old process.
    assert_eq!(harness.supervisor.finished(), None);
    harness.exit(1, None, Some(9));
    assert_eq!(harness.supervisor.finished(), Some(SupervisorExit::Reload));
}

#[test]
fn test_restart_with_same_chain_still_reloads() {
    let mut harness = Harness::started(main_config());

    harness.command(UiCommand::Restart(ConfigPatch::chain(Chain::Main)));

    assert_eq!(harness.recorder.count(|e| *e == Effect::Reload), 1);
    assert_eq!(harness.launcher.launches(), 1);
}

#[test]
fn test_chain_switch_marks_handle_reload_requested() {
    let mut harness = Harness::started(main_config());
    let handle = harness.supervisor.handle();
    assert!(!handle.reload_requested());

    harness.command(UiCommand::Restart(ConfigPatch::chain(Chain::Test)));
    assert!(handle.reload_requested());
}

#[test]
fn test_plain_restart_does_not_request_reload() {
    let mut harness = Harness::started(main_config());
    harness.command(UiCommand::Restart(ConfigPatch::default()));
    assert!(!harness.supervisor.handle().reload_requested());
}

#[test]
fn test_node_closing_on_its_own_during_reload_keeps_reloading() {
    let mut harness = Harness::started(main_config());
    harness.command(UiCommand::Restart(ConfigPatch::chain(Chain::Test)));
    harness.recorder.clear();

    // Signal delivery failed and the node exited normally instead.
    harness.exit(1, Some(0), None);

    assert_eq!(harness.supervisor.state(), SupervisorState::Reloading);
    assert_eq!(harness.supervisor.finished(), Some(SupervisorExit::Reload));
    assert!(harness.recorder.effects().is_empty());
}

#[test]
fn test_node_failing_during_reload_is_not_fatal() {
    let mut harness = Harness::started(main_config());
    harness.command(UiCommand::Restart(ConfigPatch::chain(Chain::Test)));
    harness.recorder.clear();

    harness.exit(1, Some(1), None);

    assert_eq!(harness.supervisor.state(), SupervisorState::Reloading);
    assert_eq!(harness.supervisor.finished(), Some(SupervisorExit::Reload));
    assert_eq!(harness.recorder.count(is_dialog), 0);
    assert_eq!(harness.recorder.count(is_close), 0);
}

#[test]
fn test_restart_without_chain_relaunches_with_merged_config() {
    let mut harness = Harness::started(NodeConfig {
        net: Chain::Test,
        ..main_config()
    });

    harness.command(UiCommand::Restart(ConfigPatch::mining(true)));

    assert_eq!(
        harness.recorder.effects(),
        vec![
            Effect::Signal {
                generation: 1,
                signal: NodeSignal::Restart
            },
            Effect::Launched {
                generation: 2,
                args: vec!["--miner".into(), "--chain".into(), "test".into()],
            },
        ]
    );
    assert!(harness.supervisor.config().is_mining);
    assert_eq!(harness.supervisor.state(), SupervisorState::Running);
    assert_eq!(harness.store.chain(), None);
}

#[test]
fn test_restart_with_wipe_patch_records_wipe_again() {
    let mut harness = Harness::started(main_config());

    harness.command(UiCommand::Restart(ConfigPatch {
        wipe_full: Some(true),
        ..ConfigPatch::default()
    }));

    assert!(harness.recorder.effects().contains(&Effect::Launched {
        generation: 2,
        args: vec!["--wipe".into(), "full".into(), "--chain".into(), "main".into()],
    }));
    assert!(harness.store.last_wipe().is_some());
    assert!(!harness.supervisor.config().wipe_full);
}

#[test]
fn test_restart_handler_is_one_shot_until_next_launch() {
    let mut harness = Harness::started(main_config());

    harness.command(UiCommand::Restart(ConfigPatch::chain(Chain::Local)));
    harness.command(UiCommand::Restart(ConfigPatch::chain(Chain::Test)));

    assert_eq!(harness.recorder.count(|e| matches!(e, Effect::Signal { .. })), 1);
    assert_eq!(harness.store.chain().as_deref(), Some("local"));
}

#[test]
fn test_commands_before_launch_are_ignored() {
    let mut harness = Harness::new(main_config());

    harness.command(UiCommand::Restart(ConfigPatch::mining(true)));
    harness.command(UiCommand::Shutdown(ConfigPatch::default()));

    assert!(harness.recorder.effects().is_empty());
    assert!(!harness.supervisor.config().is_mining);
}

#[test]
fn test_shutdown_then_normal_exit_closes() {
    let mut harness = Harness::started(main_config());

    harness.command(UiCommand::Shutdown(ConfigPatch::default()));
    assert_eq!(
        harness.recorder.effects(),
        vec![Effect::Signal {
            generation: 1,
            signal: NodeSignal::Shutdown
        }]
    );
    assert_eq!(harness.supervisor.state(), SupervisorState::ShuttingDown);

    harness.exit(1, Some(0), None);

    assert_eq!(harness.recorder.count(is_close), 1);
    assert_eq!(harness.recorder.count(is_error), 0);
    assert_eq!(harness.supervisor.finished(), Some(SupervisorExit::Closed));
}

#[test]
fn test_shutdown_merges_patch() {
    let mut harness = Harness::started(main_config());

    harness.command(UiCommand::Shutdown(ConfigPatch::chain(Chain::Local)));

    assert_eq!(harness.supervisor.config().net, Chain::Local);
    assert_eq!(harness.store.chain(), None);
}

#[test]
fn test_quit_signals_even_after_shutdown_handler_fired() {
    let mut harness = Harness::started(main_config());
    harness.command(UiCommand::Shutdown(ConfigPatch::default()));
    harness.recorder.clear();

    harness.supervisor.handle_event(node_supervisor::SupervisorEvent::Quit);

    assert_eq!(
        harness.recorder.effects(),
        vec![Effect::Signal {
            generation: 1,
            signal: NodeSignal::Shutdown
        }]
    );
}

#[test]
fn test_quit_without_process_finishes() {
    let mut harness = Harness::new(main_config());
    harness.supervisor.handle_event(node_supervisor::SupervisorEvent::Quit);
    assert_eq!(harness.supervisor.finished(), Some(SupervisorExit::Closed));
}

#[test]
fn test_quit_during_reload_keeps_reloading() {
    let mut harness = Harness::started(main_config());
    harness.command(UiCommand::Restart(ConfigPatch::chain(Chain::Test)));
    assert_eq!(harness.supervisor.state(), SupervisorState::Reloading);

    harness.supervisor.handle_event(node_supervisor::SupervisorEvent::Quit);
    assert_eq!(harness.supervisor.state(), SupervisorState::Reloading);

    harness.exit(1, None, Some(9));
    assert_eq!(harness.supervisor.finished(), Some(SupervisorExit::Reload));
}

#[test]
fn test_killed_node_after_quit_closes() {
    let mut harness = Harness::started(main_config());
    harness.supervisor.handle_event(node_supervisor::SupervisorEvent::Quit);

    harness.exit(1, None, Some(9));

    assert_eq!(harness.recorder.count(is_close), 1);
    assert_eq!(harness.supervisor.finished(), Some(SupervisorExit::Closed));
}

#[test]
fn test_overlapping_rearm_counted() {
    let mut harness = Harness::started(main_config());
    assert_eq!(harness.supervisor.overlapping_rearms(), 0);

    // Restart fires, shutdown is still armed when the relaunch re-arms it.
    harness.command(UiCommand::Restart(ConfigPatch::mining(true)));

    assert_eq!(harness.supervisor.overlapping_rearms(), 1);
}

// =============================================================================
// EXITS
// =============================================================================

#[test]
fn test_crash_runs_fatal_path_once() {
    let mut harness = Harness::started(main_config());
    harness.ui_ready();
    harness.emit(1, ProcessEvent::Stdout("boom".into()));
    harness.recorder.clear();

    harness.exit(1, Some(1), None);

    let effects = harness.recorder.effects();
    assert_eq!(harness.recorder.count(is_dialog), 1);
    assert_eq!(harness.recorder.count(is_error), 1);
    assert_eq!(harness.recorder.count(is_close), 0);
    assert!(effects.contains(&Effect::Ui(SupervisorMessage::FatalExit(vec![
        "boom".into()
    ]))));
    assert!(matches!(
        effects.last(),
        Some(Effect::Error { message, tag: None }) if message.contains("boom")
    ));
    assert_eq!(harness.supervisor.state(), SupervisorState::Crashed);
    assert_eq!(harness.supervisor.finished(), Some(SupervisorExit::Crashed));
}

#[test]
fn test_restart_signal_exit_triggers_nothing() {
    let mut harness = Harness::started(main_config());

    harness.exit(1, Some(1), Some(9));

    assert_eq!(harness.recorder.count(is_dialog), 0);
    assert_eq!(harness.recorder.count(is_error), 0);
    assert_eq!(harness.recorder.count(is_close), 0);
    assert!(!harness.supervisor.is_process_live());
}

#[test]
fn test_other_exit_code_is_normal_close() {
    let mut harness = Harness::started(main_config());

    harness.exit(1, Some(137), None);

    assert_eq!(harness.recorder.effects(), vec![Effect::Close]);
    assert_eq!(harness.supervisor.state(), SupervisorState::ClosedNormally);
}

#[test]
fn test_stale_exit_does_not_touch_current_process() {
    let mut harness = Harness::started(main_config());
    harness.command(UiCommand::Restart(ConfigPatch::mining(true)));
    harness.recorder.clear();

    // Old process reports its kill after the relaunch.
    harness.exit(1, None, Some(9));
    assert!(harness.supervisor.is_process_live());
    assert_eq!(harness.supervisor.state(), SupervisorState::Running);

    // A stale crash is ignored too.
    harness.exit(1, Some(1), None);
    assert!(harness.recorder.effects().is_empty());
    assert_eq!(harness.supervisor.generation(), 2);
    assert!(harness.supervisor.is_process_live());
}

#[test]
fn test_runtime_error_uses_runtime_tag() {
    let mut harness = Harness::started(main_config());

    harness.emit(1, ProcessEvent::RuntimeError("pipe broken".into()));

    let effects = harness.recorder.effects();
    assert!(matches!(
        &effects[0],
        Effect::Dialog { detail, .. } if detail == "pipe broken"
    ));
    assert!(matches!(
        &effects[1],
        Effect::Error { tag: Some(tag), message } if tag == RUNTIME_ERROR_TAG && message.contains("pipe broken")
    ));
    assert_eq!(effects[2], Effect::Close);
    assert_eq!(harness.supervisor.state(), SupervisorState::Failed);
}

// =============================================================================
// UI QUEUE
// =============================================================================

#[test]
fn test_fatal_exit_queued_until_ui_ready() {
    let mut harness = Harness::started(main_config());
    harness.emit(1, ProcessEvent::Stderr("panic".into()));

    harness.exit(1, Some(1), None);

    let fatal = Effect::Ui(SupervisorMessage::FatalExit(vec!["panic".into()]));
    assert!(!harness.recorder.effects().contains(&fatal));
    assert_eq!(harness.supervisor.pending_outbound(), 1);
    // Waits for the UI before finishing.
    assert_eq!(harness.supervisor.finished(), None);

    harness.ui_ready();
    harness.ui_ready();

    assert_eq!(harness.recorder.count(|e| *e == fatal), 1);
    assert_eq!(harness.supervisor.finished(), Some(SupervisorExit::Crashed));
}

#[test]
fn test_messages_after_ready_sent_immediately() {
    let mut harness = Harness::started(main_config());
    harness.ui_ready();

    harness.exit(1, Some(1), None);

    assert!(harness
        .recorder
        .effects()
        .contains(&Effect::Ui(SupervisorMessage::FatalExit(vec![]))));
    assert_eq!(harness.supervisor.pending_outbound(), 0);
}

#[test]
fn test_wipe_status_answered_once() {
    let mut harness = Harness::with_launch(ResolvedLaunch {
        config: NodeConfig {
            wipe: true,
            ..main_config()
        },
        wipe_required: true,
        api_port: None,
    });

    harness.command(UiCommand::AskWipeStatus);
    harness.supervisor.init().unwrap();
    harness.command(UiCommand::AskWipeStatus);

    let answers = harness
        .recorder
        .count(|e| matches!(e, Effect::Ui(SupervisorMessage::WipeStatusAnswer(true))));
    assert_eq!(answers, 1);
    assert!(harness.supervisor.wipe_required());
}

#[test]
fn test_start_only_when_no_process() {
    let mut harness = Harness::new(main_config());

    harness.command(UiCommand::Start);
    harness.command(UiCommand::Start);

    assert_eq!(harness.launcher.launches(), 1);
    assert_eq!(harness.supervisor.state(), SupervisorState::Running);
}

// =============================================================================
// RUN LOOP
// =============================================================================

#[tokio::test]
async fn test_run_returns_after_normal_close() {
    let harness = Harness::new(main_config());
    let launcher = harness.launcher.clone();
    let handle = harness.supervisor.handle();
    let task = tokio::spawn(harness.supervisor.run());

    while launcher.launches() == 0 {
        tokio::task::yield_now().await;
    }
    handle.ui_ready();
    launcher.sink(1).emit(ProcessEvent::Exited {
        code: Some(0),
        signal: None,
    });

    let exit = tokio::time::timeout(std::time::Duration::from_secs(5), task)
        .await
        .expect("run did not finish")
        .unwrap();
    assert_eq!(exit, SupervisorExit::Closed);
    assert_eq!(exit.exit_code(), 0);
}

#[tokio::test]
async fn test_run_returns_reload_after_signalled_exit() {
    let harness = Harness::new(main_config());
    let launcher = harness.launcher.clone();
    let store = harness.store.clone();
    let handle = harness.supervisor.handle();
    let task = tokio::spawn(harness.supervisor.run());

    while launcher.launches() == 0 {
        tokio::task::yield_now().await;
    }
    handle.command(UiCommand::Restart(ConfigPatch::chain(Chain::Local)));
    launcher.sink(1).emit(ProcessEvent::Exited {
        code: None,
        signal: Some(9),
    });

    let exit = tokio::time::timeout(std::time::Duration::from_secs(5), task)
        .await
        .expect("run did not finish")
        .unwrap();
    assert_eq!(exit, SupervisorExit::Reload);
    assert_eq!(store.chain().as_deref(), Some("local"));
}
