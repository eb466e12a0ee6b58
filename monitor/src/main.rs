//! inputhook-monitor: prints global keyboard and mouse input.
//!
//! Usage: `inputhook-monitor [config.yaml]`
//!
//! Type `q` (or an empty line) and Enter to stop.

mod config;
mod logging;

use anyhow::{bail, Context};
use config::MonitorConfig;
use inputhook_core::{HookError, InputDispatcher, InputHookEngine, NormalizedInputEvent};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn build_dispatcher(config: &MonitorConfig) -> InputDispatcher {
    let mut dispatcher = InputDispatcher::new()
        .on_key_event(|event: &NormalizedInputEvent| println!("{event}"))
        .on_privilege_check_failed(|prompt_shown| {
            if prompt_shown {
                eprintln!(
                    "Input monitoring is not permitted yet. Grant access in the system \
                     prompt, then restart the monitor."
                );
            } else {
                eprintln!("Input monitoring was just granted; restart the monitor.");
            }
        });

    if config.show_mouse {
        dispatcher = dispatcher
            .on_mouse_down(|button, x, y| println!("MouseDown:{button} at ({x}, {y})"))
            .on_mouse_up(|button, x, y| println!("MouseUp:{button} at ({x}, {y})"));
    }
    if config.show_wheel {
        dispatcher = dispatcher.on_wheel(|dx, dy| println!("Wheel:({dx}, {dy})"));
    }
    dispatcher
}

fn is_quit_command(line: &str) -> bool {
    matches!(line.trim(), "" | "q" | "quit")
}

/// Watch stdin for a quit command. A closed stdin (no terminal) never quits.
fn spawn_quit_listener(quit: Arc<AtomicBool>) {
    let spawned = thread::Builder::new()
        .name("stdin-quit".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) if is_quit_command(&line) => {
                        quit.store(true, Ordering::Release);
                        return;
                    }
                    Ok(_) => {}
                    Err(_) => return,
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!("Quit listener unavailable: {}", e);
    }
}

/// Poll until the hooks go away or `quit` is set. Returns the number of
/// polls made.
fn run(engine: &mut InputHookEngine, interval: Duration, quit: &AtomicBool) -> usize {
    let mut polls = 0;
    while engine.is_running() && !quit.load(Ordering::Acquire) {
        engine.poll_once();
        polls += 1;
        thread::sleep(interval);
    }
    polls
}

fn main() -> anyhow::Result<()> {
    let explicit = std::env::args_os().nth(1).map(PathBuf::from);
    let (config, outcome) = config::load(explicit);

    logging::setup(config.production, &config.log_dir());
    outcome.report();

    config.validate().context("invalid monitor configuration")?;

    let mut engine = InputHookEngine::new(inputhook_platform::create_adapter(config.hook));
    let mut dispatcher = build_dispatcher(&config);

    match dispatcher.enable(&mut engine) {
        Ok(()) => {}
        Err(HookError::PermissionDenied(state)) => {
            bail!("input monitoring not permitted ({state:?})")
        }
        Err(e) => return Err(e).context("failed to start input hooks"),
    }

    engine.set_consumer(Some(Box::new(move |event: &NormalizedInputEvent| {
        dispatcher.dispatch(event)
    })));
    tracing::info!(
        platform = engine.platform(),
        poll_interval_ms = config.poll_interval_ms,
        "Monitoring input; enter q to stop"
    );

    let quit = Arc::new(AtomicBool::new(false));
    spawn_quit_listener(quit.clone());
    let polls = run(
        &mut engine,
        Duration::from_millis(config.poll_interval_ms),
        &quit,
    );

    tracing::info!(polls, "Stopping monitor");
    engine.dispose();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inputhook_core::{EventSink, HookAdapter, HookCategory, HookResult, InstallReport};
    use std::sync::Mutex;

    /// Stays active until stopped; counts stops.
    struct IdleAdapter {
        active: bool,
        stops: Arc<Mutex<usize>>,
    }

    impl HookAdapter for IdleAdapter {
        fn platform(&self) -> &'static str {
            "idle"
        }

        fn start(&mut self, _sink: EventSink) -> HookResult<InstallReport> {
            self.active = true;
            let mut report = InstallReport::default();
            report.record_installed(HookCategory::Keyboard);
            Ok(report)
        }

        fn stop(&mut self) {
            if self.active {
                *self.stops.lock().unwrap() += 1;
            }
            self.active = false;
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    #[test]
    fn test_quit_flag_ends_loop_and_disposes() {
        let stops = Arc::new(Mutex::new(0));
        let adapter = IdleAdapter {
            active: false,
            stops: stops.clone(),
        };
        let mut engine = InputHookEngine::new(Box::new(adapter));
        let mut dispatcher = build_dispatcher(&MonitorConfig::default());
        dispatcher.enable(&mut engine).unwrap();
        assert!(engine.is_running());

        let quit = Arc::new(AtomicBool::new(false));
        let setter = quit.clone();
        let flip = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            setter.store(true, Ordering::Release);
        });
        let polls = run(&mut engine, Duration::from_millis(1), &quit);
        flip.join().unwrap();

        assert!(polls > 0);
        assert!(engine.is_running());
        engine.dispose();
        assert_eq!(*stops.lock().unwrap(), 1);
    }

    #[test]
    fn test_quit_commands() {
        assert!(is_quit_command("q"));
        assert!(is_quit_command("  quit \r"));
        assert!(is_quit_command(""));
        assert!(!is_quit_command("a"));
    }
}
