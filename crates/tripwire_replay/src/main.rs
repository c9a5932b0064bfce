//! Tripwire Replay
//!
//! Loads a scenario (trigger volume config plus a scripted contact timeline)
//! and replays it step by step, logging every notification the volume raises.
//!
//! Run with: cargo run -p tripwire_replay -- scenario.json

mod scenario;

use scenario::{replay, Scenario};
use std::process::ExitCode;
use tripwire_triggers::TriggerEventType;

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: tripwire-replay <scenario.json>");
        return ExitCode::from(2);
    };

    let scenario = match Scenario::load(&path) {
        Ok(scenario) => scenario,
        Err(e) => {
            log::error!("{}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Replaying {} contacts over {:.2}s in {:.3}s steps",
        scenario.contacts.len(),
        scenario.duration,
        scenario.step
    );

    let report = replay(&scenario);

    let count = |event_type| {
        report
            .events
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    };
    log::info!(
        "Replay finished: {} enter, {} stay, {} exit, {} feedback changes",
        count(TriggerEventType::Enter),
        count(TriggerEventType::Stay),
        count(TriggerEventType::Exit),
        report.feedback_changes.len()
    );

    ExitCode::SUCCESS
}
