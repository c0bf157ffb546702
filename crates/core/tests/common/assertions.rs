//! Assertion helpers over run progress events.

use rk_protocol::{RunEvent, RunState};
use tokio::sync::mpsc;

/// Drain every event currently buffered in the channel.
#[allow(dead_code)]
pub fn drain_events(rx: &mut mpsc::Receiver<RunEvent>) -> Vec<RunEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Iteration numbers of every `IterationFinished` event, in order.
#[allow(dead_code)]
pub fn finished_iterations(events: &[RunEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            RunEvent::IterationFinished { iteration, .. } => Some(*iteration),
            _ => None,
        })
        .collect()
}

/// Assert a sweep event sequence: `SweepStarted` first, `SweepFinished`
/// last with the given state.
#[allow(dead_code)]
pub fn assert_sweep_sequence(events: &[RunEvent], tasks: usize, state: Option<RunState>) {
    let first = events.first().expect("event sequence is empty");
    assert!(
        matches!(first, RunEvent::SweepStarted { tasks: t, .. } if *t == tasks),
        "First event should be SweepStarted with {} tasks, got: {:?}",
        tasks,
        first
    );

    let last = events.last().expect("event sequence is empty");
    assert!(
        matches!(last, RunEvent::SweepFinished { state: s, .. } if *s == state),
        "Last event should be SweepFinished({:?}), got: {:?}",
        state,
        last
    );
}
