//! Event stream assertions.

use ck_protocol::events::Event;
use std::collections::HashSet;

/// Assert the invariants every run stream must satisfy.
///
/// Checks that:
/// 1. `steps` comes first
/// 2. Exactly one terminal event is present, and it is last
/// 3. Every `step_done`/`step_failed` closes a step that was started
/// 4. At most one step is open at a time
pub fn assert_well_formed(events: &[Event]) {
    assert!(!events.is_empty(), "Event sequence is empty");
    assert!(
        matches!(events[0], Event::Steps { .. }),
        "First event should be steps, got: {:?}",
        events[0]
    );

    let terminals = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminals, 1, "Expected exactly one terminal event in {events:?}");
    assert!(
        events.last().is_some_and(Event::is_terminal),
        "Terminal event is not last in {events:?}"
    );

    let mut open: Option<&str> = None;
    let mut started = HashSet::new();
    for event in events {
        match event {
            Event::StepStart { step } => {
                assert!(open.is_none(), "step_start({step}) while {open:?} is open");
                open = Some(step.as_str());
                started.insert(step.as_str());
            }
            Event::StepDone { step } | Event::StepFailed { step } => {
                assert!(started.contains(step.as_str()), "{step} closed before it started");
                assert_eq!(open, Some(step.as_str()), "closing a step that is not open");
                open = None;
            }
            _ => {}
        }
    }
}

/// Wire kinds of a sequence, for compact comparisons.
pub fn kinds(events: &[Event]) -> Vec<&'static str> {
    events.iter().map(Event::kind).collect()
}
