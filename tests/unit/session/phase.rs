use super::*;
use crate::background::{color::Color, fill::BackgroundMode};

fn snapshot() -> LockedBackgroundSnapshot {
    LockedBackgroundSnapshot {
        settings: BackgroundSettings {
            mode: BackgroundMode::Solid,
            color: Color::rgb(1, 2, 3),
            ..BackgroundSettings::default()
        },
        crop: Bounds::UNIT,
        source: None,
        timestamp: 0.0,
        raster: None,
    }
}

#[test]
fn starts_in_selection() {
    let m = PhaseStateMachine::new();
    assert_eq!(m.phase(), WorkflowPhase::BackgroundSelection);
    assert!(m.snapshot().is_none());
}

#[test]
fn lock_is_guarded() {
    let mut m = PhaseStateMachine::new();
    assert!(m.lock(snapshot()));
    assert_eq!(m.phase(), WorkflowPhase::ElementComposition);

    let mut other = snapshot();
    other.timestamp = 9.0;
    assert!(!m.lock(other));
    assert_eq!(m.snapshot().map(|s| s.timestamp), Some(0.0));
}

#[test]
fn unlock_discards_snapshot_once() {
    let mut m = PhaseStateMachine::new();
    m.lock(snapshot());
    assert_eq!(m.unlock(), Some(snapshot()));
    assert_eq!(m.unlock(), None);
    assert_eq!(m.phase(), WorkflowPhase::BackgroundSelection);
}
