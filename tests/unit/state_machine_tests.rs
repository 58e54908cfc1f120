//! Scheduler State Machine Unit Tests
//!
//! Tests the loop lifecycle transitions:
//! - RUNNING -> SHUTTING_DOWN -> STOPPED
//! - No shortcuts and no resurrection from STOPPED

use treasury_keeper::monitoring::SchedulerState;

#[test]
fn test_running_to_shutting_down_valid() {
    assert!(
        SchedulerState::Running.can_transition_to(SchedulerState::ShuttingDown),
        "RUNNING -> SHUTTING_DOWN should be valid"
    );
}

#[test]
fn test_shutting_down_to_stopped_valid() {
    assert!(
        SchedulerState::ShuttingDown.can_transition_to(SchedulerState::Stopped),
        "SHUTTING_DOWN -> STOPPED should be valid"
    );
}

#[test]
fn test_running_cannot_skip_to_stopped() {
    assert!(
        !SchedulerState::Running.can_transition_to(SchedulerState::Stopped),
        "RUNNING -> STOPPED should be invalid (shutdown is observed first)"
    );
}

#[test]
fn test_shutdown_is_one_way() {
    assert!(
        !SchedulerState::ShuttingDown.can_transition_to(SchedulerState::Running),
        "SHUTTING_DOWN -> RUNNING should be invalid"
    );
    assert!(
        !SchedulerState::Stopped.can_transition_to(SchedulerState::Running),
        "STOPPED -> RUNNING should be invalid"
    );
    assert!(
        !SchedulerState::Stopped.can_transition_to(SchedulerState::ShuttingDown),
        "STOPPED -> SHUTTING_DOWN should be invalid"
    );
}

#[test]
fn test_no_self_transitions() {
    assert!(!SchedulerState::Running.can_transition_to(SchedulerState::Running));
    assert!(!SchedulerState::ShuttingDown.can_transition_to(SchedulerState::ShuttingDown));
    assert!(!SchedulerState::Stopped.can_transition_to(SchedulerState::Stopped));
}

#[test]
fn test_terminal_states() {
    assert!(SchedulerState::Stopped.is_terminal(), "STOPPED should be terminal");
    assert!(!SchedulerState::Running.is_terminal(), "RUNNING should not be terminal");
    assert!(
        !SchedulerState::ShuttingDown.is_terminal(),
        "SHUTTING_DOWN should not be terminal"
    );
}
