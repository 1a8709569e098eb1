use super::*;

#[test]
fn invalid_argument_message_round_trips() {
    let err = Error::InvalidArgument("n must be >= 1".to_string());
    assert_eq!(err.to_string(), "invalid argument: n must be >= 1");
}

#[test]
fn alignment_violation_message_round_trips() {
    let err = Error::AlignmentViolation("point 3 not 32-byte aligned".to_string());
    assert_eq!(
        err.to_string(),
        "alignment violation: point 3 not 32-byte aligned"
    );
}

#[test]
fn allocation_failure_message_round_trips() {
    let err = Error::AllocationFailure("scratch row of 200 doubles".to_string());
    assert_eq!(
        err.to_string(),
        "allocation failure: scratch row of 200 doubles"
    );
}
