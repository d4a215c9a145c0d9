//! Integration tests for core model helpers.

use newdle_core::{slot_time, CoreError, Newdle};

#[test]
fn test_slot_time_error_names_input() {
    let err = slot_time::parse("tomorrow").unwrap_err();
    assert!(matches!(err, CoreError::InvalidSlotTime(ref raw) if raw == "tomorrow"));
}

#[test]
fn test_finished_newdle() {
    let newdle: Newdle = serde_json::from_str(
        r#"{"code":"c","title":"Lunch","duration":60,"timezone":"UTC",
            "timeslots":["2024-01-01T12:00"],"final_dt":"2024-01-01T12:00"}"#,
    )
    .unwrap();
    assert!(newdle.is_finished());
    assert!(newdle.participants.is_empty());
}
