// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn displays_as_bare_integer() {
    let id = ScheduleId::new(42);
    assert_eq!(id.to_string(), "42");
}

#[test]
fn round_trips_through_i64() {
    let id = PipelineId::from(7);
    let back: i64 = id.into();
    assert_eq!(back, 7);
}

#[test]
fn distinct_id_types_are_not_interchangeable() {
    let pipeline_id = PipelineId::new(1);
    let run_id = RunId::new(1);
    assert_eq!(pipeline_id.get(), run_id.get());
    // Compile-time guarantee: the following would not type-check:
    // assert_eq!(pipeline_id, run_id);
}
