//! Request validation for incoming arrival reports.
//!
//! Reports arrive as untyped JSON. Checks run in three passes over the fixed
//! field order (latitude, longitude, pushToken, placeName): presence for all
//! fields, then JSON types, then value-level invariants (finite coordinates,
//! non-empty strings) declared on [`ArrivalReport`] via garde. Presence runs
//! first for every field so a present-but-mistyped field cannot mask a
//! missing one. The first failing field wins. No side effects on any path.

use garde::Validate;
use serde_json::Value;

use crate::arrival::ArrivalReport;
use crate::error::{DomainError, DomainResult};

const REQUIRED_FIELDS: [&str; 4] = ["latitude", "longitude", "pushToken", "placeName"];

/// Validate one raw arrival report and build the typed [`ArrivalReport`].
pub fn validate_report(raw: &Value) -> DomainResult<ArrivalReport> {
    for field in REQUIRED_FIELDS {
        if matches!(raw.get(field), None | Some(Value::Null)) {
            return Err(DomainError::invalid_field(field, "is required"));
        }
    }

    let latitude = require_number(raw, "latitude")?;
    let longitude = require_number(raw, "longitude")?;
    let push_token = require_string(raw, "pushToken")?;
    let place_name = require_string(raw, "placeName")?;

    let report = ArrivalReport {
        latitude,
        longitude,
        push_token,
        place_name,
    };
    check_invariants(&report)?;

    Ok(report)
}

fn require_number(raw: &Value, field: &str) -> DomainResult<f64> {
    match raw.get(field) {
        None | Some(Value::Null) => Err(DomainError::invalid_field(field, "is required")),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| DomainError::invalid_field(field, "must be a number")),
    }
}

fn require_string(raw: &Value, field: &str) -> DomainResult<String> {
    match raw.get(field) {
        None | Some(Value::Null) => Err(DomainError::invalid_field(field, "is required")),
        Some(value) => value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DomainError::invalid_field(field, "must be a string")),
    }
}

/// Run the garde invariants and convert the first failure to a field error.
fn check_invariants(report: &ArrivalReport) -> DomainResult<()> {
    report.validate().map_err(|report| {
        match report.iter().next() {
            Some((path, error)) => {
                DomainError::invalid_field(wire_field_name(&path.to_string()), error.message())
            }
            // A non-empty garde report always carries at least one entry.
            None => DomainError::invalid_field("", "invalid request"),
        }
    })
}

/// Map struct field paths back to the wire names callers submitted.
fn wire_field_name(path: &str) -> String {
    match path {
        "push_token" => "pushToken".to_string(),
        "place_name" => "placeName".to_string(),
        other => other.to_string(),
    }
}
