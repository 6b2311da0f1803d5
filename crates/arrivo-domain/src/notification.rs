use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};

use crate::arrival::{ArrivalReport, NotificationPayload};

pub const NOTIFICATION_TITLE: &str = "🚌 Bus Arrived!";

/// Builds the provider-agnostic notification payload for one arrival report.
///
/// Deterministic given the report and the compose-time clock; never fails.
pub struct NotificationComposer;

impl NotificationComposer {
    pub fn compose(report: &ArrivalReport) -> NotificationPayload {
        let mut data = HashMap::new();
        data.insert("placeName".to_string(), report.place_name.clone());
        // f64 Display is the shortest round-trip representation; no rounding.
        data.insert("latitude".to_string(), report.latitude.to_string());
        data.insert("longitude".to_string(), report.longitude.to_string());
        data.insert(
            "timestamp".to_string(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        );

        NotificationPayload {
            title: NOTIFICATION_TITLE.to_string(),
            body: format!(
                "Your bus has reached {}. Please get ready!",
                report.place_name
            ),
            data,
            target: report.push_token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn report() -> ArrivalReport {
        ArrivalReport {
            latitude: 10.081642,
            longitude: 78.746657,
            push_token: "tok-123".to_string(),
            place_name: "Test School Gate".to_string(),
        }
    }

    #[test]
    fn test_compose_embeds_place_name_verbatim() {
        let payload = NotificationComposer::compose(&report());

        assert_eq!(payload.title, NOTIFICATION_TITLE);
        assert_eq!(
            payload.body,
            "Your bus has reached Test School Gate. Please get ready!"
        );
        assert_eq!(payload.data["placeName"], "Test School Gate");
    }

    #[test]
    fn test_compose_stringifies_coordinates_at_full_precision() {
        let payload = NotificationComposer::compose(&report());

        assert_eq!(payload.data["latitude"], "10.081642");
        assert_eq!(payload.data["longitude"], "78.746657");
    }

    #[test]
    fn test_compose_stamps_parseable_utc_timestamp() {
        let payload = NotificationComposer::compose(&report());

        let stamp = &payload.data["timestamp"];
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn test_compose_targets_the_push_token() {
        let payload = NotificationComposer::compose(&report());

        assert_eq!(payload.target, "tok-123");
    }
}
