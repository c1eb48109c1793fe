use actix_web::{HttpResponse, ResponseError, web};
use derive_more::{Display, Error};
use serde::Deserialize;

use crate::control::ControlClient;

/// Routes to see and control the current charging state; usable from home
/// automation systems like OpenHAB.
pub fn new_routes(client: ControlClient) -> actix_web::Scope {
    web::scope("/status")
        .app_data(web::Data::new(client))
        .route("", web::get().to(get_status))
        .route("/", web::get().to(get_status))
}

type StatusResponse = Result<HttpResponse, StatusApiError>;

#[derive(Debug, Display, Error)]
enum StatusApiError {
    #[display("Control loop unavailable")]
    ControlUnavailable(anyhow::Error),
}

impl ResponseError for StatusApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        tracing::warn!("StatusApiError: {:?}", self);

        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    //switch parameters accept on/true/off/false, case-insensitive
    #[serde(rename = "override")]
    override_switch: Option<String>,
    #[serde(rename = "chargingAllowed")]
    charging_allowed: Option<String>,
}

async fn get_status(
    query: web::Query<StatusQuery>,
    client: web::Data<ControlClient>,
) -> StatusResponse {
    if let Some(active) = query.override_switch.as_deref().and_then(parse_switch) {
        client
            .set_override(active)
            .await
            .map_err(StatusApiError::ControlUnavailable)?;
    }

    if let Some(allowed) = query.charging_allowed.as_deref().and_then(parse_switch) {
        client
            .set_charging_allowed(allowed)
            .await
            .map_err(StatusApiError::ControlUnavailable)?;
    }

    let report = client
        .status()
        .await
        .map_err(StatusApiError::ControlUnavailable)?;

    Ok(HttpResponse::Ok().json(report))
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" => Some(true),
        "off" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_include;

    use crate::control::StatusReport;
    use crate::core::time::DateTime;

    #[test]
    fn test_parse_switch() {
        assert_eq!(parse_switch("on"), Some(true));
        assert_eq!(parse_switch("TRUE"), Some(true));
        assert_eq!(parse_switch("off"), Some(false));
        assert_eq!(parse_switch("False"), Some(false));
        assert_eq!(parse_switch("maybe"), None);
    }

    #[test]
    fn test_status_document_shape() {
        let report = StatusReport {
            car_connected: true,
            charging: false,
            last_state_change: DateTime::from_iso("2024-09-10T10:00:00Z").unwrap(),
            charging_allowed: false,
            charging_allowed_since_or_when: Some(
                DateTime::from_iso("2024-09-10T11:00:00Z").unwrap(),
            ),
            override_active: false,
            costs: Some(25.8),
        };

        let actual = serde_json::to_value(&report).unwrap();

        assert_json_include!(
            actual: actual,
            expected: serde_json::json!({
                "carConnected": true,
                "charging": false,
                "chargingAllowed": false,
                "override": false,
                "costs": 25.8,
            })
        );
        assert!(actual.get("chargingAllowedSinceOrWhen").is_some());
    }

    #[test]
    fn test_unknown_values_serialized_as_null_or_omitted() {
        let report = StatusReport {
            car_connected: false,
            charging: false,
            last_state_change: DateTime::from_iso("2024-09-10T10:00:00Z").unwrap(),
            charging_allowed: false,
            charging_allowed_since_or_when: None,
            override_active: false,
            costs: None,
        };

        let actual = serde_json::to_value(&report).unwrap();

        assert!(actual.get("chargingAllowedSinceOrWhen").is_none());
        assert_eq!(actual.get("costs"), Some(&serde_json::Value::Null));
    }
}
