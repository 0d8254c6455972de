use serde::Serialize;
pub(crate) mod checklist_controller;
pub(crate) mod health_check_controller;
pub(crate) mod todo_controller;
pub(crate) mod user_controller;
pub(crate) mod user_session_controller;

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T) -> Self {
        Self {
            status_code,
            data: Some(data),
        }
    }

    pub fn no_content(status_code: u16) -> ApiResponse<()> {
        ApiResponse {
            status_code,
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn api_response_wraps_data_with_status_code() {
        let response = ApiResponse::new(StatusCode::CREATED.into(), json!({"id": 3}));

        // Compare as values since key order in the serialized string is not guaranteed
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"status_code": 201, "data": {"id": 3}}));
    }

    #[test]
    fn api_response_without_data_omits_the_key() {
        let response = ApiResponse::<()>::no_content(StatusCode::OK.into());
        let serialized = serde_json::to_string(&response).unwrap();
        assert_eq!(serialized, json!({"status_code": 200}).to_string());
    }
}
