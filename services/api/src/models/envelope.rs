//! JSON envelope wrapping every response body

use serde::Serialize;

use super::pagination::Pagination;

/// `{ success, message?, data?, pagination?, error? }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
            error: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::success(data)
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            pagination: None,
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_fields_are_omitted() {
        let body = serde_json::to_value(ApiResponse::with_message("done", json!({"a": 1}))).unwrap();
        assert_eq!(body, json!({"success": true, "message": "done", "data": {"a": 1}}));

        let body = serde_json::to_value(ApiResponse::<()>::failure("nope").with_error("detail")).unwrap();
        assert_eq!(
            body,
            json!({"success": false, "message": "nope", "error": "detail"})
        );
    }

    #[test]
    fn test_paginated_body() {
        let body =
            serde_json::to_value(ApiResponse::paginated(vec![1, 2], Pagination::new(1, 10, 2)))
                .unwrap();
        assert_eq!(body["pagination"]["totalItems"], 2);
        assert_eq!(body["pagination"]["totalPages"], 1);
        assert!(body.get("message").is_none());
    }
}
