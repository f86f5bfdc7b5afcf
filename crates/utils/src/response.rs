use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Envelope returned by every API endpoint.
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct ApiResponse<T, E = T> {
    success: bool,
    data: Option<T>,
    error_data: Option<E>,
    message: Option<String>,
}

impl<T, E> ApiResponse<T, E> {
    /// Creates a successful response, with `data` and no message.
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: None,
            error_data: None,
        }
    }

    /// Creates an error response, with `message` and no data.
    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message.to_string()),
            error_data: None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_serializes_message_without_data() {
        let response = ApiResponse::<()>::error("Comment not found");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], "Comment not found");
        assert!(value["data"].is_null());
    }

    #[test]
    fn success_envelope_carries_data() {
        let response = ApiResponse::<Vec<i32>>::success(vec![1, 2]);
        assert!(response.is_success());
        assert_eq!(response.data(), Some(&vec![1, 2]));
        assert!(response.message().is_none());
    }
}
