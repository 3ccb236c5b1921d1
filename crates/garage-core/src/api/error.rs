use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 => ApiError::BadRequest(truncated),
            404 => ApiError::NotFound(truncated),
            422 => ApiError::Validation(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True for failures that never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::NetworkError(e) if e.status().is_none() && !e.is_decode())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::NetworkError(e) if e.is_timeout())
    }

    /// Short message suitable for a status line.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NetworkError(_) if self.is_timeout() => {
                "Сервер не ответил вовремя. Попробуйте снова.".to_string()
            }
            ApiError::NetworkError(_) if self.is_transport() => {
                "Нет связи с сервером. Проверьте подключение.".to_string()
            }
            ApiError::NotFound(_) => "Запись не найдена".to_string(),
            ApiError::BadRequest(_) | ApiError::Validation(_) => {
                "Сервер отклонил данные".to_string()
            }
            ApiError::ServerError(_) => "Ошибка сервера. Попробуйте позже.".to_string(),
            _ => format!("Ошибка: {}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "bad"),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "{\"detail\":\"Автомобиль не найден\"}"),
            ApiError::NotFound(body) if body.contains("Автомобиль")
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, ""),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "no"),
            ApiError::InvalidResponse(msg) if msg.contains("403")
        ));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "ж".repeat(400); // 800 bytes
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated, 800 total bytes"));
        assert!(truncated.starts_with("жж"));
    }

    #[test]
    fn test_truncate_body_short() {
        assert_eq!(ApiError::truncate_body("short"), "short");
    }

    #[test]
    fn test_user_message_for_status_errors() {
        assert_eq!(ApiError::NotFound(String::new()).user_message(), "Запись не найдена");
        assert_eq!(
            ApiError::ServerError(String::new()).user_message(),
            "Ошибка сервера. Попробуйте позже."
        );
    }
}
