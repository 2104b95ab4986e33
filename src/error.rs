//! User-facing error types
//!
//! Every failure the UI can surface falls into one of four classes. The class
//! decides how the app reacts (inline marks, toast only, toast + redirect),
//! the message is what ends up in the toast.

use std::fmt;

/// How a failure is presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// User-correctable input problem (inline mark + toast)
    Validation,
    /// Transport or backend failure (toast, user retries manually)
    Network,
    /// Session rejected by the backend (toast + redirect)
    Unauthorized,
    /// Certificate rasterization or export write failed (toast, abandoned)
    Render,
}

/// Errors that can occur while talking to the backend or producing files
#[derive(Debug)]
pub enum UiError {
    Validation(String),
    Transport(reqwest::Error),
    /// Backend answered with `status: "error"`
    Backend(String),
    Unauthorized(String),
    Decode(serde_json::Error),
    Image(image::ImageError),
    Io(std::io::Error),
}

impl UiError {
    pub fn class(&self) -> ErrorClass {
        match self {
            UiError::Validation(_) => ErrorClass::Validation,
            UiError::Transport(_) | UiError::Backend(_) | UiError::Decode(_) => {
                ErrorClass::Network
            }
            UiError::Unauthorized(_) => ErrorClass::Unauthorized,
            UiError::Image(_) | UiError::Io(_) => ErrorClass::Render,
        }
    }

    /// Backend messages are shown verbatim, everything else gets a generic line
    pub fn user_message(&self) -> String {
        match self {
            UiError::Validation(msg) | UiError::Backend(msg) => msg.clone(),
            UiError::Transport(_) => {
                "Network error. Please check your connection and try again.".to_string()
            }
            UiError::Unauthorized(_) => "Session expired. Please login again.".to_string(),
            UiError::Decode(_) => "Unexpected response from server.".to_string(),
            UiError::Image(_) | UiError::Io(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }

    /// Classify a backend `status: "error"` message
    pub fn from_backend_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("Unauthorized") {
            UiError::Unauthorized(message)
        } else {
            UiError::Backend(message)
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::Validation(msg) => write!(f, "validation failed: {msg}"),
            UiError::Transport(e) => write!(f, "transport error: {e}"),
            UiError::Backend(msg) => write!(f, "backend error: {msg}"),
            UiError::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            UiError::Decode(e) => write!(f, "decode error: {e}"),
            UiError::Image(e) => write!(f, "image error: {e}"),
            UiError::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for UiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UiError::Transport(e) => Some(e),
            UiError::Decode(e) => Some(e),
            UiError::Image(e) => Some(e),
            UiError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UiError {
    fn from(e: reqwest::Error) -> Self {
        UiError::Transport(e)
    }
}

impl From<serde_json::Error> for UiError {
    fn from(e: serde_json::Error) -> Self {
        UiError::Decode(e)
    }
}

impl From<image::ImageError> for UiError {
    fn from(e: image::ImageError) -> Self {
        UiError::Image(e)
    }
}

impl From<std::io::Error> for UiError {
    fn from(e: std::io::Error) -> Self {
        UiError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_message_is_classified() {
        let err = UiError::from_backend_message("Unauthorized access. Please login first.");
        assert_eq!(err.class(), ErrorClass::Unauthorized);
    }

    #[test]
    fn test_backend_message_shown_verbatim() {
        let err = UiError::from_backend_message("Email is already registered for this event");
        assert_eq!(err.class(), ErrorClass::Network);
        assert_eq!(
            err.user_message(),
            "Email is already registered for this event"
        );
    }

    #[test]
    fn test_io_errors_are_render_class() {
        let err = UiError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert_eq!(err.class(), ErrorClass::Render);
    }
}
