//! # Error Handling
//!
//! Two layers live here:
//!
//! - [`ModelError`]: what the model layer itself raises. It names the field or
//!   attribute involved and knows nothing about HTTP.
//! - [`ApiError`]: the response-facing taxonomy. Each variant maps to a status
//!   code, user-facing messages are sanitized, internal details are logged
//!   with `tracing` and never sent to clients.
//!
//! Model errors convert into API errors with `?`:
//!
//! ```rust,ignore
//! use modelkit::{ApiError, ApiModel};
//!
//! async fn create_post(Json(body): Json<Value>) -> Result<Json<Value>, ApiError> {
//!     let post = Post::construct(&body)?; // RequiredFieldMissing -> 400
//!     post.validate()?;                   // ValidationErrors     -> 400 with details
//!     Ok(Json(Value::Object(post.marshal())))
//! }
//! ```

use crate::validation::{ValidationError, ValidationErrors, ValidationKind};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// Errors raised by registries, records and derived models
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A non-nullable field received no value during construction
    #[error("field [{field}] must be initialized")]
    RequiredFieldMissing { field: String },

    /// A write named an attribute the model does not declare
    #[error("model {model} has no field [{attribute}]")]
    AttributeRejected { model: String, attribute: String },

    /// A value was rejected by its field or data type
    #[error("field [{}] is invalid: {}", .0.field, .0.message)]
    ValidationFailed(#[from] ValidationError),
}

impl ModelError {
    /// Name of the field or attribute the error is about
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::RequiredFieldMissing { field } => field,
            Self::AttributeRejected { attribute, .. } => attribute,
            Self::ValidationFailed(err) => &err.field,
        }
    }
}

/// API error type with automatic logging and sanitized responses
///
/// The variants mirror the domain error kinds an API surfaces; each one maps
/// to a fixed HTTP status code.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - An argument has the wrong type or value
    ArgumentInvalid {
        /// User-facing error message
        message: String,
    },

    /// 400 Bad Request - A required argument is missing
    ArgumentRequired {
        /// Name of the missing argument
        field: String,
    },

    /// 403 Forbidden - The object already exists
    ObjectsDuplicated {
        /// User-facing error message
        message: String,
    },

    /// 404 Not Found - Resource doesn't exist
    ObjectsNotExist {
        /// Resource type (e.g., "User", "Post")
        resource: String,
        /// Optional ID that wasn't found
        id: Option<String>,
    },

    /// 400 Bad Request - An argument does not match the expected pattern
    PatternInvalid {
        /// User-facing error message
        message: String,
    },

    /// 403 Forbidden - The caller may not perform this action
    ActionNotAllowed {
        /// User-facing error message
        message: String,
    },

    /// 400 Bad Request - One or more fields failed validation
    ValidationFailed {
        /// User-facing validation errors
        errors: Vec<String>,
    },

    /// 500 Internal Server Error - details logged, not exposed
    Internal {
        /// User-facing generic message
        message: String,
        /// Internal error details (logged, not sent to user)
        internal: Option<String>,
    },
}

impl ApiError {
    /// Create a 400 error for an argument with the wrong type or value
    pub fn argument_invalid(message: impl Into<String>) -> Self {
        Self::ArgumentInvalid {
            message: message.into(),
        }
    }

    /// Create a 400 error for a missing argument
    pub fn argument_required(field: impl Into<String>) -> Self {
        Self::ArgumentRequired {
            field: field.into(),
        }
    }

    /// Create a 403 error for a duplicate object
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(ApiError::objects_duplicated("Email already registered"));
    /// ```
    pub fn objects_duplicated(message: impl Into<String>) -> Self {
        Self::ObjectsDuplicated {
            message: message.into(),
        }
    }

    /// Create a 404 Not Found error
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(ApiError::objects_not_exist("User", Some(user_id.to_string())));
    /// ```
    pub fn objects_not_exist(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::ObjectsNotExist {
            resource: resource.into(),
            id,
        }
    }

    /// Create a 400 error for a value that does not match its pattern
    pub fn pattern_invalid(message: impl Into<String>) -> Self {
        Self::PatternInvalid {
            message: message.into(),
        }
    }

    /// Create a 403 error for a forbidden action
    pub fn action_not_allowed(message: impl Into<String>) -> Self {
        Self::ActionNotAllowed {
            message: message.into(),
        }
    }

    /// Create a 400 error listing every failed validation
    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    /// Create a 500 Internal Server Error with optional details
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(ApiError::internal("Failed to process request", Some(err.to_string())));
    /// ```
    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ArgumentInvalid { .. }
            | Self::ArgumentRequired { .. }
            | Self::PatternInvalid { .. }
            | Self::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Self::ObjectsDuplicated { .. } | Self::ActionNotAllowed { .. } => StatusCode::FORBIDDEN,
            Self::ObjectsNotExist { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the user-facing error message (sanitized)
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ObjectsNotExist { resource, id } => {
                if let Some(id) = id {
                    format!("{resource} with ID '{id}' not found")
                } else {
                    format!("{resource} not found")
                }
            }
            Self::ArgumentRequired { field } => format!("Argument [{field}] is required"),
            Self::ValidationFailed { errors } => {
                if errors.len() == 1 {
                    errors[0].clone()
                } else {
                    format!("Validation failed: {}", errors.join(", "))
                }
            }
            Self::ArgumentInvalid { message }
            | Self::ObjectsDuplicated { message }
            | Self::PatternInvalid { message }
            | Self::ActionNotAllowed { message }
            | Self::Internal { message, .. } => message.clone(),
        }
    }

    /// Log internal error details (not sent to user)
    fn log_internal(&self) {
        match self {
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(
                    details = %details,
                    "Internal error occurred"
                );
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
struct ErrorResponse {
    /// Error message
    error: String,
    /// Optional list of validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();

        let response = match &self {
            Self::ValidationFailed { errors } => ErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(errors.clone()),
            },
            _ => ErrorResponse {
                error: self.user_message(),
                details: None,
            },
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// **Conversion Rules:**
/// - `RequiredFieldMissing` → 400 `ArgumentRequired`
/// - `AttributeRejected` → 400 `ArgumentInvalid`
/// - `ValidationFailed` with a pattern violation → 400 `PatternInvalid`
/// - any other `ValidationFailed` → 400 `ArgumentInvalid`
impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::RequiredFieldMissing { field } => Self::ArgumentRequired { field },
            ModelError::AttributeRejected { attribute, .. } => Self::ArgumentInvalid {
                message: format!("Unknown argument [{attribute}]"),
            },
            ModelError::ValidationFailed(err) => err.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err.kind {
            ValidationKind::Pattern => Self::PatternInvalid {
                message: err.to_string(),
            },
            ValidationKind::Required => Self::ArgumentRequired { field: err.field },
            _ => Self::ArgumentInvalid {
                message: err.to_string(),
            },
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationFailed {
            errors: errors.errors().iter().map(ToString::to_string).collect(),
        }
    }
}
