//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::CartNotFound
            | Self::DishNotFound
            | Self::CategoryNotFound
            | Self::TableNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::EmailAlreadyRegistered
            | Self::StatusConflict
            | Self::CategoryHasDishes
            | Self::TableNumberExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::StaffRequired | Self::AdminRequired => {
                StatusCode::FORBIDDEN
            }

            // 422 Unprocessable (valid request, rejected by the lifecycle)
            Self::InvalidTransition | Self::DishUnavailable => StatusCode::UNPROCESSABLE_ENTITY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::OrderCreateFailed
            | Self::OrderPartiallyPersisted => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::CartNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::DishNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(ErrorCode::StatusConflict.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::TableNumberExists.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_auth_and_permission_status() {
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::InvalidCredentials.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::StaffRequired.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::AdminRequired.http_status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_lifecycle_rejection_status() {
        assert_eq!(
            ErrorCode::InvalidTransition.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_bad_request_status() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::OrderEmpty.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::DishInvalidPrice.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_system_status() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::NetworkError.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
