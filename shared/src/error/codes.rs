//! Unified error codes for Ejuem
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 6xxx: Catalog errors (dishes, categories)
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Sign-up rejected by the session provider
    SignUpFailed = 1005,
    /// Email already registered
    EmailAlreadyRegistered = 1006,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Staff role (mesero/admin) required
    StaffRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Cart is empty
    OrderEmpty = 4002,
    /// Status transition not permitted from the current state
    InvalidTransition = 4003,
    /// Order status changed since it was read
    StatusConflict = 4004,
    /// Order could not be created (nothing persisted)
    OrderCreateFailed = 4005,
    /// Order row persisted but its items did not
    OrderPartiallyPersisted = 4006,
    /// Cart not found
    CartNotFound = 4101,

    // ==================== 6xxx: Catalog ====================
    /// Dish not found
    DishNotFound = 6001,
    /// Dish has invalid price
    DishInvalidPrice = 6002,
    /// Dish is not available
    DishUnavailable = 6003,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category has dishes
    CategoryHasDishes = 6102,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table number already exists
    TableNumberExists = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Record store error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::SignUpFailed => "Sign-up failed",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::StaffRequired => "Staff role is required",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Cart is empty",
            ErrorCode::InvalidTransition => "Status transition is not permitted",
            ErrorCode::StatusConflict => "Order status was changed by someone else",
            ErrorCode::OrderCreateFailed => "Order could not be placed",
            ErrorCode::OrderPartiallyPersisted => "Order was saved without its items",
            ErrorCode::CartNotFound => "Cart not found",

            // Catalog
            ErrorCode::DishNotFound => "Dish not found",
            ErrorCode::DishInvalidPrice => "Dish price must be non-negative",
            ErrorCode::DishUnavailable => "Dish is not available",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasDishes => "Category still has dishes",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableNumberExists => "Table number already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Record store error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::SignUpFailed),
            1006 => Ok(ErrorCode::EmailAlreadyRegistered),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::StaffRequired),
            2003 => Ok(ErrorCode::AdminRequired),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderEmpty),
            4003 => Ok(ErrorCode::InvalidTransition),
            4004 => Ok(ErrorCode::StatusConflict),
            4005 => Ok(ErrorCode::OrderCreateFailed),
            4006 => Ok(ErrorCode::OrderPartiallyPersisted),
            4101 => Ok(ErrorCode::CartNotFound),

            // Catalog
            6001 => Ok(ErrorCode::DishNotFound),
            6002 => Ok(ErrorCode::DishInvalidPrice),
            6003 => Ok(ErrorCode::DishUnavailable),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryHasDishes),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableNumberExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
