//! Status and error types for adbc-driver-kit.
//!
//! Every framework and driver operation returns [`Result`]. A failure carries a
//! [`Status`]: a [`StatusKind`], a human-readable message and optional
//! vendor-specific details. The status is converted exactly once, at the ABI
//! boundary, into an [`AdbcStatusCode`] plus an [`ErrorRecord`].

use std::fmt;
use thiserror::Error;

/// Result type used by every framework and driver operation.
pub type Result<T> = std::result::Result<T, Status>;

/// Kind of failure carried by a [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// Malformed caller input
    InvalidArgument,
    /// Operation illegal in the current lifecycle or transaction state
    InvalidState,
    /// Requested object does not exist
    NotFound,
    /// Capability absent in this driver
    NotImplemented,
    /// Underlying transport or database failure
    Io,
    /// Invariant violation
    Internal,
    /// Operation was cancelled
    Cancelled,
}

impl StatusKind {
    /// Map to the caller-visible ADBC status code.
    pub fn to_adbc_code(self) -> AdbcStatusCode {
        match self {
            StatusKind::InvalidArgument => AdbcStatusCode::InvalidArgument,
            StatusKind::InvalidState => AdbcStatusCode::InvalidState,
            StatusKind::NotFound => AdbcStatusCode::NotFound,
            StatusKind::NotImplemented => AdbcStatusCode::NotImplemented,
            StatusKind::Io => AdbcStatusCode::Io,
            StatusKind::Internal => AdbcStatusCode::Internal,
            StatusKind::Cancelled => AdbcStatusCode::Cancelled,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKind::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            StatusKind::InvalidState => write!(f, "INVALID_STATE"),
            StatusKind::NotFound => write!(f, "NOT_FOUND"),
            StatusKind::NotImplemented => write!(f, "NOT_IMPLEMENTED"),
            StatusKind::Io => write!(f, "IO"),
            StatusKind::Internal => write!(f, "INTERNAL"),
            StatusKind::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A failed operation: kind, message and optional vendor details.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{kind}] {message}")]
pub struct Status {
    kind: StatusKind,
    message: String,
    vendor_code: Option<i32>,
    sqlstate: Option<[u8; 5]>,
}

impl Status {
    /// Create a status of the given kind.
    pub fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            vendor_code: None,
            sqlstate: None,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusKind::InvalidArgument, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(StatusKind::InvalidState, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusKind::NotFound, message)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(StatusKind::NotImplemented, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Io, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Internal, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Cancelled, message)
    }

    /// Attach a vendor-specific error code.
    pub fn with_vendor_code(mut self, code: i32) -> Self {
        self.vendor_code = Some(code);
        self
    }

    /// Attach a SQLSTATE. Anything but exactly five ASCII characters is ignored.
    pub fn with_sqlstate(mut self, sqlstate: &str) -> Self {
        if let Ok(state) = <[u8; 5]>::try_from(sqlstate.as_bytes()) {
            if state.is_ascii() {
                self.sqlstate = Some(state);
            }
        }
        self
    }

    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn vendor_code(&self) -> Option<i32> {
        self.vendor_code
    }

    pub fn sqlstate(&self) -> Option<&str> {
        self.sqlstate
            .as_ref()
            .and_then(|state| std::str::from_utf8(state).ok())
    }

    /// Map to the caller-visible ADBC status code.
    pub fn to_adbc_code(&self) -> AdbcStatusCode {
        self.kind.to_adbc_code()
    }

    /// Build the structured error record handed to the caller.
    pub fn to_error_record(&self) -> ErrorRecord {
        ErrorRecord {
            message: self.message.clone(),
            vendor_code: self.vendor_code,
            sqlstate: self.sqlstate,
        }
    }
}

/// ADBC status codes as defined by the C header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AdbcStatusCode {
    Ok = 0,
    NotImplemented = 2,
    NotFound = 3,
    InvalidArgument = 5,
    InvalidState = 6,
    Internal = 9,
    Io = 10,
    Cancelled = 11,
}

impl AdbcStatusCode {
    /// Status code of an operation outcome.
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => AdbcStatusCode::Ok,
            Err(status) => status.to_adbc_code(),
        }
    }
}

impl fmt::Display for AdbcStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdbcStatusCode::Ok => write!(f, "OK"),
            AdbcStatusCode::NotImplemented => write!(f, "NOT_IMPLEMENTED"),
            AdbcStatusCode::NotFound => write!(f, "NOT_FOUND"),
            AdbcStatusCode::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            AdbcStatusCode::InvalidState => write!(f, "INVALID_STATE"),
            AdbcStatusCode::Internal => write!(f, "INTERNAL"),
            AdbcStatusCode::Io => write!(f, "IO"),
            AdbcStatusCode::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Structured error details populated alongside a failing status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub message: String,
    pub vendor_code: Option<i32>,
    pub sqlstate: Option<[u8; 5]>,
}

impl From<Status> for adbc_core::error::Error {
    fn from(status: Status) -> Self {
        use adbc_core::error::Status as AdbcStatus;

        let code = match status.kind {
            StatusKind::InvalidArgument => AdbcStatus::InvalidArguments,
            StatusKind::InvalidState => AdbcStatus::InvalidState,
            StatusKind::NotFound => AdbcStatus::NotFound,
            StatusKind::NotImplemented => AdbcStatus::NotImplemented,
            StatusKind::Io => AdbcStatus::IO,
            StatusKind::Internal => AdbcStatus::Internal,
            StatusKind::Cancelled => AdbcStatus::Cancelled,
        };
        let mut error = adbc_core::error::Error::with_message_and_status(status.message, code);
        if let Some(vendor_code) = status.vendor_code {
            error.vendor_code = vendor_code;
        }
        if let Some(sqlstate) = status.sqlstate {
            error.sqlstate = sqlstate.map(|b| b as std::ffi::c_char);
        }
        error
    }
}

// Conversions from external error types
impl From<arrow_schema::ArrowError> for Status {
    fn from(err: arrow_schema::ArrowError) -> Self {
        Status::internal(format!("Arrow error: {}", err))
    }
}

impl From<serde_json::Error> for Status {
    fn from(err: serde_json::Error) -> Self {
        Status::invalid_argument(format!("Invalid JSON: {}", err))
    }
}
