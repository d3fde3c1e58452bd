use backtrace::Backtrace;
use parking_lot::RwLock;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for mock Firestore operations.
///
/// The variants mirror the status codes the real client reports, limited to
/// the ones an in-memory store can actually produce.
///
/// # Examples
///
/// ```rust,ignore
/// use firestore_mock::errors::{FirestoreError, ErrorKind, FirestoreResult};
///
/// fn example() -> FirestoreResult<()> {
///     Err(FirestoreError::new("No document to update", ErrorKind::NotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// The caller passed a path, option or argument the API does not accept
    InvalidArgument,
    /// The operation is part of the client surface but is not supported
    Unimplemented,
    /// The store or the write object is in the wrong state for the operation
    FailedPrecondition,
    /// The target document does not exist
    NotFound,
    /// A converter failed to map data to or from a typed value
    ObjectMappingError,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "invalid-argument"),
            ErrorKind::Unimplemented => write!(f, "unimplemented"),
            ErrorKind::FailedPrecondition => write!(f, "failed-precondition"),
            ErrorKind::NotFound => write!(f, "not-found"),
            ErrorKind::ObjectMappingError => write!(f, "object-mapping"),
            ErrorKind::InternalError => write!(f, "internal"),
        }
    }
}

/// Error type returned by every fallible operation of the mock.
///
/// `FirestoreError` carries a message, a kind, an optional cause and the
/// backtrace captured where it was raised.
///
/// # Examples
///
/// ```rust,ignore
/// use firestore_mock::errors::{FirestoreError, ErrorKind};
///
/// let cause = FirestoreError::new("bad field", ErrorKind::ObjectMappingError);
/// let err = FirestoreError::new_with_cause("Converter failed", ErrorKind::ObjectMappingError, cause);
/// ```
#[derive(Clone)]
pub struct FirestoreError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<FirestoreError>>,
    backtrace: Arc<RwLock<Backtrace>>,
}

impl FirestoreError {
    /// Creates a new `FirestoreError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        FirestoreError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(RwLock::new(Backtrace::new())),
        }
    }

    /// Creates a new `FirestoreError` that wraps the error which caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: FirestoreError) -> Self {
        FirestoreError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(RwLock::new(Backtrace::new())),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&FirestoreError> {
        self.cause.as_deref()
    }

    /// The status code string the real client would report, e.g. `"not-found"`.
    pub fn code(&self) -> String {
        self.error_kind.to_string()
    }
}

impl Display for FirestoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for FirestoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for FirestoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// `FirestoreResult<T>` is shorthand for `Result<T, FirestoreError>`.
pub type FirestoreResult<T> = Result<T, FirestoreError>;

/// Logs `message` and builds the matching error, the way every raise site
/// in this crate reports failures.
pub(crate) fn raise(message: &str, kind: ErrorKind) -> FirestoreError {
    log::error!("{}", message);
    FirestoreError::new(message, kind)
}
