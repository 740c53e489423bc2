use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::{atomic, Atomic};

/// Error kinds for repository operations
///
/// Each kind names one category of failure so callers can branch on it
/// without parsing messages.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::errors::{RepoError, ErrorKind, RepoResult};
///
/// fn example() -> RepoResult<()> {
///     Err(RepoError::new("Role not found", ErrorKind::RoleNotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Configuration
    /// Connection string is empty, malformed or names no database
    InvalidConfiguration,

    // Identifiers and naming
    /// A non-blank textual identifier is not a valid 24-hex object id
    InvalidIdentifierFormat,
    /// A collection name could not be derived for an entity type
    NamingError,

    // Argument validation
    /// A required argument was missing or blank
    NullArgument,
    /// The operation is not valid in the current context
    InvalidOperation,

    // Query results
    /// A single-result lookup matched more than one document
    MultipleMatches,
    /// The requested role does not exist
    RoleNotFound,
    /// The requested collection does not exist
    CollectionNotFound,

    // Lifecycle
    /// The instance was used after it was disposed
    UseAfterDispose,
    /// The operation was cancelled before it started
    Cancelled,

    // Filters and mapping
    /// Error during filter evaluation or construction
    FilterError,
    /// Error mapping an entity to or from a document
    ObjectMappingError,

    // Store
    /// A document with the same `_id` already exists
    DuplicateKey,
    /// Error from the underlying store
    BackendError,
    /// The store has already been closed
    StoreAlreadyClosed,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidConfiguration => write!(f, "Invalid configuration"),
            ErrorKind::InvalidIdentifierFormat => write!(f, "Invalid identifier format"),
            ErrorKind::NamingError => write!(f, "Naming error"),
            ErrorKind::NullArgument => write!(f, "Null argument"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::MultipleMatches => write!(f, "Multiple matches"),
            ErrorKind::RoleNotFound => write!(f, "Role not found"),
            ErrorKind::CollectionNotFound => write!(f, "Collection not found"),
            ErrorKind::UseAfterDispose => write!(f, "Use after dispose"),
            ErrorKind::Cancelled => write!(f, "Cancelled"),
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::DuplicateKey => write!(f, "Duplicate key"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::StoreAlreadyClosed => write!(f, "Store already closed"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type shared by every crate of the workspace.
///
/// Carries a message, a kind, an optional cause and the backtrace captured at
/// construction.
///
/// # Examples
///
/// ```rust,ignore
/// use docrepo::errors::{RepoError, ErrorKind};
///
/// let cause = RepoError::new("store unreachable", ErrorKind::BackendError);
/// let err = RepoError::new_with_cause("Insert failed", ErrorKind::BackendError, cause);
/// ```
#[derive(Clone)]
pub struct RepoError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<RepoError>>,
    backtrace: Atomic<Backtrace>,
}

impl RepoError {
    /// Creates a new `RepoError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        RepoError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `RepoError` chained to the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: RepoError) -> Self {
        RepoError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&RepoError> {
        self.cause.as_deref()
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{} ({})\nCaused by: {:?}", self.message, self.error_kind, cause),
            None => write!(f, "{} ({})\n{:?}", self.message, self.error_kind, self.backtrace.read()),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(feature = "serde")]
impl serde::de::Error for RepoError {
    fn custom<T: Display>(msg: T) -> Self {
        RepoError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for RepoError {
    fn custom<T: Display>(msg: T) -> Self {
        RepoError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl From<tokio::task::JoinError> for RepoError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            RepoError::new("Blocking task was cancelled", ErrorKind::Cancelled)
        } else {
            RepoError::new(&format!("Blocking task failed: {}", err), ErrorKind::InternalError)
        }
    }
}

impl From<regex::Error> for RepoError {
    fn from(err: regex::Error) -> Self {
        RepoError::new(&format!("Invalid regular expression: {}", err), ErrorKind::FilterError)
    }
}

impl From<String> for RepoError {
    fn from(msg: String) -> Self {
        RepoError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for RepoError {
    fn from(msg: &str) -> Self {
        RepoError::new(msg, ErrorKind::InternalError)
    }
}
