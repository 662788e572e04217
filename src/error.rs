//! Crate-level error type.
//!
//! Errors are grouped by how the caller can react to them:
//!
//! - `Schema`: the input record is malformed; recoverable by fixing the input.
//! - `Precondition`: an operation was called in a state where it cannot
//!   succeed (training on empty/single-class data, predicting without a
//!   model); fatal to that operation.
//! - `Artifact`: the persisted classifier/normalization pair is missing or
//!   inconsistent; fatal at load time.
//! - `Io`: file-level failures around datasets and artifacts.
//!
//! Each group maps to a distinct process exit code so scripts can tell input
//! problems apart from broken artifacts.

#[derive(Clone)]
pub enum AppError {
    /// A field in the input record is missing, null, of the wrong type, or
    /// outside its declared domain. Always names the offending field.
    Schema { field: String, message: String },
    /// An operation was invoked with inputs that make it undefined.
    Precondition(String),
    /// The persisted model artifact is missing or inconsistent.
    Artifact(String),
    /// Underlying file I/O failure.
    Io(String),
}

impl AppError {
    pub fn schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Schema {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        AppError::Precondition(message.into())
    }

    pub fn artifact(message: impl Into<String>) -> Self {
        AppError::Artifact(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        AppError::Io(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Schema { .. } => 2,
            AppError::Precondition(_) => 3,
            AppError::Artifact(_) => 4,
            AppError::Io(_) => 5,
        }
    }

    /// The offending field name, when this is a schema error.
    pub fn field(&self) -> Option<&str> {
        match self {
            AppError::Schema { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Schema { field, message } => write!(f, "invalid field '{field}': {message}"),
            AppError::Precondition(message) => write!(f, "precondition violated: {message}"),
            AppError::Artifact(message) => write!(f, "artifact error: {message}"),
            AppError::Io(message) => write!(f, "io error: {message}"),
        }
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AppError({self})")
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_error_classes() {
        assert_eq!(AppError::schema("age", "x").exit_code(), 2);
        assert_eq!(AppError::precondition("x").exit_code(), 3);
        assert_eq!(AppError::artifact("x").exit_code(), 4);
        assert_eq!(AppError::io("x").exit_code(), 5);
    }

    #[test]
    fn schema_error_names_the_field() {
        let err = AppError::schema("cp", "must be one of 0, 1, 2, 3");
        assert_eq!(err.field(), Some("cp"));
        assert!(err.to_string().contains("cp"));
    }
}
