use std::fmt;

#[derive(Debug)]
pub enum Error {
    TypeMismatch {
        op: &'static str,
        position: usize,
        expected: &'static str,
        got: &'static str,
    },
    InvalidArgument(String),
    InvalidState(String),
    Lock,
    //
    InvalidShape {
        message: String,
    },
    ShapeMismatch {
        expected: usize,
        got: usize,
        msg: String,
    },
    DimensionMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    // persist
    #[cfg(feature = "persist")]
    PrivilegeRequired(String),
    #[cfg(feature = "persist")]
    SerializationError(String),
    #[cfg(feature = "persist")]
    DeserializationError(String),
    #[cfg(feature = "persist")]
    Storage(String),
    //
    Internal {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch {
                op,
                position,
                expected,
                got,
            } => {
                write!(
                    f,
                    "Type mismatch in {}: argument {} expected {}, got {}",
                    op, position, expected, got
                )
            }
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Self::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Self::Lock => write!(f, "Lock is poisoned"),

            Self::InvalidShape { message } => {
                write!(f, "Invalid shape: {}", message)
            }
            Self::ShapeMismatch { expected, got, msg } => {
                write!(f, "Shape mismatch ({}): expected {}, got {}", msg, expected, got)
            }
            Self::DimensionMismatch { expected, got } => {
                write!(f, "Dimension mismatch: expected {:?}, got {:?}", expected, got)
            }
            #[cfg(feature = "persist")]
            Self::PrivilegeRequired(msg) => {
                write!(f, "Write privilege required: {}", msg)
            }
            #[cfg(feature = "persist")]
            Self::SerializationError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            #[cfg(feature = "persist")]
            Self::DeserializationError(msg) => {
                write!(f, "Deserialization error: {}", msg)
            }
            #[cfg(feature = "persist")]
            Self::Storage(msg) => {
                write!(f, "Storage error: {}", msg)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(feature = "persist")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
