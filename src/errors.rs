use std::fmt;

/// Error type for timer wheel operations
///
/// Each variant carries enough context to tell a caller mistake apart from
/// an internal defect.
///
/// # Examples
///
/// ```ignore
/// use tickwheel::errors::WheelError;
///
/// let err = WheelError::horizon(90_061, 86_400);
/// eprintln!("{}", err); // Delay 90061 exceeds wheel horizon 86400
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum WheelError {
    /// Submitted delay exceeds the span of the topmost level
    ///
    /// The task was rejected and never scheduled
    HorizonExceeded { delay: u64, horizon: u64 },

    /// Level chain configuration failed validation at build time
    Validation(String),

    /// Internal state corruption detected
    ///
    /// This indicates the wheel's internal consistency was violated
    StateCorruption(String),
}

impl fmt::Display for WheelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HorizonExceeded { delay, horizon } => {
                write!(f, "Delay {} exceeds wheel horizon {}", delay, horizon)
            }
            Self::Validation(msg) => {
                write!(f, "Validation error: {}", msg)
            }
            Self::StateCorruption(msg) => {
                write!(f, "State corruption: {}", msg)
            }
        }
    }
}

impl From<anyhow::Error> for WheelError {
    fn from(err: anyhow::Error) -> Self {
        Self::StateCorruption(err.to_string())
    }
}

impl std::error::Error for WheelError {}

/// Constructor methods for creating errors with minimal boilerplate
impl WheelError {
    /// Create a horizon rejection error
    ///
    /// # Arguments
    /// * `delay` - The submitted delay that did not fit
    /// * `horizon` - The span of the topmost configured level
    #[must_use]
    pub fn horizon(delay: u64, horizon: u64) -> Self {
        Self::HorizonExceeded { delay, horizon }
    }

    /// Create a validation error
    ///
    /// # Arguments
    /// * `message` - A descriptive validation error message
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a state corruption error
    ///
    /// # Arguments
    /// * `message` - A descriptive message about the corruption
    #[must_use]
    pub fn corruption(message: impl Into<String>) -> Self {
        Self::StateCorruption(message.into())
    }
}
