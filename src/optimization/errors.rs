use argmin::core::{ArgminError, Error};

use crate::statistical_tests::errors::TSTError;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, PyErr};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Implies that FD should be used
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- SGAOptions ----
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// Step sizes need to be positive and finite.
    InvalidStepSize {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// Objective change tolerance needs to be non-negative and finite.
    InvalidTolFun {
        tol: f64,
        reason: &'static str,
    },
    /// Batch proportion needs to lie in (0, 1].
    InvalidBatchProportion {
        value: f64,
        reason: &'static str,
    },
    /// Mini-batches need at least two rows for a covariance.
    BatchTooSmall {
        batch: usize,
        n: usize,
    },
    /// Invalid gradient method name.
    InvalidGradientMethod {
        name: String,
        reason: &'static str,
    },
    /// Initial Gaussian width must be finite and > 0.
    InvalidInitialWidth {
        value: f64,
    },

    // ---- Objective ----
    /// Objective returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },
    /// Width variable reached a point where the exposed width is not > 0.
    DegenerateWidth {
        value: f64,
    },
    /// Parameter vector length does not match the layout.
    ThetaLengthMismatch {
        expected: usize,
        actual: usize,
    },

    // ---- Two-sample tests ----
    /// Error raised by a feature map, the criterion, or data validation.
    Tst(TSTError),

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl OptError {
    /// `true` for failures the gradient-ascent loop absorbs by stopping
    /// early: degenerate numbers in the objective or its gradient.
    pub fn is_numerical_fault(&self) -> bool {
        match self {
            OptError::Tst(err) => err.is_numerical_fault(),
            OptError::NonFiniteCost { .. }
            | OptError::InvalidGradient { .. }
            | OptError::DegenerateWidth { .. } => true,
            _ => false,
        }
    }
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Gradient optimization not implemented")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- SGAOptions ----
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::InvalidStepSize { name, value, reason } => {
                write!(f, "Invalid step size {name} = {value}: {reason}")
            }
            OptError::InvalidTolFun { tol, reason } => {
                write!(f, "Invalid objective change tolerance {tol}: {reason}")
            }
            OptError::InvalidBatchProportion { value, reason } => {
                write!(f, "Invalid batch proportion {value}: {reason}")
            }
            OptError::BatchTooSmall { batch, n } => {
                write!(f, "Mini-batch of {batch} rows out of {n} is too small: need at least 2")
            }
            OptError::InvalidGradientMethod { name, reason } => {
                write!(f, "Invalid gradient method '{name}': {reason}")
            }
            OptError::InvalidInitialWidth { value } => {
                write!(f, "Invalid initial Gaussian width {value}: must be finite and > 0")
            }

            // ---- Objective ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite objective value: {value}")
            }
            OptError::DegenerateWidth { value } => {
                write!(f, "Gaussian width collapsed to {value}")
            }
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }

            // ---- Two-sample tests ----
            OptError::Tst(err) => write!(f, "{err}"),

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<TSTError> for OptError {
    fn from(err: TSTError) -> Self {
        match err {
            TSTError::GradientNotImplemented => OptError::GradientNotImplemented,
            other => OptError::Tst(other),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<OptError> for PyErr {
    fn from(err: OptError) -> PyErr {
        PyValueError::new_err(format!("OptError: {err}"))
    }
}
