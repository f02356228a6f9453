//! statistical_tests::errors — error surface for two-sample tests.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias shared by sample containers,
//! feature maps, the power criterion, and the test evaluators, together
//! with a conversion layer to Python exceptions for PyO3-based bindings.
//!
//! Key behaviors
//! -------------
//! - Define [`TSTResult`] and [`TSTError`] as the canonical result and error
//!   types for everything under `statistical_tests`.
//! - Split variants into *configuration* errors (bad inputs detected before
//!   any computation) and *numerical faults* (degenerate covariance,
//!   non-finite features or statistics) via
//!   [`TSTError::is_numerical_fault`].
//! - Implement `From<TSTError> for PyErr` so Python callers see a
//!   `ValueError` carrying the Rust message.
//!
//! Invariants & assumptions
//! ------------------------
//! - Numerical faults are the only variants the gradient-ascent loop is
//!   allowed to absorb; all others propagate to the caller unchanged.
//! - Variants carry small payloads (offending values, shapes, indices) and
//!   are cheap to clone.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of domain constraints, e.g.
//!   "Gaussian width must be finite and > 0".
//! - Shapes are reported as `(rows, cols)`.
//!
//! Testing notes
//! -------------
//! - Unit tests verify payload embedding in `Display` and the
//!   numerical-fault classification.

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, PyErr};

pub type TSTResult<T> = Result<T, TSTError>;

/// TSTError — failure conditions for two-sample tests.
///
/// Variants
/// --------
/// - Sample errors: `SampleSizeMismatch`, `DimensionMismatch`,
///   `InsufficientData`, `EmptyDimension`, `NonFiniteData`.
/// - Parameter errors: `InvalidAlpha`, `InvalidGaussianWidth`,
///   `EmptyTestParams`, `TestParamsDimMismatch`, `NonFiniteTestParams`,
///   `InvalidProportion`, `InvalidSubsampleSize`.
/// - Contract violations: `FeatureDimMismatch`, `GradientShapeMismatch`,
///   `GradientNotImplemented`.
/// - Numerical faults: `SingularCovariance`, `NonFiniteFeatures`,
///   `NonFiniteStatistic`.
/// - Distribution errors: `InvalidDegreesOfFreedom`.
#[derive(Debug, Clone, PartialEq)]
pub enum TSTError {
    // ---- Samples ----
    /// X and Y carry a different number of rows.
    SampleSizeMismatch { nx: usize, ny: usize },
    /// X and Y carry a different number of columns.
    DimensionMismatch { dx: usize, dy: usize },
    /// Fewer than two rows per sample.
    InsufficientData { n: usize },
    /// Samples have zero columns.
    EmptyDimension,
    /// A sample entry is NaN or ±∞.
    NonFiniteData { sample: &'static str, row: usize, col: usize, value: f64 },

    // ---- Parameters ----
    /// Significance level outside (0, 1).
    InvalidAlpha(f64),
    /// Gaussian width not finite or not strictly positive.
    InvalidGaussianWidth(f64),
    /// Test-parameter matrix with zero rows.
    EmptyTestParams,
    /// Test-parameter columns do not match the data dimension.
    TestParamsDimMismatch { expected: usize, found: usize },
    /// A test-parameter entry is NaN or ±∞.
    NonFiniteTestParams { row: usize, col: usize, value: f64 },
    /// Split proportion outside (0, 1).
    InvalidProportion(f64),
    /// Subsample size of zero or larger than the sample.
    InvalidSubsampleSize { requested: usize, available: usize },

    // ---- Contract ----
    /// Feature map produced a matrix of the wrong width.
    FeatureDimMismatch { expected: usize, found: usize },
    /// Upstream gradient has a different shape than the features.
    GradientShapeMismatch { expected: (usize, usize), found: (usize, usize) },
    /// The feature map has no closed-form vector–Jacobian product.
    GradientNotImplemented,

    // ---- Numerical faults ----
    /// Covariance of the features is not positive definite.
    SingularCovariance { dim: usize },
    /// Feature matrix contains NaN or ±∞.
    NonFiniteFeatures { row: usize, col: usize, value: f64 },
    /// Power statistic evaluated to NaN or ±∞.
    NonFiniteStatistic(f64),

    // ---- Distribution ----
    /// χ² degrees of freedom rejected by the distribution constructor.
    InvalidDegreesOfFreedom(f64),
}

impl TSTError {
    /// `true` for failures caused by degenerate numbers rather than bad
    /// inputs. These are the only variants the optimizer loop absorbs.
    pub fn is_numerical_fault(&self) -> bool {
        matches!(
            self,
            TSTError::SingularCovariance { .. }
                | TSTError::NonFiniteFeatures { .. }
                | TSTError::NonFiniteStatistic(_)
        )
    }
}

impl std::error::Error for TSTError {}

impl std::fmt::Display for TSTError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Samples ----
            TSTError::SampleSizeMismatch { nx, ny } => {
                write!(f, "Sample size mismatch: X has {nx} rows, Y has {ny} rows")
            }
            TSTError::DimensionMismatch { dx, dy } => {
                write!(f, "Dimension mismatch: X has {dx} columns, Y has {dy} columns")
            }
            TSTError::InsufficientData { n } => {
                write!(f, "Need at least 2 observations per sample, got {n}")
            }
            TSTError::EmptyDimension => write!(f, "Samples must have at least one column"),
            TSTError::NonFiniteData { sample, row, col, value } => {
                write!(f, "Non-finite value {value} in sample {sample} at ({row}, {col})")
            }

            // ---- Parameters ----
            TSTError::InvalidAlpha(alpha) => {
                write!(f, "Invalid significance level {alpha}: must satisfy 0 < alpha < 1")
            }
            TSTError::InvalidGaussianWidth(width) => {
                write!(f, "Invalid Gaussian width {width}: must be finite and > 0")
            }
            TSTError::EmptyTestParams => {
                write!(f, "Test locations/frequencies must have at least one row")
            }
            TSTError::TestParamsDimMismatch { expected, found } => {
                write!(
                    f,
                    "Test locations/frequencies dimension mismatch: expected {expected} columns, found {found}"
                )
            }
            TSTError::NonFiniteTestParams { row, col, value } => {
                write!(f, "Non-finite test parameter {value} at ({row}, {col})")
            }
            TSTError::InvalidProportion(p) => {
                write!(f, "Invalid proportion {p}: must satisfy 0 < p < 1")
            }
            TSTError::InvalidSubsampleSize { requested, available } => {
                write!(f, "Invalid subsample size {requested}: must satisfy 1 <= n <= {available}")
            }

            // ---- Contract ----
            TSTError::FeatureDimMismatch { expected, found } => {
                write!(f, "Feature map returned {found} columns, expected {expected}")
            }
            TSTError::GradientShapeMismatch { expected, found } => {
                write!(f, "Feature gradient shape mismatch: expected {expected:?}, found {found:?}")
            }
            TSTError::GradientNotImplemented => {
                write!(f, "Feature map has no closed-form gradient")
            }

            // ---- Numerical faults ----
            TSTError::SingularCovariance { dim } => {
                write!(f, "Feature covariance ({dim} x {dim}) is not positive definite")
            }
            TSTError::NonFiniteFeatures { row, col, value } => {
                write!(f, "Non-finite feature value {value} at ({row}, {col})")
            }
            TSTError::NonFiniteStatistic(value) => {
                write!(f, "Power statistic is not finite: {value}")
            }

            // ---- Distribution ----
            TSTError::InvalidDegreesOfFreedom(df) => {
                write!(f, "Invalid chi-squared degrees of freedom: {df}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<TSTError> for PyErr {
    fn from(err: TSTError) -> PyErr {
        PyValueError::new_err(format!("TSTError: {err}"))
    }
}
