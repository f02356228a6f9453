//! rust_two_sample — optimized kernel two-sample tests with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the mean-embedding and smooth characteristic function tests to
//! Python via the `_rust_two_sample` extension module. When the
//! `python-bindings` feature is enabled, this module defines the
//! Python-facing classes and the `statistical_tests` submodule.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`statistical_tests` and
//!   `optimization`) as the public crate surface.
//! - Define `#[pyclass]` wrappers (`MeanEmbedding`, `SmoothCF`) and the
//!   `#[pymodule]` initializer for `_rust_two_sample`.
//! - Register `rust_two_sample.statistical_tests` in `sys.modules` so that
//!   dot-notation imports work.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work happens in the inner Rust modules; this file only
//!   converts inputs, calls them, and maps errors to `ValueError`.
//! - Test results cross the boundary as dicts with keys `alpha`, `pvalue`,
//!   `test_stat`, `h0_rejected`; optimizers return `(T, gwidth, info)`.
//!
//! Downstream usage
//! ----------------
//! - Rust code should depend on `statistical_tests` and `optimization`
//!   directly and can ignore the items behind `python-bindings`.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   integration tests under `tests/`.

pub mod optimization;
pub mod statistical_tests;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{
    prelude::*,
    types::{PyAny, PyDict},
};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::gradient_ascent::traits::SGAOutcome,
    statistical_tests::{
        mean_embedding::{MeanEmbeddingTest, DEFAULT_ALPHA, DEFAULT_N_TEST_LOCS},
        outcome::TwoSampleTest,
        smooth_cf::{SmoothCFTest, DEFAULT_N_TEST_FREQS, DEFAULT_RANDN_SEED},
    },
    utils::{build_sga_options, build_tst_data, extract_f64_matrix, outcome_to_dict, sga_info_to_dict},
};

#[cfg(feature = "python-bindings")]
type OptimizedParams<'py> = (Bound<'py, PyArray2<f64>>, f64, Bound<'py, PyDict>);

#[cfg(feature = "python-bindings")]
fn optimized_params<'py>(
    py: Python<'py>, outcome: &SGAOutcome, params_key: &str,
) -> PyResult<OptimizedParams<'py>> {
    let info = sga_info_to_dict(py, outcome, params_key)?;
    Ok((outcome.test_params.clone().into_pyarray(py), outcome.gwidth, info))
}

/// MeanEmbedding — Python wrapper around [`MeanEmbeddingTest`].
///
/// Construction validates the locations, the width, and `alpha`; the
/// static optimizers return `(test_locs, gwidth, info)` to be fed back into
/// the constructor.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_two_sample.statistical_tests")]
pub struct MeanEmbedding {
    inner: MeanEmbeddingTest,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl MeanEmbedding {
    #[new]
    #[pyo3(
        signature = (test_locs, gaussian_width, alpha = DEFAULT_ALPHA),
        text_signature = "(test_locs, gaussian_width, /, alpha=0.01)"
    )]
    pub fn new<'py>(
        test_locs: &Bound<'py, PyAny>, gaussian_width: f64, alpha: f64,
    ) -> PyResult<Self> {
        let test_locs = extract_f64_matrix(test_locs)?;
        Ok(Self { inner: MeanEmbeddingTest::new(test_locs, gaussian_width, alpha)? })
    }

    #[staticmethod]
    #[pyo3(signature = (x, y, n_test_locs = DEFAULT_N_TEST_LOCS, alpha = DEFAULT_ALPHA, seed = 1))]
    pub fn create_fit_gauss_heuristic<'py>(
        x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>, n_test_locs: usize, alpha: f64, seed: u64,
    ) -> PyResult<Self> {
        let data = build_tst_data(x, y)?;
        let inner = MeanEmbeddingTest::create_fit_gauss_heuristic(&data, n_test_locs, alpha, seed)?;
        Ok(Self { inner })
    }

    #[staticmethod]
    #[pyo3(signature = (
        x, y, n_test_locs = DEFAULT_N_TEST_LOCS, max_iter = None, locs_step_size = None,
        gwidth_step_size = None, batch_proportion = None, tol_fun = None, seed = None,
        gradient = None
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn optimize_locs_width<'py>(
        py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>, n_test_locs: usize,
        max_iter: Option<usize>, locs_step_size: Option<f64>, gwidth_step_size: Option<f64>,
        batch_proportion: Option<f64>, tol_fun: Option<f64>, seed: Option<u64>,
        gradient: Option<&str>,
    ) -> PyResult<OptimizedParams<'py>> {
        let data = build_tst_data(x, y)?;
        let opts = build_sga_options(
            MeanEmbeddingTest::joint_options(),
            max_iter,
            locs_step_size,
            gwidth_step_size,
            batch_proportion,
            tol_fun,
            seed,
            gradient,
        )?;
        let outcome = MeanEmbeddingTest::optimize_locs_width(&data, n_test_locs, &opts)?;
        optimized_params(py, &outcome, "test_locs")
    }

    #[staticmethod]
    #[pyo3(signature = (
        x, y, test_locs, gwidth0 = None, max_iter = None, gwidth_step_size = None,
        batch_proportion = None, tol_fun = None, seed = None, gradient = None
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn optimize_gwidth<'py>(
        py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>,
        test_locs: &Bound<'py, PyAny>, gwidth0: Option<f64>, max_iter: Option<usize>,
        gwidth_step_size: Option<f64>, batch_proportion: Option<f64>, tol_fun: Option<f64>,
        seed: Option<u64>, gradient: Option<&str>,
    ) -> PyResult<(f64, Bound<'py, PyDict>)> {
        let data = build_tst_data(x, y)?;
        let test_locs = extract_f64_matrix(test_locs)?;
        let opts = build_sga_options(
            MeanEmbeddingTest::gwidth_options(),
            max_iter,
            None,
            gwidth_step_size,
            batch_proportion,
            tol_fun,
            seed,
            gradient,
        )?;
        let outcome = MeanEmbeddingTest::optimize_gwidth(&data, test_locs, gwidth0, &opts)?;
        Ok((outcome.gwidth, sga_info_to_dict(py, &outcome, "test_locs")?))
    }

    pub fn perform_test<'py>(
        &self, py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let data = build_tst_data(x, y)?;
        outcome_to_dict(py, &self.inner.perform_test(&data)?)
    }

    pub fn compute_stat<'py>(&self, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>) -> PyResult<f64> {
        let data = build_tst_data(x, y)?;
        Ok(self.inner.compute_stat(&data)?)
    }

    #[getter]
    pub fn test_locs<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.test_locs().clone().into_pyarray(py)
    }

    #[getter]
    pub fn gaussian_width(&self) -> f64 {
        self.inner.gaussian_width()
    }

    #[getter]
    pub fn alpha(&self) -> f64 {
        self.inner.alpha()
    }
}

/// SmoothCF — Python wrapper around [`SmoothCFTest`].
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_two_sample.statistical_tests")]
pub struct SmoothCF {
    inner: SmoothCFTest,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl SmoothCF {
    #[new]
    #[pyo3(
        signature = (test_freqs, gaussian_width, alpha = DEFAULT_ALPHA),
        text_signature = "(test_freqs, gaussian_width, /, alpha=0.01)"
    )]
    pub fn new<'py>(
        test_freqs: &Bound<'py, PyAny>, gaussian_width: f64, alpha: f64,
    ) -> PyResult<Self> {
        let test_freqs = extract_f64_matrix(test_freqs)?;
        Ok(Self { inner: SmoothCFTest::new(test_freqs, gaussian_width, alpha)? })
    }

    #[staticmethod]
    #[pyo3(signature = (x, y, n_test_freqs = DEFAULT_N_TEST_FREQS, alpha = DEFAULT_ALPHA, seed = DEFAULT_RANDN_SEED))]
    pub fn create_randn<'py>(
        x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>, n_test_freqs: usize, alpha: f64, seed: u64,
    ) -> PyResult<Self> {
        let data = build_tst_data(x, y)?;
        Ok(Self { inner: SmoothCFTest::create_randn(&data, n_test_freqs, alpha, seed)? })
    }

    #[staticmethod]
    #[pyo3(signature = (
        x, y, n_test_freqs = DEFAULT_N_TEST_FREQS, max_iter = None, freqs_step_size = None,
        gwidth_step_size = None, batch_proportion = None, tol_fun = None, seed = None,
        gradient = None
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn optimize_freqs_width<'py>(
        py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>, n_test_freqs: usize,
        max_iter: Option<usize>, freqs_step_size: Option<f64>, gwidth_step_size: Option<f64>,
        batch_proportion: Option<f64>, tol_fun: Option<f64>, seed: Option<u64>,
        gradient: Option<&str>,
    ) -> PyResult<OptimizedParams<'py>> {
        let data = build_tst_data(x, y)?;
        let opts = build_sga_options(
            SmoothCFTest::joint_options(),
            max_iter,
            freqs_step_size,
            gwidth_step_size,
            batch_proportion,
            tol_fun,
            seed,
            gradient,
        )?;
        let outcome = SmoothCFTest::optimize_freqs_width(&data, n_test_freqs, &opts)?;
        optimized_params(py, &outcome, "test_freqs")
    }

    #[staticmethod]
    #[pyo3(signature = (
        x, y, test_freqs, gwidth0 = None, max_iter = None, gwidth_step_size = None,
        batch_proportion = None, tol_fun = None, seed = None, gradient = None
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn optimize_gwidth<'py>(
        py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>,
        test_freqs: &Bound<'py, PyAny>, gwidth0: Option<f64>, max_iter: Option<usize>,
        gwidth_step_size: Option<f64>, batch_proportion: Option<f64>, tol_fun: Option<f64>,
        seed: Option<u64>, gradient: Option<&str>,
    ) -> PyResult<(f64, Bound<'py, PyDict>)> {
        let data = build_tst_data(x, y)?;
        let test_freqs = extract_f64_matrix(test_freqs)?;
        let opts = build_sga_options(
            SmoothCFTest::gwidth_options(),
            max_iter,
            None,
            gwidth_step_size,
            batch_proportion,
            tol_fun,
            seed,
            gradient,
        )?;
        let outcome = SmoothCFTest::optimize_gwidth(&data, test_freqs, gwidth0, &opts)?;
        Ok((outcome.gwidth, sga_info_to_dict(py, &outcome, "test_freqs")?))
    }

    pub fn perform_test<'py>(
        &self, py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let data = build_tst_data(x, y)?;
        outcome_to_dict(py, &self.inner.perform_test(&data)?)
    }

    pub fn compute_stat<'py>(&self, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>) -> PyResult<f64> {
        let data = build_tst_data(x, y)?;
        Ok(self.inner.compute_stat(&data)?)
    }

    #[getter]
    pub fn test_freqs<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.test_freqs().clone().into_pyarray(py)
    }

    #[getter]
    pub fn gaussian_width(&self) -> f64 {
        self.inner.gaussian_width()
    }

    #[getter]
    pub fn alpha(&self) -> f64 {
        self.inner.alpha()
    }
}

/// _rust_two_sample — Python extension module initializer.
///
/// Creates the `statistical_tests` submodule, attaches it to the parent
/// module, and registers it in `sys.modules` as
/// `rust_two_sample.statistical_tests`.
///
/// Errors
/// ------
/// - `PyErr` if creating the submodule or editing `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_two_sample<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let statistical_tests_mod = PyModule::new(_py, "statistical_tests")?;
    statistical_tests(_py, m, &statistical_tests_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_two_sample.statistical_tests", statistical_tests_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn statistical_tests<'py>(
    _py: Python, rust_two_sample: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<MeanEmbedding>()?;
    m.add_class::<SmoothCF>()?;
    rust_two_sample.add_submodule(m)?;
    Ok(())
}
