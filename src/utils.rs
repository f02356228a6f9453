//! PyO3 conversion helpers shared by the Python-facing classes in `lib.rs`.
#[cfg(feature = "python-bindings")]
use ndarray::Array2;

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{PyAny, PyDict},
};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::gradient_ascent::traits::{GradientMethod, SGAOptions, SGAOutcome},
    statistical_tests::{data::TSTData, outcome::TSTOutcome},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray, // ndarray/Vec → PyArray
    PyReadonlyArray2,
};

/// Convert a 2-D `numpy.ndarray`, `pandas.DataFrame`, or nested sequence of
/// floats into an owned `Array2<f64>`.
///
/// Errors
/// ------
/// - `TypeError` when the object is none of the accepted inputs.
/// - `ValueError` for ragged nested sequences.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(raw_data: &Bound<'py, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr_ro.as_array().to_owned());
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (), None) {
        if let Ok(frame_ro) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(frame_ro.as_array().to_owned());
        }
    }

    let rows: Vec<Vec<f64>> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err(
            "expected a 2-D numpy.ndarray, pandas.DataFrame, or nested sequence of float64",
        )
    })?;
    let n_cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != n_cols) {
        return Err(PyValueError::new_err("all rows must have the same length"));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((flat.len() / n_cols.max(1), n_cols), flat)
        .map_err(|e| PyValueError::new_err(format!("invalid matrix shape: {e}")))
}

/// Build a validated [`TSTData`] from two Python matrices.
#[cfg(feature = "python-bindings")]
pub fn build_tst_data<'py>(x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>) -> PyResult<TSTData> {
    let x = extract_f64_matrix(x)?;
    let y = extract_f64_matrix(y)?;
    Ok(TSTData::new(x, y)?)
}

/// Override the fields of `base` that the caller supplied and re-validate.
#[cfg(feature = "python-bindings")]
#[allow(clippy::too_many_arguments)]
pub fn build_sga_options(
    base: SGAOptions, max_iter: Option<usize>, test_params_step_size: Option<f64>,
    gwidth_step_size: Option<f64>, batch_proportion: Option<f64>, tol_fun: Option<f64>,
    seed: Option<u64>, gradient: Option<&str>,
) -> PyResult<SGAOptions> {
    let gradient = match gradient {
        Some(name) => name.parse::<GradientMethod>()?,
        None => base.gradient,
    };
    let opts = SGAOptions::new(
        max_iter.unwrap_or(base.max_iter),
        test_params_step_size.unwrap_or(base.test_params_step_size),
        gwidth_step_size.unwrap_or(base.gwidth_step_size),
        batch_proportion.unwrap_or(base.batch_proportion),
        tol_fun.unwrap_or(base.tol_fun),
        seed.unwrap_or(base.seed),
        gradient,
    )?;
    Ok(opts)
}

/// `{"alpha", "pvalue", "test_stat", "h0_rejected"}`.
#[cfg(feature = "python-bindings")]
pub fn outcome_to_dict<'py>(py: Python<'py>, outcome: &TSTOutcome) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("alpha", outcome.alpha())?;
    dict.set_item("pvalue", outcome.pvalue())?;
    dict.set_item("test_stat", outcome.test_stat())?;
    dict.set_item("h0_rejected", outcome.h0_rejected())?;
    Ok(dict)
}

/// Optimization info keyed by `params_key` (`"test_locs"` or
/// `"test_freqs"`): the `iterations × J × d` trajectory, the initial
/// matrix under `params_key + "0"`, `gwidths`, `obj_values`, plus
/// `converged` and `status`.
#[cfg(feature = "python-bindings")]
pub fn sga_info_to_dict<'py>(
    py: Python<'py>, outcome: &SGAOutcome, params_key: &str,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    let trajectory = outcome
        .trace
        .stacked_test_params()
        .map_err(|err| PyValueError::new_err(format!("inconsistent trajectory: {err}")))?;
    dict.set_item(params_key, trajectory.into_pyarray(py))?;
    dict.set_item(format!("{params_key}0"), outcome.test_params0.clone().into_pyarray(py))?;
    dict.set_item("gwidths", outcome.trace.gwidths.clone().into_pyarray(py))?;
    dict.set_item("obj_values", outcome.trace.obj_values.clone().into_pyarray(py))?;
    dict.set_item("converged", outcome.converged)?;
    dict.set_item("status", format!("{:?}", outcome.status))?;
    Ok(dict)
}
