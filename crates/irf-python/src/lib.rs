//! Python bindings exposing the irfkit adapters to interactive analysis sessions.
//!
//! The module mirrors the library surface an analysis script needs: the
//! effective-area accessor, parameter-group access, and the floating-point
//! exception toggle for numerical-debugging runs.

use irfkit::irfs::{IrfError, IrfRegistry};
use irfkit::params::{ParError, ParValue, ParameterStore};
use pyo3::exceptions::{PyIOError, PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::path::PathBuf;

fn irf_err(e: IrfError) -> PyErr {
    match e {
        IrfError::InvalidConversionType(_) => PyValueError::new_err(e.to_string()),
        IrfError::UnknownIrf(_) => PyValueError::new_err(e.to_string()),
        IrfError::Io { .. } => PyIOError::new_err(e.to_string()),
        _ => PyRuntimeError::new_err(e.to_string()),
    }
}

fn par_err(e: ParError) -> PyErr {
    match e {
        ParError::UnknownParameter(_) => PyKeyError::new_err(e.to_string()),
        ParError::TypeMismatch { .. } => PyValueError::new_err(e.to_string()),
        ParError::Io { .. } | ParError::GroupNotFound { .. } => PyIOError::new_err(e.to_string()),
        _ => PyRuntimeError::new_err(e.to_string()),
    }
}

/// Effective-area accessor for one response set, dispatching on conversion type.
#[pyclass]
struct Aeff {
    inner: irfkit::aeff::Aeff,
}

#[pymethods]
impl Aeff {
    /// Loads `manifest` into a fresh registry and resolves the FRONT and BACK
    /// entries of `irf_name`. Unresolvable entries fail here, not at first call.
    #[new]
    fn new(manifest: PathBuf, irf_name: &str) -> PyResult<Self> {
        let mut registry = IrfRegistry::new();
        registry.load_manifest(&manifest).map_err(irf_err)?;
        let inner = irfkit::aeff::Aeff::new(&registry, irf_name).map_err(irf_err)?;
        Ok(Self { inner })
    }

    /// Effective area in cm² for (energy [MeV], theta [deg], conversion type).
    ///
    /// Conversion type 0 selects the FRONT section, 1 the BACK section; any
    /// other value raises `ValueError`.
    #[pyo3(signature = (energy, theta, conversion_type, phi = 0.0))]
    fn __call__(&self, energy: f64, theta: f64, conversion_type: i32, phi: f64) -> PyResult<f64> {
        self.inner
            .value_with_phi(energy, theta, conversion_type, phi)
            .map_err(irf_err)
    }
}

/// A named parameter group loaded from a `.par` file on the PFILES search path.
#[pyclass(name = "ParGroup")]
struct PyParGroup {
    inner: irfkit::params::ParGroup,
}

#[pymethods]
impl PyParGroup {
    #[new]
    #[pyo3(signature = (app_name, pfiles = None))]
    fn new(app_name: &str, pfiles: Option<&str>) -> PyResult<Self> {
        let mut store = match pfiles {
            Some(raw) => ParameterStore::from_pfiles_value(raw),
            None => ParameterStore::from_pfiles().map_err(par_err)?,
        };
        let inner = store.group(app_name).map_err(par_err)?.clone();
        Ok(Self { inner })
    }

    /// Parameter names in file order.
    fn keys(&self) -> Vec<String> {
        self.inner.names().map(str::to_string).collect()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    /// The value converted per the declared parameter type: float for `r`,
    /// int for `i`, bool for `b`, str otherwise.
    fn __getitem__(&self, py: Python<'_>, name: &str) -> PyResult<Py<PyAny>> {
        let value = self
            .inner
            .get(name)
            .map_err(par_err)?
            .typed_value()
            .map_err(par_err)?;
        match value {
            ParValue::Bool(v) => Ok(v.into_pyobject(py)?.to_owned().into_any().unbind()),
            ParValue::Int(v) => Ok(v.into_pyobject(py)?.into_any().unbind()),
            ParValue::Real(v) => Ok(v.into_pyobject(py)?.into_any().unbind()),
            ParValue::Text(v) => Ok(v.into_pyobject(py)?.into_any().unbind()),
        }
    }

    fn __setitem__(&mut self, name: &str, value: Bound<'_, PyAny>) -> PyResult<()> {
        let rendered = value.str()?.to_string();
        self.inner.set(name, rendered).map_err(par_err)
    }

    /// ` name=value` pairs for handing the group to a command-line tool.
    fn command_line(&self) -> String {
        self.inner.command_line()
    }

    /// Writes the group back to its `.par` file, or to `path` when given.
    #[pyo3(signature = (path = None))]
    fn write(&self, path: Option<PathBuf>) -> PyResult<()> {
        match path {
            Some(p) => self.inner.save_as(&p),
            None => self.inner.save(),
        }
        .map_err(par_err)
    }
}

/// Enables hardware floating-point exception traps for this process.
///
/// Raises `RuntimeError` on builds without trapping support.
#[pyfunction]
fn enable_fpe() -> PyResult<()> {
    irfkit::fpe::enable_fpe().map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

/// Whether `enable_fpe` can succeed on this build.
#[pyfunction]
fn fpe_trapping_supported() -> bool {
    irfkit::fpe::trapping_supported()
}

#[pymodule(name = "irfkit")]
fn irfkit_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Aeff>()?;
    m.add_class::<PyParGroup>()?;
    m.add_function(wrap_pyfunction!(enable_fpe, m)?)?;
    m.add_function(wrap_pyfunction!(fpe_trapping_supported, m)?)?;
    Ok(())
}
