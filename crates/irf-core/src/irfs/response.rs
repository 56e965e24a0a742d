use super::tabulated::TableError;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum IrfError {
    #[error("Unknown IRF entry '{0}'; load a manifest or register it before lookup")]
    UnknownIrf(String),

    #[error("Invalid conversion type {0} (expected 0 for FRONT or 1 for BACK)")]
    InvalidConversionType(i32),

    #[error("Failed to release resources of IRF '{name}': {message}")]
    Release { name: String, message: String },

    #[error("Effective area table error: {0}")]
    Table(#[from] TableError),

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Detector-section selector for a conversion-type dispatch.
///
/// Front-converting and back-converting events are reconstructed with different
/// angular and energy resolution, so every response set carries one entry per
/// section. The integer encoding (0 = front, 1 = back) is the event-class
/// convention used by analysis scripts; anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionType {
    Front,
    Back,
}

impl ConversionType {
    pub fn from_flag(flag: i32) -> Result<Self, IrfError> {
        match flag {
            0 => Ok(ConversionType::Front),
            1 => Ok(ConversionType::Back),
            other => Err(IrfError::InvalidConversionType(other)),
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            ConversionType::Front => "FRONT",
            ConversionType::Back => "BACK",
        }
    }
}

/// The capability a response handle exposes for effective-area queries.
///
/// # Units
///
/// * `energy_mev` - true photon energy in MeV.
/// * `theta_deg` - inclination angle with respect to the instrument axis, in degrees.
/// * `phi_deg` - azimuth angle in degrees. Implementations backed by
///   phi-averaged tables may ignore it.
///
/// The returned value is an area in cm². Implementations that hold releasable
/// resources (memory maps, open files) override [`EffectiveArea::close`]; the
/// default is a no-op.
pub trait EffectiveArea: Send + Sync {
    fn value(&self, energy_mev: f64, theta_deg: f64, phi_deg: f64) -> f64;

    fn close(&mut self) -> Result<(), IrfError> {
        Ok(())
    }
}

/// An owned response-function handle resolved from an [`IrfRegistry`](super::IrfRegistry).
///
/// The handle owns its [`EffectiveArea`] exclusively for its lifetime. Dropping
/// the handle releases the underlying resources; a release failure is reported
/// as a `tracing` warning and never propagates out of the destructor.
pub struct Irfs {
    name: String,
    aeff: Box<dyn EffectiveArea>,
}

impl Irfs {
    pub fn new(name: impl Into<String>, aeff: Box<dyn EffectiveArea>) -> Self {
        Self {
            name: name.into(),
            aeff,
        }
    }

    /// The full registry entry name, e.g. `P8R3_SOURCE_V3::FRONT`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aeff(&self) -> &dyn EffectiveArea {
        self.aeff.as_ref()
    }
}

impl std::fmt::Debug for Irfs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Irfs").field("name", &self.name).finish()
    }
}

impl Drop for Irfs {
    fn drop(&mut self) {
        if let Err(e) = self.aeff.close() {
            warn!(irf = %self.name, error = %e, "failed to release IRF resources");
        }
    }
}
