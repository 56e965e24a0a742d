//! Instrument-response-function handles and the registry that resolves them.
//!
//! A response set is published under a base name (for example `P8R3_SOURCE_V3`)
//! with one entry per detector section, `<name>::FRONT` and `<name>::BACK`.
//! Callers build an [`IrfRegistry`], populate it programmatically or from a TOML
//! manifest, and resolve owned [`Irfs`] handles by full entry name. Each handle
//! exposes its effective area through the [`EffectiveArea`] capability.

pub mod registry;
pub mod response;
pub mod tabulated;

pub use registry::IrfRegistry;
pub use response::{ConversionType, EffectiveArea, Irfs, IrfError};
pub use tabulated::TabulatedAeff;
