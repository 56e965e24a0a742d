//! Effective-area accessor dispatching on detector conversion type.

use crate::irfs::{ConversionType, IrfError, IrfRegistry, Irfs};

/// A front/back pair of response handles for one IRF set.
///
/// Construction resolves `<irf_name>::FRONT` and `<irf_name>::BACK` through the
/// supplied registry; an unresolvable entry fails here, never at first query.
/// Queries select one of the two handles by the integer conversion-type flag
/// (0 = front, 1 = back) and return its effective area in cm².
#[derive(Debug)]
pub struct Aeff {
    front: Irfs,
    back: Irfs,
}

impl Aeff {
    pub fn new(registry: &IrfRegistry, irf_name: &str) -> Result<Self, IrfError> {
        let front = registry.create(&format!("{irf_name}::{}", ConversionType::Front.suffix()))?;
        let back = registry.create(&format!("{irf_name}::{}", ConversionType::Back.suffix()))?;
        Ok(Self { front, back })
    }

    /// Effective area at azimuth 0, equivalent to
    /// [`value_with_phi`](Self::value_with_phi) with `phi_deg = 0.0`.
    pub fn value(
        &self,
        energy_mev: f64,
        theta_deg: f64,
        conversion_type: i32,
    ) -> Result<f64, IrfError> {
        self.value_with_phi(energy_mev, theta_deg, conversion_type, 0.0)
    }

    pub fn value_with_phi(
        &self,
        energy_mev: f64,
        theta_deg: f64,
        conversion_type: i32,
        phi_deg: f64,
    ) -> Result<f64, IrfError> {
        let handle = match ConversionType::from_flag(conversion_type)? {
            ConversionType::Front => &self.front,
            ConversionType::Back => &self.back,
        };
        Ok(handle.aeff().value(energy_mev, theta_deg, phi_deg))
    }
}
