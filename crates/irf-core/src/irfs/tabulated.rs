use super::response::EffectiveArea;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },

    #[error("Table contains no rows")]
    Empty,

    #[error("Energy {energy} MeV in table row is not finite and positive")]
    NonPositiveEnergy { energy: f64 },

    #[error("Theta {theta} deg is outside [0, 90] in table row")]
    ThetaOutOfRange { theta: f64 },

    #[error("Non-finite effective area at energy {energy} MeV, theta {theta} deg")]
    NonFiniteArea { energy: f64, theta: f64 },

    #[error("Incomplete grid: missing cell at energy {energy} MeV, theta {theta} deg")]
    MissingCell { energy: f64, theta: f64 },

    #[error("Duplicate grid cell at energy {energy} MeV, theta {theta} deg")]
    DuplicateCell { energy: f64, theta: f64 },
}

#[derive(Debug, Deserialize)]
struct AeffRecord {
    energy: f64,
    theta: f64,
    aeff: f64,
}

/// An effective-area lookup table on a rectangular (energy, theta) grid.
///
/// Queries interpolate bilinearly in (log10 energy, cos theta) and clamp to the
/// table edges outside the covered range. The tables are phi-averaged, so the
/// azimuth argument of [`EffectiveArea::value`] is ignored.
#[derive(Debug, Clone)]
pub struct TabulatedAeff {
    // Ascending axes; `area` is row-major with one row per energy node.
    log_energies: Vec<f64>,
    cos_thetas: Vec<f64>,
    area: Vec<f64>,
}

impl TabulatedAeff {
    /// Loads a table from a CSV file with an `energy,theta,aeff` header.
    ///
    /// Energies are in MeV, thetas in degrees, areas in cm². The rows must form
    /// a complete rectangular grid (every energy paired with every theta);
    /// ordering within the file does not matter.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| TableError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut rows = Vec::new();
        for result in reader.deserialize::<AeffRecord>() {
            let record = result.map_err(|e| TableError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            rows.push(record);
        }
        Self::from_rows(&rows)
    }

    fn from_rows(rows: &[AeffRecord]) -> Result<Self, TableError> {
        if rows.is_empty() {
            return Err(TableError::Empty);
        }

        for row in rows {
            if !row.energy.is_finite() || row.energy <= 0.0 {
                return Err(TableError::NonPositiveEnergy { energy: row.energy });
            }
            if !(0.0..=90.0).contains(&row.theta) {
                return Err(TableError::ThetaOutOfRange { theta: row.theta });
            }
            if !row.aeff.is_finite() {
                return Err(TableError::NonFiniteArea {
                    energy: row.energy,
                    theta: row.theta,
                });
            }
        }

        // f64 bit patterns are usable as exact keys here because axis values
        // come verbatim from the file, never from arithmetic.
        let energies: BTreeSet<u64> = rows.iter().map(|r| r.energy.to_bits()).collect();
        let thetas: BTreeSet<u64> = rows.iter().map(|r| r.theta.to_bits()).collect();

        let mut energy_axis: Vec<f64> = energies.iter().map(|b| f64::from_bits(*b)).collect();
        let mut theta_axis: Vec<f64> = thetas.iter().map(|b| f64::from_bits(*b)).collect();
        energy_axis.sort_by(|a, b| a.total_cmp(b));
        theta_axis.sort_by(|a, b| a.total_cmp(b));

        let ne = energy_axis.len();
        let nt = theta_axis.len();
        let mut area = vec![f64::NAN; ne * nt];

        for row in rows {
            let ei = energy_axis
                .iter()
                .position(|e| *e == row.energy)
                .ok_or(TableError::Empty)?;
            let ti = theta_axis
                .iter()
                .position(|t| *t == row.theta)
                .ok_or(TableError::Empty)?;
            let cell = &mut area[ei * nt + ti];
            if cell.is_finite() {
                return Err(TableError::DuplicateCell {
                    energy: row.energy,
                    theta: row.theta,
                });
            }
            *cell = row.aeff;
        }

        for (idx, cell) in area.iter().enumerate() {
            if !cell.is_finite() {
                return Err(TableError::MissingCell {
                    energy: energy_axis[idx / nt],
                    theta: theta_axis[idx % nt],
                });
            }
        }

        let log_energies: Vec<f64> = energy_axis.iter().map(|e| e.log10()).collect();
        // cos is decreasing in theta, so the cos axis is the reversed theta axis.
        let cos_thetas: Vec<f64> = theta_axis
            .iter()
            .rev()
            .map(|t| t.to_radians().cos())
            .collect();
        let mut reordered = vec![0.0; ne * nt];
        for ei in 0..ne {
            for ti in 0..nt {
                reordered[ei * nt + (nt - 1 - ti)] = area[ei * nt + ti];
            }
        }

        Ok(Self {
            log_energies,
            cos_thetas,
            area: reordered,
        })
    }

    /// Number of (energy, theta) grid nodes.
    pub fn len(&self) -> usize {
        self.area.len()
    }

    pub fn is_empty(&self) -> bool {
        self.area.is_empty()
    }

    fn interpolate(&self, log_e: f64, cos_t: f64) -> f64 {
        let (elo, ehi, ex) = bracket(&self.log_energies, log_e);
        let (tlo, thi, tx) = bracket(&self.cos_thetas, cos_t);
        let nt = self.cos_thetas.len();

        let a00 = self.area[elo * nt + tlo];
        let a01 = self.area[elo * nt + thi];
        let a10 = self.area[ehi * nt + tlo];
        let a11 = self.area[ehi * nt + thi];

        let low = a00 + (a01 - a00) * tx;
        let high = a10 + (a11 - a10) * tx;
        low + (high - low) * ex
    }
}

/// Finds the interpolation cell for `x` on an ascending axis, clamping to the
/// edges. Returns the bracketing node indices and the fractional position in
/// [0, 1]; a single-node axis degenerates to that node.
fn bracket(axis: &[f64], x: f64) -> (usize, usize, f64) {
    let last = axis.len() - 1;
    if last == 0 || x <= axis[0] {
        return (0, 0, 0.0);
    }
    if x >= axis[last] {
        return (last, last, 0.0);
    }
    let i = match axis.binary_search_by(|v| v.total_cmp(&x)) {
        Ok(i) => i.min(last - 1),
        Err(i) => i - 1,
    };
    let frac = (x - axis[i]) / (axis[i + 1] - axis[i]);
    (i, i + 1, frac)
}

impl EffectiveArea for TabulatedAeff {
    fn value(&self, energy_mev: f64, theta_deg: f64, _phi_deg: f64) -> f64 {
        if !(energy_mev > 0.0) || !theta_deg.is_finite() {
            return 0.0;
        }
        let cos_t = theta_deg.clamp(0.0, 90.0).to_radians().cos();
        self.interpolate(energy_mev.log10(), cos_t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn grid_2x2() -> Vec<AeffRecord> {
        // 100 and 1000 MeV at theta 0 and 60 deg.
        vec![
            AeffRecord {
                energy: 100.0,
                theta: 0.0,
                aeff: 1000.0,
            },
            AeffRecord {
                energy: 100.0,
                theta: 60.0,
                aeff: 500.0,
            },
            AeffRecord {
                energy: 1000.0,
                theta: 0.0,
                aeff: 3000.0,
            },
            AeffRecord {
                energy: 1000.0,
                theta: 60.0,
                aeff: 1500.0,
            },
        ]
    }

    #[test]
    fn value_at_grid_nodes_returns_table_entries() {
        let table = TabulatedAeff::from_rows(&grid_2x2()).unwrap();
        assert!(f64_approx_equal(table.value(100.0, 0.0, 0.0), 1000.0));
        assert!(f64_approx_equal(table.value(100.0, 60.0, 0.0), 500.0));
        assert!(f64_approx_equal(table.value(1000.0, 0.0, 0.0), 3000.0));
        assert!(f64_approx_equal(table.value(1000.0, 60.0, 0.0), 1500.0));
    }

    #[test]
    fn value_interpolates_logarithmically_in_energy() {
        let table = TabulatedAeff::from_rows(&grid_2x2()).unwrap();
        // Geometric midpoint of 100 and 1000 MeV sits halfway in log space.
        let mid = table.value(1000.0f64.sqrt() * 10.0, 0.0, 0.0);
        assert!(f64_approx_equal(mid, 2000.0));
    }

    #[test]
    fn value_interpolates_in_cos_theta() {
        let table = TabulatedAeff::from_rows(&grid_2x2()).unwrap();
        // cos 0 = 1.0, cos 60 = 0.5; theta with cos = 0.75 sits halfway.
        let theta = 0.75f64.acos().to_degrees();
        assert!(f64_approx_equal(table.value(100.0, theta, 0.0), 750.0));
    }

    #[test]
    fn value_clamps_outside_the_covered_range() {
        let table = TabulatedAeff::from_rows(&grid_2x2()).unwrap();
        assert!(f64_approx_equal(table.value(10.0, 0.0, 0.0), 1000.0));
        assert!(f64_approx_equal(table.value(1e6, 0.0, 0.0), 3000.0));
        assert!(f64_approx_equal(table.value(100.0, 89.9, 0.0), 500.0));
    }

    #[test]
    fn value_ignores_the_azimuth_argument() {
        let table = TabulatedAeff::from_rows(&grid_2x2()).unwrap();
        assert_eq!(table.value(300.0, 30.0, 0.0), table.value(300.0, 30.0, 270.0));
    }

    #[test]
    fn value_is_zero_for_non_positive_energy() {
        let table = TabulatedAeff::from_rows(&grid_2x2()).unwrap();
        assert_eq!(table.value(0.0, 30.0, 0.0), 0.0);
        assert_eq!(table.value(-5.0, 30.0, 0.0), 0.0);
    }

    #[test]
    fn single_energy_tables_interpolate_in_theta_only() {
        let rows = vec![
            AeffRecord {
                energy: 100.0,
                theta: 0.0,
                aeff: 1000.0,
            },
            AeffRecord {
                energy: 100.0,
                theta: 60.0,
                aeff: 500.0,
            },
        ];
        let table = TabulatedAeff::from_rows(&rows).unwrap();
        assert!(f64_approx_equal(table.value(100.0, 0.0, 0.0), 1000.0));
        assert!(f64_approx_equal(table.value(5000.0, 0.0, 0.0), 1000.0));
        let theta = 0.75f64.acos().to_degrees();
        assert!(f64_approx_equal(table.value(100.0, theta, 0.0), 750.0));
    }

    #[test]
    fn from_rows_rejects_an_empty_table() {
        assert!(matches!(
            TabulatedAeff::from_rows(&[]),
            Err(TableError::Empty)
        ));
    }

    #[test]
    fn from_rows_rejects_an_incomplete_grid() {
        let mut rows = grid_2x2();
        rows.pop();
        assert!(matches!(
            TabulatedAeff::from_rows(&rows),
            Err(TableError::MissingCell { .. })
        ));
    }

    #[test]
    fn from_rows_rejects_duplicate_cells() {
        let mut rows = grid_2x2();
        rows.push(AeffRecord {
            energy: 100.0,
            theta: 0.0,
            aeff: 999.0,
        });
        assert!(matches!(
            TabulatedAeff::from_rows(&rows),
            Err(TableError::DuplicateCell { .. })
        ));
    }

    #[test]
    fn from_rows_rejects_non_finite_energies() {
        for bad in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut rows = grid_2x2();
            rows[0].energy = bad;
            assert!(matches!(
                TabulatedAeff::from_rows(&rows),
                Err(TableError::NonPositiveEnergy { .. })
            ));
        }
    }

    #[test]
    fn from_rows_rejects_non_finite_areas() {
        let mut rows = grid_2x2();
        rows[0].aeff = f64::NAN;
        assert!(matches!(
            TabulatedAeff::from_rows(&rows),
            Err(TableError::NonFiniteArea { .. })
        ));
    }

    #[test]
    fn load_reads_a_csv_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aeff.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "energy,theta,aeff").unwrap();
        writeln!(file, "100.0,0.0,1000.0").unwrap();
        writeln!(file, "100.0,60.0,500.0").unwrap();
        writeln!(file, "1000.0,0.0,3000.0").unwrap();
        writeln!(file, "1000.0,60.0,1500.0").unwrap();
        drop(file);

        let table = TabulatedAeff::load(&path).unwrap();
        assert_eq!(table.len(), 4);
        assert!(f64_approx_equal(table.value(1000.0, 60.0, 0.0), 1500.0));
    }

    #[test]
    fn load_fails_with_csv_error_on_malformed_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "energy,theta,aeff").unwrap();
        writeln!(file, "100.0,zero,1000.0").unwrap();
        drop(file);

        assert!(matches!(
            TabulatedAeff::load(&path),
            Err(TableError::Csv { .. })
        ));
    }
}
