use thiserror::Error;

// ---------------------------------------------------------------------------
// DatasetError – typed domain errors for table and series construction
// ---------------------------------------------------------------------------

/// Errors raised while building or normalizing datasets.
///
/// Load-time I/O failures are reported through `anyhow` in the loader;
/// these are the domain-level failures that can occur on already-parsed
/// numeric data.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("{name}: columns have unequal lengths ({lengths:?})")]
    RaggedColumns { name: String, lengths: Vec<usize> },

    #[error("{name}: energy not strictly increasing at sample {index}")]
    NonIncreasingEnergy { name: String, index: usize },

    #[error("{name}: non-finite value at sample {index}")]
    NonFiniteValue { name: String, index: usize },

    #[error("{name}: negative flux at sample {index}")]
    NegativeFlux { name: String, index: usize },

    #[error("{name}: band has lower bound above upper bound at sample {index}")]
    InvertedBand { name: String, index: usize },

    #[error("{name}: decade correction applied twice")]
    AlreadyCorrected { name: String },

    #[error("{name}: operation references column {column}, table has {n_columns}")]
    NoSuchColumn {
        name: String,
        column: usize,
        n_columns: usize,
    },
}

// ---------------------------------------------------------------------------
// RawTable – a parsed numeric table, column-major
// ---------------------------------------------------------------------------

/// A raw numeric table as read from a file or a literal data block:
/// column 0 is energy, columns 1.. are flux or flux-bound values.
///
/// Values stay in the source's units until [`crate::data::normalize`]
/// converts them to base units. The `decade_corrected` flag is the
/// one-shot guard against applying the bins-per-decade correction twice;
/// several published datasets ship pre-corrected and must not be scaled
/// again downstream.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Dataset name, used in error messages and the figure legend.
    pub name: String,
    columns: Vec<Vec<f64>>,
    decade_corrected: bool,
}

impl RawTable {
    /// Build a table from equal-length columns.
    pub fn from_columns(name: &str, columns: Vec<Vec<f64>>) -> Result<Self, DatasetError> {
        let lengths: Vec<usize> = columns.iter().map(Vec::len).collect();
        if lengths.windows(2).any(|w| w[0] != w[1]) {
            return Err(DatasetError::RaggedColumns {
                name: name.to_string(),
                lengths,
            });
        }
        Ok(RawTable {
            name: name.to_string(),
            columns,
            decade_corrected: false,
        })
    }

    /// Build a table from row-major data (the loader's natural output).
    /// All rows must have the same width.
    pub fn from_rows(name: &str, rows: &[Vec<f64>]) -> Result<Self, DatasetError> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(DatasetError::RaggedColumns {
                name: name.to_string(),
                lengths: vec![width, bad.len()],
            });
        }
        let columns = (0..width)
            .map(|c| rows.iter().map(|r| r[c]).collect())
            .collect();
        Ok(RawTable {
            name: name.to_string(),
            columns,
            decade_corrected: false,
        })
    }

    /// Number of samples (rows).
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Result<&[f64], DatasetError> {
        self.columns
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| DatasetError::NoSuchColumn {
                name: self.name.clone(),
                column: index,
                n_columns: self.columns.len(),
            })
    }

    pub(crate) fn column_mut(&mut self, index: usize) -> Result<&mut Vec<f64>, DatasetError> {
        let n_columns = self.columns.len();
        let name = self.name.clone();
        self.columns
            .get_mut(index)
            .ok_or(DatasetError::NoSuchColumn {
                name,
                column: index,
                n_columns,
            })
    }

    pub fn decade_corrected(&self) -> bool {
        self.decade_corrected
    }

    pub(crate) fn mark_decade_corrected(&mut self) -> Result<(), DatasetError> {
        if self.decade_corrected {
            return Err(DatasetError::AlreadyCorrected {
                name: self.name.clone(),
            });
        }
        self.decade_corrected = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Series – an (energy, value) curve in base units
// ---------------------------------------------------------------------------

/// An ordered curve of (energy, value) samples in base units.
/// Used for published limits, model curves and computed sensitivities.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub energy: Vec<f64>,
    pub value: Vec<f64>,
}

impl Series {
    /// Validate strictly increasing energies and finite, non-negative values.
    pub fn new(name: &str, energy: Vec<f64>, value: Vec<f64>) -> Result<Self, DatasetError> {
        if energy.len() != value.len() {
            return Err(DatasetError::RaggedColumns {
                name: name.to_string(),
                lengths: vec![energy.len(), value.len()],
            });
        }
        check_energy_axis(name, &energy)?;
        for (i, &v) in value.iter().enumerate() {
            if !v.is_finite() {
                return Err(DatasetError::NonFiniteValue {
                    name: name.to_string(),
                    index: i,
                });
            }
            if v < 0.0 {
                return Err(DatasetError::NegativeFlux {
                    name: name.to_string(),
                    index: i,
                });
            }
        }
        Ok(Series {
            name: name.to_string(),
            energy,
            value,
        })
    }

    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }
}

// ---------------------------------------------------------------------------
// BandSeries – a filled (energy, lo, hi) region
// ---------------------------------------------------------------------------

/// A filled band between two curves sharing one energy axis.
#[derive(Debug, Clone)]
pub struct BandSeries {
    pub name: String,
    pub energy: Vec<f64>,
    pub lo: Vec<f64>,
    pub hi: Vec<f64>,
}

impl BandSeries {
    pub fn new(
        name: &str,
        energy: Vec<f64>,
        lo: Vec<f64>,
        hi: Vec<f64>,
    ) -> Result<Self, DatasetError> {
        if energy.len() != lo.len() || energy.len() != hi.len() {
            return Err(DatasetError::RaggedColumns {
                name: name.to_string(),
                lengths: vec![energy.len(), lo.len(), hi.len()],
            });
        }
        check_energy_axis(name, &energy)?;
        for (i, (&l, &h)) in lo.iter().zip(hi.iter()).enumerate() {
            if !l.is_finite() || !h.is_finite() {
                return Err(DatasetError::NonFiniteValue {
                    name: name.to_string(),
                    index: i,
                });
            }
            if l > h {
                return Err(DatasetError::InvertedBand {
                    name: name.to_string(),
                    index: i,
                });
            }
        }
        Ok(BandSeries {
            name: name.to_string(),
            energy,
            lo,
            hi,
        })
    }
}

// ---------------------------------------------------------------------------
// MeasurementSeries – data points with asymmetric errors / upper limits
// ---------------------------------------------------------------------------

/// Upper error of a measured point. A zero-valued upper error bar in the
/// published table means the point is a one-sided 90% CL upper limit, not
/// a detection with vanishing uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpperError {
    Bar(f64),
    UpperLimit,
}

/// One measured flux point in base units; `e2_flux` is E²-weighted.
#[derive(Debug, Clone, Copy)]
pub struct MeasurementPoint {
    pub energy: f64,
    pub e2_flux: f64,
    pub err_down: f64,
    pub err_up: UpperError,
}

impl MeasurementPoint {
    pub fn is_upper_limit(&self) -> bool {
        matches!(self.err_up, UpperError::UpperLimit)
    }
}

/// A set of measured points from one experiment.
#[derive(Debug, Clone)]
pub struct MeasurementSeries {
    pub name: String,
    pub points: Vec<MeasurementPoint>,
}

impl MeasurementSeries {
    pub fn new(name: &str, points: Vec<MeasurementPoint>) -> Result<Self, DatasetError> {
        let energy: Vec<f64> = points.iter().map(|p| p.energy).collect();
        check_energy_axis(name, &energy)?;
        for (i, p) in points.iter().enumerate() {
            let up_finite = match p.err_up {
                UpperError::Bar(b) => b.is_finite(),
                UpperError::UpperLimit => true,
            };
            if !p.e2_flux.is_finite() || !p.err_down.is_finite() || !up_finite {
                return Err(DatasetError::NonFiniteValue {
                    name: name.to_string(),
                    index: i,
                });
            }
            if p.e2_flux < 0.0 {
                return Err(DatasetError::NegativeFlux {
                    name: name.to_string(),
                    index: i,
                });
            }
        }
        Ok(MeasurementSeries {
            name: name.to_string(),
            points,
        })
    }
}

fn check_energy_axis(name: &str, energy: &[f64]) -> Result<(), DatasetError> {
    for (i, &e) in energy.iter().enumerate() {
        if !e.is_finite() {
            return Err(DatasetError::NonFiniteValue {
                name: name.to_string(),
                index: i,
            });
        }
        if i > 0 && e <= energy[i - 1] {
            return Err(DatasetError::NonIncreasingEnergy {
                name: name.to_string(),
                index: i,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_transposes() {
        let t = RawTable::from_rows("t", &[vec![1.0, 10.0], vec![2.0, 20.0]]).unwrap();
        assert_eq!(t.column(0).unwrap(), &[1.0, 2.0]);
        assert_eq!(t.column(1).unwrap(), &[10.0, 20.0]);
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = RawTable::from_rows("t", &[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, DatasetError::RaggedColumns { .. }));
    }

    #[test]
    fn series_requires_increasing_energy() {
        let err = Series::new("s", vec![1.0, 1.0], vec![0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::NonIncreasingEnergy { index: 1, .. }
        ));
    }

    #[test]
    fn series_rejects_negative_flux() {
        let err = Series::new("s", vec![1.0, 2.0], vec![0.5, -0.5]).unwrap_err();
        assert!(matches!(err, DatasetError::NegativeFlux { index: 1, .. }));
    }

    #[test]
    fn band_bounds_ordered() {
        let err =
            BandSeries::new("b", vec![1.0, 2.0], vec![3.0, 3.0], vec![4.0, 2.0]).unwrap_err();
        assert!(matches!(err, DatasetError::InvertedBand { index: 1, .. }));
    }

    #[test]
    fn correction_guard_fires_once() {
        let mut t = RawTable::from_columns("t", vec![vec![1.0], vec![2.0]]).unwrap();
        t.mark_decade_corrected().unwrap();
        assert!(t.mark_decade_corrected().is_err());
    }
}
