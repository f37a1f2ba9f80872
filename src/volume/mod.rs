//! Voxel exposure-dose volume.
//!
//! A validated, immutable `(rows, columns, layers)` array of normalized dose
//! values in [0, 1]. Rows run along the slow axis, columns along the fast
//! axis, and layers along the axial direction (lowest plane first).

use std::path::Path;

use ndarray::{Array3, ArrayView2, Axis};
use tracing::{info, warn};

use crate::error::{message, Result, ValidationError};

/// Dimensions of a voxel volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeShape {
    /// Slow-axis pixel count (Y).
    pub rows: usize,
    /// Fast-axis pixel count (X).
    pub columns: usize,
    /// Layer count (Z).
    pub layers: usize,
}

impl VolumeShape {
    /// Create a new shape.
    pub const fn new(rows: usize, columns: usize, layers: usize) -> Self {
        Self {
            rows,
            columns,
            layers,
        }
    }

    /// Total voxel count.
    pub const fn voxels(&self) -> usize {
        self.rows * self.columns * self.layers
    }
}

/// Validated exposure-dose volume.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelVolume {
    doses: Array3<f64>,
}

impl VoxelVolume {
    /// Validate and normalize a dose array indexed `(row, column, layer)`.
    ///
    /// Doses above 1 are clamped to 1.
    ///
    /// # Errors
    ///
    /// Fails if any axis is empty, or any dose is negative or not finite.
    pub fn from_array(mut doses: Array3<f64>) -> Result<Self> {
        let (rows, columns, layers) = doses.dim();
        if rows == 0 || columns == 0 || layers == 0 {
            return Err(ValidationError::EmptyVolume {
                shape: (rows, columns, layers),
            }
            .into());
        }

        let mut clamped = 0usize;
        for (index, dose) in doses.indexed_iter_mut() {
            if !dose.is_finite() {
                return Err(ValidationError::NonFiniteDose { index }.into());
            }
            if *dose < 0.0 {
                return Err(ValidationError::NegativeDose {
                    index,
                    value: *dose,
                }
                .into());
            }
            if *dose > 1.0 {
                *dose = 1.0;
                clamped += 1;
            }
        }

        if clamped > 0 {
            warn!(clamped, "clamped voxel doses above 1.0");
        }

        Ok(Self { doses })
    }

    /// Synthesize a uniform volume of one dose.
    ///
    /// A dose above 1 is clamped to 1.
    ///
    /// # Errors
    ///
    /// Fails if any dimension is zero or the dose is negative or not finite.
    pub fn dense(rows: usize, columns: usize, layers: usize, dose: f64) -> Result<Self> {
        if !dose.is_finite() || dose < 0.0 {
            return Err(ValidationError::InvalidDenseDose(dose).into());
        }
        if rows == 0 || columns == 0 || layers == 0 {
            return Err(ValidationError::EmptyVolume {
                shape: (rows, columns, layers),
            }
            .into());
        }

        Ok(Self {
            doses: Array3::from_elem((rows, columns, layers), dose.min(1.0)),
        })
    }

    /// Load a 3-D float64 `.npy` file and validate it.
    pub fn load_npy<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let doses: Array3<f64> = ndarray_npy::read_npy(path)
            .map_err(|e| ValidationError::VolumeLoad(message(&e.to_string())))?;
        let volume = Self::from_array(doses)?;

        let shape = volume.shape();
        info!(
            path = %path.display(),
            rows = shape.rows,
            columns = shape.columns,
            layers = shape.layers,
            "loaded voxel volume"
        );
        Ok(volume)
    }

    /// Volume dimensions.
    pub fn shape(&self) -> VolumeShape {
        let (rows, columns, layers) = self.doses.dim();
        VolumeShape::new(rows, columns, layers)
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.doses.len_of(Axis(2))
    }

    /// One 2-D layer indexed `(row, column)`.
    ///
    /// # Panics
    ///
    /// Panics if `layer >= layer_count()`.
    pub fn layer(&self, layer: usize) -> ArrayView2<'_, f64> {
        self.doses.index_axis(Axis(2), layer)
    }

    /// Iterate layers from the lowest physical plane upward.
    pub fn layers(&self) -> impl Iterator<Item = ArrayView2<'_, f64>> {
        self.doses.axis_iter(Axis(2))
    }

    /// True if every dose in the layer is zero.
    pub fn is_layer_empty(&self, layer: usize) -> bool {
        self.layer(layer).iter().all(|&d| d == 0.0)
    }

    /// Dose at `(row, column, layer)`.
    pub fn get(&self, row: usize, column: usize, layer: usize) -> Option<f64> {
        self.doses.get((row, column, layer)).copied()
    }

    /// Underlying dose array.
    pub fn doses(&self) -> &Array3<f64> {
        &self.doses
    }
}

impl TryFrom<Array3<f64>> for VoxelVolume {
    type Error = crate::error::Error;

    fn try_from(doses: Array3<f64>) -> Result<Self> {
        Self::from_array(doses)
    }
}

impl core::fmt::Display for VolumeShape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}x{}", self.rows, self.columns, self.layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::prelude::*;

    #[test]
    fn test_shape_and_layers() {
        let volume = VoxelVolume::dense(3, 4, 2, 0.5).unwrap();
        assert_eq!(volume.shape(), VolumeShape::new(3, 4, 2));
        assert_eq!(volume.layer(1).dim(), (3, 4));
        assert_eq!(volume.layers().count(), 2);
        assert_eq!(volume.shape().voxels(), 24);
    }

    #[test]
    fn test_dense_clamps_high_dose() {
        let volume = VoxelVolume::dense(2, 2, 1, 3.0).unwrap();
        assert_eq!(volume.get(1, 1, 0), Some(1.0));
    }

    #[test]
    fn test_dense_rejects_negative_and_empty() {
        assert!(matches!(
            VoxelVolume::dense(2, 2, 1, -0.1),
            Err(Error::Validation(ValidationError::InvalidDenseDose(_)))
        ));
        assert!(matches!(
            VoxelVolume::dense(0, 2, 1, 0.5),
            Err(Error::Validation(ValidationError::EmptyVolume { .. }))
        ));
    }

    #[test]
    fn test_negative_voxel_reports_index() {
        let mut doses = Array3::zeros((2, 3, 2));
        doses[[1, 2, 1]] = -0.25;
        assert_eq!(
            VoxelVolume::from_array(doses),
            Err(Error::Validation(ValidationError::NegativeDose {
                index: (1, 2, 1),
                value: -0.25
            }))
        );
    }

    #[test]
    fn test_nan_voxel_rejected() {
        let mut doses = Array3::zeros((1, 1, 1));
        doses[[0, 0, 0]] = f64::NAN;
        assert!(matches!(
            VoxelVolume::from_array(doses),
            Err(Error::Validation(ValidationError::NonFiniteDose { .. }))
        ));
    }

    #[test]
    fn test_empty_layer_detection() {
        let mut doses = Array3::zeros((2, 2, 2));
        doses[[0, 1, 1]] = 0.3;
        let volume = VoxelVolume::from_array(doses).unwrap();
        assert!(volume.is_layer_empty(0));
        assert!(!volume.is_layer_empty(1));
    }

    proptest! {
        #[test]
        fn prop_doses_above_one_clamp(d in 1.0f64..1e6) {
            let volume = VoxelVolume::from_array(Array3::from_elem((2, 2, 1), d)).unwrap();
            prop_assert!(volume.doses().iter().all(|&v| v == 1.0));
        }

        #[test]
        fn prop_negative_doses_rejected(d in -1e6f64..-1e-12) {
            let result = VoxelVolume::from_array(Array3::from_elem((1, 2, 1), d));
            prop_assert!(
                matches!(result, Err(Error::Validation(ValidationError::NegativeDose { .. }))),
                "expected NegativeDose validation error"
            );
        }

        #[test]
        fn prop_unit_doses_unchanged(d in 0.0f64..=1.0) {
            let volume = VoxelVolume::from_array(Array3::from_elem((1, 1, 1), d)).unwrap();
            prop_assert_eq!(volume.get(0, 0, 0), Some(d));
        }
    }
}
