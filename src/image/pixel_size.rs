//! Physical sample spacing along each image axis.

use std::fmt;

/// A magnitude with a unit, e.g. `0.5 µm`.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicalQuantity {
    pub magnitude: f64,
    pub units: String,
}

impl PhysicalQuantity {
    pub fn new(magnitude: f64, units: impl Into<String>) -> Self {
        Self {
            magnitude,
            units: units.into(),
        }
    }

    /// One pixel: the spacing of an image without physical calibration.
    pub fn pixel() -> Self {
        Self::new(1.0, "px")
    }
}

impl fmt::Display for PhysicalQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.units)
    }
}

/// Per-axis pixel size. Axes beyond the stored ones repeat the last entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PixelSize {
    sizes: Vec<PhysicalQuantity>,
}

impl PixelSize {
    /// The same spacing along every axis.
    pub fn isotropic(size: PhysicalQuantity) -> Self {
        Self { sizes: vec![size] }
    }

    /// Spacing along axis `dim`.
    pub fn get(&self, dim: usize) -> PhysicalQuantity {
        self.sizes
            .get(dim)
            .or_else(|| self.sizes.last())
            .cloned()
            .unwrap_or_else(PhysicalQuantity::pixel)
    }

    /// Sets the spacing along axis `dim`, extending the stored list as needed.
    pub fn set(&mut self, dim: usize, size: PhysicalQuantity) {
        if dim >= self.sizes.len() {
            let fill = self.get(dim);
            self.sizes.resize(dim + 1, fill);
        }
        self.sizes[dim] = size;
    }

    /// True if a calibration has been set.
    pub fn is_defined(&self) -> bool {
        !self.sizes.is_empty()
    }

    /// True if all axes have the same spacing.
    pub fn is_isotropic(&self) -> bool {
        self.sizes.windows(2).all(|w| w[0] == w[1])
    }

    /// Removes the calibration.
    pub fn clear(&mut self) {
        self.sizes.clear();
    }

    /// Moves the entries to follow a reordering of the axes (`out[i] = self[order[i]]`).
    pub(crate) fn permute(&mut self, order: &[usize]) {
        if self.sizes.len() > 1 {
            self.sizes = order.iter().map(|&dim| self.get(dim)).collect();
        }
    }

    /// Inserts an axis at `dim` with the spacing of its current neighbor.
    pub(crate) fn insert(&mut self, dim: usize) {
        if self.sizes.len() > 1 {
            let value = self.get(dim);
            let at = dim.min(self.sizes.len());
            self.sizes.insert(at, value);
        }
    }

    /// Removes axis `dim`.
    pub(crate) fn remove(&mut self, dim: usize) {
        if dim < self.sizes.len() && self.sizes.len() > 1 {
            self.sizes.remove(dim);
        }
    }
}
