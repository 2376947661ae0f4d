//! Dense travel matrix.

use serde::{Deserialize, Serialize};

/// Distance and time for travelling between two locations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceTime {
    /// Travel distance.
    pub distance: f64,
    /// Travel time.
    pub time: f64,
}

impl DistanceTime {
    /// Creates a distance/time pair.
    pub fn new(distance: f64, time: f64) -> Self {
        Self { distance, time }
    }
}

/// A dense n×n matrix of [`DistanceTime`] pairs stored in row-major order.
///
/// Rows are indexed by the origin location index and columns by the
/// destination. The matrix may be asymmetric.
///
/// # Examples
///
/// ```
/// use u_territory::distance::TravelMatrix;
///
/// let tm = TravelMatrix::euclidean(&[(0.0, 0.0), (3.0, 4.0)], 2.0);
/// assert!((tm.get(0, 1).distance - 5.0).abs() < 1e-10);
/// assert!((tm.get(0, 1).time - 2.5).abs() < 1e-10);
/// assert_eq!(tm.size(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelMatrix {
    data: Vec<DistanceTime>,
    size: usize,
}

impl TravelMatrix {
    /// Creates a travel matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![DistanceTime::default(); size * size],
            size,
        }
    }

    /// Computes a straight-line matrix from planar points.
    ///
    /// Time is distance divided by `speed`.
    pub fn euclidean(points: &[(f64, f64)], speed: f64) -> Self {
        let n = points.len();
        let mut tm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = points[i].0 - points[j].0;
                let dy = points[i].1 - points[j].1;
                let d = (dx * dx + dy * dy).sqrt();
                let dt = DistanceTime::new(d, d / speed);
                tm.set(i, j, dt);
                tm.set(j, i, dt);
            }
        }
        tm
    }

    /// Creates a travel matrix from an explicit n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<DistanceTime>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Returns the travel from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> DistanceTime {
        self.data[from * self.size + to]
    }

    /// Sets the travel from location `from` to location `to`.
    pub fn set(&mut self, from: usize, to: usize, travel: DistanceTime) {
        self.data[from * self.size + to] = travel;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if both distance and time are symmetric within `tol`.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                let a = self.get(i, j);
                let b = self.get(j, i);
                if (a.distance - b.distance).abs() > tol || (a.time - b.time).abs() > tol {
                    return false;
                }
            }
        }
        true
    }
}
