//! Locations as indices into the travel matrix.

use serde::{Deserialize, Serialize};

/// Raw coordinates carried alongside a location for reporting and plotting.
///
/// The optimiser never reads these; all travel lookups go through the
/// location index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Coordinates {
    /// No coordinates supplied.
    #[default]
    None,
    /// Planar coordinates.
    Xy {
        /// Horizontal position.
        x: f64,
        /// Vertical position.
        y: f64,
    },
    /// Geographic coordinates in degrees.
    LatLong {
        /// Latitude.
        lat: f64,
        /// Longitude.
        lon: f64,
    },
}

/// A position identified by its row/column index in the travel matrix.
///
/// # Examples
///
/// ```
/// use u_territory::models::{Coordinates, Location};
///
/// let loc = Location::xy(4, 1.5, -2.0);
/// assert_eq!(loc.index(), 4);
/// assert_eq!(loc.coordinates(), Coordinates::Xy { x: 1.5, y: -2.0 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    index: usize,
    coordinates: Coordinates,
}

impl Location {
    /// Creates a location without coordinates.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            coordinates: Coordinates::None,
        }
    }

    /// Creates a planar location.
    pub fn xy(index: usize, x: f64, y: f64) -> Self {
        Self {
            index,
            coordinates: Coordinates::Xy { x, y },
        }
    }

    /// Creates a geographic location.
    pub fn lat_long(index: usize, lat: f64, lon: f64) -> Self {
        Self {
            index,
            coordinates: Coordinates::LatLong { lat, lon },
        }
    }

    /// Travel matrix index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Pass-through coordinates.
    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }
}
