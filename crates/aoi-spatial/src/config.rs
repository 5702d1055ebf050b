//! Grid construction parameters.

use serde::{Deserialize, Serialize};

use crate::{GridError, GridResult};

/// Shape of the map and of its cells, in world units.
///
/// The origin may be negative. Sizes must be positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default)]
    pub origin_x: i32,
    #[serde(default)]
    pub origin_y: i32,
    pub width: i32,
    pub height: i32,
    pub cell_width: i32,
    pub cell_height: i32,
}

impl GridConfig {
    /// A map of `width x height` with its origin at `(0, 0)`.
    #[must_use]
    pub const fn new(width: i32, height: i32, cell_width: i32, cell_height: i32) -> Self {
        Self {
            origin_x: 0,
            origin_y: 0,
            width,
            height,
            cell_width,
            cell_height,
        }
    }

    /// Move the map's origin.
    #[must_use]
    pub const fn with_origin(mut self, x: i32, y: i32) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    /// Build a config from min/max corners instead of origin + size.
    pub fn from_bounds(
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
        cell_width: i32,
        cell_height: i32,
    ) -> GridResult<Self> {
        if min_x >= max_x || min_y >= max_y {
            return Err(GridError::InvalidConfiguration(format!(
                "min ({min_x}, {min_y}) must be smaller than max ({max_x}, {max_y})"
            )));
        }
        let width = max_x.checked_sub(min_x).ok_or_else(|| overflow(min_x, max_x))?;
        let height = max_y.checked_sub(min_y).ok_or_else(|| overflow(min_y, max_y))?;
        let config = Self::new(width, height, cell_width, cell_height).with_origin(min_x, min_y);
        config.validate()?;
        Ok(config)
    }

    /// Check that every dimension is positive and the far corner fits in `i32`.
    pub fn validate(&self) -> GridResult<()> {
        if self.cell_width <= 0 || self.cell_height <= 0 {
            return Err(GridError::InvalidConfiguration(format!(
                "cell size must be positive, got {}x{}",
                self.cell_width, self.cell_height
            )));
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(GridError::InvalidConfiguration(format!(
                "map size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.origin_x.checked_add(self.width).is_none()
            || self.origin_y.checked_add(self.height).is_none()
        {
            return Err(GridError::InvalidConfiguration(format!(
                "map ({}, {}) + {}x{} overflows",
                self.origin_x, self.origin_y, self.width, self.height
            )));
        }
        Ok(())
    }

    /// Exclusive max x. Only meaningful after [`validate`](Self::validate).
    #[must_use]
    pub const fn max_x(&self) -> i32 {
        self.origin_x.saturating_add(self.width)
    }

    /// Exclusive max y. Only meaningful after [`validate`](Self::validate).
    #[must_use]
    pub const fn max_y(&self) -> i32 {
        self.origin_y.saturating_add(self.height)
    }

    /// Number of cell columns, rounding a partial last column up.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        (self.width as u32).div_ceil(self.cell_width as u32)
    }

    /// Number of cell rows, rounding a partial last row up.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        (self.height as u32).div_ceil(self.cell_height as u32)
    }
}

fn overflow(min: i32, max: i32) -> GridError {
    GridError::InvalidConfiguration(format!("span {min}..{max} overflows"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_and_cols_round_up() {
        let config = GridConfig::new(100, 100, 10, 5);
        assert_eq!(config.cols(), 10);
        assert_eq!(config.rows(), 20);

        let config = GridConfig::new(105, 31, 10, 10);
        assert_eq!(config.cols(), 11);
        assert_eq!(config.rows(), 4);
    }

    #[test]
    fn test_validate_rejects_non_positive_sizes() {
        for config in [
            GridConfig::new(100, 100, 0, 10),
            GridConfig::new(100, 100, 10, -1),
            GridConfig::new(0, 100, 10, 10),
            GridConfig::new(100, -5, 10, 10),
        ] {
            assert!(matches!(
                config.validate(),
                Err(GridError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_validate_rejects_overflow() {
        let config = GridConfig::new(100, 100, 10, 10).with_origin(i32::MAX - 50, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_bounds() {
        let config = GridConfig::from_bounds(-50, -20, 50, 80, 10, 10).unwrap();
        assert_eq!(config.origin_x, -50);
        assert_eq!(config.origin_y, -20);
        assert_eq!(config.width, 100);
        assert_eq!(config.height, 100);
        assert_eq!(config.max_x(), 50);
        assert_eq!(config.max_y(), 80);

        assert!(GridConfig::from_bounds(10, 0, 10, 100, 10, 10).is_err());
        assert!(GridConfig::from_bounds(0, 0, 100, 100, 0, 10).is_err());
    }

    #[test]
    fn test_deserialize_with_default_origin() {
        let config: GridConfig = serde_json::from_str(
            r#"{ "width": 1000, "height": 500, "cell_width": 50, "cell_height": 25 }"#,
        )
        .unwrap();

        assert_eq!(config, GridConfig::new(1000, 500, 50, 25));
        assert!(config.validate().is_ok());
    }
}
