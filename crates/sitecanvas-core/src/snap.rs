//! Snap functionality for aligning points to the grid.

use kurbo::Point;

/// Default grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Result of a snap operation.
#[derive(Debug, Clone, Copy)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Round a value to the nearest multiple of `grid_size`.
/// A non-positive grid size leaves the value untouched.
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    if grid_size <= 0.0 {
        return SnapResult::none(point);
    }

    SnapResult {
        point: Point::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size)),
        snapped_x: true,
        snapped_y: true,
    }
}

/// Snap a point when a grid is active; pass it through otherwise.
pub fn snap_point(point: Point, grid: Option<f64>) -> SnapResult {
    match grid {
        Some(size) => snap_to_grid(point, size),
        None => SnapResult::none(point),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid() {
        let result = snap_to_grid(Point::new(23.0, 37.0), 20.0);
        assert_eq!(result.point, Point::new(20.0, 40.0));
        assert!(result.is_snapped());
    }

    #[test]
    fn test_snap_to_grid_exact() {
        let result = snap_to_grid(Point::new(40.0, 60.0), 20.0);
        assert_eq!(result.point, Point::new(40.0, 60.0));
    }

    #[test]
    fn test_snap_to_grid_round_up() {
        let result = snap_to_grid(Point::new(30.0, 50.0), 20.0);
        assert_eq!(result.point, Point::new(40.0, 60.0));
    }

    #[test]
    fn test_snap_value_odd_grid() {
        assert_eq!(snap_value(10.0, 3.0), 9.0);
        assert_eq!(snap_value(110.0, 3.0), 111.0);
    }

    #[test]
    fn test_zero_grid_is_passthrough() {
        let result = snap_to_grid(Point::new(13.0, 7.0), 0.0);
        assert_eq!(result.point, Point::new(13.0, 7.0));
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_snap_point_disabled() {
        let result = snap_point(Point::new(13.0, 7.0), None);
        assert_eq!(result.point, Point::new(13.0, 7.0));
        assert!(!result.is_snapped());
    }
}
