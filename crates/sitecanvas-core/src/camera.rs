//! Camera module for scroll/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom factor the canvas allows.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom factor the canvas allows.
pub const MAX_ZOOM: f64 = 3.0;
/// Multiplier applied by a single zoom-in / zoom-out step.
pub const ZOOM_STEP: f64 = 1.2;
/// Padding (canvas pixels) added around content by fit-to-view.
pub const FIT_PADDING: f64 = 100.0;

/// Camera manages the view transform of a scrollable canvas.
///
/// The canvas sits inside a scroll container: `scroll` is the container's
/// scroll offset in screen pixels and `zoom` scales canvas space into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Scroll offset of the container (screen pixels, never negative).
    pub scroll: Vec2,
    /// Current zoom factor (1.0 = 100%).
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            scroll: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera at the given zoom (clamped).
    pub fn with_zoom(zoom: f64) -> Self {
        let mut camera = Self::default();
        camera.set_zoom(zoom);
        camera
    }

    /// Canvas-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(-self.scroll) * Affine::scale(self.zoom)
    }

    /// Screen-to-canvas transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(self.scroll)
    }

    /// Convert a pointer position (relative to the scroll container) to canvas space.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a canvas point to a position relative to the scroll container.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Set the zoom, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom, self.min_zoom, self.max_zoom);
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    /// Back to 100%.
    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    /// Set the scroll offset. Scroll containers cannot scroll past the origin.
    pub fn set_scroll(&mut self, scroll: Vec2) {
        self.scroll = Vec2::new(scroll.x.max(0.0), scroll.y.max(0.0));
    }

    /// Scroll by a delta in screen pixels.
    pub fn scroll_by(&mut self, delta: Vec2) {
        self.set_scroll(self.scroll + delta);
    }

    /// Fit the camera so `bounds` (plus padding) is visible and centered.
    ///
    /// Never zooms past 100%.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size) {
        let padded = bounds.inflate(FIT_PADDING, FIT_PADDING);
        if padded.width() <= 0.0 || padded.height() <= 0.0 {
            self.reset_zoom();
            return;
        }

        let scale_x = viewport.width / padded.width();
        let scale_y = viewport.height / padded.height();
        self.set_zoom(scale_x.min(scale_y).min(1.0));

        let center = padded.center();
        self.set_scroll(Vec2::new(
            center.x * self.zoom - viewport.width / 2.0,
            center.y * self.zoom - viewport.height / 2.0,
        ));
    }
}

/// Clamp a zoom factor to `[min, max]`.
pub fn clamp_zoom(zoom: f64, min: f64, max: f64) -> f64 {
    zoom.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.scroll, Vec2::ZERO);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_canvas_with_scroll() {
        let mut camera = Camera::new();
        camera.set_scroll(Vec2::new(50.0, 100.0));
        let canvas = camera.screen_to_canvas(Point::new(100.0, 200.0));
        assert!((canvas.x - 150.0).abs() < f64::EPSILON);
        assert!((canvas.y - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_canvas_with_zoom() {
        let camera = Camera::with_zoom(2.0);
        let canvas = camera.screen_to_canvas(Point::new(100.0, 200.0));
        assert!((canvas.x - 50.0).abs() < f64::EPSILON);
        assert!((canvas.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::with_zoom(1.5);
        camera.set_scroll(Vec2::new(30.0, 20.0));

        let original = Point::new(123.0, 456.0);
        let back = camera.canvas_to_screen(camera.screen_to_canvas(original));

        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_in_converges_to_max() {
        let mut camera = Camera::new();
        for _ in 0..50 {
            camera.zoom_in();
        }
        assert_eq!(camera.zoom, MAX_ZOOM);
        camera.zoom_in();
        assert_eq!(camera.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_zoom_out_converges_to_min() {
        let mut camera = Camera::new();
        for _ in 0..50 {
            camera.zoom_out();
        }
        assert_eq!(camera.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_reset_zoom() {
        let mut camera = Camera::new();
        camera.zoom_in();
        camera.zoom_in();
        camera.reset_zoom();
        assert_eq!(camera.zoom, 1.0);
    }

    #[test]
    fn test_scroll_clamped_at_origin() {
        let mut camera = Camera::new();
        camera.scroll_by(Vec2::new(-40.0, 25.0));
        assert_eq!(camera.scroll, Vec2::new(0.0, 25.0));
    }

    #[test]
    fn test_fit_never_zooms_past_100_percent() {
        let mut camera = Camera::new();
        camera.fit_to_bounds(Rect::new(0.0, 0.0, 100.0, 100.0), Size::new(2000.0, 2000.0));
        assert_eq!(camera.zoom, 1.0);
    }

    #[test]
    fn test_fit_shrinks_large_content() {
        let mut camera = Camera::new();
        // 1800 wide once padded, viewport 900 wide -> 0.5
        camera.fit_to_bounds(Rect::new(0.0, 0.0, 1600.0, 400.0), Size::new(900.0, 900.0));
        assert!((camera.zoom - 0.5).abs() < 1e-10);
        // padded center is (800, 200) -> screen (400, 100); viewport center (450, 450)
        assert_eq!(camera.scroll, Vec2::ZERO);
    }

    #[test]
    fn test_fit_centers_content() {
        let mut camera = Camera::new();
        camera.fit_to_bounds(Rect::new(1000.0, 1000.0, 1200.0, 1200.0), Size::new(800.0, 600.0));
        assert_eq!(camera.zoom, 1.0);
        let center = camera.canvas_to_screen(Point::new(1100.0, 1100.0));
        assert!((center.x - 400.0).abs() < 1e-10);
        assert!((center.y - 300.0).abs() < 1e-10);
    }
}
