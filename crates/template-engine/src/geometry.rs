//! Coordinate transformation between viewport and page space, and the
//! clamping rules that keep every variable on its page
//!
//! Page space has a top-left origin and is independent of zoom and pan.
//! The viewport is whatever surface the page is drawn on: a point there is
//! mapped back with `(point - canvas_origin) / zoom`.

use crate::error::{EngineError, Result};
use shared_types::{PageSize, Size, Variable};

/// Slack allowed on computed edges, in page units
pub const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn translate(self, delta: Point) -> Point {
        Point::new(self.x + delta.x, self.y + delta.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn of(variable: &Variable) -> Self {
        Self::new(
            variable.position.x,
            variable.position.y,
            variable.size.width,
            variable.size.height,
        )
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// True when the rect lies inside `bounds` and is at least `min` in size,
    /// allowing for rounding on the far edges
    pub fn fits(&self, bounds: PageSize, min: Size) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.right() <= bounds.width + TOLERANCE
            && self.bottom() <= bounds.height + TOLERANCE
            && self.width >= min.width - TOLERANCE
            && self.height >= min.height - TOLERANCE
    }

    /// Same rect with a bottom-left origin, as PDF content streams expect
    pub fn to_pdf_space(&self, page_height: f64) -> Rect {
        Rect::new(self.x, page_height - self.bottom(), self.width, self.height)
    }
}

/// Placement of the page on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    canvas_origin: Point,
    zoom: f64,
}

impl Viewport {
    /// Zoom must be a positive, finite factor
    pub fn new(canvas_origin: Point, zoom: f64) -> Result<Self> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(EngineError::validation(format!(
                "zoom must be positive, got {}",
                zoom
            )));
        }
        Ok(Self {
            canvas_origin,
            zoom,
        })
    }

    pub fn canvas_origin(&self) -> Point {
        self.canvas_origin
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn to_page(&self, viewport_point: Point) -> Point {
        to_page(viewport_point, self.canvas_origin, self.zoom)
    }

    pub fn to_viewport(&self, page_point: Point) -> Point {
        to_viewport(page_point, self.canvas_origin, self.zoom)
    }

    /// Length in page units of a viewport distance
    pub fn page_length(&self, viewport_length: f64) -> f64 {
        viewport_length / self.zoom
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            canvas_origin: Point::default(),
            zoom: 1.0,
        }
    }
}

/// Convert a viewport point to page space
pub fn to_page(viewport_point: Point, canvas_origin: Point, zoom: f64) -> Point {
    Point::new(
        (viewport_point.x - canvas_origin.x) / zoom,
        (viewport_point.y - canvas_origin.y) / zoom,
    )
}

/// Convert a page-space point to the viewport
pub fn to_viewport(page_point: Point, canvas_origin: Point, zoom: f64) -> Point {
    Point::new(
        page_point.x * zoom + canvas_origin.x,
        page_point.y * zoom + canvas_origin.y,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampMode {
    /// Keep the size, shift the origin
    Move,
    /// Reduce the size first, shift the origin only if that is not enough
    Resize,
}

/// Adjust `rect` so it lies fully inside `bounds` with each side at least
/// `min`. Total for finite input; non-finite coordinates are treated as 0.
pub fn clamp(rect: Rect, bounds: PageSize, min: Size, mode: ClampMode) -> Rect {
    let (x, width) = fit_span(
        finite_or(rect.x, 0.0),
        finite_or(rect.width, min.width),
        bounds.width,
        min.width,
        mode,
    );
    let (y, height) = fit_span(
        finite_or(rect.y, 0.0),
        finite_or(rect.height, min.height),
        bounds.height,
        min.height,
        mode,
    );
    Rect::new(x, y, width, height)
}

fn fit_span(origin: f64, len: f64, limit: f64, min_len: f64, mode: ClampMode) -> (f64, f64) {
    let min_len = min_len.min(limit);
    match mode {
        ClampMode::Move => {
            let len = len.max(min_len).min(limit);
            (origin.clamp(0.0, limit - len), len)
        }
        ClampMode::Resize => {
            let origin = origin.max(0.0);
            let len = len.min(limit - origin).max(min_len);
            (origin.min(limit - len), len)
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Resize handles, named for a top-left origin page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthWest,
        Corner::SouthEast,
    ];

    pub fn opposite(self) -> Corner {
        match self {
            Corner::NorthWest => Corner::SouthEast,
            Corner::NorthEast => Corner::SouthWest,
            Corner::SouthWest => Corner::NorthEast,
            Corner::SouthEast => Corner::NorthWest,
        }
    }

    fn is_west(self) -> bool {
        matches!(self, Corner::NorthWest | Corner::SouthWest)
    }

    fn is_north(self) -> bool {
        matches!(self, Corner::NorthWest | Corner::NorthEast)
    }

    /// The point of `rect` this corner sits on
    pub fn point(self, rect: &Rect) -> Point {
        let x = if self.is_west() { rect.x } else { rect.right() };
        let y = if self.is_north() { rect.y } else { rect.bottom() };
        Point::new(x, y)
    }

    /// Rect that results from moving this corner by `delta` from `start`
    pub fn drag(self, start: &Rect, delta: Point) -> Rect {
        let (x, width) = if self.is_west() {
            (start.x + delta.x, start.width - delta.x)
        } else {
            (start.x, start.width + delta.x)
        };
        let (y, height) = if self.is_north() {
            (start.y + delta.y, start.height - delta.y)
        } else {
            (start.y, start.height + delta.y)
        };
        Rect::new(x, y, width, height)
    }

    /// Handle under `point`, if any. `half` is half the handle's side.
    pub fn hit(rect: &Rect, point: Point, half: f64) -> Option<Corner> {
        Corner::ALL.into_iter().find(|corner| {
            let c = corner.point(rect);
            (point.x - c.x).abs() <= half && (point.y - c.y).abs() <= half
        })
    }
}

/// Resize `current` by dragging `corner` to where it sits in `proposed`.
///
/// The opposite corner stays exactly where it is. The dragged corner is
/// held inside the page and never closer than `min` to the fixed one, so
/// an over-shrink stops at the minimum instead of failing.
pub fn resize_from_corner(
    current: Rect,
    corner: Corner,
    proposed: Rect,
    bounds: PageSize,
    min: Size,
) -> Rect {
    let anchor = corner.opposite().point(&current);
    let wanted = corner.point(&proposed);
    let dragged = Point::new(finite_or(wanted.x, anchor.x), finite_or(wanted.y, anchor.y));

    let (x, width) = if corner.is_west() {
        let edge = dragged.x.clamp(0.0, (anchor.x - min.width).max(0.0));
        (edge, anchor.x - edge)
    } else {
        let edge = dragged
            .x
            .clamp((anchor.x + min.width).min(bounds.width), bounds.width);
        (anchor.x, edge - anchor.x)
    };

    let (y, height) = if corner.is_north() {
        let edge = dragged.y.clamp(0.0, (anchor.y - min.height).max(0.0));
        (edge, anchor.y - edge)
    } else {
        let edge = dragged
            .y
            .clamp((anchor.y + min.height).min(bounds.height), bounds.height);
        (anchor.y, edge - anchor.y)
    };

    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4: PageSize = PageSize::a4();
    const MIN: Size = Size::new(20.0, 20.0);

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_to_page_identity_at_zoom_1() {
        let p = to_page(Point::new(120.0, 80.0), Point::default(), 1.0);
        assert_eq!(p, Point::new(120.0, 80.0));
    }

    #[test]
    fn test_to_page_divides_by_zoom() {
        let p = to_page(Point::new(120.0, 80.0), Point::default(), 2.0);
        assert_eq!(p, Point::new(60.0, 40.0));
    }

    #[test]
    fn test_to_page_subtracts_canvas_origin() {
        let p = to_page(Point::new(150.0, 100.0), Point::new(30.0, 20.0), 1.5);
        assert_close(p.x, 80.0);
        assert_close(p.y, 80.0 / 1.5);
    }

    #[test]
    fn test_viewport_rejects_non_positive_zoom() {
        assert!(Viewport::new(Point::default(), 0.0).is_err());
        assert!(Viewport::new(Point::default(), -1.0).is_err());
        assert!(Viewport::new(Point::default(), f64::NAN).is_err());
        assert!(Viewport::new(Point::default(), 0.25).is_ok());
    }

    #[test]
    fn test_clamp_move_keeps_size() {
        let rect = clamp(Rect::new(550.0, 830.0, 100.0, 30.0), A4, MIN, ClampMode::Move);
        assert_eq!(rect, Rect::new(495.0, 812.0, 100.0, 30.0));
    }

    #[test]
    fn test_clamp_move_negative_origin() {
        let rect = clamp(Rect::new(-40.0, -5.0, 100.0, 30.0), A4, MIN, ClampMode::Move);
        assert_eq!(rect, Rect::new(0.0, 0.0, 100.0, 30.0));
    }

    #[test]
    fn test_clamp_resize_reduces_size_first() {
        let rect = clamp(Rect::new(500.0, 10.0, 280.0, 30.0), A4, MIN, ClampMode::Resize);
        assert_eq!(rect, Rect::new(500.0, 10.0, 95.0, 30.0));
    }

    #[test]
    fn test_clamp_resize_shifts_origin_when_size_cannot_fit() {
        let rect = clamp(Rect::new(590.0, 10.0, 50.0, 30.0), A4, MIN, ClampMode::Resize);
        assert_eq!(rect, Rect::new(575.0, 10.0, 20.0, 30.0));
    }

    #[test]
    fn test_clamp_enforces_min_size() {
        let rect = clamp(Rect::new(10.0, 10.0, 5.0, 2.0), A4, MIN, ClampMode::Move);
        assert_eq!(rect.size(), MIN);
    }

    #[test]
    fn test_clamp_non_finite_input() {
        let rect = clamp(
            Rect::new(f64::NAN, f64::INFINITY, f64::NAN, 30.0),
            A4,
            MIN,
            ClampMode::Move,
        );
        assert!(rect.fits(A4, MIN));
    }

    #[test]
    fn test_resize_south_east_clamps_to_page_edge() {
        let current = Rect::new(500.0, 10.0, 80.0, 30.0);
        let proposed = Corner::SouthEast.drag(&current, Point::new(200.0, 0.0));
        let rect = resize_from_corner(current, Corner::SouthEast, proposed, A4, MIN);
        assert_eq!(rect, Rect::new(500.0, 10.0, 95.0, 30.0));
    }

    #[test]
    fn test_resize_north_west_holds_south_east() {
        let current = Rect::new(100.0, 100.0, 100.0, 50.0);
        let proposed = Corner::NorthWest.drag(&current, Point::new(30.0, 10.0));
        let rect = resize_from_corner(current, Corner::NorthWest, proposed, A4, MIN);
        assert_eq!(rect, Rect::new(130.0, 110.0, 70.0, 40.0));
        assert_close(rect.right(), 200.0);
        assert_close(rect.bottom(), 150.0);
    }

    #[test]
    fn test_resize_refuses_further_shrink() {
        let current = Rect::new(100.0, 100.0, 100.0, 50.0);
        let proposed = Corner::NorthWest.drag(&current, Point::new(500.0, 500.0));
        let rect = resize_from_corner(current, Corner::NorthWest, proposed, A4, MIN);
        assert_eq!(rect, Rect::new(180.0, 130.0, 20.0, 20.0));
    }

    #[test]
    fn test_resize_west_past_page_edge() {
        let current = Rect::new(10.0, 10.0, 50.0, 50.0);
        let proposed = Corner::SouthWest.drag(&current, Point::new(-100.0, 0.0));
        let rect = resize_from_corner(current, Corner::SouthWest, proposed, A4, MIN);
        assert_eq!(rect, Rect::new(0.0, 10.0, 60.0, 50.0));
    }

    #[test]
    fn test_corner_hit() {
        let rect = Rect::new(100.0, 100.0, 100.0, 50.0);
        assert_eq!(
            Corner::hit(&rect, Point::new(199.0, 151.0), 4.0),
            Some(Corner::SouthEast)
        );
        assert_eq!(
            Corner::hit(&rect, Point::new(102.0, 98.0), 4.0),
            Some(Corner::NorthWest)
        );
        assert_eq!(Corner::hit(&rect, Point::new(150.0, 125.0), 4.0), None);
    }

    #[test]
    fn test_pdf_space_flips_y() {
        let rect = Rect::new(50.0, 100.0, 100.0, 30.0).to_pdf_space(842.0);
        assert_eq!(rect, Rect::new(50.0, 712.0, 100.0, 30.0));
    }
}
