use glam::Vec2;
use ttf_parser::OutlineBuilder;

/// Closed polyline, without a repeated closing point.
pub type Contour = Vec<Vec2>;

/// Shoelace area; positive for counter-clockwise (y up).
pub(crate) fn signed_area(contour: &[Vec2]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| contour[i].perp_dot(contour[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

/// Collects a glyph outline as flattened contours in world units.
///
/// Font units are mapped with `scale` and shifted right by `offset_x`;
/// curves are split into `curve_segments` straight steps.
pub struct ContourBuilder {
    scale: f32,
    offset_x: f32,
    curve_segments: u32,
    current: Contour,
    last: Vec2,
    contours: Vec<Contour>,
}

impl ContourBuilder {
    pub fn new(scale: f32, offset_x: f32, curve_segments: u32) -> Self {
        Self {
            scale,
            offset_x,
            curve_segments: curve_segments.max(1),
            current: Vec::new(),
            last: Vec2::ZERO,
            contours: Vec::new(),
        }
    }

    pub fn finish(mut self) -> Vec<Contour> {
        self.flush();
        self.contours
    }

    fn map(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(x * self.scale + self.offset_x, y * self.scale)
    }

    fn push(&mut self, p: Vec2) {
        if self.current.last().is_some_and(|q| q.distance_squared(p) < 1e-12) {
            return;
        }
        self.current.push(p);
        self.last = p;
    }

    fn flush(&mut self) {
        let mut contour = std::mem::take(&mut self.current);
        while contour.len() > 1
            && contour[0].distance_squared(contour[contour.len() - 1]) < 1e-12
        {
            contour.pop();
        }
        if contour.len() >= 3 && signed_area(&contour).abs() > 1e-9 {
            self.contours.push(contour);
        }
    }
}

impl OutlineBuilder for ContourBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        let p = self.map(x, y);
        self.push(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.push(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p0 = self.last;
        let c = self.map(x1, y1);
        let p1 = self.map(x, y);
        for i in 1..=self.curve_segments {
            let t = i as f32 / self.curve_segments as f32;
            let u = 1.0 - t;
            self.push(p0 * (u * u) + c * (2.0 * u * t) + p1 * (t * t));
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p0 = self.last;
        let c0 = self.map(x1, y1);
        let c1 = self.map(x2, y2);
        let p1 = self.map(x, y);
        for i in 1..=self.curve_segments {
            let t = i as f32 / self.curve_segments as f32;
            let u = 1.0 - t;
            self.push(
                p0 * (u * u * u) + c0 * (3.0 * u * u * t) + c1 * (3.0 * u * t * t) + p1 * (t * t * t),
            );
        }
    }

    fn close(&mut self) {
        self.flush();
    }
}
