use crate::colors::{BOUNDARY_COLOR, Rgb, feature_fill};
use crate::geometry::{Feature, FeatureCollection};
use crate::projection::{PixelPoint, Transform};

/// Minimal 2D path-drawing surface. The browser canvas implements this in the
/// client; tests use [`RecordingSurface`].
///
/// `fill` must use the non-zero winding rule, the default for HTML canvas, so
/// that painted regions agree with [`crate::hit_test`].
pub trait Surface {
    fn clear(&mut self);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    fn fill(&mut self, color: Rgb);
    fn stroke(&mut self, color: Rgb);
}

/// A feature's projected outline: one closed sub-path per ring of every
/// polygon, in geometry order. Rendering and hit-testing both use this, so
/// what is clicked is exactly what was painted.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePath {
    subpaths: Vec<Vec<PixelPoint>>,
}

impl FeaturePath {
    pub fn build(feature: &Feature, transform: &Transform) -> Self {
        let subpaths = feature
            .geometry
            .rings()
            .map(|ring| ring.iter().map(|point| transform.project(*point)).collect())
            .collect();
        Self { subpaths }
    }

    pub fn subpaths(&self) -> &[Vec<PixelPoint>] {
        &self.subpaths
    }

    /// Pixel-space bounding box as `(min_x, min_y, max_x, max_y)`.
    pub fn pixel_bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut points = self.subpaths.iter().flatten();
        let first = points.next()?;
        Some(points.fold(
            (first.x, first.y, first.x, first.y),
            |(min_x, min_y, max_x, max_y), p| {
                (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
            },
        ))
    }

    pub fn trace<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.begin_path();
        for subpath in &self.subpaths {
            let Some((first, rest)) = subpath.split_first() else {
                continue;
            };
            surface.move_to(first.x, first.y);
            for point in rest {
                surface.line_to(point.x, point.y);
            }
            surface.close_path();
        }
    }
}

/// Clear `surface` and paint every feature in collection order.
///
/// Missing surface or transform means data has not loaded yet; that is a
/// normal state, so this quietly does nothing.
pub fn render<S: Surface + ?Sized>(
    surface: Option<&mut S>,
    features: &FeatureCollection,
    transform: Option<&Transform>,
) {
    let (Some(surface), Some(transform)) = (surface, transform) else {
        return;
    };

    surface.clear();
    for (index, feature) in features.iter().enumerate() {
        FeaturePath::build(feature, transform).trace(surface);
        surface.fill(feature_fill(index));
        surface.stroke(BOUNDARY_COLOR);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Clear,
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    ClosePath,
    Fill(Rgb),
    Stroke(Rgb),
}

/// Surface that records the command stream instead of drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands since the most recent `clear`.
    pub fn frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .unwrap_or(0);
        &self.commands[start..]
    }

    pub fn fills(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.frame().iter().filter_map(|c| match c {
            DrawCommand::Fill(color) => Some(*color),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::LineTo(x, y));
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn fill(&mut self, color: Rgb) {
        self.commands.push(DrawCommand::Fill(color));
    }

    fn stroke(&mut self, color: Rgb) {
        self.commands.push(DrawCommand::Stroke(color));
    }
}
