use squash_common::Color;
use squash_kernel::{Body, BodyKind, World};
use std::fmt::Write;

use crate::framebuffer::Framebuffer;

/// Per-frame drawing options.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Color the frame is cleared to before bodies are drawn.
    pub background: Color,
    /// Optional guide grid drawn under the bodies: `(cell_w, cell_h, color)`.
    pub grid: Option<(u32, u32, Color)>,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            grid: None,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads world state and a view configuration, then produces
/// output. It never mutates the world.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given world state and view.
    fn render(&self, world: &World, view: &RenderView) -> Self::Output;
}

/// Screen-space primitive for one body, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    /// Movable bodies. Radii widen and flatten as `squeeze` drops.
    Ellipse { cx: i32, cy: i32, rx: i32, ry: i32 },
    /// Static bodies, corners inclusive.
    Rect { x0: i32, y0: i32, x1: i32, y1: i32 },
}

impl BodyShape {
    /// Map a body to its primitive. Coordinates truncate toward zero.
    ///
    /// Both ellipse radii derive from the half width; the half height only
    /// matters to the physics.
    pub fn of(body: &Body) -> Self {
        match body.kind() {
            BodyKind::Dynamic => {
                let hw = body.half_width();
                BodyShape::Ellipse {
                    cx: body.position.x as i32,
                    cy: body.position.y as i32,
                    rx: (hw / body.squeeze) as i32,
                    ry: (hw * body.squeeze) as i32,
                }
            }
            BodyKind::Static => {
                let (min, max) = (body.min(), body.max());
                BodyShape::Rect {
                    x0: min.x as i32,
                    y0: min.y as i32,
                    x1: max.x as i32,
                    y1: max.y as i32,
                }
            }
        }
    }

    pub fn draw(&self, fb: &mut Framebuffer, color: Color) {
        match *self {
            BodyShape::Ellipse { cx, cy, rx, ry } => fb.ellipse(cx, cy, rx, ry, color),
            BodyShape::Rect { x0, y0, x1, y1 } => fb.rect(x0, y0, x1, y1, color),
        }
    }
}

/// Draws a world into a CPU framebuffer of fixed size.
#[derive(Debug, Clone, Copy)]
pub struct SoftwareRenderer {
    pub width: u32,
    pub height: u32,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Draw into an existing buffer, resizing it if needed. Bodies are
    /// painted in index order, so later bodies cover earlier ones.
    pub fn render_into(&self, world: &World, view: &RenderView, fb: &mut Framebuffer) {
        if fb.width() != self.width || fb.height() != self.height {
            fb.resize(self.width, self.height);
        }
        fb.clear(view.background);
        if let Some((cw, ch, color)) = view.grid {
            fb.grid(cw, ch, color);
        }
        for body in world.bodies() {
            BodyShape::of(body).draw(fb, body.color);
        }
    }
}

impl Renderer for SoftwareRenderer {
    type Output = Framebuffer;

    fn render(&self, world: &World, view: &RenderView) -> Framebuffer {
        let mut fb = Framebuffer::new(self.width, self.height);
        self.render_into(world, view, &mut fb);
        fb
    }
}

/// Produces a human-readable dump of the world state.
///
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, world: &World, _view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== World State (tick={}, bodies={}, movable={}) ===",
            world.tick(),
            world.len(),
            world.movable_count()
        );
        for (id, body) in world.iter() {
            let p = body.position;
            let _ = match body.kind() {
                BodyKind::Dynamic => writeln!(
                    out,
                    "  [{id}] ball pos=({:.2}, {:.2}) vel=({:.2}, {:.2}) squeeze={:.3} timer={}",
                    p.x, p.y, body.velocity.x, body.velocity.y, body.squeeze, body.squeeze_timer
                ),
                BodyKind::Static => writeln!(
                    out,
                    "  [{id}] wall pos=({:.2}, {:.2}) half=({:.1}, {:.1})",
                    p.x, p.y, body.half_extents.x, body.half_extents.y
                ),
            };
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use squash_kernel::{Scene, SimConfig};

    #[test]
    fn ball_shape_is_round_at_rest() {
        let ball = Body::dynamic(Vec2::new(12.7, 30.2), Vec2::splat(10.0), 1.0);
        assert_eq!(
            BodyShape::of(&ball),
            BodyShape::Ellipse {
                cx: 12,
                cy: 30,
                rx: 10,
                ry: 10
            }
        );
    }

    #[test]
    fn squeezed_ball_is_wider_and_shorter() {
        let mut ball = Body::dynamic(Vec2::new(50.0, 50.0), Vec2::splat(10.0), 1.0);
        ball.squeeze = 0.8;
        let BodyShape::Ellipse { rx, ry, .. } = BodyShape::of(&ball) else {
            panic!("ball should render as an ellipse");
        };
        assert_eq!((rx, ry), (12, 8));
    }

    #[test]
    fn wall_shape_spans_its_extents() {
        let wall = Body::fixed(Vec2::new(400.0, 600.0), Vec2::new(400.0, 20.0));
        assert_eq!(
            BodyShape::of(&wall),
            BodyShape::Rect {
                x0: 0,
                y0: 580,
                x1: 800,
                y1: 620
            }
        );
    }

    #[test]
    fn software_renderer_draws_bodies_over_background() {
        let mut world = World::new(SimConfig::default());
        world.push(Body::fixed(Vec2::new(10.0, 10.0), Vec2::new(5.0, 5.0)).with_color(Color::BLUE));
        world.push(
            Body::dynamic(Vec2::new(30.0, 30.0), Vec2::splat(4.0), 1.0).with_color(Color::RED),
        );

        let fb = SoftwareRenderer::new(64, 48).render(&world, &RenderView::default());
        assert_eq!((fb.width(), fb.height()), (64, 48));
        assert_eq!(fb.pixel(10, 10), Some(Color::BLUE));
        assert_eq!(fb.pixel(15, 15), Some(Color::BLUE));
        assert_eq!(fb.count(Color::BLUE), 11 * 11);
        assert_eq!(fb.pixel(30, 30), Some(Color::RED));
        assert_eq!(fb.pixel(34, 30), Some(Color::RED));
        assert_eq!(fb.pixel(35, 30), Some(Color::WHITE));
        assert_eq!(fb.pixel(0, 47), Some(Color::WHITE));
    }

    #[test]
    fn ball_far_below_the_frame_draws_nothing() {
        let mut world = World::new(SimConfig::default());
        let mut ball =
            Body::dynamic(Vec2::new(32.0, 24.0), Vec2::splat(10.0), 1.0).with_color(Color::RED);
        ball.position.y = 3.0e9;
        world.push(ball);

        let fb = SoftwareRenderer::new(64, 48).render(&world, &RenderView::default());
        assert_eq!(fb.count(Color::RED), 0);
        assert_eq!(fb.count(Color::WHITE), 64 * 48);
    }

    #[test]
    fn later_bodies_paint_over_earlier_ones() {
        let mut world = World::new(SimConfig::default());
        world.push(Body::fixed(Vec2::new(8.0, 8.0), Vec2::splat(8.0)).with_color(Color::BLUE));
        world.push(Body::fixed(Vec2::new(8.0, 8.0), Vec2::splat(2.0)).with_color(Color::GREEN));
        let fb = SoftwareRenderer::new(16, 16).render(&world, &RenderView::default());
        assert_eq!(fb.pixel(8, 8), Some(Color::GREEN));
    }

    #[test]
    fn render_into_reuses_and_resizes() {
        let world = World::from_scene(&Scene::demo(80, 60));
        let renderer = SoftwareRenderer::new(80, 60);
        let mut fb = Framebuffer::new(1, 1);
        let view = RenderView {
            background: Color::rgb(10, 10, 10),
            grid: Some((20, 20, Color::rgb(200, 200, 200))),
        };
        renderer.render_into(&world, &view, &mut fb);
        assert_eq!((fb.width(), fb.height()), (80, 60));
        // Top wall covers the first rows.
        assert_eq!(fb.pixel(40, 0), Some(Color::BLACK));
        assert!(fb.count(Color::RED) > 0);
    }

    #[test]
    fn debug_renderer_lists_bodies() {
        let world = World::from_scene(&Scene::demo(800, 600));
        let out = DebugTextRenderer::new().render(&world, &RenderView::default());
        assert!(out.contains("tick=0"));
        assert!(out.contains("bodies=8"));
        assert!(out.contains("movable=4"));
        assert_eq!(out.matches(" ball ").count(), 4);
        assert_eq!(out.matches(" wall ").count(), 4);
        assert!(out.contains("[#0] ball pos=(25.00, 25.00)"));
    }
}
