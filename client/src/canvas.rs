use std::cell::RefCell;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use muni_map_shared::{CanvasSize, PixelPoint, Rgb, Surface, render};

use crate::app::MapStateStore;

/// Canvas 2D backed drawing surface. `fill()` uses the context's default
/// non-zero rule, the same rule the hit tester applies.
struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl Surface for CanvasSurface {
    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self, color: Rgb) {
        self.ctx.set_fill_style_str(&color.hex());
        self.ctx.fill();
    }

    fn stroke(&mut self, color: Rgb) {
        self.ctx.set_stroke_style_str(&color.hex());
        self.ctx.stroke();
    }
}

/// Click listener on the map canvas. Dropping it removes the listener.
struct ClickBinding {
    canvas: HtmlCanvasElement,
    handler: Closure<dyn Fn(MouseEvent)>,
}

impl Drop for ClickBinding {
    fn drop(&mut self) {
        let _ = self
            .canvas
            .remove_event_listener_with_callback("click", self.handler.as_ref().unchecked_ref());
    }
}

thread_local! {
    static CLICK_BINDING: RefCell<Option<ClickBinding>> = const { RefCell::new(None) };
}

fn release_click_binding() {
    CLICK_BINDING.with(|slot| drop(slot.borrow_mut().take()));
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
}

/// Convert a viewport position to backing-store pixels.
///
/// `rect` is the canvas bounding client rect as `(left, top, width, height)`;
/// the canvas may be displayed at a different CSS size than its backing store.
pub(crate) fn client_to_canvas(
    client_x: f64,
    client_y: f64,
    rect: (f64, f64, f64, f64),
    canvas: CanvasSize,
) -> PixelPoint {
    let (left, top, css_w, css_h) = rect;
    let sx = if css_w > 0.0 { canvas.width / css_w } else { 1.0 };
    let sy = if css_h > 0.0 { canvas.height / css_h } else { 1.0 };
    PixelPoint::new((client_x - left) * sx, (client_y - top) * sy)
}

/// The map surface: paints every municipality once the data has loaded and
/// turns clicks into selections.
#[component]
pub fn MapCanvas() -> impl IntoView {
    let MapStateStore(state) = expect_context();
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    // Changes only when a load completes, so selection changes don't repaint.
    let loaded = Memo::new(move |_| state.with(|s| s.ready().map(|_| s.ticket())));

    Effect::new(move || {
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        let size = state.with_untracked(|s| s.canvas());
        canvas.set_width(size.width as u32);
        canvas.set_height(size.height as u32);
        if loaded.get().is_none() {
            return;
        }
        let Some(ctx) = context_2d(&canvas) else {
            return;
        };
        let mut surface = CanvasSurface {
            ctx,
            width: size.width,
            height: size.height,
        };
        state.with_untracked(|s| {
            if let Some(map) = s.ready() {
                render(Some(&mut surface), map.features(), Some(map.transform()));
            }
        });
    });

    // Clicks are only listened for while there is something to hit.
    Effect::new(move || {
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        release_click_binding();
        if loaded.get().is_none() {
            return;
        }

        let target = canvas.clone();
        let handler = Closure::<dyn Fn(MouseEvent)>::new(move |e: MouseEvent| {
            let rect = target.get_bounding_client_rect();
            let size = state.with_untracked(|s| s.canvas());
            let point = client_to_canvas(
                e.client_x() as f64,
                e.client_y() as f64,
                (rect.left(), rect.top(), rect.width(), rect.height()),
                size,
            );
            state.update(|s| {
                s.click(point);
            });
        });

        if canvas
            .add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            CLICK_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(ClickBinding { canvas, handler });
            });
        }
    });

    on_cleanup(release_click_binding);

    view! {
        <canvas
            node_ref=canvas_ref
            class="map-canvas"
            style="display: block; max-width: 100%; height: auto; cursor: pointer; background: #f4f1ea;"
        />
    }
}

#[cfg(test)]
mod tests {
    use super::client_to_canvas;
    use muni_map_shared::{CanvasSize, PixelPoint};

    const CANVAS: CanvasSize = CanvasSize::new(600.0, 800.0);

    #[test]
    fn unscaled_canvas_subtracts_rect_origin() {
        let p = client_to_canvas(110.0, 70.0, (10.0, 20.0, 600.0, 800.0), CANVAS);
        assert_eq!(p, PixelPoint::new(100.0, 50.0));
    }

    #[test]
    fn half_size_display_doubles_coordinates() {
        let p = client_to_canvas(150.0, 200.0, (0.0, 0.0, 300.0, 400.0), CANVAS);
        assert_eq!(p, PixelPoint::new(300.0, 400.0));
    }

    #[test]
    fn zero_sized_rect_falls_back_to_identity() {
        let p = client_to_canvas(5.0, 6.0, (1.0, 2.0, 0.0, 0.0), CANVAS);
        assert_eq!(p, PixelPoint::new(4.0, 4.0));
    }
}
