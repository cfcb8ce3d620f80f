#![forbid(unsafe_code)]

//! DOM-backed element handles and the body scroll surface.

use wasm_bindgen::JsValue;
use web_sys::{CssStyleDeclaration, HtmlElement, Window};

use flowstack_core::geometry::{Measurement, Viewport};
use flowstack_core::handle::ElementHandle;
use flowstack_core::scroll_lock::ScrollSurface;
use flowstack_core::visual::StyleWrite;

/// Current viewport read from the window. Unreadable values fall back to 0.
pub(crate) fn read_viewport(window: &Window) -> Viewport {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport::new(dim(window.inner_width()), dim(window.inner_height()))
        .scrolled_to(window.scroll_x().unwrap_or(0.0), window.scroll_y().unwrap_or(0.0))
}

fn set(style: &CssStyleDeclaration, property: &str, value: Option<&str>) {
    if let Some(value) = value {
        if let Err(_e) = style.set_property(property, value) {
            flowstack_core::warn!(property, error = ?_e, "style write failed");
        }
    }
}

/// Write every populated field of `write` to `element`'s inline style.
pub(crate) fn apply_style(element: &HtmlElement, write: &StyleWrite) {
    let style = element.style();
    set(&style, "filter", write.filter.as_deref());
    set(&style, "opacity", write.opacity.as_deref());
    set(&style, "transform", write.transform.as_deref());
    set(&style, "z-index", write.z_index.as_deref());
    set(&style, "height", write.height.as_deref());
    if let Some(b) = write.bounds {
        set(&style, "position", Some("fixed"));
        set(&style, "left", Some(&format!("{}px", b.x)));
        set(&style, "top", Some(&format!("{}px", b.y)));
        set(&style, "width", Some(&format!("{}px", b.width)));
        set(&style, "height", Some(&format!("{}px", b.height)));
    }
}

/// One tracked element.
pub(crate) struct DomHandle {
    element: HtmlElement,
    window: Window,
}

impl DomHandle {
    pub(crate) fn new(element: HtmlElement, window: Window) -> Self {
        Self { element, window }
    }
}

impl ElementHandle for DomHandle {
    fn measure(&self) -> Option<Measurement> {
        if !self.element.is_connected() {
            return None;
        }
        let rect = self.element.get_bounding_client_rect();
        let scroll_x = self.window.scroll_x().ok()?;
        let scroll_y = self.window.scroll_y().ok()?;
        let m = Measurement::new(
            rect.left() + scroll_x,
            rect.top() + scroll_y,
            rect.width(),
            rect.height(),
        );
        // display:none reports an all-zero rect.
        if m.width == 0.0 && m.height == 0.0 {
            return None;
        }
        Some(m)
    }

    fn apply(&mut self, write: &StyleWrite) {
        apply_style(&self.element, write);
    }
}

/// `document.body` overflow.
pub(crate) struct BodyScrollSurface {
    body: HtmlElement,
}

impl BodyScrollSurface {
    pub(crate) fn new(body: HtmlElement) -> Self {
        Self { body }
    }
}

impl ScrollSurface for BodyScrollSurface {
    fn set_locked(&mut self, locked: bool) {
        let style = self.body.style();
        let result = if locked {
            style.set_property("overflow", "hidden")
        } else {
            style.remove_property("overflow").map(drop)
        };
        if let Err(_e) = result {
            flowstack_core::warn!(locked, error = ?_e, "body overflow write failed");
        }
    }
}
