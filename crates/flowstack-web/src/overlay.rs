#![forbid(unsafe_code)]

//! DOM lightbox overlay.
//!
//! ```text
//! <div data-lightbox-backdrop>          fixed, full viewport, click = backdrop
//!   <figure data-lightbox-card>         fixed, bounds from the transition
//!     <img> <h2>title</h2> <p>subtitle</p>
//!     <button data-lightbox-prev>       click = previous card
//!     <button data-lightbox-next>       click = next card
//!     <button data-lightbox-close>      click = close control
//! ```
//!
//! The elements are built once at mount and shown or hidden by
//! [`OverlaySurface::present`] and [`OverlaySurface::dismiss`].

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlElement};

use flowstack_core::visual::StyleWrite;
use flowstack_widgets::{Card, CardId, CloseTrigger, OverlaySurface};

use crate::dom::apply_style;
use crate::event::Action;
use crate::hosts::{RuntimeRef, dispatch};

fn html(document: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    document
        .create_element(tag)?
        .dyn_into::<HtmlElement>()
        .map_err(JsValue::from)
}

/// A button inside the card that dispatches `action` without the click
/// reaching the backdrop.
fn control(
    document: &Document,
    marker: &str,
    label: &str,
    glyph: &str,
    runtime: RuntimeRef,
    action: Action,
) -> Result<(HtmlElement, Closure<dyn FnMut(Event)>), JsValue> {
    let button = html(document, "button")?;
    button.set_attribute(marker, "")?;
    button.set_attribute("type", "button")?;
    button.set_attribute("aria-label", label)?;
    button.set_text_content(Some(glyph));
    let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        event.stop_propagation();
        dispatch(&runtime, action.clone());
    });
    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    Ok((button, on_click))
}

pub(crate) struct DomOverlay {
    backdrop: HtmlElement,
    card: HtmlElement,
    image: Element,
    title: Element,
    subtitle: Element,
    shown: Option<CardId>,
    /// Backdrop, previous, next, and close click handlers.
    _controls: [Closure<dyn FnMut(Event)>; 4],
}

impl DomOverlay {
    pub(crate) fn new(
        document: &Document,
        root: &Element,
        runtime: RuntimeRef,
    ) -> Result<Self, JsValue> {
        let backdrop = html(document, "div")?;
        backdrop.set_attribute("data-lightbox-backdrop", "")?;
        backdrop.set_attribute("role", "dialog")?;
        backdrop.set_attribute("aria-modal", "true")?;
        let style = backdrop.style();
        style.set_property("position", "fixed")?;
        style.set_property("inset", "0")?;
        style.set_property("display", "none")?;
        style.set_property("z-index", "1000")?;

        let card = html(document, "figure")?;
        card.set_attribute("data-lightbox-card", "")?;
        card.style().set_property("margin", "0")?;
        let image = document.create_element("img")?;
        let title = document.create_element("h2")?;
        let subtitle = document.create_element("p")?;
        let (prev, on_prev) = control(
            document,
            "data-lightbox-prev",
            "Previous",
            "\u{2039}",
            runtime.clone(),
            Action::Prev,
        )?;
        let (next, on_next) = control(
            document,
            "data-lightbox-next",
            "Next",
            "\u{203A}",
            runtime.clone(),
            Action::Next,
        )?;
        let (close, on_close) = control(
            document,
            "data-lightbox-close",
            "Close",
            "\u{00D7}",
            runtime.clone(),
            Action::Close(CloseTrigger::CloseControl),
        )?;

        card.append_child(&image)?;
        card.append_child(&title)?;
        card.append_child(&subtitle)?;
        card.append_child(&prev)?;
        card.append_child(&next)?;
        card.append_child(&close)?;
        backdrop.append_child(&card)?;
        root.append_child(&backdrop)?;

        let backdrop_target: JsValue = backdrop.clone().into();
        let on_backdrop = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            // Clicks inside the card bubble up here too.
            if event.target().map(JsValue::from).as_ref() == Some(&backdrop_target) {
                dispatch(&runtime, Action::Close(CloseTrigger::Backdrop));
            }
        });
        backdrop
            .add_event_listener_with_callback("click", on_backdrop.as_ref().unchecked_ref())?;

        Ok(Self {
            backdrop,
            card,
            image,
            title,
            subtitle,
            shown: None,
            _controls: [on_backdrop, on_prev, on_next, on_close],
        })
    }

    fn fill(&mut self, card: &Card) {
        let _ = self.image.set_attribute("src", &card.media_ref);
        let _ = self.image.set_attribute("alt", &card.title);
        self.title.set_text_content(Some(&card.title));
        self.subtitle.set_text_content(Some(&card.subtitle));
        self.shown = Some(card.id);
    }
}

impl OverlaySurface for DomOverlay {
    fn present(&mut self, card: &Card, write: &StyleWrite) {
        if self.shown != Some(card.id) {
            self.fill(card);
        }
        let _ = self.backdrop.style().set_property("display", "block");
        if let Some(opacity) = write.opacity.as_deref() {
            let _ = self.backdrop.style().set_property("opacity", opacity);
        }
        apply_style(&self.card, write);
    }

    fn dismiss(&mut self) {
        let _ = self.backdrop.style().set_property("display", "none");
        self.shown = None;
    }
}

impl Drop for DomOverlay {
    fn drop(&mut self) {
        self.backdrop.remove();
    }
}
