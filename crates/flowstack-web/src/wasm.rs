#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlElement, Window};

use flowstack_core::handle::ElementHandle;
use flowstack_core::scroll_lock::ScrollLock;
use flowstack_widgets::pointer_field::Anchoring;
use flowstack_widgets::{
    CardId, CardStack, CloseTrigger, FlowText, Gallery, GalleryError, GalleryHosts, GalleryParts,
    PointerField,
};

use crate::dom::{BodyScrollSurface, DomHandle, read_viewport};
use crate::event::{Action, WebEvent};
use crate::glyphs::field_glyphs;
use crate::hosts::{RafHost, Runtime, RuntimeRef, WindowListenerHost, dispatch};
use crate::options::{MountOptions, OptionsError};
use crate::overlay::DomOverlay;

/// Mount failures surfaced to JS.
#[derive(Debug)]
pub enum MountError {
    NoWindow,
    NoDocument,
    NoBody,
    AlreadyMounted,
    /// A required selector matched nothing.
    MissingElement {
        field: &'static str,
        selector: String,
    },
    Options(OptionsError),
    Gallery(GalleryError),
    Dom(String),
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWindow => f.write_str("no window"),
            Self::NoDocument => f.write_str("window has no document"),
            Self::NoBody => f.write_str("document has no body"),
            Self::AlreadyMounted => f.write_str("gallery is already mounted"),
            Self::MissingElement { field, selector } => {
                write!(f, "{field}: nothing matches {selector:?}")
            }
            Self::Options(e) => write!(f, "{e}"),
            Self::Gallery(e) => write!(f, "{e}"),
            Self::Dom(msg) => write!(f, "DOM error: {msg}"),
        }
    }
}

impl std::error::Error for MountError {}

impl From<JsValue> for MountError {
    fn from(value: JsValue) -> Self {
        Self::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<OptionsError> for MountError {
    fn from(e: OptionsError) -> Self {
        Self::Options(e)
    }
}

impl From<GalleryError> for MountError {
    fn from(e: GalleryError) -> Self {
        Self::Gallery(e)
    }
}

impl From<MountError> for JsValue {
    fn from(e: MountError) -> Self {
        JsError::new(&e.to_string()).into()
    }
}

fn query(document: &Document, field: &'static str, selector: &str) -> Result<HtmlElement, MountError> {
    document
        .query_selector(selector)?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| MountError::MissingElement {
            field,
            selector: selector.to_string(),
        })
}

fn query_all(document: &Document, selector: &str) -> Result<Vec<HtmlElement>, MountError> {
    if selector.trim().is_empty() {
        return Ok(Vec::new());
    }
    let list = document.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

/// Replace a container's text with one inline-block span per glyph.
fn explode_glyphs(
    document: &Document,
    window: &Window,
    container: &HtmlElement,
) -> Result<Vec<Box<dyn ElementHandle>>, MountError> {
    let text = container.text_content().unwrap_or_default();
    container.set_attribute("aria-label", text.trim())?;
    container.set_text_content(None);
    let mut handles: Vec<Box<dyn ElementHandle>> = Vec::new();
    for glyph in field_glyphs(&text) {
        let span = document
            .create_element("span")?
            .dyn_into::<HtmlElement>()
            .map_err(JsValue::from)?;
        span.set_attribute("aria-hidden", "true")?;
        span.set_text_content(Some(&glyph));
        let style = span.style();
        style.set_property("display", "inline-block")?;
        style.set_property("will-change", "transform, filter, opacity")?;
        container.append_child(&span)?;
        handles.push(Box::new(DomHandle::new(span, window.clone())));
    }
    Ok(handles)
}

/// Everything created at mount that lives outside the gallery.
struct Mounted {
    runtime: Rc<RefCell<Runtime>>,
    card_clicks: Vec<(HtmlElement, Closure<dyn FnMut(Event)>)>,
    /// Pointer-field containers and their original text.
    fields: Vec<(HtmlElement, String)>,
}

impl Mounted {
    fn with_gallery<R>(&self, f: impl FnOnce(&mut Gallery) -> R) -> Option<R> {
        let mut rt = self.runtime.try_borrow_mut().ok()?;
        rt.gallery.as_mut().map(f)
    }
}

impl Drop for Mounted {
    fn drop(&mut self) {
        // Dropping the gallery cancels the frame, detaches listeners, and
        // restores scroll.
        if let Ok(mut rt) = self.runtime.try_borrow_mut() {
            rt.gallery.take();
        }
        for (element, callback) in self.card_clicks.drain(..) {
            let _ = element
                .remove_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        }
        for (container, text) in self.fields.drain(..) {
            container.set_text_content(Some(&text));
            let _ = container.remove_attribute("aria-label");
        }
    }
}

fn mount(options: &MountOptions) -> Result<Mounted, MountError> {
    let window = web_sys::window().ok_or(MountError::NoWindow)?;
    let document = window.document().ok_or(MountError::NoDocument)?;
    let body = document.body().ok_or(MountError::NoBody)?;
    let deck = options.deck().map_err(OptionsError::Deck)?;
    let viewport = read_viewport(&window);

    // The gallery sizes the container in every measurement pass.
    let container = query(&document, "stack_container", &options.stack_container)?;
    let wrapper = query(&document, "stack_wrapper", &options.stack_wrapper)?;

    let mut cards: Vec<(CardId, Box<dyn ElementHandle>)> = Vec::new();
    let mut card_elements = Vec::new();
    for element in query_all(&document, &options.card_selector)? {
        let id = element
            .dataset()
            .get("cardId")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map(CardId);
        match id {
            Some(id) if deck.contains(id) && !cards.iter().any(|(c, _)| *c == id) => {
                let handle: Box<dyn ElementHandle> =
                    Box::new(DomHandle::new(element.clone(), window.clone()));
                cards.push((id, handle));
                card_elements.push((id, element));
            }
            _ => {
                flowstack_core::warn!("card element without a known data-card-id skipped");
            }
        }
    }
    let stack = CardStack::new(
        options.stack,
        Box::new(DomHandle::new(container, window.clone())),
        Box::new(DomHandle::new(wrapper, window.clone())),
        cards,
    );

    let blocks: Vec<Box<dyn ElementHandle>> = query_all(&document, &options.flow_text_selector)?
        .into_iter()
        .map(|el| Box::new(DomHandle::new(el, window.clone())) as Box<dyn ElementHandle>)
        .collect();

    let anchoring = if options.sticky_pointer_fields {
        Anchoring::Viewport
    } else {
        Anchoring::Document
    };
    let mut fields = Vec::new();
    let mut pointer_fields = Vec::new();
    for el in query_all(&document, &options.pointer_field_selector)? {
        let text = el.text_content().unwrap_or_default();
        let handles = explode_glyphs(&document, &window, &el)?;
        pointer_fields.push(PointerField::new(options.contact.clone(), handles).anchoring(anchoring));
        fields.push((el, text));
    }

    let runtime = Rc::new(RefCell::new(Runtime::default()));
    let weak: RuntimeRef = Rc::downgrade(&runtime);
    let overlay_root: Element = match options.overlay_root.as_str() {
        "body" => body.clone().into(),
        selector => query(&document, "overlay_root", selector)?.into(),
    };
    let overlay = DomOverlay::new(&document, &overlay_root, weak.clone())?;

    let mut parts = GalleryParts::new(deck, stack, Box::new(overlay));
    parts.transition = options.transition();
    if !blocks.is_empty() {
        parts.flow_texts = vec![FlowText::new(options.focus.clone(), blocks)];
    }
    parts.pointer_fields = pointer_fields;

    let hosts = GalleryHosts {
        frames: Rc::new(RafHost::new(window.clone(), weak.clone())),
        listeners: Rc::new(WindowListenerHost::new(
            window.clone(),
            document.clone(),
            weak.clone(),
        )),
        scroll_lock: ScrollLock::new(BodyScrollSurface::new(body)),
    };
    let gallery = Gallery::mount(hosts, parts, viewport)?;
    runtime.borrow_mut().gallery = Some(gallery);

    let mut card_clicks = Vec::new();
    for (id, element) in card_elements {
        let rt = weak.clone();
        let callback = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            dispatch(&rt, Action::Select(id));
        });
        element.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())?;
        card_clicks.push((element, callback));
    }

    Ok(Mounted {
        runtime,
        card_clicks,
        fields,
    })
}

/// Browser entry point for the gallery.
#[wasm_bindgen]
pub struct FlowstackWeb {
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl FlowstackWeb {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { mounted: None }
    }

    /// Mount against the current document.
    ///
    /// `options` is a JSON string (see the mount options schema); omit it for
    /// the defaults.
    pub fn mount(&mut self, options: Option<String>) -> Result<(), JsValue> {
        if self.mounted.is_some() {
            return Err(MountError::AlreadyMounted.into());
        }
        let options = MountOptions::from_json(options.as_deref().unwrap_or("{}"))
            .map_err(MountError::from)?;
        self.mounted = Some(mount(&options)?);
        Ok(())
    }

    /// Feed one JSON event (`{"kind":"scroll",...}`).
    ///
    /// Returns whether the event was consumed.
    pub fn input(&mut self, event: &str) -> Result<bool, JsValue> {
        let action = WebEvent::from_json(event)
            .and_then(WebEvent::into_action)
            .map_err(|e| JsValue::from(JsError::new(&e.to_string())))?;
        let Some(m) = &self.mounted else {
            return Ok(false);
        };
        Ok(dispatch(&Rc::downgrade(&m.runtime), action))
    }

    pub fn select(&mut self, card: u32) -> bool {
        self.with_gallery(|g| g.select(CardId(card)).is_some())
            .unwrap_or(false)
    }

    pub fn next(&mut self) -> bool {
        self.with_gallery(|g| g.next().is_some()).unwrap_or(false)
    }

    pub fn prev(&mut self) -> bool {
        self.with_gallery(|g| g.prev().is_some()).unwrap_or(false)
    }

    pub fn close(&mut self) -> bool {
        self.with_gallery(|g| g.close(CloseTrigger::CloseControl).is_some())
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = selectedCard)]
    pub fn selected_card(&self) -> Option<u32> {
        self.with_gallery(|g| g.lightbox().selected().map(|c| c.0))
            .flatten()
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Explicit teardown for JS callers: cancels the pending frame, removes
    /// every listener, restores scrolling and the original glyph text.
    pub fn destroy(&mut self) {
        self.mounted = None;
    }
}

impl FlowstackWeb {
    fn with_gallery<R>(&self, f: impl FnOnce(&mut Gallery) -> R) -> Option<R> {
        self.mounted.as_ref()?.with_gallery(f)
    }
}

impl Default for FlowstackWeb {
    fn default() -> Self {
        Self::new()
    }
}
