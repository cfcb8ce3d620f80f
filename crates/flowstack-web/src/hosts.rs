#![forbid(unsafe_code)]

//! Frame and listener hosts backed by the browser.
//!
//! Both hold only a weak reference to the [`Runtime`], so callbacks that fire
//! after teardown find nothing and return.

use std::cell::RefCell;
use std::rc::Weak;
use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{
    AddEventListenerOptions, Document, Event, EventTarget, KeyboardEvent, MouseEvent, Window,
};
use web_time::Instant;

use flowstack_core::frame::{FrameHost, FrameToken};
use flowstack_core::input::{KeyCode, KeyEvent, Modifiers};
use flowstack_core::listener::{ListenerHost, ListenerId, ListenerKind};
use flowstack_core::signal::Signal;
use flowstack_widgets::Gallery;

use crate::dom::read_viewport;
use crate::event::Action;
use crate::listeners::ListenerTable;

/// Time step used for the first frame after mount.
const FIRST_FRAME: Duration = Duration::from_millis(16);

/// Mutable state reached from browser callbacks.
#[derive(Default)]
pub(crate) struct Runtime {
    pub(crate) gallery: Option<Gallery>,
    last_frame: Option<Instant>,
}

pub(crate) type RuntimeRef = Weak<RefCell<Runtime>>;

/// Route one action to the gallery. Returns whether it was consumed.
pub(crate) fn dispatch(runtime: &RuntimeRef, action: Action) -> bool {
    let Some(cell) = runtime.upgrade() else {
        return false;
    };
    let Ok(mut rt) = cell.try_borrow_mut() else {
        flowstack_core::warn!("re-entrant gallery dispatch dropped");
        return false;
    };
    let Some(gallery) = rt.gallery.as_mut() else {
        return false;
    };
    match action {
        Action::Signal(signal) => gallery.handle_signal(&signal),
        Action::Select(card) => gallery.select(card).is_some(),
        Action::Close(trigger) => gallery.close(trigger).is_some(),
        Action::Next => gallery.next().is_some(),
        Action::Prev => gallery.prev().is_some(),
    }
}

fn run_frame(runtime: &RuntimeRef) {
    let Some(cell) = runtime.upgrade() else {
        return;
    };
    let Ok(mut rt) = cell.try_borrow_mut() else {
        return;
    };
    let now = Instant::now();
    let dt = rt
        .last_frame
        .map_or(FIRST_FRAME, |last| now.duration_since(last));
    rt.last_frame = Some(now);
    if let Some(gallery) = rt.gallery.as_mut() {
        gallery.on_frame(dt);
        if !gallery.frame_pending() {
            // Idle: the next burst starts from a fresh step.
            rt.last_frame = None;
        }
    }
}

// ---------------------------------------------------------------------------
// requestAnimationFrame
// ---------------------------------------------------------------------------

/// One persistent callback; the scheduler never has two frames in flight.
pub(crate) struct RafHost {
    window: Window,
    callback: Closure<dyn FnMut()>,
}

impl RafHost {
    pub(crate) fn new(window: Window, runtime: RuntimeRef) -> Self {
        let callback = Closure::<dyn FnMut()>::new(move || run_frame(&runtime));
        Self { window, callback }
    }
}

impl FrameHost for RafHost {
    fn request_frame(&self) -> FrameToken {
        match self
            .window
            .request_animation_frame(self.callback.as_ref().unchecked_ref())
        {
            Ok(id) => FrameToken(u64::from(id.unsigned_abs())),
            Err(_e) => {
                // Without frames the page stays at its last written state.
                flowstack_core::warn!(error = ?_e, "requestAnimationFrame failed");
                FrameToken(0)
            }
        }
    }

    fn cancel_frame(&self, token: FrameToken) {
        if let Ok(id) = i32::try_from(token.0) {
            let _ = self.window.cancel_animation_frame(id);
        }
    }
}

// ---------------------------------------------------------------------------
// Event listeners
// ---------------------------------------------------------------------------

struct Registration {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Attaches one DOM listener per registration.
///
/// A listener detached from inside its own callback (Escape closing the
/// lightbox drops the key listener) is retired in the [`ListenerTable`] and
/// freed by the next callback or when the host is dropped.
pub(crate) struct WindowListenerHost {
    window: Window,
    document: Document,
    runtime: RuntimeRef,
    table: ListenerTable<Registration>,
}

impl WindowListenerHost {
    pub(crate) fn new(window: Window, document: Document, runtime: RuntimeRef) -> Self {
        Self {
            window,
            document,
            runtime,
            table: ListenerTable::new(),
        }
    }

    fn target(&self, kind: ListenerKind) -> EventTarget {
        match kind {
            ListenerKind::FontsLoaded => self.document.fonts().into(),
            ListenerKind::PointerLeave => match self.document.document_element() {
                Some(root) => root.into(),
                None => self.document.clone().into(),
            },
            _ => self.window.clone().into(),
        }
    }
}

/// Translate a DOM event into a sampler signal.
fn signal_for(kind: ListenerKind, window: &Window, event: &Event) -> Option<Signal> {
    match kind {
        ListenerKind::Scroll => {
            let vp = read_viewport(window);
            Some(Signal::Scroll {
                x: vp.scroll_x,
                y: vp.scroll_y,
            })
        }
        ListenerKind::Resize => {
            let vp = read_viewport(window);
            Some(Signal::Resize {
                width: vp.width,
                height: vp.height,
            })
        }
        ListenerKind::PointerMove => {
            let mouse = event.dyn_ref::<MouseEvent>()?;
            Some(Signal::PointerMove {
                client_x: f64::from(mouse.client_x()),
                client_y: f64::from(mouse.client_y()),
            })
        }
        ListenerKind::PointerLeave => Some(Signal::PointerLeave),
        ListenerKind::FontsLoaded => Some(Signal::FontsLoaded),
        ListenerKind::OrientationChange => Some(Signal::OrientationChange),
        ListenerKind::KeyDown => {
            let key = event.dyn_ref::<KeyboardEvent>()?;
            Some(Signal::Key(
                KeyEvent::new(KeyCode::from_dom_key(&key.key())).with_modifiers(
                    Modifiers::from_dom(key.shift_key(), key.alt_key(), key.ctrl_key(), key.meta_key()),
                ),
            ))
        }
    }
}

impl Drop for WindowListenerHost {
    fn drop(&mut self) {
        // Normally empty: the gallery's listener set unlistens first.
        self.table.retire_all(|reg| {
            let _ = reg.target.remove_event_listener_with_callback(
                reg.event,
                reg.callback.as_ref().unchecked_ref(),
            );
        });
    }
}

impl ListenerHost for WindowListenerHost {
    fn listen(&self, kind: ListenerKind) -> ListenerId {
        let id = self.table.next_id();

        let window = self.window.clone();
        let runtime = self.runtime.clone();
        let sweeper = self.table.sweeper();
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            // Only closures detached earlier can be retired; this one is live.
            sweeper.sweep();
            let Some(signal) = signal_for(kind, &window, &event) else {
                return;
            };
            if dispatch(&runtime, Action::Signal(signal)) {
                event.prevent_default();
            }
        });

        let target = self.target(kind);
        let event = kind.event_name();
        let options = AddEventListenerOptions::new();
        // Key handling may prevent the default action; everything else is passive.
        options.set_passive(kind != ListenerKind::KeyDown);
        if let Err(_e) = target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.as_ref().unchecked_ref(),
            &options,
        ) {
            flowstack_core::warn!(event, error = ?_e, "addEventListener failed");
        }
        self.table.insert(
            id,
            Registration {
                target,
                event,
                callback,
            },
        );
        ListenerId(id)
    }

    fn unlisten(&self, id: ListenerId) {
        self.table.retire(id.0, |reg| {
            let _ = reg.target.remove_event_listener_with_callback(
                reg.event,
                reg.callback.as_ref().unchecked_ref(),
            );
        });
    }
}
