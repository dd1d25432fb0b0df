//! DOM event listeners for `CfTable`.
//!
//! Every listener is owned by a [`Listener`] guard that removes it from its
//! target when dropped, so a listener can never outlive the state it drives.
//! Document-level pointer listeners exist only while a drag session is
//! active ([`DragListeners`]).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget, MouseEvent};

use super::{CfTable, SharedState};
use crate::resize::SessionId;

/// An event listener that is removed when the guard is dropped
pub(crate) struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub(crate) fn attach(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Option<Self> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .ok()?;
        Some(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Document pointer listeners of one drag session
pub(crate) struct DragListeners {
    pub(crate) session: SessionId,
    _listeners: Vec<Listener>,
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn closest(element: &Element, selector: &str) -> Option<Element> {
    element.closest(selector).ok().flatten()
}

fn pointer_x(event: &Event) -> Option<f32> {
    event
        .dyn_ref::<MouseEvent>()
        .map(|mouse| mouse.client_x() as f32)
}

impl CfTable {
    /// Listen on the grid's own elements
    pub(crate) fn attach_listeners(state: &Rc<RefCell<SharedState>>) -> Vec<Listener> {
        let (root, header, body, search) = {
            let s = state.borrow();
            let surface = s.table.surface();
            (
                surface.root().clone(),
                surface.header_section().clone(),
                surface.body_section().clone(),
                surface.search_input().clone(),
            )
        };
        let mut listeners = Vec::new();

        // Body scroll -> header scroll
        let weak = Rc::downgrade(state);
        listeners.extend(Listener::attach(&body, "scroll", move |_event| {
            if let Some(state) = weak.upgrade() {
                if let Ok(mut s) = state.try_borrow_mut() {
                    s.table.on_body_scroll();
                }
            }
        }));

        // Resize handles
        let weak = Rc::downgrade(state);
        listeners.extend(Listener::attach(&header, "mousedown", move |event| {
            if let Some(state) = weak.upgrade() {
                Self::internal_header_mouse_down(&state, &event);
            }
        }));

        // Sorting, pagination and row actions
        let weak = Rc::downgrade(state);
        listeners.extend(Listener::attach(&root, "click", move |event| {
            if let Some(state) = weak.upgrade() {
                Self::internal_click(&state, &event);
            }
        }));

        // Filter input
        let weak = Rc::downgrade(state);
        let input = search.clone();
        listeners.extend(Listener::attach(&search, "input", move |_event| {
            if let Some(state) = weak.upgrade() {
                Self::apply_filter_value(&state, &input.value());
            }
        }));

        listeners
    }

    fn internal_header_mouse_down(state: &Rc<RefCell<SharedState>>, event: &Event) {
        let Some(target) = event_element(event) else {
            return;
        };
        let Some(handle) = closest(&target, ".cf-resize-handle") else {
            if let Ok(mut s) = state.try_borrow_mut() {
                s.suppress_header_click = false;
            }
            return;
        };
        let (Some(key), Some(x)) = (handle.get_attribute("data-key"), pointer_x(event)) else {
            return;
        };
        event.prevent_default();
        event.stop_propagation();

        let started = match state.try_borrow_mut() {
            Ok(mut s) => s.table.start_resize(&key, x).is_some(),
            Err(_) => false,
        };
        if started {
            Self::pump(state);
        }
    }

    fn internal_click(state: &Rc<RefCell<SharedState>>, event: &Event) {
        let Some(target) = event_element(event) else {
            return;
        };

        if let Some(button) = closest(&target, "[data-page-nav]") {
            let next = button.get_attribute("data-page-nav").as_deref() == Some("next");
            Self::change_page(state, |table| {
                if next {
                    table.next_page()
                } else {
                    table.previous_page()
                }
            });
            return;
        }

        if let Some(button) = closest(&target, "[data-page-size]") {
            let Some(size) = button
                .get_attribute("data-page-size")
                .and_then(|v| v.parse::<usize>().ok())
            else {
                return;
            };
            Self::change_page(state, |table| table.set_page_size(size));
            return;
        }

        if let Some(element) = closest(&target, "[data-action]") {
            let action = element.get_attribute("data-action").unwrap_or_default();
            let Some(index) = closest(&element, ".cf-row")
                .and_then(|row| row.get_attribute("data-row"))
                .and_then(|v| v.parse::<usize>().ok())
            else {
                return;
            };
            let emitted = match state.try_borrow_mut() {
                Ok(mut s) => s.table.row_action(&action, index),
                Err(_) => false,
            };
            if emitted {
                Self::pump(state);
            }
            return;
        }

        if closest(&target, ".cf-resize-handle").is_some() {
            return;
        }
        if let Some(cell) = closest(&target, ".cf-header-cell[data-sortable]") {
            let Some(key) = cell.get_attribute("data-key") else {
                return;
            };
            let sorted = match state.try_borrow_mut() {
                Ok(mut s) if s.suppress_header_click => {
                    s.suppress_header_click = false;
                    false
                }
                Ok(mut s) => s.table.sort_by(&key),
                Err(_) => false,
            };
            if sorted {
                Self::refresh_rows(state);
            }
        }
    }

    /// Document mousemove/mouseup listeners for drag session `session`
    pub(crate) fn attach_drag_listeners(
        state: &Weak<RefCell<SharedState>>,
        session: SessionId,
    ) -> Option<DragListeners> {
        let document: EventTarget = web_sys::window()?.document()?.into();

        let weak = state.clone();
        let on_move = Listener::attach(&document, "mousemove", move |event| {
            let (Some(state), Some(x)) = (weak.upgrade(), pointer_x(&event)) else {
                return;
            };
            let moved = match state.try_borrow_mut() {
                Ok(mut s) => s.table.pointer_move(session, x).is_some(),
                Err(_) => false,
            };
            if moved {
                Self::pump(&state);
            }
        })?;

        let weak = state.clone();
        let on_up = Listener::attach(&document, "mouseup", move |_event| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let ended = match state.try_borrow_mut() {
                Ok(mut s) => {
                    let ended = s.table.pointer_up(session);
                    if ended {
                        s.suppress_header_click = true;
                    }
                    ended
                }
                Err(_) => false,
            };
            if ended {
                Self::pump(&state);
            }
        })?;

        Some(DragListeners {
            session,
            _listeners: vec![on_move, on_up],
        })
    }
}
