//! Carries out the table's host requests with browser timers and frames.
//!
//! Every armed timer and frame remembers the token it was armed for. A
//! callback whose token no longer matches is stale and is dropped by the
//! table, so cancelling here is best effort.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::{CfTable, SharedState};
use crate::observe::Trigger;
use crate::schedule::TaskToken;
use crate::table::HostRequest;
use crate::types::TableEvent;

/// Whole milliseconds for `setTimeout`
#[allow(clippy::cast_possible_truncation)]
fn timeout_ms(delay_ms: f64) -> i32 {
    delay_ms.round().clamp(0.0, f64::from(i32::MAX)) as i32
}

fn invoke(callback: Option<&Function>, value: &JsValue) {
    if let Some(callback) = callback {
        if let Err(e) = callback.call1(&JsValue::NULL, value) {
            log::warn!("table callback failed: {e:?}");
        }
    }
}

impl CfTable {
    /// Carry out pending host requests, then deliver pending events to JS.
    ///
    /// Callbacks run after the state borrow is released so they may call
    /// back into the table.
    pub(crate) fn pump(state: &Rc<RefCell<SharedState>>) {
        let (events, on_row_action, on_search_change) = {
            let Ok(mut s) = state.try_borrow_mut() else {
                return;
            };
            let weak = Rc::downgrade(state);
            for request in s.table.take_requests() {
                Self::dispatch(&mut s, &weak, request);
            }
            let resizing = s.table.is_resizing();
            s.table.surface().set_resizing(resizing);
            (
                s.table.take_events(),
                s.row_action_callback.clone(),
                s.search_change_callback.clone(),
            )
        };

        for event in events {
            match event {
                TableEvent::SearchChanged { filter } => {
                    invoke(on_search_change.as_ref(), &JsValue::from_str(&filter));
                }
                TableEvent::RowAction(action) => {
                    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
                    match action.serialize(&serializer) {
                        Ok(value) => invoke(on_row_action.as_ref(), &value),
                        Err(e) => log::warn!("row action not serializable: {e}"),
                    }
                }
            }
        }
    }

    fn dispatch(s: &mut SharedState, weak: &Weak<RefCell<SharedState>>, request: HostRequest) {
        let Some(window) = web_sys::window() else {
            return;
        };
        match request {
            HostRequest::ArmTimer {
                trigger,
                token,
                delay_ms,
            } => {
                if let Some((_, handle)) = s.timers.remove(&trigger) {
                    window.clear_timeout_with_handle(handle);
                }
                let callback = s.timer_closure.get_or_insert_with(|| {
                    let weak = weak.clone();
                    Closure::wrap(Box::new(move |trigger: JsValue, token: JsValue| {
                        if let Some(state) = weak.upgrade() {
                            CfTable::handle_timer(&state, &trigger, &token);
                        }
                    }) as Box<dyn FnMut(JsValue, JsValue)>)
                });
                match window.set_timeout_with_callback_and_timeout_and_arguments_2(
                    callback.as_ref().unchecked_ref(),
                    timeout_ms(delay_ms),
                    &JsValue::from_str(trigger.as_str()),
                    &JsValue::from_str(&token.to_string()),
                ) {
                    Ok(handle) => {
                        s.timers.insert(trigger, (token, handle));
                    }
                    Err(e) => log::warn!("could not arm {} timer: {e:?}", trigger.as_str()),
                }
            }
            HostRequest::CancelTimer { trigger, token } => {
                if s.timers.get(&trigger).is_some_and(|(armed, _)| *armed == token) {
                    if let Some((_, handle)) = s.timers.remove(&trigger) {
                        window.clear_timeout_with_handle(handle);
                    }
                }
            }
            HostRequest::RequestFrame { token } => {
                if let Some((_, handle)) = s.frame.take() {
                    let _ = window.cancel_animation_frame(handle);
                }
                let callback = s.frame_closure.get_or_insert_with(|| {
                    let weak = weak.clone();
                    Closure::wrap(Box::new(move |_timestamp: f64| {
                        if let Some(state) = weak.upgrade() {
                            CfTable::handle_frame(&state);
                        }
                    }) as Box<dyn FnMut(f64)>)
                });
                match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                    Ok(handle) => s.frame = Some((token, handle)),
                    Err(e) => log::warn!("could not request animation frame: {e:?}"),
                }
            }
            HostRequest::CancelFrame { token } => {
                if s.frame.is_some_and(|(armed, _)| armed == token) {
                    if let Some((_, handle)) = s.frame.take() {
                        let _ = window.cancel_animation_frame(handle);
                    }
                }
            }
            HostRequest::AttachDragListeners { session } => {
                s.drag = Self::attach_drag_listeners(weak, session);
            }
            HostRequest::DetachDragListeners { session } => {
                if s.drag.as_ref().is_some_and(|d| d.session == session) {
                    s.drag = None;
                }
            }
        }
    }

    fn handle_timer(state: &Rc<RefCell<SharedState>>, trigger: &JsValue, token: &JsValue) {
        let Some(trigger) = trigger.as_string().and_then(|name| Trigger::from_name(&name)) else {
            return;
        };
        let Some(token) = token
            .as_string()
            .and_then(|t| t.parse::<TaskToken>().ok())
        else {
            return;
        };
        {
            let Ok(mut s) = state.try_borrow_mut() else {
                return;
            };
            if s.timers.get(&trigger).is_some_and(|(armed, _)| *armed == token) {
                s.timers.remove(&trigger);
            }
            s.table.fire_timer(trigger, token);
        }
        Self::pump(state);
    }

    fn handle_frame(state: &Rc<RefCell<SharedState>>) {
        {
            let Ok(mut s) = state.try_borrow_mut() else {
                return;
            };
            let Some((token, _)) = s.frame.take() else {
                return;
            };
            s.table.fire_frame(token);
        }
        Self::pump(state);
    }

    /// Stop every armed timer and frame
    pub(crate) fn clear_host_tasks(s: &mut SharedState) {
        let Some(window) = web_sys::window() else {
            return;
        };
        for (_, (_, handle)) in s.timers.drain() {
            window.clear_timeout_with_handle(handle);
        }
        if let Some((_, handle)) = s.frame.take() {
            let _ = window.cancel_animation_frame(handle);
        }
        s.drag = None;
    }
}
