//! Event normalization and dispatch (C5).
//!
//! Translates [`crate::capture::RawInputEvent`] into one or more
//! [`VirtualEvent`]s, keeps [`crate::modifiers::ModifierState`] current, and
//! derives `KEY_TYPED` from `KEY_PRESSED` via the active
//! [`crate::unicode::UnicodeResolver`]. The consume verdict returned by the
//! user's handler is propagated straight back to the capture backend so
//! platforms that can suppress native delivery do so.

use crate::capture::RawInputEvent;
use crate::config::HookConfig;
use crate::event::{EventData, EventType, ModifierMask, VirtualCode, VirtualEvent, CHAR_UNDEFINED};
use crate::modifiers::ModifierState;
use crate::unicode::UnicodeResolver;

/// Receives normalized [`VirtualEvent`]s and reports whether to consume them.
///
/// Implemented by user callbacks registered via [`crate::lifecycle`]; a
/// boxed trait object lets the dispatcher hold either a real callback or a
/// [`RecordingHandler`] test double behind one type.
pub trait EventHandler: Send {
    fn handle(&mut self, event: VirtualEvent) -> bool;
}

impl<F: FnMut(VirtualEvent) -> bool + Send> EventHandler for F {
    fn handle(&mut self, event: VirtualEvent) -> bool {
        self(event)
    }
}

/// Tracks the last mouse-down position/button/time per button so a
/// subsequent move can be reclassified as a drag and a close-enough release
/// can be reclassified as a click, per the dispatcher's C5 responsibilities.
#[derive(Debug, Clone, Copy, Default)]
struct PressState {
    button: u8,
    x: i16,
    y: i16,
    clicks: u16,
    last_click_time: u64,
}

/// Normalizes raw capture events into [`VirtualEvent`]s and dispatches them
/// to a user-supplied [`EventHandler`].
pub struct Dispatcher<H: EventHandler> {
    handler: H,
    modifiers: ModifierState,
    resolver: Box<dyn UnicodeResolver>,
    press: Option<PressState>,
    any_button_down: bool,
    multi_click_window_ms: u64,
    multi_click_distance_px: i16,
}

impl<H: EventHandler> Dispatcher<H> {
    pub fn new(handler: H, resolver: Box<dyn UnicodeResolver>, config: HookConfig) -> Self {
        Self {
            handler,
            modifiers: ModifierState::new(),
            resolver,
            press: None,
            any_button_down: false,
            multi_click_window_ms: config.multi_click_window_ms,
            multi_click_distance_px: config.multi_click_distance_px,
        }
    }

    /// Resets all transient dispatcher state. Called when a session stops.
    pub fn reset(&mut self) {
        self.modifiers.reset();
        self.press = None;
        self.any_button_down = false;
    }

    fn update_modifier_on_key(&self, vc: VirtualCode, pressed: bool) {
        let bit = match vc {
            VirtualCode::ShiftLeft => ModifierMask::SHIFT_L,
            VirtualCode::ShiftRight => ModifierMask::SHIFT_R,
            VirtualCode::ControlLeft => ModifierMask::CTRL_L,
            VirtualCode::ControlRight => ModifierMask::CTRL_R,
            VirtualCode::AltLeft => ModifierMask::ALT_L,
            VirtualCode::AltRight => ModifierMask::ALT_R,
            VirtualCode::MetaLeft => ModifierMask::META_L,
            VirtualCode::MetaRight => ModifierMask::META_R,
            _ => return,
        };
        if pressed {
            self.modifiers.set(bit);
        } else {
            self.modifiers.unset(bit);
        }
        crate::logger::log(
            crate::logger::LogLevel::Debug,
            &format!("modifier transition: vc={:?} pressed={} mask={:#06x}", vc, pressed, self.modifiers.get().0),
        );
    }

    /// Processes one raw event, dispatching the resulting `VirtualEvent`(s)
    /// in order, and returns whether the *originating* raw event should be
    /// consumed (the verdict from its primary `VirtualEvent`, i.e.
    /// `KEY_PRESSED`/`KEY_RELEASED`/the mouse down-up-move/wheel event; the
    /// synthetic `KEY_TYPED` and click/drag reclassifications never gate
    /// suppression on their own).
    pub fn handle_raw(&mut self, raw: RawInputEvent) -> bool {
        match raw {
            RawInputEvent::KeyDown { vc, rawcode, time, .. } => {
                self.update_modifier_on_key(vc, true);
                let mask = self.modifiers.get();
                let consumed = self.handler.handle(VirtualEvent::keyboard(EventType::KeyPressed, time, mask, vc, rawcode));

                if let Some(ch) = self.resolver.resolve(vc, mask) {
                    self.handler.handle(VirtualEvent::key_typed(time, mask, vc, ch));
                } else {
                    crate::logger::log(
                        crate::logger::LogLevel::Debug,
                        &format!("no character resolution for vc={:?} mask={:#06x}", vc, mask.0),
                    );
                }

                consumed
            }
            RawInputEvent::KeyUp { vc, rawcode, time, .. } => {
                self.update_modifier_on_key(vc, false);
                let mask = self.modifiers.get();
                self.handler.handle(VirtualEvent::keyboard(EventType::KeyReleased, time, mask, vc, rawcode))
            }
            RawInputEvent::MouseMove { x, y, time, .. } => {
                let mask = self.modifiers.get();
                let event_type = if self.any_button_down { EventType::MouseDragged } else { EventType::MouseMoved };
                let button = self.press.map(|p| p.button).unwrap_or(0);
                self.handler.handle(VirtualEvent::mouse(event_type, time, mask, button, 0, x, y))
            }
            RawInputEvent::MouseButtonDown { button, x, y, time, .. } => {
                if let Some(bit) = ModifierMask::button_bit(button) {
                    self.modifiers.set(bit);
                }
                self.any_button_down = true;
                let mask = self.modifiers.get();

                let clicks = match self.press {
                    Some(prev)
                        if prev.button == button
                            && time.saturating_sub(prev.last_click_time) <= self.multi_click_window_ms
                            && (prev.x - x).abs() <= self.multi_click_distance_px
                            && (prev.y - y).abs() <= self.multi_click_distance_px =>
                    {
                        prev.clicks + 1
                    }
                    _ => 1,
                };
                self.press = Some(PressState { button, x, y, clicks, last_click_time: time });

                self.handler.handle(VirtualEvent::mouse(EventType::MousePressed, time, mask, button, clicks, x, y))
            }
            RawInputEvent::MouseButtonUp { button, x, y, time, .. } => {
                if let Some(bit) = ModifierMask::button_bit(button) {
                    self.modifiers.unset(bit);
                }
                self.any_button_down = self.modifiers.get().any_button_held();
                let mask = self.modifiers.get();

                let clicks = self.press.filter(|p| p.button == button).map(|p| p.clicks).unwrap_or(1);
                let consumed = self.handler.handle(VirtualEvent::mouse(EventType::MouseReleased, time, mask, button, clicks, x, y));

                let within_click_distance = self
                    .press
                    .filter(|p| p.button == button)
                    .map(|p| (p.x - x).abs() <= self.multi_click_distance_px && (p.y - y).abs() <= self.multi_click_distance_px)
                    .unwrap_or(false);
                if within_click_distance {
                    self.handler.handle(VirtualEvent::mouse(EventType::MouseClicked, time, mask, button, clicks, x, y));
                }

                consumed
            }
            RawInputEvent::MouseWheel { delta, horizontal, x, y, time, .. } => {
                let mask = self.modifiers.get();
                let direction = if horizontal { crate::event::WheelDirection::Horizontal } else { crate::event::WheelDirection::Vertical };
                self.handler.handle(VirtualEvent::wheel(time, mask, x, y, crate::event::WheelType::Line, delta.signum(), delta, direction))
            }
        }
    }

    pub fn into_handler(self) -> H {
        self.handler
    }
}

/// Derives the `EventData::Keyboard` payload's keychar field, for code that
/// needs to peek at a typed character without going through the full
/// dispatcher (e.g. tests). Returns `CHAR_UNDEFINED` for non-keyboard data.
pub fn keychar_of(data: EventData) -> u16 {
    match data {
        EventData::Keyboard { keychar, .. } => keychar,
        _ => CHAR_UNDEFINED,
    }
}
