/// Raw input as delivered by the host page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed at world coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    /// Pointer released at world coordinates (x, y).
    PointerUp { x: f32, y: f32 },
    /// Pointer moved to world coordinates (x, y).
    PointerMove { x: f32, y: f32 },
    /// Browser `keyCode` went down. Auto-repeat delivers this again without a `KeyUp`.
    KeyDown { key_code: u32 },
    KeyUp { key_code: u32 },
    /// Scripted trigger from the page. `kind` selects the handler; `a`, `b`, `c` are its payload.
    Custom { kind: u32, a: f32, b: f32, c: f32 },
}

/// Events received since the last frame.
///
/// The runner drains it after the first fixed update of a frame, so each event
/// reaches `Game::update` once.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take every pending event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    /// Payloads `(a, b, c)` of pending custom events of the given kind, oldest first.
    pub fn custom(&self, kind: u32) -> impl Iterator<Item = (f32, f32, f32)> + '_ {
        self.events.iter().filter_map(move |event| match *event {
            InputEvent::Custom { kind: k, a, b, c } if k == kind => Some((a, b, c)),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
