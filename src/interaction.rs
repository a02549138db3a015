//! Click gestures
//!
//! Selection reacts to a click. Expansion reacts to a click too, unless the
//! node is also selectable, in which case it takes a double click. Clicks are
//! debounced so a double click only toggles selection once.

use std::time::{Duration, Instant};

/// Clicks closer together than this count as one.
pub const CLICK_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Click,
    DoubleClick,
}

/// Which handlers a tree's nodes have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bindings {
    pub select: bool,
    pub expand: bool,
}

impl Default for Bindings {
    fn default() -> Self {
        Bindings {
            select: true,
            expand: true,
        }
    }
}

impl Bindings {
    pub fn select_gesture(&self) -> Option<Gesture> {
        self.select.then_some(Gesture::Click)
    }

    pub fn expand_gesture(&self) -> Option<Gesture> {
        match (self.expand, self.select) {
            (false, _) => None,
            (true, true) => Some(Gesture::DoubleClick),
            (true, false) => Some(Gesture::Click),
        }
    }
}

/// Lets a click through only if none was seen within the window before it.
/// Every click, accepted or not, restarts the window.
#[derive(Debug, Clone)]
pub struct ClickDebounce {
    window: Duration,
    last: Option<Instant>,
}

impl ClickDebounce {
    pub fn new(window: Duration) -> Self {
        ClickDebounce { window, last: None }
    }

    pub fn accept(&mut self, now: Instant) -> bool {
        let accepted = match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.window,
            None => true,
        };
        self.last = Some(now);
        accepted
    }
}

impl Default for ClickDebounce {
    fn default() -> Self {
        ClickDebounce::new(CLICK_DEBOUNCE)
    }
}
