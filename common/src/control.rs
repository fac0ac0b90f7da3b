/// Process-wide view of the window, owned by the coordination loop.
///
/// `opened_by_humidity` is only ever true while the cached state is open; any
/// transition to closed clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    cached_window_open: Option<bool>,
    opened_by_humidity: bool,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known canonical state, `None` until the status store has answered
    /// or an instruction has been issued.
    pub fn cached_window_open(&self) -> Option<bool> {
        self.cached_window_open
    }

    pub fn opened_by_humidity(&self) -> bool {
        self.opened_by_humidity
    }

    pub fn set_window_open(&mut self, open: bool) {
        self.cached_window_open = Some(open);
        if !open {
            self.opened_by_humidity = false;
        }
    }

    pub fn mark_opened_by_humidity(&mut self) {
        self.cached_window_open = Some(true);
        self.opened_by_humidity = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unknown() {
        let state = ControlState::new();
        assert_eq!(state.cached_window_open(), None);
        assert!(!state.opened_by_humidity());
    }

    #[test]
    fn closing_clears_humidity_flag() {
        let mut state = ControlState::new();
        state.mark_opened_by_humidity();
        assert_eq!(state.cached_window_open(), Some(true));
        assert!(state.opened_by_humidity());

        state.set_window_open(false);

        assert_eq!(state.cached_window_open(), Some(false));
        assert!(!state.opened_by_humidity());
    }

    #[test]
    fn reopening_remotely_does_not_claim_humidity_control() {
        let mut state = ControlState::new();
        state.set_window_open(true);
        assert!(!state.opened_by_humidity());
    }
}
