use crate::{
    control::ControlState,
    types::{ActionCause, ControllerAction},
};

/// Brings the cached window state in line with the canonical state fetched
/// from the status store. The store always wins on divergence.
///
/// Returns the instruction to send, or `None` when the cache already agrees.
pub fn reconcile(state: &mut ControlState, canonical_open: bool) -> Option<ControllerAction> {
    if state.cached_window_open() == Some(canonical_open) {
        return None;
    }

    state.set_window_open(canonical_open);
    Some(ControllerAction {
        should_open: canonical_open,
        cause: ActionCause::Reconcile,
    })
}
