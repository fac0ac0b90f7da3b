use crate::{
    config::HumidityConfig,
    control::ControlState,
    envelope::SensorReading,
    types::{ActionCause, ControllerAction},
};

/// Hysteresis controller opening the window on high humidity and closing it
/// again once humidity drops, but only if it was the one that opened it.
#[derive(Debug, Clone)]
pub struct HumidityController {
    config: HumidityConfig,
}

impl HumidityController {
    pub fn new(mut config: HumidityConfig) -> Self {
        config.sanitize();
        Self { config }
    }

    pub fn config(&self) -> &HumidityConfig {
        &self.config
    }

    /// A reading without a humidity value never actuates.
    pub fn on_sensor_reading(
        &self,
        state: &mut ControlState,
        reading: &SensorReading,
    ) -> Option<ControllerAction> {
        reading
            .humidity
            .and_then(|humidity| self.evaluate(state, humidity))
    }

    pub fn evaluate(&self, state: &mut ControlState, humidity: f64) -> Option<ControllerAction> {
        if !humidity.is_finite() {
            return None;
        }

        if humidity >= self.config.open_threshold && !state.opened_by_humidity() {
            state.mark_opened_by_humidity();
            return Some(ControllerAction::open(ActionCause::HumidityHigh));
        }

        if humidity < self.config.close_threshold && state.opened_by_humidity() {
            state.set_window_open(false);
            return Some(ControllerAction::close(ActionCause::HumidityNormal));
        }

        None
    }
}

impl Default for HumidityController {
    fn default() -> Self {
        Self::new(HumidityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reading(humidity: Option<f64>) -> SensorReading {
        SensorReading {
            id: 1,
            temperature: Some(22.0),
            humidity,
            last_updated: Some(0.0),
        }
    }

    #[test]
    fn opens_at_threshold() {
        let controller = HumidityController::default();
        let mut state = ControlState::new();

        let action = controller.on_sensor_reading(&mut state, &reading(Some(60.0)));

        assert_eq!(action, Some(ControllerAction::open(ActionCause::HumidityHigh)));
        assert!(state.opened_by_humidity());
        assert_eq!(state.cached_window_open(), Some(true));
    }

    #[test]
    fn does_not_reopen_while_already_humidity_open() {
        let controller = HumidityController::default();
        let mut state = ControlState::new();

        assert!(controller.evaluate(&mut state, 65.0).is_some());
        assert_eq!(controller.evaluate(&mut state, 70.0), None);
        assert_eq!(controller.evaluate(&mut state, 61.0), None);
    }

    #[test]
    fn closes_below_close_threshold_only_when_humidity_opened() {
        let controller = HumidityController::default();
        let mut state = ControlState::new();
        state.set_window_open(true);

        assert_eq!(controller.evaluate(&mut state, 45.0), None);
        assert_eq!(state.cached_window_open(), Some(true));

        controller.evaluate(&mut state, 65.0);
        let action = controller.evaluate(&mut state, 45.0);

        assert_eq!(
            action,
            Some(ControllerAction::close(ActionCause::HumidityNormal))
        );
        assert!(!state.opened_by_humidity());
        assert_eq!(state.cached_window_open(), Some(false));
    }

    #[test]
    fn dead_band_never_actuates() {
        let controller = HumidityController::default();

        for opened in [false, true] {
            let mut state = ControlState::new();
            if opened {
                state.mark_opened_by_humidity();
            }
            let before = state;

            for humidity in [50.0, 52.5, 55.0, 59.9] {
                assert_eq!(controller.evaluate(&mut state, humidity), None);
            }
            assert_eq!(state, before);
        }
    }

    #[test]
    fn exactly_close_threshold_keeps_window_open() {
        let controller = HumidityController::default();
        let mut state = ControlState::new();
        state.mark_opened_by_humidity();

        assert_eq!(controller.evaluate(&mut state, 50.0), None);
        assert_eq!(
            controller.evaluate(&mut state, 49.9),
            Some(ControllerAction::close(ActionCause::HumidityNormal))
        );
    }

    #[test]
    fn missing_humidity_is_ignored() {
        let controller = HumidityController::default();
        let mut state = ControlState::new();

        assert_eq!(controller.on_sensor_reading(&mut state, &reading(None)), None);
        assert_eq!(state, ControlState::new());
    }

    #[test]
    fn custom_thresholds_are_respected() {
        let controller = HumidityController::new(HumidityConfig {
            open_threshold: 80.0,
            close_threshold: 70.0,
        });
        let mut state = ControlState::new();

        assert_eq!(controller.evaluate(&mut state, 75.0), None);
        assert!(controller.evaluate(&mut state, 80.0).is_some());
        assert!(controller.evaluate(&mut state, 69.0).is_some());
    }
}
