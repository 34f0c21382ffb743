//! Checked dispatch over the pure reducer

use crate::action::Action;
use crate::error::ConfiguratorError;
use crate::reducer::reduce;
use tracing::debug;
use viz_model::{ConfiguratorState, ConfiguratorStep};

/// Holds the current configurator state and applies actions to it
///
/// Unlike [`reduce`], dispatching an action in a step that does not accept
/// it is reported as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configurator {
    state: ConfiguratorState,
}

impl Configurator {
    /// Configurator in the initial step
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configurator admitting an existing (migrated) state
    #[must_use]
    pub fn from_state(state: ConfiguratorState) -> Self {
        Self { state }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &ConfiguratorState {
        &self.state
    }

    /// Current step
    #[inline]
    #[must_use]
    pub fn step(&self) -> ConfiguratorStep {
        self.state.step()
    }

    /// Apply an action
    ///
    /// Returns whether the state changed. An action that is permitted but
    /// does not apply is not an error.
    pub fn dispatch(&mut self, action: Action) -> Result<bool, ConfiguratorError> {
        let step = self.step();
        if !action.permitted_in(step) {
            return Err(ConfiguratorError::InvalidStep {
                action: action.name(),
                step,
            });
        }
        let name = action.name();
        let previous = std::mem::take(&mut self.state);
        let next = reduce(previous.clone(), action);
        let changed = next != previous;
        debug!(action = name, changed, "dispatched");
        self.state = next;
        Ok(changed)
    }

    /// Consume into the state
    #[must_use]
    pub fn into_state(self) -> ConfiguratorState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_reports_invalid_steps() {
        let mut configurator = Configurator::new();
        let err = configurator.dispatch(Action::Publish).unwrap_err();
        assert_eq!(
            err,
            ConfiguratorError::InvalidStep {
                action: "Publish",
                step: ConfiguratorStep::Initial,
            }
        );
        assert_eq!(configurator.step(), ConfiguratorStep::Initial);
    }

    #[test]
    fn dispatch_reports_changes() {
        let mut configurator = Configurator::new();
        let changed = configurator
            .dispatch(Action::SelectDataSource {
                data_source: viz_model::DataSource::sparql("https://example.org/query"),
            })
            .unwrap();
        assert!(changed);
        assert_eq!(configurator.step(), ConfiguratorStep::SelectingDataset);
    }
}
