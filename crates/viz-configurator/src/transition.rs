//! Workflow step transitions

use crate::error::ConfiguratorError;
use viz_model::ConfiguratorStep;

/// Steps reachable from `from` in one transition
#[must_use]
pub fn allowed_transitions(from: ConfiguratorStep) -> Vec<ConfiguratorStep> {
    use ConfiguratorStep::*;
    match from {
        Initial => vec![SelectingDataset],
        SelectingDataset => vec![ConfiguringChart],
        ConfiguringChart => vec![ConfiguringChart, Layouting],
        Layouting => vec![ConfiguringChart, Publishing],
        Publishing => vec![],
    }
}

/// Check a step change against the transition table
pub fn validate_transition(
    from: ConfiguratorStep,
    to: ConfiguratorStep,
) -> Result<(), ConfiguratorError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(ConfiguratorError::IllegalTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConfiguratorStep::*;

    #[test]
    fn publishing_is_terminal() {
        assert!(allowed_transitions(Publishing).is_empty());
    }

    #[test]
    fn configuring_re_enters_itself() {
        assert!(validate_transition(ConfiguringChart, ConfiguringChart).is_ok());
        assert!(validate_transition(Layouting, ConfiguringChart).is_ok());
    }

    #[test]
    fn cannot_skip_steps() {
        assert!(validate_transition(Initial, ConfiguringChart).is_err());
        assert!(validate_transition(ConfiguringChart, Publishing).is_err());
        assert!(validate_transition(SelectingDataset, Initial).is_err());
    }
}
