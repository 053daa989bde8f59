// ABOUTME: Pure per-service decision table for the pipeline.
// ABOUTME: (state, decision) -> ordered steps; no I/O, fully testable.

use thiserror::Error;

use crate::envfile::ConfigState;

/// The operator's choice at the one non-deterministic branch point
/// (what to do with an already-encrypted file).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Leave the file sealed and deploy as-is.
    KeepEncrypted,
    /// Unseal the file; optionally re-run configuration before re-sealing.
    Decrypt { reapply: bool },
}

/// One pipeline step, executed in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Apply,
    Encrypt,
    Decrypt,
    Deploy,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// An encrypted file needs an operator decision before planning.
    #[error("operator decision required for encrypted configuration")]
    DecisionRequired,
}

/// Build the step sequence for one service.
///
/// Re-running the resulting plan from any state converges back to the
/// deployed terminal state without data loss; a `decision` is consulted only
/// when the file is encrypted.
pub fn plan(state: ConfigState, decision: Option<Decision>) -> Result<Vec<Step>, PlanError> {
    let steps = match state {
        ConfigState::UnconfiguredPlaintext => vec![Step::Apply, Step::Encrypt, Step::Deploy],
        ConfigState::ConfiguredPlaintext => vec![Step::Encrypt, Step::Deploy],
        ConfigState::Encrypted => match decision {
            None => return Err(PlanError::DecisionRequired),
            Some(Decision::KeepEncrypted) => vec![Step::Deploy],
            Some(Decision::Decrypt { reapply: false }) => {
                vec![Step::Decrypt, Step::Encrypt, Step::Deploy]
            }
            Some(Decision::Decrypt { reapply: true }) => {
                vec![Step::Decrypt, Step::Apply, Step::Encrypt, Step::Deploy]
            }
        },
    };
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_runs_the_full_chain() {
        let steps = plan(ConfigState::UnconfiguredPlaintext, None).unwrap();
        assert_eq!(steps, vec![Step::Apply, Step::Encrypt, Step::Deploy]);
    }

    #[test]
    fn reentered_configured_plaintext_skips_apply() {
        let steps = plan(ConfigState::ConfiguredPlaintext, None).unwrap();
        assert_eq!(steps, vec![Step::Encrypt, Step::Deploy]);
    }

    #[test]
    fn keep_encrypted_deploys_directly() {
        let steps = plan(ConfigState::Encrypted, Some(Decision::KeepEncrypted)).unwrap();
        assert_eq!(steps, vec![Step::Deploy]);
    }

    #[test]
    fn decrypt_reseals_before_deploying() {
        let steps = plan(
            ConfigState::Encrypted,
            Some(Decision::Decrypt { reapply: false }),
        )
        .unwrap();
        assert_eq!(steps, vec![Step::Decrypt, Step::Encrypt, Step::Deploy]);
    }

    #[test]
    fn decrypt_with_reapply_reconfigures() {
        let steps = plan(
            ConfigState::Encrypted,
            Some(Decision::Decrypt { reapply: true }),
        )
        .unwrap();
        assert_eq!(
            steps,
            vec![Step::Decrypt, Step::Apply, Step::Encrypt, Step::Deploy]
        );
    }

    #[test]
    fn encrypted_without_decision_is_an_error() {
        assert_eq!(
            plan(ConfigState::Encrypted, None),
            Err(PlanError::DecisionRequired)
        );
    }

    #[test]
    fn decision_is_ignored_for_plaintext_states() {
        let steps = plan(
            ConfigState::UnconfiguredPlaintext,
            Some(Decision::KeepEncrypted),
        )
        .unwrap();
        assert_eq!(steps, vec![Step::Apply, Step::Encrypt, Step::Deploy]);
    }
}
