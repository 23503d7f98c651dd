//! Anti-automation challenge boundary.
//!
//! The harvester never inspects how a challenge is cleared. It hands the
//! interstitial URL to a [`ChallengeSolver`] and consumes the outcome.

use async_trait::async_trait;

/// Outcome of one solve attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// The interstitial was cleared and the provider served a real page.
    Resolved {
        /// URL the solver ended up on
        final_url: String,
        /// Markup of that page
        body: String,
    },
    /// The attempt failed.
    Unresolved {
        /// Human-readable failure reason
        reason: String,
    },
}

/// Pluggable challenge solver.
///
/// Implementations are stateless across attempts: each call receives the same
/// challenge URL and must establish whatever session it needs itself.
#[async_trait]
pub trait ChallengeSolver: Send + Sync {
    /// Attempt to clear the challenge at `challenge_url`.
    async fn solve(&self, challenge_url: &str) -> ChallengeOutcome;
}

/// Solver used when challenge solving is disabled; every attempt fails.
pub struct UnavailableSolver;

#[async_trait]
impl ChallengeSolver for UnavailableSolver {
    async fn solve(&self, _challenge_url: &str) -> ChallengeOutcome {
        ChallengeOutcome::Unresolved {
            reason: "challenge solving is disabled".to_string(),
        }
    }
}
