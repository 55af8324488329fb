//! Prometheus metrics for the validation node.
//!
//! [`ValidationMetrics`] owns a dedicated [`Registry`]. The service feeds it
//! the events drained after every command; [`ValidationMetrics::encode`]
//! renders the Prometheus text exposition format.

use agij_identity::IdentityEvent;
use agij_validation::ValidationEvent;
use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use crate::NodeError;

pub struct ValidationMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    pub selections: IntCounter,
    pub selection_resets: IntCounter,
    pub commits: IntCounter,
    pub reveals: IntCounter,
    /// Labelled `normal` or `forced`.
    pub finalizations: IntCounterVec,
    pub slashes: IntCounter,
    pub slashed_stake: IntCounter,
    pub identity_failures: IntCounter,
    pub cache_hits: IntCounter,
    pub cache_misses: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Rounds with a committee that have not been finalized.
    pub open_rounds: IntGauge,
}

impl ValidationMetrics {
    /// Create a fresh set of metrics, all registered under a new [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let counter = |name: &str, help: &str| {
            register_int_counter_with_registry!(Opts::new(name, help), registry)
                .expect("metric names are unique within a fresh registry")
        };

        let selections = counter("agij_selections_total", "Committees selected");
        let selection_resets = counter(
            "agij_selection_resets_total",
            "Selection attempts reset for lack of entropy or block hash",
        );
        let commits = counter("agij_commits_total", "Vote commitments accepted");
        let reveals = counter("agij_reveals_total", "Votes revealed");
        let slashes = counter("agij_slashes_total", "Validators slashed at finalization");
        let slashed_stake = counter(
            "agij_slashed_stake_total",
            "Stake removed from minority voters, saturating at u64::MAX per slash",
        );
        let identity_failures = counter(
            "agij_identity_failures_total",
            "Identity verifications that matched no path",
        );
        let cache_hits = counter("agij_auth_cache_hits_total", "Authorization cache hits");
        let cache_misses = counter("agij_auth_cache_misses_total", "Authorization cache misses");

        let finalizations = register_int_counter_vec_with_registry!(
            Opts::new("agij_finalizations_total", "Rounds finalized"),
            &["kind"],
            registry
        )
        .expect("failed to register finalizations counter");

        let open_rounds = register_int_gauge_with_registry!(
            Opts::new("agij_open_rounds", "Selected rounds awaiting finalization"),
            registry
        )
        .expect("failed to register open_rounds gauge");

        Self {
            registry,
            selections,
            selection_resets,
            commits,
            reveals,
            finalizations,
            slashes,
            slashed_stake,
            identity_failures,
            cache_hits,
            cache_misses,
            open_rounds,
        }
    }

    /// Update counters from a batch of drained events.
    pub fn observe(&self, events: &[ValidationEvent]) {
        for event in events {
            match event {
                ValidationEvent::ValidatorsSelected { .. } => self.selections.inc(),
                ValidationEvent::SelectionReset { .. } => self.selection_resets.inc(),
                ValidationEvent::ValidationCommitted { .. } => self.commits.inc(),
                ValidationEvent::ValidationRevealed { .. } => self.reveals.inc(),
                ValidationEvent::ValidationFinalized { forced, .. } => {
                    let kind = if *forced { "forced" } else { "normal" };
                    self.finalizations.with_label_values(&[kind]).inc();
                }
                ValidationEvent::ValidatorSlashed { amount, .. } => {
                    self.slashes.inc();
                    self.slashed_stake
                        .inc_by(u64::try_from(*amount).unwrap_or(u64::MAX));
                }
                ValidationEvent::AuthorizationLookup { hit: true, .. } => self.cache_hits.inc(),
                ValidationEvent::AuthorizationLookup { hit: false, .. } => self.cache_misses.inc(),
                ValidationEvent::Identity(IdentityEvent::VerificationFailed { .. }) => {
                    self.identity_failures.inc()
                }
                _ => {}
            }
        }
    }

    pub fn set_open_rounds(&self, count: usize) {
        self.open_rounds
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render every metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, NodeError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| NodeError::Config(e.to_string()))
    }
}

impl Default for ValidationMetrics {
    fn default() -> Self {
        Self::new()
    }
}
