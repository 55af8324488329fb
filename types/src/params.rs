//! Validation parameters: committee bounds, phase windows, and penalties.
//!
//! Every field is governance-tunable. Changes are validated as a whole via
//! [`ValidationParams::validate`] before they take effect.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};

/// Smallest committee the protocol ever accepts.
pub const MIN_COMMITTEE_FLOOR: u32 = 3;

/// How the window of pool members considered for a committee is chosen
/// when the pool is larger than the sample size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStrategy {
    /// A contiguous window starting at a seed-shifted rotation cursor.
    #[default]
    Rotating,
    /// A uniform reservoir sample over the whole pool.
    Reservoir,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationParams {
    // ── Phase windows ────────────────────────────────────────────────────
    /// Length of the commit window, counted from the first commit.
    pub commit_window_secs: u64,

    /// Length of the reveal window, counted from the commit deadline.
    pub reveal_window_secs: u64,

    /// Extra time after the reveal deadline before `force_finalize` is allowed.
    pub force_finalize_grace_secs: u64,

    // ── Committee ────────────────────────────────────────────────────────
    pub min_validators: u32,
    pub max_validators: u32,

    /// Target committee size, clamped to the eligible pool at selection.
    pub validators_per_job: u32,

    /// Minimum approving reveals for a successful outcome (clamped to committee size).
    pub required_approvals: u32,

    /// Upper bound on the registered validator pool.
    pub max_pool_size: u32,

    /// Pool members considered per selection; must lie in
    /// `[validators_per_job, max_pool_size]`.
    pub validator_pool_sample_size: u32,

    pub selection_strategy: SelectionStrategy,

    // ── Entropy ──────────────────────────────────────────────────────────
    /// Blocks between the first entropy contribution and the target block.
    pub selection_delay_blocks: u64,

    // ── Penalties ────────────────────────────────────────────────────────
    /// Percentage of validator-role stake removed from minority voters.
    pub slash_pct: u8,

    // ── Authorization cache ──────────────────────────────────────────────
    /// How long a successful identity check stays cached.
    pub auth_cache_duration_secs: u64,
}

impl Default for ValidationParams {
    fn default() -> Self {
        Self {
            commit_window_secs: 60,
            reveal_window_secs: 60,
            force_finalize_grace_secs: 3600,
            min_validators: 3,
            max_validators: 3,
            validators_per_job: 3,
            required_approvals: 1,
            max_pool_size: 100,
            validator_pool_sample_size: 100,
            selection_strategy: SelectionStrategy::Rotating,
            selection_delay_blocks: 1,
            slash_pct: 50,
            auth_cache_duration_secs: 3600,
        }
    }
}

impl ValidationParams {
    /// Check internal consistency. Returns the first violation found.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.min_validators < MIN_COMMITTEE_FLOOR || self.min_validators > self.max_validators {
            return Err(TypesError::InvalidValidatorBounds {
                min: self.min_validators,
                max: self.max_validators,
            });
        }
        if self.validators_per_job < self.min_validators
            || self.validators_per_job > self.max_validators
        {
            return Err(TypesError::InvalidCommitteeSize {
                count: self.validators_per_job,
                min: self.min_validators,
                max: self.max_validators,
            });
        }
        if self.slash_pct > 100 {
            return Err(TypesError::InvalidSlashPct(self.slash_pct));
        }
        if self.commit_window_secs == 0 {
            return Err(TypesError::InvalidParameter {
                name: "commit_window_secs",
                reason: "must be non-zero".into(),
            });
        }
        if self.reveal_window_secs == 0 {
            return Err(TypesError::InvalidParameter {
                name: "reveal_window_secs",
                reason: "must be non-zero".into(),
            });
        }
        if self.selection_delay_blocks == 0 {
            return Err(TypesError::InvalidParameter {
                name: "selection_delay_blocks",
                reason: "must be at least one block".into(),
            });
        }
        if self.required_approvals == 0 || self.required_approvals > self.max_validators {
            return Err(TypesError::InvalidParameter {
                name: "required_approvals",
                reason: format!("must be in [1, {}]", self.max_validators),
            });
        }
        if self.max_pool_size < self.validators_per_job {
            return Err(TypesError::InvalidParameter {
                name: "max_pool_size",
                reason: format!("must be at least validators_per_job ({})", self.validators_per_job),
            });
        }
        if self.validator_pool_sample_size < self.validators_per_job
            || self.validator_pool_sample_size > self.max_pool_size
        {
            return Err(TypesError::InvalidParameter {
                name: "validator_pool_sample_size",
                reason: format!(
                    "must be in [{}, {}]",
                    self.validators_per_job, self.max_pool_size
                ),
            });
        }
        Ok(())
    }

    /// Required approvals for a committee of `committee_size`.
    pub fn effective_approvals(&self, committee_size: u32) -> u32 {
        self.required_approvals.min(committee_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ValidationParams::default().validate().unwrap();
    }

    #[test]
    fn rejects_min_below_floor() {
        let params = ValidationParams {
            min_validators: 2,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(TypesError::InvalidValidatorBounds { min: 2, .. })
        ));
    }

    #[test]
    fn rejects_per_job_outside_bounds() {
        let params = ValidationParams {
            max_validators: 4,
            validators_per_job: 10,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(TypesError::InvalidCommitteeSize { count: 10, .. })
        ));
    }

    #[test]
    fn rejects_slash_over_100() {
        let params = ValidationParams {
            slash_pct: 101,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(TypesError::InvalidSlashPct(101)));
    }

    #[test]
    fn rejects_pool_smaller_than_committee() {
        let params = ValidationParams {
            max_pool_size: 2,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn pool_size_cannot_drop_below_sample_size() {
        let params = ValidationParams {
            max_pool_size: 9,
            validator_pool_sample_size: 10,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(TypesError::InvalidParameter {
                name: "validator_pool_sample_size",
                ..
            })
        ));
    }

    #[test]
    fn sample_size_must_cover_committee() {
        let params = ValidationParams {
            validator_pool_sample_size: 2,
            ..Default::default()
        };
        assert!(params.validate().is_err());
        let params = ValidationParams {
            max_pool_size: 10,
            validator_pool_sample_size: 3,
            ..Default::default()
        };
        params.validate().unwrap();
    }

    #[test]
    fn approvals_clamp_to_committee() {
        let params = ValidationParams {
            max_validators: 4,
            required_approvals: 4,
            ..Default::default()
        };
        assert_eq!(params.effective_approvals(3), 3);
    }
}
