//! Stake-weighted committee sampling.
//!
//! Selection runs in two steps. A window of at most
//! `validator_pool_sample_size` pool indices is chosen first, either a
//! rotating contiguous slice or a uniform reservoir sample. The committee is
//! then drawn from the eligible members of that window in proportion to
//! stake.

use agij_crypto::hash256;
use agij_types::{Address, Hash256, SelectionStrategy};

/// Pool indices considered for one selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolWindow {
    /// Indices into the pool, ascending for reservoir windows and in
    /// wrap-around order for rotating ones.
    pub indices: Vec<usize>,
    /// Cursor to store for the next rotating selection, if it moved.
    pub rotation: Option<u64>,
}

/// Draws a committee from eligible validators in proportion to stake.
pub struct ValidatorSelector;

impl ValidatorSelector {
    /// Choose the pool indices to consider. Pools no larger than
    /// `sample_size` are taken whole and leave the cursor alone.
    pub fn window(
        &self,
        strategy: SelectionStrategy,
        seed: &Hash256,
        pool_len: usize,
        sample_size: usize,
        rotation: u64,
    ) -> PoolWindow {
        if pool_len <= sample_size {
            return PoolWindow {
                indices: (0..pool_len).collect(),
                rotation: None,
            };
        }
        match strategy {
            SelectionStrategy::Rotating => {
                let (indices, next) = rotating_window(seed, pool_len, sample_size, rotation);
                PoolWindow {
                    indices,
                    rotation: Some(next),
                }
            }
            SelectionStrategy::Reservoir => PoolWindow {
                indices: reservoir_window(seed, pool_len, sample_size),
                rotation: None,
            },
        }
    }

    /// Sample `count` distinct validators without replacement.
    ///
    /// Draw `i` hashes `seed || i` to a point in `[0, remaining_total)` and
    /// binary-searches the prefix sums of the remaining stakes; the hit is
    /// removed before the next draw. Zero-stake candidates are never drawn.
    ///
    /// Deterministic in `seed` and candidate order. Returns `None` if the
    /// total stake overflows `u128`.
    pub fn sample(
        &self,
        seed: &Hash256,
        candidates: &[(Address, u128)],
        count: usize,
    ) -> Option<Vec<Address>> {
        let mut remaining: Vec<(Address, u128)> = candidates
            .iter()
            .filter(|(_, stake)| *stake > 0)
            .copied()
            .collect();
        let mut selected = Vec::with_capacity(count.min(remaining.len()));

        let mut draw: u64 = 0;
        while selected.len() < count && !remaining.is_empty() {
            let prefix = prefix_sums(&remaining)?;
            let total = *prefix.last()?;
            let point = draw_point(seed, draw) % total;
            // First index whose cumulative stake exceeds the point.
            let index = prefix.partition_point(|cumulative| *cumulative <= point);
            let (address, _) = remaining.remove(index);
            selected.push(address);
            draw += 1;
        }
        Some(selected)
    }
}

/// `sample_size` consecutive indices starting at `rotation` shifted by a
/// seed-derived offset. The returned cursor points just past the window.
fn rotating_window(seed: &Hash256, len: usize, sample_size: usize, rotation: u64) -> (Vec<usize>, u64) {
    let len_u = len as u128;
    let offset = hash256(&[seed.as_bytes(), b"rotation"]).high_u128() % len_u;
    let start = (u128::from(rotation) % len_u + offset) % len_u;
    let start = start as usize;
    let indices = (0..sample_size).map(|i| (start + i) % len).collect();
    (indices, ((start + sample_size) % len) as u64)
}

/// Algorithm R over `0..len`, keyed by the seed. Returned ascending.
fn reservoir_window(seed: &Hash256, len: usize, sample_size: usize) -> Vec<usize> {
    let mut reservoir: Vec<usize> = (0..sample_size).collect();
    for i in sample_size..len {
        let point = hash256(&[seed.as_bytes(), b"reservoir", &(i as u64).to_be_bytes()]).high_u128();
        let slot = (point % (i as u128 + 1)) as usize;
        if slot < sample_size {
            reservoir[slot] = i;
        }
    }
    reservoir.sort_unstable();
    reservoir
}

fn prefix_sums(stakes: &[(Address, u128)]) -> Option<Vec<u128>> {
    let mut running: u128 = 0;
    stakes
        .iter()
        .map(|(_, stake)| {
            running = running.checked_add(*stake)?;
            Some(running)
        })
        .collect()
}

fn draw_point(seed: &Hash256, draw: u64) -> u128 {
    hash256(&[seed.as_bytes(), &draw.to_be_bytes()]).high_u128()
}
