//! Gacha spin resolver
//!
//! Single-shot, stateless-per-call: debit one spin, draw a rarity by its
//! drop-chance weight, pick uniformly among that rarity's powers, record the
//! power into the player's inventory.

use std::sync::{Arc, Mutex};

use crate::catalog::Catalog;
use crate::error::{EngineError, EngineResult};
use crate::rewards::{PlayerDelta, PlayerStore};
use crate::rng::{DrawRng, XorShiftRng};
use crate::types::{PlayerId, Power};

pub struct SpinResolver {
    catalog: Arc<Catalog>,
    rng: Mutex<XorShiftRng>,
}

impl SpinResolver {
    pub fn new(catalog: Arc<Catalog>, seed: u64) -> Self {
        Self {
            catalog,
            rng: Mutex::new(XorShiftRng::seed_from_u64(seed)),
        }
    }

    /// Consume one spin credit and draw a power for `player`.
    pub fn spin(&self, store: &dyn PlayerStore, player: PlayerId) -> EngineResult<Power> {
        if self.catalog.is_empty() {
            return Err(EngineError::CatalogEmpty);
        }
        store.apply(player, PlayerDelta::spin_debit())?;

        let mut rng = self.rng.lock().expect("spin rng poisoned");
        let power = draw_power(&self.catalog, &mut *rng)
            .cloned()
            .ok_or(EngineError::CatalogEmpty)?;
        drop(rng);

        store.grant_power(player, power.id)?;
        log::info!("player {player} spun {} ({})", power.name, power.rarity);
        Ok(power)
    }
}

/// Weighted rarity draw over the catalog.
///
/// Weights are the rarities' `drop_chance` percentages, renormalized over
/// their actual sum so a catalog that does not add up to exactly 100 still
/// draws with the intended proportions. Rarities with no powers carry no
/// weight.
pub fn draw_power<'a>(catalog: &'a Catalog, rng: &mut dyn DrawRng) -> Option<&'a Power> {
    let weighted: Vec<(&str, f64)> = catalog
        .rarities()
        .iter()
        .filter(|r| {
            r.drop_chance > 0.0 && catalog.powers_of_rarity(&r.name).next().is_some()
        })
        .map(|r| (r.name.as_str(), r.drop_chance))
        .collect();

    let total: f64 = weighted.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        // No usable rarity weights; fall back to a uniform power draw.
        let powers = catalog.powers();
        return powers.get(rng.gen_range(powers.len()));
    }

    let roll = rng.next_fraction() * total;
    let mut cumulative = 0.0;
    let mut chosen = weighted.last().map(|(name, _)| *name)?;
    for &(name, weight) in &weighted {
        cumulative += weight;
        if roll < cumulative {
            chosen = name;
            break;
        }
    }

    let pool: Vec<&Power> = catalog.powers_of_rarity(chosen).collect();
    pool.get(rng.gen_range(pool.len())).copied()
}
