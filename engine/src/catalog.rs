//! Read-only power and rarity catalog
//!
//! The catalog is owned by an external admin service; the engine only ever
//! reads it. Powers are grouped by rarity name for the spin resolver.

use crate::types::{Power, PowerId, Rarity};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    powers: Vec<Power>,
    rarities: Vec<Rarity>,
}

impl Catalog {
    pub fn new(powers: Vec<Power>, rarities: Vec<Rarity>) -> Self {
        Self { powers, rarities }
    }

    pub fn power(&self, id: PowerId) -> Option<&Power> {
        self.powers.iter().find(|p| p.id == id)
    }

    pub fn powers(&self) -> &[Power] {
        &self.powers
    }

    pub fn rarities(&self) -> &[Rarity] {
        &self.rarities
    }

    pub fn powers_of_rarity<'a>(
        &'a self,
        rarity_name: &'a str,
    ) -> impl Iterator<Item = &'a Power> {
        self.powers.iter().filter(move |p| p.rarity == rarity_name)
    }

    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }
}
