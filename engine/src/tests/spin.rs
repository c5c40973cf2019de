use super::*;
use crate::spin::draw_power;

fn draw_proportions(catalog: &Catalog, draws: usize, seed: u64) -> HashMap<String, f64> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..draws {
        let power = draw_power(catalog, &mut rng).expect("catalog has powers");
        *counts.entry(power.rarity.clone()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(rarity, count)| (rarity, count as f64 / draws as f64))
        .collect()
}

#[test]
fn test_spin_requires_a_credit() {
    let (arena, accounts) = new_arena();
    assert_eq!(arena.spin(1), Err(EngineError::InsufficientSpins));
    assert_eq!(accounts.record(1).spins, 0);
}

#[test]
fn test_spin_debits_and_records_the_draw() {
    let (arena, accounts) = new_arena();
    accounts.give_spins(1, 2);

    let power = arena.spin(1).unwrap();

    let record = accounts.record(1);
    assert_eq!(record.spins, 1);
    assert_eq!(record.inventory, vec![power.id]);
}

#[test]
fn test_empty_catalog_fails_without_debiting() {
    let accounts = TestAccounts::new();
    let arena = Arena::new(Arc::new(Catalog::default()), accounts.clone(), 7);
    accounts.give_spins(1, 1);

    assert_eq!(arena.spin(1), Err(EngineError::CatalogEmpty));
    assert_eq!(accounts.record(1).spins, 1);
}

#[test]
fn test_draw_proportions_follow_rarity_weights() {
    // Common 70 / Rare 20 / Epic 9 / Legendary 1.
    let catalog = fixture_catalog();
    let proportions = draw_proportions(&catalog, 100_000, 42);

    assert!((proportions["Common"] - 0.70).abs() < 0.01);
    assert!((proportions["Rare"] - 0.20).abs() < 0.01);
    assert!((proportions["Epic"] - 0.09).abs() < 0.01);
    assert!((proportions["Legendary"] - 0.01).abs() < 0.01);
}

#[test]
fn test_weights_are_renormalized() {
    // Same ratios as the standard table but summing to 50, not 100.
    let rarities = vec![
        Rarity {
            id: 1,
            name: "Common".to_string(),
            drop_chance: 35.0,
            color: "#9ca3af".to_string(),
        },
        Rarity {
            id: 2,
            name: "Rare".to_string(),
            drop_chance: 10.0,
            color: "#3b82f6".to_string(),
        },
        Rarity {
            id: 3,
            name: "Epic".to_string(),
            drop_chance: 4.5,
            color: "#a855f7".to_string(),
        },
        Rarity {
            id: 4,
            name: "Legendary".to_string(),
            drop_chance: 0.5,
            color: "#f59e0b".to_string(),
        },
    ];
    let catalog = Catalog::new(
        vec![fireball(), shield_wall(), riposte(), meteor()],
        rarities,
    );
    let proportions = draw_proportions(&catalog, 100_000, 99);

    assert!((proportions["Common"] - 0.70).abs() < 0.01);
    assert!((proportions["Rare"] - 0.20).abs() < 0.01);
    assert!((proportions["Epic"] - 0.09).abs() < 0.01);
    assert!((proportions["Legendary"] - 0.01).abs() < 0.01);
}

#[test]
fn test_powers_within_a_rarity_draw_uniformly() {
    let rarities = vec![Rarity {
        id: 1,
        name: "Common".to_string(),
        drop_chance: 100.0,
        color: "#9ca3af".to_string(),
    }];
    let a = Power::attack(1, "Jab", "Common", 1, 1);
    let b = Power::attack(2, "Cross", "Common", 1, 1);
    let catalog = Catalog::new(vec![a, b], rarities);

    let mut rng = XorShiftRng::seed_from_u64(7);
    let mut first = 0usize;
    for _ in 0..10_000 {
        if draw_power(&catalog, &mut rng).unwrap().id == 1 {
            first += 1;
        }
    }
    let share = first as f64 / 10_000.0;
    assert!((share - 0.5).abs() < 0.03, "share was {share}");
}

#[test]
fn test_catalog_filters_powers_by_rarity_name() {
    let catalog = fixture_catalog();
    let rarity = String::from("Legendary");
    let legendaries: Vec<&Power> = catalog.powers_of_rarity(&rarity).collect();
    assert_eq!(legendaries.len(), 1);
    assert_eq!(legendaries[0].id, meteor().id);
    assert!(catalog.powers_of_rarity("Mythic").next().is_none());
}

#[test]
fn test_rarities_without_powers_carry_no_weight() {
    // Only Legendary has a power; every draw must produce it.
    let catalog = Catalog::new(vec![meteor()], fixture_rarities());
    let mut rng = XorShiftRng::seed_from_u64(11);
    for _ in 0..100 {
        assert_eq!(draw_power(&catalog, &mut rng).unwrap().id, meteor().id);
    }
}
