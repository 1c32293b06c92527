use fortune_game::{
    CatalogData, RewardCatalog, RewardItem, RewardKey, Strategy, builtin_strategies,
    builtin_strategy, run_batch,
};

const ROUNDS: usize = 1000;

fn two_item_catalog() -> RewardCatalog {
    RewardCatalog::from_items(
        vec![RewardItem::new("A", 1, 1.0), RewardItem::new("B", 1, 1.0)],
        "B",
        15,
    )
    .expect("two-item catalog resolves")
}

fn key(name: &str) -> RewardKey {
    RewardKey {
        name: name.to_string(),
        quantity: 1,
    }
}

#[test]
fn always_reveal_collects_nine_fillers_and_one_target() {
    let catalog = two_item_catalog();
    let reveal_always = builtin_strategy("3").expect("strategy 3 exists");
    let report = run_batch(&catalog, 100, &[&reveal_always], ROUNDS, 2024).expect("batch runs");

    let averages = report.get("3").expect("strategy 3 reported");
    assert_eq!(averages.playthroughs, ROUNDS);
    assert!((averages.average_for(&key("A")) - 9.0).abs() < 1e-9);
    assert!((averages.average_for(&key("B")) - 1.0).abs() < 1e-9);
    assert_eq!(averages.averages[0].reward, key("A"));
    assert!((averages.mean_tokens_left - 45.0).abs() < 1e-9);
    assert!(averages.mean_refreshes.abs() < f64::EPSILON);
}

#[test]
fn every_builtin_runs_on_bundled_catalog() {
    let data = CatalogData::bundled().expect("bundled catalog");
    let catalog = data.resolve("Mythic Gear Chest").expect("wish resolves");
    let table = builtin_strategies();
    let strategies: Vec<&dyn Strategy> = table.iter().map(|s| s as &dyn Strategy).collect();

    let report = run_batch(&catalog, 300, &strategies, 40, 11).expect("batch runs");
    assert_eq!(report.strategies.len(), 9);
    assert_eq!(report.target, "Mythic Gear Chest");
    for averages in &report.strategies {
        assert_eq!(averages.playthroughs, 40);
        assert_eq!(averages.averages.len(), catalog.reward_keys().len());
        assert!(averages.mean_tokens_left <= 300.0);
        assert!(averages.mean_reveals > 0.0, "{} never revealed", averages.id);
        for pair in averages.averages.windows(2) {
            assert!(pair[0].average >= pair[1].average);
        }
        assert!(averages.averages.iter().all(|row| row.average >= 0.0));
    }
}

#[test]
fn refreshing_strategies_dig_through_more_boards() {
    let data = CatalogData::bundled().expect("bundled catalog");
    let catalog = data.resolve("Pet Food").expect("wish resolves");
    let eager = builtin_strategy("8").expect("strategy 8 exists");
    let patient = builtin_strategy("3").expect("strategy 3 exists");
    let report = run_batch(&catalog, 500, &[&eager, &patient], 100, 3).expect("batch runs");

    let eager_wishes = report.get("8").expect("eager").average_for_name("Pet Food");
    let patient_wishes = report.get("3").expect("patient").average_for_name("Pet Food");
    assert!((patient_wishes - 200.0).abs() < 1e-9);
    assert!(eager_wishes > patient_wishes);
}
