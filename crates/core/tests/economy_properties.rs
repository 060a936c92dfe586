use packclick_core::{
    all_skills, pack_cost, rarity_weights, roll_rarity, xp_requirement, Declined, EconomyConfig,
    EventBus, GameState, PlayerProgress, RandomSource, Rarity, RarityWeights, RngState, Session,
    SkillId, SkillSet,
};

fn every_skill_combination() -> Vec<SkillSet> {
    let ids: Vec<SkillId> = all_skills().iter().map(|skill| skill.id).collect();
    (0..1u32 << ids.len())
        .map(|mask| {
            SkillSet::with(
                ids.iter()
                    .enumerate()
                    .filter(|(bit, _)| mask & (1 << bit) != 0)
                    .map(|(_, id)| *id),
            )
        })
        .collect()
}

#[test]
fn pack_cost_never_drops_below_minimum() {
    let config = EconomyConfig::default();
    for skills in every_skill_combination() {
        assert!(pack_cost(&config, &skills) >= 10);
    }
    let cheap = EconomyConfig {
        pack_cost: 12,
        pack_discount: 50,
        ..EconomyConfig::default()
    };
    for skills in every_skill_combination() {
        assert!(pack_cost(&cheap, &skills) >= 10);
    }
}

#[test]
fn xp_curve_reference_values() {
    let config = EconomyConfig::default();
    assert_eq!(xp_requirement(&config, 1), 100);
    assert_eq!(xp_requirement(&config, 5), 506);
}

#[test]
fn apply_xp_is_monotonic() {
    let config = EconomyConfig::default();
    let mut progress = PlayerProgress::new(0);
    let mut rng = RngState::from_seed(11);
    for _ in 0..500 {
        let before = progress;
        let gain = (rng.next_unit() * 400.0) as i64;
        let ups = progress.apply_xp(&config, gain);
        assert!(progress.level >= before.level);
        assert!(progress.skill_points >= before.skill_points);
        assert_eq!(progress.level - before.level, ups.len() as u32);
        assert_eq!(
            progress.skill_points - before.skill_points,
            ups.len() as i64
        );
        assert!(progress.xp < xp_requirement(&config, progress.level));
    }
}

#[test]
fn one_gain_spanning_levels_gives_one_point_each() {
    let config = EconomyConfig::default();
    let mut progress = PlayerProgress::new(0);
    let total: i64 = (1..=5).map(|level| xp_requirement(&config, level)).sum();
    let ups = progress.apply_xp(&config, total);
    assert_eq!(ups.len(), 5);
    assert_eq!(progress.level, 6);
    assert_eq!(progress.skill_points, 5);
    assert_eq!(progress.xp, 0);
    for (idx, up) in ups.iter().enumerate() {
        assert_eq!(up.level, idx as u32 + 2);
        assert_eq!(up.skill_points, idx as i64 + 1);
    }
}

#[test]
fn better_cards_shifts_distribution_toward_rare_and_up() {
    let config = EconomyConfig::default();
    let base = rarity_weights(&config, &SkillSet::new());
    let boosted = rarity_weights(&config, &SkillSet::with([SkillId::BetterCards]));
    let samples = 20_000;
    let count_rare_plus = |weights: RarityWeights| {
        let mut rng = RngState::from_seed(2024);
        (0..samples)
            .filter(|_| roll_rarity(&weights, &mut rng).rarity != Rarity::Common)
            .count()
    };
    let plain = count_rare_plus(base);
    let better = count_rare_plus(boosted);
    assert!(better > plain, "better={better} plain={plain}");
}

#[test]
fn insufficient_funds_changes_nothing() {
    let mut session = Session::new(EconomyConfig::default(), RngState::from_seed(5));
    let mut events = EventBus::default();
    session.open_packs(2, &mut events).expect("first batch");
    let _ = events.drain().count();
    let before = session.state.clone();
    let result = session.open_packs(1, &mut events);
    assert!(matches!(result, Err(Declined::InsufficientFunds { .. })));
    assert_eq!(session.state, before);
    assert!(events.is_empty());
}

#[test]
fn selling_everything_empties_inventory_and_credits_sum() {
    for markup in [false, true] {
        let mut session = Session::new(
            EconomyConfig {
                starting_currency: 1_000,
                ..EconomyConfig::default()
            },
            RngState::from_seed(77),
        );
        if markup {
            session.state.skills.unlock(SkillId::IncreasedValue);
        }
        let mut events = EventBus::default();
        session.open_packs(10, &mut events).expect("open");

        let expected: i64 = session
            .state
            .inventory
            .iter()
            .map(|(_, entry)| {
                let unit = if markup {
                    (entry.value as f64 * 1.5).floor() as i64
                } else {
                    entry.value
                };
                unit * i64::from(entry.count)
            })
            .sum();
        assert_eq!(session.inventory_value(), expected);
        let cards = session.state.inventory.total_cards();
        let currency = session.state.progress.currency;

        session.state.select_all();
        let receipt = session.sell_selected(&mut events).expect("sell");
        assert_eq!(receipt.total_value, expected);
        assert_eq!(receipt.cards_sold, cards);
        assert!(session.state.inventory.is_empty());
        assert_eq!(session.state.progress.currency, currency + expected);
    }
}

#[test]
fn unlocking_twice_is_declined_without_change() {
    let mut session = Session::new(EconomyConfig::default(), RngState::from_seed(1));
    session.state.progress.skill_points = 10;
    let mut events = EventBus::default();
    session.unlock_skill("xp_boost", &mut events).expect("unlock");
    let before: GameState = session.state.clone();
    assert_eq!(
        session.unlock_skill("xp_boost", &mut events),
        Err(Declined::SkillAlreadyUnlocked(SkillId::XpBoost))
    );
    assert_eq!(session.state, before);
}

#[test]
fn seeded_sessions_replay_identically() {
    let run = |seed| {
        let mut session = Session::new(
            EconomyConfig {
                starting_currency: 500,
                ..EconomyConfig::default()
            },
            RngState::from_seed(seed),
        );
        let mut events = EventBus::default();
        session.open_packs(10, &mut events).expect("open").cards
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn currency_never_goes_negative_over_a_long_session() {
    let mut session = Session::new(EconomyConfig::default(), RngState::from_seed(9));
    let mut events = EventBus::default();
    for round in 0..200 {
        let _ = session.open_packs(1 + round % 3, &mut events);
        if round % 5 == 0 {
            session.state.select_all();
            let _ = session.sell_selected(&mut events);
        }
        for skill in all_skills() {
            let _ = session.unlock_skill(skill.id.as_str(), &mut events);
        }
        assert!(session.state.progress.currency >= 0);
        assert!(session
            .state
            .inventory
            .iter()
            .all(|(_, entry)| entry.count >= 1));
        let _ = events.drain().count();
    }
}
