use std::collections::{BTreeMap, BTreeSet};

use jobcraft_engine::{
    CurrencyService, EngineSettings, Job, JobModifiers, JobObjective, JobProfile, Leveling,
    MemoryLedger, OrderReward, SpecialOrderSettings, UniInt,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_chacha::ChaCha20Rng;

const NOW_MS: i64 = 1_700_000_000_000;

fn settings(rewards: &[&str]) -> EngineSettings {
    EngineSettings {
        special_orders_enabled: true,
        rewards: rewards
            .iter()
            .map(|name| {
                (
                    (*name).to_string(),
                    OrderReward {
                        name: (*name).to_string(),
                        commands: Vec::new(),
                    },
                )
            })
            .collect(),
    }
}

fn fixed_orders(objectives: i32, duration: i32, rewards: i32) -> SpecialOrderSettings {
    SpecialOrderSettings {
        enabled: true,
        objectives_amount: UniInt::fixed(objectives),
        duration_secs: UniInt::fixed(duration),
        rewards_amount: UniInt::fixed(rewards),
        allowed_rewards: BTreeMap::from([(1, vec!["*".to_string()])]),
        cost: BTreeMap::new(),
    }
}

fn objective(id: &str, allowed: bool, amount: UniInt, count: UniInt) -> JobObjective {
    JobObjective::new(id, "block_break", ["stone", "dirt", "gravel"]).with_special_order(
        allowed,
        amount,
        count,
    )
}

fn build_job(orders: SpecialOrderSettings, objectives: Vec<JobObjective>) -> Job {
    Job::new(
        "quarry",
        JobProfile::default(),
        Leveling::normalized(50, 20, 500, 1.1),
        BTreeMap::new(),
        JobModifiers::default(),
        orders,
        objectives,
    )
}

fn three_open_objectives() -> Vec<JobObjective> {
    ["alpha", "beta", "gamma"]
        .into_iter()
        .map(|id| objective(id, true, UniInt::fixed(1), UniInt::fixed(10)))
        .collect()
}

#[test]
fn fixed_ranges_produce_exact_shape() {
    let job = build_job(fixed_orders(2, 3600, 1), three_open_objectives());
    let settings = settings(&["gold", "emerald"]);
    for seed in 0..64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let order = job
            .create_special_order(&settings, 1, NOW_MS, &mut rng)
            .expect("every objective is eligible");
        assert_eq!(order.objectives.len(), 2);
        for (id, entry) in &order.objectives {
            assert_eq!(id, &entry.objective_id);
            assert_eq!(entry.counts.len(), 1);
            assert!(entry.counts.values().all(|count| count.required == 10));
            assert!(entry.counts.values().all(|count| count.completed == 0));
        }
        assert_eq!(order.rewards.len(), 1);
        assert!(settings.rewards.contains_key(&order.rewards[0]));
        assert_eq!(order.expire_at, NOW_MS + 3_600_000);
        assert!(!order.completed);
    }
}

#[test]
fn non_positive_duration_or_count_yields_nothing() {
    let settings = settings(&["gold"]);
    let mut rng = SmallRng::seed_from_u64(3);

    let zero_duration = build_job(fixed_orders(2, 0, 1), three_open_objectives());
    assert!(
        zero_duration
            .create_special_order(&settings, 1, NOW_MS, &mut rng)
            .is_none()
    );

    let zero_objectives = build_job(fixed_orders(0, 3600, 1), three_open_objectives());
    assert!(
        zero_objectives
            .create_special_order(&settings, 1, NOW_MS, &mut rng)
            .is_none()
    );

    let disabled = build_job(
        SpecialOrderSettings {
            enabled: false,
            ..fixed_orders(2, 3600, 1)
        },
        three_open_objectives(),
    );
    assert!(
        disabled
            .create_special_order(&settings, 1, NOW_MS, &mut rng)
            .is_none()
    );
}

#[test]
fn job_without_objectives_yields_nothing() {
    let job = build_job(fixed_orders(2, 3600, 1), Vec::new());
    let settings = settings(&["gold"]);
    for seed in 0..16 {
        let mut rng = SmallRng::seed_from_u64(seed);
        assert!(
            job.create_special_order(&settings, 1, NOW_MS, &mut rng)
                .is_none()
        );
    }
}

#[test]
fn no_eligible_objective_yields_nothing() {
    let job = build_job(
        fixed_orders(2, 3600, 1),
        vec![
            objective("locked", false, UniInt::fixed(1), UniInt::fixed(10)),
            objective("empty", true, UniInt::of(0, 0), UniInt::fixed(10)),
            objective("zero_count", true, UniInt::fixed(2), UniInt::fixed(0)),
        ],
    );
    let settings = settings(&["gold"]);
    for seed in 0..16 {
        let mut rng = SmallRng::seed_from_u64(seed);
        assert!(
            job.create_special_order(&settings, 1, NOW_MS, &mut rng)
                .is_none()
        );
    }
}

#[test]
fn order_may_hold_fewer_objectives_than_rolled() {
    // Three requested, only two can ever be filled.
    let job = build_job(
        fixed_orders(3, 3600, 1),
        vec![
            objective("alpha", true, UniInt::fixed(1), UniInt::fixed(10)),
            objective("beta", true, UniInt::fixed(1), UniInt::fixed(10)),
            objective("locked", false, UniInt::fixed(1), UniInt::fixed(10)),
        ],
    );
    let settings = settings(&["gold"]);
    let mut rng = ChaCha20Rng::seed_from_u64(11);
    let order = job
        .create_special_order(&settings, 1, NOW_MS, &mut rng)
        .expect("two objectives are eligible");
    let ids: Vec<&str> = order.objectives.keys().map(String::as_str).collect();
    assert_eq!(ids, ["alpha", "beta"]);
}

#[test]
fn objects_are_capped_by_the_objective_set() {
    let job = build_job(
        fixed_orders(1, 60, 1),
        vec![objective("alpha", true, UniInt::fixed(10), UniInt::of(5, 8))],
    );
    let settings = settings(&["gold"]);
    let mut rng = SmallRng::seed_from_u64(5);
    let order = job
        .create_special_order(&settings, 1, NOW_MS, &mut rng)
        .expect("alpha is eligible");
    let counts = &order.objectives["alpha"].counts;
    let objects: BTreeSet<&str> = counts.keys().map(String::as_str).collect();
    assert_eq!(objects, BTreeSet::from(["dirt", "gravel", "stone"]));
    assert!(counts.values().all(|count| (5..=8).contains(&count.required)));
}

#[test]
fn rewards_are_distinct_and_bounded_by_pool() {
    let job = build_job(fixed_orders(1, 60, 10), three_open_objectives());
    let settings = settings(&["gold", "emerald", "iron", "coal"]);
    for seed in 0..32 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let order = job
            .create_special_order(&settings, 1, NOW_MS, &mut rng)
            .expect("order");
        let unique: BTreeSet<&String> = order.rewards.iter().collect();
        assert_eq!(order.rewards.len(), 4);
        assert_eq!(unique.len(), 4);
    }
}

#[test]
fn reward_pool_follows_player_level() {
    let orders = SpecialOrderSettings {
        allowed_rewards: BTreeMap::from([
            (1, vec!["copper".to_string()]),
            (20, vec!["copper".to_string(), "gold".to_string()]),
        ]),
        ..fixed_orders(1, 60, 2)
    };
    let job = build_job(orders, three_open_objectives());
    let settings = settings(&["copper", "gold", "diamond"]);
    let mut rng = SmallRng::seed_from_u64(21);

    let low = job
        .create_special_order(&settings, 5, NOW_MS, &mut rng)
        .expect("order");
    assert_eq!(low.rewards.as_slice(), ["copper".to_string()]);

    let high = job
        .create_special_order(&settings, 25, NOW_MS, &mut rng)
        .expect("order");
    let names: BTreeSet<&str> = high.rewards.iter().map(String::as_str).collect();
    assert_eq!(names, BTreeSet::from(["copper", "gold"]));
}

#[test]
fn wildcard_pool_expands_to_every_global_reward() {
    let job = build_job(fixed_orders(1, 60, 10), three_open_objectives());
    let settings = settings(&["copper", "gold", "diamond"]);
    let mut rng = SmallRng::seed_from_u64(8);
    // Job levels start at 1, so level 0 reads the key-1 pool.
    let order = job
        .create_special_order(&settings, 0, NOW_MS, &mut rng)
        .expect("order");
    let names: BTreeSet<&str> = order.rewards.iter().map(String::as_str).collect();
    assert_eq!(names, BTreeSet::from(["copper", "diamond", "gold"]));
}

#[test]
fn reward_pool_is_empty_below_the_first_key() {
    let orders = SpecialOrderSettings {
        allowed_rewards: BTreeMap::from([(5, vec!["gold".to_string()])]),
        ..fixed_orders(1, 60, 2)
    };
    let job = build_job(orders, three_open_objectives());
    let settings = settings(&["gold", "diamond"]);
    let mut rng = SmallRng::seed_from_u64(4);

    let low = job
        .create_special_order(&settings, 3, NOW_MS, &mut rng)
        .expect("objectives are still eligible");
    assert!(low.rewards.is_empty());

    let gated = job
        .create_special_order(&settings, 5, NOW_MS, &mut rng)
        .expect("order");
    assert_eq!(gated.rewards.as_slice(), ["gold".to_string()]);
}

fn job_costing(cost: &[(&str, f64)]) -> Job {
    build_job(
        SpecialOrderSettings {
            cost: cost
                .iter()
                .map(|(currency, amount)| ((*currency).to_string(), *amount))
                .collect(),
            ..fixed_orders(1, 60, 1)
        },
        three_open_objectives(),
    )
}

#[test]
fn empty_cost_is_always_affordable() {
    let job = job_costing(&[]);
    let ledger = MemoryLedger::new(["vault"]);
    assert!(job.can_afford_special_order("alex", &ledger));
    assert!(job.charge_special_order("alex", &ledger).unwrap());
}

#[test]
fn any_short_currency_makes_order_unaffordable() {
    let job = job_costing(&[("vault", 100.0), ("tokens", 10.0)]);
    let ledger = MemoryLedger::new(["vault", "tokens"]);
    ledger.deposit("alex", "vault", 500.0);
    ledger.deposit("alex", "tokens", 4.0);
    assert!(!job.can_afford_special_order("alex", &ledger));

    // Nothing is taken when one currency falls short.
    assert!(!job.charge_special_order("alex", &ledger).unwrap());
    assert_eq!(ledger.balance("alex", "vault"), Some(500.0));
    assert_eq!(ledger.balance("alex", "tokens"), Some(4.0));

    ledger.deposit("alex", "tokens", 6.0);
    assert!(job.can_afford_special_order("alex", &ledger));
    assert!(job.charge_special_order("alex", &ledger).unwrap());
    assert_eq!(ledger.balance("alex", "vault"), Some(400.0));
    assert_eq!(ledger.balance("alex", "tokens"), Some(0.0));
}

#[test]
fn unknown_currency_cost_is_skipped() {
    let job = job_costing(&[("vault", 50.0), ("gems", 1_000.0)]);
    let ledger = MemoryLedger::new(["vault"]);
    ledger.deposit("alex", "vault", 50.0);
    assert!(job.can_afford_special_order("alex", &ledger));
    assert!(job.charge_special_order("alex", &ledger).unwrap());
    assert_eq!(ledger.balance("alex", "vault"), Some(0.0));
    assert_eq!(ledger.balance("alex", "gems"), None);
}

#[test]
fn same_seed_reproduces_order() {
    let job = build_job(
        SpecialOrderSettings {
            objectives_amount: UniInt::of(1, 3),
            duration_secs: UniInt::of(600, 7200),
            rewards_amount: UniInt::of(1, 2),
            ..fixed_orders(1, 60, 1)
        },
        ["alpha", "beta", "gamma"]
            .into_iter()
            .map(|id| objective(id, true, UniInt::of(1, 3), UniInt::of(10, 99)))
            .collect(),
    );
    let settings = settings(&["gold", "emerald", "iron"]);
    let mut first = ChaCha20Rng::seed_from_u64(0xDEAD_BEEF);
    let mut second = ChaCha20Rng::seed_from_u64(0xDEAD_BEEF);
    assert_eq!(
        job.create_special_order(&settings, 10, NOW_MS, &mut first),
        job.create_special_order(&settings, 10, NOW_MS, &mut second)
    );
}
