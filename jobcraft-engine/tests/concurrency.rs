use std::sync::Arc;
use std::thread;

use jobcraft_engine::{
    EngineSettings, Job, JobConfig, JobRegistry, JobState, OrderSeedInput, WorkCatalog, load_job,
    order_rng,
};

fn miner() -> Job {
    load_job("miner", &JobConfig::sample_miner(), &WorkCatalog::standard())
        .unwrap()
        .expect("sample job is enabled")
        .job
}

#[test]
fn employee_counts_survive_parallel_updates() {
    let job = Arc::new(miner());
    let workers: Vec<_> = (0..8)
        .map(|_| {
            let job = Arc::clone(&job);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    job.employees().increment(JobState::Primary, 1);
                    job.employees().increment(JobState::Secondary, 2);
                    job.employees().decrement(JobState::Secondary, 1);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(job.employees().count_for(JobState::Primary), 8_000);
    assert_eq!(job.employees().count_for(JobState::Secondary), 8_000);
    assert_eq!(job.employees().total_count(), 16_000);
}

#[test]
fn decrements_never_underflow_under_contention() {
    let job = Arc::new(miner());
    job.employees().set(JobState::Primary, 100);
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let job = Arc::clone(&job);
            thread::spawn(move || {
                for _ in 0..100 {
                    job.employees().decrement(JobState::Primary, 1);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(job.employees().count_for(JobState::Primary), 0);
}

#[test]
fn readers_see_whole_jobs_while_reloading() {
    let registry = Arc::new(JobRegistry::new());
    registry.publish(miner());
    let settings = Arc::new(EngineSettings::load_from_static());

    let readers: Vec<_> = (0..4_u64)
        .map(|reader| {
            let registry = Arc::clone(&registry);
            let settings = Arc::clone(&settings);
            thread::spawn(move || {
                for step in 0..200_i64 {
                    let job = registry.get("miner").expect("miner stays published");
                    assert_eq!(job.objectives().count(), 4);
                    let now_ms = step * 86_400_000;
                    let input = OrderSeedInput::at("steve", job.id(), now_ms);
                    let mut rng = order_rng(reader, &input);
                    let order = job.create_special_order(&settings, 12, now_ms, &mut rng);
                    assert!(order.is_some_and(|order| !order.objectives.is_empty()));
                }
            })
        })
        .collect();

    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for _ in 0..50 {
                registry
                    .get("miner")
                    .expect("published")
                    .employees()
                    .increment(JobState::Primary, 1);
                registry.publish(miner());
            }
        })
    };

    for reader in readers {
        reader.join().unwrap();
    }
    writer.join().unwrap();
    let job = registry.get("miner").unwrap();
    assert_eq!(job.employees().count_for(JobState::Primary), 50);
}
