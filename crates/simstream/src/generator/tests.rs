use crate::{BATCH_SIZE, RandSource, SampleGenerator, ThreadRandom, UniformGenerator};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::scope;

/// Always returns the upper bound it was given.
struct CeilingRand;

impl RandSource for CeilingRand {
    fn rand_inclusive(&self, max: u64) -> u64 {
        max
    }
}

/// Records every bound it was asked for and returns zero.
#[derive(Default)]
struct RecordingRand {
    last_max: AtomicU64,
    calls: AtomicU64,
}

impl RandSource for Arc<RecordingRand> {
    fn rand_inclusive(&self, max: u64) -> u64 {
        self.last_max.store(max, Ordering::Relaxed);
        self.calls.fetch_add(1, Ordering::Relaxed);
        0
    }
}

const LIMITS: [u64; 7] = [0, 1, 2, 5, 100, 1_000_000, u64::MAX];

#[test]
fn batch_always_has_default_size() {
    let generator = UniformGenerator::default();
    assert_eq!(generator.batch_size(), BATCH_SIZE);
    for limit in LIMITS {
        assert_eq!(generator.generate(limit).len(), 64);
    }
}

#[test]
fn samples_stay_within_inclusive_bound() {
    let generator = UniformGenerator::default();
    for limit in LIMITS {
        for _ in 0..256 {
            let batch = generator.generate(limit);
            assert!(batch.iter().all(|&s| s <= limit), "limit {limit}: {batch:?}");
        }
    }
}

#[test]
fn zero_limit_yields_only_zeros() {
    let generator = UniformGenerator::default();
    for _ in 0..1_000 {
        assert!(generator.generate(0).iter().all(|&s| s == 0));
    }
}

#[test]
fn upper_bound_is_reachable() {
    // With limit = 1 the odds of never seeing a 1 across 64 * 100 draws are
    // 2^-6400.
    let generator = UniformGenerator::default();
    let seen: HashSet<u64> = (0..100).flat_map(|_| generator.generate(1)).collect();
    assert_eq!(seen, HashSet::from([0, 1]));
}

#[test]
fn upper_bound_is_passed_through_unchanged() {
    let generator = UniformGenerator::with_rng(BATCH_SIZE, CeilingRand);
    assert!(generator.generate(7).iter().all(|&s| s == 7));
    assert!(generator.generate(u64::MAX).iter().all(|&s| s == u64::MAX));

    let rng = Arc::new(RecordingRand::default());
    let generator = UniformGenerator::with_rng(BATCH_SIZE, Arc::clone(&rng));
    generator.generate(42);
    assert_eq!(rng.last_max.load(Ordering::Relaxed), 42);
    assert_eq!(rng.calls.load(Ordering::Relaxed), BATCH_SIZE as u64);
}

#[test]
fn custom_batch_size_is_honored() {
    let generator = UniformGenerator::new(3);
    assert_eq!(generator.generate(10).len(), 3);

    let empty = UniformGenerator::new(0);
    assert!(empty.generate(10).is_empty());
}

#[test]
fn small_range_covers_every_value() {
    let generator = UniformGenerator::default();
    let seen: HashSet<u64> = (0..200).flat_map(|_| generator.generate(5)).collect();
    assert_eq!(seen, (0..=5).collect());
}

#[test]
fn generator_is_shareable_across_threads() {
    const THREADS: usize = 8;

    let generator = UniformGenerator::with_rng(BATCH_SIZE, ThreadRandom);
    scope(|s| {
        for t in 0..THREADS {
            let generator = &generator;
            s.spawn(move || {
                let limit = t as u64;
                for _ in 0..1_000 {
                    let batch = generator.generate(limit);
                    assert_eq!(batch.len(), BATCH_SIZE);
                    assert!(batch.iter().all(|&v| v <= limit));
                }
            });
        }
    });
}
