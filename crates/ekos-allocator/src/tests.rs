//! Unit tests for ekos-allocator

use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Duration, TimeZone, Utc};
use ekos_directory::CityDirectory;
use ekos_store::{
    CounterStore, LatestRecord, MemoryStore, RecordStore, ReportQuery, StoreError,
};
use ekos_types::{
    CityCode, NewReport, Partition, ProjectRef, Report, ReportId, ReportNumber, Year,
};
use proptest::prelude::*;
use test_case::test_case;

use crate::{
    AllocationError, Clock, CounterAllocator, FixedClock, NumberAllocator, SystemClock,
    insert_with_retry, latest_sequence,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

fn allocator_at(
    now: DateTime<Utc>,
) -> (
    CounterAllocator<MemoryStore, Arc<FixedClock>>,
    Arc<FixedClock>,
) {
    let clock = Arc::new(FixedClock::new(now));
    let allocator = CounterAllocator::new(
        Arc::new(MemoryStore::new()),
        Arc::new(CityDirectory::turkey()),
        Arc::clone(&clock),
    );
    (allocator, clock)
}

fn record(number: ReportNumber, created_at: DateTime<Utc>) -> Report {
    let input = NewReport::new(
        ProjectRef {
            id: "p-1".into(),
            name: "Default".into(),
        },
        "Ankara",
        "Tower crane",
        "Lifting",
        "ACME",
    );
    Report::new(ReportId::generate(), number, input, "u-1", "admin", created_at)
}

fn seed_record<S: RecordStore>(store: &S, number: &str, created_at: DateTime<Utc>) {
    store
        .insert_with_unique_number(record(number.parse().unwrap(), created_at))
        .unwrap();
}

fn ankara_2025() -> Partition {
    Partition::new(Year::new(2025).unwrap(), CityCode::new("ANK").unwrap())
}

/// A store whose newest record carries a number written by hand.
struct LegacyStore {
    inner: MemoryStore,
    latest: String,
}

impl RecordStore for LegacyStore {
    fn find_latest_by_prefix(&self, prefix: &str) -> Result<Option<LatestRecord>, StoreError> {
        Ok(self.latest.starts_with(prefix).then(|| LatestRecord {
            report_number: self.latest.clone(),
            created_at: at(2025, 1, 1),
        }))
    }

    fn insert_with_unique_number(&self, report: Report) -> Result<(), StoreError> {
        self.inner.insert_with_unique_number(report)
    }

    fn get(&self, id: ReportId) -> Result<Option<Report>, StoreError> {
        self.inner.get(id)
    }

    fn replace(&self, report: Report) -> Result<(), StoreError> {
        self.inner.replace(report)
    }

    fn remove(&self, id: ReportId) -> Result<Option<Report>, StoreError> {
        self.inner.remove(id)
    }

    fn list(&self, query: &ReportQuery) -> Result<Vec<Report>, StoreError> {
        self.inner.list(query)
    }

    fn all(&self) -> Result<Vec<Report>, StoreError> {
        self.inner.all()
    }
}

impl CounterStore for LegacyStore {
    fn current(&self, partition: Partition) -> Result<Option<u32>, StoreError> {
        self.inner.current(partition)
    }

    fn init_if_absent(&self, partition: Partition, value: u32) -> Result<bool, StoreError> {
        self.inner.init_if_absent(partition, value)
    }

    fn increment(&self, partition: Partition) -> Result<u32, StoreError> {
        self.inner.increment(partition)
    }
}

/// A store that cannot be reached.
struct UnreachableStore;

fn unreachable() -> StoreError {
    StoreError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "store offline"))
}

impl RecordStore for UnreachableStore {
    fn find_latest_by_prefix(&self, _: &str) -> Result<Option<LatestRecord>, StoreError> {
        Err(unreachable())
    }

    fn insert_with_unique_number(&self, _: Report) -> Result<(), StoreError> {
        Err(unreachable())
    }

    fn get(&self, _: ReportId) -> Result<Option<Report>, StoreError> {
        Err(unreachable())
    }

    fn replace(&self, _: Report) -> Result<(), StoreError> {
        Err(unreachable())
    }

    fn remove(&self, _: ReportId) -> Result<Option<Report>, StoreError> {
        Err(unreachable())
    }

    fn list(&self, _: &ReportQuery) -> Result<Vec<Report>, StoreError> {
        Err(unreachable())
    }

    fn all(&self) -> Result<Vec<Report>, StoreError> {
        Err(unreachable())
    }
}

impl CounterStore for UnreachableStore {
    fn current(&self, _: Partition) -> Result<Option<u32>, StoreError> {
        Err(unreachable())
    }

    fn init_if_absent(&self, _: Partition, _: u32) -> Result<bool, StoreError> {
        Err(unreachable())
    }

    fn increment(&self, _: Partition) -> Result<u32, StoreError> {
        Err(unreachable())
    }
}

// ============================================================================
// Sequencing
// ============================================================================

#[test]
fn first_allocations_in_empty_store() {
    let (allocator, _) = allocator_at(at(2025, 4, 2));

    assert_eq!(allocator.allocate("Ankara").unwrap().to_string(), "PK2025ANK001");
    assert_eq!(allocator.allocate("Ankara").unwrap().to_string(), "PK2025ANK002");
}

#[test]
fn continues_from_latest_existing_record() {
    let (allocator, _) = allocator_at(at(2025, 4, 2));
    seed_record(allocator.store().as_ref(), "PK2025ANK099", at(2025, 4, 1));

    assert_eq!(allocator.allocate("Ankara").unwrap().to_string(), "PK2025ANK100");
}

#[test]
fn sequential_calls_increment_by_one() {
    let (allocator, _) = allocator_at(at(2025, 4, 2));

    let suffixes: Vec<u32> = (0..20)
        .map(|_| allocator.allocate("İzmir").unwrap().sequence().as_u32())
        .collect();

    for pair in suffixes.windows(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }
}

#[test]
fn year_rollover_restarts_at_one() {
    let (allocator, clock) = allocator_at(at(2024, 12, 31));
    seed_record(allocator.store().as_ref(), "PK2024ANK045", at(2024, 12, 30));
    assert_eq!(allocator.allocate("Ankara").unwrap().to_string(), "PK2024ANK046");

    clock.advance(Duration::days(1));

    assert_eq!(allocator.allocate("Ankara").unwrap().to_string(), "PK2025ANK001");
}

#[test]
fn partitions_are_independent() {
    let (allocator, clock) = allocator_at(at(2025, 6, 1));

    for _ in 0..3 {
        allocator.allocate("Ankara").unwrap();
    }
    assert_eq!(allocator.allocate("İzmir").unwrap().to_string(), "PK2025IZM001");

    clock.set(at(2026, 1, 5));
    assert_eq!(allocator.allocate("Ankara").unwrap().to_string(), "PK2026ANK001");

    clock.set(at(2025, 6, 2));
    assert_eq!(allocator.allocate("Ankara").unwrap().to_string(), "PK2025ANK004");
}

#[test]
fn deleting_newest_report_does_not_reuse_its_number() {
    let (allocator, _) = allocator_at(at(2025, 4, 2));
    let store = Arc::clone(allocator.store());

    let first = allocator.allocate("Ankara").unwrap();
    let report = record(first, at(2025, 4, 2));
    let id = report.id;
    store.insert_with_unique_number(report).unwrap();
    store.remove(id).unwrap();

    assert_eq!(allocator.allocate("Ankara").unwrap().to_string(), "PK2025ANK002");
}

// ============================================================================
// Boundaries and Errors
// ============================================================================

#[test]
fn overflow_past_999_is_rejected() {
    let (allocator, _) = allocator_at(at(2025, 4, 2));
    seed_record(allocator.store().as_ref(), "PK2025ANK999", at(2025, 4, 1));

    let err = allocator.allocate("Ankara").unwrap_err();

    assert!(matches!(
        err,
        AllocationError::SequenceExhausted { partition } if partition == ankara_2025()
    ));
    // Other partitions keep working.
    assert_eq!(allocator.allocate("İzmir").unwrap().to_string(), "PK2025IZM001");
}

#[test]
fn last_sequence_998_allows_one_more() {
    let (allocator, _) = allocator_at(at(2025, 4, 2));
    seed_record(allocator.store().as_ref(), "PK2025ANK998", at(2025, 4, 1));

    assert_eq!(allocator.allocate("Ankara").unwrap().to_string(), "PK2025ANK999");
    assert!(matches!(
        allocator.allocate("Ankara"),
        Err(AllocationError::SequenceExhausted { .. })
    ));
}

#[test_case("PK2025ANKX12"; "non-numeric suffix")]
#[test_case("PK2025ANK0001"; "widened suffix")]
#[test_case("PK2025ANK000"; "zero suffix")]
fn malformed_latest_number_fails_loudly(latest: &str) {
    let store = Arc::new(LegacyStore {
        inner: MemoryStore::new(),
        latest: latest.to_string(),
    });
    let allocator = CounterAllocator::new(
        store,
        Arc::new(CityDirectory::turkey()),
        FixedClock::new(at(2025, 4, 2)),
    );

    let err = allocator.allocate("Ankara").unwrap_err();

    assert!(matches!(
        err,
        AllocationError::MalformedExistingNumber { ref number } if number == latest
    ));
}

#[test]
fn store_failure_is_store_unavailable() {
    let allocator = CounterAllocator::new(
        Arc::new(UnreachableStore),
        Arc::new(CityDirectory::turkey()),
        FixedClock::new(at(2025, 4, 2)),
    );

    assert!(matches!(
        allocator.allocate("Ankara"),
        Err(AllocationError::StoreUnavailable(StoreError::Io(_)))
    ));
}

#[test]
fn year_outside_four_digits_is_rejected() {
    let (allocator, _) = allocator_at(Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap());

    assert!(matches!(
        allocator.allocate("Ankara"),
        Err(AllocationError::YearOutOfRange(10_000))
    ));
}

// ============================================================================
// City Resolution
// ============================================================================

#[test_case("Atlantis"; "unknown name")]
#[test_case(""; "empty name")]
#[test_case("ankara"; "wrong case")]
fn unknown_city_falls_back_to_xxx(city: &str) {
    let (allocator, _) = allocator_at(at(2025, 4, 2));

    let number = allocator.allocate(city).unwrap();

    assert!(number.partition().city.is_fallback());
    assert_eq!(number.to_string(), "PK2025XXX001");
}

#[test]
fn strict_allocation_rejects_unknown_city() {
    let (allocator, _) = allocator_at(at(2025, 4, 2));

    assert!(matches!(
        allocator.allocate_strict("Atlantis"),
        Err(AllocationError::UnknownCity(name)) if name == "Atlantis"
    ));
    assert_eq!(
        allocator.allocate_strict("Ankara").unwrap().to_string(),
        "PK2025ANK001"
    );
}

#[test]
fn fallback_partition_has_its_own_sequence() {
    let (allocator, _) = allocator_at(at(2025, 4, 2));

    allocator.allocate("Ankara").unwrap();
    allocator.allocate("Nowhere").unwrap();

    assert_eq!(allocator.allocate("Elsewhere").unwrap().to_string(), "PK2025XXX002");
}

// ============================================================================
// Prefix Scan
// ============================================================================

#[test]
fn latest_sequence_uses_newest_record() {
    let store = MemoryStore::new();
    seed_record(&store, "PK2025ANK012", at(2025, 3, 1));
    seed_record(&store, "PK2025ANK007", at(2025, 3, 2));
    seed_record(&store, "PK2025IZM300", at(2025, 3, 3));

    let latest = latest_sequence(&store, ankara_2025()).unwrap().unwrap();

    assert_eq!(latest.as_u32(), 7);
}

#[test]
fn latest_sequence_of_empty_partition_is_none() {
    assert_eq!(latest_sequence(&MemoryStore::new(), ankara_2025()).unwrap(), None);
}

// ============================================================================
// Insert With Retry
// ============================================================================

#[test]
fn insert_with_retry_skips_numbers_taken_behind_the_counter() {
    let (allocator, _) = allocator_at(at(2025, 4, 2));
    let store = Arc::clone(allocator.store());
    allocator.allocate("Ankara").unwrap();
    seed_record(store.as_ref(), "PK2025ANK002", at(2025, 4, 1));
    seed_record(store.as_ref(), "PK2025ANK003", at(2025, 4, 1));

    let stored = insert_with_retry(&allocator, store.as_ref(), "Ankara", 5, |n| {
        record(n, at(2025, 4, 2))
    })
    .unwrap();

    assert_eq!(stored.report_number.to_string(), "PK2025ANK004");
    assert_eq!(store.all().unwrap().len(), 3);
}

#[test]
fn insert_with_retry_gives_up_after_max_attempts() {
    let (allocator, _) = allocator_at(at(2025, 4, 2));
    let store = Arc::clone(allocator.store());
    allocator.allocate("Ankara").unwrap();
    for n in 2..=6 {
        seed_record(store.as_ref(), &format!("PK2025ANK{n:03}"), at(2025, 4, 1));
    }

    let mut built = 0;
    let err = insert_with_retry(&allocator, store.as_ref(), "Ankara", 3, |n| {
        built += 1;
        record(n, at(2025, 4, 2))
    })
    .unwrap_err();

    assert!(matches!(err, AllocationError::RetriesExhausted { attempts: 3 }));
    assert_eq!(built, 3);
}

#[test]
fn insert_with_retry_propagates_store_failure() {
    let allocator = CounterAllocator::new(
        Arc::new(MemoryStore::new()),
        Arc::new(CityDirectory::turkey()),
        FixedClock::new(at(2025, 4, 2)),
    );

    let err = insert_with_retry(&allocator, &UnreachableStore, "Ankara", 5, |n| {
        record(n, at(2025, 4, 2))
    })
    .unwrap_err();

    assert!(matches!(err, AllocationError::StoreUnavailable(_)));
}

#[test]
fn store_duplicate_maps_to_duplicate_number() {
    let number: ReportNumber = "PK2025ANK001".parse().unwrap();

    let err = AllocationError::from(StoreError::DuplicateNumber(number));

    assert!(matches!(err, AllocationError::DuplicateNumber(n) if n == number));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn concurrent_allocations_are_pairwise_distinct() {
    let (allocator, _) = allocator_at(at(2025, 4, 2));
    let allocator = Arc::new(allocator);
    seed_record(allocator.store().as_ref(), "PK2025IST010", at(2025, 4, 1));

    let numbers: Vec<ReportNumber> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let allocator = Arc::clone(&allocator);
                s.spawn(move || {
                    (0..25)
                        .map(|_| {
                            insert_with_retry(
                                allocator.as_ref(),
                                allocator.store().as_ref(),
                                "İstanbul",
                                5,
                                |n| record(n, at(2025, 4, 2)),
                            )
                            .unwrap()
                            .report_number
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let distinct: HashSet<_> = numbers.iter().copied().collect();
    assert_eq!(distinct.len(), 200);

    let mut suffixes: Vec<u32> = numbers.iter().map(|n| n.sequence().as_u32()).collect();
    suffixes.sort_unstable();
    assert_eq!(suffixes, (11..=210).collect::<Vec<_>>());
}

#[test]
fn allocators_sharing_a_store_never_collide() {
    let store = Arc::new(MemoryStore::new());
    let directory = Arc::new(CityDirectory::turkey());
    let replicas: Vec<_> = (0..4)
        .map(|_| {
            CounterAllocator::new(
                Arc::clone(&store),
                Arc::clone(&directory),
                FixedClock::new(at(2025, 4, 2)),
            )
        })
        .collect();

    let numbers: Vec<ReportNumber> = thread::scope(|s| {
        let handles: Vec<_> = replicas
            .iter()
            .map(|replica| {
                s.spawn(move || {
                    (0..30)
                        .map(|_| replica.allocate("Ankara").unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let distinct: HashSet<_> = numbers.iter().collect();
    assert_eq!(distinct.len(), 120);
}

// ============================================================================
// Clock
// ============================================================================

#[test]
fn fixed_clock_moves_only_when_told() {
    let clock = FixedClock::new(at(2025, 1, 1));
    assert_eq!(clock.now_utc(), at(2025, 1, 1));

    clock.advance(Duration::days(2));
    assert_eq!(clock.now_utc(), at(2025, 1, 3));

    clock.set(at(2030, 5, 5));
    assert_eq!(clock.now_utc(), at(2030, 5, 5));
}

#[test]
fn system_clock_is_recent() {
    assert!(SystemClock::new().now_utc() > at(2024, 1, 1));
}

// ============================================================================
// Property Tests
// ============================================================================

fn city_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "Ankara", "İstanbul", "İzmir", "Bursa", "Antalya", "Unknownville",
    ])
}

proptest! {
    #[test]
    fn prop_numbers_match_format(city in city_name(), year in 1000i32..=9999, calls in 1usize..20) {
        let (allocator, _) = allocator_at(at(year, 7, 15));

        for _ in 0..calls {
            let text = allocator.allocate(city).unwrap().to_string();
            prop_assert_eq!(text.len(), 12);
            prop_assert!(text.starts_with("PK"));
            prop_assert!(text[2..6].bytes().all(|b| b.is_ascii_digit()));
            prop_assert!(text[6..9].bytes().all(|b| b.is_ascii_uppercase()));
            prop_assert!(text[9..].bytes().all(|b| b.is_ascii_digit()));
            prop_assert_eq!(&text[2..6], year.to_string());
        }
    }

    #[test]
    fn prop_interleaved_partitions_stay_contiguous(cities in prop::collection::vec(city_name(), 1..60)) {
        let (allocator, _) = allocator_at(at(2025, 9, 9));
        let mut expected = std::collections::HashMap::new();

        for city in cities {
            let number = allocator.allocate(city).unwrap();
            let next = expected.entry(number.partition()).or_insert(1u32);
            prop_assert_eq!(number.sequence().as_u32(), *next);
            *next += 1;
        }
    }
}
