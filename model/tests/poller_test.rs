/*!

Timing and error behavior of the condition poller, against scripted snapshot sequences. Time is
paused, so the waits complete instantly while tokio's clock advances exactly as it would in real
time.

!*/

pub(crate) mod mock;

use mock::{MockCluster, Scripted};
use pkotest_model::clients::ResourceIdentity;
use pkotest_model::constants::CONDITION_AVAILABLE;
use pkotest_model::wait::{
    exists, is_condition_true, is_deleted, when_present, Error, PollSettings, SuiteBudget, Verdict,
    Waiter,
};
use pkotest_model::{
    ClusterPackage, ClusterPackageSpec, ConditionStatus, PackageStatus, StatusCondition,
};
use std::time::Duration;
use tokio::time::Instant;

const INTERVAL: Duration = Duration::from_secs(1);

fn settings(timeout: Duration) -> PollSettings {
    PollSettings {
        interval: INTERVAL,
        timeout,
    }
}

fn package(available: Option<ConditionStatus>) -> ClusterPackage {
    let mut package = ClusterPackage::new(
        "my-addon",
        ClusterPackageSpec {
            image: "quay.io/example/package:v1".to_string(),
            config: None,
        },
    );
    if let Some(status) = available {
        package.status = Some(PackageStatus {
            conditions: vec![StatusCondition::new(CONDITION_AVAILABLE, status, "Test")],
            ..PackageStatus::default()
        });
    }
    package
}

fn package_id() -> ResourceIdentity {
    ResourceIdentity::cluster_scoped::<ClusterPackage, _>("my-addon")
}

#[tokio::test(start_paused = true)]
async fn returns_the_satisfying_snapshot() {
    let cluster = MockCluster::new();
    cluster.script(
        &package_id(),
        vec![
            Scripted::Missing,
            Scripted::object(&package(None)),
            Scripted::object(&package(Some(ConditionStatus::False))),
            Scripted::object(&package(Some(ConditionStatus::True))),
        ],
    );
    let waiter = Waiter::new(&cluster, settings(Duration::from_secs(60)));
    let start = Instant::now();
    let found: Option<ClusterPackage> = waiter
        .await_default(
            &package_id(),
            "to be available",
            is_condition_true(CONDITION_AVAILABLE),
        )
        .await
        .unwrap();
    assert!(found.unwrap().status.is_some());
    assert_eq!(cluster.fetch_count(&package_id()), 4);
    assert_eq!(start.elapsed(), 3 * INTERVAL);
}

#[tokio::test(start_paused = true)]
async fn timeout_fires_within_one_interval_of_the_deadline() {
    for (interval_secs, timeout_secs) in [(1, 5), (3, 5), (2, 7), (10, 4)] {
        let interval = Duration::from_secs(interval_secs);
        let timeout = Duration::from_secs(timeout_secs);
        let cluster = MockCluster::new();
        cluster.insert(&package(Some(ConditionStatus::False)));
        let waiter = Waiter::new(&cluster, PollSettings { interval, timeout });
        let start = Instant::now();
        let err = waiter
            .await_default::<ClusterPackage, _>(
                &package_id(),
                "to be available",
                is_condition_true(CONDITION_AVAILABLE),
            )
            .await
            .unwrap_err();
        let elapsed = start.elapsed();
        assert!(elapsed >= timeout, "{:?} < {:?}", elapsed, timeout);
        assert!(elapsed <= timeout + interval, "{:?}", elapsed);
        match err {
            Error::Timeout(expired) => {
                assert_eq!(expired.identity, package_id());
                assert_eq!(expired.elapsed, elapsed);
                assert!(expired.last_observed.contains("Available=False(Test)"));
            }
            other => panic!("expected a timeout, got {}", other),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn missing_object_is_not_done() {
    let cluster = MockCluster::new();
    let waiter = Waiter::new(&cluster, settings(Duration::from_secs(3)));
    let err = waiter
        .await_default::<ClusterPackage, _>(&package_id(), "to exist", exists())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("object not found"), "{}", err);
    assert_eq!(cluster.fetch_count(&package_id()), 4);
}

#[tokio::test(start_paused = true)]
async fn absence_satisfies_is_deleted() {
    let cluster = MockCluster::new();
    cluster.script(
        &package_id(),
        vec![Scripted::object(&package(None)), Scripted::Missing],
    );
    let waiter = Waiter::new(&cluster, settings(Duration::from_secs(30)));
    let found = waiter
        .await_default::<ClusterPackage, _>(&package_id(), "to be deleted", is_deleted())
        .await
        .unwrap();
    assert!(found.is_none());
    assert_eq!(cluster.fetch_count(&package_id()), 2);
}

#[tokio::test(start_paused = true)]
async fn fetch_failures_are_not_retried() {
    let cluster = MockCluster::new();
    cluster.script(
        &package_id(),
        vec![Scripted::Missing, Scripted::Fail("forbidden".to_string())],
    );
    let waiter = Waiter::new(&cluster, settings(Duration::from_secs(30)));
    let err = waiter
        .await_default::<ClusterPackage, _>(&package_id(), "to exist", exists())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Fetch { .. }), "{}", err);
    assert!(err.to_string().contains("forbidden"));
    assert_eq!(cluster.fetch_count(&package_id()), 2);
}

#[tokio::test(start_paused = true)]
async fn condition_errors_end_the_wait() {
    let cluster = MockCluster::new();
    cluster.insert(&package(None));
    let waiter = Waiter::new(&cluster, settings(Duration::from_secs(30)));
    let start = Instant::now();
    let err = waiter
        .await_default(
            &package_id(),
            "to be valid",
            when_present(|_: &ClusterPackage| Err::<Verdict, _>("bad payload".to_string())),
        )
        .await
        .unwrap_err();
    match err {
        Error::Condition { identity, source } => {
            assert_eq!(identity, package_id());
            assert_eq!(source, "bad payload");
        }
        other => panic!("expected a condition error, got {}", other),
    }
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(cluster.fetch_count(&package_id()), 1);
}

#[tokio::test(start_paused = true)]
async fn stalled_fetch_is_bounded_by_the_timeout() {
    let cluster = MockCluster::new();
    cluster.script(&package_id(), vec![Scripted::Stall]);
    let waiter = Waiter::new(&cluster, settings(Duration::from_secs(5)));
    let start = Instant::now();
    let err = waiter
        .await_default::<ClusterPackage, _>(&package_id(), "to exist", exists())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout(_)), "{}", err);
    assert_eq!(start.elapsed(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn budget_interrupts_a_longer_wait() {
    let cluster = MockCluster::new();
    let budget = SuiteBudget::starting_now(Duration::from_secs(4));
    let waiter = Waiter::new(&cluster, settings(Duration::from_secs(60))).with_budget(budget);
    let start = Instant::now();
    let err = waiter
        .await_default::<ClusterPackage, _>(&package_id(), "to exist", exists())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BudgetExceeded(_)), "{}", err);
    assert_eq!(start.elapsed(), Duration::from_secs(4));
    assert!(budget.is_exhausted());
    assert_eq!(budget.remaining(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn timeout_before_budget_is_a_timeout() {
    let cluster = MockCluster::new();
    let budget = SuiteBudget::starting_now(Duration::from_secs(60));
    let waiter = Waiter::new(&cluster, settings(Duration::from_secs(60))).with_budget(budget);
    let err = waiter
        .await_condition::<ClusterPackage, _>(
            &package_id(),
            "to exist",
            Duration::from_secs(2),
            exists(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout(_)), "{}", err);
    assert_eq!(budget.remaining(), Duration::from_secs(58));
}

#[tokio::test(start_paused = true)]
async fn concurrent_waits_are_independent() {
    let cluster = MockCluster::new();
    let package_id = package_id();
    let other_id = ResourceIdentity::cluster_scoped::<ClusterPackage, _>("other-addon");
    cluster.script(
        &package_id,
        vec![
            Scripted::Missing,
            Scripted::object(&package(Some(ConditionStatus::True))),
        ],
    );
    let waiter = Waiter::new(&cluster, settings(Duration::from_secs(3)));
    let (found, missing) = futures::join!(
        waiter.await_default::<ClusterPackage, _>(&package_id, "to exist", exists()),
        waiter.await_default::<ClusterPackage, _>(&other_id, "to exist", exists()),
    );
    assert!(found.unwrap().is_some());
    assert!(matches!(missing, Err(Error::Timeout(_))));
}

#[tokio::test(start_paused = true)]
async fn zero_interval_is_raised_to_the_minimum() {
    let cluster = MockCluster::new();
    let waiter = Waiter::new(
        &cluster,
        PollSettings {
            interval: Duration::ZERO,
            timeout: Duration::from_secs(1),
        },
    );
    let err = waiter
        .await_default::<ClusterPackage, _>(&package_id(), "to exist", exists())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout(_)), "{}", err);
    // One fetch at the start and one every 100ms until the deadline.
    assert_eq!(cluster.fetch_count(&package_id()), 11);
}
