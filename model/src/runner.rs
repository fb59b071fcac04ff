use crate::clients::ObjectClient;
use crate::convergence::{self, verify_scenario, FixtureSnafu};
use crate::fixtures::{self, create_scenario_fixtures, InstallSettings};
use crate::report::{ScenarioOutcome, SuiteReport};
use crate::scenario::{ImageSet, Scenario};
use crate::wait::{is_deleted, Waiter};
use crate::Addon;
use futures::future::join_all;
use log::{error, info, warn};
use snafu::ResultExt;
use tokio::time::Instant;

/// What the runner installs and how it schedules scenarios.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SuiteConfig {
    pub images: ImageSet,
    pub install: InstallSettings,
    /// Run all scenarios at once instead of one after another.
    pub parallel: bool,
}

/// Runs scenarios against a cluster. Each scenario creates its own addon and namespace, so
/// scenarios never share writable state and one failure never stops the others.
pub struct SuiteRunner<'a, C> {
    waiter: Waiter<'a, C>,
    config: SuiteConfig,
}

impl<'a, C> SuiteRunner<'a, C>
where
    C: ObjectClient,
{
    pub fn new(waiter: Waiter<'a, C>, config: SuiteConfig) -> Self {
        Self { waiter, config }
    }

    pub async fn run_all(&self, scenarios: &[Scenario]) -> SuiteReport {
        let outcomes = if self.config.parallel {
            join_all(scenarios.iter().map(|scenario| self.run_scenario(scenario))).await
        } else {
            let mut outcomes = Vec::with_capacity(scenarios.len());
            for scenario in scenarios {
                outcomes.push(self.run_scenario(scenario).await);
            }
            outcomes
        };
        SuiteReport::new(outcomes)
    }

    /// Creates the scenario's fixtures, checks convergence, and removes the addon again.
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioOutcome {
        info!("Starting scenario '{}' ({})", scenario.name, scenario.flags);
        let start = Instant::now();
        let result = self.check(scenario).await;
        self.cleanup(scenario).await;
        let duration = start.elapsed();
        match result {
            Ok(()) => {
                info!("Scenario '{}' passed in {:?}", scenario.name, duration);
                ScenarioOutcome::passed(scenario, duration)
            }
            Err(e) => {
                error!("Scenario '{}' failed: {}", scenario.name, e);
                ScenarioOutcome::failed(scenario, duration, e.kind(), e.to_string())
            }
        }
    }

    async fn check(&self, scenario: &Scenario) -> convergence::Result<()> {
        let namespace = scenario.namespace();
        let addon = fixtures::addon(
            &scenario.addon_name(),
            &namespace,
            self.config.images.image(scenario.source_image),
            &self.config.install,
        );
        create_scenario_fixtures(&self.waiter, &addon, &namespace, &scenario.flags)
            .await
            .context(FixtureSnafu)?;
        verify_scenario(
            &self.waiter,
            &scenario.addon_identity(),
            &scenario.package_identity(),
            &scenario.flags,
            &namespace,
            scenario.expected,
        )
        .await
    }

    /// Deletes the scenario's addon and waits for it to be gone. Failures are only logged.
    async fn cleanup(&self, scenario: &Scenario) {
        let identity = scenario.addon_identity();
        match self.waiter.client().delete::<Addon>(&identity).await {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                warn!("Unable to delete {}: {}", identity, e);
                return;
            }
        }
        if let Err(e) = self
            .waiter
            .await_default::<Addon, _>(&identity, "to be deleted", is_deleted())
            .await
        {
            warn!("Cleanup of {} did not finish: {}", identity, e);
        }
    }
}
