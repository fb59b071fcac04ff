use anyhow::{ensure, Context, Result};
use clap::Parser;
use pkotest_model::clients::K8sObjectClient;
use pkotest_model::constants::{DEFAULT_AVAILABILITY_TIMEOUT, DEFAULT_POLL_INTERVAL};
use pkotest_model::wait::{PollSettings, SuiteBudget, Waiter};
use pkotest_model::{scenario_table, ImageSet, InstallSettings, SuiteConfig, SuiteRunner};
use std::time::Duration;
use terminal_size::{Height, Width};

/// Run the parameter injection scenarios and print a report.
#[derive(Debug, Parser)]
pub(crate) struct Run {
    /// Only run scenarios whose name contains this string.
    #[clap(long)]
    filter: Option<String>,

    /// Run all selected scenarios at once.
    #[clap(long)]
    parallel: bool,

    /// How long to wait for each condition, in seconds.
    #[clap(long = "timeout-secs", default_value_t = DEFAULT_AVAILABILITY_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// How often to re-read an object while waiting, in seconds.
    #[clap(
        long = "poll-interval-secs",
        default_value_t = DEFAULT_POLL_INTERVAL.as_secs(),
        parse(try_from_str = parse_poll_interval)
    )]
    poll_interval_secs: u64,

    /// Stop waiting once this many seconds have passed since the run started.
    #[clap(long = "budget-secs")]
    budget_secs: Option<u64>,

    /// The package image that treats every parameter as optional.
    #[clap(long = "optional-params-image")]
    optional_params_image: Option<String>,

    /// The package image that requires every parameter.
    #[clap(long = "required-params-image")]
    required_params_image: Option<String>,

    /// The catalog source image for the OLM install of the addon.
    #[clap(long = "catalog-source-image")]
    catalog_source_image: Option<String>,

    /// Output the report in JSON format.
    #[clap(long = "json")]
    json: bool,
}

impl Run {
    pub(crate) async fn run(self, client: K8sObjectClient) -> Result<()> {
        let scenarios: Vec<_> = scenario_table()
            .into_iter()
            .filter(|s| {
                self.filter
                    .as_ref()
                    .map(|filter| s.name.contains(filter.as_str()))
                    .unwrap_or(true)
            })
            .collect();
        ensure!(!scenarios.is_empty(), "No scenarios match the filter");

        let mut images = ImageSet::default();
        if let Some(image) = self.optional_params_image {
            images.optional_params = image;
        }
        if let Some(image) = self.required_params_image {
            images.required_params = image;
        }
        let mut install = InstallSettings::default();
        if let Some(image) = self.catalog_source_image {
            install.catalog_source_image = image;
        }

        let settings = PollSettings {
            interval: Duration::from_secs(self.poll_interval_secs),
            timeout: Duration::from_secs(self.timeout_secs),
        };
        let mut waiter = Waiter::new(&client, settings);
        if let Some(budget_secs) = self.budget_secs {
            waiter = waiter.with_budget(SuiteBudget::starting_now(Duration::from_secs(budget_secs)));
        }
        let runner = SuiteRunner::new(
            waiter,
            SuiteConfig {
                images,
                install,
                parallel: self.parallel,
            },
        );
        let report = runner.run_all(&scenarios).await;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report)
                    .context("Could not create string from report.")?
            );
        } else {
            let (terminal_size::Width(width), _) =
                terminal_size::terminal_size().unwrap_or((Width(120), Height(0)));
            println!("{}", report.to_string(width as usize));
        }
        ensure!(
            report.all_passed(),
            "{} of {} scenarios failed",
            report.num_failed(),
            report.outcomes.len()
        );
        Ok(())
    }
}

fn parse_poll_interval(value: &str) -> std::result::Result<u64, String> {
    match value.parse::<u64>() {
        Ok(0) => Err("the poll interval must be at least 1 second".to_string()),
        Ok(secs) => Ok(secs),
        Err(e) => Err(e.to_string()),
    }
}
