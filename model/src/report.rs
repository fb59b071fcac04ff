use crate::convergence::FailureKind;
use crate::expectation::PresenceFlags;
use crate::scenario::{Scenario, SourceImage, TerminalStatus};
use serde::Serialize;
use std::time::Duration;
use tabled::object::Segment;
use tabled::{Alignment, Modify, Style, Table, Tabled, Width};

/// The result of running one scenario.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub name: String,
    pub source_image: SourceImage,
    pub flags: PresenceFlags,
    pub expected: TerminalStatus,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_secs: f64,
}

impl ScenarioOutcome {
    pub fn passed(scenario: &Scenario, duration: Duration) -> Self {
        Self {
            name: scenario.name.clone(),
            source_image: scenario.source_image,
            flags: scenario.flags,
            expected: scenario.expected,
            passed: true,
            failure: None,
            error: None,
            duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn failed(
        scenario: &Scenario,
        duration: Duration,
        failure: FailureKind,
        error: String,
    ) -> Self {
        Self {
            passed: false,
            failure: Some(failure),
            error: Some(error),
            ..Self::passed(scenario, duration)
        }
    }
}

/// The outcome of a suite run. `SuiteReport::to_string()` renders a table, and the report can be
/// serialized with `serde_json` for machine consumption.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SuiteReport {
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    pub fn new(outcomes: Vec<ScenarioOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn num_passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn num_failed(&self) -> usize {
        self.outcomes.len() - self.num_passed()
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn get(&self, name: &str) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    /// Create a table with one row per scenario, fit to `width` columns.
    pub fn to_string(&self, width: usize) -> String {
        fit(self.into(), width)
    }
}

/// Create a table listing `scenarios` in the order they run, fit to `width` columns.
pub fn scenario_list(scenarios: &[Scenario], width: usize) -> String {
    let rows: Vec<ScenarioRow> = scenarios.iter().map(ScenarioRow::from).collect();
    fit(blank_table(rows), width)
}

fn blank_table<T>(rows: Vec<T>) -> Table
where
    T: Tabled,
{
    let mut table = Table::new(rows);
    table
        .with(Style::blank())
        .with(Modify::new(Segment::all()).with(Alignment::left()));
    table
}

fn fit(mut table: Table, width: usize) -> String {
    table
        .with(Width::truncate(width))
        .with(Width::increase(width));
    table.to_string()
}

impl From<&SuiteReport> for Table {
    fn from(report: &SuiteReport) -> Self {
        let rows: Vec<ResultRow> = report.outcomes.iter().map(ResultRow::from).collect();
        blank_table(rows)
    }
}

#[derive(Tabled, Clone)]
struct ScenarioRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "IMAGE")]
    image: String,
    #[tabled(rename = "SECRETS")]
    secrets: String,
    #[tabled(rename = "EXPECTED")]
    expected: String,
}

impl From<&Scenario> for ScenarioRow {
    fn from(scenario: &Scenario) -> Self {
        Self {
            index: scenario.index,
            name: scenario.name.clone(),
            image: scenario.source_image.to_string(),
            secrets: scenario.flags.to_string(),
            expected: scenario.expected.to_string(),
        }
    }
}

#[derive(Tabled, Default, Clone)]
struct ResultRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "IMAGE")]
    image: String,
    #[tabled(rename = "SECRETS")]
    secrets: String,
    #[tabled(rename = "EXPECTED")]
    expected: String,
    #[tabled(rename = "RESULT")]
    result: String,
    #[tabled(rename = "TIME")]
    duration: String,
    #[tabled(rename = "ERROR")]
    #[tabled(display_with = "display_option")]
    error: Option<String>,
}

fn display_option(o: &Option<String>) -> String {
    o.clone().unwrap_or_default()
}

impl From<&ScenarioOutcome> for ResultRow {
    fn from(outcome: &ScenarioOutcome) -> Self {
        Self {
            name: outcome.name.clone(),
            image: outcome.source_image.to_string(),
            secrets: outcome.flags.to_string(),
            expected: outcome.expected.to_string(),
            result: match (outcome.passed, outcome.failure) {
                (true, _) => "passed".to_string(),
                (false, Some(kind)) => format!("failed ({})", kind),
                (false, None) => "failed".to_string(),
            },
            duration: format!("{:.1}s", outcome.duration_secs),
            error: outcome.error.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scenario::scenario_table;

    fn report() -> SuiteReport {
        let table = scenario_table();
        SuiteReport::new(vec![
            ScenarioOutcome::passed(&table[0], Duration::from_secs(3)),
            ScenarioOutcome::failed(
                &table[5],
                Duration::from_millis(1500),
                FailureKind::Timeout,
                "Timed out".to_string(),
            ),
        ])
    }

    #[test]
    fn counts() {
        let report = report();
        assert_eq!(report.num_passed(), 1);
        assert_eq!(report.num_failed(), 1);
        assert!(!report.all_passed());
        assert!(SuiteReport::default().all_passed());
        assert_eq!(
            report.get("RequiredParamsAllMissing").unwrap().failure,
            Some(FailureKind::Timeout)
        );
    }

    #[test]
    fn table() {
        let table = report().to_string(200);
        assert!(table.contains("NAME"));
        assert!(table.contains("OptionalParamsAllMissing"));
        assert!(table.contains("failed (Timeout)"));
        assert!(table.contains("1.5s"));
    }

    #[test]
    fn scenario_list_has_one_row_per_scenario() {
        let list = scenario_list(&scenario_table(), 200);
        let lines: Vec<&str> = list.lines().collect();
        assert_eq!(lines.len(), 11);
        assert!(lines[0].contains("EXPECTED"));
        assert!(lines[1].contains("OptionalParamsAllMissing"));
        assert!(lines[10].contains("RequiredParamsAllPresent"));
        assert!(lines[10].contains("+parameters +snitch +pagerduty"));
    }

    #[test]
    fn json() {
        let json = serde_json::to_value(&report()).unwrap();
        let outcomes = json["outcomes"].as_array().unwrap();
        assert_eq!(outcomes[0]["name"], "OptionalParamsAllMissing");
        assert_eq!(outcomes[0]["sourceImage"], "OptionalParams");
        assert_eq!(outcomes[0]["flags"]["snitchSecretPresent"], false);
        assert!(outcomes[0].get("error").is_none());
        assert_eq!(outcomes[1]["failure"], "Timeout");
        assert_eq!(outcomes[1]["expected"], "Invalid");
    }
}
