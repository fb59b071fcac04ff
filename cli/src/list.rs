use anyhow::{Context, Result};
use clap::Parser;
use pkotest_model::{scenario_list, scenario_table};
use terminal_size::{Height, Width};

/// List the scenarios in the order `run` executes them.
#[derive(Debug, Parser)]
pub(crate) struct List {
    /// Output the scenarios in JSON format.
    #[clap(long = "json")]
    json: bool,
}

impl List {
    pub(crate) fn run(self) -> Result<()> {
        let scenarios = scenario_table();
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&scenarios)
                    .context("Could not create string from scenarios.")?
            );
        } else {
            let (terminal_size::Width(width), _) =
                terminal_size::terminal_size().unwrap_or((Width(120), Height(0)));
            println!("{}", scenario_list(&scenarios, width as usize));
        }
        Ok(())
    }
}
