use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use savings::api::{
    CliInflationExponent, CompareArgs, ScenarioArgs, build_comparison_inputs,
    build_scenario_input, run_http_server,
};
use savings::core::{ProjectionOptions, compare, project_with};
use savings::report::{Currency, render_comparison, render_projection};

#[derive(Parser, Debug)]
#[command(
    name = "savings",
    about = "Compound-interest savings calculator with scenario comparison"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project one scenario year by year
    Project {
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[arg(
            long,
            value_enum,
            default_value_t = CliInflationExponent::InputYears,
            help = "Exponent for the final inflation-adjusted balance"
        )]
        inflation_exponent: CliInflationExponent,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Compare two scenarios and pick the one that ends with more
    Compare {
        #[command(flatten)]
        scenarios: CompareArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long, env = "SAVINGS_PORT", default_value_t = 8080)]
        port: u16,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    #[arg(
        long,
        env = "SAVINGS_CURRENCY",
        default_value = "ARS",
        help = "Display currency: USD, EUR, ARS, MXN, CLP, COP or BRL"
    )]
    currency: Currency,
    #[arg(long, help = "Print the raw result as JSON")]
    json: bool,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Project {
            scenario,
            inflation_exponent,
            output,
        } => {
            let input = build_scenario_input(&scenario)?;
            let options = ProjectionOptions {
                inflation_exponent: inflation_exponent.into(),
            };
            let result = project_with(&input, options);
            debug!(
                "projected {} months: final balance {:.2}",
                result.horizon_months, result.final_balance
            );

            let mut stdout = io::stdout().lock();
            if output.json {
                serde_json::to_writer_pretty(&mut stdout, &result)
                    .context("failed to serialize projection")?;
                writeln!(stdout)?;
            } else {
                render_projection(&mut stdout, &result, output.currency)?;
            }
        }
        Command::Compare { scenarios, output } => {
            let (a, b) = build_comparison_inputs(&scenarios)?;
            let result = compare(&a, &b);
            debug!(
                "compared scenarios: difference {:.2}, winner {:?}",
                result.balance_difference, result.winner
            );

            let mut stdout = io::stdout().lock();
            if output.json {
                serde_json::to_writer_pretty(&mut stdout, &result)
                    .context("failed to serialize comparison")?;
                writeln!(stdout)?;
            } else {
                render_comparison(&mut stdout, &result, output.currency)?;
            }
        }
        Command::Serve { port } => {
            run_http_server(port)
                .await
                .with_context(|| format!("HTTP server on port {port} failed"))?;
        }
    }
    Ok(())
}
