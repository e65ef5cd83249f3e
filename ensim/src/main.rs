use ensim::{CsvSink, Scenario, ScenarioConfig};
use ensim::{bench_accelerator, bench_initialization, bench_propagation};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Propagate particle ensembles through force fields")]
struct Args {
    /// Scenario file, looked up under `scenarios/`
    #[arg(short, default_value = "falling_cloud.yaml")]
    file_name: String,

    /// Output directory, overrides the one in the scenario
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run a benchmark instead of a scenario
    #[arg(long, value_enum)]
    bench: Option<Bench>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Bench {
    Initialization,
    Accelerator,
    Propagation,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Some(bench) = args.bench {
        match bench {
            Bench::Initialization => bench_initialization(),
            Bench::Accelerator => bench_accelerator(),
            Bench::Propagation => bench_propagation(),
        }
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let Scenario { simulation, output } = Scenario::build(scenario_cfg)?;

    let output = args.output.or(output);
    let mut simulation = match &output {
        Some(dir) => simulation.with_sink(CsvSink::new(dir)),
        None => simulation,
    };

    let summary = simulation.run()?;
    info!(
        "finished at t = {} after {} of {} steps, {} of {} particles active",
        summary.final_time,
        summary.steps_taken,
        summary.steps_planned,
        summary.active_population,
        summary.population
    );

    if let Some(dir) = &output {
        for report in &summary.reports {
            let path = dir.join(format!("{}.json", report.name));
            let text = serde_json::to_string_pretty(&report.body)?;
            fs::write(&path, text)
                .with_context(|| format!("failed to write report {}", path.display()))?;
            info!("wrote {} report to {}", report.name, path.display());
        }
    }

    Ok(())
}
