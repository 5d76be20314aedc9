use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use screenboard_lib::api::{self, DashboardState};
use screenboard_lib::services::report::{write_dashboard, write_sweep, ReportOptions};
use screenboard_lib::services::{AppConfig, ConfigStore, Preset};

#[derive(Parser, Debug)]
#[command(name = "screenboard", version, about = "Explore supplier-screening threshold trade-offs")]
struct Cli {
    /// Directory holding config.json (defaults to the platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Exhibit dataset JSON replacing the built-in tables
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the dashboard for one threshold
    Show(ShowArgs),
    /// Tabulate metrics across every slider position
    Sweep {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// List the quick-select presets
    Presets,
    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing config (the old one is backed up)
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args, Debug, Default)]
struct ShowArgs {
    /// Threshold between the supported bounds, snapped to the slider step
    #[arg(long, conflicts_with = "preset")]
    threshold: Option<f64>,

    /// Quick-select: cfo, balanced or cso
    #[arg(long)]
    preset: Option<String>,

    /// Reference threshold for metric deltas
    #[arg(long)]
    reference: Option<f64>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Append the case discussion questions
    #[arg(long)]
    questions: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Format {
    #[default]
    Text,
    Json,
}

fn config_store(cli: &Cli) -> Result<ConfigStore> {
    let dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => ConfigStore::default_config_dir().ok_or_else(|| anyhow!("no config directory available"))?,
    };
    Ok(ConfigStore::new(dir))
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let store = config_store(cli)?;
    let mut config = store.load().map_err(|e| anyhow!(e)).context("loading config")?;
    if let Some(path) = &cli.dataset {
        config.dataset_path = Some(path.clone());
    }
    Ok(config)
}

fn show(state: &DashboardState, args: &ShowArgs) -> Result<()> {
    let mut selector = state.selector();
    if let Some(name) = &args.preset {
        let preset = Preset::from_str(name).ok_or_else(|| anyhow!("unknown preset: {}", name))?;
        selector.select_preset(preset);
    } else if let Some(value) = args.threshold {
        if !state.engine().supported_range().contains(value) {
            return Err(anyhow!(
                "threshold {} is outside the supported range [{:.2}, {:.2}]",
                value,
                state.config().supported_range.min,
                state.config().supported_range.max
            ));
        }
        selector.slide_to(value);
    }

    let threshold = selector.current();
    let reference = args.reference.unwrap_or(state.config().reference_threshold);
    info!(threshold, reference, "dashboard.show");

    let view = state
        .dashboard_with_reference(threshold, reference)
        .map_err(|e| anyhow!(e))?;

    match args.format {
        Format::Text => {
            let mut text = String::new();
            write_dashboard(&mut text, &view, ReportOptions { questions: args.questions })?;
            print!("{}", text);
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&view)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    screenboard_lib::init_logging();
    let cli = Cli::parse();

    if let Some(Command::InitConfig { force }) = &cli.command {
        let store = config_store(&cli)?;
        if store.config_file().exists() && !force {
            return Err(anyhow!(
                "{} already exists; pass --force to overwrite",
                store.config_file().display()
            ));
        }
        store.save(&AppConfig::default()).map_err(|e| anyhow!(e))?;
        if let Some(path) = &cli.dataset {
            store.set_dataset_path(Some(path.clone())).map_err(|e| anyhow!(e))?;
        }
        println!("Wrote {}", store.config_file().display());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let state = DashboardState::from_app_config(&config)
        .map_err(|e| anyhow!(e))
        .context("building dashboard state")?;
    info!(startup_ms = screenboard_lib::startup_elapsed_ms(), "dashboard.ready");

    match cli.command {
        None => show(&state, &ShowArgs::default()),
        Some(Command::Show(ref args)) => show(&state, args),
        Some(Command::Sweep { format }) => {
            let rows = api::sweep_thresholds(&state);
            match format {
                Format::Text => {
                    let mut text = String::new();
                    write_sweep(&mut text, &rows)?;
                    print!("{}", text);
                }
                Format::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            }
            Ok(())
        }
        Some(Command::Presets) => {
            for preset in api::list_presets(&state) {
                let key = format!("{:?}", preset.preset).to_lowercase();
                println!("{:<10} {:.2}  {}  - {}", key, preset.threshold, preset.label, preset.help);
            }
            Ok(())
        }
        Some(Command::InitConfig { .. }) => Ok(()),
    }
}
