#![forbid(unsafe_code)]

mod cmd;
mod output;
mod state;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "vitals: site performance monitoring and insights",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from the `--json` flag, `FORMAT` and user config.
    fn output_mode(&self) -> OutputMode {
        let user = vitals_core::config::load_user_config().unwrap_or_else(|err| {
            warn!(%err, "ignoring unreadable user config");
            vitals_core::config::UserConfig::default()
        });
        OutputMode::from_name(&vitals_core::config::resolve_output(self.json, &user))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Monitoring",
        about = "Analyse one period of audits",
        long_about = "Diff a period of audits against the previous one, detect environment changes and generate insights.",
        after_help = "EXAMPLES:\n    # Run a period from exported audits and the site inventory\n    vitals run --audits audits.json --environment env.json\n\n    # Pin the period timestamp\n    vitals run --audits audits.json --environment env.json --now 2024-09-01T04:00:00Z"
    )]
    Run(cmd::run::RunArgs),

    #[command(
        next_help_heading = "Insights",
        about = "Mute an insight category for seven days",
        long_about = "Mute an insight category for seven days. An active mute is left as is; an expired one starts a new seven-day window. There is no unmute.",
        after_help = "EXAMPLES:\n    # Silence score trend insights for a week\n    vitals mute score_trend"
    )]
    Mute(cmd::mute::MuteArgs),

    #[command(
        next_help_heading = "Insights",
        about = "List active mutes",
        after_help = "EXAMPLES:\n    # Show muted categories and their expiry\n    vitals mutes\n\n    # Emit machine-readable output\n    vitals mutes --json"
    )]
    Mutes(cmd::mutes::MutesArgs),

    #[command(
        next_help_heading = "Insights",
        about = "List insight categories in priority order",
        after_help = "EXAMPLES:\n    # Show the palette\n    vitals palette"
    )]
    Palette(cmd::palette::PaletteArgs),

    #[command(
        next_help_heading = "Monitoring",
        about = "Show past period reports",
        after_help = "EXAMPLES:\n    # Last ten periods\n    vitals history\n\n    # Second page of five\n    vitals history --limit 5 --offset 5"
    )]
    History(cmd::history::HistoryArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Install bash completions\n    vitals completions bash > ~/.local/share/bash-completion/completions/vitals"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

/// Filter used when `VITALS_LOG` is unset.
const fn default_filter(verbose: bool, debug_env: bool) -> &'static str {
    if verbose || debug_env {
        "vitals=debug,info"
    } else {
        "vitals=info,warn"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("VITALS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(default_filter(verbose, env::var("DEBUG").is_ok()))
    });

    let format = env::var("VITALS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = std::env::current_dir()?;
    let output = cli.output_mode();

    if cli.verbose {
        debug!(json = output.is_json(), "verbose logging enabled");
    }

    match cli.command {
        Commands::Run(ref args) => cmd::run::run_run(args, output, cli.quiet, &project_root),
        Commands::Mute(ref args) => cmd::mute::run_mute(args, output, &project_root),
        Commands::Mutes(ref args) => cmd::mutes::run_mutes(args, output, &project_root),
        Commands::Palette(ref args) => cmd::palette::run_palette(args, output),
        Commands::History(ref args) => cmd::history::run_history(args, output, &project_root),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
