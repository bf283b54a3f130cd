mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};
use microcore_core::kernel::constants::APP_VERSION;
use microcore_core::{Catalog, Kernel, KernelConfig, PluginArgs};

/// microcore: boots tools and domain plugins, then runs or inspects them
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Kernel configuration file (.json, .toml, .yaml)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Boot, optionally invoke one plugin, then shut down
    Run {
        /// Plugin to invoke once the kernel is ready
        #[arg(long)]
        plugin: Option<String>,
        /// Arguments for the plugin, as a JSON object
        #[arg(long, requires = "plugin")]
        args: Option<String>,
    },
    /// Boot and print the registry snapshot as JSON
    Dump,
    /// Boot and describe every tool
    Tools,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init();
}

/// Every unit this binary ships with, in boot order.
fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    microcore_core::tools::register_builtin(&mut catalog);
    core_health::register(&mut catalog);
    core_diagnostics::register(&mut catalog);
    catalog
}

fn load_config(path: Option<&PathBuf>) -> Result<KernelConfig, String> {
    match path {
        Some(path) => KernelConfig::load(path)
            .map_err(|e| format!("Failed to load configuration from {}: {}", path.display(), e)),
        None => Ok(KernelConfig::default()),
    }
}

fn parse_args(raw: Option<&str>) -> Result<PluginArgs, String> {
    let Some(raw) = raw else {
        return Ok(PluginArgs::new());
    };
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("Invalid --args JSON: {}", e))?;
    PluginArgs::from_value(value).map_err(|e| format!("Invalid --args: {}", e))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };
    let plugin_call = match &args.command {
        Commands::Run {
            plugin: Some(plugin),
            args: raw,
        } => match parse_args(raw.as_deref()) {
            Ok(plugin_args) => Some((plugin.clone(), plugin_args)),
            Err(message) => {
                eprintln!("{}", message);
                return ExitCode::FAILURE;
            }
        },
        _ => None,
    };

    info!("microcore v{} starting", APP_VERSION);
    let kernel = Kernel::new(config, catalog());
    let report = match kernel.boot().await {
        Ok(report) => report,
        Err(e) => {
            error!("Boot failed: {}", e);
            eprintln!("Boot failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match args.command {
        Commands::Run { .. } => {
            if let Some((plugin, plugin_args)) = plugin_call {
                cli::wait_until_settled(kernel.registry(), &plugin).await;
                let response = kernel.run_plugin(&plugin, plugin_args).await;
                cli::print_response(&response);
            }
            cli::print_boot_summary(&report);
        }
        Commands::Dump => cli::print_dump(&kernel.registry().get_system_dump()),
        Commands::Tools => cli::print_tools(kernel.container()),
    }

    match kernel.shutdown().await {
        Ok(shutdown) => {
            for (name, failure) in &shutdown.tool_failures {
                eprintln!("Tool '{}' did not shut down cleanly: {}", name, failure);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Shutdown failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
