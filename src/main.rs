//! Build Args CLI
//!
//! Entry point for the `build-args` command-line tool.

use build_args::driver::{self, BuildInputs, DriverError};
use build_args::help::BUILD_ARGS_HELP;
use build_args::listing::format_listing;
use build_args::{Args, ValueWithOverrideMap};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "build-args")]
#[command(about = "Resolve and verify build arguments", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every declared build argument with its current value
    List {
        #[command(flatten)]
        inputs: InputOptions,

        /// Print only `name = value` lines
        #[arg(long)]
        short: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Only show this argument
        name: Option<String>,
    },

    /// Verify there are no duplicate declarations or unused overrides
    Check {
        #[command(flatten)]
        inputs: InputOptions,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Explain how build arguments are set and used
    Overview,
}

#[derive(clap::Args)]
struct InputOptions {
    /// Path to the build manifest
    #[arg(long, short = 'm', default_value = "build.toml")]
    manifest: PathBuf,

    /// Path to an args file with overrides for this build
    #[arg(long)]
    args_file: Option<PathBuf>,

    /// Override a build argument (name=value, repeatable)
    #[arg(long = "arg", value_name = "NAME=VALUE")]
    assignments: Vec<String>,
}

fn main() {
    install_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::List {
            inputs,
            short,
            json,
            name,
        } => run_list(&inputs, short, json, name.as_deref()),
        Commands::Check { inputs, json } => run_check(&inputs, json),
        Commands::Overview => print!("{}", BUILD_ARGS_HELP),
    }
}

fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load all inputs and evaluate every toolchain.
fn load_and_evaluate(options: &InputOptions) -> Result<Args, DriverError> {
    let inputs = BuildInputs::load(
        &options.manifest,
        options.args_file.as_deref(),
        &options.assignments,
    )?;
    let args = driver::prepare(Args::for_native_host()?, &inputs);
    driver::evaluate(&args, &inputs.manifest)?;
    Ok(args)
}

fn run_list(options: &InputOptions, short: bool, json: bool, name: Option<&str>) {
    let args = match load_and_evaluate(options) {
        Ok(args) => args,
        Err(e) => exit_with_error(&e, json),
    };

    let mut arguments = args.get_all_arguments();
    if let Some(name) = name {
        arguments.retain(|arg_name, _| arg_name == name);
        if arguments.is_empty() {
            eprintln!("Build argument '{}' is not declared in any toolchain.", name);
            process::exit(1);
        }
    }

    if json {
        print_json(&arguments);
    } else {
        print!("{}", format_listing(&arguments, short));
    }
}

fn run_check(options: &InputOptions, json: bool) {
    let args = match load_and_evaluate(options) {
        Ok(args) => args,
        Err(e) => exit_with_error(&e, json),
    };

    if let Err(e) = args.verify_all_overrides_used() {
        exit_with_error(&DriverError::Args(e), json);
    }

    let declared = args.get_all_arguments().len();
    if json {
        println!(
            "{}",
            serde_json::json!({ "ok": true, "declared": declared, "toolchains": args.toolchains() })
        );
    } else {
        println!(
            "Build arguments OK: {} declared across {} toolchain(s).",
            declared,
            args.toolchains().len()
        );
    }
}

fn print_json(arguments: &ValueWithOverrideMap) {
    match serde_json::to_string_pretty(arguments) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn exit_with_error(error: &DriverError, json: bool) -> ! {
    match error {
        DriverError::Args(e) if json => println!("{}", e.to_json()),
        DriverError::Args(e) => eprint!("{}", e.report()),
        DriverError::Config(e) if json => {
            println!("{}", serde_json::json!({ "code": "CONFIG_ERROR", "message": e.to_string() }))
        }
        DriverError::Config(e) => eprintln!("Configuration error: {}", e),
    }
    process::exit(1);
}
