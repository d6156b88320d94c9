use anyhow::{bail, Result};
use clap::Parser;
use std::path::Path;

// Import from docqc-core
use docqc_core::{ConfigProfile, DocumentChecker, QcConfig, StepProfiler};

// Import CLI utilities
use docqc_cli::config_locator::{ConfigLocator, ConfigSource};
use docqc_cli::{render_json, render_text};

#[derive(Parser)]
#[command(name = "docqc")]
#[command(about = "Check a .docx document against formatting, navigation and language rules")]
struct Args {
    /// Path to the .docx file to check
    input: String,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Built-in config profile: dev, prod or test
    #[arg(long, default_value = "dev")]
    profile_name: String,

    /// Evaluate rules in parallel (report order is unchanged)
    #[arg(long)]
    parallel: bool,

    /// Enable detailed profiling of load and rule steps
    #[arg(long)]
    profile: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,

    /// Verbose logging (debug level)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match run(&args) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ {e:#}");
            std::process::exit(1);
        }
    }
}

/// Returns whether every check passed
fn run(args: &Args) -> Result<bool> {
    let Some(profile) = ConfigProfile::parse(&args.profile_name) else {
        bail!("Unknown profile '{}' (expected dev, prod or test)", args.profile_name);
    };

    let mut config = load_config(args, profile)?;
    if args.parallel {
        config.parallel_rules = true;
    }

    if args.show_config {
        print!("{}", config.to_yaml()?);
        return Ok(true);
    }

    let input = Path::new(&args.input);
    if !input.is_file() {
        bail!("Input file not found: {}", args.input);
    }
    let is_docx = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
    if !is_docx {
        bail!("Only .docx files are supported: {}", args.input);
    }

    let checker = DocumentChecker::new(config)?;
    let mut profiler = StepProfiler::new(args.profile);

    if !args.json {
        println!("🔍 Checking: {}", args.input);
    }
    let report = checker.check_path_with_profiler(input, &mut profiler);

    let rendered = if args.json {
        render_json(&report)?
    } else {
        render_text(&report)
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            println!("💾 Report saved to: {path}");
        }
        None => println!("{rendered}"),
    }

    profiler.print_summary();

    Ok(report.all_passed())
}

fn load_config(args: &Args, profile: ConfigProfile) -> Result<QcConfig> {
    let (config, source) = ConfigLocator::new().load(args.config.as_deref(), profile)?;
    match source {
        ConfigSource::Explicit(path) | ConfigSource::User(path) => {
            log::info!("Loaded config from: {}", path.display())
        }
        ConfigSource::BuiltIn(profile) => log::info!("Using built-in {profile:?} config"),
    }
    Ok(config)
}
