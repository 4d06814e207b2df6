use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use scamshield_core::config::{ApiCredentials, DEFAULT_CONFIG_PATH};
use scamshield_core::report::{render, save_report};
use scamshield_core::{
    ReportFormat, RiskLevel, ScanConfig, ScanPipeline, ScanSession, ScanTicket, SecurityReport,
    SessionError,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// Helper functions for scan handler

/// Load inputs from either a file or a single positional argument
pub fn load_inputs_from_source(
    input: Option<&String>,
    inputs_file: Option<&PathBuf>,
) -> Result<Vec<String>> {
    if let Some(path) = inputs_file {
        load_inputs_from_file(path)
    } else if let Some(input) = input {
        Ok(vec![input.clone()])
    } else {
        bail!("Either an INPUT or --inputs-file must be provided")
    }
}

/// Load inputs from a file, one per line
pub fn load_inputs_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read inputs file {}", path.display()))?;

    let inputs: Vec<String> = content.lines().filter_map(parse_input_line).collect();

    if inputs.is_empty() {
        bail!("No inputs found in {}", path.display());
    }

    Ok(inputs)
}

/// A trimmed input line, or `None` for blanks and `#` comments
pub fn parse_input_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.to_string())
}

/// Loads `path` if given, otherwise the default config file when it exists.
pub fn resolve_config(path: Option<&str>) -> Result<ScanConfig> {
    match path {
        Some(path) => {
            let expanded = shellexpand::tilde(path);
            ScanConfig::load(Path::new(expanded.as_ref()))
                .with_context(|| format!("Could not load config {}", path))
        }
        None => {
            let expanded = shellexpand::tilde(DEFAULT_CONFIG_PATH);
            let default_path = Path::new(expanded.as_ref());
            if default_path.exists() {
                debug!("Using config {}", default_path.display());
                ScanConfig::load(default_path)
                    .with_context(|| format!("Could not load config {}", default_path.display()))
            } else {
                debug!("No config file found, using built-in defaults");
                Ok(ScanConfig::default())
            }
        }
    }
}

/// Applies command-line and environment settings on top of a loaded config.
pub fn apply_overrides(
    config: &mut ScanConfig,
    credentials: ApiCredentials,
    timeout_secs: Option<u64>,
    offline: bool,
) {
    config.credentials.overlay(credentials);
    if let Some(timeout_secs) = timeout_secs {
        config.collector_timeout_secs = timeout_secs;
    }
    if offline {
        config.offline = true;
    }
}

fn build_config(args: &ArgMatches) -> Result<ScanConfig> {
    let mut config = resolve_config(args.get_one::<String>("config").map(String::as_str))?;

    let key = |name: &str| args.get_one::<String>(name).cloned();
    let credentials = ApiCredentials {
        reputation: key("reputation-key"),
        registration: key("registration-key"),
        geolocation: key("geolocation-key"),
        policy_match: key("policy-key"),
    };

    apply_overrides(
        &mut config,
        credentials,
        args.get_one::<u64>("timeout").copied(),
        args.get_flag("offline"),
    );
    Ok(config)
}

fn report_format(args: &ArgMatches) -> Result<ReportFormat> {
    let name = args
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    ReportFormat::from_str(name).with_context(|| format!("Unknown report format '{}'", name))
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> Result<String> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().to_lowercase())
}

fn print_verdict(report: &SecurityReport) {
    let label = format!(
        "{} RISK {}/100",
        report.risk_level.as_str().to_uppercase(),
        report.risk_score
    );
    let label = match report.risk_level {
        RiskLevel::Safe => label.green().bold(),
        RiskLevel::Low => label.bright_green(),
        RiskLevel::Medium => label.yellow().bold(),
        RiskLevel::High => label.red().bold(),
        RiskLevel::Critical => label.bright_red().bold().underline(),
    };
    println!("{} {}", label, report.subject.bright_white());
    if report.degraded {
        println!(
            "  {} {}",
            "⚠".yellow(),
            "No threat-intelligence source answered; score is from local heuristics only".yellow()
        );
    }
}

fn scan_spinner(subject: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Scanning {}", subject));
    Ok(spinner)
}

/// Writes the built-in configuration as pretty JSON, creating parent directories.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = ScanConfig::default().to_json()?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    print_divider();
    println!("{}", "  SCAMSHIELD INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let raw_path = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_PATH);
    let force = args.get_flag("force");
    let expanded = shellexpand::tilde(raw_path);
    let config_path = Path::new(expanded.as_ref());

    println!(
        "{} Target: {}",
        "→".blue(),
        config_path.display().to_string().bright_white()
    );
    println!();

    if config_path.exists() && !force {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("A configuration file already exists at:");
        println!(
            "  {} {}",
            "•".yellow(),
            config_path.display().to_string().bright_white()
        );
        println!();

        let response = print_prompt("Overwrite it with the defaults? [y/N]:")?;
        println!();

        if response != "y" && response != "yes" {
            println!("{} Initialization cancelled.", "✗".red().bold());
            return Ok(());
        }
        println!("{} Proceeding with overwrite", "→".yellow().bold());
    }

    write_default_config(config_path)?;

    println!();
    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!();
    println!(
        "{} Config: {}",
        "✓".green().bold(),
        config_path.display().to_string().bright_white()
    );
    println!(
        "{} Add your API keys under {} or pass them with the {} variables",
        "ℹ".blue(),
        "\"credentials\"".cyan(),
        "SCAMSHIELD_*_KEY".cyan()
    );
    println!();
    Ok(())
}

pub async fn handle_scan(args: &ArgMatches, quiet: bool) -> Result<()> {
    let inputs = load_inputs_from_source(
        args.get_one::<String>("INPUT"),
        args.get_one::<PathBuf>("inputs-file"),
    )?;
    let format = report_format(args)?;
    let config = build_config(args)?;
    let session = ScanSession::new(ScanPipeline::from_config(&config)?);

    if !quiet && inputs.len() > 1 {
        println!("Scanning {} inputs\n", inputs.len());
    }

    let mut rendered = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let spinner = if quiet { None } else { Some(scan_spinner(input)?) };
        let report = session.scan(input).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        let report = report?;

        if !quiet {
            print_verdict(&report);
        }
        rendered.push(render(&report, format)?);
    }

    // Multiple JSON reports form a stream of objects, one after another
    let content = rendered.join("\n");

    match args.get_one::<PathBuf>("output") {
        Some(path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            let path = Path::new(&expanded);
            save_report(&content, path)
                .with_context(|| format!("Failed to save report to {}", path.display()))?;
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => {
            if !quiet {
                println!();
            }
            println!("{}", content);
        }
    }

    Ok(())
}

/// Claims the session for a new input, abandoning any scan still holding it.
/// Returns whether an earlier scan was abandoned.
pub fn take_over_session(session: &ScanSession) -> Result<(ScanTicket, bool)> {
    let restarted = session.is_busy();
    if restarted {
        session.reset();
    }
    let ticket = session
        .begin()
        .context("Could not start a scan after resetting the session")?;
    Ok((ticket, restarted))
}

pub async fn handle_interactive(args: &ArgMatches, quiet: bool) -> Result<()> {
    let format = report_format(args)?;
    let config = build_config(args)?;
    let session = ScanSession::new(ScanPipeline::from_config(&config)?);

    if !quiet {
        println!(
            "{} Paste scanned content, one item per line. {} or Ctrl-D to exit.",
            "→".blue(),
            "quit".cyan()
        );
        println!(
            "{} A new line while a scan is running restarts with the new input.\n",
            "ℹ".blue()
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let (tx, mut rx) = mpsc::unbounded_channel::<(String, Result<SecurityReport, SessionError>)>();
    let mut pending = 0usize;
    let mut stdin_open = true;

    while stdin_open || pending > 0 {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                let Some(input) = parse_input_line(&line) else {
                    continue;
                };
                if input == "quit" || input == "exit" {
                    stdin_open = false;
                    continue;
                }

                let (ticket, restarted) = take_over_session(&session)?;
                if restarted && !quiet {
                    println!("{} Restarting with new input", "↻".yellow());
                }

                let tx = tx.clone();
                pending += 1;
                tokio::spawn(async move {
                    let result = ticket.run(&input).await;
                    // Receiver only closes on exit
                    let _ = tx.send((input, result));
                });
            }
            Some((input, result)) = rx.recv(), if pending > 0 => {
                pending -= 1;
                match result {
                    Ok(report) => {
                        if !quiet {
                            print_verdict(&report);
                        }
                        println!("{}", render(&report, format)?);
                    }
                    Err(SessionError::Discarded) => {
                        debug!("Discarded result for {}", input);
                        if !quiet {
                            println!("{} Discarded earlier scan of {}", "•".dimmed(), input.dimmed());
                        }
                    }
                    Err(SessionError::Busy) => {
                        warn!("Scan of {} refused: session busy", input);
                        println!("{} A scan is already running, try again", "✗".red().bold());
                    }
                }
            }
        }
    }

    Ok(())
}
