use crate::CLAP_STYLING;
use clap::{arg, command};
use scamshield_core::config::DEFAULT_CONFIG_PATH;

/// Options shared by every subcommand that runs scans.
fn with_scan_options(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-c --"config" <PATH>)
            .required(false)
            .help(format!(
                "Path to a JSON configuration file (default: {})",
                DEFAULT_CONFIG_PATH
            )),
    )
    .arg(
        arg!(-t --"timeout" <SECONDS>)
            .required(false)
            .help("Per-collector timeout in seconds")
            .value_parser(clap::value_parser!(u64)),
    )
    .arg(
        arg!(--"offline")
            .required(false)
            .help("Skip every external lookup and score with local heuristics only")
            .action(clap::ArgAction::SetTrue),
    )
    .arg(
        arg!(--"reputation-key" <KEY>)
            .required(false)
            .help("API key for the engine-vote reputation lookup")
            .env("SCAMSHIELD_REPUTATION_KEY")
            .hide_env_values(true),
    )
    .arg(
        arg!(--"registration-key" <KEY>)
            .required(false)
            .help("API key for the domain registration lookup")
            .env("SCAMSHIELD_REGISTRATION_KEY")
            .hide_env_values(true),
    )
    .arg(
        arg!(--"geolocation-key" <KEY>)
            .required(false)
            .help("API key for the IP geolocation lookup")
            .env("SCAMSHIELD_GEOLOCATION_KEY")
            .hide_env_values(true),
    )
    .arg(
        arg!(--"policy-key" <KEY>)
            .required(false)
            .help("API key for the Safe Browsing policy lookup")
            .env("SCAMSHIELD_POLICY_KEY")
            .hide_env_values(true),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("scamshield")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("scamshield")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Enable debug logging on stderr").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Writes the default ScamShield configuration file")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Where to write the configuration file")
                        .default_value(DEFAULT_CONFIG_PATH),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Overwrite an existing configuration file without asking")
                        .required(false),
                ),
        )
        .subcommand(with_scan_options(
            command!("scan")
                .about(
                    "Scan decoded QR content or a URL and print a risk report. Content that \
                is not a URL is checked for scam wording.",
                )
                .arg(
                    arg!([INPUT])
                        .required(false)
                        .help("The scanned content: a URL or free text")
                        .conflicts_with("inputs-file"),
                )
                .arg(
                    arg!(-H --"inputs-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of inputs to scan")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("INPUT"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown", "md"])
                        .default_value("text"),
                ),
        ))
        .subcommand(with_scan_options(
            command!("interactive")
                .about(
                    "Read scanned content from stdin, one item per line. Entering a new line \
                while a scan is running restarts with the new input.",
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown", "md"])
                        .default_value("text"),
                ),
        ))
}
