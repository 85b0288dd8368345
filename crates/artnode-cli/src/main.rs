use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use artnode_core::{ArtNode, ReplayReport, StaticDeviceRegistry};
use clap::{Parser, Subcommand};
use glob::glob;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod serve;
mod setup;

use serve::ServeOptions;
use setup::NodeSetup;

#[derive(Parser, Debug)]
#[command(name = "artnode")]
#[command(version)]
#[command(
    about = "Art-Net 4 node: answers discovery, addressing, IP programming and RDM table requests.",
    long_about = None,
    after_help = "Examples:\n  artnode serve --config node.json\n  artnode replay capture.pcapng -o report.json\n  artnode config init -o node.json"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the node on a UDP socket.
    Serve {
        /// Node setup file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Bind address (defaults to 0.0.0.0 on the configured UDP port)
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Record received datagrams into a pcapng file
        #[arg(long)]
        record: Option<PathBuf>,

        /// Stop after this many datagrams
        #[arg(long)]
        max_datagrams: Option<u64>,
    },
    /// Replay a capture through a node and write a JSON report.
    #[command(alias = "analyse")]
    #[command(
        after_help = "Examples:\n  artnode replay capture.pcapng -o report.json\n  artnode replay 'captures/show-*.pcapng' --stdout --pretty"
    )]
    Replay {
        /// Path to a .pcap or .pcapng file (a glob must match exactly one file)
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Node setup file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if any datagram failed to decode
        #[arg(long)]
        strict: bool,

        /// List decode failures after the replay
        #[arg(long)]
        list_failures: bool,
    },
    /// Create or validate node setup files.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write an example node setup file.
    Init {
        /// Output path
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        output: Option<PathBuf>,

        /// Write to stdout
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Load a node setup file and print the resulting node.
    Check {
        /// Node setup file (JSON)
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled: {err}");
    }

    let result = match cli.command {
        Commands::Serve {
            config,
            bind,
            record,
            max_datagrams,
        } => cmd_serve(
            config,
            ServeOptions {
                bind,
                record,
                max_datagrams,
            },
        ),
        Commands::Replay {
            input,
            report,
            stdout,
            config,
            pretty,
            compact,
            quiet,
            strict,
            list_failures,
        } => cmd_replay(ReplayArgs {
            input,
            report,
            stdout,
            config,
            pretty,
            compact,
            quiet,
            strict,
            list_failures,
        }),
        Commands::Config { command } => match command {
            ConfigCommands::Init {
                output,
                stdout,
                force,
            } => cmd_config_init(output, stdout, force),
            ConfigCommands::Check { file } => cmd_config_check(&file),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        // Keep the context chain: "Invalid node setup: x.json: missing field".
        CliError::new(format!("{err:#}"), None)
    }
}

fn load_setup(path: Option<&Path>) -> Result<NodeSetup, CliError> {
    match path {
        None => Ok(NodeSetup::default()),
        Some(path) if !path.exists() => Err(CliError::new(
            format!("node setup not found: {}", path.display()),
            Some("create one with `artnode config init -o node.json`".to_string()),
        )),
        Some(path) => NodeSetup::load(path).map_err(|err| {
            CliError::new(
                format!("{err:#}"),
                Some("run `artnode config check` on the file for details".to_string()),
            )
        }),
    }
}

fn cmd_serve(config: Option<PathBuf>, options: ServeOptions) -> Result<(), CliError> {
    let setup = load_setup(config.as_deref())?;
    serve::run(&setup, options)?;
    Ok(())
}

struct ReplayArgs {
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    config: Option<PathBuf>,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    list_failures: bool,
}

fn cmd_replay(args: ReplayArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
    let report_path = if args.stdout {
        None
    } else {
        Some(args.report.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };
    if let Some(report_path) = report_path.as_ref() {
        ensure_distinct_output(report_path, &input_abs)?;
    }

    let setup = load_setup(args.config.as_deref())?;
    let config = setup.to_config()?;
    let registry = StaticDeviceRegistry::new(setup.devices.clone());
    let mut node =
        ArtNode::with_registry(config, registry).with_sequence_policy(setup.sequence_policy);
    let rep = artnode_core::replay_pcap_file(&resolved_input, &mut node)
        .context("PCAP/PCAPNG replay failed")?;
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    match report_path {
        None => print!("{}", json),
        Some(report_path) => {
            if let Some(parent) = report_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report_path, json)
                .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
            if !args.quiet {
                eprintln!("OK: report written -> {}", report_path.display());
            }
        }
    }

    if args.list_failures && !args.quiet {
        print_failures(&rep);
    }
    if args.strict && !rep.failures.is_empty() {
        return Err(CliError::new(
            "decode failures detected",
            Some("use --list-failures to inspect".to_string()),
        ));
    }
    Ok(())
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let report_dir = match report_path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => return Ok(()),
    };
    // A directory that does not exist yet cannot hold the input file.
    if !report_dir.exists() {
        return Ok(());
    }
    let report_dir = fs::canonicalize(&report_dir)
        .with_context(|| format!("Failed to resolve output path: {}", report_path.display()))?;
    let report_target = report_dir.join(
        report_path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?,
    );
    if report_target == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn serialize_report(rep: &ReplayReport, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_failures(rep: &ReplayReport) {
    eprintln!("Decode failures:");
    for failure in &rep.failures {
        eprintln!("  {} ({})", failure.id, failure.count);
        for example in &failure.examples {
            eprintln!("    {}", example);
        }
    }
}

fn cmd_config_init(output: Option<PathBuf>, stdout: bool, force: bool) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(&NodeSetup::example())
        .context("JSON serialization failed")?;
    if stdout {
        println!("{}", json);
        return Ok(());
    }
    let output = output.ok_or_else(|| {
        CliError::new(
            "missing output path",
            Some("use -o/--output or --stdout".to_string()),
        )
    })?;
    if output.exists() && !force {
        return Err(CliError::new(
            format!("refusing to overwrite {}", output.display()),
            Some("pass --force to replace it".to_string()),
        ));
    }
    fs::write(&output, format!("{json}\n"))
        .with_context(|| format!("Failed to write node setup: {}", output.display()))?;
    eprintln!("OK: node setup written -> {}", output.display());
    Ok(())
}

fn cmd_config_check(file: &Path) -> Result<(), CliError> {
    let setup = load_setup(Some(file))?;
    let config = setup.to_config()?;
    println!(
        "OK: {} ({}) at {}:{} mask {}, net {} subnet {}, {} port(s), {} device(s)",
        config.short_name(),
        setup::format_mac(&config.mac()),
        config.ip(),
        config.udp_port(),
        config.mask(),
        config.net(),
        config.subnet(),
        config.port_count(),
        setup.devices.len()
    );
    for (index, port) in config.ports().iter().enumerate() {
        let universe = |address: Option<artnode_core::PortAddress>| {
            address.map(|a| a.to_string()).unwrap_or_default()
        };
        println!(
            "  port {}: type {:#04x}, input {}, output {}",
            index,
            port.kind.to_byte(),
            universe(config.input_port_address(index as u8)),
            universe(config.output_port_address(index as u8))
        );
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}",
                    pattern, count, listed
                ),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
