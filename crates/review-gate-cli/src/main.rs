// crates/review-gate-cli/src/main.rs
// ============================================================================
// Module: Review Gate CLI Entry Point
// Description: Command dispatcher for pull-request review runs.
// Purpose: Wire settings, rules, and adapters into the review pipeline and
// map outcomes to CI exit codes.
// Dependencies: clap, review-gate-config, review-gate-core,
// review-gate-github, review-gate-llm, serde_json, thiserror, tokio,
// tracing-subscriber
// ============================================================================

//! ## Overview
//! The Review Gate CLI runs the review pipeline against one pull request and
//! exits with the gate verdict: 0 for pass, 1 for fail, 2 for a context
//! refusal, 3 for a pipeline error. Rule-catalog inspection and offline
//! report rendering are available as separate subcommands. Configuration is
//! resolved from the environment first; command-line flags override it.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::error::ErrorKind;
use review_gate_config::GateSettings;
use review_gate_config::load_rule_set;
use review_gate_config::read_limited_utf8;
use review_gate_config::settings::LLM_API_KEY_VAR;
use review_gate_core::Orchestrator;
use review_gate_core::OrchestratorConfig;
use review_gate_core::ReviewResult;
use review_gate_core::format_report;
use review_gate_github::GithubApiConfig;
use review_gate_github::GithubClient;
use review_gate_github::GithubDiffSource;
use review_gate_github::GithubPublisher;
use review_gate_llm::ChatAnalyzer;
use review_gate_llm::ChatAnalyzerConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a serialized review-result input.
const MAX_RESULT_BYTES: usize = 1024 * 1024;

/// Exit code for configuration and pipeline errors.
const EXIT_ERROR: u8 = 3;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "review-gate", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Review one pull request and exit with the gate verdict.
    Review(ReviewCommand),
    /// Rule catalog utilities.
    Rules {
        /// Selected rules subcommand.
        #[command(subcommand)]
        command: RulesCommand,
    },
    /// Report rendering utilities.
    Report {
        /// Selected report subcommand.
        #[command(subcommand)]
        command: ReportCommand,
    },
}

/// Arguments for `review`.
#[derive(Parser, Debug)]
struct ReviewCommand {
    /// Pull request number to review.
    #[arg(long, value_name = "NUMBER")]
    pr: String,
    /// Repository in `owner/name` form.
    #[arg(long, value_name = "OWNER/NAME")]
    repo: String,
    /// Path to a TOML rule overlay.
    #[arg(long, value_name = "PATH")]
    rules: Option<PathBuf>,
    /// Escalate warnings to build-failing severity.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
    /// Maximum total changed lines before refusal.
    #[arg(long, value_name = "COUNT")]
    max_lines: Option<u32>,
    /// Maximum changed files before refusal.
    #[arg(long, value_name = "COUNT")]
    max_files: Option<usize>,
}

/// Rule catalog subcommands.
#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Validate a rule overlay against the built-in catalog.
    Validate(RulesValidateCommand),
    /// List the effective rule catalog.
    List(RulesListCommand),
}

/// Arguments for `rules validate`.
#[derive(Parser, Debug)]
struct RulesValidateCommand {
    /// Path to the TOML rule overlay.
    #[arg(long, value_name = "PATH")]
    rules: PathBuf,
}

/// Arguments for `rules list`.
#[derive(Parser, Debug)]
struct RulesListCommand {
    /// Optional TOML rule overlay applied over the built-in catalog.
    #[arg(long, value_name = "PATH")]
    rules: Option<PathBuf>,
}

/// Report rendering subcommands.
#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Render a markdown report from a serialized review result.
    Render(ReportRenderCommand),
}

/// Arguments for `report render`.
#[derive(Parser, Debug)]
struct ReportRenderCommand {
    /// Path to a JSON review result.
    #[arg(long, value_name = "PATH")]
    result: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    init_tracing();
    let Some(cli) = parse_cli(std::env::args_os())? else {
        return Ok(ExitCode::SUCCESS);
    };

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("review-gate {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Review(command) => command_review(command).await,
        Commands::Rules {
            command,
        } => match command {
            RulesCommand::Validate(command) => command_rules_validate(&command),
            RulesCommand::List(command) => command_rules_list(&command),
        },
        Commands::Report {
            command,
        } => match command {
            ReportCommand::Render(command) => command_report_render(&command),
        },
    }
}

/// Parses CLI arguments, mapping usage errors to startup failures.
///
/// Help and version displays terminate successfully (`Ok(None)`); malformed
/// arguments surface as a [`CliError`] so they share the error exit code
/// instead of colliding with the refusal code.
fn parse_cli<I, T>(args: I) -> CliResult<Option<Cli>>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print().map_err(|io_err| CliError::new(output_error("stdout", &io_err)))?;
            Ok(None)
        }
        Err(err) => Err(CliError::new(err.to_string())),
    }
}

/// Installs the stderr log subscriber honoring `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Prints top-level usage.
fn show_help() -> CliResult<()> {
    Cli::command()
        .print_help()
        .map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Review Command
// ============================================================================

/// Executes `review`: runs the full pipeline against one pull request.
async fn command_review(command: ReviewCommand) -> CliResult<ExitCode> {
    let mut settings = GateSettings::from_process_env()
        .map_err(|err| CliError::new(format!("configuration error: {err}")))?;
    apply_overrides(&mut settings, &command);

    let overlay = settings.custom_rules_path.as_deref().map(Path::new);
    let rule_set =
        load_rule_set(overlay).map_err(|err| CliError::new(format!("rule loading failed: {err}")))?;

    let api_key = settings
        .llm
        .api_key
        .clone()
        .ok_or_else(|| CliError::new(format!("{LLM_API_KEY_VAR} must be set for review runs")))?;
    let analyzer = ChatAnalyzer::new(ChatAnalyzerConfig {
        endpoint: settings.llm.endpoint.clone(),
        model: settings.llm.model.clone(),
        api_key,
        ..ChatAnalyzerConfig::default()
    })
    .map_err(|err| CliError::new(format!("analyzer setup failed: {err}")))?;

    let api_config = GithubApiConfig {
        api_base: settings.github.api_base.clone(),
        repo: command.repo.clone(),
        token: settings.github.token.clone(),
        ..GithubApiConfig::default()
    };
    let source_client = GithubClient::new(api_config.clone())
        .map_err(|err| CliError::new(format!("github client setup failed: {err}")))?;
    let publish_client = GithubClient::new(api_config)
        .map_err(|err| CliError::new(format!("github client setup failed: {err}")))?;

    let orchestrator = Orchestrator::new(
        Arc::new(GithubDiffSource::new(source_client)),
        Arc::new(analyzer),
        Arc::new(GithubPublisher::new(publish_client, command.pr.clone())),
        Arc::new(rule_set),
        OrchestratorConfig {
            limits: settings.limits,
            strict_mode: settings.strict_mode,
            fail_on_insufficient_context: settings.fail_on_insufficient_context,
            fetch_timeout: settings.fetch_timeout,
            publish_timeout: settings.publish_timeout,
            concurrency: settings.concurrency,
        },
    );

    let outcome = orchestrator.run(&command.pr).await;
    tracing::info!(
        pr = %command.pr,
        exit_code = outcome.exit_code,
        published = outcome.published,
        "review run complete"
    );
    write_stdout_line(&outcome.report)
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    if let Some(reason) = &outcome.publish_error {
        write_stderr_line(&format!("publish failed: {reason}"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    Ok(ExitCode::from(outcome.exit_code))
}

/// Applies command-line overrides on top of environment settings.
fn apply_overrides(settings: &mut GateSettings, command: &ReviewCommand) {
    if command.strict {
        settings.strict_mode = true;
    }
    if let Some(max_lines) = command.max_lines {
        settings.limits.max_lines = max_lines;
    }
    if let Some(max_files) = command.max_files {
        settings.limits.max_files = max_files;
    }
    if let Some(path) = &command.rules {
        settings.custom_rules_path = Some(path.display().to_string());
    }
}

// ============================================================================
// SECTION: Rules Commands
// ============================================================================

/// Executes `rules validate`.
fn command_rules_validate(command: &RulesValidateCommand) -> CliResult<ExitCode> {
    let rule_set = load_rule_set(Some(&command.rules))
        .map_err(|err| CliError::new(format!("rule validation failed: {err}")))?;
    write_stdout_line(&format!("ok: {} rules in the effective catalog", rule_set.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `rules list`.
fn command_rules_list(command: &RulesListCommand) -> CliResult<ExitCode> {
    let rule_set = load_rule_set(command.rules.as_deref())
        .map_err(|err| CliError::new(format!("rule loading failed: {err}")))?;
    for compiled in rule_set.rules() {
        let rule = &compiled.rule;
        write_stdout_line(&format!(
            "{:<8} {:<9} {:<16} {}",
            rule.id.as_str(),
            rule.severity.as_str(),
            rule.category.as_str(),
            rule.description
        ))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Report Command
// ============================================================================

/// Executes `report render`.
fn command_report_render(command: &ReportRenderCommand) -> CliResult<ExitCode> {
    let text = read_limited_utf8(&command.result, MAX_RESULT_BYTES)
        .map_err(|err| CliError::new(format!("result read failed: {err}")))?;
    let report = render_result(&text)?;
    write_stdout_bytes(report.as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Renders a markdown report from serialized review-result JSON.
fn render_result(text: &str) -> CliResult<String> {
    let result: ReviewResult = serde_json::from_str(text)
        .map_err(|err| CliError::new(format!("result decode failed: {err}")))?;
    Ok(format_report(&result))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message for a stream.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns the error exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(EXIT_ERROR)
}
