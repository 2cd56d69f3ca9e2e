//! CODEOWNERS Resolver CLI
//!
//! A command-line tool for finding who owns files according to a GitHub
//! CODEOWNERS file.

use clap::Parser;
use codeowners_resolver_core::{
    LocalRepository, OwnershipFileSource, OwnershipTable, Resolver, build_table,
    fetch_ownership_file, render,
};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode as StdExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Args;
use cli::config::{ExitCode, FileLocation, Mode, ValidatedConfig, create_octocrab};
use cli::github::{GithubContents, OctocrabClient};
use cli::output::{PathReport, Reports, write_rules_json};

#[tokio::main]
async fn main() -> StdExitCode {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.verbose, args.json);

    // Signals cancel outstanding resolution; the run reports what it has
    let cancel = CancellationToken::new();
    let terminated = Arc::new(AtomicBool::new(false));
    let terminated_clone = terminated.clone();
    let cancel_clone = cancel.clone();

    tokio::spawn(async move {
        let ctrl_c = signal::ctrl_c();
        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT, shutting down...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down...");
            }
        }

        terminated_clone.store(true, Ordering::SeqCst);
        cancel_clone.cancel();
    });

    let exit_code = run(args, &cancel).await;

    // Check if we were terminated by signal
    if terminated.load(Ordering::SeqCst) {
        return StdExitCode::from(ExitCode::Terminated as u8);
    }

    StdExitCode::from(i32::from(exit_code) as u8)
}

/// Initialize tracing based on verbosity level.
fn init_tracing(verbosity: u8, json_output: bool) {
    // Don't output logs when using JSON output mode
    if json_output {
        return;
    }

    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["octocrab=warn", "hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

/// Run the resolver with the given arguments.
async fn run(args: Args, cancel: &CancellationToken) -> ExitCode {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    // Validate configuration
    let config = match ValidatedConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            let use_colors = !args.json && io::stderr().is_terminal();
            write_error(&mut stderr, &e.to_string(), use_colors);
            return ExitCode::StartupFailure;
        }
    };

    let use_colors = !config.json_output && io::stdout().is_terminal();
    debug!("Validated configuration: {:?}", config);

    // Create GitHub client if needed
    let octocrab = match create_octocrab(&config).await {
        Ok(client) => client,
        Err(e) => {
            write_error(&mut stderr, &e.to_string(), use_colors);
            return ExitCode::StartupFailure;
        }
    };

    // Fetch and parse the CODEOWNERS file
    let source: Box<dyn OwnershipFileSource> = match (&config.location, &octocrab) {
        (FileLocation::Github(repository), Some(client)) => {
            info!("Repository: {}", repository);
            Box::new(GithubContents::new(client.clone(), repository.clone()))
        }
        (FileLocation::Github(repository), None) => {
            write_error(
                &mut stderr,
                &format!("GitHub authentication is required to read {}", repository),
                use_colors,
            );
            return ExitCode::StartupFailure;
        }
        (FileLocation::Local(path), _) => {
            info!("Repository path: {}", path.display());
            Box::new(LocalRepository::new(path.clone()))
        }
    };

    let content = tokio::select! {
        biased;
        _ = cancel.cancelled() => return ExitCode::Terminated,
        fetched = fetch_ownership_file(source.as_ref()) => match fetched {
            Ok(content) => content,
            Err(e) => {
                write_error(&mut stderr, &e.to_string(), use_colors);
                return ExitCode::StartupFailure;
            }
        },
    };

    let table = build_table(&content);
    info!("Loaded {} rule(s)", table.len());
    if table.is_empty() {
        warn!("CODEOWNERS file has no rules");
    }

    let reports = match config.mode {
        Mode::Render => {
            let written = if config.json_output {
                write_rules_json(&table, &mut stdout)
            } else {
                writeln!(stdout, "{}", render(&table))
            };
            if let Err(e) = written {
                error!("Failed to write output: {}", e);
                return ExitCode::StartupFailure;
            }
            return ExitCode::Success;
        }
        Mode::MatchOnly => match_paths(&table, &config.paths),
        Mode::Resolve => {
            let Some(client) = octocrab else {
                write_error(
                    &mut stderr,
                    "GitHub authentication is required to resolve owners",
                    use_colors,
                );
                return ExitCode::StartupFailure;
            };
            let resolver = Resolver::with_config(
                Arc::new(OctocrabClient::new(client)),
                config.resolver_config,
            );

            if let Some(timeout) = config.timeout {
                let deadline = cancel.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(timeout).await;
                    if !deadline.is_cancelled() {
                        warn!("Resolution timed out after {}s", timeout.as_secs());
                        deadline.cancel();
                    }
                });
            }

            resolve_paths(&resolver, &table, &config.paths, cancel).await
        }
    };

    // Output results
    let written = if config.json_output {
        reports.write_json(&mut stdout)
    } else {
        reports.write_human(&mut stdout, use_colors)
    };
    if let Err(e) = written {
        error!("Failed to write output: {}", e);
        return ExitCode::StartupFailure;
    }

    if cancel.is_cancelled() {
        return ExitCode::Terminated;
    }

    // Determine exit code
    config.exit_code_for_results(reports.all_owned())
}

/// Matches every path without resolving owners.
fn match_paths(table: &OwnershipTable, paths: &[String]) -> Reports {
    let mut reports = Reports::new();
    for path in paths {
        reports.add(PathReport::matched(path.as_str(), table.match_path(path)));
    }
    reports
}

/// Resolves the owners of every path, all paths concurrently.
async fn resolve_paths(
    resolver: &Resolver,
    table: &OwnershipTable,
    paths: &[String],
    cancel: &CancellationToken,
) -> Reports {
    let resolutions = paths.iter().map(|path| async move {
        match table.match_path(path) {
            Ok(specifiers) => {
                debug!("{} matched {:?}", path, specifiers);
                let outcome = resolver.resolve(specifiers, cancel).await;
                PathReport::resolved(path.as_str(), specifiers, outcome)
            }
            Err(e) => PathReport::matched(path.as_str(), Err(e)),
        }
    });

    let mut reports = Reports::new();
    for report in futures::future::join_all(resolutions).await {
        reports.add(report);
    }
    reports
}

/// Write an error message to the writer.
fn write_error<W: Write>(writer: &mut W, message: &str, use_colors: bool) {
    let _ = cli::output::HumanOutput::new(writer, use_colors).write_error(message);
}
