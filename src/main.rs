use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod delivery;
mod extraction;
mod notify;
mod remote;
mod report;
mod selection;
mod session;
mod shell;
#[cfg(test)]
mod testing;
mod workflow;

use cli::{Command, ExtractArgs, GlobalArgs, InspectArgs, RootArgs, ShellArgs};
use delivery::DirectorySink;
use remote::{HttpService, UploadFile};
use report::{render_names, render_notification, render_session_summary};
use selection::SelectionKind;
use workflow::{ExtractOutcome, UploadOutcome, Workbench};

/// Exit status when the requested extraction had nothing selected.
const EXIT_NOTHING_SELECTED: u8 = 2;

const LOG_ENV: &str = "TAGX_LOG";

type CliWorkbench = Workbench<HttpService, DirectorySink>;

fn main() -> Result<ExitCode> {
    let args = RootArgs::parse();
    init_logging(args.global.verbose);

    match args.command {
        Command::Inspect(cmd) => cmd_inspect(&args.global, cmd),
        Command::Extract(cmd) => cmd_extract(&args.global, cmd),
        Command::Shell(cmd) => cmd_shell(&args.global, cmd),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open_workbench(global: &GlobalArgs) -> Result<CliWorkbench> {
    let overrides = global.overrides();
    let file_config = config::load_config_for(&overrides)?;
    let settings = config::resolve_settings(&overrides, file_config.as_ref(), |key| {
        std::env::var(key).ok()
    })?;
    let sink = DirectorySink::new(settings.output_dir.clone());
    tracing::info!(
        server = %settings.server_url,
        out_dir = %sink.dir().display(),
        "client configured"
    );
    Ok(Workbench::new(HttpService::new(&settings), sink))
}

/// Upload `path`, returning whether a session was installed. A rejected
/// upload has already been reported on stderr.
fn upload(bench: &CliWorkbench, path: &Path) -> Result<bool> {
    let file = UploadFile::from_path(path)?;
    match bench.upload(&file)? {
        UploadOutcome::Installed(_) => Ok(true),
        UploadOutcome::Failed(_) => {
            report_notification(bench);
            Ok(false)
        }
    }
}

fn report_notification(bench: &CliWorkbench) {
    if let Some(notification) = bench.notification() {
        let line = render_notification(&notification);
        if notification.is_error() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

fn cmd_inspect(global: &GlobalArgs, args: InspectArgs) -> Result<ExitCode> {
    let bench = open_workbench(global)?;
    if !upload(&bench, &args.file)? {
        return Ok(ExitCode::FAILURE);
    }
    let session = bench
        .session()
        .context("upload finished without a session")?;

    let mut out = io::stdout().lock();
    if args.json {
        let text = serde_json::to_string_pretty(session.as_ref()).context("serialize session")?;
        writeln!(out, "{text}")?;
        return Ok(ExitCode::SUCCESS);
    }
    write!(out, "{}", render_session_summary(&session))?;
    for kind in [SelectionKind::Templates, SelectionKind::Areas] {
        writeln!(out)?;
        writeln!(out, "{}:", capitalized(kind))?;
        write!(out, "{}", render_names(&session, kind, &bench.selection(kind)))?;
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_extract(global: &GlobalArgs, args: ExtractArgs) -> Result<ExitCode> {
    let bench = open_workbench(global)?;
    if !upload(&bench, &args.file)? {
        return Ok(ExitCode::FAILURE);
    }

    let kind = args.kind.kind();
    if let Some(selection) = kind.required_selection() {
        for name in args.kind.names() {
            bench.toggle(selection, name);
        }
    }

    match bench.extract(kind)? {
        ExtractOutcome::Delivered(artifact) => {
            report_notification(&bench);
            println!("Saved {}", artifact.path.display());
            Ok(ExitCode::SUCCESS)
        }
        ExtractOutcome::Skipped => {
            let selection = kind
                .required_selection()
                .map(|selection| selection.to_string())
                .unwrap_or_default();
            eprintln!("Nothing selected; pass --name to choose {selection}.");
            Ok(ExitCode::from(EXIT_NOTHING_SELECTED))
        }
        ExtractOutcome::Failed(message) => {
            report_notification(&bench);
            tracing::debug!(%kind, error = %message, "extraction failure detail");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_shell(global: &GlobalArgs, args: ShellArgs) -> Result<ExitCode> {
    let bench = open_workbench(global)?;
    let stdin = io::stdin();
    let prompt = stdin.is_terminal();
    let mut out = io::stdout().lock();
    shell::run_shell(&bench, args.file.as_deref(), stdin.lock(), &mut out, prompt)?;
    Ok(ExitCode::SUCCESS)
}

fn capitalized(kind: SelectionKind) -> &'static str {
    match kind {
        SelectionKind::Templates => "Templates",
        SelectionKind::Areas => "Areas",
    }
}
