//! Line-oriented interactive session.
//!
//! Each line is split with shell quoting rules so template and area names
//! containing spaces can be given in quotes. Every command that talks to the
//! service prints the notification it produced.
use crate::delivery::ArtifactSink;
use crate::extraction::ExtractionKind;
use crate::remote::{RemoteService, UploadFile};
use crate::report::{render_names, render_notification, render_selection, render_session_summary};
use crate::selection::SelectionKind;
use crate::workflow::{ExtractOutcome, UploadOutcome, Workbench};
use anyhow::{anyhow, Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

const HELP: &str = "\
Commands:
  upload <PATH>                 Upload a .csv or .zip export (replaces the session)
  summary                       Show the active session
  templates | areas             List names; selected ones are marked [x]
  toggle-template <NAME>...     Select or deselect templates
  toggle-area <NAME>...         Select or deselect areas
  clear-templates | clear-areas Empty a selection
  selected                      Show both selections
  extract-templates             Download selected templates (extracted_templates.csv)
  extract-areas                 Download rows of selected areas (extracted_areas.csv)
  extract-matrix                Download PLC matrices (plc_matrices.zip)
  extract-addresses [--alarm-only]
                                Download address maps (Addresses_*.zip)
  analyze-extensions            Download the extension report (extensions_report.csv)
  status                        Show the last extraction status
  reset                         Drop the session and selections
  help                          Show this help
  quit                          Leave the shell
";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Upload(PathBuf),
    Summary,
    List(SelectionKind),
    Toggle(SelectionKind, Vec<String>),
    Clear(SelectionKind),
    Selected,
    Extract(ExtractionKind),
    Status,
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Run the shell until `quit` or end of input.
pub fn run_shell<R, S, I, W>(
    bench: &Workbench<R, S>,
    initial: Option<&Path>,
    input: I,
    out: &mut W,
    prompt: bool,
) -> Result<()>
where
    R: RemoteService,
    S: ArtifactSink,
    I: BufRead,
    W: Write,
{
    if let Some(path) = initial {
        execute(bench, ShellCommand::Upload(path.to_path_buf()), out)?;
    }
    let mut lines = input.lines();
    loop {
        if prompt {
            write!(out, "tagx> ")?;
            out.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("read command")?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                continue;
            }
        };
        if execute(bench, command, out)? == Flow::Quit {
            break;
        }
    }
    Ok(())
}

fn parse_command(line: &str) -> Result<Option<ShellCommand>> {
    let words = shell_words::split(line).context("parse command line")?;
    let Some((name, args)) = words.split_first() else {
        return Ok(None);
    };
    let no_args = |command: ShellCommand| {
        if args.is_empty() {
            Ok(Some(command))
        } else {
            Err(anyhow!("{name} takes no arguments"))
        }
    };
    match name.as_str() {
        "upload" => match args {
            [path] => Ok(Some(ShellCommand::Upload(PathBuf::from(path)))),
            _ => Err(anyhow!("usage: upload <PATH>")),
        },
        "summary" => no_args(ShellCommand::Summary),
        "templates" => no_args(ShellCommand::List(SelectionKind::Templates)),
        "areas" => no_args(ShellCommand::List(SelectionKind::Areas)),
        "toggle-template" | "toggle-area" => {
            if args.is_empty() {
                return Err(anyhow!("usage: {name} <NAME>..."));
            }
            let kind = if name == "toggle-template" {
                SelectionKind::Templates
            } else {
                SelectionKind::Areas
            };
            Ok(Some(ShellCommand::Toggle(kind, args.to_vec())))
        }
        "clear-templates" => no_args(ShellCommand::Clear(SelectionKind::Templates)),
        "clear-areas" => no_args(ShellCommand::Clear(SelectionKind::Areas)),
        "selected" => no_args(ShellCommand::Selected),
        "extract-templates" => no_args(ShellCommand::Extract(ExtractionKind::Templates)),
        "extract-areas" => no_args(ShellCommand::Extract(ExtractionKind::Areas)),
        "extract-matrix" => no_args(ShellCommand::Extract(ExtractionKind::Matrix)),
        "extract-addresses" => match args {
            [] => Ok(Some(ShellCommand::Extract(ExtractionKind::Addresses {
                alarm_only: false,
            }))),
            [flag] if flag == "--alarm-only" => {
                Ok(Some(ShellCommand::Extract(ExtractionKind::Addresses {
                    alarm_only: true,
                })))
            }
            _ => Err(anyhow!("usage: extract-addresses [--alarm-only]")),
        },
        "analyze-extensions" => no_args(ShellCommand::Extract(ExtractionKind::Extensions)),
        "status" => no_args(ShellCommand::Status),
        "reset" => no_args(ShellCommand::Reset),
        "help" | "?" => no_args(ShellCommand::Help),
        "quit" | "exit" => no_args(ShellCommand::Quit),
        other => Err(anyhow!("unknown command {other:?}; type `help`")),
    }
}

fn execute<R, S, W>(bench: &Workbench<R, S>, command: ShellCommand, out: &mut W) -> Result<Flow>
where
    R: RemoteService,
    S: ArtifactSink,
    W: Write,
{
    let revision = bench.notifications().revision();
    match command {
        ShellCommand::Upload(path) => {
            let file = match UploadFile::from_path(&path) {
                Ok(file) => file,
                Err(err) => {
                    writeln!(out, "error: {err:#}")?;
                    return Ok(Flow::Continue);
                }
            };
            match bench.upload(&file) {
                Ok(UploadOutcome::Installed(session)) => {
                    print_notification_since(bench, revision, out)?;
                    write!(out, "{}", render_session_summary(&session))?;
                }
                Ok(UploadOutcome::Failed(_)) => print_notification_since(bench, revision, out)?,
                Err(err) => writeln!(out, "error: {err}")?,
            }
        }
        ShellCommand::Summary => match bench.session() {
            Some(session) => write!(out, "{}", render_session_summary(&session))?,
            None => writeln!(out, "No active session.")?,
        },
        ShellCommand::List(kind) => match bench.session() {
            Some(session) => write!(
                out,
                "{}",
                render_names(&session, kind, &bench.selection(kind))
            )?,
            None => writeln!(out, "No active session.")?,
        },
        ShellCommand::Toggle(kind, names) => {
            for name in names {
                let selected = bench.toggle(kind, &name);
                let verb = if selected { "selected" } else { "deselected" };
                writeln!(out, "{verb} {name}")?;
            }
            writeln!(out, "{}", render_selection(kind, &bench.selection(kind)))?;
        }
        ShellCommand::Clear(kind) => {
            bench.clear_selection(kind);
            writeln!(out, "{}", render_selection(kind, &bench.selection(kind)))?;
        }
        ShellCommand::Selected => {
            for kind in [SelectionKind::Templates, SelectionKind::Areas] {
                writeln!(out, "{}", render_selection(kind, &bench.selection(kind)))?;
            }
        }
        ShellCommand::Extract(kind) => {
            match bench.extract(kind) {
                Ok(ExtractOutcome::Skipped) => {
                    if let Some(selection) = kind.required_selection() {
                        writeln!(out, "Nothing selected; select {selection} first.")?;
                    }
                }
                Ok(ExtractOutcome::Delivered(artifact)) => {
                    print_notification_since(bench, revision, out)?;
                    writeln!(out, "Saved {}", artifact.path.display())?;
                    return Ok(Flow::Continue);
                }
                Ok(ExtractOutcome::Failed(_)) => {}
                Err(err) => writeln!(out, "error: {err}")?,
            }
            print_notification_since(bench, revision, out)?;
        }
        ShellCommand::Status => {
            if bench.is_uploading() {
                writeln!(out, "Upload in progress.")?;
            }
            writeln!(out, "Last extraction: {}", bench.status())?;
        }
        ShellCommand::Reset => {
            bench.reset();
            writeln!(out, "Session cleared.")?;
        }
        ShellCommand::Help => write!(out, "{HELP}")?,
        ShellCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn print_notification_since<R, S, W: Write>(
    bench: &Workbench<R, S>,
    revision: u64,
    out: &mut W,
) -> Result<()> {
    if bench.notifications().revision() == revision {
        return Ok(());
    }
    if let Some(notification) = bench.notification() {
        writeln!(out, "{}", render_notification(&notification))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
