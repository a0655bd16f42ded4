use std::borrow::Cow::{self, Borrowed, Owned};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use log::{error, info};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use cyberaudit::config::resolve_artifacts_dir;
use cyberaudit::{
    init_logger, render_distribution, AuditError, AuditSession, AuditorConfig, InferencePipeline,
    OptimizationLevel, RuntimeConfig, TableView, ARTIFACTS_ENV,
};

const CHART_WIDTH: usize = 40;
const COMMANDS: [&str; 6] = ["/analyze", "/history", "/chart", "/export", "/help", "/info"];

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding model_bullying.onnx, tokenizer.json and encoder.json
    #[arg(short, long)]
    artifacts: Option<PathBuf>,

    /// Intra-op threads for ONNX Runtime (0 lets the runtime decide)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Graph optimization level applied when loading the model
    #[arg(long, value_enum, default_value_t = OptimizationLevel::All)]
    optimization: OptimizationLevel,

    /// Skip SHA-256 verification against manifest.json
    #[arg(long)]
    no_verify: bool,
}

impl Args {
    fn into_config(self) -> AuditorConfig {
        let artifacts_dir = resolve_artifacts_dir(
            self.artifacts,
            std::env::var(ARTIFACTS_ENV).ok(),
            std::path::Path::new("artifacts"),
        );
        AuditorConfig {
            artifacts_dir,
            verify_manifest: !self.no_verify,
            runtime: RuntimeConfig {
                intra_threads: self.threads,
                optimization_level: self.optimization,
                ..RuntimeConfig::default()
            },
            ..AuditorConfig::default()
        }
    }
}

/// Completion and hints for the slash commands.
struct CliHelper;

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS.iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            COMMANDS.iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// What one input line asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Command { name: &'a str, arg: Option<&'a str> },
    Comment(&'a str),
}

fn parse_line(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed == "quit" || trimmed == "exit" {
        return Input::Quit;
    }
    if !trimmed.starts_with('/') {
        // the raw line is the comment, exactly as typed
        return Input::Comment(line);
    }

    let start = line.trim_start();
    let (name, rest) = match start.find(char::is_whitespace) {
        Some(at) => (&start[..at], Some(&start[at..])),
        None => (start, None),
    };
    if name == "/analyze" {
        // one separator is dropped, the rest is kept verbatim
        let text = rest.map(|r| {
            let mut chars = r.chars();
            chars.next();
            chars.as_str()
        });
        return Input::Comment(text.unwrap_or(""));
    }
    Input::Command {
        name,
        arg: rest.map(str::trim).filter(|a| !a.is_empty()),
    }
}

fn print_help() {
    println!("{}", "Type a comment and press Enter to analyze it.".bright_black());
    println!("{}", "  /analyze <text>  analyze text as written, even \"quit\" or a leading /".bright_black());
    println!("{}", "  /history [row]   show the history table starting at a row".bright_black());
    println!("{}", "  /chart           show the category distribution".bright_black());
    println!("{}", "  /export [path]   download the table as CSV (cyberbullying_report.csv)".bright_black());
    println!("{}", "  /info            show the loaded model".bright_black());
    println!("{}", "  quit             end the session".bright_black());
}

fn print_history(session: &AuditSession<'_>, view: &TableView, scroll: usize) {
    let records = session.history().snapshot();
    if records.is_empty() {
        println!("{}", "No comments analyzed yet.".bright_black());
        return;
    }
    println!("{}", "History".bold());
    print!("{}", view.render(records, scroll));
}

fn print_chart(session: &AuditSession<'_>) {
    let distribution = session.history().distribution();
    if distribution.is_empty() {
        return;
    }
    println!("{}", "Distribution".bold());
    print!("{}", render_distribution(&distribution, CHART_WIDTH));
}

fn export(session: &AuditSession<'_>, path: Option<&str>) -> Result<()> {
    let report = session.history().export_report();
    let path = PathBuf::from(path.unwrap_or(report.file_name));
    fs::write(&path, &report.bytes)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    info!("Wrote {} bytes ({}) to {:?}", report.bytes.len(), report.mime_type, path);
    println!(
        "{}",
        format!("Saved {} rows to {}", session.history().len(), path.display()).green()
    );
    Ok(())
}

fn analyze(session: &mut AuditSession<'_>, view: &TableView, comment: &str) {
    let started = Instant::now();
    match session.analyze_with_scores(comment) {
        Ok((record, prediction)) => {
            println!(
                "{} {} {}",
                "→".bright_blue(),
                record.label().bright_yellow().bold(),
                format!("({:.1}% confidence)", prediction.confidence * 100.0).bright_black()
            );
            info!("Classified in {:.2?}", started.elapsed());
        }
        Err(AuditError::EmptyInput) => return,
        Err(e) => {
            // the request leaves no visible change; details go to the log
            error!("Analysis failed: {}", e);
            return;
        }
    }
    println!();
    print_history(session, view, 0);
    println!();
    print_chart(session);
}

fn main() -> Result<()> {
    init_logger();
    let config = Args::parse().into_config();

    info!("=== Starting Cyberbullying Auditor ===");
    info!("Artifacts directory: {:?}", config.artifacts_dir);

    let start_time = Instant::now();
    let pipeline = InferencePipeline::from_config(&config)
        .with_context(|| format!("Failed to load artifacts from {}", config.artifacts_dir.display()))?;
    info!("=== Artifacts Loaded (took {:.2?}) ===", start_time.elapsed());

    let mut session = AuditSession::new(&pipeline);
    let view = TableView::default();

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper));

    println!("{}", "=== Cyberbullying Auditor ===".bright_magenta().bold());
    print_help();
    println!();

    loop {
        match rl.readline("comment> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }

                match parse_line(&line) {
                    Input::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Input::Comment(comment) => analyze(&mut session, &view, comment),
                    Input::Command { name: "/history", arg } => {
                        let row = arg.and_then(|a| a.parse::<usize>().ok()).unwrap_or(0);
                        print_history(&session, &view, row);
                    }
                    Input::Command { name: "/chart", .. } => print_chart(&session),
                    Input::Command { name: "/export", arg } => {
                        if let Err(e) = export(&session, arg) {
                            eprintln!("{}", format!("Error: {:#}", e).red());
                        }
                    }
                    Input::Command { name: "/info", .. } => {
                        let info = pipeline.info();
                        println!("Classes: {}", info.class_labels.join(", "));
                        println!("Vocabulary: {} words, sequence length {}", info.vocab_size, info.sequence_length);
                        if let Some(path) = info.model_path {
                            println!("Model: {}", path.display());
                        }
                    }
                    Input::Command { name: "/help", .. } => print_help(),
                    Input::Command { name, .. } => {
                        println!("{}", format!("Unknown command {}", name).bright_black());
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_kept_verbatim() {
        assert_eq!(parse_line("  Have a nice day "), Input::Comment("  Have a nice day "));
        assert_eq!(parse_line(""), Input::Comment(""));
        assert_eq!(parse_line("   "), Input::Comment("   "));
    }

    #[test]
    fn test_quit_words() {
        assert_eq!(parse_line("quit"), Input::Quit);
        assert_eq!(parse_line(" exit "), Input::Quit);
        assert_eq!(parse_line("quit now"), Input::Comment("quit now"));
    }

    #[test]
    fn test_commands_and_arguments() {
        assert_eq!(parse_line("/chart"), Input::Command { name: "/chart", arg: None });
        assert_eq!(parse_line("/history 7"), Input::Command { name: "/history", arg: Some("7") });
        assert_eq!(
            parse_line("/export   out/report.csv  "),
            Input::Command { name: "/export", arg: Some("out/report.csv") }
        );
        assert_eq!(parse_line("/r/ pathetic"), Input::Command { name: "/r/", arg: Some("pathetic") });
    }

    #[test]
    fn test_analyze_forces_classification() {
        assert_eq!(parse_line("/analyze quit"), Input::Comment("quit"));
        assert_eq!(parse_line("/analyze /r/ you're pathetic"), Input::Comment("/r/ you're pathetic"));
        assert_eq!(parse_line("/analyze  two  spaces "), Input::Comment(" two  spaces "));
        assert_eq!(parse_line("/analyze"), Input::Comment(""));
    }
}
