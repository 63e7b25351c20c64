use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use scievent_core::{
    AnnotationSession, AnnotatorConfig, EventLocator, EventPath, SlotPath, Span,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scievent")]
#[command(about = "SciEvent annotation CLI")]
struct Cli {
    /// Action policy: 'single' or 'multiple'
    #[arg(long, global = true, env = "SCIEVENT_ACTION_POLICY")]
    action_policy: Option<String>,
    /// Reject other roles until the event's Action is annotated
    #[arg(long, global = true, env = "SCIEVENT_REQUIRE_ACTION_FIRST")]
    require_action_first: Option<String>,
    /// Directory exports are written to (defaults to the input file's directory)
    #[arg(long = "out", global = true, env = "SCIEVENT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document and print its papers
    Check {
        /// Input JSON file
        file: PathBuf,
    },
    /// Normalise a document and write its export
    Export {
        /// Input JSON file
        file: PathBuf,
    },
    /// Assign spans and remove values, then write the export
    Annotate {
        #[command(flatten)]
        edit: EditArgs,
        /// Path to remove after the spans are assigned (repeatable)
        #[arg(long = "remove", value_name = "PATH")]
        removals: Vec<String>,
    },
    /// Print the annotated spans of an event as JSON
    Spans {
        #[command(flatten)]
        edit: EditArgs,
    },
}

#[derive(Args)]
struct EditArgs {
    /// Input JSON file
    file: PathBuf,
    /// Paper index (0-based)
    #[arg(long)]
    paper: usize,
    /// Event index within the paper (0-based)
    #[arg(long)]
    event: usize,
    /// Span assignment, e.g. 'Arguments.Agent=0..4' (repeatable)
    #[arg(long = "span", value_name = "PATH=START..END", value_parser = parse_span_arg)]
    spans: Vec<SpanArg>,
}

impl EditArgs {
    fn locator(&self) -> EventLocator {
        EventLocator::new(self.paper, self.event)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct SpanArg {
    slot: SlotPath,
    span: Span,
}

fn parse_span_arg(raw: &str) -> Result<SpanArg, String> {
    let (path, range) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PATH=START..END, got '{raw}'"))?;
    let slot: SlotPath = path.trim().parse().map_err(|e| format!("{e}"))?;
    let (start, end) = range
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{range}'"))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid span start '{start}'"))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid span end '{end}'"))?;
    let span = Span::new(start, end).map_err(|e| e.to_string())?;
    Ok(SpanArg { slot, span })
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scievent=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let output = run(cli)?;
    print!("{output}");
    Ok(())
}

/// Executes a parsed command and returns what it prints.
fn run(cli: Cli) -> anyhow::Result<String> {
    let config = AnnotatorConfig::resolve(
        cli.action_policy.as_deref(),
        cli.require_action_first.as_deref(),
        cli.output_dir,
    )
    .context("invalid configuration")?;

    let mut out = String::new();
    match cli.command {
        Commands::Check { file } => {
            let session = open(config, &file)?;
            let document = session.document();
            for paper in document.papers() {
                writeln!(out, "{}: {} events", paper.paper_code(), paper.events().len())?;
            }
            writeln!(
                out,
                "{} papers, {} events",
                document.papers().len(),
                document.event_count()
            )?;
        }
        Commands::Export { file } => {
            let session = open(config, &file)?;
            let written = write_export(&session, &file)?;
            writeln!(out, "{}", written.display())?;
        }
        Commands::Annotate { edit, removals } => {
            let mut session = open(config, &edit.file)?;
            let at = edit.locator();
            apply_spans(&mut session, at, &edit.spans, &mut out)?;
            for raw in &removals {
                let path: EventPath = raw
                    .parse()
                    .with_context(|| format!("invalid removal path '{raw}'"))?;
                let outcome = session
                    .remove(at, &path)
                    .with_context(|| format!("failed to remove {path}"))?;
                if !outcome.changed() {
                    tracing::info!(%path, "Nothing to remove");
                }
            }
            let written = write_export(&session, &edit.file)?;
            writeln!(out, "{}", written.display())?;
        }
        Commands::Spans { edit } => {
            let mut session = open(config, &edit.file)?;
            let at = edit.locator();
            let mut ignored = String::new();
            apply_spans(&mut session, at, &edit.spans, &mut ignored)?;
            let spans = session.highlights(at)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&spans)?)?;
        }
    }
    Ok(out)
}

fn open(config: AnnotatorConfig, file: &Path) -> anyhow::Result<AnnotationSession> {
    let input = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let source_name = file.file_name().and_then(|name| name.to_str());
    AnnotationSession::open(config, &input, source_name)
        .with_context(|| format!("failed to load {}", file.display()))
}

fn apply_spans(
    session: &mut AnnotationSession,
    at: EventLocator,
    spans: &[SpanArg],
    out: &mut String,
) -> anyhow::Result<()> {
    for arg in spans {
        let id = session
            .annotate(at, arg.slot, arg.span)
            .with_context(|| format!("failed to assign {} to {}", arg.span, arg.slot))?;
        writeln!(out, "{} {} -> {}", arg.slot, arg.span, id)?;
    }
    Ok(())
}

fn write_export(session: &AnnotationSession, input: &Path) -> anyhow::Result<PathBuf> {
    let dir = match session.config().output_dir() {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    if !dir.as_os_str().is_empty() && !dir.is_dir() {
        bail!("output directory {} does not exist", dir.display());
    }

    let target = dir.join(session.export_file_name());
    let rendered = session.export()?;
    std::fs::write(&target, rendered)
        .with_context(|| format!("failed to write {}", target.display()))?;
    tracing::info!(path = %target.display(), "Wrote export");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scievent_core::AnnotatorError;
    use std::fs;
    use tempfile::TempDir;

    const CATS: &str = r#"[{"paper_code": "P1", "abstract": "About cats.", "events": [{
        "Result": "",
        "Text": "Cats chase mice.",
        "Main Action": ""
    }]}]"#;

    fn write_input(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn run_args(args: &[&str]) -> anyhow::Result<String> {
        let mut full = vec!["scievent"];
        full.extend_from_slice(args);
        run(Cli::try_parse_from(full)?)
    }

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn parse_span_arg_accepts_paths_with_spaces() {
        let arg = parse_span_arg("Arguments.Object.Primary Object=11..15").unwrap();
        assert_eq!(arg.slot.to_string(), "Arguments.Object.Primary Object");
        assert_eq!((arg.span.start(), arg.span.end()), (11, 15));
    }

    #[test]
    fn parse_span_arg_rejects_garbage() {
        assert!(parse_span_arg("Action").is_err());
        assert!(parse_span_arg("Action=5").is_err());
        assert!(parse_span_arg("Action=9..5").is_err());
        assert!(parse_span_arg("Arguments.Mood=0..4").is_err());
        assert!(parse_span_arg("Action.0=0..4").is_err());
    }

    #[test]
    fn check_reports_counts() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "cats.json", CATS);

        let out = run_args(&["check", input.to_str().unwrap()]).unwrap();
        assert!(out.contains("P1: 1 events"));
        assert!(out.contains("1 papers, 1 events"));
    }

    #[test]
    fn check_rejects_bad_document() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "bad.json", r#"[{"events": []}]"#);

        let err = run_args(&["check", input.to_str().unwrap()]).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("Each paper must have paper_code and events array"), "{chain}");
    }

    #[test]
    fn export_writes_canonical_file_next_to_input() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "cats.json", CATS);

        let out = run_args(&["export", input.to_str().unwrap()]).unwrap();
        let written = dir.path().join("cats_annotated.json");
        assert_eq!(out.trim(), written.display().to_string());

        let json = read_json(&written);
        let event = &json[0]["events"][0];
        assert_eq!(event["Results/Findings"], serde_json::json!(""));
        assert_eq!(event["Action"], serde_json::json!(""));
        assert!(event.get("Main Action").is_none());
        assert_eq!(json[0]["abstract"], serde_json::json!("About cats."));
    }

    #[test]
    fn annotate_assigns_and_removes() {
        let dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let input = write_input(&dir, "cats.json", CATS);

        run_args(&[
            "annotate",
            input.to_str().unwrap(),
            "--paper",
            "0",
            "--event",
            "0",
            "--span",
            "Action=5..10",
            "--span",
            "Arguments.Agent=0..4",
            "--span",
            "Arguments.Object.Primary Object=11..15",
            "--remove",
            "Arguments.Agent",
            "--out",
            out_dir.path().to_str().unwrap(),
        ])
        .unwrap();

        let json = read_json(&out_dir.path().join("cats_annotated.json"));
        let event = &json[0]["events"][0];
        assert_eq!(event["Action"], serde_json::json!("chase"));
        assert_eq!(event["Arguments"]["Agent"], serde_json::json!(""));
        assert_eq!(
            event["Arguments"]["Object"]["Primary Object"],
            serde_json::json!("mice")
        );
    }

    #[test]
    fn annotate_reports_overlap() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "cats.json", CATS);

        let err = run_args(&[
            "annotate",
            input.to_str().unwrap(),
            "--paper",
            "0",
            "--event",
            "0",
            "--span",
            "Arguments.Agent=0..4",
            "--span",
            "Arguments.Context=2..8",
        ])
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnnotatorError>(),
            Some(AnnotatorError::Overlap { .. })
        ));
        assert!(!dir.path().join("cats_annotated.json").exists());
    }

    #[test]
    fn action_policy_flag_is_validated() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "cats.json", CATS);

        let err = run_args(&[
            "check",
            input.to_str().unwrap(),
            "--action-policy",
            "sometimes",
        ])
        .unwrap_err();
        assert!(format!("{err:#}").contains("sometimes"));
    }

    #[test]
    fn multiple_action_policy_from_flag() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "cats.json", CATS);

        run_args(&[
            "annotate",
            input.to_str().unwrap(),
            "--paper",
            "0",
            "--event",
            "0",
            "--action-policy",
            "multiple",
            "--span",
            "Action=5..10",
            "--span",
            "Action=11..15",
        ])
        .unwrap();

        let json = read_json(&dir.path().join("cats_annotated.json"));
        assert_eq!(
            json[0]["events"][0]["Action"],
            serde_json::json!(["chase", "mice"])
        );
    }

    #[test]
    fn spans_prints_recomputed_list() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "cats.json", CATS);

        let out = run_args(&[
            "spans",
            input.to_str().unwrap(),
            "--paper",
            "0",
            "--event",
            "0",
            "--span",
            "Arguments.Object.Primary Object=11..15",
            "--span",
            "Arguments.Agent=0..4",
        ])
        .unwrap();

        let spans: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(spans[0]["type"], serde_json::json!("Arguments.Agent"));
        assert_eq!(spans[0]["start"], serde_json::json!(0));
        assert_eq!(
            spans[1]["type"],
            serde_json::json!("Arguments.Object.Primary Object")
        );
        assert!(!dir.path().join("cats_annotated.json").exists());
    }

    #[test]
    fn missing_event_is_an_error() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "cats.json", CATS);

        let err = run_args(&[
            "spans",
            input.to_str().unwrap(),
            "--paper",
            "0",
            "--event",
            "3",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("event 3 not found"));
    }
}
