use anyhow::{Context, Result};
use clap::Parser;
use gitstory_core::{StoryConfig, TraversalDirection};
use gitstory_events::{Event, EventBus, EventListener, EventLog};
use gitstory_graph::{StoryError, tell_story};
use gitstory_history::{GitHistory, HistoryError};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about = "Animate a git history as a stream of draw events", long_about = None)]
struct Args {
    /// Path inside the repository to read
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// JSON file with story settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference to start from (commit id, branch, tag or HEAD)
    #[arg(long)]
    commit_id: Option<String>,

    /// Number of commits to show
    #[arg(long)]
    commits: Option<usize>,

    /// Walk from the start reference back through its parents
    #[arg(long)]
    reverse: bool,

    #[arg(long)]
    invert_branches: bool,

    /// Follow only the first parent or child at every commit
    #[arg(long)]
    hide_merged_chains: bool,

    #[arg(long)]
    max_branches_per_commit: Option<usize>,

    #[arg(long)]
    max_tags_per_commit: Option<usize>,

    #[arg(long)]
    show_intro: bool,

    #[arg(long)]
    show_outro: bool,

    #[arg(long)]
    title: Option<String>,

    /// Log per-commit decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn story_config(&self) -> Result<StoryConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => StoryConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut StoryConfig) {
        if let Some(start) = &self.commit_id {
            config.start_ref = start.clone();
        }
        if let Some(commits) = self.commits {
            config.commits = commits;
        }
        if self.reverse {
            config.direction = TraversalDirection::Backward;
        }
        config.invert_branches |= self.invert_branches;
        config.hide_merged_chains |= self.hide_merged_chains;
        if let Some(max) = self.max_branches_per_commit {
            config.max_branches_per_commit = max;
        }
        if let Some(max) = self.max_tags_per_commit {
            config.max_tags_per_commit = max;
        }
        config.show_intro |= self.show_intro;
        config.show_outro |= self.show_outro;
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
    }
}

/// Writes each event as one JSON line. The first write failure is kept and
/// later events are dropped.
struct NdjsonWriter<W: Write> {
    out: W,
    written: usize,
    error: Option<io::Error>,
}

impl<W: Write> NdjsonWriter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            written: 0,
            error: None,
        }
    }

    fn finish(mut self) -> io::Result<usize> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.written)
    }
}

impl<W: Write> EventListener for NdjsonWriter<W> {
    fn handle_event(&mut self, event: &Event) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, event)
            .map_err(io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        match result {
            Ok(()) => self.written += 1,
            Err(err) => self.error = Some(err),
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.story_config()?;
    let history = GitHistory::discover(&args.path).map_err(StoryError::from)?;
    let story = tell_story(&history, &config)?;

    let written = write_events(&story.events, io::BufWriter::new(io::stdout().lock()))
        .context("writing events")?;
    tracing::info!("wrote {} events", written);
    Ok(())
}

/// Hand the log to renderers over the event bus; the NDJSON writer is the
/// one subscriber the binary ships with.
fn write_events<W: Write>(log: &EventLog, out: W) -> io::Result<usize> {
    let bus = EventBus::new();
    log.publish_to(&bus);
    let mut writer = NdjsonWriter::new(out);
    bus.dispatch_to(&mut writer);
    writer.finish()
}

fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(err) = err.downcast_ref::<StoryError>() {
        return err.exit_code();
    }
    err.downcast_ref::<HistoryError>()
        .map_or(1, HistoryError::exit_code)
}

fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    if let Err(err) = run(&args) {
        eprintln!("git-story error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitstory_core::Vec2;
    use gitstory_events::CameraMove;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "git-story",
            "--commit-id",
            "main",
            "--commits",
            "3",
            "--reverse",
            "--hide-merged-chains",
            "--max-tags-per-commit",
            "0",
        ])
        .unwrap();
        let config = args.story_config().unwrap();
        assert_eq!(config.start_ref, "main");
        assert_eq!(config.commits, 3);
        assert_eq!(config.direction, TraversalDirection::Backward);
        assert!(config.hide_merged_chains);
        assert_eq!(config.max_tags_per_commit, 0);
        assert_eq!(config.max_branches_per_commit, 1);
    }

    #[test]
    fn test_config_file_is_merged_under_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.json");
        std::fs::write(&path, r#"{"commits": 12, "title": "From file", "show_outro": true}"#)
            .unwrap();
        let args = Args::try_parse_from([
            "git-story",
            "--config",
            path.to_str().unwrap(),
            "--title",
            "From flag",
        ])
        .unwrap();
        let config = args.story_config().unwrap();
        assert_eq!(config.commits, 12);
        assert_eq!(config.title, "From flag");
        assert!(config.show_outro);
        assert_eq!(config.start_ref, "HEAD");
    }

    #[test]
    fn test_ndjson_writer_emits_one_line_per_event() {
        let mut writer = NdjsonWriter::new(Vec::new());
        writer.handle_event(&Event::CameraMove(CameraMove::Save));
        writer.handle_event(&Event::CameraMove(CameraMove::Pan {
            to: Vec2::new(1.0, 0.0),
        }));
        assert_eq!(writer.written, 2);
        let text = String::from_utf8(writer.out.clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "camera_move");
    }

    #[test]
    fn test_write_events_keeps_log_order() {
        let mut log = EventLog::new();
        log.camera(CameraMove::Save);
        log.camera(CameraMove::Scale { factor: 1.5 });
        log.camera(CameraMove::Restore);

        let mut out = Vec::new();
        assert_eq!(write_events(&log, &mut out).unwrap(), 3);
        let modes: Vec<String> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["mode"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(modes, vec!["save", "scale", "restore"]);
    }

    #[test]
    fn test_history_errors_map_to_exit_codes() {
        let err = anyhow::Error::from(StoryError::from(HistoryError::EmptyHistory {
            reference: "HEAD".into(),
        }));
        assert_eq!(exit_code(&err), 3);
        assert_eq!(exit_code(&anyhow::anyhow!("io")), 1);
    }
}
