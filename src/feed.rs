//! Inbound task events: one JSON object per line, read from a file or FIFO
//! on a background thread that also reports when the feed drops and returns.

use crate::category::{CategoryRegistry, OTHER};
use crate::model::TaskStatus;
use crate::room::Point;
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufRead, BufReader, Seek, SeekFrom},
    path::PathBuf,
    sync::mpsc::Sender,
    thread::{self, JoinHandle},
    time::Duration,
};
use thiserror::Error;

const POLL: Duration = Duration::from_millis(200);
const REOPEN_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub(crate) enum FeedError {
    #[error("blank line")]
    Blank,
    #[error("malformed task event: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    status: TaskStatus,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TaskEvent {
    pub(crate) status: TaskStatus,
    pub(crate) category: String,
    pub(crate) summary: Option<String>,
    /// The category's spot in the room, when the registry has one.
    pub(crate) target: Option<Point>,
}

/// What the tail thread hands to the frame loop.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum FeedMsg {
    Line(String),
    /// The feed could not be opened or read. Sent once per outage.
    Down,
    /// The feed was reopened after a `Down`.
    Up,
}

/// Decodes one line. A missing category is classified from the summary; a
/// named category the registry has never seen is added to it.
pub(crate) fn parse_line(
    line: &str,
    registry: &mut CategoryRegistry,
) -> Result<TaskEvent, FeedError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(FeedError::Blank);
    }
    let wire: WireEvent = serde_json::from_str(line)?;
    let category = match wire.category.filter(|c| !c.trim().is_empty()) {
        Some(c) => {
            let id = c.trim().to_lowercase();
            registry.register(&id, &id, &[]).id.clone()
        }
        None => wire
            .summary
            .as_deref()
            .and_then(|s| registry.classify(s))
            .unwrap_or_else(|| OTHER.to_string()),
    };
    let target = registry.target_of(&category);
    Ok(TaskEvent {
        status: wire.status,
        category,
        summary: wire.summary,
        target,
    })
}

/// Follows `path` and forwards every complete line. A FIFO is reopened when
/// its writer goes away. Open and read failures are reported as one `Down`
/// until the next successful open, which reports `Up`. The thread ends once
/// the receiver is dropped.
pub(crate) fn spawn_tail(path: PathBuf, from_end: bool, tx: Sender<FeedMsg>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut first_open = true;
        let mut down = false;
        loop {
            let mut file = match File::open(&path) {
                Ok(f) => f,
                Err(err) => {
                    if !down {
                        tracing::warn!(
                            path = %path.display(),
                            error = %err,
                            "cannot open event feed"
                        );
                        down = true;
                        if tx.send(FeedMsg::Down).is_err() {
                            return;
                        }
                    }
                    thread::sleep(REOPEN_DELAY);
                    continue;
                }
            };
            if down {
                down = false;
                if tx.send(FeedMsg::Up).is_err() {
                    return;
                }
            }
            let regular = file.metadata().map(|m| m.is_file()).unwrap_or(false);
            if regular && from_end && first_open {
                if let Err(err) = file.seek(SeekFrom::End(0)) {
                    tracing::warn!(error = %err, "cannot seek event feed");
                }
            }
            first_open = false;
            tracing::info!(path = %path.display(), "following event feed");

            let mut reader = BufReader::new(file);
            let mut line = String::new();
            loop {
                match reader.read_line(&mut line) {
                    Ok(0) if regular => thread::sleep(POLL),
                    Ok(0) => break,
                    Ok(_) => {
                        if !line.ends_with('\n') {
                            continue;
                        }
                        let msg = FeedMsg::Line(line.trim_end().to_string());
                        if tx.send(msg).is_err() {
                            return;
                        }
                        line.clear();
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "event feed read failed");
                        down = true;
                        if tx.send(FeedMsg::Down).is_err() {
                            return;
                        }
                        break;
                    }
                }
            }
            thread::sleep(POLL);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::mpsc;

    #[test]
    fn full_event_decodes() {
        let mut reg = CategoryRegistry::in_memory();
        let ev = parse_line(
            r#"{"status":"working","category":"shopping","summary":"장바구니 확인"}"#,
            &mut reg,
        )
        .unwrap();
        assert_eq!(ev.status, TaskStatus::Working);
        assert_eq!(ev.category, "shopping");
        assert_eq!(ev.summary.as_deref(), Some("장바구니 확인"));
    }

    #[test]
    fn event_carries_the_category_spot() {
        let mut reg = CategoryRegistry::in_memory();
        let ev = parse_line(r#"{"status":"working","category":"gaming"}"#, &mut reg).unwrap();
        assert_eq!(ev.target, Some(Point::new(235.0, 290.0)));
        let ev = parse_line(r#"{"status":"working","category":"knitting"}"#, &mut reg).unwrap();
        assert!(ev.target.is_some());
        let ev = parse_line(r#"{"status":"done"}"#, &mut reg).unwrap();
        assert_eq!(ev.target, None);
    }

    #[test]
    fn missing_category_is_classified_or_other() {
        let mut reg = CategoryRegistry::in_memory();
        let line = r#"{"status":"thinking","summary":"refactor the parser module"}"#;
        let ev = parse_line(line, &mut reg).unwrap();
        assert_eq!(ev.category, "coding");
        let ev = parse_line(r#"{"status":"done","category":""}"#, &mut reg).unwrap();
        assert_eq!(ev.category, OTHER);
    }

    #[test]
    fn unseen_category_is_registered() {
        let mut reg = CategoryRegistry::in_memory();
        let ev = parse_line(r#"{"status":"working","category":" Gardening "}"#, &mut reg).unwrap();
        assert_eq!(ev.category, "gardening");
        assert!(reg.defs().iter().any(|d| d.id == "gardening" && !d.built_in));
    }

    #[test]
    fn malformed_lines_are_rejected() {
        let mut reg = CategoryRegistry::in_memory();
        assert!(matches!(parse_line("   ", &mut reg), Err(FeedError::Blank)));
        assert!(matches!(
            parse_line(r#"{"status":"sleeping"}"#, &mut reg),
            Err(FeedError::Malformed(_))
        ));
        assert!(matches!(parse_line("not json", &mut reg), Err(FeedError::Malformed(_))));
        assert!(parse_line(r#"{"summary":"x"}"#, &mut reg).is_err());
    }

    #[test]
    fn tail_forwards_appended_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let mut f = File::create(&path).unwrap();
        writeln!(f, r#"{{"status":"started"}}"#).unwrap();
        write!(f, r#"{{"status":"#).unwrap();
        f.flush().unwrap();

        let (tx, rx) = mpsc::channel();
        let _handle = spawn_tail(path, false, tx);
        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first, FeedMsg::Line(r#"{"status":"started"}"#.into()));

        writeln!(f, r#""done"}}"#).unwrap();
        f.flush().unwrap();
        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(second, FeedMsg::Line(r#"{"status":"done"}"#.into()));
    }

    #[test]
    fn missing_feed_is_reported_once_until_it_appears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.jsonl");
        let (tx, rx) = mpsc::channel();
        let _handle = spawn_tail(path.clone(), false, tx);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), FeedMsg::Down);

        // several reopen attempts fail in this window without another Down
        thread::sleep(REOPEN_DELAY * 2 + POLL);
        assert!(rx.try_recv().is_err());

        let mut f = File::create(&path).unwrap();
        writeln!(f, r#"{{"status":"started"}}"#).unwrap();
        f.flush().unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), FeedMsg::Up);
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            FeedMsg::Line(r#"{"status":"started"}"#.into())
        );
    }
}
