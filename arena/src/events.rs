//! Per-turn events and the sinks that observe them.
//!
//! Sinks are fire-and-forget: they cannot fail a turn or change what the
//! scheduler does next. I/O errors are logged and swallowed.

use crate::resolver::RejectionKind;
use chess_core::Color;
use serde::Serialize;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TurnOutcome {
    Applied { san: String, uci: String },
    Rejected { reason: RejectionKind, detail: String },
    AgentFailure { error: String },
}

/// What happened on one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnEvent {
    /// 1-based ply number of the attempt.
    pub ply: usize,
    pub side: Color,
    pub agent: String,
    /// Completion text as received; absent when the gateway failed.
    pub raw_text: Option<String>,
    pub outcome: TurnOutcome,
    /// FEN after the turn.
    pub board_snapshot: String,
}

pub trait EventSink {
    fn record(&mut self, event: &TurnEvent);
}

/// Reports events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&mut self, event: &TurnEvent) {
        let raw = event.raw_text.as_deref().unwrap_or("");
        match &event.outcome {
            TurnOutcome::Applied { san, .. } => {
                info!(ply = event.ply, side = %event.side, agent = %event.agent, san = %san, "move applied");
            }
            TurnOutcome::Rejected { reason, detail } => {
                warn!(
                    ply = event.ply,
                    side = %event.side,
                    agent = %event.agent,
                    raw = %raw,
                    reason = %reason,
                    "move rejected: {detail}"
                );
            }
            TurnOutcome::AgentFailure { error } => {
                warn!(ply = event.ply, side = %event.side, agent = %event.agent, "agent failed: {error}");
            }
        }
    }
}

/// Writes each event as one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: &TurnEvent) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn record(&mut self, event: &TurnEvent) {
        if let Err(err) = self.write_event(event) {
            warn!(ply = event.ply, "could not write event: {err}");
        }
    }
}

/// Keeps events in memory; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Rc<RefCell<Vec<TurnEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TurnEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, event: &TurnEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> TurnEvent {
        TurnEvent {
            ply: 1,
            side: Color::White,
            agent: "script".to_string(),
            raw_text: Some("e4".to_string()),
            outcome: TurnOutcome::Applied {
                san: "e4".to_string(),
                uci: "e2e4".to_string(),
            },
            board_snapshot: "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
                .to_string(),
        }
    }

    #[test]
    fn test_json_lines() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.record(&event());
        sink.record(&TurnEvent {
            ply: 2,
            side: Color::Black,
            raw_text: Some("Qh5".to_string()),
            outcome: TurnOutcome::Rejected {
                reason: RejectionKind::IllegalMove,
                detail: "no legal move matches \"Qh5\"".to_string(),
            },
            ..event()
        });

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["side"], "white");
        assert_eq!(lines[0]["outcome"]["kind"], "applied");
        assert_eq!(lines[0]["outcome"]["san"], "e4");
        assert_eq!(lines[1]["outcome"]["kind"], "rejected");
        assert_eq!(lines[1]["outcome"]["reason"], "illegal-move");
        assert_eq!(lines[1]["raw_text"], "Qh5");
    }

    #[test]
    fn test_memory_sink_clones_share_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.record(&event());

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.events()[0], event());
    }
}
