//! Live editing session.
//!
//! Wires the [`Debouncer`], [`Pipeline`] and [`Highlighter`] to a stream of
//! edit notifications and publishes the results.
//!
//! ## Tasks
//!
//! ```text
//!              SessionHandle::edit / analyze_now / clear
//!                              │ mpsc
//!                              v
//!   ┌────────────── event loop (one task) ──────────────┐
//!   │ debouncer deadline ──> plan ──> spawn_blocking ───┼──> grammar engine
//!   │                                  │ result (mpsc)  │
//!   │ finish <─────────────────────────┘                │
//!   └──────┬──────────────────────────────┬─────────────┘
//!          │ latest raw text (watch)      │ corrected text, status
//!          v                              v
//!   highlighter task ──────────────> watch<Output> ──> presentation layer
//! ```
//!
//! The event loop is the only place session state changes, so edits,
//! deadlines and results never race. Engine calls run on Tokio's blocking
//! pool with a timeout; while one is outstanding no other analysis starts.
//!
//! ## Stale Results
//!
//! Each analysis gets a generation number. A result is applied only if its
//! generation is newer than the last one applied, and [`SessionHandle::clear`]
//! advances the applied generation so an analysis started before the clear
//! cannot repopulate the output.
//!
//! ## Failures
//!
//! Grammar engine errors, timeouts and worker panics never reach the caller.
//! They become [`Status::Error`] and the previously published corrected text
//! stays as it was. Spelling engine errors are only logged: the advisory
//! spans keep their last value and the status is left to the grammar path.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::{
    AdvisorySpan, Config, DebounceState, Debouncer, Error, GrammarEngine, Highlighter, MatchSpan,
    Pipeline, Plan, Result, SpellEngine,
};

/// Coarse state shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Status {
    /// Nothing has happened yet.
    #[default]
    Ready,
    /// Edits arrived; analysis is waiting for a quiet period.
    Typing,
    /// The grammar engine is working.
    Checking,
    /// The corrected text reflects the current input.
    Corrected,
    /// Input and outputs were cleared.
    Cleared,
    /// An immediate analysis was requested for blank input.
    NothingToCorrect,
    /// The last analysis failed; outputs are from the last good cycle.
    Error(String),
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Output {
    /// Scrubbed text from the last completed analysis.
    pub corrected_text: String,
    /// Likely misspellings in the current raw input.
    pub advisory_spans: Vec<AdvisorySpan>,
    /// Current status.
    pub status: Status,
}

#[derive(Debug)]
enum Command {
    Edit(String),
    AnalyzeNow,
    Clear,
    Shutdown,
}

#[derive(Debug)]
struct Analysis {
    generation: u64,
    raw: String,
    normalized: String,
    result: Result<Vec<MatchSpan>>,
}

/// Entry point for starting sessions.
#[derive(Debug)]
pub struct Session;

impl Session {
    /// Start a session on the current Tokio runtime.
    ///
    /// The session runs until [`SessionHandle::shutdown`] is called or every
    /// handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails validation.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(
        config: Config,
        grammar: Arc<dyn GrammarEngine>,
        speller: Arc<dyn SpellEngine>,
    ) -> Result<SessionHandle> {
        config.validate()?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = watch::channel(Output::default());
        let output_tx = Arc::new(output_tx);

        let highlight_tx = config.highlight.then(|| {
            let (text_tx, text_rx) = watch::channel(String::new());
            tokio::spawn(run_highlighter(
                Highlighter::new(speller),
                text_rx,
                Arc::clone(&output_tx),
            ));
            text_tx
        });

        let event_loop = EventLoop {
            pipeline: Pipeline::new(grammar, config.locale.clone()),
            debouncer: Debouncer::new(config.debounce()),
            timeout: config.analysis_timeout(),
            current: String::new(),
            generation: 0,
            applied: 0,
            commands: command_rx,
            results: result_rx,
            result_tx,
            output: output_tx,
            highlight: highlight_tx,
        };
        tokio::spawn(event_loop.run());

        Ok(SessionHandle {
            commands: command_tx,
            output: output_rx,
        })
    }
}

/// Cloneable handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    output: watch::Receiver<Output>,
}

impl SessionHandle {
    /// Notify the session that the document now reads `text`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session has stopped.
    pub fn edit(&self, text: impl Into<String>) -> Result<()> {
        self.send(Command::Edit(text.into()))
    }

    /// Analyze the current text now instead of waiting for the quiet period.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session has stopped.
    pub fn analyze_now(&self) -> Result<()> {
        self.send(Command::AnalyzeNow)
    }

    /// Clear the document and both outputs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the session has stopped.
    pub fn clear(&self) -> Result<()> {
        self.send(Command::Clear)
    }

    /// Stop the session. Later calls on any handle fail with
    /// [`Error::SessionClosed`].
    pub fn shutdown(&self) {
        // Already stopped is fine.
        let _ = self.commands.send(Command::Shutdown);
    }

    /// Snapshot of the latest output.
    #[must_use]
    pub fn output(&self) -> Output {
        self.output.borrow().clone()
    }

    /// A receiver that is notified whenever the output changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Output> {
        self.output.clone()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|_| Error::SessionClosed)
    }
}

struct EventLoop {
    pipeline: Pipeline,
    debouncer: Debouncer,
    timeout: std::time::Duration,
    current: String,
    generation: u64,
    applied: u64,
    commands: mpsc::UnboundedReceiver<Command>,
    results: mpsc::UnboundedReceiver<Analysis>,
    result_tx: mpsc::UnboundedSender<Analysis>,
    output: Arc<watch::Sender<Output>>,
    highlight: Option<watch::Sender<String>>,
}

impl EventLoop {
    async fn run(mut self) {
        loop {
            let next_fire = self.debouncer.next_fire();
            let wake = next_fire.unwrap_or_else(Instant::now);

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Edit(text)) => self.on_edit(text),
                    Some(Command::AnalyzeNow) => self.on_analyze_now(),
                    Some(Command::Clear) => self.on_clear(),
                    Some(Command::Shutdown) | None => break,
                },
                Some(analysis) = self.results.recv() => self.on_result(analysis),
                () = sleep_until(wake), if next_fire.is_some() => {
                    if self.debouncer.poll_fire(Instant::now()) {
                        self.start_cycle();
                    }
                }
            }
        }
        debug!("session stopped");
    }

    fn on_edit(&mut self, text: String) {
        if text == self.current {
            return;
        }
        self.current = text;
        self.debouncer.notify(Instant::now());
        self.set_status(Status::Typing);
        if let Some(highlight) = &self.highlight {
            highlight.send_replace(self.current.clone());
        }
    }

    fn on_analyze_now(&mut self) {
        if self.current.trim().is_empty() {
            self.set_status(Status::NothingToCorrect);
            return;
        }
        self.debouncer.trigger(Instant::now());
    }

    fn on_clear(&mut self) {
        self.current.clear();
        self.debouncer.cancel();
        self.pipeline.reset();
        // Anything already in flight is now stale.
        self.applied = self.generation;
        if let Some(highlight) = &self.highlight {
            highlight.send_replace(String::new());
        }
        self.output.send_replace(Output {
            status: Status::Cleared,
            ..Output::default()
        });
    }

    fn start_cycle(&mut self) {
        let raw = self.current.clone();
        match self.pipeline.plan(&raw) {
            Plan::Blank => {
                self.debouncer.complete();
                self.pipeline.reset();
                self.output.send_modify(|out| {
                    out.corrected_text.clear();
                    out.advisory_spans.clear();
                    out.status = Status::Ready;
                });
            }
            Plan::Unchanged => {
                debug!("input unchanged since last analysis, skipping");
                self.debouncer.complete();
                self.set_status(Status::Corrected);
            }
            Plan::Analyze { normalized } => {
                self.generation += 1;
                debug!(generation = self.generation, len = normalized.len(), "starting analysis");
                self.set_status(Status::Checking);
                self.spawn_check(raw, normalized);
            }
        }
    }

    fn spawn_check(&self, raw: String, normalized: String) {
        let generation = self.generation;
        let grammar = self.pipeline.grammar();
        let locale = self.pipeline.locale().to_string();
        let limit = self.timeout;
        let results = self.result_tx.clone();

        tokio::spawn(async move {
            let text = normalized.clone();
            let call = tokio::task::spawn_blocking(move || grammar.check(&text, &locale));
            let result = match tokio::time::timeout(limit, call).await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(Error::WorkerPanicked),
                Err(_) => Err(Error::Timeout(limit)),
            };
            // The loop may have shut down; nothing left to report to.
            let _ = results.send(Analysis {
                generation,
                raw,
                normalized,
                result,
            });
        });
    }

    fn on_result(&mut self, analysis: Analysis) {
        self.debouncer.complete();

        if analysis.generation <= self.applied {
            debug!(generation = analysis.generation, "discarding stale analysis");
            return;
        }

        match analysis.result {
            Ok(spans) => {
                let corrected = self.pipeline.finish(&analysis.raw, &analysis.normalized, &spans);
                self.applied = analysis.generation;
                // Edits that arrived mid-flight are still waiting their turn.
                let status = match self.debouncer.state() {
                    DebounceState::PendingAt(_) => Status::Typing,
                    DebounceState::Idle => Status::Corrected,
                };
                self.output.send_modify(|out| {
                    out.corrected_text = corrected;
                    out.status = status;
                });
            }
            Err(err) => {
                warn!(generation = analysis.generation, error = %err, "analysis failed");
                self.set_status(Status::Error(err.to_string()));
            }
        }
    }

    fn set_status(&self, status: Status) {
        self.output.send_if_modified(|out| {
            if out.status == status {
                false
            } else {
                out.status = status;
                true
            }
        });
    }
}

async fn run_highlighter(
    mut highlighter: Highlighter,
    mut texts: watch::Receiver<String>,
    output: Arc<watch::Sender<Output>>,
) {
    while texts.changed().await.is_ok() {
        let text = texts.borrow_and_update().clone();

        if text.trim().is_empty() {
            output.send_modify(|out| out.advisory_spans.clear());
            continue;
        }

        let job = {
            let text = text.clone();
            tokio::task::spawn_blocking(move || {
                let spans = highlighter.highlight(&text);
                (highlighter, spans)
            })
        };
        let (returned, spans) = match job.await {
            Ok(done) => done,
            Err(err) => {
                warn!(error = %err, "highlighter worker stopped");
                return;
            }
        };
        highlighter = returned;

        // A newer edit supersedes this result; the loop picks it up next.
        if *texts.borrow() != text {
            continue;
        }

        match spans {
            Ok(spans) => output.send_modify(|out| out.advisory_spans = spans),
            // The grammar path owns the status; keep the previous spans.
            Err(err) => warn!(error = %err, "spelling check failed, keeping previous flags"),
        }
    }
}
