//! Live Session
//!
//! Simulates someone typing into an editor and prints every output update.
//! The grammar engine is a toy that fixes "a" before vowels; build with the
//! `languagetool` feature and set `LANGUAGETOOL_URL` to use a real server.
//!
//! ```bash
//! RUST_LOG=proofline=debug cargo run --example live_session
//! LANGUAGETOOL_URL=http://localhost:8081 cargo run --example live_session --features languagetool
//! ```

use std::sync::Arc;
use std::time::Duration;

use proofline::{Config, FrequencySpeller, GrammarEngine, MatchSpan, Result, Session};
use tracing_subscriber::EnvFilter;

/// Suggests "an" for "a" before a word starting with a vowel.
struct ArticleChecker;

impl GrammarEngine for ArticleChecker {
    fn check(&self, text: &str, _locale: &str) -> Result<Vec<MatchSpan>> {
        let spans = text
            .match_indices(" a ")
            .filter(|&(at, _)| {
                text[at + 3..]
                    .chars()
                    .next()
                    .is_some_and(|c| "aeiouAEIOU".contains(c))
            })
            .map(|(at, _)| {
                MatchSpan::new(at + 1, 1, ["an"])
                    .with_message("Use \"an\" before a vowel sound")
                    .with_rule_id("A_VS_AN")
            })
            .collect();
        Ok(spans)
    }
}

#[cfg(feature = "languagetool")]
fn grammar_engine(timeout: Duration) -> Arc<dyn GrammarEngine> {
    let Ok(url) = std::env::var("LANGUAGETOOL_URL") else {
        return Arc::new(ArticleChecker);
    };
    match proofline::LanguageToolClient::new(&url, timeout) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            tracing::warn!(error = %err, "falling back to toy checker");
            Arc::new(ArticleChecker)
        }
    }
}

#[cfg(not(feature = "languagetool"))]
fn grammar_engine(_timeout: Duration) -> Arc<dyn GrammarEngine> {
    Arc::new(ArticleChecker)
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()?;

    let config = Config::default().with_debounce(Duration::from_millis(300));
    // The blocking HTTP client must be built off the async threads.
    let timeout = config.analysis_timeout();
    let grammar = tokio::task::spawn_blocking(move || grammar_engine(timeout)).await?;
    let speller = FrequencySpeller::from_corpus(
        "i ate an apple and this is fine. the apple was good and i liked it",
    );

    let handle = Session::spawn(config, grammar, Arc::new(speller))?;
    let mut updates = handle.subscribe();

    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let out = updates.borrow_and_update().clone();
            println!("{:<18} {:?}  flags={:?}", format!("{:?}", out.status), out.corrected_text, out.advisory_spans);
        }
    });

    // Typing bursts separated by pauses
    let mut typed = String::new();
    for word in ["i ", "ate ", "a ", "apple ", "ths ", "is ", "fyne"] {
        typed.push_str(word);
        handle.edit(typed.clone())?;
        tokio::time::sleep(Duration::from_millis(120)).await;
    }
    tokio::time::sleep(Duration::from_millis(600)).await;

    handle.edit(format!("{typed} ,and good"))?;
    handle.analyze_now()?;
    tokio::time::sleep(Duration::from_millis(300)).await;

    handle.clear()?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    handle.shutdown();
    drop(handle);
    printer.await?;
    Ok(())
}
