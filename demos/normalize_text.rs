//! Text Normalization and Merging
//!
//! The synchronous half of the pipeline: scrub typed text, apply a grammar
//! engine's spans, and scrub again.
//!
//! ```bash
//! cargo run --example normalize_text
//! ```

use std::sync::Arc;

use proofline::{merge, normalize, FrequencySpeller, Highlighter, MatchSpan};

fn main() {
    let samples = [
        "this is  a test .this is another sentence",
        "wait...what happened ,exactly",
        "the NASA launch was lateAnother one is planned",
        "   ",
    ];

    println!("Normalization:\n");
    for raw in samples {
        println!("  {raw:?}");
        println!("  -> {:?}\n", normalize(raw));
    }

    // Spans as a grammar engine would return them for the normalized text
    let text = "I has a apple.";
    let spans = [MatchSpan::new(2, 3, ["have"]), MatchSpan::new(6, 1, ["an"])];
    println!("Merge:\n");
    println!("  {text:?}");
    for span in &spans {
        println!("    {span} -> {:?}", span.best_replacement().unwrap_or(""));
    }
    println!("  -> {:?}\n", normalize(&merge(text, &spans)));

    // Advisory flags on the raw text
    let speller = FrequencySpeller::from_corpus("this is fine and this is good");
    let mut highlighter = Highlighter::new(Arc::new(speller));
    let raw = "Ths is fyne";
    println!("Highlight:\n");
    println!("  {raw:?}");
    match highlighter.highlight(raw) {
        Ok(spans) => {
            for span in spans {
                println!("    {:?} at {}..{}", &raw[span.range()], span.offset, span.offset + span.length);
            }
        }
        Err(err) => println!("    error: {err}"),
    }
}
