//! Improve a prompt read from stdin.
//!
//! ```text
//! echo "Напиши отзыв о фильме" | RUST_LOG=info cargo run --example improve
//! ```
//!
//! Reads `GIGA_CREDENTIALS` (or `GIGA_ACCESS_TOKEN`), `GIGA_SCOPE` and
//! `GIGA_MODEL` from the environment or a `.env` file.

use std::io::Read;

use prompt_improver::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let mut prompt = String::new();
    std::io::stdin().read_to_string(&mut prompt)?;
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err("empty prompt on stdin".into());
    }

    let client = GigaChatClient::from_env()?;
    let revision = Improver::new(&client, ImproverConfig::default())
        .with_event_handler(&LoggingHandler)
        .revise(prompt)
        .await?;

    eprintln!(
        "{:?}: {} unmet criteria, {} model calls",
        revision.action,
        revision.gaps.len(),
        revision.model_calls
    );
    println!("{}", revision.text());
    Ok(())
}
