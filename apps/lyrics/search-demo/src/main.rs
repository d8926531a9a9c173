//! Lyrics Search Demo - Entry Point
//!
//! Minimal entry point that delegates to the app module.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    lyrics_search::run().await
}
