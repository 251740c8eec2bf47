//! vlm-image-captioner - caption images using vision language models.
//!
//! Sends each image to an OpenAI-compatible chat completion API and prints
//! a caption suitable for screen readers.
//!
//! # Usage
//!
//! ```bash
//! # Caption a single image
//! OPENAI_API_KEY=sk-... vlm-image-captioner photo.jpg
//!
//! # Caption several images as CSV
//! vlm-image-captioner --csv a.png b.png > captions.csv
//!
//! # Use a local OpenAI-compatible server
//! OPENAI_BASE_URL=http://localhost:11434/v1 OPENAI_MODEL=llava vlm-image-captioner photo.jpg
//! ```

use clap::Parser;

mod cli;
mod logging;

/// A CLI tool to caption images using vision language models.
#[derive(Parser, Debug)]
#[command(name = "vlm-image-captioner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,

    #[command(flatten)]
    caption: cli::caption::CaptionArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    tracing::debug!("vlm-image-captioner v{}", vlm_captioner_core::VERSION);

    cli::caption::execute(cli.caption).await
}
