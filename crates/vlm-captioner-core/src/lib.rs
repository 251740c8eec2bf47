//! VLM Captioner Core - caption images with vision language models.
//!
//! Reads an image, sends it to an OpenAI-compatible chat completion endpoint
//! as a data URL, and returns the model's caption.
//!
//! ```text
//! Image file → bytes → base64 + sniffed MIME → chat request → first choice text
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use tokio_util::sync::CancellationToken;
//! use vlm_captioner_core::Captioner;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), vlm_captioner_core::CaptionError> {
//!     let captioner = Captioner::new("sk-...", "", "");
//!     let caption = captioner.caption(&CancellationToken::new(), "./image.jpg").await?;
//!     println!("{}", caption.trim());
//!     Ok(())
//! }
//! ```

pub mod captioner;
pub mod client;
pub mod error;
pub mod image;
pub mod output;

pub use captioner::{Captioner, DEFAULT_MODEL, MAX_COMPLETION_TOKENS};
pub use client::{ChatClient, ChatCompletionRequest, ChatCompletionResponse, OpenAiClient};
pub use error::{CaptionError, ClientError, Result};
pub use image::{sniff_mime, ImageInput};
pub use output::{CaptionWriter, OutputFormat};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
