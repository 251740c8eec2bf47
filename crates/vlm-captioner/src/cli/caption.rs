//! Caption the images named on the command line.

use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use vlm_captioner_core::{CaptionWriter, Captioner, OutputFormat};

/// Arguments for captioning.
#[derive(Args, Debug)]
pub struct CaptionArgs {
    /// Image files to caption
    #[arg(required = true, value_name = "IMAGE_PATHS")]
    pub images: Vec<PathBuf>,

    /// Output as CSV
    #[arg(short, long)]
    pub csv: bool,

    /// Per-image deadline in seconds (no deadline by default)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// API key for the OpenAI-compatible endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, default_value = "")]
    pub api_key: String,

    /// Override the API base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,

    /// Override the model identifier
    #[arg(long, env = "OPENAI_MODEL")]
    pub model: Option<String>,
}

/// Outcome counts for a captioning run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Execute the caption command.
pub async fn execute(args: CaptionArgs) -> anyhow::Result<()> {
    let captioner = Captioner::new(
        &args.api_key,
        args.base_url.as_deref().unwrap_or(""),
        args.model.as_deref().unwrap_or(""),
    );
    tracing::debug!(model = captioner.model(), "Captioner ready");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, canceling outstanding requests");
            signal_token.cancel();
        }
    });

    let format = if args.csv {
        OutputFormat::Csv
    } else {
        OutputFormat::Text
    };
    let mut writer = CaptionWriter::new(std::io::stdout(), format, args.images.len() > 1);

    let summary = caption_all(
        &captioner,
        &args.images,
        args.timeout.map(Duration::from_secs),
        &shutdown,
        &mut writer,
    )
    .await?;
    writer.finish()?;

    if args.images.len() > 1 {
        tracing::info!(
            "Captioned {} image(s), {} failed",
            summary.succeeded,
            summary.failed
        );
    }
    Ok(())
}

/// Caption each image in order, skipping the ones that fail.
///
/// Captions are trimmed before being written. Only output errors abort the run.
pub(crate) async fn caption_all<W: Write>(
    captioner: &Captioner,
    images: &[PathBuf],
    timeout: Option<Duration>,
    shutdown: &CancellationToken,
    writer: &mut CaptionWriter<W>,
) -> anyhow::Result<RunSummary> {
    let mut summary = RunSummary::default();

    for path in images {
        if shutdown.is_cancelled() {
            tracing::warn!("Skipping {} (interrupted)", path.display());
            summary.failed += 1;
            continue;
        }

        let token = shutdown.child_token();
        let deadline = timeout.map(|d| spawn_deadline(token.clone(), d));
        let result = captioner.caption(&token, path).await;
        if let Some(handle) = deadline {
            handle.abort();
        }

        match result {
            Ok(caption) => {
                writer.write(path, caption.trim())?;
                summary.succeeded += 1;
            }
            Err(e) => {
                tracing::error!("failed to get caption for {}: {e}", path.display());
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

fn spawn_deadline(token: CancellationToken, after: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        tracing::debug!("Deadline of {after:?} reached");
        token.cancel();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use vlm_captioner_core::client::{ContentPart, MessageContent};
    use vlm_captioner_core::{
        ChatClient, ChatCompletionRequest, ChatCompletionResponse, ClientError, ImageInput,
    };

    /// Answers with a caption keyed on the request's image data URL, or an error.
    struct ScriptedClient {
        captions: HashMap<String, Option<String>>,
    }

    impl ScriptedClient {
        fn new(entries: &[(&str, Option<&str>)]) -> Self {
            let captions = entries
                .iter()
                .map(|(content, caption)| {
                    let url = ImageInput::from_bytes(content.as_bytes()).data_url();
                    (url, caption.map(String::from))
                })
                .collect();
            Self { captions }
        }
    }

    fn image_url(request: &ChatCompletionRequest) -> Option<&str> {
        request.messages.iter().find_map(|m| match &m.content {
            MessageContent::Parts(parts) => parts.iter().find_map(|p| match p {
                ContentPart::ImageUrl { image_url } => Some(image_url.url.as_str()),
                ContentPart::Text { .. } => None,
            }),
            MessageContent::Text(_) => None,
        })
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn create_chat_completion(
            &self,
            request: ChatCompletionRequest,
        ) -> Result<ChatCompletionResponse, ClientError> {
            let caption = image_url(&request).and_then(|url| self.captions.get(url).cloned());
            match caption.flatten() {
                Some(caption) => Ok(ChatCompletionResponse::from_texts([caption])),
                None => Err(ClientError::Other("model unavailable".into())),
            }
        }
    }

    /// Never answers.
    struct StalledClient;

    #[async_trait]
    impl ChatClient for StalledClient {
        async fn create_chat_completion(
            &self,
            _request: ChatCompletionRequest,
        ) -> Result<ChatCompletionResponse, ClientError> {
            std::future::pending().await
        }
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn test_failures_are_skipped_and_captions_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(&dir, "good.png", b"good-image");
        let bad = write_file(&dir, "bad.png", b"bad-image");
        let missing = dir.path().join("missing.png");

        let client = ScriptedClient::new(&[
            ("good-image", Some("  A good caption.\n")),
            ("bad-image", None),
        ]);
        let captioner = Captioner::with_client(client, "test-model");

        let mut buffer = Vec::new();
        let summary = {
            let mut writer = CaptionWriter::new(&mut buffer, OutputFormat::Csv, true);
            let summary = caption_all(
                &captioner,
                &[good.clone(), bad, missing],
                None,
                &CancellationToken::new(),
                &mut writer,
            )
            .await
            .unwrap();
            writer.finish().unwrap();
            summary
        };

        assert_eq!(
            summary,
            RunSummary {
                succeeded: 1,
                failed: 2
            }
        );
        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(
            output,
            format!("imagepath,caption\n{},A good caption.\n", good.display())
        );
    }

    #[tokio::test]
    async fn test_single_image_text_output() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_file(&dir, "cat.jpg", b"cat");
        let captioner =
            Captioner::with_client(ScriptedClient::new(&[("cat", Some("A cat.\n"))]), "m");

        let mut buffer = Vec::new();
        {
            let mut writer = CaptionWriter::new(&mut buffer, OutputFormat::Text, false);
            caption_all(
                &captioner,
                &[image],
                None,
                &CancellationToken::new(),
                &mut writer,
            )
            .await
            .unwrap();
            writer.finish().unwrap();
        }

        assert_eq!(String::from_utf8(buffer).unwrap(), "A cat.\n");
    }

    #[tokio::test]
    async fn test_timeout_cancels_stalled_request() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_file(&dir, "slow.png", b"slow");
        let captioner = Captioner::with_client(StalledClient, "m");

        let mut buffer = Vec::new();
        let summary = {
            let mut writer = CaptionWriter::new(&mut buffer, OutputFormat::Text, false);
            tokio::time::timeout(
                Duration::from_secs(10),
                caption_all(
                    &captioner,
                    &[image],
                    Some(Duration::from_millis(50)),
                    &CancellationToken::new(),
                    &mut writer,
                ),
            )
            .await
            .expect("deadline should cancel the request")
            .unwrap()
        };

        assert_eq!(summary.failed, 1);
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn test_interrupted_run_skips_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let image = write_file(&dir, "a.png", b"a");
        let captioner = Captioner::with_client(ScriptedClient::new(&[("a", Some("A."))]), "m");
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let mut buffer = Vec::new();
        let summary = {
            let mut writer = CaptionWriter::new(&mut buffer, OutputFormat::Text, true);
            caption_all(&captioner, &[image.clone(), image], None, &shutdown, &mut writer)
                .await
                .unwrap()
        };

        assert_eq!(
            summary,
            RunSummary {
                succeeded: 0,
                failed: 2
            }
        );
    }
}
