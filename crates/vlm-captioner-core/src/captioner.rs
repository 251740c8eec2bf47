//! The captioner: image file in, caption text out.
//!
//! Each call reads one file, builds one chat completion request, sends it
//! through the configured [`ChatClient`], and returns the first choice's
//! text exactly as the model produced it.

use crate::client::{
    ChatClient, ChatCompletionRequest, ChatMessage, ContentPart, OpenAiClient,
};
use crate::error::{CaptionError, ClientError, Result};
use crate::image::ImageInput;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-5";

/// Upper bound on generated caption length.
pub const MAX_COMPLETION_TOKENS: u32 = 300;

const SYSTEM_PROMPT: &str = "You are an image captioning assistant, you provide clear and \
                             concise captions for images. You respond only with the caption.";

const USER_PROMPT: &str =
    "Provide a clear and concise caption suitable for screen readers for the following image:";

/// Generates screen-reader captions through a vision language model.
///
/// Holds no mutable state, so one instance can serve concurrent calls.
pub struct Captioner {
    client: Box<dyn ChatClient>,
    model: String,
}

impl Captioner {
    /// Create a captioner backed by the OpenAI API.
    ///
    /// An empty `base_url` keeps the client's default endpoint and an empty
    /// `model` selects [`DEFAULT_MODEL`]. The API key is passed through as-is.
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Self {
        Self::with_client(OpenAiClient::new(api_key, Some(base_url)), model)
    }

    /// Create a captioner around any chat client.
    pub fn with_client(client: impl ChatClient + 'static, model: &str) -> Self {
        let model = if model.is_empty() {
            DEFAULT_MODEL
        } else {
            model
        };

        Self {
            client: Box::new(client),
            model: model.to_string(),
        }
    }

    /// The model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Caption the image at `image_path`.
    ///
    /// When `cancel` fires before the API answers, the in-flight request is
    /// dropped and the call fails with `ClientError::Canceled`. The returned
    /// text is not trimmed.
    pub async fn caption(
        &self,
        cancel: &CancellationToken,
        image_path: impl AsRef<Path>,
    ) -> Result<String> {
        let path = image_path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| CaptionError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

        let image = ImageInput::from_bytes(&bytes);
        tracing::debug!(
            path = %path.display(),
            bytes = bytes.len(),
            media_type = %image.media_type,
            "Requesting caption"
        );

        let request = self.build_request(&image);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Canceled),
            resp = self.client.create_chat_completion(request) => resp,
        };
        let resp = result.map_err(CaptionError::Completion)?;

        let choice = resp.choices.into_iter().next().ok_or(CaptionError::NoChoices)?;
        Ok(choice.message.content.unwrap_or_default())
    }

    fn build_request(&self, image: &ImageInput) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user_parts(vec![
                    ContentPart::text(USER_PROMPT),
                    ContentPart::image_url(image.data_url()),
                ]),
            ],
            max_completion_tokens: MAX_COMPLETION_TOKENS,
        }
    }
}
