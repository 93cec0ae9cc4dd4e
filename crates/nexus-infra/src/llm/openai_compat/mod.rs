//! OpenAI-compatible LLM provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves OpenAI and OpenRouter via
//! configurable base URLs and factory functions. Uses [`async_openai`] for
//! type-safe request/response handling and built-in SSE streaming, including
//! multimodal user-content parts and the JSON-object response format used
//! by structured auxiliary calls.

pub mod config;
pub mod streaming;

use std::pin::Pin;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
    ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
    ChatCompletionStreamOptions, CreateChatCompletionRequest, ImageUrl, ResponseFormat,
};
use futures_util::Stream;

use nexus_core::llm::provider::LlmProvider;
use nexus_types::llm::{
    CompletionRequest, CompletionResponse, ContentPart, LlmError, MessageContent, MessageRole,
    StreamEvent,
};

use self::config::OpenAiCompatConfig;
use self::streaming::map_openai_stream;

/// Unified provider for any OpenAI-compatible API.
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    /// Create a new OpenAI-compatible provider from a configuration.
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
        }
    }

    /// Create an OpenAI provider.
    ///
    /// Uses `https://api.openai.com/v1` as the base URL.
    pub fn openai(api_key: &str, model: &str) -> Self {
        Self::new(config::openai_defaults(api_key, model))
    }

    /// Create an OpenRouter provider (OpenAI-compatible endpoint).
    ///
    /// Uses `https://openrouter.ai/api/v1` as the base URL.
    pub fn openrouter(api_key: &str, model: &str) -> Self {
        Self::new(config::openrouter_defaults(api_key, model))
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic [`CompletionRequest`].
    fn build_request(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        for msg in &request.messages {
            let oai_msg = match msg.role {
                MessageRole::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage {
                        content: ChatCompletionRequestSystemMessageContent::Text(
                            msg.content.as_text(),
                        ),
                        name: None,
                    },
                ),
                MessageRole::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage {
                        content: build_user_content(&msg.content),
                        name: None,
                    },
                ),
                MessageRole::Assistant => {
                    #[allow(deprecated)]
                    ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessage {
                            content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                                msg.content.as_text(),
                            )),
                            refusal: None,
                            name: None,
                            audio: None,
                            tool_calls: None,
                            function_call: None,
                        },
                    )
                }
            };
            messages.push(oai_msg);
        }

        // Use the model from the request if set, otherwise fall back to config default
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        let mut req = CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        };

        if request.json_object {
            req.response_format = Some(ResponseFormat::JsonObject);
        }

        // Streaming configuration
        if stream {
            req.stream = Some(true);
            req.stream_options = Some(ChatCompletionStreamOptions {
                include_usage: Some(true),
                include_obfuscation: None,
            });
        }

        Ok(req)
    }
}

/// Map a [`MessageContent`] to the OpenAI user-message content shape:
/// plain text stays text, parts become a content-part array.
fn build_user_content(content: &MessageContent) -> ChatCompletionRequestUserMessageContent {
    match content {
        MessageContent::Text(text) => {
            ChatCompletionRequestUserMessageContent::Text(text.clone())
        }
        MessageContent::Parts(parts) => {
            let oai_parts = parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => ChatCompletionRequestUserMessageContentPart::Text(
                        ChatCompletionRequestMessageContentPartText { text: text.clone() },
                    ),
                    ContentPart::ImageUrl { image_url } => {
                        ChatCompletionRequestUserMessageContentPart::ImageUrl(
                            ChatCompletionRequestMessageContentPartImage {
                                image_url: ImageUrl {
                                    url: image_url.url.clone(),
                                    detail: None,
                                },
                            },
                        )
                    }
                })
                .collect();
            ChatCompletionRequestUserMessageContent::Array(oai_parts)
        }
    }
}

// OpenAiCompatibleProvider intentionally does NOT derive Debug to prevent
// accidental exposure of internal state including the API key inside the
// async-openai Client.

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let oai_request = self.build_request(request, false)?;

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        // Extract content from the first choice
        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        // Build the request. If it fails, return a stream that immediately errors.
        let oai_request = match self.build_request(&request, true) {
            Ok(req) => req,
            Err(e) => {
                return Box::pin(futures_util::stream::once(async move { Err(e) }));
            }
        };

        // Clone the client for the 'static stream closure
        let client = self.client.clone();

        Box::pin(async_stream::try_stream! {
            let oai_stream = client
                .chat()
                .create_stream(oai_request)
                .await
                .map_err(map_openai_error)?;

            let mut inner = map_openai_stream(oai_stream);

            use futures_util::StreamExt;
            while let Some(event) = inner.next().await {
                match event {
                    Ok(ev) => yield ev,
                    Err(e) => Err(e)?,
                }
            }
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            // Check for known error types by code or type field
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "authentication_error"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else if code == "server_error" || error_type == "overloaded_error" {
                LlmError::Overloaded(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => {
            if let Some(status) = reqwest_err.status() {
                match status.as_u16() {
                    401 => LlmError::AuthenticationFailed,
                    429 => LlmError::RateLimited {
                        retry_after_ms: None,
                    },
                    529 => LlmError::Overloaded(err.to_string()),
                    _ => LlmError::Provider {
                        message: err.to_string(),
                    },
                }
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::StreamError(stream_err) => LlmError::Stream(stream_err.to_string()),
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_types::llm::Message;

    fn request(messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages,
            max_tokens: 1024,
            temperature: None,
            stream: false,
            json_object: false,
        }
    }

    #[test]
    fn test_openai_factory() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o-mini");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model, "gpt-4o-mini");
    }

    #[test]
    fn test_openrouter_factory() {
        let provider = OpenAiCompatibleProvider::openrouter(
            "or-test",
            config::OPENROUTER_DEFAULT_MODEL,
        );
        assert_eq!(provider.name(), "openrouter");
        assert_eq!(provider.model, "arcee-ai/trinity-large-preview:free");
    }

    #[test]
    fn test_build_request_messages() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o-mini");
        let req = request(vec![
            Message::system("Be helpful"),
            Message::user("Hello"),
            Message::assistant("Hi there!"),
        ]);

        let oai_req = provider.build_request(&req, false).unwrap();
        assert_eq!(oai_req.model, "gpt-4o-mini");
        assert_eq!(oai_req.messages.len(), 3);
        assert_eq!(oai_req.max_completion_tokens, Some(1024));
        assert!(oai_req.stream.is_none());
        assert!(oai_req.stream_options.is_none());
        assert!(oai_req.response_format.is_none());
    }

    #[test]
    fn test_build_request_streaming() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o-mini");
        let mut req = request(vec![Message::user("Hello")]);
        req.stream = true;

        let oai_req = provider.build_request(&req, true).unwrap();
        assert_eq!(oai_req.stream, Some(true));
        let opts = oai_req.stream_options.unwrap();
        assert_eq!(opts.include_usage, Some(true));
    }

    #[test]
    fn test_build_request_json_object_response_format() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o-mini");
        let mut req = request(vec![Message::user("suggestions please")]);
        req.json_object = true;

        let oai_req = provider.build_request(&req, false).unwrap();
        assert!(matches!(
            oai_req.response_format,
            Some(ResponseFormat::JsonObject)
        ));
    }

    #[test]
    fn test_build_request_empty_model_uses_default() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o-mini");
        let mut req = request(vec![]);
        req.model = String::new();

        let oai_req = provider.build_request(&req, false).unwrap();
        assert_eq!(oai_req.model, "gpt-4o-mini");
    }

    #[test]
    fn test_multimodal_user_content_becomes_part_array() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o");
        let req = request(vec![Message::user_parts(vec![
            ContentPart::text("what is this?"),
            ContentPart::image_url("data:image/png;base64,AAAA"),
        ])]);

        let oai_req = provider.build_request(&req, false).unwrap();
        let ChatCompletionRequestMessage::User(user) = &oai_req.messages[0] else {
            panic!("expected user message");
        };
        let ChatCompletionRequestUserMessageContent::Array(parts) = &user.content else {
            panic!("expected content part array");
        };
        assert_eq!(parts.len(), 2);
        assert!(matches!(
            parts[0],
            ChatCompletionRequestUserMessageContentPart::Text(_)
        ));
        let ChatCompletionRequestUserMessageContentPart::ImageUrl(image) = &parts[1] else {
            panic!("expected image part");
        };
        assert_eq!(image.image_url.url, "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_map_openai_error_api_auth() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "Incorrect API key provided".to_string(),
            r#type: Some("authentication_error".to_string()),
            param: None,
            code: None,
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, LlmError::AuthenticationFailed));
    }

    #[test]
    fn test_map_openai_error_rate_limit() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "Rate limit exceeded".to_string(),
            r#type: Some("rate_limit_error".to_string()),
            param: None,
            code: None,
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, LlmError::RateLimited { .. }));
    }

    #[test]
    fn test_map_openai_error_invalid_argument() {
        use async_openai::error::OpenAIError;
        let err = map_openai_error(OpenAIError::InvalidArgument("bad arg".to_string()));
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }
}
