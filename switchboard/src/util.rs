//! Small convenience constructors for common types.

use crate::{ChatRequest, ContentPart, Message, Messages, ProviderId, providers};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::system(content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::user(content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::assistant(content)
}

/// A user turn carrying text plus one image.
pub fn image_message(text: impl Into<String>, image_url: impl Into<String>) -> Message {
    let text = text.into();
    Message::user(text.clone())
        .with_parts(vec![ContentPart::text(text), ContentPart::image(image_url)])
}

pub fn request(model: impl Into<String>, messages: impl Into<Messages>) -> ChatRequest {
    ChatRequest::new(model, messages)
}

pub fn streaming_request(model: impl Into<String>, messages: impl Into<Messages>) -> ChatRequest {
    ChatRequest::new(model, messages).enable_streaming()
}

/// Maps a provider name or common alias to its canonical identifier.
pub fn parse_provider_id(value: &str) -> Option<ProviderId> {
    let canonical = match value.trim().to_ascii_lowercase().as_str() {
        "openai" | "azure" | "azure-openai" => providers::OPENAI,
        "openrouter" | "open-router" | "open_router" => providers::OPENROUTER,
        "oneapi" | "one-api" | "one_api" => providers::ONEAPI,
        "moonshot" | "kimi" => providers::MOONSHOT,
        "dashscope" | "qwen" | "aliyun" => providers::DASHSCOPE,
        "wenxin" | "ernie" | "baidu" => providers::WENXIN,
        "xunfei" | "spark" => providers::XUNFEI,
        "anthropic" | "claude" => providers::ANTHROPIC,
        "google" | "gemini" => providers::GOOGLE,
        "zhipu" | "glm" => providers::ZHIPU,
        "sensenova" => providers::SENSENOVA,
        "tencent" | "hunyuan" => providers::TENCENT,
        "baichuan" => providers::BAICHUAN,
        "360" | "gpt360" => providers::GPT360,
        "sky" => providers::SKY,
        _ => return None,
    };
    Some(ProviderId::from(canonical))
}

#[cfg(test)]
mod tests {
    use crate::{ContentPart, ProviderId, Role, providers};

    use super::{image_message, parse_provider_id, request, streaming_request, user_message};

    #[test]
    fn parse_provider_id_supports_aliases() {
        assert_eq!(parse_provider_id("openai"), Some(ProviderId::from(providers::OPENAI)));
        assert_eq!(parse_provider_id(" Kimi "), Some(ProviderId::from(providers::MOONSHOT)));
        assert_eq!(parse_provider_id("claude"), Some(ProviderId::from(providers::ANTHROPIC)));
        assert_eq!(parse_provider_id("unknown"), None);
    }

    #[test]
    fn message_and_request_helpers_apply_expected_defaults() {
        let message = user_message("hello");
        assert_eq!(message.role, Role::User);

        let image = image_message("what is this", "https://img/1.png");
        assert!(matches!(image.parts[1], ContentPart::ImageUrl { .. }));

        assert!(!request("gpt-4o", vec![message.clone()]).stream);
        assert!(streaming_request("gpt-4o", vec![message]).stream);
    }
}
