use chat_api::instructions::{INSTRUCTIONS_EN, INSTRUCTIONS_ZH};
use chat_api::{ChatCompletionRequest, ChatRole, RelayGenerateRequest};
use generation_provider::{ConnectionSettings, GenerationRequest, Language, TransportMode};
use serde_json::json;

fn request(language: Language) -> GenerationRequest {
    GenerationRequest::new(
        "Hello world",
        language,
        " m1 ",
        ConnectionSettings {
            credential: "sk-1".to_owned(),
            endpoint: "https://api.example.com".to_owned(),
            transport_mode: TransportMode::Client,
        },
    )
}

#[test]
fn chat_completion_payload_carries_language_instructions_then_text() {
    let payload = ChatCompletionRequest::for_generation(&request(Language::Zh));

    assert_eq!(payload.model, "m1");
    assert!(payload.stream);
    assert_eq!(payload.messages.len(), 2);
    assert_eq!(payload.messages[0].role, ChatRole::System);
    assert_eq!(payload.messages[0].content, INSTRUCTIONS_ZH);
    assert_eq!(payload.messages[1].role, ChatRole::User);
    assert_eq!(payload.messages[1].content, "Hello world");

    let english = ChatCompletionRequest::for_generation(&request(Language::En));
    assert_eq!(english.messages[0].content, INSTRUCTIONS_EN);
}

#[test]
fn chat_completion_payload_serializes_wire_shape() {
    let payload = ChatCompletionRequest::for_generation(&request(Language::En));
    let value = serde_json::to_value(&payload).expect("payload should serialize");

    assert_eq!(value["model"], "m1");
    assert_eq!(value["stream"], true);
    assert_eq!(value["messages"][0]["role"], "system");
    assert_eq!(value["messages"][1]["role"], "user");
    assert!(value.get("temperature").is_none());
}

#[test]
fn relay_payload_serializes_text_lang_model() {
    let payload = RelayGenerateRequest::for_generation(&request(Language::En));
    let value = serde_json::to_value(&payload).expect("payload should serialize");

    assert_eq!(
        value,
        json!({
            "text": "Hello world",
            "lang": "en",
            "model": "m1",
        })
    );
}
