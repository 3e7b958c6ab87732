//! Mock API tests for the OpenAI-backed capabilities
//!
//! These tests run the real HTTP clients against a local wiremock server.

use serde_json::json;
use std::sync::Arc;
use subtool::transcribe::{Transcriber, WhisperClient};
use subtool::translate::{OpenAiTranslator, TranslationPipeline, Translator};
use subtool::SubtoolError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_reply(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo-0125",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

// ============================================================================
// Chat translation
// ============================================================================

mod translator_tests {
    use super::*;

    #[tokio::test]
    async fn test_translate_returns_trimmed_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(
                "\n1\n00:00:00,000 --> 00:00:01,000\nHej\n  ",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let translator = OpenAiTranslator::new("sk-test".to_string())
            .with_base_url(format!("{}/v1", server.uri()));
        let result = translator
            .translate("Swedish", "1\n00:00:00,000 --> 00:00:01,000\nHello\n")
            .await
            .unwrap();

        assert_eq!(result, "1\n00:00:00,000 --> 00:00:01,000\nHej");
    }

    #[tokio::test]
    async fn test_translate_request_carries_language_and_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("ok")))
            .mount(&server)
            .await;

        let translator = OpenAiTranslator::new("sk-test".to_string())
            .with_base_url(format!("{}/v1", server.uri()));
        translator.translate("French", "batch text").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo-0125");
        assert!(body["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("into French"));
        assert_eq!(body["messages"][1]["content"], "batch text");
    }

    #[tokio::test]
    async fn test_translate_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
            })))
            .mount(&server)
            .await;

        let translator = OpenAiTranslator::new("sk-bad".to_string())
            .with_base_url(format!("{}/v1", server.uri()));
        let result = translator.translate("German", "hello").await;

        match result {
            Err(SubtoolError::Api(msg)) => assert!(msg.contains("Incorrect API key")),
            other => panic!("Expected Api error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pipeline_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(
                "1\n00:00:00,000 --> 00:00:01,000\nHej",
            )))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("movie.srt");
        let blocks: String = (1..=6)
            .map(|i| format!("{}\n00:00:0{},000 --> 00:00:0{},900\nHello {}\n\n", i, i, i, i))
            .collect();
        std::fs::write(&source, blocks).unwrap();

        let translator: Arc<dyn Translator> = Arc::new(
            OpenAiTranslator::new("sk-test".to_string())
                .with_base_url(format!("{}/v1", server.uri())),
        );
        let pipeline = TranslationPipeline::new(Some(translator)).with_progress(false);
        let output = pipeline.translate(&source, "Swedish").await.unwrap();

        let written = std::fs::read_to_string(output).unwrap();
        assert_eq!(
            written,
            "1\n00:00:00,000 --> 00:00:01,000\nHej\n\n1\n00:00:00,000 --> 00:00:01,000\nHej\n"
        );
    }
}

// ============================================================================
// Whisper transcription
// ============================================================================

mod whisper_tests {
    use super::*;

    fn fake_audio() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("audio.wav");
        std::fs::write(&audio, b"RIFF....WAVEfmt ").unwrap();
        (dir, audio)
    }

    #[tokio::test]
    async fn test_transcribe_segments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "task": "transcribe",
                "language": "english",
                "duration": 2.0,
                "text": "Hi there",
                "segments": [
                    { "id": 0, "start": 0.0, "end": 1.2, "text": " Hi" },
                    { "id": 1, "start": 1.2, "end": 2.0, "text": " there" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, audio) = fake_audio();
        let client = WhisperClient::new("sk-test".to_string())
            .with_base_url(format!("{}/v1", server.uri()));
        let segments = client.transcribe(&audio, Some("en")).await.unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].end, 1.2);
        assert_eq!(segments[1].text, " there");
        assert_eq!(client.name(), "OpenAI Whisper");
    }

    #[tokio::test]
    async fn test_transcribe_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let (_dir, audio) = fake_audio();
        let client = WhisperClient::new("sk-test".to_string())
            .with_base_url(format!("{}/v1", server.uri()));
        let result = client.transcribe(&audio, None).await;

        match result {
            Err(SubtoolError::Api(msg)) => assert!(msg.contains("upstream exploded")),
            other => panic!("Expected Api error, got: {:?}", other),
        }
    }
}
