use crate::{
    config::get_config,
    constants::ASK_PATH,
    errors::{MedsageError, MedsageResult},
    logging::{log_api_call, ApiCallLog},
};
use chrono::Utc;
use lru::LruCache;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{json, Value};
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Instant;

// Answer cache. The QA service is stateless per question, so a repeat of the
// same question against the same endpoint is answerable locally.
static API_CACHE: Lazy<Mutex<LruCache<String, String>>> = Lazy::new(|| {
    let size = get_config().response_cache_size.max(1);
    Mutex::new(LruCache::new(NonZeroUsize::new(size).unwrap()))
});

/// Sends one question to the QA service and returns its answer.
///
/// The whole exchange is a single `POST <base_url>/ask` with body
/// `{"question": ...}`; the expected reply is `{"answer": ...}`. Non-success
/// statuses, unparsable bodies, and bodies without a usable `answer` string
/// are all distinct errors, never a blank bubble.
pub async fn ask_question(base_url: &str, question: &str) -> MedsageResult<String> {
    let cache_key = format!("{}|{}", base_url, question);
    if let Some(answer) = API_CACHE.lock().unwrap().get(&cache_key) {
        return Ok(answer.clone());
    }

    let url = format!("{}{}", base_url.trim_end_matches('/'), ASK_PATH);
    let payload = json!({ "question": question });

    let started = Instant::now();
    let client = Client::new();
    let response = client
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| MedsageError::transport_error(format!("Request failed: {}", e)))?;

    let status = response.status();
    log_api_call(&ApiCallLog {
        timestamp: Utc::now(),
        endpoint: url,
        request_summary: summarize_question(question),
        response_status: status.as_u16(),
        response_time_ms: started.elapsed().as_millis(),
    });

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(MedsageError::api_error(format!(
            "API returned error: {} - {}",
            status, error_text
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| MedsageError::response_error(format!("Failed to parse API response: {}", e)))?;

    let answer = body["answer"]
        .as_str()
        .ok_or_else(|| MedsageError::response_error("Response missing expected answer field"))?
        .to_string();

    if answer.trim().is_empty() {
        return Err(MedsageError::response_error("Response carried a blank answer"));
    }

    API_CACHE
        .lock()
        .unwrap()
        .put(cache_key, answer.clone());

    Ok(answer)
}

/// Short form of the question for the API call log.
fn summarize_question(question: &str) -> String {
    const MAX_CHARS: usize = 120;
    if question.chars().count() > MAX_CHARS {
        let truncated: String = question.chars().take(MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        question.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn test_ask_question_posts_json_and_parses_answer() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "question": "what is a migraine" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "A **migraine** is a recurring headache."
            })))
            .mount(&mock_server)
            .await;

        let answer = ask_question(&mock_server.uri(), "what is a migraine")
            .await
            .unwrap();
        assert_eq!(answer, "A **migraine** is a recurring headache.");
    }

    #[tokio::test]
    async fn test_ask_question_maps_error_status_to_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let err = ask_question(&mock_server.uri(), "status failure")
            .await
            .unwrap_err();
        assert!(matches!(err, MedsageError::Api { .. }));
    }

    #[tokio::test]
    async fn test_ask_question_rejects_missing_answer_field() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "respuesta": "si" })))
            .mount(&mock_server)
            .await;

        let err = ask_question(&mock_server.uri(), "missing field")
            .await
            .unwrap_err();
        assert!(matches!(err, MedsageError::Response { .. }));
    }

    #[tokio::test]
    async fn test_ask_question_rejects_non_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = ask_question(&mock_server.uri(), "not json")
            .await
            .unwrap_err();
        assert!(matches!(err, MedsageError::Response { .. }));
    }

    #[tokio::test]
    async fn test_ask_question_rejects_blank_answer() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "  " })))
            .mount(&mock_server)
            .await;

        let err = ask_question(&mock_server.uri(), "blank answer")
            .await
            .unwrap_err();
        assert!(matches!(err, MedsageError::Response { .. }));
    }

    #[tokio::test]
    async fn test_ask_question_serves_repeats_from_cache() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "cached" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let first = ask_question(&mock_server.uri(), "repeat me").await.unwrap();
        let second = ask_question(&mock_server.uri(), "repeat me").await.unwrap();
        assert_eq!(first, "cached");
        assert_eq!(second, "cached");
    }

    #[tokio::test]
    async fn test_ask_question_maps_connect_failure_to_transport_error() {
        let err = ask_question("http://127.0.0.1:1", "nobody listening")
            .await
            .unwrap_err();
        assert!(matches!(err, MedsageError::Transport { .. }));
    }
}
