//! End-to-end requests against a local stand-in for the Gemini endpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use agora_core::{GenerationBackend, GenerationError, GenerationRequest, Role, TranscriptEntry};
use agora_providers::GeminiProvider;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Serve the canned `(status, body)` replies in order, one per connection.
/// Returns the base URL and a counter of handled requests.
async fn serve(replies: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    tokio::spawn(async move {
        for (status, body) in replies {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            counter.fetch_add(1, Ordering::SeqCst);
            let response = format!(
                "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
    });

    (format!("http://{addr}/v1beta"), hits)
}

async fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + content_length {
                return;
            }
        }
    }
}

fn provider(base_url: String) -> GeminiProvider {
    GeminiProvider::new("test-key".to_string(), Duration::from_secs(5))
        .unwrap()
        .with_base_url(base_url)
        .with_retry_delays(vec![Duration::from_millis(10), Duration::from_millis(10)])
}

fn request() -> GenerationRequest {
    GenerationRequest::new(
        "You are Socrates.".to_string(),
        vec![TranscriptEntry {
            role: Role::User,
            text: "What is virtue?".to_string(),
        }],
    )
}

const OK_BODY: &str = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Virtue is knowledge."}]}}]}"#;

#[tokio::test]
async fn test_successful_generation() {
    let (base_url, hits) = serve(vec![(200, OK_BODY)]).await;

    let reply = provider(base_url).generate(&request()).await.unwrap();

    assert_eq!(reply, "Virtue is knowledge.");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let (base_url, hits) = serve(vec![
        (429, r#"{"error":{"message":"quota"}}"#),
        (200, OK_BODY),
    ])
    .await;

    let reply = provider(base_url).generate(&request()).await.unwrap();

    assert_eq!(reply, "Virtue is knowledge.");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalid_request_is_not_retried() {
    let (base_url, hits) = serve(vec![
        (400, r#"{"error":{"message":"API key not valid"}}"#),
        (200, OK_BODY),
    ])
    .await;

    let err = provider(base_url).generate(&request()).await.unwrap_err();

    assert_eq!(
        err,
        GenerationError::InvalidRequest("API key not valid".to_string())
    );
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_persistent_rate_limit_surfaces() {
    let body = r#"{"error":{"message":"quota"}}"#;
    let (base_url, hits) = serve(vec![(429, body), (429, body), (429, body)]).await;

    let err = provider(base_url).generate(&request()).await.unwrap_err();

    assert_eq!(err, GenerationError::RateLimited);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_empty_candidate_is_unknown() {
    let (base_url, _) = serve(vec![(200, r#"{"candidates":[{"content":{"parts":[]}}]}"#)]).await;

    let err = provider(base_url).generate(&request()).await.unwrap_err();

    assert_eq!(err, GenerationError::Unknown("empty response".to_string()));
}
