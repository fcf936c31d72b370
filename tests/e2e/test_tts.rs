use crate::e2e::helpers;

use helpers::TestContext;
use hyper::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::Ordering;
use test_context::test_context;
use tts_server::domain::tts::TtsResponse;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "text": "   ", "lang": "zh" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Text cannot be empty");
    assert!(ctx.output_files().is_empty());
    assert_eq!(ctx.loader.loads.load(Ordering::SeqCst), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_missing_text_field(ctx: &TestContext) {
    let response = ctx.client.post("/api/tts", &json!({ "lang": "en" })).await.unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Text cannot be empty");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_out_of_range_speed(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "text": "Hello world", "lang": "en", "speed": 3.0 }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Speed must be between");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_chinese_and_serve_the_file(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "text": "你好。世界！", "lang": "zh" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let result: TtsResponse = response.json().unwrap();
    assert!(result.file.starts_with("tts_"));
    assert!(result.file.ends_with(".wav"));
    assert_eq!(response.body.as_ref().unwrap().get("lang"), Some(&json!("zh")));
    assert_eq!(ctx.output_files(), vec![result.file.clone()]);

    let download = ctx.client.get(&format!("/api/tts/{}", result.file)).await.unwrap();
    download
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "audio/wav")
        .assert_header(
            "content-disposition",
            &format!("attachment; filename=\"{}\"", result.file),
        );
    assert_eq!(
        download.header("content-length"),
        Some(&download.body_bytes.len().to_string())
    );
    assert_eq!(&download.body_bytes[..4], b"RIFF");
    assert_eq!(&download.body_bytes[8..12], b"WAVE");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_default_to_chinese_for_unknown_language(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "text": "今天天气很好", "lang": "xx" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body.as_ref().unwrap().get("lang"), Some(&json!("zh")));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_english_with_language_alias(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/tts",
            &json!({ "text": "Hello there. How are you today?", "lang": "EN-US", "speed": 1.5 }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body.as_ref().unwrap().get("lang"), Some(&json!("en")));
    assert_eq!(ctx.output_files().len(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_cannot_process_when_every_segment_is_too_short(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "text": "嗯。啊！", "lang": "zh" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("cannot process");
    assert!(ctx.output_files().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_skip_too_short_segments(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "text": "嗯。今天天气很好！", "lang": "zh" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(ctx.output_files().len(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_cannot_process_for_short_english(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "text": "A.", "lang": "en" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("cannot process");
    assert!(ctx.output_files().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_with_server_error_when_model_is_missing(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "text": "こんにちは", "lang": "ja" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error_message("offline model directory does not exist");

    // The server keeps serving
    ctx.client
        .get("/health")
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_load_each_model_once(ctx: &TestContext) {
    let mut futures = Vec::new();
    for i in 0..6 {
        let client = ctx.client.clone();
        futures.push(async move {
            client
                .post("/api/tts", &json!({ "text": format!("Request number {}", i), "lang": "en" }))
                .await
        });
    }

    for result in futures::future::join_all(futures).await {
        result.unwrap().assert_status(StatusCode::OK);
    }
    assert_eq!(ctx.loader.loads.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.output_files().len(), 6);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_unknown_file(ctx: &TestContext) {
    let response = ctx.client.get("/api/tts/tts_0_deadbeef.wav").await.unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("File not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_serve_files_outside_output_dir(ctx: &TestContext) {
    let outside = ctx.output_dir.path().parent().unwrap();
    let secret = tempfile::Builder::new()
        .suffix(".wav")
        .tempfile_in(outside)
        .unwrap();
    let secret_name = secret.path().file_name().unwrap().to_string_lossy().into_owned();

    let response = ctx
        .client
        .get(&format!("/api/tts/..%2F{}", secret_name))
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);

    let response = ctx.client.get("/api/tts/..").await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_request_id_and_cors_headers(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "text": "" }))
        .await
        .unwrap();
    response.assert_header_exists("x-request-id");

    let preflight = ctx
        .client
        .send(
            Method::OPTIONS,
            "/api/tts",
            &[
                ("Origin", "http://localhost:3000"),
                ("Access-Control-Request-Method", "POST"),
            ],
        )
        .await
        .unwrap();
    preflight
        .assert_status(StatusCode::OK)
        .assert_header("access-control-allow-origin", "*");
}
