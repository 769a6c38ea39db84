//! End-to-end dispatch/decode tests against a local HTTP server.

use std::io::Write;
use std::time::Duration;

use axum::http::header;
use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use http::Method;
use serde::{Deserialize, Serialize};

use minifetch::{
    decode, decode_bytes, decode_json, decode_text, decoder, dispatch, dispatch_with, Body,
    Decoded, FetchError, Representation, RequestOptions, Transport,
};

const GREETING: &str = "the same string as the uncompressed response";

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

async fn echo(body: Bytes) -> Bytes {
    body
}

fn test_app() -> Router {
    Router::new()
        .route("/text", get(|| async { GREETING }))
        .route("/empty", get(|| async { "" }))
        .route(
            "/json",
            get(|| async { axum::Json(serde_json::json!({"test": "ok", "id": 1})) }),
        )
        .route("/broken-json", get(|| async { "{not json" }))
        .route(
            "/gzip",
            get(|| async { ([(header::CONTENT_ENCODING, "gzip")], gzip(GREETING.as_bytes())) }),
        )
        .route(
            "/deflate",
            get(|| async {
                ([(header::CONTENT_ENCODING, "deflate")], deflate(GREETING.as_bytes()))
            }),
        )
        .route(
            "/bad-gzip",
            get(|| async { ([(header::CONTENT_ENCODING, "gzip")], b"not gzip at all".to_vec()) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "finally"
            }),
        )
        .route("/echo", post(echo))
}

/// Binds the test app to an ephemeral local port and returns its base URL.
async fn serve() -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, test_app()).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn plain_get_decodes_as_text() {
    let base = serve().await;
    let handle = dispatch(format!("{base}/text")).await.unwrap();
    assert_eq!(handle.transport(), Transport::Plain);
    assert_eq!(handle.status(), 200);

    let text = decode_text(handle).await.unwrap();
    assert_eq!(text, GREETING);
}

#[tokio::test]
async fn empty_body_decodes_as_empty_text() {
    let base = serve().await;
    let handle = dispatch(format!("{base}/empty")).await.unwrap();
    let text = decode_text(handle).await.unwrap();
    assert_eq!(text, "");
}

#[tokio::test]
async fn json_round_trips_to_a_deep_equal_value() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Todo {
        test: String,
        id: u32,
    }

    let base = serve().await;

    let handle = dispatch(format!("{base}/json")).await.unwrap();
    let value = decode(handle, Representation::Json)
        .await
        .unwrap()
        .into_json()
        .unwrap()
        .expect("non-empty body");
    assert_eq!(value["test"], "ok");

    let handle = dispatch(format!("{base}/json")).await.unwrap();
    let todo: Todo = decode_json(handle).await.unwrap().expect("non-empty body");
    assert_eq!(
        todo,
        Todo {
            test: "ok".to_string(),
            id: 1
        }
    );
}

#[tokio::test]
async fn gzip_response_decodes_to_uncompressed_text() {
    let base = serve().await;
    let handle = dispatch(format!("{base}/gzip")).await.unwrap();
    let text = decode_text(handle).await.unwrap();
    assert_eq!(text, GREETING);
}

#[tokio::test]
async fn deflate_response_decodes_to_uncompressed_text() {
    let base = serve().await;
    let handle = dispatch(format!("{base}/deflate")).await.unwrap();
    let text = decode_text(handle).await.unwrap();
    assert_eq!(text, GREETING);
}

#[tokio::test]
async fn bytes_length_matches_decompressed_size() {
    let base = serve().await;

    let handle = dispatch(format!("{base}/gzip")).await.unwrap();
    let bytes = decode_bytes(handle).await.unwrap();
    assert_eq!(bytes.len(), GREETING.len());

    let handle = dispatch(format!("{base}/text")).await.unwrap();
    let bytes = decode_bytes(handle).await.unwrap();
    assert_eq!(bytes.len(), GREETING.len());
}

#[tokio::test]
async fn json_on_empty_body_is_absent_not_an_error() {
    let base = serve().await;
    let handle = dispatch(format!("{base}/empty")).await.unwrap();
    let decoded = decode(handle, Representation::Json).await.unwrap();
    assert_eq!(decoded, Decoded::Json(None));

    let handle = dispatch(format!("{base}/empty")).await.unwrap();
    let typed: Option<serde_json::Value> = decode_json(handle).await.unwrap();
    assert!(typed.is_none());
}

#[tokio::test]
async fn json_on_malformed_body_rejects_with_parse_error() {
    let base = serve().await;
    let handle = dispatch(format!("{base}/broken-json")).await.unwrap();
    let err = decode(handle, Representation::Json).await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn malformed_gzip_rejects_with_decompress_error() {
    let base = serve().await;
    let handle = dispatch(format!("{base}/bad-gzip")).await.unwrap();
    let err = decode_text(handle).await.unwrap_err();
    assert!(matches!(err, FetchError::Decompress(_)));
}

#[tokio::test]
async fn curried_decoder_composes_after_dispatch() {
    let base = serve().await;
    let as_bytes = decoder(Representation::Bytes);

    let handle = dispatch(format!("{base}/text")).await.unwrap();
    let first = as_bytes.run(handle).await.unwrap();

    let handle = dispatch(format!("{base}/gzip")).await.unwrap();
    let second = as_bytes.run(handle).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn text_bytes_and_stream_bodies_echo_identically() {
    let base = serve().await;
    let payload = b"round-trip payload \xf0\x9f\xa6\x80 with some length".to_vec();

    let bodies = [
        Body::Text(String::from_utf8(payload.clone()).unwrap()),
        Body::Bytes(Bytes::from(payload.clone())),
        Body::stream(futures::stream::iter(
            payload
                .chunks(7)
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect::<Vec<Result<Bytes, std::io::Error>>>(),
        )),
    ];

    for body in bodies {
        let options = RequestOptions::default().method(Method::POST).body(body);
        let handle = dispatch_with(format!("{base}/echo"), options).await.unwrap();
        let echoed = decode_bytes(handle).await.unwrap();
        assert_eq!(echoed.as_ref(), payload.as_slice());
    }
}

#[tokio::test]
async fn request_headers_reach_the_server() {
    let app = Router::new().route(
        "/probe",
        get(|headers: axum::http::HeaderMap| async move {
            headers
                .get("x-probe")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("missing")
                .to_string()
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut headers = http::HeaderMap::new();
    headers.insert("x-probe", "present".parse().unwrap());
    let options = RequestOptions::default().headers(headers);

    let handle = dispatch_with(format!("http://{addr}/probe"), options)
        .await
        .unwrap();
    assert_eq!(decode_text(handle).await.unwrap(), "present");
}

#[tokio::test]
async fn opted_in_deadline_rejects_with_timeout() {
    let base = serve().await;
    let options = RequestOptions::default().timeout(Duration::from_millis(100));
    let err = dispatch_with(format!("{base}/slow"), options)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Timeout));
}

#[tokio::test]
async fn mid_body_drop_rejects_with_stream_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        // Declare far more body than gets written, then drop the socket.
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 1000\r\n\r\npartial bo")
            .await;
        let _ = socket.shutdown().await;
    });

    let handle = dispatch(format!("http://{addr}/")).await.unwrap();
    assert_eq!(handle.status(), 200);

    let err = decode_text(handle).await.unwrap_err();
    assert!(matches!(err, FetchError::Stream(_)));
}

#[tokio::test]
async fn refused_connection_rejects_with_transport_error() {
    // Bind-then-drop guarantees an unoccupied port.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = dispatch(format!("http://{addr}/")).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}
