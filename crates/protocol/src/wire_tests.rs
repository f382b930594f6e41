use super::*;
use crate::types::{Request, Response};

#[tokio::test]
async fn round_trips_a_request_over_an_in_memory_pipe() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    let request = Request::SetPipeline {
        name: "daily-report".to_string(),
        py_name: "daily_report".to_string(),
        dir_name: "daily-report".to_string(),
        py_timestamp: 1_700_000_000.0,
    };
    let bytes = encode(&request).expect("encode");
    write_message(&mut client, &bytes).await.expect("write message");

    let received = read_request(&mut server, DEFAULT_TIMEOUT).await.expect("read request");
    assert_eq!(received, request);
}

#[tokio::test]
async fn round_trips_a_response() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    let response = Response::PipelineId { id: 42 };
    write_response(&mut client, &response, DEFAULT_TIMEOUT).await.expect("write response");

    let bytes = read_message(&mut server).await.expect("read message");
    let decoded: Response = decode(&bytes).expect("decode");
    assert_eq!(decoded, response);
}

#[tokio::test]
async fn reading_from_a_closed_connection_reports_connection_closed() {
    let (client, mut server) = tokio::io::duplex(4096);
    drop(client);

    let err = read_message(&mut server).await.expect_err("closed connection errors");
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn oversized_message_is_rejected_before_allocating() {
    use tokio::io::AsyncWriteExt;

    let (mut client, mut server) = tokio::io::duplex(4096);
    client
        .write_all(&((MAX_MESSAGE_SIZE + 1) as u32).to_be_bytes())
        .await
        .expect("write length prefix");

    let err = read_message(&mut server).await.expect_err("oversized length prefix is rejected");
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}
