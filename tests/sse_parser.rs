use drugscout::mcp::sse::{SseEvent, SseParser};

#[test]
fn test_event_split_across_chunks() {
    let mut parser = SseParser::new();
    assert!(parser.push(b"event: endpoint\nda").is_empty());
    let events = parser.push(b"ta: /messages?session=abc\n\n");
    assert_eq!(
        events,
        vec![SseEvent {
            event: "endpoint".to_string(),
            data: "/messages?session=abc".to_string(),
        }]
    );
}

#[test]
fn test_default_event_name_is_message() {
    let mut parser = SseParser::new();
    let events = parser.push(b"data: {\"jsonrpc\":\"2.0\"}\n\n");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, "message");
}

#[test]
fn test_comment_lines_and_crlf_are_tolerated() {
    let mut parser = SseParser::new();
    let events = parser.push(b": keepalive\r\nevent: message\r\ndata: one\r\ndata: two\r\n\r\n");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data, "one\ntwo");
}

#[test]
fn test_multiple_events_in_one_chunk() {
    let mut parser = SseParser::new();
    let events = parser.push(b"event: endpoint\ndata: /messages\n\ndata: {\"id\":1}\n\n");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event, "endpoint");
    assert_eq!(events[1].event, "message");
    assert_eq!(events[1].data, "{\"id\":1}");
}

#[test]
fn test_multibyte_character_split_across_chunks_survives() {
    let payload = "data: {\"text\":\"布洛芬说明\"}\n\n".as_bytes();
    let mut parser = SseParser::new();

    // Split inside the first three-byte character.
    assert!(parser.push(&payload[..16]).is_empty());
    let events = parser.push(&payload[16..]);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data, "{\"text\":\"布洛芬说明\"}");
}

#[test]
fn test_blank_line_without_data_emits_nothing() {
    let mut parser = SseParser::new();
    assert!(parser.push(b"\n\n\n").is_empty());
}
