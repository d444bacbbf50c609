//! Integration tests against a mock collection endpoint.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::oneshot;
use ua_visitor::{Error, Event, Pageview, Visitor};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CID: &str = "9f0b3c6e-2d4a-4e1f-8a7b-5c9d0e1f2a3b";

fn visitor_for(server: &MockServer) -> Visitor {
    Visitor::builder()
        .tracking_id("UA-1-1")
        .client_id(CID)
        .hostname(server.uri())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

fn query_pairs(request: &wiremock::Request) -> HashMap<String, String> {
    request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[tokio::test]
async fn test_pageview_and_event_are_posted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collect"))
        .and(query_param("t", "pageview"))
        .and(query_param("dp", "/home"))
        .and(query_param("tid", "UA-1-1"))
        .and(query_param("cid", CID))
        .and(query_param("v", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/collect"))
        .and(query_param("t", "event"))
        .and(query_param("ec", "video"))
        .and(query_param("ea", "play"))
        .and(query_param("p", "/home"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let visitor = visitor_for(&mock_server);
    visitor.pageview("/home").event(("video", "play"));

    visitor.send().await.unwrap();
    assert_eq!(visitor.pending_hit_count(), 0);
}

#[tokio::test]
async fn test_hits_arrive_in_insertion_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let visitor = visitor_for(&mock_server);
    visitor
        .pageview(Pageview::new("/a").title("A"))
        .event(Event::new("nav", "click").label("footer"))
        .pageview("/b");

    visitor.send().await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let kinds: Vec<String> = requests
        .iter()
        .map(|r| query_pairs(r)["t"].clone())
        .collect();
    assert_eq!(kinds, vec!["pageview", "event", "pageview"]);

    let event = query_pairs(&requests[1]);
    assert_eq!(event["el"], "footer");
    assert_eq!(event["p"], "/a");

    // context only holds the previous call, so the title is not carried past the event
    assert!(!query_pairs(&requests[2]).contains_key("dt"));
}

#[tokio::test]
async fn test_empty_queue_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let visitor = visitor_for(&mock_server);
    visitor.send().await.unwrap();
}

#[tokio::test]
async fn test_rejected_hit_stops_the_drain() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad hit"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let visitor = visitor_for(&mock_server);
    visitor.pageview("/1").pageview("/2");

    let err = visitor.send().await.unwrap_err();

    match err {
        Error::Status { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "bad hit");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(visitor.pending_hit_count(), 1);
}

#[tokio::test]
async fn test_configured_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("User-Agent", "ua-visitor-tests"))
        .and(header("X-Forwarded-For", "203.0.113.7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let visitor = Visitor::builder()
        .tracking_id("UA-1-1")
        .hostname(mock_server.uri())
        .user_agent("ua-visitor-tests")
        .header("X-Forwarded-For", "203.0.113.7")
        .build()
        .unwrap();

    visitor.pageview("/").send().await.unwrap();
}

#[tokio::test]
async fn test_custom_path_and_user_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/debug/collect"))
        .and(query_param("uid", "user-7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let visitor = Visitor::builder()
        .tracking_id("UA-1-1")
        .user_id("user-7")
        .hostname(mock_server.uri())
        .path("/debug/collect")
        .build()
        .unwrap();

    visitor.transaction("T-1").send().await.unwrap();
}

#[tokio::test]
async fn test_callback_flavour_delivers_in_background() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(query_param("t", "item"))
        .and(query_param("ti", "T-9"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(query_param("t", "event"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let visitor = visitor_for(&mock_server);
    let (tx, rx) = oneshot::channel();

    visitor
        .item(ua_visitor::Item::new(9.5).transaction_id("T-9"))
        .reset()
        .transaction_with((), move |_: &Visitor, result| {
            // fails validation: no transaction id after reset
            let _ = tx.send(result);
        });

    let err = rx.await.unwrap().unwrap_err();
    assert!(err.is_validation());

    let (tx, rx) = oneshot::channel();
    visitor.event_with(("noop", "noop"), move |_: &Visitor, result| {
        let _ = tx.send(result);
    });
    rx.await.unwrap().unwrap();

    // the item and the event both went out on the background drain
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}
