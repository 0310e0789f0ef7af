//! Tests against an in-process WebDriver double: a TCP server speaking just
//! enough of the W3C wire protocol to create a session, answer element finds
//! from a predicate, and record every find request it receives. This pins
//! down behavior that needs a server on the other end but not a real browser:
//! the locator strategy order and the step interpreter's timing.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use webbot::synth::SETTLE_CLICK_MS;
use webbot::{Action, BrowserClient, BrowserOptions, locator, synthesize};

// ---------------------------------------------------------------------------
// WebDriver double
// ---------------------------------------------------------------------------

type FindLog = Arc<Mutex<Vec<(String, String)>>>;

/// Start the double on an ephemeral port. Element finds are answered by
/// `found_when(using, value)`; every find is appended to the returned log as
/// a `(using, value)` pair. Clicks always fail with "element not
/// interactable"; everything else answers with a null value.
fn spawn_stub(found_when: fn(&str, &str) -> bool) -> (String, FindLog) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    let finds: FindLog = Arc::default();
    let log = Arc::clone(&finds);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let log = Arc::clone(&log);
            thread::spawn(move || serve_connection(stream, log, found_when));
        }
    });
    (addr, finds)
}

fn serve_connection(stream: TcpStream, finds: FindLog, found_when: fn(&str, &str) -> bool) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut stream = stream;
    while let Some((method, path, body)) = read_request(&mut reader) {
        if method == "POST" && path == "/session" {
            respond(
                &mut stream,
                "200 OK",
                &json!({"value": {"sessionId": "stub", "capabilities": {}}}),
            );
        } else if method == "POST" && path.ends_with("/element") {
            let using = body["using"].as_str().unwrap_or_default().to_string();
            let value = body["value"].as_str().unwrap_or_default().to_string();
            let hit = found_when(&using, &value);
            finds.lock().unwrap().push((using, value));
            if hit {
                respond(
                    &mut stream,
                    "200 OK",
                    &json!({"value": {"element-6066-11e4-a52e-4f735466cecf": "stub-element"}}),
                );
            } else {
                respond(
                    &mut stream,
                    "404 Not Found",
                    &json!({"value": {
                        "error": "no such element",
                        "message": "no element matched",
                        "stacktrace": "",
                    }}),
                );
            }
        } else if method == "POST" && path.ends_with("/click") {
            respond(
                &mut stream,
                "400 Bad Request",
                &json!({"value": {
                    "error": "element not interactable",
                    "message": "stubbed click failure",
                    "stacktrace": "",
                }}),
            );
        } else {
            // window rect, session delete, and anything else state-free
            respond(&mut stream, "200 OK", &json!({"value": null}));
        }
    }
}

/// Read one HTTP/1.1 request; `None` when the peer hung up.
fn read_request(reader: &mut BufReader<TcpStream>) -> Option<(String, String, Value)> {
    let mut line = String::new();
    if reader.read_line(&mut line).ok()? == 0 {
        return None;
    }
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).ok()? == 0 {
            return None;
        }
        let header = header.trim_end().to_ascii_lowercase();
        if header.is_empty() {
            break;
        }
        if let Some(v) = header.strip_prefix("content-length:") {
            content_length = v.trim().parse().ok()?;
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;
    let body = if content_length == 0 {
        Value::Null
    } else {
        serde_json::from_slice(&body).ok()?
    };
    Some((method, path, body))
}

fn respond(stream: &mut TcpStream, status: &str, body: &Value) {
    let body = body.to_string();
    let _ = write!(
        stream,
        "HTTP/1.1 {status}\r\ncontent-type: application/json; charset=utf-8\r\ncontent-length: {}\r\n\r\n{body}",
        body.len(),
    );
}

async fn connect(addr: &str) -> BrowserClient {
    BrowserClient::connect(BrowserOptions::default().webdriver_url(addr))
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn locator_strategies_fire_in_priority_order_and_short_circuit() {
    // nothing matches until the link-text strategy
    let (addr, finds) = spawn_stub(|using, _| using == "link text");
    let mut client = connect(&addr).await;

    let el = locator::find_fuzzy(&mut client, "Register").await;
    assert!(el.is_some());

    let finds = finds.lock().unwrap();
    assert_eq!(finds.len(), 3, "later strategies must not run after a hit");
    // the id strategy goes over the wire as an attribute xpath
    assert_eq!(finds[0].0, "xpath");
    assert_eq!(finds[0].1, r#"//*[@id="Register"]"#);
    assert_eq!(finds[1].0, "css selector");
    assert_eq!(finds[1].1, r#"[name="Register"]"#);
    assert_eq!(finds[2].0, "link text");
    assert_eq!(finds[2].1, "Register");
}

#[tokio::test]
async fn identifier_match_wins_when_every_strategy_would_hit() {
    // a page exposing the descriptor as an id AND as link text: every
    // strategy reports a match, so only the first one may ever be asked
    let (addr, finds) = spawn_stub(|_, _| true);
    let mut client = connect(&addr).await;

    let el = locator::find_fuzzy(&mut client, "Register").await;
    assert!(el.is_some());

    let finds = finds.lock().unwrap();
    assert_eq!(finds.len(), 1);
    assert_eq!(finds[0].0, "xpath");
    assert_eq!(finds[0].1, r#"//*[@id="Register"]"#);
}

#[tokio::test]
async fn failed_click_skips_the_settle_delay() {
    // element resolves immediately; the stub then rejects the click
    let (addr, _finds) = spawn_stub(|_, _| true);
    let mut client = connect(&addr).await;

    let program = synthesize(&[Action::Click {
        target: "Go".to_string(),
    }]);
    let started = Instant::now();
    assert!(program.run(&mut client).await);
    assert!(
        started.elapsed() < Duration::from_millis(SETTLE_CLICK_MS),
        "a click that failed must not wait out its settle delay"
    );
}
