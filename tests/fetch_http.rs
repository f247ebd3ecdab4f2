use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use showsheet::app::fetch::client_builder;
use showsheet::app::types::{STATUS_FETCH_FAILED, STATUS_READY};
use showsheet::app::{HttpScheduleSource, LoadPhase, ScheduleError, ScheduleSource, ShowsheetApp};
use showsheet::config::AppConfig;

const SCHEDULE: &str = r#"{"data":{"movies":[{"nm":"Sample Film","desc":"Action|Comedy","dur":120,
"shows":[{"showDate":"2024-03-09","plist":[{"tm":"10:00","th":"Hall1","tp":"2D"},{"tm":"14:00","th":"Hall2","tp":"3D"}]}]}]}}"#;

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Serve `responses` in order, one connection each. The join handle returns the raw requests.
fn serve(responses: Vec<(&'static str, &'static str)>) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/maoyan/cinema/shows", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            requests.push(read_request(&mut stream));
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        }
        requests
    });
    (url, handle)
}

fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<Vec<String>>) {
    serve(vec![(status, body)])
}

/// The app's own client settings, minus proxy lookup so the local server is reached directly.
fn local_source(url: &str) -> HttpScheduleSource {
    let cfg = AppConfig {
        request_timeout_secs: 5,
        ..AppConfig::default()
    };
    let client: Client = client_builder(&cfg).unwrap().no_proxy().build().unwrap();
    HttpScheduleSource::with_client(client, url)
}

#[test]
fn server_error_is_a_network_error() {
    let (url, server) = serve_once("500 Internal Server Error", "");
    let err = local_source(&url).fetch().unwrap_err();
    assert!(matches!(err, ScheduleError::Network(_)), "{err:?}");
    server.join().unwrap();
}

#[test]
fn non_json_body_is_a_parse_error() {
    let (url, server) = serve_once("200 OK", "<html>maintenance</html>");
    let err = local_source(&url).fetch().unwrap_err();
    assert!(matches!(err, ScheduleError::Parse(_)), "{err:?}");
    server.join().unwrap();
}

#[test]
fn valid_body_is_returned_as_json() {
    let (url, server) = serve_once("200 OK", SCHEDULE);
    let payload = local_source(&url).fetch().unwrap();
    assert_eq!(payload["data"]["movies"][0]["nm"], "Sample Film");

    let requests = server.join().unwrap();
    assert!(requests[0].starts_with("GET /maoyan/cinema/shows"));
}

#[test]
fn request_carries_fixed_headers() {
    let (url, server) = serve_once("200 OK", SCHEDULE);
    local_source(&url).fetch().unwrap();

    let request = server.join().unwrap().remove(0).to_lowercase();
    let ua = AppConfig::default().user_agent.to_lowercase();
    assert!(ua.starts_with("mozilla/5.0"), "{ua}");
    assert!(request.contains(&format!("user-agent: {ua}\r\n")), "{request}");
    assert!(request.contains("accept: application/json\r\n"), "{request}");
}

fn wait_for_load(app: &mut ShowsheetApp) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while app.phase() == LoadPhase::Loading && Instant::now() < deadline {
        app.poll_load();
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn http_500_leaves_window_in_retry_state() {
    let (url, server) = serve_once("500 Internal Server Error", "");
    let source: Arc<dyn ScheduleSource> = Arc::new(local_source(&url));
    let mut app = ShowsheetApp::with_source(AppConfig::default(), Some(source));

    app.start_load(None);
    wait_for_load(&mut app);
    server.join().unwrap();

    assert_eq!(app.phase(), LoadPhase::Failed);
    assert_eq!(app.status(), STATUS_FETCH_FAILED);
    assert!(app.retry_visible());
    assert!(!app.can_generate());
    assert!(app.dates().is_empty());
}

#[test]
fn retry_after_failure_reaches_ready() {
    let (url, server) = serve(vec![("500 Internal Server Error", ""), ("200 OK", SCHEDULE)]);
    let source: Arc<dyn ScheduleSource> = Arc::new(local_source(&url));
    let mut app = ShowsheetApp::with_source(AppConfig::default(), Some(source));

    app.start_load(None);
    wait_for_load(&mut app);
    assert!(app.retry_visible());

    // what the retry button does
    app.start_load(None);
    assert!(!app.retry_visible());
    wait_for_load(&mut app);
    assert_eq!(server.join().unwrap().len(), 2);

    assert_eq!(app.phase(), LoadPhase::Ready);
    assert_eq!(app.status(), STATUS_READY);
    assert_eq!(app.selected_date(), Some("2024-03-09"));
    assert_eq!(app.dates()[0].label, "3月9日（周六）");
    assert!(app.can_generate());
}
