//! Outbound webhook delivery

use hookfmt_core::{MessagePayload, Result};

/// Acknowledgement from a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub status: u16,
    pub body: String,
}

/// Something that can post a payload to a webhook URL.
///
/// One call is one attempt. Implementations report non-2xx answers and
/// transport failures as [`hookfmt_core::Error::DeliveryFailure`].
pub trait Sink {
    fn deliver(&self, url: &str, payload: &MessagePayload) -> Result<Delivery>;
}

impl<S: Sink + ?Sized> Sink for &S {
    fn deliver(&self, url: &str, payload: &MessagePayload) -> Result<Delivery> {
        (**self).deliver(url, payload)
    }
}

#[cfg(feature = "delivery")]
pub use http::WebhookSink;

#[cfg(feature = "delivery")]
mod http {
    use super::{Delivery, Sink};
    use hookfmt_core::{Error, MessagePayload, Result};
    use reqwest::blocking::Client;
    use reqwest::header::CONTENT_TYPE;

    /// Posts payloads as JSON over HTTPS.
    #[derive(Debug, Clone, Default)]
    pub struct WebhookSink {
        client: Client,
    }

    impl WebhookSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_client(client: Client) -> Self {
            Self { client }
        }
    }

    impl Sink for WebhookSink {
        fn deliver(&self, url: &str, payload: &MessagePayload) -> Result<Delivery> {
            let body = payload.to_json()?;

            let response = self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .map_err(|e| Error::DeliveryFailure {
                    status: None,
                    body: e.to_string(),
                })?;

            let status = response.status();
            let text = response.text().unwrap_or_else(|e| {
                log::warn!("could not read webhook response body: {e}");
                format!("<unreadable body: {e}>")
            });

            if !status.is_success() {
                return Err(Error::DeliveryFailure {
                    status: Some(status.as_u16()),
                    body: text,
                });
            }

            Ok(Delivery {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}

#[cfg(all(test, feature = "delivery"))]
mod tests {
    use super::*;
    use hookfmt_core::Error;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Accept one connection, answer it with `reply`, and hand back the raw
    /// request text.
    fn serve_once(status_line: &str, reply: &str) -> (String, JoinHandle<String>) {
        serve_raw(format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
            reply.len()
        ))
    }

    fn serve_raw(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/services/x", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8(request).unwrap()
        });

        (url, handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    fn hello() -> MessagePayload {
        MessagePayload::PlainText {
            text: "hi".to_string(),
        }
    }

    #[test]
    fn posts_json_and_accepts_2xx() {
        let (url, server) = serve_once("200 OK", "ok");

        let delivery = WebhookSink::new().deliver(&url, &hello()).unwrap();
        assert_eq!(
            delivery,
            Delivery {
                status: 200,
                body: "ok".to_string()
            }
        );

        let request = server.join().unwrap();
        let lower = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /services/x HTTP/1.1\r\n"), "{request}");
        assert!(lower.contains("content-type: application/json\r\n"), "{request}");
        assert!(request.ends_with("\r\n\r\n{\"text\":\"hi\"}"), "{request}");
    }

    #[test]
    fn non_2xx_carries_status_and_body() {
        let (url, server) = serve_once("404 Not Found", "no_service");

        let err = WebhookSink::new().deliver(&url, &hello()).unwrap_err();
        assert_eq!(err.to_string(), "Slack API error: 404 - no_service");
        match err {
            Error::DeliveryFailure { status, body } => {
                assert_eq!(status, Some(404));
                assert_eq!(body, "no_service");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn truncated_error_body_is_reported_not_dropped() {
        // Promises more bytes than it sends, then hangs up.
        let (url, server) = serve_raw(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 64\r\nConnection: close\r\n\r\noops"
                .to_string(),
        );

        let err = WebhookSink::new().deliver(&url, &hello()).unwrap_err();
        server.join().unwrap();
        match err {
            Error::DeliveryFailure { status, body } => {
                assert_eq!(status, Some(500));
                assert!(body.starts_with("<unreadable body: "), "{body}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn transport_error_has_no_status() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{port}/services/x");

        let err = WebhookSink::new().deliver(&url, &hello()).unwrap_err();
        assert!(!err.is_client_error());
        match &err {
            Error::DeliveryFailure { status, .. } => assert_eq!(*status, None),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Slack request failed: "), "{err}");
    }
}
