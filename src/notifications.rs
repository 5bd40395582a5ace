//! Live appointment notifications over server-sent events.
//!
//! The backend pushes `NotificationEvent` frames on a long-lived
//! `text/event-stream` response. This module owns the subscription task:
//! it parses frames, forwards them over a channel, and reconnects after a
//! configurable delay whenever the stream closes or fails to open.

use std::fmt::Display;
use std::time::Duration;

use anyhow::Result;
use futures_util::StreamExt;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

use crate::client::ApiClient;
use crate::logging;
use crate::models::NotificationEvent;

/// Handle owning the background subscription task.
///
/// Dropping the handle aborts the task, so a notification listener can
/// never outlive the screen that created it.
pub struct NotificationHandle {
    task: JoinHandle<()>,
}

impl Drop for NotificationHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Subscribe to the notification stream.
///
/// Returns the owning handle plus the receiving end of the event channel.
/// The task runs until the receiver is dropped or the handle is dropped.
pub fn subscribe(
    client: ApiClient,
    reconnect_delay: Duration,
) -> (NotificationHandle, UnboundedReceiver<NotificationEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        loop {
            match client.open_notification_stream().await {
                Ok(response) => {
                    logging::info("Notification stream connected");
                    let mut events = std::pin::pin!(parse_sse_stream(response.bytes_stream()));
                    while let Some(event) = events.next().await {
                        match event {
                            Ok(event) => {
                                if tx.send(event).is_err() {
                                    // Receiver gone: the owning screen shut down.
                                    return;
                                }
                            }
                            Err(err) => {
                                logging::warn(format!("Notification stream error: {err}"));
                            }
                        }
                    }
                    logging::warn("Notification stream closed by server");
                }
                Err(err) => {
                    logging::warn(format!("Failed to open notification stream: {err}"));
                }
            }

            if tx.is_closed() {
                return;
            }
            tokio::time::sleep(reconnect_delay).await;
            logging::info("Reconnecting notification stream");
        }
    });

    (NotificationHandle { task }, rx)
}

/// Parse an SSE byte stream into structured notification events.
///
/// Lines that are not `data:` payloads (comments, event names, keep-alives)
/// are skipped; unparseable payloads are logged and dropped rather than
/// terminating the stream.
fn parse_sse_stream<E: Display>(
    stream: impl futures_util::Stream<Item = Result<bytes::Bytes, E>> + Unpin,
) -> impl futures_util::Stream<Item = Result<NotificationEvent>> {
    async_stream::try_stream! {
        let mut buffer = String::new();
        let mut stream = stream;

        while let Some(chunk_result) = stream.next().await {
            let chunk = match chunk_result {
                Ok(chunk) => chunk,
                Err(err) => {
                    logging::warn(format!("SSE stream chunk error: {err}"));
                    continue;
                }
            };
            let s = String::from_utf8_lossy(&chunk);
            buffer.push_str(&s);

            while let Some(pos) = buffer.find("\n\n") {
                let block = buffer[..pos].to_string();
                buffer.drain(..pos + 2);

                for line in block.lines() {
                    if let Some(data) = line.strip_prefix("data: ") {
                        match serde_json::from_str::<NotificationEvent>(data) {
                            Ok(event) => yield event,
                            Err(err) => {
                                logging::warn(format!("Failed to parse SSE event: {err}"));
                                logging::warn(format!("Raw SSE data: {data}"));
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    use bytes::Bytes;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::Config;

    fn chunks(parts: &[&str]) -> impl futures_util::Stream<Item = Result<Bytes, Infallible>> {
        let owned: Vec<Result<Bytes, Infallible>> = parts
            .iter()
            .map(|p| Ok(Bytes::from(p.to_string())))
            .collect();
        tokio_stream::iter(owned)
    }

    #[tokio::test]
    async fn parses_events_split_across_chunks() {
        let stream = chunks(&[
            "data: {\"type\":\"ping\"}\n\ndata: {\"type\":\"appointment.can",
            "celled\",\"appointment_id\":\"7f4df4a2-6f0b-4f3e-9c3a-0a9b6f1d2e33\"}\n\n",
        ]);
        let events: Vec<_> = parse_sse_stream(Box::pin(stream)).collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0].as_ref().unwrap(),
            NotificationEvent::Ping
        ));
        assert!(matches!(
            events[1].as_ref().unwrap(),
            NotificationEvent::AppointmentCancelled { .. }
        ));
    }

    #[tokio::test]
    async fn skips_comments_and_malformed_payloads() {
        let stream = chunks(&[
            ": keep-alive\n\n",
            "event: appointment\ndata: not-json\n\n",
            "data: {\"type\":\"ping\"}\n\n",
        ]);
        let events: Vec<_> = parse_sse_stream(Box::pin(stream)).collect().await;
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].as_ref().unwrap(),
            NotificationEvent::Ping
        ));
    }

    #[tokio::test]
    async fn reconnects_after_stream_close() {
        let server = MockServer::start().await;
        let body =
            "data: {\"type\":\"ping\"}\n\n";
        // Each connection serves one event and then closes; the service
        // must come back for the second one.
        Mock::given(method("GET"))
            .and(path("/v1/notifications/stream"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .expect(2..)
            .mount(&server)
            .await;

        let config = Config {
            base_url: Some(server.uri()),
            ..Config::default()
        };
        let client = ApiClient::with_token(&config, "tok").unwrap();
        let (handle, mut rx) = subscribe(client, Duration::from_millis(10));

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("first event before timeout");
        assert!(matches!(first, Some(NotificationEvent::Ping)));

        let second = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("second event after reconnect");
        assert!(matches!(second, Some(NotificationEvent::Ping)));

        drop(handle);
    }
}
