use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use tokio::sync::mpsc::Receiver;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{event, Level};

use crate::reqwest_helpers::create_client;

const BODY_LOG_LIMIT: usize = 512;

/// Spawns the sink worker pool. Workers share the envelope receiver and run
/// until the channel closes. Each owns its HTTP client, so connections are
/// reused per worker.
pub fn spawn_poster_pool(sink_url: String, pool_size: usize, stagger: Duration, envelope_rx: Receiver<Vec<u8>>) -> JoinHandle<()> {
    let shared_rx = Arc::new(Mutex::new(envelope_rx));

    tokio::spawn(async move {
        for worker_id in 0..pool_size {
            // don't hit the sink with a thundering herd at process start
            tokio::time::sleep(stagger).await;

            let rx = Arc::clone(&shared_rx);
            let sink_url = sink_url.clone();
            tokio::spawn(poster_worker(worker_id, create_client(), sink_url, rx));
        }
    })
}

async fn poster_worker(worker_id: usize, client: ClientWithMiddleware, sink_url: String, rx: Arc<Mutex<Receiver<Vec<u8>>>>) {
    event!(Level::DEBUG, "Poster worker {} started", worker_id);

    loop {
        let envelope = { rx.lock().await.recv().await };
        let Some(envelope) = envelope else {
            break;
        };

        let response = client
            .post(sink_url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(envelope)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status();
                // read everything so the connection can be reused
                let body = response.text().await.unwrap_or_default();
                if status != StatusCode::OK {
                    event!(
                        Level::WARN,
                        "Sink replied {} to worker {}: {}",
                        status,
                        worker_id,
                        body_prefix(&body)
                    );
                }
            }
            Err(e) => {
                event!(Level::WARN, "Sink post failed on worker {}: {}", worker_id, e);
            }
        }
    }

    event!(Level::DEBUG, "Poster worker {} stopped, envelope channel closed", worker_id);
}

fn body_prefix(body: &str) -> &str {
    match body.char_indices().nth(BODY_LOG_LIMIT) {
        Some((index, _)) => &body[..index],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_prefix_is_bounded_and_utf8_safe() {
        let long = "é".repeat(BODY_LOG_LIMIT + 100);
        let prefix = body_prefix(&long);
        assert_eq!(prefix.chars().count(), BODY_LOG_LIMIT);

        let short = "all good";
        assert_eq!(body_prefix(short), short);
    }

    #[test_log::test(tokio::test)]
    async fn posts_envelopes_as_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload/")
            .match_header("content-type", "application/json")
            .match_body(r#"{"resultType":"history"}"#)
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let (tx, rx) = tokio::sync::mpsc::channel(1);
        spawn_poster_pool(format!("{}/upload/", server.url()), 1, Duration::from_millis(1), rx);

        tx.send(br#"{"resultType":"history"}"#.to_vec()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        mock.assert_async().await;
    }

    #[test_log::test(tokio::test)]
    async fn workers_survive_sink_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload/")
            .with_status(500)
            .with_body("upload rejected")
            .expect(2)
            .create_async()
            .await;

        let (tx, rx) = tokio::sync::mpsc::channel(1);
        spawn_poster_pool(format!("{}/upload/", server.url()), 1, Duration::from_millis(1), rx);

        tx.send(b"first".to_vec()).await.unwrap();
        tx.send(b"second".to_vec()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        // the worker logs the failure and keeps draining
        mock.assert_async().await;
    }

    #[test_log::test(tokio::test)]
    async fn pool_drains_the_channel_across_workers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload/")
            .with_status(200)
            .expect(6)
            .create_async()
            .await;

        let (tx, rx) = tokio::sync::mpsc::channel(1);
        spawn_poster_pool(format!("{}/upload/", server.url()), 3, Duration::from_millis(1), rx);

        for i in 0..6u8 {
            tx.send(vec![i]).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(300)).await;

        mock.assert_async().await;
    }
}
