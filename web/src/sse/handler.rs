use crate::extractors::authenticated_user::AuthenticatedUser;
use async_stream::stream;
use async_trait::async_trait;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::Stream;
use log::*;
use service::AppState;
use ::sse::message::Event as Notification;
use ::sse::session::{Session, Transport, TransportError};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Writes session output into the channel that backs the response stream.
/// Sends fail once the client has gone and the stream is dropped.
struct ChannelTransport {
    sender: mpsc::Sender<Event>,
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&mut self, notification: &Notification) -> Result<(), TransportError> {
        let json = notification
            .to_json()
            .map_err(|e| TransportError::new(format!("failed to serialize payload: {e}")))?;

        self.sender
            .send(Event::default().data(json))
            .await
            .map_err(|_| TransportError::new("client stream closed"))
    }

    async fn heartbeat(&mut self) -> Result<(), TransportError> {
        self.sender
            .send(Event::default().comment("heartbeat"))
            .await
            .map_err(|_| TransportError::new("client stream closed"))
    }
}

/// SSE handler that establishes a long-lived connection for real-time updates.
/// A user may hold any number of these at once, one per open client.
pub(crate) async fn sse_handler(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Establishing SSE connection for user {}", user.id);

    let (sender, mut receiver) = mpsc::channel(app_state.config.sse_queue_capacity.max(1));
    let client_gone = CancellationToken::new();

    let session = Session::new(
        Arc::clone(&app_state.sse_manager),
        user.id,
        app_state.config.sse_heartbeat_interval(),
    );
    tokio::spawn(session.run(ChannelTransport { sender }, client_gone.clone()));

    // Dropping the response stream (client disconnect) cancels the session
    let client_guard = client_gone.drop_guard();

    let stream = stream! {
        let _client_guard = client_guard;
        while let Some(event) = receiver.recv().await {
            yield Ok::<_, Infallible>(event);
        }
        trace!("SSE session for user {} ended, closing stream", user.id);
    };

    Sse::new(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_state, user_token};
    use axum::{
        body::{Body, Bytes},
        http::{header::AUTHORIZATION, Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use domain::todo::NewTodo;
    use domain::todo_type::TodoType;
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::time::timeout;
    use tower::ServiceExt;

    fn app(app_state: AppState) -> Router {
        Router::new()
            .route("/sse", get(sse_handler))
            .route_layer(from_fn_with_state(
                app_state.clone(),
                crate::middleware::auth::require_auth,
            ))
            .with_state(app_state)
    }

    async fn next_chunk<S>(body: &mut S) -> Option<String>
    where
        S: Stream<Item = Result<Bytes, axum::Error>> + Unpin,
    {
        timeout(Duration::from_secs(5), body.next())
            .await
            .expect("no SSE frame within five seconds")
            .map(|chunk| String::from_utf8(chunk.unwrap().to_vec()).unwrap())
    }

    async fn wait_for_connections(app_state: &AppState, user_id: u64, expected: usize) {
        timeout(Duration::from_secs(5), async {
            while app_state.sse_manager.connection_count(user_id) != expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("connection count not reached");
    }

    #[tokio::test]
    async fn stream_starts_with_connected_and_delivers_notifications() {
        let app_state = test_state();
        let (user, token) = user_token(&app_state, "grace@example.com").await;

        let response = app(app_state.clone())
            .oneshot(
                Request::builder()
                    .uri("/sse")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut body = response.into_body().into_data_stream();
        let first = next_chunk(&mut body).await.unwrap();
        assert_eq!(first, "data: {\"event\":\"connected\"}\n\n");

        wait_for_connections(&app_state, user.id, 1).await;
        let todo = domain::todo::create(
            app_state.db_ref(),
            &app_state.event_bus,
            user.id,
            NewTodo {
                title: "Ship it".to_string(),
                content: Some("today".to_string()),
                todo_type: TodoType::Text,
                checklist: Vec::new(),
            },
        )
        .await
        .unwrap();

        let second = next_chunk(&mut body).await.unwrap();
        assert_eq!(
            second,
            format!("data: {{\"event\":\"todoCreated\",\"data\":{}}}\n\n", todo.id)
        );
    }

    #[tokio::test]
    async fn dropping_the_stream_unregisters_the_connection() {
        let app_state = test_state();
        let (user, token) = user_token(&app_state, "grace@example.com").await;

        let response = app(app_state.clone())
            .oneshot(
                Request::builder()
                    .uri("/sse")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let mut body = response.into_body().into_data_stream();
        next_chunk(&mut body).await.unwrap();
        wait_for_connections(&app_state, user.id, 1).await;

        drop(body);

        wait_for_connections(&app_state, user.id, 0).await;
    }

    #[tokio::test]
    async fn removing_clients_ends_the_stream() {
        let app_state = test_state();
        let (user, token) = user_token(&app_state, "grace@example.com").await;

        let response = app(app_state.clone())
            .oneshot(
                Request::builder()
                    .uri("/sse")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let mut body = response.into_body().into_data_stream();
        next_chunk(&mut body).await.unwrap();
        wait_for_connections(&app_state, user.id, 1).await;

        app_state.sse_manager.remove_clients(user.id);

        assert_eq!(next_chunk(&mut body).await, None);
    }
}
