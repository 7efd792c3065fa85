use crate::app::AppState;
use async_stream::try_stream;
use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
};
use futures::Stream;
use std::{convert::Infallible, sync::Arc};
use tokio::sync::broadcast::error::RecvError;

/// Live feed of funnel events (codes issued, applications received) for
/// operator dashboards.
pub async fn stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!("operator connected to event stream >>>");

    let mut rx = state.get_sender().subscribe();

    Sse::new(try_stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Ok(payload) = serde_json::to_string(&event) {
                        yield Event::default().data(payload);
                    }
                }

                Err(RecvError::Closed) => break,

                Err(e) => {
                    tracing::error!(error = ?e, "event stream receiver lagged");
                }
            }
        }
    })
    .keep_alive(KeepAlive::default())
}
