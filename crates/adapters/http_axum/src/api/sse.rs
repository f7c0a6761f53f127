//! Server-Sent Events (SSE) stream of facility snapshots.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;

use crate::state::AppState;
use crate::view::FacilityView;

/// `GET /api/facility/stream` — SSE stream of snapshot views.
///
/// Sends the current snapshot first, then one `snapshot` event per change.
/// Changes published faster than the client reads collapse into the latest
/// one. The stream ends when the engine stops or the client disconnects.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let snapshots = WatchStream::new(state.facility.subscribe());
    let events = snapshots.filter_map(|snapshot| {
        match Event::default()
            .event("snapshot")
            .json_data(FacilityView::from(snapshot.as_ref()))
        {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize snapshot for SSE stream");
                None
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
