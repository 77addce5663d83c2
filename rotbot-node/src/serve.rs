//! Status board server
//!
//! Devices report with `GET /?temp=..&humidity=..&light=..&state=..`; every
//! request, reporting or not, gets the current board back as HTML.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use rotbot_connectors::StatusBoard;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::config::NodeError;

/// Board shared between handlers
pub type SharedBoard = Arc<Mutex<StatusBoard>>;

/// Routes for the board
pub fn router(board: SharedBoard) -> Router {
    Router::new()
        .route("/", get(board_handler))
        .route("/health", get(health_handler))
        .with_state(board)
}

/// Serve the board on `addr` until the process exits
pub async fn serve(addr: SocketAddr) -> Result<(), NodeError> {
    let board = SharedBoard::default();
    let listener = TcpListener::bind(addr).await?;
    info!("Status board listening on http://{}", addr);
    axum::serve(listener, router(board)).await?;
    Ok(())
}

/// Apply any reported fields, then render the board
async fn board_handler(
    State(board): State<SharedBoard>,
    Query(params): Query<Vec<(String, String)>>,
) -> Html<String> {
    let mut board = board.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let changed = board.apply(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if changed > 0 {
        debug!(
            "Board updated: state={} temp={} humidity={} light={}",
            board.state(),
            board.temp(),
            board.humidity(),
            board.light()
        );
    }
    Html(board.render_html())
}

async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Query<Vec<(String, String)>> {
        Query(
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn report_updates_board() {
        let board = SharedBoard::default();
        let Html(page) = board_handler(
            State(board.clone()),
            pairs(&[("temp", "29.50"), ("humidity", "56.00"), ("light", "0.00"), ("state", "RED")]),
        )
        .await;
        assert!(page.contains("Temperature: 29.50°C"));
        assert!(page.contains("color:red;"));

        let Html(page) = board_handler(State(board.clone()), pairs(&[])).await;
        assert!(page.contains("> RED</h2>"));
        assert_eq!(board.lock().unwrap().humidity(), "56.00");
    }

    #[tokio::test]
    async fn serves_over_http() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(SharedBoard::default())).await.unwrap();
        });

        let page = tokio::task::spawn_blocking(move || {
            use std::io::{Read, Write};
            let mut stream = std::net::TcpStream::connect(addr).unwrap();
            stream
                .write_all(b"GET /?state=GREEN&temp=21%2E00&light=&humidity=40+%25 HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n")
                .unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).unwrap();
            response
        })
        .await
        .unwrap();

        assert!(page.starts_with("HTTP/1.1 200"));
        assert!(page.contains("color:green;"));
        assert!(page.contains("Temperature: 21.00°C"));
        assert!(page.contains("Humidity: 40 %"));
        assert!(page.contains("Light: 0<"));
    }
}
