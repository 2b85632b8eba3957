//! Standalone HTTP binding: the wizard page plus one JSON endpoint carrying the message vocabulary.

use crate::folder::open_in_browser;
use anyhow::Result;
use axum::{
	body::Bytes,
	extract::State,
	http::StatusCode,
	response::{Html, IntoResponse},
	routing::post,
	Json, Router,
};
use dab_scaffolder::{session::pick_folder, Request, Session};
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::Mutex};

/// Requests are handled one at a time, so config files are never written concurrently.
pub type SharedSession = Arc<Mutex<Session>>;

pub fn router(session: SharedSession) -> Router {
	Router::new().route("/api/message", post(message)).fallback(index_page).with_state(session)
}

async fn message(State(session): State<SharedSession>, body: Bytes) -> axum::response::Response {
	let request = match serde_json::from_slice::<Request>(&body) {
		Ok(request) => request,
		Err(err) => {
			log::warn!("rejected message: {}", err);
			return (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": format!("Unknown command: {}", err) })))
				.into_response();
		},
	};
	let response = match request {
		// The dialog stays open until the user closes it; other requests go on meanwhile.
		Request::PickFolder => {
			let picker = session.lock().await.folder_picker();
			pick_folder(picker).await
		},
		request => session.lock().await.handle(request).await,
	};
	Json(response).into_response()
}

async fn index_page() -> impl IntoResponse {
	Html(include_str!("web/index.html"))
}

pub async fn serve(addr: SocketAddr, session: Session, open: bool) -> Result<()> {
	let session = Arc::new(Mutex::new(session));
	let listener = TcpListener::bind(addr).await?;
	let url = format!("http://{}", listener.local_addr()?);
	log::info!("DAB scaffolder running at {}", url);
	if open {
		open_in_browser(&url);
	}

	axum::serve(listener, router(session.clone()))
		.with_graceful_shutdown(async {
			if let Err(err) = tokio::signal::ctrl_c().await {
				log::error!("failed to listen for shutdown signal: {}", err);
			}
		})
		.await?;

	session.lock().await.close().await;
	log::info!("shut down");
	Ok(())
}
