//! In-process binding: the session runs on its own task and talks over message queues,
//! the way an editor host posts messages to and from an embedded panel.

use crate::{
	message::{Request, Response},
	session::Session,
};
use tokio::{
	sync::mpsc::{self, error::SendError},
	task::JoinHandle,
};

const QUEUE_DEPTH: usize = 16;

pub struct MessageChannel {
	requests: mpsc::Sender<Request>,
	responses: mpsc::Receiver<Response>,
	task: JoinHandle<()>,
}
impl MessageChannel {
	/// Must be called from within a tokio runtime.
	pub fn spawn(mut session: Session) -> Self {
		let (requests, mut inbox) = mpsc::channel::<Request>(QUEUE_DEPTH);
		let (outbox, responses) = mpsc::channel::<Response>(QUEUE_DEPTH);

		let task = tokio::spawn(async move {
			while let Some(request) = inbox.recv().await {
				let response = session.handle(request).await;
				if outbox.send(response).await.is_err() {
					break;
				}
			}
			session.close().await;
			log::debug!("message channel closed");
		});

		Self { requests, responses, task }
	}

	pub async fn post(&self, request: Request) -> Result<(), SendError<Request>> {
		self.requests.send(request).await
	}

	/// Next response, or `None` once the session task has stopped.
	pub async fn recv(&mut self) -> Option<Response> {
		self.responses.recv().await
	}

	/// Posts `request` and waits for its answer. Every request gets exactly one response.
	pub async fn request(&mut self, request: Request) -> Option<Response> {
		self.post(request).await.ok()?;
		self.recv().await
	}

	/// Stops accepting requests, closes the session's connections and waits for the task.
	pub async fn dispose(self) {
		let Self { requests, responses, task } = self;
		drop(requests);
		drop(responses);
		if let Err(err) = task.await {
			log::warn!("session task ended abnormally: {}", err);
		}
	}
}
