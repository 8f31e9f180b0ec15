//! The dedicated engine thread.
//!
//! The engine is single-threaded by design; this module gives it a thread of
//! its own, off the interactive host. Requests travel over an mpsc channel
//! and are processed strictly in arrival order; each request's responses
//! come back as one ordered batch. A panic inside a handler is caught at the
//! thread boundary and surfaced as an `Error` response — the engine keeps
//! serving.

use crate::engine::{Engine, EngineConfig};
use crate::messages::{Request, Response};
use log::error;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, RecvError, SendError, Sender};
use std::thread::{self, JoinHandle};

/// Host-side handle to a running engine thread.
///
/// Dropping the handle closes the request channel; the engine thread then
/// drains and exits on its own. Use [`WorkerHandle::shutdown`] to also wait
/// for it.
pub struct WorkerHandle {
    requests: Sender<Request>,
    responses: Receiver<Vec<Response>>,
    thread: JoinHandle<()>,
}

/// Spawn an engine on its own thread.
pub fn spawn(config: EngineConfig) -> WorkerHandle {
    let (request_tx, request_rx) = channel::<Request>();
    let (response_tx, response_rx) = channel::<Vec<Response>>();

    let thread = thread::Builder::new()
        .name("worktable-engine".to_string())
        .spawn(move || run_loop(config, request_rx, response_tx))
        .expect("failed to spawn engine thread");

    WorkerHandle {
        requests: request_tx,
        responses: response_rx,
        thread,
    }
}

fn run_loop(config: EngineConfig, requests: Receiver<Request>, responses: Sender<Vec<Response>>) {
    let mut engine = Engine::new(config);
    while let Ok(request) = requests.recv() {
        let batch = match catch_unwind(AssertUnwindSafe(|| engine.handle(request))) {
            Ok(batch) => batch,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("engine request panicked: {message}");
                vec![Response::Error { message }]
            }
        };
        if responses.send(batch).is_err() {
            // Host hung up; nothing left to serve.
            return;
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "engine panicked".to_string()
    }
}

impl WorkerHandle {
    /// Fire-and-forget send; batches are picked up later with [`recv`].
    ///
    /// [`recv`]: WorkerHandle::recv
    pub fn send(&self, request: Request) -> Result<(), SendError<Request>> {
        self.requests.send(request)
    }

    /// Receive the next response batch, blocking until one arrives.
    pub fn recv(&self) -> Result<Vec<Response>, RecvError> {
        self.responses.recv()
    }

    /// Synchronous round trip: send one request, wait for its batch.
    pub fn request(&self, request: Request) -> Result<Vec<Response>, RecvError> {
        if self.requests.send(request).is_err() {
            return Err(RecvError);
        }
        self.responses.recv()
    }

    /// Close the request channel and wait for the engine thread to finish.
    pub fn shutdown(self) {
        let WorkerHandle {
            requests,
            responses,
            thread,
        } = self;
        drop(requests);
        drop(responses);
        let _ = thread.join();
    }
}
