//! Background registration worker — a Tokio task that owns the HTTP client
//! so the UI loop never waits on the network.

use tokio::sync::mpsc;

use super::client::{RegisterClient, RegisterError};
use super::{RegisterForm, RegisterOutcome, UNEXPECTED_ERROR};
use crate::validation::ValidationErrors;

// ─── Channel types ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum RegisterCommand {
    Submit(RegisterForm),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegisterEvent {
    Started,
    Finished(RegisterOutcome),
    /// The form failed validation on the worker side.
    Rejected(ValidationErrors),
    Failed(String),
}

// ─── Worker handle ────────────────────────────────────────────────────────────

pub struct RegisterWorker {
    pub cmd_tx:   mpsc::Sender<RegisterCommand>,
    pub event_rx: mpsc::Receiver<RegisterEvent>,
}

impl RegisterWorker {
    pub fn spawn(client: RegisterClient) -> Self {
        let (cmd_tx,   mut cmd_rx)   = mpsc::channel::<RegisterCommand>(8);
        let (event_tx,     event_rx) = mpsc::channel::<RegisterEvent>(32);

        tokio::spawn(async move {
            while let Some(cmd) = cmd_rx.recv().await {
                match cmd {
                    RegisterCommand::Shutdown => break,
                    RegisterCommand::Submit(form) => {
                        let _ = event_tx.send(RegisterEvent::Started).await;
                        let ev = match client.register(&form).await {
                            Ok(outcome)                       => RegisterEvent::Finished(outcome),
                            Err(RegisterError::Invalid(errs)) => RegisterEvent::Rejected(errs),
                            Err(e) => {
                                tracing::error!("registration failed: {e}");
                                RegisterEvent::Failed(UNEXPECTED_ERROR.to_owned())
                            }
                        };
                        let _ = event_tx.send(ev).await;
                    }
                }
            }
            tracing::info!("Register worker stopped");
        });

        RegisterWorker { cmd_tx, event_rx }
    }

    pub async fn submit(&self, form: RegisterForm) {
        let _ = self.cmd_tx.send(RegisterCommand::Submit(form)).await;
    }

    pub async fn shutdown(&self) { let _ = self.cmd_tx.send(RegisterCommand::Shutdown).await; }

    /// Drains everything the worker has reported so far.
    pub fn drain(&mut self) -> Vec<RegisterEvent> {
        let mut buf = Vec::new();
        while let Ok(ev) = self.event_rx.try_recv() { buf.push(ev); }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::client::ApiConfig;
    use crate::register::testing::{serve_once, valid_form};

    fn worker_for(base_url: &str) -> RegisterWorker {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        let cfg  = ApiConfig { base_url: base_url.to_owned(), timeout_seconds: 5 };
        RegisterWorker::spawn(RegisterClient::with_http(http, &cfg))
    }

    #[tokio::test]
    async fn submit_reports_started_then_outcome() {
        let (url, _server) = serve_once("200 OK", r#"{"message":"success"}"#).await;
        let mut worker = worker_for(&url);
        worker.submit(valid_form()).await;

        assert_eq!(worker.event_rx.recv().await, Some(RegisterEvent::Started));
        assert_eq!(
            worker.event_rx.recv().await,
            Some(RegisterEvent::Finished(RegisterOutcome::Created)),
        );
        worker.shutdown().await;
    }

    #[tokio::test]
    async fn server_failure_becomes_generic_message() {
        let (url, _server) = serve_once("503 Service Unavailable", "{}").await;
        let mut worker = worker_for(&url);
        worker.submit(valid_form()).await;

        assert_eq!(worker.event_rx.recv().await, Some(RegisterEvent::Started));
        assert_eq!(
            worker.event_rx.recv().await,
            Some(RegisterEvent::Failed(UNEXPECTED_ERROR.to_owned())),
        );
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_with_errors() {
        let mut worker = worker_for("http://127.0.0.1:9");
        worker.submit(RegisterForm::default()).await;

        assert_eq!(worker.event_rx.recv().await, Some(RegisterEvent::Started));
        match worker.event_rx.recv().await {
            Some(RegisterEvent::Rejected(errs)) => assert!(!errs.is_empty()),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn shutdown_closes_event_channel() {
        let mut worker = worker_for("http://127.0.0.1:9");
        worker.shutdown().await;
        assert_eq!(worker.event_rx.recv().await, None);
        assert!(worker.drain().is_empty());
    }
}
