/*!
Serialized async host for a single wizard instance.

The wizard state machine itself is synchronous and pure; this module puts it
behind a dedicated worker task so that an interactive host (an input loop, a
chat frontend, a test harness) can drive it with async calls while the
following holds:

- Exactly one request mutates the wizard at a time. Requests are drained from
  an mpsc channel and each is processed to completion before the next is
  admitted, so no transition ever interleaves with another against the same
  state.
- Blocking work belongs to the step, not the controller. A *remote check*
  registered for a step (token validation against an API, reachability
  probes) is awaited by the worker before the transition is applied. The
  caller's `submit` is the suspend point; rejection surfaces as an ordinary
  `SubmitOutcome::Invalid` with the wizard untouched.
- Teardown is safe at any point. Snapshots are only published after a
  transition fully resolves, so dropping the handles (or the whole runtime)
  mid-request discards the in-flight work without partial commits.

`SessionHandle` is cheap to clone (it wraps the request sender); all clones
talk to the same worker. A successful `finish` hands the final configuration
out and stops the worker; later calls get `SessionClosed`.

Requires a Tokio runtime.
*/

use std::collections::HashMap;

use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::config::ConfigSnapshot;
use crate::errors::{ValidationError, WizardError};
use crate::step::{Answer, StepId, StepView};
use crate::wizard::{BackOutcome, SubmitOutcome, Wizard};

/// Async pre-transition check for one step. Must resolve before the
/// transition is applied; `Err` rejects the answer and leaves the wizard
/// untouched.
pub type RemoteCheck =
    Box<dyn Fn(&Answer, &ConfigSnapshot) -> BoxFuture<'static, Result<(), ValidationError>> + Send + Sync>;

/// Read-only projection of the session state for rendering layers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// The active step's prompt metadata; `None` once terminal.
    pub step: Option<StepView>,
    pub configuration: ConfigSnapshot,
    pub progress: f64,
    pub terminal: bool,
}

enum Request {
    Submit {
        answer: Answer,
        reply: oneshot::Sender<Result<SubmitOutcome, WizardError>>,
    },
    GoBack {
        reply: oneshot::Sender<Result<BackOutcome, WizardError>>,
    },
    View {
        reply: oneshot::Sender<SessionView>,
    },
    Finish {
        reply: oneshot::Sender<Result<ConfigSnapshot, WizardError>>,
    },
}

/// Configures and spawns a session worker around a wizard instance.
pub struct SessionBuilder {
    wizard: Wizard,
    checks: HashMap<StepId, RemoteCheck>,
}

impl SessionBuilder {
    pub fn new(wizard: Wizard) -> Self {
        Self {
            wizard,
            checks: HashMap::new(),
        }
    }

    /// Register an async check awaited before any submit on the given step
    /// is applied.
    pub fn remote_check<F>(mut self, step: impl Into<StepId>, check: F) -> Self
    where
        F: Fn(&Answer, &ConfigSnapshot) -> BoxFuture<'static, Result<(), ValidationError>>
            + Send
            + Sync
            + 'static,
    {
        self.checks.insert(step.into(), Box::new(check));
        self
    }

    /// Move the wizard onto its worker task and return the handle.
    pub fn spawn(self) -> SessionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        Worker {
            wizard: self.wizard,
            checks: self.checks,
            rx,
        }
        .spawn();
        SessionHandle { tx }
    }
}

/// Handle for driving a spawned session. Cheap to clone; all clones address
/// the same worker.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Request>,
}

impl SessionHandle {
    /// Spawn a session without remote checks.
    pub fn spawn(wizard: Wizard) -> Self {
        SessionBuilder::new(wizard).spawn()
    }

    /// Submit an answer for the active step. Suspends until any registered
    /// remote check and the transition have fully resolved.
    pub async fn submit(&self, answer: Answer) -> Result<SubmitOutcome, WizardError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Submit { answer, reply })
            .map_err(|_| WizardError::SessionClosed)?;
        rx.await.map_err(|_| WizardError::SessionClosed)?
    }

    /// Undo the most recent forward transition.
    pub async fn go_back(&self) -> Result<BackOutcome, WizardError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::GoBack { reply })
            .map_err(|_| WizardError::SessionClosed)?;
        rx.await.map_err(|_| WizardError::SessionClosed)?
    }

    /// Current step, configuration and progress, for display.
    pub async fn view(&self) -> Result<SessionView, WizardError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::View { reply })
            .map_err(|_| WizardError::SessionClosed)?;
        rx.await.map_err(|_| WizardError::SessionClosed)
    }

    /// Take the final configuration once terminal. On success the worker
    /// stops; the configuration is now the caller's to act on.
    pub async fn finish(&self) -> Result<ConfigSnapshot, WizardError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Finish { reply })
            .map_err(|_| WizardError::SessionClosed)?;
        rx.await.map_err(|_| WizardError::SessionClosed)?
    }
}

struct Worker {
    wizard: Wizard,
    checks: HashMap<StepId, RemoteCheck>,
    rx: mpsc::UnboundedReceiver<Request>,
}

impl Worker {
    fn spawn(mut self) {
        tokio::spawn(async move {
            while let Some(request) = self.rx.recv().await {
                if self.handle(request).await {
                    return;
                }
            }
            info!("wizard session stopped (all handles dropped)");
        });
    }

    /// Process one request to completion. Returns true once the final
    /// configuration has been handed off and the worker should stop.
    async fn handle(&mut self, request: Request) -> bool {
        match request {
            Request::Submit { answer, reply } => {
                let result = self.submit(answer).await;
                let _ = reply.send(result);
                false
            }
            Request::GoBack { reply } => {
                let _ = reply.send(self.wizard.go_back());
                false
            }
            Request::View { reply } => {
                let _ = reply.send(self.view());
                false
            }
            Request::Finish { reply } => match self.wizard.current_step_id() {
                Some(id) => {
                    let _ = reply.send(Err(WizardError::InProgress(id.clone())));
                    false
                }
                None => {
                    info!("wizard session finished, handing configuration off");
                    let _ = reply.send(Ok(self.wizard.configuration().clone()));
                    true
                }
            },
        }
    }

    async fn submit(&mut self, answer: Answer) -> Result<SubmitOutcome, WizardError> {
        // Build the check future while the borrows are alive, await after.
        let pending = match self.wizard.current_step_id() {
            Some(current) => self
                .checks
                .get(current)
                .map(|check| (current.clone(), check(&answer, self.wizard.configuration()))),
            None => None,
        };
        if let Some((step, fut)) = pending {
            if let Err(reason) = fut.await {
                debug!("remote check rejected answer on step {step}: {reason}");
                return Ok(SubmitOutcome::Invalid(reason));
            }
        }
        self.wizard.submit(&answer)
    }

    fn view(&self) -> SessionView {
        SessionView {
            step: self.wizard.current_step().map(|s| s.view()),
            configuration: self.wizard.configuration().clone(),
            progress: self.wizard.progress(),
            terminal: self.wizard.is_terminal(),
        }
    }
}
