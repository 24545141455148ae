use crate::flow::challenge::Challenge;
use crate::flow::client::FlowClient;
use crate::flow::error::FlowError;
use crate::flow::form::{Answers, Form, Submission};
use crate::flow::interactor::{Interaction, Interactor};
use crate::flow::navigator::{Navigation, Navigator};
use crate::flow::registry::{Stage, StageKind, StageRegistry, Terminal};
use crate::flow::retry::RetryPolicy;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use ulid::Ulid;

/// Executor state, advanced by `start` and `submit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowPhase {
    /// No challenge fetched yet
    Loading,
    /// A challenge is held and may be answered
    Rendering { component: String },
    /// A submission is on the wire
    Submitting,
    /// The terminal navigation happened; the flow is over
    Redirecting,
}

/// A rendered stage, ready for a host to present
#[derive(Debug, Clone)]
pub struct StageView {
    pub component: String,
    pub kind: StageKind,
    pub form: Form,
    pub terminal: Option<Terminal>,
}

/// How a driven flow ended
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    /// The flow completed and handed off via navigation
    Redirected(Navigation),
    /// The policy engine denied access
    Denied { message: Option<String> },
    /// The flow failed server-side
    Failed {
        error: Option<String>,
        request_id: Option<String>,
    },
    /// A challenge arrived for a component nothing is registered for
    Unsupported { component: String },
    /// The interactor abandoned the flow
    Cancelled,
}

struct Current {
    challenge: Challenge,
    stage: Arc<dyn Stage>,
}

/// Drives the challenge/response loop of one flow execution.
///
/// `start` fetches the first challenge, `submit` answers the active stage,
/// and `run` loops both against an interactor until a terminal outcome.
/// Overlapping submissions are rejected, not queued: once the flow reached
/// its terminal navigation every further `submit` fails.
pub struct FlowExecutor {
    client: FlowClient,
    registry: StageRegistry,
    slug: String,
    query: Option<String>,
    execution_id: String,
    phase: FlowPhase,
    current: Option<Current>,
    retry: Option<RetryPolicy>,
}

impl FlowExecutor {
    #[must_use]
    pub fn new(client: FlowClient, slug: impl Into<String>) -> Self {
        Self {
            client,
            registry: StageRegistry::defaults(),
            slug: slug.into(),
            query: None,
            execution_id: Ulid::new().to_string(),
            phase: FlowPhase::Loading,
            current: None,
            retry: None,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: StageRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Forward the original query string (`next=`, `flow_token=`)
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Retry transport failures instead of surfacing them
    #[must_use]
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    #[must_use]
    pub fn phase(&self) -> &FlowPhase {
        &self.phase
    }

    #[must_use]
    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// The challenge currently being rendered, if any
    #[must_use]
    pub fn challenge(&self) -> Option<&Challenge> {
        self.current.as_ref().map(|current| &current.challenge)
    }

    /// Fetch the first challenge and render it
    ///
    /// # Errors
    ///
    /// Returns an error if the flow was already started or the challenge
    /// could not be fetched
    #[instrument(skip(self), fields(flow = %self.slug, execution = %self.execution_id))]
    pub async fn start(&mut self) -> Result<StageView, FlowError> {
        if self.phase != FlowPhase::Loading {
            return Err(FlowError::AlreadyStarted);
        }

        let challenge = self.fetch_initial().await?;

        Ok(self.install(challenge))
    }

    /// Submit answers for the active stage and render what comes back.
    ///
    /// The body on the wire is exactly what the stage built from the
    /// answers. On a transport or endpoint error the stage stays
    /// submittable; the caller decides whether to try again.
    ///
    /// # Errors
    ///
    /// Returns an error if no stage is active, a submission is already in
    /// flight, the flow already redirected, or the request fails
    #[instrument(skip(self, answers), fields(flow = %self.slug, execution = %self.execution_id))]
    pub async fn submit(&mut self, answers: &Answers) -> Result<StageView, FlowError> {
        let component = match &self.phase {
            FlowPhase::Loading => return Err(FlowError::NotStarted),
            FlowPhase::Submitting => return Err(FlowError::SubmitInFlight),
            FlowPhase::Redirecting => return Err(FlowError::AlreadyRedirected),
            FlowPhase::Rendering { component } => component.clone(),
        };

        let submission = {
            let current = self.current.as_ref().ok_or(FlowError::NotStarted)?;
            current.stage.response(&current.challenge, answers)
        };

        self.phase = FlowPhase::Submitting;

        match self.post_submission(&submission).await {
            Ok(challenge) => Ok(self.install(challenge)),
            Err(error) => {
                self.phase = FlowPhase::Rendering { component };
                Err(error)
            }
        }
    }

    /// Drive the flow to a terminal outcome.
    ///
    /// Interactive stages are handed to the interactor; automatic stages
    /// submit themselves. The navigator is invoked exactly once, for the
    /// terminal navigation, and no request is issued after it.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails; the executor stays resumable
    /// and `run` may be called again
    #[instrument(skip_all, fields(flow = %self.slug, execution = %self.execution_id))]
    pub async fn run(
        &mut self,
        interactor: &mut dyn Interactor,
        navigator: &mut dyn Navigator,
    ) -> Result<FlowOutcome, FlowError> {
        let mut view = match &self.phase {
            FlowPhase::Loading => self.start().await?,
            _ => self.render_current()?,
        };

        loop {
            match view.kind {
                StageKind::Terminal => {
                    let terminal = view.terminal.take().unwrap_or(Terminal::Failed {
                        error: Some("terminal stage resolved to nothing".to_string()),
                        request_id: None,
                    });

                    return Ok(match terminal {
                        Terminal::Navigate(navigation) => {
                            info!(target = %navigation.target(), "flow complete, handing off");
                            navigator.navigate(navigation.clone());
                            self.phase = FlowPhase::Redirecting;
                            FlowOutcome::Redirected(navigation)
                        }
                        Terminal::Denied { message } => FlowOutcome::Denied { message },
                        Terminal::Failed { error, request_id } => {
                            FlowOutcome::Failed { error, request_id }
                        }
                        Terminal::Unsupported { component } => {
                            FlowOutcome::Unsupported { component }
                        }
                    });
                }
                StageKind::Automatic => {
                    view = self.submit(&Answers::new()).await?;
                }
                StageKind::Interactive => match interactor.fill(&view).await {
                    Interaction::Submit(answers) => view = self.submit(&answers).await?,
                    Interaction::Cancel => {
                        info!("flow cancelled by the interactor");
                        return Ok(FlowOutcome::Cancelled);
                    }
                },
            }
        }
    }

    fn install(&mut self, challenge: Challenge) -> StageView {
        let stage = self.registry.resolve(&challenge.component);

        if !self.registry.contains(&challenge.component) {
            warn!(component = %challenge.component, "no stage registered, using fallback");
        }

        let view = Self::view_of(&challenge, &stage);

        debug!(component = %challenge.component, "rendering stage");

        self.phase = FlowPhase::Rendering {
            component: challenge.component.clone(),
        };
        self.current = Some(Current { challenge, stage });

        view
    }

    fn render_current(&self) -> Result<StageView, FlowError> {
        if self.phase == FlowPhase::Redirecting {
            return Err(FlowError::AlreadyRedirected);
        }

        let current = self.current.as_ref().ok_or(FlowError::NotStarted)?;

        Ok(Self::view_of(&current.challenge, &current.stage))
    }

    fn view_of(challenge: &Challenge, stage: &Arc<dyn Stage>) -> StageView {
        let mut form = stage.render(challenge);

        if form.title.is_none() {
            form.title = challenge.title().map(str::to_string);
        }

        if let Some(errors) = &challenge.response_errors {
            form.attach_errors(errors);
        }

        let kind = stage.kind(challenge);
        let terminal = match kind {
            StageKind::Terminal => stage.terminal(challenge),
            _ => None,
        };

        StageView {
            component: challenge.component.clone(),
            kind,
            form,
            terminal,
        }
    }

    async fn fetch_initial(&self) -> Result<Challenge, FlowError> {
        let Some(policy) = self.retry.clone() else {
            return self
                .client
                .get_challenge(&self.slug, self.query.as_deref())
                .await;
        };

        let mut attempt = 0;
        loop {
            match self
                .client
                .get_challenge(&self.slug, self.query.as_deref())
                .await
            {
                Ok(challenge) => return Ok(challenge),
                Err(FlowError::Transport(source)) if attempt < policy.max_retries => {
                    let delay = policy.delay_for_attempt(attempt);
                    warn!("transport error: {source}; retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    // Retries re-send the same body
    async fn post_submission(&self, submission: &Submission) -> Result<Challenge, FlowError> {
        let Some(policy) = self.retry.clone() else {
            return self
                .client
                .solve(&self.slug, self.query.as_deref(), submission)
                .await;
        };

        let mut attempt = 0;
        loop {
            match self
                .client
                .solve(&self.slug, self.query.as_deref(), submission)
                .await
            {
                Ok(challenge) => return Ok(challenge),
                Err(FlowError::Transport(source)) if attempt < policy.max_retries => {
                    let delay = policy.delay_for_attempt(attempt);
                    warn!("transport error: {source}; retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
