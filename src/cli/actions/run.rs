use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::flow::{
    Answers, FieldKind, FlowClient, FlowExecutor, FlowOutcome, Interaction, Interactor,
    Navigation, Navigator, RetryPolicy, ScriptedInteractor, StageView,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info, warn};

/// Handle the run action
///
/// # Errors
///
/// Returns an error when the flow could not be driven to a redirect
pub async fn handle(action: Action) -> Result<()> {
    let Action::Run(globals) = action;

    execute(globals).await
}

async fn execute(globals: GlobalArgs) -> Result<()> {
    let client = FlowClient::builder(&globals.url)
        .timeout(Duration::from_secs(globals.timeout))
        .accept_invalid_certs(globals.insecure)
        .build()?;

    let mut executor = FlowExecutor::new(client, &globals.flow);

    if let Some(query) = &globals.query {
        executor = executor.with_query(query);
    }

    if let Some(retries) = globals.retry {
        executor = executor.with_retry(RetryPolicy::new(retries));
    }

    info!(flow = %globals.flow, "starting flow");

    let mut navigator = ConsoleNavigator;

    let outcome = if globals.non_interactive {
        let mut interactor = ScriptedInteractor::from_answers(globals.answers);
        executor.run(&mut interactor, &mut navigator).await?
    } else {
        let mut interactor = TerminalInteractor::new(globals.answers);
        executor.run(&mut interactor, &mut navigator).await?
    };

    finish(outcome)
}

fn finish(outcome: FlowOutcome) -> Result<()> {
    match outcome {
        FlowOutcome::Redirected(navigation) => {
            debug!(target = %navigation.target(), "flow redirected");
            Ok(())
        }
        FlowOutcome::Denied { message } => Err(match message {
            Some(message) => anyhow!("access denied: {message}"),
            None => anyhow!("access denied"),
        }),
        FlowOutcome::Failed { error, request_id } => {
            let error = error.unwrap_or_else(|| "unknown error".to_string());

            Err(match request_id {
                Some(request_id) => anyhow!("flow failed: {error} (request id {request_id})"),
                None => anyhow!("flow failed: {error}"),
            })
        }
        FlowOutcome::Unsupported { component } => Err(anyhow!("Unsupported stage: {component}")),
        FlowOutcome::Cancelled => Err(anyhow!("flow cancelled")),
    }
}

/// Prints the terminal navigation target, the only stdout output of a run
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&mut self, navigation: Navigation) {
        match navigation {
            Navigation::Visit(url) => println!("{url}"),
            Navigation::PostForm { url, fields } => {
                for (key, value) in &fields {
                    debug!("form field {key}={value}");
                }

                println!("{url}");
            }
        }
    }
}

/// Interactor that prompts on stderr and reads answers from stdin.
///
/// Prepared answers are consulted first, so `--answer` works in interactive
/// runs too. End of input cancels the flow.
pub struct TerminalInteractor<R = tokio::io::Stdin> {
    scripted: HashMap<String, SecretString>,
    input: BufReader<R>,
}

impl TerminalInteractor {
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = (String, SecretString)>) -> Self {
        Self::with_reader(answers, tokio::io::stdin())
    }
}

impl<R: AsyncRead + Unpin + Send> TerminalInteractor<R> {
    pub fn with_reader(answers: impl IntoIterator<Item = (String, SecretString)>, reader: R) -> Self {
        Self {
            scripted: answers.into_iter().collect(),
            input: BufReader::new(reader),
        }
    }

    async fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();

        match self.input.read_line(&mut line).await {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(error) => {
                warn!("failed to read input: {error}");
                None
            }
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> Interactor for TerminalInteractor<R> {
    async fn fill(&mut self, view: &StageView) -> Interaction {
        if let Some(title) = &view.form.title {
            eprintln!("== {title} ==");
        }

        for line in &view.form.info {
            eprintln!("{line}");
        }

        for error in &view.form.non_field_errors {
            eprintln!("error: {error}");
        }

        let mut answers = Answers::new();
        let mut prompted = false;

        for field in &view.form.fields {
            if matches!(field.kind, FieldKind::Hidden | FieldKind::Static) {
                continue;
            }

            for error in &field.errors {
                eprintln!("error: {}: {error}", field.key);
            }

            if let Some(value) = self.scripted.get(&field.key) {
                answers.set(&field.key, value.expose_secret());
                continue;
            }

            prompted = true;

            let mut prompt = field.label.clone();

            if !field.choices.is_empty() {
                prompt = format!("{prompt} ({})", field.choices.join(", "));
            }

            if field.kind == FieldKind::Checkbox {
                prompt = format!("{prompt} [y/N]");
            }

            eprint!("{prompt}: ");

            let Some(line) = self.read_line().await else {
                return Interaction::Cancel;
            };

            if line.is_empty() {
                match &field.initial {
                    Some(initial) => answers.set(&field.key, initial.as_str()),
                    None if field.required => answers.set(&field.key, ""),
                    None => {}
                }
                continue;
            }

            match field.kind {
                FieldKind::Checkbox => {
                    answers.set(
                        &field.key,
                        matches!(line.as_str(), "y" | "yes" | "true" | "1"),
                    );
                }
                FieldKind::Number => match line.parse::<i64>() {
                    Ok(number) => answers.set(&field.key, number),
                    Err(_) => answers.set(&field.key, line.as_str()),
                },
                _ => answers.set(&field.key, line.as_str()),
            }
        }

        // Stages like consent render no inputs but still want a confirmation
        if !prompted && answers.is_empty() {
            eprint!("continue? [Y/n]: ");

            if let Some(line) = self.read_line().await {
                if matches!(line.as_str(), "n" | "no" | "cancel") {
                    return Interaction::Cancel;
                }
            } else {
                return Interaction::Cancel;
            }
        }

        Interaction::Submit(answers)
    }
}
