use crate::flow::challenge::{Challenge, PromptChallenge, PromptField};
use crate::flow::form::{Answers, Field, FieldKind, Form, Submission};
use crate::flow::registry::{Stage, StageKind};
use serde_json::Value;

pub const COMPONENT: &str = "ak-stage-prompt";

/// Server-defined form: the challenge describes its fields, types included
#[derive(Debug, Default)]
pub struct PromptStage;

fn field_kind(prompt: &PromptField) -> FieldKind {
    match prompt.kind.as_str() {
        "password" => FieldKind::Password,
        "number" => FieldKind::Number,
        "checkbox" => FieldKind::Checkbox,
        "dropdown" | "radio-button-group" | "ak-locale" => FieldKind::Choice,
        "hidden" => FieldKind::Hidden,
        "static" | "separator" | "text_read_only" | "text_area_read_only" => FieldKind::Static,
        // text, text_area, username, email, date, datetime, file
        _ => FieldKind::Text,
    }
}

impl Stage for PromptStage {
    fn component(&self) -> &'static str {
        COMPONENT
    }

    fn kind(&self, _: &Challenge) -> StageKind {
        StageKind::Interactive
    }

    fn render(&self, challenge: &Challenge) -> Form {
        let payload: PromptChallenge = challenge.parse().unwrap_or_default();
        let mut form = Form::new(COMPONENT);

        let mut prompts: Vec<&PromptField> = payload.fields.iter().collect();
        prompts.sort_by_key(|prompt| prompt.order);

        for prompt in prompts {
            let mut field = Field::new(&prompt.field_key, &prompt.label, field_kind(prompt));
            field.required = prompt.required;

            if !prompt.initial_value.is_empty() {
                field.initial = Some(prompt.initial_value.clone());
            }

            if !prompt.placeholder.is_empty() {
                field.placeholder = Some(prompt.placeholder.clone());
            }

            if let Some(choices) = &prompt.choices {
                field.choices = choices.clone();
            }

            if !prompt.sub_text.is_empty() {
                form.push_info(prompt.sub_text.clone());
            }

            form.fields.push(field);
        }

        form
    }

    fn response(&self, challenge: &Challenge, answers: &Answers) -> Submission {
        let payload: PromptChallenge = challenge.parse().unwrap_or_default();
        let mut submission = Submission::new();

        for prompt in &payload.fields {
            match field_kind(prompt) {
                // Hidden and read-only fields echo their server-provided value
                FieldKind::Hidden | FieldKind::Static => {
                    submission.insert(
                        prompt.field_key.clone(),
                        Value::String(prompt.initial_value.clone()),
                    );
                }
                _ => {
                    if let Some(value) = answers.get(&prompt.field_key) {
                        submission.insert(prompt.field_key.clone(), value.clone());
                    }
                }
            }
        }

        submission
    }
}
