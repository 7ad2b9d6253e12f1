//! JSON quiz documents, authored offline and pushed through the wizard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::{
    error::ValidationError,
    wizard::{Action, QuizHeader, QuizWizard, Step, DEFAULT_SCORE},
};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid quiz document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuizDocument {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub time_minutes: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attempt_max: Option<u32>,
    pub questions: Vec<QuestionDocument>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuestionDocument {
    pub text: String,
    #[serde(default = "default_score")]
    pub score: f64,
    #[serde(default)]
    pub correct_explanation: Option<String>,
    pub topic_objective_id: String,
    pub options: Vec<OptionDocument>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OptionDocument {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl QuizDocument {
    pub async fn load(path: &Path) -> Result<Self, DocumentError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DocumentError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn header(&self) -> QuizHeader {
        QuizHeader {
            title: self.title.clone(),
            description: self.description.clone().unwrap_or_default(),
            time_minutes: self.time_minutes,
            is_active: self.is_active,
            due_date: self.due_date,
            attempt_max: self.attempt_max,
        }
    }

    /// Fills the wizard from `quiz-info` and leaves it on `summary`. Every
    /// question goes through the same commit gate as hand-typed ones.
    pub fn author(&self, wizard: &mut QuizWizard) -> Result<(), ValidationError> {
        if wizard.step() != Step::QuizInfo {
            return Err(ValidationError::InvalidTransition {
                from: wizard.step(),
                action: "load a quiz document",
            });
        }
        *wizard.header_mut() = self.header();
        wizard.advance(Action::Next)?;

        for q in &self.questions {
            if q.options.iter().filter(|o| o.is_correct).count() > 1 {
                return Err(ValidationError::NoCorrectOption);
            }
            let draft = wizard.draft_mut();
            draft.text = q.text.clone();
            draft.score = q.score;
            draft.correct_explanation = q.correct_explanation.clone().unwrap_or_default();
            draft.topic_objective_id = Some(q.topic_objective_id.clone());
            while draft.options().len() < q.options.len() {
                draft.add_option();
            }
            for (i, o) in q.options.iter().enumerate() {
                draft.set_option_text(i, o.text.clone())?;
                draft.set_option_feedback(i, o.feedback.clone().unwrap_or_default())?;
                if o.is_correct {
                    draft.set_correct(i, true)?;
                }
            }
            wizard.commit_question()?;
        }

        wizard.advance(Action::Next)?;
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_score() -> f64 {
    DEFAULT_SCORE
}
