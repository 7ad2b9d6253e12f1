use std::fmt;

use thiserror::Error;

use crate::wizard::Step;

/// Failures reported by the REST transport.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("session expired")]
    Unauthorized,
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("empty response body from {0}")]
    EmptyBody(String),
}

/// Client-side gates. Raised before any network call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} required")]
    Required(&'static str),
    #[error("must mark one correct option")]
    NoCorrectOption,
    #[error("need at least 2 non-blank options")]
    TooFewOptions,
    #[error("a question keeps at least 2 options")]
    OptionFloor,
    #[error("question text and objective required")]
    QuestionIncomplete,
    #[error("select a topic first")]
    NoTargetSelected,
    #[error("save the current question before continuing")]
    UnsavedDraft,
    #[error("add at least one question")]
    NoQuestions,
    #[error("no option at position {0}")]
    NoSuchOption(usize),
    #[error("no question at position {0}")]
    NoSuchQuestion(usize),
    #[error("question at position {0} is persisted; delete it instead")]
    PersistedQuestion(usize),
    #[error("option at position {0} is persisted; delete it instead")]
    PersistedOption(usize),
    #[error("no objective at position {0}")]
    NoSuchObjective(usize),
    #[error("add at least one objective")]
    NoObjectives,
    #[error("objective {position} must be linked to at least one parent objective")]
    MissingObjectiveLink { position: usize },
    #[error("cannot {action} from {from}")]
    InvalidTransition { from: Step, action: &'static str },
}

/// Which write of a quiz submission failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStage {
    Quiz,
    Question { index: usize },
    Option { question: usize, option: usize },
}

impl fmt::Display for SubmitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitStage::Quiz => write!(f, "quiz"),
            SubmitStage::Question { index } => write!(f, "question {}", index + 1),
            SubmitStage::Option { question, option } => {
                write!(f, "option {} of question {}", option + 1, question + 1)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthoringError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("failed to save {stage}: {source}")]
    Submission {
        stage: SubmitStage,
        #[source]
        source: ApiError,
    },
}

impl AuthoringError {
    pub fn at(stage: SubmitStage) -> impl FnOnce(ApiError) -> AuthoringError {
        move |source| AuthoringError::Submission { stage, source }
    }
}
