//! Quiz authoring wizard.
//!
//! The wizard walks `selector → quiz-info → questions → summary` and, on
//! submit, writes the quiz, then each question, then that question's options,
//! strictly one call at a time. The backend offers no transaction around the
//! chain. Every id the backend hands back is written into the wizard state as
//! soon as it arrives, and each written item is marked synced, so a retry after
//! a partial failure resumes where the chain stopped instead of creating a
//! second quiz.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use crate::{
    client::ApiClient,
    error::{AuthoringError, SubmitStage, ValidationError},
    models::{AnswerOption, Id, OptionPayload, Question, QuestionPayload, Quiz, QuizPayload},
    services::paths,
    validate::{is_blank, non_blank, require},
};

pub const MIN_OPTIONS: usize = 2;
pub const DEFAULT_SCORE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Selector,
    QuizInfo,
    Questions,
    Summary,
    Submitted,
    Cancelled,
}

impl Step {
    pub fn is_terminal(self) -> bool {
        matches!(self, Step::Submitted | Step::Cancelled)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Selector => "selector",
            Step::QuizInfo => "quiz-info",
            Step::Questions => "questions",
            Step::Summary => "summary",
            Step::Submitted => "submitted",
            Step::Cancelled => "cancelled",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Next,
    Back,
    Cancel,
}

impl Action {
    fn name(self) -> &'static str {
        match self {
            Action::Next => "go forward",
            Action::Back => "go back",
            Action::Cancel => "cancel",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizHeader {
    pub title: String,
    pub description: String,
    pub time_minutes: Option<u32>,
    pub is_active: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub attempt_max: Option<u32>,
}

impl Default for QuizHeader {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            time_minutes: None,
            is_active: true,
            due_date: None,
            attempt_max: None,
        }
    }
}

impl QuizHeader {
    pub fn from_quiz(quiz: &Quiz) -> Self {
        Self {
            title: quiz.title.clone(),
            description: quiz.description.clone().unwrap_or_default(),
            time_minutes: quiz.time_minutes,
            is_active: quiz.is_active,
            due_date: quiz.due_date,
            attempt_max: quiz.attempt_max,
        }
    }

    pub fn payload(&self) -> QuizPayload {
        QuizPayload {
            title: self.title.trim().to_owned(),
            description: non_blank(&self.description),
            time_minutes: self.time_minutes,
            is_active: self.is_active,
            due_date: self.due_date,
            attempt_max: self.attempt_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionDraft {
    pub id: Option<Id>,
    pub text: String,
    pub is_correct: bool,
    pub feedback: String,
    key: Uuid,
    synced: bool,
}

impl OptionDraft {
    pub fn blank() -> Self {
        Self {
            id: None,
            text: String::new(),
            is_correct: false,
            feedback: String::new(),
            key: Uuid::new_v4(),
            synced: false,
        }
    }

    pub fn persisted(option: &AnswerOption) -> Self {
        Self {
            id: Some(option.id.clone()),
            text: option.text.clone(),
            is_correct: option.is_correct,
            feedback: option.feedback.clone(),
            key: Uuid::new_v4(),
            synced: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    fn payload(&self) -> OptionPayload {
        OptionPayload {
            text: self.text.trim().to_owned(),
            is_correct: self.is_correct,
            feedback: non_blank(&self.feedback),
        }
    }
}

/// A question being edited, or one already committed to the wizard's list.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    pub id: Option<Id>,
    pub text: String,
    pub score: f64,
    pub correct_explanation: String,
    pub topic_objective_id: Option<Id>,
    options: Vec<OptionDraft>,
    key: Uuid,
    synced: bool,
}

impl Default for QuestionDraft {
    fn default() -> Self {
        Self::blank()
    }
}

impl QuestionDraft {
    /// Empty text, score 1, no objective, two blank options.
    pub fn blank() -> Self {
        Self {
            id: None,
            text: String::new(),
            score: DEFAULT_SCORE,
            correct_explanation: String::new(),
            topic_objective_id: None,
            options: vec![OptionDraft::blank(), OptionDraft::blank()],
            key: Uuid::new_v4(),
            synced: false,
        }
    }

    pub fn persisted(question: &Question, options: &[AnswerOption]) -> Self {
        Self {
            id: Some(question.id.clone()),
            text: question.text.clone(),
            score: question.score,
            correct_explanation: question.correct_explanation.clone(),
            topic_objective_id: question.topic_objective_id.clone().filter(|s| !is_blank(s)),
            options: options.iter().map(OptionDraft::persisted).collect(),
            key: Uuid::new_v4(),
            synced: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// The "nothing typed yet" test used by the `questions → summary` guard.
    pub fn is_blank(&self) -> bool {
        is_blank(&self.text)
    }

    pub fn options(&self) -> &[OptionDraft] {
        &self.options
    }

    pub fn add_option(&mut self) -> usize {
        self.options.push(OptionDraft::blank());
        self.options.len() - 1
    }

    /// Drops an option that was never saved to the server.
    pub fn remove_option(&mut self, index: usize) -> Result<OptionDraft, ValidationError> {
        self.check_removable(index)?;
        if !self.options[index].is_new() {
            return Err(ValidationError::PersistedOption(index));
        }
        Ok(self.options.remove(index))
    }

    fn check_removable(&self, index: usize) -> Result<(), ValidationError> {
        if index >= self.options.len() {
            return Err(ValidationError::NoSuchOption(index));
        }
        if self.options.len() <= MIN_OPTIONS {
            return Err(ValidationError::OptionFloor);
        }
        Ok(())
    }

    pub fn set_option_text(&mut self, index: usize, text: impl Into<String>) -> Result<(), ValidationError> {
        self.option_mut(index)?.text = text.into();
        Ok(())
    }

    pub fn set_option_feedback(&mut self, index: usize, feedback: impl Into<String>) -> Result<(), ValidationError> {
        self.option_mut(index)?.feedback = feedback.into();
        Ok(())
    }

    /// Marking one option correct clears every sibling in the same step.
    pub fn set_correct(&mut self, index: usize, correct: bool) -> Result<(), ValidationError> {
        if index >= self.options.len() {
            return Err(ValidationError::NoSuchOption(index));
        }
        if correct {
            for (i, opt) in self.options.iter_mut().enumerate() {
                opt.is_correct = i == index;
            }
        } else {
            self.options[index].is_correct = false;
        }
        Ok(())
    }

    pub fn correct_count(&self) -> usize {
        self.options.iter().filter(|o| o.is_correct).count()
    }

    /// Commit gate. The correct option has to be one that survives the
    /// blank-option filter.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let filled: Vec<&OptionDraft> = self.options.iter().filter(|o| !is_blank(&o.text)).collect();
        if filled.iter().filter(|o| o.is_correct).count() != 1 {
            return Err(ValidationError::NoCorrectOption);
        }
        if filled.len() < MIN_OPTIONS {
            return Err(ValidationError::TooFewOptions);
        }
        if is_blank(&self.text) || self.topic_objective_id.as_deref().map_or(true, is_blank) {
            return Err(ValidationError::QuestionIncomplete);
        }
        Ok(())
    }

    fn option_mut(&mut self, index: usize) -> Result<&mut OptionDraft, ValidationError> {
        self.options
            .get_mut(index)
            .ok_or(ValidationError::NoSuchOption(index))
    }

    /// Copy destined for the committed list: blank options dropped, every
    /// part marked as needing a write.
    fn committed_copy(&self) -> QuestionDraft {
        let mut q = self.clone();
        q.options.retain(|o| !is_blank(&o.text));
        q.synced = false;
        for o in &mut q.options {
            o.synced = false;
        }
        q
    }

    fn payload(&self) -> QuestionPayload {
        QuestionPayload {
            text: self.text.trim().to_owned(),
            score: self.score,
            correct_explanation: non_blank(&self.correct_explanation),
            topic_objective_id: self.topic_objective_id.clone().unwrap_or_default(),
        }
    }
}

/// Counts of what one submission call wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitReport {
    pub quiz_id: Id,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

impl SubmitReport {
    fn writes(&self) -> usize {
        self.created + self.updated
    }
}

#[derive(Debug, Clone)]
pub struct QuizWizard {
    course_id: Id,
    topic_id: Option<Id>,
    quiz_id: Option<Id>,
    with_selector: bool,
    step: Step,
    header: QuizHeader,
    header_synced: bool,
    session_key: Uuid,
    questions: Vec<QuestionDraft>,
    draft: QuestionDraft,
}

impl QuizWizard {
    /// Create wizard for a known topic; opens on `quiz-info`.
    pub fn new(course_id: impl Into<Id>, topic_id: impl Into<Id>) -> Self {
        Self::blank(course_id.into(), Some(topic_id.into()), false, Step::QuizInfo)
    }

    /// Create wizard that first asks where the quiz goes.
    pub fn with_selector(course_id: impl Into<Id>) -> Self {
        Self::blank(course_id.into(), None, true, Step::Selector)
    }

    /// Edit wizard for an existing quiz. Loads its questions, then each
    /// question's options, with uncached reads.
    pub async fn edit(
        api: &ApiClient,
        course_id: impl Into<Id>,
        topic_id: impl Into<Id>,
        quiz: &Quiz,
    ) -> Result<Self, AuthoringError> {
        let mut wizard = Self::blank(course_id.into(), Some(topic_id.into()), false, Step::QuizInfo);
        wizard.quiz_id = Some(quiz.id.clone());
        wizard.header = QuizHeader::from_quiz(quiz);

        for question in api.list_questions(&quiz.id).await? {
            let options = api.list_options(&question.id).await?;
            wizard.questions.push(QuestionDraft::persisted(&question, &options));
        }
        tracing::info!(
            quiz_id = %quiz.id,
            questions = wizard.questions.len(),
            "loaded quiz for editing"
        );
        Ok(wizard)
    }

    fn blank(course_id: Id, topic_id: Option<Id>, with_selector: bool, step: Step) -> Self {
        Self {
            course_id,
            topic_id,
            quiz_id: None,
            with_selector,
            step,
            header: QuizHeader::default(),
            header_synced: false,
            session_key: Uuid::new_v4(),
            questions: Vec::new(),
            draft: QuestionDraft::blank(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn topic_id(&self) -> Option<&str> {
        self.topic_id.as_deref()
    }

    /// Set once the quiz exists on the server, by edit or by a submission
    /// that got at least that far.
    pub fn quiz_id(&self) -> Option<&str> {
        self.quiz_id.as_deref()
    }

    pub fn header(&self) -> &QuizHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut QuizHeader {
        self.header_synced = false;
        &mut self.header
    }

    pub fn questions(&self) -> &[QuestionDraft] {
        &self.questions
    }

    pub fn draft(&self) -> &QuestionDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut QuestionDraft {
        &mut self.draft
    }

    pub fn select_topic(&mut self, topic_id: impl Into<Id>) -> Result<(), ValidationError> {
        if self.step != Step::Selector {
            return Err(ValidationError::InvalidTransition {
                from: self.step,
                action: "select a topic",
            });
        }
        self.topic_id = Some(topic_id.into()).filter(|t: &Id| !is_blank(t));
        Ok(())
    }

    /// Pure transition function: where `action` leads from here, or why not.
    pub fn transition(&self, action: Action) -> Result<Step, ValidationError> {
        let invalid = || ValidationError::InvalidTransition {
            from: self.step,
            action: action.name(),
        };
        if self.step.is_terminal() {
            return Err(invalid());
        }
        match (self.step, action) {
            (_, Action::Cancel) => Ok(Step::Cancelled),

            (Step::Selector, Action::Next) => match &self.topic_id {
                Some(_) => Ok(Step::QuizInfo),
                None => Err(ValidationError::NoTargetSelected),
            },
            (Step::QuizInfo, Action::Next) => {
                if is_blank(&self.header.title) {
                    return Err(ValidationError::Required("title"));
                }
                Ok(Step::Questions)
            }
            (Step::Questions, Action::Next) => {
                if !self.draft.is_blank() {
                    return Err(ValidationError::UnsavedDraft);
                }
                if self.questions.is_empty() {
                    return Err(ValidationError::NoQuestions);
                }
                Ok(Step::Summary)
            }

            (Step::QuizInfo, Action::Back) if self.with_selector => Ok(Step::Selector),
            (Step::Questions, Action::Back) => Ok(Step::QuizInfo),
            (Step::Summary, Action::Back) => Ok(Step::Questions),

            _ => Err(invalid()),
        }
    }

    /// Applies `transition`. Cancelling throws away everything held in memory.
    pub fn advance(&mut self, action: Action) -> Result<Step, ValidationError> {
        let next = self.transition(action)?;
        tracing::debug!(from = %self.step, to = %next, "wizard step");
        if next == Step::Cancelled {
            if let Some(quiz_id) = &self.quiz_id {
                tracing::warn!(%quiz_id, "wizard cancelled with a partially saved quiz");
            }
            self.header = QuizHeader::default();
            self.questions.clear();
            self.draft = QuestionDraft::blank();
        }
        self.step = next;
        Ok(next)
    }

    /// Save-current-question: validate the draft, append a filtered copy,
    /// reset the draft. On rejection neither the list nor the draft changes.
    pub fn commit_question(&mut self) -> Result<usize, ValidationError> {
        if self.step != Step::Questions {
            return Err(ValidationError::InvalidTransition {
                from: self.step,
                action: "save a question",
            });
        }
        self.draft.validate()?;
        self.questions.push(self.draft.committed_copy());
        self.draft = QuestionDraft::blank();
        Ok(self.questions.len())
    }

    /// Moves a committed question back into the (empty) draft for editing.
    pub fn reopen_question(&mut self, index: usize) -> Result<(), ValidationError> {
        if index >= self.questions.len() {
            return Err(ValidationError::NoSuchQuestion(index));
        }
        if !self.draft.is_blank() {
            return Err(ValidationError::UnsavedDraft);
        }
        self.draft = self.questions.remove(index);
        Ok(())
    }

    /// Drops a question that was never saved to the server.
    pub fn remove_question(&mut self, index: usize) -> Result<QuestionDraft, ValidationError> {
        match self.questions.get(index) {
            None => Err(ValidationError::NoSuchQuestion(index)),
            Some(q) if !q.is_new() => Err(ValidationError::PersistedQuestion(index)),
            Some(_) => Ok(self.questions.remove(index)),
        }
    }

    /// Deletes a question, going to the server at once when it is persisted.
    /// Callers confirm with the user first; this is outside the submit chain
    /// and closing the wizard afterwards does not bring the question back.
    pub async fn delete_question(&mut self, api: &ApiClient, index: usize) -> Result<(), AuthoringError> {
        let question = self
            .questions
            .get(index)
            .ok_or(ValidationError::NoSuchQuestion(index))?;
        if let (Some(question_id), Some(quiz_id)) = (question.id.clone(), self.quiz_id.clone()) {
            api.delete_question(&quiz_id, &question_id).await?;
            api.invalidate(&paths::quiz_scope(&quiz_id)).await;
            tracing::info!(%quiz_id, %question_id, "question deleted");
        }
        self.questions.remove(index);
        Ok(())
    }

    /// Deletes an option of the question being edited, going to the server at
    /// once when it is persisted. Submit never touches options missing from
    /// the draft.
    pub async fn delete_option(&mut self, api: &ApiClient, index: usize) -> Result<OptionDraft, AuthoringError> {
        self.draft.check_removable(index)?;
        let option_id = self.draft.options[index].id.clone();
        if let (Some(option_id), Some(question_id)) = (option_id, self.draft.id.clone()) {
            api.delete_option(&question_id, &option_id).await?;
            api.invalidate(&paths::options(&question_id)).await;
            if let Some(quiz_id) = &self.quiz_id {
                api.invalidate(&paths::quiz_scope(quiz_id)).await;
            }
            tracing::info!(%question_id, %option_id, "option deleted");
        }
        Ok(self.draft.options.remove(index))
    }

    /// Cache key patterns a submission makes stale.
    pub fn invalidates(&self) -> Vec<String> {
        let mut keys = vec![paths::course(&self.course_id)];
        if let Some(topic) = &self.topic_id {
            keys.push(paths::quizzes(topic));
        }
        if let Some(quiz) = &self.quiz_id {
            keys.push(paths::quiz_scope(quiz));
        }
        keys
    }

    /// Writes the quiz, then each question and its options, in list order.
    ///
    /// On failure the committed list keeps all its data and the error names
    /// the stage that failed. Calling again picks up from that stage.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<SubmitReport, AuthoringError> {
        if self.step != Step::Summary {
            return Err(ValidationError::InvalidTransition {
                from: self.step,
                action: "submit",
            }
            .into());
        }
        if self.questions.is_empty() {
            return Err(ValidationError::NoQuestions.into());
        }
        let topic_id = self.topic_id.clone().ok_or(ValidationError::NoTargetSelected)?;

        let mut report = SubmitReport::default();
        let outcome = self.write_chain(api, &topic_id, &mut report).await;
        if report.writes() > 0 {
            api.invalidate_all(&self.invalidates()).await;
        }
        match outcome {
            Ok(()) => {
                tracing::info!(
                    quiz_id = %report.quiz_id,
                    created = report.created,
                    updated = report.updated,
                    skipped = report.skipped,
                    "quiz saved"
                );
                self.step = Step::Submitted;
                Ok(report)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    quiz_id = ?self.quiz_id,
                    written = report.writes(),
                    "quiz submission stopped; saved records are kept for retry"
                );
                Err(e)
            }
        }
    }

    async fn write_chain(
        &mut self,
        api: &ApiClient,
        topic_id: &str,
        report: &mut SubmitReport,
    ) -> Result<(), AuthoringError> {
        let payload = self.header.payload();
        let quiz_id = match self.quiz_id.clone() {
            None => {
                let created = api
                    .create_quiz(topic_id, &payload, &self.session_key.to_string())
                    .await
                    .map_err(AuthoringError::at(SubmitStage::Quiz))?;
                self.quiz_id = Some(created.id.clone());
                self.header_synced = true;
                report.created += 1;
                created.id
            }
            Some(id) if !self.header_synced => {
                api.update_quiz(topic_id, &id, &payload)
                    .await
                    .map_err(AuthoringError::at(SubmitStage::Quiz))?;
                self.header_synced = true;
                report.updated += 1;
                id
            }
            Some(id) => {
                report.skipped += 1;
                id
            }
        };
        report.quiz_id = quiz_id.clone();

        for qi in 0..self.questions.len() {
            let question_id = self.write_question(api, &quiz_id, qi, report).await?;
            for oi in 0..self.questions[qi].options.len() {
                self.write_option(api, &question_id, qi, oi, report).await?;
            }
        }
        Ok(())
    }

    async fn write_question(
        &mut self,
        api: &ApiClient,
        quiz_id: &str,
        qi: usize,
        report: &mut SubmitReport,
    ) -> Result<Id, AuthoringError> {
        let stage = SubmitStage::Question { index: qi };
        let question = &self.questions[qi];
        let payload = question.payload();
        let id = match (question.id.clone(), question.synced) {
            (Some(id), true) => {
                report.skipped += 1;
                return Ok(id);
            }
            (Some(id), false) => {
                api.update_question(quiz_id, &id, &payload)
                    .await
                    .map_err(AuthoringError::at(stage))?;
                report.updated += 1;
                id
            }
            (None, _) => {
                let key = question.key.to_string();
                let created = api
                    .create_question(quiz_id, &payload, &key)
                    .await
                    .map_err(AuthoringError::at(stage))?;
                report.created += 1;
                created.id
            }
        };
        let question = &mut self.questions[qi];
        question.id = Some(id.clone());
        question.synced = true;
        Ok(id)
    }

    async fn write_option(
        &mut self,
        api: &ApiClient,
        question_id: &str,
        qi: usize,
        oi: usize,
        report: &mut SubmitReport,
    ) -> Result<(), AuthoringError> {
        let stage = SubmitStage::Option {
            question: qi,
            option: oi,
        };
        let option = &self.questions[qi].options[oi];
        if option.synced {
            report.skipped += 1;
            return Ok(());
        }
        let payload = option.payload();
        let id = match option.id.clone() {
            Some(id) => {
                api.update_option(question_id, &id, &payload)
                    .await
                    .map_err(AuthoringError::at(stage))?;
                report.updated += 1;
                id
            }
            None => {
                let key = option.key.to_string();
                let created = api
                    .create_option(question_id, &payload, &key)
                    .await
                    .map_err(AuthoringError::at(stage))?;
                report.created += 1;
                created.id
            }
        };
        let option = &mut self.questions[qi].options[oi];
        option.id = Some(id);
        option.synced = true;
        Ok(())
    }
}

/// Quick edit of a quiz's header alone, without loading its questions.
pub async fn update_quiz_header(
    api: &ApiClient,
    course_id: &str,
    topic_id: &str,
    quiz_id: &str,
    header: &QuizHeader,
) -> Result<(), AuthoringError> {
    require("title", &header.title)?;
    api.update_quiz(topic_id, quiz_id, &header.payload()).await?;
    api.invalidate_all(&[
        paths::course(course_id),
        paths::quizzes(topic_id),
        paths::quiz_scope(quiz_id),
    ])
    .await;
    tracing::info!(topic_id, quiz_id, "quiz header updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_draft() -> QuestionDraft {
        let mut q = QuestionDraft::blank();
        q.text = "Capital of Peru?".into();
        q.topic_objective_id = Some("to1".into());
        q.set_option_text(0, "Lima").unwrap();
        q.set_option_text(1, "Cusco").unwrap();
        q.set_correct(0, true).unwrap();
        q
    }

    #[test]
    fn marking_correct_is_mutually_exclusive() {
        let mut q = QuestionDraft::blank();
        q.add_option();
        q.add_option();
        for i in [0, 3, 1, 1, 2, 0] {
            q.set_correct(i, true).unwrap();
            assert_eq!(q.correct_count(), 1);
            assert!(q.options()[i].is_correct);
        }
        q.set_correct(0, false).unwrap();
        assert_eq!(q.correct_count(), 0);
        assert_eq!(q.set_correct(9, true), Err(ValidationError::NoSuchOption(9)));
    }

    #[test]
    fn options_never_drop_below_two() {
        let mut q = QuestionDraft::blank();
        assert_eq!(q.remove_option(0), Err(ValidationError::OptionFloor));
        q.add_option();
        assert!(q.remove_option(2).is_ok());
        assert_eq!(q.options().len(), 2);
    }

    #[test]
    fn persisted_options_cannot_be_dropped_locally() {
        let question = Question {
            id: "qq1".into(),
            text: "Old".into(),
            score: 1.0,
            correct_explanation: String::new(),
            topic_objective_id: Some("to1".into()),
        };
        let options: Vec<AnswerOption> = ["op1", "op2", "op3"]
            .iter()
            .map(|id| AnswerOption {
                id: (*id).into(),
                text: id.to_uppercase(),
                is_correct: *id == "op1",
                feedback: String::new(),
            })
            .collect();
        let mut q = QuestionDraft::persisted(&question, &options);
        assert_eq!(q.remove_option(0), Err(ValidationError::PersistedOption(0)));
        let extra = q.add_option();
        assert!(q.remove_option(extra).is_ok());
        assert_eq!(q.options().len(), 3);
    }

    #[test]
    fn validate_checks_in_order() {
        assert!(filled_draft().validate().is_ok());

        let mut q = filled_draft();
        q.set_correct(0, false).unwrap();
        assert_eq!(q.validate(), Err(ValidationError::NoCorrectOption));

        let mut q = filled_draft();
        q.set_option_text(1, "   ").unwrap();
        assert_eq!(q.validate(), Err(ValidationError::TooFewOptions));

        let mut q = filled_draft();
        q.topic_objective_id = None;
        assert_eq!(q.validate(), Err(ValidationError::QuestionIncomplete));

        let mut q = filled_draft();
        q.text = " ".into();
        assert_eq!(q.validate(), Err(ValidationError::QuestionIncomplete));
    }

    #[test]
    fn a_blank_correct_option_does_not_count() {
        let mut q = filled_draft();
        let extra = q.add_option();
        q.set_correct(extra, true).unwrap();
        assert_eq!(q.validate(), Err(ValidationError::NoCorrectOption));
    }

    #[test]
    fn rejected_commit_changes_nothing() {
        let mut w = QuizWizard::new("c1", "t1");
        w.header_mut().title = "Quiz".into();
        w.advance(Action::Next).unwrap();

        let mut bad = filled_draft();
        bad.set_option_text(1, "").unwrap();
        *w.draft_mut() = bad.clone();

        assert_eq!(w.commit_question(), Err(ValidationError::TooFewOptions));
        assert!(w.questions().is_empty());
        assert_eq!(w.draft(), &bad);
    }

    #[test]
    fn commit_filters_blank_options_and_resets_draft() {
        let mut w = QuizWizard::new("c1", "t1");
        w.header_mut().title = "Quiz".into();
        w.advance(Action::Next).unwrap();
        let mut q = filled_draft();
        q.add_option();
        *w.draft_mut() = q;

        assert_eq!(w.commit_question(), Ok(1));
        assert_eq!(w.questions()[0].options().len(), 2);
        assert!(w.draft().is_blank());
        assert_eq!(w.draft().options().len(), 2);
        assert_eq!(w.draft().score, DEFAULT_SCORE);
    }

    #[test]
    fn guards_on_each_forward_step() {
        let mut w = QuizWizard::with_selector("c1");
        assert_eq!(w.transition(Action::Next), Err(ValidationError::NoTargetSelected));
        w.select_topic("t1").unwrap();
        assert_eq!(w.advance(Action::Next), Ok(Step::QuizInfo));

        assert_eq!(w.transition(Action::Next), Err(ValidationError::Required("title")));
        assert_eq!(w.transition(Action::Back), Ok(Step::Selector));
        w.header_mut().title = "Week 3".into();
        assert_eq!(w.advance(Action::Next), Ok(Step::Questions));

        assert_eq!(w.transition(Action::Next), Err(ValidationError::NoQuestions));
        *w.draft_mut() = filled_draft();
        w.commit_question().unwrap();

        w.draft_mut().text = "half typed".into();
        assert_eq!(w.transition(Action::Next), Err(ValidationError::UnsavedDraft));
        w.draft_mut().text.clear();
        assert_eq!(w.advance(Action::Next), Ok(Step::Summary));

        assert_eq!(w.advance(Action::Back), Ok(Step::Questions));
        assert_eq!(w.questions().len(), 1);
    }

    #[test]
    fn plain_create_wizard_cannot_go_back_from_quiz_info() {
        let w = QuizWizard::new("c1", "t1");
        assert!(matches!(
            w.transition(Action::Back),
            Err(ValidationError::InvalidTransition { from: Step::QuizInfo, .. })
        ));
    }

    #[test]
    fn cancel_discards_state_and_is_terminal() {
        let mut w = QuizWizard::new("c1", "t1");
        w.header_mut().title = "Draft quiz".into();
        w.advance(Action::Next).unwrap();
        *w.draft_mut() = filled_draft();
        w.commit_question().unwrap();

        assert_eq!(w.advance(Action::Cancel), Ok(Step::Cancelled));
        assert!(w.questions().is_empty());
        assert!(w.header().title.is_empty());
        assert!(w.transition(Action::Next).is_err());
        assert!(w.transition(Action::Cancel).is_err());
    }

    #[test]
    fn reopen_requires_an_empty_draft() {
        let mut w = QuizWizard::new("c1", "t1");
        w.header_mut().title = "Quiz".into();
        w.advance(Action::Next).unwrap();
        *w.draft_mut() = filled_draft();
        w.commit_question().unwrap();

        w.draft_mut().text = "other".into();
        assert_eq!(w.reopen_question(0), Err(ValidationError::UnsavedDraft));
        w.draft_mut().text.clear();
        w.reopen_question(0).unwrap();
        assert!(w.questions().is_empty());
        assert_eq!(w.draft().text, "Capital of Peru?");
    }
}
