//! Typed wrappers over the backend's REST endpoints.
//!
//! Paths are relative to the configured base URL; every id is encoded as a
//! single path segment.

use serde_json::{Map, Value};

use crate::{
    client::{seg, ApiClient},
    error::ApiError,
    models::*,
};

pub mod paths {
    use super::seg;
    use crate::models::ObjectiveLevel;

    pub fn course(course: &str) -> String {
        format!("/courses/{}", seg(course))
    }
    pub fn learning_outcomes(course: &str) -> String {
        format!("/courses/{}/learning-outcomes", seg(course))
    }
    pub fn learning_outcome(course: &str, id: &str) -> String {
        format!("{}/{}", learning_outcomes(course), seg(id))
    }
    pub fn modules(course: &str) -> String {
        format!("/courses/{}/modules", seg(course))
    }
    pub fn module(course: &str, id: &str) -> String {
        format!("{}/{}", modules(course), seg(id))
    }
    pub fn topics(module: &str) -> String {
        format!("/modules/{}/topics", seg(module))
    }
    pub fn topic(module: &str, id: &str) -> String {
        format!("{}/{}", topics(module), seg(id))
    }
    pub fn objectives(level: ObjectiveLevel, parent: &str) -> String {
        format!("/{}/{}/objectives", level.parent_segment(), seg(parent))
    }
    pub fn objective(level: ObjectiveLevel, parent: &str, id: &str) -> String {
        format!("{}/{}", objectives(level, parent), seg(id))
    }
    pub fn links(level: ObjectiveLevel, parent: &str, objective_id: &str) -> String {
        format!("{}/{}", objective(level, parent, objective_id), level.related_segment())
    }
    pub fn link(level: ObjectiveLevel, parent: &str, objective_id: &str, related: &str) -> String {
        format!("{}/{}", links(level, parent, objective_id), seg(related))
    }
    pub fn resources(topic: &str) -> String {
        format!("/topics/{}/resources", seg(topic))
    }
    pub fn resource(topic: &str, id: &str) -> String {
        format!("{}/{}", resources(topic), seg(id))
    }
    pub fn quizzes(topic: &str) -> String {
        format!("/topics/{}/quizzes", seg(topic))
    }
    pub fn quiz(topic: &str, id: &str) -> String {
        format!("{}/{}", quizzes(topic), seg(id))
    }
    /// Prefix shared by every read nested under one quiz.
    pub fn quiz_scope(quiz: &str) -> String {
        format!("/quizzes/{}", seg(quiz))
    }
    pub fn questions(quiz: &str) -> String {
        format!("{}/questions", quiz_scope(quiz))
    }
    pub fn question(quiz: &str, id: &str) -> String {
        format!("{}/{}", questions(quiz), seg(id))
    }
    pub fn options(question: &str) -> String {
        format!("/questions/{}/options", seg(question))
    }
    pub fn option(question: &str, id: &str) -> String {
        format!("{}/{}", options(question), seg(id))
    }
}

impl ApiClient {
    // --- learning outcomes ---

    pub async fn create_learning_outcome(&self, course: &str, body: &LearningOutcomePayload) -> Result<Created, ApiError> {
        self.post(&paths::learning_outcomes(course), body).await
    }
    pub async fn update_learning_outcome(&self, course: &str, id: &str, body: &LearningOutcomePayload) -> Result<(), ApiError> {
        self.put(&paths::learning_outcome(course, id), body).await
    }

    // --- modules & topics ---

    pub async fn create_module(&self, course: &str, body: &ModulePayload) -> Result<Created, ApiError> {
        self.post(&paths::modules(course), body).await
    }
    pub async fn update_module(&self, course: &str, id: &str, body: &ModulePayload) -> Result<(), ApiError> {
        self.put(&paths::module(course, id), body).await
    }
    pub async fn create_topic(&self, module: &str, body: &TopicPayload) -> Result<Created, ApiError> {
        self.post(&paths::topics(module), body).await
    }
    pub async fn update_topic(&self, module: &str, id: &str, body: &TopicPayload) -> Result<(), ApiError> {
        self.put(&paths::topic(module, id), body).await
    }

    // --- objectives and their links ---

    pub async fn create_objective(&self, level: ObjectiveLevel, parent: &str, body: &ObjectivePayload) -> Result<Created, ApiError> {
        self.post(&paths::objectives(level, parent), body).await
    }
    pub async fn update_objective(&self, level: ObjectiveLevel, parent: &str, id: &str, body: &ObjectivePayload) -> Result<(), ApiError> {
        self.put(&paths::objective(level, parent, id), body).await
    }
    pub async fn delete_objective(&self, level: ObjectiveLevel, parent: &str, id: &str) -> Result<(), ApiError> {
        self.delete(&paths::objective(level, parent, id)).await
    }

    /// Always a fresh read: the result is diffed against.
    pub async fn linked(&self, level: ObjectiveLevel, parent: &str, objective_id: &str) -> Result<Vec<LinkedRelation>, ApiError> {
        self.fetch(&paths::links(level, parent, objective_id)).await
    }

    pub async fn link(&self, level: ObjectiveLevel, parent: &str, objective_id: &str, related: &str, is_primary: bool) -> Result<(), ApiError> {
        let mut body = Map::new();
        body.insert(level.related_field().to_owned(), Value::String(related.to_owned()));
        body.insert("is_primary".to_owned(), Value::Bool(is_primary));
        self.post::<Value, _>(&paths::links(level, parent, objective_id), &body)
            .await
            .map(|_| ())
            .or_else(|e| match e {
                // some link endpoints answer 201 with no body
                ApiError::EmptyBody(_) => Ok(()),
                other => Err(other),
            })
    }

    pub async fn unlink(&self, level: ObjectiveLevel, parent: &str, objective_id: &str, related: &str) -> Result<(), ApiError> {
        self.delete(&paths::link(level, parent, objective_id, related)).await
    }

    // --- resources ---

    pub async fn create_resource(&self, topic: &str, body: &ResourcePayload) -> Result<Created, ApiError> {
        self.post(&paths::resources(topic), body).await
    }
    pub async fn update_resource(&self, topic: &str, id: &str, body: &ResourcePayload) -> Result<(), ApiError> {
        self.put(&paths::resource(topic, id), body).await
    }

    // --- quizzes, questions, options ---

    pub async fn list_quizzes(&self, topic: &str) -> Result<Vec<Quiz>, ApiError> {
        self.get(&paths::quizzes(topic)).await
    }
    pub async fn update_quiz(&self, topic: &str, id: &str, body: &QuizPayload) -> Result<(), ApiError> {
        self.put(&paths::quiz(topic, id), body).await
    }
    pub async fn list_questions(&self, quiz: &str) -> Result<Vec<Question>, ApiError> {
        self.fetch::<QuestionList>(&paths::questions(quiz)).await.map(|l| l.questions)
    }
    pub async fn update_question(&self, quiz: &str, id: &str, body: &QuestionPayload) -> Result<(), ApiError> {
        self.put(&paths::question(quiz, id), body).await
    }
    pub async fn delete_question(&self, quiz: &str, id: &str) -> Result<(), ApiError> {
        self.delete(&paths::question(quiz, id)).await
    }
    pub async fn list_options(&self, question: &str) -> Result<Vec<AnswerOption>, ApiError> {
        self.fetch::<OptionList>(&paths::options(question)).await.map(|l| l.options)
    }
    pub async fn update_option(&self, question: &str, id: &str, body: &OptionPayload) -> Result<(), ApiError> {
        self.put(&paths::option(question, id), body).await
    }
    pub async fn delete_option(&self, question: &str, id: &str) -> Result<(), ApiError> {
        self.delete(&paths::option(question, id)).await
    }

    // Creates inside a quiz submission carry an idempotency key.

    pub async fn create_quiz(&self, topic: &str, body: &QuizPayload, key: &str) -> Result<Created, ApiError> {
        self.post_idempotent(&paths::quizzes(topic), body, key).await
    }
    pub async fn create_question(&self, quiz: &str, body: &QuestionPayload, key: &str) -> Result<Created, ApiError> {
        self.post_idempotent(&paths::questions(quiz), body, key).await
    }
    pub async fn create_option(&self, question: &str, body: &OptionPayload, key: &str) -> Result<Created, ApiError> {
        self.post_idempotent(&paths::options(question), body, key).await
    }
}
