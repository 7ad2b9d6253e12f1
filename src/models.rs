use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use std::{fmt, str::FromStr};

/// Backend ids are opaque strings.
pub type Id = String;

/// Minimal body every create endpoint answers with.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub id: Id,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LearningOutcome {
    pub id: Id,
    pub code: String,
    pub description: String,
    pub bloom_level: Option<String>,
    pub order: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Module {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Topic {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
}

/// A module objective or a topic objective; both share one shape.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Objective {
    pub id: Id,
    pub description: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub code: String,
    pub order: i32,
}

/// One row of an objective's link list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LinkedRelation {
    pub id: Id,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Video,
    Lectura,
    Ejercicio,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basico,
    Intermedio,
    Avanzado,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: Id,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub url: String,
    pub duration_minutes: Option<u32>,
    pub is_mandatory: bool,
    pub difficulty: Option<Difficulty>,
    pub order: i32,
    pub topic_objective_id: Option<Id>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Quiz {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
    pub time_minutes: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub attempt_max: Option<u32>,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Question {
    pub id: Id,
    pub text: String,
    pub score: f64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub correct_explanation: String,
    pub topic_objective_id: Option<Id>,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnswerOption {
    pub id: Id,
    pub text: String,
    pub is_correct: bool,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub feedback: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct QuestionList {
    pub questions: Vec<Question>,
    #[serde(default)]
    pub total: usize,
}

#[derive(Deserialize, Debug, Clone)]
pub struct OptionList {
    pub options: Vec<AnswerOption>,
}

// --- request bodies ---

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct QuizPayload {
    pub title: String,
    pub description: Option<String>,
    pub time_minutes: Option<u32>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_max: Option<u32>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct QuestionPayload {
    pub text: String,
    pub score: f64,
    pub correct_explanation: Option<String>,
    pub topic_objective_id: Id,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OptionPayload {
    pub text: String,
    pub is_correct: bool,
    pub feedback: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ModulePayload {
    pub title: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

/// Topics share the module body.
pub type TopicPayload = ModulePayload;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ObjectivePayload {
    pub description: String,
    pub code: Option<String>,
    pub order: i32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LearningOutcomePayload {
    pub code: String,
    pub description: String,
    pub bloom_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResourcePayload {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub url: String,
    pub duration_minutes: Option<u32>,
    pub is_mandatory: bool,
    pub difficulty: Option<Difficulty>,
    pub topic_objective_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

/// Which objective level a link set belongs to.
///
/// Module objectives link to the course's learning outcomes; topic
/// objectives link to their module's objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectiveLevel {
    Module,
    Topic,
}

impl ObjectiveLevel {
    pub fn parent_segment(self) -> &'static str {
        match self {
            ObjectiveLevel::Module => "modules",
            ObjectiveLevel::Topic => "topics",
        }
    }

    pub fn related_segment(self) -> &'static str {
        match self {
            ObjectiveLevel::Module => "learning-outcomes",
            ObjectiveLevel::Topic => "module-objectives",
        }
    }

    /// Field naming the related id in a link body.
    pub fn related_field(self) -> &'static str {
        match self {
            ObjectiveLevel::Module => "learning_outcome_id",
            ObjectiveLevel::Topic => "module_objective_id",
        }
    }
}

impl fmt::Display for ObjectiveLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveLevel::Module => f.write_str("module"),
            ObjectiveLevel::Topic => f.write_str("topic"),
        }
    }
}

impl FromStr for ObjectiveLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "module" | "modules" => Ok(ObjectiveLevel::Module),
            "topic" | "topics" => Ok(ObjectiveLevel::Topic),
            other => Err(format!("unknown objective level `{other}`")),
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_text_fields_read_as_empty() {
        let q: Question = serde_json::from_value(json!({
            "id": "q1", "text": "2+2?", "score": 1.0,
            "correct_explanation": null, "topic_objective_id": "to1"
        }))
        .unwrap();
        assert_eq!(q.correct_explanation, "");

        let o: AnswerOption =
            serde_json::from_value(json!({"id": "o1", "text": "4", "is_correct": true})).unwrap();
        assert_eq!(o.feedback, "");
    }

    #[test]
    fn quiz_payload_omits_unset_scheduling_fields() {
        let body = serde_json::to_value(QuizPayload {
            title: "Unit 1".into(),
            description: None,
            time_minutes: Some(20),
            is_active: true,
            due_date: None,
            attempt_max: None,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"title": "Unit 1", "description": null, "time_minutes": 20, "is_active": true})
        );
    }

    #[test]
    fn resource_kind_uses_backend_names() {
        let v = serde_json::to_value(ResourceType::Lectura).unwrap();
        assert_eq!(v, json!("lectura"));
        assert_eq!("Topic".parse::<ObjectiveLevel>(), Ok(ObjectiveLevel::Topic));
        assert!("course".parse::<ObjectiveLevel>().is_err());
    }
}
