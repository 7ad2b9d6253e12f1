//! Course outline forms: modules, topics, resources and learning outcomes.
//!
//! Each operation validates the whole form before the first network call,
//! then runs its writes in order and drops the course's cached reads.

use crate::{
    client::ApiClient,
    error::{AuthoringError, ValidationError},
    models::*,
    objectives::{save_objectives, validate_objectives, ObjectiveDraft},
    services::paths,
    validate::{next_order, non_blank, require},
};

/// Title and description shared by module and topic forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionForm {
    pub title: String,
    pub description: String,
}

impl SectionForm {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
        }
    }

    fn validate(&self, objectives: &[ObjectiveDraft]) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        validate_objectives(objectives)?;
        Ok(())
    }

    fn payload(&self, order: Option<i32>) -> ModulePayload {
        ModulePayload {
            title: self.title.trim().to_owned(),
            description: non_blank(&self.description),
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedSection {
    pub id: Id,
    pub objective_ids: Vec<Id>,
}

/// New module at the end of the course; its objectives link to learning
/// outcomes.
pub async fn create_module(
    api: &ApiClient,
    course_id: &str,
    existing: &[Module],
    form: &SectionForm,
    objectives: &[ObjectiveDraft],
) -> Result<SavedSection, AuthoringError> {
    form.validate(objectives)?;
    let order = next_order(existing);
    let created = api
        .create_module(course_id, &form.payload(Some(order)))
        .await?;
    tracing::info!(course_id, module_id = %created.id, order, "module created");
    finish_section(api, course_id, ObjectiveLevel::Module, created.id, objectives).await
}

pub async fn update_module(
    api: &ApiClient,
    course_id: &str,
    module_id: &str,
    form: &SectionForm,
    objectives: &[ObjectiveDraft],
) -> Result<SavedSection, AuthoringError> {
    form.validate(objectives)?;
    api.update_module(course_id, module_id, &form.payload(None)).await?;
    finish_section(api, course_id, ObjectiveLevel::Module, module_id.to_owned(), objectives).await
}

/// New topic at the end of the module; its objectives link to the module's
/// objectives.
pub async fn create_topic(
    api: &ApiClient,
    course_id: &str,
    module_id: &str,
    existing: &[Topic],
    form: &SectionForm,
    objectives: &[ObjectiveDraft],
) -> Result<SavedSection, AuthoringError> {
    form.validate(objectives)?;
    let order = next_order(existing);
    let created = api.create_topic(module_id, &form.payload(Some(order))).await?;
    tracing::info!(module_id, topic_id = %created.id, order, "topic created");
    finish_section(api, course_id, ObjectiveLevel::Topic, created.id, objectives).await
}

pub async fn update_topic(
    api: &ApiClient,
    course_id: &str,
    module_id: &str,
    topic_id: &str,
    form: &SectionForm,
    objectives: &[ObjectiveDraft],
) -> Result<SavedSection, AuthoringError> {
    form.validate(objectives)?;
    api.update_topic(module_id, topic_id, &form.payload(None)).await?;
    finish_section(api, course_id, ObjectiveLevel::Topic, topic_id.to_owned(), objectives).await
}

async fn finish_section(
    api: &ApiClient,
    course_id: &str,
    level: ObjectiveLevel,
    id: Id,
    objectives: &[ObjectiveDraft],
) -> Result<SavedSection, AuthoringError> {
    let outcome = save_objectives(api, level, &id, objectives).await;
    api.invalidate(&paths::course(course_id)).await;
    Ok(SavedSection {
        objective_ids: outcome?,
        id,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceForm {
    pub title: String,
    pub kind: Option<ResourceType>,
    pub url: String,
    pub duration_minutes: Option<u32>,
    pub is_mandatory: bool,
    pub difficulty: Option<Difficulty>,
    pub topic_objective_id: String,
}

impl Default for ResourceForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            kind: None,
            url: String::new(),
            duration_minutes: None,
            is_mandatory: true,
            difficulty: None,
            topic_objective_id: String::new(),
        }
    }
}

impl ResourceForm {
    pub fn validate(&self) -> Result<ResourceType, ValidationError> {
        require("title", &self.title)?;
        let kind = self.kind.ok_or(ValidationError::Required("type"))?;
        require("url", &self.url)?;
        require("topic objective", &self.topic_objective_id)?;
        Ok(kind)
    }

    fn payload(&self, kind: ResourceType, order: Option<i32>) -> ResourcePayload {
        ResourcePayload {
            title: self.title.trim().to_owned(),
            kind,
            url: self.url.trim().to_owned(),
            duration_minutes: self.duration_minutes,
            is_mandatory: self.is_mandatory,
            difficulty: self.difficulty,
            topic_objective_id: self.topic_objective_id.clone(),
            order,
        }
    }
}

pub async fn create_resource(
    api: &ApiClient,
    course_id: &str,
    topic_id: &str,
    existing: &[Resource],
    form: &ResourceForm,
) -> Result<Id, AuthoringError> {
    let kind = form.validate()?;
    let order = next_order(existing);
    let created = api
        .create_resource(topic_id, &form.payload(kind, Some(order)))
        .await?;
    api.invalidate_all(&[paths::course(course_id), paths::resources(topic_id)])
        .await;
    tracing::info!(topic_id, resource_id = %created.id, order, "resource created");
    Ok(created.id)
}

pub async fn update_resource(
    api: &ApiClient,
    course_id: &str,
    topic_id: &str,
    resource_id: &str,
    form: &ResourceForm,
) -> Result<(), AuthoringError> {
    let kind = form.validate()?;
    api.update_resource(topic_id, resource_id, &form.payload(kind, None))
        .await?;
    api.invalidate_all(&[paths::course(course_id), paths::resources(topic_id)])
        .await;
    Ok(())
}

fn learning_outcome_payload(
    code: &str,
    description: &str,
    bloom_level: Option<&str>,
    order: Option<i32>,
) -> Result<LearningOutcomePayload, ValidationError> {
    require("code", code)?;
    require("description", description)?;
    Ok(LearningOutcomePayload {
        code: code.trim().to_owned(),
        description: description.trim().to_owned(),
        bloom_level: bloom_level.and_then(non_blank),
        order,
    })
}

pub async fn create_learning_outcome(
    api: &ApiClient,
    course_id: &str,
    existing: &[LearningOutcome],
    code: &str,
    description: &str,
    bloom_level: Option<&str>,
) -> Result<Id, AuthoringError> {
    let order = next_order(existing);
    let body = learning_outcome_payload(code, description, bloom_level, Some(order))?;
    let created = api.create_learning_outcome(course_id, &body).await?;
    api.invalidate(&paths::course(course_id)).await;
    tracing::info!(course_id, learning_outcome_id = %created.id, order, "learning outcome created");
    Ok(created.id)
}

/// Edits code, description and Bloom level; the order is left as it is.
pub async fn update_learning_outcome(
    api: &ApiClient,
    course_id: &str,
    learning_outcome_id: &str,
    code: &str,
    description: &str,
    bloom_level: Option<&str>,
) -> Result<(), AuthoringError> {
    let body = learning_outcome_payload(code, description, bloom_level, None)?;
    api.update_learning_outcome(course_id, learning_outcome_id, &body)
        .await?;
    api.invalidate_all(&[paths::course(course_id), paths::learning_outcomes(course_id)])
        .await;
    tracing::info!(course_id, learning_outcome_id, "learning outcome updated");
    Ok(())
}
