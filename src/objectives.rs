use std::collections::BTreeSet;

use crate::{
    client::ApiClient,
    error::{AuthoringError, ValidationError},
    link_sync::ObjectiveLinks,
    models::{Id, Objective, ObjectiveLevel, ObjectivePayload},
    services::paths,
    validate::{is_blank, non_blank},
};

/// An objective row in a module or topic form, with the parent-level
/// objectives it is linked to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectiveDraft {
    pub id: Option<Id>,
    pub description: String,
    pub code: String,
    pub linked: BTreeSet<Id>,
}

impl ObjectiveDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn persisted(objective: &Objective, linked: impl IntoIterator<Item = Id>) -> Self {
        Self {
            id: Some(objective.id.clone()),
            description: objective.description.clone(),
            code: objective.code.clone(),
            linked: linked.into_iter().collect(),
        }
    }

    pub fn with_links<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Id>,
    {
        self.linked.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Checkbox behaviour: adds the id if absent, removes it otherwise.
    pub fn toggle_link(&mut self, id: &str) -> bool {
        if self.linked.remove(id) {
            false
        } else {
            self.linked.insert(id.to_owned());
            true
        }
    }

    fn payload(&self, order: i32) -> ObjectivePayload {
        ObjectivePayload {
            description: self.description.trim().to_owned(),
            code: non_blank(&self.code),
            order,
        }
    }
}

/// Form-submit gate. Rows with a blank description are ignored; at least one
/// must remain and every remaining row needs a link.
pub fn validate_objectives(drafts: &[ObjectiveDraft]) -> Result<Vec<&ObjectiveDraft>, ValidationError> {
    let kept: Vec<&ObjectiveDraft> = drafts.iter().filter(|d| !is_blank(&d.description)).collect();
    if kept.is_empty() {
        return Err(ValidationError::NoObjectives);
    }
    if let Some(position) = kept.iter().position(|d| d.linked.is_empty()) {
        return Err(ValidationError::MissingObjectiveLink { position });
    }
    Ok(kept)
}

/// Saves every kept objective of one module or topic, in form order.
///
/// Existing objectives are updated and then have their links synced; new ones
/// are created and linked to every selected id. Orders are re-sequenced to
/// the form position. Returns the objective ids in order.
pub async fn save_objectives(
    api: &ApiClient,
    level: ObjectiveLevel,
    parent_id: &str,
    drafts: &[ObjectiveDraft],
) -> Result<Vec<Id>, AuthoringError> {
    let kept = validate_objectives(drafts)?;
    let mut ids = Vec::with_capacity(kept.len());
    let outcome = write_objectives(api, level, parent_id, &kept, &mut ids).await;

    // earlier rows may be written even when a later one failed
    api.invalidate(&paths::objectives(level, parent_id)).await;
    outcome?;
    tracing::info!(%level, parent_id, saved = ids.len(), "objectives saved");
    Ok(ids)
}

async fn write_objectives(
    api: &ApiClient,
    level: ObjectiveLevel,
    parent_id: &str,
    kept: &[&ObjectiveDraft],
    ids: &mut Vec<Id>,
) -> Result<(), AuthoringError> {
    for (i, draft) in kept.iter().enumerate() {
        let payload = draft.payload(i as i32 + 1);
        match &draft.id {
            Some(id) => {
                api.update_objective(level, parent_id, id, &payload).await?;
                ObjectiveLinks::new(api, level, parent_id, id)
                    .sync(&draft.linked)
                    .await?;
                ids.push(id.clone());
            }
            None => {
                let created = api.create_objective(level, parent_id, &payload).await?;
                let linked = ObjectiveLinks::new(api, level, parent_id, &created.id)
                    .link_all(&draft.linked)
                    .await?;
                tracing::debug!(%level, objective_id = %created.id, linked, "objective created");
                ids.push(created.id);
            }
        }
    }
    Ok(())
}

/// Removes an objective row from a form. A persisted objective is deleted on
/// the server at once, outside any later save of the form.
pub async fn delete_objective(
    api: &ApiClient,
    level: ObjectiveLevel,
    parent_id: &str,
    drafts: &mut Vec<ObjectiveDraft>,
    index: usize,
) -> Result<ObjectiveDraft, AuthoringError> {
    let draft = drafts
        .get(index)
        .ok_or(ValidationError::NoSuchObjective(index))?;
    if let Some(id) = &draft.id {
        api.delete_objective(level, parent_id, id).await?;
        api.invalidate(&paths::objectives(level, parent_id)).await;
        tracing::info!(%level, parent_id, objective_id = %id, "objective deleted");
    }
    Ok(drafts.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_link_flips_membership() {
        let mut d = ObjectiveDraft::new("Explain recursion");
        assert!(d.toggle_link("lo1"));
        assert!(d.linked.contains("lo1"));
        assert!(!d.toggle_link("lo1"));
        assert!(d.linked.is_empty());
    }

    #[test]
    fn blank_rows_are_ignored_but_kept_rows_need_links() {
        let drafts = vec![
            ObjectiveDraft::new("  "),
            ObjectiveDraft::new("Trace a loop").with_links(["lo1"]),
            ObjectiveDraft::new("Write a loop"),
        ];
        assert_eq!(
            validate_objectives(&drafts),
            Err(ValidationError::MissingObjectiveLink { position: 1 })
        );

        let only_blank = vec![ObjectiveDraft::new("")];
        assert_eq!(validate_objectives(&only_blank), Err(ValidationError::NoObjectives));

        let ok = vec![ObjectiveDraft::new("Trace a loop").with_links(["lo1", "lo2"])];
        assert_eq!(validate_objectives(&ok).map(|v| v.len()), Ok(1));
    }
}
