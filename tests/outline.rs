//! Module, topic and resource forms against the in-memory backend.

mod common;

use serde_json::{json, Value};

use common::FakeBackend;
use sitae_authoring::{
    models::{Module, ObjectiveLevel, ResourceType},
    objectives::ObjectiveDraft,
    outline::{
        create_module, create_resource, update_learning_outcome, update_topic, ResourceForm,
        SectionForm,
    },
    services::paths,
    AuthoringError, ValidationError,
};

fn module(id: &str, order: i32) -> Module {
    Module {
        id: id.into(),
        title: format!("Module {order}"),
        description: None,
        order,
    }
}

#[tokio::test]
async fn new_module_goes_after_the_highest_order() {
    let backend = FakeBackend::new();
    let api = backend.client();
    let existing = [module("m1", 1), module("m4", 4), module("m2", 2)];
    let objectives = [ObjectiveDraft::new("Explain loops").with_links(["lo1", "lo2"])];

    let saved = create_module(&api, "c1", &existing, &SectionForm::new("Loops"), &objectives)
        .await
        .unwrap();

    assert_eq!(saved.id, "module-1");
    assert_eq!(saved.objective_ids, vec!["objective-2".to_string()]);
    assert_eq!(
        backend.writes(),
        vec![
            "POST /courses/c1/modules",
            "POST /modules/module-1/objectives",
            "POST /modules/module-1/objectives/objective-2/learning-outcomes",
            "POST /modules/module-1/objectives/objective-2/learning-outcomes",
        ]
    );
    let body = backend.log()[0].body.clone().unwrap();
    assert_eq!(body, json!({ "title": "Loops", "description": null, "order": 5 }));
    assert_eq!(
        backend.links("/modules/module-1/objectives/objective-2/learning-outcomes").len(),
        2
    );
}

#[tokio::test]
async fn invalid_section_form_makes_no_calls() {
    let backend = FakeBackend::new();
    let api = backend.client();

    let err = create_module(&api, "c1", &[], &SectionForm::new("Loops"), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, AuthoringError::Validation(ValidationError::NoObjectives)));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn topic_update_syncs_existing_objective_links_and_drops_course_reads() {
    let backend = FakeBackend::new();
    let links = paths::links(ObjectiveLevel::Topic, "t1", "to1");
    backend.seed_links(&links, &["mo1", "mo2"]);
    let api = backend.client();
    let course = paths::course("c1");
    let _: Value = api.get(&course).await.unwrap();

    let mut draft = ObjectiveDraft::new("Trace a loop").with_links(["mo2", "mo3"]);
    draft.id = Some("to1".into());
    update_topic(&api, "c1", "m1", "t1", &SectionForm::new("Loops"), &[draft])
        .await
        .unwrap();

    assert_eq!(
        backend.writes(),
        vec![
            "PUT /modules/m1/topics/t1".to_string(),
            "PUT /topics/t1/objectives/to1".to_string(),
            format!("POST {links}"),
            format!("DELETE {links}/mo1"),
        ]
    );
    assert_eq!(backend.links(&links).len(), 2);
    assert!(api.cache().get(&course).await.is_none());
}

#[tokio::test]
async fn resource_is_created_with_the_next_order() {
    let backend = FakeBackend::new();
    let api = backend.client();
    let form = ResourceForm {
        title: "Intro video".into(),
        kind: Some(ResourceType::Video),
        url: "https://example.org/intro.mp4".into(),
        topic_objective_id: "to1".into(),
        ..ResourceForm::default()
    };

    let id = create_resource(&api, "c1", "t1", &[], &form).await.unwrap();

    assert_eq!(id, "resource-1");
    assert_eq!(backend.writes(), vec!["POST /topics/t1/resources"]);
    let body = backend.log()[0].body.clone().unwrap();
    assert_eq!(body["type"], "video");
    assert_eq!(body["order"], 1);
    assert_eq!(body["is_mandatory"], true);
}

#[tokio::test]
async fn learning_outcome_update_keeps_its_order() {
    let backend = FakeBackend::new();
    let api = backend.client();
    let course = paths::course("c1");
    let _: Value = api.get(&course).await.unwrap();
    backend.clear_log();

    update_learning_outcome(&api, "c1", "lo1", "RA1", " Design loops ", Some("crear"))
        .await
        .unwrap();

    assert_eq!(backend.calls(), vec!["PUT /courses/c1/learning-outcomes/lo1"]);
    let body = backend.log()[0].body.clone().unwrap();
    assert_eq!(
        body,
        json!({ "code": "RA1", "description": "Design loops", "bloom_level": "crear" })
    );
    assert!(api.cache().get(&course).await.is_none());
}

#[tokio::test]
async fn learning_outcome_update_checks_fields_first() {
    let backend = FakeBackend::new();
    let api = backend.client();

    let err = update_learning_outcome(&api, "c1", "lo1", "RA1", "  ", None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AuthoringError::Validation(ValidationError::Required("description"))
    ));
    assert!(backend.calls().is_empty());
}
