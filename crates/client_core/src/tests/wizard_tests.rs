use super::*;
use crate::test_support::{Call, FakeDocumentClient};

fn wizard_at_structure(kind: DocumentKind) -> WizardController {
    let mut wizard = WizardController::new();
    wizard.select_kind(kind).expect("kind");
    wizard.advance().expect("to details");
    wizard.set_title("Q4 Report").expect("title");
    wizard.set_topic("EV market trends").expect("topic");
    wizard.advance().expect("to structure");
    wizard
}

fn validation(message: &str) -> WizardError {
    WizardError::Validation(ValidationError::new(message))
}

#[test]
fn advance_without_kind_stays_on_first_step() {
    let mut wizard = WizardController::new();

    let err = wizard.advance().expect_err("kind missing");

    assert_eq!(err, validation("kind required"));
    assert_eq!(wizard.step_number(), 1);
    assert_eq!(wizard.last_error(), Some(&validation("kind required")));
}

#[test]
fn details_need_title_and_topic() {
    let mut wizard = WizardController::new();
    wizard.select_kind(DocumentKind::SlideDeck).expect("kind");
    wizard.advance().expect("to details");
    wizard.set_title("Pitch").expect("title");
    wizard.set_topic("   ").expect("topic");

    assert_eq!(
        wizard.advance().expect_err("topic blank"),
        validation("title/topic required")
    );
    assert_eq!(
        wizard.step(),
        &WizardStep::Details {
            kind: DocumentKind::SlideDeck
        }
    );

    wizard.set_topic("Seed round").expect("topic");
    wizard.advance().expect("to structure");
    assert_eq!(wizard.step_number(), 3);
    assert!(wizard.last_error().is_none());
}

#[test]
fn structure_has_no_forward_step() {
    let mut wizard = wizard_at_structure(DocumentKind::WordDoc);
    assert_eq!(wizard.advance(), Err(WizardError::NoForwardStep));
    assert_eq!(wizard.step_number(), 3);
}

#[test]
fn fields_are_gated_by_step() {
    let mut wizard = WizardController::new();
    assert!(matches!(
        wizard.set_title("too early"),
        Err(WizardError::WrongStep { expected: 2, .. })
    ));
    assert!(matches!(
        wizard.add_section(),
        Err(WizardError::WrongStep { expected: 3, .. })
    ));
    assert!(matches!(
        wizard.build_request(),
        Err(WizardError::WrongStep { expected: 3, .. })
    ));
}

#[test]
fn retreat_keeps_edits() {
    let mut wizard = wizard_at_structure(DocumentKind::WordDoc);
    wizard.set_section_title(0, "Intro").expect("edit");
    wizard.add_section().expect("add");
    wizard.set_section_title(1, "Analysis").expect("edit");

    wizard.retreat().expect("to details");
    assert_eq!(wizard.step_number(), 2);
    assert_eq!(wizard.title(), "Q4 Report");
    wizard.retreat().expect("to kind");
    assert_eq!(wizard.retreat(), Err(WizardError::AtFirstStep));
    assert_eq!(wizard.selected_kind(), Some(DocumentKind::WordDoc));

    wizard.advance().expect("to details");
    wizard.advance().expect("to structure");
    assert_eq!(wizard.sections(), ["Intro", "Analysis"]);
}

#[test]
fn last_section_entry_cannot_be_removed() {
    let mut wizard = wizard_at_structure(DocumentKind::SlideDeck);

    assert_eq!(wizard.remove_section(0), Err(WizardError::LastSection));
    assert_eq!(wizard.sections().len(), 1);

    wizard.add_section().expect("add");
    wizard.set_section_title(1, "Second").expect("edit");
    wizard.remove_section(0).expect("remove first");
    assert_eq!(wizard.sections(), ["Second"]);
    assert_eq!(wizard.remove_section(4), Err(WizardError::NoSuchSection(4)));
}

#[test]
fn blank_section_titles_are_filtered_from_request() {
    let mut wizard = wizard_at_structure(DocumentKind::WordDoc);
    wizard.add_section().expect("add");
    wizard.add_section().expect("add");
    wizard.set_section_title(0, "").expect("edit");
    wizard.set_section_title(1, "Intro").expect("edit");
    wizard.set_section_title(2, "  ").expect("edit");

    let request = wizard.build_request().expect("request");

    assert_eq!(request.section_titles(), ["Intro"]);
    assert_eq!(request.title, "Q4 Report");
    assert_eq!(request.topic, "EV market trends");
    assert_eq!(request.document_type, DocumentKind::WordDoc);
}

#[test]
fn all_blank_sections_fail_validation() {
    let wizard = wizard_at_structure(DocumentKind::WordDoc);
    assert_eq!(wizard.build_request(), Err(validation("no sections")));
}

#[tokio::test]
async fn submit_creates_project_with_sections_in_order() {
    let client = FakeDocumentClient::new();
    let mut wizard = wizard_at_structure(DocumentKind::WordDoc);
    wizard.set_section_title(0, "Intro").expect("edit");
    wizard.add_section().expect("add");
    wizard.set_section_title(1, "Analysis").expect("edit");

    let project = wizard.submit(&client).await.expect("submit");

    assert_eq!(project.title, "Q4 Report");
    assert_eq!(project.document_type, DocumentKind::WordDoc);
    let titles: Vec<&str> = project.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["Intro", "Analysis"]);
    assert!(project.sections.iter().all(|s| s.content.is_none()));
}

#[tokio::test]
async fn empty_structure_never_reaches_backend() {
    let client = FakeDocumentClient::new();
    let mut wizard = wizard_at_structure(DocumentKind::WordDoc);

    assert_eq!(wizard.submit(&client).await, Err(validation("no sections")));
    assert!(client.calls().await.is_empty());
}

#[tokio::test]
async fn backend_failure_keeps_wizard_and_draft() {
    let client = FakeDocumentClient::new();
    *client.fail_create.lock().await = Some(ClientError::Service("db locked".into()));
    let mut wizard = wizard_at_structure(DocumentKind::SlideDeck);
    wizard.set_section_title(0, "Hook").expect("edit");

    let err = wizard.submit(&client).await.expect_err("backend down");

    assert_eq!(err, WizardError::Client(ClientError::Service("db locked".into())));
    assert_eq!(wizard.step_number(), 3);
    assert_eq!(wizard.sections(), ["Hook"]);
    assert_eq!(wizard.last_error(), Some(&err));
    assert!(matches!(client.calls().await.as_slice(), [Call::Create(_)]));
}

#[tokio::test]
async fn stepping_back_keeps_the_submit_error() {
    let client = FakeDocumentClient::new();
    *client.fail_create.lock().await = Some(ClientError::Service("db locked".into()));
    let mut wizard = wizard_at_structure(DocumentKind::WordDoc);
    wizard.set_section_title(0, "Intro").expect("edit");
    let err = wizard.submit(&client).await.expect_err("backend down");

    wizard.retreat().expect("to details");

    assert_eq!(wizard.step_number(), 2);
    assert_eq!(wizard.last_error(), Some(&err));

    wizard.advance().expect("to structure");
    assert!(wizard.last_error().is_none());
}
