mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use common::TestDb;
use tenant_issue_tracker::{
    commands::{
        feedback::SubmitFeedbackCommand,
        issues::{ReportIssueCommand, UpdateIssueCommand},
        users::RegisterUserCommand,
    },
    identity::PrincipalProvider,
    ServiceError,
};

#[tokio::test]
async fn reported_issue_is_retrievable_by_generated_id() {
    let db = TestDb::new().await;
    let owner = db.user("owner").await;

    let first = db.issue(&owner, "Blocked drain").await;
    let second = db.issue(&owner, "Flickering lights").await;
    assert_ne!(first.id, second.id);

    let fetched = db.services.issues.get_issue(second.id).await.unwrap().unwrap();
    assert_eq!(fetched, second);
    assert_eq!(fetched.application_user_id, owner.id);
    assert!(!fetched.is_resolved);
}

#[tokio::test]
async fn issues_list_newest_first_and_filter_by_resolution() {
    let db = TestDb::new().await;
    let owner = db.user("owner").await;
    let someone_else = db.user("someone-else").await;
    let now = Utc::now();

    let mut old = ReportIssueCommand::new(&owner.id, "Old crack", "structural");
    old.reported_date = Some(now - Duration::days(3));
    let old = db.services.issues.report_issue(old).await.unwrap();

    let mut recent = ReportIssueCommand::new(&owner.id, "New crack", "structural");
    recent.reported_date = Some(now);
    let recent = db.services.issues.report_issue(recent).await.unwrap();

    db.issue(&someone_else, "Not mine").await;
    db.services.issues.resolve_issue(old.id).await.unwrap();

    let all = db.services.issues.list_issues_for_user(&owner.id, None).await.unwrap();
    assert_eq!(all.iter().map(|i| i.id).collect::<Vec<_>>(), vec![recent.id, old.id]);

    let open = db
        .services
        .issues
        .list_issues_for_user(&owner.id, Some(false))
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, recent.id);

    let resolved = db
        .services
        .issues
        .list_issues_for_user(&owner.id, Some(true))
        .await
        .unwrap();
    assert_eq!(resolved.len(), 1);
    assert!(resolved[0].is_resolved);
}

#[tokio::test]
async fn resolving_twice_is_harmless() {
    let db = TestDb::new().await;
    let owner = db.user("owner").await;
    let issue = db.issue(&owner, "Smoke alarm beeping").await;

    let once = db.services.issues.resolve_issue(issue.id).await.unwrap();
    let twice = db.services.issues.resolve_issue(issue.id).await.unwrap();

    assert!(once.is_resolved);
    assert_eq!(once, twice);
    assert!(db.services.issues.resolve_issue(9_999).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn update_changes_only_given_fields() {
    let db = TestDb::new().await;
    let owner = db.user("owner").await;
    let issue = db.issue(&owner, "Squeaky door").await;

    let updated = db
        .services
        .issues
        .update_issue(UpdateIssueCommand {
            issue_id: issue.id,
            description: None,
            category: Some("carpentry".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(updated.description, issue.description);
    assert_eq!(updated.category, "carpentry");
    assert_eq!(updated.reported_date, issue.reported_date);
}

#[tokio::test]
async fn issue_with_feedback_loads_in_submission_order() {
    let db = TestDb::new().await;
    let owner = db.user("owner").await;
    let tenant = db.user("tenant").await;
    let issue = db.issue(&owner, "Heating off").await;
    let now = Utc::now();

    let mut late = SubmitFeedbackCommand::new(issue.id, &tenant.id, "Still cold", 2);
    late.submitted_on = Some(now);
    let late = db.services.feedback.submit_feedback(late).await.unwrap();

    let mut early = SubmitFeedbackCommand::new(issue.id, &tenant.id, "Engineer booked", 4);
    early.submitted_on = Some(now - Duration::hours(2));
    let early = db.services.feedback.submit_feedback(early).await.unwrap();

    let (loaded, feedback) = db
        .services
        .issues
        .get_issue_with_feedback(issue.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(loaded.id, issue.id);
    assert_eq!(
        feedback.iter().map(|f| f.id).collect::<Vec<_>>(),
        vec![early.id, late.id]
    );
    assert!(db
        .services
        .issues
        .get_issue_with_feedback(issue.id + 1)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn feedback_is_listed_per_tenant() {
    let db = TestDb::new().await;
    let owner = db.user("owner").await;
    let alice = db.user("alice").await;
    let bob = db.user("bob").await;
    let issue = db.issue(&owner, "Bins not collected").await;

    db.feedback(&issue, &alice, 3).await;
    db.feedback(&issue, &alice, 5).await;
    db.feedback(&issue, &bob, 1).await;

    let by_alice = db.services.feedback.list_by_tenant(&alice.id).await.unwrap();
    assert_eq!(by_alice.len(), 2);
    assert!(by_alice.iter().all(|f| f.tenant_id == alice.id));

    let removed = by_alice[0].id;
    db.services.feedback.delete_feedback(removed).await.unwrap();
    assert_eq!(db.services.feedback.list_for_issue(issue.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_user_names_conflict() {
    let db = TestDb::new().await;
    db.user("alice").await;

    let err = db
        .services
        .users
        .register(RegisterUserCommand::new("alice"))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::Conflict(_));
    assert_eq!(db.services.users.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn credentials_are_verified_against_the_stored_hash() {
    let db = TestDb::new().await;
    let user = db
        .services
        .users
        .register(
            RegisterUserCommand::new("carol")
                .with_email("carol@example.com")
                .with_password("correct horse"),
        )
        .await
        .unwrap();

    let stored = user.password_hash.as_deref().unwrap();
    assert!(stored.starts_with("$argon2"));
    assert_ne!(stored, "correct horse");

    let principal = db
        .services
        .users
        .verify_credentials("carol", "correct horse")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(principal.id, user.id);

    assert!(db
        .services
        .users
        .verify_credentials("carol", "wrong horse")
        .await
        .unwrap()
        .is_none());
    assert!(db
        .services
        .users
        .verify_credentials("nobody", "correct horse")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn user_without_password_never_authenticates() {
    let db = TestDb::new().await;
    db.user("dave").await;

    assert!(db
        .services
        .users
        .verify_credentials("dave", "")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn principals_resolve_by_id() {
    let db = TestDb::new().await;
    let user = db.user("erin").await;
    let provider: &dyn PrincipalProvider = db.services.users.as_ref();

    let principal = provider.require_principal(&user.id).await.unwrap();
    assert_eq!(principal.display_name, "erin");

    assert!(provider.find_principal("missing").await.unwrap().is_none());
    assert!(provider.require_principal("missing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn registration_generates_id_and_timestamp() {
    let db = TestDb::new().await;
    let before = Utc::now() - Duration::seconds(1);

    let first = db.user("grace").await;
    let second = db.user("heidi").await;

    assert!(uuid::Uuid::parse_str(&first.id).is_ok());
    assert_ne!(first.id, second.id);
    assert!(first.created_at >= before);
    assert!(first.created_at <= Utc::now());
}

#[tokio::test]
async fn users_are_found_by_name() {
    let db = TestDb::new().await;
    let user = db.user("frank").await;

    let found = db.services.users.find_by_user_name("frank").await.unwrap();
    assert_eq!(found, Some(user));
    assert!(db.services.users.find_by_user_name("Frank ").await.unwrap().is_none());
}
