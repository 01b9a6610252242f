//! End-to-end coordination scenarios against an in-memory store.

use chrono::TimeDelta;
use crew_config::AdminConfig;
use crew_core::actor::Actor;
use crew_core::entities::{NewTask, Task};
use crew_core::enums::{ActorKind, AuditAction, TaskPriority, TaskStatus};
use crew_core::errors::CoreError;
use crew_core::lifecycle::StalePolicy;
use crew_db::CrewDb;
use crew_db::error::DatabaseError;
use crew_db::helpers::{format_datetime, now};
use crew_db::repos::audit::AuditFilter;
use crew_db::service::CrewService;
use pretty_assertions::assert_eq;
use rstest::rstest;

async fn service(admin_domain: &str) -> CrewService {
    let db = CrewDb::open_local(":memory:").await.unwrap();
    CrewService::from_db(
        db,
        StalePolicy::default(),
        AdminConfig {
            email_domain: admin_domain.into(),
        },
    )
}

fn actor(id: &str, kind: ActorKind) -> Actor {
    Actor::new(id, kind).unwrap()
}

async fn backdate(svc: &CrewService, task_id: &str, age: TimeDelta) {
    svc.db()
        .conn()
        .execute(
            "UPDATE tasks SET claimed_at = ?1 WHERE id = ?2",
            libsql::params![format_datetime(now() - age), task_id],
        )
        .await
        .unwrap();
}

async fn reviewed_task(svc: &CrewService, holder: &Actor, title: &str) -> Task {
    let task = svc
        .create_task(holder, &NewTask::titled(title))
        .await
        .unwrap();
    svc.claim_task(holder, &task.id).await.unwrap();
    svc.submit_for_review(holder, &task.id, Some("ready"))
        .await
        .unwrap()
}

#[tokio::test]
async fn claim_sets_holder_and_rejects_second_claim() {
    let svc = service("").await;
    let first = actor("agent-1", ActorKind::AiAgent);
    let second = actor("agent-2", ActorKind::AiAgent);
    let task = svc
        .create_task(&first, &NewTask::titled("Onboarding survey"))
        .await
        .unwrap();

    let claimed = svc.claim_task(&first, &task.id).await.unwrap();
    assert_eq!(claimed.status, TaskStatus::InProgress);
    assert_eq!(claimed.holder(), Some("agent-1"));
    assert!(claimed.claim.is_some());

    let err = svc.claim_task(&second, &task.id).await.unwrap_err();
    match err {
        DatabaseError::Core(CoreError::AlreadyClaimed { holder, .. }) => {
            assert_eq!(holder, "agent-1");
        }
        other => panic!("expected AlreadyClaimed, got {other:?}"),
    }

    let stored = svc.get_task(&task.id).await.unwrap();
    assert_eq!(stored.holder(), Some("agent-1"));
}

#[tokio::test]
async fn review_keeps_claim_and_records_notes() {
    let svc = service("").await;
    let holder = actor("agent-1", ActorKind::AiAgent);
    let reviewed = reviewed_task(&svc, &holder, "Streak badges").await;

    assert_eq!(reviewed.status, TaskStatus::Review);
    assert_eq!(reviewed.holder(), Some("agent-1"));
    assert_eq!(reviewed.metadata.completion_notes.as_deref(), Some("ready"));
    assert_eq!(reviewed.metadata.submitted_by.as_deref(), Some("agent-1"));

    let stored = svc.get_task(&reviewed.id).await.unwrap();
    assert_eq!(stored, reviewed);
}

#[tokio::test]
async fn direct_completion_clears_claim() {
    let svc = service("").await;
    let holder = actor("agent-1", ActorKind::AiAgent);
    let task = svc
        .create_task(&holder, &NewTask::titled("Water intake log"))
        .await
        .unwrap();
    svc.claim_task(&holder, &task.id).await.unwrap();

    let done = svc
        .complete_task(&holder, &task.id, Some("shipped"))
        .await
        .unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
    assert!(done.claim.is_none());
    assert!(done.completed_at.is_some());
    assert_eq!(done.metadata.completed_by.as_deref(), Some("agent-1"));
    done.check_invariants().unwrap();

    let stored = svc.get_task(&task.id).await.unwrap();
    assert_eq!(stored, done);
}

#[tokio::test]
async fn stale_review_is_released() {
    let svc = service("").await;
    let holder = actor("agent-1", ActorKind::AiAgent);
    let task = reviewed_task(&svc, &holder, "Macro charts").await;
    backdate(&svc, &task.id, TimeDelta::hours(3)).await;

    let report = svc.release_stale_tasks(false).await.unwrap();
    assert_eq!(report.released_count(), 1);
    assert_eq!(report.released[0].from, TaskStatus::Review);
    assert!(report.skipped.is_empty());

    let released = svc.get_task(&task.id).await.unwrap();
    assert_eq!(released.status, TaskStatus::Pending);
    assert!(released.claim.is_none());
    assert!(released.released_at.is_some());
    assert_eq!(released.metadata.released_from.as_deref(), Some("agent-1"));
    assert_eq!(
        released.metadata.release_note.as_deref(),
        Some("auto-released: claim by agent-1 exceeded 2h")
    );

    let audit = svc
        .query_audit(&AuditFilter {
            task_id: Some(task.id.clone()),
            action: Some(AuditAction::Released),
            ..AuditFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].actor, None);
}

#[tokio::test]
async fn fresh_review_is_untouched() {
    let svc = service("").await;
    let holder = actor("agent-1", ActorKind::AiAgent);
    let task = reviewed_task(&svc, &holder, "Sleep tracker").await;
    backdate(&svc, &task.id, TimeDelta::hours(1)).await;

    let report = svc.release_stale_tasks(false).await.unwrap();
    assert_eq!(report.scanned, 1);
    assert_eq!(report.released_count(), 0);

    let stored = svc.get_task(&task.id).await.unwrap();
    assert_eq!(stored.status, TaskStatus::Review);
    assert_eq!(stored.holder(), Some("agent-1"));
}

#[tokio::test]
async fn sweep_is_idempotent() {
    let svc = service("").await;
    let holder = actor("agent-1", ActorKind::AiAgent);
    let task = reviewed_task(&svc, &holder, "Heart rate zones").await;
    backdate(&svc, &task.id, TimeDelta::hours(5)).await;

    let first = svc.release_stale_tasks(false).await.unwrap();
    assert_eq!(first.released_count(), 1);
    let after_first = svc.get_task(&task.id).await.unwrap();

    let second = svc.release_stale_tasks(false).await.unwrap();
    assert_eq!(second.released_count(), 0);
    assert_eq!(second.scanned, 0);
    assert_eq!(svc.get_task(&task.id).await.unwrap(), after_first);
}

#[tokio::test]
async fn released_task_can_be_reclaimed() {
    let svc = service("").await;
    let first = actor("agent-1", ActorKind::AiAgent);
    let second = actor("agent-2", ActorKind::AiAgent);
    let task = reviewed_task(&svc, &first, "Rep counter").await;
    backdate(&svc, &task.id, TimeDelta::hours(3)).await;
    svc.release_stale_tasks(false).await.unwrap();

    let reclaimed = svc.claim_task(&second, &task.id).await.unwrap();
    assert_eq!(reclaimed.holder(), Some("agent-2"));
    assert_eq!(reclaimed.metadata.released_from.as_deref(), Some("agent-1"));
}

#[tokio::test]
async fn claim_next_follows_priority_then_newest() {
    let svc = service("").await;
    let agent = actor("agent-1", ActorKind::AiAgent);
    for (title, priority) in [
        ("low", TaskPriority::Low),
        ("high-older", TaskPriority::High),
        ("medium", TaskPriority::Medium),
        ("high-newer", TaskPriority::High),
        ("urgent", TaskPriority::Urgent),
    ] {
        let mut draft = NewTask::titled(title);
        draft.priority = priority;
        svc.create_task(&agent, &draft).await.unwrap();
    }

    let mut order = Vec::new();
    while let Some(task) = svc.claim_next(&agent).await.unwrap() {
        order.push(task.title);
    }
    assert_eq!(
        order,
        vec!["urgent", "high-newer", "high-older", "medium", "low"]
    );
}

#[tokio::test]
async fn claim_next_skips_ineligible_and_claimed() {
    let svc = service("").await;
    let agent = actor("agent-1", ActorKind::AiAgent);
    let other = actor("agent-2", ActorKind::AiAgent);

    let mut human_only = NewTask::titled("Coach interviews");
    human_only.priority = TaskPriority::Urgent;
    human_only.assignee = crew_core::enums::Assignee::Human;
    svc.create_task(&agent, &human_only).await.unwrap();

    let mut taken = NewTask::titled("Taken");
    taken.priority = TaskPriority::High;
    let taken = svc.create_task(&agent, &taken).await.unwrap();
    svc.claim_task(&other, &taken.id).await.unwrap();

    svc.create_task(&agent, &NewTask::titled("Open"))
        .await
        .unwrap();

    let next = svc.claim_next(&agent).await.unwrap().unwrap();
    assert_eq!(next.title, "Open");
    assert!(svc.claim_next(&agent).await.unwrap().is_none());
}

#[rstest]
#[case::holder("agent-1", true)]
#[case::admin("lead@fitlab.io", true)]
#[case::stranger("agent-2", false)]
#[tokio::test]
async fn unclaim_requires_holder_or_admin(#[case] who: &str, #[case] allowed: bool) {
    let svc = service("fitlab.io").await;
    let holder = actor("agent-1", ActorKind::AiAgent);
    let task = svc
        .create_task(&holder, &NewTask::titled("Body fat estimator"))
        .await
        .unwrap();
    svc.claim_task(&holder, &task.id).await.unwrap();

    let result = svc
        .unclaim_task(&actor(who, ActorKind::Human), &task.id, None)
        .await;
    if allowed {
        let task = result.unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.claim.is_none());
        assert!(task.released_at.is_some());
    } else {
        assert!(matches!(
            result,
            Err(DatabaseError::Core(CoreError::NotClaimHolder { .. }))
        ));
        let stored = svc.get_task(&task.id).await.unwrap();
        assert_eq!(stored.holder(), Some("agent-1"));
    }
}

#[tokio::test]
async fn status_change_is_admin_only_when_enforced() {
    let svc = service("fitlab.io").await;
    let agent = actor("agent-1", ActorKind::AiAgent);
    let task = svc
        .create_task(&agent, &NewTask::titled("Export to CSV"))
        .await
        .unwrap();

    let err = svc
        .set_status(&agent, &task.id, TaskStatus::Completed, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DatabaseError::Core(CoreError::Unauthorized { .. })
    ));

    let admin = actor("lead@fitlab.io", ActorKind::Human);
    let done = svc
        .set_status(&admin, &task.id, TaskStatus::Completed, Some("duplicate"))
        .await
        .unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
}

#[tokio::test]
async fn seeding_twice_creates_each_title_once() {
    let svc = service("").await;
    let seeder = actor("seed-script", ActorKind::AiAgent);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.toml");
    std::fs::write(
        &path,
        r#"
[[task]]
title = "Workout templates"
priority = "high"

[[task]]
title = "Progress export"
"#,
    )
    .unwrap();

    let first = svc.seed_from_file(&seeder, &path).await.unwrap();
    assert_eq!(first.created.len(), 2);
    assert!(first.skipped.is_empty());

    let second = svc.seed_from_file(&seeder, &path).await.unwrap();
    assert!(second.created.is_empty());
    assert_eq!(second.skipped.len(), 2);

    for title in ["Workout templates", "Progress export"] {
        assert_eq!(svc.tasks_by_title(title).await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn half_claimed_row_fails_to_load() {
    let svc = service("").await;
    // The schema CHECK blocks half claims, so simulate legacy data without it.
    svc.db()
        .conn()
        .execute_batch(
            "CREATE TABLE legacy AS SELECT * FROM tasks;
             INSERT INTO legacy (id, title, description, priority, status, assignee, claimed_by, claimed_at,
                                 completed_at, released_at, tags, metadata, created_at, updated_at)
             VALUES ('tsk-legacy', 'Legacy', '', 'medium', 'review', 'any', 'agent-1', NULL,
                     NULL, NULL, '[]', '{}', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z');",
        )
        .await
        .unwrap();

    let mut rows = svc
        .db()
        .conn()
        .query(
            "SELECT claimed_by, claimed_at FROM legacy WHERE id = 'tsk-legacy'",
            (),
        )
        .await
        .unwrap();
    let row = rows.next().await.unwrap().unwrap();
    let result = crew_db::helpers::parse_claim(
        row.get::<Option<String>>(0).unwrap(),
        row.get::<Option<String>>(1).unwrap().as_deref(),
    );
    assert!(matches!(result, Err(DatabaseError::InvalidState(_))));
}

#[tokio::test]
async fn every_transition_is_audited() {
    let svc = service("").await;
    let holder = actor("agent-1", ActorKind::AiAgent);
    let task = reviewed_task(&svc, &holder, "Audit me").await;
    svc.complete_task(&holder, &task.id, None).await.unwrap();

    let entries = svc
        .query_audit(&AuditFilter {
            task_id: Some(task.id.clone()),
            ..AuditFilter::default()
        })
        .await
        .unwrap();
    let mut actions: Vec<_> = entries.iter().map(|e| e.action).collect();
    actions.reverse();
    assert_eq!(
        actions,
        vec![
            AuditAction::Created,
            AuditAction::Claimed,
            AuditAction::Submitted,
            AuditAction::Completed,
        ]
    );
}
