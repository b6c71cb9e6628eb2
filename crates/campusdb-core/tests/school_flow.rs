//! End-to-end flow across entities sharing one substrate.

use campusdb_commons::{ClassId, CourseId, GradeId, Role, UserId};
use campusdb_core::entities::classes::Class;
use campusdb_core::entities::courses::Course;
use campusdb_core::entities::grades::Grade;
use campusdb_core::entities::users::User;
use campusdb_core::{ClassStore, CoreError, CourseStore, GradeStore, UserStore};
use campusdb_store::test_utils::memory_backend;
use campusdb_store::{KvBackend, StoreError};
use std::sync::Arc;

struct School {
    users: UserStore,
    classes: ClassStore,
    courses: CourseStore,
    grades: GradeStore,
}

impl School {
    fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            users: UserStore::new(backend.clone()),
            classes: ClassStore::new(backend.clone()),
            courses: CourseStore::new(backend.clone()),
            grades: GradeStore::new(backend),
        }
    }
}

async fn enroll(school: &School) -> anyhow::Result<()> {
    school
        .users
        .create(User::new("t1", "turing@school.test", "Ms. Turing", Role::Teacher))
        .await?;
    school
        .users
        .create(User::new("s1", "ada@school.test", "Ada", Role::Student).in_class("c1"))
        .await?;
    school.classes.create(Class::new("c1", "5A", "t1")).await?;
    school
        .courses
        .create(Course::new("course1", "Mathematics", "c1", "t1"))
        .await?;
    Ok(())
}

#[tokio::test]
async fn grade_lifecycle_across_all_indexes() -> anyhow::Result<()> {
    let school = School::new(memory_backend());
    enroll(&school).await?;

    let grade = school
        .grades
        .record(Grade::new("g1", "s1", "course1", 95.0, "2026-03-01T10:00:00Z"))
        .await?;
    assert!(grade.created_at.is_some());

    // Resolvable through every configured shape.
    let sheet = school.grades.for_student(&UserId::new("s1")).await?;
    assert_eq!(sheet.len(), 1);
    assert_eq!(sheet[0].id, GradeId::new("g1"));

    let book = school.grades.for_course(&CourseId::new("course1")).await?;
    assert_eq!(book.len(), 1);

    let pair = school
        .grades
        .for_pair(&UserId::new("s1"), &CourseId::new("course1"))
        .await?;
    assert_eq!(pair.unwrap().score, 95.0);

    let recent = school.grades.recently_graded(5).await?;
    assert_eq!(recent.len(), 1);

    // In-place re-create collides on the ID.
    let err = school
        .grades
        .record(Grade::new("g1", "s2", "course2", 10.0, "2026-03-02T10:00:00Z"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Storage(StoreError::AlreadyExists { .. })
    ));

    // Deleting clears record, membership, both secondaries, the pair, and
    // the recency entry in one pass.
    assert!(school.grades.delete(&GradeId::new("g1")).await?);
    assert!(school.grades.for_student(&UserId::new("s1")).await?.is_empty());
    assert!(school
        .grades
        .for_course(&CourseId::new("course1"))
        .await?
        .is_empty());
    assert!(school.grades.recently_graded(5).await?.is_empty());
    assert_eq!(school.grades.count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn roster_queries_span_entities() -> anyhow::Result<()> {
    let school = School::new(memory_backend());
    enroll(&school).await?;

    // The teacher's world, resolved purely through secondary indexes.
    let taught = school.classes.for_teacher(&UserId::new("t1")).await?;
    assert_eq!(taught.len(), 1);
    assert_eq!(taught[0].id, ClassId::new("c1"));

    let courses = school.courses.for_class(&ClassId::new("c1")).await?;
    assert_eq!(courses.len(), 1);

    let roster = school.users.list_in_class(&ClassId::new("c1")).await?;
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].id, UserId::new("s1"));

    // Soft-deleting the student hides them from the roster but keeps the
    // record addressable; restore brings the roster back.
    assert!(school.users.soft_delete(&UserId::new("s1")).await?);
    assert!(school.users.list_in_class(&ClassId::new("c1")).await?.is_empty());
    assert!(school.users.get(&UserId::new("s1")).await?.is_some());

    assert!(school.users.restore(&UserId::new("s1")).await?);
    assert_eq!(school.users.list_in_class(&ClassId::new("c1")).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn listing_pages_and_counts_stay_consistent() -> anyhow::Result<()> {
    let school = School::new(memory_backend());
    school
        .users
        .create(User::new("t1", "turing@school.test", "Ms. Turing", Role::Teacher))
        .await?;
    for i in 0..5 {
        school
            .users
            .create(
                User::new(
                    format!("s{i}").as_str(),
                    &format!("student{i}@school.test"),
                    &format!("Student {i}"),
                    Role::Student,
                )
                .in_class("c1"),
            )
            .await?;
    }

    assert_eq!(school.users.count().await?, 6);
    assert_eq!(school.users.count_by_role(Role::Student).await?, 5);

    // Walk the primary index with a page size of 2.
    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = school.users.list(cursor.as_deref(), Some(2), false).await?;
        seen.extend(page.items.into_iter().map(|u| u.id));
        match page.cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    assert_eq!(seen.len(), 6);

    Ok(())
}
