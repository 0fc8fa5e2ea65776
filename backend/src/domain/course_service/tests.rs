//! Tests for the course service.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use mockall::predicate::eq;
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockCourseRepository, MockUserRepository};
use crate::domain::{ErrorCode, TaxonomyId, Username};
use crate::test_support::MutableClock;

type Service = CourseService<MockCourseRepository, MockUserRepository>;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 8, 30, 0)
        .single()
        .expect("valid timestamp")
}

fn make_service(courses: MockCourseRepository, users: MockUserRepository) -> Service {
    CourseService::new(
        Arc::new(courses),
        Arc::new(users),
        Arc::new(MutableClock::new(now())),
    )
}

fn draft() -> CourseDraft {
    CourseDraft::try_new(
        "Borrow checking",
        "Lifetimes from first principles",
        "https://cdn.example.com/cover.jpg",
        TaxonomyId::random(),
        None,
    )
    .and_then(|draft| draft.with_video("Intro", "https://youtu.be/intro"))
    .expect("valid draft")
}

fn stored_course(creator: UserId) -> Course {
    Course::from_draft(CourseId::random(), creator, draft(), now())
}

fn summary(id: UserId, name: &str) -> UserSummary {
    UserSummary {
        id,
        username: Username::new(name).expect("username"),
    }
}

#[tokio::test]
async fn create_course_stamps_creator_and_time() {
    let creator = UserId::random();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_insert()
        .withf(move |course| course.creator == creator && course.created_at == now())
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(courses, MockUserRepository::new());
    let course = service
        .create_course(&creator, draft())
        .await
        .expect("created");

    assert_eq!(course.creator, creator);
    assert_eq!(course.videos[0].created_at, now());
    assert_eq!(course.average_rating, 0.0);
}

#[tokio::test]
async fn create_course_reports_unreachable_store() {
    let mut courses = MockCourseRepository::new();
    courses
        .expect_insert()
        .return_once(|_| Err(CoursePersistenceError::connection("pool exhausted")));

    let service = make_service(courses, MockUserRepository::new());
    let error = service
        .create_course(&UserId::random(), draft())
        .await
        .expect_err("unavailable");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[case(-0.5)]
#[case(5.5)]
#[case(f64::NAN)]
#[tokio::test]
async fn rate_course_rejects_score_before_touching_storage(#[case] score: f64) {
    let mut courses = MockCourseRepository::new();
    courses.expect_apply_rating().never();
    courses.expect_find_by_id().never();

    let service = make_service(courses, MockUserRepository::new());
    let error = service
        .rate_course(&CourseId::random(), &UserId::random(), score)
        .await
        .expect_err("invalid score");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details().and_then(|details| details.get("field")),
        Some(&serde_json::Value::from("rating"))
    );
}

#[tokio::test]
async fn rate_course_returns_refreshed_average() {
    let author = UserId::random();
    let mut stored = stored_course(UserId::random());
    let course_id = stored.id;
    stored.apply_rating(CourseRating {
        author: UserId::random(),
        score: RatingScore::new(5.0).expect("score"),
        rated_at: now(),
    });

    let mut courses = MockCourseRepository::new();
    courses
        .expect_apply_rating()
        .withf(move |id, rating| {
            *id == course_id
                && rating.author == author
                && rating.score.value() == 2.0
                && rating.rated_at == now()
        })
        .times(1)
        .return_once(move |_, rating| {
            stored.apply_rating(*rating);
            Ok(Some(stored))
        });

    let service = make_service(courses, MockUserRepository::new());
    let receipt = service
        .rate_course(&course_id, &author, 2.0)
        .await
        .expect("rated");

    assert_eq!(receipt.course_id, course_id);
    assert_eq!(receipt.ratings_count, 2);
    assert_eq!(receipt.average_rating, 3.5);
}

#[tokio::test]
async fn rate_course_on_missing_course_is_not_found() {
    let mut courses = MockCourseRepository::new();
    courses.expect_apply_rating().return_once(|_, _| Ok(None));

    let service = make_service(courses, MockUserRepository::new());
    let error = service
        .rate_course(&CourseId::random(), &UserId::random(), 4.0)
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case("")]
#[case("  \n ")]
#[tokio::test]
async fn blank_comments_never_reach_storage(#[case] text: &str) {
    let mut courses = MockCourseRepository::new();
    courses.expect_add_comment().never();

    let service = make_service(courses, MockUserRepository::new());
    let error = service
        .comment_on_course(&CourseId::random(), &UserId::random(), text)
        .await
        .expect_err("blank");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn comment_is_stamped_and_stored() {
    let author = UserId::random();
    let stored = stored_course(UserId::random());
    let course_id = stored.id;

    let mut courses = MockCourseRepository::new();
    courses
        .expect_add_comment()
        .withf(move |id, comment| {
            *id == course_id
                && comment.author == author
                && comment.text.as_str() == "Great pacing"
                && comment.created_at == now()
        })
        .return_once(move |_, comment| {
            let mut updated = stored;
            updated.add_comment(comment.clone());
            Ok(Some(updated))
        });

    let service = make_service(courses, MockUserRepository::new());
    let course = service
        .comment_on_course(&course_id, &author, "  Great pacing ")
        .await
        .expect("commented");

    assert_eq!(course.comments.len(), 1);
}

#[tokio::test]
async fn list_rejects_inverted_rating_range() {
    let mut courses = MockCourseRepository::new();
    courses.expect_list().never();
    let service = make_service(courses, MockUserRepository::new());

    let filter = CourseFilter {
        min_rating: Some(4.0),
        max_rating: Some(1.0),
        ..CourseFilter::default()
    };
    let error = service.list_courses(&filter).await.expect_err("invalid");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn list_resolves_each_creator_once() {
    let ada = UserId::random();
    let grace = UserId::random();
    let listed = vec![stored_course(ada), stored_course(grace), stored_course(ada)];

    let mut courses = MockCourseRepository::new();
    courses.expect_list().return_once(move |_| Ok(listed));
    let mut users = MockUserRepository::new();
    users
        .expect_find_summaries()
        .withf(|ids| ids.len() == 2)
        .times(1)
        .return_once(move |_| Ok(vec![summary(ada, "ada")]));

    let service = make_service(courses, users);
    let views = service
        .list_courses(&CourseFilter::default())
        .await
        .expect("listed");

    assert_eq!(views.len(), 3);
    assert_eq!(
        views[0].creator.as_ref().map(|c| c.username.as_str()),
        Some("ada")
    );
    assert!(views[1].creator.is_none());
}

#[tokio::test]
async fn get_course_populates_creator() {
    let creator = UserId::random();
    let stored = stored_course(creator);
    let id = stored.id;

    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .with(eq(id))
        .return_once(move |_| Ok(Some(stored)));
    let mut users = MockUserRepository::new();
    users
        .expect_find_summaries()
        .return_once(move |_| Ok(vec![summary(creator, "grace")]));

    let service = make_service(courses, users);
    let view = service.get_course(&id).await.expect("found");

    assert_eq!(view.course.id, id);
    assert_eq!(view.creator, Some(summary(creator, "grace")));
}

#[tokio::test]
async fn get_unknown_course_is_not_found() {
    let mut courses = MockCourseRepository::new();
    courses.expect_find_by_id().return_once(|_| Ok(None));
    let mut users = MockUserRepository::new();
    users.expect_find_summaries().never();

    let service = make_service(courses, users);
    let error = service
        .get_course(&CourseId::random())
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}
