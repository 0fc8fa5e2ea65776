//! Course request and response payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::course_service::invalid_course_input;
use crate::domain::{
    Course, CourseDraft, CourseFilter, CourseView, Error, RatingReceipt, TaxonomyId, UserSummary,
};
use crate::inbound::http::validation::{
    FieldName, parse_optional_number, parse_optional_rfc3339_timestamp, parse_optional_uuid,
    parse_uuid, require,
};

/// One video in a course creation request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    #[schema(example = "Introduction")]
    pub title: Option<String>,
    #[schema(example = "https://www.youtube.com/watch?v=dQw4w9WgXcQ")]
    pub url: Option<String>,
}

/// Request body for `POST /api/courses`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[schema(example = "Rust for beginners")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(example = "https://cdn.example.com/rust.png")]
    pub thumbnail_url: Option<String>,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub category_id: Option<String>,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub area_id: Option<String>,
    /// At most 200 entries.
    #[schema(max_items = 200)]
    pub videos: Option<Vec<VideoRequest>>,
}

impl TryFrom<CreateCourseRequest> for CourseDraft {
    type Error = Error;

    fn try_from(value: CreateCourseRequest) -> Result<Self, Self::Error> {
        let category_field = FieldName::new("categoryId");
        let category = require(value.category_id, category_field)?;
        let category = TaxonomyId::from_uuid(parse_uuid(&category, category_field)?);
        let area = parse_optional_uuid(value.area_id, FieldName::new("areaId"))?
            .map(TaxonomyId::from_uuid);

        let mut draft = CourseDraft::try_new(
            value.title.as_deref().unwrap_or_default(),
            value.description.as_deref().unwrap_or_default(),
            value.thumbnail_url.as_deref().unwrap_or_default(),
            category,
            area,
        )
        .map_err(|err| invalid_course_input(&err))?;
        for video in value.videos.unwrap_or_default() {
            draft = draft
                .with_video(
                    video.title.as_deref().unwrap_or_default(),
                    video.url.as_deref().unwrap_or_default(),
                )
                .map_err(|err| invalid_course_input(&err))?;
        }
        Ok(draft)
    }
}

/// Query string for `GET /api/courses`.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct CourseListQuery {
    /// Case-insensitive title substring.
    pub title: Option<String>,
    /// Lowest average rating, inclusive.
    pub min_rating: Option<String>,
    /// Highest average rating, inclusive.
    pub max_rating: Option<String>,
    /// RFC 3339 lower bound on creation time.
    pub created_after: Option<String>,
    /// RFC 3339 upper bound on creation time.
    pub created_before: Option<String>,
    /// Category identifier.
    pub category_id: Option<String>,
}

impl TryFrom<CourseListQuery> for CourseFilter {
    type Error = Error;

    fn try_from(value: CourseListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            title_contains: value.title.filter(|title| !title.trim().is_empty()),
            min_rating: parse_optional_number(value.min_rating, FieldName::new("minRating"))?,
            max_rating: parse_optional_number(value.max_rating, FieldName::new("maxRating"))?,
            created_after: parse_optional_rfc3339_timestamp(
                value.created_after,
                FieldName::new("createdAfter"),
            )?,
            created_before: parse_optional_rfc3339_timestamp(
                value.created_before,
                FieldName::new("createdBefore"),
            )?,
            category: parse_optional_uuid(value.category_id, FieldName::new("categoryId"))?
                .map(TaxonomyId::from_uuid),
        })
    }
}

/// Request body for `POST /api/courses/{id}/comments`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    #[schema(example = "Clear explanations, thanks!")]
    pub comment: Option<String>,
}

/// Request body for `POST /api/courses/{id}/rate`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    #[schema(example = 4.5, minimum = 0, maximum = 5)]
    pub rating: Option<f64>,
}

/// Public view of a course creator.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorResponse {
    pub id: Uuid,
    pub username: String,
}

impl From<UserSummary> for CreatorResponse {
    fn from(value: UserSummary) -> Self {
        Self {
            id: *value.id.as_uuid(),
            username: value.username.into(),
        }
    }
}

/// One video in a course response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// One comment in a course response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub user_id: Uuid,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// One author's rating in a course response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub user_id: Uuid,
    pub rating: f64,
}

/// A course as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub videos: Vec<VideoResponse>,
    pub creator_id: Uuid,
    /// Creator projection; absent when the account no longer exists or was
    /// not resolved for this response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<CreatorResponse>,
    pub category_id: Uuid,
    pub area_id: Option<Uuid>,
    pub comments: Vec<CommentResponse>,
    pub ratings: Vec<RatingResponse>,
    pub average_rating: f64,
    pub ratings_count: usize,
    pub created_at: DateTime<Utc>,
}

impl CourseResponse {
    fn from_parts(course: Course, creator: Option<UserSummary>) -> Self {
        let ratings_count = course.ratings.len();
        Self {
            id: *course.id.as_uuid(),
            title: course.title,
            description: course.description,
            thumbnail_url: course.thumbnail.as_str().to_owned(),
            videos: course
                .videos
                .into_iter()
                .map(|video| VideoResponse {
                    title: video.title,
                    url: video.url.as_str().to_owned(),
                    created_at: video.created_at,
                })
                .collect(),
            creator_id: *course.creator.as_uuid(),
            creator: creator.map(CreatorResponse::from),
            category_id: *course.category.as_uuid(),
            area_id: course.area.map(|area| *area.as_uuid()),
            comments: course
                .comments
                .into_iter()
                .map(|comment| CommentResponse {
                    user_id: *comment.author.as_uuid(),
                    comment: comment.text.as_str().to_owned(),
                    created_at: comment.created_at,
                })
                .collect(),
            ratings: course
                .ratings
                .into_iter()
                .map(|rating| RatingResponse {
                    user_id: *rating.author.as_uuid(),
                    rating: rating.score.value(),
                })
                .collect(),
            average_rating: course.average_rating,
            ratings_count,
            created_at: course.created_at,
        }
    }
}

impl From<CourseView> for CourseResponse {
    fn from(value: CourseView) -> Self {
        Self::from_parts(value.course, value.creator)
    }
}

impl From<Course> for CourseResponse {
    fn from(value: Course) -> Self {
        Self::from_parts(value, None)
    }
}

/// Response body for `POST /api/courses/{id}/rate`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingReceiptResponse {
    pub course_id: Uuid,
    #[schema(example = 3.5)]
    pub average_rating: f64,
    #[schema(example = 2)]
    pub ratings_count: usize,
}

impl From<RatingReceipt> for RatingReceiptResponse {
    fn from(value: RatingReceipt) -> Self {
        Self {
            course_id: *value.course_id.as_uuid(),
            average_rating: value.average_rating,
            ratings_count: value.ratings_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, VIDEOS_MAX};
    use rstest::rstest;
    use serde_json::json;

    fn request() -> CreateCourseRequest {
        CreateCourseRequest {
            title: Some("Rust".into()),
            description: Some("Ownership and borrowing".into()),
            thumbnail_url: Some("https://cdn.example.com/rust.png".into()),
            category_id: Some(Uuid::new_v4().to_string()),
            area_id: None,
            videos: Some(vec![VideoRequest {
                title: Some("Intro".into()),
                url: Some("https://youtu.be/abc".into()),
            }]),
        }
    }

    fn field_of(err: &Error) -> Option<&serde_json::Value> {
        err.details().and_then(|details| details.get("field"))
    }

    #[test]
    fn complete_request_becomes_draft() {
        let draft = CourseDraft::try_from(request()).expect("valid draft");
        assert_eq!(draft.title, "Rust");
        assert_eq!(draft.videos.len(), 1);
        assert!(draft.area.is_none());
    }

    #[rstest]
    #[case::missing_title(CreateCourseRequest { title: None, ..request() }, "title")]
    #[case::bad_thumbnail(
        CreateCourseRequest { thumbnail_url: Some("ftp://x/y.bmp".into()), ..request() },
        "thumbnailUrl"
    )]
    #[case::missing_category(CreateCourseRequest { category_id: None, ..request() }, "categoryId")]
    #[case::malformed_area(
        CreateCourseRequest { area_id: Some("area-51".into()), ..request() },
        "areaId"
    )]
    #[case::non_youtube_video(
        CreateCourseRequest {
            videos: Some(vec![VideoRequest {
                title: Some("Clip".into()),
                url: Some("https://vimeo.com/1".into()),
            }]),
            ..request()
        },
        "videos"
    )]
    #[case::too_many_videos(
        CreateCourseRequest {
            videos: Some(
                (0..=VIDEOS_MAX)
                    .map(|index| VideoRequest {
                        title: Some(format!("Part {index}")),
                        url: Some("https://youtu.be/abc".into()),
                    })
                    .collect(),
            ),
            ..request()
        },
        "videos"
    )]
    fn invalid_requests_name_the_field(#[case] req: CreateCourseRequest, #[case] field: &str) {
        let err = CourseDraft::try_from(req).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(field_of(&err), Some(&json!(field)));
    }

    #[test]
    fn list_query_parses_every_filter() {
        let category = Uuid::new_v4();
        let query = CourseListQuery {
            title: Some("rust".into()),
            min_rating: Some("2".into()),
            max_rating: Some("4.5".into()),
            created_after: Some("2024-01-01T00:00:00Z".into()),
            created_before: None,
            category_id: Some(category.to_string()),
        };

        let filter = CourseFilter::try_from(query).expect("valid filter");

        assert_eq!(filter.title_contains.as_deref(), Some("rust"));
        assert_eq!(filter.min_rating, Some(2.0));
        assert_eq!(filter.max_rating, Some(4.5));
        assert!(filter.created_after.is_some());
        assert_eq!(filter.category, Some(TaxonomyId::from_uuid(category)));
    }

    #[test]
    fn blank_title_filter_is_ignored() {
        let query = CourseListQuery {
            title: Some("  ".into()),
            ..CourseListQuery::default()
        };
        let filter = CourseFilter::try_from(query).expect("valid filter");
        assert!(filter.title_contains.is_none());
    }
}
