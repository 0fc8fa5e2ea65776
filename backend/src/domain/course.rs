//! Courses, their videos, comments and ratings.
//!
//! The rating rules live on [`Course::apply_rating`]: one rating per author,
//! a later rating from the same author replaces the earlier one, and
//! `average_rating` is always the arithmetic mean of the stored scores (zero
//! when there are none). Storage adapters must apply the same rule
//! atomically.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{UserId, UserSummary};

/// Lowest accepted rating.
pub const RATING_MIN: f64 = 0.0;
/// Highest accepted rating.
pub const RATING_MAX: f64 = 5.0;
/// Maximum comment length in characters.
pub const COMMENT_MAX: usize = 2000;
/// Maximum number of videos attached to one course.
pub const VIDEOS_MAX: usize = 200;

/// Validation failures for course content.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CourseValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("thumbnail must be an http(s) URL ending in .jpg, .jpeg, .png or .gif")]
    InvalidThumbnail,
    #[error("video {index} needs a title")]
    EmptyVideoTitle { index: usize },
    #[error("video {index} must be a YouTube URL")]
    InvalidVideoUrl { index: usize },
    #[error("a course holds at most {max} videos")]
    TooManyVideos { max: usize },
    #[error("comment must not be empty")]
    EmptyComment,
    #[error("comment must be at most {max} characters")]
    CommentTooLong { max: usize },
    #[error("rating must be between {min} and {max}, got {score}", min = RATING_MIN, max = RATING_MAX)]
    RatingOutOfRange { score: f64 },
    #[error("minimum rating filter must not exceed the maximum")]
    InvertedRatingRange,
    #[error("createdAfter must not be later than createdBefore")]
    InvertedDateRange,
}

impl CourseValidationError {
    /// Request field the failure refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "title",
            Self::EmptyDescription => "description",
            Self::InvalidThumbnail => "thumbnailUrl",
            Self::EmptyVideoTitle { .. }
            | Self::InvalidVideoUrl { .. }
            | Self::TooManyVideos { .. } => "videos",
            Self::EmptyComment | Self::CommentTooLong { .. } => "comment",
            Self::RatingOutOfRange { .. } => "rating",
            Self::InvertedRatingRange => "minRating",
            Self::InvertedDateRange => "createdAfter",
        }
    }
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Stable course identifier.
    CourseId
);
uuid_id!(
    /// Reference to a category or area node. Taxonomy management lives
    /// elsewhere, so existence is not checked here.
    TaxonomyId
);

static VIDEO_URL_RE: OnceLock<Regex> = OnceLock::new();
static THUMBNAIL_URL_RE: OnceLock<Regex> = OnceLock::new();

fn video_url_regex() -> &'static Regex {
    VIDEO_URL_RE.get_or_init(|| {
        Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.?be)/.+$")
            .unwrap_or_else(|error| panic!("video url regex failed to compile: {error}"))
    })
}

fn thumbnail_url_regex() -> &'static Regex {
    THUMBNAIL_URL_RE.get_or_init(|| {
        Regex::new(r"(?i)^https?://.*\.(jpg|jpeg|png|gif)$")
            .unwrap_or_else(|error| panic!("thumbnail url regex failed to compile: {error}"))
    })
}

/// Link to a YouTube video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoUrl(String);

impl VideoUrl {
    /// Returns `None` when `raw` is not a YouTube link.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        video_url_regex()
            .is_match(trimmed)
            .then(|| Self(trimmed.to_owned()))
    }

    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Link to a course thumbnail image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThumbnailUrl(String);

impl ThumbnailUrl {
    /// Accepts http(s) links to a JPEG, PNG or GIF.
    pub fn parse(raw: &str) -> Result<Self, CourseValidationError> {
        let trimmed = raw.trim();
        if thumbnail_url_regex().is_match(trimmed) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(CourseValidationError::InvalidThumbnail)
        }
    }

    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A score in `[RATING_MIN, RATING_MAX]`. Never NaN.
///
/// # Examples
/// ```
/// use campus_backend::domain::RatingScore;
///
/// assert!(RatingScore::new(4.5).is_ok());
/// assert!(RatingScore::new(6.0).is_err());
/// assert!(RatingScore::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct RatingScore(f64);

impl RatingScore {
    /// Accepts finite scores in the closed range.
    pub fn new(score: f64) -> Result<Self, CourseValidationError> {
        if (RATING_MIN..=RATING_MAX).contains(&score) {
            Ok(Self(score))
        } else {
            Err(CourseValidationError::RatingOutOfRange { score })
        }
    }

    pub(crate) const fn from_stored(score: f64) -> Self {
        Self(score)
    }

    /// Raw score.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

/// Non-blank comment body of bounded length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommentText(String);

impl CommentText {
    /// Trim `raw` and enforce [`COMMENT_MAX`].
    pub fn new(raw: &str) -> Result<Self, CourseValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CourseValidationError::EmptyComment);
        }
        if trimmed.chars().count() > COMMENT_MAX {
            return Err(CourseValidationError::CommentTooLong { max: COMMENT_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Video attached to a course, in the order it was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseVideo {
    pub title: String,
    pub url: VideoUrl,
    pub created_at: DateTime<Utc>,
}

/// Comment left on a course. Comments are append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseComment {
    pub author: UserId,
    pub text: CommentText,
    pub created_at: DateTime<Utc>,
}

/// One author's rating of a course.
///
/// `rated_at` records when the score was last set, so a replaced rating
/// carries the time of the replacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseRating {
    pub author: UserId,
    pub score: RatingScore,
    pub rated_at: DateTime<Utc>,
}

/// Whether a rating was new or replaced the author's earlier one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatingOutcome {
    Added,
    Replaced { previous: RatingScore },
}

/// Mean of the given scores, or zero for no ratings.
#[must_use]
pub fn average_score(ratings: &[CourseRating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let total: f64 = ratings.iter().map(|rating| rating.score.value()).sum();
    #[expect(
        clippy::cast_precision_loss,
        reason = "rating counts stay far below 2^52"
    )]
    let count = ratings.len() as f64;
    total / count
}

/// Video as submitted, before it has a timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDraft {
    pub title: String,
    pub url: VideoUrl,
}

/// Validated input for creating a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub thumbnail: ThumbnailUrl,
    pub videos: Vec<VideoDraft>,
    pub category: TaxonomyId,
    pub area: Option<TaxonomyId>,
}

impl CourseDraft {
    /// Validate the course header. Videos are added with
    /// [`CourseDraft::with_video`].
    pub fn try_new(
        title: &str,
        description: &str,
        thumbnail: &str,
        category: TaxonomyId,
        area: Option<TaxonomyId>,
    ) -> Result<Self, CourseValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CourseValidationError::EmptyTitle);
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(CourseValidationError::EmptyDescription);
        }
        Ok(Self {
            title: title.to_owned(),
            description: description.to_owned(),
            thumbnail: ThumbnailUrl::parse(thumbnail)?,
            videos: Vec::new(),
            category,
            area,
        })
    }

    /// Append a video, validating its title and URL.
    pub fn with_video(mut self, title: &str, url: &str) -> Result<Self, CourseValidationError> {
        let index = self.videos.len();
        if index >= VIDEOS_MAX {
            return Err(CourseValidationError::TooManyVideos { max: VIDEOS_MAX });
        }
        let title = title.trim();
        if title.is_empty() {
            return Err(CourseValidationError::EmptyVideoTitle { index });
        }
        let url = VideoUrl::parse(url).ok_or(CourseValidationError::InvalidVideoUrl { index })?;
        self.videos.push(VideoDraft {
            title: title.to_owned(),
            url,
        });
        Ok(self)
    }
}

/// Course aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub thumbnail: ThumbnailUrl,
    pub videos: Vec<CourseVideo>,
    pub creator: UserId,
    pub category: TaxonomyId,
    pub area: Option<TaxonomyId>,
    pub comments: Vec<CourseComment>,
    pub ratings: Vec<CourseRating>,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Materialise a draft; videos share the course creation time.
    #[must_use]
    pub fn from_draft(
        id: CourseId,
        creator: UserId,
        draft: CourseDraft,
        created_at: DateTime<Utc>,
    ) -> Self {
        let CourseDraft {
            title,
            description,
            thumbnail,
            videos,
            category,
            area,
        } = draft;
        Self {
            id,
            title,
            description,
            thumbnail,
            videos: videos
                .into_iter()
                .map(|video| CourseVideo {
                    title: video.title,
                    url: video.url,
                    created_at,
                })
                .collect(),
            creator,
            category,
            area,
            comments: Vec::new(),
            ratings: Vec::new(),
            average_rating: 0.0,
            created_at,
        }
    }

    /// Upsert `rating` by author and refresh the average.
    pub fn apply_rating(&mut self, rating: CourseRating) -> RatingOutcome {
        let outcome = match self
            .ratings
            .iter_mut()
            .find(|existing| existing.author == rating.author)
        {
            Some(existing) => {
                let previous = existing.score;
                existing.score = rating.score;
                existing.rated_at = rating.rated_at;
                RatingOutcome::Replaced { previous }
            }
            None => {
                self.ratings.push(rating);
                RatingOutcome::Added
            }
        };
        self.average_rating = average_score(&self.ratings);
        outcome
    }

    /// Append `comment` after any existing ones.
    pub fn add_comment(&mut self, comment: CourseComment) {
        self.comments.push(comment);
    }

    /// Score currently recorded for `author`, if any.
    #[must_use]
    pub fn rating_by(&self, author: &UserId) -> Option<RatingScore> {
        self.ratings
            .iter()
            .find(|rating| &rating.author == author)
            .map(|rating| rating.score)
    }
}

/// Query over the course catalogue. Every criterion is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseFilter {
    pub title_contains: Option<String>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub category: Option<TaxonomyId>,
}

impl CourseFilter {
    /// Reject ranges that can never match.
    pub fn validate(&self) -> Result<(), CourseValidationError> {
        for bound in [self.min_rating, self.max_rating].into_iter().flatten() {
            RatingScore::new(bound)?;
        }
        if let (Some(min), Some(max)) = (self.min_rating, self.max_rating)
            && min > max
        {
            return Err(CourseValidationError::InvertedRatingRange);
        }
        if let (Some(after), Some(before)) = (self.created_after, self.created_before)
            && after > before
        {
            return Err(CourseValidationError::InvertedDateRange);
        }
        Ok(())
    }

    /// Case-insensitive title match plus inclusive range checks.
    #[must_use]
    pub fn matches(&self, course: &Course) -> bool {
        let title_ok = self.title_contains.as_deref().is_none_or(|needle| {
            course
                .title
                .to_lowercase()
                .contains(&needle.trim().to_lowercase())
        });
        title_ok
            && self.min_rating.is_none_or(|min| course.average_rating >= min)
            && self.max_rating.is_none_or(|max| course.average_rating <= max)
            && self
                .created_after
                .is_none_or(|after| course.created_at >= after)
            && self
                .created_before
                .is_none_or(|before| course.created_at <= before)
            && self.category.is_none_or(|category| course.category == category)
    }
}

/// Course as presented to readers, with its creator resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseView {
    pub course: Course,
    pub creator: Option<UserSummary>,
}

/// Result of applying a rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingReceipt {
    pub course_id: CourseId,
    pub average_rating: f64,
    pub ratings_count: usize,
}

impl From<&Course> for RatingReceipt {
    fn from(course: &Course) -> Self {
        Self {
            course_id: course.id,
            average_rating: course.average_rating,
            ratings_count: course.ratings.len(),
        }
    }
}
