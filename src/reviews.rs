//! Caregiver reviews: lookup by caregiver and validated submission.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::common::User;

pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub caregiver_id: String,
    pub reviewer_id: String,
    pub reviewer_name: String,
    #[serde(default)]
    pub reviewer_image: Option<String>,
    pub rating: u8,
    pub text: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub helpful_count: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
}

/// What the review screen submits.
#[derive(Debug, Clone, Default)]
pub struct ReviewDraft {
    pub caregiver_id: String,
    pub rating: Option<u8>,
    pub text: String,
}

/// Reviews of one caregiver, in catalogue order.
pub fn reviews_for<'a>(
    reviews: &'a [Review],
    caregiver_id: &str,
) -> Result<Vec<&'a Review>, ReviewError> {
    if caregiver_id.trim().is_empty() {
        return Err(ReviewError::MissingField("caregiverId"));
    }
    Ok(reviews
        .iter()
        .filter(|review| review.caregiver_id == caregiver_id)
        .collect())
}

/// Turns a draft into a review by `reviewer`, dated `today`.
pub fn new_review(
    draft: &ReviewDraft,
    reviewer: &User,
    today: NaiveDate,
) -> Result<Review, ReviewError> {
    if draft.caregiver_id.trim().is_empty() {
        return Err(ReviewError::MissingField("caregiverId"));
    }
    let rating = match draft.rating {
        None | Some(0) => return Err(ReviewError::MissingField("rating")),
        Some(rating) if rating > MAX_RATING => return Err(ReviewError::InvalidRating(rating)),
        Some(rating) => rating,
    };
    let text = draft.text.trim();
    if text.is_empty() {
        return Err(ReviewError::MissingField("text"));
    }

    Ok(Review {
        id: Uuid::new_v4().to_string(),
        caregiver_id: draft.caregiver_id.trim().to_string(),
        reviewer_id: reviewer.id.clone(),
        reviewer_name: reviewer.name.clone(),
        reviewer_image: reviewer.profile_image.clone(),
        rating,
        text: text.to_string(),
        date: today,
        helpful_count: 0,
    })
}

pub fn average_rating(reviews: &[&Review]) -> Option<f32> {
    if reviews.is_empty() {
        return None;
    }
    let total: u32 = reviews.iter().map(|review| u32::from(review.rating)).sum();
    Some(total as f32 / reviews.len() as f32)
}

fn sample(
    id: &str,
    caregiver_id: &str,
    reviewer: (&str, &str),
    rating: u8,
    text: &str,
    (year, month, day): (i32, u32, u32),
    helpful_count: u32,
) -> Option<Review> {
    Some(Review {
        id: id.to_string(),
        caregiver_id: caregiver_id.to_string(),
        reviewer_id: reviewer.0.to_string(),
        reviewer_name: reviewer.1.to_string(),
        reviewer_image: None,
        rating,
        text: text.to_string(),
        date: NaiveDate::from_ymd_opt(year, month, day)?,
        helpful_count,
    })
}

/// Built-in reviews matching the built-in caregiver catalogue.
pub fn sample_reviews() -> Vec<Review> {
    [
        sample(
            "1",
            "1",
            ("u1", "Jennifer B."),
            5,
            "Always on time and very responsible. Our baby settled with her in days.",
            (2023, 10, 15),
            24,
        ),
        sample(
            "2",
            "1",
            ("u2", "Robert M."),
            5,
            "Patient and kind, and her weaning meals are excellent.",
            (2023, 9, 22),
            18,
        ),
        sample(
            "3",
            "1",
            ("u3", "Sarah T."),
            4,
            "Great with our toddler. Occasionally a few minutes late, but always told us in advance.",
            (2023, 8, 5),
            12,
        ),
        sample(
            "4",
            "2",
            ("u4", "David L."),
            5,
            "Took wonderful care of my father after his surgery.",
            (2023, 11, 3),
            31,
        ),
        sample(
            "5",
            "3",
            ("u6", "Andrew J."),
            4,
            "Keeps the house spotless and cooks great home-style food.",
            (2023, 11, 8),
            15,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn draft() -> ReviewDraft {
        ReviewDraft {
            caregiver_id: "2".into(),
            rating: Some(4),
            text: "  Reliable and warm.  ".into(),
        }
    }

    #[test]
    fn reviews_are_grouped_by_caregiver() {
        let reviews = sample_reviews();
        let ids: Vec<&str> = reviews_for(&reviews, "1")
            .unwrap()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(reviews_for(&reviews, "404").unwrap().is_empty());
    }

    #[test]
    fn caregiver_id_is_required_for_lookup() {
        let reviews = sample_reviews();
        assert_eq!(
            reviews_for(&reviews, " "),
            Err(ReviewError::MissingField("caregiverId"))
        );
    }

    #[test]
    fn new_review_takes_reviewer_identity() {
        let reviewer = User::new("u9", "Ann");
        let review = new_review(&draft(), &reviewer, today()).unwrap();
        assert_eq!(review.text, "Reliable and warm.");
        assert_eq!(review.reviewer_name, "Ann");
        assert_eq!(review.caregiver_id, "2");
        assert_eq!(review.date, today());
        assert_eq!(review.helpful_count, 0);
    }

    #[test]
    fn new_review_requires_every_field() {
        let reviewer = User::new("u9", "Ann");

        let no_caregiver = ReviewDraft {
            caregiver_id: String::new(),
            ..draft()
        };
        assert_eq!(
            new_review(&no_caregiver, &reviewer, today()),
            Err(ReviewError::MissingField("caregiverId"))
        );

        let no_rating = ReviewDraft {
            rating: None,
            ..draft()
        };
        assert_eq!(
            new_review(&no_rating, &reviewer, today()),
            Err(ReviewError::MissingField("rating"))
        );

        let zero_rating = ReviewDraft {
            rating: Some(0),
            ..draft()
        };
        assert_eq!(
            new_review(&zero_rating, &reviewer, today()),
            Err(ReviewError::MissingField("rating"))
        );

        let blank_text = ReviewDraft {
            text: "   ".into(),
            ..draft()
        };
        assert_eq!(
            new_review(&blank_text, &reviewer, today()),
            Err(ReviewError::MissingField("text"))
        );
    }

    #[test]
    fn rating_above_five_is_rejected() {
        let too_high = ReviewDraft {
            rating: Some(6),
            ..draft()
        };
        assert_eq!(
            new_review(&too_high, &User::new("u9", "Ann"), today()),
            Err(ReviewError::InvalidRating(6))
        );
    }

    #[test]
    fn average_of_sample_reviews() {
        let reviews = sample_reviews();
        let first = reviews_for(&reviews, "1").unwrap();
        let average = average_rating(&first).unwrap();
        assert!((average - 14.0 / 3.0).abs() < 1e-6);
        assert_eq!(average_rating(&[]), None);
    }
}
