use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::publication::Publication;
use crate::domain::status::PublicationStatus;

/// Canonical, already-normalized publication fixtures.
///
/// Public so that other crates can reuse them for their own tests.

pub fn draft() -> Publication {
    Publication::default()
}

pub fn published(first_published_at: DateTime<Utc>) -> Publication {
    Publication {
        status: PublicationStatus::Published,
        published_first_at: Some(first_published_at),
        published_at: None,
        expired_at: None,
    }
}

pub fn unpublished(
    first_published_at: DateTime<Utc>,
    expired_at: DateTime<Utc>,
) -> Publication {
    Publication {
        status: PublicationStatus::Unpublished,
        published_first_at: Some(first_published_at),
        published_at: None,
        expired_at: Some(expired_at),
    }
}

pub fn scheduled(from: DateTime<Utc>, until: Option<DateTime<Utc>>) -> Publication {
    Publication {
        status: PublicationStatus::Scheduled,
        published_first_at: Some(from),
        published_at: Some(from),
        expired_at: until,
    }
}

/// Eight records covering every classification at the reference instant:
/// one scheduled in the future, one in an open-ended window, one in a window
/// closing later, one with an elapsed window, one published, one withdrawn,
/// and two drafts.
pub fn census(now: DateTime<Utc>) -> Vec<Publication> {
    let day = TimeDelta::days(1);
    vec![
        scheduled(now + day, None),
        scheduled(now - day, None),
        scheduled(now - day, Some(now + day)),
        scheduled(now - day * 2, Some(now - day)),
        published(now - day * 3),
        unpublished(now - day * 5, now - day * 2),
        draft(),
        draft(),
    ]
}
