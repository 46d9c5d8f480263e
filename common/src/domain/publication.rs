use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::label::PublicationLabel;
use crate::domain::status::PublicationStatus;
use crate::domain::visibility::VisibilityExpr;

/// Publication state of a single entity row: the lifecycle tag plus up to
/// three timestamps.
///
/// `published_at` / `expired_at` bound the half-open visibility window
/// `[published_at, expired_at)` of a scheduled entity; both are implicit
/// (null) for the other statuses. `published_first_at` records the earliest
/// instant the entity ever became, or was scheduled to become, visible and is
/// never cleared by this engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub status: PublicationStatus,
    pub published_first_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
}

impl Publication {
    /// Save-time normalization, applied to every pending write before it is
    /// committed. Exactly one rule fires:
    ///
    /// 1. draft/unpublished with a publication history → unpublished, the
    ///    withdrawal moment captured in `expired_at`;
    /// 2. draft/unpublished without history → draft, both bounds cleared;
    /// 3. published → both bounds cleared, first publication stamped;
    /// 4. scheduled → missing lower bound defaults to `now`,
    ///    `published_first_at` pulled back to the earliest window start.
    ///
    /// Re-normalizing an already normalized value with the same `status` is a
    /// no-op, so repeated saves do not drift.
    pub fn normalize(&mut self, now: DateTime<Utc>) {
        match self.status {
            PublicationStatus::Draft | PublicationStatus::Unpublished
                if self.published_first_at.is_some() =>
            {
                // Transition (or stale window bound) fixes the withdrawal
                // moment; an already withdrawn row keeps its original one.
                if self.status == PublicationStatus::Draft || self.expired_at.is_none() {
                    debug!(at = %now, "entity with publication history withdrawn");
                    self.expired_at = Some(now);
                }
                self.status = PublicationStatus::Unpublished;
                self.published_at = None;
            }
            PublicationStatus::Draft | PublicationStatus::Unpublished => {
                if self.status == PublicationStatus::Unpublished {
                    debug!("unpublished without publication history coerced to draft");
                }
                self.status = PublicationStatus::Draft;
                self.published_at = None;
                self.expired_at = None;
            }
            PublicationStatus::Published => {
                self.published_at = None;
                self.expired_at = None;
                if self.published_first_at.is_none() {
                    self.published_first_at = Some(now);
                }
            }
            PublicationStatus::Scheduled => {
                let window_start = match self.published_at {
                    Some(at) => at,
                    None => {
                        debug!(at = %now, "scheduled without a window start, defaulting to now");
                        self.published_at = Some(now);
                        now
                    }
                };

                // Earliest visibility instant ever assigned, so the label
                // stays correct when a schedule is edited to start earlier.
                if self
                    .published_first_at
                    .is_none_or(|first| first > window_start)
                {
                    self.published_first_at = Some(window_start);
                }
            }
        }
    }

    /// Is the entity effectively visible at `now`?
    ///
    /// Logically identical to the default listing filter of the persistence
    /// crate; both interpret [`VisibilityExpr::visible`].
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        VisibilityExpr::visible().evaluate(self, now)
    }

    /// Visible now, or guaranteed to become visible later: published, or
    /// scheduled with a window opening strictly after `now`.
    pub fn will_be_published(&self, now: DateTime<Utc>) -> bool {
        self.status == PublicationStatus::Published
            || VisibilityExpr::upcoming().evaluate(self, now)
    }

    /// Human-facing classification at `now`, as a symbolic label plus its
    /// timestamp placeholders. Total: malformed rows degrade to the draft
    /// label, nothing panics.
    pub fn label(&self, now: DateTime<Utc>) -> PublicationLabel {
        match self.status {
            PublicationStatus::Draft => return PublicationLabel::Draft,
            PublicationStatus::Published => return PublicationLabel::Published,
            PublicationStatus::Scheduled if self.published_at.is_none() => {
                // Incomplete schedule from a non-conforming writer.
                return PublicationLabel::Draft;
            }
            _ => {}
        }

        if let Some(until) = self.expired_at {
            if until < now {
                return PublicationLabel::UnpublishedSince { since: until };
            }
        }

        match (self.published_at, self.expired_at) {
            (Some(since), None) if since <= now => PublicationLabel::PublishedSince { since },
            (Some(since), Some(until)) if since <= now => {
                PublicationLabel::PublishedSinceUntil { since, until }
            }
            (Some(from), None) => PublicationLabel::WillBePublishedFrom { from },
            (Some(from), Some(to)) => PublicationLabel::WillBePublishedFromTo { from, to },
            // No lower bound here means a withdrawn row whose expiry has not
            // elapsed yet (only reachable within the save instant itself).
            (None, _) => match self.status {
                PublicationStatus::Unpublished => PublicationLabel::Unpublished,
                _ => PublicationLabel::Scheduled,
            },
        }
    }
}
