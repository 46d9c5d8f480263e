use chrono::{DateTime, Utc};
use serde::Serialize;

/// Human-facing classification of a publication at a given instant.
///
/// Rendering the final string is the job of an external string-templating
/// collaborator: each variant exposes a symbolic key plus named timestamp
/// placeholders, nothing more. The bare variants reuse the status tags as
/// keys (`draft`, `published`, `scheduled`, `unpublished`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "key", rename_all = "snake_case")]
pub enum PublicationLabel {
    Draft,
    Published,
    Scheduled,
    Unpublished,
    UnpublishedSince {
        since: DateTime<Utc>,
    },
    PublishedSince {
        since: DateTime<Utc>,
    },
    PublishedSinceUntil {
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    },
    WillBePublishedFrom {
        from: DateTime<Utc>,
    },
    WillBePublishedFromTo {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl PublicationLabel {
    /// Symbolic key the translation collaborator resolves.
    pub fn key(&self) -> &'static str {
        match self {
            PublicationLabel::Draft => "draft",
            PublicationLabel::Published => "published",
            PublicationLabel::Scheduled => "scheduled",
            PublicationLabel::Unpublished => "unpublished",
            PublicationLabel::UnpublishedSince { .. } => "unpublished_since",
            PublicationLabel::PublishedSince { .. } => "published_since",
            PublicationLabel::PublishedSinceUntil { .. } => "published_since_until",
            PublicationLabel::WillBePublishedFrom { .. } => "will_be_published_from",
            PublicationLabel::WillBePublishedFromTo { .. } => "will_be_published_from_to",
        }
    }

    /// Named timestamp placeholders of the key, in template order.
    pub fn placeholders(&self) -> Vec<(&'static str, DateTime<Utc>)> {
        match *self {
            PublicationLabel::Draft
            | PublicationLabel::Published
            | PublicationLabel::Scheduled
            | PublicationLabel::Unpublished => Vec::new(),
            PublicationLabel::UnpublishedSince { since } => vec![("since", since)],
            PublicationLabel::PublishedSince { since } => vec![("since", since)],
            PublicationLabel::PublishedSinceUntil { since, until } => {
                vec![("since", since), ("until", until)]
            }
            PublicationLabel::WillBePublishedFrom { from } => vec![("from", from)],
            PublicationLabel::WillBePublishedFromTo { from, to } => {
                vec![("from", from), ("to", to)]
            }
        }
    }

    /// Resolve through a renderer.
    pub fn render(&self, renderer: &impl RenderLabel) -> String {
        renderer.render(self.key(), &self.placeholders())
    }
}

/// The external string-templating collaborator, keyed by a symbolic label
/// name plus named placeholders.
pub trait RenderLabel {
    fn render(&self, key: &str, placeholders: &[(&'static str, DateTime<Utc>)]) -> String;
}

/// Locale-free renderer: the key followed by its placeholders in RFC 3339.
/// Good enough for logs and tests; real deployments plug in their catalog.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainRenderer;

impl RenderLabel for PlainRenderer {
    fn render(&self, key: &str, placeholders: &[(&'static str, DateTime<Utc>)]) -> String {
        let mut rendered = key.to_owned();
        for (name, at) in placeholders {
            rendered.push_str(&format!(" {}={}", name, at.to_rfc3339()));
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use super::*;

    #[test]
    fn every_variant_exposes_its_key_and_placeholders() {
        let at = Utc::now();
        let later = at + TimeDelta::hours(1);

        let cases = [
            (PublicationLabel::Draft, "draft", vec![]),
            (PublicationLabel::Published, "published", vec![]),
            (PublicationLabel::Scheduled, "scheduled", vec![]),
            (PublicationLabel::Unpublished, "unpublished", vec![]),
            (
                PublicationLabel::UnpublishedSince { since: at },
                "unpublished_since",
                vec![("since", at)],
            ),
            (
                PublicationLabel::PublishedSince { since: at },
                "published_since",
                vec![("since", at)],
            ),
            (
                PublicationLabel::PublishedSinceUntil {
                    since: at,
                    until: later,
                },
                "published_since_until",
                vec![("since", at), ("until", later)],
            ),
            (
                PublicationLabel::WillBePublishedFrom { from: later },
                "will_be_published_from",
                vec![("from", later)],
            ),
            (
                PublicationLabel::WillBePublishedFromTo {
                    from: at,
                    to: later,
                },
                "will_be_published_from_to",
                vec![("from", at), ("to", later)],
            ),
        ];

        for (label, key, placeholders) in cases {
            assert_eq!(label.key(), key);
            assert_eq!(label.placeholders(), placeholders);
        }
    }

    #[test]
    fn plain_renderer_appends_placeholders() {
        let at = Utc::now();
        let rendered = PublicationLabel::PublishedSince { since: at }.render(&PlainRenderer);
        assert_eq!(rendered, format!("published_since since={}", at.to_rfc3339()));
    }
}
