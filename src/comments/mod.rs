//! Comment submission
//!
//! Readers submit `{_id, name, email, comment}`. The payload is stored as
//! an unapproved `comment` document and only shows up on the article
//! once a moderator flips `approved` in the content studio.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::content::Reference;
use crate::sanity::{ClientError, MutationResult, SanityClient};

/// The comment form payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(rename = "_id", default)]
    pub post_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub comment: String,
}

/// A required form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Comment,
    Email,
}

impl Field {
    /// Inline message shown under the form
    pub fn message(self) -> &'static str {
        match self {
            Field::Name => "❗The Name Field is required",
            Field::Comment => "❗The Comment Field is required",
            Field::Email => "❗The Email Field is required",
        }
    }
}

impl CommentForm {
    /// Required-field check done before anything is sent
    ///
    /// Missing fields come back in display order: name, comment, email.
    pub fn validate(&self) -> Result<(), Vec<Field>> {
        let missing: Vec<Field> = [
            (Field::Name, &self.name),
            (Field::Comment, &self.comment),
            (Field::Email, &self.email),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }

    /// The document persisted for moderation
    pub fn into_document(self) -> NewComment {
        NewComment {
            kind: "comment",
            post: Reference::to(&self.post_id),
            name: self.name,
            email: self.email,
            comment: self.comment,
            approved: false,
        }
    }
}

/// A comment document as created in the content store
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    #[serde(rename = "_type")]
    pub kind: &'static str,
    pub post: Reference,
    pub name: String,
    pub email: String,
    pub comment: String,
    pub approved: bool,
}

/// Forward a comment to the content store
///
/// No field validation happens here; callers that own a form run
/// [`CommentForm::validate`] first.
pub async fn submit(
    client: &SanityClient,
    form: CommentForm,
) -> Result<MutationResult, ClientError> {
    let post_id = form.post_id.clone();
    let result = client.create(&form.into_document()).await?;
    tracing::info!(
        "Comment on {} stored for moderation (transaction {})",
        post_id,
        result.transaction_id
    );
    Ok(result)
}

/// Where a single comment submission is
///
/// `Idle -> Submitting -> Submitted | Idle`, and `Submitted` falls back to
/// `Idle` once the acknowledgement window has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Submitted {
        at: Instant,
    },
}

impl SubmissionState {
    /// The request went out
    pub fn begin(self) -> Self {
        match self {
            SubmissionState::Idle => SubmissionState::Submitting,
            other => other,
        }
    }

    /// The request resolved; failures go straight back to the form
    pub fn finish(self, succeeded: bool, now: Instant) -> Self {
        match self {
            SubmissionState::Submitting if succeeded => SubmissionState::Submitted { at: now },
            SubmissionState::Submitting => SubmissionState::Idle,
            other => other,
        }
    }

    /// Timed transition out of the acknowledgement
    pub fn tick(self, now: Instant, window: Duration) -> Self {
        match self {
            SubmissionState::Submitted { at } if now.saturating_duration_since(at) >= window => {
                SubmissionState::Idle
            }
            other => other,
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmissionState::Submitted { .. })
    }
}

/// What the comment form partial renders
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormView {
    pub submitted: bool,
    pub errors: Vec<&'static str>,
    pub name: String,
    pub email: String,
    pub comment: String,
    /// Seconds until the page returns to the empty form
    pub ack_seconds: u64,
}

impl FormView {
    /// An empty form
    pub fn idle(ack_seconds: u64) -> Self {
        Self {
            ack_seconds,
            ..Default::default()
        }
    }

    /// The form again, with what the reader typed and inline messages
    pub fn invalid(form: &CommentForm, missing: &[Field], ack_seconds: u64) -> Self {
        Self {
            submitted: false,
            errors: missing.iter().map(|f| f.message()).collect(),
            name: form.name.clone(),
            email: form.email.clone(),
            comment: form.comment.clone(),
            ack_seconds,
        }
    }

    /// View for a submission state as of `now`
    ///
    /// An acknowledgement older than `ack_seconds` renders as the empty form.
    pub fn from_state(state: SubmissionState, now: Instant, ack_seconds: u64) -> Self {
        let state = state.tick(now, Duration::from_secs(ack_seconds));
        Self {
            submitted: state.is_submitted(),
            ..Self::idle(ack_seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SanityConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form() -> CommentForm {
        CommentForm {
            post_id: "p1".to_string(),
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            comment: "hi".to_string(),
        }
    }

    #[test]
    fn test_validate_complete_form() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut incomplete = form();
        incomplete.name = String::new();
        incomplete.email = "   ".to_string();
        assert_eq!(incomplete.validate(), Err(vec![Field::Name, Field::Email]));
        assert_eq!(Field::Name.message(), "❗The Name Field is required");
    }

    #[test]
    fn test_document_is_unapproved() {
        let value = serde_json::to_value(form().into_document()).unwrap();
        assert_eq!(
            value,
            json!({
                "_type": "comment",
                "post": {"_type": "reference", "_ref": "p1"},
                "name": "Alice",
                "email": "a@x.com",
                "comment": "hi",
                "approved": false
            })
        );
    }

    #[test]
    fn test_form_accepts_partial_json() {
        let form: CommentForm = serde_json::from_str(r#"{"_id": "p1", "comment": "hi"}"#).unwrap();
        assert_eq!(form.post_id, "p1");
        assert!(form.name.is_empty());
    }

    #[test]
    fn test_state_success_then_timeout() {
        let start = Instant::now();
        let window = Duration::from_secs(5);

        let state = SubmissionState::Idle.begin();
        assert_eq!(state, SubmissionState::Submitting);

        let state = state.finish(true, start);
        assert!(state.is_submitted());

        let state = state.tick(start + Duration::from_secs(2), window);
        assert!(state.is_submitted());

        let state = state.tick(start + window, window);
        assert_eq!(state, SubmissionState::Idle);
    }

    #[test]
    fn test_state_failure_returns_to_idle() {
        let state = SubmissionState::Idle
            .begin()
            .finish(false, Instant::now());
        assert_eq!(state, SubmissionState::Idle);
        assert!(!FormView::from_state(state, Instant::now(), 5).submitted);
    }

    #[test]
    fn test_view_expires_acknowledgement() {
        let at = Instant::now();
        let submitted = SubmissionState::Submitting.finish(true, at);

        let view = FormView::from_state(submitted, at + Duration::from_secs(1), 5);
        assert!(view.submitted);
        assert_eq!(view.ack_seconds, 5);

        let view = FormView::from_state(submitted, at + Duration::from_secs(5), 5);
        assert!(!view.submitted);
    }

    #[test]
    fn test_state_ignores_out_of_order_events() {
        let now = Instant::now();
        assert_eq!(SubmissionState::Idle.finish(true, now), SubmissionState::Idle);

        let submitted = SubmissionState::Submitted { at: now };
        assert_eq!(submitted.begin(), submitted);
    }

    #[test]
    fn test_invalid_view_keeps_input() {
        let mut incomplete = form();
        incomplete.name.clear();
        let missing = incomplete.validate().unwrap_err();
        let view = FormView::invalid(&incomplete, &missing, 5);
        assert_eq!(view.errors, vec!["❗The Name Field is required"]);
        assert_eq!(view.comment, "hi");
        assert!(!view.submitted);
    }

    #[tokio::test]
    async fn test_submit_stores_unapproved_comment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2021-03-25/data/mutate/production"))
            .and(body_json(json!({
                "mutations": [{"create": {
                    "_type": "comment",
                    "post": {"_type": "reference", "_ref": "p1"},
                    "name": "Alice",
                    "email": "a@x.com",
                    "comment": "hi",
                    "approved": false
                }}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "transactionId": "tx1",
                "results": [{"id": "c1", "operation": "create"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SanityClient::new(&SanityConfig {
            project_id: "p".to_string(),
            api_host: Some(server.uri()),
            token: Some("sk".to_string()),
            ..Default::default()
        })
        .unwrap();

        let result = submit(&client, form()).await.unwrap();
        assert_eq!(result.results[0].id, "c1");
    }
}
