use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ApiError, ApiResult, ThreadRef, ThreadSummary};
use crate::identity::SessionId;
use crate::thread::{Comment, CommentId};
use crate::vote::{VoteDirection, VoteState};

/// Header that carries the anonymous session id.
pub const SESSION_HEADER: &str = "x-anonymous-session";

/// Body of a new comment or reply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

#[derive(Serialize)]
struct VoteRequest {
    direction: VoteDirection,
}

/// HTTP client bound to one server and one anonymous session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionId,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        session: SessionId,
        timeout: Option<Duration>,
    ) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&session.to_string())
            .map_err(|e| ApiError::validation(format!("Invalid session header: {e}")))?;
        headers.insert(SESSION_HEADER, value);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::from_reqwest(&e))?;

        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Fetches the feedback item or question heading the thread.
    pub async fn get_summary(&self, thread: &ThreadRef) -> ApiResult<ThreadSummary> {
        self.get_json(&thread.item_path()).await
    }

    /// Fetches the flat comment list for a thread.
    pub async fn list_comments(&self, thread: &ThreadRef) -> ApiResult<Vec<Comment>> {
        let comments: Vec<Comment> = self.get_json(&thread.comments_path()).await?;
        debug!(thread = %thread, count = comments.len(), "fetched comments");
        Ok(comments)
    }

    /// Posts a root comment (`parent_id = None`) or a reply.
    ///
    /// Content is trimmed; empty content never reaches the server.
    pub async fn post_comment(
        &self,
        thread: &ThreadRef,
        content: &str,
        parent_id: Option<CommentId>,
    ) -> ApiResult<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::validation("Comment cannot be empty"));
        }

        let body = NewComment {
            content: content.to_string(),
            parent_id,
        };
        self.post_json(&thread.comments_path(), &body).await
    }

    /// Casts a vote; the server answers with the resulting tally.
    pub async fn cast_vote(
        &self,
        thread: &ThreadRef,
        direction: VoteDirection,
    ) -> ApiResult<VoteState> {
        self.post_json(&thread.vote_path(), &VoteRequest { direction })
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        if !status.is_success() {
            return Err(ApiError::http_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ApiError::parse(format!("Failed to parse response: {e}"), &body))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::ApiErrorKind;

    fn client_for(server: &MockServer, session: SessionId) -> ApiClient {
        ApiClient::new(server.uri(), session, Some(Duration::from_secs(5))).unwrap()
    }

    #[tokio::test]
    async fn test_list_comments_sends_session_header() {
        let server = MockServer::start().await;
        let session = SessionId::generate();

        Mock::given(method("GET"))
            .and(path("/api/feedback/42/comments"))
            .and(header(SESSION_HEADER, session.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "c1",
                    "parentId": null,
                    "authorLabel": null,
                    "isOriginalPoster": true,
                    "createdAt": "2024-05-01T10:00:00Z",
                    "content": "Thanks for the feedback"
                },
                {
                    "id": "c2",
                    "parentId": "c1",
                    "isOriginalPoster": false,
                    "createdAt": "2024-05-01T11:00:00Z",
                    "content": "Agreed"
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, session);
        let comments = client
            .list_comments(&ThreadRef::Feedback("42".into()))
            .await
            .unwrap();

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].display_author(), "OP");
        assert_eq!(comments[1].parent_id, Some(CommentId::from("c1")));
    }

    #[tokio::test]
    async fn test_post_reply_to_question_uses_responses_route() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/questions/7/responses"))
            .and(body_json(json!({"content": "Me too", "parentId": "r1"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "r2",
                "parentId": "r1",
                "isOriginalPoster": false,
                "createdAt": "2024-05-02T09:00:00Z",
                "content": "Me too"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, SessionId::generate());
        let comment = client
            .post_comment(
                &ThreadRef::Question("7".into()),
                "  Me too \n",
                Some(CommentId::from("r1")),
            )
            .await
            .unwrap();

        assert_eq!(comment.id, CommentId::from("r2"));
    }

    #[tokio::test]
    async fn test_empty_comment_is_rejected_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, SessionId::generate());
        let err = client
            .post_comment(&ThreadRef::Feedback("1".into()), "   ", None)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_cast_vote_returns_server_state() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/feedback/42/vote"))
            .and(body_json(json!({"direction": "down"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "upvotes": 3,
                "downvotes": 1,
                "myVote": "down"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, SessionId::generate());
        let state = client
            .cast_vote(&ThreadRef::Feedback("42".into()), VoteDirection::Down)
            .await
            .unwrap();

        assert_eq!(state.my_vote, Some(VoteDirection::Down));
        assert_eq!(state.score(), 2);
    }

    #[tokio::test]
    async fn test_http_error_is_structured() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/feedback/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "Feedback not found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, SessionId::generate());
        let err = client
            .get_summary(&ThreadRef::Feedback("missing".into()))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::HttpStatus);
        assert_eq!(err.message, "HTTP 404: Feedback not found");
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/feedback/1/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, SessionId::generate());
        let err = client
            .list_comments(&ThreadRef::Feedback("1".into()))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::Parse);
        assert_eq!(err.details.as_deref(), Some("<html>oops</html>"));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(
            server.uri(),
            SessionId::generate(),
            Some(Duration::from_millis(50)),
        )
        .unwrap();
        let err = client
            .list_comments(&ThreadRef::Feedback("1".into()))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::Timeout);
    }
}
