//! Typed newdle API client.
//!
//! Each method builds a [`RequestDescriptor`], runs it through the
//! [`RequestExecutor`] and decodes the payload into a core model.
//! Whether a call is anonymous is decided here, per operation.

use newdle_core::{
    BusySlot, FooterLink, NewNewdle, Newdle, NewdleUpdate, Participant, ParticipantUpdate, User,
    UserSearch,
};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::context::ClientContext;
use crate::endpoint::{check_code, Endpoint};
use crate::error::ClientError;
use crate::executor::RequestExecutor;
use crate::request::{Method, RequestDescriptor};

/// Client for the newdle REST API.
#[derive(Debug, Clone)]
pub struct NewdleClient {
    executor: RequestExecutor,
}

impl NewdleClient {
    /// Creates a client over an executor.
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    /// Creates a client from a built context.
    pub fn from_context(ctx: ClientContext) -> Self {
        Self::new(ctx.executor)
    }

    /// Returns the underlying executor.
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T, ClientError> {
        let url = self.executor.resolve(&request.endpoint)?;
        self.executor.execute(&request).await?.decode(url.as_str())
    }

    async fn send(&self, request: RequestDescriptor) -> Result<(), ClientError> {
        self.executor.execute(&request).await.map(|_| ())
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Loads the profile of the logged-in user.
    #[instrument(skip(self))]
    pub async fn get_me(&self) -> Result<User, ClientError> {
        self.fetch(Endpoint::Me.request(Method::Get)).await
    }

    /// Searches users to invite.
    #[instrument(skip(self))]
    pub async fn search_users(&self, q: &str) -> Result<UserSearch, ClientError> {
        self.fetch(Endpoint::Users { q: q.to_string() }.request(Method::Get))
            .await
    }

    // ========================================================================
    // Newdles
    // ========================================================================

    /// Creates a newdle and returns it.
    #[instrument(skip(self, newdle), fields(title = %newdle.title))]
    pub async fn create_newdle(&self, newdle: &NewNewdle) -> Result<Newdle, ClientError> {
        newdle.validate()?;
        let request = Endpoint::CreateNewdle
            .request(Method::Post)
            .with_json(newdle)?;
        self.fetch(request).await
    }

    /// Loads a newdle. Without `full_details` the request is anonymous and
    /// the server returns its public view.
    #[instrument(skip(self))]
    pub async fn get_newdle(&self, code: &str, full_details: bool) -> Result<Newdle, ClientError> {
        let request = Endpoint::Newdle {
            code: check_code(code)?.to_string(),
        }
        .request(Method::Get)
        .anonymous(!full_details);
        self.fetch(request).await
    }

    /// Updates a newdle, e.g. to set its final date.
    #[instrument(skip(self, update))]
    pub async fn update_newdle(
        &self,
        code: &str,
        update: &NewdleUpdate,
    ) -> Result<Newdle, ClientError> {
        let request = Endpoint::Newdle {
            code: check_code(code)?.to_string(),
        }
        .request(Method::Patch)
        .with_json(update)?;
        self.fetch(request).await
    }

    /// Deletes a newdle.
    #[instrument(skip(self))]
    pub async fn delete_newdle(&self, code: &str) -> Result<(), ClientError> {
        let request = Endpoint::Newdle {
            code: check_code(code)?.to_string(),
        }
        .request(Method::Delete);
        self.send(request).await
    }

    /// Lists the newdles created by the user.
    #[instrument(skip(self))]
    pub async fn get_my_newdles(&self) -> Result<Vec<Newdle>, ClientError> {
        self.fetch(Endpoint::MyNewdles.request(Method::Get)).await
    }

    /// Lists the newdles the user was invited to.
    #[instrument(skip(self))]
    pub async fn get_newdles_participating(&self) -> Result<Vec<Newdle>, ClientError> {
        self.fetch(Endpoint::NewdlesParticipating.request(Method::Get))
            .await
    }

    /// Looks up busy intervals of a participant on one day.
    #[instrument(skip(self))]
    pub async fn get_busy_times(
        &self,
        date: &str,
        email: &str,
    ) -> Result<Vec<BusySlot>, ClientError> {
        let endpoint = Endpoint::BusyTimes {
            date: date.to_string(),
            email: email.to_string(),
        };
        self.fetch(endpoint.request(Method::Get)).await
    }

    /// Emails the final date to all participants.
    #[instrument(skip(self))]
    pub async fn send_result_emails(&self, code: &str) -> Result<(), ClientError> {
        let request = Endpoint::SendResultEmails {
            code: check_code(code)?.to_string(),
        }
        .request(Method::Post);
        self.send(request).await
    }

    /// Notifies participants that a newdle was deleted.
    #[instrument(skip(self))]
    pub async fn send_deletion_emails(&self, code: &str) -> Result<(), ClientError> {
        let request = Endpoint::SendDeletionEmails {
            code: check_code(code)?.to_string(),
        }
        .request(Method::Post);
        self.send(request).await
    }

    // ========================================================================
    // Participants
    // ========================================================================

    /// Loads a participant by code. Anonymous: the code is the credential.
    #[instrument(skip(self))]
    pub async fn get_participant(
        &self,
        code: &str,
        participant_code: &str,
    ) -> Result<Participant, ClientError> {
        self.fetch(participant_endpoint(code, participant_code)?.request(Method::Get).anonymous(true))
            .await
    }

    /// Saves a participant's answers. Anonymous like [`Self::get_participant`].
    #[instrument(skip(self, update))]
    pub async fn update_participant(
        &self,
        code: &str,
        participant_code: &str,
        update: &ParticipantUpdate,
    ) -> Result<Participant, ClientError> {
        let request = participant_endpoint(code, participant_code)?
            .request(Method::Patch)
            .anonymous(true)
            .with_json(update)?;
        self.fetch(request).await
    }

    // ========================================================================
    // Misc
    // ========================================================================

    /// Loads the footer links.
    #[instrument(skip(self))]
    pub async fn footer_links(&self) -> Result<Vec<FooterLink>, ClientError> {
        self.fetch(Endpoint::FooterLinks.request(Method::Get).anonymous(true))
            .await
    }
}

fn participant_endpoint(code: &str, participant_code: &str) -> Result<Endpoint, ClientError> {
    Ok(Endpoint::Participant {
        code: check_code(code)?.to_string(),
        participant_code: check_code(participant_code)?.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::WireResponse;
    use crate::test_support::{bearer, FakeSession, ScriptedTransport};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Arc;
    use url::Url;

    fn client(transport: Arc<ScriptedTransport>, token: Option<&str>) -> NewdleClient {
        NewdleClient::new(RequestExecutor::new(
            Url::parse("http://newdle.test/").unwrap(),
            transport,
            FakeSession::new(token),
        ))
    }

    fn newdle_json(code: &str) -> serde_json::Value {
        json!({
            "code": code,
            "title": "Team sync",
            "duration": 30,
            "timezone": "Europe/Zurich",
            "timeslots": ["2026-10-19T09:00"],
            "participants": [],
            "private": false,
            "notify": false,
            "deleted": false,
            "final_dt": null
        })
    }

    #[tokio::test]
    async fn test_public_newdle_is_anonymous() {
        let transport = ScriptedTransport::new(|_| Ok(WireResponse::json(200, &newdle_json("abc"))));
        let api = client(transport.clone(), None);

        let newdle = api.get_newdle("abc", false).await.unwrap();
        assert_eq!(newdle.code, "abc");
        assert!(bearer(&transport.requests()[0]).is_none());
    }

    #[tokio::test]
    async fn test_full_newdle_is_authenticated() {
        let transport = ScriptedTransport::new(|_| Ok(WireResponse::json(200, &newdle_json("abc"))));
        let api = client(transport.clone(), Some("tok-1"));

        api.get_newdle("abc", true).await.unwrap();
        assert_eq!(bearer(&transport.requests()[0]).as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_invalid_newdle_never_sent() {
        let transport = ScriptedTransport::new(|_| Ok(WireResponse::json(200, &json!({}))));
        let api = client(transport.clone(), Some("tok-1"));

        let newdle = NewNewdle {
            title: "x".to_string(),
            duration: 30,
            timezone: "UTC".to_string(),
            timeslots: vec![NaiveDate::from_ymd_opt(2026, 10, 19)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()],
            participants: vec![],
            private: false,
            notify: false,
        };

        let err = api.create_newdle(&newdle).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn test_update_participant() {
        let transport = ScriptedTransport::new(|req| {
            let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            Ok(WireResponse::json(
                200,
                &json!({"name": "Ada", "answers": body["answers"], "comment": body["comment"]}),
            ))
        });
        let api = client(transport.clone(), None);

        let mut update = ParticipantUpdate::default();
        update
            .answers
            .insert("2026-10-19T09:00".to_string(), newdle_core::Availability::Ifneedbe);
        update.comment = "late".to_string();

        let participant = api.update_participant("abc", "P1", &update).await.unwrap();
        assert_eq!(participant.answers, update.answers);

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Patch);
        assert_eq!(sent.url.path(), "/api/newdle/abc/participants/P1");
        assert!(bearer(sent).is_none());
    }

    #[tokio::test]
    async fn test_delete_accepts_no_content() {
        let transport = ScriptedTransport::new(|_| Ok(WireResponse::new(204, "")));
        let api = client(transport, Some("tok-1"));
        api.delete_newdle("abc").await.unwrap();
    }

    #[tokio::test]
    async fn test_busy_times_query_and_decode() {
        let transport = ScriptedTransport::new(|_| {
            Ok(WireResponse::json(200, &json!([["09:00", "10:30"], ["14:00", "15:00"]])))
        });
        let api = client(transport.clone(), Some("tok-1"));

        let busy = api.get_busy_times("2026-10-19", "ada@example.com").await.unwrap();
        assert_eq!(busy[1], BusySlot("14:00".to_string(), "15:00".to_string()));

        let sent = &transport.requests()[0];
        assert_eq!(sent.url.path(), "/api/busy/");
        assert_eq!(sent.url.query(), Some("date=2026-10-19&email=ada%40example.com"));
    }

    #[tokio::test]
    async fn test_final_date_then_result_emails() {
        let transport = ScriptedTransport::new(|req| match req.method {
            Method::Patch => {
                let body: serde_json::Value =
                    serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                let mut newdle = newdle_json("abc");
                newdle["final_dt"] = body["final_dt"].clone();
                Ok(WireResponse::json(200, &newdle))
            }
            _ => Ok(WireResponse::new(204, "")),
        });
        let api = client(transport.clone(), Some("tok-1"));

        let update = NewdleUpdate {
            final_dt: Some(
                NaiveDate::from_ymd_opt(2026, 10, 19)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap(),
            ),
        };
        let newdle = api.update_newdle("abc", &update).await.unwrap();
        assert!(newdle.is_finished());

        api.send_result_emails("abc").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"final_dt":"2026-10-19T09:00"}"#));
        assert_eq!(requests[1].method, Method::Post);
        assert_eq!(requests[1].url.path(), "/api/newdle/abc/send-result-emails");
    }

    #[tokio::test]
    async fn test_payload_mismatch_is_parse_error() {
        let transport = ScriptedTransport::new(|_| Ok(WireResponse::json(200, &json!({"name": 1}))));
        let api = client(transport, Some("tok-1"));

        let err = api.get_me().await.unwrap_err();
        assert!(matches!(err, ClientError::Parse { .. }));
        assert!(err.to_string().contains("http://newdle.test/api/me/"));
    }

    #[tokio::test]
    async fn test_bad_code_rejected() {
        let transport = ScriptedTransport::new(|_| Ok(WireResponse::new(204, "")));
        let api = client(transport.clone(), Some("tok-1"));

        assert!(api.get_participant("abc", "../x").await.is_err());
        assert_eq!(transport.count(), 0);
    }
}
