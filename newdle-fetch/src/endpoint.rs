//! Logical endpoint names and their paths.

use std::fmt;

use url::form_urlencoded;

use crate::error::ClientError;
use crate::request::{Method, RequestDescriptor};

/// Endpoints of the newdle API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Profile of the logged-in user.
    Me,
    /// User search.
    Users {
        /// Search query.
        q: String,
    },
    /// Newdle creation.
    CreateNewdle,
    /// A single newdle (read, update, delete).
    Newdle {
        /// Newdle code.
        code: String,
    },
    /// Newdles created by the user.
    MyNewdles,
    /// Newdles the user is invited to.
    NewdlesParticipating,
    /// Free/busy lookup for one participant and day.
    BusyTimes {
        /// Day, `YYYY-MM-DD`.
        date: String,
        /// Participant email.
        email: String,
    },
    /// One participant of a newdle.
    Participant {
        /// Newdle code.
        code: String,
        /// Participant code.
        participant_code: String,
    },
    /// Sends the final date to all participants.
    SendResultEmails {
        /// Newdle code.
        code: String,
    },
    /// Notifies participants that a newdle was deleted.
    SendDeletionEmails {
        /// Newdle code.
        code: String,
    },
    /// Footer links of the web client.
    FooterLinks,
}

impl Endpoint {
    /// Returns the path relative to the server root.
    pub fn path(&self) -> String {
        match self {
            Self::Me => "api/me/".to_string(),
            Self::Users { q } => format!("api/users/?{}", query(&[("q", q)])),
            Self::CreateNewdle => "api/newdle/".to_string(),
            Self::Newdle { code } => format!("api/newdle/{code}"),
            Self::MyNewdles => "api/newdles/mine".to_string(),
            Self::NewdlesParticipating => "api/newdles/participating".to_string(),
            Self::BusyTimes { date, email } => {
                format!("api/busy/?{}", query(&[("date", date), ("email", email)]))
            }
            Self::Participant {
                code,
                participant_code,
            } => format!("api/newdle/{code}/participants/{participant_code}"),
            Self::SendResultEmails { code } => format!("api/newdle/{code}/send-result-emails"),
            Self::SendDeletionEmails { code } => {
                format!("api/newdle/{code}/send-deletion-emails")
            }
            Self::FooterLinks => "api/footer-links".to_string(),
        }
    }

    /// Creates a request descriptor for this endpoint.
    pub fn request(&self, method: Method) -> RequestDescriptor {
        RequestDescriptor::new(method, self.path())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn query(pairs: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Rejects codes that would escape their path segment.
pub fn check_code(code: &str) -> Result<&str, ClientError> {
    let valid = !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(code)
    } else {
        Err(ClientError::InvalidRequest(format!("invalid code: {code:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Endpoint::Me.path(), "api/me/");
        assert_eq!(
            Endpoint::Newdle { code: "dshjfk".into() }.path(),
            "api/newdle/dshjfk"
        );
        assert_eq!(
            Endpoint::Participant {
                code: "abc".into(),
                participant_code: "XyZ".into()
            }
            .path(),
            "api/newdle/abc/participants/XyZ"
        );
        assert_eq!(Endpoint::FooterLinks.to_string(), "api/footer-links");
    }

    #[test]
    fn test_query_encoding() {
        assert_eq!(
            Endpoint::Users { q: "ada l&x".into() }.path(),
            "api/users/?q=ada+l%26x"
        );
        assert_eq!(
            Endpoint::BusyTimes {
                date: "2026-10-18".into(),
                email: "a+b@example.com".into()
            }
            .path(),
            "api/busy/?date=2026-10-18&email=a%2Bb%40example.com"
        );
    }

    #[test]
    fn test_check_code() {
        assert!(check_code("Ab3-x_9").is_ok());
        assert!(check_code("").is_err());
        assert!(check_code("../me").is_err());
        assert!(check_code("a?b").is_err());
    }
}
