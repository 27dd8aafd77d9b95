//! Issue event payloads.

use serde::de::Error as _;
use serde::Deserialize;

use super::IssueRef;

/// Header naming the event type of a delivery.
pub const EVENT_HEADER: &str = "x-github-event";

const ISSUES_EVENT: &str = "issues";
const OPENED_ACTION: &str = "opened";

#[derive(Debug, Deserialize)]
struct IssuesPayload {
    action: String,
    issue: Option<IssuePayload>,
    repository: Option<RepositoryPayload>,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    number: u64,
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    name: String,
    owner: UserPayload,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: String,
}

/// A newly opened issue and who opened it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedIssue {
    pub issue: IssueRef,
    pub author: String,
}

/// What a delivery asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueEvent {
    Opened(OpenedIssue),
    /// Any other event or action; acknowledged and ignored.
    Other {
        event: String,
        action: Option<String>,
    },
}

/// Classify a delivery by its event header, parsing the body only for
/// `issues` events.
pub fn parse_delivery(event: Option<&str>, body: &[u8]) -> Result<IssueEvent, serde_json::Error> {
    let event = event.unwrap_or_default();
    if event != ISSUES_EVENT {
        return Ok(IssueEvent::Other {
            event: event.to_string(),
            action: None,
        });
    }

    let payload: IssuesPayload = serde_json::from_slice(body)?;
    if payload.action != OPENED_ACTION {
        return Ok(IssueEvent::Other {
            event: event.to_string(),
            action: Some(payload.action),
        });
    }

    let issue = payload
        .issue
        .ok_or_else(|| serde_json::Error::missing_field("issue"))?;
    let repository = payload
        .repository
        .ok_or_else(|| serde_json::Error::missing_field("repository"))?;

    Ok(IssueEvent::Opened(OpenedIssue {
        issue: IssueRef {
            owner: repository.owner.login,
            repo: repository.name,
            number: issue.number,
        },
        author: issue.user.login,
    }))
}

/// Comment posted on every newly opened issue.
pub fn greeting_comment(author: &str) -> String {
    format!("Thanks for the issue report @{author}! We will look into it as soon as possible.")
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPENED: &str = r#"{
        "action": "opened",
        "issue": { "number": 1347, "title": "Found a bug", "user": { "login": "monalisa" } },
        "repository": { "name": "Hello-World", "owner": { "login": "octocat" } },
        "sender": { "login": "monalisa" }
    }"#;

    #[test]
    fn test_parse_opened_issue() {
        let event = parse_delivery(Some("issues"), OPENED.as_bytes()).unwrap();

        assert_eq!(
            event,
            IssueEvent::Opened(OpenedIssue {
                issue: IssueRef {
                    owner: "octocat".to_string(),
                    repo: "Hello-World".to_string(),
                    number: 1347,
                },
                author: "monalisa".to_string(),
            })
        );
    }

    #[test]
    fn test_other_actions_are_ignored() {
        let closed = OPENED.replace("\"opened\"", "\"closed\"");
        let event = parse_delivery(Some("issues"), closed.as_bytes()).unwrap();

        assert_eq!(
            event,
            IssueEvent::Other {
                event: "issues".to_string(),
                action: Some("closed".to_string()),
            }
        );
    }

    #[test]
    fn test_other_events_skip_body_parsing() {
        let event = parse_delivery(Some("ping"), b"not json").unwrap();
        assert!(matches!(event, IssueEvent::Other { action: None, .. }));

        let event = parse_delivery(None, b"").unwrap();
        assert!(matches!(event, IssueEvent::Other { action: None, .. }));
    }

    #[test]
    fn test_non_opened_action_without_issue() {
        let event = parse_delivery(Some("issues"), br#"{"action":"deleted"}"#).unwrap();
        assert!(matches!(event, IssueEvent::Other { action: Some(_), .. }));
    }

    #[test]
    fn test_malformed_issue_payload() {
        assert!(parse_delivery(Some("issues"), b"{\"action\":\"opened\"}").is_err());
        assert!(parse_delivery(Some("issues"), b"not json").is_err());
    }

    #[test]
    fn test_greeting_comment() {
        assert_eq!(
            greeting_comment("monalisa"),
            "Thanks for the issue report @monalisa! We will look into it as soon as possible."
        );
    }
}
