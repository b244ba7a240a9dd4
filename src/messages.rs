use crate::models::{Group, Settings};
use serde::{Deserialize, Serialize};

/// Inbound messages from the command layer to the content side.
///
/// Serialized with an `action` tag and camelCase keys, e.g.
/// `{"action":"applyGroup","group":{...},"settings":{"disableOthers":true}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Check the group's calendars (and uncheck others if configured)
    ApplyGroup { group: Group, settings: Settings },
    /// Labels of the checked, currently rendered calendars
    GetCurrentlySelected,
}

/// Acknowledgement payloads. Errors are plain strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Ack {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Selected {
        calendars: Vec<String>,
    },
}

impl Response {
    pub fn ok() -> Self {
        Self::Ack {
            success: true,
            error: None,
        }
    }

    pub fn failed<S: Into<String>>(error: S) -> Self {
        Self::Ack {
            success: false,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Self::Ack { success, .. } => *success,
            Self::Selected { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request: Request = serde_json::from_str(r#"{"action":"getCurrentlySelected"}"#).unwrap();
        assert_eq!(request, Request::GetCurrentlySelected);

        let json = r#"{
            "action": "applyGroup",
            "group": {
                "id": "g1",
                "name": "Work",
                "calendars": ["Team"],
                "createdAt": "2024-05-01T09:00:00Z",
                "updatedAt": "2024-05-01T09:00:00Z"
            },
            "settings": {}
        }"#;
        match serde_json::from_str::<Request>(json).unwrap() {
            Request::ApplyGroup { group, settings } => {
                assert_eq!(group.calendars, vec!["Team".to_string()]);
                assert!(settings.disable_others);
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_response_wire_format() {
        assert_eq!(serde_json::to_string(&Response::ok()).unwrap(), r#"{"success":true}"#);
        assert_eq!(
            serde_json::to_string(&Response::failed("boom")).unwrap(),
            r#"{"success":false,"error":"boom"}"#
        );
        let selected: Response = serde_json::from_str(r#"{"calendars":["A"]}"#).unwrap();
        assert_eq!(
            selected,
            Response::Selected {
                calendars: vec!["A".to_string()]
            }
        );
    }
}
