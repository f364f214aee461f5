//! Request line parsing

use serde_json::Value;

use crate::error::ProtocolError;
use crate::protocol::commands::{ACTIONS, Request};

/// Parses one request line. Unknown actions fail `UnsupportedOperation`.
pub fn parse_request(raw: &str) -> Result<Request, ProtocolError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::MalformedRequest("empty request".into()));
    }

    let value: Value = serde_json::from_str(trimmed)?;
    let action = value
        .get("action")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingField("action"))?;

    if !ACTIONS.contains(&action) {
        return Err(ProtocolError::UnsupportedOperation(action.to_string()));
    }

    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::commands::TransferRequest;

    #[test]
    fn test_parse_basic_requests() {
        assert_eq!(
            parse_request(r#"{"action":"list"}"#).unwrap(),
            Request::List { path: String::new() }
        );
        assert_eq!(
            parse_request(r#"{"action":"system_info"}"#).unwrap(),
            Request::SystemInfo
        );
    }

    #[test]
    fn test_parse_requests_with_args() {
        assert_eq!(
            parse_request(r#"{"action":"move","source_path":"a","source_name":"f","target_path":"b"}"#)
                .unwrap(),
            Request::Move(TransferRequest {
                source_path: "a".into(),
                source_name: "f".into(),
                target_path: "b".into(),
            })
        );
        assert_eq!(
            parse_request("  {\"action\":\"upload\",\"filename\":\"x.bin\",\"size\":3}\r\n").unwrap(),
            Request::Upload {
                path: String::new(),
                filename: "x.bin".into(),
                size: 3,
            }
        );
    }

    #[test]
    fn test_parse_operation_request() {
        match parse_request(r#"{"action":"operation","operation":"delete","path":"d","name":"x"}"#)
            .unwrap()
        {
            Request::Operation(op) => {
                assert_eq!(op.operation, "delete");
                assert_eq!(op.name, "x");
                assert_eq!(op.old_name, "");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_operation_without_kind_is_unsupported() {
        let request = parse_request(r#"{"action":"operation","path":"d","name":"x"}"#).unwrap();
        match request {
            Request::Operation(op) => match op.into_operation() {
                Err(ProtocolError::UnsupportedOperation(kind)) => assert_eq!(kind, ""),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_request(""), Err(ProtocolError::MalformedRequest(_))));
        assert!(matches!(parse_request("LIST"), Err(ProtocolError::MalformedRequest(_))));
        assert!(matches!(
            parse_request(r#"{"path":""}"#),
            Err(ProtocolError::MissingField("action"))
        ));
        assert!(matches!(
            parse_request(r#"{"action":"format_disk"}"#),
            Err(ProtocolError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            parse_request(r#"{"action":"download"}"#),
            Err(ProtocolError::MalformedRequest(_))
        ));
    }
}
