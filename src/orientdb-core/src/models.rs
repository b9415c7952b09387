use serde::{Deserialize, Serialize};
use std::fmt;

/// DatabasePath is a database address split into server URL and database name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabasePath {
    pub server_url: String,
    pub database: String,
}

impl DatabasePath {
    /// Split `path` at its last `/`. A path without any `/` is taken as a bare
    /// database name with an empty server URL.
    pub fn parse(path: &str) -> Self {
        match path.rsplit_once('/') {
            Some((server_url, database)) => Self {
                server_url: server_url.to_string(),
                database: database.to_string(),
            },
            None => Self {
                server_url: String::new(),
                database: path.to_string(),
            },
        }
    }
}

impl fmt::Display for DatabasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.server_url, self.database)
    }
}

/// Strip a single leading `#` from a record id (`#10:0` -> `10:0`)
pub fn normalize_record_id(rid: &str) -> &str {
    rid.strip_prefix('#').unwrap_or(rid)
}

/// Operation names the request family a failure is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Connect,
    Query,
    Command,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Connect => "Connect",
            Operation::Query => "Query",
            Operation::Command => "Command",
        };
        f.write_str(name)
    }
}

/// ResponseBody is a successful server response, either parsed or kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Structured(serde_json::Value),
    Raw(String),
}

impl ResponseBody {
    /// Parse `body` as JSON when `structured` is set, otherwise keep it as text
    pub fn from_body(body: &str, structured: bool) -> Result<Self, serde_json::Error> {
        if structured {
            Ok(ResponseBody::Structured(serde_json::from_str(body)?))
        } else {
            Ok(ResponseBody::Raw(body.to_string()))
        }
    }

    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Structured(value) => Some(value),
            ResponseBody::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            ResponseBody::Raw(text) => Some(text),
            ResponseBody::Structured(_) => None,
        }
    }

    /// Look up a top-level field, parsing raw text first if needed
    pub fn field(&self, key: &str) -> Result<Option<serde_json::Value>, serde_json::Error> {
        match self {
            ResponseBody::Structured(value) => Ok(value.get(key).cloned()),
            ResponseBody::Raw(text) => {
                let value: serde_json::Value = serde_json::from_str(text)?;
                Ok(value.get(key).cloned())
            }
        }
    }

    /// Render for display: pretty JSON for structured bodies, text as-is
    pub fn to_pretty_string(&self) -> String {
        match self {
            ResponseBody::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ResponseBody::Raw(text) => text.clone(),
        }
    }
}

/// SessionField selects one of the collections in a session descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionField {
    Classes,
    Roles,
    Users,
}

impl SessionField {
    pub fn key(&self) -> &'static str {
        match self {
            SessionField::Classes => "classes",
            SessionField::Roles => "roles",
            SessionField::Users => "users",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_database_path_splits_at_last_slash() {
        let path = DatabasePath::parse("http://localhost:2480/demo");
        assert_eq!(path.server_url, "http://localhost:2480");
        assert_eq!(path.database, "demo");
        assert_eq!(path.to_string(), "http://localhost:2480/demo");
    }

    #[test]
    fn test_database_path_without_slash() {
        let path = DatabasePath::parse("demo");
        assert_eq!(path.server_url, "");
        assert_eq!(path.database, "demo");
    }

    #[test]
    fn test_database_path_trailing_slash_gives_empty_name() {
        let path = DatabasePath::parse("http://localhost:2480/");
        assert_eq!(path.server_url, "http://localhost:2480");
        assert_eq!(path.database, "");
    }

    #[test]
    fn test_normalize_record_id() {
        assert_eq!(normalize_record_id("#10:0"), "10:0");
        assert_eq!(normalize_record_id("10:0"), "10:0");
        // Only one '#' is stripped
        assert_eq!(normalize_record_id("##5:1"), "#5:1");
    }

    #[test]
    fn test_response_body_structured_and_raw() {
        let parsed = ResponseBody::from_body(r#"{"a": 1}"#, true).unwrap();
        assert_eq!(parsed.as_structured(), Some(&json!({"a": 1})));

        let raw = ResponseBody::from_body(r#"{"a": 1}"#, false).unwrap();
        assert_eq!(raw.as_raw(), Some(r#"{"a": 1}"#));

        assert!(ResponseBody::from_body("not json", true).is_err());
    }

    #[test]
    fn test_field_lookup_parses_raw_text() {
        let raw = ResponseBody::Raw(r#"{"roles": ["admin"]}"#.to_string());
        assert_eq!(raw.field("roles").unwrap(), Some(json!(["admin"])));
        assert_eq!(raw.field("users").unwrap(), None);

        let garbage = ResponseBody::Raw("<html>".to_string());
        assert!(garbage.field("roles").is_err());
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Connect.to_string(), "Connect");
        assert_eq!(Operation::Query.to_string(), "Query");
        assert_eq!(Operation::Command.to_string(), "Command");
    }
}
