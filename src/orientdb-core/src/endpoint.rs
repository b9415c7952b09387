use serde::Serialize;
use std::fmt;

use crate::models::{normalize_record_id, DatabasePath, Operation};

/// Limit inserted in front of a fetch plan when the caller gave none
pub const DEFAULT_FETCH_LIMIT: &str = "20";

/// HTTP method used by an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// Endpoint is one REST resource exposed by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// GET /connect/{db}
    Connect,
    /// GET /query/{db}/sql/{sql}[/{limit}][/{fetch_plan}]
    Query {
        sql: &'a str,
        limit: Option<&'a str>,
        fetch_plan: Option<&'a str>,
    },
    /// GET /document/{db}/{rid}[/{fetch_plan}]
    Document {
        rid: &'a str,
        fetch_plan: Option<&'a str>,
    },
    /// GET /class/{db}/{name}
    ClassInfo { name: &'a str },
    /// POST /class/{db}/{name}
    CreateClass { name: &'a str },
    /// GET /cluster/{db}/{name}
    Cluster { name: &'a str },
    /// POST /command/{db}/sql/{sql}/
    Command { sql: &'a str },
    /// GET /server
    Server,
    /// GET /disconnect
    Disconnect,
}

impl<'a> Endpoint<'a> {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::CreateClass { .. } | Endpoint::Command { .. } => Method::Post,
            _ => Method::Get,
        }
    }

    /// Family the endpoint's failures are reported under
    pub fn operation(&self) -> Operation {
        match self {
            Endpoint::Connect => Operation::Connect,
            Endpoint::Query { .. } | Endpoint::Document { .. } => Operation::Query,
            _ => Operation::Command,
        }
    }

    /// Whether a successful body may be parsed. Class creation and commands
    /// always keep the body verbatim.
    pub fn parses_response(&self) -> bool {
        !matches!(
            self,
            Endpoint::CreateClass { .. } | Endpoint::Command { .. }
        )
    }

    /// Request path relative to the server URL
    pub fn path(&self, database: &str) -> String {
        match self {
            Endpoint::Connect => format!("/connect/{}", database),
            Endpoint::Query {
                sql,
                limit,
                fetch_plan,
            } => format!(
                "/query/{}/sql/{}{}",
                database,
                urlencoding::encode(sql),
                query_suffix(*limit, *fetch_plan)
            ),
            Endpoint::Document { rid, fetch_plan } => {
                let rid = normalize_record_id(rid);
                match non_empty(*fetch_plan) {
                    Some(plan) => format!("/document/{}/{}/{}", database, rid, plan),
                    None => format!("/document/{}/{}", database, rid),
                }
            }
            Endpoint::ClassInfo { name } | Endpoint::CreateClass { name } => {
                format!("/class/{}/{}", database, name)
            }
            Endpoint::Cluster { name } => format!("/cluster/{}/{}", database, name),
            Endpoint::Command { sql } => {
                format!("/command/{}/sql/{}/", database, urlencoding::encode(sql))
            }
            Endpoint::Server => "/server".to_string(),
            Endpoint::Disconnect => "/disconnect".to_string(),
        }
    }

    /// Absolute request URL for the given database
    pub fn url(&self, path: &DatabasePath) -> String {
        format!("{}{}", path.server_url, self.path(&path.database))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Limit and fetch plan segments of a query path. A fetch plan is never
/// emitted without a limit in front of it.
pub fn query_suffix(limit: Option<&str>, fetch_plan: Option<&str>) -> String {
    match (non_empty(limit), non_empty(fetch_plan)) {
        (None, None) => String::new(),
        (Some(limit), None) => format!("/{}", limit),
        (None, Some(plan)) => format!("/{}/{}", DEFAULT_FETCH_LIMIT, plan),
        (Some(limit), Some(plan)) => format!("/{}/{}", limit, plan),
    }
}
