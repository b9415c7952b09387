use anyhow::{bail, Result};
use orientdb_core::config::ConsoleConfig;
use orientdb_rs::{DatabaseClient, ResponseBody};

pub const HELP: &str = "\
Commands:
  connect [user password]     open the database
  query <sql>                 run a query (lines starting with 'select' also work)
  load <rid> [fetchplan]      load a record, e.g. load #5:0
  class <name>                show class information
  create-class <name>         create a class
  cluster <name>              browse a cluster
  command <sql>               execute a SQL command
  server                      show server information
  schema | roles | users      read from the session descriptor
  limit <n|->                 set or clear the query limit
  fetchplan <plan|->          set or clear the query fetch plan
  raw on|off                  keep responses as raw text
  status                      show connection state
  disconnect                  close the database
  help                        show this text
  quit                        leave the console";

/// One parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Connect {
        credentials: Option<(String, String)>,
    },
    Query(String),
    Load {
        rid: String,
        fetch_plan: Option<String>,
    },
    ClassInfo(String),
    CreateClass(String),
    Cluster(String),
    Command(String),
    Server,
    Schema,
    Roles,
    Users,
    Limit(Option<String>),
    FetchPlan(Option<String>),
    Raw(bool),
    Status,
    Disconnect,
    Help,
    Quit,
}

impl ConsoleCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ConsoleCommand::Connect { .. } => "connect",
            ConsoleCommand::Query(_) => "query",
            ConsoleCommand::Load { .. } => "load",
            ConsoleCommand::ClassInfo(_) => "class",
            ConsoleCommand::CreateClass(_) => "create-class",
            ConsoleCommand::Cluster(_) => "cluster",
            ConsoleCommand::Command(_) => "command",
            ConsoleCommand::Server => "server",
            ConsoleCommand::Schema => "schema",
            ConsoleCommand::Roles => "roles",
            ConsoleCommand::Users => "users",
            ConsoleCommand::Limit(_) => "limit",
            ConsoleCommand::FetchPlan(_) => "fetchplan",
            ConsoleCommand::Raw(_) => "raw",
            ConsoleCommand::Status => "status",
            ConsoleCommand::Disconnect => "disconnect",
            ConsoleCommand::Help => "help",
            ConsoleCommand::Quit => "quit",
        }
    }
}

/// Parse a console line. Blank lines and `--` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("--") {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "connect" => {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            match parts.as_slice() {
                [] => ConsoleCommand::Connect { credentials: None },
                [user, password] => ConsoleCommand::Connect {
                    credentials: Some((user.to_string(), password.to_string())),
                },
                _ => bail!("usage: connect [user password]"),
            }
        }
        "query" => ConsoleCommand::Query(required(rest, "query <sql>")?),
        "select" => ConsoleCommand::Query(line.to_string()),
        "load" => {
            let mut parts = rest.split_whitespace();
            let Some(rid) = parts.next() else {
                bail!("usage: load <rid> [fetchplan]");
            };
            let fetch_plan = parts.next().map(str::to_string);
            if parts.next().is_some() {
                bail!("usage: load <rid> [fetchplan]");
            }
            ConsoleCommand::Load {
                rid: rid.to_string(),
                fetch_plan,
            }
        }
        "class" => ConsoleCommand::ClassInfo(single(rest, "class <name>")?),
        "create-class" => ConsoleCommand::CreateClass(single(rest, "create-class <name>")?),
        "cluster" => ConsoleCommand::Cluster(single(rest, "cluster <name>")?),
        "command" => ConsoleCommand::Command(required(rest, "command <sql>")?),
        "server" => ConsoleCommand::Server,
        "schema" => ConsoleCommand::Schema,
        "roles" => ConsoleCommand::Roles,
        "users" => ConsoleCommand::Users,
        "limit" => ConsoleCommand::Limit(setting(rest, "limit <n|->")?),
        "fetchplan" => ConsoleCommand::FetchPlan(setting(rest, "fetchplan <plan|->")?),
        "raw" => match rest {
            "on" => ConsoleCommand::Raw(true),
            "off" => ConsoleCommand::Raw(false),
            _ => bail!("usage: raw on|off"),
        },
        "status" => ConsoleCommand::Status,
        "disconnect" => ConsoleCommand::Disconnect,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => bail!("unknown command '{}', type 'help'", other),
    };

    Ok(Some(command))
}

fn required(rest: &str, usage: &str) -> Result<String> {
    if rest.is_empty() {
        bail!("usage: {}", usage);
    }
    Ok(rest.to_string())
}

fn single(rest: &str, usage: &str) -> Result<String> {
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        bail!("usage: {}", usage);
    }
    Ok(rest.to_string())
}

/// `-` clears a setting
fn setting(rest: &str, usage: &str) -> Result<Option<String>> {
    match single(rest, usage)?.as_str() {
        "-" => Ok(None),
        value => Ok(Some(value.to_string())),
    }
}

/// Interactive session state around a client
pub struct Console {
    client: DatabaseClient,
    limit: Option<String>,
    fetch_plan: Option<String>,
}

impl Console {
    pub fn new(client: DatabaseClient, config: &ConsoleConfig) -> Self {
        Self {
            client,
            limit: config.default_limit.clone(),
            fetch_plan: config.default_fetch_plan.clone(),
        }
    }

    pub fn client(&self) -> &DatabaseClient {
        &self.client
    }

    /// Run one command and return the text to print
    pub async fn execute(&mut self, command: ConsoleCommand) -> String {
        tracing::debug!(command = command.name(), "Executing console command");

        let outcome = match command {
            ConsoleCommand::Connect { credentials } => match credentials {
                Some((user, password)) => self.client.open_with_credentials(&user, &password).await,
                None => self.client.open().await,
            }
            .map(|_| format!("Connected to {}", self.client.database_name())),
            ConsoleCommand::Query(sql) => {
                let limit = self.limit.as_deref();
                let fetch_plan = self.fetch_plan.as_deref();
                self.client
                    .query_with(&sql, limit, fetch_plan)
                    .await
                    .map(|body| body.to_pretty_string())
            }
            ConsoleCommand::Load { rid, fetch_plan } => match fetch_plan {
                Some(plan) => self.client.load_with_fetch_plan(&rid, &plan).await,
                None => self.client.load(&rid).await,
            }
            .map(|body| body.to_pretty_string()),
            ConsoleCommand::ClassInfo(name) => self.client.class_info(&name).await.map(render),
            ConsoleCommand::CreateClass(name) => {
                self.client.create_class(&name).await.map(render)
            }
            ConsoleCommand::Cluster(name) => self.client.browse_cluster(&name).await.map(render),
            ConsoleCommand::Command(sql) => self.client.execute_command(&sql).await.map(render),
            ConsoleCommand::Server => self.client.server_info().await.map(render),
            ConsoleCommand::Schema => self.client.schema().map(render_value),
            ConsoleCommand::Roles => self.client.security_roles().map(render_value),
            ConsoleCommand::Users => self.client.security_users().map(render_value),
            ConsoleCommand::Limit(limit) => {
                self.limit = limit;
                Ok(format!("limit = {}", self.limit.as_deref().unwrap_or("-")))
            }
            ConsoleCommand::FetchPlan(plan) => {
                self.fetch_plan = plan;
                Ok(format!(
                    "fetchplan = {}",
                    self.fetch_plan.as_deref().unwrap_or("-")
                ))
            }
            ConsoleCommand::Raw(raw) => {
                self.client.set_structured_responses(!raw);
                Ok(format!("raw responses {}", if raw { "on" } else { "off" }))
            }
            ConsoleCommand::Status => Ok(self.status()),
            ConsoleCommand::Disconnect => self
                .client
                .close()
                .await
                .map(|_| "Disconnected".to_string()),
            ConsoleCommand::Help => Ok(HELP.to_string()),
            ConsoleCommand::Quit => Ok(String::new()),
        };

        match outcome {
            Ok(output) => output,
            Err(e) => format!("!! {}", e),
        }
    }

    fn status(&self) -> String {
        format!(
            "server: {}\ndatabase: {}\nopen: {}\nlimit: {}\nfetchplan: {}\nlast error: {}",
            self.client.server_base_url(),
            self.client.database_name(),
            self.client.is_open(),
            self.limit.as_deref().unwrap_or("-"),
            self.fetch_plan.as_deref().unwrap_or("-"),
            self.client.last_error_message().unwrap_or("-"),
        )
    }
}

fn render(body: ResponseBody) -> String {
    body.to_pretty_string()
}

fn render_value(value: Option<serde_json::Value>) -> String {
    match value {
        Some(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
        None => "(none)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orientdb_rs::{Request, Transport, TransportFailure};
    use std::sync::{Arc, Mutex};

    /// Answers every request with an empty session descriptor
    #[derive(Default)]
    struct EchoTransport {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Transport for EchoTransport {
        async fn send(&self, request: Request) -> std::result::Result<String, TransportFailure> {
            self.urls.lock().unwrap().push(request.url);
            Ok(r#"{"classes": [], "roles": [], "users": []}"#.to_string())
        }
    }

    fn parse(line: &str) -> ConsoleCommand {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn test_parse_connect() {
        assert_eq!(parse("connect"), ConsoleCommand::Connect { credentials: None });
        assert_eq!(
            parse("connect admin secret"),
            ConsoleCommand::Connect {
                credentials: Some(("admin".to_string(), "secret".to_string()))
            }
        );
        assert!(parse_command("connect admin").is_err());
    }

    #[test]
    fn test_parse_query_keeps_sql_text() {
        assert_eq!(
            parse("query select from OUser where name = 'admin'"),
            ConsoleCommand::Query("select from OUser where name = 'admin'".to_string())
        );
        assert_eq!(
            parse("SELECT from V"),
            ConsoleCommand::Query("SELECT from V".to_string())
        );
        assert!(parse_command("query").is_err());
    }

    #[test]
    fn test_parse_load() {
        assert_eq!(
            parse("load #5:0"),
            ConsoleCommand::Load {
                rid: "#5:0".to_string(),
                fetch_plan: None
            }
        );
        assert_eq!(
            parse("load 5:0 *:-1"),
            ConsoleCommand::Load {
                rid: "5:0".to_string(),
                fetch_plan: Some("*:-1".to_string())
            }
        );
        assert!(parse_command("load").is_err());
        assert!(parse_command("load 5:0 a b").is_err());
    }

    #[test]
    fn test_parse_settings() {
        assert_eq!(parse("limit 10"), ConsoleCommand::Limit(Some("10".to_string())));
        assert_eq!(parse("limit -"), ConsoleCommand::Limit(None));
        assert_eq!(parse("fetchplan -"), ConsoleCommand::FetchPlan(None));
        assert_eq!(parse("raw on"), ConsoleCommand::Raw(true));
        assert!(parse_command("raw maybe").is_err());
    }

    #[test]
    fn test_parse_blank_comment_and_unknown() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(parse_command("-- note").unwrap(), None);
        assert!(parse_command("frobnicate").is_err());
        assert!(parse_command("class two words").is_err());
    }

    #[tokio::test]
    async fn test_console_applies_limit_and_fetch_plan() {
        let transport = Arc::new(EchoTransport::default());
        let client =
            DatabaseClient::with_transport("http://localhost:2480/demo", transport.clone());
        let config = ConsoleConfig {
            default_limit: None,
            default_fetch_plan: Some("*:1".to_string()),
        };
        let mut console = Console::new(client, &config);

        console.execute(parse("query select")).await;
        console.execute(parse("limit 3")).await;
        console.execute(parse("query select")).await;

        let urls = transport.urls.lock().unwrap().clone();
        assert_eq!(
            urls,
            vec![
                "http://localhost:2480/connect/demo",
                "http://localhost:2480/query/demo/sql/select/20/*:1",
                "http://localhost:2480/query/demo/sql/select/3/*:1",
            ]
        );
        assert!(console.client().is_open());
    }

    #[tokio::test]
    async fn test_console_reports_closed_database() {
        let transport = Arc::new(EchoTransport::default());
        let client = DatabaseClient::with_transport("http://localhost:2480/demo", transport);
        let mut console = Console::new(client, &ConsoleConfig::default());

        let output = console.execute(ConsoleCommand::Schema).await;

        assert_eq!(output, "!! Database is closed");
    }
}
