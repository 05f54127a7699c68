use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use scalarql_graphql::Request;
use serde_json::{Map, Value};

/// Query run when neither `--query` nor `--query-file` is given.
pub const DEFAULT_QUERY: &str = r#"
    query {
        customers {
            id
        }
    }
"#;

#[derive(Parser, Debug)]
#[command(name = "scalarql")]
#[command(about = "Run GraphQL queries against the CustomScalarType customers schema")]
#[command(version)]
pub struct Cli {
    /// Query document text
    #[arg(short, long, conflicts_with = "query_file")]
    pub query: Option<String>,

    /// Read the query document from a file
    #[arg(long, value_name = "PATH")]
    pub query_file: Option<PathBuf>,

    /// Variables as a JSON object, e.g. '{"id": "5b42ba57289"}'
    #[arg(long, value_name = "JSON")]
    pub variables: Option<String>,

    /// Operation to run when the document has several
    #[arg(short, long)]
    pub operation_name: Option<String>,

    /// Configuration file (defaults to scalarql.toml when present)
    #[arg(short, long, env = "SCALARQL_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level, overrides the configuration file
    #[arg(long, env = "SCALARQL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Pretty-print the JSON response
    #[arg(long)]
    pub pretty: bool,

    /// Print the schema in SDL and exit
    #[arg(long)]
    pub sdl: bool,
}

impl Cli {
    /// Assembles the GraphQL request from the arguments.
    pub fn request(&self) -> Result<Request> {
        let query = match (&self.query, &self.query_file) {
            (Some(query), _) => query.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read query file {}", path.display()))?,
            (None, None) => DEFAULT_QUERY.to_string(),
        };

        let mut request = Request::new(query);
        if let Some(raw) = &self.variables {
            let variables: Map<String, Value> =
                serde_json::from_str(raw).context("--variables must be a JSON object")?;
            request = request.variables(variables);
        }
        if let Some(name) = &self.operation_name {
            request = request.operation_name(name.clone());
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_query() {
        let cli = Cli::parse_from(["scalarql"]);
        let request = cli.request().unwrap();
        assert_eq!(request.query, DEFAULT_QUERY);
        assert!(request.variables.is_empty());
    }

    #[test]
    fn test_query_with_variables() {
        let cli = Cli::parse_from([
            "scalarql",
            "--query",
            "query ($id: CustomScalarType) { customers(id: $id) { id } }",
            "--variables",
            r#"{"id": "5b42ba57289"}"#,
            "-o",
            "Customers",
        ]);
        let request = cli.request().unwrap();
        assert_eq!(request.variables["id"], json!("5b42ba57289"));
        assert_eq!(request.operation_name.as_deref(), Some("Customers"));
    }

    #[test]
    fn test_variables_must_be_object() {
        let cli = Cli::parse_from(["scalarql", "--variables", "[1]"]);
        let err = cli.request().unwrap_err();
        assert!(format!("{err:#}").contains("--variables must be a JSON object"));
    }

    #[test]
    fn test_query_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"{ customers { id } }").unwrap();
        let cli = Cli::parse_from([
            OsStr::new("scalarql"),
            OsStr::new("--query-file"),
            file.path().as_os_str(),
        ]);
        assert_eq!(cli.request().unwrap().query, "{ customers { id } }");
    }

    #[test]
    fn test_query_and_file_conflict() {
        let result = Cli::try_parse_from(["scalarql", "-q", "{ x }", "--query-file", "q.graphql"]);
        assert!(result.is_err());
    }
}
