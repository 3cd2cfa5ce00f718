use clap::{Args, Subcommand};
use keel_schema::FieldType;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// List configured tools.
    Tools,
    /// Show the top-level fields of a tool's settings.
    Fields(ToolArgs),
    /// Show schema properties not yet present in a tool's settings.
    Options(ToolArgs),
    /// Edit a tool's settings and save after confirming the diff.
    Edit(EditArgs),
    /// Print the JSON Schema of Keel's own configuration file.
    ConfigSchema,
}

#[derive(Clone, Debug, Args)]
pub struct ToolArgs {
    /// Tool name as configured under `[tools.<name>]`.
    pub tool: String,
}

#[derive(Clone, Debug, Args)]
pub struct EditArgs {
    /// Tool name as configured under `[tools.<name>]`.
    pub tool: String,

    /// Set a value: `PATH=VALUE`, e.g. `servers[0].host=example.com`.
    /// JSON-looking values are parsed as JSON.
    #[arg(long = "set", value_name = "PATH=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Add a top-level key with its default value: `KEY` or `KEY:TYPE`.
    #[arg(long = "add", value_name = "KEY[:TYPE]", value_parser = parse_new_key)]
    pub add: Vec<(String, Option<FieldType>)>,

    /// Remove a top-level key.
    #[arg(long = "delete", value_name = "KEY")]
    pub delete: Vec<String>,

    /// New auth token; an empty value clears it.
    #[arg(long)]
    pub token: Option<String>,

    /// Set an environment field: `FIELD=VALUE`.
    #[arg(long = "env", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub env: Vec<(String, String)>,

    /// Set a free-form entry: `KEY=TEXT`.
    #[arg(long = "extra", value_name = "KEY=TEXT", value_parser = parse_assignment)]
    pub extra: Vec<(String, String)>,

    /// Remove a free-form entry.
    #[arg(long = "remove-extra", value_name = "KEY")]
    pub remove_extra: Vec<String>,

    /// Save without asking for confirmation.
    #[arg(short, long)]
    pub yes: bool,

    /// Show the diff and stop.
    #[arg(long, conflicts_with = "yes")]
    pub dry_run: bool,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_new_key(raw: &str) -> Result<(String, Option<FieldType>), String> {
    match raw.rsplit_once(':') {
        Some((key, ty)) => {
            let field_type = ty.trim().parse::<FieldType>().map_err(|e| e.to_string())?;
            Ok((key.trim().to_string(), Some(field_type)))
        }
        None => Ok((raw.trim().to_string(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn assignments_split_on_first_equals() {
        assert_eq!(
            parse_assignment("url=http://x?a=b").unwrap(),
            ("url".to_string(), "http://x?a=b".to_string())
        );
        assert_eq!(parse_assignment("k=").unwrap(), ("k".to_string(), String::new()));
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=v").is_err());
    }

    #[test]
    fn new_keys_accept_an_optional_type() {
        assert_eq!(parse_new_key("retry").unwrap(), ("retry".to_string(), None));
        assert_eq!(
            parse_new_key("tags:array").unwrap(),
            ("tags".to_string(), Some(FieldType::Array))
        );
        assert!(parse_new_key("tags:list").is_err());
    }
}
