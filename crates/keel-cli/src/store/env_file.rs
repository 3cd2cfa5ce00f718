use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use async_trait::async_trait;
use keel_draft::{AdapterError, DocumentIo};

use super::{read_optional, write_creating_dirs};

/// Dotenv file where only a declared set of variables is managed.
///
/// Writing rewrites the managed variables in place, drops emptied ones, and
/// keeps every other line (comments, unrelated variables) untouched.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    fields: Vec<String>,
}

impl EnvFile {
    pub const fn new(path: PathBuf, fields: Vec<String>) -> Self {
        Self { path, fields }
    }

    fn render(&self, existing: &str, values: &BTreeMap<String, String>) -> String {
        let mut written = BTreeSet::new();
        let mut lines = Vec::new();
        for line in existing.lines() {
            match line_key(line).filter(|key| self.fields.iter().any(|field| field == key)) {
                Some(key) => {
                    if let Some(value) = values.get(key).filter(|value| !value.is_empty()) {
                        if written.insert(key.to_string()) {
                            lines.push(format!("{key}={}", quote(value)));
                        }
                    }
                }
                None => lines.push(line.to_string()),
            }
        }
        for field in &self.fields {
            if let Some(value) = values.get(field).filter(|value| !value.is_empty()) {
                if !written.contains(field) {
                    lines.push(format!("{field}={}", quote(value)));
                }
            }
        }
        let mut text = lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

/// Variable name assigned on a dotenv line, if any.
fn line_key(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, _) = line.split_once('=')?;
    let key = key.trim();
    (!key.is_empty()).then_some(key)
}

fn quote(value: &str) -> String {
    let plain = value.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '@' | '+' | ',')
    });
    if plain {
        value.to_string()
    } else {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('$', "\\$")
            .replace('\n', "\\n");
        format!("\"{escaped}\"")
    }
}

#[async_trait]
impl DocumentIo<BTreeMap<String, String>> for EnvFile {
    async fn read(&self) -> Result<BTreeMap<String, String>, AdapterError> {
        let Some(text) = read_optional(&self.path).await? else {
            return Ok(BTreeMap::new());
        };
        dotenvy::from_read_iter(text.as_bytes())
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map_err(|e| AdapterError::Rejected(format!("parse {}: {e}", self.path.display())))
    }

    async fn write(&self, value: &BTreeMap<String, String>) -> Result<(), AdapterError> {
        let existing = read_optional(&self.path).await?.unwrap_or_default();
        write_creating_dirs(&self.path, &self.render(&existing, value)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn env_file(path: PathBuf) -> EnvFile {
        EnvFile::new(path, vec!["API_KEY".into(), "BASE_URL".into(), "MODEL".into()])
    }

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn unrelated_lines_survive_a_rewrite() {
        let file = env_file(PathBuf::from(".env"));
        let existing = "# comment\nPATH_EXTRA=/opt\nAPI_KEY=old\nMODEL=m1\n";
        let rendered = file.render(
            existing,
            &values(&[("API_KEY", "new"), ("BASE_URL", "https://x.test/v1")]),
        );
        assert_eq!(
            rendered,
            "# comment\nPATH_EXTRA=/opt\nAPI_KEY=new\nBASE_URL=https://x.test/v1\n"
        );
    }

    #[rstest::rstest]
    #[case("plain-value", "plain-value")]
    #[case("has space", "\"has space\"")]
    #[case("a\"b", "\"a\\\"b\"")]
    fn quoting(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(quote(value), expected);
    }

    #[tokio::test]
    async fn values_survive_a_round_trip() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let file = env_file(tmp.path().join(".env"));
        let written = values(&[("API_KEY", "k e y"), ("MODEL", "gpt-4o")]);
        file.write(&written).await.unwrap();
        assert_eq!(file.read().await.unwrap(), written);
    }
}
