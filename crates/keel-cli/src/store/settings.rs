use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use async_trait::async_trait;
use keel_draft::{AdapterError, SettingsAdapter};
use keel_schema::FieldType;
use serde_json::{Map, Number, Value};

use super::{read_optional, write_creating_dirs};

/// On-disk encoding of a settings document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Json,
    Toml,
}

impl SettingsFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    fn parse(self, text: &str) -> anyhow::Result<Value> {
        if text.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        match self {
            Self::Json => serde_json::from_str(text).context("invalid JSON"),
            Self::Toml => {
                let table: toml::Table = text.parse().context("invalid TOML")?;
                toml_to_json(toml::Value::Table(table))
            }
        }
    }

    /// Encode `document`. For TOML, `previous` is the file being replaced;
    /// strings sitting where it held a datetime are written back as datetimes.
    fn render(
        self,
        document: &Map<String, Value>,
        previous: Option<&str>,
    ) -> anyhow::Result<String> {
        match self {
            Self::Json => {
                let mut text = serde_json::to_string_pretty(document)?;
                text.push('\n');
                Ok(text)
            }
            Self::Toml => {
                let previous = previous
                    .and_then(|text| text.parse::<toml::Table>().ok())
                    .map(toml::Value::Table);
                let value = json_to_toml(&Value::Object(document.clone()), previous.as_ref())?;
                toml::to_string_pretty(&value).context("value cannot be written as TOML")
            }
        }
    }
}

/// TOML datetimes become their RFC 3339 text.
fn toml_to_json(value: toml::Value) -> anyhow::Result<Value> {
    Ok(match value {
        toml::Value::String(text) => Value::String(text),
        toml::Value::Integer(number) => Value::from(number),
        toml::Value::Float(number) => match Number::from_f64(number) {
            Some(number) => Value::Number(number),
            None => bail!("{number} has no JSON representation"),
        },
        toml::Value::Boolean(flag) => Value::Bool(flag),
        toml::Value::Datetime(datetime) => Value::String(datetime.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(toml_to_json)
                .collect::<anyhow::Result<_>>()?,
        ),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| Ok((key, toml_to_json(value)?)))
                .collect::<anyhow::Result<_>>()?,
        ),
    })
}

fn json_to_toml(value: &Value, previous: Option<&toml::Value>) -> anyhow::Result<toml::Value> {
    Ok(match value {
        Value::Null => bail!("null cannot be written as TOML"),
        Value::Bool(flag) => toml::Value::Boolean(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => toml::Value::Integer(integer),
            None => toml::Value::Float(number.as_f64().context("number out of range")?),
        },
        Value::String(text) => match previous {
            Some(toml::Value::Datetime(_)) => text
                .parse::<toml::value::Datetime>()
                .map_or_else(|_| toml::Value::String(text.clone()), toml::Value::Datetime),
            _ => toml::Value::String(text.clone()),
        },
        Value::Array(items) => toml::Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| json_to_toml(item, previous.and_then(|p| p.get(index))))
                .collect::<anyhow::Result<_>>()?,
        ),
        Value::Object(map) => toml::Value::Table(
            map.iter()
                .map(|(key, item)| {
                    let previous = previous.and_then(|p| p.get(key.as_str()));
                    Ok((key.clone(), json_to_toml(item, previous)?))
                })
                .collect::<anyhow::Result<_>>()?,
        ),
    })
}

/// Settings document plus its JSON Schema, both on local disk.
#[derive(Debug, Clone)]
pub struct FileSettings {
    name: String,
    settings: PathBuf,
    schema: PathBuf,
    format: SettingsFormat,
}

impl FileSettings {
    pub fn new(name: impl Into<String>, settings: PathBuf, schema: PathBuf) -> Self {
        Self {
            name: name.into(),
            format: SettingsFormat::from_path(&settings),
            settings,
            schema,
        }
    }
}

#[async_trait]
impl SettingsAdapter for FileSettings {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load_schema(&self) -> Result<Value, AdapterError> {
        let Some(text) = read_optional(&self.schema).await? else {
            tracing::warn!(
                path = %self.schema.display(),
                "no schema found; fields are untyped"
            );
            return Ok(Value::Object(Map::new()));
        };
        Ok(serde_json::from_str(&text)?)
    }

    async fn load_settings(&self) -> Result<Map<String, Value>, AdapterError> {
        let Some(text) = read_optional(&self.settings).await? else {
            return Ok(Map::new());
        };
        let parsed = self
            .format
            .parse(&text)
            .with_context(|| format!("parse {}", self.settings.display()))?;
        match parsed {
            Value::Object(document) => Ok(document),
            other => Err(AdapterError::Rejected(format!(
                "{} must hold an object, found {}",
                self.settings.display(),
                FieldType::of_value(&other).map_or("null", FieldType::as_str)
            ))),
        }
    }

    async fn save_settings(&self, next: &Map<String, Value>) -> Result<(), AdapterError> {
        let previous = match self.format {
            SettingsFormat::Toml => read_optional(&self.settings).await?,
            SettingsFormat::Json => None,
        };
        let text = self
            .format
            .render(next, previous.as_deref())
            .with_context(|| format!("encode {}", self.settings.display()))?;
        write_creating_dirs(&self.settings, &text).await?;
        tracing::debug!(path = %self.settings.display(), "settings written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn adapter(dir: &Path, file: &str) -> FileSettings {
        FileSettings::new("demo", dir.join(file), dir.join("schema.json"))
    }

    #[tokio::test]
    async fn missing_files_read_as_empty() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let settings = adapter(tmp.path(), "settings.json");
        assert_eq!(settings.load_settings().await.unwrap(), Map::new());
        assert_eq!(settings.load_schema().await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn json_round_trip() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let settings = adapter(tmp.path(), "nested/settings.json");
        let document = json!({"timeout": 30, "retry": {"max": 3}});
        settings
            .save_settings(document.as_object().unwrap())
            .await
            .unwrap();
        assert_eq!(Value::Object(settings.load_settings().await.unwrap()), document);
    }

    #[tokio::test]
    async fn toml_documents_are_supported() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "model = \"m1\"\n[limits]\nrpm = 60\n").expect("write");
        let settings = FileSettings::new("demo", path, tmp.path().join("schema.json"));

        let mut document = settings.load_settings().await.unwrap();
        assert_eq!(Value::Object(document.clone()), json!({"model": "m1", "limits": {"rpm": 60}}));

        document.insert("verbose".into(), json!(true));
        settings.save_settings(&document).await.unwrap();
        assert_eq!(settings.load_settings().await.unwrap(), document);
    }

    #[tokio::test]
    async fn non_object_documents_are_rejected() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        std::fs::write(tmp.path().join("settings.json"), "[1, 2]").expect("write");
        let error = adapter(tmp.path(), "settings.json")
            .load_settings()
            .await
            .unwrap_err();
        assert!(error.to_string().contains("must hold an object"));
    }

    #[tokio::test]
    async fn toml_datetimes_survive_a_save() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "released = 1979-05-27T07:32:00Z\nname = \"x\"\n[build]\ndates = [1979-05-27]\n",
        )
        .expect("write");
        let settings = FileSettings::new("demo", path.clone(), tmp.path().join("schema.json"));

        let mut document = settings.load_settings().await.unwrap();
        assert_eq!(
            Value::Object(document.clone()),
            json!({
                "released": "1979-05-27T07:32:00Z",
                "name": "x",
                "build": {"dates": ["1979-05-27"]}
            })
        );

        document.insert("name".into(), json!("y"));
        settings.save_settings(&document).await.unwrap();
        let written: toml::Table = std::fs::read_to_string(&path).unwrap().parse().unwrap();
        assert!(matches!(written.get("released"), Some(toml::Value::Datetime(_))));
        assert!(matches!(
            written["build"]["dates"].get(0),
            Some(toml::Value::Datetime(_))
        ));
        assert_eq!(settings.load_settings().await.unwrap(), document);
    }

    #[tokio::test]
    async fn edited_datetime_text_stays_a_datetime_when_valid() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "released = 1979-05-27T07:32:00Z\n").expect("write");
        let settings = FileSettings::new("demo", path.clone(), tmp.path().join("schema.json"));

        let mut next = Map::new();
        next.insert("released".into(), json!("2024-01-02T03:04:05Z"));
        settings.save_settings(&next).await.unwrap();
        let written: toml::Table = std::fs::read_to_string(&path).unwrap().parse().unwrap();
        assert!(matches!(written.get("released"), Some(toml::Value::Datetime(_))));

        next.insert("released".into(), json!("someday"));
        settings.save_settings(&next).await.unwrap();
        let written: toml::Table = std::fs::read_to_string(&path).unwrap().parse().unwrap();
        assert_eq!(written.get("released"), Some(&toml::Value::String("someday".into())));
    }
}
