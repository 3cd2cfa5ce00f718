use keel_core::{DiffKind, JsonPath};
use keel_draft::memory::MemoryAdapter;
use keel_draft::{AddKey, DraftError, DraftManager, LoadState};
use keel_schema::FieldType;
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object")
}

fn schema() -> Value {
    json!({
        "definitions": {
            "Retry": {
                "type": "object",
                "description": "retry policy",
                "default": {"max": 3}
            }
        },
        "properties": {
            "timeout": {"type": "integer", "default": 30, "description": "seconds"},
            "verbose": {"type": "boolean"},
            "retry": {"$ref": "#/definitions/Retry"},
            "theme": {"enum": ["dark", "light"]}
        }
    })
}

fn manager(settings: Value) -> (MemoryAdapter, DraftManager<MemoryAdapter>) {
    let adapter = MemoryAdapter::new("demo", schema(), object(settings));
    (adapter.clone(), DraftManager::new(adapter))
}

#[tokio::test]
async fn load_moves_to_ready() {
    let (_, mut manager) = manager(json!({"timeout": 10}));
    assert_eq!(manager.state(), &LoadState::Unloaded);

    manager.load(false).await.unwrap();

    assert_eq!(manager.state(), &LoadState::Ready);
    assert_eq!(manager.draft(), Some(&object(json!({"timeout": 10}))));
    assert!(!manager.has_changes());
}

#[tokio::test]
async fn load_failure_blocks_editing_until_reload() {
    let (adapter, mut manager) = manager(json!({"timeout": 10}));
    adapter.set_load_failure(Some("disk unplugged"));

    let error = manager.load(false).await.unwrap_err();
    assert!(matches!(error, DraftError::LoadFailed { .. }));
    assert!(matches!(
        manager.state(),
        LoadState::Error(reason) if reason.contains("disk unplugged")
    ));
    assert_eq!(manager.draft(), None);
    assert!(matches!(
        manager.add_key("x", AddKey::default()),
        Err(DraftError::NotReady { .. })
    ));

    adapter.set_load_failure(None);
    manager.reload().await.unwrap();
    assert!(manager.is_ready());
}

#[tokio::test]
async fn schema_is_cached_unless_refetched() {
    let (adapter, mut manager) = manager(json!({}));
    manager.load(false).await.unwrap();
    manager.load(false).await.unwrap();
    assert_eq!(adapter.schema_loads(), 1);

    manager.reload().await.unwrap();
    assert_eq!(adapter.schema_loads(), 2);
}

#[tokio::test]
async fn reload_picks_up_external_changes() {
    let (adapter, mut manager) = manager(json!({"timeout": 10}));
    manager.load(false).await.unwrap();
    adapter.replace_settings(object(json!({"timeout": 99})));
    manager.load(false).await.unwrap();
    assert_eq!(manager.original(), Some(&object(json!({"timeout": 99}))));
}

#[tokio::test]
async fn adding_a_key_twice_keeps_one() {
    let (_, mut manager) = manager(json!({}));
    manager.load(false).await.unwrap();

    manager.add_key("foo", AddKey::default()).unwrap();
    let error = manager.add_key("foo", AddKey::default()).unwrap_err();

    assert!(matches!(error, DraftError::DuplicateKey { ref key, .. } if key == "foo"));
    assert_eq!(manager.draft(), Some(&object(json!({"foo": ""}))));
}

#[tokio::test]
async fn added_keys_take_schema_defaults() {
    let (_, mut manager) = manager(json!({}));
    manager.load(false).await.unwrap();

    manager.add_key("timeout", AddKey::default()).unwrap();
    manager.add_key("verbose", AddKey::default()).unwrap();
    manager.add_key("retry", AddKey::default()).unwrap();
    manager.add_key("theme", AddKey::default()).unwrap();
    manager.add_key("tags", AddKey::typed(FieldType::Array)).unwrap();
    manager
        .add_key("limits", AddKey::with_schema(json!({"$ref": "#/definitions/Retry"})))
        .unwrap();

    assert_eq!(
        manager.draft(),
        Some(&object(json!({
            "timeout": 30,
            "verbose": false,
            "retry": {"max": 3},
            "theme": "dark",
            "tags": [],
            "limits": {"max": 3}
        })))
    );
}

#[tokio::test]
async fn blank_keys_are_rejected() {
    let (_, mut manager) = manager(json!({}));
    manager.load(false).await.unwrap();
    assert!(matches!(
        manager.add_key("   ", AddKey::default()),
        Err(DraftError::BlankKey { .. })
    ));
    assert!(!manager.has_changes());
}

#[tokio::test]
async fn delete_set_and_reset() {
    let (_, mut manager) = manager(json!({"timeout": 10, "servers": [{"host": "a"}]}));
    manager.load(false).await.unwrap();

    assert!(manager.delete_key("timeout").unwrap());
    assert!(!manager.delete_key("timeout").unwrap());
    manager
        .set_value(&"servers[0].host".parse::<JsonPath>().unwrap(), json!("b"))
        .unwrap();
    assert!(manager.has_changes());

    manager.reset_draft();
    assert!(!manager.has_changes());
    assert_eq!(manager.draft(), manager.original());
}

#[tokio::test]
async fn fields_and_options_follow_the_draft() {
    let (_, mut manager) = manager(json!({"timeout": 10, "custom": {"a": 1}}));
    manager.load(false).await.unwrap();

    let fields: Vec<(String, FieldType, bool)> = manager
        .fields()
        .into_iter()
        .map(|field| (field.key, field.field_type, field.compound))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("custom".to_string(), FieldType::Object, true),
            ("timeout".to_string(), FieldType::Integer, false),
        ]
    );

    let available: Vec<String> = manager
        .available_options()
        .into_iter()
        .map(|option| option.key)
        .collect();
    assert_eq!(available, vec!["retry", "theme", "verbose"]);
    assert_eq!(manager.schema_options().len(), 4);
}

#[tokio::test]
async fn primary_diff_reports_coarsest_changes() {
    let (_, mut manager) = manager(json!({"timeout": 30}));
    manager.load(false).await.unwrap();
    manager.set_value(&JsonPath::key("timeout"), json!(60)).unwrap();
    manager
        .set_value(&JsonPath::key("retry"), json!({"max": 3, "backoffMs": 100}))
        .unwrap();

    let diffs = manager.combined_diffs().unwrap();
    let summary: Vec<(String, DiffKind)> = diffs
        .iter()
        .map(|entry| (entry.path.to_string(), entry.kind()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("retry".to_string(), DiffKind::Added),
            ("timeout".to_string(), DiffKind::Changed),
        ]
    );
}
