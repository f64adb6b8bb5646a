use atlas_core::validation::MAX_STORAGE_BYTES;
use atlas_core::{
    safe_parse_storage, safe_save_storage, sanitize_string, validate_file, validate_json,
    validate_project, validate_projects_array, FileCandidate, MemoryStorage, PersistenceError,
    ProjectService, StoragePort, StorageProjectRepository, ValidationErrorKind, ValidationReport,
};
use serde_json::{json, Value};
use std::fs::File;

fn project_fixture(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Support triage",
        "lastModified": 1_717_000_000_000_i64,
        "data": {
            "nodes": [
                {"id": "n0", "type": "touchpoint", "refId": "chat-interface", "x": 0, "y": 0},
                {"id": "n1", "type": "task", "refId": "classify-intent", "x": 120.5, "y": 40},
                {"id": "n2", "type": "task", "refId": "route-request", "x": 240, "y": 40}
            ],
            "edges": [
                {"id": "e0", "source": "n0", "target": "n1"},
                {"id": "e1", "source": "n1", "target": "n2"}
            ],
            "personas": [
                {"id": "p0", "name": "Agent", "color": "#3366ff", "initials": "AG", "category": "human"}
            ]
        }
    })
}

#[test]
fn twelve_megabyte_json_file_fails_before_parsing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.json");
    File::create(&path)
        .unwrap()
        .set_len(12 * 1024 * 1024)
        .unwrap();

    let candidate = FileCandidate::from_path(&path).unwrap();
    let err = validate_file(Some(&candidate)).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::FileTooLarge);
    assert_eq!(err.error(), "File too large");
    assert!(err.details.contains("12.00MB"));

    let service = ProjectService::new(StorageProjectRepository::new(MemoryStorage::new()));
    let err = service.import_file(&path).unwrap_err();
    assert!(err.to_string().starts_with("File too large"));
}

#[test]
fn empty_and_non_json_files_are_rejected() {
    let empty = FileCandidate::new("flow.json", Some("application/json"), 0);
    assert_eq!(validate_file(Some(&empty)).unwrap_err().error(), "Empty file");

    let text = FileCandidate::new("notes.txt", Some("text/plain"), 10);
    assert_eq!(
        validate_file(Some(&text)).unwrap_err().error(),
        "Invalid file type"
    );

    let by_mime = FileCandidate::new("export", Some("application/json"), 10);
    assert!(validate_file(Some(&by_mime)).is_ok());

    assert_eq!(validate_file(None).unwrap_err().error(), "No file provided");
}

#[test]
fn invalid_json_text_is_reported() {
    for text in ["{not json", "", "[1, 2", "nul"] {
        let err = validate_json(text).unwrap_err();
        assert_eq!(err.error(), "Invalid JSON");
    }
}

#[test]
fn bad_node_type_cites_array_and_index() {
    let mut project = project_fixture("p-1");
    project["data"]["nodes"][2]["type"] = json!("invalid_type");

    let err = validate_project(&project).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::InvalidNodes { index: 2 });
    assert_eq!(err.kind.index(), Some(2));
    assert!(err.details.contains("index 2"));

    let report = ValidationReport::from_result(&validate_project(&project));
    assert!(!report.valid);
}

#[test]
fn missing_fields_cite_their_array() {
    let mut project = project_fixture("p-1");
    project["data"]["edges"][1]
        .as_object_mut()
        .unwrap()
        .remove("target");
    assert_eq!(
        validate_project(&project).unwrap_err().kind,
        ValidationErrorKind::InvalidEdges { index: 1 }
    );

    let mut project = project_fixture("p-1");
    project["data"]["personas"][0]["category"] = json!("robot");
    assert_eq!(
        validate_project(&project).unwrap_err().kind,
        ValidationErrorKind::InvalidPersonas { index: 0 }
    );
}

#[test]
fn oversized_project_array_is_rejected_before_element_checks() {
    // Elements are not projects at all, so any element check would fail differently.
    let filler = "x".repeat(1024 * 1024);
    let value = json!([filler, filler, filler, filler, filler, filler]);

    let err = validate_projects_array(&value).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::DataTooLarge);
    assert_eq!(err.error(), "Data too large");
}

#[test]
fn array_failure_names_the_project_index() {
    let mut second = project_fixture("p-2");
    second["lastModified"] = json!("yesterday");
    let value = json!([project_fixture("p-1"), second]);

    let err = validate_projects_array(&value).unwrap_err();
    assert_eq!(err.kind, ValidationErrorKind::InvalidProjectAtIndex { index: 1 });
    assert_eq!(err.error(), "Invalid project at index 1");
    assert!(err.details.starts_with("Invalid timestamp"));

    let err = validate_projects_array(&json!({"not": "an array"})).unwrap_err();
    assert_eq!(err.error(), "Invalid data format");
}

#[test]
fn corrupted_storage_value_is_detected() {
    let storage = MemoryStorage::new();
    storage.set_item("atlas-projects", "{not json").unwrap();

    let err = safe_parse_storage::<Value, _, _>(&storage, "atlas-projects", validate_projects_array)
        .unwrap_err();
    assert!(matches!(err, PersistenceError::CorruptedData { .. }));
    assert!(err.to_string().starts_with("Corrupted data detected"));
}

#[test]
fn save_then_parse_returns_equal_value() {
    let storage = MemoryStorage::new();
    let projects = json!([project_fixture("p-1"), project_fixture("p-2")]);

    safe_save_storage(&storage, "atlas-projects", &projects).unwrap();
    let loaded: Option<Value> =
        safe_parse_storage(&storage, "atlas-projects", validate_projects_array).unwrap();
    assert_eq!(loaded, Some(projects));
}

#[test]
fn save_rejects_values_over_storage_ceiling() {
    let storage = MemoryStorage::new();
    let value = json!({"blob": "y".repeat(MAX_STORAGE_BYTES)});
    let err = safe_save_storage(&storage, "k", &value).unwrap_err();
    assert!(matches!(err, PersistenceError::DataTooLarge { .. }));
    assert_eq!(storage.get_item("k").unwrap(), None);
}

#[test]
fn sanitize_scenarios() {
    assert_eq!(sanitize_string("  hello\0world  ", 1000), "helloworld");

    for (input, max) in [
        ("  padded  ", 1000),
        ("abc   def", 5),
        ("\0 \0 lead", 3),
        ("trailing word   ", 9),
    ] {
        let once = sanitize_string(input, max);
        assert_eq!(sanitize_string(&once, max), once, "input {input:?}");
    }
}
