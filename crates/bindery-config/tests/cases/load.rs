use std::fs;
use std::time::Duration;

use bindery::{Bindable, Options};
use bindery_config::{LoadError, load, load_from_dir, load_into, save};

#[derive(Debug, Default, Clone, PartialEq, Bindable)]
struct AppConfig {
    #[bind(tag = "name,required")]
    name: String,
    workers: u32,
    shutdown: Duration,
    database: Option<Database>,
}

#[derive(Debug, Default, Clone, PartialEq, Bindable)]
struct Database {
    url: String,
    #[bind(tag = "password,secret,omitempty")]
    password: String,
}

#[test]
fn loads_json_and_yaml_alike() {
    let dir = tempfile::tempdir().unwrap();
    let json = dir.path().join("app.json");
    let yaml = dir.path().join("app.yml");
    fs::write(
        &json,
        r#"{"name": "svc", "workers": 4, "shutdown": "10s", "database": {"url": "pg://db"}}"#,
    )
    .unwrap();
    fs::write(
        &yaml,
        "name: svc\nworkers: 4\nshutdown: 10s\ndatabase:\n  url: pg://db\n",
    )
    .unwrap();

    let from_json: AppConfig = load(&json, &Options::new()).unwrap();
    let from_yaml: AppConfig = load(&yaml, &Options::new()).unwrap();
    assert_eq!(from_json, from_yaml);
    assert_eq!(from_json.shutdown, Duration::from_secs(10));
}

#[test]
fn missing_file_is_io() {
    let dir = tempfile::tempdir().unwrap();
    let err = load::<AppConfig>(dir.path().join("absent.yaml"), &Options::new()).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn malformed_file_is_parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"name\": ").unwrap();
    let err = load::<AppConfig>(&path, &Options::new()).unwrap_err();
    assert!(matches!(err, LoadError::Parse { .. }));
}

#[test]
fn invalid_content_is_bind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invalid.yaml");
    fs::write(&path, "name: svc\nworkers: many\n").unwrap();
    match load::<AppConfig>(&path, &Options::new()).unwrap_err() {
        LoadError::Bind { source, .. } => assert!(source.is_type_mismatch()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.ini");
    fs::write(&path, "name = svc").unwrap();
    let err = load::<AppConfig>(&path, &Options::new()).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        name: "svc".to_string(),
        workers: 8,
        shutdown: Duration::from_millis(1500),
        database: Some(Database {
            url: "pg://db".to_string(),
            password: "hunter2".to_string(),
        }),
    };
    for file in ["out.json", "out.yaml"] {
        let path = dir.path().join(file);
        save(&config, &path, &Options::new()).unwrap();
        let back: AppConfig = load(&path, &Options::new()).unwrap();
        assert_eq!(back, config, "{file}");
    }
}

#[test]
fn redacted_save_hides_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inspect.json");
    let config = AppConfig {
        name: "svc".to_string(),
        database: Some(Database {
            url: "pg://db".to_string(),
            password: "hunter2".to_string(),
        }),
        ..AppConfig::default()
    };
    save(&config, &path, &Options::new().with_redact_secrets(true)).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains("hunter2"));
    assert!(text.contains("<redacted>"));
}

#[test]
fn load_into_layers_files() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let local = dir.path().join("local.json");
    fs::write(&base, "name: svc\nworkers: 2\nshutdown: 5s\n").unwrap();
    fs::write(&local, r#"{"workers": 16}"#).unwrap();

    let mut config: AppConfig = load(&base, &Options::new()).unwrap();
    load_into(&mut config, &local, &Options::new()).unwrap();
    assert_eq!(config.name, "svc");
    assert_eq!(config.workers, 16);
    assert_eq!(config.shutdown, Duration::from_secs(5));
}

#[test]
fn finds_config_in_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();
    fs::write(dir.path().join("bindery.yaml"), "name: root\n").unwrap();

    let (path, config) = load_from_dir::<AppConfig>(&nested, "bindery", &Options::new())
        .unwrap()
        .unwrap();
    assert_eq!(path, dir.path().join("bindery.yaml"));
    assert_eq!(config.name, "root");
}
