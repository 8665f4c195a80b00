use bindery::{Bindable, ErrorKind, Map, Options, Value, value};

#[derive(Debug, Default, PartialEq, Bindable)]
struct Plugin {
    name: String,
    #[bind(tag = "token,secret")]
    token: String,
    #[bind(tag = ",omitempty")]
    tags: Vec<String>,
    #[bind(tag = ",extra")]
    settings: Map,
}

#[derive(Debug, Default, Bindable)]
struct Greedy {
    #[bind(tag = ",extra")]
    first: Map,
    #[bind(tag = ",+extra")]
    second: Map,
}

#[test]
fn unclaimed_keys_land_in_extra() {
    let source = value!({ "name": "lint", "level": "strict", "paths": ["src"] });
    let plugin: Plugin = bindery::bind(&source, &Options::new()).unwrap();
    assert_eq!(plugin.name, "lint");
    let keys: Vec<&str> = plugin.settings.keys().map(String::as_str).collect();
    assert_eq!(keys, ["level", "paths"]);
}

#[test]
fn named_fields_win_over_extra_on_unbind() {
    let mut settings = Map::new();
    settings.insert("name".to_string(), Value::from("shadow"));
    settings.insert("level".to_string(), Value::from(2));
    let plugin = Plugin {
        name: "lint".to_string(),
        settings,
        ..Plugin::default()
    };
    let out = bindery::unbind(&plugin, &Options::new()).unwrap();
    assert_eq!(Value::from(out), value!({ "name": "lint", "token": "", "level": 2 }));
}

#[test]
fn two_extra_fields_are_structural() {
    let err = bindery::bind::<Greedy>(&value!({ "a": 1 }), &Options::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
}

#[test]
fn secrets_are_redacted_on_request() {
    let plugin = Plugin {
        name: "deploy".to_string(),
        token: "s3cr3t".to_string(),
        ..Plugin::default()
    };
    let plain = bindery::unbind(&plugin, &Options::new()).unwrap();
    assert_eq!(plain["token"], Value::from("s3cr3t"));

    let redacted = bindery::unbind(&plugin, &Options::new().with_redact_secrets(true)).unwrap();
    assert_eq!(redacted["token"], Value::from(bindery::unbind::REDACTED));
}

#[test]
fn omitempty_drops_zero_values() {
    let plugin = Plugin {
        tags: vec!["ci".to_string()],
        ..Plugin::default()
    };
    let out = bindery::unbind(&plugin, &Options::new()).unwrap();
    assert_eq!(out["tags"], value!(["ci"]));
    let out = bindery::unbind(&Plugin::default(), &Options::new()).unwrap();
    assert!(!out.contains_key("tags"));
}
