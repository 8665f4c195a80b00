use bindery::{Bindable, ErrorKind, FieldTag, Options, value};

#[derive(Debug, Default, PartialEq, Bindable)]
struct Manifest {
    #[bind(tag = "version,required,match=\"v1\"")]
    version: String,
    #[bind(tag = "strict,match=true")]
    strict: bool,
    #[bind(tag = "level,match=3")]
    level: i32,
}

#[test]
fn matching_literals_bind() {
    let source = value!({ "version": "v1", "strict": true, "level": 3 });
    let manifest: Manifest = bindery::bind(&source, &Options::new()).unwrap();
    assert_eq!(manifest.version, "v1");
}

#[test]
fn required_is_checked_before_match() {
    let err = bindery::bind::<Manifest>(&value!({ "strict": true }), &Options::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Required);
    assert!(!err.is_value_mismatch());
}

#[test]
fn mismatched_literals_fail() {
    for source in [
        value!({ "version": "v2" }),
        value!({ "version": "v1", "strict": false }),
        value!({ "version": "v1", "level": 3.5 }),
        value!({ "version": "v1", "level": null }),
    ] {
        let err = bindery::bind::<Manifest>(&source, &Options::new()).unwrap_err();
        assert!(err.is_value_mismatch(), "{source:?}: {err}");
    }
}

#[test]
fn absent_optional_match_is_fine() {
    let manifest: Manifest = bindery::bind(&value!({ "version": "v1" }), &Options::new()).unwrap();
    assert!(!manifest.strict);
    assert_eq!(manifest.level, 0);
}

#[test]
fn tag_surface() {
    let tag = FieldTag::parse("label,omitempty,match=\"a,b\",secret").unwrap();
    assert_eq!(tag.name.as_deref(), Some("label"));
    assert!(tag.omit_empty);
    assert!(tag.secret);
    assert_eq!(tag.matches.as_deref(), Some("a,b"));

    assert!(FieldTag::parse("-").is_none());
    let broken = FieldTag::parse("x,match=\"open,required").unwrap();
    assert!(!broken.has_match());
    assert!(broken.required);
}

#[test]
fn snake_case_names() {
    use bindery::tag::to_snake_case;
    for (input, expected) in [
        ("HTMLParser", "html_parser"),
        ("UserID", "user_id"),
        ("XMLHttpRequest", "xml_http_request"),
        ("ABC", "abc"),
        ("A", "a"),
        ("already_snake", "already_snake"),
    ] {
        let once = to_snake_case(input);
        assert_eq!(once, expected);
        assert_eq!(to_snake_case(&once), once);
    }
}
