mod common;

use autoroute::{Config, ErrorKind, Value};
use common::{dumper, expected_table, generator, router, Flavor};

fn config() -> Config {
    Config::new("App::HttpValued", "tests/http_valued")
}

fn id(value: i64) -> Value {
    Value::Composite {
        type_name: "Value::Id".to_string(),
        fields: vec![Value::Int(value)],
    }
}

fn ymd(fields: &[i64]) -> Value {
    Value::Composite {
        type_name: "Value::Ymd".to_string(),
        fields: fields.iter().copied().map(Value::Int).collect(),
    }
}

#[test]
fn test_router_builds_value_objects() {
    let router = router(config(), Flavor::Valued);

    let route = router.route("GET", "/foo-item/1");
    assert_eq!(route.handler_id, "App::HttpValued::FooItem::GetFooItem");
    assert_eq!(route.arguments.to_vec(), vec![id(1)]);

    let route = router.route("GET", "/repo/pmjones/auto-route/issue/11");
    assert_eq!(route.handler_id, "App::HttpValued::Repo::Issue::GetRepoIssue");
    assert_eq!(
        route.arguments.to_vec(),
        vec![
            Value::Composite {
                type_name: "Value::OwnerRepo".to_string(),
                fields: vec![Value::from("pmjones"), Value::from("auto-route")],
            },
            Value::Int(11),
        ]
    );
}

#[test]
fn test_router_optional_value_object() {
    let router = router(config(), Flavor::Valued);
    let archive = "App::HttpValued::FooItems::Archive::GetFooItemsArchive";

    let route = router.route("GET", "/foo-items/archive");
    assert_eq!(route.handler_id, archive);
    assert!(route.arguments.is_empty());

    for (path, fields) in [
        ("/foo-items/archive/1979", vec![1979]),
        ("/foo-items/archive/1979/11", vec![1979, 11]),
        ("/foo-items/archive/1979/11/07", vec![1979, 11, 7]),
    ] {
        let route = router.route("GET", path);
        assert!(route.is_ok(), "{path}: {:?}", route.error);
        assert_eq!(route.handler_id, archive);
        assert_eq!(route.arguments.to_vec(), vec![ymd(&fields)]);
    }
}

#[test]
fn test_router_reports_constructor_errors() {
    let route = router(config(), Flavor::Valued).route("GET", "/foo-item/z");
    assert_eq!(route.error_kind(), Some(ErrorKind::InvalidArgument));
    assert_eq!(
        route.error.map(|e| e.to_string()).as_deref(),
        Some("Expected numeric integer argument for Value::Id::new() parameter 0 ($id), actually 'z'")
    );
}

#[test]
fn test_generator() {
    let generator = generator(config(), Flavor::Valued);
    let handler = |name: &str| format!("App::HttpValued::{name}");

    assert_eq!(
        generator
            .generate(&handler("FooItem::Edit::GetFooItemEdit"), vec![Value::from(1)])
            .unwrap(),
        "/foo-item/1/edit"
    );
    // a prebuilt value object is checked field by field
    assert_eq!(
        generator
            .generate(&handler("FooItem::Edit::GetFooItemEdit"), vec![id(5)])
            .unwrap(),
        "/foo-item/5/edit"
    );
    let bad_id = Value::Composite {
        type_name: "Value::Id".to_string(),
        fields: vec![Value::from("z")],
    };
    assert_eq!(
        generator
            .generate(&handler("FooItem::Edit::GetFooItemEdit"), vec![bad_id])
            .unwrap_err()
            .to_string(),
        "Expected numeric integer argument for Value::Id::new() parameter 0 ($id), actually 'z'"
    );
    assert_eq!(generator.generate(&handler("Get"), Vec::new()).unwrap(), "/");
    assert_eq!(
        generator
            .generate(
                &handler("FooItem::Extras::GetFooItemExtras"),
                vec![
                    Value::from(1),
                    Value::from(2.3),
                    Value::from("bar"),
                    Value::from("baz"),
                    Value::from(true),
                    Value::from(vec!["a", "b", "c"]),
                ],
            )
            .unwrap(),
        "/foo-item/1/extras/2.3/bar/baz/1/a,b,c"
    );
    assert_eq!(
        generator
            .generate(
                &handler("FooItem::Variadic::GetFooItemVariadic"),
                vec![Value::from(1), Value::from("foo"), Value::from("bar"), Value::from("baz")],
            )
            .unwrap(),
        "/foo-item/1/variadic/foo/bar/baz"
    );
    assert_eq!(
        generator
            .generate(
                &handler("Repo::Issue::GetRepoIssue"),
                vec![Value::from("pmjones"), Value::from("auto-route"), Value::from(11)],
            )
            .unwrap(),
        "/repo/pmjones/auto-route/issue/11"
    );

    let archive = handler("FooItems::Archive::GetFooItemsArchive");
    assert_eq!(generator.generate(&archive, Vec::new()).unwrap(), "/foo-items/archive");
    assert_eq!(
        generator.generate(&archive, vec![Value::from("1970")]).unwrap(),
        "/foo-items/archive/1970"
    );
    assert_eq!(
        generator
            .generate(&archive, vec![Value::from("1970"), Value::from("11"), Value::from("07")])
            .unwrap(),
        "/foo-items/archive/1970/11/07"
    );
}

#[test]
fn test_dumper_expands_value_objects() {
    let actual = dumper(config(), Flavor::Valued).dump().unwrap();
    assert_eq!(actual, expected_table("App::HttpValued", "", "", '-'));
}
