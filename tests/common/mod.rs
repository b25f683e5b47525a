//! Shared fixtures: one handler registry in four flavors.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use autoroute::catalog::manifest::Manifest;
use autoroute::{
    Catalog, Config, Dumper, Generator, ParameterDescriptor, Registry, RouteTable, Router,
    TypeTag,
};

/// Which variant of the fixture registry to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Scalar parameters only
    Plain,
    /// `Value::Id`, `Value::OwnerRepo` and `Value::Ymd` composites
    Valued,
    /// Every handler takes one leading request parameter that is not routed
    Ignore,
}

fn int(name: &str) -> ParameterDescriptor {
    ParameterDescriptor::required(name, TypeTag::Int)
}

fn string(name: &str) -> ParameterDescriptor {
    ParameterDescriptor::required(name, TypeTag::String)
}

fn optional_int(name: &str) -> ParameterDescriptor {
    ParameterDescriptor::optional(name, TypeTag::Int)
}

fn composite(name: &str, type_name: &str) -> ParameterDescriptor {
    ParameterDescriptor::required(name, TypeTag::Composite(type_name.to_string()))
}

/// Handler path (relative to the root namespace, without suffix) and the
/// routed parameters of every fixture handler
fn handlers(flavor: Flavor) -> Vec<(&'static str, Vec<ParameterDescriptor>)> {
    let valued = flavor == Flavor::Valued;
    let id = || {
        if valued {
            composite("id", "Value::Id")
        } else {
            int("id")
        }
    };
    let owner_repo = || {
        if valued {
            vec![composite("ownerRepo", "Value::OwnerRepo")]
        } else {
            vec![string("ownerName"), string("repoName")]
        }
    };
    let with = |mut head: Vec<ParameterDescriptor>, tail: Vec<ParameterDescriptor>| {
        head.extend(tail);
        head
    };
    let archive = if valued {
        vec![ParameterDescriptor::optional(
            "ymd",
            TypeTag::Composite("Value::Ymd".to_string()),
        )]
    } else {
        vec![optional_int("year"), optional_int("month"), optional_int("day")]
    };

    vec![
        ("Get", vec![]),
        ("Admin::Dashboard::GetAdminDashboard", vec![]),
        ("FooItem::DeleteFooItem", vec![id()]),
        ("FooItem::GetFooItem", vec![id()]),
        ("FooItem::HeadFooItem", vec![id()]),
        ("FooItem::PatchFooItem", vec![id()]),
        ("FooItem::PostFooItem", vec![]),
        ("FooItem::Add::GetFooItemAdd", vec![]),
        ("FooItem::Add::HeadFooItemAdd", vec![]),
        ("FooItem::Edit::GetFooItemEdit", vec![id()]),
        (
            "FooItem::Extras::GetFooItemExtras",
            vec![
                id(),
                ParameterDescriptor::required("foo", TypeTag::Float),
                string("bar"),
                ParameterDescriptor::required("baz", TypeTag::Untyped),
                ParameterDescriptor::required("dib", TypeTag::Bool),
                ParameterDescriptor::optional("gir", TypeTag::Array),
            ],
        ),
        (
            "FooItem::Variadic::GetFooItemVariadic",
            vec![id(), ParameterDescriptor::variadic("more", TypeTag::String)],
        ),
        ("FooItems::GetFooItems", vec![optional_int("page")]),
        ("FooItems::Archive::GetFooItemsArchive", archive),
        ("Repo::GetRepo", owner_repo()),
        ("Repo::Issue::GetRepoIssue", with(owner_repo(), vec![int("issueNum")])),
        (
            "Repo::Issue::Comment::GetRepoIssueComment",
            with(owner_repo(), vec![int("issueNum"), int("commentNum")]),
        ),
        (
            "Repo::Issue::Comment::Add::GetRepoIssueCommentAdd",
            with(owner_repo(), vec![int("issueNum")]),
        ),
    ]
}

/// The fixture catalog under `namespace`, every class name ending in `suffix`
pub fn catalog(namespace: &str, suffix: &str, flavor: Flavor) -> Catalog {
    let mut catalog = Catalog::new(namespace)
        .namespace(&format!("{namespace}::Admin::Empty"))
        .value_type("Value::Id", [int("id")])
        .value_type("Value::OwnerRepo", [string("ownerName"), string("repoName")])
        .value_type(
            "Value::Ymd",
            [optional_int("year"), optional_int("month"), optional_int("day")],
        );

    for (path, mut params) in handlers(flavor) {
        if flavor == Flavor::Ignore {
            params.insert(0, ParameterDescriptor::required("request", TypeTag::Untyped));
        }
        catalog.add_handler(&format!("{namespace}::{path}{suffix}"), params);
    }
    catalog
}

pub fn registry(config: Config, flavor: Flavor) -> Arc<Registry> {
    let catalog = catalog(config.namespace_root(), config.suffix(), flavor);
    Arc::new(Registry::from_catalog(config, catalog))
}

/// `App::Http` with base URL `/api/`
pub fn http_config() -> Config {
    Config::new("App::Http", "tests/http").with_base_url("/api/")
}

pub fn router(config: Config, flavor: Flavor) -> Router {
    Router::new(registry(config, flavor))
}

pub fn generator(config: Config, flavor: Flavor) -> Generator {
    Generator::new(registry(config, flavor))
}

pub fn dumper(config: Config, flavor: Flavor) -> Dumper {
    Dumper::new(registry(config, flavor))
}

/// Build an expected route table from `(path, [(verb, handler)])` rows,
/// handlers given relative to `namespace`
pub fn table(namespace: &str, rows: &[(&str, &[(&str, &str)])]) -> RouteTable {
    rows.iter()
        .map(|(path, verbs)| {
            let verbs = verbs
                .iter()
                .map(|(verb, handler)| ((*verb).to_string(), format!("{namespace}::{handler}")))
                .collect();
            ((*path).to_string(), verbs)
        })
        .collect()
}

/// Expected dump of the fixture registry: paths prefixed with `base`,
/// words joined by `separator`, class names ending in `suffix`
pub fn expected_table(namespace: &str, base: &str, suffix: &str, separator: char) -> RouteTable {
    let p = |path: &str| {
        let full = format!("{base}{}", path.replace("foo-item", &format!("foo{separator}item")));
        if full.is_empty() {
            "/".to_string()
        } else {
            full
        }
    };
    let get_head = |handler: &'static str| -> Vec<(&'static str, &'static str)> {
        vec![("Get", handler), ("Head", handler)]
    };

    let rows: Vec<(String, Vec<(&str, &str)>)> = vec![
        (p(""), get_head("Get")),
        (p("/admin/dashboard"), get_head("Admin::Dashboard::GetAdminDashboard")),
        (p("/foo-item"), vec![("Post", "FooItem::PostFooItem")]),
        (
            p("/foo-item/add"),
            vec![
                ("Get", "FooItem::Add::GetFooItemAdd"),
                ("Head", "FooItem::Add::HeadFooItemAdd"),
            ],
        ),
        (
            p("/foo-item/{int:id}"),
            vec![
                ("Delete", "FooItem::DeleteFooItem"),
                ("Get", "FooItem::GetFooItem"),
                ("Head", "FooItem::HeadFooItem"),
                ("Patch", "FooItem::PatchFooItem"),
            ],
        ),
        (p("/foo-item/{int:id}/edit"), get_head("FooItem::Edit::GetFooItemEdit")),
        (
            p("/foo-item/{int:id}/extras/{float:foo}/{string:bar}/{mixed:baz}/{bool:dib}[/{array:gir}]"),
            get_head("FooItem::Extras::GetFooItemExtras"),
        ),
        (
            p("/foo-item/{int:id}/variadic[/{...string:more}]"),
            get_head("FooItem::Variadic::GetFooItemVariadic"),
        ),
        (
            p("/foo-items/archive[/{int:year}][/{int:month}][/{int:day}]"),
            get_head("FooItems::Archive::GetFooItemsArchive"),
        ),
        (p("/foo-items[/{int:page}]"), get_head("FooItems::GetFooItems")),
        (p("/repo/{string:ownerName}/{string:repoName}"), get_head("Repo::GetRepo")),
        (
            p("/repo/{string:ownerName}/{string:repoName}/issue/{int:issueNum}"),
            get_head("Repo::Issue::GetRepoIssue"),
        ),
        (
            p("/repo/{string:ownerName}/{string:repoName}/issue/{int:issueNum}/comment/add"),
            get_head("Repo::Issue::Comment::Add::GetRepoIssueCommentAdd"),
        ),
        (
            p("/repo/{string:ownerName}/{string:repoName}/issue/{int:issueNum}/comment/{int:commentNum}"),
            get_head("Repo::Issue::Comment::GetRepoIssueComment"),
        ),
    ];

    let borrowed: Vec<(&str, &[(&str, &str)])> = rows
        .iter()
        .map(|(path, verbs)| (path.as_str(), verbs.as_slice()))
        .collect();
    let mut expected = table(namespace, &borrowed);
    for verbs in expected.values_mut() {
        for handler in verbs.values_mut() {
            handler.push_str(suffix);
        }
    }
    expected
}

/// Lay the fixture registry out under `root` (one `.rs` file per handler,
/// plus the empty `Admin/Empty` node) and write its manifest next to it.
///
/// Returns the manifest path.
pub fn write_tree(root: &Path, namespace: &str, suffix: &str, flavor: Flavor) -> PathBuf {
    let catalog = catalog(namespace, suffix, flavor);
    fs::create_dir_all(root.join("Admin").join("Empty")).unwrap();

    let mut handlers = BTreeMap::new();
    for handler_id in catalog.handler_ids() {
        let relative = handler_id
            .strip_prefix(&format!("{namespace}::"))
            .unwrap();
        let mut file = root.to_path_buf();
        file.extend(relative.split("::"));
        file.set_extension("rs");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, format!("// {handler_id}\n")).unwrap();

        let params = autoroute::Introspector::parameters(&catalog, handler_id).unwrap();
        handlers.insert(handler_id.to_string(), params.to_vec());
    }

    let int = |name: &str| ParameterDescriptor::required(name, TypeTag::Int);
    let manifest = Manifest {
        namespace: namespace.to_string(),
        namespaces: vec![format!("{namespace}::Admin::Empty")],
        handlers,
        values: BTreeMap::from([
            ("Value::Id".to_string(), vec![int("id")]),
            ("Value::OwnerRepo".to_string(), vec![string("ownerName"), string("repoName")]),
            (
                "Value::Ymd".to_string(),
                vec![optional_int("year"), optional_int("month"), optional_int("day")],
            ),
        ]),
    };

    let path = root.join("autoroute.yaml");
    fs::write(&path, serde_yaml::to_string(&manifest).unwrap()).unwrap();
    path
}
