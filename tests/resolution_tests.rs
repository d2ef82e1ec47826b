//! Integration tests for resolving a directory chain.
//!
//! Every test builds a small tree under a temp directory:
//! - parent/
//!   - child_1/
//!     - child_1_1/
//!   - child_2/

use i18n_config::{Config, ConfigBuilder, ConfigError, Locale, LocaleBucket};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

struct Tree {
    _temp: TempDir,
    parent: PathBuf,
    child_1: PathBuf,
    child_1_1: PathBuf,
}

fn tree() -> Tree {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let parent = temp.path().join("parent");
    let child_1 = parent.join("child_1");
    let child_1_1 = child_1.join("child_1_1");
    fs::create_dir_all(&child_1_1).unwrap();
    fs::create_dir_all(parent.join("child_2")).unwrap();
    Tree {
        _temp: temp,
        parent,
        child_1,
        child_1_1,
    }
}

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).expect("Failed to write fragment");
}

/// Builder with an `it_IT` default locale and an empty environment.
fn builder(root: &Path, profile: &Path) -> ConfigBuilder {
    ConfigBuilder::new()
        .with_root_dir(root)
        .unwrap()
        .with_profile_dir(profile)
        .unwrap()
        .with_default_locale(Locale::parse("it_IT").unwrap())
        .with_env(Arc::new(HashMap::<String, String>::new()))
}

fn build(root: &Path, profile: &Path) -> Config {
    builder(root, profile).build().expect("Failed to build config")
}

#[test]
fn test_only_a_root_file() {
    let t = tree();
    write(&t.parent, "root.conf", "property1: property1 in root.conf file");

    let cfg = build(&t.parent, &t.parent);
    assert!(cfg.get_config("root").is_some());
    assert_eq!(
        cfg.get_str("root.property1"),
        Some("property1 in root.conf file")
    );
    assert_eq!(cfg.entry_count(), 1);
}

#[test]
fn test_root_file_overwritten_by_child() {
    let t = tree();
    write(
        &t.parent,
        "root.conf",
        "property1: property1 in root.conf file\nproperty2: property2 in root.conf file",
    );
    write(
        &t.child_1,
        "root.conf",
        "property1: property1 in root.conf file in child_1 directory",
    );

    let cfg = build(&t.parent, &t.child_1);
    assert_eq!(
        cfg.get_str("root.property1"),
        Some("property1 in root.conf file in child_1 directory")
    );
    assert_eq!(
        cfg.get_str("root.property2"),
        Some("property2 in root.conf file")
    );
    assert_eq!(cfg.entry_count(), 2);
}

#[test]
fn test_merge_file_types() {
    let t = tree();
    write(&t.parent, "root.conf", "property1: property1 in root.conf file");
    write(
        &t.parent,
        "root.properties",
        "property2 = property2 in root.properties file",
    );
    write(
        &t.parent,
        "root.json",
        r#"{ "property3": "property3 in root.json file" }"#,
    );

    let cfg = build(&t.parent, &t.parent);
    assert_eq!(cfg.get_str("root.property1"), Some("property1 in root.conf file"));
    assert_eq!(
        cfg.get_str("root.property2"),
        Some("property2 in root.properties file")
    );
    assert_eq!(cfg.get_str("root.property3"), Some("property3 in root.json file"));
    assert_eq!(cfg.entry_count(), 3);
}

#[test]
fn test_merge_file_types_order() {
    let t = tree();
    write(&t.parent, "root.conf", "property1: property1 in root.conf file");
    write(
        &t.parent,
        "root.json",
        r#"{ "property1": "property1 in root.json file", "property2": "property2 in root.json file" }"#,
    );
    write(
        &t.parent,
        "root.properties",
        "property1 = property1 in root.properties file\n\
         property2 = property2 in root.properties file\n\
         property3 = property3 in root.properties file",
    );

    let cfg = build(&t.parent, &t.parent);
    assert_eq!(cfg.get_str("root.property1"), Some("property1 in root.conf file"));
    assert_eq!(cfg.get_str("root.property2"), Some("property2 in root.json file"));
    assert_eq!(
        cfg.get_str("root.property3"),
        Some("property3 in root.properties file")
    );
    assert_eq!(cfg.entry_count(), 3);
}

fn write_localized_roots(dir: &Path) {
    write(
        dir,
        "root.conf",
        "property1: property1 in root.conf file\n\
         property2: property2 in root.conf file\n\
         property3: property3 in root.conf file",
    );
    write(
        dir,
        "root_it.conf",
        "property2: property2 in root_it.conf file\n\
         property3: property3 in root_it.conf file",
    );
    write(
        dir,
        "root_it_IT.conf",
        "property3: property3 in root_it_IT.conf file",
    );
}

fn assert_localized_roots(cfg: &Config) {
    assert_eq!(cfg.get_str("root.property1"), Some("property1 in root.conf file"));
    assert_eq!(cfg.get_str("root.property2"), Some("property2 in root_it.conf file"));
    assert_eq!(
        cfg.get_str("root.property3"),
        Some("property3 in root_it_IT.conf file")
    );
    assert_eq!(cfg.entry_count(), 3);
}

#[test]
fn test_override_by_default_locale() {
    let t = tree();
    write_localized_roots(&t.parent);

    assert_localized_roots(&build(&t.parent, &t.parent));
}

#[test]
fn test_override_by_requested_locale() {
    let t = tree();
    write_localized_roots(&t.parent);
    write(&t.parent, "root_en.conf", "property1: property1 in root_en.conf file");

    let cfg = ConfigBuilder::new()
        .with_root_dir(&t.parent)
        .unwrap()
        .with_locale(Locale::parse("it_IT").unwrap())
        .with_default_locale(Locale::parse("de_DE").unwrap())
        .with_env(Arc::new(HashMap::<String, String>::new()))
        .build()
        .unwrap();
    // root_en.conf matches neither locale and is dropped
    assert_localized_roots(&cfg);
}

#[test]
fn test_requested_locale_beats_default_locale() {
    let t = tree();
    write(&t.parent, "root.conf", "greeting: base\nfarewell: base\nname: base");
    write(&t.parent, "root_it.conf", "greeting: ciao\nfarewell: arrivederci");
    write(&t.parent, "root_en_US.conf", "greeting: hi");

    let cfg = ConfigBuilder::new()
        .with_root_dir(&t.parent)
        .unwrap()
        .with_locale(Locale::parse("en_US").unwrap())
        .with_default_locale(Locale::parse("it_IT").unwrap())
        .build()
        .unwrap();
    assert_eq!(cfg.get_str("root.greeting"), Some("hi"));
    assert_eq!(cfg.get_str("root.farewell"), Some("arrivederci"));
    assert_eq!(cfg.get_str("root.name"), Some("base"));
}

#[test]
fn test_override_locale_dominates_on_profile() {
    let t = tree();
    write(&t.parent, "root_it.conf", "property1: property1 in root_it.conf file");
    write(
        &t.child_1,
        "root.conf",
        "property1: property1 in root.conf file in child_1 dir\n\
         property2: property2 in root.conf file in child_1 dir",
    );

    let cfg = build(&t.parent, &t.child_1);
    assert_eq!(cfg.get_str("root.property1"), Some("property1 in root_it.conf file"));
    assert_eq!(
        cfg.get_str("root.property2"),
        Some("property2 in root.conf file in child_1 dir")
    );
    assert_eq!(cfg.entry_count(), 2);
}

#[test]
fn test_stale_locale_is_dropped() {
    let t = tree();
    write(&t.parent, "root.conf", "property1: base");
    write(&t.parent, "root_fr.conf", "property1: french");
    write(&t.parent, "messages_fr_FR.conf", "hello: bonjour");

    let cfg = build(&t.parent, &t.parent);
    assert_eq!(cfg.get_str("root.property1"), Some("base"));
    assert!(!cfg.has_path("messages"));
    assert_eq!(cfg.sections(), vec!["root"]);
}

#[test]
fn test_three_level_chain() {
    let t = tree();
    write(&t.parent, "db.yaml", "pool:\n  size: 4\n  timeout: 30\nhost: parent");
    write(&t.child_1, "db.toml", "host = \"child_1\"\n[pool]\nsize = 8\n");
    write(&t.child_1_1, "db.properties", "pool.size = 16\n");

    let cfg = build(&t.parent, &t.child_1_1);
    assert_eq!(cfg.get_i64("db.pool.size"), Some(16));
    assert_eq!(cfg.get_i64("db.pool.timeout"), Some(30));
    assert_eq!(cfg.get_str("db.host"), Some("child_1"));
}

#[test]
fn test_idempotent() {
    let t = tree();
    write_localized_roots(&t.parent);
    write(&t.child_1, "app.conf", "name = ${root.property1}");

    let builder = builder(&t.parent, &t.child_1);
    let first = builder.build().unwrap();
    let second = builder.build().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.get_str("app.name"), Some("property1 in root.conf file"));
}

#[test]
fn test_sequences_report_buckets() {
    let t = tree();
    write_localized_roots(&t.parent);
    write(&t.child_1, "root.conf", "property1: child");

    let sequences = builder(&t.parent, &t.child_1).sequences().unwrap();
    let root = &sequences["root"];
    assert_eq!(root.bucket(LocaleBucket::Base).len(), 2);
    assert_eq!(root.bucket(LocaleBucket::DefaultLanguage).len(), 1);
    assert_eq!(root.bucket(LocaleBucket::DefaultLanguageCountry).len(), 1);
    assert!(root.bucket(LocaleBucket::CurrentLanguage).is_empty());
    assert_eq!(
        root.bucket(LocaleBucket::Base)[0].path.parent().unwrap().file_name(),
        Some(std::ffi::OsStr::new("child_1"))
    );
}

#[test]
fn test_malformed_fragment_names_file() {
    let t = tree();
    write(&t.parent, "root.conf", "property1: ok");
    write(&t.child_1, "broken.json", "{ not json");

    let err = builder(&t.parent, &t.child_1).build().unwrap_err();
    match &err {
        ConfigError::MalformedFragment { path, .. } => {
            assert_eq!(path.file_name(), Some(std::ffi::OsStr::new("broken.json")));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn test_unresolved_reference_names_reference() {
    let t = tree();
    write(&t.parent, "root.conf", "property1 = ${missing.value}");

    let err = build_err(&t.parent);
    assert!(matches!(err, ConfigError::UnresolvedReference { .. }));
    assert!(err.to_string().contains("missing.value"));
}

fn build_err(dir: &Path) -> ConfigError {
    builder(dir, dir).build().unwrap_err()
}

#[test]
fn test_forward_and_env_references() {
    let t = tree();
    write(
        &t.parent,
        "app.conf",
        "url = \"http://\"${server.host}\":\"${server.port}/\nport = ${server.port}\nhome = ${HOME_DIR}",
    );
    write(&t.parent, "server.conf", "host: localhost\nport: 8080");

    let mut env = HashMap::new();
    env.insert("HOME_DIR".to_string(), "/home/app".to_string());
    let cfg = builder(&t.parent, &t.parent)
        .with_env(Arc::new(env))
        .build()
        .unwrap();
    assert_eq!(cfg.get_str("app.url"), Some("http://localhost:8080/"));
    assert_eq!(cfg.get_i64("app.port"), Some(8080));
    assert_eq!(cfg.get("app.port"), Some(&serde_json::json!(8080)));
    assert_eq!(cfg.get_str("app.home"), Some("/home/app"));
}

#[test]
fn test_null_in_child_hides_root_value() {
    let t = tree();
    write(
        &t.parent,
        "root.conf",
        "property1: from root\nproperty2: from root",
    );
    write(&t.child_1, "root.conf", "property1: null");
    write(&t.child_1, "empty.yaml", "cleared:\n");
    write(&t.parent, "empty.yaml", "cleared: from root");

    let cfg = build(&t.parent, &t.child_1);
    assert_eq!(cfg.get("root.property1"), Some(&serde_json::Value::Null));
    assert!(!cfg.has_path("root.property1"));
    assert_eq!(cfg.get_str("root.property2"), Some("from root"));
    assert_eq!(cfg.get("empty.cleared"), Some(&serde_json::Value::Null));
}

#[test]
fn test_substitution_syntax_is_literal_outside_conf() {
    let t = tree();
    write(&t.parent, "root.json", r#"{"template": "Hello ${user.name}"}"#);
    write(&t.parent, "msg.properties", "greeting = Hi ${name}\nprice = $$5");
    write(&t.parent, "tpl.yaml", "path: \"${HOME}/data\"");
    write(&t.parent, "app.conf", "copy = ${msg.greeting}\nquoted = \"${not.a.reference}\"");

    let cfg = build(&t.parent, &t.parent);
    assert_eq!(cfg.get_str("root.template"), Some("Hello ${user.name}"));
    assert_eq!(cfg.get_str("msg.greeting"), Some("Hi ${name}"));
    assert_eq!(cfg.get_str("msg.price"), Some("$$5"));
    assert_eq!(cfg.get_str("tpl.path"), Some("${HOME}/data"));
    assert_eq!(cfg.get_str("app.copy"), Some("Hi ${name}"));
    assert_eq!(cfg.get_str("app.quoted"), Some("${not.a.reference}"));
}

#[test]
fn test_hocon_syntax_in_conf_fragments() {
    let t = tree();
    write(
        &t.parent,
        "db.conf",
        "# connection defaults\n\
         host = localhost\n\
         pool {\n  size = 4\n  timeout = 30 seconds\n}\n\
         replicas = [\"a\", \"b\"]",
    );
    write(&t.child_1, "db.conf", "pool.size = 16\nurl = \"jdbc://\"${db.host}");

    let cfg = build(&t.parent, &t.child_1);
    assert_eq!(cfg.get_i64("db.pool.size"), Some(16));
    assert_eq!(cfg.get_str("db.pool.timeout"), Some("30 seconds"));
    assert_eq!(cfg.get_str("db.host"), Some("localhost"));
    assert_eq!(cfg.get_str("db.url"), Some("jdbc://localhost"));
    assert_eq!(cfg.get("db.replicas"), Some(&serde_json::json!(["a", "b"])));
}
