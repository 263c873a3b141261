use hastemap::config::HasteConfig;
use hastemap::core::{DiagnosticKind, HasteMapBuilder};
use regex::Regex;
use std::fs;
use std::path::Path;

fn provides(module: &str) -> String {
    format!("/**\n * @providesModule {module}\n */\n")
}

fn build(root: &Path, platforms: &[&str]) -> hastemap::core::HasteIndex {
    let config = HasteConfig::new(vec![root.to_path_buf()])
        .with_platforms(platforms.iter().map(|p| p.to_string()).collect());
    HasteMapBuilder::new(config).build().unwrap()
}

#[test]
fn first_claimant_in_path_order_wins() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("aaa")).unwrap();
    fs::create_dir_all(root.join("bbb")).unwrap();
    fs::write(root.join("aaa/Dup.js"), provides("Dup")).unwrap();
    fs::write(root.join("bbb/Dup.js"), provides("Dup")).unwrap();

    let index = build(root, &[]);

    assert_eq!(
        index.resolve("Dup", None),
        Some(root.join("aaa/Dup.js").as_path())
    );

    let collisions: Vec<_> = index.collisions().collect();
    assert_eq!(collisions.len(), 1);
    assert_eq!(collisions[0].kind, DiagnosticKind::ModuleCollision);
    assert_eq!(collisions[0].path, root.join("bbb/Dup.js"));
    assert!(collisions[0].message.contains("Dup"));
}

#[test]
fn collision_resolution_is_stable_across_builds() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    for name in ["zz", "mm", "aa"] {
        fs::create_dir_all(root.join(name)).unwrap();
        fs::write(root.join(name).join("Shared.js"), provides("Shared")).unwrap();
    }

    let first = build(root, &[]);
    let second = build(root, &[]);

    assert_eq!(first.resolve("Shared", None), second.resolve("Shared", None));
    assert_eq!(
        first.resolve("Shared", None),
        Some(root.join("aa/Shared.js").as_path())
    );
    assert_eq!(first.collisions().count(), 2);
}

#[test]
fn platform_variants_share_an_identity_without_colliding() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("Button.js"), provides("Button")).unwrap();
    fs::write(root.join("Button.ios.js"), provides("Button")).unwrap();

    let index = build(root, &["ios", "android"]);

    assert_eq!(index.collisions().count(), 0);
    assert_eq!(
        index.resolve("Button", Some("ios")),
        Some(root.join("Button.ios.js").as_path())
    );
    // No android variant exists, so the generic file answers.
    assert_eq!(
        index.resolve("Button", Some("android")),
        Some(root.join("Button.js").as_path())
    );
    assert_eq!(
        index.resolve("Button", None),
        Some(root.join("Button.js").as_path())
    );
    assert_eq!(index.resolve("Missing", None), None);
}

#[test]
fn platform_suffix_is_stored_on_the_record() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("Screen.android.js"), provides("Screen")).unwrap();
    fs::write(root.join("util.js"), "// plain helper\n").unwrap();

    let index = build(root, &["ios", "android"]);

    let record = index.record(&root.join("Screen.android.js")).unwrap();
    assert_eq!(record.platform.as_deref(), Some("android"));
    assert_eq!(index.module_name(&root.join("Screen.android.js")), Some("Screen"));

    let plain = index.record(&root.join("util.js")).unwrap();
    assert_eq!(plain.platform, None);
    assert_eq!(plain.module_id, None);

    let matched = index.match_files(&Regex::new(r"\.android\.js$").unwrap());
    assert_eq!(matched, vec![root.join("Screen.android.js").as_path()]);
}
