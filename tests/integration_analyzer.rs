use std::fs;

use stratum::core::{Language, NodePath, ProjectAnalyzer};
use stratum::formatters::{JsonFormatter, TextFormatter};

fn write(root: &std::path::Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn analyzes_a_small_java_project_end_to_end() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();

    write(
        root,
        "src/com/acme/util/Strings.java",
        r#"
package com.acme.util;

public class Strings {
    public String shout(String s) {
        return s;
    }
}
"#,
    );
    write(
        root,
        "src/com/acme/app/Main.java",
        r#"
package com.acme.app;

import com.acme.util.*;

public class Main {
    private Strings strings;
}
"#,
    );

    let result = ProjectAnalyzer::new()
        .analyze(root, &[Language::Java])
        .unwrap();
    assert_eq!(result.file_count, 2);

    let main = result
        .nodes
        .iter()
        .find(|n| n.path.dotted() == "com.acme.app.Main")
        .expect("Main node");
    let strings_ref = main
        .used_types
        .iter()
        .find(|t| t.name == "Strings")
        .expect("Strings usage");
    assert_eq!(
        strings_ref.resolved.as_ref().unwrap().dotted(),
        "com.acme.util.Strings"
    );

    // `app` pulls on `util`, so `util` sits below it.
    let arena = &result.arena;
    let util_class = arena
        .leaf_for_path(&NodePath::parse("com.acme.util.Strings").unwrap())
        .expect("Strings leaf");
    let app_class = arena
        .leaf_for_path(&NodePath::parse("com.acme.app.Main").unwrap())
        .expect("Main leaf");
    let util_container = arena.node(arena.node(util_class).parent.unwrap());
    let app_container = arena.node(arena.node(app_class).parent.unwrap());
    assert_eq!(util_container.level, Some(0));
    assert_eq!(app_container.level, Some(1));

    assert!(result.feedback.is_empty());
    assert!(result.violations.is_empty());

    for node in arena.nodes() {
        assert!(node.level.is_some(), "unleveled graph node {}", node.id);
    }
}

#[test]
fn formatters_render_the_result() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "store/cache.go",
        r#"
package store

type Cache struct {
	limit int
}
"#,
    );

    let result = ProjectAnalyzer::new()
        .analyze(root, &[Language::Go])
        .unwrap();

    let text = TextFormatter::new().format(&result);
    assert!(text.contains("Cache"));
    assert!(text.contains("Feedback edges: none"));

    let json = JsonFormatter::new().format(&result).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(value["nodes"].as_array().unwrap().len() >= 2);
    assert_eq!(value["meta"]["files"], 1);

    let out = root.join("report.txt");
    TextFormatter::new().format_to_file(&result, &out).unwrap();
    assert!(out.exists());
}
