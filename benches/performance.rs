use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::PathBuf;

use stratum::core::{
    Dependency, Language, Node, NodeKind, NodePath, ProjectAnalyzer, TypeRef, TypeResolver,
    UsageKind,
};
use stratum::graph::levelizer::levelize;
use stratum::graph::GraphArena;

fn benchmark_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_analysis");

    let test_dir = std::env::temp_dir().join("stratum_bench");
    std::fs::create_dir_all(&test_dir).unwrap();

    for i in 0..10 {
        let content = format!(
            r#"
package bench;

public class Service{i} {{
    private Repository{i} repository;

    public Result{i} process(Request{i} request) {{
        return new Result{i}();
    }}
}}

class Repository{i} {{
    public Result{i} load() {{
        return new Result{i}();
    }}
}}

class Request{i} {{ }}

class Result{i} {{ }}
"#
        );
        std::fs::write(test_dir.join(format!("Service{i}.java")), content).unwrap();
    }

    for i in 0..10 {
        let content = format!(
            r#"
package cache

type Entry{i} struct {{
	key string
}}

type Store{i} struct {{
	entries []Entry{i}
}}

func (s *Store{i}) Get(key string) Entry{i} {{
	return Entry{i}{{}}
}}
"#
        );
        std::fs::write(test_dir.join(format!("store_{i}.go")), content).unwrap();
    }

    group.bench_function("small_codebase", |b| {
        b.iter(|| {
            let analyzer = ProjectAnalyzer::new();
            let result = analyzer.analyze(
                black_box(&test_dir),
                black_box(&[Language::Java, Language::Go]),
            );
            black_box(result)
        });
    });

    group.finish();
}

/// Synthetic project: `namespaces` namespaces with `per_namespace` classes
/// each, every class referring to a handful of others.
fn synthetic_nodes(namespaces: usize, per_namespace: usize) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(namespaces * per_namespace);
    for ns in 0..namespaces {
        for i in 0..per_namespace {
            let mut node = Node::new(
                NodePath::parse(&format!("ns{ns}.Type{i}")).unwrap(),
                PathBuf::from(format!("src/ns{ns}/type{i}.cs")),
                NodeKind::Class,
                Language::CSharp,
            );
            node.add_dependency(Dependency::wildcard(
                NodePath::new(format!("ns{}", (ns + 1) % namespaces)),
            ));
            for k in 0..3 {
                node.add_used_type(TypeRef::simple(
                    format!("Type{}", (i + k + 1) % per_namespace),
                    UsageKind::Usage,
                ));
            }
            nodes.push(node);
        }
    }
    nodes
}

fn benchmark_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    let nodes = synthetic_nodes(20, 50);
    group.bench_function("resolve_1000_nodes", |b| {
        b.iter(|| {
            let resolver = TypeResolver::new(black_box(&nodes));
            black_box(resolver.resolve_all(nodes.clone()))
        });
    });

    group.finish();
}

fn benchmark_levelization(c: &mut Criterion) {
    let mut group = c.benchmark_group("levelization");

    let nodes = synthetic_nodes(20, 50);
    let resolver = TypeResolver::new(&nodes);
    let resolved = resolver.resolve_all(nodes);

    group.bench_function("levelize_1000_nodes", |b| {
        b.iter(|| {
            let mut arena = GraphArena::from_nodes(black_box(&resolved));
            let feedback = levelize(&mut arena);
            black_box((arena, feedback))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_analysis,
    benchmark_resolution,
    benchmark_levelization
);
criterion_main!(benches);
