use citegraph_layout::{Graph, LayoutOptions, Link, Node, Side, layout};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Center plus `fanout` references and citations per node, `depth` levels each way. A few
/// cross links make some papers reachable along several paths.
fn build_citation_graph(fanout: usize, depth: u32) -> Graph {
    let mut nodes = vec![Node::new("C", Side::Center).with_depth(0).with_size(8.0)];
    let mut links = Vec::new();

    for (side, prefix) in [(Side::Backward, "r"), (Side::Forward, "f")] {
        let mut frontier = vec!["C".to_string()];
        for level in 1..=depth {
            let mut next = Vec::new();
            for (p, parent) in frontier.iter().enumerate() {
                for k in 0..fanout {
                    let id = format!("{prefix}{level}_{p}_{k}");
                    nodes.push(
                        Node::new(id.clone(), side)
                            .with_depth(level)
                            .with_cited_by_count(((p * 31 + k * 17) % 97) as u64)
                            .with_size(((p + k) % 9) as f64),
                    );
                    links.push(match side {
                        Side::Backward => Link::references(parent.clone(), id.clone()),
                        _ => Link::cited_by(parent.clone(), id.clone()),
                    });
                    next.push(id);
                }
            }
            // Cross link from the first node of this level to the last one.
            if let Some((first, last)) = next.first().zip(next.last()).filter(|(f, l)| f != l) {
                links.push(match side {
                    Side::Backward => Link::references(first.clone(), last.clone()),
                    _ => Link::cited_by(first.clone(), last.clone()),
                });
            }
            frontier = next;
        }
    }

    Graph::new(nodes, links)
}

fn bench_layout_stress(c: &mut Criterion) {
    let opts = LayoutOptions::default();
    let mut group = c.benchmark_group("layout_stress");
    group.sample_size(20);

    for (fanout, depth) in [(8usize, 1u32), (6, 2), (4, 3)] {
        let g = build_citation_graph(fanout, depth);
        group.bench_with_input(
            BenchmarkId::new("fanout_depth", format!("{fanout}x{depth}_n{}", g.nodes.len())),
            &g,
            |b, g| b.iter(|| black_box(layout(black_box(g), Some("C"), &opts))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_layout_stress);
criterion_main!(benches);
