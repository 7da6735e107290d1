use meshscan_core::graph::DependencyGraph;
use meshscan_core::types::Cycle;

/// Generate a GraphViz DOT diagram of the service graph.
///
/// Edges that lie on any reported cycle are drawn red and dashed; services on
/// a cycle get a red outline.
pub fn generate_service_diagram(graph: &DependencyGraph, cycles: &[Cycle]) -> String {
    let mut out = String::new();
    out.push_str("digraph services {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=box, style=filled, fillcolor=white];\n\n");

    for name in graph.service_names() {
        let id = sanitize_dot_id(name.as_str());
        let on_cycle = cycles.iter().any(|c| c.services().contains(name));
        if on_cycle {
            out.push_str(&format!(
                "  {id} [label=\"{}\", color=red, penwidth=2];\n",
                escape_label(name.as_str())
            ));
        } else {
            out.push_str(&format!(
                "  {id} [label=\"{}\"];\n",
                escape_label(name.as_str())
            ));
        }
    }
    out.push('\n');

    for (from, to) in graph.edges() {
        let from_id = sanitize_dot_id(from.as_str());
        let to_id = sanitize_dot_id(to.as_str());
        let on_cycle = cycles
            .iter()
            .any(|c| c.contains_edge(from.as_str(), to.as_str()));
        if on_cycle {
            out.push_str(&format!(
                "  {from_id} -> {to_id} [color=red, style=dashed, label=\"cycle\"];\n"
            ));
        } else {
            out.push_str(&format!("  {from_id} -> {to_id};\n"));
        }
    }

    out.push_str("}\n");
    out
}

/// Quote a service name as a DOT identifier.
fn sanitize_dot_id(name: &str) -> String {
    format!("\"{}\"", escape_label(name))
}

fn escape_label(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
