use crate::schema::NodeType;

pub fn build_graph_prompt(query: &str) -> String {
    let node_types = NodeType::ALL
        .iter()
        .map(NodeType::as_str)
        .collect::<Vec<_>>()
        .join("|");

    format!(
        r#"Research the following topic using web search and explain it as a knowledge graph.

INSTRUCTIONS:
1. Start with a concise prose summary of the topic (2-4 paragraphs), grounded in your search results
2. After the summary, output exactly one ```json fenced block containing the graph
3. Put nothing after the closing fence

SCHEMA:
{{
  "nodes": [
    {{"id": "1", "label": "Short Name", "type": "{node_types}", "description": "one sentence", "val": 1}}
  ],
  "edges": [
    {{"source": "1", "target": "2", "relation": "short verb phrase"}}
  ]
}}

RULES:
- Every id must be unique
- Every edge source and target must be the id of a node in "nodes"
- "val" is the node's importance from 1 to 10
- Extract 8-25 nodes and connect every node to at least one other node

TOPIC:
{query}"#
    )
}
