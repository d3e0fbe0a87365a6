use anyhow::{Context, Result, bail};
use normalize::GraphData;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    #[serde(alias = "yml")]
    Yaml,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "knowledge-graph.json",
            ExportFormat::Yaml => "knowledge-graph.yaml",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Yaml => "application/yaml",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            other => bail!("Unsupported export format: {}", other),
        }
    }
}

/// Serialize a sanitized graph for download.
pub fn export_graph(graph: &GraphData, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => to_json(graph),
        ExportFormat::Yaml => to_yaml(graph),
    }
}

pub fn to_json(graph: &GraphData) -> Result<String> {
    serde_json::to_string_pretty(graph).context("Failed to serialize graph as JSON")
}

/// One block per node, then one per edge.
pub fn to_yaml(graph: &GraphData) -> Result<String> {
    serde_yaml::to_string(graph).context("Failed to serialize graph as YAML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use normalize::{GraphLink, GraphNode, NodeType};

    fn sample_graph() -> GraphData {
        GraphData {
            nodes: vec![
                GraphNode {
                    id: "1".to_string(),
                    label: "Ada Lovelace".to_string(),
                    node_type: NodeType::Person,
                    description: "Mathematician".to_string(),
                    val: Some(5.0),
                },
                GraphNode {
                    id: "2".to_string(),
                    label: "Analytical Engine".to_string(),
                    node_type: NodeType::Product,
                    description: String::new(),
                    val: None,
                },
            ],
            edges: vec![GraphLink {
                source: "1".to_string(),
                target: "2".to_string(),
                relation: "wrote programs for".to_string(),
            }],
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!(" YML ".parse::<ExportFormat>().unwrap(), ExportFormat::Yaml);
        assert!("csv".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Yaml.file_name(), "knowledge-graph.yaml");
    }

    #[test]
    fn test_json_export_is_lossless() {
        let graph = sample_graph();
        let json = export_graph(&graph, ExportFormat::Json).unwrap();

        assert!(json.contains("\"type\": \"person\""));
        let parsed: GraphData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, graph);
    }

    #[test]
    fn test_yaml_export_is_lossless() {
        let graph = sample_graph();
        let yaml = export_graph(&graph, ExportFormat::Yaml).unwrap();

        assert!(yaml.starts_with("nodes:"));
        assert!(yaml.contains("edges:"));
        assert!(yaml.contains("relation: wrote programs for"));
        let parsed: GraphData = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, graph);
    }

    #[test]
    fn test_empty_graph_exports() {
        let json = to_json(&GraphData::default()).unwrap();
        assert_eq!(json, "{\n  \"nodes\": [],\n  \"edges\": []\n}");
    }
}
