//! In-memory link graph and node-link snapshots
//!
//! Each profile crawler accumulates a directed graph of page -> outbound
//! link relationships, including synthetic `ERROR <message>` nodes for
//! failed fetches, and serializes it once at the end of the crawl.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Directed graph keyed by URL, write-only during a crawl
#[derive(Debug, Default)]
pub struct LinkGraph {
    /// Node id -> optional title
    nodes: HashMap<String, Option<String>>,

    /// (source, target) pairs, duplicates collapsed
    edges: HashSet<(String, String)>,
}

/// One node of the serialized node-link document
#[derive(Debug, Serialize)]
struct GraphNode<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// One edge of the serialized node-link document
#[derive(Debug, Serialize)]
struct GraphEdge<'a> {
    source: &'a str,
    target: &'a str,
}

#[derive(Debug, Serialize)]
struct NodeLinkDocument<'a> {
    nodes: Vec<GraphNode<'a>>,
    edges: Vec<GraphEdge<'a>>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts a page node, setting or overwriting its title
    pub fn add_page(&mut self, url: &str, title: &str) {
        self.nodes
            .insert(url.to_string(), Some(title.to_string()));
    }

    /// Adds one edge per link; missing endpoint nodes are created untitled
    pub fn add_edges<'a>(&mut self, url: &str, links: impl IntoIterator<Item = &'a String>) {
        self.nodes.entry(url.to_string()).or_insert(None);
        for link in links {
            self.nodes.entry(link.clone()).or_insert(None);
            self.edges.insert((url.to_string(), link.clone()));
        }
    }

    /// Adds a synthetic error node with a single inbound edge from `url`
    pub fn add_error(&mut self, url: &str, error_label: &str) {
        let node = format!("ERROR {}", error_label);
        self.nodes.entry(url.to_string()).or_insert(None);
        self.nodes.entry(node.clone()).or_insert(None);
        self.edges.insert((url.to_string(), node));
    }

    /// Returns the title recorded for a node, if any
    pub fn title(&self, url: &str) -> Option<&str> {
        self.nodes.get(url).and_then(|t| t.as_deref())
    }

    pub fn contains_node(&self, url: &str) -> bool {
        self.nodes.contains_key(url)
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .contains(&(source.to_string(), target.to_string()))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Serializes the graph as a node-link JSON document
    ///
    /// A failed snapshot is logged and swallowed; it must not fail the
    /// crawl.
    pub fn snapshot(&self, dest: &Path) {
        match self.to_json() {
            Ok(json) => {
                if let Err(e) = std::fs::write(dest, json) {
                    tracing::error!("Failed to store graph at {:?}: {}", dest, e);
                } else {
                    tracing::info!("Saved graph ({} edges) to {:?}", self.edges.len(), dest);
                }
            }
            Err(e) => tracing::error!("Failed to serialize graph for {:?}: {}", dest, e),
        }
    }

    fn to_json(&self) -> serde_json::Result<String> {
        // Sorted output keeps snapshots byte-stable across runs with the
        // same crawl result.
        let mut nodes: Vec<GraphNode> = self
            .nodes
            .iter()
            .map(|(id, title)| GraphNode {
                id,
                description: title.as_deref(),
            })
            .collect();
        nodes.sort_by_key(|n| n.id);

        let mut edges: Vec<GraphEdge> = self
            .edges
            .iter()
            .map(|(source, target)| GraphEdge { source, target })
            .collect();
        edges.sort_by_key(|e| (e.source, e.target));

        serde_json::to_string(&NodeLinkDocument { nodes, edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_page_sets_title() {
        let mut graph = LinkGraph::new();
        graph.add_page("https://a/", "Home");
        assert_eq!(graph.title("https://a/"), Some("Home"));
    }

    #[test]
    fn test_add_page_overwrites_title() {
        let mut graph = LinkGraph::new();
        graph.add_page("https://a/", "Old");
        graph.add_page("https://a/", "New");
        assert_eq!(graph.title("https://a/"), Some("New"));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_add_edges_creates_endpoints() {
        let mut graph = LinkGraph::new();
        let links = vec!["https://b/".to_string(), "https://c/".to_string()];
        graph.add_edges("https://a/", &links);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.contains_edge("https://a/", "https://b/"));
        assert!(graph.contains_edge("https://a/", "https://c/"));
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut graph = LinkGraph::new();
        let links = vec!["https://b/".to_string()];
        graph.add_edges("https://a/", &links);
        graph.add_edges("https://a/", &links);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_add_edges_keeps_existing_title() {
        let mut graph = LinkGraph::new();
        graph.add_page("https://a/", "Home");
        graph.add_edges("https://a/", &vec!["https://b/".to_string()]);
        assert_eq!(graph.title("https://a/"), Some("Home"));
    }

    #[test]
    fn test_add_error() {
        let mut graph = LinkGraph::new();
        graph.add_error("https://a/", "connection refused");

        assert!(graph.contains_node("ERROR connection refused"));
        assert!(graph.contains_edge("https://a/", "ERROR connection refused"));
        assert_eq!(graph.title("ERROR connection refused"), None);
    }

    #[test]
    fn test_snapshot_node_link_form() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("graph.json");

        let mut graph = LinkGraph::new();
        graph.add_page("https://a/", "Home");
        graph.add_edges("https://a/", &vec!["https://b/".to_string()]);
        graph.snapshot(&dest);

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&dest).unwrap()).unwrap();

        let nodes = doc["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["id"], "https://a/");
        assert_eq!(nodes[0]["description"], "Home");
        // Untitled nodes omit the description field entirely.
        assert!(nodes[1].get("description").is_none());

        let edges = doc["edges"].as_array().unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0]["source"], "https://a/");
        assert_eq!(edges[0]["target"], "https://b/");
    }

    #[test]
    fn test_snapshot_failure_is_swallowed() {
        let mut graph = LinkGraph::new();
        graph.add_page("https://a/", "Home");
        // Destination directory does not exist; snapshot must not panic.
        graph.snapshot(Path::new("/nonexistent/dir/graph.json"));
    }
}
