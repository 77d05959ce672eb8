pub mod bundling;
pub mod clock;
pub mod error;
pub mod graph;
pub mod routing;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use bundling::{BundlingSettingsUpdate, EdgeBundlingCalculator, bundle_stats};
use graph::{EdgeRecord, GraphInput, NodeRecord};
use routing::{CalculatorConfig, EdgeCalculator, GridConfig, PathQuality, RouteOptions};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn parse_json<'a, T: serde::Deserialize<'a>>(source: &'a str) -> Result<T, String> {
    serde_json::from_str(source).map_err(|e| error::RouterError::from(e).to_string())
}

/// Route every edge of a graph snapshot and return the routes as JSON
#[wasm_bindgen(js_name = "routeGraph")]
pub fn route_graph(graph_json: &str, quality: Option<String>) -> Result<String, String> {
    let graph = GraphInput::from_json(graph_json).map_err(|e| e.to_string())?;
    let quality = match quality.as_deref() {
        Some(name) => PathQuality::parse(name).map_err(|e| e.to_string())?,
        None => PathQuality::default(),
    };

    let mut calculator = EdgeCalculator::default();
    calculator.set_nodes(&graph.nodes);
    to_json(&calculator.route_all(&graph, quality))
}

/// Compute edge bundles for a graph snapshot
#[wasm_bindgen(js_name = "bundleGraph")]
pub fn bundle_graph(graph_json: &str, settings_json: Option<String>) -> Result<String, String> {
    let graph = GraphInput::from_json(graph_json).map_err(|e| e.to_string())?;
    let mut calculator = EdgeBundlingCalculator::default();
    if let Some(settings) = settings_json.as_deref() {
        calculator.update_settings(&parse_json::<BundlingSettingsUpdate>(settings)?);
    }
    to_json(&calculator.calculate_bundles(&graph.edges, &graph.nodes))
}

/// Routing service for one editing session.
///
/// Create it when the canvas opens and call `dispose` on teardown so pending
/// updates are dropped.
#[wasm_bindgen]
pub struct EdgeRouter {
    calculator: EdgeCalculator,
    options: RouteOptions,
}

#[wasm_bindgen]
impl EdgeRouter {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_width: f64, canvas_height: f64, cell_size: f64) -> EdgeRouter {
        let config = CalculatorConfig {
            grid: GridConfig::for_canvas(canvas_width, canvas_height, cell_size),
            ..CalculatorConfig::default()
        };
        EdgeRouter {
            calculator: EdgeCalculator::new(config),
            options: RouteOptions::default(),
        }
    }

    /// Replace every obstacle immediately
    #[wasm_bindgen(js_name = "setNodes")]
    pub fn set_nodes(&mut self, nodes_json: &str) -> Result<(), String> {
        let nodes: Vec<NodeRecord> = parse_json(nodes_json)?;
        self.calculator.set_nodes(&nodes);
        Ok(())
    }

    /// Queue moved nodes for a debounced rebuild
    #[wasm_bindgen(js_name = "updateNodesBatch")]
    pub fn update_nodes_batch(&mut self, nodes_json: &str) -> Result<(), String> {
        let nodes: Vec<NodeRecord> = parse_json(nodes_json)?;
        self.calculator.update_nodes_batch(&nodes);
        Ok(())
    }

    /// Apply pending updates whose delay has elapsed. Call from a timer.
    pub fn tick(&mut self) -> bool {
        self.calculator.poll_updates()
    }

    pub fn flush(&mut self) -> bool {
        self.calculator.flush_updates()
    }

    #[wasm_bindgen(js_name = "removeNode")]
    pub fn remove_node(&mut self, node_id: &str) {
        self.calculator.remove_node(node_id);
    }

    #[wasm_bindgen(js_name = "setPathQuality")]
    pub fn set_path_quality(&mut self, quality: &str) -> Result<(), String> {
        let quality = PathQuality::parse(quality).map_err(|e| e.to_string())?;
        if quality != self.options.quality {
            self.options.quality = quality;
            self.calculator.clear_cache();
        }
        Ok(())
    }

    #[wasm_bindgen(js_name = "pathQuality")]
    pub fn path_quality(&self) -> String {
        self.options.quality.as_str().to_string()
    }

    #[wasm_bindgen(js_name = "calculatePath")]
    pub fn calculate_path(&mut self, source_json: &str, target_json: &str) -> Result<String, String> {
        let source: NodeRecord = parse_json(source_json)?;
        let target: NodeRecord = parse_json(target_json)?;
        to_json(&self.calculator.calculate_path(&source, &target, self.options.quality))
    }

    #[wasm_bindgen(js_name = "routeEdges")]
    pub fn route_edges(&mut self, edges_json: &str, nodes_json: &str) -> Result<String, String> {
        let graph = GraphInput {
            nodes: parse_json(nodes_json)?,
            edges: parse_json::<Vec<EdgeRecord>>(edges_json)?,
        };
        to_json(&self.calculator.route_all(&graph, self.options.quality))
    }

    #[wasm_bindgen(js_name = "getCacheStats")]
    pub fn cache_stats(&self) -> Result<String, String> {
        to_json(&self.calculator.cache_stats())
    }

    #[wasm_bindgen(js_name = "clearCache")]
    pub fn clear_cache(&mut self) {
        self.calculator.clear_cache();
    }

    #[wasm_bindgen(js_name = "invalidateNode")]
    pub fn invalidate_node(&mut self, node_id: &str) -> u32 {
        self.calculator.invalidate_node(node_id) as u32
    }

    pub fn dispose(&mut self) {
        self.calculator.dispose();
    }
}

/// Bundling service for one editing session.
#[wasm_bindgen]
#[derive(Default)]
pub struct EdgeBundler {
    calculator: EdgeBundlingCalculator,
}

#[wasm_bindgen]
impl EdgeBundler {
    #[wasm_bindgen(constructor)]
    pub fn new() -> EdgeBundler {
        EdgeBundler::default()
    }

    #[wasm_bindgen(js_name = "calculateBundles")]
    pub fn calculate_bundles(&self, edges_json: &str, nodes_json: &str) -> Result<String, String> {
        let edges: Vec<EdgeRecord> = parse_json(edges_json)?;
        let nodes: Vec<NodeRecord> = parse_json(nodes_json)?;
        to_json(&self.calculator.calculate_bundles(&edges, &nodes))
    }

    #[wasm_bindgen(js_name = "updateSettings")]
    pub fn update_settings(&mut self, settings_json: &str) -> Result<(), String> {
        let update: BundlingSettingsUpdate = parse_json(settings_json)?;
        self.calculator.update_settings(&update);
        Ok(())
    }

    #[wasm_bindgen(js_name = "getSettings")]
    pub fn settings(&self) -> Result<String, String> {
        to_json(self.calculator.settings())
    }

    #[wasm_bindgen(js_name = "getBundleStats")]
    pub fn bundle_stats(&self, edges_json: &str, nodes_json: &str) -> Result<String, String> {
        let edges: Vec<EdgeRecord> = parse_json(edges_json)?;
        let nodes: Vec<NodeRecord> = parse_json(nodes_json)?;
        to_json(&bundle_stats(&self.calculator.calculate_bundles(&edges, &nodes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPH: &str = r#"{
        "nodes": [
            {"id": "a", "x": 100, "y": 100, "type": "standard"},
            {"id": "b", "x": 800, "y": 300, "type": "standard"},
            {"id": "c", "x": 450, "y": 120, "type": "conditional"}
        ],
        "edges": [
            {"id": "e1", "source": "a", "target": "b"},
            {"id": "e2", "source": "a", "target": "b"}
        ]
    }"#;

    #[test]
    fn test_route_graph() {
        let json = route_graph(GRAPH, Some("smooth".into())).unwrap();
        let routes: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(routes.as_array().unwrap().len(), 2);
        assert_eq!(routes[0]["edgeId"], "e1");
        assert_eq!(routes[0]["found"], true);
        assert_eq!(routes[1]["debug"]["cached"], true);
    }

    #[test]
    fn test_route_graph_rejects_bad_input() {
        assert!(route_graph("not json", None).is_err());
        let err = route_graph(GRAPH, Some("ultra".into())).unwrap_err();
        assert_eq!(err, "Unknown path quality: ultra");
    }

    #[test]
    fn test_bundle_graph() {
        let json = bundle_graph(GRAPH, Some(r#"{"minEdgesForBundle": 2}"#.into())).unwrap();
        let bundles: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(bundles[0]["edges"].as_array().unwrap().len(), 2);
        assert_eq!(bundles[0]["controlPoints"].as_array().unwrap().len(), 3);

        let none = bundle_graph(GRAPH, None).unwrap();
        assert_eq!(none, "[]");
    }

    #[test]
    fn test_router_session() {
        let mut router = EdgeRouter::new(3000.0, 3000.0, 20.0);
        router
            .set_nodes(r#"[{"id": "a", "x": 100, "y": 100}, {"id": "b", "x": 800, "y": 300}]"#)
            .unwrap();

        let a = r#"{"id": "a", "x": 100, "y": 100}"#;
        let b = r#"{"id": "b", "x": 800, "y": 300}"#;
        router.calculate_path(a, b).unwrap();
        let cached: serde_json::Value = serde_json::from_str(&router.calculate_path(a, b).unwrap()).unwrap();
        assert_eq!(cached["debug"]["cached"], true);

        router.set_path_quality("balanced").unwrap();
        let stats: serde_json::Value = serde_json::from_str(&router.cache_stats().unwrap()).unwrap();
        assert_eq!(stats["entries"], 1);

        router.set_path_quality("fast").unwrap();
        assert_eq!(router.path_quality(), "fast");
        let stats: serde_json::Value = serde_json::from_str(&router.cache_stats().unwrap()).unwrap();
        assert_eq!(stats["entries"], 0);

        router.update_nodes_batch(r#"[{"id": "b", "x": 800, "y": 600}]"#).unwrap();
        assert!(router.flush());
        assert!(!router.tick());
        assert!(router.set_path_quality("ultra").is_err());
        router.dispose();
    }

    #[test]
    fn test_bundler_session() {
        let mut bundler = EdgeBundler::new();
        let graph = GraphInput::from_json(GRAPH).unwrap();
        let edges = serde_json::to_string(&graph.edges).unwrap();
        let nodes = serde_json::to_string(&graph.nodes).unwrap();

        assert_eq!(bundler.calculate_bundles(&edges, &nodes).unwrap(), "[]");
        bundler.update_settings(r#"{"minEdgesForBundle": 2}"#).unwrap();

        let stats: serde_json::Value = serde_json::from_str(&bundler.bundle_stats(&edges, &nodes).unwrap()).unwrap();
        assert_eq!(stats["totalBundles"], 1);
        assert_eq!(stats["bundledEdges"], 2);

        let settings: serde_json::Value = serde_json::from_str(&bundler.settings().unwrap()).unwrap();
        assert_eq!(settings["minEdgesForBundle"], 2);
    }
}
