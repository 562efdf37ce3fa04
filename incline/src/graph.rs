//! Path network graph.
//!
//! A directed multigraph stored as two arenas. Edges keep their
//! GeoJSON properties, in file order, next to a typed geometry and
//! incline.

use crate::{InclineError, C};
use geo::geometry::{LineString, Point};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue};
use log::{debug, warn};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

const NODE_ID: &str = "_id";
const EDGE_U: &str = "_u_id";
const EDGE_V: &str = "_v_id";
const INCLINE: &str = "incline";
const IS_POINT: &str = "is_point";

/// Edge properties never written back out.
const EDGE_DROPPED: [&str; 2] = ["osm_id", "segment"];

/// Node properties never written back out.
const NODE_DROPPED: [&str; 3] = ["osm_id", "lon", "lat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIndex(usize);

impl EdgeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub geometry: Option<Point<C>>,
    pub properties: JsonObject,
}

impl Node {
    /// Standalone points travel in the nodes file but are written to
    /// their own collection.
    pub fn is_point(&self) -> bool {
        self.properties.contains_key(IS_POINT)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub u: NodeIndex,
    pub v: NodeIndex,

    /// Distinguishes parallel edges between the same `u` and `v`.
    pub key: usize,

    pub geometry: Option<LineString<C>>,

    /// Rise over run between the first and last vertices.
    pub incline: Option<C>,

    pub properties: JsonObject,
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_ids: HashMap<String, NodeIndex>,
    parallel: HashMap<(NodeIndex, NodeIndex), usize>,

    /// Top-level members of the source collections other than
    /// `type` and `features`.
    node_members: Option<JsonObject>,
    edge_members: Option<JsonObject>,
}

/// Serialized form of a [Graph].
#[derive(Debug, Clone)]
pub struct GraphCollections {
    pub nodes: FeatureCollection,
    pub edges: FeatureCollection,
    pub points: FeatureCollection,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a graph from node and edge GeoJSON files.
    pub fn from_geojson<P: AsRef<Path>, Q: AsRef<Path>>(
        nodes_path: P,
        edges_path: Q,
    ) -> Result<Self, InclineError> {
        let nodes = read_collection(nodes_path.as_ref())?;
        let edges = read_collection(edges_path.as_ref())?;
        Self::from_collections(nodes, edges)
    }

    pub fn from_collections(
        nodes: FeatureCollection,
        edges: FeatureCollection,
    ) -> Result<Self, InclineError> {
        let mut graph = Self {
            node_members: nodes.foreign_members,
            edge_members: edges.foreign_members,
            ..Self::default()
        };

        for (n, feature) in nodes.features.into_iter().enumerate() {
            let mut properties = feature.properties.unwrap_or_default();
            let id = properties
                .shift_remove(NODE_ID)
                .ok_or_else(|| missing_member("node", n, NODE_ID))
                .and_then(|id| id_string(&id, "node", n))?;
            let geometry = feature.geometry.and_then(|g| point(g, &id));
            graph.add_node(id, geometry, properties);
        }

        for (n, feature) in edges.features.into_iter().enumerate() {
            let mut properties = feature.properties.unwrap_or_default();
            let mut endpoint = |name: &str| {
                properties
                    .shift_remove(name)
                    .ok_or_else(|| missing_member("edge", n, name))
                    .and_then(|id| id_string(&id, "edge", n))
            };
            let u = endpoint(EDGE_U)?;
            let v = endpoint(EDGE_V)?;
            let geometry = feature.geometry.and_then(|g| line_string(g, n));
            // The key stays in place so output keeps the input property order.
            let incline = properties.get(INCLINE).and_then(JsonValue::as_f64);
            let idx = graph.add_edge(&u, &v, geometry, properties);
            graph.edges[idx.0].incline = incline;
        }

        debug!(
            "loaded graph; nodes: {}, edges: {}",
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(graph)
    }

    /// Inserts a node, replacing the geometry and properties of any
    /// existing node with the same `id`.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        geometry: Option<Point<C>>,
        properties: JsonObject,
    ) -> NodeIndex {
        let id = id.into();
        if let Some(&idx) = self.node_ids.get(&id) {
            let node = &mut self.nodes[idx.0];
            node.geometry = geometry;
            node.properties = properties;
            return idx;
        }
        let idx = NodeIndex(self.nodes.len());
        self.node_ids.insert(id.clone(), idx);
        self.nodes.push(Node {
            id,
            geometry,
            properties,
        });
        idx
    }

    /// Inserts an edge from `u` to `v`, creating bare nodes for
    /// unknown endpoints.
    pub fn add_edge(
        &mut self,
        u: &str,
        v: &str,
        geometry: Option<LineString<C>>,
        properties: JsonObject,
    ) -> EdgeIndex {
        let u = self.node_or_insert(u);
        let v = self.node_or_insert(v);
        let count = self.parallel.entry((u, v)).or_default();
        let key = *count;
        *count += 1;
        let idx = EdgeIndex(self.edges.len());
        self.edges.push(Edge {
            u,
            v,
            key,
            geometry,
            incline: None,
            properties,
        });
        idx
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn find_node(&self, id: &str) -> Option<NodeIndex> {
        self.node_ids.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.0]
    }

    pub fn edge(&self, idx: EdgeIndex) -> &Edge {
        &self.edges[idx.0]
    }

    pub fn edge_mut(&mut self, idx: EdgeIndex) -> &mut Edge {
        &mut self.edges[idx.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIndex(i), n))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, &Edge)> {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeIndex(i), e))
    }

    /// Builds the output feature collections.
    pub fn to_collections(&self) -> GraphCollections {
        let edges = self
            .edges
            .iter()
            .map(|edge| {
                let mut properties = edge.properties.clone();
                for key in EDGE_DROPPED {
                    properties.shift_remove(key);
                }
                match edge.incline {
                    Some(incline) => {
                        properties.insert(INCLINE.to_owned(), JsonValue::from(incline));
                    }
                    None if properties.get(INCLINE).map_or(false, JsonValue::is_number) => {
                        properties.shift_remove(INCLINE);
                    }
                    None => (),
                }
                properties.insert(EDGE_U.to_owned(), self.node(edge.u).id.clone().into());
                properties.insert(EDGE_V.to_owned(), self.node(edge.v).id.clone().into());
                feature(
                    edge.geometry.as_ref().map(|g| Geometry::new(g.into())),
                    properties,
                )
            })
            .collect();

        let (mut nodes, mut points) = (Vec::new(), Vec::new());
        for node in &self.nodes {
            let Some(geometry) = node.geometry.as_ref() else {
                warn!("node {} has no geometry, not writing it", node.id);
                continue;
            };
            let mut properties = node.properties.clone();
            for key in NODE_DROPPED {
                properties.shift_remove(key);
            }
            let is_point = properties.shift_remove(IS_POINT).is_some();
            properties.insert(NODE_ID.to_owned(), node.id.clone().into());
            let feature = feature(Some(Geometry::new(geometry.into())), properties);
            if is_point {
                points.push(feature);
            } else {
                nodes.push(feature);
            }
        }

        GraphCollections {
            nodes: collection(nodes, self.node_members.clone()),
            edges: collection(edges, self.edge_members.clone()),
            points: collection(points, None),
        }
    }

    /// Writes nodes and edges, and points when `points_path` is given.
    pub fn to_geojson<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        nodes_path: P,
        edges_path: Q,
        points_path: Option<&Path>,
    ) -> Result<(), InclineError> {
        let GraphCollections {
            nodes,
            edges,
            points,
        } = self.to_collections();
        write_collection(edges_path.as_ref(), &edges)?;
        write_collection(nodes_path.as_ref(), &nodes)?;
        if let Some(points_path) = points_path {
            write_collection(points_path, &points)?;
        } else if !points.features.is_empty() {
            debug!("dropping {} point features", points.features.len());
        }
        Ok(())
    }
}

/// Private API
impl Graph {
    fn node_or_insert(&mut self, id: &str) -> NodeIndex {
        match self.node_ids.get(id) {
            Some(&idx) => idx,
            None => self.add_node(id, None, JsonObject::new()),
        }
    }
}

fn read_collection(path: &Path) -> Result<FeatureCollection, InclineError> {
    debug!("reading {path:?}");
    let rdr = BufReader::new(File::open(path)?);
    let geojson = GeoJson::from_reader(rdr)?;
    Ok(FeatureCollection::try_from(geojson)?)
}

fn write_collection(path: &Path, collection: &FeatureCollection) -> Result<(), InclineError> {
    debug!("writing {} features to {path:?}", collection.features.len());
    let mut wtr = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut wtr, collection)?;
    wtr.flush()?;
    Ok(())
}

fn feature(geometry: Option<Geometry>, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>, foreign_members: Option<JsonObject>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    }
}

fn missing_member(kind: &str, n: usize, member: &str) -> InclineError {
    InclineError::Graph(format!("{kind} feature {n} has no {member:?} property"))
}

/// Identifiers may be written as strings or numbers.
fn id_string(value: &JsonValue, kind: &str, n: usize) -> Result<String, InclineError> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(num) => Ok(num.to_string()),
        other => Err(InclineError::Graph(format!(
            "{kind} feature {n} has non-scalar identifier {other}"
        ))),
    }
}

fn point(geometry: Geometry, id: &str) -> Option<Point<C>> {
    match Point::try_from(geometry.value) {
        Ok(point) => Some(point),
        Err(e) => {
            debug!("node {id}: ignoring geometry, {e}");
            None
        }
    }
}

fn line_string(geometry: Geometry, n: usize) -> Option<LineString<C>> {
    match LineString::try_from(geometry.value) {
        Ok(line) if line.0.is_empty() => {
            debug!("edge feature {n}: ignoring empty geometry");
            None
        }
        Ok(line) => Some(line),
        Err(e) => {
            debug!("edge feature {n}: ignoring geometry, {e}");
            None
        }
    }
}
