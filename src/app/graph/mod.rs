mod build;
mod interaction;
mod view;

use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};
use indexmap::IndexMap;

use crate::catalog::Entity;
use crate::encoding::VisualEncoding;

pub use build::{BuildConfig, EdgeIdPolicy, SizePolicy, build_graph};

const SEED_SPACING: f32 = 10.0;

/// Mutable layout state carried by every node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Body {
    /// The `ordinal`-th point of a phyllotaxis spiral around the origin, at rest.
    pub fn seeded(ordinal: usize) -> Self {
        let radius = SEED_SPACING * (0.5 + ordinal as f32).sqrt();
        let angle = ordinal as f32 * PI * (3.0 - 5.0_f32.sqrt());
        Self {
            position: vec2(radius * angle.cos(), radius * angle.sin()),
            velocity: Vec2::ZERO,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EntityNode {
    pub entity: Entity,
    pub encoding: VisualEncoding,
    pub body: Body,
}

impl EntityNode {
    pub fn title(&self) -> &str {
        &self.entity.title
    }
}

#[derive(Clone, Debug)]
pub struct CategoryNode {
    pub label: String,
    /// Memberships counted by the build that produced the graph.
    pub size: usize,
    pub body: Body,
}

/// Category → entity membership. Endpoints are positions in the graph's
/// category and entity orders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub id: String,
    pub category: usize,
    pub entity: usize,
}

#[derive(Clone, Copy, Debug)]
pub enum GraphNode<'a> {
    Entity(&'a EntityNode),
    Category(&'a CategoryNode),
}

impl<'a> GraphNode<'a> {
    pub fn body(self) -> &'a Body {
        match self {
            Self::Entity(node) => &node.body,
            Self::Category(node) => &node.body,
        }
    }
}

/// Bipartite flower/category graph. Nodes are addressed either by identity
/// (title, label) or by a flat index: entity nodes first, then categories.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    entities: IndexMap<String, EntityNode>,
    categories: IndexMap<String, CategoryNode>,
    edges: Vec<Edge>,
}

impl Graph {
    #[cfg(test)]
    pub fn entity(&self, title: &str) -> Option<&EntityNode> {
        self.entities.get(title)
    }

    #[cfg(test)]
    pub fn category(&self, label: &str) -> Option<&CategoryNode> {
        self.categories.get(label)
    }

    pub fn entity_nodes(&self) -> impl Iterator<Item = &EntityNode> {
        self.entities.values()
    }

    pub fn category_nodes(&self) -> impl Iterator<Item = &CategoryNode> {
        self.categories.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn node_count(&self) -> usize {
        self.entities.len() + self.categories.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = GraphNode<'_>> {
        self.entities
            .values()
            .map(GraphNode::Entity)
            .chain(self.categories.values().map(GraphNode::Category))
    }

    pub fn node(&self, index: usize) -> Option<GraphNode<'_>> {
        match index.checked_sub(self.entities.len()) {
            None => self
                .entities
                .get_index(index)
                .map(|(_, node)| GraphNode::Entity(node)),
            Some(offset) => self
                .categories
                .get_index(offset)
                .map(|(_, node)| GraphNode::Category(node)),
        }
    }

    /// Flat `(source, target)` indices of an edge.
    pub fn endpoints(&self, edge: &Edge) -> (usize, usize) {
        (self.entities.len() + edge.category, edge.entity)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.nodes().map(GraphNode::body)
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.entities
            .values_mut()
            .map(|node| &mut node.body)
            .chain(self.categories.values_mut().map(|node| &mut node.body))
    }
}
