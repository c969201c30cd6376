use std::collections::{HashMap, HashSet};

use clap::ValueEnum;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::catalog::Entity;
use crate::encoding::VisualEncoding;

use super::{Body, CategoryNode, Edge, EntityNode, Graph};

/// How a category reused from the previous graph counts its members.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SizePolicy {
    /// Count only this build's memberships.
    #[default]
    Reset,
    /// Keep adding onto the previous build's count.
    Accumulate,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum EdgeIdPolicy {
    /// Derived from the category label and entity title.
    #[default]
    Stable,
    /// Derived from the category label and the entity's position in the build.
    Positional,
}

impl EdgeIdPolicy {
    fn edge_id(self, label: &str, title: &str, index: usize) -> String {
        match self {
            Self::Stable => format!("{label}→{title}"),
            Self::Positional => format!("{label}-movie{index}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildConfig {
    pub size_policy: SizePolicy,
    pub edge_ids: EdgeIdPolicy,
}

/// Builds the flower/category graph for `entities`, moving every node whose
/// identity already exists in `prev` into the new graph untouched so its
/// position and velocity survive the rebuild.
pub fn build_graph(
    prev: Option<Graph>,
    entities: &[Entity],
    encodings: &HashMap<String, VisualEncoding>,
    config: BuildConfig,
) -> Graph {
    let (mut prior_entities, mut prior_categories) = match prev {
        Some(graph) => (graph.entities, graph.categories),
        None => (IndexMap::new(), IndexMap::new()),
    };
    let prior_count = prior_entities.len() + prior_categories.len();

    let mut entity_nodes: IndexMap<String, EntityNode> = IndexMap::with_capacity(entities.len());
    let mut category_nodes: IndexMap<String, CategoryNode> = IndexMap::new();
    let mut edges = Vec::new();
    let mut seeded = 0usize;
    let mut reused = 0usize;

    for (index, entity) in entities.iter().enumerate() {
        let entity_index = match entity_nodes.get_index_of(&entity.title) {
            Some(existing) => existing,
            None => {
                let node = match prior_entities.swap_remove(&entity.title) {
                    Some(node) => {
                        reused += 1;
                        node
                    }
                    None => {
                        let encoding = encodings.get(&entity.title).copied().unwrap_or_else(|| {
                            warn!(title = %entity.title, "no visual encoding, using fallback");
                            VisualEncoding::fallback()
                        });
                        seeded += 1;
                        EntityNode {
                            entity: entity.clone(),
                            encoding,
                            body: Body::seeded(seeded - 1),
                        }
                    }
                };
                entity_nodes.insert_full(entity.title.clone(), node).0
            }
        };

        for label in &entity.categories {
            let category_index = match category_nodes.get_index_of(label) {
                Some(existing) => existing,
                None => {
                    let node = match prior_categories.swap_remove(label) {
                        Some(mut node) => {
                            reused += 1;
                            if config.size_policy == SizePolicy::Reset {
                                node.size = 0;
                            }
                            node
                        }
                        None => {
                            seeded += 1;
                            CategoryNode {
                                label: label.clone(),
                                size: 0,
                                body: Body::seeded(seeded - 1),
                            }
                        }
                    };
                    category_nodes.insert_full(label.clone(), node).0
                }
            };

            if let Some((_, node)) = category_nodes.get_index_mut(category_index) {
                node.size += 1;
            }

            edges.push(Edge {
                id: config.edge_ids.edge_id(label, &entity.title, index),
                category: category_index,
                entity: entity_index,
            });
        }
    }

    debug!(
        entities = entity_nodes.len(),
        categories = category_nodes.len(),
        edges = edges.len(),
        distinct_edge_ids = edges.iter().map(|edge| edge.id.as_str()).collect::<HashSet<_>>().len(),
        reused,
        seeded,
        dropped = prior_count - reused,
        "built graph"
    );

    Graph {
        entities: entity_nodes,
        categories: category_nodes,
        edges,
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::encoding::VisualEncoder;

    fn entity(title: &str, categories: &[&str]) -> Entity {
        Entity {
            title: title.to_string(),
            release_date: None,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            rating: 7.0,
            votes: Some(1_000),
            rating_code: "PG".to_string(),
        }
    }

    fn example() -> Vec<Entity> {
        vec![
            entity("A", &["Drama"]),
            entity("B", &["Drama", "Comedy"]),
            entity("C", &["Comedy"]),
        ]
    }

    fn build(prev: Option<Graph>, entities: &[Entity], config: BuildConfig) -> Graph {
        let encodings = VisualEncoder::new(entities).encode(entities);
        build_graph(prev, entities, &encodings, config)
    }

    fn sizes(graph: &Graph) -> Vec<(&str, usize)> {
        graph
            .category_nodes()
            .map(|node| (node.label.as_str(), node.size))
            .collect()
    }

    #[test]
    fn builds_bipartite_graph_in_encounter_order() {
        let graph = build(None, &example(), BuildConfig::default());

        assert_eq!(graph.entity_count(), 3);
        assert_eq!(sizes(&graph), [("Drama", 2), ("Comedy", 2)]);
        assert_eq!(graph.edges().len(), 4);
        assert_eq!(graph.node_count(), 5);
    }

    #[test]
    fn edges_join_existing_category_and_entity() {
        let entities = example();
        let graph = build(None, &entities, BuildConfig::default());
        let memberships = entities.iter().map(|e| e.categories.len()).sum::<usize>();
        assert_eq!(graph.edges().len(), memberships);

        for edge in graph.edges() {
            let (source, target) = graph.endpoints(edge);
            assert!(matches!(graph.node(source), Some(super::super::GraphNode::Category(_))));
            assert!(matches!(graph.node(target), Some(super::super::GraphNode::Entity(_))));
        }
    }

    #[test]
    fn rebuild_preserves_identity_and_motion() {
        let entities = example();
        let mut graph = build(None, &entities, BuildConfig::default());
        for (offset, body) in graph.bodies_mut().enumerate() {
            body.position = vec2(offset as f32 * 13.0, -(offset as f32));
            body.velocity = vec2(0.5, offset as f32);
        }
        let before = graph.bodies().copied().collect::<Vec<_>>();
        let titles = graph.entity_nodes().map(|n| n.title().to_string()).collect::<Vec<_>>();

        let rebuilt = build(Some(graph), &entities, BuildConfig::default());

        assert_eq!(rebuilt.bodies().copied().collect::<Vec<_>>(), before);
        assert_eq!(
            rebuilt.entity_nodes().map(|n| n.title().to_string()).collect::<Vec<_>>(),
            titles
        );
        assert_eq!(sizes(&rebuilt), [("Drama", 2), ("Comedy", 2)]);
    }

    #[test]
    fn category_size_resets_every_build() {
        let entities = example();
        let mut graph = build(None, &entities, BuildConfig::default());
        for _ in 0..3 {
            graph = build(Some(graph), &entities, BuildConfig::default());
        }
        assert_eq!(sizes(&graph), [("Drama", 2), ("Comedy", 2)]);

        let shrunk = build(Some(graph), &entities[..1], BuildConfig::default());
        assert_eq!(sizes(&shrunk), [("Drama", 1)]);
    }

    #[test]
    fn accumulate_policy_keeps_growing() {
        let config = BuildConfig {
            size_policy: SizePolicy::Accumulate,
            ..BuildConfig::default()
        };
        let entities = example();
        let first = build(None, &entities, config);
        let second = build(Some(first), &entities, config);
        assert_eq!(sizes(&second), [("Drama", 4), ("Comedy", 4)]);
    }

    #[test]
    fn new_nodes_join_reused_ones() {
        let mut entities = example();
        let mut graph = build(None, &entities, BuildConfig::default());
        if let Some(body) = graph.bodies_mut().next() {
            body.position = vec2(400.0, 300.0);
        }

        entities.insert(0, entity("D", &["Horror", "Drama"]));
        let rebuilt = build(Some(graph), &entities, BuildConfig::default());

        assert_eq!(rebuilt.entity_count(), 4);
        assert_eq!(rebuilt.entity("A").map(|n| n.body.position), Some(vec2(400.0, 300.0)));
        assert_eq!(rebuilt.entity("D").map(|n| n.body.position), Some(Body::seeded(0).position));
        assert_eq!(sizes(&rebuilt), [("Horror", 1), ("Drama", 3), ("Comedy", 2)]);
    }

    #[test]
    fn dropped_entities_leave_the_graph() {
        let entities = example();
        let graph = build(None, &entities, BuildConfig::default());
        let rebuilt = build(Some(graph), &entities[2..], BuildConfig::default());

        assert!(rebuilt.entity("A").is_none());
        assert!(rebuilt.category("Drama").is_none());
        assert_eq!(rebuilt.edges().len(), 1);
    }

    #[test]
    fn stable_edge_ids_survive_reordering() {
        let mut entities = example();
        let graph = build(None, &entities, BuildConfig::default());
        let mut before = graph.edges().iter().map(|e| e.id.clone()).collect::<Vec<_>>();

        entities.reverse();
        let rebuilt = build(Some(graph), &entities, BuildConfig::default());
        let mut after = rebuilt.edges().iter().map(|e| e.id.clone()).collect::<Vec<_>>();

        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn positional_edge_ids_follow_build_index() {
        let config = BuildConfig {
            edge_ids: EdgeIdPolicy::Positional,
            ..BuildConfig::default()
        };
        let graph = build(None, &example(), config);
        let ids = graph.edges().iter().map(|e| e.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["Drama-movie0", "Drama-movie1", "Comedy-movie1", "Comedy-movie2"]);
    }

    #[test]
    fn duplicate_titles_share_one_node() {
        let entities = vec![entity("Twin", &["Drama"]), entity("Twin", &["Comedy"])];
        let graph = build(None, &entities, BuildConfig::default());

        assert_eq!(graph.entity_count(), 1);
        assert_eq!(graph.edges().len(), 2);
        assert!(graph.edges().iter().all(|edge| edge.entity == 0));
    }

    #[test]
    fn missing_encoding_falls_back() {
        let entities = example();
        let graph = build_graph(None, &entities, &HashMap::new(), BuildConfig::default());
        assert_eq!(
            graph.entity("B").map(|n| n.encoding),
            Some(VisualEncoding::fallback())
        );
    }

    #[test]
    fn builds_are_deterministic() {
        let entities = example();
        let a = build(None, &entities, BuildConfig::default());
        let b = build(None, &entities, BuildConfig::default());
        assert_eq!(
            a.bodies().copied().collect::<Vec<_>>(),
            b.bodies().copied().collect::<Vec<_>>()
        );
        assert_eq!(a.edges(), b.edges());
    }
}
