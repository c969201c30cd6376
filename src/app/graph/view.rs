use std::collections::HashSet;
use std::f32::consts::TAU;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Shape, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::util::truncate_title;

use super::super::render_utils::{
    circle_visible, dim_color, edge_visible, petal_fill, place_petal, world_to_screen,
};
use super::super::{SearchMatchCache, ViewModel};
use super::{EntityNode, GraphNode};

const CANVAS_COLOR: Color32 = Color32::WHITE;
/// #ccc at half opacity, premultiplied.
const EDGE_COLOR: Color32 = Color32::from_rgba_premultiplied(102, 102, 102, 128);
const TITLE_COLOR: Color32 = Color32::from_gray(40);
const CATEGORY_COLOR: Color32 = Color32::from_gray(70);
const DETAIL_COLOR: Color32 = Color32::from_gray(20);
const TITLE_MAX_CHARS: usize = 10;
/// Petal length in flower space, before the encoding's scale.
const PETAL_EXTENT: f32 = 100.0;
const DIMMED: f32 = 0.2;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

fn flower_details(node: &EntityNode) -> String {
    let entity = &node.entity;
    let released = entity
        .release_date
        .map(|date| date.format("%d %b %Y").to_string())
        .unwrap_or_else(|| "unknown release".to_owned());
    let votes = entity
        .votes
        .map(|votes| votes.to_string())
        .unwrap_or_else(|| "?".to_owned());

    format!(
        "{}\n{released} · {}\nrating {:.1} · {votes} votes · {}",
        entity.title,
        entity.categories.join(", "),
        entity.rating,
        entity.rating_code,
    )
}

impl ViewModel {
    /// Entity indices whose title matches the search box, or `None` when the
    /// search is empty.
    fn search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cache) = &self.search_match_cache
            && cache.graph_revision == self.graph_revision
            && cache.query == query
        {
            return Some(Arc::clone(&cache.matches));
        }

        let graph = self.runner.current()?.graph();
        let matcher = SkimMatcherV2::default();
        let matches = Arc::new(
            graph
                .entity_nodes()
                .enumerate()
                .filter(|(_, node)| fuzzy_match_score(&matcher, node.title(), query).is_some())
                .map(|(index, _)| index)
                .collect::<HashSet<_>>(),
        );

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.graph_revision,
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui, rect: Rect) {
        let response = ui.allocate_rect(rect, Sense::click_and_drag());
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        let matches = self.search_matches();

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, CANVAS_COLOR);

        let Some(simulation) = self.runner.current() else {
            return;
        };
        let graph = simulation.graph();
        let (pan, zoom) = (self.pan, self.zoom);

        let screen_positions = graph
            .bodies()
            .map(|body| world_to_screen(rect, pan, zoom, body.position))
            .collect::<Vec<_>>();

        let edge_stroke = Stroke::new(zoom.sqrt().clamp(0.5, 2.0), EDGE_COLOR);
        for edge in graph.edges() {
            let (source, target) = graph.endpoints(edge);
            let (start, end) = (screen_positions[source], screen_positions[target]);
            if !start.is_finite() || !end.is_finite() || !edge_visible(rect, start, end, 2.0) {
                continue;
            }
            painter.line_segment([start, end], edge_stroke);
        }

        let title_font = FontId::proportional((10.0 * zoom.sqrt()).clamp(7.0, 18.0));
        let mut hit_radii = Vec::with_capacity(graph.entity_count());
        for (index, node) in graph.entity_nodes().enumerate() {
            let center = screen_positions[index];
            let scale = node.encoding.scale * zoom;
            let extent = PETAL_EXTENT * scale;
            hit_radii.push(if extent.is_finite() { extent * 0.6 } else { 0.0 });

            if !center.is_finite() || !scale.is_finite() || !circle_visible(rect, center, extent) {
                continue;
            }

            let emphasis = match &matches {
                Some(matches) if !matches.contains(&index) => DIMMED,
                _ => 1.0,
            };
            let stroke_color = dim_color(node.encoding.color, emphasis);
            let fill_color = stroke_color.gamma_multiply(0.5);
            let stroke = Stroke::new((2.0 * scale).max(0.5), stroke_color);

            if let Some(outline) = self.petal_outlines.get(&node.encoding.shape) {
                let petals = usize::from(node.encoding.petal_count);
                for petal in 0..petals {
                    let angle = petal as f32 * TAU / petals as f32;
                    let points = place_petal(outline, center, angle, scale);
                    painter.add(Shape::mesh(petal_fill(&points, fill_color)));
                    painter.add(Shape::closed_line(points, stroke));
                }
            }

            painter.text(
                center,
                Align2::CENTER_CENTER,
                truncate_title(node.title(), TITLE_MAX_CHARS),
                title_font.clone(),
                dim_color(TITLE_COLOR, emphasis),
            );
        }

        let category_font = FontId::proportional((14.0 * zoom.sqrt()).clamp(9.0, 24.0));
        for (offset, node) in graph.category_nodes().enumerate() {
            let position = screen_positions[graph.entity_count() + offset];
            if !position.is_finite() || !rect.expand(40.0).contains(position) {
                continue;
            }
            painter.text(
                position,
                Align2::CENTER_CENTER,
                &node.label,
                category_font.clone(),
                CATEGORY_COLOR,
            );
        }

        let hovered = response
            .hover_pos()
            .and_then(|pointer| Self::hovered_flower(pointer, &screen_positions, &hit_radii))
            .zip(response.hover_pos());
        if let Some((index, pointer)) = hovered
            && let Some(GraphNode::Entity(node)) = graph.node(index)
        {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            painter.text(
                pointer + vec2(14.0, 14.0),
                Align2::LEFT_TOP,
                flower_details(node),
                FontId::proportional(12.0),
                DETAIL_COLOR,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::catalog::Entity;
    use crate::encoding::VisualEncoding;
    use crate::app::graph::Body;

    fn node(votes: Option<u64>, release_date: Option<NaiveDate>) -> EntityNode {
        EntityNode {
            entity: Entity {
                title: "Heat".to_owned(),
                release_date,
                categories: vec!["Action".to_owned(), "Crime".to_owned()],
                rating: 8.3,
                votes,
                rating_code: "R".to_owned(),
            },
            encoding: VisualEncoding::fallback(),
            body: Body::default(),
        }
    }

    #[test]
    fn search_is_case_insensitive() {
        let matcher = SkimMatcherV2::default();
        assert!(fuzzy_match_score(&matcher, "The Matrix", "matrix").is_some());
        assert!(fuzzy_match_score(&matcher, "The Matrix", "MATRIX").is_some());
        assert!(fuzzy_match_score(&matcher, "Up", "heat").is_none());
    }

    #[test]
    fn details_list_every_attribute() {
        let details = flower_details(&node(
            Some(512_000),
            NaiveDate::from_ymd_opt(1995, 12, 15),
        ));
        assert_eq!(
            details,
            "Heat\n15 Dec 1995 · Action, Crime\nrating 8.3 · 512000 votes · R"
        );
    }

    #[test]
    fn details_mark_missing_values() {
        let details = flower_details(&node(None, None));
        assert!(details.contains("unknown release"));
        assert!(details.contains("? votes"));
    }
}
