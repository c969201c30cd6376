use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 6.0);
        self.pan = pointer - rect.min - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Closest flower whose hit circle contains the pointer.
    pub(in crate::app) fn hovered_flower(
        pointer: Pos2,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        screen_radii
            .iter()
            .enumerate()
            .filter_map(|(index, radius)| {
                let distance = screen_positions.get(index)?.distance(pointer);
                (distance <= *radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_picks_nearest_containing_flower() {
        let positions = [Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0), Pos2::new(100.0, 0.0)];
        let radii = [20.0, 20.0, 5.0];

        assert_eq!(
            ViewModel::hovered_flower(Pos2::new(8.0, 0.0), &positions, &radii),
            Some(1)
        );
        assert_eq!(
            ViewModel::hovered_flower(Pos2::new(60.0, 0.0), &positions, &radii),
            None
        );
    }

    #[test]
    fn nan_positions_are_never_hovered() {
        let positions = [Pos2::new(f32::NAN, 0.0)];
        assert_eq!(
            ViewModel::hovered_flower(Pos2::new(0.0, 0.0), &positions, &[10.0]),
            None
        );
    }
}
