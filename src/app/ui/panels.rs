use std::path::Path;

use eframe::egui::{self, Align, Context, Layout};

use super::super::physics::{LayoutState, Viewport};
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context, data_path: &Path) {
        let mut rebuild_requested = false;
        let mut reheat_requested = false;
        let mut stop_requested = false;

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("film-flowers");
                    ui.separator();
                    ui.label(format!("data: {}", data_path.display()));
                    if let Some(simulation) = self.runner.current() {
                        let graph = simulation.graph();
                        ui.label(format!("films: {}", graph.entity_count()));
                        ui.label(format!("genres: {}", graph.category_count()));
                        ui.label(format!("links: {}", graph.edges().len()));
                    }
                    ui.separator();
                    ui.label("search:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.search)
                            .hint_text("title")
                            .desired_width(180.0),
                    );
                    if ui.button("Reheat").clicked() {
                        reheat_requested = true;
                    }
                    if ui.button("Stop").clicked() {
                        stop_requested = true;
                    }
                    if ui.button("Rebuild graph").clicked() {
                        rebuild_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.layout_status_text());
                    });
                });
            });

        if rebuild_requested {
            self.rebuild_graph();
        }
        if stop_requested {
            self.runner.stop();
        }
        if reheat_requested && let Some(simulation) = self.runner.current_mut() {
            simulation.reheat(1.0);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.set_viewport(Viewport::new(rect.width(), rect.height()));

                // One layout step per frame, drawn only after it completes.
                self.runner.tick();
                self.draw_graph(ui, rect);
            });

        let animating = self
            .runner
            .current()
            .is_some_and(|simulation| {
                simulation.state() == LayoutState::Running && !simulation.is_settled()
            });
        if animating {
            ctx.request_repaint();
        }
    }

    fn layout_status_text(&self) -> String {
        let Some(simulation) = self.runner.current() else {
            return "layout: none".to_owned();
        };

        let state = match simulation.state() {
            LayoutState::Running if simulation.is_settled() => "settled",
            LayoutState::Running => "running",
            LayoutState::Created => "created",
            LayoutState::Stopped => "stopped",
            LayoutState::Superseded => "superseded",
        };
        match self.last_tick.get() {
            Some(tick) => format!("layout: {state} · tick {} · alpha {:.3}", tick.tick, tick.alpha),
            None => format!("layout: {state}"),
        }
    }
}
