use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::Result;
use eframe::egui::{self, Context, Vec2};
use tracing::{info, warn};

use crate::catalog::{Entity, load_records, map_records};
use crate::encoding::{PetalShape, VisualEncoder, VisualEncoding};

mod graph;
mod physics;
mod render_utils;
mod ui;

pub use graph::{BuildConfig, EdgeIdPolicy, SizePolicy};
use graph::build_graph;
pub use physics::LayoutConfig;
use physics::{LayoutRunner, Simulation, TickInfo, Viewport};

const PETAL_OUTLINE_SAMPLES: usize = 12;

pub struct FlowerApp {
    data_path: PathBuf,
    settings: Settings,
    state: AppState,
}

enum AppState {
    Loading { rx: Receiver<Result<Catalog, String>> },
    Ready(Box<ViewModel>),
    Error(String),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Settings {
    pub build: BuildConfig,
    pub layout: LayoutConfig,
}

/// Everything derived once per dataset load.
struct Catalog {
    entities: Vec<Entity>,
    encodings: HashMap<String, VisualEncoding>,
}

impl Catalog {
    fn load(path: &Path) -> Result<Self> {
        let records = load_records(path)?;
        let entities = map_records(&records);
        let encodings = VisualEncoder::new(&entities).encode(&entities);
        info!(
            path = %path.display(),
            entities = entities.len(),
            "catalog loaded"
        );
        Ok(Self {
            entities,
            encodings,
        })
    }
}

struct ViewModel {
    catalog: Catalog,
    settings: Settings,
    runner: LayoutRunner,
    viewport: Viewport,
    pan: Vec2,
    zoom: f32,
    search: String,
    graph_revision: u64,
    search_match_cache: Option<SearchMatchCache>,
    last_tick: Rc<Cell<Option<TickInfo>>>,
    petal_outlines: HashMap<PetalShape, Vec<Vec2>>,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

impl ViewModel {
    fn new(catalog: Catalog, settings: Settings) -> Self {
        let petal_outlines = PetalShape::ALL
            .into_iter()
            .map(|shape| (shape, shape.outline(PETAL_OUTLINE_SAMPLES)))
            .collect();

        let mut model = Self {
            catalog,
            settings,
            runner: LayoutRunner::default(),
            viewport: Viewport::new(0.0, 0.0),
            pan: Vec2::ZERO,
            zoom: 1.0,
            search: String::new(),
            graph_revision: 0,
            search_match_cache: None,
            last_tick: Rc::new(Cell::new(None)),
            petal_outlines,
        };
        model.rebuild_graph();
        model
    }

    /// Supersedes the running layout, merges its graph into a fresh build and
    /// starts a new layout over the result.
    fn rebuild_graph(&mut self) {
        let previous = self.runner.supersede();
        let graph = build_graph(
            previous,
            &self.catalog.entities,
            &self.catalog.encodings,
            self.settings.build,
        );

        let mut simulation = Simulation::new(graph, self.viewport, self.settings.layout);
        let last_tick = Rc::clone(&self.last_tick);
        simulation.on_tick(move |_, tick| last_tick.set(Some(tick)));

        if let Err(error) = self.runner.start(simulation) {
            warn!(%error, "could not start layout");
        }
        self.graph_revision = self.graph_revision.wrapping_add(1);
        self.search_match_cache = None;
        self.last_tick.set(None);
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        if let Some(simulation) = self.runner.current_mut() {
            simulation.set_viewport(viewport);
        }
    }
}

impl FlowerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_path: PathBuf, settings: Settings) -> Self {
        let state = Self::start_load(data_path.clone());
        Self {
            data_path,
            settings,
            state,
        }
    }

    fn spawn_load(data_path: PathBuf) -> Receiver<Result<Catalog, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = Catalog::load(&data_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }
}

impl eframe::App for FlowerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(catalog) => {
                            AppState::Ready(Box::new(ViewModel::new(catalog, self.settings)))
                        }
                        Err(error) => {
                            warn!(%error, "catalog load failed");
                            AppState::Error(error)
                        }
                    });
                } else {
                    ctx.request_repaint();
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading film catalog...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load film catalog");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => model.show(ctx, &self.data_path),
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
