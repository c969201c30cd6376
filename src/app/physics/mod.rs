//! Force-directed layout over a [`Graph`], advanced one tick per frame.

mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};
use tracing::{debug, info, trace};

use super::graph::{Body, Graph, GraphNode};
use forces::{
    CollisionParams, LinkParams, accumulate_collision_pairs, accumulate_link_forces,
    centering_shift,
};
use quadtree::QuadNode;

/// Drawing area the layout centers itself in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Middle of the viewport, or the origin when either extent is not
    /// positive.
    pub fn center(self) -> Vec2 {
        if self.width > 0.0 && self.height > 0.0 {
            vec2(self.width * 0.5, self.height * 0.5)
        } else {
            Vec2::ZERO
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Rest length of a link, added to the radii of both endpoints.
    pub link_distance: f32,
    /// Collision radius of a flower at `scale == 1`.
    pub flower_radius: f32,
    pub category_radius: f32,
    pub collision_strength: f32,
    /// Fraction of the centroid's offset from the viewport center removed per
    /// tick.
    pub center_strength: f32,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub alpha_target: f32,
    /// Alpha the simulation is reheated to when the viewport changes.
    pub resize_alpha: f32,
    /// Stop after this many ticks. `None` keeps ticking until stopped.
    pub max_ticks: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            link_distance: 30.0,
            flower_radius: 75.0,
            category_radius: 0.0,
            collision_strength: 1.0,
            center_strength: 0.1,
            velocity_decay: 0.4,
            alpha_min: 0.001,
            alpha_target: 0.0,
            resize_alpha: 0.3,
            max_ticks: None,
        }
    }
}

impl LayoutConfig {
    /// Decay that takes alpha from 1 to `alpha_min` in 300 ticks.
    fn alpha_decay(&self) -> f32 {
        1.0 - self.alpha_min.clamp(f32::MIN_POSITIVE, 1.0).powf(1.0 / 300.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutState {
    Created,
    Running,
    Stopped,
    Superseded,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LayoutError {
    #[error("a layout is already running; stop or supersede it first")]
    AlreadyRunning,
    #[error("a {0:?} layout cannot be restarted")]
    Finished(LayoutState),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickInfo {
    pub tick: u64,
    pub alpha: f32,
}

type TickCallback = Box<dyn FnMut(&Graph, TickInfo)>;

#[derive(Default)]
struct PhysicsScratch {
    snapshot: Vec<Body>,
    predicted: Vec<Vec2>,
    positions: Vec<Vec2>,
    deltas: Vec<Vec2>,
}

/// One layout run bound to the graph it owns.
pub struct Simulation {
    graph: Graph,
    viewport: Viewport,
    config: LayoutConfig,
    state: LayoutState,
    alpha: f32,
    ticks: u64,
    links: Vec<(usize, usize)>,
    degrees: Vec<usize>,
    radii: Vec<f32>,
    max_radius: f32,
    scratch: PhysicsScratch,
    callbacks: Vec<TickCallback>,
}

impl Simulation {
    pub fn new(graph: Graph, viewport: Viewport, config: LayoutConfig) -> Self {
        let links = graph
            .edges()
            .iter()
            .map(|edge| graph.endpoints(edge))
            .collect::<Vec<_>>();

        let mut degrees = vec![0usize; graph.node_count()];
        for &(source, target) in &links {
            degrees[source] += 1;
            degrees[target] += 1;
        }

        let radii = graph
            .nodes()
            .map(|node| match node {
                GraphNode::Entity(node) => node.encoding.scale * config.flower_radius,
                GraphNode::Category(_) => config.category_radius,
            })
            .collect::<Vec<_>>();
        let max_radius = radii
            .iter()
            .copied()
            .filter(|radius| radius.is_finite())
            .fold(0.0_f32, f32::max);

        Self {
            graph,
            viewport,
            config,
            state: LayoutState::Created,
            alpha: 1.0,
            ticks: 0,
            links,
            degrees,
            radii,
            max_radius,
            scratch: PhysicsScratch::default(),
            callbacks: Vec::new(),
        }
    }

    pub fn start(&mut self) -> Result<(), LayoutError> {
        match self.state {
            LayoutState::Created => {
                self.state = LayoutState::Running;
                info!(
                    nodes = self.graph.node_count(),
                    links = self.links.len(),
                    "layout started"
                );
                Ok(())
            }
            LayoutState::Running => Err(LayoutError::AlreadyRunning),
            finished => Err(LayoutError::Finished(finished)),
        }
    }

    /// Takes effect immediately: no tick or callback runs after this returns.
    pub fn stop(&mut self) {
        if matches!(self.state, LayoutState::Created | LayoutState::Running) {
            self.state = LayoutState::Stopped;
            info!(ticks = self.ticks, "layout stopped");
        }
    }

    fn supersede(&mut self) {
        if matches!(self.state, LayoutState::Created | LayoutState::Running) {
            self.state = LayoutState::Superseded;
            debug!(ticks = self.ticks, "layout superseded");
        }
    }

    pub fn on_tick(&mut self, callback: impl FnMut(&Graph, TickInfo) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Retargets the centering force and reheats the layout so it drifts to
    /// the new center.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.reheat(self.config.resize_alpha);
    }

    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha);
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    #[cfg(test)]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    #[cfg(test)]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_settled(&self) -> bool {
        self.alpha < self.config.alpha_min
    }

    /// Advances the layout by one step and notifies subscribers. Returns
    /// whether a step ran.
    pub fn tick(&mut self) -> bool {
        if self.state != LayoutState::Running {
            return false;
        }
        if self.config.max_ticks.is_some_and(|max| self.ticks >= max) {
            self.state = LayoutState::Stopped;
            info!(ticks = self.ticks, "layout reached its tick limit");
            return false;
        }

        self.alpha += (self.config.alpha_target - self.alpha) * self.config.alpha_decay();
        self.step();
        self.ticks += 1;
        trace!(tick = self.ticks, alpha = self.alpha, "layout tick");

        let info = TickInfo {
            tick: self.ticks,
            alpha: self.alpha,
        };
        for callback in &mut self.callbacks {
            callback(&self.graph, info);
        }
        true
    }

    /// Link, collision and centering forces, all read from the state at the
    /// start of the step, then velocity integration.
    fn step(&mut self) {
        let scratch = &mut self.scratch;
        scratch.snapshot.clear();
        scratch.snapshot.extend(self.graph.bodies().copied());
        let node_count = scratch.snapshot.len();
        if node_count == 0 {
            return;
        }

        scratch.positions.clear();
        scratch.predicted.clear();
        for body in &scratch.snapshot {
            scratch.positions.push(body.position);
            scratch.predicted.push(body.position + body.velocity);
        }
        scratch.deltas.clear();
        scratch.deltas.resize(node_count, Vec2::ZERO);

        accumulate_link_forces(
            &self.links,
            &scratch.predicted,
            &self.degrees,
            &self.radii,
            LinkParams {
                distance: self.config.link_distance,
                alpha: self.alpha,
            },
            &mut scratch.deltas,
        );

        if self.max_radius > 0.0
            && let Some(quadtree) = QuadNode::build(&scratch.predicted)
        {
            let max_collision_distance = self.max_radius * 2.0;
            accumulate_collision_pairs(
                &quadtree,
                &quadtree,
                true,
                &scratch.predicted,
                &self.radii,
                CollisionParams {
                    collision_strength: self.config.collision_strength,
                    max_collision_distance_sq: max_collision_distance * max_collision_distance,
                },
                &mut scratch.deltas,
            );
        }

        let shift = centering_shift(
            &scratch.positions,
            self.viewport.center(),
            self.config.center_strength,
        );

        let retained = 1.0 - self.config.velocity_decay;
        for ((body, before), delta) in self
            .graph
            .bodies_mut()
            .zip(&scratch.snapshot)
            .zip(&scratch.deltas)
        {
            let velocity = (before.velocity + *delta) * retained;
            body.velocity = velocity;
            body.position = before.position + shift + velocity;
        }
    }
}

/// Owns the single layout run of a visualization. A new run can only start
/// once the previous one is no longer running.
#[derive(Default)]
pub struct LayoutRunner {
    current: Option<Simulation>,
}

impl LayoutRunner {
    pub fn start(&mut self, mut simulation: Simulation) -> Result<(), LayoutError> {
        if self
            .current
            .as_ref()
            .is_some_and(|current| current.state() == LayoutState::Running)
        {
            return Err(LayoutError::AlreadyRunning);
        }

        simulation.start()?;
        self.current = Some(simulation);
        Ok(())
    }

    /// Ends the current run and hands back its graph so it can seed a rebuild.
    pub fn supersede(&mut self) -> Option<Graph> {
        let mut simulation = self.current.take()?;
        simulation.supersede();
        Some(simulation.into_graph())
    }

    pub fn stop(&mut self) {
        if let Some(simulation) = self.current.as_mut() {
            simulation.stop();
        }
    }

    pub fn tick(&mut self) -> bool {
        self.current.as_mut().is_some_and(Simulation::tick)
    }

    pub fn current(&self) -> Option<&Simulation> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Simulation> {
        self.current.as_mut()
    }
}
