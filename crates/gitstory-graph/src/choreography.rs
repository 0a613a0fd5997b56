use crate::bookends;
use crate::camera::CameraPlanner;
use crate::edge_router::EdgeRouter;
use crate::labels::{RefLabelStacker, wrap_message};
use crate::layout::{GridCell, LayoutEngine, LayoutState, PlacedNode};
use gitstory_core::{
    CommitId, CommitNode, Rect, RefSnapshot, StoryConfig, TraversalDirection, Vec2,
};
use gitstory_events::{ElementId, Event, EventLog, LabelStyle, NodeStyle};
use gitstory_history::HistoryWindow;

/// Outcome of arriving at a commit during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
    /// Out of the window or past the depth limit; nothing was emitted.
    NotVisited,
    /// Drawn for the first time; traversal continues from it.
    FirstVisit,
    /// Already drawn; only a connecting edge was emitted and this path ends.
    RevisitTerminal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChoreographyStats {
    pub nodes_drawn: usize,
    pub edges_drawn: usize,
    pub revisits: usize,
    pub collisions: usize,
}

/// Result of one run: the ordered event log plus the final layout.
#[derive(Debug, Clone)]
pub struct Choreography {
    pub events: EventLog,
    pub layout: LayoutState,
    pub stats: ChoreographyStats,
}

/// The node a visit arrived from.
#[derive(Debug, Clone)]
struct Anchor {
    commit: CommitId,
    cell: GridCell,
    position: Vec2,
}

#[derive(Debug, Clone)]
struct Visit {
    commit: CommitId,
    depth: usize,
    previous: Option<Anchor>,
}

/// Mutable state of one traversal. Nothing here outlives a run.
#[derive(Debug, Default)]
struct TraversalContext {
    layout: LayoutState,
    log: EventLog,
    story_elements: Vec<ElementId>,
    stats: ChoreographyStats,
}

/// Walks a history window depth-first and records the draw/camera events
/// that replay it.
pub struct Choreographer<'a> {
    window: &'a HistoryWindow,
    refs: &'a RefSnapshot,
    config: &'a StoryConfig,
    layout: LayoutEngine,
    router: EdgeRouter,
    stacker: RefLabelStacker,
    camera: CameraPlanner,
    context: TraversalContext,
}

impl<'a> Choreographer<'a> {
    pub fn new(window: &'a HistoryWindow, refs: &'a RefSnapshot, config: &'a StoryConfig) -> Self {
        Self {
            window,
            refs,
            config,
            layout: LayoutEngine::new(config.layout.clone()),
            router: EdgeRouter::new(config.edges.clone(), config.layout.node_radius),
            stacker: RefLabelStacker::new(config.labels.clone()),
            camera: CameraPlanner::new(config.camera.clone()),
            context: TraversalContext::default(),
        }
    }

    pub fn run(mut self) -> Choreography {
        self.camera.save(&mut self.context.log);
        bookends::intro(self.config, &mut self.context.log);

        // Explicit stack; next hops are pushed in reverse so they pop in
        // the same order a recursive walk would visit them.
        let mut stack = vec![Visit {
            commit: self.window.root().id.clone(),
            depth: 0,
            previous: None,
        }];
        while let Some(visit) = stack.pop() {
            let mut next = Vec::new();
            let state = self.visit(visit, &mut next);
            if state == VisitState::FirstVisit {
                stack.extend(next.into_iter().rev());
            }
        }

        self.camera.frame_to_fit(&mut self.context.log);
        let elements = std::mem::take(&mut self.context.story_elements);
        if !elements.is_empty() {
            self.context.log.push(Event::FadeGroup { elements });
        }
        bookends::outro(self.config, &mut self.camera, &mut self.context.log);

        let TraversalContext {
            layout, log, stats, ..
        } = self.context;
        tracing::info!(
            "choreographed {} commits, {} edges, {} revisits, {} events",
            stats.nodes_drawn,
            stats.edges_drawn,
            stats.revisits,
            log.len()
        );
        Choreography {
            events: log,
            layout,
            stats,
        }
    }

    fn visit(&mut self, visit: Visit, next: &mut Vec<Visit>) -> VisitState {
        if visit.depth >= self.window.visible() {
            return VisitState::NotVisited;
        }
        let Some(commit) = self.window.get(&visit.commit) else {
            tracing::debug!("{} is outside the window", visit.commit);
            return VisitState::NotVisited;
        };

        if let Some(placed) = self.context.layout.get(&commit.id) {
            self.revisit(commit, placed, visit.previous.as_ref());
            return VisitState::RevisitTerminal;
        }

        let placed = self.draw_commit(commit, visit.previous.as_ref());
        let anchor = Anchor {
            commit: commit.id.clone(),
            cell: placed.cell,
            position: placed.position,
        };
        for hop in self.next_hops(commit) {
            next.push(Visit {
                commit: hop,
                depth: visit.depth + 1,
                previous: Some(anchor.clone()),
            });
        }
        VisitState::FirstVisit
    }

    /// A merge brought us back to a drawn commit: focus it and connect it to
    /// where we came from.
    fn revisit(&mut self, commit: &CommitNode, placed: PlacedNode, previous: Option<&Anchor>) {
        tracing::debug!("revisiting {}", commit.id.short(7));
        self.context.stats.revisits += 1;
        self.camera.focus(placed.position, &mut self.context.log);
        if let Some(previous) = previous {
            self.connect(&commit.id, placed.position, previous);
        }
    }

    fn draw_commit(&mut self, commit: &CommitNode, previous: Option<&Anchor>) -> PlacedNode {
        let placement = self
            .layout
            .place(&self.context.layout, previous.map(|p| p.cell));
        self.context.stats.collisions += placement.collisions;
        self.camera
            .record_collisions(placement.collisions, &mut self.context.log);
        let position = placement.position;
        let radius = self.config.layout.node_radius;

        self.camera.focus(position, &mut self.context.log);
        let element = self.context.log.allocate();
        self.context.log.push(Event::NodeDraw {
            element,
            commit: commit.id.clone(),
            center: position,
            radius,
            style: if commit.is_merge() {
                NodeStyle::Merge
            } else {
                NodeStyle::Commit
            },
        });
        self.track(
            element,
            Rect::from_center_size(position, Vec2::new(radius * 2.0, radius * 2.0)),
        );
        self.context.stats.nodes_drawn += 1;
        tracing::debug!("drew {} at {}", commit.id.short(7), placement.cell);

        let short_id = commit.id.short(self.config.labels.short_id_len);
        let id_bounds = self.stacker.commit_id_bounds(position, radius, short_id);
        self.label(commit, short_id.to_string(), id_bounds, LabelStyle::CommitId);

        let message = wrap_message(&commit.message, &self.config.labels);
        let message_bounds = self.stacker.message_bounds(position, radius, &message);
        self.label(commit, message, message_bounds, LabelStyle::Message);

        let refs = self.refs;
        let ref_labels = self.stacker.stack(
            id_bounds,
            refs.is_head(&commit.id),
            refs.branches_at(&commit.id),
            refs.tags_at(&commit.id),
            self.config.max_branches_per_commit,
            self.config.max_tags_per_commit,
        );
        for placed_label in ref_labels {
            let style = placed_label.style();
            self.label(commit, placed_label.text().to_string(), placed_label.bounds, style);
        }

        if let Some(previous) = previous {
            self.connect(&commit.id, position, previous);
        }

        let placed = PlacedNode {
            cell: placement.cell,
            position,
        };
        let recorded = self.context.layout.record(commit.id.clone(), placed);
        debug_assert!(recorded, "{} was placed twice", commit.id);
        placed
    }

    /// Emit the arrow between `commit` and the node the visit came from. The
    /// arrow points from child to parent whichever way the walk runs.
    fn connect(&mut self, commit: &CommitId, position: Vec2, previous: &Anchor) {
        let (from, start, to, end) = match self.window.direction() {
            TraversalDirection::Forward => {
                (commit, position, &previous.commit, previous.position)
            }
            TraversalDirection::Backward => {
                (&previous.commit, previous.position, commit, position)
            }
        };
        let geometry = self
            .router
            .route(start, end, self.context.layout.positions());
        let element = self.context.log.allocate();
        self.context.log.push(Event::EdgeDraw {
            element,
            from: from.clone(),
            to: to.clone(),
            geometry,
        });
        self.track(element, geometry.bounds());
        self.context.stats.edges_drawn += 1;
    }

    fn label(&mut self, commit: &CommitNode, text: String, bounds: Rect, style: LabelStyle) {
        let element = self.context.log.allocate();
        self.context.log.push(Event::LabelDraw {
            element,
            commit: Some(commit.id.clone()),
            text,
            bounds,
            style,
        });
        self.track(element, bounds);
    }

    fn track(&mut self, element: ElementId, bounds: Rect) {
        self.context.story_elements.push(element);
        self.camera.include(bounds);
    }

    fn next_hops(&self, commit: &CommitNode) -> Vec<CommitId> {
        let mut hops: Vec<CommitId> = match self.window.direction() {
            TraversalDirection::Backward => {
                let mut parents = commit.parents.clone();
                if self.config.invert_branches {
                    parents.reverse();
                }
                parents
            }
            // Child lists were already inverted when the window was built.
            TraversalDirection::Forward => self.window.children(&commit.id).to_vec(),
        };
        if self.config.hide_merged_chains {
            hops.truncate(1);
        }
        hops
    }
}

/// Lay out `window` and record the full event sequence for it.
pub fn choreograph(window: &HistoryWindow, refs: &RefSnapshot, config: &StoryConfig) -> Choreography {
    Choreographer::new(window, refs, config).run()
}
