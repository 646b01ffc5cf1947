//! Scripted interaction sessions.
//!
//! A script is a JSON Lines file with one interaction step per line. Blank
//! lines and lines starting with `#` are skipped:
//!
//! ```text
//! {"step": "click-edge", "edge": "e1", "modifiers": {"ctrl": true}}
//! {"step": "wheel", "view": "graph", "x": 400, "y": 300, "delta-y": -250}
//! {"step": "pointer-down", "x": 10, "y": 10}
//! {"step": "pointer-move", "x": 60, "y": 40}
//! {"step": "pointer-up", "x": 60, "y": 40}
//! {"step": "click", "x": 200, "y": 103}
//! ```
//!
//! [`Session`] runs the steps against a [`GraphController`] over headless
//! containers and reports the resulting visual state as a
//! [`SessionSnapshot`].

use crate::config::ViewerConfig;
use crate::controller::{ClickOutcome, GraphController, RecomputeOutcome};
use crate::diagram::ElementState;
use crate::domain::{CycleMembership, ElementId, ExclusionSet, Modifiers, ViewLayout};
use crate::error::{Error, Result};
use crate::indicator::IndicatorView;
use crate::source::ArtifactSource;
use crate::surface::HeadlessContainer;
use lockview_transform::{
    Buttons, DeltaMode, HeadlessViewport, InputHandler, Point, PointerEvent, PointerId, Rect,
    ResizeStrategy, TransformEngine, Viewport as _, WheelEvent,
};
use futures::stream::{self, Stream, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::{debug, info, warn};

/// Which view a step targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    /// The whole-graph view.
    #[default]
    Graph,
    /// The edge detail view.
    Detail,
}

fn default_pointer() -> u32 {
    1
}

fn default_buttons() -> u16 {
    Buttons::PRIMARY.0
}

/// One interaction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum ScriptStep {
    /// Click at a client position in the graph view.
    Click {
        /// Client x.
        x: f64,
        /// Client y.
        y: f64,
        /// Modifiers held.
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Click an edge by id, bypassing hit testing.
    ClickEdge {
        /// The edge.
        edge: ElementId,
        /// Modifiers held.
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Press a pointer button.
    PointerDown {
        /// Target view.
        #[serde(default)]
        view: View,
        /// Page x.
        x: f64,
        /// Page y.
        y: f64,
        /// Pointer id.
        #[serde(default = "default_pointer")]
        pointer: u32,
    },
    /// Move a pointer.
    PointerMove {
        /// Target view.
        #[serde(default)]
        view: View,
        /// Page x.
        x: f64,
        /// Page y.
        y: f64,
        /// Pointer id.
        #[serde(default = "default_pointer")]
        pointer: u32,
        /// Button bitmask held during the move.
        #[serde(default = "default_buttons")]
        buttons: u16,
    },
    /// Release a pointer button.
    PointerUp {
        /// Target view.
        #[serde(default)]
        view: View,
        /// Page x.
        x: f64,
        /// Page y.
        y: f64,
        /// Pointer id.
        #[serde(default = "default_pointer")]
        pointer: u32,
    },
    /// Turn the wheel.
    Wheel {
        /// Target view.
        #[serde(default)]
        view: View,
        /// Client x.
        x: f64,
        /// Client y.
        y: f64,
        /// Vertical delta.
        delta_y: f64,
        /// Unit of the delta.
        #[serde(default)]
        delta_mode: DeltaMode,
    },
    /// Resize a view's container.
    Resize {
        /// Target view.
        #[serde(default)]
        view: View,
        /// New width.
        width: f64,
        /// New height.
        height: f64,
    },
    /// Fit a view's content to its container.
    Fit {
        /// Target view.
        #[serde(default)]
        view: View,
    },
    /// Expand the graph view.
    Expand,
    /// Recompute cycles for the current exclusion set.
    Recompute,
}

impl ScriptStep {
    /// The step's name as written in scripts.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Click { .. } => "click",
            Self::ClickEdge { .. } => "click-edge",
            Self::PointerDown { .. } => "pointer-down",
            Self::PointerMove { .. } => "pointer-move",
            Self::PointerUp { .. } => "pointer-up",
            Self::Wheel { .. } => "wheel",
            Self::Resize { .. } => "resize",
            Self::Fit { .. } => "fit",
            Self::Expand => "expand",
            Self::Recompute => "recompute",
        }
    }
}

/// A step with the script line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    /// 1-based line number.
    pub line: usize,
    /// The step.
    pub step: ScriptStep,
}

fn parse_line(line: usize, text: &str) -> Result<Option<ScriptLine>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let step = serde_json::from_str(trimmed).map_err(|e| Error::Script {
        line,
        reason: e.to_string(),
    })?;
    Ok(Some(ScriptLine { line, step }))
}

/// Parse a whole script.
///
/// # Errors
///
/// Returns `Error::Script` for the first line that is not a valid step.
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| parse_line(i + 1, line).transpose())
        .collect()
}

struct ScriptReader<R> {
    lines: Lines<BufReader<R>>,
    line: usize,
}

impl<R: AsyncRead + Unpin> ScriptReader<R> {
    async fn next_step(mut self) -> Result<Option<(ScriptLine, Self)>> {
        while let Some(text) = self.lines.next_line().await? {
            self.line += 1;
            if let Some(step) = parse_line(self.line, &text)? {
                return Ok(Some((step, self)));
            }
        }
        Ok(None)
    }
}

/// Stream the steps of a script as they are read from `reader`.
///
/// The stream yields `Error::Io` if reading fails and `Error::Script` for a
/// line that is not a valid step, then ends.
pub fn script_lines<R: AsyncRead + Unpin>(reader: R) -> impl Stream<Item = Result<ScriptLine>> {
    let reader = ScriptReader {
        lines: BufReader::new(reader).lines(),
        line: 0,
    };
    stream::try_unfold(reader, ScriptReader::next_step)
}

/// Read a whole script from `reader`.
///
/// # Errors
///
/// Returns `Error::Io` if reading fails and `Error::Script` for the first
/// line that is not a valid step.
pub async fn read_script<R: AsyncRead + Unpin>(reader: R) -> Result<Vec<ScriptLine>> {
    let steps: Vec<ScriptLine> = script_lines(reader).try_collect().await?;
    debug!(steps = steps.len(), "Read replay script");
    Ok(steps)
}

/// What one executed step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepResult {
    /// The step changed view or interaction state.
    Done,
    /// A click was dispatched.
    Click(ClickOutcome),
    /// A recomputation completed.
    Recompute(RecomputeOutcome),
    /// The step failed; the session continued.
    Failed(String),
}

/// Record of one executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Script line.
    pub line: usize,
    /// Step name.
    pub step: &'static str,
    /// What happened.
    pub result: StepResult,
}

/// State of one view after a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    /// Container box.
    pub container: Rect,
    /// The rendered content transform as a CSS matrix, if any.
    pub transform: Option<String>,
}

/// The visual state at the end of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Current layout.
    pub layout: ViewLayout,
    /// Presentation classes of the graph view.
    pub layout_class: &'static str,
    /// Excluded edges.
    pub exclusions: ExclusionSet,
    /// Latest applied cycle membership.
    pub membership: CycleMembership,
    /// Selected edge.
    pub selected: Option<ElementId>,
    /// Every element carrying at least one marker.
    pub marked: Vec<ElementState>,
    /// The graph view.
    pub graph: ViewSnapshot,
    /// The edge shown in the detail view.
    pub detail_edge: Option<ElementId>,
    /// The detail view, if content is mounted.
    pub detail: Option<ViewSnapshot>,
    /// The loading indicator.
    pub indicator: IndicatorView,
    /// Per-step results.
    pub steps: Vec<StepRecord>,
}

/// A headless interactive session.
pub struct Session {
    controller: GraphController<HeadlessContainer>,
    records: Vec<StepRecord>,
}

impl Session {
    /// Create a session whose views use the configured container size and
    /// resize notification setting.
    pub fn new(source: Rc<dyn ArtifactSource>, config: ViewerConfig) -> Self {
        let settings = config.container;
        let container = || {
            let container = HeadlessContainer::new(settings.rect());
            if settings.observe_resize {
                container
            } else {
                container.without_resize_notifications()
            }
        };
        let controller = GraphController::new(source, container(), container(), config);
        Self {
            controller,
            records: Vec::new(),
        }
    }

    /// The controller driving the session.
    #[must_use]
    pub const fn controller(&self) -> &GraphController<HeadlessContainer> {
        &self.controller
    }

    /// Load the graph.
    ///
    /// # Errors
    ///
    /// Returns the source's error.
    pub async fn load(&self) -> Result<RecomputeOutcome> {
        self.controller.load().await
    }

    /// Run every step in order. A failing step is recorded and the session
    /// continues with the next one.
    pub async fn run(&mut self, script: &[ScriptLine]) {
        for line in script {
            let result = match self.execute(&line.step).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(line = line.line, step = line.step.name(), error = %e, "Step failed");
                    StepResult::Failed(e.to_string())
                }
            };
            debug!(line = line.line, step = line.step.name(), "Executed step");
            self.records.push(StepRecord {
                line: line.line,
                step: line.step.name(),
                result,
            });
        }
        info!(steps = script.len(), "Replay finished");
    }

    async fn execute(&self, step: &ScriptStep) -> Result<StepResult> {
        match *step {
            ScriptStep::Click { x, y, modifiers } => self
                .controller
                .click_at(Point::new(x, y), modifiers)
                .await
                .map(StepResult::Click),
            ScriptStep::ClickEdge {
                ref edge,
                modifiers,
            } => self
                .controller
                .handle_edge_click(edge, modifiers)
                .await
                .map(StepResult::Click),
            ScriptStep::PointerDown {
                view,
                x,
                y,
                pointer,
            } => self.with_engine(view, |engine| {
                engine.on_pointer_down(&PointerEvent {
                    pointer_id: PointerId(pointer),
                    page: Point::new(x, y),
                    buttons: Buttons::PRIMARY,
                });
            }),
            ScriptStep::PointerMove {
                view,
                x,
                y,
                pointer,
                buttons,
            } => self.with_engine(view, |engine| {
                engine.on_pointer_move(&PointerEvent {
                    pointer_id: PointerId(pointer),
                    page: Point::new(x, y),
                    buttons: Buttons(buttons),
                });
            }),
            ScriptStep::PointerUp {
                view,
                x,
                y,
                pointer,
            } => self.with_engine(view, |engine| {
                engine.on_pointer_up(&PointerEvent {
                    pointer_id: PointerId(pointer),
                    page: Point::new(x, y),
                    buttons: Buttons::NONE,
                });
            }),
            ScriptStep::Wheel {
                view,
                x,
                y,
                delta_y,
                delta_mode,
            } => self.with_engine(view, |engine| {
                engine.on_wheel(&WheelEvent {
                    client: Point::new(x, y),
                    delta_y,
                    delta_mode,
                });
            }),
            ScriptStep::Resize {
                view,
                width,
                height,
            } => {
                let rect = Rect::new(0.0, 0.0, width, height);
                match view {
                    View::Graph => self.controller.with_graph_container(|c| c.resize(rect)),
                    View::Detail => self.controller.detail().with_container(|c| c.resize(rect)),
                }
                let updated = self.engine_result(view, |engine| {
                    engine.viewport_mut().resize(rect);
                    match engine.resize_strategy() {
                        ResizeStrategy::Observe => {
                            engine.on_resize();
                            Ok(())
                        }
                        ResizeStrategy::Manual => engine.update_projection(),
                    }
                })?;
                updated.map(|()| StepResult::Done).map_err(Error::from)
            }
            ScriptStep::Fit { view } => {
                let fitted = self.engine_result(view, |engine| engine.fit_to_view())?;
                fitted.map(|_| StepResult::Done).map_err(Error::from)
            }
            ScriptStep::Expand => {
                self.controller.expand();
                Ok(StepResult::Done)
            }
            ScriptStep::Recompute => self
                .controller
                .recompute_cycles()
                .await
                .map(StepResult::Recompute),
        }
    }

    fn engine_result<R>(
        &self,
        view: View,
        f: impl FnOnce(&mut TransformEngine<HeadlessViewport>) -> R,
    ) -> Result<R> {
        let result = match view {
            View::Graph => self.controller.with_graph_engine(f),
            View::Detail => self.controller.detail().with_engine(f),
        };
        result.ok_or(Error::NotLoaded)
    }

    fn with_engine(
        &self,
        view: View,
        f: impl FnOnce(&mut TransformEngine<HeadlessViewport>),
    ) -> Result<StepResult> {
        self.engine_result(view, f).map(|()| StepResult::Done)
    }

    /// The visual state now.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let controller = &self.controller;
        let layout = controller.layout();
        let view_snapshot = |engine: &mut TransformEngine<HeadlessViewport>| ViewSnapshot {
            container: engine.viewport().container_rect(),
            transform: engine
                .viewport()
                .applied_transform()
                .map(|t| t.to_css_matrix()),
        };
        let graph = controller
            .with_graph_engine(view_snapshot)
            .unwrap_or_else(|| ViewSnapshot {
                container: controller.with_graph_container(|c| c.rect()),
                transform: None,
            });

        SessionSnapshot {
            layout,
            layout_class: layout.class_name(),
            exclusions: controller.exclusions(),
            membership: controller.membership(),
            selected: controller.selected_edge(),
            marked: controller.marked_elements(),
            graph,
            detail_edge: controller.detail().current_edge(),
            detail: controller.detail().with_engine(view_snapshot),
            indicator: controller.indicator().view(),
            steps: self.records.clone(),
        }
    }
}
