//! Interactive viewer core for lock graphs and their cycles.
//!
//! `lockview` keeps the visual state of a lock-graph viewer consistent while
//! the user pans, zooms, selects edges and toggles edges out of cycle
//! analysis. Rendering and cycle computation belong to an
//! [`ArtifactSource`](source::ArtifactSource); the view transform belongs to
//! [`lockview_transform`].
//!
//! # Architecture
//!
//! - [`controller`]: the graph interaction controller and the cycle
//!   recomputation protocol
//! - [`detail`]: the per-edge detail view
//! - [`diagram`] and [`path`]: mounted diagrams, markers and hit testing
//! - [`surface`]: containers diagrams are mounted into
//! - [`source`]: the artifact source seam, a directory-backed source, and
//!   petgraph cycle analysis
//! - [`indicator`]: the shared loading indicator
//! - [`replay`]: scripted headless sessions
//!
//! # Example
//!
//! ```no_run
//! use lockview::config::ViewerConfig;
//! use lockview::controller::GraphController;
//! use lockview::domain::{ElementId, Modifiers};
//! use lockview::source::DirectorySource;
//! use lockview::surface::HeadlessContainer;
//! use lockview_transform::Rect;
//! use std::rc::Rc;
//!
//! # async fn example() -> lockview::Result<()> {
//! let rect = Rect::new(0.0, 0.0, 1280.0, 800.0);
//! let controller = GraphController::new(
//!     Rc::new(DirectorySource::new("artifacts")),
//!     HeadlessContainer::new(rect),
//!     HeadlessContainer::new(rect),
//!     ViewerConfig::default(),
//! );
//! controller.load().await?;
//! controller
//!     .handle_edge_click(&ElementId::new("e1"), Modifiers::CTRL)
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod controller;
pub mod detail;
pub mod diagram;
pub mod domain;
pub mod error;
pub mod indicator;
pub mod output;
pub mod path;
pub mod replay;
pub mod source;
pub mod surface;

pub use error::{Error, Result};
