//! Arbor: a layout resolution engine for retained-mode widget trees.
//!
//! Arbor turns a tree of widgets and their style declarations into concrete
//! pixel positions and sizes. It supports block, flex and grid layouts with
//! growth, shrink and alignment, fit-content and percentage sizing, and
//! virtualized containers whose children are cloned on demand from a
//! template and bound to rows of an external data source.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Scene`] - The widget arena, and the home of every layout operation
//! - [`Style`] - Per-widget style declarations
//! - [`DataSource`] - The contract for rows bound to virtualized containers
//!
//! A frame is driven by [`Scene::update`], which steps pan physics, runs
//! finished template loads and recalculates every queued widget.
//!
//! # Module Organization
//!
//! - [`scene`] - The widget arena, listeners and the spatial index
//! - [`style`] - Style values and the accessor the engine reads them through
//! - [`controller`] - Scroll and virtualization state of flex and grid widgets
//! - [`data`] - Data sources
//! - [`template`] - Item templates

#![warn(missing_docs)]

/// Engine tunables.
pub mod config;
/// Scroll and virtualization controllers.
pub mod controller;
/// Data sources.
pub mod data;
/// Debug dumps of committed layouts.
pub mod dump;
/// Error types.
pub mod error;
/// Arena keys.
pub mod id;
/// The resolver.
mod layout;
/// The widget arena.
pub mod scene;
/// Style values.
pub mod style;
/// Item templates.
pub mod template;

pub use config::LayoutConfig;
pub use controller::{ControllerKind, LayoutController};
pub use data::{DataSource, DataValue, Filter, FilterOp, Row, SortKey, SortOrder, VecDataSource};
pub use dump::{LayoutDump, dump, dump_json};
pub use error::{Error, Result};
pub use geom;
pub use id::{SourceId, TemplateId, WidgetId};
pub use scene::{
    BoundsIndex, Drawable, LayoutChanges, LayoutListener, Node, Scene, SpatialIndex,
};
pub use style::{
    Align, BoxSizing, LayoutType, Length, Modifiers, Orientation, Overflow, PositionType,
    SizeValue, Style, StyleAccessor,
};
pub use template::{MemoryTemplates, Template, TemplateNode, TemplateSource};
