use std::result::Result as StdResult;

use thiserror::Error;

use crate::id::{TemplateId, WidgetId};

/// Result type for arbor operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("widget not found: {0:?}")]
    /// A widget key no longer resolves in the scene.
    WidgetNotFound(WidgetId),
    #[error("widget already attached: {0:?}")]
    /// Attach was called on a widget that already has a parent.
    AlreadyAttached(WidgetId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    /// Attach would make a widget its own ancestor.
    WouldCreateCycle {
        /// Requested parent.
        parent: WidgetId,
        /// Requested child.
        child: WidgetId,
    },
    #[error("widget {0:?} has no layout controller")]
    /// A scroll or virtualization call targeted a widget without a flex/grid layout.
    NoController(WidgetId),
    #[error("layout unresolved after {sweeps} sweeps: {widgets:?}")]
    /// The solver stopped making progress with records left non-final.
    Unresolved {
        /// Number of completed sweeps.
        sweeps: usize,
        /// Widgets whose records never finalized.
        widgets: Vec<WidgetId>,
    },
    #[error("layout exceeded the sweep ceiling of {limit}: {widgets:?}")]
    /// The solver was still progressing when the sweep ceiling was reached.
    SweepLimit {
        /// Configured ceiling.
        limit: usize,
        /// Widgets whose records were still non-final.
        widgets: Vec<WidgetId>,
    },
    #[error("template {0:?} is not registered")]
    /// A template id was used that the cache never handed out.
    UnknownTemplate(TemplateId),
    #[error("template load failed: {0}")]
    /// The template source could not produce a template.
    TemplateLoad(String),
    #[error("data source: {0}")]
    /// Data source failure, such as an unsupported sort property.
    DataSource(String),
    #[error("config: {0}")]
    /// Configuration could not be parsed.
    Config(String),
    #[error("invalid: {0}")]
    /// Invalid input error.
    Invalid(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
