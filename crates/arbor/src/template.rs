//! Widget templates: prefabs cloned into virtualized containers.
//!
//! Loading is asynchronous from the layout engine's point of view. A
//! `try_load` on an unloaded template queues a job and returns
//! [`LoadState::Pending`]; the job runs later (see
//! `Scene::process_template_loads`) and every widget that asked for the
//! template is handed back so its layout can be recalculated.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    id::{TemplateId, WidgetId},
    style::Style,
};

/// One node of a template subtree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateNode {
    /// Name given to widgets cloned from this node.
    pub name: String,
    /// Style declarations of the node.
    pub style: Style,
    /// Child nodes.
    pub children: Vec<TemplateNode>,
}

impl TemplateNode {
    /// Construct a leaf node.
    pub fn new(name: &str, style: Style) -> Self {
        Self {
            name: name.to_string(),
            style,
            children: Vec::new(),
        }
    }

    /// Append a child node.
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

/// A loaded template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    /// Root of the subtree instantiated per item.
    pub root: TemplateNode,
}

/// Something that can produce templates by asset guid.
pub trait TemplateSource {
    /// Load the template for an asset guid.
    fn load(&self, guid: &str) -> Result<Template>;
}

/// A template source holding templates in memory.
#[derive(Debug, Default)]
pub struct MemoryTemplates {
    /// Templates by guid.
    templates: HashMap<String, Template>,
}

impl MemoryTemplates {
    /// Register a template under a guid.
    pub fn insert(&mut self, guid: &str, template: Template) {
        self.templates.insert(guid.to_string(), template);
    }
}

impl TemplateSource for MemoryTemplates {
    fn load(&self, guid: &str) -> Result<Template> {
        self.templates
            .get(guid)
            .cloned()
            .ok_or_else(|| Error::TemplateLoad(format!("no template for {guid:?}")))
    }
}

/// Result of asking for a template.
#[derive(Debug, Clone)]
pub enum LoadState {
    /// The template is loaded.
    Ready(Arc<Template>),
    /// A load is queued or in flight.
    Pending,
}

/// Load status of one registered template.
enum Entry {
    /// Never requested, or a previous load failed.
    Unloaded,
    /// A load job is queued.
    Queued,
    /// Loaded and shared.
    Loaded(Arc<Template>),
}

/// Registered template with its asset guid.
struct Registered {
    /// Asset guid.
    guid: String,
    /// Load status.
    entry: Entry,
}

/// Registry and loader of widget templates.
pub struct TemplateCache {
    /// Registered templates.
    entries: SlotMap<TemplateId, Registered>,
    /// Lookup from guid to id.
    by_guid: HashMap<String, TemplateId>,
    /// Loader.
    source: Box<dyn TemplateSource>,
    /// Queued load jobs.
    jobs: VecDeque<TemplateId>,
    /// Widgets waiting on each template.
    waiters: HashMap<TemplateId, Vec<WidgetId>>,
}

impl TemplateCache {
    /// Construct a cache backed by a template source.
    pub fn new(source: Box<dyn TemplateSource>) -> Self {
        Self {
            entries: SlotMap::with_key(),
            by_guid: HashMap::new(),
            source,
            jobs: VecDeque::new(),
            waiters: HashMap::new(),
        }
    }

    /// Return the id for an asset guid, registering it if needed.
    pub fn find_or_register(&mut self, guid: &str) -> TemplateId {
        if let Some(id) = self.by_guid.get(guid) {
            return *id;
        }
        let id = self.entries.insert(Registered {
            guid: guid.to_string(),
            entry: Entry::Unloaded,
        });
        self.by_guid.insert(guid.to_string(), id);
        id
    }

    /// Return the loaded template, or queue a load on behalf of `requester`.
    pub fn try_load(&mut self, id: TemplateId, requester: WidgetId) -> Result<LoadState> {
        let reg = self.entries.get_mut(id).ok_or(Error::UnknownTemplate(id))?;
        match &reg.entry {
            Entry::Loaded(t) => Ok(LoadState::Ready(Arc::clone(t))),
            Entry::Queued => {
                let waiters = self.waiters.entry(id).or_default();
                if !waiters.contains(&requester) {
                    waiters.push(requester);
                }
                Ok(LoadState::Pending)
            }
            Entry::Unloaded => {
                debug!(guid = %reg.guid, "queueing template load");
                reg.entry = Entry::Queued;
                self.jobs.push_back(id);
                self.waiters.entry(id).or_default().push(requester);
                Ok(LoadState::Pending)
            }
        }
    }

    /// The loaded template, if any.
    pub fn get(&self, id: TemplateId) -> Option<Arc<Template>> {
        match self.entries.get(id).map(|r| &r.entry) {
            Some(Entry::Loaded(t)) => Some(Arc::clone(t)),
            _ => None,
        }
    }

    /// True if load jobs are queued.
    pub fn has_pending(&self) -> bool {
        !self.jobs.is_empty()
    }

    /// Run queued load jobs and return the widgets that were waiting on them.
    /// Failed loads go back to unloaded so the waiter's next pass retries.
    pub fn run_jobs(&mut self) -> Vec<WidgetId> {
        let mut ready = Vec::new();
        while let Some(id) = self.jobs.pop_front() {
            let Some(reg) = self.entries.get_mut(id) else {
                continue;
            };
            match self.source.load(&reg.guid) {
                Ok(t) => {
                    debug!(guid = %reg.guid, "template loaded");
                    reg.entry = Entry::Loaded(Arc::new(t));
                    ready.extend(self.waiters.remove(&id).unwrap_or_default());
                }
                Err(e) => {
                    warn!(guid = %reg.guid, error = %e, "template load failed, will retry");
                    reg.entry = Entry::Unloaded;
                    ready.extend(self.waiters.remove(&id).unwrap_or_default());
                }
            }
        }
        ready
    }
}
