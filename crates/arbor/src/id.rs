use slotmap::new_key_type;

new_key_type! {
    /// Opaque identifier for a widget stored in the scene arena.
    ///
    /// Keys are versioned, so a key held after its widget was removed simply
    /// fails to resolve. Layout records and deferred callbacks rely on this as
    /// their weak back-reference.
    pub struct WidgetId;
}

new_key_type! {
    /// Identifier for a registered widget template.
    pub struct TemplateId;
}

/// Identifier of a data source, reported back in paging requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceId(pub u64);
