use crate::resource::{IntentCollection, ResourceResolver, TemplateCollection};
use rand::Rng;
use rand::distr::Alphanumeric;
use std::cell::Cell;

pub const DEFAULT_LOCALE: &str = "en-us";
pub const DEFAULT_DIALOG_ID: &str = "main";
const DESIGNER_ID_LEN: usize = 6;

/// Produces designer ids for copied nodes whose id is already taken.
pub trait DesignerIdGenerator {
    fn next_id(&self) -> String;
}

/// Random six-character alphanumeric ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl DesignerIdGenerator for RandomIds {
    fn next_id(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(DESIGNER_ID_LEN)
            .map(char::from)
            .collect()
    }
}

/// Deterministic ids (`<prefix>1`, `<prefix>2`, ...), for reproducible runs.
#[derive(Debug, Default)]
pub struct SequentialIds {
    prefix: String,
    counter: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            counter: Cell::new(0),
        }
    }
}

impl DesignerIdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let next = self.counter.get() + 1;
        self.counter.set(next);
        format!("{}{}", self.prefix, next)
    }
}

/// Everything the synchronization functions need besides the trees themselves.
pub struct SyncContext<'r> {
    resolver: &'r dyn ResourceResolver,
    locale: String,
    dialog_id: String,
    ids: Box<dyn DesignerIdGenerator + 'r>,
}

pub struct SyncContextBuilder<'r> {
    resolver: &'r dyn ResourceResolver,
    locale: String,
    dialog_id: String,
    ids: Box<dyn DesignerIdGenerator + 'r>,
}

impl<'r> SyncContextBuilder<'r> {
    pub fn new(resolver: &'r dyn ResourceResolver) -> Self {
        Self {
            resolver,
            locale: DEFAULT_LOCALE.to_string(),
            dialog_id: DEFAULT_DIALOG_ID.to_string(),
            ids: Box::new(RandomIds),
        }
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = locale.to_string();
        self
    }

    /// The id used for collections when a dialog names no generator or recognizer file.
    pub fn with_dialog_id(mut self, dialog_id: &str) -> Self {
        self.dialog_id = dialog_id.to_string();
        self
    }

    pub fn with_id_generator(mut self, ids: impl DesignerIdGenerator + 'r) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn build(self) -> SyncContext<'r> {
        SyncContext {
            resolver: self.resolver,
            locale: self.locale,
            dialog_id: self.dialog_id,
            ids: self.ids,
        }
    }
}

impl<'r> SyncContext<'r> {
    pub fn builder(resolver: &'r dyn ResourceResolver) -> SyncContextBuilder<'r> {
        SyncContextBuilder::new(resolver)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn dialog_id(&self) -> &str {
        &self.dialog_id
    }

    /// `<base>.<locale>`, falling back to the dialog id for the base.
    pub fn collection_id(&self, base: Option<&str>) -> String {
        let base = base.filter(|b| !b.is_empty()).unwrap_or(self.dialog_id.as_str());
        format!("{}.{}", base, self.locale)
    }

    pub fn templates(&self, base: Option<&str>) -> Option<&'r TemplateCollection> {
        self.resolver.templates(&self.collection_id(base))
    }

    pub fn intents(&self, base: Option<&str>) -> Option<&'r IntentCollection> {
        self.resolver.intents(&self.collection_id(base))
    }

    pub fn next_designer_id(&self) -> String {
        self.ids.next_id()
    }
}
