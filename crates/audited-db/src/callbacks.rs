//! Named, ordered callback chains run before every create and update.
//!
//! Each chain is a list of `(name, callback)` processors executed in order
//! against the write's [`Scope`]. Processors can be appended, placed right
//! after a named anchor, looked up, and removed:
//!
//! ```
//! use audited_db::callbacks::{BEFORE_CREATE, Callbacks};
//!
//! let mut callbacks = Callbacks::default();
//! if callbacks.create().get("app:normalize").is_none() {
//!     callbacks
//!         .create_mut()
//!         .after(BEFORE_CREATE)
//!         .register("app:normalize", |_scope| Ok(()));
//! }
//! assert_eq!(
//!     callbacks.create().names(),
//!     ["orm:before_create", "app:normalize", "orm:update_time_stamp"]
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use audited_core::columns::{CREATED_AT, UPDATED_AT};

use crate::error::DatabaseError;
use crate::helpers::datetime_value;
use crate::scope::Scope;

/// Built-in step that runs `Model::before_create`.
pub const BEFORE_CREATE: &str = "orm:before_create";
/// Built-in step that runs `Model::before_update`.
pub const BEFORE_UPDATE: &str = "orm:before_update";
/// Built-in step that sets `created_at` / `updated_at`.
pub const UPDATE_TIME_STAMP: &str = "orm:update_time_stamp";

pub type CallbackFn = Arc<dyn Fn(&mut Scope<'_>) -> Result<(), DatabaseError> + Send + Sync>;

#[derive(Clone)]
struct Processor {
    name: String,
    func: CallbackFn,
}

/// An ordered list of named processors.
#[derive(Clone, Default)]
pub struct CallbackChain {
    processors: Vec<Processor>,
}

impl CallbackChain {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CallbackFn> {
        self.processors
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.func)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Append a processor to the end of the chain.
    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&mut Scope<'_>) -> Result<(), DatabaseError> + Send + Sync + 'static,
    {
        self.insert(None, name, Arc::new(func));
    }

    /// Start a registration placed right after `anchor`.
    pub fn after<'c>(&'c mut self, anchor: &str) -> Registrar<'c> {
        Registrar {
            chain: self,
            anchor: anchor.to_string(),
        }
    }

    /// Remove the processor named `name`. Returns whether one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.processors.len();
        self.processors.retain(|p| p.name != name);
        self.processors.len() != before
    }

    /// Run every processor in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first processor's error; later processors do not run.
    pub fn run(&self, scope: &mut Scope<'_>) -> Result<(), DatabaseError> {
        for processor in &self.processors {
            tracing::trace!(callback = %processor.name, table = scope.table_name(), "running callback");
            (processor.func)(scope)?;
        }
        Ok(())
    }

    fn insert(&mut self, anchor: Option<&str>, name: &str, func: CallbackFn) {
        if let Some(existing) = self.processors.iter_mut().find(|p| p.name == name) {
            tracing::warn!(callback = name, "callback already registered, replacing it");
            existing.func = func;
            return;
        }

        let processor = Processor {
            name: name.to_string(),
            func,
        };
        let position = anchor.and_then(|anchor| {
            let found = self.processors.iter().position(|p| p.name == anchor);
            if found.is_none() {
                tracing::warn!(callback = name, anchor, "anchor callback not found, appending");
            }
            found.map(|idx| idx + 1)
        });
        match position {
            Some(idx) => self.processors.insert(idx, processor),
            None => self.processors.push(processor),
        }
    }
}

impl fmt::Debug for CallbackChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Pending registration from [`CallbackChain::after`].
pub struct Registrar<'c> {
    chain: &'c mut CallbackChain,
    anchor: String,
}

impl Registrar<'_> {
    /// Insert the processor right after the anchor, or at the end of the
    /// chain if the anchor is not registered.
    pub fn register<F>(self, name: &str, func: F)
    where
        F: Fn(&mut Scope<'_>) -> Result<(), DatabaseError> + Send + Sync + 'static,
    {
        self.chain.insert(Some(&self.anchor), name, Arc::new(func));
    }
}

/// The create and update chains of one database handle.
#[derive(Clone, Debug)]
pub struct Callbacks {
    create: CallbackChain,
    update: CallbackChain,
}

impl Default for Callbacks {
    /// Chains with the built-in steps:
    /// create = `orm:before_create`, `orm:update_time_stamp`;
    /// update = `orm:before_update`, `orm:update_time_stamp`.
    fn default() -> Self {
        let mut callbacks = Self::empty();
        callbacks.create.register(BEFORE_CREATE, before_create);
        callbacks.create.register(UPDATE_TIME_STAMP, create_time_stamp);
        callbacks.update.register(BEFORE_UPDATE, before_update);
        callbacks.update.register(UPDATE_TIME_STAMP, update_time_stamp);
        callbacks
    }
}

impl Callbacks {
    /// Chains with no processors at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            create: CallbackChain::default(),
            update: CallbackChain::default(),
        }
    }

    #[must_use]
    pub const fn create(&self) -> &CallbackChain {
        &self.create
    }

    pub const fn create_mut(&mut self) -> &mut CallbackChain {
        &mut self.create
    }

    #[must_use]
    pub const fn update(&self) -> &CallbackChain {
        &self.update
    }

    pub const fn update_mut(&mut self) -> &mut CallbackChain {
        &mut self.update
    }
}

fn before_create(scope: &mut Scope<'_>) -> Result<(), DatabaseError> {
    scope.record_mut().before_create()
}

fn before_update(scope: &mut Scope<'_>) -> Result<(), DatabaseError> {
    scope.record_mut().before_update()
}

fn create_time_stamp(scope: &mut Scope<'_>) -> Result<(), DatabaseError> {
    let now = datetime_value(&scope.now());
    for column in [CREATED_AT, UPDATED_AT] {
        if scope.has_column(column) {
            scope.set_column(column, now.clone())?;
        }
    }
    Ok(())
}

fn update_time_stamp(scope: &mut Scope<'_>) -> Result<(), DatabaseError> {
    if !scope.has_column(UPDATED_AT) {
        return Ok(());
    }
    let now = datetime_value(&scope.now());
    if let Some(attrs) = scope.update_attrs_mut() {
        attrs.insert(UPDATED_AT.to_string(), now);
        return Ok(());
    }
    scope.set_column(UPDATED_AT, now)
}
