//! Shared helpers for registry and holder tests.
//!
//! `MockLoader` serves modules from an in-process symbol table and records
//! every load and unload in a `Journal`. Components built by the journal
//! factory record their creation and destruction in the same journal, so
//! tests can check both load/unload symmetry and destroy-before-unload
//! ordering.

#![allow(dead_code)]

use std::collections::HashMap;
use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use component_host::library::canonical_filename;
use component_host::{Error, ModuleLoader, Platform, Result, SymbolAddress, DESTROY_SYMBOL};
use component_sdk::prelude::*;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// Name of the mock module exporting every factory.
pub const TEST_MODULE: &str = "Test_Component";
/// Name of a mock module that exports a factory but no destroy function.
pub const NO_DESTROY_MODULE: &str = "No_Destroy_Component";

pub const JOURNAL_FACTORY: &str = "Test_Component_Factory";
pub const NULL_FACTORY: &str = "Null_Component_Factory";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Load(PathBuf),
    Create(String),
    Destroy(String),
    Unload(PathBuf),
}

static NEXT_JOURNAL: AtomicUsize = AtomicUsize::new(1);
static JOURNALS: Lazy<Mutex<HashMap<usize, Weak<Journal>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Ordered record of module and component lifecycle events.
#[derive(Debug)]
pub struct Journal {
    id: usize,
    events: Mutex<Vec<Event>>,
}

impl Journal {
    pub fn new() -> Arc<Self> {
        component_host::logging::init();
        let journal = Arc::new(Self {
            id: NEXT_JOURNAL.fetch_add(1, Ordering::SeqCst),
            events: Mutex::new(Vec::new()),
        });
        JOURNALS
            .lock()
            .insert(journal.id, Arc::downgrade(&journal));
        journal
    }

    fn find(id: usize) -> Option<Arc<Self>> {
        JOURNALS.lock().get(&id).and_then(Weak::upgrade)
    }

    /// Configuration string routing a component to this journal.
    pub fn config(&self, user: &str) -> String {
        format!("{}|{}", self.id, user)
    }

    pub fn record(&self, event: Event) {
        self.events.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn loads(&self) -> usize {
        self.count(|e| matches!(e, Event::Load(_)))
    }

    pub fn unloads(&self) -> usize {
        self.count(|e| matches!(e, Event::Unload(_)))
    }

    pub fn creates(&self) -> usize {
        self.count(|e| matches!(e, Event::Create(_)))
    }

    pub fn destroys(&self) -> usize {
        self.count(|e| matches!(e, Event::Destroy(_)))
    }

    /// Modules loaded and not yet unloaded.
    pub fn live_modules(&self) -> usize {
        self.loads() - self.unloads()
    }

    fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }
}

/// Component that reports its lifetime to a journal.
pub struct JournalComponent {
    journal: Arc<Journal>,
    user_config: String,
}

impl Component for JournalComponent {}

impl Drop for JournalComponent {
    fn drop(&mut self) {
        self.journal
            .record(Event::Destroy(self.user_config.clone()));
    }
}

fn create_journal_component(config: &str) -> Option<JournalComponent> {
    let (id, user) = config.split_once('|')?;
    let journal = Journal::find(id.parse().ok()?)?;
    journal.record(Event::Create(user.to_string()));
    Some(JournalComponent {
        journal,
        user_config: user.to_string(),
    })
}

fn refuse(_config: &str) -> Option<JournalComponent> {
    None
}

export_components! {
    Test_Component_Factory => create_journal_component,
    Null_Component_Factory => refuse,
}

#[derive(Debug)]
pub struct MockModule {
    path: PathBuf,
}

/// Loader serving modules from an in-process symbol table.
pub struct MockLoader {
    journal: Arc<Journal>,
    platform: Platform,
    modules: HashMap<PathBuf, HashMap<&'static str, usize>>,
}

impl MockLoader {
    /// Loader for the host platform with the standard test modules.
    pub fn new(journal: &Arc<Journal>) -> Self {
        Self::for_platform(journal, Platform::current())
    }

    pub fn for_platform(journal: &Arc<Journal>, platform: Platform) -> Self {
        Self {
            journal: Arc::clone(journal),
            platform,
            modules: HashMap::new(),
        }
        .with_test_module(TEST_MODULE)
        .with_module(
            NO_DESTROY_MODULE,
            &[(JOURNAL_FACTORY, Test_Component_Factory as usize)],
        )
    }

    /// Serve the standard test module under another name.
    pub fn with_test_module(self, name: impl AsRef<Path>) -> Self {
        self.with_module(
            name,
            &[
                (JOURNAL_FACTORY, Test_Component_Factory as usize),
                (NULL_FACTORY, Null_Component_Factory as usize),
                (DESTROY_SYMBOL, component_destroy as usize),
            ],
        )
    }

    pub fn with_module(mut self, name: impl AsRef<Path>, symbols: &[(&'static str, usize)]) -> Self {
        let path = canonical_filename(name.as_ref(), self.platform);
        self.modules
            .insert(path, symbols.iter().copied().collect());
        self
    }
}

impl ModuleLoader for MockLoader {
    type Handle = MockModule;

    fn platform(&self) -> Platform {
        self.platform
    }

    fn open(&self, path: &Path) -> Result<MockModule> {
        if !self.modules.contains_key(path) {
            return Err(Error::ModuleLoadFailed {
                path: path.to_path_buf(),
                reason: "no such module".to_string(),
            });
        }
        self.journal.record(Event::Load(path.to_path_buf()));
        Ok(MockModule {
            path: path.to_path_buf(),
        })
    }

    fn resolve(&self, module: &MockModule, symbol: &str) -> Result<SymbolAddress> {
        self.modules
            .get(&module.path)
            .and_then(|symbols| symbols.get(symbol))
            .and_then(|&address| SymbolAddress::new(address as *mut c_void))
            .ok_or_else(|| Error::SymbolNotFound {
                path: module.path.clone(),
                symbol: symbol.to_string(),
                reason: "undefined symbol".to_string(),
            })
    }

    fn unload(&self, module: MockModule) -> Result<()> {
        self.journal.record(Event::Unload(module.path));
        Ok(())
    }
}

/// Canonical filename of `name` on the host platform.
pub fn canonical(name: &str) -> PathBuf {
    canonical_filename(Path::new(name), Platform::current())
}
