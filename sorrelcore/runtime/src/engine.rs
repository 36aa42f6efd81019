//! The per-request engine instance.
//!
//! One engine exists per script execution and owns every piece of mutable
//! state the request can observe: the current ErrorState and all trap
//! tokens. Nothing here is ambient or global; disposing the engine at
//! request end is what guarantees error state never bleeds between
//! requests. The member-resolution cache is the single deliberate
//! exception — it is shared across requests and passed in by reference.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::{EngineConfig, LocaleConfig};
use crate::date;
use crate::dispatch::{shared_member_cache, MemberCache};
use crate::trap::{ErrorState, TrapSlot};

pub type YearProvider = Box<dyn Fn() -> i32>;

pub struct Engine {
    pub(crate) cache: Arc<MemberCache>,
    pub(crate) config: EngineConfig,
    pub(crate) error: Rc<RefCell<ErrorState>>,
    pub(crate) traps: RefCell<Vec<TrapSlot>>,
    pub(crate) year_provider: YearProvider,
}

impl Engine {
    pub fn new(cache: Arc<MemberCache>, config: EngineConfig) -> Engine {
        Engine {
            cache,
            config,
            error: Rc::new(RefCell::new(ErrorState::default())),
            traps: RefCell::new(Vec::new()),
            year_provider: Box::new(date::current_system_year),
        }
    }

    /// Process-wide shared cache, default configuration.
    pub fn with_defaults() -> Engine {
        Engine::new(shared_member_cache(), EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn locale(&self) -> &LocaleConfig {
        &self.config.locale
    }

    /// Override the ambient year used for year-less date literals (tests
    /// pin this for determinism).
    pub fn set_year_provider(&mut self, provider: impl Fn() -> i32 + 'static) {
        self.year_provider = Box::new(provider);
    }
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::with_defaults()
    }
}
