//! Process-wide lifecycle
//!
//! `init()` builds the shared [`Runtime`] once; later calls return the same
//! one. `shutdown()` drops it, after which operations fail with
//! [`LazyPdfError::NotInitialized`] until the next `init()`.
//!
//! The runtime holds settings only. Documents never outlive a call, so
//! there is nothing to drain on shutdown: calls already holding a runtime
//! finish with the settings they started with.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::engine::MupdfEngine;
use crate::error::{LazyPdfError, Result};
use crate::render::Renderer;

static RUNTIME: RwLock<Option<Runtime>> = parking_lot::const_rwlock(None);

/// Shared, immutable process state
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

struct RuntimeInner {
    config: Config,
    renderer: Renderer<MupdfEngine>,
}

impl Runtime {
    fn new(config: Config) -> Self {
        let renderer = Renderer::new(MupdfEngine::new())
            .with_limits(config.limits())
            .with_compression(config.render.png_compression);
        Self {
            inner: Arc::new(RuntimeInner { config, renderer }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn renderer(&self) -> &Renderer<MupdfEngine> {
        &self.inner.renderer
    }
}

/// Initialize from the environment (and `.env`). Idempotent.
pub fn init() -> Runtime {
    if let Some(runtime) = RUNTIME.read().as_ref() {
        return runtime.clone();
    }

    init_with(Config::from_env())
}

/// Initialize with an explicit configuration.
///
/// If a runtime already exists it is kept and returned unchanged.
pub fn init_with(config: Config) -> Runtime {
    let mut slot = RUNTIME.write();
    if let Some(runtime) = slot.as_ref() {
        return runtime.clone();
    }

    if let Some(filter) = &config.logging.filter {
        install_subscriber(filter);
    }

    tracing::info!(
        max_dimension = config.render.max_dimension,
        max_pixels = config.render.max_pixels,
        compression = ?config.render.png_compression,
        "Initialized LazyPDF v{}",
        env!("CARGO_PKG_VERSION")
    );

    let runtime = Runtime::new(config);
    *slot = Some(runtime.clone());
    runtime
}

/// Tear down the process-wide state. Returns whether anything was torn down.
pub fn shutdown() -> bool {
    let previous = RUNTIME.write().take();
    if previous.is_some() {
        tracing::info!("Shut down LazyPDF");
    }
    previous.is_some()
}

/// The initialized runtime
pub fn current() -> Result<Runtime> {
    RUNTIME.read().clone().ok_or(LazyPdfError::NotInitialized)
}

pub fn is_initialized() -> bool {
    RUNTIME.read().is_some()
}

// A host that already installed a global subscriber keeps it.
fn install_subscriber(directive: &str) {
    let (filter, invalid) = match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new("lazypdf=info"), Some(e)),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if let Some(e) = invalid {
        tracing::warn!("Invalid LAZYPDF_LOG directive {:?}: {}, using lazypdf=info", directive, e);
    }
}
