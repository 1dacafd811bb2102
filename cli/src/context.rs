use std::sync::Arc;

use grievance_core::{
    Renderer, ScrollCoordinator, ShelterBreakdown, Viewport, VizConfig, VizConfigExt,
};
use tokio::sync::RwLock;

use crate::svg::SvgBackend;

/// Container width used until the first `resize`.
pub const DEFAULT_WIDTH: f64 = 960.0;
/// Window height used until the first `resize`.
pub const DEFAULT_WINDOW_HEIGHT: f64 = 800.0;

/// The scrolling timeline, drawn into an SVG snapshot.
pub type Session = ScrollCoordinator<Renderer<SvgBackend>>;

/// Holds all shared state for the CLI application.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<VizConfig>>,
    /// None until a primary dataset loads successfully.
    session: Arc<RwLock<Option<Session>>>,
    /// Independent of the session; a failed summary load leaves this empty.
    pub breakdowns: Arc<RwLock<Vec<ShelterBreakdown>>>,
}

impl Default for CliContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CliContext {
    pub fn new() -> Self {
        Self::with_config(VizConfig::load())
    }

    pub fn with_config(config: VizConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            session: Arc::new(RwLock::new(None)),
            breakdowns: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn set_session(&self, session: Session) {
        *self.session.write().await = Some(session);
    }

    pub async fn clear_session(&self) {
        *self.session.write().await = None;
    }

    /// Viewport of the active session, or the startup default.
    pub async fn viewport(&self) -> Viewport {
        if let Some(session) = self.session.read().await.as_ref() {
            return *session.viewport();
        }
        let config = self.config.read().await;
        Viewport::from_container(DEFAULT_WIDTH, DEFAULT_WINDOW_HEIGHT, &config.layout)
    }

    /// Run `f` against the active session.
    pub async fn with_session<T>(&self, f: impl FnOnce(&mut Session) -> T) -> Result<T, String> {
        let mut guard = self.session.write().await;
        let session = guard
            .as_mut()
            .ok_or("No grievance data loaded (use `load --primary <file>`)\n")?;
        Ok(f(session))
    }
}
