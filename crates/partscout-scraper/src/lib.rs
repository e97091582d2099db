//! Headless-browser search across general web search and registered
//! specialized sources.
//!
//! A [`SearchOrchestrator`] drives one [`renderer::RendererSession`] per
//! request through the general and specialized categories and aggregates
//! the tagged results.

pub mod error;
pub mod listing;
pub mod orchestrator;
pub mod renderer;

pub use error::{RenderError, SearchError};
pub use orchestrator::{SearchOrchestrator, SearchPhase, SearchSettings};
pub use renderer::fake::{FakeRenderer, FakeStats};
pub use renderer::webdriver::{WebDriverRenderer, WebDriverSettings};
pub use renderer::{Renderer, RendererSession, SessionGuard};
