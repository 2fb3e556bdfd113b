pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod logging;
pub mod router;
pub mod server;
pub mod translate;

pub use config::BridgeConfig;
pub use engine::{TranslationEngine, TranslationOutcome};
pub use error::{BridgeError, Result};
pub use logging::SharedLogger;
pub use router::{ModelMapping, ModelRouter};
pub use server::{build_router, AppState};
pub use translate::dialect::{ApiType, PayloadKind, TranslationDirection, TranslationMode};
