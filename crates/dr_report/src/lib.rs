//! ResponseFormatter (§4.9): renders a `ValidationResult` into a stable
//! report for downstream consumers (tests, CLI, chat UI).
//!
//! `render_text` is the canonical human-readable shape; `render_json`
//! (behind the `report-json` feature) is the same information as a
//! machine-readable document for programmatic callers. Neither renderer
//! recomputes anything — both read the already-finalized `ValidationResult`
//! and `Violation`/`SlotUtilization` values the orchestrator produced.

#![forbid(unsafe_code)]

pub mod hints;
pub mod render_text;

#[cfg(feature = "report-json")]
pub mod render_json;

pub mod prelude {
    pub use crate::render_text::render_text;

    #[cfg(feature = "report-json")]
    pub use crate::render_json::render_json;
}
