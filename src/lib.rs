//! Streaming subtitle generation with a bounded local history.
//!
//! ## Sessions
//!
//! [`session::SessionController`] runs one generation at a time. Starting a
//! session revokes the previous one; a revoked session never delivers another
//! fragment, never reports an error and never writes history. A session that
//! streams to completion with non-empty text is committed to the history log
//! (newest first, at most 50 records).
//!
//! ## Settings
//!
//! Stored settings are untyped JSON and may come from an older schema
//! (`apiKey`, `apiUrl`, `selectedModels`, `useServer`). They always pass
//! through [`settings::reconcile`] before use, which guarantees a non-empty
//! model catalog and an endpoint without trailing slashes.
//!
//! ## Transport modes
//!
//! - `client`: POST `{endpoint}/v1/chat/completions` with a bearer credential,
//!   streamed back as chat-completion SSE deltas.
//! - `server`: POST `{text, lang, model}` to `{endpoint}/api/generate` on a
//!   relay that owns the credential, streamed back as plain UTF-8 text.
//!
//! ## Binary
//!
//! `subtitle_studio [--lang en|zh] [--model ID] [FILE]` reads FILE or stdin
//! and streams the result to stdout. State lives under
//! `SUBTITLE_STUDIO_HOME` (default `./.subtitle_studio`);
//! `SUBTITLE_STUDIO_API_KEY` overrides the stored credential for one run.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod settings;
pub mod source;
pub mod stream;

pub use app::Studio;
pub use error::{ConfigurationError, GenerationError};
pub use session::{CancelReason, SessionController, SessionEvent, SessionOutcome};
pub use settings::{reconcile, resolve_selected_model, Settings};
