//! Client matching: channel resolution, locale containment and job selection.

pub mod channel;
pub mod engine;
pub mod locale;

pub use channel::resolve_channel;
pub use engine::{match_jobs, JobMatcher};
pub use locale::{language_prefix, locale_code_matches, parse_locale_code};
