//! Content items delivered by Jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::matching::locale::parse_locale_code;
use crate::rendering::{ContentTemplate, RenderContext};

/// A piece of content plus the locales it is written for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: i64,
    pub name: String,
    /// Comma-wrapped, comma-delimited codes: `,en,fr,` or `,en-us,`
    pub locale_code: String,
    pub template: ContentTemplate,
    pub modified: DateTime<Utc>,
}

impl Snippet {
    /// Locale prefixes this snippet targets, malformed entries dropped
    pub fn locales(&self) -> Vec<String> {
        parse_locale_code(&self.locale_code)
    }

    /// Content payload before job-level fields are layered on
    pub fn render(&self, ctx: &RenderContext) -> Value {
        serde_json::json!({
            "id": self.id.to_string(),
            "template": self.template.code_name(),
            "template_version": self.template.version(),
            "content": self.template.render(ctx),
        })
    }
}
