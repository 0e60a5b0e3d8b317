//! Job payload rendering.
//!
//! Layers job-level fields over the snippet's rendered content. This is the
//! only place a payload is shaped; the bundle generator embeds the result
//! verbatim in `messages`.

use serde_json::{json, Value};

use super::templates::RenderContext;
use crate::models::JobRecord;

/// Renders one job into the payload object clients receive
pub trait JobRenderer: Send + Sync {
    /// `always_eval_to_false` replaces the targeting expression with `"false"`
    /// so the message ships for prefetch but never displays.
    fn render(&self, record: &JobRecord, ctx: &RenderContext, always_eval_to_false: bool) -> Value;
}

/// Default renderer backed by [`crate::rendering::ContentTemplate`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl JobRenderer for TemplateRenderer {
    fn render(&self, record: &JobRecord, ctx: &RenderContext, always_eval_to_false: bool) -> Value {
        let mut payload = record.snippet.render(ctx);

        let targeting = if always_eval_to_false {
            "false".to_string()
        } else {
            record.target.jexl_expr()
        };

        let custom: Vec<Value> = record
            .job
            .client_limits
            .custom_periods()
            .into_iter()
            .map(|(period, cap)| json!({ "period": period, "cap": cap }))
            .collect();
        let mut frequency = serde_json::Map::new();
        if record.job.client_limits.lifetime > 0 {
            frequency.insert("lifetime".into(), json!(record.job.client_limits.lifetime));
        }
        if !custom.is_empty() {
            frequency.insert("custom".into(), Value::Array(custom));
        }

        if let Value::Object(map) = &mut payload {
            map.insert("id".into(), Value::String(record.job.id.to_string()));
            map.insert("weight".into(), json!(record.job.weight));
            map.insert(
                "campaign".into(),
                Value::String(record.job.campaign.clone().unwrap_or_default()),
            );
            map.insert("targeting".into(), Value::String(targeting));
            if !frequency.is_empty() {
                map.insert("frequency".into(), Value::Object(frequency));
            }
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientLimits, Distribution, Job, Snippet, Target, TargetFilter};
    use crate::rendering::{ContentTemplate, SimpleTemplate};
    use chrono::Utc;
    use std::sync::Arc;

    fn record() -> JobRecord {
        let now = Utc::now();
        let mut target = Target::new(3, "default-browser", now);
        target.filters.push(TargetFilter::IsDefaultBrowser(true));
        let mut job = Job::new(42, 7, 3, 1, now);
        job.campaign = Some("spring".into());
        job.client_limits = ClientLimits {
            lifetime: 3,
            per_hour: 1,
            ..Default::default()
        };
        JobRecord {
            job,
            snippet: Arc::new(Snippet {
                id: 7,
                name: "hello".into(),
                locale_code: ",en,".into(),
                template: ContentTemplate::Simple(SimpleTemplate {
                    text: "Hello".into(),
                    ..Default::default()
                }),
                modified: now,
            }),
            target: Arc::new(target),
            distribution: Arc::new(Distribution {
                id: 1,
                name: "Default".into(),
            }),
        }
    }

    #[test]
    fn test_job_fields_override_snippet_id() {
        let payload = TemplateRenderer.render(&record(), &RenderContext::default(), false);
        assert_eq!(payload["id"], "42");
        assert_eq!(payload["template"], "simple_snippet");
        assert_eq!(payload["campaign"], "spring");
        assert_eq!(payload["weight"], 100);
        assert_eq!(payload["targeting"], "isDefaultBrowser == true");
        assert_eq!(payload["content"]["text"], "Hello");
        assert_eq!(
            payload["frequency"],
            json!({"lifetime": 3, "custom": [{"period": 3_600_000, "cap": 1}]})
        );
    }

    #[test]
    fn test_forced_false_targeting() {
        let payload = TemplateRenderer.render(&record(), &RenderContext::default(), true);
        assert_eq!(payload["targeting"], "false");
    }

    #[test]
    fn test_no_frequency_without_caps() {
        let mut record = record();
        record.job.client_limits = ClientLimits::default();
        record.job.campaign = None;
        let payload = TemplateRenderer.render(&record, &RenderContext::default(), false);
        assert!(payload.get("frequency").is_none());
        assert_eq!(payload["campaign"], "");
    }
}
