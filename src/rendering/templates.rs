//! Content templates.
//!
//! A closed set of snippet layouts. Each variant knows its client-side code
//! name and version and renders itself into the `content` object the browser
//! consumes. Rich text fields are rewritten so that anchors become numbered
//! `<linkN>` tags with a side table of URLs, and `[[current_firefox_major_version]]`
//! is substituted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inputs that affect rendered output beyond the content itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub current_firefox_major_version: u32,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            current_firefox_major_version: 132,
        }
    }
}

const VERSION_VARIABLE: &str = "[[current_firefox_major_version]]";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleTemplate {
    pub title: String,
    pub text: String,
    pub icon_url: String,
    pub button_label: String,
    pub button_url: String,
    pub section_title_text: String,
    pub section_title_url: String,
    pub tall: bool,
    pub block_button_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FundraisingTemplate {
    pub title: String,
    pub text: String,
    pub icon_url: String,
    pub donation_form_url: String,
    pub currency_code: String,
    pub locale: String,
    pub amounts: Vec<u32>,
    pub highlight_amount: u32,
    pub button_label: String,
    pub monthly_checkbox_label_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FxaSignupTemplate {
    pub scene1_title: String,
    pub scene1_text: String,
    pub scene1_icon_url: String,
    pub scene1_button_label: String,
    pub scene2_title: String,
    pub scene2_text: String,
    pub scene2_button_label: String,
    pub scene2_email_placeholder_text: String,
    pub utm_campaign: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsletterTemplate {
    pub scene1_title: String,
    pub scene1_text: String,
    pub scene1_icon_url: String,
    pub scene1_button_label: String,
    pub scene2_text: String,
    pub scene2_button_label: String,
    pub scene2_email_placeholder_text: String,
    pub scene2_privacy_html: String,
    pub newsletter: String,
    pub success_text: String,
    pub error_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SendToDeviceTemplate {
    pub scene1_title: String,
    pub scene1_text: String,
    pub scene1_icon_url: String,
    pub scene1_button_label: String,
    pub scene2_text: String,
    pub scene2_button_label: String,
    pub scene2_input_placeholder: String,
    pub scene2_disclaimer_html: String,
    pub include_sms: bool,
    pub message_id_email: String,
    pub message_id_sms: String,
    pub success_text: String,
    pub error_text: String,
}

/// Every layout the browser knows how to display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "template", rename_all = "snake_case")]
pub enum ContentTemplate {
    Simple(SimpleTemplate),
    Fundraising(FundraisingTemplate),
    FxaSignup(FxaSignupTemplate),
    Newsletter(NewsletterTemplate),
    SendToDevice(SendToDeviceTemplate),
}

impl ContentTemplate {
    /// Template name the browser dispatches on
    pub fn code_name(&self) -> &'static str {
        match self {
            Self::Simple(_) => "simple_snippet",
            Self::Fundraising(_) => "eoy_snippet",
            Self::FxaSignup(_) => "fxa_signup_snippet",
            Self::Newsletter(_) => "newsletter_snippet",
            Self::SendToDevice(_) => "send_to_device_snippet",
        }
    }

    pub fn version(&self) -> &'static str {
        match self {
            Self::Simple(_) => "1.1.2",
            Self::Fundraising(_) => "1.1.0",
            Self::FxaSignup(_) => "1.0.0",
            Self::Newsletter(_) => "1.0.0",
            Self::SendToDevice(_) => "1.0.0",
        }
    }

    /// Render the `content` object. Empty strings are omitted.
    pub fn render(&self, ctx: &RenderContext) -> Value {
        let mut out = ContentBuilder::new(ctx);
        match self {
            Self::Simple(t) => {
                out.plain("title", &t.title);
                out.rich("text", &t.text);
                out.plain("icon", &t.icon_url);
                out.plain("button_label", &t.button_label);
                out.plain("button_url", &t.button_url);
                out.plain("section_title_text", &t.section_title_text);
                out.plain("section_title_url", &t.section_title_url);
                out.flag("tall", t.tall);
                out.plain("block_button_text", &t.block_button_text);
            }
            Self::Fundraising(t) => {
                out.plain("title", &t.title);
                out.rich("text", &t.text);
                out.plain("icon", &t.icon_url);
                out.plain("donation_form_url", &t.donation_form_url);
                out.plain("currency_code", &t.currency_code);
                out.plain("locale", &t.locale);
                for (index, amount) in t.amounts.iter().enumerate() {
                    out.value(&format!("donation_amount_{}", ordinal(index)), Value::from(*amount));
                }
                if t.highlight_amount > 0 {
                    out.value("selected_button", Value::from(t.highlight_amount));
                }
                out.plain("button_label", &t.button_label);
                out.plain("monthly_checkbox_label_text", &t.monthly_checkbox_label_text);
            }
            Self::FxaSignup(t) => {
                out.plain("scene1_title", &t.scene1_title);
                out.rich("scene1_text", &t.scene1_text);
                out.plain("scene1_icon", &t.scene1_icon_url);
                out.plain("scene1_button_label", &t.scene1_button_label);
                out.plain("scene2_title", &t.scene2_title);
                out.rich("scene2_text", &t.scene2_text);
                out.plain("scene2_button_label", &t.scene2_button_label);
                out.plain("scene2_email_placeholder_text", &t.scene2_email_placeholder_text);
                out.plain("utm_campaign", &t.utm_campaign);
            }
            Self::Newsletter(t) => {
                out.plain("scene1_title", &t.scene1_title);
                out.rich("scene1_text", &t.scene1_text);
                out.plain("scene1_icon", &t.scene1_icon_url);
                out.plain("scene1_button_label", &t.scene1_button_label);
                out.rich("scene2_text", &t.scene2_text);
                out.plain("scene2_button_label", &t.scene2_button_label);
                out.plain("scene2_email_placeholder_text", &t.scene2_email_placeholder_text);
                out.rich("scene2_privacy_html", &t.scene2_privacy_html);
                out.plain("scene2_newsletter", &t.newsletter);
                out.plain("success_text", &t.success_text);
                out.plain("error_text", &t.error_text);
            }
            Self::SendToDevice(t) => {
                out.plain("scene1_title", &t.scene1_title);
                out.rich("scene1_text", &t.scene1_text);
                out.plain("scene1_icon", &t.scene1_icon_url);
                out.plain("scene1_button_label", &t.scene1_button_label);
                out.rich("scene2_text", &t.scene2_text);
                out.plain("scene2_button_label", &t.scene2_button_label);
                out.plain("scene2_input_placeholder", &t.scene2_input_placeholder);
                out.rich("scene2_disclaimer_html", &t.scene2_disclaimer_html);
                out.flag("include_sms", t.include_sms);
                out.plain("message_id_email", &t.message_id_email);
                out.plain("message_id_sms", &t.message_id_sms);
                out.plain("success_text", &t.success_text);
                out.plain("error_text", &t.error_text);
            }
        }
        out.finish()
    }
}

fn ordinal(index: usize) -> &'static str {
    match index {
        0 => "first",
        1 => "second",
        2 => "third",
        _ => "fourth",
    }
}

/// Accumulates content fields and the shared link table
struct ContentBuilder<'a> {
    ctx: &'a RenderContext,
    fields: Map<String, Value>,
    links: Map<String, Value>,
}

impl<'a> ContentBuilder<'a> {
    fn new(ctx: &'a RenderContext) -> Self {
        Self {
            ctx,
            fields: Map::new(),
            links: Map::new(),
        }
    }

    fn substitute(&self, text: &str) -> String {
        text.replace(
            VERSION_VARIABLE,
            &self.ctx.current_firefox_major_version.to_string(),
        )
    }

    fn plain(&mut self, key: &str, value: &str) {
        if !value.is_empty() {
            let value = self.substitute(value);
            self.fields.insert(key.to_string(), Value::String(value));
        }
    }

    fn rich(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        let substituted = self.substitute(value);
        let text = extract_links(&substituted, &mut self.links);
        self.fields.insert(key.to_string(), Value::String(text));
    }

    fn flag(&mut self, key: &str, value: bool) {
        if value {
            self.fields.insert(key.to_string(), Value::Bool(true));
        }
    }

    fn value(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    fn finish(mut self) -> Value {
        if !self.links.is_empty() {
            self.fields
                .insert("links".to_string(), Value::Object(self.links));
        }
        Value::Object(self.fields)
    }
}

/// Rewrite `<a href="URL">text</a>` into `<linkN>text</linkN>`, recording
/// `linkN -> {"url": URL}`. Link numbering continues across fields.
fn extract_links(text: &str, links: &mut Map<String, Value>) -> String {
    const OPEN: &str = "<a href=\"";
    const CLOSE: &str = "</a>";

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(url_end) = after_open.find('"') else {
            break;
        };
        let url = &after_open[..url_end];
        let after_url = &after_open[url_end + 1..];
        let Some(tag_end) = after_url.find('>') else {
            break;
        };
        let body_and_rest = &after_url[tag_end + 1..];
        let Some(close) = body_and_rest.find(CLOSE) else {
            break;
        };

        let name = format!("link{}", links.len());
        out.push_str(&rest[..start]);
        out.push_str(&format!("<{name}>{}</{name}>", &body_and_rest[..close]));
        links.insert(name, serde_json::json!({ "url": url }));
        rest = &body_and_rest[close + CLOSE.len()..];
    }

    out.push_str(rest);
    out
}
