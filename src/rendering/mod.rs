//! # Rendering
//!
//! Content templates and the job renderer that shapes bundle messages.

pub mod renderer;
pub mod templates;

pub use renderer::{JobRenderer, TemplateRenderer};
pub use templates::{
    ContentTemplate, FundraisingTemplate, FxaSignupTemplate, NewsletterTemplate, RenderContext,
    SendToDeviceTemplate, SimpleTemplate,
};
