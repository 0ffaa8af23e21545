//! Page rendering

use crate::error::Result;
use dqis_core::PageModel;
use handlebars::Handlebars;
use serde::Serialize;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.hbs");
const INDEX: &str = "index";

pub const TITLE: &str = "AI-Based Data Quality Intelligence System";
pub const INTRO: &str = "Upload any dataset to automatically evaluate its quality using AI + ML.";
pub const SIDEBAR_NOTE: &str = "Upload a CSV or Excel file to begin the analysis.";

#[derive(Serialize)]
struct PageContext<'a> {
    title: &'static str,
    intro: &'static str,
    sidebar: &'static str,
    page: Option<&'a PageModel>,
    download_href: Option<String>,
}

/// Compiled page templates.
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_template_string(INDEX, INDEX_TEMPLATE)?;
        Ok(Self { registry })
    }

    /// Render the upload page, with the results of one upload when given.
    pub fn render(&self, page: Option<&PageModel>) -> Result<String> {
        let download_href = page
            .and_then(|p| p.report.as_ref())
            .map(|r| download_href(&r.download.mime_type, &r.download.content));

        let context = PageContext {
            title: TITLE,
            intro: INTRO,
            sidebar: SIDEBAR_NOTE,
            page,
            download_href,
        };

        Ok(self.registry.render(INDEX, &context)?)
    }
}

/// Inline `data:` link so the report downloads without a second request.
pub fn download_href(mime_type: &str, content: &str) -> String {
    format!(
        "data:{};charset=utf-8,{}",
        mime_type,
        urlencoding::encode(content)
    )
}
