//! Report generation module.
//!
//! Turns the result of a run into what users see:
//! - [`ReportView`]: figures, verdict, chart and download for a page
//! - the plain-text artifact offered as `data_quality_report.txt`
//! - [`JsonReport`]: machine-readable summary for `--json` and `--emit-report`
//! - [`render_upload`]: one upload in, one [`PageModel`] out
//!
//! # Example
//!
//! ```rust,ignore
//! use dqis_core::reporting::{render_upload, ReportGenerator};
//!
//! let page = render_upload(&pipeline, &upload);
//! if let Some(report) = &page.report {
//!     println!("{}", report.verdict);
//!     std::fs::write(&report.download.file_name, &report.download.content)?;
//! }
//! ```

mod generator;
mod page;
mod view;

pub use generator::{JsonReport, ReportGenerator};
pub use page::render_upload;
pub use view::{
    BarChart, ChartBar, DownloadArtifact, ErrorView, PageModel, ReportView, TablePreview,
};
