use crate::loader::Upload;
use crate::pipeline::Pipeline;
use crate::reporting::generator::ReportGenerator;
use crate::reporting::view::{ErrorView, PageModel, TablePreview};
use tracing::warn;

/// Handle one upload: parse it, analyse it and return what the page shows.
///
/// Never fails. Errors end up in [`PageModel::error`]; the preview is kept
/// whenever the file itself could be parsed.
pub fn render_upload(pipeline: &Pipeline, upload: &Upload) -> PageModel {
    let mut page = PageModel {
        file_name: upload.file_name.clone(),
        preview: None,
        report: None,
        error: None,
    };

    let df = match pipeline.load(upload) {
        Ok(df) => df,
        Err(e) => {
            warn!("Could not read {}: {}", upload.file_name, e);
            page.error = Some(ErrorView::from(&e));
            return page;
        }
    };

    match TablePreview::from_frame(&df, pipeline.config().preview_rows) {
        Ok(preview) => page.preview = Some(preview),
        Err(e) => warn!("Could not build preview for {}: {}", upload.file_name, e),
    }

    match pipeline.analyze(df) {
        Ok(analysis) => page.report = Some(ReportGenerator::build_view(&analysis)),
        Err(e) => {
            warn!("Analysis of {} failed: {}", upload.file_name, e);
            page.error = Some(ErrorView::from(&e));
        }
    }

    page
}
