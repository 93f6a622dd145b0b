//! Report rendering: the `ReportPayload` is filled into an HTML
//! template and converted to PDF via wkhtmltopdf when the binary is
//! available, falling back to the HTML itself for browser rendering.

use std::collections::HashMap;
use std::process::Stdio;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use tera::{Context, Tera};
use tokio::process::Command;
use tracing::{error, info, warn};
use voicequote_core::workflows::{RenderError, RenderedReport, ReportRenderer};
use voicequote_core::ReportPayload;

const REPORT_TEMPLATE: &str = "report.html.tera";
const REPORT_BASENAME: &str = "voice-ai-cost-analysis";

/// Register custom Tera filters used by the report template.
///
/// `money` formats a numeric or numeric-string value with two decimal
/// places, e.g. `costs.human_cost | money`.
pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("money", tera_money_filter);
}

fn tera_money_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    // Decimal amounts arrive as JSON strings; plain numbers appear in
    // hand-written contexts.
    let num = match value {
        tera::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        tera::Value::String(s) => s.parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(tera::Value::String(format!("{num:.2}")))
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("template error: {0}")]
    Template(String),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders report payloads. Template is embedded at compile time;
/// wkhtmltopdf is discovered from PATH once at construction.
#[derive(Clone, Debug)]
pub struct ReportPdfGenerator {
    tera: Tera,
    wkhtmltopdf_path: Option<String>,
}

impl ReportPdfGenerator {
    pub fn new() -> Self {
        let mut tera = Tera::default();
        register_template_filters(&mut tera);
        tera.add_raw_template(
            REPORT_TEMPLATE,
            include_str!("../../../templates/report.html.tera"),
        )
        .expect("embedded report template is valid");

        let wkhtmltopdf_path =
            which::which("wkhtmltopdf").ok().map(|p| p.to_string_lossy().to_string());

        if let Some(path) = &wkhtmltopdf_path {
            info!(path = %path, "wkhtmltopdf found");
        } else {
            warn!("wkhtmltopdf not found in PATH - reports will be delivered as HTML");
        }

        Self { tera, wkhtmltopdf_path }
    }

    /// A generator that always produces HTML, regardless of what is
    /// installed. Used where PDF conversion must not run (tests,
    /// environments without a display stack).
    pub fn html_only() -> Self {
        let mut generator = Self::new();
        generator.wkhtmltopdf_path = None;
        generator
    }

    pub async fn render_report(
        &self,
        payload: &ReportPayload,
    ) -> Result<RenderedReport, PdfError> {
        let html = self.render_html(payload)?;

        if let Some(wkhtmltopdf) = &self.wkhtmltopdf_path {
            match self.convert_html_to_pdf(&html, wkhtmltopdf).await {
                Ok(pdf_bytes) => {
                    return Ok(RenderedReport {
                        filename: format!("{REPORT_BASENAME}.pdf"),
                        content_type: "application/pdf",
                        bytes: pdf_bytes,
                    });
                }
                Err(error) => {
                    warn!(error = %error, "PDF conversion failed, falling back to HTML");
                }
            }
        }

        Ok(RenderedReport {
            filename: format!("{REPORT_BASENAME}.html"),
            content_type: "text/html; charset=utf-8",
            bytes: html.into_bytes(),
        })
    }

    fn render_html(&self, payload: &ReportPayload) -> Result<String, PdfError> {
        let value =
            serde_json::to_value(payload).map_err(|e| PdfError::Template(e.to_string()))?;

        let mut context = Context::new();
        context.insert("client", &value["client"]);
        context.insert("pricing", &value["pricing"]);
        context.insert("costs", &value["costs"]);
        context.insert("capacity", &value["capacity"]);
        context.insert("generated_date", &payload.generated_at.format("%Y-%m-%d").to_string());

        self.tera
            .render(REPORT_TEMPLATE, &context)
            .map_err(|e| PdfError::Template(e.to_string()))
    }

    async fn convert_html_to_pdf(
        &self,
        html: &str,
        wkhtmltopdf_path: &str,
    ) -> Result<Vec<u8>, PdfError> {
        let temp_dir = std::env::temp_dir();
        let token = uuid::Uuid::new_v4();
        let html_path = temp_dir.join(format!("report_{token}.html"));
        let pdf_path = temp_dir.join(format!("report_{token}.pdf"));

        tokio::fs::write(&html_path, html).await?;

        let output = Command::new(wkhtmltopdf_path)
            .arg("--page-size")
            .arg("A4")
            .arg("--margin-top")
            .arg("10mm")
            .arg("--margin-bottom")
            .arg("10mm")
            .arg("--margin-left")
            .arg("10mm")
            .arg("--margin-right")
            .arg("10mm")
            .arg("--encoding")
            .arg("utf-8")
            .arg(&html_path)
            .arg(&pdf_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(stderr = %stderr, "wkhtmltopdf failed");
            let _ = tokio::fs::remove_file(&html_path).await;
            return Err(PdfError::Conversion(stderr.to_string()));
        }

        let pdf_bytes = tokio::fs::read(&pdf_path).await?;

        let _ = tokio::fs::remove_file(&html_path).await;
        let _ = tokio::fs::remove_file(&pdf_path).await;

        info!(size = pdf_bytes.len(), "PDF generated successfully");

        Ok(pdf_bytes)
    }
}

impl Default for ReportPdfGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportRenderer for ReportPdfGenerator {
    async fn render(&self, payload: &ReportPayload) -> Result<RenderedReport, RenderError> {
        self.render_report(payload).await.map_err(|error| RenderError(error.to_string()))
    }
}

/// Wraps a rendered report in a download response.
pub fn report_response(report: RenderedReport) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, report.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report.filename),
        )
        .body(Body::from(report.bytes))
        .unwrap()
}
