use std::fmt::Write as _;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

use super::labels::{Language, UiLabels};
use super::session::{Notice, NoticeLevel};
use crate::models::{DiagnosisRecord, PriceQueryResult};
use crate::upload::UploadedImage;

const NOT_AVAILABLE: &str = "N/A";

pub enum PricesView {
    Records(Vec<Value>),
    NoData(String),
    MissingCrop,
    Failed(String),
}

impl From<crate::Result<PriceQueryResult>> for PricesView {
    fn from(result: crate::Result<PriceQueryResult>) -> Self {
        match result {
            Ok(PriceQueryResult::NoData { crop }) => {
                PricesView::NoData(PriceQueryResult::no_data_message(&crop))
            }
            Ok(found) => PricesView::Records(found.records().to_vec()),
            Err(e) => PricesView::Failed(format!("Error fetching mandi prices: {}", e)),
        }
    }
}

pub struct ResultView<'a> {
    pub image: Option<&'a UploadedImage>,
    /// Diagnosis as shown, already translated when a translation succeeded.
    pub diagnosis: DiagnosisRecord,
    pub translation_error: Option<String>,
    pub prices: PricesView,
}

pub struct PageView<'a> {
    pub labels: &'a UiLabels,
    pub language: Language,
    pub notice: Option<Notice>,
    pub result: Option<ResultView<'a>>,
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn page(view: &PageView) -> String {
    let mut body = String::new();

    body.push_str(
        "<header><h1>AgroSnap</h1><p class=\"subtitle\">Your AI-powered farming assistant</p></header>",
    );

    if let Some(notice) = &view.notice {
        body.push_str(&notice_box(notice));
    }

    body.push_str(&upload_form(view.language));

    if let Some(result) = &view.result {
        body.push_str(&result_section(view.labels, view.language, result));
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>AgroSnap</title>\n<link rel=\"stylesheet\" href=\"/static/dashboard.css\">\n\
         </head>\n<body>\n<main class=\"container\">{}</main>\n</body>\n</html>\n",
        body
    )
}

fn notice_box(notice: &Notice) -> String {
    let class = match notice.level {
        NoticeLevel::Warning => "notice warning",
        NoticeLevel::Error => "notice error",
    };
    format!(
        "<div class=\"{}\" role=\"alert\">{}</div>",
        class,
        escape_html(&notice.message)
    )
}

fn upload_form(language: Language) -> String {
    format!(
        "<form class=\"upload\" method=\"post\" action=\"/dashboard/generate\" enctype=\"multipart/form-data\">\
         <input type=\"hidden\" name=\"lang\" value=\"{}\">\
         <label for=\"file\">Choose a file to upload...</label>\
         <input type=\"file\" id=\"file\" name=\"file\" accept=\".jpg,.jpeg,.png,image/jpeg,image/png\">\
         <p class=\"note\"><strong>Note:</strong> Do not upload confidential files.</p>\
         <button type=\"submit\">Generate</button></form>",
        language.name()
    )
}

fn result_section(labels: &UiLabels, language: Language, result: &ResultView) -> String {
    let label = |key: &'static str| escape_html(labels.get(key, language));
    let mut out = String::from("<section class=\"result\"><div class=\"column\">");

    if let Some(image) = result.image {
        let _ = write!(
            out,
            "<figure><img src=\"data:{};base64,{}\" alt=\"Uploaded Image\"><figcaption>Uploaded Image</figcaption></figure>",
            escape_html(&image.mime_type),
            STANDARD.encode(&image.data)
        );
    }

    let _ = write!(
        out,
        "<form class=\"language\" method=\"get\" action=\"/dashboard\"><fieldset><legend>{}</legend>",
        label("Select Language:")
    );
    for lang in Language::ALL {
        let _ = write!(
            out,
            "<label><input type=\"radio\" name=\"lang\" value=\"{0}\" onchange=\"this.form.submit()\"{1}> {0}</label>",
            lang.name(),
            if lang == language { " checked" } else { "" }
        );
    }
    out.push_str("</fieldset><noscript><button type=\"submit\">Apply</button></noscript></form></div>");

    out.push_str("<div class=\"column tabs\">");
    let _ = write!(
        out,
        "<input type=\"radio\" name=\"tab\" id=\"tab-analysis\" checked><label class=\"tab\" for=\"tab-analysis\">{}</label>\
         <input type=\"radio\" name=\"tab\" id=\"tab-prices\"><label class=\"tab\" for=\"tab-prices\">{}</label>",
        label("Crop Analysis"),
        label("Mandi Prices")
    );

    out.push_str("<div class=\"tab-panel\" id=\"panel-analysis\">");
    let _ = write!(out, "<h2>{}</h2>", label("Gemini Response"));
    if let Some(err) = &result.translation_error {
        out.push_str(&notice_box(&Notice::error(err.clone())));
    }
    let diagnosis = &result.diagnosis;
    let _ = write!(
        out,
        "<p><strong>{}</strong> {}</p><p><strong>{}</strong> {}</p><p><strong>{}</strong></p><div class=\"treatment\">{}</div>",
        label("Crop:"),
        text_or_na(&diagnosis.crop_name),
        label("Disease/Pest:"),
        text_or_na(&diagnosis.disease_pest),
        label("Treatment:"),
        text_or_na(&diagnosis.treatment)
    );
    out.push_str("</div>");

    out.push_str("<div class=\"tab-panel\" id=\"panel-prices\">");
    let _ = write!(out, "<h2>{}</h2>", label("Mandi Prices"));
    out.push_str(&prices_panel(&result.prices));
    out.push_str("</div></div></section>");

    out
}

fn text_or_na(value: &Option<String>) -> String {
    escape_html(value.as_deref().unwrap_or(NOT_AVAILABLE))
}

fn prices_panel(prices: &PricesView) -> String {
    match prices {
        PricesView::Records(records) => records_table(records),
        PricesView::NoData(message) => notice_box(&Notice::warning(message.clone())),
        PricesView::MissingCrop => notice_box(&Notice::warning(
            "Could not extract crop name from the response.",
        )),
        PricesView::Failed(message) => notice_box(&Notice::error(message.clone())),
    }
}

/// Upstream records are opaque; columns are every key seen, in first-seen order.
fn records_table(records: &[Value]) -> String {
    let rows: Vec<_> = records.iter().filter_map(Value::as_object).collect();

    let mut columns: Vec<&str> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut out = String::from("<table class=\"prices\"><thead><tr>");
    for column in &columns {
        let _ = write!(out, "<th>{}</th>", escape_html(column));
    }
    out.push_str("</tr></thead><tbody>");
    for row in &rows {
        out.push_str("<tr>");
        for column in &columns {
            let cell = match row.get(*column) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            let _ = write!(out, "<td>{}</td>", escape_html(&cell));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}
