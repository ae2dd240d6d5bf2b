//! HTML for the two-column prediction page.

use std::fmt::Write as _;

use crate::{
    artifacts::Encoders,
    features::OrgSize,
    format::{format_amount, format_lakhs},
    prediction::PredictionResult,
    summary::{Summary, CSV_FILE_NAME},
};

/// What the right-hand panel shows
#[derive(Debug, Clone)]
pub enum PageState {
    AwaitingInput,
    Success {
        result: PredictionResult,
        summary: Summary,
        csv_uri: String,
    },
    Failed {
        message: String,
    },
}

/// Current form selections, echoed back so a re-render keeps them
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    pub education: String,
    pub employment: String,
    pub dev_type: String,
    pub experience: String,
    pub country: String,
    pub org_size: String,
    pub target_currency: String,
}

pub struct Page<'a> {
    pub title: &'a str,
    pub tagline: &'a str,
    pub encoders: &'a Encoders,
    pub currencies: &'a [String],
    pub values: &'a FormValues,
    pub state: &'a PageState,
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;}\
.columns{display:flex;gap:2rem;}\
.left{flex:2;}.right{flex:1;}\
.fields{display:grid;grid-template-columns:1fr 1fr;gap:1rem;}\
label{display:block;font-weight:bold;margin-bottom:.25rem;}\
select,input{width:100%;padding:.4rem;}\
.success{background:#e6f4ea;padding:1rem;margin-top:1rem;}\
.info{background:#e8f0fe;padding:1rem;margin-top:.5rem;}\
.error{background:#fce8e6;padding:1rem;margin-top:1rem;}\
table.summary td{padding:.3rem .6rem;vertical-align:top;}\
img.placeholder{width:100%;}";

pub fn render_page(page: &Page<'_>) -> String {
    let mut html = String::with_capacity(8 * 1024);

    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{title}</title><style>{STYLE}</style></head><body>\
         <h1>{title}</h1><p>{tagline}</p><div class=\"columns\">",
        title = escape_html(page.title),
        tagline = escape_html(page.tagline),
    );

    html.push_str("<div class=\"left\">");
    render_form(&mut html, page);
    render_outcome(&mut html, page.state);
    html.push_str("</div>");

    html.push_str("<div class=\"right\">");
    render_side_panel(&mut html, page.state);
    html.push_str("</div>");

    html.push_str("</div></body></html>");
    html
}

fn render_form(html: &mut String, page: &Page<'_>) {
    let values = page.values;
    let org_sizes: Vec<String> = OrgSize::labels().into_iter().map(String::from).collect();

    html.push_str("<h2>Enter Employee Details</h2>");
    html.push_str("<form method=\"post\" action=\"/predict\"><div class=\"fields\"><div>");
    render_select(html, "education", "Education Level", page.encoders.education.valid_labels(), &values.education);
    render_select(html, "employment", "Employment Type", page.encoders.employment.valid_labels(), &values.employment);
    render_select(html, "dev_type", "Developer Role", page.encoders.dev_type.valid_labels(), &values.dev_type);
    let experience = if values.experience.is_empty() { "0.0" } else { values.experience.as_str() };
    let _ = write!(
        html,
        "<p><label for=\"experience\">Years of Experience</label>\
         <input type=\"number\" id=\"experience\" name=\"experience\" min=\"0\" step=\"0.5\" value=\"{}\"></p>",
        escape_html(experience)
    );
    html.push_str("</div><div>");
    render_select(html, "country", "Country", page.encoders.country.valid_labels(), &values.country);
    render_select(html, "org_size", "Organization Size", &org_sizes, &values.org_size);
    render_select(html, "target_currency", "Convert predicted salary to:", page.currencies, &values.target_currency);
    html.push_str("</div></div><p><button type=\"submit\">Predict Salary</button></p></form>");
}

fn render_select(html: &mut String, name: &str, label: &str, options: &[String], selected: &str) {
    let _ = write!(
        html,
        "<p><label for=\"{name}\">{label}</label><select id=\"{name}\" name=\"{name}\">",
        name = name,
        label = escape_html(label),
    );
    for option in options {
        let option = escape_html(option);
        let marker = if option == escape_html(selected) { " selected" } else { "" };
        let _ = write!(html, "<option value=\"{0}\"{1}>{0}</option>", option, marker);
    }
    html.push_str("</select></p>");
}

fn render_outcome(html: &mut String, state: &PageState) {
    match state {
        PageState::AwaitingInput => {}
        PageState::Success { result, .. } => {
            let currency = escape_html(&result.target_currency);
            let _ = write!(
                html,
                "<div class=\"success\">Predicted Annual Salary: {} {}</div>\
                 <div class=\"info\">Equivalent in ₹: ₹{} (~ ₹{} Lakhs)</div>",
                currency,
                format_amount(result.converted),
                format_amount(result.inr),
                format_lakhs(result.lakhs),
            );
        }
        PageState::Failed { .. } => {}
    }
}

fn render_side_panel(html: &mut String, state: &PageState) {
    match state {
        PageState::AwaitingInput => {
            html.push_str("<img class=\"placeholder\" src=\"/static/home.png\" alt=\"\">");
        }
        PageState::Success { summary, csv_uri, .. } => {
            html.push_str("<h2>Prediction Summary</h2><table class=\"summary\">");
            for row in summary.rows() {
                let _ = write!(
                    html,
                    "<tr><td><strong>{}</strong></td><td>{}</td></tr>",
                    escape_html(&row.label),
                    escape_html(&row.value)
                );
            }
            let _ = write!(
                html,
                "</table><p><a href=\"{}\" download=\"{}\">Download Summary as CSV</a></p>",
                csv_uri, CSV_FILE_NAME
            );
        }
        PageState::Failed { message } => {
            let _ = write!(html, "<div class=\"error\">Error: {}</div>", escape_html(message));
        }
    }
}
