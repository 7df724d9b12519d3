//! Quote export: the plain-text summary used for copy/share, and an HTML
//! rendition of the same lines used as the email body.

use crate::core::{Job, PricingConfig, QuoteResult, Stump};
use crate::i18n::I18n;

/// Build the plain-text line-item summary of a quote
pub fn quote_summary(job: &Job, config: &PricingConfig, quote: &QuoteResult, i18n: &I18n) -> String {
    summary_lines(job, config, quote, i18n).join("\n")
}

/// Same content as [`quote_summary`], one escaped paragraph per line
pub fn quote_html(job: &Job, config: &PricingConfig, quote: &QuoteResult, i18n: &I18n) -> String {
    let lines = summary_lines(job, config, quote, i18n);
    let mut html = String::from("<!DOCTYPE html><html><body>");

    if let Some((title, rest)) = lines.split_first() {
        html.push_str(&format!("<h2>{}</h2>", escape_html(title)));
        for line in rest {
            html.push_str(&format!("<p>{}</p>", escape_html(line)));
        }
    }

    html.push_str("</body></html>");
    html
}

fn summary_lines(job: &Job, config: &PricingConfig, quote: &QuoteResult, i18n: &I18n) -> Vec<String> {
    let money = |amount: f64| i18n.format_currency(amount, &config.currency);
    let mut lines = Vec::with_capacity(job.stumps.len() + 8);

    lines.push(format!("{} \u{2014} {}", config.company_name, i18n.get("quote.title")));
    if !job.client_name.is_empty() {
        lines.push(format!("{}: {}", i18n.get("quote.client"), job.client_name));
    }
    if !job.address.is_empty() {
        lines.push(format!("{}: {}", i18n.get("quote.address"), job.address));
    }
    lines.push(format!("{}: {}", i18n.get("quote.stumps"), job.stumps.len()));

    for (idx, stump) in job.stumps.iter().enumerate() {
        lines.push(stump_line(idx + 1, stump, i18n));
    }

    lines.push(format!("{}: {}", i18n.get("quote.subtotal"), money(quote.subtotal)));
    if config.tax_enabled {
        lines.push(format!("{}: {}", i18n.get("quote.tax"), money(quote.tax_amount)));
    }
    lines.push(format!("{}: {}", i18n.get("quote.total"), money(quote.total)));

    if let Some(kg) = quote.chip_estimate_kg() {
        lines.push(format!(
            "{}: {} {}",
            i18n.get("quote.chips"),
            i18n.format_decimal(kg, 1),
            i18n.get("unit.kilograms")
        ));
    }

    lines
}

/// `#2 18" • Back fence • haul-away • deep • roots 4ft`
fn stump_line(position: usize, stump: &Stump, i18n: &I18n) -> String {
    let mut line = format!("#{} {}\"", position, stump.diameter);

    if let Some(location) = stump.location_description.as_deref().filter(|l| !l.is_empty()) {
        line.push_str(&format!(" \u{2022} {}", location));
    }
    if stump.haul_away {
        line.push_str(&format!(" \u{2022} {}", i18n.get("stump.haul_away")));
    }
    if stump.deep_grind {
        line.push_str(&format!(" \u{2022} {}", i18n.get("stump.deep_grind")));
    }
    if stump.root_chasing_ft != 0.0 {
        line.push_str(&format!(
            " \u{2022} {} {}{}",
            i18n.get("stump.roots"),
            stump.root_chasing_ft,
            i18n.get("unit.feet")
        ));
    }
    if stump.access_issue {
        line.push_str(&format!(" \u{2022} {}", i18n.get("stump.narrow_access")));
    }

    line
}

fn escape_html(text: &str) -> String {
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
