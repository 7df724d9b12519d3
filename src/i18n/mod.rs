//! Internationalization module
//!
//! Provides translations for English (en) and French (fr), plus the number
//! and currency formatting used when presenting a quote.
//! Supports automatic language detection based on system locale.

mod en;
mod fr;

use std::collections::HashMap;

/// Non-breaking space used by French number formatting
const NBSP: char = '\u{00A0}';

/// Internationalization manager
pub struct I18n {
    current_lang: String,
    translations: HashMap<String, String>,
}

impl I18n {
    /// Create a new I18n instance with the specified language
    pub fn new(lang: &str) -> Self {
        let mut i18n = Self {
            current_lang: String::new(),
            translations: HashMap::new(),
        };
        i18n.set_language(lang);
        i18n
    }

    /// Set the current language
    pub fn set_language(&mut self, lang: &str) {
        let lang = if lang == "auto" {
            detect_system_language()
        } else {
            lang.to_string()
        };

        self.translations = match lang.as_str() {
            "fr" => fr::get_translations(),
            _ => en::get_translations(),
        };
        self.current_lang = if lang == "fr" { lang } else { "en".to_string() };

        log::debug!("Language set to: {}", self.current_lang);
    }

    /// Get a translated string by key
    pub fn get(&self, key: &str) -> String {
        self.translations
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Get the current language code
    pub fn current_language(&self) -> &str {
        &self.current_lang
    }

    /// Format a money amount for display in the given currency.
    ///
    /// English puts the symbol first (`$1,234.56`), French after the amount
    /// with spaces as group separators (`1 234,56 $`). No conversion happens;
    /// the currency only selects the symbol.
    pub fn format_currency(&self, amount: f64, currency: &str) -> String {
        let symbol = currency_symbol(currency, &self.current_lang);
        let (negative, digits) = self.split_number(amount, 2);

        let sign = if negative { "-" } else { "" };
        if self.current_lang == "fr" {
            format!("{}{}{}{}", sign, digits, NBSP, symbol.trim_end())
        } else {
            format!("{}{}{}", sign, symbol, digits)
        }
    }

    /// Format a plain number with a fixed number of decimals
    pub fn format_decimal(&self, value: f64, places: usize) -> String {
        let (negative, digits) = self.split_number(value, places);
        if negative {
            format!("-{}", digits)
        } else {
            digits
        }
    }

    /// Round, group thousands, and localize the decimal mark of `value`'s magnitude
    fn split_number(&self, value: f64, places: usize) -> (bool, String) {
        let fixed = format!("{:.*}", places, value.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (fixed.as_str(), None),
        };

        let (group_sep, decimal_mark) = if self.current_lang == "fr" {
            (NBSP, ',')
        } else {
            (',', '.')
        };

        let mut out = group_thousands(int_part, group_sep);
        if let Some(frac) = frac_part {
            out.push(decimal_mark);
            out.push_str(frac);
        }

        // Don't print "-0.00" for tiny negatives
        let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
        (value < 0.0 && !is_zero, out)
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("auto")
    }
}

/// Display symbol for a currency code, as a Canadian locale shows it.
/// Only CAD gets the bare `$`; other dollars carry their country.
/// Unknown codes are shown as-is.
pub fn currency_symbol(currency: &str, lang: &str) -> String {
    let french = lang == "fr";
    match currency.to_ascii_uppercase().as_str() {
        "CAD" => "$".to_string(),
        "USD" if french => "$\u{00A0}US".to_string(),
        "USD" => "US$".to_string(),
        "AUD" if french => "$\u{00A0}AU".to_string(),
        "AUD" => "A$".to_string(),
        "NZD" if french => "$\u{00A0}NZ".to_string(),
        "NZD" => "NZ$".to_string(),
        "EUR" => "\u{20AC}".to_string(),
        "GBP" => "\u{00A3}".to_string(),
        other => format!("{} ", other),
    }
}

fn group_thousands(digits: &str, sep: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

/// Detect system language
fn detect_system_language() -> String {
    // Try to detect from environment variables
    let lang_env = std::env::var("LANG")
        .or_else(|_| std::env::var("LC_ALL"))
        .or_else(|_| std::env::var("LC_MESSAGES"))
        .unwrap_or_else(|_| "en".to_string());

    // Extract language code (e.g., "fr_CA.UTF-8" -> "fr")
    let lang_code = lang_env
        .split('_')
        .next()
        .unwrap_or("en")
        .split('.')
        .next()
        .unwrap_or("en");

    // Only return supported languages
    match lang_code {
        "fr" => "fr".to_string(),
        _ => "en".to_string(),
    }
}
