//! Deterministic artifact filenames.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Fold a display name into an ASCII filename component.
///
/// Diacritics are stripped, whitespace runs become `_`, and characters
/// outside `[A-Za-z0-9_.-]` are dropped.
pub fn sanitize(name: &str) -> String {
    let folded: String = name.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let joined = whitespace_runs().replace_all(folded.trim(), "_");
    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}

/// `<Full_Name>_CV.json`, the name used for JSON document exports.
pub fn json_export_name(full_name: &str) -> String {
    format!("{}_CV.json", sanitize(full_name))
}

/// `CV_<First_Name>_<date>.pdf`, the name used by the direct-capture export.
pub fn direct_pdf_name(full_name: &str, date: NaiveDate) -> String {
    let first = full_name.split_whitespace().next().unwrap_or("Resume");
    let first = match sanitize(first) {
        s if s.is_empty() => "Resume".to_string(),
        s => s,
    };
    format!("CV_{}_{}.pdf", first, date.format("%Y-%m-%d"))
}

/// `<base>-<date>[-<suffix>].<extension>`.
pub fn dated_name(base: &str, date: NaiveDate, suffix: Option<&str>, extension: &str) -> String {
    let base = match sanitize(base) {
        s if s.is_empty() => "CV".to_string(),
        s => s,
    };
    match suffix {
        Some(suffix) => format!("{}-{}-{}.{}", base, date.format("%Y-%m-%d"), suffix, extension),
        None => format!("{}-{}.{}", base, date.format("%Y-%m-%d"), extension),
    }
}
