//! Currency detection and conversion for caption text.
//!
//! Rates are a hardcoded table; there is no live feed.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::USD_TO_IDR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Idr,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Idr => "IDR",
        }
    }

    /// Locale whose number format is used when rendering this currency
    pub fn locale(self) -> &'static str {
        match self {
            Currency::Usd => "en-US",
            Currency::Idr => "id-ID",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Rate that converts one unit of `from` into `to`
pub fn exchange_rate(from: Currency, to: Currency) -> f64 {
    match (from, to) {
        (Currency::Usd, Currency::Idr) => USD_TO_IDR,
        (Currency::Idr, Currency::Usd) => 1.0 / USD_TO_IDR,
        _ => 1.0,
    }
}

/// Convert `amount` from `from` to `to` and render it in the target locale with 0-2 fraction digits.
///
/// ```
/// use mediakit_api::domain::currency::{Currency, format_currency};
/// assert_eq!(format_currency(10.0, Currency::Usd, Currency::Usd), "$10");
/// assert_eq!(format_currency(1.0, Currency::Usd, Currency::Idr), "Rp\u{a0}15.500");
/// ```
pub fn format_currency(amount: f64, from: Currency, to: Currency) -> String {
    render(amount * exchange_rate(from, to), to)
}

fn render(amount: f64, currency: Currency) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let cents = (amount.abs() * 100.0).round() as u128;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    let whole = cents / 100;
    let frac = cents % 100;

    let frac_digits = if frac == 0 {
        String::new()
    } else if frac % 10 == 0 {
        (frac / 10).to_string()
    } else {
        format!("{:02}", frac)
    };

    match currency {
        Currency::Usd => {
            let mut out = format!("{}${}", sign, group_thousands(whole, ','));
            if !frac_digits.is_empty() {
                out.push('.');
                out.push_str(&frac_digits);
            }
            out
        }
        Currency::Idr => {
            let mut out = format!("{}Rp\u{a0}{}", sign, group_thousands(whole, '.'));
            if !frac_digits.is_empty() {
                out.push(',');
                out.push_str(&frac_digits);
            }
            out
        }
    }
}

fn group_thousands(value: u128, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Parse a matched amount, treating every `.` and `,` as a thousands separator
fn parse_amount(raw: &str) -> Option<f64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Multiplier for an Indonesian magnitude word
fn magnitude(word: &str) -> f64 {
    match word {
        "ribu" => 1e3,
        "juta" => 1e6,
        "miliar" => 1e9,
        "triliun" => 1e12,
        _ => 1.0,
    }
}

struct CurrencyRule {
    pattern: Regex,
    source: Currency,
    amount: fn(&Captures<'_>) -> Option<f64>,
}

fn explicit_amount(caps: &Captures<'_>) -> Option<f64> {
    parse_amount(caps.get(1)?.as_str())
}

fn scaled_amount(caps: &Captures<'_>) -> Option<f64> {
    let base = parse_amount(caps.get(1)?.as_str())?;
    let scale = caps.get(2).map_or(1.0, |m| magnitude(m.as_str()));
    Some(base * scale).filter(|v| v.is_finite())
}

/// Result of rewriting a piece of text
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub text: String,
    pub changed: bool,
}

/// Ordered monetary patterns applied in one left-to-right pass.
///
/// At each position the earliest match across all rules wins; ties go to the
/// rule listed first (`$`, then `Rp`, then bare magnitude words). Replaced
/// text is never scanned again, so a converted amount cannot be re-matched
/// by a later rule.
pub struct CurrencyRewriter {
    rules: Vec<CurrencyRule>,
}

impl CurrencyRewriter {
    pub fn new() -> Self {
        let rules = vec![
            CurrencyRule {
                pattern: compile(r"\$\s*([0-9]+(?:[.,][0-9]+)*)"),
                source: Currency::Usd,
                amount: explicit_amount,
            },
            CurrencyRule {
                pattern: compile(
                    r"Rp\.?\s*([0-9]+(?:[.,][0-9]+)*)(?:\s*(ribu|juta|miliar|triliun)\b)?",
                ),
                source: Currency::Idr,
                amount: scaled_amount,
            },
            CurrencyRule {
                pattern: compile(r"([0-9]+(?:[.,][0-9]+)*)\s*(ribu|juta|miliar|triliun)\b"),
                source: Currency::Idr,
                amount: scaled_amount,
            },
        ];
        Self { rules }
    }

    pub fn rewrite(&self, text: &str, target: Currency) -> Rewrite {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;

        // Next match of each rule at or after `cursor`. A rule is searched again
        // only once the cursor has moved past the start of its cached match, and
        // a rule with no match left stays `None` for the rest of the pass.
        let mut pending: Vec<Option<Captures<'_>>> = self
            .rules
            .iter()
            .map(|rule| rule.pattern.captures_at(text, 0))
            .collect();

        loop {
            for (rule, slot) in self.rules.iter().zip(pending.iter_mut()) {
                let overtaken = slot
                    .as_ref()
                    .and_then(|caps| caps.get(0))
                    .is_some_and(|whole| whole.start() < cursor);
                if overtaken {
                    *slot = rule.pattern.captures_at(text, cursor);
                }
            }

            let next = pending
                .iter()
                .enumerate()
                .filter_map(|(index, caps)| Some((index, caps.as_ref()?.get(0)?)))
                // min_by_key keeps the first of equal keys, which is rule order
                .min_by_key(|(_, whole)| whole.start());

            let Some((index, whole)) = next else {
                break;
            };

            let rule = &self.rules[index];
            out.push_str(&text[cursor..whole.start()]);
            match pending[index].as_ref().and_then(|caps| (rule.amount)(caps)) {
                Some(value) => out.push_str(&format_currency(value, rule.source, target)),
                None => out.push_str(whole.as_str()),
            }
            cursor = whole.end();
        }
        out.push_str(&text[cursor..]);

        let changed = out != text;
        Rewrite { text: out, changed }
    }
}

impl Default for CurrencyRewriter {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &str) -> Regex {
    // Patterns are literals covered by tests; failure here is a programming error.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid currency pattern {pattern:?}: {e}"))
}
