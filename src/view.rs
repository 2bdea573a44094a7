//! Pure presentation helpers derived from held entities: category colors, signed amounts and
//! display dates. Nothing here touches cache state.

use crate::model::{default_categories, Category, TransactionType, FALLBACK_COLOR};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

const DATE_FORMAT: &str = "%b %d,%Y";

/// Maps category names to display colors.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Palette {
    colors: HashMap<String, String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(default_categories())
    }
}

impl Palette {
    /// When two categories share a name, the first one wins.
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut colors = HashMap::new();
        for c in categories {
            colors.entry(c.name).or_insert(c.color);
        }
        Self { colors }
    }

    /// The color for `name`, or `#85929E` when no category has exactly that name.
    pub fn color_for(&self, name: &str) -> &str {
        self.colors
            .get(name)
            .map(String::as_str)
            .unwrap_or(FALLBACK_COLOR)
    }
}

/// The color of a built-in category. Total over all strings.
pub fn category_color(name: &str) -> &'static str {
    crate::model::DEFAULT_CATEGORIES
        .iter()
        .find(|(_, n, _, _)| *n == name)
        .map(|(_, _, color, _)| *color)
        .unwrap_or(FALLBACK_COLOR)
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Sign {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

serde_plain::derive_display_from_serialize!(Sign);
serde_plain::derive_fromstr_from_deserialize!(Sign);

/// The visual treatment of an amount: green for income, red for expenses.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
}

impl Tone {
    pub fn color(&self) -> &'static str {
        match self {
            Tone::Positive => "green",
            Tone::Negative => "red",
        }
    }
}

/// An amount ready for display, e.g. `+$12.50`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct SignedAmount {
    sign: Sign,
    value: String,
    tone: Tone,
}

impl SignedAmount {
    pub fn sign(&self) -> Sign {
        self.sign
    }

    /// The magnitude with exactly two decimal places and no currency symbol.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }
}

impl Display for SignedAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}${}", self.sign, self.value)
    }
}

/// Signs `amount` by `kind`. The stored sign of `amount` is ignored; only its magnitude is shown,
/// rounded half away from zero to two places.
pub fn format_amount(amount: Decimal, kind: TransactionType) -> SignedAmount {
    let mut magnitude = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    magnitude.rescale(2);
    let (sign, tone) = match kind {
        TransactionType::Income => (Sign::Plus, Tone::Positive),
        TransactionType::Expense => (Sign::Minus, Tone::Negative),
    };
    SignedAmount {
        sign,
        value: magnitude.to_string(),
        tone,
    }
}

/// Renders `date` as e.g. `Jan 05,2025`. Accepts `YYYY-MM-DD`, RFC 3339 and
/// `YYYY-MM-DDTHH:MM:SS[.f]`. Anything else is returned unchanged.
pub fn format_date(date: &str) -> String {
    let s = date.trim();
    let parsed = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|d| d.date())
        });
    match parsed {
        Some(d) => d.format(DATE_FORMAT).to_string(),
        None => date.to_string(),
    }
}
