//! # Text Processing Module
//!
//! Regex-based extraction of lead data from free-form user messages.
//!
//! ## Features
//!
//! - Monthly bill amounts, including grouped digits ("5 000") and thousands
//!   suffixes ("5к", "5 тыс", "5k")
//! - Russian mobile numbers in `+7XXXXXXXXXX` / `8XXXXXXXXXX` form with
//!   optional separators
//! - Names, with common lead-in phrases stripped ("меня зовут Иван")
//! - Keyword detection for property categories and lead intent

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

/// Maximum accepted name length in characters
pub const MAX_NAME_LENGTH: usize = 100;

const COMMERCIAL_KEYWORDS: &[&str] = &[
    "бизнес", "офис", "магазин", "склад", "производств", "цех", "кафе", "ресторан",
    "гостиниц", "отель", "предприят", "компани", "торгов", "business", "office", "shop",
    "store", "warehouse", "factory", "hotel", "restaurant", "company",
];

const RURAL_KEYWORDS: &[&str] = &[
    "дача", "дачу", "дачи", "дачн", "деревн", "село", "селе", "посёл", "посел", "снт",
    "хутор", "ферм", "отключ", "нет сети", "без сети", "нет электричества", "cottage",
    "village", "farm", "off-grid", "off grid", "outage",
];

const OBJECT_KEYWORDS: &[&str] = &[
    "дом", "квартир", "коттедж", "таунхаус", "house", "home", "apartment", "flat",
];

const LEAD_INTENT_KEYWORDS: &[&str] = &[
    "расчёт", "расчет", "рассчит", "посчита", "заявк", "инженер", "стоимост", "сколько стоит",
    "подобрать", "подбери", "calculate", "estimate", "quote", "engineer", "how much",
];

const NAME_PREFIXES: &[&str] = &[
    "меня зовут", "моё имя", "мое имя", "зовут", "это", "я", "my name is", "i am", "i'm",
    "name is", "call me",
];

lazy_static! {
    // Floor area mentions such as "120 м2" or "150 квадратов" are not money
    static ref AREA_REGEX: Regex = Regex::new(
        r"(?i)\d+(?:[.,]\d+)?\s*(?:м2|м²|кв\.?\s*м\.?|кв\b\.?|квадрат\w*|sq\.?\s*m|m2|m²)"
    )
    .expect("Area pattern should be valid");
    // "5 000" / "12 500" written with space or narrow no-break space grouping
    static ref GROUPED_DIGITS_REGEX: Regex =
        Regex::new(r"\b(\d{1,3})(?:[ \u{00A0}\u{202F}](\d{3}))+\b")
            .expect("Grouped digits pattern should be valid");
    // "к"/"k" only right after the digits: "500 к концу месяца" is not 500 000
    static ref THOUSANDS_REGEX: Regex = Regex::new(
        r"(?i)\b(\d{1,3}(?:[.,]\d)?)(?:\s*(?:тыс\w*\.?|тр\b|т\.р\.?)|[кk]\b)"
    )
    .expect("Thousands pattern should be valid");
    static ref AMOUNT_REGEX: Regex =
        Regex::new(r"(?:^|\D)(\d{3,6})(?:\D|$)").expect("Amount pattern should be valid");
    static ref PHONE_REGEX: Regex = Regex::new(
        r"(?:^|[^\d+])(\+7|8)[\s\-]*\(?(\d{3})\)?[\s\-]*(\d{3})[\s\-]*(\d{2})[\s\-]*(\d{2})(?:\D|$)"
    )
    .expect("Phone pattern should be valid");
}

/// Drop floor areas and rewrite grouped digits and thousands suffixes as plain digit runs
fn normalize_amounts(text: &str) -> String {
    let without_area = AREA_REGEX.replace_all(text, " ");
    let ungrouped = GROUPED_DIGITS_REGEX.replace_all(&without_area, |caps: &regex::Captures| {
        caps[0].chars().filter(|c| c.is_ascii_digit()).collect::<String>()
    });

    THOUSANDS_REGEX
        .replace_all(&ungrouped, |caps: &regex::Captures| {
            let value: f64 = caps[1].replace(',', ".").parse().unwrap_or(0.0);
            format!("{}", (value * 1000.0).round() as u64)
        })
        .into_owned()
}

/// Extract a monthly bill amount from free text.
///
/// Returns the first run of exactly 3 to 6 digits after normalization,
/// or `None` when there is no such run or it is zero.
pub fn parse_bill_amount(text: &str) -> Option<u32> {
    let normalized = normalize_amounts(text);
    trace!(original = %text, normalized = %normalized, "Normalized bill text");

    AMOUNT_REGEX
        .captures(&normalized)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|amount| *amount > 0)
}

/// Extract a phone number and normalize it to `+7XXXXXXXXXX`
pub fn extract_phone(text: &str) -> Option<String> {
    let caps = PHONE_REGEX.captures(text)?;
    Some(format!("+7{}{}{}{}", &caps[2], &caps[3], &caps[4], &caps[5]))
}

/// Validate a name input and strip common lead-in phrases
pub fn extract_name(text: &str) -> Result<String, &'static str> {
    let mut name = text.trim().trim_end_matches(['.', '!', ')']).trim();

    let lowered = name.to_lowercase();
    for prefix in NAME_PREFIXES {
        let Some(rest) = lowered.strip_prefix(prefix) else {
            continue;
        };
        // Only strip whole words
        if !rest.starts_with(|c: char| c.is_whitespace() || c == ',' || c == ':') {
            continue;
        }
        if let Some(stripped) = name.get(prefix.len()..) {
            name = stripped.trim_start_matches([',', ':']).trim();
            break;
        }
    }

    if name.is_empty() {
        return Err("empty");
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err("too_long");
    }

    if !name.chars().any(char::is_alphabetic) || name.chars().any(|c| c.is_ascii_digit()) {
        return Err("invalid");
    }

    let mut chars = name.chars();
    Ok(match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    })
}

const MONEY_KEYWORDS: &[&str] = &[
    "₽", "руб", "тыс", "платеж", "платёж", "плачу", "в месяц", "/мес", "счёт", "счет",
    "rub", "per month", "a month", "/month", "bill", "pay",
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

/// Whether the text names a business property
pub fn mentions_commercial(text: &str) -> bool {
    contains_any(text, COMMERCIAL_KEYWORDS)
}

/// Whether the text describes a rural or poorly connected property
pub fn mentions_rural(text: &str) -> bool {
    contains_any(text, RURAL_KEYWORDS)
}

/// Whether the text names any kind of property
pub fn mentions_object(text: &str) -> bool {
    contains_any(text, OBJECT_KEYWORDS) || mentions_commercial(text) || mentions_rural(text)
}

/// Whether the text talks about money rather than a year or an area
pub fn mentions_money(text: &str) -> bool {
    contains_any(text, MONEY_KEYWORDS) || THOUSANDS_REGEX.is_match(text)
}

/// Whether the user asks for a calculation or a contact with an engineer
pub fn mentions_lead_intent(text: &str) -> bool {
    contains_any(text, LEAD_INTENT_KEYWORDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_amounts() {
        assert_eq!(normalize_amounts("5 000 руб"), "5000 руб");
        assert_eq!(normalize_amounts("около 5к"), "около 5000");
        assert_eq!(normalize_amounts("7,5 тыс."), "7500");
        assert_eq!(normalize_amounts("дом 120 м2"), "дом  ");
    }

    #[test]
    fn test_name_prefix_requires_word_boundary() {
        // "Яна" starts with "я" but is a name
        assert_eq!(extract_name("Яна").unwrap(), "Яна");
        assert_eq!(extract_name("я Пётр").unwrap(), "Пётр");
    }
}
