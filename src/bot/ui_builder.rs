//! UI Builder module for creating keyboards and formatting messages

use chrono::{DateTime, Utc};
use teloxide::types::{ButtonRequest, KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::dialogue::Lead;
use crate::estimator::Estimate;

/// Transport-independent keyboard attached to a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKeyboard {
    /// Common property types
    ObjectChoices,
    /// Single button sharing the user's phone contact
    SharePhone,
    /// Hide any custom keyboard
    Remove,
}

/// Format an integer with space-separated thousands, e.g. `483 000`
pub fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(' ');
        }
        result.push(digit);
    }

    result
}

/// Format a number with one decimal, using a decimal comma for Russian
pub fn format_decimal(value: f64, language: &str) -> String {
    let formatted = format!("{value:.1}");
    if language == "ru" {
        formatted.replace('.', ",")
    } else {
        formatted
    }
}

fn estimate_args(estimate: &Estimate, language: &str) -> [(&'static str, String); 6] {
    [
        ("station", t_lang(estimate.station_type.message_key(), language)),
        ("monthly_kwh", group_thousands(estimate.monthly_kwh as u64)),
        ("power", format_decimal(estimate.power_kw, language)),
        ("cost_min", group_thousands(estimate.cost_min)),
        ("cost_max", group_thousands(estimate.cost_max)),
        ("payback", format_decimal(estimate.payback_years, language)),
    ]
}

/// Human-readable estimate sent to the user
pub fn format_estimate(estimate: &Estimate, language: &str) -> String {
    let args = estimate_args(estimate, language);
    let borrowed: Vec<(&str, &str)> = args.iter().map(|(k, v)| (*k, v.as_str())).collect();
    t_args_lang("estimate-summary", &borrowed, language)
}

/// Prompt asking the model to comment on an estimate
pub fn format_commentary_request(lead: &Lead, estimate: &Estimate, language: &str) -> String {
    let unknown = t_lang("region-unknown", language);
    let object = lead.object_type.clone().unwrap_or_else(|| unknown.clone());
    let region = lead.region.clone().unwrap_or_else(|| unknown.clone());
    let bill = group_thousands(u64::from(estimate.bill_amount));

    let args = estimate_args(estimate, language);
    let mut borrowed: Vec<(&str, &str)> = args.iter().map(|(k, v)| (*k, v.as_str())).collect();
    borrowed.push(("object", object.as_str()));
    borrowed.push(("region", region.as_str()));
    borrowed.push(("bill", bill.as_str()));

    t_args_lang("commentary-request", &borrowed, language)
}

/// Summary of a completed lead for the manager chat
pub fn format_lead_notification(lead: &Lead, language: &str) -> String {
    let unknown = t_lang("region-unknown", language);
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| unknown.clone());
    let timestamp = lead
        .timestamp
        .map(|ts: DateTime<Utc>| ts.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| unknown.clone());

    let name = field(&lead.name);
    let phone = field(&lead.phone);
    let object = field(&lead.object_type);
    let region = field(&lead.region);
    let bill = field(&lead.monthly_bill);

    t_args_lang(
        "lead-notification",
        &[
            ("name", name.as_str()),
            ("phone", phone.as_str()),
            ("object", object.as_str()),
            ("region", region.as_str()),
            ("bill", bill.as_str()),
            ("timestamp", timestamp.as_str()),
        ],
        language,
    )
}

/// Build the Telegram markup for a keyboard
pub fn build_reply_markup(keyboard: ReplyKeyboard, language: &str) -> ReplyMarkup {
    match keyboard {
        ReplyKeyboard::ObjectChoices => {
            let buttons = vec![
                vec![
                    KeyboardButton::new(t_lang("button-house", language)),
                    KeyboardButton::new(t_lang("button-apartment", language)),
                ],
                vec![
                    KeyboardButton::new(t_lang("button-dacha", language)),
                    KeyboardButton::new(t_lang("button-business", language)),
                ],
            ];
            ReplyMarkup::Keyboard(
                KeyboardMarkup::new(buttons)
                    .resize_keyboard()
                    .one_time_keyboard(),
            )
        }
        ReplyKeyboard::SharePhone => {
            let button = KeyboardButton::new(t_lang("button-share-phone", language))
                .request(ButtonRequest::Contact);
            ReplyMarkup::Keyboard(
                KeyboardMarkup::new(vec![vec![button]])
                    .resize_keyboard()
                    .one_time_keyboard(),
            )
        }
        ReplyKeyboard::Remove => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(950), "950");
        assert_eq!(group_thousands(70_000), "70 000");
        assert_eq!(group_thousands(1_400_000), "1 400 000");
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(6.9, "ru"), "6,9");
        assert_eq!(format_decimal(6.9, "en"), "6.9");
    }

    #[test]
    fn test_format_estimate_ru() {
        let text = format_estimate(&crate::estimator::estimate(5000, "частный дом"), "ru");
        assert!(text.contains("Мощность: 6,9 кВт"));
        assert!(text.contains("483 000 – 621 000 ₽"));
        assert!(text.contains("около 9,2 лет"));
    }

    #[test]
    fn test_format_lead_notification() {
        let lead = Lead {
            name: Some("Иван".to_string()),
            phone: Some("+79123456789".to_string()),
            object_type: Some("дача".to_string()),
            ..Lead::default()
        };

        let text = format_lead_notification(&lead, "ru");
        assert!(text.contains("Имя: Иван"));
        assert!(text.contains("Телефон: +79123456789"));
        assert!(text.contains("Объект: дача"));
        assert!(!text.contains("{ $"));
    }
}
