//! # Text Processing Tests
//!
//! Bill, phone and name extraction from realistic user messages.

use solar_lead_bot::text_processing::{
    extract_name, extract_phone, mentions_commercial, mentions_lead_intent, mentions_money,
    mentions_object, mentions_rural, parse_bill_amount, MAX_NAME_LENGTH,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_plain_digits() {
        assert_eq!(parse_bill_amount("5000"), Some(5000));
        assert_eq!(parse_bill_amount("плачу 3500 руб в месяц"), Some(3500));
        assert_eq!(parse_bill_amount("дом, 5000 платеж"), Some(5000));
        assert_eq!(parse_bill_amount("около 250000₽ за офис"), Some(250000));
    }

    #[test]
    fn test_bill_takes_first_run() {
        assert_eq!(parse_bill_amount("зимой 8000, летом 3000"), Some(8000));
    }

    #[test]
    fn test_bill_grouped_and_suffixed() {
        assert_eq!(parse_bill_amount("5 000 рублей"), Some(5000));
        assert_eq!(parse_bill_amount("12 500"), Some(12500));
        assert_eq!(parse_bill_amount("примерно 5к"), Some(5000));
        assert_eq!(parse_bill_amount("7 тыс"), Some(7000));
        assert_eq!(parse_bill_amount("4,5 тысячи"), Some(4500));
        assert_eq!(parse_bill_amount("10k"), Some(10000));
        // A detached "к" is the preposition, not a thousands suffix
        assert_eq!(parse_bill_amount("плачу 500 к концу месяца"), Some(500));
        assert_eq!(parse_bill_amount("5 тр"), Some(5000));
    }

    #[test]
    fn test_bill_rejects_non_amounts() {
        assert_eq!(parse_bill_amount("много"), None);
        assert_eq!(parse_bill_amount(""), None);
        // Too short or too long digit runs
        assert_eq!(parse_bill_amount("50"), None);
        assert_eq!(parse_bill_amount("1234567"), None);
        assert_eq!(parse_bill_amount("000"), None);
        // Floor area is not a bill
        assert_eq!(parse_bill_amount("дом 120 м2"), None);
        assert_eq!(parse_bill_amount("дом 150 квадратов, плачу 6000"), Some(6000));
        assert_eq!(parse_bill_amount("дом 150 кв"), None);
        assert_eq!(parse_bill_amount("дом 150 кв. м"), None);
        assert_eq!(parse_bill_amount("квартира 90 кв, счёт 3000"), Some(3000));
    }

    #[test]
    fn test_phone_formats() {
        let expected = Some("+79123456789".to_string());
        assert_eq!(extract_phone("+79123456789"), expected);
        assert_eq!(extract_phone("89123456789"), expected);
        assert_eq!(extract_phone("+7 912 345 67 89"), expected);
        assert_eq!(extract_phone("8 (912) 345-67-89"), expected);
        assert_eq!(extract_phone("+7-912-345-67-89"), expected);
        assert_eq!(extract_phone("мой номер: 8 912 345-67-89, звоните"), expected);
    }

    #[test]
    fn test_phone_rejections() {
        assert_eq!(extract_phone("нет"), None);
        assert_eq!(extract_phone("12345"), None);
        assert_eq!(extract_phone("+7912345678"), None);
        assert_eq!(extract_phone("+791234567890"), None);
        assert_eq!(extract_phone("+1 912 345 67 89"), None);
        assert_eq!(extract_phone("79123456789"), None);
    }

    #[test]
    fn test_name_extraction() {
        assert_eq!(extract_name("Иван").unwrap(), "Иван");
        assert_eq!(extract_name("  мария  ").unwrap(), "Мария");
        assert_eq!(extract_name("Меня зовут Ольга.").unwrap(), "Ольга");
        assert_eq!(extract_name("Это Сергей Петрович").unwrap(), "Сергей Петрович");
        assert_eq!(extract_name("my name is John").unwrap(), "John");
    }

    #[test]
    fn test_name_rejections() {
        assert_eq!(extract_name(""), Err("empty"));
        assert_eq!(extract_name("   "), Err("empty"));
        assert_eq!(extract_name("89123456789"), Err("invalid"));
        assert_eq!(extract_name("???"), Err("invalid"));
        assert_eq!(extract_name(&"а".repeat(MAX_NAME_LENGTH + 1)), Err("too_long"));
    }

    #[test]
    fn test_keywords() {
        assert!(mentions_commercial("Небольшой магазин у трассы"));
        assert!(mentions_rural("Дача в СНТ, бывают отключения"));
        assert!(mentions_object("Частный дом"));
        assert!(mentions_object("офис"));
        assert!(!mentions_object("Работают ли панели зимой?"));
        assert!(mentions_money("около 6 тыс. рублей"));
        assert!(mentions_money("дом, 5к"));
        assert!(mentions_money("5000 в месяц"));
        assert!(!mentions_money("Дом 2015 года постройки"));
        assert!(mentions_lead_intent("Хочу расчёт"));
        assert!(mentions_lead_intent("Сколько стоит станция?"));
        assert!(!mentions_lead_intent("Привет"));
    }
}
