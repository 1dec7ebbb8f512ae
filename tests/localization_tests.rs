//! # Localization Tests
//!
//! This module contains unit tests for the localization functionality,
//! testing message retrieval and formatting with various edge cases.

use solar_lead_bot::localization::{detect_language, t_args_lang, t_lang, LocalizationManager};
use std::collections::HashMap;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> LocalizationManager {
        LocalizationManager::new().expect("Failed to create localization manager")
    }

    #[test]
    fn test_get_message_existing_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("help", "ru", None);
        assert!(message.contains("/start"));
        assert!(message.contains("Команды"));
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("nonexistent-key", "ru", None);
        assert_eq!(message, "Missing translation: nonexistent-key");
    }

    #[test]
    fn test_get_message_unsupported_language() {
        let manager = setup_localization();

        // Falls back to Russian
        let message = manager.get_message_in_language("ask-bill", "de", None);
        assert_eq!(message, manager.get_message_in_language("ask-bill", "ru", None));
    }

    #[test]
    fn test_get_message_with_args() {
        let manager = setup_localization();

        let mut args = HashMap::new();
        args.insert("name", "Анна");
        args.insert("phone", "+79123456789");

        let message = manager.get_message_in_language("lead-saved", "ru", Some(&args));
        // No Unicode isolation marks around placeables
        assert!(message.starts_with("Спасибо, Анна!"));
        assert!(message.contains("+79123456789"));
    }

    #[test]
    fn test_get_message_missing_args() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("lead-saved", "ru", None);
        assert!(!message.is_empty());
    }

    #[test]
    fn test_english_localization() {
        let manager = setup_localization();

        let english = manager.get_message_in_language("ask-name", "en", None);
        let russian = manager.get_message_in_language("ask-name", "ru", None);
        assert_ne!(english, russian);
        assert!(english.contains("engineer"));
    }

    #[test]
    fn test_every_russian_key_has_english_text() {
        let manager = setup_localization();
        let keys = [
            "welcome", "help", "cancel-done", "unsupported-message", "ask-object",
            "ask-object-retry", "ask-region", "ask-region-retry", "ask-bill", "ask-bill-retry",
            "ask-name", "ask-name-retry", "ask-phone", "ask-phone-retry", "lead-saved",
            "region-unknown", "station-commercial", "station-autonomous", "station-residential",
            "estimate-summary", "commentary-request", "llm-timeout", "llm-network", "llm-error",
            "button-house", "button-apartment", "button-dacha", "button-business",
            "button-share-phone", "lead-notification",
        ];

        for key in keys {
            for language in ["ru", "en"] {
                let message = manager.get_message_in_language(key, language, None);
                assert!(
                    !message.starts_with("Missing translation"),
                    "{key} missing in {language}"
                );
            }
        }
    }

    #[test]
    fn test_language_detection() {
        assert_eq!(detect_language(Some("ru")), "ru");
        assert_eq!(detect_language(Some("en")), "en");
        assert_eq!(detect_language(Some("en-US")), "en");
        assert_eq!(detect_language(Some("EN_gb")), "en");
        assert_eq!(detect_language(Some("uk")), "ru");
        assert_eq!(detect_language(None), "ru");
    }

    #[test]
    fn test_convenience_functions() {
        let message = t_lang("ask-region", "ru");
        assert!(message.contains("регион"));

        let message_with_args = t_args_lang("ask-phone", &[("name", "Ivan")], "en");
        assert!(message_with_args.starts_with("Ivan, please"));
    }
}
