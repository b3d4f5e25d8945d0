//! Validated scalar settings.
//!
//! Each newtype checks its value on construction, including when serde
//! builds it (`try_from = "String"`), so malformed input never reaches the
//! pipeline.

use std::fmt;

use serde::Deserialize;

use crate::error::{Error, Result};

macro_rules! validated_string {
    ($(#[$meta:meta])* $name:ident, $check:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
        #[serde(try_from = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self> {
                let value = value.into();
                $check(&value)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

validated_string!(
    /// Local account name.
    AccountName,
    check_account_name
);

validated_string!(
    /// NetBIOS-compatible computer name.
    ComputerName,
    check_computer_name
);

validated_string!(
    /// Five groups of five upper-case alphanumerics.
    ProductKey,
    check_product_key
);

validated_string!(
    /// Language/locale tag such as `en-US`.
    LanguageTag,
    check_language_tag
);

validated_string!(
    /// Keyboard layout list such as `0409:00000409`.
    InputLocale,
    check_input_locale
);

validated_string!(
    /// Time zone identifier such as `W. Europe Standard Time`.
    TimeZoneId,
    check_time_zone
);

const ACCOUNT_NAME_FORBIDDEN: &[char] = &[
    '/', '\\', '[', ']', ':', '|', '<', '>', '+', '=', ';', ',', '?', '*', '%', '@', '"',
];

fn check_account_name(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::config("account name must not be empty"));
    }
    if value.chars().count() > 20 {
        return Err(Error::config(format!(
            "account name '{value}' is longer than 20 characters"
        )));
    }
    if let Some(c) = value.chars().find(|c| ACCOUNT_NAME_FORBIDDEN.contains(c)) {
        return Err(Error::config(format!(
            "account name '{value}' contains forbidden character '{c}'"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(Error::config(format!(
            "account name '{}' contains a control character",
            value.escape_debug()
        )));
    }
    if value.ends_with('.') {
        return Err(Error::config(format!(
            "account name '{value}' must not end with '.'"
        )));
    }
    Ok(())
}

fn check_computer_name(value: &str) -> Result<()> {
    if value.is_empty() || value.len() > 15 {
        return Err(Error::config(format!(
            "computer name '{value}' must be 1 to 15 characters"
        )));
    }
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
    {
        return Err(Error::config(format!(
            "computer name '{value}' contains invalid character '{c}'"
        )));
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::config(format!(
            "computer name '{value}' must not consist of digits only"
        )));
    }
    Ok(())
}

fn check_product_key(value: &str) -> Result<()> {
    let groups: Vec<&str> = value.split('-').collect();
    let well_formed = groups.len() == 5
        && groups.iter().all(|group| {
            group.len() == 5
                && group
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        });
    if well_formed {
        Ok(())
    } else {
        Err(Error::config(format!(
            "product key '{value}' must look like XXXXX-XXXXX-XXXXX-XXXXX-XXXXX"
        )))
    }
}

fn check_language_tag(value: &str) -> Result<()> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(Error::config(format!("'{value}' is not a language tag")));
    }
    Ok(())
}

fn check_input_locale(value: &str) -> Result<()> {
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | ';' | '-' | '{' | '}'));
    if value.is_empty() || !valid {
        return Err(Error::config(format!("'{value}' is not an input locale")));
    }
    Ok(())
}

fn check_time_zone(value: &str) -> Result<()> {
    let valid = value
        .chars()
        .all(|c| (' '..='~').contains(&c) && !matches!(c, '<' | '>' | '&'));
    if value.trim().is_empty() || !valid {
        return Err(Error::config(format!("'{value}' is not a time zone id")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_names() {
        assert!(AccountName::new("Admin").is_ok());
        assert!(AccountName::new("Jane Doe").is_ok());
        assert!(AccountName::new("").is_err());
        assert!(AccountName::new("   ").is_err());
        assert!(AccountName::new("a".repeat(21)).is_err());
        assert!(AccountName::new("bad@name").is_err());
        assert!(AccountName::new("dot.").is_err());
    }

    #[test]
    fn test_computer_names() {
        assert!(ComputerName::new("DESKTOP-01").is_ok());
        assert!(ComputerName::new("12345").is_err());
        assert!(ComputerName::new("ABCDEFGHIJKLMNOP").is_err());
        assert!(ComputerName::new("has space").is_err());
        assert!(ComputerName::new("").is_err());
    }

    #[test]
    fn test_product_keys() {
        assert!(ProductKey::new("VK7JG-NPHTM-C97JM-9MPGT-3V66T").is_ok());
        assert!(ProductKey::new("vk7jg-NPHTM-C97JM-9MPGT-3V66T").is_err());
        assert!(ProductKey::new("VK7JG-NPHTM-C97JM-9MPGT").is_err());
        assert!(ProductKey::new("VK7JG-NPHTM-C97JM-9MPGT-3V66TX").is_err());
    }

    #[test]
    fn test_locale_and_time_zone() {
        assert!(LanguageTag::new("en-US").is_ok());
        assert!(LanguageTag::new("en_US").is_err());
        assert!(InputLocale::new("0409:00000409").is_ok());
        assert!(InputLocale::new("0409 00000409").is_err());
        assert!(TimeZoneId::new("W. Europe Standard Time").is_ok());
        assert!(TimeZoneId::new("<script>").is_err());
        assert!(TimeZoneId::new(" ").is_err());
    }

    #[test]
    fn test_deserialize_runs_validation() {
        #[derive(Debug, Deserialize)]
        struct Holder {
            name: ComputerName,
        }
        let err = toml::from_str::<Holder>("name = \"1234\"").unwrap_err();
        assert!(err.to_string().contains("digits only"));
        let ok: Holder = toml::from_str("name = \"PC-1\"").unwrap();
        assert_eq!(ok.name.as_str(), "PC-1");
    }
}
