//! Product key and EULA acceptance.

use crate::document::Element;
use crate::error::Result;
use crate::phase::Phase;
use crate::settings::EditionSettings;

use super::{components, Pass, PassContext};

pub struct Edition;

impl Pass for Edition {
    fn name(&self) -> &str {
        "edition"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        // An empty key makes setup fall back to the firmware key.
        let key = match &ctx.config.edition {
            EditionSettings::Interactive => return Ok(()),
            EditionSettings::ProductKey { key } => key.as_str(),
            EditionSettings::Firmware => "",
        };

        let user_data = ctx
            .document
            .component_mut(Phase::WindowsPe, components::SETUP)
            .child_or_insert("UserData");
        user_data.push(
            Element::new("ProductKey")
                .with_child(Element::new("Key").with_text(key))
                .with_child(Element::new("WillShowUI").with_text("OnError")),
        );
        user_data.child_or_insert("AcceptEula").set_text("true");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::testing;
    use crate::settings::{Configuration, ProductKey};

    fn user_data(config: &Configuration) -> Option<Element> {
        let (doc, _) = testing::run(&Edition, config);
        doc.component(Phase::WindowsPe, components::SETUP)
            .and_then(|c| c.child("UserData"))
            .cloned()
    }

    #[test]
    fn test_product_key() {
        let config = Configuration {
            edition: EditionSettings::ProductKey {
                key: ProductKey::new("VK7JG-NPHTM-C97JM-9MPGT-3V66T").unwrap(),
            },
            ..Configuration::default()
        };
        let data = user_data(&config).unwrap();
        assert_eq!(
            data.descend(&["ProductKey", "Key"]).unwrap().text(),
            "VK7JG-NPHTM-C97JM-9MPGT-3V66T"
        );
        assert_eq!(data.child("AcceptEula").unwrap().text(), "true");
    }

    #[test]
    fn test_firmware_uses_empty_key() {
        let config = Configuration {
            edition: EditionSettings::Firmware,
            ..Configuration::default()
        };
        let data = user_data(&config).unwrap();
        assert_eq!(data.descend(&["ProductKey", "Key"]).unwrap().text(), "");
    }

    #[test]
    fn test_interactive_writes_nothing() {
        assert!(user_data(&Configuration::default()).is_none());
    }
}
