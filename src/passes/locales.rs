//! UI language, locales and keyboard layouts for setup and the installed
//! system.

use crate::document::Element;
use crate::error::Result;
use crate::phase::Phase;
use crate::settings::LanguageSettings;

use super::{components, Pass, PassContext};

pub struct Locales;

impl Pass for Locales {
    fn name(&self) -> &str {
        "locales"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        let LanguageSettings::Unattended {
            ui_language,
            system_locale,
            user_locale,
            input_locale,
        } = &ctx.config.language
        else {
            return Ok(());
        };

        let fields = [
            ("InputLocale", input_locale.as_str()),
            ("SystemLocale", system_locale.as_str()),
            ("UILanguage", ui_language.as_str()),
            ("UserLocale", user_locale.as_str()),
        ];

        let winpe = ctx
            .document
            .component_mut(Phase::WindowsPe, components::INTERNATIONAL_CORE_WINPE);
        winpe.push(
            Element::new("SetupUILanguage")
                .with_child(Element::new("UILanguage").with_text(ui_language.as_str())),
        );
        for (name, value) in fields {
            winpe.push(Element::new(name).with_text(value));
        }

        let core = ctx
            .document
            .component_mut(Phase::OobeSystem, components::INTERNATIONAL_CORE);
        for (name, value) in fields {
            core.push(Element::new(name).with_text(value));
        }
        Ok(())
    }
}
