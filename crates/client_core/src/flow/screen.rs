use std::fmt;

use serde::{Deserialize, Serialize};
use shared::domain::{Brand, TemplateDescriptor};

use crate::transform::TransformRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Welcome,
    Qr,
    PhoneBrand,
    IphoneModel,
    GoogleModel,
    SamsungModel,
    TemplateSelection,
    PhonePreview,
    MultiImageUpload,
    FilmStrip,
    FilmStripUpload,
    RetroRemix,
    FunnyToon,
    CoverShoot,
    Glitch,
    AiGenerate,
    FootyFan,
    FootyFanStyle,
    FootyFanGenerate,
    TextInput,
    FontSelection,
    TextColorSelection,
    Payment,
    OrderConfirmed,
    MultiOrderQueue,
    Completion,
}

const ROUTE_ALIASES: [(&str, Screen); 3] = [
    ("/", Screen::Welcome),
    ("/ai-regenerate", Screen::AiGenerate),
    ("/covershot", Screen::CoverShoot),
];

impl Screen {
    pub const ALL: [Screen; 26] = [
        Screen::Welcome,
        Screen::Qr,
        Screen::PhoneBrand,
        Screen::IphoneModel,
        Screen::GoogleModel,
        Screen::SamsungModel,
        Screen::TemplateSelection,
        Screen::PhonePreview,
        Screen::MultiImageUpload,
        Screen::FilmStrip,
        Screen::FilmStripUpload,
        Screen::RetroRemix,
        Screen::FunnyToon,
        Screen::CoverShoot,
        Screen::Glitch,
        Screen::AiGenerate,
        Screen::FootyFan,
        Screen::FootyFanStyle,
        Screen::FootyFanGenerate,
        Screen::TextInput,
        Screen::FontSelection,
        Screen::TextColorSelection,
        Screen::Payment,
        Screen::OrderConfirmed,
        Screen::MultiOrderQueue,
        Screen::Completion,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Screen::Welcome => "/welcome",
            Screen::Qr => "/qr",
            Screen::PhoneBrand => "/phone-brand",
            Screen::IphoneModel => "/iphone-model",
            Screen::GoogleModel => "/google-model",
            Screen::SamsungModel => "/samsung-model",
            Screen::TemplateSelection => "/template-selection",
            Screen::PhonePreview => "/phone-preview",
            Screen::MultiImageUpload => "/multi-image-upload",
            Screen::FilmStrip => "/film-strip",
            Screen::FilmStripUpload => "/film-strip-upload",
            Screen::RetroRemix => "/retro-remix",
            Screen::FunnyToon => "/funny-toon",
            Screen::CoverShoot => "/cover-shoot",
            Screen::Glitch => "/glitch",
            Screen::AiGenerate => "/ai-generate",
            Screen::FootyFan => "/footy-fan",
            Screen::FootyFanStyle => "/footy-fan-style",
            Screen::FootyFanGenerate => "/footy-fan-generate",
            Screen::TextInput => "/text-input",
            Screen::FontSelection => "/font-selection",
            Screen::TextColorSelection => "/text-color-selection",
            Screen::Payment => "/payment",
            Screen::OrderConfirmed => "/order-confirmed",
            Screen::MultiOrderQueue => "/multi-order-queue",
            Screen::Completion => "/completion",
        }
    }

    /// Resolves a route, ignoring any query string and trailing slash.
    pub fn from_path(path: &str) -> Option<Screen> {
        let path = path.split(['?', '#']).next().unwrap_or_default().trim();
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        ROUTE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == path)
            .map(|(_, screen)| *screen)
            .or_else(|| Self::ALL.into_iter().find(|screen| screen.path() == path))
    }

    pub fn model_screen(brand: Brand) -> Screen {
        match brand {
            Brand::Iphone => Screen::IphoneModel,
            Brand::Google => Screen::GoogleModel,
            Brand::Samsung => Screen::SamsungModel,
        }
    }

    /// Brand implied by a model picker.
    pub fn brand(self) -> Option<Brand> {
        match self {
            Screen::IphoneModel => Some(Brand::Iphone),
            Screen::GoogleModel => Some(Brand::Google),
            Screen::SamsungModel => Some(Brand::Samsung),
            _ => None,
        }
    }

    /// First screen after template selection.
    pub fn after_template(template: &TemplateDescriptor) -> Screen {
        if template.is_film_strip() {
            Screen::FilmStrip
        } else if template.is_multi_image() {
            Screen::MultiImageUpload
        } else {
            Screen::PhonePreview
        }
    }

    /// Screen following the phone preview for single-image templates.
    pub fn after_preview(template: Option<&TemplateDescriptor>) -> Screen {
        match template.map(|t| t.id.as_str()) {
            Some("retro-remix") => Screen::RetroRemix,
            Some("funny-toon") => Screen::FunnyToon,
            Some("cover-shoot") => Screen::CoverShoot,
            Some("glitch-pro") => Screen::Glitch,
            Some("footy-fan") => Screen::FootyFan,
            _ => Screen::TextInput,
        }
    }

    /// Style picker that feeds the shared generate screen.
    pub fn is_style_picker(self) -> bool {
        matches!(
            self,
            Screen::RetroRemix | Screen::FunnyToon | Screen::CoverShoot | Screen::Glitch
        )
    }

    pub fn is_generate(self) -> bool {
        matches!(self, Screen::AiGenerate | Screen::FootyFanGenerate)
    }

    /// Pan/zoom range of the screen's single-image editor.
    pub fn transform_range(self) -> Option<TransformRange> {
        match self {
            Screen::PhonePreview
            | Screen::RetroRemix
            | Screen::FunnyToon
            | Screen::FootyFan
            | Screen::FootyFanStyle
            | Screen::AiGenerate
            | Screen::FootyFanGenerate => Some(TransformRange::CENTERED),
            Screen::CoverShoot | Screen::Glitch => Some(TransformRange::CENTERED_TIGHT),
            Screen::MultiImageUpload => Some(TransformRange::MULTI_SLOT),
            Screen::FilmStripUpload => Some(TransformRange::ABSOLUTE),
            _ => None,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path().trim_start_matches('/'))
    }
}

#[cfg(test)]
#[path = "tests/screen_tests.rs"]
mod tests;
