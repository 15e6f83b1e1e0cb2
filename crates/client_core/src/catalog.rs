//! Static kiosk catalog: templates, phone models, text styling and AI style
//! presets.

use shared::domain::{Brand, Price, TemplateCategory, TemplateDescriptor, TemplateId};

pub const DEFAULT_AI_CREDITS: u32 = 4;
/// Price forwarded from text-colour selection to payment.
pub const CHECKOUT_PRICE: Price = Price::from_pence(1699);
/// Price shown by payment when the incoming payload carries none.
pub const DEFAULT_PAYMENT_PRICE: Price = Price::from_pence(1899);

pub const DEFAULT_MULTI_IMAGE_COUNT: u8 = 2;
pub const DEFAULT_FILM_STRIP_COUNT: u8 = 3;
pub const FILM_STRIP_COUNTS: [u8; 2] = [3, 4];

pub const FONT_SIZE_MIN: u32 = 12;
pub const FONT_SIZE_MAX: u32 = 32;
pub const FONT_SIZE_STEP: u32 = 2;
pub const DEFAULT_FONT_SIZE: u32 = 18;
pub const DEFAULT_FONT: &str = "Arial";
pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";

pub const DEFAULT_TEAM: &str = "Liverpool";
pub const CUSTOM_STYLE: &str = "Custom…";

const BASIC_PRICE: Price = Price::from_pence(1799);
const AI_PRICE: Price = Price::from_pence(1899);

struct TemplateSeed {
    id: &'static str,
    name: &'static str,
    price: Price,
    category: TemplateCategory,
    image_count: u8,
    description: &'static str,
    features: [&'static str; 3],
}

const TEMPLATES: [TemplateSeed; 10] = [
    TemplateSeed {
        id: "classic",
        name: "Classic",
        price: BASIC_PRICE,
        category: TemplateCategory::Basic,
        image_count: 1,
        description: "Single image with background",
        features: ["Background colors", "Text overlay", "Border options"],
    },
    TemplateSeed {
        id: "2-in-1",
        name: "2 in 1",
        price: BASIC_PRICE,
        category: TemplateCategory::Basic,
        image_count: 2,
        description: "2 images with layouts",
        features: ["Dual layouts", "Custom backgrounds", "Text options"],
    },
    TemplateSeed {
        id: "3-in-1",
        name: "3 in 1",
        price: BASIC_PRICE,
        category: TemplateCategory::Basic,
        image_count: 3,
        description: "3 images with layouts",
        features: ["Triple layouts", "Backgrounds", "Text styling"],
    },
    TemplateSeed {
        id: "4-in-1",
        name: "4 in 1",
        price: BASIC_PRICE,
        category: TemplateCategory::Basic,
        image_count: 4,
        description: "4 images with layouts",
        features: ["Quad layouts", "Custom backgrounds", "Typography"],
    },
    TemplateSeed {
        id: "retro-remix",
        name: "Retro Remix",
        price: AI_PRICE,
        category: TemplateCategory::Ai,
        image_count: 1,
        description: "AI retro style",
        features: ["AI enhancement", "Retro filters", "Keyword prompts"],
    },
    TemplateSeed {
        id: "film-strip-3",
        name: "Film Strip",
        price: AI_PRICE,
        category: TemplateCategory::Film,
        image_count: 3,
        description: "3 in 1 Film Strip",
        features: ["Vintage film look", "Sequential layout", "Film grain effect"],
    },
    TemplateSeed {
        id: "cover-shoot",
        name: "Cover Shoot",
        price: AI_PRICE,
        category: TemplateCategory::Ai,
        image_count: 1,
        description: "Model-style AI enhancement",
        features: ["AI styling", "Professional look", "Magazine cover"],
    },
    TemplateSeed {
        id: "funny-toon",
        name: "Funny Toon",
        price: AI_PRICE,
        category: TemplateCategory::Ai,
        image_count: 1,
        description: "Cartoon conversion",
        features: ["AI cartoon", "Style options", "Fun effects"],
    },
    TemplateSeed {
        id: "glitch-pro",
        name: "Glitch Pro X",
        price: AI_PRICE,
        category: TemplateCategory::Ai,
        image_count: 1,
        description: "Digital glitch effects",
        features: ["Glitch effects", "Retro/Chaos modes", "Digital art"],
    },
    TemplateSeed {
        id: "footy-fan",
        name: "Footy Fan",
        price: AI_PRICE,
        category: TemplateCategory::Ai,
        image_count: 1,
        description: "Football team themes",
        features: ["Team colors", "Football graphics", "Fan style"],
    },
];

impl TemplateSeed {
    fn descriptor(&self) -> TemplateDescriptor {
        TemplateDescriptor {
            id: TemplateId::from(self.id),
            name: self.name.to_string(),
            price: self.price,
            category: self.category,
            image_count: self.image_count,
            features: self.features.iter().map(|f| f.to_string()).collect(),
            description: self.description.to_string(),
        }
    }
}

/// Templates in display order.
pub fn templates() -> Vec<TemplateDescriptor> {
    TEMPLATES.iter().map(TemplateSeed::descriptor).collect()
}

pub fn find_template(id: &str) -> Option<TemplateDescriptor> {
    TEMPLATES
        .iter()
        .find(|seed| seed.id == id)
        .map(TemplateSeed::descriptor)
}

const IPHONE_MODELS: &[&str] = &[
    "IPHONE 16 PRO MAX",
    "IPHONE 16 PRO",
    "IPHONE 16 PLUS",
    "IPHONE 16",
    "IPHONE 15 PRO MAX",
    "IPHONE 15 PRO",
    "IPHONE 15 PLUS",
    "IPHONE 15",
    "IPHONE 14 PRO MAX",
    "IPHONE 14 PRO",
    "IPHONE 14 PLUS",
    "IPHONE 14",
    "IPHONE 13 PRO MAX",
    "IPHONE 13 PRO",
    "IPHONE 13 MINI",
    "IPHONE 13",
];

const GOOGLE_MODELS: &[&str] = &[
    "PIXEL 8 PRO",
    "PIXEL 8",
    "PIXEL 7A",
    "PIXEL 7 PRO",
    "PIXEL 7",
    "PIXEL 6A",
    "PIXEL 6 PRO",
    "PIXEL 6",
    "PIXEL 5A",
    "PIXEL 5",
    "PIXEL 4A 5G",
    "PIXEL 4A",
    "PIXEL 4 XL",
    "PIXEL 4",
];

const SAMSUNG_MODELS: &[&str] = &[
    "GALAXY S24 ULTRA",
    "GALAXY S24+",
    "GALAXY S24",
    "GALAXY S23 ULTRA",
    "GALAXY S23+",
    "GALAXY S23",
    "GALAXY S23 FE",
    "GALAXY Z FLIP5",
    "GALAXY Z FOLD5",
    "GALAXY A54",
    "GALAXY A34",
];

pub fn models(brand: Brand) -> &'static [&'static str] {
    match brand {
        Brand::Iphone => IPHONE_MODELS,
        Brand::Google => GOOGLE_MODELS,
        Brand::Samsung => SAMSUNG_MODELS,
    }
}

pub fn default_model(brand: Brand) -> &'static str {
    match brand {
        Brand::Iphone => "IPHONE 16",
        Brand::Google => "PIXEL 8 PRO",
        Brand::Samsung => "GALAXY S24",
    }
}

/// `"IPHONE 16 PRO"` -> `"iphone-16-pro"`.
pub fn model_slug(model: &str) -> String {
    model
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Resolves either a display name or a slug against the brand's model list.
pub fn resolve_model(brand: Brand, value: &str) -> Option<&'static str> {
    let wanted = model_slug(value);
    models(brand)
        .iter()
        .copied()
        .find(|model| model_slug(model) == wanted)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontOption {
    pub name: &'static str,
    pub css_stack: &'static str,
}

pub const FONTS: [FontOption; 12] = [
    FontOption { name: "Arial", css_stack: "Arial, sans-serif" },
    FontOption { name: "Georgia", css_stack: "Georgia, serif" },
    FontOption { name: "Helvetica", css_stack: "Helvetica, sans-serif" },
    FontOption { name: "Times New Roman", css_stack: "Times New Roman, serif" },
    FontOption { name: "Verdana", css_stack: "Verdana, sans-serif" },
    FontOption { name: "Comic Sans", css_stack: "Comic Sans MS, cursive" },
    FontOption { name: "Impact", css_stack: "Impact, sans-serif" },
    FontOption { name: "Palatino", css_stack: "Palatino, serif" },
    FontOption { name: "Roboto", css_stack: "Roboto, sans-serif" },
    FontOption { name: "Open Sans", css_stack: "Open Sans, sans-serif" },
    FontOption { name: "Montserrat", css_stack: "Montserrat, sans-serif" },
    FontOption { name: "Lato", css_stack: "Lato, sans-serif" },
];

pub fn find_font(name: &str) -> Option<FontOption> {
    FONTS
        .iter()
        .copied()
        .find(|font| font.name.eq_ignore_ascii_case(name.trim()))
}

/// Snaps to the nearest even size inside the picker range.
pub fn clamp_font_size(size: u32) -> u32 {
    let clamped = size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX);
    clamped - (clamped - FONT_SIZE_MIN) % FONT_SIZE_STEP
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorOption {
    pub name: &'static str,
    pub value: &'static str,
}

pub const TEXT_COLORS: [ColorOption; 24] = [
    ColorOption { name: "White", value: "#ffffff" },
    ColorOption { name: "Black", value: "#000000" },
    ColorOption { name: "Red", value: "#ef4444" },
    ColorOption { name: "Blue", value: "#3b82f6" },
    ColorOption { name: "Green", value: "#22c55e" },
    ColorOption { name: "Yellow", value: "#eab308" },
    ColorOption { name: "Purple", value: "#a855f7" },
    ColorOption { name: "Pink", value: "#ec4899" },
    ColorOption { name: "Orange", value: "#f97316" },
    ColorOption { name: "Teal", value: "#14b8a6" },
    ColorOption { name: "Indigo", value: "#6366f1" },
    ColorOption { name: "Gray", value: "#6b7280" },
    ColorOption { name: "Rose", value: "#f43f5e" },
    ColorOption { name: "Emerald", value: "#10b981" },
    ColorOption { name: "Sky", value: "#0ea5e9" },
    ColorOption { name: "Violet", value: "#8b5cf6" },
    ColorOption { name: "Amber", value: "#f59e0b" },
    ColorOption { name: "Lime", value: "#84cc16" },
    ColorOption { name: "Cyan", value: "#06b6d4" },
    ColorOption { name: "Fuchsia", value: "#d946ef" },
    ColorOption { name: "Slate", value: "#64748b" },
    ColorOption { name: "Stone", value: "#78716c" },
    ColorOption { name: "Zinc", value: "#71717a" },
    ColorOption { name: "Neutral", value: "#737373" },
];

/// Accepts a palette name or hex value; falls back to the first entry.
pub fn find_text_color(value: &str) -> ColorOption {
    let value = value.trim();
    TEXT_COLORS
        .iter()
        .copied()
        .find(|color| {
            color.value.eq_ignore_ascii_case(value) || color.name.eq_ignore_ascii_case(value)
        })
        .unwrap_or(TEXT_COLORS[0])
}

pub const LEAGUES: &[(&str, &[&str])] = &[
    (
        "Premier League (ENG)",
        &[
            "Arsenal",
            "Aston Villa",
            "Bournemouth",
            "Brentford",
            "Brighton",
            "Burnley",
            "Chelsea",
            "Crystal Palace",
            "Everton",
            "Fulham",
            "Liverpool",
            "Luton Town",
            "Manchester City",
            "Manchester United",
            "Newcastle United",
            "Nottingham Forest",
            "Sheffield United",
            "Tottenham Hotspur",
            "West Ham",
            "Wolves",
        ],
    ),
    (
        "La Liga (ESP)",
        &[
            "Barcelona",
            "Real Madrid",
            "Atlético Madrid",
            "Real Sociedad",
            "Sevilla",
            "Valencia",
        ],
    ),
    (
        "Serie A (ITA)",
        &["Juventus", "Inter Milan", "AC Milan", "Roma", "Napoli", "Lazio"],
    ),
    (
        "Bundesliga (GER)",
        &[
            "Bayern Munich",
            "Borussia Dortmund",
            "RB Leipzig",
            "Bayer Leverkusen",
            "Eintracht Frankfurt",
        ],
    ),
    (
        "Ligue 1 (FRA)",
        &["Paris Saint-Germain", "Marseille", "Lyon", "Monaco", "Lille"],
    ),
];

pub fn all_teams() -> impl Iterator<Item = &'static str> {
    LEAGUES.iter().flat_map(|(_, teams)| teams.iter().copied())
}

pub const FOOTY_STYLE_PRESETS: [&str; 5] = [
    "In team colours with fireworks",
    "Retro stadium poster style",
    "Pop-art comic style",
    "Minimal outline illustration",
    CUSTOM_STYLE,
];

pub const TOON_STYLES: [&str; 5] = [
    "Classic Cartoon",
    "Anime Style",
    "3D Cartoon",
    "Comic Book",
    "Wild and Wacky",
];

pub const RETRO_KEYWORDS: [&str; 4] = ["Y2K Chrome", "80s Neon", "90s Grunge", "Vaporwave"];

pub const COVER_STYLES: [&str; 4] = ["Fashion", "Glamour", "Editorial", "Portrait"];

pub const GLITCH_MODES: [&str; 4] = ["Retro", "Chaos", "Neon", "Matrix"];

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
