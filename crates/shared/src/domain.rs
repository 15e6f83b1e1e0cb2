use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_newtype!(SessionId);
string_newtype!(OrderNumber);
string_newtype!(TemplateId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Brand {
    Iphone,
    Samsung,
    Google,
}

impl Brand {
    pub const ALL: [Brand; 3] = [Brand::Iphone, Brand::Samsung, Brand::Google];

    pub fn as_str(self) -> &'static str {
        match self {
            Brand::Iphone => "iphone",
            Brand::Samsung => "samsung",
            Brand::Google => "google",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|brand| brand.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    Basic,
    Ai,
    Film,
}

/// Price in minor currency units (pence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub u32);

impl Price {
    pub const fn from_pence(pence: u32) -> Self {
        Self(pence)
    }

    pub fn pence(self) -> u32 {
        self.0
    }

    pub fn as_pounds(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub id: TemplateId,
    pub name: String,
    pub price: Price,
    pub category: TemplateCategory,
    pub image_count: u8,
    pub features: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl TemplateDescriptor {
    pub fn is_film_strip(&self) -> bool {
        self.id.as_str().starts_with("film-strip")
    }

    pub fn is_multi_image(&self) -> bool {
        self.image_count > 1
    }
}

/// Order lifecycle. Transitions only move one step forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Designing,
    Payment,
    Queue,
    Printing,
    Completed,
}

impl OrderStatus {
    pub fn next(self) -> Option<Self> {
        match self {
            OrderStatus::Designing => Some(OrderStatus::Payment),
            OrderStatus::Payment => Some(OrderStatus::Queue),
            OrderStatus::Queue => Some(OrderStatus::Printing),
            OrderStatus::Printing => Some(OrderStatus::Completed),
            OrderStatus::Completed => None,
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Designing => "designing",
            OrderStatus::Payment => "payment",
            OrderStatus::Queue => "queue",
            OrderStatus::Printing => "printing",
            OrderStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_advances_one_step() {
        assert!(OrderStatus::Designing.can_transition_to(OrderStatus::Payment));
        assert!(OrderStatus::Printing.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Designing.can_transition_to(OrderStatus::Queue));
        assert!(!OrderStatus::Queue.can_transition_to(OrderStatus::Payment));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Designing));
    }

    #[test]
    fn price_formats_as_pounds() {
        assert_eq!(Price::from_pence(1799).to_string(), "£17.99");
        assert_eq!(Price::from_pence(1605).to_string(), "£16.05");
        assert!((Price::from_pence(1699).as_pounds() - 16.99).abs() < f64::EPSILON);
    }

    #[test]
    fn brand_parse_is_case_insensitive() {
        assert_eq!(Brand::parse("IPHONE"), Some(Brand::Iphone));
        assert_eq!(Brand::parse(" google "), Some(Brand::Google));
        assert_eq!(Brand::parse("nokia"), None);
    }

    #[test]
    fn order_status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Printing).expect("serialize");
        assert_eq!(json, "\"printing\"");
    }
}
