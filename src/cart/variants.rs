//! Colour/length selection over a product's variants.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ProductVariant;

pub const FALLBACK_COLOR_KEY: &str = "Autre";
pub const PLACEHOLDER_MEDIA: &str = "/placeholder.svg";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ColorGroup {
    pub color: String,
    pub hex: Option<String>,
    /// Purchasable variants of this colour, shortest length first.
    pub variants: Vec<ProductVariant>,
}

impl ColorGroup {
    pub fn lengths(&self) -> Vec<i32> {
        self.variants.iter().map(|v| v.length).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Selection {
    pub color: Option<String>,
    pub length: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItem {
    pub color_key: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantIndex {
    raw: Vec<ProductVariant>,
    groups: Vec<ColorGroup>,
}

fn color_key(variant: &ProductVariant) -> &str {
    if variant.color.is_empty() {
        FALLBACK_COLOR_KEY
    } else {
        &variant.color
    }
}

impl VariantIndex {
    /// Groups purchasable variants by colour, keeping first-seen colour order.
    pub fn new(variants: Vec<ProductVariant>) -> Self {
        let mut groups: Vec<ColorGroup> = Vec::new();

        for variant in variants.iter().filter(|v| v.is_purchasable()) {
            let key = color_key(variant);
            match groups.iter_mut().find(|g| g.color == key) {
                Some(group) => {
                    if group.hex.is_none() && variant.color_hex.is_some() {
                        group.hex = variant.color_hex.clone();
                    }
                    group.variants.push(variant.clone());
                }
                None => groups.push(ColorGroup {
                    color: key.to_string(),
                    hex: variant.color_hex.clone(),
                    variants: vec![variant.clone()],
                }),
            }
        }

        for group in &mut groups {
            group.variants.sort_by_key(|v| v.length);
        }

        Self {
            raw: variants,
            groups,
        }
    }

    pub fn variants(&self) -> &[ProductVariant] {
        &self.raw
    }

    pub fn groups(&self) -> &[ColorGroup] {
        &self.groups
    }

    pub fn color_keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.color.as_str())
    }

    pub fn group(&self, color: &str) -> Option<&ColorGroup> {
        self.groups.iter().find(|g| g.color == color)
    }

    pub fn lengths(&self, color: &str) -> Vec<i32> {
        self.group(color).map(ColorGroup::lengths).unwrap_or_default()
    }

    /// Colour of the flagged default variant, else the first colour group.
    pub fn default_color(&self) -> Option<&str> {
        self.raw
            .iter()
            .filter(|v| v.is_purchasable())
            .find(|v| v.is_default)
            .map(color_key)
            .or_else(|| self.color_keys().next())
    }

    pub fn default_selection(&self) -> Selection {
        match self.default_color() {
            Some(color) => self.select_color(color),
            None => Selection::default(),
        }
    }

    /// Switching colour resets the length to that colour's shortest one.
    pub fn select_color(&self, color: &str) -> Selection {
        Selection {
            color: Some(color.to_string()),
            length: self
                .group(color)
                .and_then(|g| g.variants.first())
                .map(|v| v.length),
        }
    }

    /// The variant shown for a selection.
    ///
    /// A stale length falls back to the colour's first variant. Without a usable
    /// colour the first raw variant is shown, which may not be addable.
    pub fn resolve(&self, selection: &Selection) -> Option<&ProductVariant> {
        let group = selection.color.as_deref().and_then(|c| self.group(c));
        let Some(group) = group else {
            return self.raw.first();
        };

        selection
            .length
            .and_then(|len| group.variants.iter().find(|v| v.length == len))
            .or_else(|| group.variants.first())
            .or_else(|| self.raw.first())
    }

    pub fn carousel(&self) -> Vec<CarouselItem> {
        let mut items = Vec::new();

        for group in &self.groups {
            let Some(first) = group.variants.first() else {
                continue;
            };
            let medias: Vec<&str> = if first.medias.is_empty() {
                first.image_url.as_deref().into_iter().collect()
            } else {
                first.medias.iter().map(String::as_str).collect()
            };
            items.extend(medias.into_iter().map(|url| CarouselItem {
                color_key: group.color.clone(),
                image_url: url.to_string(),
            }));
        }

        if items.is_empty() {
            items.push(CarouselItem {
                color_key: "default".to_string(),
                image_url: PLACEHOLDER_MEDIA.to_string(),
            });
        }

        items
    }

    /// Selection matching a carousel slide: its colour with the first length.
    pub fn select_image(&self, index: usize) -> Option<Selection> {
        let carousel = self.carousel();
        let item = carousel.get(index)?;
        self.group(&item.color_key)
            .map(|g| self.select_color(&g.color))
    }
}
