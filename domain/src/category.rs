// Presentation hints for category browsing: an icon name and a color pair per category.
use serde::Serialize;

/// Icon lookup table. Order matters for partial matches: the first key contained in
/// the category name wins.
const CATEGORY_ICONS: &[(&str, &str)] = &[
    ("Restaurant", "utensils"),
    ("Restaurants", "utensils"),
    ("Cafe", "coffee"),
    ("Coffee", "coffee"),
    ("Retail", "shopping-bag"),
    ("Shopping", "store"),
    ("Healthcare", "stethoscope"),
    ("Health", "heart"),
    ("Professional Services", "briefcase"),
    ("Services", "briefcase"),
    ("Technology", "cpu"),
    ("Tech", "cpu"),
    ("Education", "graduation-cap"),
    ("School", "graduation-cap"),
    ("Entertainment", "film"),
    ("Fitness", "dumbbell"),
    ("Gym", "dumbbell"),
    ("Real Estate", "home"),
    ("Housing", "home"),
    ("Automotive", "car"),
    ("Fashion", "shirt"),
    ("Art", "palette"),
    ("Music", "music"),
];

const DEFAULT_ICON: &str = "building";

const CATEGORY_COLORS: [&str; 10] = [
    "bg-red-100 text-red-600",
    "bg-blue-100 text-blue-600",
    "bg-green-100 text-green-600",
    "bg-yellow-100 text-yellow-600",
    "bg-purple-100 text-purple-600",
    "bg-pink-100 text-pink-600",
    "bg-indigo-100 text-indigo-600",
    "bg-orange-100 text-orange-600",
    "bg-teal-100 text-teal-600",
    "bg-cyan-100 text-cyan-600",
];

/// A category as shown on the category browsing page.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoryCard {
    pub name: String,
    pub icon: &'static str,
    pub color: &'static str,
    pub blurb: String,
}

/// Exact name first, then the first table key the category contains (case-insensitive).
pub fn category_icon(category: &str) -> &'static str {
    if let Some((_, icon)) = CATEGORY_ICONS.iter().find(|(key, _)| *key == category) {
        return icon;
    }
    let lowered = category.to_lowercase();
    CATEGORY_ICONS
        .iter()
        .find(|(key, _)| lowered.contains(&key.to_lowercase()))
        .map_or(DEFAULT_ICON, |(_, icon)| icon)
}

/// Stable color: the sum of the UTF-16 code units picks a palette slot.
pub fn category_color(category: &str) -> &'static str {
    let sum: usize = category.encode_utf16().map(usize::from).sum();
    CATEGORY_COLORS[sum % CATEGORY_COLORS.len()]
}

/// Card for the category browsing page. The blurb names `locality` when one is given.
pub fn category_card(category: &str, locality: Option<&str>) -> CategoryCard {
    let blurb = match locality {
        Some(place) => format!("Explore {} businesses in {}", category.to_lowercase(), place),
        None => format!("Explore {} businesses", category.to_lowercase()),
    };
    CategoryCard {
        name: category.to_string(),
        icon: category_icon(category),
        color: category_color(category),
        blurb,
    }
}
