//! Attribute icons.
//!
//! Each icon is a handful of polylines in a unit square (x to the right, y
//! downwards) so it can be stroked by the PDF elements at any size.

use crate::model::Attribute;

/// Pictogram shown next to an attribute name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Icon {
    Dumbbell,
    Shield,
    Heart,
    BookText,
    Eye,
    Smile,
}

impl Icon {
    /// Returns the icon for an attribute.
    pub fn for_attribute(attribute: Attribute) -> Self {
        match attribute {
            Attribute::Strength => Icon::Dumbbell,
            Attribute::Dexterity => Icon::Shield,
            Attribute::Constitution => Icon::Heart,
            Attribute::Intelligence => Icon::BookText,
            Attribute::Wisdom => Icon::Eye,
            Attribute::Charisma => Icon::Smile,
        }
    }

    /// Returns the icon for an attribute key as sent by the generator.
    ///
    /// Unknown keys have no icon.
    pub fn for_key(key: &str) -> Option<Self> {
        Attribute::from_key(key).map(Self::for_attribute)
    }

    /// Returns the icon name.
    pub fn name(self) -> &'static str {
        match self {
            Icon::Dumbbell => "dumbbell",
            Icon::Shield => "shield",
            Icon::Heart => "heart",
            Icon::BookText => "book-text",
            Icon::Eye => "eye",
            Icon::Smile => "smile",
        }
    }

    /// Returns the strokes that make up the icon.
    pub fn strokes(self) -> Vec<Vec<(f64, f64)>> {
        match self {
            Icon::Dumbbell => vec![
                vec![(0.25, 0.5), (0.75, 0.5)],
                vec![(0.15, 0.25), (0.15, 0.75)],
                vec![(0.25, 0.2), (0.25, 0.8)],
                vec![(0.75, 0.2), (0.75, 0.8)],
                vec![(0.85, 0.25), (0.85, 0.75)],
                vec![(0.05, 0.5), (0.15, 0.5)],
                vec![(0.85, 0.5), (0.95, 0.5)],
            ],
            Icon::Shield => vec![vec![
                (0.5, 0.05),
                (0.85, 0.2),
                (0.8, 0.6),
                (0.5, 0.95),
                (0.2, 0.6),
                (0.15, 0.2),
                (0.5, 0.05),
            ]],
            Icon::Heart => vec![vec![
                (0.5, 0.9),
                (0.12, 0.5),
                (0.08, 0.3),
                (0.2, 0.15),
                (0.35, 0.15),
                (0.5, 0.3),
                (0.65, 0.15),
                (0.8, 0.15),
                (0.92, 0.3),
                (0.88, 0.5),
                (0.5, 0.9),
            ]],
            Icon::BookText => vec![
                vec![(0.2, 0.1), (0.8, 0.1), (0.8, 0.9), (0.2, 0.9), (0.2, 0.1)],
                vec![(0.3, 0.1), (0.3, 0.9)],
                vec![(0.4, 0.35), (0.7, 0.35)],
                vec![(0.4, 0.5), (0.7, 0.5)],
            ],
            Icon::Eye => vec![
                vec![(0.05, 0.5), (0.3, 0.25), (0.7, 0.25), (0.95, 0.5)],
                vec![(0.05, 0.5), (0.3, 0.75), (0.7, 0.75), (0.95, 0.5)],
                vec![(0.5, 0.38), (0.62, 0.5), (0.5, 0.62), (0.38, 0.5), (0.5, 0.38)],
            ],
            Icon::Smile => vec![
                octagon(0.5, 0.5, 0.45),
                vec![(0.35, 0.35), (0.35, 0.4)],
                vec![(0.65, 0.35), (0.65, 0.4)],
                vec![(0.3, 0.6), (0.4, 0.7), (0.6, 0.7), (0.7, 0.6)],
            ],
        }
    }
}

fn octagon(cx: f64, cy: f64, radius: f64) -> Vec<(f64, f64)> {
    (0..=8)
        .map(|step| {
            let angle = std::f64::consts::PI / 8.0 + step as f64 * std::f64::consts::PI / 4.0;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}
