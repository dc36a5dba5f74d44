//! Data structures describing a generated character sheet.
//!
//! The generator answers with a flat JSON object whose keys are Portuguese
//! (`raca`, `classe`, `atributos`, ...).  The types in this module deserialize
//! that shape directly and keep the key order sent by the generator, so the
//! attribute grid is laid out the way the service intended.  English aliases
//! are accepted for every field.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The six ability scores every sheet carries.
///
/// Keys on the wire are the localized (Portuguese) names, which is also what
/// [`Attribute::key`] returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Força.
    Strength,
    /// Destreza.
    Dexterity,
    /// Constituição.
    Constitution,
    /// Inteligência.
    Intelligence,
    /// Sabedoria.
    Wisdom,
    /// Carisma.
    Charisma,
}

impl Attribute {
    /// All attributes in the canonical sheet order.
    pub const ALL: [Attribute; 6] = [
        Attribute::Strength,
        Attribute::Dexterity,
        Attribute::Constitution,
        Attribute::Intelligence,
        Attribute::Wisdom,
        Attribute::Charisma,
    ];

    /// Returns the localized key used by the generator.
    pub fn key(self) -> &'static str {
        match self {
            Attribute::Strength => "Força",
            Attribute::Dexterity => "Destreza",
            Attribute::Constitution => "Constituição",
            Attribute::Intelligence => "Inteligência",
            Attribute::Wisdom => "Sabedoria",
            Attribute::Charisma => "Carisma",
        }
    }

    /// Returns the English name of the attribute.
    pub fn english_name(self) -> &'static str {
        match self {
            Attribute::Strength => "Strength",
            Attribute::Dexterity => "Dexterity",
            Attribute::Constitution => "Constitution",
            Attribute::Intelligence => "Intelligence",
            Attribute::Wisdom => "Wisdom",
            Attribute::Charisma => "Charisma",
        }
    }

    /// Resolves a wire key (localized or English, case-insensitive) to an attribute.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL.into_iter().find(|attribute| {
            attribute.key().to_lowercase() == key.to_lowercase()
                || attribute.english_name().eq_ignore_ascii_case(key)
        })
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The three saving throws carried by extended sheets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SavingThrow {
    /// Fortitude.
    Fortitude,
    /// Reflexos.
    Reflex,
    /// Vontade.
    Will,
}

impl SavingThrow {
    /// All saving throws in sheet order.
    pub const ALL: [SavingThrow; 3] = [
        SavingThrow::Fortitude,
        SavingThrow::Reflex,
        SavingThrow::Will,
    ];

    /// Returns the localized key used by the generator.
    pub fn key(self) -> &'static str {
        match self {
            SavingThrow::Fortitude => "Fortitude",
            SavingThrow::Reflex => "Reflexos",
            SavingThrow::Will => "Vontade",
        }
    }

    /// Resolves a wire key to a saving throw.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|save| save.key().eq_ignore_ascii_case(key))
    }
}

/// A generated character record.
///
/// Sheets are immutable snapshots: the controller replaces them wholesale and
/// never merges two responses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSheet {
    #[serde(rename = "raca", alias = "race")]
    race: String,
    #[serde(rename = "classe", alias = "class")]
    class: String,
    #[serde(rename = "atributos", alias = "attributes", default)]
    attributes: IndexMap<String, i32>,
    #[serde(rename = "modificadores", alias = "modifiers", default)]
    modifiers: IndexMap<String, i32>,
    #[serde(
        rename = "habilidades_raciais",
        alias = "racial_abilities",
        default
    )]
    racial_abilities: Vec<String>,
    #[serde(
        rename = "pontos_de_vida",
        alias = "hit_points",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    hit_points: Option<i32>,
    #[serde(
        rename = "classe_de_armadura",
        alias = "armor_class",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    armor_class: Option<i32>,
    #[serde(
        rename = "testes_de_resistencia",
        alias = "saving_throws",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    saving_throws: Option<IndexMap<String, i32>>,
}

impl CharacterSheet {
    /// Creates a sheet with the given identity and no scores.
    pub fn new(race: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            race: race.into(),
            class: class.into(),
            ..Self::default()
        }
    }

    /// Parses a sheet from the generator's JSON body.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Returns the race label.
    pub fn race(&self) -> &str {
        &self.race
    }

    /// Returns the class label.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Returns the attribute scores in generator order.
    pub fn attributes(&self) -> &IndexMap<String, i32> {
        &self.attributes
    }

    /// Returns the attribute modifiers in generator order.
    pub fn modifiers(&self) -> &IndexMap<String, i32> {
        &self.modifiers
    }

    /// Returns the racial abilities in generator order.
    pub fn racial_abilities(&self) -> &[String] {
        &self.racial_abilities
    }

    /// Returns the hit points of extended sheets.
    pub fn hit_points(&self) -> Option<i32> {
        self.hit_points
    }

    /// Returns the armor class of extended sheets.
    pub fn armor_class(&self) -> Option<i32> {
        self.armor_class
    }

    /// Returns the saving throws of extended sheets.
    pub fn saving_throws(&self) -> Option<&IndexMap<String, i32>> {
        self.saving_throws.as_ref()
    }

    /// Looks up the score of a known attribute.
    pub fn attribute(&self, attribute: Attribute) -> Option<i32> {
        lookup(&self.attributes, |key| Attribute::from_key(key) == Some(attribute))
    }

    /// Looks up the modifier of a known attribute.
    pub fn modifier(&self, attribute: Attribute) -> Option<i32> {
        lookup(&self.modifiers, |key| Attribute::from_key(key) == Some(attribute))
    }

    /// Looks up the modifier for an attribute key exactly as sent by the generator.
    pub fn modifier_for_key(&self, key: &str) -> Option<i32> {
        self.modifiers.get(key).copied().or_else(|| {
            let attribute = Attribute::from_key(key)?;
            self.modifier(attribute)
        })
    }

    /// Looks up a saving throw value.
    pub fn saving_throw(&self, save: SavingThrow) -> Option<i32> {
        self.saving_throws
            .as_ref()
            .and_then(|saves| lookup(saves, |key| SavingThrow::from_key(key) == Some(save)))
    }

    /// Indicates whether the sheet carries any of the extended combat stats.
    pub fn has_combat_stats(&self) -> bool {
        self.hit_points.is_some()
            || self.armor_class.is_some()
            || self
                .saving_throws
                .as_ref()
                .is_some_and(|saves| !saves.is_empty())
    }

    /// Sets an attribute score and its modifier, returning the updated sheet.
    pub fn with_attribute(mut self, key: impl Into<String>, score: i32, modifier: i32) -> Self {
        let key = key.into();
        self.modifiers.insert(key.clone(), modifier);
        self.attributes.insert(key, score);
        self
    }

    /// Appends a racial ability and returns the updated sheet.
    pub fn with_racial_ability(mut self, ability: impl Into<String>) -> Self {
        self.racial_abilities.push(ability.into());
        self
    }

    /// Sets the extended combat stats and returns the updated sheet.
    pub fn with_combat_stats(
        mut self,
        hit_points: i32,
        armor_class: i32,
        saving_throws: impl IntoIterator<Item = (SavingThrow, i32)>,
    ) -> Self {
        self.hit_points = Some(hit_points);
        self.armor_class = Some(armor_class);
        self.saving_throws = Some(
            saving_throws
                .into_iter()
                .map(|(save, value)| (save.key().to_string(), value))
                .collect(),
        );
        self
    }
}

fn lookup(map: &IndexMap<String, i32>, matches: impl Fn(&str) -> bool) -> Option<i32> {
    map.iter()
        .find(|(key, _)| matches(key.as_str()))
        .map(|(_, value)| *value)
}
