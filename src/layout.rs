//! Grouping a sheet into display sections.
//!
//! [`render`] is a pure function of the current sheet.  The resulting
//! [`SheetLayout`] is what both the terminal view (through `Display`) and the
//! PDF export consume, so the two never disagree about what a sheet shows.

use std::fmt;

use crate::icons::Icon;
use crate::model::{CharacterSheet, SavingThrow};

/// Title printed above every sheet.
pub const SHEET_TITLE: &str = "Ficha de Personagem";

/// One cell of the attribute grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeCell {
    pub name: String,
    pub icon: Option<Icon>,
    pub score: i32,
    pub modifier: Option<i32>,
}

/// A labelled value of the combat block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stat {
    pub label: String,
    pub value: i32,
}

/// A titled group of the rendered sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Section {
    /// Race and class.
    Identity { race: String, class: String },
    /// Score and modifier per attribute.
    Attributes(Vec<AttributeCell>),
    /// Hit points, armor class and saving throws.
    Combat(Vec<Stat>),
    /// Racial abilities in generator order.
    Abilities(Vec<String>),
}

impl Section {
    /// Returns the heading shown above the section.
    pub fn title(&self) -> &'static str {
        match self {
            Section::Identity { .. } => "Identidade",
            Section::Attributes(_) => "Atributos",
            Section::Combat(_) => "Combate",
            Section::Abilities(_) => "Habilidades Raciais",
        }
    }
}

/// The rendered view of one sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetLayout {
    sections: Vec<Section>,
}

impl SheetLayout {
    /// Returns the sections in display order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns the attribute cells.
    pub fn attribute_cells(&self) -> &[AttributeCell] {
        self.sections
            .iter()
            .find_map(|section| match section {
                Section::Attributes(cells) => Some(cells.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Returns the racial ability items.
    pub fn ability_items(&self) -> &[String] {
        self.sections
            .iter()
            .find_map(|section| match section {
                Section::Abilities(items) => Some(items.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Lays out the current sheet. Nothing is rendered when no sheet is present.
pub fn render(sheet: Option<&CharacterSheet>) -> Option<SheetLayout> {
    sheet.map(render_sheet)
}

/// Lays out a sheet into identity, attributes, optional combat and abilities.
pub fn render_sheet(sheet: &CharacterSheet) -> SheetLayout {
    let mut sections = vec![
        Section::Identity {
            race: sheet.race().to_string(),
            class: sheet.class().to_string(),
        },
        Section::Attributes(attribute_cells(sheet)),
    ];

    if sheet.has_combat_stats() {
        sections.push(Section::Combat(combat_stats(sheet)));
    }

    sections.push(Section::Abilities(sheet.racial_abilities().to_vec()));

    SheetLayout { sections }
}

fn attribute_cells(sheet: &CharacterSheet) -> Vec<AttributeCell> {
    sheet
        .attributes()
        .iter()
        .map(|(name, score)| AttributeCell {
            name: name.clone(),
            icon: Icon::for_key(name),
            score: *score,
            modifier: sheet.modifier_for_key(name),
        })
        .collect()
}

fn combat_stats(sheet: &CharacterSheet) -> Vec<Stat> {
    let mut stats = Vec::new();
    if let Some(value) = sheet.hit_points() {
        stats.push(Stat {
            label: "Pontos de Vida".to_string(),
            value,
        });
    }
    if let Some(value) = sheet.armor_class() {
        stats.push(Stat {
            label: "Classe de Armadura".to_string(),
            value,
        });
    }
    if let Some(saves) = sheet.saving_throws() {
        // Known saves first in sheet order, then whatever else the generator sent.
        for save in SavingThrow::ALL {
            if let Some(value) = sheet.saving_throw(save) {
                stats.push(Stat {
                    label: save.key().to_string(),
                    value,
                });
            }
        }
        for (key, value) in saves {
            if SavingThrow::from_key(key).is_none() {
                stats.push(Stat {
                    label: key.clone(),
                    value: *value,
                });
            }
        }
    }
    stats
}

/// Formats an optional modifier the way the sheet shows it.
pub fn modifier_label(modifier: Option<i32>) -> String {
    match modifier {
        Some(value) => format!("Mod: {value}"),
        None => "Mod:".to_string(),
    }
}

impl fmt::Display for SheetLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", SHEET_TITLE.to_uppercase())?;
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "| {}", section.title())?;
            match section {
                Section::Identity { race, class } => {
                    writeln!(f, "  Raça: {race}")?;
                    writeln!(f, "  Classe: {class}")?;
                }
                Section::Attributes(cells) => {
                    for cell in cells {
                        writeln!(
                            f,
                            "  {:<14} {:>3}   {}",
                            cell.name.to_uppercase(),
                            cell.score,
                            modifier_label(cell.modifier)
                        )?;
                    }
                }
                Section::Combat(stats) => {
                    for stat in stats {
                        writeln!(f, "  {}: {}", stat.label, stat.value)?;
                    }
                }
                Section::Abilities(items) => {
                    for item in items {
                        writeln!(f, "  • {item}")?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attribute;

    fn sample() -> CharacterSheet {
        Attribute::ALL
            .iter()
            .enumerate()
            .fold(CharacterSheet::new("Elfo", "Guerreiro"), |sheet, (i, a)| {
                sheet.with_attribute(a.key(), 10 + i as i32, i as i32 - 1)
            })
            .with_racial_ability("Visão no escuro")
            .with_racial_ability("Transe")
    }

    #[test]
    fn nothing_renders_without_a_sheet() {
        assert_eq!(render(None), None);
    }

    #[test]
    fn attribute_grid_has_the_six_keys() {
        let sheet = sample();
        let layout = render(Some(&sheet)).expect("layout");
        let cells = layout.attribute_cells();
        assert_eq!(cells.len(), 6);
        for (index, attribute) in Attribute::ALL.iter().enumerate() {
            let cell = &cells[index];
            assert_eq!(cell.name, attribute.key());
            assert_eq!(cell.score, 10 + index as i32);
            assert_eq!(cell.modifier, Some(index as i32 - 1));
            assert_eq!(cell.icon, Some(Icon::for_attribute(*attribute)));
        }
    }

    #[test]
    fn sections_follow_sheet_order() {
        let sheet = sample();
        let titles: Vec<_> = render(Some(&sheet))
            .expect("layout")
            .sections()
            .iter()
            .map(Section::title)
            .collect();
        assert_eq!(titles, ["Identidade", "Atributos", "Habilidades Raciais"]);
    }

    #[test]
    fn combat_block_only_for_extended_sheets() {
        let sheet = sample().with_combat_stats(
            12,
            16,
            [(SavingThrow::Fortitude, 4), (SavingThrow::Reflex, 2), (SavingThrow::Will, 1)],
        );
        let layout = render(Some(&sheet)).expect("layout");
        let combat = layout
            .sections()
            .iter()
            .find_map(|section| match section {
                Section::Combat(stats) => Some(stats.clone()),
                _ => None,
            })
            .expect("combat section");
        let labels: Vec<_> = combat.iter().map(|stat| stat.label.as_str()).collect();
        assert_eq!(
            labels,
            ["Pontos de Vida", "Classe de Armadura", "Fortitude", "Reflexos", "Vontade"]
        );
        assert_eq!(layout.sections()[2].title(), "Combate");
    }

    #[test]
    fn abilities_keep_order_and_length() {
        let sheet = sample();
        let layout = render(Some(&sheet)).expect("layout");
        assert_eq!(layout.ability_items(), ["Visão no escuro", "Transe"]);

        let empty = CharacterSheet::new("Humano", "Mago");
        let layout = render(Some(&empty)).expect("layout");
        assert!(layout.ability_items().is_empty());
        assert!(!layout.to_string().contains('•'));
    }

    #[test]
    fn missing_modifier_renders_blank() {
        let sheet = CharacterSheet::from_json(
            r#"{"raca": "Orc", "classe": "Bárbaro", "atributos": {"Força": 18}, "modificadores": {}}"#,
        )
        .expect("parse");
        let layout = render(Some(&sheet)).expect("layout");
        assert_eq!(layout.attribute_cells()[0].modifier, None);
        assert!(layout.to_string().contains("Mod:"));
    }

    #[test]
    fn text_view_lists_identity() {
        let sheet = sample();
        let text = render(Some(&sheet)).expect("layout").to_string();
        assert!(text.starts_with("FICHA DE PERSONAGEM"));
        assert!(text.contains("Raça: Elfo"));
        assert!(text.contains("Classe: Guerreiro"));
        assert!(text.contains("Mod: -1"));
    }
}
