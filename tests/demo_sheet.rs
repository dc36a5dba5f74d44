use std::path::PathBuf;

use character_sheet::layout::{self, Section};
use character_sheet::{export_filename, Attribute, CharacterSheet};

fn demo_sheet() -> CharacterSheet {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/elfo-guerreiro.json");
    let body = std::fs::read_to_string(&path).expect("read demo sheet");
    CharacterSheet::from_json(&body).expect("parse demo sheet")
}

#[test]
fn demo_sheet_matches_generator_shape() {
    let sheet = demo_sheet();
    for attribute in Attribute::ALL {
        assert!(sheet.attribute(attribute).is_some(), "{attribute} missing");
        assert!(sheet.modifier(attribute).is_some(), "{attribute} modifier missing");
    }
    assert_eq!(export_filename(&sheet), "ficha-personagem-Elfo-Guerreiro.pdf");
}

#[test]
fn demo_sheet_lays_out_three_sections() {
    let layout = layout::render_sheet(&demo_sheet());
    assert_eq!(layout.sections().len(), 3);
    assert!(matches!(
        &layout.sections()[0],
        Section::Identity { race, class } if race == "Elfo" && class == "Guerreiro"
    ));
    assert_eq!(layout.ability_items().len(), 3);
    assert!(layout.ability_items()[0].starts_with("Visão no escuro"));
}
