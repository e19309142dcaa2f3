use phf::{Set, phf_set};

static WATER_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "HOH", "WAT", "H2O", "DOD", "D2O", "SOL", "TIP", "TIP3", "SPC",
};

static HYDROGEN_ELEMENTS: Set<&'static str> = phf_set! { "H", "D" };

pub fn is_water_residue(residue_name: &str) -> bool {
    WATER_RESIDUE_NAMES.contains(residue_name.trim())
}

pub fn is_hydrogen_element(element: &str) -> bool {
    HYDROGEN_ELEMENTS.contains(element.trim())
}

/// Guesses the element symbol from an atom name when the element column is
/// blank. Leading digits are skipped (e.g. "1HB" → "H").
pub fn infer_element(atom_name: &str) -> String {
    atom_name
        .trim()
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}
