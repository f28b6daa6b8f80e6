//! Free-text color names, as people type them into a "favorite color" field.

use crate::image::Color;

use std::collections::HashMap;
use std::sync::OnceLock;

/// Returned for any name missing from [`NAMED_COLORS`].
pub const FALLBACK_COLOR: Color = Color::from_rgb24(0x666666);

/// Known names, already lower-case. Modifier entries (`light`, `dark`, `bright`, `pale`, `deep`)
/// are spelled out rather than derived, so each one maps to a hand-picked shade.
pub const NAMED_COLORS: &[(&str, u32)] = &[
    // base hues
    ("red", 0xE53935),
    ("orange", 0xFB8C00),
    ("yellow", 0xFDD835),
    ("green", 0x43A047),
    ("blue", 0x1E88E5),
    ("purple", 0x8E24AA),
    ("pink", 0xEC407A),
    ("brown", 0x6D4C41),
    ("black", 0x000000),
    ("white", 0xFFFFFF),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("teal", 0x009688),
    ("turquoise", 0x40E0D0),
    ("navy", 0x000080),
    ("maroon", 0x800000),
    ("gold", 0xFFD700),
    ("silver", 0xC0C0C0),
    ("beige", 0xF5F5DC),
    ("violet", 0xEE82EE),
    ("indigo", 0x4B0082),
    ("magenta", 0xFF00FF),
    ("cyan", 0x00BCD4),
    ("lavender", 0xB57EDC),
    ("coral", 0xFF7F50),
    ("peach", 0xFFCBA4),
    ("mint", 0x98FF98),
    ("olive", 0x808000),
    ("lime", 0xCDDC39),
    ("aqua", 0x00FFFF),
    ("tan", 0xD2B48C),
    ("burgundy", 0x800020),
    ("crimson", 0xDC143C),
    ("salmon", 0xFA8072),
    ("rose", 0xFF007F),
    ("ivory", 0xFFFFF0),
    ("cream", 0xFFFDD0),
    ("charcoal", 0x36454F),
    ("khaki", 0xC3B091),
    ("plum", 0x8E4585),
    ("lilac", 0xC8A2C8),
    ("mauve", 0xE0B0FF),
    ("emerald", 0x50C878),
    ("sapphire", 0x0F52BA),
    ("ruby", 0xE0115F),
    ("amber", 0xFFBF00),
    ("bronze", 0xCD7F32),
    ("copper", 0xB87333),
    ("fuchsia", 0xFF00FF),
    ("periwinkle", 0xCCCCFF),
    ("scarlet", 0xFF2400),
    ("jade", 0x00A86B),
    ("cerulean", 0x007BA7),
    ("cobalt", 0x0047AB),
    ("mustard", 0xFFDB58),
    ("chartreuse", 0x7FFF00),
    ("orchid", 0xDA70D6),
    ("rust", 0xB7410E),
    ("aquamarine", 0x7FFFD4),
    ("tangerine", 0xF28500),
    ("eggplant", 0x614051),
    ("coffee", 0x6F4E37),
    ("caramel", 0xC68E17),
    ("sand", 0xC2B280),
    // light
    ("light red", 0xFF7F7F),
    ("light orange", 0xFFB74D),
    ("light yellow", 0xFFF59D),
    ("light green", 0x90EE90),
    ("light blue", 0xADD8E6),
    ("light purple", 0xCE93D8),
    ("light pink", 0xFFB6C1),
    ("light brown", 0xA1887F),
    ("light gray", 0xD3D3D3),
    ("light grey", 0xD3D3D3),
    // dark
    ("dark red", 0x8B0000),
    ("dark orange", 0xFF8C00),
    ("dark yellow", 0xF9A825),
    ("dark green", 0x006400),
    ("dark blue", 0x00008B),
    ("dark purple", 0x4A148C),
    ("dark pink", 0xAD1457),
    ("dark brown", 0x3E2723),
    ("dark gray", 0xA9A9A9),
    ("dark grey", 0xA9A9A9),
    // bright
    ("bright red", 0xFF0000),
    ("bright orange", 0xFF9100),
    ("bright yellow", 0xFFFF00),
    ("bright green", 0x00E676),
    ("bright blue", 0x2979FF),
    ("bright purple", 0xD500F9),
    ("bright pink", 0xFF4081),
    // pale
    ("pale yellow", 0xFFFACD),
    ("pale green", 0x98FB98),
    ("pale blue", 0xAFEEEE),
    ("pale pink", 0xFADADD),
    ("pale purple", 0xE1BEE7),
    // deep
    ("deep red", 0xB71C1C),
    ("deep blue", 0x0D47A1),
    ("deep purple", 0x673AB7),
    ("deep pink", 0xFF1493),
    ("deep green", 0x1B5E20),
    ("deep orange", 0xFF5722),
    // compound names
    ("sky blue", 0x87CEEB),
    ("baby blue", 0x89CFF0),
    ("royal blue", 0x4169E1),
    ("navy blue", 0x000080),
    ("midnight blue", 0x191970),
    ("powder blue", 0xB0E0E6),
    ("steel blue", 0x4682B4),
    ("electric blue", 0x7DF9FF),
    ("ice blue", 0x99FFFF),
    ("teal blue", 0x367588),
    ("hot pink", 0xFF69B4),
    ("baby pink", 0xF4C2C2),
    ("neon pink", 0xFF6EC7),
    ("bubblegum pink", 0xFFC1CC),
    ("blush pink", 0xFE828C),
    ("dusty rose", 0xDCAE96),
    ("rose gold", 0xB76E79),
    ("forest green", 0x228B22),
    ("lime green", 0x32CD32),
    ("sea green", 0x2E8B57),
    ("olive green", 0x6B8E23),
    ("mint green", 0x98FF98),
    ("kelly green", 0x4CBB17),
    ("hunter green", 0x355E3B),
    ("neon green", 0x39FF14),
    ("sage green", 0x9CAF88),
    ("army green", 0x4B5320),
    ("neon yellow", 0xDFFF00),
    ("lemon yellow", 0xFFF44F),
    ("sunshine yellow", 0xFFFD37),
    ("blood red", 0x8A0303),
    ("cherry red", 0xD2042D),
    ("fire engine red", 0xCE2029),
    ("brick red", 0xCB4154),
    ("wine red", 0x722F37),
    ("burnt orange", 0xCC5500),
    ("slate gray", 0x708090),
    ("slate grey", 0x708090),
    ("ash gray", 0xB2BEB5),
    ("ash grey", 0xB2BEB5),
    ("lavender purple", 0x967BB6),
    ("royal purple", 0x7851A9),
    ("chocolate brown", 0x7B3F00),
    ("off white", 0xFAF9F6),
    ("snow white", 0xFFFAFA),
    ("jet black", 0x343434),
    ("pitch black", 0x000000),
];

fn lookup() -> &'static HashMap<&'static str, Color> {
    static TABLE: OnceLock<HashMap<&'static str, Color>> = OnceLock::new();
    TABLE.get_or_init(|| {
        NAMED_COLORS
            .iter()
            .map(|&(name, rgb)| (name, Color::from_rgb24(rgb)))
            .collect()
    })
}

/// Resolves a free-text color name to a concrete color, ignoring case and surrounding
/// whitespace. Unknown names resolve to [`FALLBACK_COLOR`].
pub fn resolve_color(name: impl AsRef<str>) -> Color {
    let key = name.as_ref().trim().to_lowercase();
    match lookup().get(key.as_str()) {
        Some(color) => *color,
        None => {
            tracing::debug!(name = %key, "unknown color name, using fallback gray");
            FALLBACK_COLOR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_before_lookup() {
        assert_eq!(resolve_color("  Sky Blue "), Color::from_rgb24(0x87CEEB));
        assert_eq!(resolve_color("GREEN"), Color::from_rgb24(0x43A047));
        assert_eq!(resolve_color("hot pink"), Color::from_rgb24(0xFF69B4));
    }

    #[test]
    fn unknown_names_fall_back_to_gray() {
        for name in ["", "   ", "blurple", "the color of the sea at dawn", "#123456"] {
            assert_eq!(resolve_color(name), FALLBACK_COLOR);
        }
        assert_eq!(FALLBACK_COLOR.to_string(), "#666666");
    }

    #[test]
    fn table_covers_modifiers_and_has_no_duplicates() {
        assert!(NAMED_COLORS.len() >= 140);
        assert_eq!(lookup().len(), NAMED_COLORS.len());
        for modifier in ["light", "dark", "bright", "pale", "deep"] {
            let key = format!("{modifier} blue");
            assert!(lookup().contains_key(key.as_str()), "{key}");
        }
        assert!(NAMED_COLORS.iter().all(|(n, _)| *n == n.trim().to_lowercase()));
    }
}
