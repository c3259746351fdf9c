//! Group colors.

/// A named color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub name: &'static str,
    pub hex: &'static str,
}

const fn color(name: &'static str, hex: &'static str) -> Color {
    Color { name, hex }
}

/// Colors given to groups, in order.  Values are those of Leaflet's marker
/// icons, so that maps and plots agree.
pub const PALETTE: [Color; 10] = [
    color("red", "#d63e2a"),
    color("blue", "#38aadd"),
    color("green", "#72b026"),
    color("purple", "#d252b9"),
    color("orange", "#f69730"),
    color("darkred", "#a23336"),
    color("cadetblue", "#436978"),
    color("pink", "#ff8ee9"),
    color("black", "#303030"),
    color("gray", "#575757"),
];

/// Returns the color of the given group.
///
/// Colors are reused when there are more groups than colors.
pub fn group_color(group: usize) -> Color {
    PALETTE[group % PALETTE.len()]
}
