/// One entry of the project colour palette (CSS `rgba()` strings)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectColor {
    pub name: &'static str,
    pub bg: &'static str,
    pub border: &'static str,
}

pub const PALETTE: [ProjectColor; 8] = [
    ProjectColor { name: "rose", bg: "rgba(255, 99, 132, 0.35)", border: "rgba(255, 99, 132, 0.55)" },
    ProjectColor { name: "amber", bg: "rgba(255, 205, 86, 0.35)", border: "rgba(255, 205, 86, 0.55)" },
    ProjectColor { name: "teal", bg: "rgba(72, 207, 173, 0.35)", border: "rgba(72, 207, 173, 0.55)" },
    ProjectColor { name: "sky", bg: "rgba(135, 206, 250, 0.35)", border: "rgba(135, 206, 250, 0.55)" },
    ProjectColor { name: "purple", bg: "rgba(147, 112, 219, 0.35)", border: "rgba(147, 112, 219, 0.55)" },
    ProjectColor { name: "pink", bg: "rgba(255, 182, 193, 0.35)", border: "rgba(255, 182, 193, 0.55)" },
    ProjectColor { name: "lightgreen", bg: "rgba(144, 238, 144, 0.35)", border: "rgba(144, 238, 144, 0.55)" },
    ProjectColor { name: "khaki", bg: "rgba(240, 230, 140, 0.35)", border: "rgba(240, 230, 140, 0.55)" },
];

/// Palette entry for a colour index (wraps around).
pub fn color_for(idx: usize) -> &'static ProjectColor {
    &PALETTE[idx % PALETTE.len()]
}
