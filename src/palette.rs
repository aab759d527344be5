use plotters::style::RGBColor;

/// Qualitative colour palette assigned to series in order.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<RGBColor>,
}

impl ColorPalette {
    /// The d3/matplotlib category10 palette
    pub fn category10() -> Self {
        Self::from_hex(&[
            "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
            "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
        ])
    }

    /// Plotly's Dark24 palette, used for map points
    pub fn dark24() -> Self {
        Self::from_hex(&[
            "#2E91E5", "#E15F99", "#1CA71C", "#FB0D0D", "#DA16FF", "#222A2A",
            "#B68100", "#750D86", "#EB663B", "#511CFB", "#00A08B", "#FB00D1",
            "#FC0080", "#B2828D", "#6C7C32", "#778AAE", "#862A16", "#A777F1",
            "#620042", "#1616A7", "#DA60CA", "#6C4516", "#0D2A63", "#AF0038",
        ])
    }

    fn from_hex(codes: &[&str]) -> Self {
        Self {
            colors: codes.iter().filter_map(|c| parse_hex(c)).collect(),
        }
    }

    /// Colour for the i-th series, cycling when the palette runs out
    pub fn get(&self, index: usize) -> RGBColor {
        self.colors[index % self.colors.len()]
    }
}

/// Parse `#rrggbb`
pub fn parse_hex(code: &str) -> Option<RGBColor> {
    let hex = code.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(RGBColor(r, g, b))
}
