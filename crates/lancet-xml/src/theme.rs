//! Theme color extraction.
//!
//! Lancet never regenerates `xl/theme/theme1.xml`; the part is preserved
//! byte-for-byte. The reader only needs the twelve color-scheme slots so
//! theme-referencing cell colors can be resolved to ARGB. The theme
//! namespace is awkward for serde, so this uses the raw quick-xml event API.

use quick_xml::events::Event;
use quick_xml::Reader;

/// The twelve theme color slots, ARGB hex, in schema order:
/// dk1, lt1, dk2, lt2, accent1-6, hlink, folHlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeColorsXml {
    pub colors: [String; 12],
}

impl ThemeColorsXml {
    /// Slot element names in `<a:clrScheme>` order.
    pub const SLOT_NAMES: [&'static str; 12] = [
        "dk1", "lt1", "dk2", "lt2", "accent1", "accent2", "accent3", "accent4", "accent5",
        "accent6", "hlink", "folHlink",
    ];

    pub fn get(&self, index: usize) -> Option<&str> {
        self.colors.get(index).map(|s| s.as_str())
    }
}

impl Default for ThemeColorsXml {
    /// The stock Office theme, used when a workbook has no theme part.
    fn default() -> Self {
        Self {
            colors: [
                "FF000000", "FFFFFFFF", "FF44546A", "FFE7E6E6", "FF4472C4", "FFED7D31",
                "FFA5A5A5", "FFFFC000", "FF5B9BD5", "FF70AD47", "FF0563C1", "FF954F72",
            ]
            .map(String::from),
        }
    }
}

/// Scan raw theme part bytes for the color scheme. Malformed input falls
/// back to the slots parsed so far (defaults for the rest).
pub fn parse_theme_colors(xml_bytes: &[u8]) -> ThemeColorsXml {
    let mut reader = Reader::from_reader(xml_bytes);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut colors = ThemeColorsXml::default();
    let mut current_slot: Option<usize> = None;
    let mut in_scheme = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let local = e.local_name();
                let name = std::str::from_utf8(local.as_ref()).unwrap_or("");
                if name == "clrScheme" {
                    in_scheme = true;
                } else if in_scheme {
                    if let Some(idx) = ThemeColorsXml::SLOT_NAMES.iter().position(|&s| s == name) {
                        current_slot = Some(idx);
                    } else if let Some(slot) = current_slot {
                        if let Some(argb) = color_from_element(name, e) {
                            colors.colors[slot] = argb;
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let local = e.local_name();
                let name = std::str::from_utf8(local.as_ref()).unwrap_or("");
                if name == "clrScheme" {
                    break;
                }
                if ThemeColorsXml::SLOT_NAMES.contains(&name) {
                    current_slot = None;
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    colors
}

fn color_from_element(name: &str, e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    let attr_key: &[u8] = match name {
        "srgbClr" => b"val",
        "sysClr" => b"lastClr",
        _ => return None,
    };
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == attr_key {
            if let Ok(val) = std::str::from_utf8(&attr.value) {
                return Some(format!("FF{}", val.to_ascii_uppercase()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const THEME_SNIPPET: &[u8] = br#"<?xml version="1.0"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office">
  <a:themeElements>
    <a:clrScheme name="Office">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="1F2937"/></a:dk2>
      <a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
      <a:accent1><a:srgbClr val="4472C4"/></a:accent1>
      <a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
      <a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
      <a:accent4><a:srgbClr val="FFC000"/></a:accent4>
      <a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
      <a:accent6><a:srgbClr val="70AD47"/></a:accent6>
      <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
      <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
    </a:clrScheme>
  </a:themeElements>
</a:theme>"#;

    #[test]
    fn test_parse_theme_colors() {
        let colors = parse_theme_colors(THEME_SNIPPET);
        assert_eq!(colors.get(0), Some("FF000000"));
        assert_eq!(colors.get(1), Some("FFFFFFFF"));
        assert_eq!(colors.get(2), Some("FF1F2937"));
        assert_eq!(colors.get(4), Some("FF4472C4"));
        assert_eq!(colors.get(11), Some("FF954F72"));
    }

    #[test]
    fn test_malformed_theme_falls_back_to_defaults() {
        let colors = parse_theme_colors(b"<not-a-theme");
        assert_eq!(colors, ThemeColorsXml::default());
    }
}
