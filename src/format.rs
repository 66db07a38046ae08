//! Turns model markdown into the small HTML subset the output panes use.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{MAX_FONT_SIZE, MIN_FONT_SIZE};

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*#+\s*").expect("valid heading regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("valid italic regex"));

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn strip_headings(text: &str) -> String {
    HEADING.replace_all(text, "").into_owned()
}

pub fn clean_and_format(text: &str) -> String {
    let text = strip_headings(&escape_html(text));
    let text = BOLD.replace_all(&text, "<b>${1}</b>");
    let text = ITALIC.replace_all(&text, "<i>${1}</i>");
    text.replace('\n', "<br>")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFamily {
    #[default]
    Poppins,
    Roboto,
    OpenSans,
    Arial,
    CourierNew,
    Georgia,
    TimesNewRoman,
}

impl FontFamily {
    pub const ALL: [FontFamily; 7] = [
        FontFamily::Poppins,
        FontFamily::Roboto,
        FontFamily::OpenSans,
        FontFamily::Arial,
        FontFamily::CourierNew,
        FontFamily::Georgia,
        FontFamily::TimesNewRoman,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Poppins => "Poppins",
            FontFamily::Roboto => "Roboto",
            FontFamily::OpenSans => "Open Sans",
            FontFamily::Arial => "Arial",
            FontFamily::CourierNew => "Courier New",
            FontFamily::Georgia => "Georgia",
            FontFamily::TimesNewRoman => "Times New Roman",
        }
    }

    /// Case-insensitive lookup; unknown names fall back to the default.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|family| family.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display settings chosen once for the whole window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub font: FontFamily,
    pub size: u16,
}

impl Style {
    pub fn new(font: FontFamily, size: u16) -> Self {
        Style {
            font,
            size: size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE),
        }
    }

    pub fn render(&self, text: &str) -> String {
        styled_output(text, self.font.name(), self.size)
    }
}

impl Default for Style {
    fn default() -> Self {
        Style::new(FontFamily::default(), 18)
    }
}

pub fn styled_output(text: &str, font: &str, size: u16) -> String {
    format!(
        "<div style='font-family:{font}; font-size:{size}px; white-space:pre-wrap;'>{}</div>",
        clean_and_format(text)
    )
}

/// Same cleanup as [`clean_and_format`] but with the emphasis markers dropped
/// instead of converted, for widgets that cannot render HTML.
pub fn display_text(text: &str) -> String {
    let text = strip_headings(text);
    let text = BOLD.replace_all(&text, "${1}");
    ITALIC.replace_all(&text, "${1}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_and_italic() {
        let out = clean_and_format("**bold** and *italic*");
        assert_eq!(out, "<b>bold</b> and <i>italic</i>");
        assert!(!out.contains('*'));
    }

    #[test]
    fn test_headings_are_stripped() {
        let out = clean_and_format("# Title\nBody\n  ### Sub\nMore");
        assert_eq!(out, "Title<br>Body<br>Sub<br>More");
    }

    #[test]
    fn test_markup_in_model_output_is_escaped() {
        assert_eq!(
            clean_and_format("use <div> & **x < y**"),
            "use &lt;div&gt; &amp; <b>x &lt; y</b>"
        );
    }

    #[test]
    fn test_is_deterministic() {
        let input = "## Plan\n1. **Read** chapter *one*\n2. Practice";
        assert_eq!(clean_and_format(input), clean_and_format(input));
    }

    #[test]
    fn test_styled_wrapper() {
        assert_eq!(
            styled_output("hi\nthere", "Georgia", 20),
            "<div style='font-family:Georgia; font-size:20px; white-space:pre-wrap;'>hi<br>there</div>"
        );
    }

    #[test]
    fn test_style_clamps_size_and_names_font() {
        let style = Style::new(FontFamily::from_name("courier new"), 40);
        assert_eq!(style.font, FontFamily::CourierNew);
        assert_eq!(style.size, MAX_FONT_SIZE);
        assert!(style.render("x").starts_with("<div style='font-family:Courier New; font-size:28px;"));
        assert_eq!(FontFamily::from_name("Comic Sans"), FontFamily::Poppins);
    }

    #[test]
    fn test_display_text_drops_markers() {
        assert_eq!(
            display_text("# Answer\n**Newton** said *so*."),
            "Answer\nNewton said so."
        );
    }
}
