use std::fmt;
use std::str::FromStr;

const ESC: &str = "\x1b[";
pub const RESET: &str = "\x1b[0m";

/// The eight base terminal colors, in palette order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
    ];

    fn offset(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::Magenta => "magenta",
            Color::Cyan => "cyan",
            Color::White => "white",
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("Unknown color: {}", s))
    }
}

/// A single named terminal attribute.
///
/// Names follow the `red`, `bright_red`, `on_red`, `on_bright_red`,
/// `bold` scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Foreground { color: Color, bright: bool },
    Background { color: Color, bright: bool },
    Bold,
    Italic,
    Underline,
    Reverse,
    Concealed,
}

impl Attribute {
    /// SGR parameter for this attribute
    pub fn code(&self) -> u8 {
        match self {
            Attribute::Foreground { color, bright: false } => 30 + color.offset(),
            Attribute::Foreground { color, bright: true } => 90 + color.offset(),
            Attribute::Background { color, bright: false } => 40 + color.offset(),
            Attribute::Background { color, bright: true } => 100 + color.offset(),
            Attribute::Bold => 1,
            Attribute::Italic => 3,
            Attribute::Underline => 4,
            Attribute::Reverse => 7,
            Attribute::Concealed => 8,
        }
    }

    /// Wrap `text` in this attribute and a trailing reset
    pub fn apply(&self, text: &str) -> String {
        format!("{}{}m{}{}", ESC, self.code(), text, RESET)
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bold" => return Ok(Attribute::Bold),
            "italic" => return Ok(Attribute::Italic),
            "underline" => return Ok(Attribute::Underline),
            "reverse" => return Ok(Attribute::Reverse),
            "concealed" => return Ok(Attribute::Concealed),
            _ => {}
        }

        let (background, name) = match s.strip_prefix("on_") {
            Some(name) => (true, name),
            None => (false, s),
        };
        let (bright, name) = match name.strip_prefix("bright_") {
            Some(name) => (true, name),
            None => (false, name),
        };
        let color: Color = name
            .parse()
            .map_err(|_| format!("Unknown style attribute: {}", s))?;

        Ok(if background {
            Attribute::Background { color, bright }
        } else {
            Attribute::Foreground { color, bright }
        })
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Foreground { color, bright } => {
                let prefix = if *bright { "bright_" } else { "" };
                write!(f, "{}{}", prefix, color.name())
            }
            Attribute::Background { color, bright } => {
                let prefix = if *bright { "on_bright_" } else { "on_" };
                write!(f, "{}{}", prefix, color.name())
            }
            Attribute::Bold => f.write_str("bold"),
            Attribute::Italic => f.write_str("italic"),
            Attribute::Underline => f.write_str("underline"),
            Attribute::Reverse => f.write_str("reverse"),
            Attribute::Concealed => f.write_str("concealed"),
        }
    }
}

/// Apply attributes in order; the first one listed ends up innermost.
pub fn compose(attributes: &[Attribute], text: &str) -> String {
    attributes
        .iter()
        .fold(text.to_string(), |acc, attr| attr.apply(&acc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!("red".parse::<Attribute>().unwrap().code(), 31);
        assert_eq!("bright_red".parse::<Attribute>().unwrap().code(), 91);
        assert_eq!("on_blue".parse::<Attribute>().unwrap().code(), 44);
        assert_eq!("on_bright_white".parse::<Attribute>().unwrap().code(), 107);
        assert_eq!("underline".parse::<Attribute>().unwrap().code(), 4);
        assert_eq!("black".parse::<Attribute>().unwrap().code(), 30);
    }

    #[test]
    fn test_unknown_attribute() {
        assert!("purple".parse::<Attribute>().is_err());
        assert!("on_".parse::<Attribute>().is_err());
    }

    #[test]
    fn test_display_roundtrips_names() {
        for name in ["cyan", "bright_green", "on_red", "on_bright_black", "concealed"] {
            assert_eq!(name.parse::<Attribute>().unwrap().to_string(), name);
        }
    }

    #[test]
    fn test_compose_order_and_reset() {
        let attrs = [Attribute::Bold, "red".parse().unwrap()];
        assert_eq!(compose(&attrs, "x"), "\x1b[31m\x1b[1mx\x1b[0m\x1b[0m");
        assert_eq!(compose(&[], "x"), "x");
    }
}
