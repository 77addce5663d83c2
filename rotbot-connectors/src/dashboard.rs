//! Receiving-side status board
//!
//! Keeps the last value seen for each telemetry field and renders them as a
//! single HTML page. Fields only change when a request carries them with a
//! non-empty value, so a partial report leaves the rest of the board as it
//! was.

use std::fmt::Write as _;

use rotbot_core::SystemState;

/// Colour of the state headline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextColor {
    /// No state received yet
    #[default]
    Unset,
    /// `GREEN`
    Green,
    /// `YELLOW`
    Yellow,
    /// Anything else, including unrecognised states
    Red,
}

impl TextColor {
    /// Colour for a reported state string
    pub fn for_state(state: &str) -> Self {
        if state == SystemState::Green.name() {
            TextColor::Green
        } else if state == SystemState::Yellow.name() {
            TextColor::Yellow
        } else {
            TextColor::Red
        }
    }

    /// CSS colour name; empty while unset
    pub fn css(&self) -> &'static str {
        match self {
            TextColor::Unset => "",
            TextColor::Green => "green",
            TextColor::Yellow => "yellow",
            TextColor::Red => "red",
        }
    }
}

/// Last known telemetry values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBoard {
    temp: String,
    humidity: String,
    light: String,
    state: String,
    text_color: TextColor,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self {
            temp: "0".into(),
            humidity: "0".into(),
            light: "0".into(),
            state: String::new(),
            text_color: TextColor::Unset,
        }
    }
}

impl StatusBoard {
    /// Empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Last temperature
    pub fn temp(&self) -> &str {
        &self.temp
    }

    /// Last humidity
    pub fn humidity(&self) -> &str {
        &self.humidity
    }

    /// Last light intensity
    pub fn light(&self) -> &str {
        &self.light
    }

    /// Last state string
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Headline colour
    pub fn text_color(&self) -> TextColor {
        self.text_color
    }

    /// Apply one field; unknown keys and empty values are ignored
    pub fn update(&mut self, key: &str, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        match key {
            "temp" => self.temp = value.to_string(),
            "humidity" => self.humidity = value.to_string(),
            "light" => self.light = value.to_string(),
            "state" => {
                self.state = value.to_string();
                self.text_color = TextColor::for_state(value);
            }
            _ => return false,
        }
        true
    }

    /// Apply decoded query pairs, returning how many fields changed
    pub fn apply<'a, I>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs
            .into_iter()
            .filter(|(key, value)| self.update(key, value))
            .count()
    }

    /// Render the board page
    pub fn render_html(&self) -> String {
        let mut page = String::with_capacity(768);
        // Writing into a String cannot fail
        let _ = write!(
            page,
            "<body style='margin: 50px 50px 50px 50px; color: white; background-color: black; font-size: 200%;'>\
             <h1 style='font-family:courier; text-align:left;'>RotBot Results</h1>\
             <h2 style='font-family:courier; text-align:left; color:{color}; font-size: 200%;'> {state}</h2>\
             <p style='font-family:courier; text-align:left;'>Temperature: {temp}°C</p>\
             <p style='font-family:courier; text-align:left;'>Humidity: {humidity}</p>\
             <p style='font-family:courier; text-align:left;'>Light: {light}</p>\
             </body>",
            color = self.text_color.css(),
            state = escape_html(&self.state),
            temp = escape_html(&self.temp),
            humidity = escape_html(&self.humidity),
            light = escape_html(&self.light),
        );
        page
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let board = StatusBoard::new();
        assert_eq!(board.temp(), "0");
        assert_eq!(board.state(), "");
        assert_eq!(board.text_color(), TextColor::Unset);
    }

    #[test]
    fn applies_full_report() {
        let mut board = StatusBoard::new();
        let changed = board.apply([
            ("temp", "23.50"),
            ("humidity", "54.00"),
            ("light", "1299.00"),
            ("state", "YELLOW"),
        ]);
        assert_eq!(changed, 4);
        assert_eq!(board.temp(), "23.50");
        assert_eq!(board.humidity(), "54.00");
        assert_eq!(board.light(), "1299.00");
        assert_eq!(board.state(), "YELLOW");
        assert_eq!(board.text_color(), TextColor::Yellow);
    }

    #[test]
    fn empty_and_missing_fields_keep_previous_values() {
        let mut board = StatusBoard::new();
        board.apply([("temp", "21.00"), ("state", "GREEN")]);
        let changed = board.apply([("temp", ""), ("light", "5.00"), ("bogus", "1")]);
        assert_eq!(changed, 1);
        assert_eq!(board.temp(), "21.00");
        assert_eq!(board.light(), "5.00");
        assert_eq!(board.text_color(), TextColor::Green);
    }

    #[test]
    fn colour_follows_state() {
        assert_eq!(TextColor::for_state("GREEN"), TextColor::Green);
        assert_eq!(TextColor::for_state("YELLOW"), TextColor::Yellow);
        assert_eq!(TextColor::for_state("RED"), TextColor::Red);
        assert_eq!(TextColor::for_state("green"), TextColor::Red);
        assert_eq!(TextColor::for_state("PURPLE"), TextColor::Red);
    }

    #[test]
    fn renders_page() {
        let mut board = StatusBoard::new();
        board.apply([("state", "RED"), ("temp", "29.50")]);
        let html = board.render_html();
        assert!(html.contains("RotBot Results"));
        assert!(html.contains("color:red;"));
        assert!(html.contains("> RED</h2>"));
        assert!(html.contains("Temperature: 29.50°C"));
        assert!(html.contains("Humidity: 0"));
    }

    #[test]
    fn escapes_markup() {
        let mut board = StatusBoard::new();
        board.update("state", "<script>");
        let html = board.render_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
