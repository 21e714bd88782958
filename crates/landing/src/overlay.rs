//! Screen-space text state: loading screen, countdown, typed prompt, header and clock.
//!
//! This module only holds strings and flags. Drawing them is the binary's job.

use chrono::{Local, NaiveDateTime};

/// Where the single overlay line sits on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextAnchor {
    /// Right edge, `bottom_frac` of the height above the bottom.
    BottomRight { bottom_frac: f32 },
    /// Horizontally centred, `bottom_frac` of the height above the bottom.
    BottomCenter { bottom_frac: f32 },
}

impl TextAnchor {
    pub const COUNTDOWN: Self = TextAnchor::BottomRight { bottom_frac: 0.10 };
    pub const PROMPT: Self = TextAnchor::BottomCenter { bottom_frac: 0.15 };
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayText {
    pub content: String,
    pub anchor: TextAnchor,
}

/// "Arriving at Planet X in N..." stepping down to zero.
#[derive(Debug, Clone)]
pub struct Countdown {
    planet_name: String,
    remaining: u32,
}

impl Countdown {
    pub fn new(planet_name: impl Into<String>, from: u32) -> Self {
        Self {
            planet_name: planet_name.into(),
            remaining: from,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    pub fn text(&self) -> String {
        format!("Arriving at Planet {} in {}...", self.planet_name, self.remaining)
    }

    /// Count down by one. Returns true once zero is reached.
    pub fn step(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.is_finished()
    }
}

/// Reveals a message one character at a time.
#[derive(Debug, Clone)]
pub struct TypedPrompt {
    message: String,
    shown: usize,
}

impl TypedPrompt {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            shown: 0,
        }
    }

    /// Text typed so far.
    pub fn text(&self) -> &str {
        &self.message[..self.shown]
    }

    pub fn is_finished(&self) -> bool {
        self.shown >= self.message.len()
    }

    /// Reveal the next character. Returns true when the whole message is shown.
    pub fn next_char(&mut self) -> bool {
        if let Some(c) = self.message[self.shown..].chars().next() {
            self.shown += c.len_utf8();
        }
        self.is_finished()
    }
}

/// Source of the wall-clock date shown in the room.
pub trait DateSource {
    fn now(&self) -> NaiveDateTime;
}

/// The machine's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl DateSource for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A date that never moves. Used for tests and recordings.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl DateSource for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// `Fri, Oct 16, 2026 | 10:58:01 AM`
pub fn format_datetime(at: &NaiveDateTime) -> String {
    at.format("%a, %b %-d, %Y | %I:%M:%S %p").to_string()
}

/// Everything the overlay pass draws this frame.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub loading_visible: bool,
    pub text: Option<OverlayText>,
    pub header_visible: bool,
    pub header: String,
    /// Empty until the room clock starts.
    pub datetime: String,
}

impl Overlay {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            loading_visible: true,
            text: None,
            header_visible: false,
            header: header.into(),
            datetime: String::new(),
        }
    }

    pub fn show_text(&mut self, content: impl Into<String>, anchor: TextAnchor) {
        let content = content.into();
        log::debug!("Overlay text: {:?}", content);
        self.text = Some(OverlayText { content, anchor });
    }

    pub fn hide_text(&mut self) {
        self.text = None;
    }

    /// Whether the overlay line currently shows something at `anchor`.
    pub fn shows_at(&self, anchor: TextAnchor) -> bool {
        matches!(&self.text, Some(text) if text.anchor == anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn countdown_steps_to_zero_and_stops() {
        let mut countdown = Countdown::new("Nife", 3);
        assert_eq!(countdown.text(), "Arriving at Planet Nife in 3...");
        assert!(!countdown.step());
        assert_eq!(countdown.text(), "Arriving at Planet Nife in 2...");
        assert!(!countdown.step());
        assert!(countdown.step());
        assert!(countdown.step());
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn prompt_types_one_character_per_step() {
        let mut prompt = TypedPrompt::new("click anywhere to start");
        assert_eq!(prompt.text(), "");
        let mut steps = 0;
        while !prompt.next_char() {
            steps += 1;
            assert_eq!(prompt.text().chars().count(), steps);
        }
        assert_eq!(steps + 1, 23);
        assert_eq!(prompt.text(), "click anywhere to start");
        assert!(prompt.next_char());
    }

    #[test]
    fn prompt_respects_multibyte_characters() {
        let mut prompt = TypedPrompt::new("né");
        prompt.next_char();
        assert_eq!(prompt.text(), "n");
        assert!(prompt.next_char());
        assert_eq!(prompt.text(), "né");
    }

    #[test]
    fn datetime_matches_display_format() {
        let at = NaiveDate::from_ymd_opt(2026, 10, 16)
            .and_then(|d| d.and_hms_opt(10, 58, 1))
            .unwrap();
        assert_eq!(format_datetime(&at), "Fri, Oct 16, 2026 | 10:58:01 AM");

        let evening = NaiveDate::from_ymd_opt(2026, 1, 4)
            .and_then(|d| d.and_hms_opt(21, 5, 9))
            .unwrap();
        assert_eq!(format_datetime(&evening), "Sun, Jan 4, 2026 | 09:05:09 PM");
        assert_eq!(format_datetime(&FixedClock(evening).now()), format_datetime(&evening));
    }

    #[test]
    fn overlay_starts_on_the_loading_screen() {
        let mut overlay = Overlay::new("PORTFOLIO");
        assert!(overlay.loading_visible);
        assert!(!overlay.header_visible);
        assert!(overlay.text.is_none());

        overlay.show_text("hi", TextAnchor::PROMPT);
        assert!(overlay.shows_at(TextAnchor::PROMPT));
        assert!(!overlay.shows_at(TextAnchor::COUNTDOWN));
        overlay.hide_text();
        assert!(overlay.text.is_none());
    }
}
