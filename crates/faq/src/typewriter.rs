use std::time::Duration;

pub const TYPE_DELAY: Duration = Duration::from_millis(100);
pub const DELETE_DELAY: Duration = Duration::from_millis(50);
pub const PAUSE_DELAY: Duration = Duration::from_millis(1000);

pub const DEFAULT_PHRASES: [&str; 3] = ["Web Developer", "UI/UX Designer", "Data Analyst"];

/// Visible text after one tick and how long to wait before the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypewriterFrame {
    pub text: String,
    pub next_delay: Duration,
}

/// Types each phrase out, pauses, deletes it, pauses, then moves to the next one.
#[derive(Debug, Clone)]
pub struct Typewriter {
    phrases: Vec<String>,
    phrase_index: usize,
    char_index: usize,
    deleting: bool,
}

impl Typewriter {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: phrases.into_iter().map(Into::into).collect(),
            phrase_index: 0,
            char_index: 0,
            deleting: false,
        }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn tick(&mut self) -> TypewriterFrame {
        let Some(phrase) = self.phrases.get(self.phrase_index) else {
            return TypewriterFrame {
                text: String::new(),
                next_delay: PAUSE_DELAY,
            };
        };

        // Index by chars so multi-byte phrases never split a code point.
        let length = phrase.chars().count();
        let text = phrase.chars().take(self.char_index).collect::<String>();

        let next_delay = if !self.deleting && self.char_index < length {
            self.char_index += 1;
            TYPE_DELAY
        } else if self.deleting && self.char_index > 0 {
            self.char_index -= 1;
            DELETE_DELAY
        } else {
            self.deleting = !self.deleting;
            if !self.deleting {
                self.phrase_index = (self.phrase_index + 1) % self.phrases.len();
            }
            PAUSE_DELAY
        };

        TypewriterFrame { text, next_delay }
    }
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new(DEFAULT_PHRASES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(typewriter: &mut Typewriter, count: usize) -> Vec<TypewriterFrame> {
        (0..count).map(|_| typewriter.tick()).collect()
    }

    #[test]
    fn types_pauses_deletes_and_advances() {
        let mut typewriter = Typewriter::new(["ab", "c"]);
        let texts_and_delays = frames(&mut typewriter, 9)
            .into_iter()
            .map(|frame| (frame.text, frame.next_delay))
            .collect::<Vec<_>>();

        assert_eq!(
            texts_and_delays,
            vec![
                (String::new(), TYPE_DELAY),
                ("a".to_string(), TYPE_DELAY),
                ("ab".to_string(), PAUSE_DELAY),
                ("ab".to_string(), DELETE_DELAY),
                ("a".to_string(), DELETE_DELAY),
                (String::new(), PAUSE_DELAY),
                (String::new(), TYPE_DELAY),
                ("c".to_string(), PAUSE_DELAY),
                ("c".to_string(), DELETE_DELAY),
            ]
        );
    }

    #[test]
    fn wraps_back_to_first_phrase() {
        let mut typewriter = Typewriter::new(["x"]);
        // type, full-pause, delete, empty-pause, then typing restarts on the same phrase
        let texts = frames(&mut typewriter, 6)
            .into_iter()
            .map(|frame| frame.text)
            .collect::<Vec<_>>();
        assert_eq!(texts, ["", "x", "x", "", "", "x"]);
    }

    #[test]
    fn empty_phrase_list_is_idle() {
        let mut typewriter = Typewriter::new(Vec::<String>::new());
        let frame = typewriter.tick();
        assert_eq!(frame.text, "");
        assert_eq!(frame.next_delay, PAUSE_DELAY);
    }

    #[test]
    fn multibyte_phrases_type_per_character() {
        let mut typewriter = Typewriter::new(["é✓"]);
        let texts = frames(&mut typewriter, 3)
            .into_iter()
            .map(|frame| frame.text)
            .collect::<Vec<_>>();
        assert_eq!(texts, ["", "é", "é✓"]);
    }
}
