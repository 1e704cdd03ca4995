use crate::LetterError;
use std::fmt;
use std::str::FromStr;

/// A single uppercase ASCII letter identifying one crawl partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Letter(char);

impl Letter {
    /// Creates a letter, uppercasing lowercase input
    ///
    /// # Examples
    ///
    /// ```
    /// use urban_scraper::site::Letter;
    ///
    /// assert_eq!(Letter::new('o').unwrap().as_char(), 'O');
    /// assert!(Letter::new('7').is_err());
    /// ```
    pub fn new(c: char) -> Result<Self, LetterError> {
        if c.is_ascii_alphabetic() {
            Ok(Self(c.to_ascii_uppercase()))
        } else {
            Err(LetterError::NotAlphabetic(c))
        }
    }

    pub fn as_char(&self) -> char {
        self.0
    }

    /// Returns every letter from `start` to `end`, inclusive
    pub fn range(start: Letter, end: Letter) -> Result<Vec<Letter>, LetterError> {
        if start > end {
            return Err(LetterError::InvertedRange {
                start: start.0,
                end: end.0,
            });
        }

        Ok((start.0..=end.0).map(Letter).collect())
    }
}

impl FromStr for Letter {
    type Err = LetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Letter::new(c),
            _ => Err(LetterError::NotSingleChar(s.to_string())),
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
