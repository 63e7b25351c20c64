/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when creating or applying a [`Span`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpanError {
    /// The span selects no characters (`start >= end`)
    #[error("span [{start}, {end}) is empty or reversed")]
    Empty { start: usize, end: usize },

    /// The span reaches past the end of the text it is applied to
    #[error("span end {end} is past the end of the text ({len} characters)")]
    OutOfBounds { end: usize, len: usize },

    /// The span covers only whitespace
    #[error("span [{start}, {end}) covers only whitespace")]
    Blank { start: usize, end: usize },
}

/// A paper identifier.
///
/// The code must contain at least one non-whitespace character. It is stored exactly as given,
/// padding included, so an exported paper carries the same code it was loaded with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaperCode(String);

impl PaperCode {
    /// Creates a `PaperCode`, rejecting empty or whitespace-only input.
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(input))
    }

    /// Returns the code exactly as it was given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaperCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PaperCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for PaperCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PaperCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PaperCode::new(s).map_err(serde::de::Error::custom)
    }
}

/// A half-open character range `[start, end)` within an event's `Text`.
///
/// Offsets count Unicode scalar values, not bytes, so a span selected over non-ASCII text
/// still lines up with what the annotator saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Creates a span, rejecting empty or reversed ranges.
    pub fn new(start: usize, end: usize) -> Result<Self, SpanError> {
        if start >= end {
            return Err(SpanError::Empty { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false; a constructed span covers at least one character.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true when the two ranges share at least one character.
    ///
    /// Ranges that merely touch (`[10, 20)` and `[20, 30)`) do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns the substring of `text` covered by this span.
    pub fn slice<'a>(&self, text: &'a str) -> Result<&'a str, SpanError> {
        let len = text.chars().count();
        if self.end > len {
            return Err(SpanError::OutOfBounds { end: self.end, len });
        }

        let byte_offset = |char_idx: usize| {
            text.char_indices()
                .nth(char_idx)
                .map(|(offset, _)| offset)
                .unwrap_or(text.len())
        };

        Ok(&text[byte_offset(self.start)..byte_offset(self.end)])
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
