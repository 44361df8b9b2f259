/// Decoder options
///
/// ```
/// use qoif::DecoderOptions;
///
/// // only decode images no larger than 10x10, and reject streams
/// // whose chunks disagree with the header
/// let options = DecoderOptions::default()
///     .set_max_width(10)
///     .set_max_height(10)
///     .set_strict_mode(true);
/// assert!(options.strict_mode());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Images wider than this are rejected before any allocation.
    ///
    /// - Default value: 16384
    max_width: u32,
    /// Images taller than this are rejected before any allocation.
    ///
    /// - Default value: 16384
    max_height: u32,
    /// Treat an overlong run or a misplaced end marker as an error
    /// instead of a warning.
    ///
    /// - Default value: false
    strict: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_width: 1 << 14,
            max_height: 1 << 14,
            strict: false,
        }
    }
}

impl DecoderOptions {
    pub const fn max_width(&self) -> u32 {
        self.max_width
    }

    pub const fn max_height(&self) -> u32 {
        self.max_height
    }

    pub const fn strict_mode(&self) -> bool {
        self.strict
    }

    #[must_use]
    pub const fn set_max_width(mut self, width: u32) -> Self {
        self.max_width = width;
        self
    }

    #[must_use]
    pub const fn set_max_height(mut self, height: u32) -> Self {
        self.max_height = height;
        self
    }

    #[must_use]
    pub const fn set_strict_mode(mut self, yes: bool) -> Self {
        self.strict = yes;
        self
    }
}
