//! # Character Tokenizer
//!
//! Converts display names into the space-delimited character encoding the
//! classifier consumes, and back. Spaces inside a name are first mapped to
//! U+2581 (`▁`, lower one eighth block) so that the ASCII space can serve as
//! the token delimiter without ambiguity.

/// Placeholder substituted for literal spaces before character splitting.
///
/// U+2581 cannot appear in real person names, which is what makes
/// [`convert`] / [`restore`] a round trip.
pub const PLACEHOLDER: char = '\u{2581}';

/// Encode a display name as a whitespace-delimited character sequence.
///
/// Every literal space becomes [`PLACEHOLDER`], then every remaining
/// character (placeholder included) is joined with a single ASCII space.
/// Pure and total: no input string is rejected.
///
/// Inputs that already contain U+2581 are outside the round-trip contract;
/// they are encoded as-is and [`restore`] will map the placeholder back to a
/// space.
///
/// # Examples
/// ```
/// use kokuseki_core::tokenizer::convert;
///
/// assert_eq!(convert("Kim Jong-un"), "K i m ▁ J o n g - u n");
/// ```
pub fn convert(name: &str) -> String {
    let substituted = name.replace(' ', &PLACEHOLDER.to_string());
    let mut out = String::with_capacity(substituted.len() * 2);
    for (i, c) in substituted.chars().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Recover a display name from a token sequence or model output string.
///
/// Exact left inverse of [`convert`] for any name that contains no
/// [`PLACEHOLDER`] character: every ASCII space is removed, then every
/// placeholder becomes a literal space.
pub fn restore(text: &str) -> String {
    text.chars()
        .filter(|c| *c != ' ')
        .map(|c| if c == PLACEHOLDER { ' ' } else { c })
        .collect()
}
