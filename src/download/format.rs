//! Resolution → yt-dlp format selection expression.

use std::fmt;

use crate::download::intent::Resolution;

/// Opaque format string handed to the extraction engine (`yt-dlp -f`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionExpression(String);

impl SelectionExpression {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the selection expression for a target resolution.
///
/// Alternatives are tried left to right by yt-dlp:
/// 1. best video stream with height ≤ target merged with the best audio stream
/// 2. best single (pre-merged) stream with height ≤ target
/// 3. best stream overall
///
/// Pure and deterministic: no randomness, no I/O.
///
/// # Example
/// ```
/// use mediarelay::download::format::select;
/// use mediarelay::download::intent::Resolution;
///
/// assert_eq!(
///     select(Resolution::P720).as_str(),
///     "bestvideo[height<=720]+bestaudio/best[height<=720]/best"
/// );
/// ```
pub fn select(target: Resolution) -> SelectionExpression {
    let h = target.height();
    SelectionExpression(format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]/best"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn test_deterministic_for_every_resolution() {
        for resolution in Resolution::iter() {
            assert_eq!(select(resolution), select(resolution));
        }
    }

    #[test]
    fn test_distinct_per_resolution() {
        let expressions: std::collections::HashSet<_> = Resolution::iter().map(select).collect();
        assert_eq!(expressions.len(), Resolution::iter().count());
    }

    #[test]
    fn test_two_tier_preference() {
        let expr = select(Resolution::P144).to_string();
        let tiers: Vec<&str> = expr.split('/').collect();
        assert_eq!(tiers, vec!["bestvideo[height<=144]+bestaudio", "best[height<=144]", "best"]);
    }

    #[test]
    fn test_default_resolution_expression() {
        assert_eq!(
            select(Resolution::default()).as_str(),
            "bestvideo[height<=360]+bestaudio/best[height<=360]/best"
        );
    }
}
