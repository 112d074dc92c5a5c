//! Text segmenter: splits free-form text into display paragraphs.
//!
//! Two split signals:
//! - a period followed by whitespace and then an uppercase letter (accented
//!   capitals included); the period stays with the preceding chunk
//! - a blank line: a line break, optional spaces/tabs/`\r`, another line break
//!
//! Chunks are trimmed and empty chunks dropped. This is a lossy heuristic,
//! not a sentence splitter: "Sr. Pérez" splits after "Sr.".

use crate::document::model::{Paragraph, ParagraphStyle, RunStyle};

/// Spacing applied to segmented paragraphs, in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentSpacing {
    /// Leading space for every chunk except the first, which always gets 0.
    pub before: u16,
    /// Trailing space for every chunk.
    pub after: u16,
}

/// Splits `text` into trimmed, non-empty chunks.
pub fn segment(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '.' {
            if let Some(next) = sentence_boundary(&chars, i) {
                current.push('.');
                flush(&mut current, &mut chunks);
                i = next;
                continue;
            }
        } else if c == '\n' {
            if let Some(next) = blank_line_end(&chars, i) {
                flush(&mut current, &mut chunks);
                i = next;
                continue;
            }
        }
        current.push(c);
        i += 1;
    }
    flush(&mut current, &mut chunks);
    chunks
}

/// Segments `text` into paragraphs sharing one run style.
pub fn segment_paragraphs(text: &str, run: RunStyle, spacing: SegmentSpacing) -> Vec<Paragraph> {
    segment(text)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let before = if i == 0 { 0 } else { spacing.before };
            Paragraph::text(
                chunk,
                run,
                ParagraphStyle::default().spacing(before, spacing.after),
            )
        })
        .collect()
}

/// If the period at `dot` ends a sentence, returns the index of the
/// uppercase letter that starts the next one.
fn sentence_boundary(chars: &[char], dot: usize) -> Option<usize> {
    let mut j = dot + 1;
    while j < chars.len() && chars[j].is_whitespace() {
        j += 1;
    }
    let saw_whitespace = j > dot + 1;
    (saw_whitespace && chars.get(j).is_some_and(|c| c.is_uppercase())).then_some(j)
}

/// If the line break at `start` opens a blank line, returns the index just
/// past the whitespace run that follows it.
fn blank_line_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    while j < chars.len() && matches!(chars[j], ' ' | '\t' | '\r') {
        j += 1;
    }
    if chars.get(j) != Some(&'\n') {
        return None;
    }
    while j < chars.len() && chars[j].is_whitespace() {
        j += 1;
    }
    Some(j)
}

fn flush(current: &mut String, chunks: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_ws(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\n  \t ").is_empty());
    }

    #[test]
    fn test_splits_on_period_before_uppercase() {
        let chunks = segment("Lideré el equipo. Migré la base de datos. Reduje costes.");
        assert_eq!(
            chunks,
            vec![
                "Lideré el equipo.",
                "Migré la base de datos.",
                "Reduje costes."
            ]
        );
    }

    #[test]
    fn test_accented_uppercase_starts_a_sentence() {
        let chunks = segment("Trabajo en remoto. Área de datos.");
        assert_eq!(chunks, vec!["Trabajo en remoto.", "Área de datos."]);
    }

    #[test]
    fn test_no_split_before_lowercase_or_without_whitespace() {
        assert_eq!(segment("v1.2 released. then more"), vec!["v1.2 released. then more"]);
        assert_eq!(segment("Node.Js stack"), vec!["Node.Js stack"]);
    }

    #[test]
    fn test_splits_on_blank_line() {
        let chunks = segment("First block\nstill first\n\nSecond block");
        assert_eq!(chunks, vec!["First block\nstill first", "Second block"]);
    }

    #[test]
    fn test_blank_line_with_crlf_and_spaces() {
        let chunks = segment("one\r\n  \r\ntwo\n\n\n\nthree");
        assert_eq!(chunks, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_heuristic_splits_abbreviations() {
        assert_eq!(segment("Ref. Sr. Pérez"), vec!["Ref.", "Sr.", "Pérez"]);
    }

    #[test]
    fn test_rejoined_chunks_preserve_non_blank_content() {
        let samples = [
            "  Hola. Mundo  \n\n Otra línea.\nSigue aquí. Ñandú corre. ",
            "a.b. C\n \n\nD. e. F",
            "...   Final. ",
            "Sin puntos\n\n\n",
        ];
        for text in samples {
            let rejoined: String = segment(text).concat();
            assert_eq!(strip_ws(&rejoined), strip_ws(text), "input: {text:?}");
        }
    }

    #[test]
    fn test_segment_paragraphs_first_chunk_has_no_leading_space() {
        let spacing = SegmentSpacing {
            before: 2,
            after: 6,
        };
        let paras = segment_paragraphs("Uno. Dos. Tres.", RunStyle::body(), spacing);
        assert_eq!(paras.len(), 3);
        assert_eq!(paras[0].style.spacing_before, 0);
        assert_eq!(paras[1].style.spacing_before, 2);
        assert!(paras.iter().all(|p| p.style.spacing_after == 6));
        assert_eq!(paras[2].plain_text(), "Tres.");
    }
}
