//! Boundary-aware text splitting for oversized source submissions.
//!
//! The remote application rejects or truncates very large text sources, so
//! oversized captures are split into ordered parts. Cuts prefer natural
//! boundaries (paragraph break, then sentence end, then plain space) found
//! within a fixed window around the nominal cut point, and consecutive
//! chunks overlap so downstream consumers that reassemble or
//! cross-reference parts keep context across the seam.

/// Characters searched on either side of the nominal cut point.
pub const BOUNDARY_WINDOW: usize = 200;

/// One part of a split text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based position in the split sequence.
    pub index: usize,
    /// Inclusive start of this chunk's span, in chars of the original.
    pub start: usize,
    /// Exclusive end of this chunk's span, in chars of the original.
    pub end: usize,
    /// The chunk text itself.
    pub text: String,
}

/// Splits `text` into chunks of at most roughly `chunk_size` chars.
///
/// A text that fits within one chunk is returned whole. Otherwise each cut
/// lands at `start + chunk_size`, adjusted to the best boundary within
/// [`BOUNDARY_WINDOW`] chars of that point; the next chunk starts at
/// `end - overlap`, clamped to at least `start + 1` so forward progress is
/// guaranteed even when `overlap >= chunk_size`.
///
/// All offsets are char indices into the original text, so no cut can land
/// inside a UTF-8 code point.
#[must_use]
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let chunk_size = chunk_size.max(1);

    if chars.len() <= chunk_size {
        return vec![Chunk {
            index: 0,
            start: 0,
            end: chars.len(),
            text: text.to_string(),
        }];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = if chars.len() - start <= chunk_size {
            chars.len()
        } else {
            find_boundary(&chars, start, start + chunk_size)
        };
        chunks.push(Chunk {
            index: chunks.len(),
            start,
            end,
            text: chars[start..end].iter().collect(),
        });
        if end >= chars.len() {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }
    chunks
}

/// Finds the best cut position near `target`, searching
/// `target ± BOUNDARY_WINDOW` clamped to `(lo, len]`.
///
/// Priority: paragraph break, sentence end, plain space; the candidate
/// closest to `target` wins within each priority level. Falls back to the
/// raw `target` when the window holds no boundary at all.
fn find_boundary(chars: &[char], lo: usize, target: usize) -> usize {
    let window_lo = target.saturating_sub(BOUNDARY_WINDOW).max(lo + 1);
    let window_hi = (target + BOUNDARY_WINDOW).min(chars.len());

    let mut best_paragraph: Option<usize> = None;
    let mut best_sentence: Option<usize> = None;
    let mut best_space: Option<usize> = None;

    let closer = |best: Option<usize>, candidate: usize| match best {
        Some(current) if current.abs_diff(target) <= candidate.abs_diff(target) => Some(current),
        _ => Some(candidate),
    };

    for i in window_lo..window_hi {
        let c = chars[i - 1];
        // A cut at `i` means the chunk ends with chars[i - 1].
        if c == '\n' && chars.get(i) == Some(&'\n') {
            best_paragraph = closer(best_paragraph, i + 1);
        } else if matches!(c, '.' | '!' | '?')
            && chars.get(i).is_none_or(|next| next.is_whitespace())
        {
            best_sentence = closer(best_sentence, i);
        } else if c.is_whitespace() {
            best_space = closer(best_space, i);
        }
    }

    best_paragraph
        .or(best_sentence)
        .or(best_space)
        .unwrap_or(target)
        .min(chars.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Reassembles the original text from chunk spans, dropping each
    /// chunk's overlap with its predecessor.
    fn reassemble(text: &str, chunks: &[Chunk]) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::new();
        let mut covered = 0;
        for chunk in chunks {
            assert!(chunk.start <= covered, "spans must not leave gaps");
            if chunk.end > covered {
                out.extend(&chars[covered..chunk.end]);
                covered = chunk.end;
            }
        }
        out
    }

    #[test]
    fn test_short_text_returns_single_identical_chunk() {
        let text = "short text";
        let chunks = split_text(text, 100, 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks[0].end, text.chars().count());
    }

    #[test]
    fn test_exact_fit_is_single_chunk() {
        let text = "x".repeat(50);
        let chunks = split_text(&text, 50, 5);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
    }

    #[test]
    fn test_spans_reconstruct_original() {
        let text = "The first sentence here. The second one follows.\n\nA new paragraph \
                    starts now and rambles on for quite a while to force several cuts. \
                    More words keep arriving. And still more after that."
            .repeat(20);
        let chunks = split_text(&text, 300, 40);
        assert!(chunks.len() > 1);
        assert_eq!(reassemble(&text, &chunks), text);
    }

    #[test]
    fn test_chunk_length_bounded_by_window_slack() {
        let text = "word ".repeat(5000);
        for chunk in split_text(&text, 1000, 100) {
            assert!(
                chunk.text.chars().count() <= 1000 + 2 * BOUNDARY_WINDOW,
                "chunk of {} chars exceeds the slack bound",
                chunk.text.chars().count()
            );
        }
    }

    #[test]
    fn test_no_mid_word_cut_when_spaces_exist() {
        let text = "alpha beta gamma delta ".repeat(500);
        let chunks = split_text(&text, 97, 0);
        for pair in chunks.windows(2) {
            let cut = pair[0].end;
            let chars: Vec<char> = text.chars().collect();
            // The char before a cut must be whitespace: a space existed
            // within the window, so the splitter must have used one.
            assert!(
                chars[cut - 1].is_whitespace(),
                "cut at {cut} split a word: ...{:?}",
                &chars[cut.saturating_sub(6)..cut + 2].iter().collect::<String>()
            );
        }
    }

    #[test]
    fn test_prefers_paragraph_break_over_space() {
        let mut text = "a".repeat(90);
        text.push_str("\n\n");
        text.push_str(&"b ".repeat(100));
        let chunks = split_text(&text, 100, 0);
        // The nominal cut at 100 is within the window of the break at 92.
        assert_eq!(chunks[0].end, 92);
        assert!(chunks[0].text.ends_with("\n\n"));
    }

    #[test]
    fn test_overlap_carries_context() {
        let text = "word ".repeat(200);
        let chunks = split_text(&text, 300, 50);
        for pair in chunks.windows(2) {
            assert!(pair[1].start < pair[0].end, "chunks must overlap");
            assert!(pair[0].end - pair[1].start >= 1);
        }
    }

    #[test]
    fn test_forward_progress_with_overlap_exceeding_chunk_size() {
        let text = "x".repeat(100);
        let chunks = split_text(&text, 10, 50);
        // Overlap >= chunk size must still terminate and move forward.
        for pair in chunks.windows(2) {
            assert!(pair[1].start > pair[0].start);
        }
        assert_eq!(chunks.last().unwrap().end, 100);
    }

    #[test]
    fn test_unicode_text_never_panics_and_reconstructs() {
        let text = "日本語のテキスト。これは境界試験です。 ".repeat(100);
        let chunks = split_text(&text, 120, 20);
        assert!(chunks.len() > 1);
        assert_eq!(reassemble(&text, &chunks), text);
    }

    #[test]
    fn test_scenario_three_parts_at_half_million_chars() {
        let text = "sentence goes here. ".repeat(25_000); // 500,000 chars
        assert_eq!(text.chars().count(), 500_000);
        let chunks = split_text(&text, 225_000, 1_000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.last().unwrap().end, 500_000);
    }

    #[test]
    fn test_indices_are_sequential() {
        let text = "word ".repeat(1000);
        let chunks = split_text(&text, 200, 20);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }
}
