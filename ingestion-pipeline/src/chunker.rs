use common::error::AppError;

/// Windowed text splitter. Every produced chunk is at most `chunk_size`
/// characters, and consecutive chunks share exactly `chunk_overlap`
/// characters so context survives a boundary.
///
/// Cuts prefer natural boundaries inside the window, tried in decreasing
/// granularity: paragraph break, line break, sentence end, word gap, and
/// only then a hard character cut. Identical input and parameters always
/// produce the identical sequence.
#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl ChunkerConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, AppError> {
        if chunk_size == 0 {
            return Err(AppError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let mut chunks = Vec::new();
        let mut start = 0usize;

        while chars.len() - start > self.chunk_size {
            let window_end = start + self.chunk_size;
            let cut = self.cut_point(&chars, start, window_end);
            chunks.push(chars[start..cut].iter().collect());
            start = cut - self.chunk_overlap;
        }

        let tail: String = chars[start..].iter().collect();
        if !tail.trim().is_empty() {
            chunks.push(tail);
        }

        chunks
    }

    /// Picks the cut for the window `(start, window_end]`. Any admissible cut
    /// must leave the next window strictly ahead of the current one, which is
    /// what the `min_cut` lower bound enforces.
    fn cut_point(&self, chars: &[char], start: usize, window_end: usize) -> usize {
        let min_cut = start + self.chunk_overlap + 1;

        let finders: [fn(&[char], usize) -> bool; 4] = [
            is_paragraph_break,
            is_line_break,
            is_sentence_break,
            is_word_break,
        ];

        for finder in finders {
            if let Some(cut) = latest_boundary(chars, min_cut, window_end, finder) {
                return cut;
            }
        }

        window_end
    }
}

fn latest_boundary(
    chars: &[char],
    min_cut: usize,
    window_end: usize,
    is_boundary: fn(&[char], usize) -> bool,
) -> Option<usize> {
    (min_cut..=window_end)
        .rev()
        .find(|&cut| is_boundary(chars, cut))
}

fn is_paragraph_break(chars: &[char], cut: usize) -> bool {
    cut >= 2 && chars[cut - 1] == '\n' && chars[cut - 2] == '\n'
}

fn is_line_break(chars: &[char], cut: usize) -> bool {
    cut >= 1 && chars[cut - 1] == '\n'
}

fn is_sentence_break(chars: &[char], cut: usize) -> bool {
    cut >= 2 && chars[cut - 1] == ' ' && matches!(chars[cut - 2], '.' | '!' | '?')
}

fn is_word_break(chars: &[char], cut: usize) -> bool {
    cut >= 1 && chars[cut - 1].is_whitespace()
}
