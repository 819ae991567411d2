//! Grouping of positioned text runs into lines and blocks.
//!
//! Content streams show text in small runs. Runs sharing a baseline and
//! separated by less than a word gap form a line; consecutive lines with
//! tight leading, similar size and horizontal overlap form a block.

use crate::geometry::Rect;
use crate::page::RawTextBlock;

/// Runs further apart than this many font sizes start a new line.
const MAX_RUN_GAP: f32 = 1.5;
/// Gaps wider than this fraction of the font size get a space.
const SPACE_GAP: f32 = 0.15;
/// Leading beyond this fraction of the font size starts a new block.
const MAX_LINE_GAP: f32 = 0.6;
/// Lines whose font sizes differ by more than this ratio are split.
const MAX_SIZE_RATIO: f32 = 1.2;

/// A run of text in page space (y down).
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub text: String,
    pub rect: Rect,
    pub font_size: f32,
}

#[derive(Debug)]
struct Line {
    rect: Rect,
    text: String,
    font_size: f32,
}

impl Line {
    fn from_chunk(chunk: &TextChunk) -> Self {
        Self {
            rect: chunk.rect,
            text: chunk.text.trim_start().to_owned(),
            font_size: chunk.font_size,
        }
    }

    fn accepts(&self, chunk: &TextChunk) -> bool {
        let size = self.font_size.max(chunk.font_size);
        let min_height = self.rect.height().min(chunk.rect.height());
        let gap = chunk.rect.x0 - self.rect.x1;
        self.rect.vertical_overlap(&chunk.rect) >= 0.5 * min_height
            && gap >= -0.5 * size
            && gap <= MAX_RUN_GAP * size
    }

    fn push(&mut self, chunk: &TextChunk) {
        let gap = chunk.rect.x0 - self.rect.x1;
        let needs_space = gap > SPACE_GAP * self.font_size.max(chunk.font_size)
            && !self.text.ends_with(char::is_whitespace)
            && !chunk.text.starts_with(char::is_whitespace);
        if needs_space {
            self.text.push(' ');
        }
        self.text.push_str(&chunk.text);
        self.rect.include(&chunk.rect);
        self.font_size = self.font_size.max(chunk.font_size);
    }
}

#[derive(Debug)]
struct Block {
    rect: Rect,
    lines: Vec<Line>,
}

impl Block {
    fn accepts(&self, line: &Line) -> bool {
        let Some(last) = self.lines.last() else {
            return false;
        };
        let size = last.font_size.max(line.font_size);
        let ratio = size / last.font_size.min(line.font_size).max(f32::EPSILON);
        let gap = line.rect.y0 - last.rect.y1;
        gap >= -0.5 * size
            && gap <= MAX_LINE_GAP * size
            && ratio <= MAX_SIZE_RATIO
            && line.rect.overlaps_horizontally(&self.rect)
    }

    fn into_raw(self) -> RawTextBlock {
        let text = self
            .lines
            .iter()
            .map(|line| line.text.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
        RawTextBlock::text(self.rect, text)
    }
}

fn group_lines(chunks: &[TextChunk]) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();
    for chunk in chunks {
        if chunk.text.trim().is_empty() {
            if let Some(line) = lines.last_mut() {
                if !line.text.ends_with(' ') {
                    line.text.push(' ');
                }
            }
            continue;
        }
        match lines.last_mut() {
            Some(line) if line.accepts(chunk) => line.push(chunk),
            _ => lines.push(Line::from_chunk(chunk)),
        }
    }
    lines
}

/// Group runs (in content order) into text blocks (in page order).
pub fn group_blocks(chunks: &[TextChunk]) -> Vec<RawTextBlock> {
    let mut blocks: Vec<Block> = Vec::new();
    for line in group_lines(chunks) {
        match blocks.last_mut() {
            Some(block) if block.accepts(&line) => {
                block.rect.include(&line.rect);
                block.lines.push(line);
            }
            _ => blocks.push(Block {
                rect: line.rect,
                lines: vec![line],
            }),
        }
    }
    blocks.into_iter().map(Block::into_raw).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, x0: f32, baseline: f32, size: f32) -> TextChunk {
        let width = text.chars().count() as f32 * size * 0.5;
        TextChunk {
            text: text.into(),
            rect: Rect::new(x0, baseline - 0.8 * size, x0 + width, baseline + 0.2 * size),
            font_size: size,
        }
    }

    #[test]
    fn runs_on_one_baseline_form_a_line() {
        let chunks = [
            chunk("Figure", 50.0, 100.0, 10.0),
            chunk("1:", 83.0, 100.0, 10.0),
            chunk("Overview", 96.0, 100.0, 10.0),
        ];
        let blocks = group_blocks(&chunks);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Figure 1: Overview");
    }

    #[test]
    fn adjacent_runs_are_not_spaced() {
        let chunks = [chunk("Fig", 50.0, 100.0, 10.0), chunk("ure", 65.0, 100.0, 10.0)];
        assert_eq!(group_blocks(&chunks)[0].text, "Figure");
    }

    #[test]
    fn tight_lines_form_a_block() {
        let chunks = [
            chunk("first line of text", 50.0, 100.0, 10.0),
            chunk("second line", 50.0, 112.0, 10.0),
        ];
        let blocks = group_blocks(&chunks);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "first line of text\nsecond line");
        assert_eq!(blocks[0].rect.y0, 92.0);
        assert_eq!(blocks[0].rect.y1, 114.0);
    }

    #[test]
    fn paragraph_gap_splits_blocks() {
        let chunks = [
            chunk("end of paragraph", 50.0, 100.0, 10.0),
            chunk("Figure 2: next", 50.0, 140.0, 10.0),
        ];
        let blocks = group_blocks(&chunks);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].text, "Figure 2: next");
    }

    #[test]
    fn columns_stay_apart() {
        let chunks = [
            chunk("left column", 50.0, 100.0, 10.0),
            chunk("right column", 320.0, 100.0, 10.0),
        ];
        assert_eq!(group_blocks(&chunks).len(), 2);
    }

    #[test]
    fn size_change_splits_blocks() {
        let chunks = [
            chunk("Section heading", 50.0, 100.0, 16.0),
            chunk("body text", 50.0, 110.0, 9.0),
        ];
        assert_eq!(group_blocks(&chunks).len(), 2);
    }

    #[test]
    fn whitespace_runs_become_single_spaces() {
        let chunks = [
            chunk("a", 50.0, 100.0, 10.0),
            chunk(" ", 55.0, 100.0, 10.0),
            chunk("b", 56.0, 100.0, 10.0),
        ];
        assert_eq!(group_blocks(&chunks)[0].text, "a b");
    }
}
