//! Auto-fit text layout.
//!
//! Finds the largest integer font size at which word-wrapped text fits a box
//! by binary search over a measuring oracle, then places the words centered
//! and justified inside the box.

use std::sync::Arc;

use crate::geometry::{BoundingBox, Canvas, Point};
use crate::measure::{FontSpec, FontWeight, TextMeasurer};
use crate::surface::{Surface, Tone};

/// First size tried by the fit search.
pub const SEED_FONT_SIZE: u32 = 5;

/// Family, weight and spacing shared by every size the search tries.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub family: Arc<str>,
    pub weight: FontWeight,
    /// Line advance as a multiple of the font size
    pub line_height: f64,
    /// Optional ceiling; sizes above it count as not fitting
    pub max_font_px: Option<u32>,
}

impl TextStyle {
    pub fn font(&self, size: u32) -> FontSpec {
        FontSpec::new(self.family.clone(), self.weight, size)
    }
}

/// Greedy line breaking at one font size.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout<'a> {
    pub all_fit: bool,
    pub lines: Vec<Vec<&'a str>>,
}

/// Break `text` into lines at `font.size`.
///
/// Explicit newlines always break; words are separated by whitespace. A line
/// fits when its width plus the width of `"i"` is strictly under the box
/// width. Layout stops at the first word that cannot fit alone or when no
/// vertical room is left for another line, returning the partial result with
/// `all_fit = false`.
pub fn calculate_layout<'a>(
    measurer: &mut TextMeasurer,
    font: &FontSpec,
    text: &'a str,
    bounds: &BoundingBox<Canvas>,
    line_height: f64,
) -> LineLayout<'a> {
    let min_space = measurer.width("i", font);
    let advance = font.size as f64 * line_height;
    let has_room = |committed: usize| (committed as f64 + 1.0) * advance < bounds.height;
    let fits_width = |measurer: &mut TextMeasurer, words: &[&str]| {
        measurer.joined_width(words, " ", font) + min_space < bounds.width
    };

    let mut lines: Vec<Vec<&'a str>> = Vec::new();

    for text_line in text.split('\n') {
        let mut line: Vec<&'a str> = Vec::new();

        for word in text_line.split_whitespace() {
            line.push(word);
            if fits_width(measurer, &line) {
                continue;
            }
            line.pop();

            if line.is_empty() || !fits_width(measurer, &[word]) || !has_room(lines.len()) {
                return LineLayout { all_fit: false, lines };
            }
            lines.push(std::mem::take(&mut line));
            line.push(word);
        }

        if !has_room(lines.len()) {
            return LineLayout { all_fit: false, lines };
        }
        lines.push(line);
    }

    LineLayout { all_fit: true, lines }
}

/// Largest size at which `text` fits `bounds`, up to `style.max_font_px`
/// when one is set.
///
/// Doubles from the seed until a size fails, halves until one fits, then
/// bisects the bracket. Returns `None` when even size 1 does not fit.
pub fn fit_font_size(
    measurer: &mut TextMeasurer,
    style: &TextStyle,
    text: &str,
    bounds: &BoundingBox<Canvas>,
) -> Option<u32> {
    let max_size = style.max_font_px.map_or(u32::MAX, |max| max.max(1));
    let mut lower: Option<u32> = None;
    let mut upper: Option<u32> = None;
    let mut size = SEED_FONT_SIZE.min(max_size);

    loop {
        let fits = size <= max_size
            && calculate_layout(measurer, &style.font(size), text, bounds, style.line_height).all_fit;

        let next = if fits {
            lower = Some(size);
            match upper {
                Some(upper) => (upper + size) / 2,
                None => size.saturating_mul(2),
            }
        } else {
            upper = Some(size);
            match lower {
                Some(lower) => (lower + size) / 2,
                None => size / 2,
            }
        };

        if next == size || next == 0 || Some(next) == lower {
            break;
        }
        size = next;
    }

    lower
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord<'a> {
    pub text: &'a str,
    /// Top-left corner of the word
    pub at: Point<Canvas>,
}

/// Words positioned inside a box.
#[derive(Debug, Clone)]
pub struct TextBlock<'a> {
    pub font: FontSpec,
    pub words: Vec<PlacedWord<'a>>,
    /// Extent of the whole block: widest line by all lines
    pub extent: BoundingBox<Canvas>,
}

/// Place `lines` centered in `bounds`, each multi-word line justified to
/// the width of the widest line.
///
/// Gaps between words are capped at twice the width of `"O"`.
pub fn arrange<'a>(
    measurer: &mut TextMeasurer,
    font: &FontSpec,
    lines: &[Vec<&'a str>],
    bounds: &BoundingBox<Canvas>,
    line_height: f64,
) -> TextBlock<'a> {
    let advance = font.size as f64 * line_height;
    let block_height = lines.len() as f64 * advance;
    let widest = lines
        .iter()
        .map(|line| measurer.joined_width(line, " ", font))
        .fold(0.0, f64::max);
    let top = bounds.top + (bounds.height - block_height) / 2.0;
    let left = bounds.left + (bounds.width - widest) / 2.0;
    let max_gap = measurer.width("O", font) * 2.0;

    let mut words = Vec::with_capacity(lines.iter().map(Vec::len).sum());
    for (line_idx, line) in lines.iter().enumerate() {
        let y = top + line_idx as f64 * advance;
        let text_width: f64 = line.iter().map(|word| measurer.width(word, font)).sum();
        let gap = if line.len() > 1 {
            ((widest - text_width) / (line.len() - 1) as f64).min(max_gap)
        } else {
            0.0
        };

        let mut x = left;
        for word in line {
            words.push(PlacedWord {
                text: word,
                at: Point::new(x, y),
            });
            x += measurer.width(word, font) + gap;
        }
    }

    TextBlock {
        font: font.clone(),
        words,
        extent: BoundingBox::new(top, left, widest, block_height),
    }
}

/// Fit, arrange and draw `text` into `bounds`. Returns the fitted size.
///
/// When nothing fits the partial layout at size 1 is drawn anyway.
pub fn fit_text(
    surface: &mut dyn Surface,
    measurer: &mut TextMeasurer,
    style: &TextStyle,
    text: &str,
    bounds: &BoundingBox<Canvas>,
    tone: Tone,
) -> Option<u32> {
    let fitted = fit_font_size(measurer, style, text, bounds);
    let font = style.font(fitted.unwrap_or(1));
    let layout = calculate_layout(measurer, &font, text, bounds, style.line_height);
    let block = arrange(measurer, &font, &layout.lines, bounds, style.line_height);

    for word in &block.words {
        surface.fill_text(word.text, word.at, &block.font, tone);
    }

    fitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::measure::GlyphMetrics;
    use crate::surface::{DrawCommand, Scene};

    fn style() -> TextStyle {
        TextStyle {
            family: Arc::from("Monaco"),
            weight: FontWeight::Normal,
            line_height: 1.2,
            max_font_px: None,
        }
    }

    fn capped(max_font_px: u32) -> TextStyle {
        TextStyle {
            max_font_px: Some(max_font_px),
            ..style()
        }
    }

    /// Narrow and wide glyphs so widths are not a multiple of the char count.
    struct UnevenMetrics;

    impl GlyphMetrics for UnevenMetrics {
        fn advance(&self, ch: char, font: &FontSpec) -> f64 {
            let ratio = match ch {
                'i' | 'l' | '.' => 0.3,
                'm' | 'w' | 'M' | 'W' => 0.9,
                ' ' => 0.35,
                _ => 0.55,
            };
            font.size as f64 * ratio
        }
    }

    fn layout_lines<'a>(text: &'a str, size: u32, bounds: BoundingBox<Canvas>) -> LineLayout<'a> {
        let mut measurer = TextMeasurer::default();
        calculate_layout(&mut measurer, &style().font(size), text, &bounds, 1.2)
    }

    #[test]
    fn test_greedy_wrap() {
        // 6px per glyph at size 10
        let layout = layout_lines("aaa bbb ccc", 10, BoundingBox::from_size(50.0, 100.0));

        assert!(layout.all_fit);
        assert_eq!(layout.lines, vec![vec!["aaa", "bbb"], vec!["ccc"]]);
    }

    #[test]
    fn test_word_wider_than_box_fails() {
        let layout = layout_lines("ok enormousword", 10, BoundingBox::from_size(50.0, 100.0));

        assert!(!layout.all_fit);
        assert!(layout.lines.is_empty());
    }

    #[test]
    fn test_vertical_budget_exhausted() {
        // Each line needs 12px; a 30px box holds two.
        let layout = layout_lines("aaa\nbbb\nccc", 10, BoundingBox::from_size(100.0, 30.0));

        assert!(!layout.all_fit);
        assert_eq!(layout.lines.len(), 2);
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let layout = layout_lines("a\n\nb", 10, BoundingBox::from_size(100.0, 100.0));

        assert!(layout.all_fit);
        assert_eq!(layout.lines, vec![vec!["a"], vec![], vec!["b"]]);
    }

    #[test]
    fn test_fit_is_boundary_exact() {
        let texts = [
            "hello world",
            "fn main() {\n    println!(\"hi\");\n}\n",
            "a",
            "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor",
            "wide MMMM words WWWW mixed with ill-fitting little i's",
        ];
        let boxes = [
            BoundingBox::<Canvas>::new(0.0, 0.0, 1000.0, 1000.0),
            BoundingBox::new(10.0, 10.0, 120.0, 40.0),
            BoundingBox::new(0.0, 0.0, 333.0, 77.0),
            BoundingBox::new(-5.0, 3.0, 64.0, 480.0),
        ];
        let style = RenderConfig::default().label_style();
        assert_eq!(style.max_font_px, None);

        for metrics in 0..2 {
            let mut measurer = if metrics == 0 {
                TextMeasurer::default()
            } else {
                TextMeasurer::new(Box::new(UnevenMetrics))
            };

            for text in texts {
                for bounds in boxes {
                    let Some(size) = fit_font_size(&mut measurer, &style, text, &bounds) else {
                        let at_one = calculate_layout(&mut measurer, &style.font(1), text, &bounds, 1.2);
                        assert!(!at_one.all_fit, "size 1 fits {:?} in {:?}", text, bounds);
                        continue;
                    };
                    let at = calculate_layout(&mut measurer, &style.font(size), text, &bounds, 1.2);
                    let above = calculate_layout(&mut measurer, &style.font(size + 1), text, &bounds, 1.2);
                    assert!(at.all_fit, "{:?} should fit at {}", text, size);
                    assert!(!above.all_fit, "{:?} should not fit at {}", text, size + 1);
                }
            }
        }
    }

    #[test]
    fn test_hello_world_fit_size() {
        let mut measurer = TextMeasurer::default();
        let bounds = BoundingBox::<Canvas>::from_size(1000.0, 1000.0);

        // Two lines of five 0.6em glyphs plus "i": 3.6 * size < 1000
        assert_eq!(fit_font_size(&mut measurer, &style(), "hello world", &bounds), Some(277));
        assert_eq!(fit_font_size(&mut measurer, &capped(256), "hello world", &bounds), Some(256));

        let defaults = RenderConfig::default().label_style();
        assert_eq!(fit_font_size(&mut measurer, &defaults, "hello world", &bounds), Some(277));
        let above = calculate_layout(&mut measurer, &defaults.font(278), "hello world", &bounds, 1.2);
        assert!(!above.all_fit);
    }

    #[test]
    fn test_no_fit_terminates() {
        let mut measurer = TextMeasurer::default();

        let tiny = BoundingBox::<Canvas>::from_size(1.0, 1.0);
        assert_eq!(fit_font_size(&mut measurer, &style(), "hello", &tiny), None);

        let flat = BoundingBox::<Canvas>::from_size(500.0, 0.0);
        assert_eq!(fit_font_size(&mut measurer, &style(), "", &flat), None);

        let degenerate = BoundingBox::<Canvas>::from_size(f64::INFINITY, f64::INFINITY);
        assert_eq!(fit_font_size(&mut measurer, &capped(64), "x", &degenerate), Some(64));
    }

    #[test]
    fn test_hello_world_is_centered() {
        let mut measurer = TextMeasurer::default();
        let mut scene = Scene::default();
        let bounds = BoundingBox::<Canvas>::from_size(1000.0, 1000.0);
        let style = style();

        let size = fit_text(&mut scene, &mut measurer, &style, "hello world", &bounds, Tone::Label).unwrap();
        assert!(size > 0);

        let font = style.font(size);
        let layout = calculate_layout(&mut measurer, &font, "hello world", &bounds, style.line_height);
        let block = arrange(&mut measurer, &font, &layout.lines, &bounds, style.line_height);
        let extent = block.extent;

        let left_margin = extent.left - bounds.left;
        let right_margin = bounds.right() - extent.right();
        let top_margin = extent.top - bounds.top;
        let bottom_margin = bounds.bottom() - extent.bottom();
        assert!((left_margin - right_margin).abs() < 1e-6);
        assert!((top_margin - bottom_margin).abs() < 1e-6);
        assert!(left_margin >= 0.0 && top_margin >= 0.0);

        let drawn: Vec<&str> = scene
            .commands()
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(drawn, vec!["hello", "world"]);
    }

    #[test]
    fn test_justified_lines_span_block_width() {
        let mut measurer = TextMeasurer::default();
        let font = style().font(10);
        let lines = vec![vec!["aaaa", "bbbb", "cc"], vec!["dd", "ee"]];
        let bounds = BoundingBox::<Canvas>::from_size(200.0, 100.0);
        let block = arrange(&mut measurer, &font, &lines, &bounds, 1.2);

        // Widest line is 12 glyphs at 6px
        assert!((block.extent.width - 72.0).abs() < 1e-9);

        let second_line: Vec<&PlacedWord> = block.words.iter().skip(3).collect();
        let last = second_line[1];
        let end = last.at.x + measurer.width(last.text, &font);
        // Gap capped at two "O"s (12px) instead of the 48px of slack
        assert!((end - (block.extent.left + 12.0 + 12.0 + 12.0)).abs() < 1e-9);
        assert!(end <= block.extent.right() + 1e-9);

        let first_end = block.words[2].at.x + measurer.width("cc", &font);
        assert!((first_end - block.extent.right()).abs() < 1e-9);
    }

    #[test]
    fn test_best_effort_draw_when_nothing_fits() {
        let mut measurer = TextMeasurer::default();
        let mut scene = Scene::default();
        // Room for one 1.2px line at size 1, not three
        let bounds = BoundingBox::<Canvas>::from_size(100.0, 2.0);

        let fitted = fit_text(&mut scene, &mut measurer, &style(), "a\nb\nc", &bounds, Tone::Label);
        assert_eq!(fitted, None);
        assert_eq!(scene.commands().len(), 1);
    }
}
