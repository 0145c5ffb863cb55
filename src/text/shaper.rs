//! Greedy character wrapping for text elements.
//!
//! Wrapping is character-granular: a character moves to the next line the
//! moment the current line plus that character exceeds the wrap width.
//! Styled runs flow through the same wrap as one stream, so a line may mix
//! segments of several styles; a line's height is the tallest resolved line
//! height among its segments. `line_clamp` truncates at the last permitted
//! line by popping characters until the ellipsis marker fits.
//!
//! Measurement goes through [`Surface2D::measure_text`] per segment, which
//! makes layout identical between the measure pass (auto text height) and
//! the draw pass.

use crate::config::model::{RunStyle, TextAlign, TextConfig, TextContent};
use crate::foundation::core::ColorDef;
use crate::foundation::error::PlacardResult;
use crate::render::backend::{Surface2D, TextStyle};

const DEFAULT_FONT_SIZE: f64 = 16.0;
const DEFAULT_LINE_HEIGHT_FACTOR: f64 = 1.2;

/// One input span with every style field resolved through the inheritance
/// chain (run style, element base style, engine defaults).
#[derive(Clone, Debug)]
struct ResolvedRun {
    text: String,
    style: TextStyle,
    line_height: f64,
}

fn resolve_style(run: &RunStyle, base: &RunStyle) -> (TextStyle, f64) {
    let font_size = run
        .font_size
        .or(base.font_size)
        .filter(|fs| fs.is_finite() && *fs > 0.0)
        .unwrap_or(DEFAULT_FONT_SIZE);
    let line_height = run
        .line_height
        .or(base.line_height)
        .map(|lh| lh.resolve(font_size))
        .filter(|lh| lh.is_finite() && *lh > 0.0)
        .unwrap_or(DEFAULT_LINE_HEIGHT_FACTOR * font_size);
    let style = TextStyle {
        font_size,
        font_family: run.font_family.clone().or_else(|| base.font_family.clone()),
        color: run.color.or(base.color).unwrap_or(ColorDef::BLACK),
    };
    (style, line_height)
}

fn resolve_runs(cfg: &TextConfig) -> Vec<ResolvedRun> {
    let empty = RunStyle::default();
    match &cfg.content {
        TextContent::Plain(text) => {
            let (style, line_height) = resolve_style(&empty, &cfg.style);
            vec![ResolvedRun {
                text: text.clone(),
                style,
                line_height,
            }]
        }
        TextContent::Runs(runs) => runs
            .iter()
            .map(|run| {
                let (style, line_height) = resolve_style(&run.style, &cfg.style);
                ResolvedRun {
                    text: run.text.clone(),
                    style,
                    line_height,
                }
            })
            .collect(),
    }
}

/// A measured slice of one run placed on a wrapped line.
#[derive(Clone, Debug)]
struct Segment {
    run: usize,
    text: String,
    width: f64,
}

/// One wrapped output line.
#[derive(Clone, Debug)]
struct ShapedLine {
    segments: Vec<Segment>,
    width: f64,
    height: f64,
}

fn line_height_of(segments: &[Segment], runs: &[ResolvedRun], fallback: f64) -> f64 {
    let mut tallest = 0.0f64;
    for seg in segments {
        if !seg.text.is_empty() {
            tallest = tallest.max(runs[seg.run].line_height);
        }
    }
    if tallest > 0.0 { tallest } else { fallback }
}

fn build_lines(
    surface: &mut dyn Surface2D,
    runs: &[ResolvedRun],
    max_width: f64,
    line_clamp: Option<u32>,
    ellipsis: &str,
) -> PlacardResult<Vec<ShapedLine>> {
    let mut lines: Vec<ShapedLine> = Vec::new();
    if max_width <= 0.0 || runs.iter().all(|r| r.text.is_empty()) {
        return Ok(lines);
    }

    let mut segments: Vec<Segment> = Vec::new();
    let mut line_width = 0.0;

    // Flattened so a newline can see whether any content follows it.
    let stream: Vec<(usize, char)> = runs
        .iter()
        .enumerate()
        .flat_map(|(ri, run)| run.text.chars().map(move |ch| (ri, ch)))
        .collect();

    for (pos, &(ri, ch)) in stream.iter().enumerate() {
        let run = &runs[ri];
        let at_clamp = line_clamp.is_some_and(|clamp| lines.len() + 1 == clamp as usize);

        if ch == '\n' {
            if at_clamp && pos + 1 < stream.len() {
                truncate_with_ellipsis(surface, runs, &mut segments, max_width, ellipsis)?;
                let width = segments.iter().map(|s| s.width).sum();
                let height = line_height_of(&segments, runs, run.line_height);
                lines.push(ShapedLine {
                    segments,
                    width,
                    height,
                });
                return Ok(lines);
            }

            let height = line_height_of(&segments, runs, run.line_height);
            lines.push(ShapedLine {
                segments: std::mem::take(&mut segments),
                width: line_width,
                height,
            });
            line_width = 0.0;
            continue;
        }

        if segments.last().map(|s| s.run) != Some(ri) {
            segments.push(Segment {
                run: ri,
                text: String::new(),
                width: 0.0,
            });
        }
        let last_idx = segments.len() - 1;

        let mut candidate = segments[last_idx].text.clone();
        candidate.push(ch);
        let candidate_width = surface.measure_text(&candidate, &run.style)?;
        let others_width = line_width - segments[last_idx].width;
        let line_empty = segments.iter().all(|s| s.text.is_empty());

        if others_width + candidate_width > max_width && !line_empty {
            if at_clamp {
                truncate_with_ellipsis(surface, runs, &mut segments, max_width, ellipsis)?;
                let width = segments.iter().map(|s| s.width).sum();
                let height = line_height_of(&segments, runs, run.line_height);
                lines.push(ShapedLine {
                    segments,
                    width,
                    height,
                });
                return Ok(lines);
            }

            let height = line_height_of(&segments, runs, run.line_height);
            lines.push(ShapedLine {
                segments: std::mem::take(&mut segments),
                width: line_width,
                height,
            });
            let width = surface.measure_text(&ch.to_string(), &run.style)?;
            segments.push(Segment {
                run: ri,
                text: ch.to_string(),
                width,
            });
            line_width = width;
        } else {
            segments[last_idx].text = candidate;
            segments[last_idx].width = candidate_width;
            line_width = others_width + candidate_width;
        }
    }

    if segments.iter().any(|s| !s.text.is_empty()) {
        let height = line_height_of(&segments, runs, 0.0);
        lines.push(ShapedLine {
            segments,
            width: line_width,
            height,
        });
    }
    Ok(lines)
}

/// Pop characters off the line tail until the ellipsis marker fits, then
/// append the marker styled like the character it replaced.
fn truncate_with_ellipsis(
    surface: &mut dyn Surface2D,
    runs: &[ResolvedRun],
    segments: &mut Vec<Segment>,
    max_width: f64,
    ellipsis: &str,
) -> PlacardResult<()> {
    segments.retain(|s| !s.text.is_empty());
    let tail_run = segments.last().map_or(0, |s| s.run);
    let ellipsis_width = surface.measure_text(ellipsis, &runs[tail_run].style)?;

    loop {
        let used: f64 = segments.iter().map(|s| s.width).sum();
        if used + ellipsis_width <= max_width || segments.is_empty() {
            break;
        }
        if let Some(last) = segments.last_mut() {
            last.text.pop();
            if last.text.is_empty() {
                segments.pop();
            } else {
                last.width = surface.measure_text(&last.text, &runs[last.run].style)?;
            }
        }
    }

    segments.push(Segment {
        run: tail_run,
        text: ellipsis.to_owned(),
        width: ellipsis_width,
    });
    Ok(())
}

/// Total wrapped height of `cfg` at `max_width`, without painting.
pub(crate) fn measure_height(
    surface: &mut dyn Surface2D,
    cfg: &TextConfig,
    max_width: f64,
) -> PlacardResult<f64> {
    let runs = resolve_runs(cfg);
    let lines = build_lines(surface, &runs, max_width, cfg.line_clamp, &cfg.ellipsis_content)?;
    Ok(lines.iter().map(|l| l.height).sum())
}

/// Wrap and paint `cfg` with the box's top-left corner at `(x, y)`.
///
/// Returns the painted height.
pub(crate) fn draw(
    surface: &mut dyn Surface2D,
    cfg: &TextConfig,
    x: f64,
    y: f64,
    max_width: f64,
) -> PlacardResult<f64> {
    let runs = resolve_runs(cfg);
    let lines = build_lines(surface, &runs, max_width, cfg.line_clamp, &cfg.ellipsis_content)?;

    let mut cursor_y = y;
    for line in &lines {
        let mut cursor_x = x + match cfg.text_align {
            TextAlign::Left => 0.0,
            TextAlign::Center => (max_width - line.width) / 2.0,
            TextAlign::Right => max_width - line.width,
        };
        for seg in &line.segments {
            if seg.text.is_empty() {
                continue;
            }
            surface.fill_text(&seg.text, cursor_x, cursor_y, &runs[seg.run].style)?;
            cursor_x += seg.width;
        }
        cursor_y += line.height;
    }
    Ok(cursor_y - y)
}

#[cfg(test)]
#[path = "../../tests/unit/text/shaper.rs"]
mod tests;
