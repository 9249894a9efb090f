// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Terminal rendering of styled ranges.

use crate::syntax::{
    highlight::StyledRange,
    pattern::StyleLayer,
    theme::{Rgb, Theme},
};

use crossterm::style::{Color, ContentStyle};
use std::fmt::Write;

/// Paint styled ranges over text as ANSI true-color escapes.
///
/// Foreground ranges color the text, background ranges color the cell behind
/// it. Text outside every range keeps the terminal's own colors.
pub fn paint_ansi(text: &str, ranges: &[StyledRange], theme: &Theme) -> String {
    let (mut fg, mut bg): (Vec<&StyledRange>, Vec<&StyledRange>) = ranges
        .iter()
        .filter(|range| range.len > 0 && range.end() <= text.len())
        .partition(|range| range.layer() == StyleLayer::Foreground);
    fg.sort_by_key(|range| range.start);
    bg.sort_by_key(|range| range.start);

    let mut bounds = vec![0, text.len()];
    for range in fg.iter().chain(bg.iter()) {
        bounds.push(range.start);
        bounds.push(range.end());
    }
    bounds.retain(|offset| text.is_char_boundary(*offset));
    bounds.sort_unstable();
    bounds.dedup();

    let mut out = String::with_capacity(text.len() * 2);
    for window in bounds.windows(2) {
        let (start, end) = (window[0], window[1]);
        let segment = &text[start..end];
        let foreground = covering(&fg, start).map(|range| color(theme.color(range.class)));
        let background = covering(&bg, start).map(|range| color(theme.color(range.class)));
        if foreground.is_none() && background.is_none() {
            out.push_str(segment);
            continue;
        }

        let style = ContentStyle {
            foreground_color: foreground,
            background_color: background,
            ..ContentStyle::default()
        };
        // Writing into a String cannot fail.
        let _ = write!(out, "{}", style.apply(segment));
    }

    out
}

fn covering<'r>(ranges: &[&'r StyledRange], offset: usize) -> Option<&'r StyledRange> {
    let index = ranges.partition_point(|range| range.end() <= offset);
    ranges
        .get(index)
        .copied()
        .filter(|range| range.start <= offset)
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}
