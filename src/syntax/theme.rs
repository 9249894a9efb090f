// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Color themes for highlight classes.

use crate::syntax::pattern::HighlightClass;

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Palette mapping every highlight class to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub keyword: Rgb,
    pub string: Rgb,
    pub comment: Rgb,
    pub number: Rgb,
    pub property: Rgb,
    pub command: Rgb,
    pub variable: Rgb,
    pub punctuation: Rgb,
    pub link: Rgb,
    pub search_highlight: Rgb,
    pub normal_text: Rgb,
    pub background: Rgb,
}

impl Theme {
    pub const fn light() -> Self {
        Self {
            keyword: Rgb::new(171, 33, 140),
            string: Rgb::new(209, 26, 26),
            comment: Rgb::new(0, 115, 0),
            number: Rgb::new(43, 0, 212),
            property: Rgb::new(107, 41, 148),
            command: Rgb::new(43, 0, 212),
            variable: Rgb::new(201, 105, 0),
            punctuation: Rgb::new(128, 128, 128),
            link: Rgb::new(0, 0, 255),
            search_highlight: Rgb::new(255, 255, 178),
            normal_text: Rgb::new(0, 0, 0),
            background: Rgb::new(255, 255, 255),
        }
    }

    pub const fn dark() -> Self {
        Self {
            keyword: Rgb::new(214, 54, 128),
            string: Rgb::new(38, 173, 163),
            comment: Rgb::new(89, 110, 117),
            number: Rgb::new(133, 204, 0),
            property: Rgb::new(38, 140, 209),
            command: Rgb::new(204, 87, 0),
            variable: Rgb::new(179, 115, 0),
            punctuation: Rgb::new(128, 148, 153),
            link: Rgb::new(64, 173, 224),
            search_highlight: Rgb::new(104, 127, 32),
            normal_text: Rgb::new(204, 209, 214),
            background: Rgb::new(3, 41, 54),
        }
    }

    /// Color of highlight class.
    pub fn color(&self, class: HighlightClass) -> Rgb {
        match class {
            HighlightClass::Keyword => self.keyword,
            HighlightClass::String => self.string,
            HighlightClass::Comment => self.comment,
            HighlightClass::Number => self.number,
            HighlightClass::Property => self.property,
            HighlightClass::Command => self.command,
            HighlightClass::Variable => self.variable,
            HighlightClass::Punctuation => self.punctuation,
            HighlightClass::Link => self.link,
            HighlightClass::SearchMatch => self.search_highlight,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
