//! Replacement templates.
//!
//! A template is a flat list of literal text and references to captured
//! parameter types/names. Rendering only needs something that can answer
//! "what did parameter N's type/name capture", so templates can be tested
//! without running a regex.

use regex::Captures;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Which half of a parameter a capture refers to.
pub enum CaptureKind {
    Type,
    Name,
}

impl CaptureKind {
    /// Regex group name for the parameter at 1-based `index`.
    pub fn group_name(self, index: usize) -> String {
        match self {
            CaptureKind::Type => format!("type{}", index),
            CaptureKind::Name => format!("name{}", index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Capture { index: usize, kind: CaptureKind },
}

/// Source of captured text for rendering.
pub trait CaptureLookup {
    fn capture(&self, index: usize, kind: CaptureKind) -> Option<&str>;
}

impl<'h> CaptureLookup for Captures<'h> {
    fn capture(&self, index: usize, kind: CaptureKind) -> Option<&str> {
        self.name(&kind.group_name(index)).map(|m| m.as_str())
    }
}

impl CaptureLookup for HashMap<(usize, CaptureKind), String> {
    fn capture(&self, index: usize, kind: CaptureKind) -> Option<&str> {
        self.get(&(index, kind)).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementTemplate {
    segments: Vec<Segment>,
}

impl ReplacementTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append literal text, merging with a preceding literal.
    pub fn push_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Literal(prev)) = self.segments.last_mut() {
            prev.push_str(text);
        } else {
            self.segments.push(Segment::Literal(text.to_string()));
        }
    }

    pub fn push_capture(&mut self, index: usize, kind: CaptureKind) {
        self.segments.push(Segment::Capture { index, kind });
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Empty templates strip the matched text.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Render against captured groups. Missing captures render as nothing.
    pub fn render<C: CaptureLookup + ?Sized>(&self, captures: &C) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Literal(text) => out.push_str(text),
                Segment::Capture { index, kind } => {
                    if let Some(text) = captures.capture(*index, *kind) {
                        out.push_str(text);
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for ReplacementTemplate {
    /// Regex-style rendering: `${type1} ${name1}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.segments {
            match seg {
                Segment::Literal(text) => f.write_str(&text.replace('$', "$$"))?,
                Segment::Capture { index, kind } => write!(f, "${{{}}}", kind.group_name(*index))?,
            }
        }
        Ok(())
    }
}
