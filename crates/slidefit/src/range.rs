//! Page selection expressions
//!
//! An expression such as `2,5-7,9-12` names 1-based pages. Parsing turns it
//! into 0-based indices, kept in the order written.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::types::{Result, SlideFitError};

/// One comma-separated part of a page selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageToken {
    /// A single 1-based page
    Single(usize),
    /// An inclusive range of 1-based pages
    Range(usize, usize),
}

impl PageToken {
    /// 0-based indices covered by this token
    pub fn indices(self) -> RangeInclusive<usize> {
        match self {
            PageToken::Single(page) => page - 1..=page - 1,
            PageToken::Range(first, last) => first - 1..=last - 1,
        }
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageToken::Single(page) => write!(f, "{}", page),
            PageToken::Range(first, last) => write!(f, "{}-{}", first, last),
        }
    }
}

/// A parsed page selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    tokens: Vec<PageToken>,
}

impl PageSelection {
    /// Parse a selection expression.
    ///
    /// Inverted ranges (`7-5`) and page `0` are rejected.
    pub fn parse(expr: &str) -> Result<Self> {
        let tokens = expr
            .split(',')
            .map(|token| parse_token(expr, token.trim()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[PageToken] {
        &self.tokens
    }

    /// 0-based indices in token order, duplicates included
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.tokens.iter().flat_map(|token| token.indices())
    }

    /// 0-based indices sorted ascending with duplicates removed.
    ///
    /// Overlapping and adjacent tokens are merged first, so a range is never
    /// materialized and callers can stop early.
    pub fn sorted_indices(&self) -> impl Iterator<Item = usize> {
        self.merged_ranges().into_iter().flatten()
    }

    fn merged_ranges(&self) -> Vec<RangeInclusive<usize>> {
        let mut ranges: Vec<RangeInclusive<usize>> =
            self.tokens.iter().map(|token| token.indices()).collect();
        ranges.sort_unstable_by_key(|range| *range.start());

        let mut merged: Vec<RangeInclusive<usize>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if *range.start() <= last.end().saturating_add(1) => {
                    if range.end() > last.end() {
                        *last = *last.start()..=*range.end();
                    }
                }
                _ => merged.push(range),
            }
        }
        merged
    }
}

impl FromStr for PageSelection {
    type Err = SlideFitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

fn parse_token(expr: &str, token: &str) -> Result<PageToken> {
    let error = |reason: String| SlideFitError::Parse {
        expr: expr.to_string(),
        reason,
    };

    if token.is_empty() {
        return Err(error("empty page number".to_string()));
    }

    match token.split_once('-') {
        None => Ok(PageToken::Single(parse_page(token).map_err(error)?)),
        Some((first, last)) => {
            let first = parse_page(first.trim()).map_err(error)?;
            let last = parse_page(last.trim()).map_err(error)?;
            if last < first {
                return Err(error(format!("range {}-{} runs backwards", first, last)));
            }
            Ok(PageToken::Range(first, last))
        }
    }
}

fn parse_page(text: &str) -> std::result::Result<usize, String> {
    let page: usize = text
        .parse()
        .map_err(|_| format!("\"{}\" is not a page number", text))?;
    if page == 0 {
        return Err("pages are numbered from 1".to_string());
    }
    Ok(page)
}
