//! The page-selection mini-language.
//!
//! Selectors are comma-separated tokens, each a 1-based page number or an
//! inclusive `a-b` span: `"1,3,5-7,10"`. How out-of-range and malformed
//! tokens are treated depends on the consuming operation, so parsing takes
//! an explicit [`RangeMode`].

use lazy_static::lazy_static;
use regex::Regex;

use super::{OperationError, OperationResult};

lazy_static! {
    static ref SELECTOR_CHARS: Regex = Regex::new(r"^[\d,\s-]+$").unwrap();
}

/// How a selector string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMode {
    /// Pages to keep, in selector order; out-of-range tokens are dropped
    /// and repeating a token repeats the page
    Extract,
    /// Pages to delete; the parsed result is the ascending complement,
    /// deduplicated, out-of-range tokens dropped
    Remove,
    /// Exact target layout; duplicates allowed, but every listed page
    /// must exist and every token must parse
    Organize,
}

/// Parse a selector into 1-based page numbers for the given mode.
///
/// The string must be non-empty after trimming and contain only digits,
/// commas, hyphens and whitespace; anything else is `InvalidRangeFormat`
/// before any page arithmetic happens. Spans clip their upper bound to
/// `page_count` and reversed spans expand to nothing in every mode.
pub fn parse_page_range(
    spec: &str,
    page_count: usize,
    mode: RangeMode,
) -> OperationResult<Vec<usize>> {
    let trimmed = spec.trim();
    if trimmed.is_empty() || !SELECTOR_CHARS.is_match(trimmed) {
        return Err(OperationError::InvalidRangeFormat(spec.to_string()));
    }

    let mut selected = Vec::new();
    for token in trimmed.split(',') {
        let token = token.trim();
        if token.contains('-') {
            expand_span(token, page_count, mode, spec, &mut selected)?;
        } else {
            expand_single(token, page_count, mode, spec, &mut selected)?;
        }
    }

    match mode {
        RangeMode::Extract | RangeMode::Organize => Ok(selected),
        RangeMode::Remove => {
            selected.sort_unstable();
            selected.dedup();
            Ok((1..=page_count).filter(|n| !selected.contains(n)).collect())
        }
    }
}

fn expand_span(
    token: &str,
    page_count: usize,
    mode: RangeMode,
    spec: &str,
    out: &mut Vec<usize>,
) -> OperationResult<()> {
    let bounds = match token.split_once('-') {
        Some((low, high)) if !high.contains('-') => {
            match (low.trim().parse::<usize>(), high.trim().parse::<usize>()) {
                (Ok(low), Ok(high)) => Some((low, high)),
                _ => None,
            }
        }
        _ => None,
    };

    let Some((low, high)) = bounds else {
        // "1-2-3", "-3", "3-" and such
        return match mode {
            RangeMode::Organize => Err(OperationError::InvalidRangeFormat(spec.to_string())),
            _ => Ok(()),
        };
    };

    if low > high {
        // Reversed spans select nothing
        return Ok(());
    }
    match mode {
        RangeMode::Organize => {
            if low == 0 {
                return Err(OperationError::IndexOutOfBounds(0, page_count));
            }
            if high > page_count {
                return Err(OperationError::IndexOutOfBounds(high, page_count));
            }
            out.extend(low..=high);
        }
        _ => {
            if low == 0 || low > page_count {
                return Ok(());
            }
            out.extend(low..=high.min(page_count));
        }
    }
    Ok(())
}

fn expand_single(
    token: &str,
    page_count: usize,
    mode: RangeMode,
    spec: &str,
    out: &mut Vec<usize>,
) -> OperationResult<()> {
    match token.parse::<usize>() {
        Ok(page) => match mode {
            RangeMode::Organize => {
                if page == 0 || page > page_count {
                    return Err(OperationError::IndexOutOfBounds(page, page_count));
                }
                out.push(page);
            }
            _ => {
                if page >= 1 && page <= page_count {
                    out.push(page);
                }
            }
        },
        // Empty tokens ("1,,2") and unparseable digit runs
        Err(_) => {
            if mode == RangeMode::Organize {
                return Err(OperationError::InvalidRangeFormat(spec.to_string()));
            }
        }
    }
    Ok(())
}
