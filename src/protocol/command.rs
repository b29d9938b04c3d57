//! Command tokenization and parameter checks.
//!
//! ```text
//! LINE := "?" | PREFIX "," NAME "," PARAM ("," PARAM)*
//! ```
//!
//! Fields are split on `,` with no quoting or escaping; empty fields,
//! including trailing ones, are kept as empty strings.

use heapless::Vec;

/// Most parameters retained per command.  Extra fields are still counted.
pub const MAX_PARAMS: usize = 8;

/// Parse result for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    /// First field equals the configured prefix.
    pub prefix_ok: bool,
    pub name: &'a str,
    pub params: Vec<&'a str, MAX_PARAMS>,
    /// Total number of fields on the line, including prefix and name.
    pub field_count: usize,
}

impl<'a> Command<'a> {
    /// Split `line` into fields.  `None` if it has fewer than two fields.
    pub fn tokenize(line: &'a str, prefix: &str) -> Option<Self> {
        let mut fields = line.split(',');
        let first = fields.next()?;
        let name = fields.next()?;

        let mut params = Vec::new();
        let mut field_count = 2;
        for p in fields {
            field_count += 1;
            // Over capacity only matters for the count, which handlers check.
            let _ = params.push(p);
        }

        Some(Self {
            prefix_ok: first == prefix,
            name,
            params,
            field_count,
        })
    }

    /// Parameter `i` as a strict integer.
    pub fn int_param(&self, i: usize) -> Option<i32> {
        self.params.get(i).and_then(|p| parse_strict_int(p))
    }
}

/// Optional leading `-`, then one or more ASCII digits, nothing else.
pub fn is_strict_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a strict integer literal.  Literals too large for `i32` are rejected.
pub fn parse_strict_int(s: &str) -> Option<i32> {
    if !is_strict_integer(s) {
        return None;
    }
    s.parse().ok()
}
