//! Ordered rewrite rules mapping hardcoded white color literals to theme
//! references.
//!
//! Rules are plain data (name, pattern, replacement template) compiled once
//! at startup. The built-in table targets `Colors.white` variants in Dart
//! source and rewrites them to `AppTheme.textColor` /
//! `AppTheme.lightTextColor`. Application is a pure string transformation;
//! callers decide what to do with the result.

use thiserror::Error;

use fancy_regex::Regex;

/// The built-in rule table, in application order.
///
/// Patterns use negative lookahead, so a backtracking engine is required.
/// Later rules see text already rewritten by earlier rules in the same pass.
const WHITE_TO_THEME: [(&str, &str, &str); 8] = [
    // Text colors
    (
        "plain_color_assignment",
        r"color:\s*Colors\.white\b(?!\.)(?!\))",
        "color: AppTheme.textColor",
    ),
    (
        "with_opacity_light",
        r"color:\s*Colors\.white\.withOpacity\(0\.[7-9]\d*\)",
        "color: AppTheme.lightTextColor",
    ),
    (
        "with_values_light",
        r"color:\s*Colors\.white\.withValues\(alpha:\s*0\.[7-9]\d*\)",
        "color: AppTheme.lightTextColor",
    ),
    (
        "white70_shorthand",
        r"color:\s*Colors\.white70\b",
        "color: AppTheme.lightTextColor",
    ),
    // TextStyle colors
    (
        "text_style_sole_color",
        r"TextStyle\(color:\s*Colors\.white\)",
        "TextStyle(color: AppTheme.textColor)",
    ),
    (
        "text_style_trailing_color",
        r"TextStyle\(([^)]*),\s*color:\s*Colors\.white\)",
        "TextStyle($1, color: AppTheme.textColor)",
    ),
    (
        "text_style_leading_color",
        r"TextStyle\(color:\s*Colors\.white,",
        "TextStyle(color: AppTheme.textColor,",
    ),
    // Icon colors
    (
        "icon_color",
        r"Icon\(([^,]+),\s*color:\s*Colors\.white\)",
        "Icon($1, color: AppTheme.textColor)",
    ),
];

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Invalid pattern for rule `{name}`: {source}")]
    InvalidPattern {
        name: &'static str,
        source: fancy_regex::Error,
    },

    #[error("Rule `{name}` failed while matching: {source}")]
    MatchFailed {
        name: &'static str,
        source: fancy_regex::Error,
    },
}

/// A single substitution: replace every match of `pattern` with the
/// `replacement` template.
///
/// Replacement templates may reference capture groups (`$1`); captured text
/// is substituted verbatim, whitespace included.
#[derive(Debug, Clone)]
pub struct Rule {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    /// Compile a rule. Fails on malformed pattern syntax.
    pub fn new(
        name: &'static str,
        pattern: &str,
        replacement: &'static str,
    ) -> Result<Self, RuleError> {
        let pattern =
            Regex::new(pattern).map_err(|source| RuleError::InvalidPattern { name, source })?;
        Ok(Self {
            name,
            pattern,
            replacement,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &'static str {
        self.replacement
    }

    /// Replace all non-overlapping matches in `input`.
    ///
    /// Returns `None` when the pattern does not occur, so callers can keep
    /// the previous content without another allocation.
    pub fn rewrite(&self, input: &str) -> Result<Option<String>, RuleError> {
        let mut output = String::with_capacity(input.len());
        let mut last_end = 0;
        let mut matched = false;

        for captures in self.pattern.captures_iter(input) {
            let captures = captures.map_err(|source| RuleError::MatchFailed {
                name: self.name,
                source,
            })?;
            let overall = captures.get(0).expect("capture 0 is the overall match");
            matched = true;
            output.push_str(&input[last_end..overall.start()]);
            captures.expand(self.replacement, &mut output);
            last_end = overall.end();
        }

        if !matched {
            return Ok(None);
        }
        output.push_str(&input[last_end..]);
        Ok(Some(output))
    }
}

/// Result of applying a rule set to one file's content.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Content after all rules have applied.
    pub content: String,
    /// Dirty bit: final content differs from the original.
    pub changed: bool,
}

/// An ordered list of rules applied as a single pass.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compile the built-in white-to-theme table.
    pub fn white_to_theme() -> Result<Self, RuleError> {
        let rules = WHITE_TO_THEME
            .iter()
            .map(|&(name, pattern, replacement)| Rule::new(name, pattern, replacement))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Build a set from pre-compiled rules, in the given order.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Apply every rule in order and report whether anything changed.
    ///
    /// The dirty bit compares the final content against the original, not
    /// intermediate steps, so a non-matching pass is never marked changed.
    pub fn apply(&self, content: &str) -> Result<Rewrite, RuleError> {
        let mut current = content.to_owned();
        for rule in &self.rules {
            if let Some(next) = rule.rewrite(&current)? {
                current = next;
            }
        }
        let changed = current != content;
        Ok(Rewrite {
            content: current,
            changed,
        })
    }
}
