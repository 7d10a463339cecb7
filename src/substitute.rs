//! Regex rewriting of file contents.
//!
//! Each match is rewritten in two stages. [`splice`] builds the new text for
//! the match: the whole match is replaced when the pattern has no capture
//! group, otherwise only the span of group 1 is replaced and the text around
//! it is kept. [`expand_backrefs`] then substitutes `\N` and `\g<N>` in that
//! assembled text with the match's groups (0 is the whole match).

use crate::error::{BuildError, BuildResult};
use crate::fs::{read_file, write_atomic};
use crate::glob::glob;
use crate::paths::Context;
use indexmap::IndexMap;
use log::{debug, info};
use regex::{Captures, Regex};
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

static BACKREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\g<(\d+)>|\\(\d+)").expect("backreference regex is valid"));

/// Rules applied to the files matched by one glob, in order.
pub type RuleGroup = IndexMap<String, String>;

/// Replaces `span` of `full` with `template`, or all of `full` when `span`
/// is `None`. The span is given in byte offsets relative to `full`.
pub fn splice(full: &str, span: Option<Range<usize>>, template: &str) -> String {
    match span {
        None => template.to_string(),
        Some(span) => {
            let mut out = String::with_capacity(full.len() + template.len());
            out.push_str(&full[..span.start]);
            out.push_str(template);
            out.push_str(&full[span.end..]);
            out
        }
    }
}

/// Expands `\N` and `\g<N>` tokens in `text`. `groups[0]` is the whole match.
/// Groups that did not participate expand to nothing; indices past the end
/// are left as written.
pub fn expand_backrefs(text: &str, groups: &[Option<&str>]) -> String {
    BACKREF
        .replace_all(text, |caps: &Captures| {
            let digits = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            match digits.parse::<usize>().ok().and_then(|i| groups.get(i)) {
                Some(group) => group.unwrap_or_default().to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// A substitution rule with its pattern compiled.
#[derive(Debug, Clone)]
pub struct Rule {
    regex: Regex,
    replacement: String,
}

impl Rule {
    /// # Errors
    /// * `BuildError::PatternError` if `pattern` is not a valid regex
    pub fn new(pattern: &str, replacement: &str) -> BuildResult<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| BuildError::PatternError(format!("'{}': {}", pattern, e)))?;
        Ok(Self {
            regex,
            replacement: replacement.to_string(),
        })
    }

    /// Compiles a rule whose pattern and replacement are first passed
    /// through path resolution. An empty replacement stays empty.
    pub fn resolved(ctx: &Context, pattern: &str, replacement: &str) -> BuildResult<Self> {
        let pattern = ctx.resolve_path(pattern)?;
        let replacement = if replacement.is_empty() {
            String::new()
        } else {
            ctx.resolve_path(replacement)?.to_string_lossy().into_owned()
        };
        Self::new(&pattern.to_string_lossy(), &replacement)
    }

    pub fn has_group(&self) -> bool {
        self.regex.captures_len() > 1
    }

    /// New text for one match: [`splice`] then [`expand_backrefs`].
    ///
    /// When the pattern has a group that did not take part in the match, the
    /// group is treated as empty at the start of the match, so the
    /// replacement is inserted before the matched text.
    fn rewrite(&self, caps: &Captures) -> String {
        let full = caps.get(0).map_or("", |m| m.as_str());
        let offset = caps.get(0).map_or(0, |m| m.start());
        let span = self.has_group().then(|| match caps.get(1) {
            Some(group) => (group.start() - offset)..(group.end() - offset),
            None => 0..0,
        });
        let groups: Vec<Option<&str>> = caps.iter().map(|m| m.map(|m| m.as_str())).collect();
        expand_backrefs(&splice(full, span, &self.replacement), &groups)
    }

    /// Single left-to-right pass over `content`.
    ///
    /// An empty match directly after a non-empty one is rewritten too, so
    /// `x*` over `"abxd"` matches at 0, 1, 2..3, 3 and 4. Only an empty
    /// match moves the search forward by one character.
    pub fn apply(&self, content: &str) -> String {
        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        let mut pos = 0;
        while pos <= content.len() {
            let Some(caps) = self.regex.captures_at(content, pos) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            out.push_str(&content[last..whole.start()]);
            out.push_str(&self.rewrite(&caps));
            last = whole.end();
            pos = if whole.is_empty() {
                content[last..]
                    .chars()
                    .next()
                    .map_or(content.len() + 1, |c| last + c.len_utf8())
            } else {
                last
            };
        }
        out.push_str(&content[last..]);
        out
    }
}

/// Applies `rules` in order, each consuming the previous output.
pub fn apply(content: &str, rules: &[Rule]) -> String {
    rules
        .iter()
        .fold(content.to_string(), |acc, rule| rule.apply(&acc))
}

/// Resolves and compiles every rule of a group, keeping their order.
pub fn compile_rules(ctx: &Context, group: &RuleGroup) -> BuildResult<Vec<Rule>> {
    group
        .iter()
        .map(|(pattern, replacement)| Rule::resolved(ctx, pattern, replacement))
        .collect()
}

/// Rewrites one file in place. The file is left untouched when no rule
/// changes its content.
pub fn replace_in_file<P: AsRef<Path>>(ctx: &Context, file: P, rules: &[Rule]) -> BuildResult<bool> {
    let file = file.as_ref();
    let path = ctx.absolute(file);
    info!("Updating '{}'", file.display());
    let content = read_file(&path)?;
    let updated = apply(&content, rules);
    if updated == content {
        debug!("No changes in {}", file.display());
        return Ok(false);
    }
    write_atomic(&path, &updated)?;
    Ok(true)
}

/// Runs every glob group of the `replace` section.
pub fn replace(ctx: &Context, groups: &IndexMap<String, RuleGroup>) -> BuildResult<()> {
    for (pattern, group) in groups {
        let rules = compile_rules(ctx, group)?;
        let files = glob(ctx.root(), ctx.resolve_path(pattern)?)?;
        if files.is_empty() {
            debug!("No files match {}", pattern);
        }
        for file in files {
            if ctx.is_dir(&file) {
                debug!("Skipping directory {}", file.display());
                continue;
            }
            replace_in_file(ctx, &file, &rules)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splice() {
        assert_eq!(splice("version=3", Some(8..9), "X"), "version=X");
        assert_eq!(splice("version=3", None, "X"), "X");
        assert_eq!(splice("abc", Some(0..0), "X"), "Xabc");
    }

    #[test]
    fn test_expand_backrefs() {
        let groups = [Some("a=1"), Some("1"), None];
        assert_eq!(expand_backrefs(r"\0|\1|\g<1>|\2|\3", &groups), "a=1|1|1||\\3");
        assert_eq!(expand_backrefs(r"\g<7>", &groups), r"\g<7>");
        assert_eq!(expand_backrefs("plain", &groups), "plain");
    }

    #[test]
    fn test_empty_match_after_non_empty_match() {
        let rule = Rule::new("x*", "-").unwrap();
        assert_eq!(rule.apply("abxd"), "-a-b--d-");
        assert_eq!(rule.apply(""), "-");
        assert_eq!(Rule::new("", "|").unwrap().apply("é1"), "|é|1|");
    }
}
