//! The default purge engine.
//!
//! A selector survives when the safelist protects it or when every class,
//! id, type and attribute it names occurs in the content files. Unused
//! selectors are cut from their rule; rules left without selectors are
//! dropped, then grouping at-rules left without rules.
//!
//! ## Module Structure
//!
//! - `matcher`: splits a selector into the parts that must be used

pub mod matcher;

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{Context, Result};
use glob::glob;
use regex::Regex;

use crate::core::{
    css::{self, AtBlock, Node, StyleRule},
    extract::Extractor,
    purge::{PurgeEngine, PurgeRequest, PurgeResult},
    safelist::{Safelist, SafelistEntry},
};
use matcher::{SelectorPart, selector_parts};

type TokenSet = Arc<HashSet<String>>;

/// Purges rules whose selectors never appear in the content files.
///
/// Content tokens are read once per distinct glob list and shared by every
/// asset of the pass.
pub struct RuleEngine {
    extractor: Arc<dyn Extractor>,
    content_cache: Mutex<HashMap<Vec<String>, TokenSet>>,
}

impl RuleEngine {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self {
            extractor,
            content_cache: Mutex::new(HashMap::new()),
        }
    }

    fn content_tokens(&self, globs: &[String]) -> Result<TokenSet> {
        let mut cache = self
            .content_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(tokens) = cache.get(globs) {
            return Ok(Arc::clone(tokens));
        }

        let tokens = Arc::new(read_content_tokens(globs, self.extractor.as_ref())?);
        cache.insert(globs.to_vec(), Arc::clone(&tokens));
        Ok(tokens)
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine").finish_non_exhaustive()
    }
}

impl PurgeEngine for RuleEngine {
    fn purge(&self, request: &PurgeRequest<'_>) -> Result<Option<PurgeResult>> {
        let used = self.content_tokens(request.content)?;
        let retention = Retention::new(&used, request.safelist);

        let mut sweep = Sweep {
            retention,
            record_selectors: request.rejected,
            record_css: request.rejected_css,
            removed: 0,
            rejected: Vec::new(),
            rejected_css: String::new(),
        };

        let mut nodes = sweep.rules(css::parse_stylesheet(request.css));

        if request.options.keyframes {
            let animations = referenced_animations(&nodes);
            nodes = sweep.at_blocks(nodes, &|block: &AtBlock| {
                if block.base_name() != "keyframes" {
                    return true;
                }
                let name = block.prelude.trim();
                animations.contains(name) || request.safelist.is_keyframes(name)
            });
        }

        if request.options.font_face {
            let fonts = referenced_fonts(&nodes);
            nodes = sweep.at_blocks(nodes, &|block: &AtBlock| {
                if block.base_name() != "font-face" {
                    return true;
                }
                font_family(block).is_none_or(|family| fonts.iter().any(|f| f.contains(&family)))
            });
        }

        if sweep.removed == 0 {
            return Ok(None);
        }

        Ok(Some(PurgeResult {
            css: css::serialize(&nodes),
            rejected: sweep.rejected,
            rejected_css: sweep.rejected_css,
        }))
    }
}

/// Tokens of every file matched by `globs`. Unreadable files are skipped.
fn read_content_tokens(globs: &[String], extractor: &dyn Extractor) -> Result<HashSet<String>> {
    let mut tokens = HashSet::new();
    for pattern in globs {
        let entries =
            glob(pattern).with_context(|| format!("Invalid content glob: \"{}\"", pattern))?;
        for path in entries.flatten() {
            if !path.is_file() || is_dependency(&path) {
                continue;
            }
            let Ok(text) = fs::read_to_string(&path) else {
                continue;
            };
            tokens.extend(extractor.extract(&text));
        }
    }
    Ok(tokens)
}

fn is_dependency(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == "node_modules" || c.as_os_str() == ".git")
}

/// Safelist entries split for lookup: exact values hashed, patterns scanned.
struct EntryIndex<'a> {
    exact: HashSet<&'a str>,
    patterns: Vec<&'a Regex>,
}

impl<'a> EntryIndex<'a> {
    fn new(entries: &'a [SafelistEntry]) -> Self {
        let mut exact = HashSet::new();
        let mut patterns = Vec::new();
        for entry in entries {
            match entry {
                SafelistEntry::Exact(value) => {
                    exact.insert(value.as_str());
                }
                SafelistEntry::Pattern(regex) => patterns.push(regex),
            }
        }
        Self { exact, patterns }
    }

    fn matches(&self, value: &str) -> bool {
        self.exact.contains(value) || self.patterns.iter().any(|p| p.is_match(value))
    }
}

/// Decides whether a single selector is kept.
struct Retention<'a> {
    used: &'a HashSet<String>,
    standard: EntryIndex<'a>,
    greedy: EntryIndex<'a>,
    deep: EntryIndex<'a>,
}

impl<'a> Retention<'a> {
    fn new(used: &'a HashSet<String>, safelist: &'a Safelist) -> Self {
        Self {
            used,
            standard: EntryIndex::new(&safelist.standard),
            greedy: EntryIndex::new(&safelist.greedy),
            deep: EntryIndex::new(&safelist.deep),
        }
    }

    /// A standard entry protects the selector it matches, or one part of a
    /// selector whose other parts are used. Greedy and deep entries protect
    /// the whole selector through any one part.
    fn keeps(&self, selector: &str) -> bool {
        if self.standard.matches(selector) || self.greedy.matches(selector) {
            return true;
        }

        let parts = selector_parts(selector);
        let protected = parts
            .iter()
            .filter_map(SelectorPart::value)
            .any(|value| self.greedy.matches(value) || self.deep.matches(value));

        protected
            || parts.iter().all(|part| {
                self.is_used(part) || part.value().is_some_and(|v| self.standard.matches(v))
            })
    }

    fn is_used(&self, part: &SelectorPart) -> bool {
        match part {
            SelectorPart::Tag(name) => {
                self.used.contains(name) || self.used.contains(&name.to_ascii_lowercase())
            }
            SelectorPart::Class(value) | SelectorPart::Id(value) | SelectorPart::Attribute(value) => {
                self.used.contains(value)
            }
            SelectorPart::Neutral => true,
        }
    }
}

/// One pass over a stylesheet, collecting what was removed.
struct Sweep<'a> {
    retention: Retention<'a>,
    record_selectors: bool,
    record_css: bool,
    removed: usize,
    rejected: Vec<String>,
    rejected_css: String,
}

impl Sweep<'_> {
    /// Cut unused selectors; drop rules (then groups) left empty.
    fn rules(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        let mut kept = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Rule(rule) => {
                    if let Some(rule) = self.rule(rule) {
                        kept.push(Node::Rule(rule));
                    }
                }
                Node::Group(mut group) => {
                    let had_rules = has_rules(&group.children);
                    group.children = self.rules(std::mem::take(&mut group.children));
                    if !had_rules || has_rules(&group.children) {
                        kept.push(Node::Group(group));
                    }
                }
                other => kept.push(other),
            }
        }
        kept
    }

    fn rule(&mut self, rule: StyleRule) -> Option<StyleRule> {
        let selectors = rule.selectors();
        if selectors.is_empty() {
            return Some(rule);
        }

        let (keep, drop): (Vec<String>, Vec<String>) = selectors
            .into_iter()
            .partition(|selector| self.retention.keeps(selector));
        if drop.is_empty() {
            return Some(rule);
        }

        self.removed += drop.len();
        if self.record_css {
            self.rejected_css
                .push_str(&format!("{}{{{}}}\n", drop.join(","), rule.body));
        }
        if self.record_selectors {
            self.rejected.extend(drop);
        }

        if keep.is_empty() {
            None
        } else {
            Some(rule.with_selectors(&keep))
        }
    }

    /// Drop at-rule blocks failing `keep`, at any depth.
    fn at_blocks(&mut self, nodes: Vec<Node>, keep: &dyn Fn(&AtBlock) -> bool) -> Vec<Node> {
        let mut kept = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::AtBlock(block) if !keep(&block) => {
                    self.removed += 1;
                    if self.record_css {
                        let mut text = String::new();
                        css::write_node(&Node::AtBlock(block.clone()), &mut text);
                        self.rejected_css.push_str(text.trim_start());
                        self.rejected_css.push('\n');
                    }
                    if self.record_selectors {
                        self.rejected
                            .push(format!("@{} {}", block.name, block.prelude.trim()));
                    }
                }
                Node::Group(mut group) => {
                    let had_rules = has_rules(&group.children);
                    group.children = self.at_blocks(std::mem::take(&mut group.children), keep);
                    if !had_rules || has_rules(&group.children) {
                        kept.push(Node::Group(group));
                    }
                }
                other => kept.push(other),
            }
        }
        kept
    }
}

fn has_rules(nodes: &[Node]) -> bool {
    nodes
        .iter()
        .any(|n| matches!(n, Node::Rule(_) | Node::Group(_) | Node::AtBlock(_)))
}

fn for_each_rule(nodes: &[Node], f: &mut dyn FnMut(&StyleRule)) {
    for node in nodes {
        match node {
            Node::Rule(rule) => f(rule),
            Node::Group(group) => for_each_rule(&group.children, f),
            _ => {}
        }
    }
}

/// Keyframe names used by `animation` / `animation-name` of kept rules.
fn referenced_animations(nodes: &[Node]) -> HashSet<String> {
    let mut names = HashSet::new();
    for_each_rule(nodes, &mut |rule: &StyleRule| {
        for (prop, value) in css::declarations(&rule.body) {
            if matches!(prop.as_str(), "animation" | "animation-name")
                || prop.ends_with("-animation")
                || prop.ends_with("-animation-name")
            {
                names.extend(
                    value
                        .split(|c: char| c == ',' || c.is_whitespace())
                        .filter(|s| !s.is_empty())
                        .map(String::from),
                );
            }
        }
    });
    names
}

/// Lowercased `font` / `font-family` values of kept rules.
fn referenced_fonts(nodes: &[Node]) -> Vec<String> {
    let mut fonts = Vec::new();
    for_each_rule(nodes, &mut |rule: &StyleRule| {
        for (prop, value) in css::declarations(&rule.body) {
            if prop == "font" || prop == "font-family" {
                fonts.push(value.to_lowercase());
            }
        }
    });
    fonts
}

/// Lowercased, unquoted family declared by a `@font-face` block.
fn font_family(block: &AtBlock) -> Option<String> {
    css::declarations(&block.body)
        .into_iter()
        .find(|(prop, _)| prop == "font-family")
        .map(|(_, value)| value.trim_matches(['"', '\'', ' ']).to_lowercase())
        .filter(|family| !family.is_empty())
}
