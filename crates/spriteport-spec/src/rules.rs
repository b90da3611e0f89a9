//! Non-looping clip rules.
//!
//! A rule is a stored string. At assembly time each rule is compiled once:
//! if it is a valid regular expression it is matched as one (unanchored
//! search), otherwise it is matched as a literal substring. Rules are
//! evaluated in registration order and the first match wins.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single user-entered rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NonLoopingRule(String);

impl NonLoopingRule {
    pub fn new(rule: impl Into<String>) -> Self {
        Self(rule.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonLoopingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered set of non-looping rules.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<NonLoopingRule>", into = "Vec<NonLoopingRule>")]
pub struct NonLoopingRules {
    rules: Vec<NonLoopingRule>,
}

impl NonLoopingRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule at the end of the list.
    ///
    /// Returns false (and leaves the set unchanged) for blank or duplicate
    /// rules.
    pub fn add(&mut self, rule: impl Into<String>) -> bool {
        let rule = NonLoopingRule::new(rule);
        if rule.as_str().trim().is_empty() || self.rules.contains(&rule) {
            return false;
        }
        self.rules.push(rule);
        true
    }

    /// Removes the rule at `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Option<NonLoopingRule> {
        if index < self.rules.len() {
            Some(self.rules.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NonLoopingRule> {
        self.rules.iter()
    }

    /// Compiles every rule for evaluation.
    pub fn compile(&self) -> CompiledRules {
        CompiledRules {
            rules: self
                .rules
                .iter()
                .map(|rule| CompiledRule::compile(rule.as_str()))
                .collect(),
        }
    }
}

impl From<Vec<NonLoopingRule>> for NonLoopingRules {
    fn from(rules: Vec<NonLoopingRule>) -> Self {
        let mut set = NonLoopingRules::new();
        for rule in rules {
            set.add(rule.0);
        }
        set
    }
}

impl From<NonLoopingRules> for Vec<NonLoopingRule> {
    fn from(set: NonLoopingRules) -> Self {
        set.rules
    }
}

impl<S: Into<String>> FromIterator<S> for NonLoopingRules {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = NonLoopingRules::new();
        for rule in iter {
            set.add(rule);
        }
        set
    }
}

/// How a compiled rule matches clip names.
#[derive(Debug, Clone)]
pub enum RuleMatcher {
    /// The rule compiled as a regular expression.
    Pattern(Regex),
    /// The rule did not compile; matched as a literal substring.
    Literal(String),
}

/// A rule ready for evaluation.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub source: String,
    pub matcher: RuleMatcher,
}

impl CompiledRule {
    /// Regex first, literal substring when the pattern does not compile.
    pub fn compile(rule: &str) -> Self {
        let matcher = match Regex::new(rule) {
            Ok(re) => RuleMatcher::Pattern(re),
            Err(_) => RuleMatcher::Literal(rule.to_string()),
        };
        Self {
            source: rule.to_string(),
            matcher,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.matcher, RuleMatcher::Literal(_))
    }

    pub fn matches(&self, clip_name: &str) -> bool {
        match &self.matcher {
            RuleMatcher::Pattern(re) => re.is_match(clip_name),
            RuleMatcher::Literal(text) => clip_name.contains(text.as_str()),
        }
    }
}

/// The compiled form of a [`NonLoopingRules`] set.
#[derive(Debug, Clone, Default)]
pub struct CompiledRules {
    rules: Vec<CompiledRule>,
}

impl CompiledRules {
    /// Index of the first rule matching `clip_name`.
    pub fn first_match(&self, clip_name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.matches(clip_name))
    }

    /// Whether a clip with this name should loop.
    pub fn loops(&self, clip_name: &str) -> bool {
        self.first_match(clip_name).is_none()
    }

    pub fn get(&self, index: usize) -> Option<&CompiledRule> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
