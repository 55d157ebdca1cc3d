//! Structured builder for `CONFIG_KEY=VALUE` system-configuration documents.
//!
//! A [`ConfigFragment`] is an ordered list of typed lines rendered by one
//! formatter. Keys are written without the `CONFIG_` prefix; the renderer
//! adds it. Fragments never deduplicate keys.

use std::fmt;

/// The right-hand side of a property assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    /// Rendered as `y` / `n`.
    Bool(bool),
    Int(i64),
    /// Rendered double-quoted with `"` and `\` escaped.
    Str(String),
    /// Rendered as-is.
    Raw(String),
}

impl ConfigValue {
    fn render(&self) -> String {
        match self {
            Self::Bool(true) => "y".to_string(),
            Self::Bool(false) => "n".to_string(),
            Self::Int(n) => n.to_string(),
            Self::Str(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
                out
            }
            Self::Raw(s) => s.clone(),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// One line of a configuration fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLine {
    Comment(String),
    Blank,
    /// Section heading, rendered as a framed comment block.
    Heading(String),
    Property { key: String, value: ConfigValue },
}

/// An ordered configuration fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFragment {
    lines: Vec<ConfigLine>,
}

impl ConfigFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.lines.push(ConfigLine::Comment(text.into()));
        self
    }

    pub fn blank(mut self) -> Self {
        self.lines.push(ConfigLine::Blank);
        self
    }

    pub fn heading(mut self, text: impl Into<String>) -> Self {
        self.lines.push(ConfigLine::Heading(text.into()));
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.lines.push(ConfigLine::Property {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// `KEY=y` or `KEY=n`.
    pub fn flag(self, key: impl Into<String>, enabled: bool) -> Self {
        self.property(key, ConfigValue::Bool(enabled))
    }

    pub fn int(self, key: impl Into<String>, value: impl Into<i64>) -> Self {
        self.property(key, ConfigValue::Int(value.into()))
    }

    /// A quoted string value.
    pub fn string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.property(key, ConfigValue::Str(value.into()))
    }

    /// An unquoted value written verbatim.
    pub fn raw(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.property(key, ConfigValue::Raw(value.into()))
    }

    pub fn property_if(
        self,
        condition: bool,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Self {
        if condition {
            self.property(key, value)
        } else {
            self
        }
    }

    /// Append every line of `other`.
    pub fn extend(mut self, other: ConfigFragment) -> Self {
        self.lines.extend(other.lines);
        self
    }

    pub fn lines(&self) -> &[ConfigLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The first value assigned to `key`, if any.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.lines.iter().find_map(|line| match line {
            ConfigLine::Property { key: k, value } if k == key => Some(value),
            _ => None,
        })
    }

    /// Render to text. Every line, including the last, ends with `\n`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                ConfigLine::Comment(text) => {
                    out.push_str("# ");
                    out.push_str(text);
                    out.push('\n');
                }
                ConfigLine::Blank => out.push('\n'),
                ConfigLine::Heading(text) => {
                    out.push('\n');
                    out.push_str(&format!("# {text} #\n"));
                    out.push_str(&format!("# {} #\n", "-".repeat(text.chars().count())));
                    out.push('\n');
                }
                ConfigLine::Property { key, value } => {
                    out.push_str("CONFIG_");
                    out.push_str(key);
                    out.push('=');
                    out.push_str(&value.render());
                    out.push('\n');
                }
            }
        }
        out
    }
}

impl fmt::Display for ConfigFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
