//! Structured builder for CMake build descriptors.
//!
//! Build-tool variable syntax (`${VAR}`, `$ENV{VAR}`) is produced only by
//! [`var`] and [`env`], never spelled inline.

use std::fmt;

use ucgen_targets::LogLevel;

/// `${name}`
pub fn var(name: &str) -> String {
    format!("${{{name}}}")
}

/// `$ENV{name}`
pub fn env(name: &str) -> String {
    format!("$ENV{{{name}}}")
}

/// A double-quoted CMake argument.
pub fn quoted(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// One line (or block) of a CMake document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmakeLine {
    /// `name(arg arg ...)`
    Command { name: String, args: Vec<String> },
    Raw(String),
    Blank,
    Comment(String),
    /// `if(condition)` ... optional `else()` ... `endif()`, bodies indented by two spaces.
    Conditional {
        condition: String,
        then: CmakeDocument,
        otherwise: Option<CmakeDocument>,
    },
}

/// An ordered CMake document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmakeDocument {
    lines: Vec<CmakeLine>,
}

impl CmakeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command<I, S>(mut self, name: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.push(CmakeLine::Command {
            name: name.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// `set(NAME value)`
    pub fn set(self, name: &str, value: impl Into<String>) -> Self {
        self.command("set", [name.to_string(), value.into()])
    }

    /// `set(NAME "value" CACHE STRING "doc")`
    pub fn set_cache(self, name: &str, value: &str, doc: &str) -> Self {
        self.command(
            "set",
            [
                name.to_string(),
                quoted(value),
                "CACHE".to_string(),
                "STRING".to_string(),
                quoted(doc),
            ],
        )
    }

    pub fn raw(mut self, line: impl Into<String>) -> Self {
        self.lines.push(CmakeLine::Raw(line.into()));
        self
    }

    pub fn blank(mut self) -> Self {
        self.lines.push(CmakeLine::Blank);
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.lines.push(CmakeLine::Comment(text.into()));
        self
    }

    pub fn if_then(mut self, condition: impl Into<String>, then: CmakeDocument) -> Self {
        self.lines.push(CmakeLine::Conditional {
            condition: condition.into(),
            then,
            otherwise: None,
        });
        self
    }

    pub fn if_else(
        mut self,
        condition: impl Into<String>,
        then: CmakeDocument,
        otherwise: CmakeDocument,
    ) -> Self {
        self.lines.push(CmakeLine::Conditional {
            condition: condition.into(),
            then,
            otherwise: Some(otherwise),
        });
        self
    }

    /// Append every line of `other`.
    pub fn extend(mut self, other: CmakeDocument) -> Self {
        self.lines.extend(other.lines);
        self
    }

    pub fn lines(&self) -> &[CmakeLine] {
        &self.lines
    }

    /// Render to text, every line terminated by `\n`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        for line in &self.lines {
            match line {
                CmakeLine::Command { name, args } => {
                    out.push_str(&format!("{indent}{name}({})\n", args.join(" ")));
                }
                CmakeLine::Raw(text) => out.push_str(&format!("{indent}{text}\n")),
                CmakeLine::Blank => out.push('\n'),
                CmakeLine::Comment(text) => out.push_str(&format!("{indent}# {text}\n")),
                CmakeLine::Conditional {
                    condition,
                    then,
                    otherwise,
                } => {
                    out.push_str(&format!("{indent}if({condition})\n"));
                    then.render_into(out, depth + 1);
                    if let Some(otherwise) = otherwise {
                        out.push_str(&format!("{indent}else()\n"));
                        otherwise.render_into(out, depth + 1);
                    }
                    out.push_str(&format!("{indent}endif()\n"));
                }
            }
        }
    }
}

impl fmt::Display for CmakeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Identity of the deployment unit a descriptor is built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorIdentity {
    /// `project()` name: the main name, suffixed with the federate when federated.
    pub project_name: String,
    pub main_name: String,
    /// Name of the build target that receives the generated sources.
    pub main_target: String,
    /// Generated project directory; `PROJECT_ROOT` is its parent.
    pub project_root: String,
    pub federate: Option<String>,
    pub log_level: LogLevel,
}

/// Structural switches of a descriptor flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorOptions {
    /// Emit `add_executable` for the main target.
    pub create_main_target: bool,
    /// Emit an `install(TARGETS ..)` rule.
    pub install_target: bool,
    /// Point `KCONFIG_ROOT` at the generated `Kconfig`.
    pub kconfig_root: bool,
    /// Tool named in the missing-target guard.
    pub builder: &'static str,
}

/// Build a complete descriptor: the platform `init` block followed by the
/// fixed identity/setup structure.
pub fn build_descriptor(
    init: CmakeDocument,
    identity: &DescriptorIdentity,
    options: &DescriptorOptions,
) -> CmakeDocument {
    let main_target = var("LF_MAIN_TARGET");
    let mut doc = CmakeDocument::new()
        .command("cmake_minimum_required", ["VERSION", "3.20.0"])
        .extend(init)
        .command("project", [identity.project_name.as_str()])
        .set("LF_MAIN", identity.main_name.as_str())
        .set("LF_MAIN_TARGET", identity.main_target.as_str())
        .set("PROJECT_ROOT", format!("{}/..", identity.project_root));
    if options.kconfig_root {
        doc = doc.set("KCONFIG_ROOT", format!("{}/Kconfig", var("CMAKE_CURRENT_SOURCE_DIR")));
    }
    doc = doc.set("LOG_LEVEL", format!("LF_LOG_LEVEL_{}", identity.log_level.name()));
    if let Some(federate) = &identity.federate {
        doc = doc.set("FEDERATE", federate.as_str());
    }
    doc = doc.blank();
    if options.create_main_target {
        doc = doc.command("add_executable", [main_target.clone()]);
    }
    doc = doc
        .command("include", [format!("{}/cmake/lfc.cmake", env("REACTOR_UC_PATH"))])
        .command("lf_setup", Vec::<String>::new())
        .command(
            "lf_build_generated_code",
            [main_target.clone(), var("CMAKE_CURRENT_SOURCE_DIR")],
        )
        .if_then(
            format!("NOT TARGET {main_target}"),
            CmakeDocument::new().command(
                "message",
                [
                    "FATAL_ERROR".to_string(),
                    quoted(&format!("Target {main_target} was not created by {}", options.builder)),
                ],
            ),
        );
    if options.install_target {
        doc = doc.command(
            "install",
            [
                "TARGETS".to_string(),
                main_target,
                "DESTINATION".to_string(),
                format!("{}/bin", var("PROJECT_ROOT")),
            ],
        );
    }
    doc.blank()
}
