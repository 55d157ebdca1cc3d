//! Kconfig-style options file for the network worker thread.

use std::fmt;

/// Default type and value of a [`KconfigOption`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KconfigDefault {
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KconfigOption {
    pub name: String,
    pub prompt: String,
    pub default: KconfigDefault,
    pub help: String,
}

impl KconfigOption {
    pub fn int(name: &str, prompt: &str, default: i64, help: &str) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            default: KconfigDefault::Int(default),
            help: help.into(),
        }
    }

    pub fn string(name: &str, prompt: &str, default: &str, help: &str) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            default: KconfigDefault::Str(default.into()),
            help: help.into(),
        }
    }
}

/// A Kconfig file: a `source` line and one menu of options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KconfigDocument {
    pub source: String,
    pub menu: String,
    pub options: Vec<KconfigOption>,
}

impl KconfigDocument {
    /// The options exposed for the TCP/IP channel receive worker.
    pub fn network_worker() -> Self {
        Self {
            source: "Kconfig.zephyr".into(),
            menu: "Lingua Franca settings".into(),
            options: vec![
                KconfigOption::int(
                    "LF_TCP_IP_CHANNEL_STACK_SIZE",
                    "TCP/IP channel worker stack size",
                    4096,
                    "Stack size in bytes allocated for the TCP/IP receive worker thread.",
                ),
                KconfigOption::int(
                    "LF_TCP_IP_CHANNEL_STACK_GUARD",
                    "TCP/IP channel worker POSIX guard",
                    128,
                    "Guard region size (bytes) reserved when the TCP/IP worker uses the POSIX \
                     pthread implementation.",
                ),
                KconfigOption::int(
                    "LF_TCP_IP_CHANNEL_THREAD_PREEMPT_LEVEL",
                    "TCP/IP channel worker preempt priority",
                    0,
                    "Preemptible priority level passed to K_PRIO_PREEMPT() for the TCP/IP \
                     worker thread.",
                ),
                KconfigOption::string(
                    "LF_TCP_IP_CHANNEL_THREAD_NAME",
                    "TCP/IP channel worker thread name",
                    "lf_tcpip_rx",
                    "Optional thread name used for kernel tracing and debug output.",
                ),
            ],
        }
    }

    pub fn option(&self, name: &str) -> Option<&KconfigOption> {
        self.options.iter().find(|o| o.name == name)
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KconfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "source \"{}\"", self.source)?;
        writeln!(f)?;
        writeln!(f, "menu \"{}\"", self.menu)?;
        for option in &self.options {
            writeln!(f)?;
            writeln!(f, "config {}", option.name)?;
            match &option.default {
                KconfigDefault::Int(n) => {
                    writeln!(f, "  int \"{}\"", option.prompt)?;
                    writeln!(f, "  default {n}")?;
                }
                KconfigDefault::Str(s) => {
                    writeln!(f, "  string \"{}\"", option.prompt)?;
                    writeln!(f, "  default \"{s}\"")?;
                }
            }
            writeln!(f, "  help")?;
            writeln!(f, "    {}", option.help)?;
        }
        writeln!(f)?;
        writeln!(f, "endmenu")
    }
}
