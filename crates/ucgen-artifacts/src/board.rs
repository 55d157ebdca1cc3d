//! Board-specific configuration quirks.

use tracing::debug;

use crate::config::ConfigFragment;

/// Boards of the Raspberry Pi Pico family, which need an entropy source and
/// a serial console enabled to build the runtime at all.
pub const PICO_BOARDS: &[&str] = &[
    "rpi_pico",
    "rpi_pico2",
    "rpi_pico_w",
    "rpi_pico2_w",
    "raspberrypi_pico",
    "w5500_evb_pico",
];

#[derive(Debug, Clone)]
struct BoardEntry {
    /// Lower-cased board names.
    boards: Vec<String>,
    fragment: ConfigFragment,
}

impl BoardEntry {
    fn matches(&self, board: &str) -> bool {
        self.boards.iter().any(|b| b == board)
    }
}

/// Lookup from a lower-cased board identifier to an extra configuration fragment.
///
/// Entries are independent. When more than one entry matches, their
/// fragments are concatenated in table order.
#[derive(Debug, Clone, Default)]
pub struct BoardQuirkTable {
    entries: Vec<BoardEntry>,
}

impl BoardQuirkTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table.
    pub fn builtin() -> Self {
        Self::new().with_entry(PICO_BOARDS.iter().copied(), pico_fragment())
    }

    /// Add an entry matching any of `boards` (case-insensitive).
    pub fn with_entry<I, S>(mut self, boards: I, fragment: ConfigFragment) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entries.push(BoardEntry {
            boards: boards
                .into_iter()
                .map(|b| b.as_ref().trim().to_lowercase())
                .collect(),
            fragment,
        });
        self
    }

    /// Extra fragment for `board`, or `None` when the board is unset or unknown.
    pub fn config_for(&self, board: Option<&str>) -> Option<ConfigFragment> {
        let board = board?.trim().to_lowercase();
        let mut matched = self.entries.iter().filter(|e| e.matches(&board)).peekable();
        if matched.peek().is_none() {
            debug!(board = %board, "no board-specific configuration");
            return None;
        }
        let fragment = matched.fold(ConfigFragment::new(), |acc, e| acc.extend(e.fragment.clone()));
        Some(fragment)
    }

    /// Every board name with an entry, in table order.
    pub fn known_boards(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|e| e.boards.iter().map(String::as_str))
    }
}

fn pico_fragment() -> ConfigFragment {
    ConfigFragment::new()
        .comment("Pico specific configuration")
        .blank()
        .flag("SERIAL", true)
        .flag("UART_CONSOLE", true)
        .flag("STDOUT_CONSOLE", true)
        .flag("ENTROPY_GENERATOR", true)
        .flag("TEST_RANDOM_GENERATOR", true)
}
