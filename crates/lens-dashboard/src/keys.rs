//! Named keys, intents and the dashboard keymap.
//!
//! Keys arrive as names (`"j"`, `"ctrl+u"`, `"pgdown"`). [`LensDashboard::handle_key`]
//! routes them to the open modal first (scope input, then fuzzy search) and
//! otherwise maps them to an [`Intent`] through the view-aware keymap.

use std::fmt;
use std::str::FromStr;

use lens_dashboard_core::{DepthOption, LensError, ViewMode};

use crate::dashboard::LensDashboard;

// ──────────────────────────────────────────────────────────────────────
// KeyInput
// ──────────────────────────────────────────────────────────────────────

/// One key press.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyInput {
    Char(char),
    Ctrl(char),
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Unknown(String),
}

impl KeyInput {
    /// Parse a key name. Unrecognised names become [`KeyInput::Unknown`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "enter" | "return" => Self::Enter,
            "esc" | "escape" => Self::Esc,
            "tab" => Self::Tab,
            "shift+tab" | "backtab" => Self::BackTab,
            "backspace" => Self::Backspace,
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "pgup" | "pageup" => Self::PageUp,
            "pgdown" | "pgdn" | "pagedown" => Self::PageDown,
            "home" => Self::Home,
            "end" => Self::End,
            "space" => Self::Char(' '),
            "comma" => Self::Char(','),
            _ => {
                if let Some(rest) = name.strip_prefix("ctrl+") {
                    let mut chars = rest.chars();
                    if let (Some(c), None) = (chars.next(), chars.next()) {
                        return Self::Ctrl(c.to_ascii_lowercase());
                    }
                }
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Unknown(name.to_string()),
                }
            }
        }
    }
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(' ') => f.write_str("space"),
            Self::Char(',') => f.write_str("comma"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Ctrl(c) => write!(f, "ctrl+{c}"),
            Self::Enter => f.write_str("enter"),
            Self::Esc => f.write_str("esc"),
            Self::Tab => f.write_str("tab"),
            Self::BackTab => f.write_str("shift+tab"),
            Self::Backspace => f.write_str("backspace"),
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
            Self::PageUp => f.write_str("pgup"),
            Self::PageDown => f.write_str("pgdown"),
            Self::Home => f.write_str("home"),
            Self::End => f.write_str("end"),
            Self::Unknown(name) => f.write_str(name),
        }
    }
}

// ──────────────────────────────────────────────────────────────────────
// Intent
// ──────────────────────────────────────────────────────────────────────

/// Every operation a dashboard accepts.
///
/// Textual form is kebab-case, with an `=value` suffix for intents that
/// carry data: `set-depth=3`, `add-scope=ui`, `set-size=100x40`,
/// `fuzzy-key=a`, `key=j`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    NextSection,
    PrevSection,
    CycleDepth,
    SetDepth(DepthOption),
    ToggleCenteredMode,
    ToggleViewType,
    EnterGroupedView,
    ExitGroupedView,
    CycleGroupByMode,
    ToggleWorkstreamExpand,
    ExpandAllWorkstreams,
    CollapseAllWorkstreams,
    ToggleSubdivision,
    ToggleWsTreeView,
    NextWorkstream,
    PrevWorkstream,
    ToggleGroupedExpand,
    NextGroup,
    PrevGroup,
    ExpandAllGroups,
    CollapseAllGroups,
    AddScopeLabel(String),
    RemoveScopeLabel(String),
    RemoveLastScopeLabel,
    ClearScope,
    ToggleScopeMode,
    OpenScopeInput,
    ScopeInputKey(KeyInput),
    CloseScopeInput,
    OpenFuzzySearch,
    HandleFuzzyKey(KeyInput),
    ConfirmFuzzySearch,
    CloseFuzzySearch,
    SetSize { width: u16, height: u16 },
    /// A raw key routed through [`LensDashboard::handle_input`].
    Key(KeyInput),
}

impl Intent {
    fn unit(name: &str) -> Option<Self> {
        Some(match name {
            "move-up" => Self::MoveUp,
            "move-down" => Self::MoveDown,
            "page-up" => Self::PageUp,
            "page-down" => Self::PageDown,
            "go-to-top" => Self::GoToTop,
            "go-to-bottom" => Self::GoToBottom,
            "next-section" => Self::NextSection,
            "prev-section" => Self::PrevSection,
            "cycle-depth" => Self::CycleDepth,
            "toggle-centered" => Self::ToggleCenteredMode,
            "toggle-view" => Self::ToggleViewType,
            "enter-grouped" => Self::EnterGroupedView,
            "exit-grouped" => Self::ExitGroupedView,
            "cycle-group-by" => Self::CycleGroupByMode,
            "toggle-workstream" => Self::ToggleWorkstreamExpand,
            "expand-workstreams" => Self::ExpandAllWorkstreams,
            "collapse-workstreams" => Self::CollapseAllWorkstreams,
            "toggle-subdivision" => Self::ToggleSubdivision,
            "toggle-ws-tree" => Self::ToggleWsTreeView,
            "next-workstream" => Self::NextWorkstream,
            "prev-workstream" => Self::PrevWorkstream,
            "toggle-group" => Self::ToggleGroupedExpand,
            "next-group" => Self::NextGroup,
            "prev-group" => Self::PrevGroup,
            "expand-groups" => Self::ExpandAllGroups,
            "collapse-groups" => Self::CollapseAllGroups,
            "remove-last-scope" => Self::RemoveLastScopeLabel,
            "clear-scope" => Self::ClearScope,
            "toggle-scope-mode" => Self::ToggleScopeMode,
            "open-scope-input" => Self::OpenScopeInput,
            "close-scope-input" => Self::CloseScopeInput,
            "open-search" => Self::OpenFuzzySearch,
            "confirm-search" => Self::ConfirmFuzzySearch,
            "close-search" => Self::CloseFuzzySearch,
            _ => return None,
        })
    }

    /// Parse a comma-separated script. Tokens that are not intent names
    /// are read as key names.
    pub fn parse_script(script: &str) -> Result<Vec<Self>, LensError> {
        script
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|token| {
                if Self::unit(token).is_some() || token.contains('=') {
                    token.parse()
                } else {
                    Ok(Self::Key(KeyInput::parse(token)))
                }
            })
            .collect()
    }
}

impl FromStr for Intent {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(intent) = Self::unit(s) {
            return Ok(intent);
        }
        let Some((name, value)) = s.split_once('=') else {
            return Err(LensError::InvalidArgument(format!("unknown intent '{s}'")));
        };
        match name {
            "set-depth" => Ok(Self::SetDepth(value.parse()?)),
            "add-scope" => Ok(Self::AddScopeLabel(value.to_string())),
            "remove-scope" => Ok(Self::RemoveScopeLabel(value.to_string())),
            "scope-key" => Ok(Self::ScopeInputKey(KeyInput::parse(value))),
            "fuzzy-key" => Ok(Self::HandleFuzzyKey(KeyInput::parse(value))),
            "key" => Ok(Self::Key(KeyInput::parse(value))),
            "set-size" => {
                let parsed = value
                    .split_once('x')
                    .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)));
                parsed
                    .map(|(width, height)| Self::SetSize { width, height })
                    .ok_or_else(|| LensError::InvalidArgument(format!("invalid size '{value}', expected WxH")))
            }
            _ => Err(LensError::InvalidArgument(format!("unknown intent '{name}'"))),
        }
    }
}

/// Result of one key or intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    pub handled: bool,
    /// Status-line message; empty when there is nothing to say.
    pub status: String,
}

impl KeyOutcome {
    fn handled() -> Self {
        Self {
            handled: true,
            status: String::new(),
        }
    }

    fn with_status(status: impl Into<String>) -> Self {
        Self {
            handled: true,
            status: status.into(),
        }
    }
}

impl From<(bool, String)> for KeyOutcome {
    fn from((handled, status): (bool, String)) -> Self {
        Self { handled, status }
    }
}

// ──────────────────────────────────────────────────────────────────────
// KeyBinding: keymap help
// ──────────────────────────────────────────────────────────────────────

/// A main-keymap entry for help text.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    /// Key label (e.g. "j/down", "1-3").
    pub label: &'static str,
    pub action: &'static str,
    /// Views the binding applies to; empty means every view.
    pub views: &'static [ViewMode],
}

const WS: &[ViewMode] = &[ViewMode::Workstream];
const GROUPED: &[ViewMode] = &[ViewMode::Grouped];
const LISTS: &[ViewMode] = &[ViewMode::Workstream, ViewMode::Grouped];

/// Main keymap in display order.
pub const BINDINGS: &[KeyBinding] = &[
    KeyBinding { label: "j/down", action: "Move down", views: &[] },
    KeyBinding { label: "k/up", action: "Move up", views: &[] },
    KeyBinding { label: "pgdown/ctrl+d", action: "Page down", views: &[] },
    KeyBinding { label: "pgup/ctrl+u", action: "Page up", views: &[] },
    KeyBinding { label: "g/home", action: "Top", views: &[] },
    KeyBinding { label: "G/end", action: "Bottom", views: &[] },
    KeyBinding { label: "n/N", action: "Next / previous section", views: &[ViewMode::Flat] },
    KeyBinding { label: "n/N", action: "Next / previous workstream", views: WS },
    KeyBinding { label: "n/N", action: "Next / previous group", views: GROUPED },
    KeyBinding { label: "d", action: "Cycle depth", views: &[] },
    KeyBinding { label: "1-3/*", action: "Set depth", views: &[] },
    KeyBinding { label: "c", action: "Toggle centered", views: &[ViewMode::Flat] },
    KeyBinding { label: "w", action: "Toggle workstreams", views: &[] },
    KeyBinding { label: "o", action: "Toggle grouped view", views: &[] },
    KeyBinding { label: "b", action: "Cycle group-by", views: GROUPED },
    KeyBinding { label: "enter/space", action: "Expand / collapse", views: LISTS },
    KeyBinding { label: "E", action: "Expand all", views: LISTS },
    KeyBinding { label: "C", action: "Collapse all", views: LISTS },
    KeyBinding { label: "s", action: "Toggle subdivision", views: WS },
    KeyBinding { label: "t", action: "Toggle tree view", views: WS },
    KeyBinding { label: "S", action: "Add scope label", views: &[] },
    KeyBinding { label: "x", action: "Remove last scope label", views: &[] },
    KeyBinding { label: "X", action: "Clear scope", views: &[] },
    KeyBinding { label: "m", action: "Toggle scope mode", views: &[] },
    KeyBinding { label: "/", action: "Search", views: &[ViewMode::Flat] },
];

/// Bindings shown for `view`.
pub fn bindings_for(view: ViewMode) -> impl Iterator<Item = &'static KeyBinding> {
    BINDINGS
        .iter()
        .filter(move |b| b.views.is_empty() || b.views.contains(&view))
}

// ──────────────────────────────────────────────────────────────────────
// Dispatch
// ──────────────────────────────────────────────────────────────────────

impl LensDashboard<'_> {
    /// Parse and handle one named key.
    pub fn handle_key(&mut self, name: &str) -> KeyOutcome {
        self.handle_input(&KeyInput::parse(name))
    }

    /// Handle one key: the scope input box and the fuzzy search see it
    /// first, then the main keymap.
    pub fn handle_input(&mut self, key: &KeyInput) -> KeyOutcome {
        if self.is_scope_input_open() {
            return self.handle_scope_input_key(key).into();
        }
        if self.is_searching() {
            return self.handle_fuzzy_key(key).into();
        }
        match self.main_intent(key) {
            Some(intent) => self.apply(intent),
            None => KeyOutcome::default(),
        }
    }

    fn main_intent(&self, key: &KeyInput) -> Option<Intent> {
        let grouped = self.grouped_active();
        let ws = self.ws_active();
        let intent = match key {
            KeyInput::Char('j') | KeyInput::Down => Intent::MoveDown,
            KeyInput::Char('k') | KeyInput::Up => Intent::MoveUp,
            KeyInput::PageDown | KeyInput::Ctrl('d') => Intent::PageDown,
            KeyInput::PageUp | KeyInput::Ctrl('u') => Intent::PageUp,
            KeyInput::Char('g') | KeyInput::Home => Intent::GoToTop,
            KeyInput::Char('G') | KeyInput::End => Intent::GoToBottom,
            KeyInput::Char('n') if grouped => Intent::NextGroup,
            KeyInput::Char('n') if ws => Intent::NextWorkstream,
            KeyInput::Char('n') => Intent::NextSection,
            KeyInput::Char('N') if grouped => Intent::PrevGroup,
            KeyInput::Char('N') if ws => Intent::PrevWorkstream,
            KeyInput::Char('N') => Intent::PrevSection,
            KeyInput::Char('d') => Intent::CycleDepth,
            KeyInput::Char('1') => Intent::SetDepth(DepthOption::One),
            KeyInput::Char('2') => Intent::SetDepth(DepthOption::Two),
            KeyInput::Char('3') => Intent::SetDepth(DepthOption::Three),
            KeyInput::Char('*') => Intent::SetDepth(DepthOption::All),
            KeyInput::Char('c') => Intent::ToggleCenteredMode,
            KeyInput::Char('w') => Intent::ToggleViewType,
            KeyInput::Char('o') if self.view == ViewMode::Grouped => Intent::ExitGroupedView,
            KeyInput::Char('o') => Intent::EnterGroupedView,
            KeyInput::Esc if self.view == ViewMode::Grouped => Intent::ExitGroupedView,
            KeyInput::Char('b') if self.view == ViewMode::Grouped => Intent::CycleGroupByMode,
            KeyInput::Enter | KeyInput::Char(' ') if grouped => Intent::ToggleGroupedExpand,
            KeyInput::Enter | KeyInput::Char(' ') if ws => Intent::ToggleWorkstreamExpand,
            KeyInput::Char('E') if grouped => Intent::ExpandAllGroups,
            KeyInput::Char('E') if ws => Intent::ExpandAllWorkstreams,
            KeyInput::Char('C') if grouped => Intent::CollapseAllGroups,
            KeyInput::Char('C') if ws => Intent::CollapseAllWorkstreams,
            KeyInput::Char('s') if ws => Intent::ToggleSubdivision,
            KeyInput::Char('t') if ws => Intent::ToggleWsTreeView,
            KeyInput::Char('S') => Intent::OpenScopeInput,
            KeyInput::Char('x') => Intent::RemoveLastScopeLabel,
            KeyInput::Char('X') => Intent::ClearScope,
            KeyInput::Char('m') => Intent::ToggleScopeMode,
            KeyInput::Char('/') => Intent::OpenFuzzySearch,
            _ => return None,
        };
        Some(intent)
    }

    /// Apply one intent.
    pub fn apply(&mut self, intent: Intent) -> KeyOutcome {
        tracing::trace!(?intent, "apply intent");
        match intent {
            Intent::MoveUp => self.move_up(),
            Intent::MoveDown => self.move_down(),
            Intent::PageUp => self.page_up(),
            Intent::PageDown => self.page_down(),
            Intent::GoToTop => self.go_to_top(),
            Intent::GoToBottom => self.go_to_bottom(),
            Intent::NextSection => self.next_section(),
            Intent::PrevSection => self.prev_section(),
            Intent::CycleDepth => {
                self.cycle_depth();
                return KeyOutcome::with_status(format!("Depth: {}", self.depth));
            }
            Intent::SetDepth(depth) => {
                self.set_depth(depth);
                return KeyOutcome::with_status(format!("Depth: {}", self.depth));
            }
            Intent::ToggleCenteredMode => self.toggle_centered_mode(),
            Intent::ToggleViewType => self.toggle_view_type(),
            Intent::EnterGroupedView => self.enter_grouped_view(),
            Intent::ExitGroupedView => self.exit_grouped_view(),
            Intent::CycleGroupByMode => {
                self.cycle_group_by_mode();
                return KeyOutcome::with_status(format!("Group by: {}", self.group_by));
            }
            Intent::ToggleWorkstreamExpand => self.toggle_workstream_expand(),
            Intent::ExpandAllWorkstreams => self.expand_all_workstreams(),
            Intent::CollapseAllWorkstreams => self.collapse_all_workstreams(),
            Intent::ToggleSubdivision => self.toggle_subdivision(),
            Intent::ToggleWsTreeView => self.toggle_ws_tree_view(),
            Intent::NextWorkstream => self.next_workstream(),
            Intent::PrevWorkstream => self.prev_workstream(),
            Intent::ToggleGroupedExpand => self.toggle_grouped_expand(),
            Intent::NextGroup => self.next_group(),
            Intent::PrevGroup => self.prev_group(),
            Intent::ExpandAllGroups => self.expand_all_groups(),
            Intent::CollapseAllGroups => self.collapse_all_groups(),
            Intent::AddScopeLabel(label) => self.add_scope_label(&label),
            Intent::RemoveScopeLabel(label) => self.remove_scope_label(&label),
            Intent::RemoveLastScopeLabel => {
                let status = if self.remove_last_scope_label() { "Removed scope label" } else { "" };
                return KeyOutcome::with_status(status);
            }
            Intent::ClearScope => self.clear_scope(),
            Intent::ToggleScopeMode => {
                self.toggle_scope_mode();
                return KeyOutcome::with_status(format!("Scope mode: {}", self.scope_mode().display_name()));
            }
            Intent::OpenScopeInput => self.open_scope_input(),
            Intent::ScopeInputKey(key) => return self.handle_scope_input_key(&key).into(),
            Intent::CloseScopeInput => self.close_scope_input(),
            Intent::OpenFuzzySearch => self.open_fuzzy_search(),
            Intent::HandleFuzzyKey(key) => return self.handle_fuzzy_key(&key).into(),
            Intent::ConfirmFuzzySearch => {
                let id = self.confirm_fuzzy_search();
                if !id.is_empty() {
                    return KeyOutcome::with_status(format!("Jumped to {id}"));
                }
            }
            Intent::CloseFuzzySearch => self.close_fuzzy_search(),
            Intent::SetSize { width, height } => self.set_size(width, height),
            Intent::Key(key) => return self.handle_input(&key),
        }
        KeyOutcome::handled()
    }
}
