// Filtered view derivation

use crate::models::Task;
use std::borrow::Cow;

/// Which subset of tasks to display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterKind {
    /// Every filter, in display order
    pub const VARIANTS: [FilterKind; 3] = [FilterKind::All, FilterKind::Active, FilterKind::Completed];

    /// Parse a filter name; anything unrecognized selects [`FilterKind::All`]
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "active" => FilterKind::Active,
            "completed" => FilterKind::Completed,
            _ => FilterKind::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::All => "all",
            FilterKind::Active => "active",
            FilterKind::Completed => "completed",
        }
    }

    /// Button caption
    pub fn label(self) -> &'static str {
        match self {
            FilterKind::All => "All",
            FilterKind::Active => "Active",
            FilterKind::Completed => "Completed",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterKind::All => true,
            FilterKind::Active => !task.completed,
            FilterKind::Completed => task.completed,
        }
    }

    /// Message shown when nothing passes this filter
    pub fn empty_message(self) -> &'static str {
        match self {
            FilterKind::All => "No tasks yet. Add one to get started!",
            FilterKind::Active => "No active tasks",
            FilterKind::Completed => "No completed tasks",
        }
    }
}

impl From<&str> for FilterKind {
    fn from(name: &str) -> Self {
        FilterKind::parse_lenient(name)
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Active and total counts over the whole, unfiltered task sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountSummary {
    pub active: usize,
    pub total: usize,
}

impl CountSummary {
    pub fn of(tasks: &[Task]) -> Self {
        Self {
            active: tasks.iter().filter(|task| task.is_active()).count(),
            total: tasks.len(),
        }
    }
}

impl std::fmt::Display for CountSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {} tasks", self.active, self.total)
    }
}

/// Everything a display surface needs for one render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel<'a> {
    pub filter: FilterKind,
    /// Tasks passing the filter, in store order
    pub tasks: Vec<&'a Task>,
    /// Set only when `tasks` is empty
    pub empty_message: Option<&'static str>,
    pub count: CountSummary,
}

/// Derive the view for `tasks` under `filter`
pub fn compute_view(tasks: &[Task], filter: FilterKind) -> ViewModel<'_> {
    let visible: Vec<&Task> = tasks.iter().filter(|task| filter.matches(task)).collect();
    let empty_message = visible.is_empty().then(|| filter.empty_message());

    ViewModel {
        filter,
        tasks: visible,
        empty_message,
        count: CountSummary::of(tasks),
    }
}

// ========================================================================
// Literal text
// ========================================================================

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Characters a terminal would act on rather than print: C0/C1 controls,
/// line and paragraph separators, and bidi embeddings, overrides and isolates
fn is_terminal_control(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}')
}

/// Replace terminal control characters (ANSI escapes, newlines, bidi
/// overrides) so text stays on one line and cannot restyle or reorder output
pub fn escape_control(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_terminal_control) {
        return Cow::Borrowed(text);
    }

    Cow::Owned(
        text.chars()
            .map(|c| if is_terminal_control(c) { char::REPLACEMENT_CHARACTER } else { c })
            .collect(),
    )
}
