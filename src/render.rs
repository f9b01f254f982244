// Display surfaces: turn a ViewModel into visible output

use crate::view::{CountSummary, FilterKind, ViewModel, escape_control, escape_html};
use colored::Colorize;
use std::borrow::Cow;

/// One task row, with text already escaped for the target surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem<'a> {
    pub id: i64,
    pub text: Cow<'a, str>,
    pub completed: bool,
}

/// Sink for a rendered view
///
/// [`render`] passes every task text through [`DisplaySurface::escape`]
/// before handing it to [`DisplaySurface::show_task`].
pub trait DisplaySurface {
    /// Neutralize anything in user text this surface would interpret
    fn escape<'t>(&self, text: &'t str) -> Cow<'t, str>;

    fn begin(&mut self, filter: FilterKind);

    fn show_task(&mut self, item: &TaskItem<'_>);

    fn show_empty(&mut self, message: &str);

    fn show_count(&mut self, count: &CountSummary);

    fn finish(&mut self) {}
}

/// Drive `surface` from `view`
pub fn render<D: DisplaySurface + ?Sized>(view: &ViewModel<'_>, surface: &mut D) {
    surface.begin(view.filter);

    match view.empty_message {
        Some(message) => surface.show_empty(message),
        None => {
            for task in &view.tasks {
                let item = TaskItem {
                    id: task.id,
                    text: surface.escape(&task.text),
                    completed: task.completed,
                };
                surface.show_task(&item);
            }
        }
    }

    surface.show_count(&view.count);
    surface.finish();
}

// ========================================================================
// HTML
// ========================================================================

/// Renders the todo list as an HTML fragment
#[derive(Debug, Default)]
pub struct HtmlSurface {
    filters: String,
    items: String,
    count: String,
    html: String,
}

impl HtmlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragment produced by the last render
    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }

    /// Wrap the fragment into a standalone document
    pub fn page(&self, title: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<main class=\"todo-app\">\n<h1>{title}</h1>\n{body}</main>\n</body>\n</html>\n",
            title = escape_html(title),
            body = self.html,
        )
    }
}

impl DisplaySurface for HtmlSurface {
    fn escape<'t>(&self, text: &'t str) -> Cow<'t, str> {
        escape_html(text)
    }

    fn begin(&mut self, filter: FilterKind) {
        self.filters.clear();
        self.items.clear();
        self.count.clear();

        for kind in FilterKind::VARIANTS {
            let class = if kind == filter { "filter-btn active" } else { "filter-btn" };
            self.filters.push_str(&format!(
                "<button class=\"{}\" data-filter=\"{}\">{}</button>",
                class,
                kind.as_str(),
                kind.label()
            ));
        }
    }

    fn show_task(&mut self, item: &TaskItem<'_>) {
        let (class, checked) = if item.completed {
            ("todo-item completed", " checked")
        } else {
            ("todo-item", "")
        };

        self.items.push_str(&format!(
            "<li class=\"{}\" data-id=\"{}\"><input type=\"checkbox\" class=\"todo-checkbox\"{}><span class=\"todo-text\">{}</span><button class=\"todo-delete\" aria-label=\"Delete\">\u{2715}</button></li>\n",
            class, item.id, checked, item.text
        ));
    }

    fn show_empty(&mut self, message: &str) {
        self.items
            .push_str(&format!("<li class=\"empty-message\">{}</li>\n", escape_html(message)));
    }

    fn show_count(&mut self, count: &CountSummary) {
        self.count = format!("<span id=\"todo-count\">{}</span>", count);
    }

    fn finish(&mut self) {
        self.html = format!(
            "<nav class=\"filters\">{}</nav>\n<ul id=\"todo-list\">\n{}</ul>\n{}\n",
            self.filters, self.items, self.count
        );
    }
}

// ========================================================================
// Terminal
// ========================================================================

/// Renders the todo list as colored terminal lines
#[derive(Debug, Default)]
pub struct TerminalSurface {
    lines: Vec<String>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_string(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

impl DisplaySurface for TerminalSurface {
    fn escape<'t>(&self, text: &'t str) -> Cow<'t, str> {
        escape_control(text)
    }

    fn begin(&mut self, filter: FilterKind) {
        self.lines.clear();

        let tabs: Vec<String> = FilterKind::VARIANTS
            .iter()
            .map(|kind| {
                if *kind == filter {
                    format!("[{}]", kind.label()).bold().to_string()
                } else {
                    kind.label().dimmed().to_string()
                }
            })
            .collect();
        self.lines.push(tabs.join(" "));
    }

    fn show_task(&mut self, item: &TaskItem<'_>) {
        let line = if item.completed {
            format!("[x] {:>13}  {}", item.id, item.text.as_ref().strikethrough().dimmed())
        } else {
            format!("[ ] {:>13}  {}", item.id, item.text)
        };
        self.lines.push(line);
    }

    fn show_empty(&mut self, message: &str) {
        self.lines.push(message.italic().to_string());
    }

    fn show_count(&mut self, count: &CountSummary) {
        self.lines.push(count.to_string().cyan().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;
    use crate::view::compute_view;
    use chrono::{TimeZone, Utc};

    fn task(id: i64, text: &str, completed: bool) -> Task {
        Task {
            id,
            text: text.to_string(),
            completed,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    /// Records calls in order
    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<String>,
    }

    impl DisplaySurface for RecordingSurface {
        fn escape<'t>(&self, text: &'t str) -> Cow<'t, str> {
            Cow::Owned(text.to_uppercase())
        }

        fn begin(&mut self, filter: FilterKind) {
            self.calls.push(format!("begin {}", filter));
        }

        fn show_task(&mut self, item: &TaskItem<'_>) {
            self.calls.push(format!("task {} {} {}", item.id, item.text, item.completed));
        }

        fn show_empty(&mut self, message: &str) {
            self.calls.push(format!("empty {}", message));
        }

        fn show_count(&mut self, count: &CountSummary) {
            self.calls.push(format!("count {}", count));
        }

        fn finish(&mut self) {
            self.calls.push("finish".to_string());
        }
    }

    #[test]
    fn test_render_call_order_and_escaping() {
        let tasks = vec![task(2, "b", true), task(1, "a", false)];
        let mut surface = RecordingSurface::default();

        render(&compute_view(&tasks, FilterKind::All), &mut surface);

        assert_eq!(
            surface.calls,
            vec![
                "begin all",
                "task 2 B true",
                "task 1 A false",
                "count 1 / 2 tasks",
                "finish"
            ]
        );
    }

    #[test]
    fn test_render_empty_state() {
        let tasks = vec![task(1, "buy milk", false)];
        let mut surface = RecordingSurface::default();

        render(&compute_view(&tasks, FilterKind::Completed), &mut surface);

        assert_eq!(
            surface.calls,
            vec!["begin completed", "empty No completed tasks", "count 1 / 1 tasks", "finish"]
        );
    }

    #[test]
    fn test_html_surface_escapes_task_text() {
        let tasks = vec![task(1, "<script>alert(1)</script>", false)];
        let mut surface = HtmlSurface::new();

        render(&compute_view(&tasks, FilterKind::All), &mut surface);

        let html = surface.as_str();
        assert!(!html.contains("<script>"));
        assert!(html.contains("<span class=\"todo-text\">&lt;script&gt;alert(1)&lt;/script&gt;</span>"));
    }

    #[test]
    fn test_html_surface_marks_state() {
        let tasks = vec![task(2, "done", true), task(1, "open", false)];
        let mut surface = HtmlSurface::new();

        render(&compute_view(&tasks, FilterKind::Active), &mut surface);
        let html = surface.into_html();

        assert!(html.contains("<button class=\"filter-btn active\" data-filter=\"active\">Active</button>"));
        assert!(html.contains("<button class=\"filter-btn\" data-filter=\"all\">All</button>"));
        assert!(html.contains("<li class=\"todo-item\" data-id=\"1\">"));
        assert!(!html.contains("data-id=\"2\""));
        assert!(html.contains("<span id=\"todo-count\">1 / 2 tasks</span>"));
    }

    #[test]
    fn test_html_surface_completed_item() {
        let tasks = vec![task(2, "done", true)];
        let mut surface = HtmlSurface::new();

        render(&compute_view(&tasks, FilterKind::Completed), &mut surface);

        assert!(surface.as_str().contains(
            "<li class=\"todo-item completed\" data-id=\"2\"><input type=\"checkbox\" class=\"todo-checkbox\" checked>"
        ));
    }

    #[test]
    fn test_html_surface_rerender_replaces_output() {
        let tasks = vec![task(1, "first", false)];
        let mut surface = HtmlSurface::new();

        render(&compute_view(&tasks, FilterKind::All), &mut surface);
        render(&compute_view(&[], FilterKind::All), &mut surface);

        assert!(!surface.as_str().contains("first"));
        assert!(surface.as_str().contains("<li class=\"empty-message\">No tasks yet. Add one to get started!</li>"));
    }

    #[test]
    fn test_html_page_wraps_fragment() {
        let mut surface = HtmlSurface::new();
        render(&compute_view(&[], FilterKind::All), &mut surface);

        let page = surface.page("Todo & Done");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Todo &amp; Done</title>"));
        assert!(page.contains(surface.as_str()));
    }

    #[test]
    fn test_terminal_surface_lines() {
        let tasks = vec![task(2, "evil\x1b[2J", true), task(1, "buy milk", false)];
        let mut surface = TerminalSurface::new();

        render(&compute_view(&tasks, FilterKind::All), &mut surface);

        let lines = surface.lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("[x]"));
        assert!(!lines[1].contains("\x1b[2J"));
        assert!(lines[2].starts_with("[ ]"));
        assert!(lines[2].contains("buy milk"));
        assert!(lines[3].contains("1 / 2 tasks"));
    }
}
