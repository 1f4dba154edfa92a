//! Text dumps of a page's control tree.
//!
//! ```text
//! Page report (3 controls):
//! ├── pager (datapager)
//! └── people (pagedtable)
//!     ├── name "Name" (key)
//!     └── caption (note)
//! ```

use std::fmt::Write;

use super::{Control, Page};

/// Branch drawing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Dashes only.
    Compact,
}

/// Configuration for tree dumps.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Show each control's kind tag.
    pub show_kinds: bool,
    /// Show internal parts such as table columns.
    pub show_parts: bool,
    /// Maximum depth to descend (None for unlimited).
    pub max_depth: Option<usize>,
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_kinds: true,
            show_parts: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// IDs only.
    pub fn minimal() -> Self {
        Self {
            show_kinds: false,
            show_parts: false,
            ..Default::default()
        }
    }
}

/// Formats the controls of a [`Page`] as a tree. Controls with a parent are
/// listed under it.
#[derive(Debug, Clone, Default)]
pub struct PageTreeDebug {
    options: TreeFormatOptions,
}

enum Node<'a> {
    Control(&'a dyn Control),
    Part(String),
}

impl PageTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    pub fn format_page(&self, page: &Page) -> String {
        let controls: Vec<&dyn Control> = page.controls().iter().collect();
        let mut output = String::new();
        let _ = writeln!(output, "Page {} ({} controls):", page.id(), controls.len());

        let roots: Vec<Node<'_>> = controls
            .iter()
            .filter(|c| c.base().parent().is_none())
            .map(|c| Node::Control(*c))
            .collect();
        if roots.is_empty() {
            output.push_str("  (empty)\n");
        }
        let count = roots.len();
        for (i, node) in roots.into_iter().enumerate() {
            self.format_node(&controls, node, 1, "", i + 1 == count, &mut output);
        }
        output
    }

    fn glyphs(&self) -> (&'static str, &'static str, &'static str) {
        match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => (
                "\u{2502}",
                "\u{251c}\u{2500}\u{2500}",
                "\u{2514}\u{2500}\u{2500}",
            ),
            TreeStyle::Compact => ("", "-", "-"),
        }
    }

    /// `lead` is what the ancestors contribute to the line prefix.
    fn format_node(
        &self,
        controls: &[&dyn Control],
        node: Node<'_>,
        depth: usize,
        lead: &str,
        is_last: bool,
        output: &mut String,
    ) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }
        let (branch, tee, corner) = self.glyphs();
        let _ = write!(output, "{lead}{} ", if is_last { corner } else { tee });

        let control = match node {
            Node::Part(text) => {
                output.push_str(&text);
                output.push('\n');
                return;
            }
            Node::Control(control) => control,
        };
        output.push_str(control.id());
        if self.options.show_kinds {
            let _ = write!(output, " ({})", control.kind());
        }
        output.push('\n');

        let mut children: Vec<Node<'_>> = Vec::new();
        if self.options.show_parts {
            children.extend(control.debug_children().into_iter().map(Node::Part));
        }
        children.extend(
            controls
                .iter()
                .filter(|c| c.base().parent() == Some(control.id()))
                .map(|c| Node::Control(*c)),
        );

        let gap = " ".repeat(self.options.indent_size + 1);
        let lead = if is_last {
            format!("{lead}{}{gap}", " ".repeat(branch.chars().count()))
        } else {
            format!("{lead}{branch}{gap}")
        };
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.format_node(controls, child, depth + 1, &lead, i + 1 == count, output);
        }
    }
}
