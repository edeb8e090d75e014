//! Markdown and plain-text renderers.

use crate::repository::{ChatMessage, ChatRole, MindmapNode, Note, QuizQuestion, Report};

/// Renders notes as one markdown document with `##` section per note.
#[must_use]
pub fn notes_to_markdown(notes: &[Note]) -> String {
    let mut out = String::new();
    for note in notes {
        out.push_str(&format!("## {}\n\n{}\n\n", note.title, note.content.trim()));
    }
    out.trim_end().to_string()
}

/// Renders a chat transcript as markdown.
///
/// Date separators become `###` headings; speakers are bolded.
#[must_use]
pub fn chat_to_markdown(chat: &[ChatMessage]) -> String {
    let mut out = String::new();
    for message in chat {
        match message.role {
            ChatRole::Date => out.push_str(&format!("### {}\n\n", message.content)),
            ChatRole::User => out.push_str(&format!("**You:** {}\n\n", message.content)),
            ChatRole::Assistant => {
                out.push_str(&format!("**Assistant:** {}\n\n", message.content));
            }
        }
    }
    out.trim_end().to_string()
}

/// Renders a chat transcript as plain text.
#[must_use]
pub fn chat_to_text(chat: &[ChatMessage]) -> String {
    let mut out = String::new();
    for message in chat {
        match message.role {
            ChatRole::Date => out.push_str(&format!("--- {} ---\n", message.content)),
            ChatRole::User => out.push_str(&format!("You: {}\n", message.content)),
            ChatRole::Assistant => out.push_str(&format!("Assistant: {}\n", message.content)),
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Renders a report with its title as the document heading.
#[must_use]
pub fn report_to_markdown(report: &Report) -> String {
    format!("# {}\n\n{}", report.title, report.content.trim())
}

/// Renders a quiz as markdown with answers marked.
#[must_use]
pub fn quiz_to_markdown(title: &str, questions: &[QuizQuestion]) -> String {
    let mut out = format!("# {title}\n\n");
    for (i, q) in questions.iter().enumerate() {
        out.push_str(&format!("**{}. {}**\n\n", i + 1, q.question));
        for (j, option) in q.options.iter().enumerate() {
            let marker = if q.answer_index == Some(j) { "x" } else { " " };
            out.push_str(&format!("- [{marker}] {option}\n"));
        }
        if let Some(explanation) = &q.explanation {
            out.push_str(&format!("\n> {explanation}\n"));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Renders a mindmap tree as an indented outline.
#[must_use]
pub fn mindmap_to_outline(root: &MindmapNode) -> String {
    let mut out = String::new();
    render_node(root, 0, &mut out);
    out.trim_end().to_string()
}

fn render_node(node: &MindmapNode, depth: usize, out: &mut String) {
    out.push_str(&"  ".repeat(depth));
    out.push_str("- ");
    out.push_str(&node.label);
    out.push('\n');
    for child in &node.children {
        render_node(child, depth + 1, out);
    }
}
