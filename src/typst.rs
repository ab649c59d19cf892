use crate::config::Config;
use crate::render::{Node, NodeKind, Output};

/// Convert rendered output to Typst markup
pub fn to_typst(output: &Output, config: &Config) -> String {
    let mut out = preamble(config);

    match output {
        Output::Text(text) => {
            escape_text(text, &mut out);
            out.push_str("\n\n");
        }
        // Typst has no HTML interpreter; the raw string is shown as text
        Output::Markup(markup) => {
            escape_text(markup.as_raw(), &mut out);
            out.push_str("\n\n");
        }
        Output::Node(node) => emit_blocks(std::slice::from_ref(node), config, &mut out),
        Output::Nodes(nodes) => emit_blocks(nodes, config, &mut out),
    }

    out
}

fn preamble(config: &Config) -> String {
    let mut out = String::new();

    // Set up paragraph settings to prevent widows/orphans
    out.push_str("#set par(linebreaks: \"optimized\")\n");
    if config.font.sans {
        out.push_str("#set text(font: (\"Open Sans\", \"DejaVu Sans\"))\n");
    }
    if config.page.numbers {
        out.push_str("#set page(numbering: \"1\")\n");
    }
    out.push_str("#show link: set text(fill: rgb(");
    push_string(&config.links.color, &mut out);
    out.push_str("))\n");
    if config.links.underline {
        out.push_str("#show link: underline\n");
    }
    out.push('\n');
    out
}

fn is_block(node: &Node) -> bool {
    match node.kind {
        NodeKind::Paragraph
        | NodeKind::Heading { .. }
        | NodeKind::List { .. }
        | NodeKind::ListItem
        | NodeKind::Blockquote
        | NodeKind::Preformatted
        | NodeKind::Image { .. } => true,
        NodeKind::Generic => node.children.iter().any(is_block),
        _ => false,
    }
}

/// Emit a sequence of sibling nodes in block context. Runs of inline nodes
/// become one paragraph; a heading is kept on the same page as the block
/// that follows it.
fn emit_blocks(nodes: &[Node], config: &Config, out: &mut String) {
    let mut inline_run: Vec<&Node> = Vec::new();
    let mut i = 0;

    while i < nodes.len() {
        let node = &nodes[i];

        if !is_block(node) {
            inline_run.push(node);
            i += 1;
            continue;
        }
        flush_inline(&mut inline_run, config, out);

        if let NodeKind::Heading { .. } = node.kind {
            out.push_str("#block(breakable: false)[\n");
            emit_block(node, config, out);
            if let Some(next) = nodes.get(i + 1).filter(|n| is_block(n)) {
                emit_block(next, config, out);
                i += 1;
            }
            out.push_str("]\n\n");
        } else {
            emit_block(node, config, out);
        }

        i += 1;
    }

    flush_inline(&mut inline_run, config, out);
}

fn flush_inline(run: &mut Vec<&Node>, config: &Config, out: &mut String) {
    if run.is_empty() {
        return;
    }
    for node in run.drain(..) {
        emit_inline(node, config, out);
    }
    out.push_str("\n\n");
}

fn emit_block(node: &Node, config: &Config, out: &mut String) {
    match &node.kind {
        NodeKind::Paragraph => {
            inlines_to_typst(&node.children, config, out);
            out.push_str("\n\n");
        }
        NodeKind::Heading { level } => {
            for _ in 0..*level {
                out.push('=');
            }
            out.push(' ');
            out.push_str(&single_line(&node.children, config));
            out.push_str("\n\n");
        }
        NodeKind::List { ordered } => {
            list_to_typst(&node.children, *ordered, 0, config, out);
            out.push('\n');
        }
        NodeKind::ListItem => {
            list_to_typst(std::slice::from_ref(node), false, 0, config, out);
            out.push('\n');
        }
        NodeKind::Blockquote => {
            out.push_str("#quote(block: true)[\n");
            emit_blocks(&node.children, config, out);
            out.push_str("]\n\n");
        }
        NodeKind::Preformatted => {
            // Keep code blocks together when possible
            out.push_str("#block(breakable: false)[\n");
            code_block_to_typst(&node.plain_text(), out);
            out.push_str("]\n\n");
        }
        NodeKind::Generic => emit_blocks(&node.children, config, out),
        _ => {
            emit_inline(node, config, out);
            out.push_str("\n\n");
        }
    }
}

fn inlines_to_typst(nodes: &[Node], config: &Config, out: &mut String) {
    for node in nodes {
        emit_inline(node, config, out);
    }
}

/// Inline content flattened onto one line, for headings and list items
fn single_line<'a>(nodes: impl IntoIterator<Item = &'a Node>, config: &Config) -> String {
    let mut line = String::new();
    for node in nodes {
        emit_inline(node, config, &mut line);
    }
    line.replace(LINE_BREAK, " ")
}

const LINE_BREAK: &str = " \\\n";

fn emit_inline(node: &Node, config: &Config, out: &mut String) {
    match &node.kind {
        NodeKind::Text { text } => escape_text(text, out),
        NodeKind::Strong => {
            out.push('*');
            inlines_to_typst(&node.children, config, out);
            out.push('*');
        }
        NodeKind::Emphasis => {
            out.push('_');
            inlines_to_typst(&node.children, config, out);
            out.push('_');
        }
        NodeKind::Underline => {
            out.push_str("#underline[");
            inlines_to_typst(&node.children, config, out);
            out.push(']');
        }
        NodeKind::Strikethrough => {
            out.push_str("#strike[");
            inlines_to_typst(&node.children, config, out);
            out.push(']');
        }
        NodeKind::InlineCode | NodeKind::Preformatted => {
            out.push_str("#raw(");
            push_string(&node.plain_text(), out);
            out.push(')');
        }
        NodeKind::Anchor { href } => {
            out.push_str("#link(");
            push_string(href, out);
            out.push_str(")[");
            inlines_to_typst(&node.children, config, out);
            out.push(']');
        }
        NodeKind::Image { src, alt } => {
            if config.typst.images {
                out.push_str("#image(");
                push_string(src, out);
                out.push_str(", alt: ");
                push_string(alt, out);
                out.push(')');
            } else {
                escape_text(alt, out);
            }
        }
        NodeKind::Paragraph
        | NodeKind::Heading { .. }
        | NodeKind::List { .. }
        | NodeKind::ListItem
        | NodeKind::Blockquote
        | NodeKind::Generic => inlines_to_typst(&node.children, config, out),
    }
}

fn list_to_typst(items: &[Node], ordered: bool, indent: usize, config: &Config, out: &mut String) {
    let prefix = if ordered { "+" } else { "-" };
    let indent_str: String = "  ".repeat(indent);

    for item in items {
        out.push_str(&indent_str);
        out.push_str(prefix);
        out.push(' ');

        if !matches!(item.kind, NodeKind::ListItem) {
            out.push_str(&single_line([item], config));
            out.push('\n');
            continue;
        }

        // Nested lists go on their own lines below the item text
        let (nested, content): (Vec<&Node>, Vec<&Node>) = item
            .children
            .iter()
            .partition(|child| matches!(child.kind, NodeKind::List { .. }));

        out.push_str(&single_line(content, config));
        out.push('\n');

        for list in nested {
            if let NodeKind::List { ordered } = list.kind {
                list_to_typst(&list.children, ordered, indent + 1, config, out);
            }
        }
    }
}

fn code_block_to_typst(code: &str, out: &mut String) {
    // The fence must be longer than any backtick run inside the code
    let longest_run = code
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat((longest_run + 1).max(3));

    out.push_str(&fence);
    out.push('\n');
    out.push_str(code);
    if !code.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&fence);
    out.push('\n');
}

fn escape_text(text: &str, out: &mut String) {
    // A `(` or `.` right after a function call would extend the call
    let after_call = out.ends_with(']') || out.ends_with(')');
    let mut line_start = out.is_empty() || out.ends_with('\n');
    let mut chars = text.char_indices();

    while let Some((i, ch)) = chars.next() {
        // `1.` at line start would open an enum item
        if line_start && ch.is_ascii_digit() {
            let digits = text[i..].bytes().take_while(u8::is_ascii_digit).count();
            if text[i + digits..].starts_with('.') {
                out.push_str(&text[i..i + digits]);
                out.push_str("\\.");
                for _ in 0..digits {
                    chars.next();
                }
                line_start = false;
                continue;
            }
        }

        match ch {
            // `/` always, so `//` and `/*` never open a comment
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '~' | '/' => {
                out.push('\\');
                out.push(ch);
            }
            '(' | '.' if i == 0 && after_call => {
                out.push('\\');
                out.push(ch);
            }
            // List, heading and term markers only count at line start
            '-' | '+' | '=' if line_start => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => {
                out.push_str(LINE_BREAK);
                line_start = true;
                continue;
            }
            _ => out.push(ch),
        }
        line_start = false;
    }
}

/// Write a Typst string literal
fn push_string(value: &str, out: &mut String) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}
