use crate::render::{Node, NodeKind, Output};

/// Convert rendered output to an HTML fragment.
///
/// Text and attribute values are escaped. Trusted markup is the exception:
/// it is written verbatim inside a `<span>`.
pub fn to_html(output: &Output) -> String {
    let mut out = String::new();
    match output {
        Output::Text(text) => escape_into(text, &mut out),
        Output::Markup(markup) => {
            out.push_str("<span>");
            out.push_str(markup.as_raw());
            out.push_str("</span>");
        }
        Output::Node(node) => node_to_html(node, &mut out),
        Output::Nodes(nodes) => {
            for node in nodes {
                node_to_html(node, &mut out);
            }
        }
    }
    out
}

/// Render a single node and its subtree.
pub fn node_to_html(node: &Node, out: &mut String) {
    let tag = match &node.kind {
        NodeKind::Text { text } => {
            escape_into(text, out);
            return;
        }
        NodeKind::Image { src, alt } => {
            out.push_str("<img src=\"");
            escape_into(src, out);
            out.push_str("\" alt=\"");
            escape_into(alt, out);
            out.push_str("\">");
            return;
        }
        NodeKind::Anchor { href } => {
            out.push_str("<a href=\"");
            escape_into(href, out);
            out.push_str("\">");
            children_to_html(&node.children, out);
            out.push_str("</a>");
            return;
        }
        NodeKind::Heading { level } => {
            let tag = format!("h{level}");
            out.push('<');
            out.push_str(&tag);
            out.push('>');
            children_to_html(&node.children, out);
            out.push_str("</");
            out.push_str(&tag);
            out.push('>');
            return;
        }
        NodeKind::Strong => "strong",
        NodeKind::Emphasis => "em",
        NodeKind::Underline => "u",
        NodeKind::Strikethrough => "s",
        NodeKind::InlineCode => "code",
        NodeKind::Paragraph => "p",
        NodeKind::List { ordered: true } => "ol",
        NodeKind::List { ordered: false } => "ul",
        NodeKind::ListItem => "li",
        NodeKind::Blockquote => "blockquote",
        NodeKind::Preformatted => "pre",
        NodeKind::Generic => "span",
    };

    out.push('<');
    out.push_str(tag);
    out.push('>');
    children_to_html(&node.children, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn children_to_html(children: &[Node], out: &mut String) {
    for child in children {
        node_to_html(child, out);
    }
}

fn escape_into(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Key, TrustedMarkup};

    fn text(key: Key, s: &str) -> Node {
        Node::leaf(
            key,
            NodeKind::Text {
                text: s.to_string(),
            },
        )
    }

    #[test]
    fn plain_text_is_escaped() {
        assert_eq!(
            to_html(&Output::Text("Tom & \"Jerry\" <3".to_string())),
            "Tom &amp; &quot;Jerry&quot; &lt;3"
        );
    }

    #[test]
    fn trusted_markup_is_verbatim() {
        let raw = "<p onclick='x()'>Hi &amp; bye</p>";
        assert_eq!(
            to_html(&Output::Markup(TrustedMarkup::new(raw))),
            format!("<span>{raw}</span>")
        );
    }

    #[test]
    fn block_tags() {
        let root = Key::root(0);
        let list = Node::new(
            root.clone(),
            NodeKind::List { ordered: true },
            vec![Node::new(
                root.child(0),
                NodeKind::ListItem,
                vec![text(root.child(0).child(0), "one")],
            )],
        );
        assert_eq!(to_html(&Output::Node(list)), "<ol><li>one</li></ol>");

        let heading = Node::new(
            root.clone(),
            NodeKind::Heading { level: 3 },
            vec![text(root.child(0), "T")],
        );
        assert_eq!(to_html(&Output::Node(heading)), "<h3>T</h3>");
    }

    #[test]
    fn code_block_nests_code_in_pre() {
        let root = Key::root(0);
        let pre = Node::new(
            root.clone(),
            NodeKind::Preformatted,
            vec![Node::new(
                root.child(0),
                NodeKind::InlineCode,
                vec![text(root.child(0).child(0), "a < b")],
            )],
        );
        assert_eq!(
            to_html(&Output::Node(pre)),
            "<pre><code>a &lt; b</code></pre>"
        );
    }

    #[test]
    fn attributes_are_escaped() {
        let root = Key::root(0);
        let nodes = vec![
            Node::new(
                root.clone(),
                NodeKind::Anchor {
                    href: "/search?a=1&b=\"2\"".to_string(),
                },
                vec![text(root.child(0), "go")],
            ),
            Node::leaf(
                Key::root(1),
                NodeKind::Image {
                    src: "/u/x.png".to_string(),
                    alt: "a \"cat\"".to_string(),
                },
            ),
        ];
        assert_eq!(
            to_html(&Output::Nodes(nodes)),
            "<a href=\"/search?a=1&amp;b=&quot;2&quot;\">go</a>\
             <img src=\"/u/x.png\" alt=\"a &quot;cat&quot;\">"
        );
    }

    #[test]
    fn inline_wrappers() {
        let cases = [
            (NodeKind::Strong, "<strong>x</strong>"),
            (NodeKind::Emphasis, "<em>x</em>"),
            (NodeKind::Underline, "<u>x</u>"),
            (NodeKind::Strikethrough, "<s>x</s>"),
            (NodeKind::InlineCode, "<code>x</code>"),
            (NodeKind::Generic, "<span>x</span>"),
        ];
        for (kind, expected) in cases {
            let node = Node::new(Key::root(0), kind, vec![text(Key::root(0).child(0), "x")]);
            assert_eq!(to_html(&Output::Node(node)), expected);
        }
    }
}
