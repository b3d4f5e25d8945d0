//! Canonical serialization: tab indentation, CRLF line endings, no XML
//! declaration. Elements holding only text stay on one line.

use quick_xml::escape::{escape, partial_escape};

use super::element::{Element, Node};

const NEWLINE: &str = "\r\n";

pub(crate) fn write_canonical(root: &Element) -> String {
    let mut out = String::new();
    write_element(&mut out, root, 0);
    out
}

fn write_element(out: &mut String, element: &Element, depth: usize) {
    indent(out, depth);
    out.push('<');
    out.push_str(element.name());
    for (key, value) in element.attributes() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }

    if element.is_empty() {
        out.push_str(" />");
        out.push_str(NEWLINE);
        return;
    }

    let text_only = element
        .children()
        .iter()
        .all(|node| matches!(node, Node::Text(_)));
    if text_only {
        out.push('>');
        out.push_str(&normalize_newlines(&partial_escape(&element.text())));
        close_tag(out, element);
        return;
    }

    out.push('>');
    out.push_str(NEWLINE);
    for node in element.children() {
        match node {
            Node::Element(child) => write_element(out, child, depth + 1),
            Node::Text(text) => {
                indent(out, depth + 1);
                out.push_str(&normalize_newlines(&partial_escape(text.as_str())));
                out.push_str(NEWLINE);
            }
        }
    }
    indent(out, depth);
    close_tag(out, element);
}

fn close_tag(out: &mut String, element: &Element) {
    out.push_str("</");
    out.push_str(element.name());
    out.push('>');
    out.push_str(NEWLINE);
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', NEWLINE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_canonical_layout() {
        let root = Element::new("a")
            .with_attr("x", "1 & \"2\"")
            .with_child(Element::new("b").with_text("one < two"))
            .with_child(Element::new("c"))
            .with_child(Element::new("d").with_child(Element::new("e").with_text("deep")));
        assert_eq!(
            write_canonical(&root),
            "<a x=\"1 &amp; &quot;2&quot;\">\r\n\
             \t<b>one &lt; two</b>\r\n\
             \t<c />\r\n\
             \t<d>\r\n\
             \t\t<e>deep</e>\r\n\
             \t</d>\r\n\
             </a>\r\n"
        );
    }

    #[test]
    fn test_text_newlines_become_crlf() {
        let root = Element::new("f").with_text("line1\nline2\r\nline3");
        assert_eq!(write_canonical(&root), "<f>line1\r\nline2\r\nline3</f>\r\n");
    }

    #[test]
    fn test_output_reparses_to_same_tree() {
        let root = Element::in_namespace("a", "urn:x")
            .with_attr("xmlns", "urn:x")
            .with_child(Element::new("b").with_text("v"));
        let reparsed = Element::parse(&write_canonical(&root)).unwrap();
        assert_eq!(reparsed, root);
    }
}
