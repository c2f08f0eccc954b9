//! Minimal XML element tree for feed documents.
//!
//! Feeds are parsed with `quick-xml` into an owned tree, then serialized back
//! into one canonical text form. Comments and processing instructions are
//! dropped. Whitespace-only text is kept in the tree between siblings, where
//! it separates inline words, but left out of the serialization, so the
//! serialization only changes when the feed's content does. That serialization is what the cache stores
//! and compares.

use quick_xml::Reader;
use quick_xml::escape::{escape, resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written, e.g. `dc:creator`.
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| format!("bad attribute in <{}>: {}", name, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw).map(|v| v.into_owned()).unwrap_or_else(|_| raw.into_owned());
            attrs.push((key, value));
        }
        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
        })
    }

    fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Whether a single selector segment names this element.
    ///
    /// `content:encoded` matches only that qualified name; an unprefixed
    /// selector such as `encoded` also matches any prefix.
    fn matches(&self, segment: &str) -> bool {
        if segment.contains(':') {
            self.name == segment
        } else {
            self.name == segment || self.local_name() == segment
        }
    }

    /// First descendant matching `segment`, depth-first in document order.
    fn find_descendant(&self, segment: &str) -> Option<&Element> {
        for child in &self.children {
            if let Node::Element(el) = child {
                if el.matches(segment) {
                    return Some(el);
                }
                if let Some(found) = el.find_descendant(segment) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Resolve a selector: a tag name, or a `/`-separated path of tag names
    /// each searched within the previous match.
    pub fn find(&self, selector: &str) -> Option<&Element> {
        selector
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .try_fold(self, |scope, segment| scope.find_descendant(segment))
            .filter(|found| !std::ptr::eq(*found, self))
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text of every descendant text node.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }

    fn write_canonical(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", k, escape(v.as_str()));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Text(t) if t.trim().is_empty() => {}
                Node::Text(t) => out.push_str(&escape(t.as_str())),
                Node::Element(el) => el.write_canonical(out),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// A parsed feed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// Parse raw feed bytes. Invalid UTF-8 is replaced, a BOM is skipped.
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim_start_matches('\u{feff}');
        let mut reader = Reader::from_str(text);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| format!("xml error at byte {}: {}", reader.error_position(), e))?;
            match event {
                Event::Start(start) => stack.push(Element::from_start(&start)?),
                Event::Empty(start) => {
                    let el = Element::from_start(&start)?;
                    attach(&mut stack, &mut root, Node::Element(el))?;
                }
                Event::End(_) => {
                    let el = stack.pop().ok_or("unbalanced closing tag")?;
                    attach(&mut stack, &mut root, Node::Element(el))?;
                }
                Event::Text(t) => {
                    let raw = String::from_utf8_lossy(&t);
                    let value = unescape(&raw)
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| raw.into_owned());
                    push_text(&mut stack, &value);
                }
                Event::CData(c) => push_text(&mut stack, &String::from_utf8_lossy(&c)),
                Event::GeneralRef(r) => {
                    let name = String::from_utf8_lossy(&r).into_owned();
                    push_text(&mut stack, &resolve_reference(&name));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(format!("unclosed element <{}>", stack[stack.len() - 1].name));
        }
        root.map(|root| Self { root })
            .ok_or_else(|| "document has no root element".to_string())
    }

    /// Canonical text form used for change detection.
    pub fn serialize(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        self.root.write_canonical(&mut out);
        out
    }

    /// Resolve `selector` against the whole document, root included.
    pub fn find(&self, selector: &str) -> Option<&Element> {
        let mut segments = selector.split('/').map(str::trim).filter(|s| !s.is_empty());
        let first = segments.next()?;
        let rest: Vec<&str> = segments.collect();
        let start = if self.root.matches(first) {
            Some(&self.root)
        } else {
            self.root.find_descendant(first)
        }?;
        if rest.is_empty() {
            Some(start)
        } else {
            start.find(&rest.join("/"))
        }
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None => match node {
            Node::Element(el) if root.is_none() => {
                *root = Some(el);
                Ok(())
            }
            Node::Element(el) => Err(format!("second root element <{}>", el.name)),
            Node::Text(_) => Ok(()),
        },
    }
}

/// Append text to the open element, merging with a preceding text node so
/// entity references do not fragment the text. Whitespace-only text is kept
/// only after a sibling, where it may separate two inline elements.
fn push_text(stack: &mut [Element], text: &str) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    if let Some(Node::Text(prev)) = parent.children.last_mut() {
        prev.push_str(text);
    } else if !text.trim().is_empty() || !parent.children.is_empty() {
        parent.children.push(Node::Text(text.to_string()));
    }
}

fn resolve_reference(name: &str) -> String {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => num.parse::<u32>().ok(),
        };
        if let Some(c) = code.and_then(char::from_u32) {
            return c.to_string();
        }
    } else if let Some(s) = resolve_predefined_entity(name) {
        return s.to_string();
    }
    format!("&{};", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- generated -->
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Example</title>
    <item>
      <title>Hello</title>
      <dc:creator>Jane</dc:creator>
      <description>&lt;p&gt;World&lt;/p&gt;</description>
    </item>
    <item>
      <title>Older</title>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_find_returns_first_match_in_document_order() {
        let doc = Document::parse(FEED.as_bytes()).unwrap();
        let item = doc.find("item").unwrap();
        assert_eq!(item.find("title").unwrap().text(), "Hello");
    }

    #[test]
    fn test_find_by_local_and_qualified_name() {
        let doc = Document::parse(FEED.as_bytes()).unwrap();
        let item = doc.find("item").unwrap();
        assert_eq!(item.find("dc:creator").unwrap().text(), "Jane");
        assert_eq!(item.find("creator").unwrap().text(), "Jane");
        assert!(item.find("atom:creator").is_none());
    }

    #[test]
    fn test_find_path() {
        let doc = Document::parse(FEED.as_bytes()).unwrap();
        assert_eq!(doc.find("channel/title").unwrap().text(), "Example");
        assert_eq!(doc.find("rss/channel/item/title").unwrap().text(), "Hello");
    }

    #[test]
    fn test_escaped_markup_becomes_text() {
        let doc = Document::parse(FEED.as_bytes()).unwrap();
        let description = doc.find("item/description").unwrap();
        assert_eq!(description.text(), "<p>World</p>");
    }

    #[test]
    fn test_cdata_and_references_are_text() {
        let xml = "<a><b><![CDATA[<i>x</i>]]></b><c>Tom &amp; Jerry &#8217;s</c></a>";
        let doc = Document::parse(xml.as_bytes()).unwrap();
        assert_eq!(doc.find("b").unwrap().text(), "<i>x</i>");
        assert_eq!(doc.find("c").unwrap().text(), "Tom & Jerry \u{2019}s");
    }

    #[test]
    fn test_serialization_ignores_comments_and_layout_whitespace() {
        let compact = r#"<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/"><channel><title>Example</title><item><title>Hello</title><dc:creator>Jane</dc:creator><description>&lt;p&gt;World&lt;/p&gt;</description></item><item><title>Older</title></item></channel></rss>"#;
        let a = Document::parse(FEED.as_bytes()).unwrap().serialize();
        let b = Document::parse(compact.as_bytes()).unwrap().serialize();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serialization_round_trips_through_parse() {
        let first = Document::parse(FEED.as_bytes()).unwrap().serialize();
        let again = Document::parse(first.as_bytes()).unwrap().serialize();
        assert_eq!(first, again);
    }

    #[test]
    fn test_space_between_inline_elements_is_kept() {
        let xml = "<entry><title>Breaking <em>big</em> <em>news</em></title></entry>";
        let doc = Document::parse(xml.as_bytes()).unwrap();
        assert_eq!(doc.find("title").unwrap().text(), "Breaking big news");

        let xhtml = "<entry><content><b>Tom</b> <i>and</i>\n<b>Jerry</b></content></entry>";
        let doc = Document::parse(xhtml.as_bytes()).unwrap();
        assert_eq!(doc.find("content").unwrap().text(), "Tom and\nJerry");
    }

    #[test]
    fn test_serialization_changes_with_content() {
        let a = Document::parse(FEED.as_bytes()).unwrap().serialize();
        let b = Document::parse(FEED.replace("Hello", "Goodbye").as_bytes())
            .unwrap()
            .serialize();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        assert!(Document::parse(b"<rss><channel></rss>").is_err());
        assert!(Document::parse(b"<rss>").is_err());
        assert!(Document::parse(b"just text").is_err());
    }

    #[test]
    fn test_attributes_are_kept() {
        let doc = Document::parse(br#"<feed><link href="https://a.example/x?a=1&amp;b=2"/></feed>"#)
            .unwrap();
        assert_eq!(
            doc.find("link").unwrap().attr("href"),
            Some("https://a.example/x?a=1&b=2")
        );
    }
}
