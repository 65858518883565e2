//! Minimal XML element tree with a reader and writer.
//!
//! Supports what topology and traffic documents need: nested elements,
//! attributes, self-closing tags, an optional XML declaration, comments and
//! the five predefined entities plus numeric character references. Text
//! content between elements is ignored.

use std::io::Write;

use crate::error::DocumentError;
use crate::model::Identified;
use crate::topology::types::{Leaf, Node};
use crate::traffic::types::{Arrival, Traffic};

/// One XML element with its attributes and child elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing an earlier value for the same key
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }
}

fn syntax_error(message: impl Into<String>) -> DocumentError {
    DocumentError::InputFormat(format!("XML syntax error: {}", message.into()))
}

/// Token types for XML parsing
#[derive(Debug, Clone, PartialEq)]
enum Token {
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Text(String),
    Eof,
}

/// Character level scanner producing tags and text runs
struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();
        Self {
            input: chars,
            position: 0,
            current_char,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, ch)| self.peek(i) == Some(ch))
    }

    fn skip(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip everything up to and including `terminator`
    fn skip_past(&mut self, terminator: &str, what: &str) -> Result<(), DocumentError> {
        while self.current_char.is_some() {
            if self.starts_with(terminator) {
                self.skip(terminator.chars().count());
                return Ok(());
            }
            self.advance();
        }
        Err(syntax_error(format!("Unterminated {}", what)))
    }

    fn read_name(&mut self) -> Result<String, DocumentError> {
        let mut result = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == '.' || ch == ':' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if result.is_empty() {
            return Err(match self.current_char {
                Some(ch) => syntax_error(format!("Expected a name, found '{}'", ch)),
                None => syntax_error("Expected a name, found end of input"),
            });
        }
        Ok(result)
    }

    fn read_entity(&mut self) -> Result<char, DocumentError> {
        self.advance(); // Skip '&'
        let mut entity = String::new();
        while let Some(ch) = self.current_char {
            self.advance();
            if ch == ';' {
                return decode_entity(&entity);
            }
            entity.push(ch);
        }
        Err(syntax_error(format!("Unterminated entity '&{}'", entity)))
    }

    fn read_attribute_value(&mut self) -> Result<String, DocumentError> {
        let quote = match self.current_char {
            Some(ch @ ('"' | '\'')) => ch,
            _ => return Err(syntax_error("Attribute value must be quoted")),
        };
        self.advance();

        let mut result = String::new();
        while let Some(ch) = self.current_char {
            match ch {
                _ if ch == quote => {
                    self.advance();
                    return Ok(result);
                }
                '&' => result.push(self.read_entity()?),
                '<' => return Err(syntax_error("'<' is not allowed in attribute values")),
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(syntax_error("Unterminated attribute value"))
    }

    fn read_start_tag(&mut self) -> Result<Token, DocumentError> {
        self.advance(); // Skip '<'
        let name = self.read_name()?;
        let mut attributes: Vec<(String, String)> = Vec::new();

        loop {
            self.skip_whitespace();
            match self.current_char {
                Some('>') => {
                    self.advance();
                    return Ok(Token::StartTag {
                        name,
                        attributes,
                        self_closing: false,
                    });
                }
                Some('/') => {
                    self.advance();
                    if self.current_char != Some('>') {
                        return Err(syntax_error(format!("Expected '>' after '/' in <{}>", name)));
                    }
                    self.advance();
                    return Ok(Token::StartTag {
                        name,
                        attributes,
                        self_closing: true,
                    });
                }
                Some(_) => {
                    let key = self.read_name()?;
                    self.skip_whitespace();
                    if self.current_char != Some('=') {
                        return Err(syntax_error(format!(
                            "Expected '=' after attribute '{}' in <{}>",
                            key, name
                        )));
                    }
                    self.advance();
                    self.skip_whitespace();
                    let value = self.read_attribute_value()?;

                    if attributes.iter().any(|(k, _)| *k == key) {
                        return Err(syntax_error(format!(
                            "Duplicate attribute '{}' in <{}>",
                            key, name
                        )));
                    }
                    attributes.push((key, value));
                }
                None => return Err(syntax_error(format!("Unterminated tag <{}", name))),
            }
        }
    }

    fn read_end_tag(&mut self) -> Result<Token, DocumentError> {
        self.skip(2); // Skip '</'
        let name = self.read_name()?;
        self.skip_whitespace();
        if self.current_char != Some('>') {
            return Err(syntax_error(format!("Expected '>' to close </{}", name)));
        }
        self.advance();
        Ok(Token::EndTag(name))
    }

    fn read_text(&mut self) -> Result<Token, DocumentError> {
        let mut result = String::new();
        while let Some(ch) = self.current_char {
            match ch {
                '<' => break,
                '&' => result.push(self.read_entity()?),
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }
        Ok(Token::Text(result))
    }

    fn next_token(&mut self) -> Result<Token, DocumentError> {
        loop {
            match self.current_char {
                None => return Ok(Token::Eof),
                Some('<') => {
                    if self.starts_with("<?") {
                        self.skip_past("?>", "processing instruction")?;
                    } else if self.starts_with("<!--") {
                        self.skip_past("-->", "comment")?;
                    } else if self.starts_with("<!") {
                        return Err(syntax_error("DTDs and CDATA sections are not supported"));
                    } else if self.starts_with("</") {
                        return self.read_end_tag();
                    } else {
                        return self.read_start_tag();
                    }
                }
                Some(_) => return self.read_text(),
            }
        }
    }
}

fn decode_entity(entity: &str) -> Result<char, DocumentError> {
    let decoded = match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(decimal) = entity.strip_prefix('#') {
                decimal.parse::<u32>().ok()
            } else {
                None
            };
            code.and_then(char::from_u32)
        }
    };
    decoded.ok_or_else(|| syntax_error(format!("Unknown entity '&{};'", entity)))
}

/// Builds the element tree from the token stream
struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    fn new(mut lexer: Lexer) -> Result<Self, DocumentError> {
        let current_token = lexer.next_token()?;
        Ok(Self {
            lexer,
            current_token,
        })
    }

    fn advance(&mut self) -> Result<(), DocumentError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn skip_text(&mut self) -> Result<(), DocumentError> {
        while let Token::Text(text) = &self.current_token {
            if !text.trim().is_empty() {
                log::debug!("Ignoring XML text content: {:?}", text.trim());
            }
            self.advance()?;
        }
        Ok(())
    }

    fn parse_document(&mut self) -> Result<Element, DocumentError> {
        self.skip_text()?;
        let root = self.parse_element()?;
        self.skip_text()?;

        match &self.current_token {
            Token::Eof => Ok(root),
            token => Err(syntax_error(format!(
                "Unexpected content after the root element: {:?}",
                token
            ))),
        }
    }

    fn parse_element(&mut self) -> Result<Element, DocumentError> {
        let (name, attributes, self_closing) = match &self.current_token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => (name.clone(), attributes.clone(), *self_closing),
            Token::Eof => return Err(syntax_error("Document has no root element")),
            token => return Err(syntax_error(format!("Expected an element, found {:?}", token))),
        };
        self.advance()?;

        let mut element = Element {
            name,
            attributes,
            children: Vec::new(),
        };
        if self_closing {
            return Ok(element);
        }

        loop {
            self.skip_text()?;
            match &self.current_token {
                Token::EndTag(end) if *end == element.name => {
                    self.advance()?;
                    return Ok(element);
                }
                Token::EndTag(end) => {
                    return Err(syntax_error(format!(
                        "Mismatched closing tag </{}> for <{}>",
                        end, element.name
                    )))
                }
                Token::Eof => {
                    return Err(syntax_error(format!("Unclosed element <{}>", element.name)))
                }
                _ => {
                    let child = self.parse_element()?;
                    element.children.push(child);
                }
            }
        }
    }
}

/// Parse an XML document into its root element
pub fn parse(input: &str) -> Result<Element, DocumentError> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse_document()
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Write `element` and its children with two-space indentation
pub fn write<W: Write + ?Sized>(element: &Element, writer: &mut W) -> std::io::Result<()> {
    write_element(element, writer, 0)
}

fn write_element<W: Write + ?Sized>(
    element: &Element,
    writer: &mut W,
    depth: usize,
) -> std::io::Result<()> {
    let indent = "  ".repeat(depth);
    write!(writer, "{}<{}", indent, element.name)?;
    for (key, value) in &element.attributes {
        write!(writer, " {}=\"{}\"", key, escape(value))?;
    }

    if element.children.is_empty() {
        return writeln!(writer, " />");
    }

    writeln!(writer, ">")?;
    for child in &element.children {
        write_element(child, writer, depth + 1)?;
    }
    writeln!(writer, "{}</{}>", indent, element.name)
}

fn leaf_element(leaf: &Leaf) -> Element {
    let mut element =
        Element::new(leaf.kind().name().to_ascii_lowercase()).with_attribute("id", leaf.id());
    for edge in leaf.edges() {
        element.push_child(
            Element::new("edge")
                .with_attribute("id", edge.id())
                .with_attribute("source", edge.source())
                .with_attribute("destination", edge.destination())
                .with_attribute("bandwidth", edge.bandwidth().to_string()),
        );
    }
    element
}

/// Element tree for a topology, children in insertion order
pub fn topology_element(node: &Node) -> Element {
    match node {
        Node::Leaf(leaf) => leaf_element(leaf),
        Node::Topology(topology) => {
            let mut element = Element::new("topology").with_attribute("id", topology.id());
            for child in topology.nodes() {
                element.push_child(topology_element(child));
            }
            element
        }
    }
}

fn arrival_element(arrival: &Arrival) -> Element {
    Element::new("arrival")
        .with_attribute("id", arrival.id())
        .with_attribute("time", arrival.time().to_string())
        .with_attribute("source", arrival.source())
        .with_attribute("destination", arrival.destination())
        .with_attribute("size", arrival.size().to_string())
}

pub fn traffic_element(traffic: &Traffic) -> Element {
    let mut element = Element::new("traffic").with_attribute("id", traffic.id());
    for arrival in traffic.arrivals() {
        element.push_child(arrival_element(arrival));
    }
    element
}

pub fn write_topology<W: Write + ?Sized>(node: &Node, writer: &mut W) -> std::io::Result<()> {
    write(&topology_element(node), writer)
}

pub fn write_traffic<W: Write + ?Sized>(traffic: &Traffic, writer: &mut W) -> std::io::Result<()> {
    write(&traffic_element(traffic), writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let input = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- generated -->
<topology id="lab">
  <host id="a">
    <edge id="a_b_10" source="a" destination="b" bandwidth='10' />
  </host>
  <switch id="b"></switch>
</topology>
"#;
        let root = parse(input).unwrap();
        assert_eq!(root.name(), "topology");
        assert_eq!(root.attribute("id"), Some("lab"));
        assert_eq!(root.children().len(), 2);

        let host = &root.children()[0];
        assert_eq!(host.name(), "host");
        assert_eq!(host.children()[0].attribute("bandwidth"), Some("10"));
        assert_eq!(host.children()[0].attribute("destination"), Some("b"));
        assert!(root.children()[1].children().is_empty());
    }

    #[test]
    fn test_parse_entities() {
        let root = parse(r#"<host id="a&lt;&amp;&gt;&quot;&apos;&#65;&#x42;" />"#).unwrap();
        assert_eq!(root.attribute("id"), Some("a<&>\"'AB"));
        assert!(parse(r#"<host id="&bogus;" />"#).is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("<a>").is_err());
        assert!(parse("<a></b>").is_err());
        assert!(parse("<a id=x />").is_err());
        assert!(parse(r#"<a id="1" id="2" />"#).is_err());
        assert!(parse("<a /><b />").is_err());
        assert!(parse("<!-- never closed").is_err());

        match parse("<a>") {
            Err(DocumentError::InputFormat(message)) => assert!(message.contains("Unclosed")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_write_indents_and_escapes() {
        let mut root = Element::new("topology").with_attribute("id", "a&b");
        root.push_child(Element::new("host").with_attribute("id", "h<1>"));

        let mut buffer = Vec::new();
        write(&root, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(
            text,
            "<topology id=\"a&amp;b\">\n  <host id=\"h&lt;1&gt;\" />\n</topology>\n"
        );
        assert_eq!(parse(&text).unwrap(), root);
    }

    #[test]
    fn test_topology_element_layout() {
        use crate::topology::types::Topology;

        let mut a = Leaf::host("a");
        a.add_edge("b", 10_000_000);
        let mut topology = Topology::new("lab");
        topology.add_node(a);
        topology.add_node(Leaf::switch("b"));

        let mut buffer = Vec::new();
        write_topology(&Node::from(topology), &mut buffer).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "<topology id=\"lab\">\n\
             \x20 <host id=\"a\">\n\
             \x20   <edge id=\"a_b_10000000\" source=\"a\" destination=\"b\" bandwidth=\"10000000\" />\n\
             \x20 </host>\n\
             \x20 <switch id=\"b\" />\n\
             </topology>\n"
        );
    }

    #[test]
    fn test_traffic_element_layout() {
        let mut traffic = Traffic::new("t");
        traffic.add_arrival(Arrival::new(0.25, "a", "b", 512));

        let element = traffic_element(&traffic);
        assert_eq!(element.name(), "traffic");
        let arrival = &element.children()[0];
        assert_eq!(arrival.name(), "arrival");
        assert_eq!(arrival.attribute("id"), Some("0.25_a_b_512"));
        assert_eq!(arrival.attribute("time"), Some("0.25"));
        assert_eq!(arrival.attribute("size"), Some("512"));
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut element = Element::new("edge").with_attribute("id", "x");
        element.set_attribute("id", "y");
        assert_eq!(element.attributes().len(), 1);
        assert_eq!(element.attribute("id"), Some("y"));
    }
}
