//! Topology file reader.

use log::{debug, info, warn};
use std::fs;
use std::path::Path;

use crate::topology::{Application, Link, NodeId, Properties, PropertyValue, Stack, Topology};
use crate::xml::lexer::{Lexer, Token};
use crate::xml::XmlError;

/// A parsed XML element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
    pub line: usize,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Builds an element tree from lexer tokens
struct Parser {
    lexer: Lexer,
    current_token: Token,
    line: usize,
}

impl Parser {
    fn new(mut lexer: Lexer) -> Result<Self, XmlError> {
        let line = lexer.position().line;
        let current_token = lexer.next_token()?;
        Ok(Self { lexer, current_token, line })
    }

    fn advance(&mut self) -> Result<(), XmlError> {
        self.line = self.lexer.position().line;
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> XmlError {
        let position = self.lexer.position();
        XmlError::Syntax {
            line: position.line,
            column: position.column,
            message: message.into(),
        }
    }

    fn skip_blank_text(&mut self) -> Result<(), XmlError> {
        while let Token::Text(text) = &self.current_token {
            if !text.trim().is_empty() {
                return Err(self.error(format!("Unexpected text outside the root element: '{}'", text.trim())));
            }
            self.advance()?;
        }
        Ok(())
    }

    fn parse_document(&mut self) -> Result<Element, XmlError> {
        self.skip_blank_text()?;
        let root = self.parse_element()?;
        self.skip_blank_text()?;
        match &self.current_token {
            Token::Eof => Ok(root),
            other => Err(self.error(format!("Unexpected content after the root element: {:?}", other))),
        }
    }

    fn parse_element(&mut self) -> Result<Element, XmlError> {
        let (name, attributes, self_closing) = match &self.current_token {
            Token::StartTag { name, attributes, self_closing } => (name.clone(), attributes.clone(), *self_closing),
            other => return Err(self.error(format!("Expected an element, found {:?}", other))),
        };
        let line = self.line;
        self.advance()?;

        let mut element = Element {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
            line,
        };
        if self_closing {
            return Ok(element);
        }

        loop {
            match &self.current_token {
                Token::StartTag { .. } => element.children.push(self.parse_element()?),
                Token::Text(text) => {
                    element.text.push_str(text);
                    self.advance()?;
                }
                Token::EndTag(end) => {
                    if *end != element.name {
                        return Err(self.error(format!(
                            "Mismatched closing tag: expected </{}>, found </{}>",
                            element.name, end
                        )));
                    }
                    self.advance()?;
                    return Ok(element);
                }
                Token::Eof => return Err(self.error(format!("Unclosed element <{}>", element.name))),
            }
        }
    }
}

fn schema(element: &Element, message: impl Into<String>) -> XmlError {
    XmlError::Schema {
        line: element.line,
        message: message.into(),
    }
}

fn parse_property(element: &Element) -> Result<(String, PropertyValue), XmlError> {
    let name = element
        .attr("name")
        .ok_or_else(|| schema(element, "<property> is missing the 'name' attribute"))?;
    let type_name = element.attr("type").unwrap_or("string");
    let value = PropertyValue::parse(type_name, &element.text)
        .map_err(|e| schema(element, format!("property '{}': {}", name, e)))?;
    Ok((name.to_string(), value))
}

fn parse_properties(element: &Element) -> Result<Properties, XmlError> {
    let mut properties = Properties::new();
    for child in &element.children {
        if child.name == "property" {
            let (key, value) = parse_property(child)?;
            properties.insert(key, value);
        } else {
            warn!("Skipping unexpected <{}> inside <{}> (line {})", child.name, element.name, child.line);
        }
    }
    Ok(properties)
}

fn parse_node_id(element: &Element, text: &str, type_name: Option<&str>) -> Result<NodeId, XmlError> {
    match type_name {
        Some(type_name) => NodeId::parse(type_name, text).map_err(|e| schema(element, e.to_string())),
        None => Ok(NodeId::infer(text)),
    }
}

fn parse_endpoint(element: &Element, side: &str) -> Result<NodeId, XmlError> {
    if let Some(child) = element.child(side) {
        return parse_node_id(child, &child.text, child.attr("type"));
    }
    if let Some(value) = element.attr(side) {
        let type_key = format!("{}.type", side);
        return parse_node_id(element, value, element.attr(&type_key));
    }
    Err(schema(element, format!("<link> has no '{}' endpoint", side)))
}

fn parse_node(element: &Element, topology: &mut Topology) -> Result<(), XmlError> {
    let raw_id = element
        .attr("id")
        .ok_or_else(|| schema(element, "<node> is missing the 'id' attribute"))?;
    let id = parse_node_id(element, raw_id, element.attr("id.type"))?;
    if topology.has_node(&id) {
        return Err(schema(element, format!("Duplicate node id '{}'", id)));
    }

    let node = topology.add_node(id);
    for child in &element.children {
        match child.name.as_str() {
            "property" => {
                let (key, value) = parse_property(child)?;
                node.properties.insert(key, value);
            }
            "stack" => {
                let name = child
                    .attr("name")
                    .ok_or_else(|| schema(child, "<stack> is missing the 'name' attribute"))?;
                node.stack = Some(Stack {
                    name: name.to_string(),
                    properties: parse_properties(child)?,
                });
            }
            "application" => {
                let name = child
                    .attr("name")
                    .ok_or_else(|| schema(child, "<application> is missing the 'name' attribute"))?;
                node.applications.push(Application {
                    name: name.to_string(),
                    properties: parse_properties(child)?,
                });
            }
            other => warn!("Skipping unexpected <{}> inside <node> (line {})", other, child.line),
        }
    }
    Ok(())
}

fn parse_link(element: &Element) -> Result<(Link, usize), XmlError> {
    let from = parse_endpoint(element, "from")?;
    let to = parse_endpoint(element, "to")?;

    let mut properties = Properties::new();
    for child in &element.children {
        match child.name.as_str() {
            "property" => {
                let (key, value) = parse_property(child)?;
                properties.insert(key, value);
            }
            "from" | "to" => {}
            other => warn!("Skipping unexpected <{}> inside <link> (line {})", other, child.line),
        }
    }
    Ok((Link { from, to, properties }, element.line))
}

/// Interpret a parsed document as a topology
pub fn topology_from_element(root: &Element) -> Result<Topology, XmlError> {
    if root.name != "topology" {
        return Err(schema(root, format!("Root element must be <topology>, found <{}>", root.name)));
    }

    let mut topology = match root.attr("linkdefault") {
        None | Some("undirected") => Topology::new(),
        Some("directed") => Topology::new_directed(),
        Some(other) => return Err(schema(root, format!("Unknown linkdefault '{}'", other))),
    };

    let mut links = Vec::new();
    for child in &root.children {
        match child.name.as_str() {
            "property" => {
                let (key, value) = parse_property(child)?;
                topology.properties.insert(key, value);
            }
            "node" => parse_node(child, &mut topology)?,
            "link" => links.push(parse_link(child)?),
            other => warn!("Skipping unexpected <{}> inside <topology> (line {})", other, child.line),
        }
    }

    // links may precede the nodes they reference
    for (link, line) in links {
        for endpoint in [&link.from, &link.to] {
            if !topology.has_node(endpoint) {
                return Err(XmlError::Schema {
                    line,
                    message: format!("Link references undeclared node '{}'", endpoint),
                });
            }
        }
        debug!("Link {} -> {} with {} properties", link.from, link.to, link.properties.len());
        topology
            .add_edge(link.from, link.to)
            .properties
            .extend(link.properties);
    }

    Ok(topology)
}

/// Parse a topology document from a string
pub fn parse_topology(content: &str) -> Result<Topology, XmlError> {
    let mut parser = Parser::new(Lexer::new(content))?;
    let root = parser.parse_document()?;
    topology_from_element(&root)
}

/// Read a topology file
pub fn read_topology(path: &Path) -> Result<Topology, XmlError> {
    info!("Reading topology from: {:?}", path);
    let content = fs::read_to_string(path).map_err(|source| XmlError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let topology = parse_topology(&content)?;
    info!(
        "Loaded topology with {} nodes and {} links",
        topology.node_count(),
        topology.edge_count()
    );
    Ok(topology)
}
