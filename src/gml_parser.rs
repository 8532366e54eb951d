//! GML graph import.
//!
//! Parses `graph [ node [...] edge [...] ]` documents and converts them into
//! a [`Topology`]. Nested lists other than `node`/`edge` (e.g. `graphics`)
//! are skipped.

use color_eyre::eyre::{eyre, Result};
use log::{debug, info};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::topology::{Properties, PropertyValue, Topology};

/// GML node with its typed attributes
#[derive(Debug, Clone)]
pub struct GmlNode {
    pub id: i64,
    pub label: Option<String>,
    pub attributes: Properties,
}

/// GML edge between two node ids
#[derive(Debug, Clone)]
pub struct GmlEdge {
    pub source: i64,
    pub target: i64,
    pub attributes: Properties,
}

/// Graph read from a GML document, before conversion to a topology
#[derive(Debug, Clone)]
pub struct GmlGraph {
    pub directed: bool,
    pub nodes: Vec<GmlNode>,
    pub edges: Vec<GmlEdge>,
    pub attributes: Properties,
}

impl GmlGraph {
    /// Convert into a topology
    ///
    /// Node labels become a `label` node property; all other attributes
    /// are copied as node, link or global properties.
    pub fn into_topology(self) -> Result<Topology> {
        validate_graph(&self).map_err(|e| eyre!("Invalid GML graph: {}", e))?;

        let mut topology = if self.directed { Topology::new_directed() } else { Topology::new() };
        topology.properties = self.attributes;

        for node in self.nodes {
            let entry = topology.add_node(node.id);
            entry.properties = node.attributes;
            if let Some(label) = node.label {
                entry.set("label", label);
            }
        }
        for edge in self.edges {
            topology
                .add_edge(edge.source, edge.target)
                .properties
                .extend(edge.attributes);
        }

        info!(
            "Imported GML graph with {} nodes and {} links",
            topology.node_count(),
            topology.edge_count()
        );
        Ok(topology)
    }
}

/// Token types for GML parsing
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    Number(String),
    String(String),
    LeftBracket,
    RightBracket,
    Eof,
}

/// Character-level GML tokenizer
struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
    line: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();
        Self {
            input: chars,
            position: 0,
            current_char,
            line: 1,
        }
    }

    fn advance(&mut self) {
        if self.current_char == Some('\n') {
            self.line += 1;
        }
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char, Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_string(&mut self) -> Result<String> {
        let start_line = self.line;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    match self.current_char {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('"') => result.push('"'),
                        Some('\\') => result.push('\\'),
                        Some(other) => {
                            result.push('\\');
                            result.push(other);
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(eyre!("Unterminated string literal starting on line {}", start_line))
    }

    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || matches!(ch, '_' | '.' | '-' | '+') {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn next_token(&mut self) -> Result<Token> {
        loop {
            self.skip_whitespace();

            match self.current_char {
                None => return Ok(Token::Eof),
                Some('#') => self.skip_comment(),
                Some('[') => {
                    self.advance();
                    return Ok(Token::LeftBracket);
                }
                Some(']') => {
                    self.advance();
                    return Ok(Token::RightBracket);
                }
                Some('"') => return Ok(Token::String(self.read_string()?)),
                Some(ch) if ch.is_alphabetic() || ch == '_' => return Ok(Token::Identifier(self.read_word())),
                Some(ch) if ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.') => {
                    return Ok(Token::Number(self.read_word()))
                }
                Some(ch) => return Err(eyre!("Unexpected character '{}' on line {}", ch, self.line)),
            }
        }
    }
}

/// Parser for GML format
struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    fn new(mut lexer: Lexer) -> Result<Self> {
        let current_token = lexer.next_token()?;
        Ok(Self { lexer, current_token })
    }

    fn advance(&mut self) -> Result<()> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.current_token == expected {
            self.advance()
        } else {
            Err(eyre!(
                "Expected {:?}, found {:?} on line {}",
                expected,
                self.current_token,
                self.lexer.line
            ))
        }
    }

    fn expect_key(&mut self) -> Result<String> {
        match &self.current_token {
            Token::Identifier(key) => {
                let key = key.clone();
                self.advance()?;
                Ok(key)
            }
            other => Err(eyre!("Expected a key, found {:?} on line {}", other, self.lexer.line)),
        }
    }

    /// Parse a scalar value; nested lists are skipped and yield `None`
    fn parse_value(&mut self) -> Result<Option<PropertyValue>> {
        let value = match &self.current_token {
            Token::Number(raw) => {
                if let Ok(v) = raw.parse::<i64>() {
                    PropertyValue::Int(v)
                } else if let Ok(v) = raw.parse::<f64>() {
                    PropertyValue::Float(v)
                } else {
                    PropertyValue::Str(raw.clone())
                }
            }
            Token::Identifier(raw) | Token::String(raw) => PropertyValue::Str(raw.clone()),
            Token::LeftBracket => {
                self.skip_list()?;
                return Ok(None);
            }
            other => return Err(eyre!("Expected value, found {:?} on line {}", other, self.lexer.line)),
        };
        self.advance()?;
        Ok(Some(value))
    }

    fn skip_list(&mut self) -> Result<()> {
        self.expect(Token::LeftBracket)?;
        let mut depth = 1;
        while depth > 0 {
            match self.current_token {
                Token::LeftBracket => depth += 1,
                Token::RightBracket => depth -= 1,
                Token::Eof => return Err(eyre!("Unterminated list")),
                _ => {}
            }
            self.advance()?;
        }
        Ok(())
    }

    /// Parse `[ key value ... ]`, returning the attributes in order
    fn parse_block(&mut self) -> Result<Vec<(String, PropertyValue)>> {
        self.expect(Token::LeftBracket)?;
        let mut attributes = Vec::new();
        while self.current_token != Token::RightBracket {
            let key = self.expect_key()?;
            match self.parse_value()? {
                Some(value) => attributes.push((key, value)),
                None => debug!("Skipping nested GML list '{}'", key),
            }
        }
        self.expect(Token::RightBracket)?;
        Ok(attributes)
    }

    fn parse_node(&mut self) -> Result<GmlNode> {
        let mut id = None;
        let mut label = None;
        let mut attributes = Properties::new();

        for (key, value) in self.parse_block()? {
            match key.as_str() {
                "id" => {
                    id = Some(value.as_i64().ok_or_else(|| eyre!("Invalid node id: {}", value))?);
                }
                "label" => label = Some(value.to_string()),
                _ => {
                    attributes.insert(key, value);
                }
            }
        }

        let id = id.ok_or_else(|| eyre!("Node missing required 'id' attribute"))?;
        Ok(GmlNode { id, label, attributes })
    }

    fn parse_edge(&mut self) -> Result<GmlEdge> {
        let mut source = None;
        let mut target = None;
        let mut attributes = Properties::new();

        for (key, value) in self.parse_block()? {
            match key.as_str() {
                "source" => {
                    source = Some(value.as_i64().ok_or_else(|| eyre!("Invalid edge source: {}", value))?);
                }
                "target" => {
                    target = Some(value.as_i64().ok_or_else(|| eyre!("Invalid edge target: {}", value))?);
                }
                _ => {
                    attributes.insert(key, value);
                }
            }
        }

        let source = source.ok_or_else(|| eyre!("Edge missing required 'source' attribute"))?;
        let target = target.ok_or_else(|| eyre!("Edge missing required 'target' attribute"))?;
        Ok(GmlEdge { source, target, attributes })
    }

    fn parse_graph(&mut self) -> Result<GmlGraph> {
        // files written by some tools carry top-level keys before `graph`
        while self.current_token != Token::Identifier("graph".to_string()) {
            if self.current_token == Token::Eof {
                return Err(eyre!("No 'graph' list found"));
            }
            self.expect_key()?;
            self.parse_value()?;
        }
        self.advance()?;
        self.expect(Token::LeftBracket)?;

        let mut graph = GmlGraph {
            directed: false,
            nodes: Vec::new(),
            edges: Vec::new(),
            attributes: Properties::new(),
        };

        while self.current_token != Token::RightBracket {
            let keyword = self.expect_key()?;
            match keyword.as_str() {
                "node" => graph.nodes.push(self.parse_node()?),
                "edge" => graph.edges.push(self.parse_edge()?),
                "directed" => {
                    graph.directed = matches!(self.parse_value()?, Some(PropertyValue::Int(1)));
                }
                _ => {
                    if let Some(value) = self.parse_value()? {
                        graph.attributes.insert(keyword, value);
                    }
                }
            }
        }

        self.expect(Token::RightBracket)?;
        Ok(graph)
    }
}

/// Parse GML content into a GmlGraph
pub fn parse_gml_str(content: &str) -> Result<GmlGraph> {
    let mut parser = Parser::new(Lexer::new(content))?;
    parser.parse_graph()
}

/// Read and parse a GML file
pub fn parse_gml_file(path: &Path) -> Result<GmlGraph> {
    let content = fs::read_to_string(path)
        .map_err(|e| eyre!("Failed to read GML file '{}': {}", path.display(), e))?;
    parse_gml_str(&content)
}

/// Read a GML file straight into a topology
pub fn read_gml_topology(path: &Path) -> Result<Topology> {
    info!("Importing GML graph from: {:?}", path);
    parse_gml_file(path)?.into_topology()
}

/// Check for duplicate node ids and edges referencing unknown nodes
pub fn validate_graph(graph: &GmlGraph) -> Result<(), String> {
    let mut node_ids = HashSet::new();
    for node in &graph.nodes {
        if !node_ids.insert(node.id) {
            return Err(format!("Duplicate node ID: {}", node.id));
        }
    }

    for edge in &graph.edges {
        if !node_ids.contains(&edge.source) {
            return Err(format!("Edge references non-existent source node: {}", edge.source));
        }
        if !node_ids.contains(&edge.target) {
            return Err(format!("Edge references non-existent target node: {}", edge.target));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::NodeId;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_simple_gml() {
        let gml_content = r#"
            graph [
                node [ id 0 ]
                node [ id 1 label "Node1" ]
                edge [ source 0 target 1 ]
            ]
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", gml_content).unwrap();

        let graph = parse_gml_file(temp_file.path()).unwrap();

        assert!(!graph.directed);
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.nodes[1].label, Some("Node1".to_string()));
        assert_eq!(graph.edges[0].source, 0);
        assert_eq!(graph.edges[0].target, 1);
    }

    #[test]
    fn test_typed_attributes() {
        let graph = parse_gml_str(
            r#"
            # exported by a topology zoo tool
            Creator "zoo"
            graph [
                directed 1
                Network "Abilene"
                node [ id 0 Latitude 40.71 Internal 1 Country "US" graphics [ x 1 y 2 ] ]
                node [ id 1 ]
                edge [ source 0 target 1 LinkSpeed "10" delay 2.5 ]
            ]
            "#,
        )
        .unwrap();

        assert!(graph.directed);
        assert_eq!(graph.attributes.get("Network"), Some(&PropertyValue::from("Abilene")));
        let node = &graph.nodes[0];
        assert_eq!(node.attributes.get("Latitude"), Some(&PropertyValue::Float(40.71)));
        assert_eq!(node.attributes.get("Internal"), Some(&PropertyValue::Int(1)));
        assert_eq!(node.attributes.get("Country"), Some(&PropertyValue::from("US")));
        assert!(!node.attributes.contains_key("graphics"));
        assert_eq!(graph.edges[0].attributes.get("LinkSpeed"), Some(&PropertyValue::from("10")));
        assert_eq!(graph.edges[0].attributes.get("delay"), Some(&PropertyValue::Float(2.5)));
    }

    #[test]
    fn test_into_topology() {
        let topology = parse_gml_str(
            r#"graph [
                node [ id 0 label "a" ]
                node [ id 1 label "b" ]
                node [ id 2 ]
                edge [ source 0 target 1 weight 3 ]
                edge [ source 1 target 2 ]
                edge [ source 1 target 0 ]
            ]"#,
        )
        .unwrap()
        .into_topology()
        .unwrap();

        assert!(!topology.is_directed());
        assert_eq!(topology.node_count(), 3);
        assert_eq!(topology.edge_count(), 2);
        assert_eq!(
            topology.node(&NodeId::Int(0)).unwrap().get("label"),
            Some(&PropertyValue::from("a"))
        );
        assert_eq!(
            topology.edge(&NodeId::Int(1), &NodeId::Int(0)).unwrap().get("weight"),
            Some(&PropertyValue::Int(3))
        );
    }

    #[test]
    fn test_validate_graph() {
        let duplicate = parse_gml_str("graph [ node [ id 0 ] node [ id 0 ] ]").unwrap();
        assert!(validate_graph(&duplicate).is_err());
        assert!(duplicate.into_topology().is_err());

        let dangling = parse_gml_str("graph [ node [ id 0 ] edge [ source 0 target 9 ] ]").unwrap();
        assert!(validate_graph(&dangling).is_err());
    }

    #[test]
    fn test_malformed_gml() {
        assert!(parse_gml_str("graph [ node [ id 0 ]").is_err());
        assert!(parse_gml_str("graph [ node [ label \"x\" ] ]").is_err());
        assert!(parse_gml_str("graph [ edge [ source 0 ] ]").is_err());
        assert!(parse_gml_str("graph [ node [ id \"zero\" ] ]").is_err());
        assert!(parse_gml_str("graph [ node [ id 0 label \"open ] ]").is_err());
        assert!(parse_gml_str("nodes [ ]").is_err());
    }
}
