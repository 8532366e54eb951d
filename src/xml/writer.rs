//! Topology file writer.

use log::info;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::topology::{NodeId, Properties, Topology};
use crate::xml::XmlError;

/// Escape text for use in element content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_properties(out: &mut String, properties: &Properties, depth: usize) {
    for (name, value) in properties {
        indent(out, depth);
        let _ = writeln!(
            out,
            "<property name=\"{}\" type=\"{}\">{}</property>",
            escape(name),
            value.type_name(),
            escape(&value.to_string())
        );
    }
}

fn write_endpoint(out: &mut String, side: &str, id: &NodeId) {
    indent(out, 2);
    let _ = writeln!(
        out,
        "<{side} type=\"{}\">{}</{side}>",
        id.type_name(),
        escape(&id.to_string())
    );
}

/// Render a topology as a topology file document
pub fn to_xml_string(topology: &Topology) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let linkdefault = if topology.is_directed() { "directed" } else { "undirected" };
    let _ = writeln!(out, "<topology linkdefault=\"{}\">", linkdefault);

    write_properties(&mut out, &topology.properties, 1);

    for node in topology.nodes() {
        indent(&mut out, 1);
        let _ = write!(
            out,
            "<node id=\"{}\" id.type=\"{}\"",
            escape(&node.id.to_string()),
            node.id.type_name()
        );
        if node.properties.is_empty() && node.stack.is_none() && node.applications.is_empty() {
            out.push_str("/>\n");
            continue;
        }
        out.push_str(">\n");

        write_properties(&mut out, &node.properties, 2);
        if let Some(stack) = &node.stack {
            indent(&mut out, 2);
            let _ = writeln!(out, "<stack name=\"{}\">", escape(&stack.name));
            write_properties(&mut out, &stack.properties, 3);
            indent(&mut out, 2);
            out.push_str("</stack>\n");
        }
        for application in &node.applications {
            indent(&mut out, 2);
            let _ = writeln!(out, "<application name=\"{}\">", escape(&application.name));
            write_properties(&mut out, &application.properties, 3);
            indent(&mut out, 2);
            out.push_str("</application>\n");
        }
        indent(&mut out, 1);
        out.push_str("</node>\n");
    }

    for link in topology.links() {
        indent(&mut out, 1);
        out.push_str("<link>\n");
        write_endpoint(&mut out, "from", &link.from);
        write_endpoint(&mut out, "to", &link.to);
        write_properties(&mut out, &link.properties, 2);
        indent(&mut out, 1);
        out.push_str("</link>\n");
    }

    out.push_str("</topology>\n");
    out
}

/// Write a topology file
pub fn write_topology(topology: &Topology, path: &Path) -> Result<(), XmlError> {
    fs::write(path, to_xml_string(topology)).map_err(|source| XmlError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(
        "Wrote topology with {} nodes and {} links to {:?}",
        topology.node_count(),
        topology.edge_count(),
        path
    );
    Ok(())
}
