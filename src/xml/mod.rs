//! Topology file format.
//!
//! A topology file is an XML document rooted at `<topology linkdefault="...">`
//! holding global `<property>` elements, `<node>` elements (with optional
//! `<stack>` and `<application>` children) and `<link>` elements:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <topology linkdefault="undirected">
//!   <property name="delay_unit" type="string">ms</property>
//!   <node id="0" id.type="int">
//!     <application name="client">
//!       <property name="RemotePort" type="int">9</property>
//!     </application>
//!   </node>
//!   <node id="1" id.type="int"/>
//!   <link>
//!     <from type="int">0</from>
//!     <to type="int">1</to>
//!     <property name="delay" type="int">2</property>
//!   </link>
//! </topology>
//! ```

pub mod lexer;
pub mod reader;
pub mod writer;

pub use reader::{parse_topology, read_topology};
pub use writer::{to_xml_string, write_topology};

/// Errors raised while reading or writing topology files
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("XML syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("Invalid topology document (line {line}): {message}")]
    Schema { line: usize, message: String },
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
