//! Reading and writing topology and traffic documents.
//!
//! Input documents are JSON or XML, picked by file extension. Output can
//! also be a console tree, and for topologies an OMNeT++/INET network.

pub mod console;
pub mod document;
pub mod json;
pub mod ned;
pub mod xml;

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::error::DocumentError;
use crate::topology::types::Node;
use crate::traffic::types::Traffic;

pub use document::{decode_topology, decode_traffic, DocumentNode};

/// Supported input document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Json,
    Xml,
}

impl InputType {
    /// Detect the format from the file extension, ignoring case
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("xml") => Ok(Self::Xml),
            _ => Err(DocumentError::InputFormat(format!(
                "Cannot detect the format of '{}', expected a .json or .xml file",
                path.display()
            ))),
        }
    }
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputType {
    #[default]
    Console,
    Json,
    Xml,
    /// OMNeT++/INET network, topologies only
    Omnest,
}

impl OutputType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Omnest => "omnest",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn read_document(path: &Path) -> Result<(InputType, String), DocumentError> {
    let input = InputType::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes of {:?} from {}", text.len(), input, path.display());
    Ok((input, text))
}

fn parse_json(text: &str) -> Result<Value, DocumentError> {
    serde_json::from_str(text).map_err(|e| DocumentError::InputFormat(format!("Invalid JSON: {}", e)))
}

/// Parse topology document text in the given format
pub fn parse_topology(text: &str, input: InputType) -> Result<Node, DocumentError> {
    match input {
        InputType::Json => decode_topology(&parse_json(text)?),
        InputType::Xml => decode_topology(&xml::parse(text)?),
    }
}

/// Parse traffic document text in the given format
pub fn parse_traffic(text: &str, input: InputType) -> Result<Traffic, DocumentError> {
    match input {
        InputType::Json => decode_traffic(&parse_json(text)?),
        InputType::Xml => decode_traffic(&xml::parse(text)?),
    }
}

/// Load a topology from a `.json` or `.xml` file
pub fn read_topology(path: &Path) -> Result<Node, DocumentError> {
    let (input, text) = read_document(path)?;
    parse_topology(&text, input)
}

/// Load traffic from a `.json` or `.xml` file
pub fn read_traffic(path: &Path) -> Result<Traffic, DocumentError> {
    let (input, text) = read_document(path)?;
    parse_traffic(&text, input)
}

pub fn write_topology<W: Write + ?Sized>(
    node: &Node,
    output: OutputType,
    writer: &mut W,
) -> Result<(), DocumentError> {
    match output {
        OutputType::Console => console::write_topology(node, writer)?,
        OutputType::Json => json::write_topology(node, writer)?,
        OutputType::Xml => xml::write_topology(node, writer)?,
        OutputType::Omnest => ned::write_topology(node, writer)?,
    }
    Ok(())
}

pub fn write_traffic<W: Write + ?Sized>(
    traffic: &Traffic,
    output: OutputType,
    writer: &mut W,
) -> Result<(), DocumentError> {
    match output {
        OutputType::Console => console::write_traffic(traffic, writer)?,
        OutputType::Json => json::write_traffic(traffic, writer)?,
        OutputType::Xml => xml::write_traffic(traffic, writer)?,
        OutputType::Omnest => {
            return Err(DocumentError::UnsupportedOutput {
                output: OutputType::Omnest.name(),
                document: "traffic",
            })
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Identified;
    use crate::traffic::types::Arrival;
    use std::path::PathBuf;

    #[test]
    fn test_input_type_detection() {
        assert_eq!(InputType::from_path(Path::new("a.json")).unwrap(), InputType::Json);
        assert_eq!(InputType::from_path(Path::new("dir/a.JSON")).unwrap(), InputType::Json);
        assert_eq!(InputType::from_path(Path::new("a.Xml")).unwrap(), InputType::Xml);
        assert!(matches!(
            InputType::from_path(Path::new("a.yaml")),
            Err(DocumentError::InputFormat(_))
        ));
        assert!(InputType::from_path(Path::new("noextension")).is_err());
    }

    #[test]
    fn test_missing_file() {
        let path = PathBuf::from("/nonexistent/topology.json");
        assert!(matches!(read_topology(&path), Err(DocumentError::Io { .. })));
    }

    #[test]
    fn test_invalid_json_is_input_format_error() {
        assert!(matches!(
            parse_topology("{not json", InputType::Json),
            Err(DocumentError::InputFormat(_))
        ));
        assert!(matches!(
            parse_traffic("<traffic", InputType::Xml),
            Err(DocumentError::InputFormat(_))
        ));
    }

    #[test]
    fn test_traffic_rejects_omnest() {
        let mut traffic = Traffic::new("t");
        traffic.add_arrival(Arrival::new(1.0, "a", "b", 512));

        let mut buffer = Vec::new();
        assert!(matches!(
            write_traffic(&traffic, OutputType::Omnest, &mut buffer),
            Err(DocumentError::UnsupportedOutput { .. })
        ));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_traffic_round_trip_through_text() {
        let mut traffic = Traffic::new("t");
        traffic.add_arrival(Arrival::new(1.5, "a", "b", 900));
        traffic.add_arrival(Arrival::new(2.0, "b", "a", 512));

        for output in [OutputType::Json, OutputType::Xml] {
            let mut buffer = Vec::new();
            write_traffic(&traffic, output, &mut buffer).unwrap();
            let text = String::from_utf8(buffer).unwrap();

            let input = if output == OutputType::Json { InputType::Json } else { InputType::Xml };
            let decoded = parse_traffic(&text, input).unwrap();
            assert_eq!(decoded, traffic);
            assert_eq!(decoded.id(), "t");
        }
    }
}
