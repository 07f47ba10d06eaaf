use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use tm_generator::TypeName;
use tm_xsd::QName;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Rust source with serde attributes
    #[cfg(feature = "render-rust")]
    Rust,
    /// The code model itself
    Json,
}

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    #[clap(required = true, help = "The schema documents, compiled together")]
    pub input: Vec<PathBuf>,

    #[clap(long, help = "Allow a XML Document Type Definition (DTD) to occur")]
    pub allow_dtd: bool,

    #[clap(
        long = "map-namespace",
        value_name = "XML=OUT",
        value_parser = parse_namespace_mapping,
        help = "Map an XML namespace to an output namespace (empty XML namespace for none)"
    )]
    pub namespace_mappings: Vec<(String, String)>,

    #[clap(
        long = "existing-type",
        value_name = "{NS}LOCAL=OUT.NAME",
        value_parser = parse_existing_type,
        help = "Use an existing type instead of generating one for a global type or element"
    )]
    pub existing_types: Vec<(QName, TypeName)>,

    #[clap(long, value_enum, default_value_t = Format::default())]
    pub format: Format,

    #[clap(short, long, action = ArgAction::Count, help = "Log more; repeat for more detail")]
    pub verbose: u8,
}

impl Default for Format {
    #[cfg(feature = "render-rust")]
    fn default() -> Self {
        Self::Rust
    }

    #[cfg(not(feature = "render-rust"))]
    fn default() -> Self {
        Self::Json
    }
}

fn parse_namespace_mapping(value: &str) -> Result<(String, String), String> {
    let (xml, output) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected XML=OUT, got `{value}`"))?;
    Ok((xml.to_string(), output.to_string()))
}

fn parse_existing_type(value: &str) -> Result<(QName, TypeName), String> {
    let (xml, output) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected {{NS}}LOCAL=OUT.NAME, got `{value}`"))?;
    let xml = QName::from_clark(xml).ok_or_else(|| format!("invalid XML name `{xml}`"))?;
    let output = TypeName::parse(output).ok_or_else(|| format!("invalid type name `{output}`"))?;
    Ok((xml, output))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_mapping_splits_at_last_equals_sign() {
        assert_eq!(
            parse_namespace_mapping("urn:a=b=Gen").unwrap(),
            ("urn:a=b".to_string(), "Gen".to_string())
        );
        assert_eq!(
            parse_namespace_mapping("=Default").unwrap(),
            (String::new(), "Default".to_string())
        );
        assert!(parse_namespace_mapping("Gen").is_err());
    }

    #[test]
    fn existing_type_uses_clark_notation() {
        let (xml, output) = parse_existing_type("{urn:t}Person=Model.Person").unwrap();
        assert_eq!(xml, QName::with_namespace("urn:t", "Person"));
        assert_eq!(output.to_string(), "Model.Person");
        assert!(parse_existing_type("{urn:t}Person").is_err());
        assert!(parse_existing_type("{urn:t=Model.Person").is_err());
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from([
            "tm-generator",
            "a.xsd",
            "--map-namespace",
            "urn:t=Gen",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.input, [PathBuf::from("a.xsd")]);
        assert_eq!(cli.namespace_mappings.len(), 1);
        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.verbose, 2);
    }
}
