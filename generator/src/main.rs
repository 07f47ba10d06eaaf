mod cli;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tm_generator::CodeModelBuilder;
use tm_xsd::ReadOptions;

fn init_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    let texts = cli
        .input
        .iter()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let texts = texts.iter().map(String::as_str).collect::<Vec<_>>();

    let options = ReadOptions {
        allow_dtd: cli.allow_dtd,
    };
    let graph = tm_xsd::read_schemas(&texts, options).context("failed to read the schema")?;
    debug!(
        types = graph.type_definitions().len(),
        elements = graph.element_declarations().len(),
        "schema read"
    );

    let mut builder = CodeModelBuilder::new();
    for (xml, output) in cli.namespace_mappings {
        builder.map_namespace(xml, output);
    }
    for (xml, output) in cli.existing_types {
        builder.add_existing_type(xml, output);
    }
    let model = builder
        .build(&graph)
        .context("failed to derive the code model")?;
    info!(
        namespaces = model.namespaces.len(),
        classes = model.classes().count(),
        "code model derived"
    );

    let output = match cli.format {
        #[cfg(feature = "render-rust")]
        cli::Format::Rust => tm_generator::render::rust::render(&model),
        cli::Format::Json => serde_json::to_string_pretty(&model)?,
    };
    print!("{output}");
    Ok(())
}
