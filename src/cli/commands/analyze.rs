//! Analyze Command
//!
//! Runs the Tier-1 aggregator and prints the technical model.
//!
//! Usage:
//!   codesurface analyze [PATH] [-f json|yaml|text]

use crate::analyzer::Tier1Aggregator;
use crate::cli::CommandContext;
use crate::cli::ui::{Output, OutputFormat};
use crate::types::{Result, SurfaceError, TechnicalModel};

pub fn run(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    let model = Tier1Aggregator::new(ctx.config.analysis.clone()).aggregate(&ctx.root)?;
    print_model(&model, format)
}

pub fn print_model(model: &TechnicalModel, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(model)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(model)?),
        OutputFormat::Text => print_text(model),
        OutputFormat::Toml => {
            return Err(SurfaceError::Config(
                "toml output is only available for `config show`".to_string(),
            ));
        }
    }
    Ok(())
}

fn print_text(model: &TechnicalModel) {
    let out = Output::new();
    out.header(&format!("{} ({} files)", model.project_name, model.file_count));
    if !model.stack_detected.is_empty() {
        out.info(&format!("Stack: {}", model.stack_detected.join(", ")));
    }

    out.section("Screens", model.screens.len());
    for s in &model.screens {
        out.item(&format!("{:<24} {:<28} {}", s.name, s.purpose, s.path));
    }

    out.section("Navigation", model.navigation.len());
    for n in &model.navigation {
        let cond = n.condition.as_deref().map(|c| format!(" [{}]", c)).unwrap_or_default();
        out.item(&format!("{:<24} {}{}", n.label, n.path, cond));
    }

    out.section("API endpoints", model.api_endpoints.len());
    for e in &model.api_endpoints {
        out.item(&format!("{:<7} {:<32} {}", e.method, e.endpoint, e.handler));
    }

    out.section("Data model", model.data_model.len());
    for (name, entity) in &model.data_model {
        let fields: Vec<&str> = entity.fields.keys().map(String::as_str).collect();
        out.item(&format!("{}: {}", name, fields.join(", ")));
    }

    out.section("State", model.state_patterns.len());
    for p in &model.state_patterns {
        out.item(&format!("{:<12} {:<24} {}", p.kind, p.stores.join(", "), p.location));
    }

    out.section("Events", model.events.len());
    for e in &model.events {
        out.item(&format!("{:<16} {}", e.trigger, e.location));
    }

    println!();
    out.success(&model.extraction_notes);
}
