//! Evidence Command
//!
//! Collects evidence documents for a repository and chunks them to a token budget.
//!
//! Usage:
//!   codesurface evidence [PATH] [--brief FILE] [--budget N] [-f json|yaml|text]

use std::path::PathBuf;

use crate::analyzer::Tier1Aggregator;
use crate::cli::CommandContext;
use crate::cli::ui::{Output, OutputFormat};
use crate::evidence::{ChunkedEvidenceSet, EvidenceChunker, EvidenceCollector};
use crate::types::{Result, SurfaceError};

pub struct EvidenceArgs {
    pub brief: Option<PathBuf>,
    pub budget: Option<usize>,
    pub format: OutputFormat,
}

pub fn run(ctx: &CommandContext, args: EvidenceArgs) -> Result<()> {
    let evidence = &ctx.config.evidence;
    let budget = args.budget.unwrap_or(evidence.token_budget);
    if budget == 0 {
        return Err(SurfaceError::InvalidBudget(
            "--budget must be greater than 0".to_string(),
        ));
    }

    let model = Tier1Aggregator::new(ctx.config.analysis.clone()).aggregate(&ctx.root)?;

    let mut collector = EvidenceCollector::from_config(&ctx.root, evidence);
    if let Some(brief) = args.brief {
        collector = collector.with_brief(brief);
    }
    let documents = collector.collect(Some(&model));

    let set = EvidenceChunker::from_config(evidence)?.chunk(documents, budget);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&set)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&set)?),
        OutputFormat::Text => print_text(&set),
        OutputFormat::Toml => {
            return Err(SurfaceError::Config(
                "toml output is only available for `config show`".to_string(),
            ));
        }
    }
    Ok(())
}

fn print_text(set: &ChunkedEvidenceSet) {
    let out = Output::new();
    out.header("Evidence");
    out.section("Documents", set.kept());
    for doc in &set.documents {
        let marker = if set.truncated_id.as_deref() == Some(doc.id.as_str()) {
            " (truncated)"
        } else {
            ""
        };
        out.item(&format!(
            "{:<18} {:<40} {} chars{}",
            doc.doc_type,
            doc.title,
            doc.char_len(),
            marker
        ));
    }

    println!();
    if set.dropped() > 0 {
        out.warning(&format!(
            "{} of {} documents dropped to fit the budget",
            set.dropped(),
            set.total_documents
        ));
    }
    out.success(&format!(
        "~{} / {} tokens",
        set.estimated_tokens, set.token_budget
    ));
}
