use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, info_span, warn};

use sdq_client::{ChildSuggestion, HttpScenarioApi, ScenarioApi};
use sdq_generate::{
    ShapeKind, ValidationWarning, classify_tag, lint_code, local_generation, prompt_template,
    suggest_scenario_name,
};
use sdq_ingest::export_csv;
use sdq_model::Condition;
use sdq_parse::{attribute_joins, extract_conditions_with};
use sdq_workflow::{ScenarioView, Session, local_suggestion, recommend};

use crate::cli::{DescriptionArgs, GenerateArgs, IngestArgs, MetadataArgs, SuggestArgs};
use crate::summary::{
    print_generated, print_groups, print_issues, print_metadata, print_parse,
    print_recommendations, print_scenarios, print_suggestions,
};
use sdq_cli::config::SdqConfig;
use sdq_cli::logging::redact_value;

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Backend,
    Local,
}

#[derive(Debug, Clone, Serialize)]
pub struct Generated {
    pub source: Source,
    pub query_text: String,
    pub code: String,
    pub cdash_items: Vec<String>,
    pub shape: Option<ShapeKind>,
    pub warnings: Vec<ValidationWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetadataOutput {
    pub source: Source,
    pub name: String,
    pub tag: String,
}

#[derive(Serialize)]
struct SuggestOutput<'a> {
    source: Source,
    suggestions: &'a [ChildSuggestion],
}

fn backend(config: &SdqConfig) -> Result<HttpScenarioApi> {
    HttpScenarioApi::new(&config.backend.base_url, config.timeout())
        .context("create backend client")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}

pub fn run_parse(args: &DescriptionArgs, config: &SdqConfig) -> Result<()> {
    let parse = extract_conditions_with(&args.description, &config.parse_options());
    info!(
        description = redact_value(&args.description),
        conditions = parse.conditions.len(),
        "parsed description"
    );
    if args.json {
        return print_json(&parse);
    }
    let filters: Vec<&Condition> = parse.filter_conditions().collect();
    let joins = attribute_joins(&filters, &parse.logical_operators);
    print_parse(&parse, &joins);
    Ok(())
}

pub fn run_generate(args: &GenerateArgs, config: &SdqConfig) -> Result<()> {
    let description = args.input.description.as_str();
    let (parse, synthesis) = local_generation(description, &config.parse_options(), None);

    let mut generated = Generated {
        source: Source::Local,
        query_text: synthesis.query_text,
        code: synthesis.code,
        cdash_items: synthesis.cdash_items,
        shape: synthesis.shape,
        warnings: Vec::new(),
        template: None,
    };
    if args.backend {
        match backend(config)?.update_scenario_code(description) {
            Ok(update) => {
                generated.source = Source::Backend;
                generated.query_text = update.query_text;
                generated.code = update.python_code;
                generated.shape = None;
            }
            Err(error) => {
                warn!(%error, "backend generation failed, using local result");
                eprintln!("{}", error.user_message());
            }
        }
    }
    generated.warnings = lint_code(&generated.code);
    if args.template {
        let template = prompt_template(
            &config.edc_link()?,
            description,
            &parse,
            &generated.query_text,
        )
        .context("build prompt template")?;
        generated.template = Some(template);
    }

    if args.input.json {
        print_json(&generated)
    } else {
        print_generated(&generated);
        Ok(())
    }
}

pub fn run_ingest(args: &IngestArgs, config: &SdqConfig) -> Result<()> {
    let span = info_span!("ingest", file = %args.input.display());
    let _guard = span.enter();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("read DRP file {}", args.input.display()))?;
    let mut session = Session::new(config.ingest_options()?);
    let scenarios = session.load_drp(&text).map_err(|error| {
        if let Some(hint) = error.suggestion() {
            eprintln!("hint: {hint}");
        }
        error
    })?;

    let views: Vec<ScenarioView> = scenarios.iter().map(ScenarioView::from_scenario).collect();
    print_scenarios(&views);
    print_issues(session.issues());

    if let Some(path) = &args.csv_out {
        let csv = export_csv(session.drp_scenarios()).context("export CSV")?;
        write_output(path, &csv)?;
    }

    let wants_groups =
        args.group || !args.recommend_domains.is_empty() || !args.recommend_tags.is_empty();
    if wants_groups && !session.drp_scenarios().is_empty() {
        let parents = session.group()?;
        if args.group {
            print_groups(parents);
        }
        if !args.recommend_domains.is_empty() || !args.recommend_tags.is_empty() {
            let recommendations =
                recommend(parents, &args.recommend_domains, &args.recommend_tags);
            print_recommendations(&recommendations);
        }
    }

    if let Some(path) = &args.package {
        let json = session.package().to_json().context("serialize package")?;
        write_output(path, &json)?;
    }
    Ok(())
}

pub fn run_suggest(args: &SuggestArgs, config: &SdqConfig) -> Result<()> {
    let api = backend(config)?;
    let mut session = Session::new(config.ingest_options()?);
    let source = match session.fetch_suggestions(&api, &args.name, &args.description) {
        Ok(_) => Source::Backend,
        Err(error) if error.is_recoverable() => {
            eprintln!("{error}");
            let local =
                local_suggestion(&args.name, &args.description, &config.parse_options());
            session.record_suggestions(vec![local]);
            Source::Local
        }
        Err(error) => return Err(error).context("fetch suggestions"),
    };

    if args.json {
        print_json(&SuggestOutput {
            source,
            suggestions: session.suggestions(),
        })
    } else {
        print_suggestions(session.suggestions(), source);
        Ok(())
    }
}

pub fn run_metadata(args: &MetadataArgs, config: &SdqConfig) -> Result<()> {
    let description = args.input.description.as_str();
    let remote = if args.backend {
        match backend(config)?.generate_metadata(description) {
            Ok(metadata) => Some(metadata),
            Err(error) => {
                warn!(%error, "backend metadata failed, using local heuristics");
                eprintln!("{}", error.user_message());
                None
            }
        }
    } else {
        None
    };

    let output = match remote {
        Some(metadata) => MetadataOutput {
            source: Source::Backend,
            name: metadata.name,
            tag: metadata.tag,
        },
        None => {
            let name = suggest_scenario_name(description);
            let tag = classify_tag(&name, description);
            MetadataOutput {
                source: Source::Local,
                name,
                tag: tag.as_str().to_string(),
            }
        }
    };

    if args.input.json {
        print_json(&output)
    } else {
        print_metadata(&output);
        Ok(())
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), bytes = content.len(), "wrote output");
    println!("Wrote {}", path.display());
    Ok(())
}
