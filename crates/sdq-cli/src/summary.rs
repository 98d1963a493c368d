//! Terminal tables for command output.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sdq_client::ChildSuggestion;
use sdq_ingest::RowIssue;
use sdq_model::{Connective, Domain, ParentScenario, ParseResult};
use sdq_workflow::{BadgeKind, Recommendation, ScenarioView};

use crate::commands::{Generated, MetadataOutput, Source};

pub fn print_parse(parse: &ParseResult, joins: &[Connective]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Field"),
        header_cell("Operator"),
        header_cell("Value"),
        header_cell("Test"),
        header_cell("Position"),
        header_cell("Joined by"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);

    let mut filters = 0usize;
    for (index, condition) in parse.conditions.iter().enumerate() {
        let join = if condition.operator.is_filter() {
            filters += 1;
            filters
                .checked_sub(2)
                .and_then(|i| joins.get(i))
                .map_or_else(|| dim_cell("-"), |j| Cell::new(j.word()))
        } else {
            dim_cell("-")
        };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&condition.field)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(condition.operator.as_str()),
            value_cell(&condition.value),
            condition
                .test
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(condition.position),
            join,
        ]);
    }
    println!("{table}");

    let domains: Vec<&str> = parse.domains.iter().map(Domain::as_str).collect();
    println!("Domains: {}", domains.join(", "));
    println!("Primary domain: {}", parse.primary_domain().display_name());
    if !parse.logical_operators.is_empty() {
        let words: Vec<String> = parse
            .logical_operators
            .iter()
            .map(|op| format!("{}@{}", op.kind.word().to_uppercase(), op.position))
            .collect();
        println!("Connectives: {}", words.join(" "));
    }
}

pub fn print_generated(generated: &Generated) {
    println!("Source: {}", source_label(generated.source));
    if let Some(shape) = generated.shape {
        println!("Clinical shape: {}", shape.as_str());
    }
    println!();
    println!("Query text:");
    println!("  {}", generated.query_text);
    println!();
    println!("CDASH items: {}", generated.cdash_items.join(", "));
    println!();
    println!("{}", generated.code);
    if !generated.warnings.is_empty() {
        println!();
        println!("Code warnings:");
        for warning in &generated.warnings {
            println!("- {warning}");
        }
    }
    if let Some(template) = &generated.template {
        println!();
        println!("{template}");
    }
}

pub fn print_scenarios(views: &[ScenarioView]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Check Name"),
        header_cell("Role"),
        header_cell("Type"),
        header_cell("Domain"),
        header_cell("Priority"),
        header_cell("Query Text"),
    ]);
    apply_table_style(&mut table);
    for view in views {
        let badge = |kind: BadgeKind| {
            view.badges
                .iter()
                .find(|b| b.kind == kind)
                .map_or("-", |b| b.label.as_str())
        };
        let role = if view.role == "Parent" {
            Cell::new(view.role).fg(Color::Cyan).add_attribute(Attribute::Bold)
        } else {
            dim_cell(view.role)
        };
        table.add_row(vec![
            dim_cell(&view.id),
            Cell::new(&view.name).add_attribute(Attribute::Bold),
            role,
            Cell::new(badge(BadgeKind::Type)),
            Cell::new(badge(BadgeKind::Domain)).fg(Color::Green),
            Cell::new(badge(BadgeKind::Priority)).fg(Color::Yellow),
            Cell::new(&view.query_preview),
        ]);
    }
    println!("{table}");
}

pub fn print_issues(issues: &[RowIssue]) {
    if issues.is_empty() {
        return;
    }
    println!();
    println!("Row issues:");
    for issue in issues {
        if issue.is_skip() {
            eprintln!("- {issue}");
        } else {
            println!("- {issue}");
        }
    }
}

pub fn print_groups(parents: &[ParentScenario]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Domain"),
        header_cell("Group"),
        header_cell("Scenarios"),
        header_cell("Parents"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for parent in parents {
        let parents = parent.child_scenarios.iter().filter(|s| s.is_parent).count();
        table.add_row(vec![
            Cell::new(parent.domain.as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&parent.name),
            Cell::new(parent.child_scenarios.len()),
            count_cell(parents),
        ]);
    }
    println!();
    println!("{table}");
}

pub fn print_recommendations(recommendations: &[Recommendation<'_>]) {
    println!();
    if recommendations.is_empty() {
        println!("No groups match the selected domains or tags.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Group"), header_cell("Score"), header_cell("Why")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for rec in recommendations {
        table.add_row(vec![
            Cell::new(&rec.parent.name),
            Cell::new(rec.score).add_attribute(Attribute::Bold),
            Cell::new(rec.reasons.join("; ")),
        ]);
    }
    println!("{table}");
}

pub fn print_suggestions(suggestions: &[ChildSuggestion], source: Source) {
    println!("Source: {}", source_label(source));
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Scenario"),
        header_cell("Domains"),
        header_cell("Tag"),
        header_cell("CDASH Items"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, suggestion) in suggestions.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index),
            Cell::new(&suggestion.scenario_text),
            Cell::new(suggestion.domains.join(", ")),
            suggestion
                .tag
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(suggestion.required_cdash_items.join(", ")),
        ]);
    }
    println!("{table}");
}

pub fn print_metadata(metadata: &MetadataOutput) {
    println!("Source: {}", source_label(metadata.source));
    println!("Name: {}", metadata.name);
    println!("Tag: {}", metadata.tag);
}

fn source_label(source: Source) -> &'static str {
    match source {
        Source::Backend => "backend",
        Source::Local => "local generation",
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn value_cell(value: &str) -> Cell {
    if value.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(value)
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
