//! One user's workflow state: the loaded DRP batch, its domain groups,
//! backend suggestions and the study being assembled.

use chrono::Utc;
use sdq_client::{ChildSuggestion, ScenarioApi};
use sdq_generate::{integration_template, local_generation};
use sdq_ingest::columns::PARENT_TYPE;
use sdq_ingest::{IngestOptions, RowIssue, SdqPackage, build_package, ingest_with};
use sdq_model::{Domain, ParentScenario, Priority, Scenario, normalize_cdash_items};
use tracing::{debug, info, warn};

use crate::error::{Result, WorkflowError};
use crate::group::group_by_domain;
use crate::live::LiveEditor;
use crate::progress::{Progress, WorkflowStage};
use crate::recommend::{SearchFilter, search};
use crate::study::StudyScenario;

/// Field changes for one scenario. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioEdit {
    pub name: Option<String>,
    /// A new description regenerates query text, code and CDASH items
    /// unless those are also given.
    pub description: Option<String>,
    pub domain: Option<Domain>,
    pub priority: Option<Priority>,
    pub scenario_type: Option<String>,
    pub query_text: Option<String>,
    pub code: Option<String>,
    pub cdash_items: Option<Vec<String>>,
}

#[derive(Debug, Default)]
pub struct Session {
    options: IngestOptions,
    drp: Vec<Scenario>,
    issues: Vec<RowIssue>,
    parents: Vec<ParentScenario>,
    suggestions: Vec<ChildSuggestion>,
    study: Vec<StudyScenario>,
    progress: Progress,
    editor: LiveEditor,
}

impl Session {
    pub fn new(options: IngestOptions) -> Self {
        let editor = LiveEditor::new(options.parse);
        Self {
            options,
            editor,
            ..Self::default()
        }
    }

    pub fn drp_scenarios(&self) -> &[Scenario] {
        &self.drp
    }

    /// Row issues from the last loaded batch.
    pub fn issues(&self) -> &[RowIssue] {
        &self.issues
    }

    pub fn parents(&self) -> &[ParentScenario] {
        &self.parents
    }

    pub fn suggestions(&self) -> &[ChildSuggestion] {
        &self.suggestions
    }

    pub fn study(&self) -> &[StudyScenario] {
        &self.study
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn editor(&mut self) -> &mut LiveEditor {
        &mut self.editor
    }

    /// Ingest DRP CSV text, replacing any previous batch and its groups.
    pub fn load_drp(&mut self, text: &str) -> Result<&[Scenario]> {
        let outcome = ingest_with(text, &self.options)?;
        self.drp = outcome.scenarios;
        self.issues = outcome.issues;
        self.parents.clear();
        self.progress.advance_to(WorkflowStage::Ingested);
        Ok(&self.drp)
    }

    /// Group the loaded batch by domain.
    pub fn group(&mut self) -> Result<&[ParentScenario]> {
        if self.drp.is_empty() {
            return Err(WorkflowError::NoDrpBatch);
        }
        self.parents = group_by_domain(&self.drp);
        self.progress.advance_to(WorkflowStage::Grouped);
        Ok(&self.parents)
    }

    /// Replace the current suggestions.
    pub fn record_suggestions(&mut self, suggestions: Vec<ChildSuggestion>) {
        debug!(count = suggestions.len(), "recorded suggestions");
        self.suggestions = suggestions;
        self.progress.advance_to(WorkflowStage::SuggestionsFetched);
    }

    /// Ask the backend for child scenarios of a parent and record them.
    /// On failure the current suggestions are kept.
    pub fn fetch_suggestions<A: ScenarioApi + ?Sized>(
        &mut self,
        api: &A,
        name: &str,
        description: &str,
    ) -> Result<&[ChildSuggestion]> {
        let suggestions = api
            .suggest_child_scenarios(name, description)
            .inspect_err(|e| warn!(error = %e, "child suggestions unavailable"))?;
        self.record_suggestions(suggestions);
        Ok(&self.suggestions)
    }

    /// Add the suggestions at `indices` to the study. Every index is
    /// checked before anything is added; repeated indices are added once.
    pub fn add_selected_to_study(&mut self, indices: &[usize]) -> Result<Vec<String>> {
        if indices.is_empty() {
            return Err(WorkflowError::EmptySelection);
        }
        let available = self.suggestions.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= available) {
            return Err(WorkflowError::SelectionOutOfRange { index, available });
        }

        let mut unique: Vec<usize> = Vec::with_capacity(indices.len());
        for &index in indices {
            if !unique.contains(&index) {
                unique.push(index);
            }
        }

        let added_at = Utc::now();
        let mut added = Vec::with_capacity(unique.len());
        for index in unique {
            let study = StudyScenario::from_suggestion(
                &self.suggestions[index],
                &self.options.parse,
                &self.options.edc,
                added_at,
            )?;
            added.push(study);
        }
        let ids: Vec<String> = added.iter().map(|s| s.id().to_string()).collect();
        self.study.extend(added);
        self.progress.advance_to(WorkflowStage::BulkAdded);
        info!(added = ids.len(), total = self.study.len(), "scenarios added to study");
        Ok(ids)
    }

    /// Apply `edit` to a study or DRP scenario and regenerate its template.
    /// Study scenarios are searched first.
    pub fn edit_scenario(&mut self, id: &str, edit: ScenarioEdit) -> Result<&Scenario> {
        if let Some(i) = self.study.iter().position(|s| s.id() == id) {
            apply_edit(&mut self.study[i].scenario, edit, &self.options)?;
            debug!(id, "study scenario edited");
            return Ok(&self.study[i].scenario);
        }

        let i = self
            .drp
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| WorkflowError::ScenarioNotFound(id.to_string()))?;
        apply_edit(&mut self.drp[i], edit, &self.options)?;
        if !self.parents.is_empty() {
            self.parents = group_by_domain(&self.drp);
        }
        debug!(id, "DRP scenario edited");
        Ok(&self.drp[i])
    }

    pub fn remove_study_scenario(&mut self, id: &str) -> Result<StudyScenario> {
        let index = self
            .study
            .iter()
            .position(|s| s.id() == id)
            .ok_or_else(|| WorkflowError::ScenarioNotFound(id.to_string()))?;
        let removed = self.study.remove(index);
        info!(id, remaining = self.study.len(), "scenario removed from study");
        Ok(removed)
    }

    /// Record that the study's checks were run. Returns false when the
    /// session was already marked executed.
    pub fn mark_executed(&mut self) -> bool {
        self.progress.advance_to(WorkflowStage::Executed)
    }

    /// Parents matching a search filter.
    pub fn search(&self, filter: &SearchFilter) -> Vec<&ParentScenario> {
        search(&self.parents, filter)
    }

    /// DRP scenarios followed by study scenarios, as one package.
    pub fn package(&self) -> SdqPackage {
        let scenarios: Vec<Scenario> = self
            .drp
            .iter()
            .cloned()
            .chain(self.study.iter().map(|s| s.scenario.clone()))
            .collect();
        build_package(&scenarios)
    }
}

fn apply_edit(scenario: &mut Scenario, edit: ScenarioEdit, options: &IngestOptions) -> Result<()> {
    if let Some(name) = edit.name {
        scenario.name = name;
    }
    if let Some(description) = edit.description
        && description != scenario.description
    {
        let (parse, synthesis) = local_generation(&description, &options.parse, None);
        scenario.description = description;
        scenario.query_text = synthesis.query_text;
        scenario.code = synthesis.code;
        scenario.cdash_items = synthesis.cdash_items;
        if parse.filter_conditions().next().is_some() {
            scenario.domain = parse.primary_domain();
        }
    }
    if let Some(domain) = edit.domain {
        scenario.domain = domain;
    }
    if let Some(priority) = edit.priority {
        scenario.priority = priority;
    }
    if let Some(scenario_type) = edit.scenario_type {
        scenario.scenario_type = scenario_type;
    }
    if let Some(query_text) = edit.query_text {
        scenario.query_text = query_text;
    }
    if let Some(code) = edit.code {
        scenario.code = code;
    }
    if let Some(items) = edit.cdash_items {
        scenario.cdash_items = normalize_cdash_items(items);
    }

    scenario.is_parent = scenario.priority.is_high()
        || scenario.scenario_type.eq_ignore_ascii_case(PARENT_TYPE);
    scenario.template = integration_template(
        &options.edc,
        &scenario.name,
        &scenario.description,
        &scenario.query_text,
        &scenario.cdash_items,
        scenario.domain,
    )?;
    Ok(())
}
