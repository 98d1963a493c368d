//! Search and domain/tag recommendations over parent scenarios.

use std::cmp::Reverse;

use sdq_model::{Domain, ParentScenario, ScenarioTag};
use serde::Serialize;

/// Points per matching domain.
const DOMAIN_WEIGHT: usize = 2;
/// Points per matching tag.
const TAG_WEIGHT: usize = 1;

/// Filters applied on top of a text query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub query: String,
    pub tag: Option<ScenarioTag>,
    pub domain: Option<Domain>,
}

/// Parents matching the query text, tag and domain filters.
pub fn search<'a>(parents: &'a [ParentScenario], filter: &SearchFilter) -> Vec<&'a ParentScenario> {
    parents
        .iter()
        .filter(|p| p.matches(&filter.query))
        .filter(|p| filter.tag.is_none_or(|tag| tags_of(p).contains(&tag)))
        .filter(|p| filter.domain.is_none_or(|domain| domains_of(p).contains(&domain)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation<'a> {
    pub parent: &'a ParentScenario,
    pub score: usize,
    pub reasons: Vec<String>,
}

/// Score parents against selected domains and tags. Parents scoring zero
/// are dropped; the rest are ordered by score, highest first.
pub fn recommend<'a>(
    parents: &'a [ParentScenario],
    domains: &[Domain],
    tags: &[ScenarioTag],
) -> Vec<Recommendation<'a>> {
    let mut out: Vec<Recommendation<'a>> = parents
        .iter()
        .filter_map(|parent| {
            let mut score = 0;
            let mut reasons = Vec::new();

            let own_domains = domains_of(parent);
            let domain_matches: Vec<&str> = domains
                .iter()
                .filter(|d| own_domains.contains(d))
                .map(Domain::as_str)
                .collect();
            if !domain_matches.is_empty() {
                score += domain_matches.len() * DOMAIN_WEIGHT;
                reasons.push(format!("Matches domains: {}", domain_matches.join(", ")));
            }

            let own_tags = tags_of(parent);
            let tag_matches: Vec<&str> = tags
                .iter()
                .filter(|t| own_tags.contains(t))
                .map(ScenarioTag::as_str)
                .collect();
            if !tag_matches.is_empty() {
                score += tag_matches.len() * TAG_WEIGHT;
                reasons.push(format!("Matches tags: {}", tag_matches.join(", ")));
            }

            (score > 0).then_some(Recommendation {
                parent,
                score,
                reasons,
            })
        })
        .collect();
    out.sort_by_key(|r| Reverse(r.score));
    out
}

fn domains_of(parent: &ParentScenario) -> Vec<Domain> {
    let mut domains = vec![parent.domain];
    for child in &parent.child_scenarios {
        if !domains.contains(&child.domain) {
            domains.push(child.domain);
        }
    }
    domains
}

/// Tags read from the children's type column; free-text types that are
/// not tags are ignored.
fn tags_of(parent: &ParentScenario) -> Vec<ScenarioTag> {
    let mut tags = Vec::new();
    for child in &parent.child_scenarios {
        if let Ok(tag) = child.scenario_type.parse::<ScenarioTag>()
            && !tags.contains(&tag)
        {
            tags.push(tag);
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdq_model::{Priority, Scenario};

    fn parent(domain: Domain, children: &[(Domain, &str)]) -> ParentScenario {
        ParentScenario {
            id: format!("p_{}", domain.slug()),
            name: format!("{} Checks", domain.display_name()),
            description: String::new(),
            domain,
            child_scenarios: children
                .iter()
                .enumerate()
                .map(|(i, (d, kind))| Scenario {
                    id: format!("c{i}"),
                    name: format!("child {i}"),
                    description: "AESER = 'Y'".to_string(),
                    domain: *d,
                    priority: Priority::Medium,
                    scenario_type: (*kind).to_string(),
                    is_parent: false,
                    query_text: String::new(),
                    code: String::new(),
                    cdash_items: Vec::new(),
                    template: String::new(),
                })
                .collect(),
            is_from_drp: true,
        }
    }

    #[test]
    fn scores_domains_twice_tags_once() {
        let parents = vec![
            parent(Domain::AE, &[(Domain::AE, "Safety")]),
            parent(Domain::LB, &[(Domain::LB, "Data Quality"), (Domain::DM, "Safety")]),
            parent(Domain::CM, &[(Domain::CM, "Parent")]),
        ];
        let recs = recommend(
            &parents,
            &[Domain::LB, Domain::DM],
            &[ScenarioTag::Safety, ScenarioTag::DataQuality],
        );
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].parent.domain, Domain::LB);
        assert_eq!(recs[0].score, 6);
        assert_eq!(
            recs[0].reasons,
            vec!["Matches domains: LB, DM", "Matches tags: Safety, Data Quality"]
        );
        assert_eq!(recs[1].parent.domain, Domain::AE);
        assert_eq!(recs[1].score, 1);
    }

    #[test]
    fn nothing_selected_recommends_nothing() {
        let parents = vec![parent(Domain::AE, &[(Domain::AE, "Safety")])];
        assert!(recommend(&parents, &[], &[]).is_empty());
    }

    #[test]
    fn search_filters() {
        let parents = vec![
            parent(Domain::AE, &[(Domain::AE, "Safety")]),
            parent(Domain::LB, &[(Domain::LB, "Compliance")]),
        ];
        let all = search(&parents, &SearchFilter::default());
        assert_eq!(all.len(), 2);

        let by_tag = search(
            &parents,
            &SearchFilter {
                tag: Some(ScenarioTag::Compliance),
                ..SearchFilter::default()
            },
        );
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].domain, Domain::LB);

        let by_text = search(
            &parents,
            &SearchFilter {
                query: "adverse".to_string(),
                domain: Some(Domain::LB),
                ..SearchFilter::default()
            },
        );
        assert!(by_text.is_empty());
    }
}
