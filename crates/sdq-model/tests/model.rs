use sdq_model::{Domain, ParentScenario, Priority, Scenario};

fn sample() -> Scenario {
    Scenario {
        id: "drp_1".to_string(),
        name: "Missing AE start date".to_string(),
        description: "AESTDTC is missing".to_string(),
        domain: Domain::AE,
        priority: Priority::Other("Critical".to_string()),
        scenario_type: "Safety".to_string(),
        is_parent: false,
        query_text: "Flag records where AESTDTC is null.".to_string(),
        code: "def check_ae_validation(df):\n    return df".to_string(),
        cdash_items: vec!["SUBJID".to_string(), "AESTDTC".to_string()],
        template: String::new(),
    }
}

#[test]
fn scenario_uses_package_field_names() {
    let value = serde_json::to_value(sample()).expect("serialize scenario");
    assert_eq!(value["type"], "Safety");
    assert_eq!(value["priority"], "Critical");
    assert_eq!(value["domain"], "AE");
    assert!(value.get("python_code").is_some());
    assert!(value.get("sdq_template").is_some());
    assert_eq!(value["cdash_items"][0], "SUBJID");
}

#[test]
fn scenario_deserializes_without_optional_fields() {
    let json = r#"{
        "id": "drp_2", "name": "n", "description": "d", "domain": "VS",
        "type": "Parent", "is_parent": true, "query_text": "q",
        "python_code": "c", "cdash_items": ["SUBJID"]
    }"#;
    let scenario: Scenario = serde_json::from_str(json).expect("deserialize scenario");
    assert_eq!(scenario.domain, Domain::VS);
    assert_eq!(scenario.priority, Priority::Medium);
    assert!(scenario.template.is_empty());
}

#[test]
fn search_covers_children() {
    let parent = ParentScenario {
        id: "drp_parent_ae".to_string(),
        name: "Adverse Events Checks".to_string(),
        description: String::new(),
        domain: Domain::AE,
        child_scenarios: vec![sample()],
        is_from_drp: true,
    };
    assert!(parent.matches("adverse"));
    assert!(parent.matches("aestdtc"));
    assert!(parent.matches("  START DATE "));
    assert!(parent.matches(""));
    assert!(!parent.matches("creatinine"));
    assert!(sample().matches("safety"));
}
