//! Transport failures surface as recoverable client errors.

use std::time::Duration;

use sdq_client::{ClientError, HttpScenarioApi, ScenarioApi};

#[test]
fn unreachable_backend_is_a_recoverable_network_error() {
    // Nothing listens on the discard port locally.
    let api = HttpScenarioApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = api.update_scenario_code("AGE > 65 and SEX = 'M' for elderly males").unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert!(err.is_recoverable());
}
