//! End-to-end CLI scenarios (S1, S6) driven through the `dr` binary itself,
//! exercising argument parsing, file loading, and report rendering together.
//! Unit-level S1-S6 coverage lives in `dr_pipeline::orchestrator`'s own test
//! module; these tests check the process boundary instead.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

const CATALOG: &str = r#"{
  "capacity_rules": {
    "caas_cores_per_socket": {"VOS": 0},
    "shared_cores_per_socket": {"VOS": 0}
  },
  "operator_rules": {
    "extra_mandatory_pods": {"VOS": ["IPP"]},
    "implicit_pods_by_flavor": {},
    "vcu_vcores_by_flavor": {}
  },
  "placement_rules": {
    "anti_affinity_groups": {},
    "co_location_groups": {}
  },
  "validation_rules": {"known_flavors": ["medium-regular-spr-t23"]},
  "server_configurations": {}
}"#;

const DIMENSIONING: &str = r#"{
  "medium-regular-spr-t23": [
    {"pod_kind": "DPP", "vcores": "4.0"},
    {"pod_kind": "DIP", "vcores": "4.0"},
    {"pod_kind": "RMP", "vcores": "4.0"},
    {"pod_kind": "CMP", "vcores": "4.0"},
    {"pod_kind": "DMP", "vcores": "4.0"},
    {"pod_kind": "PMP", "vcores": "4.0"},
    {"pod_kind": "IPP", "vcores": "2.0"}
  ]
}"#;

fn baseline_request(vdu_flavor_name: &str) -> String {
    format!(
        r#"{{
  "operator": "Vos",
  "vdu_flavor_name": "{vdu_flavor_name}",
  "pod_requirements": [
    {{"kind": "Dpp", "vcores": 40, "quantity": 1, "socket_affinity": null, "anti_affinity_group": null, "co_location_group": null}},
    {{"kind": "Dip", "vcores": 40, "quantity": 1, "socket_affinity": null, "anti_affinity_group": null, "co_location_group": null}},
    {{"kind": "Rmp", "vcores": 40, "quantity": 1, "socket_affinity": null, "anti_affinity_group": null, "co_location_group": null}},
    {{"kind": "Cmp", "vcores": 40, "quantity": 1, "socket_affinity": null, "anti_affinity_group": null, "co_location_group": null}},
    {{"kind": "Dmp", "vcores": 40, "quantity": 1, "socket_affinity": null, "anti_affinity_group": null, "co_location_group": null}},
    {{"kind": "Pmp", "vcores": 40, "quantity": 1, "socket_affinity": null, "anti_affinity_group": null, "co_location_group": null}}
  ],
  "server_configs": [
    {{"pcores": 24, "vcores": 480, "sockets": 1, "pcores_per_socket": null}}
  ],
  "feature_flags": {{
    "ha_enabled": false,
    "in_service_upgrade": false,
    "vdu_ru_switch_connection": false,
    "directx2_required": false,
    "vcu_deployment_required": false
  }}
}}"#
    )
}

#[test]
fn s1_vos_baseline_passes_through_the_cli() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("catalog.json");
    let dimensioning_path = dir.path().join("dimensioning.json");
    let request_path = dir.path().join("request.json");
    let out_dir = dir.path().join("out");

    fs::write(&catalog_path, CATALOG).unwrap();
    fs::write(&dimensioning_path, DIMENSIONING).unwrap();
    fs::write(&request_path, baseline_request("medium-regular-spr-t23")).unwrap();

    Command::cargo_bin("dr")
        .unwrap()
        .arg("--catalog")
        .arg(&catalog_path)
        .arg("--dimensioning")
        .arg(&dimensioning_path)
        .arg("--request")
        .arg(&request_path)
        .arg("--plan")
        .arg("--out")
        .arg(&out_dir)
        .arg("--render")
        .arg("text")
        .arg("--render")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("verdict=PASS"));

    let result_text = fs::read_to_string(out_dir.join("result.json")).unwrap();
    assert!(result_text.contains("\"success\":true") || result_text.contains("\"success\": true"));

    let report_text = fs::read_to_string(out_dir.join("report.txt")).unwrap();
    assert!(report_text.to_uppercase().contains("PASS") || report_text.contains("SUCCESS"));
}

#[test]
fn s6_unknown_flavor_fails_through_the_cli() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("catalog.json");
    let dimensioning_path = dir.path().join("dimensioning.json");
    let request_path = dir.path().join("request.json");
    let out_dir = dir.path().join("out");

    fs::write(&catalog_path, CATALOG).unwrap();
    fs::write(&dimensioning_path, DIMENSIONING).unwrap();
    fs::write(&request_path, baseline_request("does-not-exist")).unwrap();

    Command::cargo_bin("dr")
        .unwrap()
        .arg("--catalog")
        .arg(&catalog_path)
        .arg("--dimensioning")
        .arg(&dimensioning_path)
        .arg("--request")
        .arg(&request_path)
        .arg("--plan")
        .arg("--out")
        .arg(&out_dir)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("verdict=FAIL"));

    let result_text = fs::read_to_string(out_dir.join("result.json")).unwrap();
    assert!(result_text.contains("V3"));
}

#[test]
fn rejects_a_networked_path() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");

    Command::cargo_bin("dr")
        .unwrap()
        .arg("--catalog")
        .arg("https://example.invalid/catalog.json")
        .arg("--dimensioning")
        .arg("dimensioning.json")
        .arg("--request")
        .arg("request.json")
        .arg("--out")
        .arg(&out_dir)
        .assert()
        .failure()
        .code(2);
}
