use jsonpath_query::JsonPath;
use serde::Deserialize;
use serde_json::{from_value, json};

#[derive(Deserialize)]
struct Config {
    pub path: JsonPath,
}

#[test]
fn can_deserialize_json_path() {
    let config_json = json!({ "path": "$.foo.*" });
    let config = from_value::<Config>(config_json).expect("deserializes");
    let value = json!({"foo": [1, 2, 3]});
    let nodes = config.path.query(&value).all();
    assert_eq!(nodes, vec![1, 2, 3]);
}

#[test]
fn invalid_paths_fail_to_deserialize() {
    let config_json = json!({ "path": "$.foo[" });
    assert!(from_value::<Config>(config_json).is_err());
}

#[test]
fn nodelists_serialize() {
    let value = json!({"foo": [1, 2, 3]});
    let path = JsonPath::parse("$.foo.*").expect("parses");
    let nodes = path.query(&value);
    let out = serde_json::to_value(&nodes).expect("serializes");
    assert_eq!(out, json!([1, 2, 3]));
}
