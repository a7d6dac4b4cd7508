use super::*;

const PROJECT: &str = r#"{
    "config": { "widescreen": true, "move_precision": 2 },
    "group_order": ["Main"],
    "scripts": [
        {
            "name": "intro",
            "groups": [
                { "name": "Main", "target": "normal", "elements": [
                    { "type": "sprite", "path": "sb/bg.png", "layer": "Background",
                      "initial_position": { "x": 500, "y": 200 } }
                ] }
            ],
            "assets": [
                { "path": "sb/solid.png", "source": { "solid": { "width": 4, "height": 4, "rgba": [0, 0, 0, 255] } } }
            ]
        },
        { "name": "empty" }
    ]
}"#;

#[test]
fn parses_config_order_and_scripts() {
    let project = Project::from_json_str(PROJECT).unwrap();
    assert!(project.config.widescreen);
    assert_eq!(project.config.move_precision, 2);
    assert_eq!(project.config.alpha_precision, 4);
    assert_eq!(project.group_order, Some(vec!["Main".to_string()]));
    assert_eq!(project.scripts.len(), 2);
    assert_eq!(project.scripts[0].groups[0].target.as_deref(), Some("normal"));
    assert_eq!(project.scripts[0].assets.len(), 1);
    assert!(project.scripts[1].groups.is_empty());

    let scripts = project.scripts();
    assert_eq!(scripts[1].name(), "empty");
    let opts = project.generator_opts(Some(2));
    assert_eq!(opts.threads, Some(2));
    assert_eq!(opts.group_order, project.group_order);
    assert!(opts.parallel);
}

#[test]
fn duplicate_script_names_are_rejected() {
    let json = r#"{ "scripts": [ { "name": "a" }, { "name": "a" } ] }"#;
    let err = Project::from_json_str(json).unwrap_err();
    assert!(matches!(err, StoryError::Validation(_)), "{err}");
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = Project::from_json_str("{ \"scripts\": 3 }").unwrap_err();
    assert!(matches!(err, StoryError::Serde(_)), "{err}");
}

#[test]
fn missing_file_reports_the_path() {
    let path = std::env::temp_dir().join(format!(
        "storyweave_missing_project_{}.json",
        std::process::id()
    ));
    let err = Project::from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("storyweave_missing_project"), "{err:#}");
}
