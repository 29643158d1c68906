use cli_support::ConfigFile;
use std::fs;
use std::path::PathBuf;

#[test]
fn loads_sections_and_partial_model() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("gat-link.toml");
    fs::write(
        &path,
        r#"
[data]
dir = "/srv/ethereum/matching_link"
negative_test = "/srv/alt/neg_test.json"

[model]
num_hidden = 16
heads = [2, 2, 2]

[train]
epochs = 50
patience = 5
freeze_probe = true
"#,
    )
    .expect("write config");

    let cfg = ConfigFile::from_path(&path)
        .expect("parse config")
        .expect("config present");
    assert_eq!(cfg.data.dir(), Some(PathBuf::from("/srv/ethereum/matching_link")));
    let paths = cfg
        .data
        .overrides()
        .resolve(&cfg.data.dir().expect("dir"));
    assert_eq!(paths.negative_test, PathBuf::from("/srv/alt/neg_test.json"));
    assert_eq!(
        paths.positive_train,
        PathBuf::from("/srv/ethereum/matching_link/positive_train_edge_indices.json")
    );

    let model = cfg.model.expect("model section");
    assert_eq!(model.num_hidden, 16);
    assert_eq!(model.in_dim, 16);
    assert_eq!(model.heads, vec![2, 2, 2]);
    assert_eq!(cfg.train.epochs, Some(50));
    assert_eq!(cfg.train.freeze_probe, Some(true));
    assert_eq!(cfg.train.lr, None);
}

#[test]
fn missing_file_is_none() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let cfg = ConfigFile::from_path(&tmp.path().join("absent.toml")).expect("no error");
    assert!(cfg.is_none());
}

#[test]
fn unknown_keys_are_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("bad.toml");
    fs::write(&path, "[train]\nepoch = 3\n").expect("write config");
    assert!(ConfigFile::from_path(&path).is_err());
}
