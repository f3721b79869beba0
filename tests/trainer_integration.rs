//! End-to-end tests over the public API: load data, split, train,
//! evaluate, tune, persist.

use polars::prelude::*;
use treino::models::{DecisionTreeClassifier, KnnClassifier, ParamGrid};
use treino::training::ModelTrainer;
use treino::TreinoError;

/// 100 rows, two numeric features, binary label. The classes are
/// linearly separable on `x1` so a shallow tree fits them exactly.
fn training_frame() -> DataFrame {
    let mut x1 = Vec::with_capacity(100);
    let mut x2 = Vec::with_capacity(100);
    let mut label = Vec::with_capacity(100);
    for i in 0..100u32 {
        let jitter = (i % 7) as f64 * 0.1;
        if i % 2 == 0 {
            x1.push(1.0 + jitter);
            x2.push(5.0 - jitter);
            label.push(0.0f64);
        } else {
            x1.push(10.0 + jitter);
            x2.push(-3.0 + jitter);
            label.push(1.0f64);
        }
    }
    df!("x1" => &x1, "x2" => &x2, "label" => &label).unwrap()
}

#[test]
fn test_split_train_evaluate_pipeline() {
    let mut trainer = ModelTrainer::new(
        DecisionTreeClassifier::new().with_max_depth(4),
        training_frame(),
        "label",
    );

    trainer.split_data(0.2, Some(42)).unwrap();
    let split = trainer.split().unwrap();
    assert_eq!(split.x_train.nrows(), 80);
    assert_eq!(split.x_test.nrows(), 20);
    assert_eq!(split.x_train.ncols(), 2);

    trainer.train().unwrap();

    let report = trainer.evaluate(Some(&["neg", "pos"])).unwrap();
    assert!(report.accuracy > 0.95, "accuracy {}", report.accuracy);

    let rendered = report.to_string();
    assert!(rendered.contains("neg"));
    assert!(rendered.contains("pos"));
    assert!(rendered.contains("precision"));
}

#[test]
fn test_split_is_deterministic_for_a_seed() {
    let mut a = ModelTrainer::new(DecisionTreeClassifier::new(), training_frame(), "label");
    let mut b = ModelTrainer::new(DecisionTreeClassifier::new(), training_frame(), "label");

    a.split_data(0.2, Some(42)).unwrap();
    b.split_data(0.2, Some(42)).unwrap();

    assert_eq!(a.split().unwrap().y_test, b.split().unwrap().y_test);
    assert_eq!(a.split().unwrap().x_train, b.split().unwrap().x_train);
}

#[test]
fn test_evaluate_before_split_fails() {
    let trainer = ModelTrainer::new(DecisionTreeClassifier::new(), training_frame(), "label");
    assert!(matches!(
        trainer.evaluate(None),
        Err(TreinoError::DataNotSplit)
    ));
}

#[test]
fn test_save_load_round_trip() {
    let df = training_frame();
    let mut trainer = ModelTrainer::new(
        DecisionTreeClassifier::new().with_max_depth(4),
        df.clone(),
        "label",
    );
    trainer.split_data(0.2, Some(42)).unwrap();
    trainer.train().unwrap();

    let features = df.drop("label").unwrap();
    let before = trainer.predict(&features).unwrap();

    std::fs::create_dir_all("modelos").unwrap();
    let name = format!("roundtrip_{}", std::process::id());
    trainer.save(&name).unwrap();

    let mut restored = ModelTrainer::new(DecisionTreeClassifier::new(), df.clone(), "label");
    restored.load(&name).unwrap();
    let after = restored.predict(&features).unwrap();

    assert_eq!(before, after);

    std::fs::remove_file(ModelTrainer::<DecisionTreeClassifier>::build_filename(&name)).unwrap();
}

#[test]
fn test_tune_selects_a_candidate_and_refits() {
    let mut trainer = ModelTrainer::new(DecisionTreeClassifier::new(), training_frame(), "label");
    trainer.split_data(0.2, Some(42)).unwrap();

    let grid = ParamGrid::new()
        .ints("max_depth", [2, 4])
        .strs("criterion", ["gini", "entropy"]);
    let results = trainer.tune(&grid, 5).unwrap();
    assert_eq!(results.len(), 4);

    // the refit model is immediately usable
    let report = trainer.evaluate(None).unwrap();
    assert!(report.accuracy > 0.9);
}

#[test]
fn test_feature_importance_soft_degrade() {
    let df = training_frame();

    let mut tree = ModelTrainer::new(DecisionTreeClassifier::new(), df.clone(), "label");
    tree.split_data(0.2, Some(42)).unwrap();
    tree.train().unwrap();
    let importances = tree.feature_importance().unwrap();
    assert_eq!(importances.len(), 2);
    assert!((importances.sum() - 1.0).abs() < 1e-9);

    let mut knn = ModelTrainer::new(KnnClassifier::new(3), df, "label");
    knn.split_data(0.2, Some(42)).unwrap();
    knn.train().unwrap();
    assert!(knn.feature_importance().is_none());
}

#[test]
fn test_csv_round_trip_feeds_the_trainer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataset.csv");
    let path = path.to_str().unwrap();

    let mut df = training_frame();
    treino::data::save_data(&mut df, path).unwrap();
    let loaded = treino::data::load_data(path).unwrap();
    assert_eq!(loaded.shape(), (100, 3));

    let mut trainer = ModelTrainer::new(DecisionTreeClassifier::new(), loaded, "label");
    trainer.split_data(0.2, Some(42)).unwrap();
    trainer.train().unwrap();
    assert!(trainer.evaluate(None).unwrap().accuracy > 0.9);
}
