use croprec_core::{
    FeatureVector, LabelEncoder, Node, Predictor, RandomForest, StandardScaler, Tree, ArtifactSet,
    FEATURE_COUNT,
};
use proptest::prelude::*;

// Property-based tests for the preprocessing artifacts and the predictor
// contract: decoding inverts encoding, scaling is a pure function of the
// fitted statistics, and predictions never leave the training label set.

fn arbitrary_label() -> impl Strategy<Value = String> {
    "[a-z]{1,12}"
}

fn arbitrary_row() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1_000.0f64..1_000.0, FEATURE_COUNT)
}

fn arbitrary_features() -> impl Strategy<Value = FeatureVector> {
    arbitrary_row().prop_map(|row| FeatureVector::from_slice(&row).unwrap())
}

/// Three-class forest over rainfall and humidity
fn fixed_artifacts() -> ArtifactSet {
    let rows: Vec<Vec<f64>> = (0..12)
        .map(|i| {
            let x = i as f64;
            vec![50.0 + x, 40.0, 40.0, 20.0 + x, 40.0 + 4.0 * x, 6.5, 50.0 + 20.0 * x]
        })
        .collect();
    let scaler = StandardScaler::fit(&rows).unwrap();
    let encoder = LabelEncoder::fit(["chickpea", "maize", "rice"]).unwrap();

    let by_rainfall = Tree::new(vec![
        Node::internal(0, 6, -0.5, 1, 2),
        Node::leaf(1, 0),
        Node::internal(2, 6, 0.5, 3, 4),
        Node::leaf(3, 1),
        Node::leaf(4, 2),
    ]);
    let by_humidity = Tree::new(vec![
        Node::internal(0, 4, 0.0, 1, 2),
        Node::leaf(1, 1),
        Node::leaf(2, 2),
    ]);
    let forest = RandomForest::new(
        vec![by_rainfall.clone(), by_humidity, by_rainfall],
        FEATURE_COUNT,
        3,
        vec![0.0, 0.0, 0.0, 0.0, 0.4, 0.0, 0.6],
    );

    ArtifactSet {
        scaler,
        encoder,
        forest,
    }
}

proptest! {
    #[test]
    fn label_encoder_roundtrip(
        labels in prop::collection::vec(arbitrary_label(), 1..30),
    ) {
        let encoder = LabelEncoder::fit(&labels).unwrap();

        for label in &labels {
            let code = encoder.transform(label).unwrap();
            prop_assert_eq!(encoder.inverse_transform(code).unwrap(), label.as_str());
        }
    }
}

proptest! {
    #[test]
    fn label_codes_are_dense(
        labels in prop::collection::vec(arbitrary_label(), 1..30),
    ) {
        let encoder = LabelEncoder::fit(&labels).unwrap();
        let codes = encoder.transform_all(&labels).unwrap();

        prop_assert!(codes.iter().all(|code| *code < encoder.len()));
        for code in 0..encoder.len() {
            prop_assert!(codes.contains(&code));
        }
    }
}

proptest! {
    #[test]
    fn scaler_transform_is_idempotent_within_session(
        rows in prop::collection::vec(arbitrary_row(), 2..20),
        sample in arbitrary_row(),
    ) {
        let scaler = StandardScaler::fit(&rows).unwrap();

        let first = scaler.transform(&sample).unwrap();
        let second = scaler.transform(&sample).unwrap();
        prop_assert_eq!(first, second);
    }
}

proptest! {
    #[test]
    fn predictions_stay_in_label_set(features in arbitrary_features()) {
        let predictor = Predictor::new(fixed_artifacts()).unwrap();

        let rec = predictor.predict(&features).unwrap();
        prop_assert!(predictor.labels().contains(&rec.crop));
        prop_assert_eq!(predictor.predict(&features).unwrap(), rec);
    }
}
