use hardcase_data::{Attribute, Dataset, Value};

/// Dataset with numeric feature columns and a nominal class label.
pub fn numeric_dataset(features: &[Vec<f64>], labels: &[&str]) -> Dataset {
    let n_features = features.first().map_or(0, Vec::len);
    let mut classes: Vec<&str> = labels.to_vec();
    classes.sort_unstable();
    classes.dedup();

    let mut attributes: Vec<Attribute> = (0..n_features)
        .map(|j| Attribute::numeric(format!("x{j}")))
        .collect();
    attributes.push(Attribute::nominal("class", classes));

    let rows = features
        .iter()
        .zip(labels)
        .map(|(row, &label)| {
            let mut values: Vec<Value> = row.iter().map(|&v| Value::from(v)).collect();
            values.push(Value::from(label));
            values
        })
        .collect();
    Dataset::new(attributes, rows).unwrap()
}

/// One feature `[0, 1, 10, 11]` labelled `[A, A, B, B]`.
pub fn line_dataset() -> Dataset {
    numeric_dataset(
        &[vec![0.0], vec![1.0], vec![10.0], vec![11.0]],
        &["A", "A", "B", "B"],
    )
}

/// Two overlapping 2-D blobs of six rows each.
pub fn blobs() -> Dataset {
    numeric_dataset(
        &[
            vec![0.0, 0.0],
            vec![0.5, 0.2],
            vec![0.2, 0.8],
            vec![1.0, 0.4],
            vec![0.7, 1.0],
            vec![2.6, 2.4],
            vec![3.0, 3.0],
            vec![3.4, 2.8],
            vec![2.8, 3.5],
            vec![3.6, 3.6],
            vec![3.1, 2.2],
            vec![0.9, 0.9],
        ],
        &["a", "a", "a", "a", "a", "a", "b", "b", "b", "b", "b", "b"],
    )
}
