use std::collections::HashMap;

/// Class label vector, encoded as integer class ids.
///
/// Classes are the sorted distinct label strings, so class ids are stable for a given
/// set of labels regardless of row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    classes: Vec<String>,
    ids: Vec<usize>,
}

impl Labels {
    /// Encode string labels.
    pub fn from_values<S: AsRef<str>>(values: &[S]) -> Self {
        let mut classes: Vec<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        let class_to_idx: HashMap<&str, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let ids = values
            .iter()
            .map(|v| class_to_idx[v.as_ref()])
            .collect();
        Labels { classes, ids }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    pub fn id(&self, row: usize) -> usize {
        self.ids[row]
    }

    pub fn class_name(&self, class: usize) -> &str {
        &self.classes[class]
    }

    /// Number of rows per class id.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for &c in &self.ids {
            counts[c] += 1;
        }
        counts
    }

    /// Row indices per class id, each list in ascending row order.
    pub fn partition(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.classes.len()];
        for (i, &c) in self.ids.iter().enumerate() {
            groups[c].push(i);
        }
        groups
    }

    /// Labels of a subset of rows. Class ids are recomputed for the subset.
    pub fn select(&self, rows: &[usize]) -> Labels {
        let values: Vec<&str> = rows.iter().map(|&i| self.class_name(self.ids[i])).collect();
        Labels::from_values(&values)
    }
}
