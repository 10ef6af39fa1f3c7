use std::collections::BTreeMap;

/// Running sum and count for one group. Missing values are never pushed, so they
/// don't drag the mean down.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn push_opt(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.push(value);
        }
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Mean of `value` per distinct `key`. Records whose key or value is `None` are skipped,
/// and a key only shows up in the output if at least one value was seen for it.
pub fn mean_by<T, K, KF, VF>(records: &[T], key: KF, value: VF) -> BTreeMap<K, f64>
where
    K: Ord,
    KF: Fn(&T) -> Option<K>,
    VF: Fn(&T) -> Option<f64>,
{
    let mut groups: BTreeMap<K, MeanAccumulator> = BTreeMap::new();
    for record in records {
        let (Some(k), Some(v)) = (key(record), value(record)) else {
            continue;
        };
        groups.entry(k).or_default().push(v);
    }

    groups
        .into_iter()
        .filter_map(|(k, acc)| acc.mean().map(|mean| (k, mean)))
        .collect()
}

/// Turns a two-key grouping into `outer -> inner -> value`.
pub fn nest<A, B, V>(flat: BTreeMap<(A, B), V>) -> BTreeMap<A, BTreeMap<B, V>>
where
    A: Ord,
    B: Ord,
{
    let mut nested: BTreeMap<A, BTreeMap<B, V>> = BTreeMap::new();
    for ((outer, inner), value) in flat {
        nested.entry(outer).or_default().insert(inner, value);
    }
    nested
}

/// Rounds half away from zero to `places` decimals. Only apply this to finished means.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
