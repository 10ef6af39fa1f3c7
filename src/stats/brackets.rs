//! Right-closed numeric brackets: a value `v` belongs to `(lower, upper]`.
//!
//! The last bracket may be open-ended. That is carried as [`UpperBound::Unbounded`]
//! and only turned into text by the label functions.

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpperBound {
    At(f64),
    Unbounded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub index: usize,
    pub lower: f64,
    pub upper: UpperBound,
}

impl Bracket {
    fn admits(&self, value: f64, closed_below: bool) -> bool {
        let above_lower = value > self.lower || (closed_below && value == self.lower);
        let below_upper = match self.upper {
            UpperBound::At(upper) => value <= upper,
            UpperBound::Unbounded => true,
        };
        above_lower && below_upper
    }

    /// `"0 to 5"`, or `"30+"` for the open-ended bracket.
    pub fn range_label(&self) -> String {
        match self.upper {
            UpperBound::At(upper) => format!("{} to {}", self.lower, upper),
            UpperBound::Unbounded => format!("{}+", self.lower),
        }
    }

    /// `"0 to 5"`, or `"30 to inf"` for the open-ended bracket.
    pub fn raw_range_label(&self) -> String {
        match self.upper {
            UpperBound::At(upper) => format!("{} to {}", self.lower, upper),
            UpperBound::Unbounded => format!("{} to inf", self.lower),
        }
    }
}

/// Whether the first boundary itself belongs to the first bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LowestEdge {
    #[default]
    Exclusive,
    Inclusive,
}

#[derive(Debug, Clone)]
pub struct Brackets {
    brackets: Vec<Bracket>,
    labels: Option<Vec<String>>,
    lowest_edge: LowestEdge,
}

impl Brackets {
    /// Builds brackets from ascending boundaries. Only the last boundary may be
    /// `f64::INFINITY`, which makes the last bracket open-ended.
    pub fn new(edges: &[f64]) -> Result<Self, AppError> {
        if edges.len() < 2 {
            return Err(AppError::InternalServerError(
                "Brackets need at least two boundaries".to_string(),
            ));
        }
        if edges.iter().any(|edge| edge.is_nan()) {
            return Err(AppError::InternalServerError("Bracket boundaries cannot be NaN".to_string()));
        }
        if edges[..edges.len() - 1].iter().any(|edge| edge.is_infinite()) {
            return Err(AppError::InternalServerError(
                "Only the last bracket boundary may be infinite".to_string(),
            ));
        }
        if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(AppError::InternalServerError(
                "Bracket boundaries must be strictly ascending".to_string(),
            ));
        }

        let brackets = edges
            .windows(2)
            .enumerate()
            .map(|(index, pair)| Bracket {
                index,
                lower: pair[0],
                upper: if pair[1].is_infinite() {
                    UpperBound::Unbounded
                } else {
                    UpperBound::At(pair[1])
                },
            })
            .collect();

        Ok(Brackets {
            brackets,
            labels: None,
            lowest_edge: LowestEdge::default(),
        })
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.len() != self.brackets.len() {
            return Err(AppError::InternalServerError(format!(
                "Expected {} bracket labels, got {}",
                self.brackets.len(),
                labels.len()
            )));
        }
        self.labels = Some(labels);
        Ok(self)
    }

    pub fn with_lowest_edge(mut self, lowest_edge: LowestEdge) -> Self {
        self.lowest_edge = lowest_edge;
        self
    }

    pub fn get(&self, index: usize) -> Option<&Bracket> {
        self.brackets.get(index)
    }

    /// Finds the bracket holding `value`. Values outside every bracket (and NaN) give `None`.
    pub fn locate(&self, value: f64) -> Option<&Bracket> {
        let closed_below = self.lowest_edge == LowestEdge::Inclusive;
        self.brackets
            .iter()
            .find(|bracket| bracket.admits(value, closed_below && bracket.index == 0))
    }

    /// The explicit label if one was given, otherwise the range label.
    pub fn label(&self, bracket: &Bracket) -> String {
        self.labels
            .as_ref()
            .and_then(|labels| labels.get(bracket.index).cloned())
            .unwrap_or_else(|| bracket.range_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_edges() -> Brackets {
        Brackets::new(&[0.0, 5.0, 10.0]).unwrap()
    }

    #[test]
    fn boundary_value_falls_in_lower_bracket() {
        let brackets = three_edges();
        let bracket = brackets.locate(5.0).unwrap();
        assert_eq!(bracket.index, 0);
        assert_eq!(bracket.range_label(), "0 to 5");
        assert_eq!(brackets.locate(5.5).unwrap().index, 1);
        assert_eq!(brackets.locate(10.0).unwrap().index, 1);
    }

    #[test]
    fn first_boundary_is_unmatched_by_default() {
        let brackets = three_edges();
        assert!(brackets.locate(0.0).is_none());
        assert!(brackets.locate(-1.0).is_none());
    }

    #[test]
    fn first_boundary_matches_when_lowest_edge_inclusive() {
        let brackets = three_edges().with_lowest_edge(LowestEdge::Inclusive);
        assert_eq!(brackets.locate(0.0).unwrap().index, 0);
        assert!(brackets.locate(-0.5).is_none());
        // only the very first edge is closed
        assert_eq!(brackets.locate(5.0).unwrap().index, 0);
    }

    #[test]
    fn values_above_last_finite_boundary_are_unmatched() {
        let brackets = three_edges();
        assert!(brackets.locate(10.01).is_none());
        assert!(brackets.locate(f64::NAN).is_none());
    }

    #[test]
    fn open_ended_bracket_takes_everything_above() {
        let brackets = Brackets::new(&[20.0, 30.0, 40.0, 50.0, f64::INFINITY]).unwrap();
        let bracket = brackets.locate(87.0).unwrap();
        assert_eq!(bracket.upper, UpperBound::Unbounded);
        assert_eq!(bracket.range_label(), "50+");
        assert_eq!(bracket.raw_range_label(), "50 to inf");
        assert_eq!(brackets.locate(50.0).unwrap().range_label(), "40 to 50");
    }

    #[test]
    fn explicit_labels_override_range_labels() {
        let brackets = Brackets::new(&[0.0, 5.0, f64::INFINITY])
            .unwrap()
            .with_labels(["1-5", "More than 5"])
            .unwrap();
        let bracket = *brackets.locate(12.0).unwrap();
        assert_eq!(brackets.label(&bracket), "More than 5");
    }

    #[test]
    fn label_count_must_match() {
        let err = three_edges().with_labels(["only one"]).unwrap_err();
        assert!(matches!(err, AppError::InternalServerError(_)));
    }

    #[test]
    fn rejects_malformed_boundaries() {
        assert!(Brackets::new(&[1.0]).is_err());
        assert!(Brackets::new(&[5.0, 5.0]).is_err());
        assert!(Brackets::new(&[10.0, 5.0]).is_err());
        assert!(Brackets::new(&[0.0, f64::INFINITY, 10.0]).is_err());
        assert!(Brackets::new(&[0.0, f64::NAN]).is_err());
    }

    #[test]
    fn fractional_boundaries_keep_their_decimals() {
        let brackets = Brackets::new(&[0.5, 2.5]).unwrap();
        assert_eq!(brackets.get(0).unwrap().range_label(), "0.5 to 2.5");
    }
}
