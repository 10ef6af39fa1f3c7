//! The four salary reports. Every function here is pure: the caller loads the rows and
//! supplies today's date.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::AppError;
use crate::models::employee::EmployeeFacts;
use crate::stats::age::age_on;
use crate::stats::aggregate::{mean_by, nest, round_to, MeanAccumulator};
use crate::stats::brackets::Brackets;

const SALARY_DECIMALS: u32 = 2;
const EXPERIENCE_DECIMALS: u32 = 2;
const AGE_DECIMALS: u32 = 1;

/// Experience brackets for the per-bracket report, with their display labels.
pub fn experience_brackets() -> Result<Brackets, AppError> {
    Brackets::new(&[0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, f64::INFINITY])?.with_labels([
        "1-5",
        "5-10",
        "10-15",
        "15-20",
        "20-25",
        "25-30",
        "More than 30",
    ])
}

/// Coarser experience brackets used by the cross-tab and gender reports.
pub fn career_stage_brackets() -> Result<Brackets, AppError> {
    Brackets::new(&[0.0, 5.0, 10.0, 15.0, 20.0, 30.0, f64::INFINITY])
}

pub fn age_brackets() -> Result<Brackets, AppError> {
    Brackets::new(&[20.0, 30.0, 40.0, 50.0, f64::INFINITY])
}

/// A JSON object whose keys come out in insertion order rather than sorted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        OrderedMap(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, serde::Serialize, PartialEq)]
pub struct IndustryAverages {
    pub industry: String,
    pub salary: Option<f64>,
    pub years_of_experience: Option<f64>,
    pub age: Option<f64>,
}

#[derive(Debug, serde::Serialize, PartialEq)]
pub struct ExperienceSalary {
    pub experience_bracket: String,
    pub salary: f64,
}

#[derive(Debug, serde::Serialize, PartialEq)]
pub struct BracketSalary {
    pub years_of_experience: String,
    pub salary: f64,
}

/// `experience label -> age label -> mean salary`
pub type SalaryCrossTab = OrderedMap<OrderedMap<f64>>;

/// Mean salary, experience and age per industry, highest salary first.
pub fn averages_per_industry(employees: &[EmployeeFacts], today: NaiveDate) -> Vec<IndustryAverages> {
    #[derive(Default)]
    struct Acc {
        salary: MeanAccumulator,
        years: MeanAccumulator,
        age: MeanAccumulator,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for employee in employees {
        let Some(industry) = employee.industry.as_deref() else {
            continue;
        };
        let acc = groups.entry(industry).or_default();
        acc.salary.push_opt(employee.salary);
        acc.years.push_opt(employee.years_of_experience.map(f64::from));
        acc.age.push(f64::from(age_on(employee.date_of_birth, today)));
    }

    let mut rows: Vec<IndustryAverages> = groups
        .into_iter()
        .map(|(industry, acc)| IndustryAverages {
            industry: industry.to_string(),
            salary: acc.salary.mean().map(|m| round_to(m, SALARY_DECIMALS)),
            years_of_experience: acc.years.mean().map(|m| round_to(m, EXPERIENCE_DECIMALS)),
            age: acc.age.mean().map(|m| round_to(m, AGE_DECIMALS)),
        })
        .collect();

    // stable, so equal salaries stay in industry-name order
    rows.sort_by(|a, b| match (a.salary, b.salary) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows
}

/// Mean salary per experience bracket, in bracket order. Empty brackets are left out.
pub fn averages_per_experience(employees: &[EmployeeFacts]) -> Result<Vec<ExperienceSalary>, AppError> {
    let brackets = experience_brackets()?;
    let means = mean_by(
        employees,
        |e| bracket_index(&brackets, e.years_of_experience.map(f64::from)),
        |e| e.salary,
    );

    Ok(means
        .into_iter()
        .filter_map(|(index, mean)| {
            brackets.get(index).map(|bracket| ExperienceSalary {
                experience_bracket: brackets.label(bracket),
                salary: round_to(mean, SALARY_DECIMALS),
            })
        })
        .collect())
}

/// Mean salary for every populated (experience bracket, age bracket) pair.
pub fn salary_by_experience_and_age(
    employees: &[EmployeeFacts],
    today: NaiveDate,
) -> Result<SalaryCrossTab, AppError> {
    let experience = career_stage_brackets()?;
    let ages = age_brackets()?;

    let flat = mean_by(
        employees,
        |e| {
            let years = bracket_index(&experience, e.years_of_experience.map(f64::from))?;
            let age = bracket_index(&ages, Some(f64::from(age_on(e.date_of_birth, today))))?;
            Some((years, age))
        },
        |e| e.salary,
    );

    Ok(nest(flat)
        .into_iter()
        .filter_map(|(years_index, by_age)| {
            let years_label = format!("{} years of experience", experience.get(years_index)?.range_label());
            let cells: OrderedMap<f64> = by_age
                .into_iter()
                .filter_map(|(age_index, mean)| {
                    let age_label = format!("{} years old", ages.get(age_index)?.range_label());
                    Some((age_label, round_to(mean, SALARY_DECIMALS)))
                })
                .collect();
            Some((years_label, cells))
        })
        .collect())
}

/// Mean salary per experience bracket, split by gender. Bracket labels keep the raw
/// `"a to b"` form, so the open bracket reads `"30 to inf"`.
pub fn salary_by_gender_and_experience(
    employees: &[EmployeeFacts],
) -> Result<BTreeMap<String, Vec<BracketSalary>>, AppError> {
    let experience = career_stage_brackets()?;

    let flat = mean_by(
        employees,
        |e| {
            let gender = e.gender.clone()?;
            let years = bracket_index(&experience, e.years_of_experience.map(f64::from))?;
            Some((gender, years))
        },
        |e| e.salary,
    );

    Ok(nest(flat)
        .into_iter()
        .map(|(gender, by_years)| {
            let rows: Vec<BracketSalary> = by_years
                .into_iter()
                .filter_map(|(years_index, mean)| {
                    experience.get(years_index).map(|bracket| BracketSalary {
                        years_of_experience: bracket.raw_range_label(),
                        salary: round_to(mean, SALARY_DECIMALS),
                    })
                })
                .collect();
            (gender, rows)
        })
        .collect())
}

fn bracket_index(brackets: &Brackets, value: Option<f64>) -> Option<usize> {
    value.and_then(|v| brackets.locate(v)).map(|bracket| bracket.index)
}
