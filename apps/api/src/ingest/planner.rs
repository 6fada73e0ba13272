//! Query planner: expands a batch preset (or explicit filters) into the
//! ordered sequence of external API requests a run will issue. Pure: the
//! plan for a given input is always the same, and nothing here touches the
//! network or the store.

use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigError;
use crate::ingest::companies::slug;

pub const ROLES: [&str; 6] = [
    "Software Engineer",
    "Data Scientist",
    "Machine Learning Engineer",
    "Frontend Developer",
    "Backend Developer",
    "Product Manager",
];

pub const LOCATIONS: [&str; 8] = [
    "San Francisco",
    "New York",
    "Seattle",
    "Austin",
    "Los Angeles",
    "Chicago",
    "Boston",
    "Remote",
];

pub const EXPERIENCE_LEVELS: [&str; 5] = [
    "LESS_THAN_ONE",
    "ONE_TO_THREE",
    "FOUR_TO_SIX",
    "SEVEN_TO_NINE",
    "TEN_PLUS",
];

/// Cities crossed with experience bands (career progression views).
pub const EXPERIENCE_CITIES: [&str; 2] = ["New York", "San Francisco"];

pub const COMPANIES: [&str; 15] = [
    "Google",
    "Amazon",
    "Microsoft",
    "Apple",
    "Meta",
    "Netflix",
    "Nvidia",
    "Salesforce",
    "Adobe",
    "IBM",
    "Oracle",
    "Uber",
    "Airbnb",
    "Stripe",
    "Coinbase",
];

/// Roles crossed with companies.
pub const COMPANY_ROLES: [&str; 5] = [
    "Software Engineer",
    "Data Scientist",
    "Machine Learning Engineer",
    "Product Manager",
    "DevOps Engineer",
];

pub const TECH_CATEGORIES: [&str; 4] = [
    "Software Engineering",
    "Data Science",
    "Data and Analytics",
    "Computer and IT",
];

pub const ALL_LEVELS: [&str; 3] = ["Entry Level", "Mid Level", "Senior Level"];

pub const US_CITIES: [&str; 7] = [
    "New York, NY",
    "San Francisco, CA",
    "Chicago, IL",
    "Seattle, WA",
    "Los Angeles, CA",
    "Austin, TX",
    "Boston, MA",
];

const DEFAULT_EXPERIENCE: &str = "ONE_TO_THREE";

/// Named batch presets. Each expands to a fixed, reproducible plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 6 roles x 8 cities = 48 salary-by-location queries.
    Locations,
    /// 6 roles x 5 experience bands x 2 cities = 60 queries.
    Experience,
    /// 5 roles x 15 companies = 75 queries.
    Companies,
    /// 4 job categories x 3 levels = 12 job searches, worldwide.
    TechAll,
    /// The same 12 searches restricted to 7 US cities.
    TechUs,
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "locations" => Ok(Preset::Locations),
            "experience" => Ok(Preset::Experience),
            "companies" => Ok(Preset::Companies),
            "tech-all" => Ok(Preset::TechAll),
            "tech-us" => Ok(Preset::TechUs),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Preset::Locations => "locations",
            Preset::Experience => "experience",
            Preset::Companies => "companies",
            Preset::TechAll => "tech-all",
            Preset::TechUs => "tech-us",
        };
        f.write_str(name)
    }
}

/// One fully specified job-board search. Categories and levels carry at most
/// one entry each after combo splitting; locations ride along unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    pub categories: Vec<String>,
    pub levels: Vec<String>,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalaryKind {
    ByLocation,
    ByExperience,
    ByCompany,
}

impl SalaryKind {
    pub fn doc_type(&self) -> &'static str {
        match self {
            SalaryKind::ByLocation => "salary_by_location",
            SalaryKind::ByExperience => "salary_by_experience",
            SalaryKind::ByCompany => "salary_by_company",
        }
    }
}

/// One fully specified salary API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryQuery {
    pub kind: SalaryKind,
    pub job_title: String,
    pub location: Option<String>,
    pub years_of_experience: Option<String>,
    pub company: Option<String>,
}

impl SalaryQuery {
    /// Deterministic document id derived from the query dimensions, so the
    /// same query always dedupes against its earlier result.
    pub fn doc_id(&self) -> String {
        let role = slug(&self.job_title);
        match self.kind {
            SalaryKind::ByLocation => {
                let loc = slug(self.location.as_deref().unwrap_or(""));
                let exp = self
                    .years_of_experience
                    .as_deref()
                    .unwrap_or(DEFAULT_EXPERIENCE)
                    .replace('_', "-");
                format!("salary_location:{role}:{loc}:{exp}")
            }
            SalaryKind::ByExperience => {
                let loc = slug(self.location.as_deref().unwrap_or(""));
                let exp = self
                    .years_of_experience
                    .as_deref()
                    .unwrap_or("")
                    .replace('_', "-");
                format!("salary_experience:{role}:{loc}:{exp}")
            }
            SalaryKind::ByCompany => {
                let company = slug(self.company.as_deref().unwrap_or(""));
                format!("salary_company:{role}:{company}")
            }
        }
    }
}

/// One planned external API request. Consumed once by the run loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestDescriptor {
    JobSearch(JobQuery),
    Salary(SalaryQuery),
}

impl RequestDescriptor {
    /// Short human-readable form for logs and dry-run output.
    pub fn label(&self) -> String {
        match self {
            RequestDescriptor::JobSearch(q) => {
                let cat = q.categories.first().map(String::as_str).unwrap_or("all");
                let lvl = q.levels.first().map(String::as_str).unwrap_or("all");
                if q.locations.is_empty() {
                    format!("{cat} / {lvl}")
                } else {
                    format!("{cat} / {lvl} ({} cities)", q.locations.len())
                }
            }
            RequestDescriptor::Salary(q) => {
                let target = q
                    .company
                    .as_deref()
                    .or(q.location.as_deref())
                    .unwrap_or("?");
                match &q.years_of_experience {
                    Some(exp) if q.kind == SalaryKind::ByExperience => {
                        format!("{} - {target} ({exp})", q.job_title)
                    }
                    _ => format!("{} - {target}", q.job_title),
                }
            }
        }
    }
}

/// Expands a preset into its full request sequence.
pub fn plan(preset: Preset) -> Vec<RequestDescriptor> {
    match preset {
        Preset::Locations => ROLES
            .iter()
            .flat_map(|role| {
                LOCATIONS.iter().map(move |loc| {
                    RequestDescriptor::Salary(SalaryQuery {
                        kind: SalaryKind::ByLocation,
                        job_title: role.to_string(),
                        location: Some(loc.to_string()),
                        years_of_experience: Some(DEFAULT_EXPERIENCE.to_string()),
                        company: None,
                    })
                })
            })
            .collect(),
        Preset::Experience => ROLES
            .iter()
            .flat_map(|role| {
                EXPERIENCE_CITIES.iter().flat_map(move |city| {
                    EXPERIENCE_LEVELS.iter().map(move |exp| {
                        RequestDescriptor::Salary(SalaryQuery {
                            kind: SalaryKind::ByExperience,
                            job_title: role.to_string(),
                            location: Some(city.to_string()),
                            years_of_experience: Some(exp.to_string()),
                            company: None,
                        })
                    })
                })
            })
            .collect(),
        Preset::Companies => COMPANY_ROLES
            .iter()
            .flat_map(|role| {
                COMPANIES.iter().map(move |company| {
                    RequestDescriptor::Salary(SalaryQuery {
                        kind: SalaryKind::ByCompany,
                        job_title: role.to_string(),
                        location: None,
                        years_of_experience: None,
                        company: Some(company.to_string()),
                    })
                })
            })
            .collect(),
        Preset::TechAll => job_combos(&TECH_CATEGORIES, &ALL_LEVELS, &[]),
        Preset::TechUs => job_combos(&TECH_CATEGORIES, &ALL_LEVELS, &US_CITIES),
    }
}

/// Expands explicit repeatable filters into job-search descriptors. Errors
/// before any request if no filter was given at all.
pub fn plan_filters(
    categories: &[String],
    levels: &[String],
    locations: &[String],
) -> Result<Vec<RequestDescriptor>, ConfigError> {
    if categories.is_empty() && levels.is_empty() && locations.is_empty() {
        return Err(ConfigError::EmptyQuery);
    }
    let cats: Vec<&str> = categories.iter().map(String::as_str).collect();
    let lvls: Vec<&str> = levels.iter().map(String::as_str).collect();
    let locs: Vec<&str> = locations.iter().map(String::as_str).collect();
    Ok(job_combos(&cats, &lvls, &locs))
}

/// Splits categories x levels into individual queries. Each combo gets its
/// own pagination window, which is how we reach past the job board's
/// 100-page cap on any single query.
fn job_combos(
    categories: &[&str],
    levels: &[&str],
    locations: &[&str],
) -> Vec<RequestDescriptor> {
    let cats: Vec<Option<&str>> = if categories.is_empty() {
        vec![None]
    } else {
        categories.iter().copied().map(Some).collect()
    };
    let lvls: Vec<Option<&str>> = if levels.is_empty() {
        vec![None]
    } else {
        levels.iter().copied().map(Some).collect()
    };

    let mut combos = Vec::with_capacity(cats.len() * lvls.len());
    for cat in &cats {
        for lvl in &lvls {
            combos.push(RequestDescriptor::JobSearch(JobQuery {
                categories: cat.map(str::to_string).into_iter().collect(),
                levels: lvl.map(str::to_string).into_iter().collect(),
                locations: locations.iter().map(|s| s.to_string()).collect(),
            }));
        }
    }
    combos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_preset_is_config_error() {
        let err = "tech-eu".parse::<Preset>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreset(name) if name == "tech-eu"));
    }

    #[test]
    fn test_all_preset_names_parse() {
        for name in ["locations", "experience", "companies", "tech-all", "tech-us"] {
            let preset: Preset = name.parse().unwrap();
            assert_eq!(preset.to_string(), name);
        }
    }

    #[test]
    fn test_locations_preset_is_roles_times_cities() {
        let plan = plan(Preset::Locations);
        assert_eq!(plan.len(), 48); // 6 roles x 8 cities
        assert!(plan
            .iter()
            .all(|d| matches!(d, RequestDescriptor::Salary(q) if q.kind == SalaryKind::ByLocation)));
    }

    #[test]
    fn test_experience_preset_count() {
        assert_eq!(plan(Preset::Experience).len(), 60); // 6 x 5 x 2
    }

    #[test]
    fn test_companies_preset_count() {
        assert_eq!(plan(Preset::Companies).len(), 75); // 5 x 15
    }

    #[test]
    fn test_tech_presets_are_category_level_combos() {
        let all = plan(Preset::TechAll);
        assert_eq!(all.len(), 12); // 4 categories x 3 levels
        let us = plan(Preset::TechUs);
        assert_eq!(us.len(), 12);
        for descriptor in &us {
            match descriptor {
                RequestDescriptor::JobSearch(q) => {
                    assert_eq!(q.categories.len(), 1);
                    assert_eq!(q.levels.len(), 1);
                    assert_eq!(q.locations.len(), 7);
                }
                other => panic!("unexpected descriptor {other:?}"),
            }
        }
    }

    #[test]
    fn test_planning_is_deterministic() {
        for preset in [
            Preset::Locations,
            Preset::Experience,
            Preset::Companies,
            Preset::TechAll,
            Preset::TechUs,
        ] {
            assert_eq!(plan(preset), plan(preset));
        }
    }

    #[test]
    fn test_filters_require_at_least_one_value() {
        let err = plan_filters(&[], &[], &[]).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyQuery));
    }

    #[test]
    fn test_filters_split_into_combos() {
        let cats = vec!["Software Engineering".to_string(), "Data Science".to_string()];
        let lvls = vec!["Entry Level".to_string()];
        let combos = plan_filters(&cats, &lvls, &[]).unwrap();
        assert_eq!(combos.len(), 2);
    }

    #[test]
    fn test_location_only_filter_is_single_query() {
        let locs = vec!["Berlin".to_string()];
        let combos = plan_filters(&[], &[], &locs).unwrap();
        assert_eq!(combos.len(), 1);
        match &combos[0] {
            RequestDescriptor::JobSearch(q) => {
                assert!(q.categories.is_empty());
                assert_eq!(q.locations, vec!["Berlin"]);
            }
            other => panic!("unexpected descriptor {other:?}"),
        }
    }

    #[test]
    fn test_salary_doc_ids_are_deterministic() {
        let by_location = SalaryQuery {
            kind: SalaryKind::ByLocation,
            job_title: "Software Engineer".to_string(),
            location: Some("San Francisco".to_string()),
            years_of_experience: Some("ONE_TO_THREE".to_string()),
            company: None,
        };
        assert_eq!(
            by_location.doc_id(),
            "salary_location:software-engineer:san-francisco:ONE-TO-THREE"
        );

        let by_company = SalaryQuery {
            kind: SalaryKind::ByCompany,
            job_title: "Product Manager".to_string(),
            location: None,
            years_of_experience: None,
            company: Some("Google".to_string()),
        };
        assert_eq!(by_company.doc_id(), "salary_company:product-manager:google");
    }
}
