//! Predicate filters over the caregiver catalogue.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const AGE_LIMITS: (u32, u32) = (18, 65);
pub const DEFAULT_AGE_RANGE: (u32, u32) = (25, 55);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caregiver {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    pub city: String,
    #[serde(default)]
    pub hometown: String,
    pub age: u32,
    pub specialty: String,
    pub monthly_salary: u32,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub short_bio: String,
    #[serde(default)]
    pub available: bool,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read caregiver catalogue: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse caregiver catalogue: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("caregiver {0} not found")]
    NotFound(String),
}

pub fn load_caregivers<P: AsRef<Path>>(path: P) -> Result<Vec<Caregiver>, CatalogError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn find_caregiver<'a>(catalogue: &'a [Caregiver], id: &str) -> Result<&'a Caregiver, CatalogError> {
    catalogue
        .iter()
        .find(|caregiver| caregiver.id == id)
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))
}

/// Every field is optional; an empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct CaregiverFilter {
    /// Matched against name, specialty and skills.
    pub search: Option<String>,
    /// Matched against specialty.
    pub category: Option<String>,
    pub min_salary: Option<u32>,
    pub max_salary: Option<u32>,
    /// All listed skills must be present.
    pub skills: Vec<String>,
    pub age_range: Option<(u32, u32)>,
    pub city: Option<String>,
}

impl CaregiverFilter {
    pub fn matches(&self, caregiver: &Caregiver) -> bool {
        if let Some(search) = non_empty(&self.search) {
            let needle = search.to_lowercase();
            let hit = contains(&caregiver.name, &needle)
                || contains(&caregiver.specialty, &needle)
                || caregiver.skills.iter().any(|skill| contains(skill, &needle));
            if !hit {
                return false;
            }
        }

        if let Some(category) = non_empty(&self.category) {
            if !contains(&caregiver.specialty, &category.to_lowercase()) {
                return false;
            }
        }

        if let Some(city) = non_empty(&self.city) {
            if caregiver.city != city {
                return false;
            }
        }

        if self.min_salary.is_some_and(|min| caregiver.monthly_salary < min)
            || self.max_salary.is_some_and(|max| caregiver.monthly_salary > max)
        {
            return false;
        }

        if !self
            .skills
            .iter()
            .all(|wanted| caregiver.skills.iter().any(|skill| skill == wanted))
        {
            return false;
        }

        if let Some((low, high)) = self.age_range.map(clamp_age_range) {
            if caregiver.age < low || caregiver.age > high {
                return false;
            }
        }

        true
    }

    pub fn apply<'a>(&self, caregivers: &'a [Caregiver]) -> Vec<&'a Caregiver> {
        caregivers.iter().filter(|c| self.matches(c)).collect()
    }
}

/// Orders the bounds and pins them to the selectable age limits.
pub fn clamp_age_range((a, b): (u32, u32)) -> (u32, u32) {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    (
        low.clamp(AGE_LIMITS.0, AGE_LIMITS.1),
        high.clamp(AGE_LIMITS.0, AGE_LIMITS.1),
    )
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

/// Small built-in catalogue used when no catalogue file is configured.
pub fn sample_caregivers() -> Vec<Caregiver> {
    vec![
        Caregiver {
            id: "1".into(),
            name: "王淑芳".into(),
            image_url: "https://images.pexels.com/photos/3768167/pexels-photo-3768167.jpeg".into(),
            city: "武汉".into(),
            hometown: "湖北武汉".into(),
            age: 45,
            specialty: "育婴护理".into(),
            monthly_salary: 8000,
            rating: 4.9,
            review_count: 128,
            experience: 8,
            skills: vec!["育婴".into(), "做饭".into(), "早教".into(), "月嫂".into()],
            certifications: vec!["育婴师证书".into(), "健康证".into(), "母婴护理证".into()],
            short_bio: "性格温和，有耐心，擅长照顾新生儿和婴幼儿。".into(),
            available: true,
        },
        Caregiver {
            id: "2".into(),
            name: "李秀兰".into(),
            image_url: "https://images.pexels.com/photos/3768140/pexels-photo-3768140.jpeg".into(),
            city: "武汉".into(),
            hometown: "湖北孝感".into(),
            age: 52,
            specialty: "老人陪护".into(),
            monthly_salary: 6500,
            rating: 4.7,
            review_count: 86,
            experience: 12,
            skills: vec!["做饭".into(), "保洁".into(), "老人护理".into()],
            certifications: vec!["健康证".into(), "养老护理员证".into()],
            short_bio: "做事细心，照顾老人经验丰富。".into(),
            available: true,
        },
        Caregiver {
            id: "3".into(),
            name: "张丽".into(),
            image_url: "https://images.pexels.com/photos/3768131/pexels-photo-3768131.jpeg".into(),
            city: "北京".into(),
            hometown: "河南信阳".into(),
            age: 38,
            specialty: "住家保姆".into(),
            monthly_salary: 9000,
            rating: 4.8,
            review_count: 64,
            experience: 6,
            skills: vec!["做饭".into(), "保洁".into(), "育婴".into()],
            certifications: vec!["健康证".into()],
            short_bio: "擅长家常菜，收纳整理能力强。".into(),
            available: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(found: Vec<&Caregiver>) -> Vec<&str> {
        found.into_iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_matches_all() {
        let catalogue = sample_caregivers();
        assert_eq!(CaregiverFilter::default().apply(&catalogue).len(), 3);
    }

    #[test]
    fn search_covers_name_specialty_and_skills() {
        let catalogue = sample_caregivers();
        let by_skill = CaregiverFilter {
            search: Some("育婴".into()),
            ..Default::default()
        };
        assert_eq!(ids(by_skill.apply(&catalogue)), vec!["1", "3"]);

        let by_name = CaregiverFilter {
            search: Some("李".into()),
            ..Default::default()
        };
        assert_eq!(ids(by_name.apply(&catalogue)), vec!["2"]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let mut catalogue = sample_caregivers();
        catalogue[0].specialty = "Infant Care".into();
        let filter = CaregiverFilter {
            search: Some("INFANT".into()),
            ..Default::default()
        };
        assert_eq!(ids(filter.apply(&catalogue)), vec!["1"]);
    }

    #[test]
    fn salary_bounds_are_inclusive() {
        let catalogue = sample_caregivers();
        let filter = CaregiverFilter {
            min_salary: Some(6500),
            max_salary: Some(8000),
            ..Default::default()
        };
        assert_eq!(ids(filter.apply(&catalogue)), vec!["1", "2"]);
    }

    #[test]
    fn every_selected_skill_is_required() {
        let catalogue = sample_caregivers();
        let filter = CaregiverFilter {
            skills: vec!["做饭".into(), "保洁".into()],
            ..Default::default()
        };
        assert_eq!(ids(filter.apply(&catalogue)), vec!["2", "3"]);
    }

    #[test]
    fn age_range_is_clamped_and_ordered() {
        assert_eq!(clamp_age_range((70, 10)), (18, 65));
        assert_eq!(clamp_age_range(DEFAULT_AGE_RANGE), (25, 55));

        let catalogue = sample_caregivers();
        let filter = CaregiverFilter {
            age_range: Some((50, 40)),
            ..Default::default()
        };
        assert_eq!(ids(filter.apply(&catalogue)), vec!["1"]);
    }

    #[test]
    fn blank_search_is_ignored() {
        let catalogue = sample_caregivers();
        let filter = CaregiverFilter {
            search: Some("   ".into()),
            category: Some("陪护".into()),
            ..Default::default()
        };
        assert_eq!(ids(filter.apply(&catalogue)), vec!["2"]);
    }

    #[test]
    fn catalogue_loads_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caregivers.json");
        fs::write(
            &path,
            r#"[{"id":"9","name":"Amy","city":"Wuhan","age":30,"specialty":"Cooking","monthlySalary":7000}]"#,
        )
        .unwrap();

        let catalogue = load_caregivers(&path).unwrap();
        assert_eq!(catalogue[0].monthly_salary, 7000);
        assert!(catalogue[0].skills.is_empty());
        assert!(matches!(
            load_caregivers(dir.path().join("missing.json")),
            Err(CatalogError::Io(_))
        ));
    }

    #[test]
    fn lookup_by_id() {
        let catalogue = sample_caregivers();
        assert_eq!(find_caregiver(&catalogue, "2").unwrap().name, "李秀兰");
        assert!(matches!(
            find_caregiver(&catalogue, "404"),
            Err(CatalogError::NotFound(id)) if id == "404"
        ));
    }
}
