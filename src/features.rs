//! Feature engineering: raw employee selections → model input row.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::artifacts::Encoders;
use crate::error::AppError;

/// Column order the model was trained on
pub const FEATURE_NAMES: [&str; 12] = [
    "Education",
    "Employment",
    "DevType",
    "Experience",
    "Country",
    "Edu_Exp",
    "Country_Exp",
    "OrgSize_Enterprise",
    "OrgSize_Large",
    "OrgSize_Medium",
    "OrgSize_Micro",
    "OrgSize_Small",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrgSize {
    Enterprise,
    Large,
    Medium,
    Micro,
    Small,
}

impl OrgSize {
    /// Every size, in selector and indicator-column order
    pub const ALL: [OrgSize; 5] = [
        OrgSize::Enterprise,
        OrgSize::Large,
        OrgSize::Medium,
        OrgSize::Micro,
        OrgSize::Small,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OrgSize::Enterprise => "Enterprise",
            OrgSize::Large => "Large",
            OrgSize::Medium => "Medium",
            OrgSize::Micro => "Micro",
            OrgSize::Small => "Small",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|size| size.label()).collect()
    }

    /// One-hot indicators in `ALL` order
    pub fn indicators(self) -> [f64; 5] {
        Self::ALL.map(|size| if size == self { 1.0 } else { 0.0 })
    }
}

impl fmt::Display for OrgSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrgSize {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.label() == s)
            .ok_or_else(|| AppError::unknown_category("organization size", s))
    }
}

/// The six raw selections collected by the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub education: String,
    pub employment: String,
    pub dev_type: String,
    /// Years, ≥ 0 in steps of 0.5
    pub experience: f64,
    pub country: String,
    pub org_size: String,
}

/// One model input row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub education: f64,
    pub employment: f64,
    pub dev_type: f64,
    pub experience: f64,
    pub country: f64,
    pub edu_exp: f64,
    pub country_exp: f64,
    pub org_size_enterprise: f64,
    pub org_size_large: f64,
    pub org_size_medium: f64,
    pub org_size_micro: f64,
    pub org_size_small: f64,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order
    pub fn to_row(&self) -> [f64; 12] {
        [
            self.education,
            self.employment,
            self.dev_type,
            self.experience,
            self.country,
            self.edu_exp,
            self.country_exp,
            self.org_size_enterprise,
            self.org_size_large,
            self.org_size_medium,
            self.org_size_micro,
            self.org_size_small,
        ]
    }

    pub fn org_size_indicators(&self) -> [f64; 5] {
        [
            self.org_size_enterprise,
            self.org_size_large,
            self.org_size_medium,
            self.org_size_micro,
            self.org_size_small,
        ]
    }

    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.to_row())
    }
}

pub struct FeatureEncoder<'a> {
    encoders: &'a Encoders,
}

impl<'a> FeatureEncoder<'a> {
    pub fn new(encoders: &'a Encoders) -> Self {
        Self { encoders }
    }

    pub fn encode(&self, profile: &EmployeeProfile) -> Result<FeatureVector, AppError> {
        let experience = profile.experience;
        if !experience.is_finite() || experience < 0.0 {
            return Err(AppError::InvalidInput(format!(
                "years of experience must be a number ≥ 0, got {}",
                experience
            )));
        }

        let education = f64::from(self.encoders.education.encode(&profile.education)?);
        let employment = f64::from(self.encoders.employment.encode(&profile.employment)?);
        let dev_type = f64::from(self.encoders.dev_type.encode(&profile.dev_type)?);
        let country = f64::from(self.encoders.country.encode(&profile.country)?);
        let org_size: OrgSize = profile.org_size.parse()?;

        let [enterprise, large, medium, micro, small] = org_size.indicators();

        Ok(FeatureVector {
            education,
            employment,
            dev_type,
            experience,
            country,
            edu_exp: education * experience,
            country_exp: country * experience,
            org_size_enterprise: enterprise,
            org_size_large: large,
            org_size_medium: medium,
            org_size_micro: micro,
            org_size_small: small,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::LabelEncoder;

    fn encoders() -> Encoders {
        Encoders {
            education: LabelEncoder::fit(
                "education",
                ["Bachelor's degree", "Less than a Bachelors", "Master's degree", "Post grad"],
            )
            .unwrap(),
            employment: LabelEncoder::fit("employment", ["Full-time", "Part-time", "Self-employed"])
                .unwrap(),
            dev_type: LabelEncoder::fit(
                "developer type",
                ["Data scientist", "Developer, back-end", "Developer, front-end"],
            )
            .unwrap(),
            country: LabelEncoder::fit("country", ["Germany", "India", "United States of America"])
                .unwrap(),
        }
    }

    fn profile(org_size: &str, experience: f64) -> EmployeeProfile {
        EmployeeProfile {
            education: "Master's degree".to_string(),
            employment: "Full-time".to_string(),
            dev_type: "Developer, back-end".to_string(),
            experience,
            country: "India".to_string(),
            org_size: org_size.to_string(),
        }
    }

    #[test]
    fn test_feature_names_match_row_order() {
        let encoders = encoders();
        let vector = FeatureEncoder::new(&encoders).encode(&profile("Small", 2.0)).unwrap();
        let named: Vec<_> = vector.named().collect();
        assert_eq!(named[0], ("Education", 2.0));
        assert_eq!(named[3], ("Experience", 2.0));
        assert_eq!(named[4], ("Country", 1.0));
        assert_eq!(named[11], ("OrgSize_Small", 1.0));
    }

    #[test]
    fn test_exactly_one_org_size_indicator() {
        let encoders = encoders();
        let encoder = FeatureEncoder::new(&encoders);

        for (idx, size) in OrgSize::ALL.iter().enumerate() {
            let vector = encoder.encode(&profile(size.label(), 3.5)).unwrap();
            let indicators = vector.org_size_indicators();
            assert_eq!(indicators.iter().sum::<f64>(), 1.0);
            assert_eq!(indicators[idx], 1.0);
        }
    }

    #[test]
    fn test_interaction_terms_are_exact_products() {
        let encoders = encoders();
        let encoder = FeatureEncoder::new(&encoders);

        for step in 0..=100 {
            let experience = step as f64 * 0.5;
            let vector = encoder.encode(&profile("Medium", experience)).unwrap();
            assert_eq!(vector.edu_exp, vector.education * experience);
            assert_eq!(vector.country_exp, vector.country * experience);
        }
    }

    #[test]
    fn test_zero_experience() {
        let encoders = encoders();
        let vector = FeatureEncoder::new(&encoders).encode(&profile("Large", 0.0)).unwrap();
        assert_eq!(vector.edu_exp, 0.0);
        assert_eq!(vector.country_exp, 0.0);
    }

    #[test]
    fn test_unknown_country_fails() {
        let encoders = encoders();
        let mut input = profile("Micro", 1.0);
        input.country = "Atlantis".to_string();

        let err = FeatureEncoder::new(&encoders).encode(&input).unwrap_err();
        assert!(matches!(err, AppError::UnknownCategory { ref category, .. } if category == "country"));
    }

    #[test]
    fn test_unknown_org_size_fails_loudly() {
        let encoders = encoders();
        let err = FeatureEncoder::new(&encoders)
            .encode(&profile("Gigantic", 1.0))
            .unwrap_err();
        assert!(err.to_string().contains("organization size"));
    }

    #[test]
    fn test_negative_experience_rejected() {
        let encoders = encoders();
        let err = FeatureEncoder::new(&encoders)
            .encode(&profile("Medium", -0.5))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_org_size_round_trip_labels() {
        for size in OrgSize::ALL {
            assert_eq!(size.label().parse::<OrgSize>().unwrap(), size);
        }
        assert_eq!(OrgSize::labels(), ["Enterprise", "Large", "Medium", "Micro", "Small"]);
    }
}
