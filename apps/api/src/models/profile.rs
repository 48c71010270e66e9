//! Student profile submitted by the orientation form.
//!
//! Every field is optional and parsing is permissive: unknown enum values
//! fall back to a default label and unknown tags pass through verbatim.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_LOCATION: &str = "Saint-Chamond (42400)";
pub const DEFAULT_STUDY_YEARS: u32 = 2;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    #[serde(deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub mobility: Option<String>,
    #[serde(deserialize_with = "lenient_years")]
    pub study_duration: Option<u32>,
    #[serde(deserialize_with = "lenient_string")]
    pub alternance: Option<String>,
    #[serde(deserialize_with = "lenient_tags")]
    pub personality: Vec<String>,
    #[serde(deserialize_with = "lenient_tags")]
    pub environment: Vec<String>,
    #[serde(deserialize_with = "lenient_tags")]
    pub priorities: Vec<String>,
    #[serde(deserialize_with = "lenient_tags")]
    pub sectors: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub dream: Option<String>,
}

impl Profile {
    pub fn location(&self) -> &str {
        non_blank(self.location.as_deref()).unwrap_or(DEFAULT_LOCATION)
    }

    pub fn mobility(&self) -> Mobility {
        Mobility::from_tag(self.mobility.as_deref())
    }

    pub fn study_years(&self) -> u32 {
        self.study_duration.unwrap_or(DEFAULT_STUDY_YEARS)
    }

    pub fn alternance(&self) -> Alternance {
        Alternance::from_tag(self.alternance.as_deref())
    }

    pub fn dream(&self) -> Option<&str> {
        non_blank(self.dream.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Accepts a profile object. `null` or any other shape is treated as absent.
pub fn lenient_profile<'de, D>(deserializer: D) -> Result<Option<Profile>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => Profile::deserialize(value).ok(),
        _ => None,
    })
}

/// Keeps strings; numbers, booleans and the rest are treated as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Accepts a number, a numeric string, or anything else (treated as absent).
fn lenient_years<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

/// Accepts an array of strings or null. Non-string items are dropped.
fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Enumerated fields
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mobility {
    Local,
    Regional,
    National,
    /// Also the fallback for absent or unknown values.
    International,
}

impl Mobility {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::trim) {
            Some("local") => Mobility::Local,
            Some("regional") => Mobility::Regional,
            Some("national") => Mobility::National,
            _ => Mobility::International,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mobility::Local => "Proche uniquement (30 min)",
            Mobility::Regional => "Région Auvergne-Rhône-Alpes",
            Mobility::National => "France entière",
            Mobility::International => "International possible",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alternance {
    Yes,
    No,
    /// Fallback for absent or unknown values.
    Open,
}

impl Alternance {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::trim) {
            Some("yes") => Alternance::Yes,
            Some("no") => Alternance::No,
            _ => Alternance::Open,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Alternance::Yes => "Préférée",
            Alternance::No => "Non souhaitée",
            Alternance::Open => "Ouverte",
        }
    }
}

/// Geographic scope of a targeted search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    National,
    Regional,
    /// Fallback: region first, then the whole country.
    RegionFirst,
}

impl SearchScope {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::trim) {
            Some("national") => SearchScope::National,
            Some("regional") => SearchScope::Regional,
            _ => SearchScope::RegionFirst,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SearchScope::National => "FRANCE ENTIÈRE",
            SearchScope::Regional => "Région Auvergne-Rhône-Alpes (Lyon, Saint-Étienne)",
            SearchScope::RegionFirst => "Région prioritaire, puis France si nécessaire",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tag label tables
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSet {
    Personality,
    Environment,
    Priorities,
    Sectors,
}

const PERSONALITY_LABELS: &[(&str, &str)] = &[
    ("creative", "créer/imaginer"),
    ("manual", "fabriquer de ses mains"),
    ("technical", "technique/précision"),
    ("social", "contact humain"),
    ("organize", "organiser/gérer"),
    ("aesthetic", "esthétique/beauté"),
    ("solve", "résoudre des problèmes"),
    ("lead", "diriger/décider"),
];

const ENVIRONMENT_LABELS: &[(&str, &str)] = &[
    ("office", "bureau/ordinateur"),
    ("workshop", "atelier"),
    ("site", "chantiers"),
    ("client", "chez les clients"),
    ("store", "commerce/showroom"),
    ("travel", "en déplacement"),
    ("independent", "indépendante"),
    ("varied", "environnement varié"),
];

const PRIORITY_LABELS: &[(&str, &str)] = &[
    ("money", "bien gagner sa vie"),
    ("passion", "vivre de sa passion"),
    ("stability", "stabilité de l'emploi"),
    ("freedom", "liberté/autonomie"),
    ("evolution", "évolution rapide"),
    ("balance", "équilibre vie pro/perso"),
    ("meaning", "travail qui a du sens"),
    ("prestige", "reconnaissance sociale"),
];

const SECTOR_LABELS: &[(&str, &str)] = &[
    ("interior", "décoration intérieure"),
    ("architecture", "architecture"),
    ("luxury", "luxe/haut de gamme"),
    ("events", "événementiel"),
    ("cinema", "cinéma/audiovisuel"),
    ("theater", "spectacle/théâtre"),
    ("museum", "musées/expositions"),
    ("retail", "boutiques/retail"),
    ("hotel", "hôtellerie"),
    ("boats", "nautisme/yachts"),
    ("real-estate", "immobilier"),
    ("furniture", "meubles/ébénisterie"),
    ("digital", "numérique/3D/BIM"),
    ("eco", "éco-construction/durable"),
    ("craft", "artisanat d'art"),
    ("sales", "commerce/vente"),
];

impl TagSet {
    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            TagSet::Personality => PERSONALITY_LABELS,
            TagSet::Environment => ENVIRONMENT_LABELS,
            TagSet::Priorities => PRIORITY_LABELS,
            TagSet::Sectors => SECTOR_LABELS,
        }
    }

    /// Human label for `tag`; unknown tags are returned unchanged.
    pub fn label<'a>(self, tag: &'a str) -> &'a str {
        self.table()
            .iter()
            .find(|(key, _)| *key == tag)
            .map(|(_, label)| *label)
            .unwrap_or(tag)
    }

    /// Labels every tag and joins them with `", "`.
    pub fn join_labels(self, tags: &[String]) -> String {
        tags.iter()
            .map(|t| self.label(t))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let profile: Profile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile.location(), DEFAULT_LOCATION);
        assert_eq!(profile.mobility(), Mobility::International);
        assert_eq!(profile.study_years(), 2);
        assert_eq!(profile.alternance(), Alternance::Open);
        assert!(profile.personality.is_empty());
        assert!(profile.dream().is_none());
    }

    #[test]
    fn test_camel_case_fields() {
        let profile: Profile = serde_json::from_str(
            r#"{
                "location": "Lyon",
                "mobility": "regional",
                "studyDuration": 3,
                "alternance": "yes",
                "sectors": ["cinema", "boats"],
                "dream": "Travailler sur des décors de films"
            }"#,
        )
        .unwrap();
        assert_eq!(profile.location(), "Lyon");
        assert_eq!(profile.mobility(), Mobility::Regional);
        assert_eq!(profile.study_years(), 3);
        assert_eq!(profile.alternance(), Alternance::Yes);
        assert_eq!(profile.sectors, vec!["cinema", "boats"]);
        assert_eq!(profile.dream(), Some("Travailler sur des décors de films"));
    }

    #[test]
    fn test_study_duration_accepts_numeric_string() {
        let profile: Profile = serde_json::from_str(r#"{"studyDuration": "5"}"#).unwrap();
        assert_eq!(profile.study_years(), 5);
    }

    #[test]
    fn test_study_duration_garbage_falls_back() {
        let profile: Profile = serde_json::from_str(r#"{"studyDuration": "beaucoup"}"#).unwrap();
        assert_eq!(profile.study_years(), 2);
        let profile: Profile = serde_json::from_str(r#"{"studyDuration": -1}"#).unwrap();
        assert_eq!(profile.study_years(), 2);
    }

    #[test]
    fn test_null_tags_are_empty() {
        let profile: Profile =
            serde_json::from_str(r#"{"personality": null, "sectors": ["eco", 4]}"#).unwrap();
        assert!(profile.personality.is_empty());
        assert_eq!(profile.sectors, vec!["eco"]);
    }

    #[test]
    fn test_non_string_fields_fall_back() {
        let profile: Profile = serde_json::from_str(
            r#"{"location": 42, "mobility": 5, "alternance": true, "dream": ["x"]}"#,
        )
        .unwrap();
        assert_eq!(profile.location(), DEFAULT_LOCATION);
        assert_eq!(profile.mobility(), Mobility::International);
        assert_eq!(profile.alternance(), Alternance::Open);
        assert!(profile.dream().is_none());
    }

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        #[serde(default, deserialize_with = "lenient_profile")]
        profile: Option<Profile>,
    }

    #[test]
    fn test_profile_of_wrong_shape_is_absent() {
        for body in [r#"{"profile": null}"#, r#"{"profile": 7}"#, r#"{"profile": "Lyon"}"#, "{}"] {
            let wrapper: Wrapper = serde_json::from_str(body).unwrap();
            assert!(wrapper.profile.is_none(), "{body}");
        }

        let wrapper: Wrapper =
            serde_json::from_str(r#"{"profile": {"location": "Roanne", "mobility": 3}}"#).unwrap();
        let profile = wrapper.profile.unwrap();
        assert_eq!(profile.location(), "Roanne");
        assert_eq!(profile.mobility(), Mobility::International);
    }

    #[test]
    fn test_unknown_enum_values_fall_back() {
        assert_eq!(Mobility::from_tag(Some("mars")), Mobility::International);
        assert_eq!(Alternance::from_tag(Some("maybe")), Alternance::Open);
        assert_eq!(SearchScope::from_tag(None), SearchScope::RegionFirst);
    }

    #[test]
    fn test_blank_location_uses_default() {
        let profile = Profile {
            location: Some("   ".to_string()),
            ..Profile::default()
        };
        assert_eq!(profile.location(), DEFAULT_LOCATION);
    }

    #[test]
    fn test_known_tags_are_labelled_unknown_pass_through() {
        assert_eq!(TagSet::Sectors.label("real-estate"), "immobilier");
        assert_eq!(TagSet::Personality.label("juggling"), "juggling");
        let tags = vec!["workshop".to_string(), "rooftop".to_string()];
        assert_eq!(TagSet::Environment.join_labels(&tags), "atelier, rooftop");
    }
}
