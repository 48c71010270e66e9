//! Pure builders for the text blocks embedded into prompts.

use crate::models::profile::{Profile, TagSet};

/// Substituted for any phase output that did not succeed.
pub const NOT_AVAILABLE: &str = "Non disponible";

const DELIMITER: &str = "═══════════════════════════════════════════════════════════════";

/// Sector line of the research prompt when the profile names no sector.
const DEFAULT_SECTORS: &str = "- Cinéma/décors, luxe, événementiel, nautisme, numérique/BIM";

/// Markdown summary of the profile shared by every prompt.
pub fn profile_context(profile: &Profile) -> String {
    let mut context = format!(
        "## PROFIL DE L'ÉTUDIANTE\n\
         \n\
         **Diplôme** : Bac Pro ERA (Étude et Réalisation d'Agencement)\n\
         **Localisation** : {location}\n\
         **Région** : Auvergne-Rhône-Alpes (proche Lyon et Saint-Étienne)\n\
         **Mobilité** : {mobility}\n\
         **Durée d'études max** : {years} an(s) après le bac\n\
         **Alternance** : {alternance}",
        location = profile.location(),
        mobility = profile.mobility().label(),
        years = profile.study_years(),
        alternance = profile.alternance().label(),
    );

    let optional_lines = [
        ("Ce qu'elle aime", TagSet::Personality, &profile.personality),
        ("Environnement souhaité", TagSet::Environment, &profile.environment),
        ("Priorités", TagSet::Priorities, &profile.priorities),
        ("Secteurs d'intérêt", TagSet::Sectors, &profile.sectors),
    ];
    for (heading, set, tags) in optional_lines {
        if !tags.is_empty() {
            context.push_str(&format!("\n**{heading}** : {}", set.join_labels(tags)));
        }
    }

    if let Some(dream) = profile.dream() {
        context.push_str(&format!("\n**Rêves/aspirations** : {dream}"));
    }

    context
}

/// Shared Phase-2 context: the profile summary, followed by the research
/// block only when Phase 1 produced text.
pub fn research_context(profile_summary: &str, research: Option<&str>) -> String {
    match research {
        Some(research) => format!(
            "{profile_summary}\n\n\
             {DELIMITER}\n\
             DONNÉES DE RECHERCHE (écoles et formations actuelles) :\n\
             {DELIMITER}\n\
             {research}\n\
             {DELIMITER}"
        ),
        None => profile_summary.to_string(),
    }
}

/// Sector bullet of the research prompt.
pub fn research_sectors(profile: &Profile) -> String {
    if profile.sectors.is_empty() {
        DEFAULT_SECTORS.to_string()
    } else {
        format!(
            "- Secteurs d'intérêt : {}",
            TagSet::Sectors.join_labels(&profile.sectors)
        )
    }
}

/// Phase output, or the explicit placeholder when it is missing.
pub fn or_not_available(text: Option<&str>) -> &str {
    text.unwrap_or(NOT_AVAILABLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> Profile {
        Profile {
            location: Some("Rive-de-Gier".to_string()),
            mobility: Some("national".to_string()),
            study_duration: Some(3),
            alternance: Some("no".to_string()),
            personality: vec!["manual".to_string(), "skate".to_string()],
            environment: vec![],
            priorities: vec!["passion".to_string()],
            sectors: vec!["cinema".to_string()],
            dream: Some("Construire des décors".to_string()),
        }
    }

    #[test]
    fn test_profile_context_contains_all_labels() {
        let context = profile_context(&sample_profile());
        assert!(context.starts_with("## PROFIL DE L'ÉTUDIANTE"));
        assert!(context.contains("**Localisation** : Rive-de-Gier"));
        assert!(context.contains("**Mobilité** : France entière"));
        assert!(context.contains("**Durée d'études max** : 3 an(s)"));
        assert!(context.contains("**Alternance** : Non souhaitée"));
        assert!(context.contains("**Ce qu'elle aime** : fabriquer de ses mains, skate"));
        assert!(context.contains("**Priorités** : vivre de sa passion"));
        assert!(context.contains("**Secteurs d'intérêt** : cinéma/audiovisuel"));
        assert!(context.contains("**Rêves/aspirations** : Construire des décors"));
    }

    #[test]
    fn test_profile_context_omits_empty_sections() {
        let context = profile_context(&sample_profile());
        assert!(!context.contains("Environnement souhaité"));

        let bare = profile_context(&Profile::default());
        assert!(bare.contains("Saint-Chamond (42400)"));
        assert!(bare.contains("International possible"));
        assert!(bare.contains("Ouverte"));
        assert!(!bare.contains("Rêves"));
    }

    #[test]
    fn test_research_context_with_research_block() {
        let context = research_context("PROFIL", Some("Lycée du Bois, Mouchard"));
        assert!(context.starts_with("PROFIL\n\n"));
        assert!(context.contains("DONNÉES DE RECHERCHE"));
        assert!(context.contains("Lycée du Bois, Mouchard"));
        assert_eq!(context.matches(DELIMITER).count(), 3);
    }

    #[test]
    fn test_research_context_omits_block_entirely() {
        let context = research_context("PROFIL", None);
        assert_eq!(context, "PROFIL");
        assert!(!context.contains(NOT_AVAILABLE));
    }

    #[test]
    fn test_research_sectors_default_and_labelled() {
        assert_eq!(research_sectors(&Profile::default()), DEFAULT_SECTORS);
        assert_eq!(
            research_sectors(&sample_profile()),
            "- Secteurs d'intérêt : cinéma/audiovisuel"
        );
    }

    #[test]
    fn test_placeholder_for_missing_output() {
        assert_eq!(or_not_available(None), NOT_AVAILABLE);
        assert_eq!(or_not_available(Some("texte")), "texte");
    }
}
