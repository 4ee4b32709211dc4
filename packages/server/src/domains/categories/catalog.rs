//! Static category catalog.
//!
//! Each category maps to a places query: a provider place type, a keyword, or
//! both. The nearby group feeds the home view's nearest-per-category lookup; the
//! women and LGBTQIA+ groups back the browse pages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    Nearby,
    Women,
    Lgbtqia,
}

impl CategoryGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryGroup::Nearby => "nearby",
            CategoryGroup::Women => "women",
            CategoryGroup::Lgbtqia => "lgbtqia",
        }
    }
}

impl fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearby" => Ok(CategoryGroup::Nearby),
            "women" => Ok(CategoryGroup::Women),
            "lgbtqia" | "lgbtq" => Ok(CategoryGroup::Lgbtqia),
            other => Err(format!("unknown category group: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub key: &'static str,
    pub label: &'static str,
    pub group: CategoryGroup,
    #[serde(skip)]
    pub place_type: Option<&'static str>,
    #[serde(skip)]
    pub keyword: Option<&'static str>,
    pub icon: &'static str,
    pub description: &'static str,
}

impl Category {
    /// Heading for the category list view, e.g. "Near By Legal Aid Resources".
    pub fn list_heading(&self) -> String {
        format!("Near By {} Resources", self.label)
    }

    /// Shown when a lookup returns nothing.
    pub fn empty_message(&self) -> String {
        format!("No {} Resources Found Near By", self.label)
    }
}

const fn nearby(
    key: &'static str,
    label: &'static str,
    place_type: &'static str,
    keyword: Option<&'static str>,
    icon: &'static str,
    description: &'static str,
) -> Category {
    Category {
        key,
        label,
        group: CategoryGroup::Nearby,
        place_type: Some(place_type),
        keyword,
        icon,
        description,
    }
}

const fn browse(
    group: CategoryGroup,
    key: &'static str,
    label: &'static str,
    place_type: Option<&'static str>,
    keyword: &'static str,
    icon: &'static str,
    description: &'static str,
) -> Category {
    Category {
        key,
        label,
        group,
        place_type,
        keyword: Some(keyword),
        icon,
        description,
    }
}

use CategoryGroup::{Lgbtqia, Women};

static CATALOG: &[Category] = &[
    // Home view, in display order
    nearby("police_station", "Police Station", "police", None, "local_police", "Nearest police station"),
    nearby("private_hospital", "Private Hospital", "hospital", Some("private"), "local_hospital", "Nearest private hospital"),
    nearby("government_hospital", "Government Hospital", "hospital", Some("government"), "local_hospital", "Nearest government hospital"),
    nearby("blood_bank", "Blood Bank", "blood_bank", None, "bloodtype", "Nearest blood bank"),
    nearby("bus_stop", "Bus Stop", "bus_station", None, "directions_bus", "Nearest bus stop"),
    // Women
    browse(Women, "healthcare", "Healthcare", Some("hospital"), "women health clinic", "local_hospital", "Women health services and facilities"),
    browse(Women, "mentalhealth", "Mental Health", None, "women mental health counselling", "psychology", "Emotional and psychological support"),
    browse(Women, "legal", "Legal Aid", Some("lawyer"), "women legal aid", "gavel", "Legal help for women in need"),
    browse(Women, "safety", "Safety", None, "women safety helpline", "security", "Safety resources and emergency contacts"),
    browse(Women, "childcare", "Childcare", None, "childcare centre", "child_care", "Childcare and support services"),
    browse(Women, "education", "Education", Some("school"), "women education programs", "school", "Education programs and training"),
    browse(Women, "career", "Career", None, "women career guidance", "work", "Career guidance and job support"),
    browse(Women, "financial", "Financial", None, "women financial advice", "attach_money", "Financial advice and grants"),
    browse(Women, "leadership", "Leadership", None, "women leadership programs", "trending_up", "Leadership programs and events"),
    browse(Women, "wellness", "Wellness", None, "women wellness centre", "spa", "Women's wellness and fitness"),
    browse(Women, "support-groups", "Support Groups", None, "women support group", "group", "Support groups and community help"),
    browse(Women, "fitness", "Fitness", Some("gym"), "women fitness", "fitness_center", "Fitness programs and activities"),
    browse(Women, "housing", "Housing", None, "women shelter", "home", "Housing support and shelters"),
    browse(Women, "food-nutrition", "Food & Nutrition", None, "food bank nutrition", "restaurant", "Food security and nutrition advice"),
    // LGBTQIA+
    browse(Lgbtqia, "lgbtq_healthcare", "Healthcare", Some("hospital"), "lgbtq friendly clinic", "local_hospital", "Inclusive healthcare services for LGBTQIA+ individuals."),
    browse(Lgbtqia, "lgbtq_mentalhealth", "Mental Health", None, "lgbtq mental health counselling", "psychology", "Emotional and psychological support for LGBTQIA+."),
    browse(Lgbtqia, "lgbtq_legalaid", "Legal Aid", Some("lawyer"), "lgbtq legal aid", "gavel", "Legal assistance and resources for LGBTQIA+ rights."),
    browse(Lgbtqia, "lgbtq_supportgroups", "Support Groups", None, "lgbtq support group", "group", "Community support groups and peer support."),
    browse(Lgbtqia, "lgbtq_education", "Education", None, "lgbtq education scholarship", "school", "Educational resources and scholarships for LGBTQIA+."),
    browse(Lgbtqia, "lgbtq_career", "Career", None, "lgbtq career support", "work", "Career development and job support for LGBTQIA+ professionals."),
    browse(Lgbtqia, "lgbtq_safety", "Safety", None, "lgbtq safety anti violence", "shield", "Resources and support for safety and anti-violence."),
    browse(Lgbtqia, "lgbtq_leadership", "Leadership", None, "lgbtq leadership programs", "supervisor_account", "Leadership programs and events for LGBTQIA+ individuals."),
    browse(Lgbtqia, "lgbtq_wellness", "Wellness", None, "lgbtq wellness", "spa", "Wellness programs and fitness activities for LGBTQIA+."),
];

/// Every category, grouped and in display order.
pub fn catalog() -> &'static [Category] {
    CATALOG
}

pub fn group(group: CategoryGroup) -> impl Iterator<Item = &'static Category> {
    CATALOG.iter().filter(move |c| c.group == group)
}

pub fn find(key: &str) -> Option<&'static Category> {
    CATALOG.iter().find(|c| c.key == key)
}

/// Case-insensitive substring match on the label. A blank term matches everything.
pub fn search(within: CategoryGroup, term: &str) -> Vec<&'static Category> {
    let term = term.trim().to_lowercase();
    group(within)
        .filter(|c| term.is_empty() || c.label.to_lowercase().contains(&term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_group_sizes() {
        assert_eq!(group(CategoryGroup::Nearby).count(), 5);
        assert_eq!(group(CategoryGroup::Women).count(), 14);
        assert_eq!(group(CategoryGroup::Lgbtqia).count(), 9);
    }

    #[test]
    fn test_keys_unique() {
        let keys: HashSet<_> = catalog().iter().map(|c| c.key).collect();
        assert_eq!(keys.len(), catalog().len());
    }

    #[test]
    fn test_every_category_has_a_query() {
        for category in catalog() {
            assert!(
                category.place_type.is_some() || category.keyword.is_some(),
                "{} has neither place type nor keyword",
                category.key
            );
        }
    }

    #[test]
    fn test_nearby_order() {
        let labels: Vec<_> = group(CategoryGroup::Nearby).map(|c| c.label).collect();
        assert_eq!(
            labels,
            [
                "Police Station",
                "Private Hospital",
                "Government Hospital",
                "Blood Bank",
                "Bus Stop"
            ]
        );
    }

    #[test]
    fn test_search_case_insensitive() {
        let found: Vec<_> = search(CategoryGroup::Women, "HEALTH")
            .into_iter()
            .map(|c| c.key)
            .collect();
        assert_eq!(found, ["healthcare", "mentalhealth"]);
    }

    #[test]
    fn test_search_stays_in_group() {
        let found = search(CategoryGroup::Lgbtqia, "legal");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "lgbtq_legalaid");
    }

    #[test]
    fn test_blank_search_returns_group() {
        assert_eq!(search(CategoryGroup::Lgbtqia, "  ").len(), 9);
        assert!(search(CategoryGroup::Women, "zzz").is_empty());
    }

    #[test]
    fn test_find_and_parse_group() {
        assert_eq!(find("blood_bank").map(|c| c.place_type), Some(Some("blood_bank")));
        assert!(find("unknown").is_none());
        assert_eq!("LGBTQIA".parse::<CategoryGroup>(), Ok(CategoryGroup::Lgbtqia));
        assert!("men".parse::<CategoryGroup>().is_err());
    }

    #[test]
    fn test_headings() {
        let legal = find("legal").unwrap();
        assert_eq!(legal.list_heading(), "Near By Legal Aid Resources");
        assert_eq!(legal.empty_message(), "No Legal Aid Resources Found Near By");
    }
}
