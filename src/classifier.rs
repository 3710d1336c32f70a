//! Priority decision list that maps free text onto one category label.
//!
//! Rules are evaluated top to bottom against the lowercased text; the first rule
//! with any keyword present as a substring wins. When nothing matches the
//! taxonomy's fallback label is returned, so classification is total.

use serde::{Deserialize, Serialize};

use crate::constants::classifier::FALLBACK_LABEL;
use crate::types::{CategoryLabel, Keyword};

/// One `(label, keywords)` entry of the decision list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Label returned when this rule matches.
    pub label: CategoryLabel,
    /// Lowercase substrings; any one of them triggers the rule.
    pub keywords: Vec<Keyword>,
}

impl CategoryRule {
    /// Build a rule, lowercasing keywords. Surrounding spaces are kept because they
    /// are significant (`"endo "` must not match `"endocrine"`).
    pub fn new<I, K>(label: impl Into<CategoryLabel>, keywords: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        Self {
            label: label.into(),
            keywords: keywords
                .into_iter()
                .map(|keyword| keyword.as_ref().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| lowered.contains(keyword.as_str()))
    }
}

/// Serialized taxonomy shape; normalized through [`CategoryRule::new`] on load.
#[derive(Deserialize)]
struct TaxonomyFile {
    #[serde(default)]
    rules: Vec<CategoryRule>,
    #[serde(default = "default_fallback")]
    fallback: CategoryLabel,
}

fn default_fallback() -> CategoryLabel {
    FALLBACK_LABEL.to_string()
}

impl From<TaxonomyFile> for Taxonomy {
    fn from(file: TaxonomyFile) -> Self {
        Taxonomy::new(
            file.rules
                .into_iter()
                .map(|rule| CategoryRule::new(rule.label, rule.keywords))
                .collect(),
            file.fallback,
        )
    }
}

/// Ordered rule table plus the reserved fallback label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaxonomyFile")]
pub struct Taxonomy {
    rules: Vec<CategoryRule>,
    fallback: CategoryLabel,
}

impl Taxonomy {
    /// Create a taxonomy from rules in priority order.
    pub fn new(rules: Vec<CategoryRule>, fallback: impl Into<CategoryLabel>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Label returned when no rule matches.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Every label this taxonomy can return, rule labels first, fallback last.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .map(|rule| rule.label.as_str())
            .chain(std::iter::once(self.fallback.as_str()))
    }

    /// Returns `true` when `label` belongs to the closed label set.
    pub fn contains_label(&self, label: &str) -> bool {
        self.labels().any(|known| known == label)
    }

    /// Index of the first rule matching `text`, if any.
    pub fn matched_rule(&self, text: &str) -> Option<usize> {
        let lowered = text.to_lowercase();
        self.rules.iter().position(|rule| rule.matches(&lowered))
    }

    /// Assign exactly one label to `text`.
    pub fn categorize(&self, text: &str) -> &str {
        self.matched_rule(text)
            .map(|idx| self.rules[idx].label.as_str())
            .unwrap_or(self.fallback.as_str())
    }

    /// Taxonomy used for community directories.
    pub fn communities() -> Self {
        Self::new(
            vec![
                CategoryRule::new("PCOS", ["pcos", "polycystic"]),
                CategoryRule::new("Endometriosis", ["endometriosis", "endo "]),
                CategoryRule::new("Pregnancy", ["pregnancy", "pregnant"]),
                CategoryRule::new(
                    "Infertility & Fertility",
                    ["infertility", "fertility", "ttc", "ivf"],
                ),
                CategoryRule::new("Menopause", ["menopause", "perimenopause"]),
                CategoryRule::new("Breast Cancer", ["breast cancer"]),
                CategoryRule::new("Ovarian Cancer", ["ovarian cancer"]),
                CategoryRule::new("Cervical Cancer", ["cervical cancer"]),
                CategoryRule::new("Thyroid Disorders", ["thyroid", "hypothyroid"]),
                CategoryRule::new(
                    "Mental Health",
                    ["mental health", "anxiety", "depression", "postpartum"],
                ),
                CategoryRule::new("Chronic Pain", ["fibromyalgia", "chronic pain"]),
                CategoryRule::new("PMS & PMDD", ["pmdd", "pms"]),
            ],
            FALLBACK_LABEL,
        )
    }

    /// Taxonomy used for discussion threads; more specific conditions come first.
    pub fn discussions() -> Self {
        Self::new(
            vec![
                CategoryRule::new("PCOS", ["pcos", "polycystic"]),
                CategoryRule::new("Endometriosis", ["endometriosis", "endo "]),
                CategoryRule::new("Uterine Fibroids", ["fibroid", "leiomyoma"]),
                CategoryRule::new("Breast Cancer", ["breast cancer"]),
                CategoryRule::new("Cervical Cancer", ["cervical cancer", "hpv vaccine"]),
                CategoryRule::new("Ovarian Cancer", ["ovarian cancer"]),
                CategoryRule::new("Menopause", ["menopause", "perimenopause", "hot flash"]),
                CategoryRule::new(
                    "Yeast Infection",
                    ["yeast infection", "candida", "thrush"],
                ),
                CategoryRule::new("UTI", ["uti", "urinary tract", "bladder infection"]),
                CategoryRule::new("Ovarian Cysts", ["ovarian cyst"]),
                CategoryRule::new(
                    "Pelvic Inflammatory Disease",
                    ["pid", "pelvic inflammatory"],
                ),
                CategoryRule::new(
                    "Infertility & Fertility",
                    [
                        "infertility",
                        "infertile",
                        "ttc",
                        "trying to conceive",
                        "ivf",
                        "fertility",
                    ],
                ),
                CategoryRule::new("PMS & PMDD", ["pms", "pmdd", "premenstrual"]),
                CategoryRule::new("Gestational Diabetes", ["gestational diabetes"]),
                CategoryRule::new(
                    "Postpartum Depression",
                    ["postpartum depression", "ppd", "postnatal depression"],
                ),
                CategoryRule::new(
                    "Thyroid Disorders",
                    ["thyroid", "hypothyroid", "hyperthyroid", "hashimoto"],
                ),
                CategoryRule::new("Osteoporosis", ["osteoporosis", "bone density"]),
                CategoryRule::new("Preeclampsia", ["preeclampsia", "pre-eclampsia"]),
                CategoryRule::new("Vaginismus", ["vaginismus"]),
                CategoryRule::new("Bacterial Vaginosis", ["bacterial vaginosis", "bv "]),
                CategoryRule::new(
                    "Autoimmune Diseases",
                    ["lupus", "autoimmune", "rheumatoid"],
                ),
                CategoryRule::new(
                    "Pregnancy",
                    ["pregnancy", "pregnant", "expecting", "prenatal"],
                ),
                CategoryRule::new(
                    "Mental Health",
                    ["anxiety", "depression", "mental health", "therapy"],
                ),
                CategoryRule::new("Fibromyalgia", ["fibromyalgia"]),
            ],
            FALLBACK_LABEL,
        )
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::discussions()
    }
}
