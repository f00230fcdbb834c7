use url::Url;

pub const HOMEPAGE_SCORE: i32 = 5;

/// A page discovered for one startup, scored once from its search metadata.
#[derive(Debug, PartialEq, Clone)]
pub struct Candidate {
    pub link: String,
    pub title: String,
    pub snippet: String,
    pub score: i32,
}

impl Candidate {
    pub fn homepage(root_url: &str) -> Self {
        Candidate {
            link: root_url.trim().to_string(),
            title: "Homepage".to_string(),
            snippet: "".to_string(),
            score: HOMEPAGE_SCORE,
        }
    }

    pub fn scored(profile: &RankingProfile, link: &str, title: &str, snippet: &str) -> Self {
        Candidate {
            link: link.to_string(),
            title: title.to_string(),
            snippet: snippet.to_string(),
            score: profile.score(link, title, snippet),
        }
    }
}

/// Title/snippet terms sharing one bonus, earned once for every term that appears.
#[derive(Debug, Clone)]
pub struct TermGroup {
    pub bonus: i32,
    pub terms: &'static [&'static str],
}

/// Hand-tuned weights used to order candidate pages.
#[derive(Debug, Clone)]
pub struct RankingProfile {
    pub path_weights: &'static [(&'static str, i32)],
    pub term_groups: &'static [TermGroup],
}

const PATH_WEIGHTS: &[(&str, i32)] = &[
    ("product", 8),
    ("products", 8),
    ("platform", 7),
    ("solution", 7),
    ("solutions", 7),
    ("use-cases", 6),
    ("usecases", 6),
    ("case-studies", 6),
    ("case-study", 6),
    ("blog", 6),
    ("posts", 5),
    ("article", 5),
    ("insights", 5),
    ("research", 7),
    ("engineering", 7),
    ("technology", 5),
    ("tech", 5),
    ("docs", 4),
    ("documentation", 4),
    ("developer", 4),
    ("api", 4),
    ("pricing", 3),
    ("whitepaper", 6),
    // Pages that rarely describe the product
    ("careers", -6),
    ("jobs", -6),
    ("privacy", -8),
    ("terms", -8),
    ("legal", -8),
    ("cookie", -6),
    ("gdpr", -6),
    ("press", -2),
    ("media", -2),
    ("brand", -2),
    ("about", -2),
    ("contact", -4),
    ("status", -4),
];

const TERM_GROUPS: &[TermGroup] = &[
    TermGroup {
        bonus: 3,
        terms: &[
            " ai",
            "genai",
            " llm",
            "gpt",
            "rag",
            "embedding",
            "transformer",
            "bert",
            "llama",
            "mistral",
            "claude",
            "gemini",
            "machine learning",
            "ml ",
            "nlg",
            "nlp",
            "computer vision",
            "retrieval",
        ],
    },
    TermGroup {
        bonus: 2,
        terms: &[
            "product",
            "platform",
            "solution",
            "service",
            "features",
            "technology",
        ],
    },
    TermGroup {
        bonus: 2,
        terms: &[
            "blog",
            "post",
            "article",
            "research",
            "engineering",
            "whitepaper",
            "insight",
        ],
    },
];

impl Default for RankingProfile {
    fn default() -> Self {
        RankingProfile {
            path_weights: PATH_WEIGHTS,
            term_groups: TERM_GROUPS,
        }
    }
}

impl RankingProfile {
    pub fn score(&self, link: &str, title: &str, snippet: &str) -> i32 {
        let path = match Url::parse(link) {
            Ok(parsed_url) => parsed_url.path().to_lowercase(),
            Err(_) => link.to_lowercase(),
        };
        let title = title.to_lowercase();
        let snippet = snippet.to_lowercase();

        let path_score: i32 = self
            .path_weights
            .iter()
            .filter(|(keyword, _)| path.contains(&format!("/{}", keyword)))
            .map(|(_, weight)| weight)
            .sum();

        let term_score: i32 = self
            .term_groups
            .iter()
            .map(|group| {
                let matched = group
                    .terms
                    .iter()
                    .filter(|term| title.contains(**term) || snippet.contains(**term))
                    .count() as i32;
                matched * group.bonus
            })
            .sum();

        path_score + term_score
    }
}

/// Scores with the default profile.
pub fn score(link: &str, title: &str, snippet: &str) -> i32 {
    RankingProfile::default().score(link, title, snippet)
}

/// Highest score first; candidates with equal scores keep discovery order.
pub fn rank(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}
