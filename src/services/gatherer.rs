use std::collections::HashSet;

use crate::{
    configuration::GatheringSettings,
    domain::{
        canonical_host, canonical_link, char_len, is_http_url, rank, same_site,
        truncate_with_ellipsis, Candidate, RankingProfile,
    },
    services::{PageFetcher, SearchProvider},
};

pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";
pub const TRUNCATION_MARKER: &str = "\n...";
pub const DEFAULT_PAGE_CHAR_CAP: usize = 2500;
pub const DEFAULT_RESULTS_PER_QUERY: usize = 6;

pub const DEFAULT_QUERIES: [&str; 6] = [
    "site:{host} product OR platform OR solution",
    "site:{host} blog OR research OR engineering",
    "site:{host} docs OR api OR developer",
    "site:{host} features OR technology",
    "site:{host} ai OR genai OR llm",
    "site:{host} pricing OR plans",
];

/// Builds the bounded website context handed to the model.
pub struct ContextGatherer {
    search: Box<dyn SearchProvider>,
    fetcher: PageFetcher,
    profile: RankingProfile,
    queries: Vec<String>,
    results_per_query: usize,
    page_char_cap: usize,
}

impl ContextGatherer {
    pub fn new(search: Box<dyn SearchProvider>, fetcher: PageFetcher) -> Self {
        ContextGatherer {
            search,
            fetcher,
            profile: RankingProfile::default(),
            queries: DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect(),
            results_per_query: DEFAULT_RESULTS_PER_QUERY,
            page_char_cap: DEFAULT_PAGE_CHAR_CAP,
        }
    }

    pub fn with_queries(mut self, queries: Vec<String>, results_per_query: usize) -> Self {
        if !queries.is_empty() {
            self.queries = queries;
        }
        self.results_per_query = results_per_query;
        self
    }

    pub fn with_gathering(mut self, settings: &GatheringSettings) -> Self {
        self.page_char_cap = settings.page_char_cap;
        self
    }

    pub fn with_profile(mut self, profile: RankingProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Discovers, ranks and fetches pages of `root_url`'s site.
    ///
    /// The result never exceeds `max_chars` characters and draws on at most `max_pages` pages.
    /// Invalid roots return an empty string without touching the network.
    pub async fn gather(&self, root_url: &str, max_pages: usize, max_chars: usize) -> String {
        let root_url = root_url.trim();
        if root_url.is_empty() || !is_http_url(root_url) {
            return "".to_string();
        }
        let host = canonical_host(root_url);
        if host.is_empty() {
            return "".to_string();
        }

        let candidates = rank(self.collect_candidates(root_url, &host).await);
        log::info!(
            "Collected {} candidate pages for {}",
            candidates.len(),
            host
        );

        let pieces = self.fetch_pieces(&candidates, max_pages, max_chars).await;
        let context = pieces.join(CONTEXT_SEPARATOR);

        match char_len(&context) > max_chars {
            true => hard_truncate(&context, max_chars),
            false => context,
        }
    }

    async fn collect_candidates(&self, root_url: &str, host: &str) -> Vec<Candidate> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates = vec![Candidate::homepage(root_url)];
        seen.insert(canonical_link(root_url));

        for template in &self.queries {
            let query = template.replace("{host}", host);

            let hits = match self.search.search(&query, self.results_per_query).await {
                Ok(hits) => hits,
                Err(e) => {
                    log::error!("Search failed for '{}', skipping: {:?}", query, e);
                    continue;
                }
            };

            for hit in hits {
                let link = hit.link.trim();
                if link.is_empty() || !same_site(root_url, link) {
                    continue;
                }
                if !seen.insert(canonical_link(link)) {
                    continue;
                }

                candidates.push(Candidate::scored(
                    &self.profile,
                    link,
                    &hit.title,
                    &hit.snippet,
                ));
            }
        }

        candidates
    }

    async fn fetch_pieces(
        &self,
        candidates: &[Candidate],
        max_pages: usize,
        max_chars: usize,
    ) -> Vec<String> {
        let separator_len = char_len(CONTEXT_SEPARATOR);
        let mut pieces: Vec<String> = vec![];
        let mut total_chars = 0;

        for candidate in candidates {
            if pieces.len() >= max_pages {
                break;
            }

            let text = self.fetcher.fetch_text(&candidate.link).await;
            if text.is_empty() {
                log::debug!("No text from {}, skipping", candidate.link);
                continue;
            }

            let text = truncate_with_ellipsis(&text, self.page_char_cap);
            let piece = format!("URL: {}\n{}", candidate.link, text);
            let piece_len = char_len(&piece);

            if !pieces.is_empty() && total_chars + separator_len + piece_len > max_chars {
                break;
            }

            log::info!(
                "Using {} (score {}, {} chars)",
                candidate.link,
                candidate.score,
                piece_len
            );
            total_chars += piece_len
                + match pieces.is_empty() {
                    true => 0,
                    false => separator_len,
                };
            pieces.push(piece);
        }

        pieces
    }
}

/// Cuts `text` so that the kept prefix plus [`TRUNCATION_MARKER`] fits in `max_chars`.
pub fn hard_truncate(text: &str, max_chars: usize) -> String {
    let marker_len = char_len(TRUNCATION_MARKER);
    if max_chars < marker_len {
        return text.chars().take(max_chars).collect();
    }

    let kept: String = text.chars().take(max_chars - marker_len).collect();
    format!("{}{}", kept, TRUNCATION_MARKER)
}
